use minesweeper_engine::Limits;
use minesweeper_server::{build, config::CleanupConfig};
use rocket::{Build, Rocket};
use tracing::info;

#[rocket::launch]
fn rocket() -> Rocket<Build> {
    tracing_subscriber::fmt::init();
    info!("Starting minesweeper session host");

    let rocket = build(Limits::from_env(), CleanupConfig::from_env());
    info!("Endpoints: POST /create, GET /save, POST /load, GET /ws");

    rocket
}
