//! Hosts minesweeper sessions for remote UIs.
//!
//! Every session lives behind its own lock in a shared map, so requests from
//! any number of connections reach the engine one at a time.

pub mod cleanup;
pub mod clock;
pub mod config;
pub mod logic;
pub mod routes;

use std::sync::Arc;

use dashmap::DashMap;
use minesweeper_engine::Limits;
use rocket::{
    Build, Rocket,
    fairing::{Fairing, Info, Kind},
    routes,
};
use tracing::{info, warn};

use crate::{
    cleanup::start_cleanup_task,
    clock::start_clock_task,
    config::CleanupConfig,
    logic::Games,
    routes::{create_game, load_game, save_game, websocket_handler},
};

struct BackgroundTasks {
    cleanup: CleanupConfig,
}

#[rocket::async_trait]
impl Fairing for BackgroundTasks {
    fn info(&self) -> Info {
        Info {
            name: "Session clock and cleanup",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        if let Some(games) = rocket.state::<Games>() {
            info!("Starting clock and cleanup tasks");
            tokio::spawn(start_clock_task(games.clone()));
            tokio::spawn(start_cleanup_task(games.clone(), self.cleanup));
        } else {
            warn!("Failed to get games state for background tasks");
        }
        Ok(rocket)
    }
}

pub fn build(limits: Limits, cleanup: CleanupConfig) -> Rocket<Build> {
    let games: Games = Arc::new(DashMap::new());

    info!(
        "Custom games limited to {}x{}",
        limits.max_width, limits.max_height
    );

    rocket::build()
        .attach(BackgroundTasks { cleanup })
        .manage(games)
        .manage(limits)
        .mount(
            "/",
            routes![create_game, save_game, load_game, websocket_handler],
        )
}
