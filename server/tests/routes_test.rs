use minesweeper_common::models::{CreateResponse, Difficulty, Outcome};
use minesweeper_engine::{Limits, SaveGame};
use minesweeper_server::{build, config::CleanupConfig};
use rocket::{http::Status, local::blocking::Client};

fn client() -> Client {
    Client::tracked(build(Limits::default(), CleanupConfig::default()))
        .expect("valid rocket instance")
}

fn create(client: &Client, difficulty: &Difficulty) -> String {
    let response = client.post("/create").json(difficulty).dispatch();
    assert_eq!(response.status(), Status::Ok);
    response
        .into_json::<CreateResponse>()
        .expect("create response")
        .id
}

fn fetch_save(client: &Client, id: &str) -> SaveGame {
    let response = client.get(format!("/save?id={id}")).dispatch();
    assert_eq!(response.status(), Status::Ok);
    response.into_json::<SaveGame>().expect("savegame body")
}

#[test]
fn create_preset_returns_short_id() {
    let client = client();
    let id = create(&client, &Difficulty::Intermediate);
    assert_eq!(id.len(), 5);

    let save = fetch_save(&client, &id);
    assert_eq!((save.width, save.height, save.mines), (16, 16, 40));
    assert!(!save.first_click_done);
    assert_eq!(save.outcome, Outcome::InProgress);
}

#[test]
fn create_rejects_invalid_custom_size() {
    let client = client();
    let response = client
        .post("/create")
        .json(&Difficulty::Custom {
            width: 45,
            height: 10,
            mines: 10,
        })
        .dispatch();

    assert_eq!(response.status(), Status::BadRequest);
    let body = response.into_string().unwrap_or_default();
    assert!(body.contains("invalid width 45"), "unexpected body: {body}");
}

#[test]
fn save_of_unknown_session_is_not_found() {
    let client = client();
    let response = client.get("/save?id=nope").dispatch();
    assert_eq!(response.status(), Status::NotFound);
}

#[test]
fn loaded_savegame_becomes_a_new_session() {
    let client = client();
    let id = create(&client, &Difficulty::Beginner);
    let save = fetch_save(&client, &id);

    let response = client.post("/load").json(&save).dispatch();
    assert_eq!(response.status(), Status::Ok);
    let loaded_id = response
        .into_json::<CreateResponse>()
        .expect("load response")
        .id;

    assert_ne!(loaded_id, id);
    assert_eq!(fetch_save(&client, &loaded_id), save);
}

#[test]
fn inconsistent_savegame_is_rejected() {
    let client = client();
    let id = create(&client, &Difficulty::Beginner);
    let mut save = fetch_save(&client, &id);
    save.squares.truncate(10);

    let response = client.post("/load").json(&save).dispatch();
    assert_eq!(response.status(), Status::BadRequest);
    let body = response.into_string().unwrap_or_default();
    assert!(body.contains("81"), "unexpected body: {body}");
}
