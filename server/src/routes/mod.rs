use std::sync::Arc;

use dashmap::Entry;
use minesweeper_common::{
    models::{CreateResponse, Difficulty},
    protocol::ClientMessage,
};
use minesweeper_engine::{GameSession, Limits, SaveGame};
use nanoid::nanoid;
use rocket::{
    State,
    futures::StreamExt,
    get,
    http::Status,
    post,
    response::status::{BadRequest, NotFound},
    serde::json::Json,
};
use rocket_ws::{Channel, Message, WebSocket};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::logic::{Game, Games};

#[instrument(level = "trace", skip(games, game))]
fn add_game(games: &Games, game: Game) -> String {
    let mut id_length = 5;
    let max_attempts_per_length = 10;

    loop {
        for _ in 0..max_attempts_per_length {
            let id = nanoid!(id_length);
            match games.entry(id.clone()) {
                Entry::Occupied(_) => {
                    debug!("Session ID collision, trying another: {}", id);
                    continue;
                }
                Entry::Vacant(entry) => {
                    entry.insert(Arc::new(Mutex::new(game)));
                    info!("Created new session with ID: {}", id);
                    return id;
                }
            }
        }

        warn!(
            "Exhausted ID attempts at length {}, increasing to {}",
            id_length,
            id_length + 1
        );
        id_length += 1;
    }
}

fn find_game(games: &Games, id: &str) -> Option<Arc<Mutex<Game>>> {
    games.get(id).map(|entry| entry.value().clone())
}

#[post("/create", data = "<difficulty>")]
#[instrument(level = "trace", skip(games, limits), fields(difficulty = %difficulty.0))]
pub fn create_game(
    difficulty: Json<Difficulty>,
    games: &State<Games>,
    limits: &State<Limits>,
) -> Result<Json<CreateResponse>, BadRequest<String>> {
    let session = GameSession::from_difficulty(&difficulty, limits).map_err(|e| {
        warn!("Refused to create {}: {}", difficulty.0, e);
        BadRequest(e.to_string())
    })?;

    let id = add_game(games, Game::new(session));
    Ok(Json(CreateResponse { id }))
}

#[get("/save?<id>")]
#[instrument(level = "trace", skip(games), fields(game_id = %id))]
pub async fn save_game(id: String, games: &State<Games>) -> Result<Json<SaveGame>, NotFound<String>> {
    let Some(game) = find_game(games, &id) else {
        warn!("Save requested for non-existent session: {}", id);
        return Err(NotFound(format!("no session with id {id}")));
    };

    let save = game.lock().await.save();
    info!("Saved session {}", id);
    Ok(Json(save))
}

#[post("/load", data = "<save>")]
#[instrument(level = "trace", skip_all)]
pub fn load_game(
    save: Json<SaveGame>,
    games: &State<Games>,
) -> Result<Json<CreateResponse>, BadRequest<String>> {
    let session = GameSession::restore(save.into_inner()).map_err(|e| {
        warn!("Rejected savegame: {}", e);
        BadRequest(e.to_string())
    })?;

    let id = add_game(games, Game::new(session));
    Ok(Json(CreateResponse { id }))
}

#[get("/ws?<id>")]
#[instrument(level = "trace", skip(ws, games, limits), fields(game_id = %id))]
pub fn websocket_handler(
    ws: WebSocket,
    games: &State<Games>,
    limits: &State<Limits>,
    id: String,
) -> Result<Channel<'static>, Status> {
    let Some(game) = find_game(games, &id) else {
        warn!("WebSocket connection attempt for non-existent session: {}", id);
        return Err(Status::NotFound);
    };
    let limits = *limits.inner();

    Ok(ws.channel(move |stream| {
        Box::pin(async move {
            let (write, mut read) = stream.split();

            let stream_id = game.lock().await.add_stream(write).await;
            info!("Client connected to session {} (stream: {})", id, stream_id);

            while let Some(message) = read.next().await {
                match message {
                    Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(message) => {
                            debug!("Received message for session {}: {:?}", id, message);
                            game.lock()
                                .await
                                .handle(&stream_id, message, &limits)
                                .await;
                        }
                        Err(e) => {
                            warn!(
                                "Invalid message format in session {}: {} - Error: {}",
                                id, text, e
                            );
                        }
                    },
                    Ok(Message::Close(_)) => {
                        info!(
                            "WebSocket connection closed for session {} (stream: {})",
                            id, stream_id
                        );
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("WebSocket error in session {}: {}", id, e);
                        break;
                    }
                }
            }

            game.lock().await.remove_stream(&stream_id).await;
            Ok(())
        })
    }))
}
