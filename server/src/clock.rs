use std::time::Duration;

use rocket::futures::Sink;
use rocket_ws::Message;
use tokio::{task::JoinHandle, time};
use tracing::{debug, info};

use crate::logic::Games;

/// Ticks every hosted session once a second.
pub async fn start_clock_task(games: Games) {
    let mut interval = time::interval(Duration::from_secs(1));
    info!("Started session clock");

    loop {
        interval.tick().await;
        tick_sessions(&games);
    }
}

/// Spawns one tick per session. A session that is locked right now, for
/// instance by a send to a slow client, misses this second.
pub fn tick_sessions<S>(games: &Games<S>) -> Vec<JoinHandle<()>>
where
    S: Sink<Message> + Unpin + Send + 'static,
    S::Error: Send,
{
    games
        .iter()
        .map(|entry| {
            let id = entry.key().clone();
            let game = entry.value().clone();
            tokio::spawn(async move {
                match game.try_lock() {
                    Ok(mut game) => game.tick().await,
                    Err(_) => debug!("Session {} busy, skipping tick", id),
                }
            })
        })
        .collect()
}
