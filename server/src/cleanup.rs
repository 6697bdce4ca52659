use tokio::time;
use tracing::{debug, info};

use crate::{config::CleanupConfig, logic::Games};

pub async fn start_cleanup_task(games: Games, config: CleanupConfig) {
    let mut interval = time::interval(config.interval);

    info!(
        "Started session cleanup: checking every {}s, inactive timeout: {}s, active timeout: {}s",
        config.interval.as_secs(),
        config.inactive_timeout_secs,
        config.active_timeout_secs
    );

    loop {
        interval.tick().await;
        cleanup_games(&games, &config);
    }
}

fn cleanup_games(games: &Games, config: &CleanupConfig) {
    // Sessions that are locked right now are in use and skipped this round.
    let expired: Vec<String> = games
        .iter()
        .filter(|entry| {
            entry.value().try_lock().is_ok_and(|game| {
                game.should_cleanup(config.inactive_timeout_secs, config.active_timeout_secs)
            })
        })
        .map(|entry| entry.key().clone())
        .collect();

    for id in &expired {
        games.remove(id);
        debug!("Cleaned up session: {}", id);
    }

    if !expired.is_empty() {
        info!("Cleaned up {} expired sessions", expired.len());
    }
}
