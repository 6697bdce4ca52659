use std::{collections::HashMap, sync::Arc, time::Instant};

use dashmap::DashMap;
use minesweeper_common::{
    models::{Difficulty, Pos},
    protocol::{CellUpdate, ClientMessage, ServerMessage},
};
use minesweeper_engine::{
    ConfigError, GameError, GameSession, Limits, RevealOutcome, SaveGame,
};
use rocket::futures::{Sink, SinkExt, future::join_all, stream::SplitSink};
use rocket_ws::{Message, stream::DuplexStream};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Write half of a client's WebSocket.
pub type WsSink = SplitSink<DuplexStream, Message>;

pub type Games<S = WsSink> = Arc<DashMap<String, Arc<Mutex<Game<S>>>>>;

/// A hosted session and the connections watching it.
pub struct Game<S = WsSink> {
    session: GameSession,
    streams: HashMap<Uuid, S>,
    created_at: Instant,
    last_activity: Instant,
}

async fn send<S: Sink<Message> + Unpin>(stream: &mut S, message: &ServerMessage) {
    if let Ok(text) = serde_json::to_string(message) {
        let _ = stream.send(Message::Text(text)).await;
    }
}

async fn broadcast<S: Sink<Message> + Unpin>(streams: &mut HashMap<Uuid, S>, message: &ServerMessage) {
    let futures: Vec<_> = streams
        .iter_mut()
        .map(|(_, stream)| send(stream, message))
        .collect();

    join_all(futures).await;
}

fn init_message(session: &GameSession) -> ServerMessage {
    let params = session.params();
    ServerMessage::Init {
        width: params.width,
        height: params.height,
        mines: params.mines,
        mines_remaining: session.mines_remaining(),
        elapsed: session.elapsed_seconds(),
        outcome: session.outcome(),
        field: session.view(),
    }
}

impl<S: Sink<Message> + Unpin> Game<S> {
    pub fn new(session: GameSession) -> Self {
        let now = Instant::now();
        Self {
            session,
            streams: HashMap::new(),
            created_at: now,
            last_activity: now,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn save(&mut self) -> SaveGame {
        self.last_activity = Instant::now();
        self.session.save()
    }

    #[instrument(level = "trace", skip(self, limits))]
    pub async fn restart(
        &mut self,
        difficulty: Difficulty,
        limits: &Limits,
    ) -> Result<(), ConfigError> {
        self.session = GameSession::from_difficulty(&difficulty, limits)?;
        self.last_activity = Instant::now();
        broadcast(&mut self.streams, &init_message(&self.session)).await;
        info!(
            "Game restarted as {} and broadcast to {} connections",
            difficulty,
            self.streams.len()
        );
        Ok(())
    }

    #[instrument(level = "trace", skip(self, stream))]
    pub async fn add_stream(&mut self, mut stream: S) -> Uuid {
        let id = Uuid::new_v4();
        send(&mut stream, &init_message(&self.session)).await;
        self.streams.insert(id, stream);
        self.last_activity = Instant::now();
        info!(
            "Stream {} added, total connections: {}",
            id,
            self.streams.len()
        );
        id
    }

    #[instrument(level = "trace", skip(self))]
    pub async fn remove_stream(&mut self, id: &Uuid) {
        if self.streams.remove(id).is_some() {
            info!(
                "Stream {} removed, remaining connections: {}",
                id,
                self.streams.len()
            );
        } else {
            warn!("Attempted to remove non-existent stream: {}", id);
        }
        self.last_activity = Instant::now();
    }

    /// Tells one connection why its request was refused.
    pub async fn reject(&mut self, id: &Uuid, error: &GameError) {
        debug!("Rejecting request from stream {}: {}", id, error);
        if let Some(stream) = self.streams.get_mut(id) {
            send(
                stream,
                &ServerMessage::Error {
                    message: error.to_string(),
                },
            )
            .await;
        }
    }

    pub fn has_active_connections(&self) -> bool {
        !self.streams.is_empty()
    }

    /// Abandoned sessions go after `inactive_timeout_secs`; any session goes
    /// after `active_timeout_secs`, connected or not.
    pub fn should_cleanup(&self, inactive_timeout_secs: u64, active_timeout_secs: u64) -> bool {
        if self.created_at.elapsed().as_secs() > active_timeout_secs {
            return true;
        }

        if self.has_active_connections() {
            return false;
        }

        self.last_activity.elapsed().as_secs() > inactive_timeout_secs
    }

    /// Advances the session clock while someone is watching.
    pub async fn tick(&mut self) {
        if !self.has_active_connections() {
            return;
        }

        if let Some(elapsed) = self.session.tick() {
            broadcast(&mut self.streams, &ServerMessage::Tick { elapsed }).await;
        }
    }

    /// Applies one client request. Results go to every stream; a refusal
    /// goes back to `stream_id` alone.
    #[instrument(level = "trace", skip(self, limits))]
    pub async fn handle(&mut self, stream_id: &Uuid, message: ClientMessage, limits: &Limits) {
        let result = match message {
            ClientMessage::Reveal { pos } => self.reveal(pos).await,
            ClientMessage::Flag { pos } => self.flag(pos).await,
            ClientMessage::Restart { difficulty } => {
                self.restart(difficulty, limits).await.map_err(Into::into)
            }
        };

        if let Err(e) = result {
            self.reject(stream_id, &e).await;
        }
    }

    async fn broadcast_updates(&mut self, updates: Vec<CellUpdate>) {
        let message = ServerMessage::Update {
            updates,
            mines_remaining: self.session.mines_remaining(),
            outcome: self.session.outcome(),
        };
        broadcast(&mut self.streams, &message).await;
    }

    #[instrument(level = "trace", skip(self), fields(x = pos.x, y = pos.y))]
    pub async fn flag(&mut self, pos: Pos) -> Result<(), GameError> {
        self.last_activity = Instant::now();

        self.session.handle_flag(pos)?;
        let value = self.session.cell_view(pos)?;
        self.broadcast_updates(vec![CellUpdate { pos, value }]).await;
        Ok(())
    }

    #[instrument(level = "trace", skip(self), fields(x = pos.x, y = pos.y))]
    pub async fn reveal(&mut self, pos: Pos) -> Result<(), GameError> {
        self.last_activity = Instant::now();

        let updates = match self.session.handle_reveal(pos)? {
            RevealOutcome::Revealed(updates) => updates,
            RevealOutcome::MineHit { mines, .. } => {
                info!("Game ended with loss, revealed {} mines", mines.len());
                mines
            }
            RevealOutcome::Ignored => return Ok(()),
        };
        self.broadcast_updates(updates).await;
        Ok(())
    }
}
