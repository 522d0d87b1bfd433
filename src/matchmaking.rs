#![cfg(feature = "std")]
//! FIFO queue of players waiting for an opponent, and the pairing loop.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::time::interval;

use crate::{
    config::ServerConfig,
    player::{Player, PlayerId},
    protocol::{GameOverReason, ServerMessage},
    registry::SessionRegistry,
    session::{GameSession, SessionId},
};

/// Players awaiting pairing, oldest first.
#[derive(Default)]
pub struct MatchmakingQueue {
    waiting: Mutex<VecDeque<Player>>,
}

impl MatchmakingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, player: Player) {
        let mut waiting = self.waiting.lock().unwrap_or_else(PoisonError::into_inner);
        debug!("{} ({}) queued at position {}", player.name(), player.id(), waiting.len() + 1);
        waiting.push_back(player);
    }

    pub fn len(&self) -> usize {
        self.waiting.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of the queued players, oldest first.
    pub fn waiting_ids(&self) -> Vec<PlayerId> {
        self.waiting
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(Player::id)
            .collect()
    }

    /// Take the two oldest players, or nothing if fewer than two are waiting.
    pub fn pop_pair(&self) -> Option<(Player, Player)> {
        let mut waiting = self.waiting.lock().unwrap_or_else(PoisonError::into_inner);
        if waiting.len() < 2 {
            return None;
        }
        let first = waiting.pop_front()?;
        let second = waiting.pop_front()?;
        Some((first, second))
    }
}

/// Tell both players they were matched.
///
/// Both connections are probed first, so a player who left while queued is
/// caught before anyone hears about the match. If either is gone, the other
/// gets a game-over notice and both are dropped.
pub async fn confirm_pair(mut first: Player, mut second: Player) -> Option<(Player, Player)> {
    let first_alive = first.check_alive();
    let second_alive = second.check_alive();
    let first_ok = first_alive
        && second_alive
        && first
            .send(&ServerMessage::MatchFound {
                opponent: second.name().to_string(),
            })
            .await
            .is_ok();
    let second_ok = first_ok
        && second
            .send(&ServerMessage::MatchFound {
                opponent: first.name().to_string(),
            })
            .await
            .is_ok();
    if first_ok && second_ok {
        return Some((first, second));
    }

    warn!(
        "discarding pair {} / {}: a player disconnected while queued",
        first.name(),
        second.name()
    );
    for player in [&mut first, &mut second] {
        if player.is_connected() {
            player
                .notify(&ServerMessage::GameOver(GameOverReason::OpponentLeftBeforeStart))
                .await;
        }
        player.disconnect().await;
    }
    None
}

/// Pair everyone currently pairable and launch their sessions.
pub async fn pair_waiting(
    queue: &MatchmakingQueue,
    registry: &SessionRegistry,
    config: &ServerConfig,
) -> Vec<SessionId> {
    let mut launched = Vec::new();
    while let Some((first, second)) = queue.pop_pair() {
        let Some((first, second)) = confirm_pair(first, second).await else {
            continue;
        };
        let session = GameSession::new(registry.next_id(), first, second, config.clone());
        info!(
            "paired {} with {} in {}",
            session.player_ids()[0],
            session.player_ids()[1],
            session.id()
        );
        launched.push(registry.launch(session));
    }
    launched
}

/// Poll the queue every `pairing_interval` until `shutdown` flips.
pub async fn run_matchmaker(
    queue: Arc<MatchmakingQueue>,
    registry: Arc<SessionRegistry>,
    config: ServerConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval(config.pairing_interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.changed() => break,
        }
        pair_waiting(&queue, &registry, &config).await;
    }
    debug!("matchmaker stopped with {} player(s) queued", queue.len());
}
