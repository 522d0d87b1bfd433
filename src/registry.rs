#![cfg(feature = "std")]
//! Live session tracking and the periodic cleanup sweep.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant};

use crate::player::PlayerId;
use crate::session::{GameSession, SessionId, SessionSummary};

struct SessionEntry {
    players: [PlayerId; 2],
    started: Instant,
    handle: JoinHandle<SessionSummary>,
}

/// Sessions spawned by the matchmaker, each on its own task.
///
/// A finished session announces itself on an internal channel; [`sweep`]
/// drains that channel and drops the finished entries.
///
/// [`sweep`]: SessionRegistry::sweep
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, SessionEntry>>,
    ended_tx: mpsc::UnboundedSender<SessionId>,
    ended_rx: Mutex<mpsc::UnboundedReceiver<SessionId>>,
    next_id: AtomicU64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        let (ended_tx, ended_rx) = mpsc::unbounded_channel();
        Self {
            sessions: Mutex::new(HashMap::new()),
            ended_tx,
            ended_rx: Mutex::new(ended_rx),
            next_id: AtomicU64::new(1),
        }
    }

    /// Allocate the id for the next session.
    pub fn next_id(&self) -> SessionId {
        SessionId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Spawn `session` on its own task and track it until swept.
    pub fn launch(&self, session: GameSession) -> SessionId {
        let id = session.id();
        let players = session.player_ids();
        let ended = self.ended_tx.clone();
        let handle = tokio::spawn(async move {
            let summary = session.run().await;
            let _ = ended.send(id);
            summary
        });
        let entry = SessionEntry {
            players,
            started: Instant::now(),
            handle,
        };
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, entry);
        debug!("{} registered for {} and {}", id, players[0], players[1]);
        id
    }

    /// Number of sessions not yet reclaimed.
    pub fn active_count(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&id)
    }

    /// Remove every finished session and return their summaries.
    ///
    /// Sessions whose task ended without announcing itself (a panic) are
    /// reclaimed as well, without a summary.
    pub async fn sweep(&self) -> Vec<SessionSummary> {
        let mut ended = Vec::new();
        {
            let mut rx = self.ended_rx.lock().unwrap_or_else(PoisonError::into_inner);
            while let Ok(id) = rx.try_recv() {
                ended.push(id);
            }
        }

        let finished: Vec<SessionEntry> = {
            let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
            let stale: Vec<SessionId> = sessions
                .iter()
                .filter(|(id, entry)| ended.contains(*id) || entry.handle.is_finished())
                .map(|(id, _)| *id)
                .collect();
            stale.iter().filter_map(|id| sessions.remove(id)).collect()
        };

        let mut summaries = Vec::with_capacity(finished.len());
        for entry in finished {
            let players = entry.players;
            let lifetime = entry.started.elapsed();
            match entry.handle.await {
                Ok(summary) => {
                    debug!("reclaimed {} after {:?}", summary.id, lifetime);
                    summaries.push(summary);
                }
                Err(e) => warn!(
                    "session for {} and {} ended abnormally: {}",
                    players[0], players[1], e
                ),
            }
        }
        summaries
    }

    /// Abort every tracked session. Used on shutdown.
    pub fn abort_all(&self) {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        for (id, entry) in sessions.drain() {
            debug!("aborting {}", id);
            entry.handle.abort();
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Sweep `registry` every `period` until `shutdown` flips.
pub async fn run_cleanup(
    registry: Arc<SessionRegistry>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval(period);
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.changed() => break,
        }
        let reclaimed = registry.sweep().await;
        if !reclaimed.is_empty() {
            info!(
                "cleanup reclaimed {} session(s), {} still active",
                reclaimed.len(),
                registry.active_count()
            );
        }
    }
    debug!("cleanup loop stopped");
}
