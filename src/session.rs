#![cfg(feature = "std")]
//! One match between two players: setup, ready wait, turn loop, teardown.

use core::fmt;

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::time::{interval, sleep_until, Instant};

use crate::{
    common::ShotOutcome,
    config::{ServerConfig, FLEET},
    player::{Player, PlayerId},
    protocol::{parse_shot, GameOverReason, InputError, ServerMessage},
};

/// Identity of a session, unique for the server's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Protocol state. `Over` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Setup,
    AwaitingReady,
    InProgress,
    Over,
}

/// Why a session reached [`SessionStatus::Over`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Victory { winner: PlayerId },
    DisconnectedDuringSetup,
    Disconnected { player: PlayerId },
    /// The acting player did not send a shot before the receive deadline.
    TimedOut { player: PlayerId },
    ReadyTimeout,
    PlacementFailed,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::Victory { winner } => write!(f, "player {} won", winner),
            EndReason::DisconnectedDuringSetup => write!(f, "disconnected during setup"),
            EndReason::Disconnected { player } => write!(f, "player {} disconnected", player),
            EndReason::TimedOut { player } => write!(f, "player {} timed out", player),
            EndReason::ReadyTimeout => write!(f, "players not ready in time"),
            EndReason::PlacementFailed => write!(f, "automatic ship placement failed"),
        }
    }
}

/// Final record of a session, returned when it ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: SessionId,
    pub players: [PlayerId; 2],
    pub reason: EndReason,
    /// Resolved shots, repeats included, invalid coordinates excluded.
    pub shots: usize,
}

impl SessionSummary {
    pub fn winner(&self) -> Option<PlayerId> {
        match self.reason {
            EndReason::Victory { winner } => Some(winner),
            _ => None,
        }
    }
}

/// A match between exactly two players. The first player moves first.
///
/// The session owns both players; nothing else touches their boards while it
/// runs, so the turn loop needs no locking.
pub struct GameSession {
    id: SessionId,
    players: [Player; 2],
    turn: usize,
    status: SessionStatus,
    config: ServerConfig,
    seeds: Option<[u64; 2]>,
    shots: usize,
}

impl GameSession {
    pub fn new(id: SessionId, first: Player, second: Player, config: ServerConfig) -> Self {
        Self {
            id,
            players: [first, second],
            turn: 0,
            status: SessionStatus::Setup,
            config,
            seeds: None,
            shots: 0,
        }
    }

    /// Fix the placement RNG seeds for reproducible layouts.
    pub fn with_seeds(mut self, seeds: [u64; 2]) -> Self {
        self.seeds = Some(seeds);
        self
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn player_ids(&self) -> [PlayerId; 2] {
        [self.players[0].id(), self.players[1].id()]
    }

    /// Drive the session to completion and release both connections.
    pub async fn run(mut self) -> SessionSummary {
        info!(
            "{} started: {} vs {}",
            self.id,
            self.players[0].name(),
            self.players[1].name()
        );
        let reason = match self.play().await {
            Ok(reason) | Err(reason) => reason,
        };
        self.finish(reason).await
    }

    async fn play(&mut self) -> Result<EndReason, EndReason> {
        self.setup().await?;
        self.transition(SessionStatus::AwaitingReady);
        self.await_ready().await?;
        self.transition(SessionStatus::InProgress);
        self.start().await?;
        Ok(self.turn_loop().await)
    }

    fn transition(&mut self, next: SessionStatus) {
        if self.status == SessionStatus::Over {
            warn!("{} ignoring transition to {:?} after game over", self.id, next);
            return;
        }
        debug!("{} {:?} -> {:?}", self.id, self.status, next);
        self.status = next;
    }

    /// Place both fleets concurrently.
    async fn setup(&mut self) -> Result<(), EndReason> {
        let seeds = self.seeds;
        let [first, second] = &mut self.players;
        let (a, b) = tokio::join!(
            setup_player(first, seeds.map(|s| s[0])),
            setup_player(second, seeds.map(|s| s[1])),
        );
        if !first.is_connected() || !second.is_connected() {
            return Err(EndReason::DisconnectedDuringSetup);
        }
        a.and(b)
    }

    async fn await_ready(&mut self) -> Result<(), EndReason> {
        let deadline = Instant::now() + self.config.ready_timeout;
        let mut ticker = interval(self.config.ready_poll_interval);
        loop {
            if let Some(gone) = self.players.iter().find(|p| !p.is_connected()) {
                return Err(EndReason::Disconnected { player: gone.id() });
            }
            if self.players.iter().all(Player::is_ready) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(EndReason::ReadyTimeout);
            }
            ticker.tick().await;
        }
    }

    async fn start(&mut self) -> Result<(), EndReason> {
        let msg = ServerMessage::GameStarted {
            first: self.players[self.turn].name().to_string(),
        };
        for player in &mut self.players {
            if player.send(&msg).await.is_err() {
                return Err(EndReason::Disconnected { player: player.id() });
            }
        }
        Ok(())
    }

    /// Alternate turns until a fleet is destroyed or a connection fails.
    async fn turn_loop(&mut self) -> EndReason {
        loop {
            let (current, other) = split_turn(&mut self.players, self.turn);

            if current.send(&current.your_turn()).await.is_err() {
                return EndReason::Disconnected { player: current.id() };
            }
            if other.send(&other.opponent_turn()).await.is_err() {
                return EndReason::Disconnected { player: other.id() };
            }

            let deadline = Instant::now() + self.config.recv_timeout;
            let (x, y, outcome) = loop {
                let line = match next_command(current, other, deadline).await {
                    Ok(line) => line,
                    Err(reason) => return reason,
                };
                let error = match parse_shot(&line) {
                    Ok((x, y)) => match current.fire_at(other, x, y) {
                        ShotOutcome::OutOfBounds => InputError::InvalidCoordinates,
                        outcome => break (x, y, outcome),
                    },
                    Err(e) => {
                        debug!("{} rejected {:?} from {}: {}", self.id, line, current.name(), e);
                        InputError::InvalidFormat
                    }
                };
                if current.send(&ServerMessage::Error(error)).await.is_err()
                    || current.send(&current.your_turn()).await.is_err()
                {
                    return EndReason::Disconnected { player: current.id() };
                }
            };

            self.shots += 1;
            debug!("{} {} fired at ({},{}): {:?}", self.id, current.name(), x, y, outcome);
            let result = ServerMessage::ShotResult {
                shooter: current.name().to_string(),
                x,
                y,
                outcome,
            };
            if current.send(&result).await.is_err() {
                return EndReason::Disconnected { player: current.id() };
            }
            if other.send(&result).await.is_err() {
                return EndReason::Disconnected { player: other.id() };
            }

            if other.board().is_defeated() {
                return EndReason::Victory { winner: current.id() };
            }
            if outcome.switches_turn() {
                self.turn = 1 - self.turn;
            }
        }
    }

    /// Announce the result to whoever is still connected, then close both
    /// connections.
    async fn finish(mut self, reason: EndReason) -> SessionSummary {
        self.transition(SessionStatus::Over);
        for player in &mut self.players {
            let id = player.id();
            let farewell = match reason {
                EndReason::Victory { winner } if winner == id => GameOverReason::Victory,
                EndReason::Victory { .. } => GameOverReason::Defeat,
                EndReason::DisconnectedDuringSetup => GameOverReason::DisconnectedDuringSetup,
                EndReason::Disconnected { .. } => GameOverReason::OpponentDisconnected,
                EndReason::TimedOut { player } if player == id => GameOverReason::TurnTimeout,
                EndReason::TimedOut { .. } => GameOverReason::OpponentDisconnected,
                EndReason::ReadyTimeout => GameOverReason::ReadyTimeout,
                EndReason::PlacementFailed => GameOverReason::SetupFailed,
            };
            if player.is_connected() {
                player.notify(&ServerMessage::GameOver(farewell)).await;
            }
            player.disconnect().await;
        }
        info!("{} over after {} shots: {}", self.id, self.shots, reason);
        SessionSummary {
            id: self.id,
            players: self.player_ids(),
            reason,
            shots: self.shots,
        }
    }
}

/// (acting player, waiting player).
fn split_turn(players: &mut [Player; 2], turn: usize) -> (&mut Player, &mut Player) {
    let [first, second] = players;
    if turn == 0 {
        (first, second)
    } else {
        (second, first)
    }
}

async fn setup_player(player: &mut Player, seed: Option<u64>) -> Result<(), EndReason> {
    let disconnected = |_| EndReason::DisconnectedDuringSetup;
    player
        .send(&ServerMessage::PlacingShips)
        .await
        .map_err(disconnected)?;

    let mut rng = match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_rng(&mut rand::rng()),
    };
    let resets = player.auto_place(&mut rng, &FLEET).map_err(|e| {
        warn!("placement for {} failed: {}", player.name(), e);
        EndReason::PlacementFailed
    })?;
    debug!("placed fleet for {} after {} resets", player.name(), resets);

    let board = player.board().render(true);
    player
        .send(&ServerMessage::ShipsPlaced { board })
        .await
        .map_err(disconnected)?;
    player.set_ready(true);
    player
        .send(&ServerMessage::AwaitingOpponent)
        .await
        .map_err(disconnected)?;
    Ok(())
}

/// Wait for the acting player's next line.
///
/// The waiting player's connection is watched at the same time: a line from
/// them is answered with an error, and a failure on either side ends the
/// session.
async fn next_command(
    current: &mut Player,
    other: &mut Player,
    deadline: Instant,
) -> Result<String, EndReason> {
    loop {
        tokio::select! {
            line = current.recv() => {
                return line.map_err(|_| EndReason::Disconnected { player: current.id() });
            }
            line = other.recv() => match line {
                Ok(_) => {
                    let msg = ServerMessage::Error(InputError::NotYourTurn);
                    if other.send(&msg).await.is_err() {
                        return Err(EndReason::Disconnected { player: other.id() });
                    }
                }
                Err(_) => return Err(EndReason::Disconnected { player: other.id() }),
            },
            _ = sleep_until(deadline) => {
                return Err(EndReason::TimedOut { player: current.id() });
            }
        }
    }
}
