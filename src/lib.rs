#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod board;
mod common;
mod config;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod matchmaking;
#[cfg(feature = "std")]
mod player;
pub mod protocol;
#[cfg(feature = "std")]
pub mod registry;
#[cfg(feature = "std")]
pub mod server;
#[cfg(feature = "std")]
pub mod session;
mod ship;
#[cfg(feature = "std")]
pub mod transport;

pub use board::*;
pub use common::*;
pub use config::*;
#[cfg(feature = "std")]
pub use logging::init_logging;
#[cfg(feature = "std")]
pub use matchmaking::{confirm_pair, pair_waiting, run_matchmaker, MatchmakingQueue};
#[cfg(feature = "std")]
pub use player::*;
pub use protocol::{parse_shot, GameOverReason, InputError, ParseError, ServerMessage};
#[cfg(feature = "std")]
pub use registry::{run_cleanup, SessionRegistry};
#[cfg(feature = "std")]
pub use server::{ConnectionAcceptor, Server};
#[cfg(feature = "std")]
pub use session::{EndReason, GameSession, SessionId, SessionStatus, SessionSummary};
pub use ship::*;
#[cfg(feature = "std")]
pub use transport::{in_memory::InMemoryTransport, tcp::TcpTransport, Transport};
