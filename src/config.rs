//! Fixed game configuration and server tunables.

use core::time::Duration;

/// Side length of the square grid.
pub const BOARD_SIZE: usize = 10;

/// Number of ships in a fleet.
pub const NUM_SHIPS: usize = 10;

/// Ship sizes placed by auto-placement, largest first.
pub const FLEET: [usize; NUM_SHIPS] = [4, 3, 3, 2, 2, 2, 1, 1, 1, 1];

/// Total number of ship segments in [`FLEET`].
pub const TOTAL_SHIP_CELLS: usize = 4 + 3 + 3 + 2 + 2 + 2 + 1 + 1 + 1 + 1;

/// Random anchor samples tried for one ship before the whole layout is discarded.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 100;

/// Upper bound on whole-board restarts during auto-placement.
pub const MAX_LAYOUT_RESETS: usize = 1000;

/// Longest accepted client command line, in bytes.
pub const MAX_LINE_LEN: usize = 256;

pub const DEFAULT_PORT: u16 = 12345;

/// How long the acting player may take to send a shot.
pub const RECV_TIMEOUT: Duration = Duration::from_secs(300);

pub const PAIRING_INTERVAL: Duration = Duration::from_millis(100);

pub const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Give up on a session whose players never both become ready.
pub const READY_TIMEOUT: Duration = Duration::from_secs(30);

pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(5);

/// Pause between retries while the socket send buffer is full.
pub const SEND_BACKOFF: Duration = Duration::from_millis(10);

/// Runtime settings for the server loops.
///
/// Only `port` is exposed on the command line; every other field defaults to the
/// constants above. Tests shorten the intervals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub recv_timeout: Duration,
    pub pairing_interval: Duration,
    pub ready_poll_interval: Duration,
    pub ready_timeout: Duration,
    pub cleanup_interval: Duration,
}

impl ServerConfig {
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Self::default()
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            recv_timeout: RECV_TIMEOUT,
            pairing_interval: PAIRING_INTERVAL,
            ready_poll_interval: READY_POLL_INTERVAL,
            ready_timeout: READY_TIMEOUT,
            cleanup_interval: CLEANUP_INTERVAL,
        }
    }
}
