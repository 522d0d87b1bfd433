#![cfg(feature = "std")]
//! Stdout logger for the server binary.

use std::env;
use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

/// Environment variable holding the log level.
pub const LOG_ENV: &str = "SEABATTLE_LOG";

/// Writes `[uptime] LEVEL target: message` lines, uptime in seconds since
/// the logger was installed.
struct ServerLogger {
    started: Instant,
}

impl Log for ServerLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let uptime = self.started.elapsed();
        let mut out = io::stdout().lock();
        let _ = writeln!(
            out,
            "[{:>4}.{:03}] {:<5} {}: {}",
            uptime.as_secs(),
            uptime.subsec_millis(),
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

static LOGGER: OnceLock<ServerLogger> = OnceLock::new();

fn parse_level(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Install the stdout logger at the level named by [`LOG_ENV`]
/// (`error|warn|info|debug|trace|off`, default `info`). Later calls are no-ops.
pub fn init_logging() {
    let level = parse_level(env::var(LOG_ENV).ok().as_deref());
    let logger = LOGGER.get_or_init(|| ServerLogger {
        started: Instant::now(),
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_falls_back_to_info() {
        assert_eq!(parse_level(None), LevelFilter::Info);
        assert_eq!(parse_level(Some("chatty")), LevelFilter::Info);
        assert_eq!(parse_level(Some(" debug\n")), LevelFilter::Debug);
        assert_eq!(parse_level(Some("OFF")), LevelFilter::Off);
    }

    #[test]
    fn init_twice_is_harmless() {
        init_logging();
        init_logging();
        assert!(LOGGER.get().is_some());
    }
}
