// src/logging.rs
// tracing subscriber setup for hosts that don't install their own

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Parse a level name, falling back to INFO
pub fn parse_level(level: &str) -> Level {
    level.trim().parse::<Level>().unwrap_or(Level::INFO)
}

/// Install a stderr fmt subscriber as the global default.
///
/// Returns false when a global subscriber is already set (e.g. by the host),
/// in which case the existing one is kept.
pub fn init(level: &str) -> bool {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(level))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).is_ok()
}
