use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("unknown level {0}, expected 1 or 2")]
    UnknownLevel(u8),
    #[error("malformed layout: {0}")]
    MalformedLayout(String),
    #[error("shared board lock was poisoned")]
    Poisoned,
    #[error("failed to start {0} task")]
    Spawn(&'static str, #[source] io::Error),
    #[error("{0} task panicked")]
    TaskPanicked(&'static str),
    #[error("terminal I/O failed")]
    Terminal(#[from] io::Error),
}
