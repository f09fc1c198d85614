use std::io;

use thiserror::Error;

/// Errors surfaced by the RouterOS and RADIUS clients.
#[derive(Debug, Error)]
pub enum Error {
    /// The socket could not be opened or connected, or an I/O call failed
    /// or timed out mid-operation.
    #[error("connection error: {0}")]
    Connection(#[from] io::Error),

    /// A malformed frame, or a reply whose shape the protocol does not allow.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The device rejected the login exchange, or never issued a challenge.
    #[error("authentication error: {0}")]
    Authentication(String),

    /// The device answered a command with an explicit trap.
    #[error("device error: {0}")]
    Device(String),

    /// A value too large to frame within the protocol's length limits.
    #[error("encoding error: {0}")]
    Encoding(String),
}

pub type Result<T> = std::result::Result<T, Error>;
