//! Client for the RouterOS management API.
//!
//! The API is a binary sentence protocol over TCP (default port 8728): each
//! word is preceded by a self-describing length prefix, and a sentence is a
//! run of words closed by a zero-length word. Requests are commands such as
//! `/interface/print`; replies arrive as `!re`/`!done`/`!trap` sentences.
//!
//! https://wiki.mikrotik.com/wiki/Manual:API

/// Word-length framing.
pub mod length;

/// Framed words grouped into zero-terminated sentences.
pub mod sentence;

/// A blocking session against one device.
pub mod session;

/// Typed views over query results.
pub mod types;

mod reply;

pub use reply::Record;
pub use session::ManagementSession;
pub use types::{InterfaceStats, InterfaceStatus, PppSession, SystemResource};
