//! Wire-protocol clients for network equipment and AAA infrastructure.
//!
//! Two from-scratch protocol implementations sit at the core of this crate:
//!
//! * [`routeros`]: a client for the RouterOS management API. Length-framed
//!   words grouped into zero-terminated sentences over a persistent TCP
//!   session, with a challenge-response login.
//! * [`radius`]: a RADIUS client in the NAS role. Access-Request and
//!   Accounting-Request packets over UDP, including the RFC 2865
//!   User-Password obfuscation.
//!
//! Both clients are fully blocking and single-owner: one instance owns one
//! socket and issues one operation at a time. Callers that need concurrency
//! create one instance per in-flight operation.

pub mod error;
pub mod radius;
pub mod routeros;

pub use error::{Error, Result};
