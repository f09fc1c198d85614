//! RADIUS client in the NAS role.
//!
//! Builds and parses Authentication and Accounting packets per RFC 2865 /
//! RFC 2866 and exchanges them over UDP, one blocking round trip per
//! request.
//!
//! https://www.rfc-editor.org/rfc/rfc2865
//! https://www.rfc-editor.org/rfc/rfc2866

use std::io;

use crate::error::Result;

/// Attribute-value pair encoding.
pub mod attribute;

/// The blocking Authentication/Accounting client.
pub mod client;

/// User-Password obfuscation.
pub mod crypt;

/// Packet header framing and the request authenticator.
pub mod packet;

/// A trait for RADIUS wire structures that can be encoded.
pub trait Encode {
    /// Serialize the data as a vector.
    fn to_bytes(&self) -> Vec<u8>;
    /// Serialize the payload into the IO stream.
    fn to_writer<W: io::Write>(&self, w: W) -> io::Result<usize>;

    /// Return the encoded length of the structure.
    fn encoded_len(&self) -> usize;
}

/// A trait for RADIUS wire structures that can be decoded from bytes.
pub trait Decode {
    fn from_reader<R: io::Read>(rdr: R) -> Result<Self>
    where
        Self: Sized;
}

pub use attribute::{Attribute, AttributeType};
pub use client::RadiusClient;
pub use packet::{AcctStatus, Code, Packet};
