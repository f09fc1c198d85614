use std::io;

use byteorder::{ByteOrder, NetworkEndian};
use md5::{Digest, Md5};
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

use crate::error::{Error, Result};
use crate::radius::attribute::Attribute;
use crate::radius::{Decode, Encode};

/// RADIUS packet codes (RFC 2865 §4, RFC 2866 §4).
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromPrimitive, ToPrimitive)]
pub enum Code {
    AccessRequest = 1,
    AccessAccept = 2,
    AccessReject = 3,
    AccountingRequest = 4,
    AccountingResponse = 5,
}

/// Acct-Status-Type values (RFC 2866 §5.1).
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromPrimitive, ToPrimitive)]
pub enum AcctStatus {
    Start = 1,
    Stop = 2,
    InterimUpdate = 3,
}

/// A RADIUS packet.
///
/// ## Wire Format
///
/// ```plaintext
///  1 2 3 4 5 6 7 8  1 2 3 4 5 6 7 8  1 2 3 4 5 6 7 8  1 2 3 4 5 6 7 8
/// +----------------+----------------+----------------+----------------+
/// |      code      |   identifier   |             length              |
/// +----------------+----------------+----------------+----------------+
/// |                                                                   |
/// |                       authenticator (16 bytes)                    |
/// |                                                                   |
/// |                                                                   |
/// +----------------+----------------+----------------+----------------+
/// |  attributes ...
/// +----------------+---
/// ```
///
/// `length` is big-endian and covers the whole packet.
#[derive(Clone, Debug, PartialEq)]
pub struct Packet {
    pub code: Code,
    pub identifier: u8,
    pub authenticator: [u8; 16],
    pub attributes: Vec<Attribute>,
}

/// Header size: code, identifier, length, authenticator.
pub const HEADER_LEN: usize = 20;

impl Packet {
    /// A fresh request packet with a zeroed authenticator.
    pub fn new(code: Code, identifier: u8) -> Self {
        Packet {
            code,
            identifier,
            authenticator: [0u8; 16],
            attributes: Vec::new(),
        }
    }

    pub fn push(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    /// The first attribute with the given type byte, if any.
    pub fn attribute(&self, attr_type: u8) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.attr_type == attr_type)
    }

    /// Fill in the Request Authenticator and return the wire bytes.
    ///
    /// The authenticator is the MD5 of the packet serialized with a zeroed
    /// authenticator field, followed by the shared secret, substituted back
    /// into the header. RFC 2866 prescribes this for Accounting-Request;
    /// RFC 2865 calls for a *random* authenticator on Access-Request, but
    /// the servers this client talks to expect the hashed form on both, so
    /// both use it here. Password attributes must already be obfuscated
    /// against the zeroed authenticator before sealing.
    pub fn seal(&mut self, secret: &[u8]) -> Vec<u8> {
        self.authenticator = [0u8; 16];
        let mut wire = self.to_bytes();

        let mut hasher = Md5::new();
        hasher.update(&wire);
        hasher.update(secret);
        let digest: [u8; 16] = hasher.finalize().into();

        wire[4..HEADER_LEN].copy_from_slice(&digest);
        self.authenticator = digest;
        wire
    }
}

impl Encode for Packet {
    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        buf.push(self.code as u8);
        buf.push(self.identifier);
        let mut length = [0u8; 2];
        NetworkEndian::write_u16(&mut length, self.encoded_len() as u16);
        buf.extend_from_slice(&length);
        buf.extend_from_slice(&self.authenticator);
        for attribute in &self.attributes {
            buf.extend_from_slice(&attribute.to_bytes());
        }
        buf
    }

    fn to_writer<W: io::Write>(&self, mut w: W) -> io::Result<usize> {
        w.write_all(&self.to_bytes())?;
        Ok(self.encoded_len())
    }

    fn encoded_len(&self) -> usize {
        HEADER_LEN + self.attributes.iter().map(Encode::encoded_len).sum::<usize>()
    }
}

impl Decode for Packet {
    fn from_reader<R: io::Read>(mut rdr: R) -> Result<Self> {
        let mut header = [0u8; HEADER_LEN];
        rdr.read_exact(&mut header).map_err(short_packet)?;

        let code = Code::from_u8(header[0])
            .ok_or_else(|| Error::Protocol(format!("unknown packet code {}", header[0])))?;
        let identifier = header[1];
        let length = NetworkEndian::read_u16(&header[2..4]) as usize;
        if length < HEADER_LEN {
            return Err(Error::Protocol(format!(
                "packet length {} is below the {}-byte header",
                length, HEADER_LEN
            )));
        }
        let mut authenticator = [0u8; 16];
        authenticator.copy_from_slice(&header[4..HEADER_LEN]);

        // Attributes occupy exactly the bytes the length field promises;
        // datagram padding past it is ignored per RFC 2865 §3.
        let mut body = vec![0u8; length - HEADER_LEN];
        rdr.read_exact(&mut body).map_err(short_packet)?;
        let mut attributes = Vec::new();
        let mut rest = &body[..];
        while !rest.is_empty() {
            let attribute = Attribute::from_reader(&mut rest)?;
            attributes.push(attribute);
        }

        Ok(Packet {
            code,
            identifier,
            authenticator,
            attributes,
        })
    }
}

fn short_packet(e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        Error::Protocol("packet truncated".to_string())
    } else {
        Error::Connection(e)
    }
}
