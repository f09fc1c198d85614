use std::io;
use std::net::Ipv4Addr;

use byteorder::{ByteOrder, NetworkEndian};
use num_derive::{FromPrimitive, ToPrimitive};

use crate::error::{Error, Result};
use crate::radius::{Decode, Encode};

/// Attribute type codes this client sends (RFC 2865 §5, RFC 2866 §5).
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromPrimitive, ToPrimitive)]
pub enum AttributeType {
    UserName = 1,
    UserPassword = 2,
    NasIpAddress = 4,
    AcctStatusType = 40,
    AcctInputOctets = 42,
    AcctOutputOctets = 43,
    AcctSessionId = 44,
    AcctSessionTime = 46,
}

/// A RADIUS attribute-value pair.
///
/// ## Wire Format
///
/// ```plaintext
///  1 2 3 4 5 6 7 8  1 2 3 4 5 6 7 8  1 2 3 4 5 6 7 8
/// +----------------+----------------+----------------+---
/// |      type      |     length     |   value ...
/// +----------------+----------------+----------------+---
/// ```
///
/// `length` counts the two header bytes, so a value may carry at most
/// [`Attribute::MAX_VALUE_LEN`] bytes.
///
/// The type is kept as the raw byte so attributes a server sends back that
/// this client never emits still decode.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Attribute {
    pub attr_type: u8,
    pub value: Vec<u8>,
}

impl Attribute {
    /// Largest value that fits the one-byte length field (255 minus the
    /// two header bytes).
    pub const MAX_VALUE_LEN: usize = 253;

    pub fn new(attr_type: AttributeType, value: Vec<u8>) -> Result<Self> {
        if value.len() > Self::MAX_VALUE_LEN {
            return Err(Error::Encoding(format!(
                "attribute value of {} bytes exceeds the {}-byte limit",
                value.len(),
                Self::MAX_VALUE_LEN
            )));
        }
        Ok(Attribute {
            attr_type: attr_type as u8,
            value,
        })
    }

    /// A text-valued attribute such as User-Name.
    pub fn text(attr_type: AttributeType, value: &str) -> Result<Self> {
        Self::new(attr_type, value.as_bytes().to_vec())
    }

    /// A 32-bit big-endian integer attribute such as Acct-Session-Time.
    pub fn integer(attr_type: AttributeType, value: u32) -> Result<Self> {
        let mut buf = [0u8; 4];
        NetworkEndian::write_u32(&mut buf, value);
        Self::new(attr_type, buf.to_vec())
    }

    /// An IPv4 address attribute such as NAS-IP-Address.
    pub fn address(attr_type: AttributeType, value: Ipv4Addr) -> Result<Self> {
        Self::new(attr_type, value.octets().to_vec())
    }
}

impl Encode for Attribute {
    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        buf.push(self.attr_type);
        buf.push(self.encoded_len() as u8);
        buf.extend_from_slice(&self.value);
        buf
    }

    fn to_writer<W: io::Write>(&self, mut w: W) -> io::Result<usize> {
        w.write_all(&self.to_bytes())?;
        Ok(self.encoded_len())
    }

    fn encoded_len(&self) -> usize {
        2 + self.value.len()
    }
}

impl Decode for Attribute {
    fn from_reader<R: io::Read>(mut rdr: R) -> Result<Self> {
        let mut header = [0u8; 2];
        rdr.read_exact(&mut header).map_err(short_attribute)?;
        let (attr_type, length) = (header[0], header[1] as usize);
        if length < 2 {
            return Err(Error::Protocol(format!(
                "attribute length {} is below the 2-byte header",
                length
            )));
        }
        let mut value = vec![0u8; length - 2];
        rdr.read_exact(&mut value).map_err(short_attribute)?;
        Ok(Attribute { attr_type, value })
    }
}

fn short_attribute(e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        Error::Protocol("attribute truncated".to_string())
    } else {
        Error::Connection(e)
    }
}
