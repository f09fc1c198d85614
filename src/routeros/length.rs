use std::io;

use byteorder::{NetworkEndian, ReadBytesExt};

use crate::error::{Error, Result};

/// Encode a word length as its 1 to 5 byte wire prefix.
///
/// The high bits of the first byte select the width:
///
/// ```plaintext
/// 0xxxxxxx                     len <= 0x7F
/// 10xxxxxx + 1 byte            len <= 0x3FFF
/// 110xxxxx + 2 bytes           len <= 0x1FFFFF
/// 1110xxxx + 3 bytes           len <= 0xFFFFFFF
/// 11110000 + 4 bytes           anything larger
/// ```
///
/// Continuation bytes are big-endian.
pub fn encode_length(len: u32) -> Vec<u8> {
    if len < 0x80 {
        vec![len as u8]
    } else if len < 0x4000 {
        vec![0x80 | (len >> 8) as u8, len as u8]
    } else if len < 0x20_0000 {
        vec![0xC0 | (len >> 16) as u8, (len >> 8) as u8, len as u8]
    } else if len < 0x1000_0000 {
        vec![
            0xE0 | (len >> 24) as u8,
            (len >> 16) as u8,
            (len >> 8) as u8,
            len as u8,
        ]
    } else {
        vec![
            0xF0,
            (len >> 24) as u8,
            (len >> 16) as u8,
            (len >> 8) as u8,
            len as u8,
        ]
    }
}

/// Read a length prefix, returning `None` on a clean end-of-stream before
/// the first byte.
///
/// A zero length is a valid result and terminates the enclosing sentence.
pub fn read_length_or_eof(rdr: &mut impl io::Read) -> Result<Option<u32>> {
    let first = match read_first_byte(rdr)? {
        Some(b) => b,
        None => return Ok(None),
    };
    decode_rest(first, rdr).map(Some)
}

/// Read a length prefix where end-of-stream is not acceptable.
pub fn read_length(rdr: &mut impl io::Read) -> Result<u32> {
    match read_length_or_eof(rdr)? {
        Some(len) => Ok(len),
        None => Err(Error::Protocol("truncated length prefix".to_string())),
    }
}

fn decode_rest(first: u8, rdr: &mut impl io::Read) -> Result<u32> {
    let len = if first < 0x80 {
        u32::from(first)
    } else if first < 0xC0 {
        let mut rest = [0u8; 1];
        read_continuation(rdr, &mut rest)?;
        (u32::from(first & 0x3F) << 8) | u32::from(rest[0])
    } else if first < 0xE0 {
        let mut rest = [0u8; 2];
        read_continuation(rdr, &mut rest)?;
        (u32::from(first & 0x1F) << 16) | (u32::from(rest[0]) << 8) | u32::from(rest[1])
    } else if first < 0xF0 {
        let mut rest = [0u8; 3];
        read_continuation(rdr, &mut rest)?;
        (u32::from(first & 0x0F) << 24)
            | (u32::from(rest[0]) << 16)
            | (u32::from(rest[1]) << 8)
            | u32::from(rest[2])
    } else if first == 0xF0 {
        rdr.read_u32::<NetworkEndian>().map_err(truncated)?
    } else {
        // 0xF1..=0xFF are reserved for control words, never a length.
        return Err(Error::Protocol(format!(
            "reserved length prefix 0x{:02x}",
            first
        )));
    };
    Ok(len)
}

fn read_first_byte(rdr: &mut impl io::Read) -> Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match rdr.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::Connection(e)),
        }
    }
}

fn read_continuation(rdr: &mut impl io::Read, buf: &mut [u8]) -> Result<()> {
    rdr.read_exact(buf).map_err(truncated)
}

fn truncated(e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        Error::Protocol("truncated length prefix".to_string())
    } else {
        Error::Connection(e)
    }
}
