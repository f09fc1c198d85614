use std::io;

use crate::error::{Error, Result};
use crate::routeros::length;

/// Frame the words and write them as one sentence.
///
/// The whole sentence, including its zero-length terminator, is assembled in
/// memory and written with a single call so a sentence is never interleaved
/// with another writer's bytes.
pub fn write_sentence<W: io::Write, S: AsRef<str>>(w: &mut W, words: &[S]) -> Result<()> {
    let mut buf = Vec::new();
    for word in words {
        let word = word.as_ref().as_bytes();
        buf.extend_from_slice(&length::encode_length(word.len() as u32));
        buf.extend_from_slice(word);
    }
    buf.push(0);
    w.write_all(&buf)?;
    w.flush()?;
    Ok(())
}

/// Read framed words until the zero-length terminator.
///
/// A stream that ends cleanly before the first word yields an empty
/// sentence. A stream that ends anywhere else (inside a length prefix or
/// inside a word) is a truncated frame and fails with a protocol error.
pub fn read_sentence<R: io::Read>(rdr: &mut R) -> Result<Vec<String>> {
    let mut words = Vec::new();
    loop {
        let len = if words.is_empty() {
            match length::read_length_or_eof(rdr)? {
                Some(len) => len,
                None => return Ok(words),
            }
        } else {
            length::read_length(rdr)?
        };
        if len == 0 {
            return Ok(words);
        }
        words.push(read_word(rdr, len as usize)?);
    }
}

fn read_word<R: io::Read>(rdr: &mut R, len: usize) -> Result<String> {
    let mut buf = vec![0u8; len];
    rdr.read_exact(&mut buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::Protocol("connection closed inside a word".to_string())
        } else {
            Error::Connection(e)
        }
    })?;
    String::from_utf8(buf).map_err(|_| Error::Protocol("word is not valid UTF-8".to_string()))
}
