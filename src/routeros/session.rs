use std::io;
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::{debug, trace};
use md5::{Digest, Md5};

use crate::error::{Error, Result};
use crate::routeros::reply::{Progress, Record, ReplyParser};
use crate::routeros::sentence;
use crate::routeros::types::{InterfaceStats, PppSession, SystemResource};

/// Default management API port.
pub const DEFAULT_PORT: u16 = 8728;

/// Default connect and read timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A live management session against one device.
///
/// The session owns its TCP socket: `connect` opens it, [`disconnect`]
/// consumes the session and closes it, and dropping the session closes it
/// on every other exit path. After a login or query error the socket state
/// is undefined and the caller must reconnect.
///
/// Sentences are strictly request/response; nothing is pipelined.
///
/// [`disconnect`]: ManagementSession::disconnect
#[derive(Debug)]
pub struct ManagementSession {
    stream: TcpStream,
    peer: String,
}

impl ManagementSession {
    /// Open a TCP connection to the device's API port.
    ///
    /// The same timeout bounds the connect itself and every later read and
    /// write on the session.
    pub fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let peer = format!("{}:{}", host, port);
        let addr = peer
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| Error::Connection(io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("no address for {}", peer),
            )))?;
        let stream = TcpStream::connect_timeout(&addr, timeout)?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;
        debug!("connected to {}", peer);
        Ok(ManagementSession { stream, peer })
    }

    /// Perform the challenge-response login.
    ///
    /// The device answers a bare `/login` with `!done` and a hex challenge
    /// in `=ret=`; the proof sent back is `00` followed by the hex MD5 of
    /// `0x00 + password + challenge`.
    pub fn login(&mut self, username: &str, password: &str) -> Result<()> {
        sentence::write_sentence(&mut self.stream, &["/login"])?;
        let reply = sentence::read_sentence(&mut self.stream)?;

        if reply.first().map(String::as_str) != Some("!done") || reply.len() < 2 {
            return Err(Error::Authentication(
                "device refused to issue a login challenge".to_string(),
            ));
        }
        let challenge_hex = reply
            .iter()
            .find_map(|word| word.strip_prefix("=ret="))
            .ok_or_else(|| {
                Error::Authentication("login reply carried no challenge".to_string())
            })?;
        let challenge = hex::decode(challenge_hex).map_err(|_| {
            Error::Authentication("login challenge is not valid hex".to_string())
        })?;

        sentence::write_sentence(
            &mut self.stream,
            &[
                "/login".to_string(),
                format!("=name={}", username),
                format!("=response={}", challenge_response(password, &challenge)),
            ],
        )?;
        let reply = sentence::read_sentence(&mut self.stream)?;
        match reply.first().map(String::as_str) {
            Some("!done") => {
                debug!("logged in to {} as {}", self.peer, username);
                Ok(())
            }
            _ => Err(Error::Authentication(format!(
                "device rejected credentials for {}",
                username
            ))),
        }
    }

    /// Send a command sentence and fold the reply into records.
    ///
    /// Reads sentences until the device signals `!done`. A `!trap` reply
    /// fails with [`Error::Device`]; an I/O failure mid-reply is fatal for
    /// the session and never yields a partial result.
    pub fn query(&mut self, command: &str, params: &[&str]) -> Result<Vec<Record>> {
        let mut words = Vec::with_capacity(1 + params.len());
        words.push(command);
        words.extend_from_slice(params);
        sentence::write_sentence(&mut self.stream, &words)?;
        trace!("sent {}", command);

        let mut parser = ReplyParser::default();
        loop {
            let reply = sentence::read_sentence(&mut self.stream)?;
            if reply.is_empty() {
                return Err(Error::Protocol(
                    "connection closed before the reply completed".to_string(),
                ));
            }
            for word in &reply {
                if let Progress::Done = parser.feed(word)? {
                    let records = parser.into_records();
                    debug!("{} returned {} record(s)", command, records.len());
                    return Ok(records);
                }
            }
        }
    }

    /// Fetch CPU, memory, and identity figures from the device.
    pub fn system_resources(&mut self) -> Result<SystemResource> {
        let records = self.query("/system/resource/print", &[])?;
        let record = records.first().ok_or_else(|| {
            Error::Protocol("resource query returned no record".to_string())
        })?;
        Ok(SystemResource::from_record(record))
    }

    /// List interfaces with their traffic counters.
    pub fn interfaces(&mut self) -> Result<Vec<InterfaceStats>> {
        let records = self.query("/interface/print", &["=stats"])?;
        Ok(records.iter().map(InterfaceStats::from_record).collect())
    }

    /// List active PPP sessions.
    pub fn ppp_active(&mut self) -> Result<Vec<PppSession>> {
        let records = self.query("/ppp/active/print", &[])?;
        Ok(records.iter().map(PppSession::from_record).collect())
    }

    /// Close the session. Close errors are swallowed; the socket is gone
    /// either way.
    pub fn disconnect(self) {
        let _ = self.stream.shutdown(Shutdown::Both);
        debug!("disconnected from {}", self.peer);
    }
}

/// The `=response=` proof for a login challenge: a zero byte, the password,
/// and the challenge, digested with MD5 and hex-encoded behind a `00`
/// prefix.
fn challenge_response(password: &str, challenge: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update([0u8]);
    hasher.update(password.as_bytes());
    hasher.update(challenge);
    format!("00{}", hex::encode(hasher.finalize()))
}
