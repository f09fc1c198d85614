use std::net::{Ipv4Addr, UdpSocket};
use std::time::Duration;

use log::{debug, warn};
use num_traits::FromPrimitive;

use crate::error::{Error, Result};
use crate::radius::attribute::{Attribute, AttributeType};
use crate::radius::crypt;
use crate::radius::packet::{AcctStatus, Code, Packet};

/// Default authentication port.
pub const AUTH_PORT: u16 = 1812;

/// Default accounting port.
pub const ACCT_PORT: u16 = 1813;

/// Default receive timeout for one round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A blocking RADIUS client in the NAS role.
///
/// One instance owns one rotating identifier counter and performs one UDP
/// round trip per call; nothing is retried. The public methods collapse
/// every failure (timeout, malformed response, explicit reject) into
/// `false`; the underlying cause is logged.
pub struct RadiusClient {
    server: String,
    auth_port: u16,
    acct_port: u16,
    secret: Vec<u8>,
    timeout: Duration,
    identifier: u8,
}

impl RadiusClient {
    pub fn new(server: impl Into<String>, secret: impl AsRef<[u8]>) -> Self {
        RadiusClient {
            server: server.into(),
            auth_port: AUTH_PORT,
            acct_port: ACCT_PORT,
            secret: secret.as_ref().to_vec(),
            timeout: DEFAULT_TIMEOUT,
            identifier: 1,
        }
    }

    /// Override the authentication and accounting ports.
    pub fn with_ports(mut self, auth_port: u16, acct_port: u16) -> Self {
        self.auth_port = auth_port;
        self.acct_port = acct_port;
        self
    }

    /// Override the receive timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Authenticate a user. True iff the server answered Access-Accept.
    pub fn authenticate(&mut self, username: &str, password: &str) -> bool {
        match self.try_authenticate(username, password) {
            Ok(accepted) => accepted,
            Err(err) => {
                warn!("access request for {} failed: {}", username, err);
                false
            }
        }
    }

    /// Open an accounting session. True iff the server acknowledged.
    pub fn accounting_start(&mut self, username: &str, session_id: &str, nas_ip: Ipv4Addr) -> bool {
        match self.try_accounting(username, session_id, nas_ip, AcctStatus::Start, None) {
            Ok(acknowledged) => acknowledged,
            Err(err) => {
                warn!("accounting start for {} failed: {}", session_id, err);
                false
            }
        }
    }

    /// Close an accounting session, reporting its usage counters. True iff
    /// the server acknowledged.
    pub fn accounting_stop(
        &mut self,
        username: &str,
        session_id: &str,
        nas_ip: Ipv4Addr,
        session_time: u32,
        bytes_in: u32,
        bytes_out: u32,
    ) -> bool {
        let usage = Usage {
            session_time,
            bytes_in,
            bytes_out,
        };
        match self.try_accounting(username, session_id, nas_ip, AcctStatus::Stop, Some(usage)) {
            Ok(acknowledged) => acknowledged,
            Err(err) => {
                warn!("accounting stop for {} failed: {}", session_id, err);
                false
            }
        }
    }

    fn try_authenticate(&mut self, username: &str, password: &str) -> Result<bool> {
        let mut packet = self.access_request(username, password)?;
        let code = self.exchange(&mut packet, self.auth_port)?;
        Ok(code == Some(Code::AccessAccept))
    }

    fn try_accounting(
        &mut self,
        username: &str,
        session_id: &str,
        nas_ip: Ipv4Addr,
        status: AcctStatus,
        usage: Option<Usage>,
    ) -> Result<bool> {
        let mut packet = self.accounting_request(username, session_id, nas_ip, status, usage)?;
        let code = self.exchange(&mut packet, self.acct_port)?;
        Ok(code == Some(Code::AccountingResponse))
    }

    /// Access-Request: User-Name, obfuscated User-Password, and the NAS
    /// loopback address. The password is obfuscated against the zeroed
    /// authenticator the packet is later sealed over.
    fn access_request(&mut self, username: &str, password: &str) -> Result<Packet> {
        let mut packet = Packet::new(Code::AccessRequest, self.next_identifier());
        packet.push(Attribute::text(AttributeType::UserName, username)?);
        let hidden = crypt::obfuscate_password(password, &packet.authenticator, &self.secret);
        packet.push(Attribute::new(AttributeType::UserPassword, hidden)?);
        packet.push(Attribute::address(
            AttributeType::NasIpAddress,
            Ipv4Addr::LOCALHOST,
        )?);
        Ok(packet)
    }

    fn accounting_request(
        &mut self,
        username: &str,
        session_id: &str,
        nas_ip: Ipv4Addr,
        status: AcctStatus,
        usage: Option<Usage>,
    ) -> Result<Packet> {
        let mut packet = Packet::new(Code::AccountingRequest, self.next_identifier());
        packet.push(Attribute::text(AttributeType::UserName, username)?);
        packet.push(Attribute::integer(
            AttributeType::AcctStatusType,
            status as u32,
        )?);
        packet.push(Attribute::text(AttributeType::AcctSessionId, session_id)?);
        packet.push(Attribute::address(AttributeType::NasIpAddress, nas_ip)?);
        if let Some(usage) = usage {
            packet.push(Attribute::integer(
                AttributeType::AcctSessionTime,
                usage.session_time,
            )?);
            packet.push(Attribute::integer(
                AttributeType::AcctInputOctets,
                usage.bytes_in,
            )?);
            packet.push(Attribute::integer(
                AttributeType::AcctOutputOctets,
                usage.bytes_out,
            )?);
        }
        Ok(packet)
    }

    /// One UDP round trip. Returns the response's code byte, or `None` for
    /// a code this client does not know.
    fn exchange(&mut self, packet: &mut Packet, port: u16) -> Result<Option<Code>> {
        let wire = packet.seal(&self.secret);

        let socket = UdpSocket::bind(("0.0.0.0", 0))?;
        socket.set_read_timeout(Some(self.timeout))?;
        socket.send_to(&wire, (self.server.as_str(), port))?;

        let mut buf = [0u8; 1024];
        let (received, _peer) = socket.recv_from(&mut buf)?;
        if received == 0 {
            return Err(Error::Protocol("empty response datagram".to_string()));
        }
        // Responses are matched to the single in-flight request; the
        // identifier is logged, not verified.
        debug!(
            "id {} -> response code {} ({} bytes)",
            packet.identifier, buf[0], received
        );
        Ok(Code::from_u8(buf[0]))
    }

    /// The identifier advances on every packet built, acknowledged or not,
    /// wrapping at 256.
    fn next_identifier(&mut self) -> u8 {
        let id = self.identifier;
        self.identifier = self.identifier.wrapping_add(1);
        id
    }
}

struct Usage {
    session_time: u32,
    bytes_in: u32,
    bytes_out: u32,
}
