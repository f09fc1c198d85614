use std::fmt;

use crate::routeros::reply::Record;

/// Figures from `/system/resource/print`.
///
/// Missing keys fall back to zero or `"unknown"`, matching what the device
/// omits on older firmware.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SystemResource {
    pub cpu_load: f64,
    pub free_memory: u64,
    pub uptime: String,
    pub version: String,
    pub board_name: String,
    pub architecture: String,
}

impl SystemResource {
    pub(crate) fn from_record(record: &Record) -> Self {
        SystemResource {
            cpu_load: record
                .get("cpu-load")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.0),
            free_memory: record.number("free-memory"),
            uptime: record.get("uptime").unwrap_or("0").to_string(),
            version: record.get("version").unwrap_or("unknown").to_string(),
            board_name: record.get("board-name").unwrap_or("unknown").to_string(),
            architecture: record
                .get("architecture-name")
                .unwrap_or("unknown")
                .to_string(),
        }
    }
}

/// Whether an interface is passing traffic.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InterfaceStatus {
    Running,
    Stopped,
}

impl fmt::Display for InterfaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterfaceStatus::Running => write!(f, "running"),
            InterfaceStatus::Stopped => write!(f, "stopped"),
        }
    }
}

/// One row of `/interface/print =stats`.
#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceStats {
    pub name: String,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub rx_packets: u64,
    pub tx_packets: u64,
    pub status: InterfaceStatus,
}

impl InterfaceStats {
    pub(crate) fn from_record(record: &Record) -> Self {
        InterfaceStats {
            name: record.text("name"),
            rx_bytes: record.number("rx-byte"),
            tx_bytes: record.number("tx-byte"),
            rx_packets: record.number("rx-packet"),
            tx_packets: record.number("tx-packet"),
            status: if record.flag("running") {
                InterfaceStatus::Running
            } else {
                InterfaceStatus::Stopped
            },
        }
    }
}

/// One row of `/ppp/active/print`.
#[derive(Clone, Debug, PartialEq)]
pub struct PppSession {
    pub name: String,
    pub caller_id: String,
    pub address: String,
    pub uptime: String,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub service: String,
}

impl PppSession {
    pub(crate) fn from_record(record: &Record) -> Self {
        PppSession {
            name: record.text("name"),
            caller_id: record.text("caller-id"),
            address: record.text("address"),
            uptime: record.text("uptime"),
            bytes_in: record.number("bytes-in"),
            bytes_out: record.number("bytes-out"),
            service: record.text("service"),
        }
    }
}
