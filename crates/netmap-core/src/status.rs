//! Object status codes reported by the status poll.

use crate::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Bit flagging an object under maintenance.
pub const MAINTENANCE_BIT: u32 = 0x20;
const STATUS_MASK: u32 = 0x1f;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectStatus {
    Unknown,
    Ok,
    Alarm,
    Unreach,
    Down,
}

impl ObjectStatus {
    pub const ALL: [ObjectStatus; 5] = [
        ObjectStatus::Unknown,
        ObjectStatus::Ok,
        ObjectStatus::Alarm,
        ObjectStatus::Unreach,
        ObjectStatus::Down,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Ok => "ok",
            Self::Alarm => "alarm",
            Self::Unreach => "unreach",
            Self::Down => "down",
        }
    }
}

/// A raw status word: the low five bits carry the status, [`MAINTENANCE_BIT`] the maintenance
/// flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCode(pub u32);

impl StatusCode {
    pub fn status(self) -> Result<ObjectStatus> {
        match self.0 & STATUS_MASK {
            0 => Ok(ObjectStatus::Unknown),
            1 => Ok(ObjectStatus::Ok),
            2 => Ok(ObjectStatus::Alarm),
            3 => Ok(ObjectStatus::Unreach),
            4 => Ok(ObjectStatus::Down),
            _ => Err(Error::UnknownStatusCode { code: self.0 }),
        }
    }

    pub fn in_maintenance(self) -> bool {
        self.0 & MAINTENANCE_BIT != 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status_code: u32,
    #[serde(default)]
    pub metrics_label: Option<String>,
}

impl StatusEntry {
    pub fn code(&self) -> StatusCode {
        StatusCode(self.status_code)
    }
}

/// Node id -> status, in response order.
pub type StatusReport = IndexMap<String, StatusEntry>;
