//! Load overlay and spanning-tree documents.

use crate::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const LOAD_IN: &str = "load_in";
pub const LOAD_OUT: &str = "load_out";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayMode {
    #[default]
    None,
    Load,
}

impl FromStr for OverlayMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "load" => Ok(Self::Load),
            other => Err(Error::UnknownOverlayMode {
                value: other.to_string(),
            }),
        }
    }
}

/// Metric values reported for one port.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_status: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oper_status: Option<bool>,
    #[serde(flatten)]
    pub values: IndexMap<String, f64>,
}

impl PortMetrics {
    pub fn value(&self, name: &str) -> f64 {
        self.values.get(name).copied().unwrap_or(0.0)
    }

    pub fn load_in(&self) -> f64 {
        self.value(LOAD_IN)
    }

    pub fn load_out(&self) -> f64 {
        self.value(LOAD_OUT)
    }

    /// Missing status counts as up.
    pub fn admin_up(&self) -> bool {
        self.admin_status.unwrap_or(true)
    }

    pub fn oper_up(&self) -> bool {
        self.oper_status.unwrap_or(true)
    }
}

/// Port id -> metrics.
pub type OverlayReport = IndexMap<String, PortMetrics>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StpStatus {
    #[serde(default)]
    pub roots: Vec<String>,
    #[serde(default)]
    pub blocked: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_metrics_keep_named_values_apart_from_status() {
        let m: PortMetrics = serde_json::from_str(
            r#"{"load_in": 120.5, "load_out": 30, "admin_status": true, "oper_status": false}"#,
        )
        .expect("valid metrics");
        assert_eq!(m.load_in(), 120.5);
        assert_eq!(m.load_out(), 30.0);
        assert!(m.admin_up());
        assert!(!m.oper_up());
        assert_eq!(m.values.len(), 2);
    }

    #[test]
    fn missing_status_fails_open() {
        let m = PortMetrics::default();
        assert!(m.admin_up() && m.oper_up());
        assert_eq!(m.load_in(), 0.0);
    }

    #[test]
    fn parses_overlay_modes() {
        assert_eq!("load".parse::<OverlayMode>().expect("mode"), OverlayMode::Load);
        assert_eq!("".parse::<OverlayMode>().expect("mode"), OverlayMode::None);
        assert!("heat".parse::<OverlayMode>().is_err());
    }
}
