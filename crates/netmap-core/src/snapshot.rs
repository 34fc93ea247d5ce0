//! Topology snapshot as delivered by the backend.

use crate::ids::{ObjectRef, de_id, de_opt_id};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Capability tag marking objects that report spanning-tree state.
pub const STP_CAPABILITY: &str = "Network | STP";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopologySnapshot {
    #[serde(default)]
    pub nodes: Vec<SnapshotNode>,
    #[serde(default)]
    pub links: Vec<SnapshotLink>,
    #[serde(default)]
    pub grid_size: Option<f64>,
    #[serde(default)]
    pub max_links: Option<usize>,
    #[serde(default)]
    pub background_image: Option<String>,
    #[serde(default)]
    pub background_opacity: Option<f64>,
    /// Seconds between object status polls.
    #[serde(default)]
    pub object_status_refresh_interval: Option<u64>,
    #[serde(default)]
    pub normalize_position: Option<bool>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub caps: Vec<String>,
}

impl TopologySnapshot {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(text)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Fixed dimensions without position normalization: the layout was drawn by hand and must
    /// not be auto-fitted.
    pub fn is_configured(&self) -> bool {
        self.width.is_some() && self.height.is_some() && self.normalize_position == Some(false)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for n in &self.nodes {
            if !seen.insert(n.object_ref()) {
                return Err(Error::InvalidSnapshot {
                    message: format!("duplicate node {}", n.object_ref()),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotNode {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    /// Registered SVG shape; `None` renders the node from `glyph`.
    #[serde(default)]
    pub shape: Option<String>,
    /// Icon font code point for glyph nodes.
    #[serde(default)]
    pub glyph: Option<u32>,
    #[serde(default)]
    pub shape_width: Option<f64>,
    #[serde(default)]
    pub shape_height: Option<f64>,
    #[serde(default)]
    pub shape_overlay: Vec<ShapeOverlay>,
    #[serde(default)]
    pub ports: Vec<PortGroup>,
    #[serde(default)]
    pub caps: Vec<String>,
    #[serde(default)]
    pub external: bool,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub in_maintenance: bool,
    #[serde(default)]
    pub portal: Option<String>,
    #[serde(default)]
    pub object_filter: Option<String>,
    #[serde(default)]
    pub metrics_template: Option<String>,
    #[serde(default)]
    pub metrics_label: Option<String>,
}

impl SnapshotNode {
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(&self.kind, &self.id)
    }

    pub fn has_capability(&self, cap: &str) -> bool {
        self.caps.iter().any(|c| c == cap)
    }
}

/// Ports grouped by the interface that owns them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortGroup {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub ports: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeForm {
    #[default]
    Circle,
    Square,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OverlayPosition {
    #[default]
    NW,
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
}

impl OverlayPosition {
    /// Anchor as fractions of the owning node's box.
    pub fn anchor(self) -> (f64, f64) {
        match self {
            Self::NW => (0.0, 0.0),
            Self::N => (0.5, 0.0),
            Self::NE => (1.0, 0.0),
            Self::E => (1.0, 0.5),
            Self::SE => (1.0, 1.0),
            Self::S => (0.5, 1.0),
            Self::SW => (0.0, 1.0),
            Self::W => (0.0, 0.5),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeOverlay {
    pub code: u32,
    #[serde(default)]
    pub position: OverlayPosition,
    #[serde(default)]
    pub form: BadgeForm,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bandwidth {
    #[serde(rename = "in", default)]
    pub inbound: f64,
    #[serde(rename = "out", default)]
    pub outbound: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotLink {
    #[serde(rename = "type", default = "default_link_kind")]
    pub kind: String,
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    /// `[source, destination]` port ids. Links with any other arity are dropped at render time.
    #[serde(default)]
    pub ports: Vec<String>,
    #[serde(default)]
    pub bw: Bandwidth,
    #[serde(default = "default_connector")]
    pub connector: String,
    #[serde(default)]
    pub vertices: Option<Vec<Point>>,
}

impl SnapshotLink {
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(&self.kind, &self.id)
    }
}

fn default_link_kind() -> String {
    "link".to_string()
}

fn default_connector() -> String {
    "normal".to_string()
}
