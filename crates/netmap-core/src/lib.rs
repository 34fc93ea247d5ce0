#![forbid(unsafe_code)]

//! Data model for the netmap topology engine: snapshots delivered by the backend, status and
//! overlay poll results, and the layout payload written back on save.

pub mod config;
pub mod error;
pub mod ids;
pub mod overlay;
pub mod payload;
pub mod snapshot;
pub mod status;

pub use config::{MapConfig, PanelSettings};
pub use error::{Error, Result};
pub use ids::ObjectRef;
pub use overlay::{OverlayMode, OverlayReport, PortMetrics, StpStatus};
pub use payload::{MapPayload, PayloadLink, PayloadNode};
pub use snapshot::{
    Bandwidth, BadgeForm, OverlayPosition, Point, PortGroup, STP_CAPABILITY, ShapeOverlay,
    SnapshotLink, SnapshotNode, TopologySnapshot,
};
pub use status::{MAINTENANCE_BIT, ObjectStatus, StatusCode, StatusEntry, StatusReport};
