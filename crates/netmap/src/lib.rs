#![forbid(unsafe_code)]

//! `netmap` is a headless interactive network topology map.
//!
//! A [`panel::MapPanel`] owns a renderer and its polling timers. It asks the host for data with
//! typed [`panel::FetchRequest`]s, applies the answers, and reports everything the host should
//! react to as [`panel::MapEvent`]s.

pub mod panel;
pub mod schedule;

pub use netmap_core::*;

pub mod render {
    pub use netmap_render::geom::{Rect, Size};
    pub use netmap_render::model::{Badge, BadgeKind, GraphModel, MapLink, MapNode};
    pub use netmap_render::style::LinkState;
    pub use netmap_render::text::{
        DeterministicTextMeasurer, TextMeasurer, TextStyle, WrapOptions, wrap_lines, wrap_text,
    };
    pub use netmap_render::{
        ImageDescriptor, ImageSource, ObjectStatusSummary, RenderOptions, RenderOutcome, Renderer,
        ShapeRegistry, StaticImageSource, StpDelta, StpMutation, SvgRenderOptions,
        render_map_svg,
    };
}

#[derive(Debug, thiserror::Error)]
pub enum HeadlessError {
    #[error(transparent)]
    Core(#[from] netmap_core::Error),
    #[error(transparent)]
    Render(#[from] netmap_render::Error),
    #[error("fetch failed: {message}")]
    Fetch { message: String },
    #[error("map panel has been torn down")]
    TornDown,
}

pub type HeadlessResult<T> = std::result::Result<T, HeadlessError>;
