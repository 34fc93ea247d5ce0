#![forbid(unsafe_code)]

//! Headless topology map renderer: label layout, shape registry, graph model, live status
//! styling and SVG output.

pub mod geom;
pub mod model;
pub mod paper;
pub mod renderer;
pub mod shapes;
pub mod style;
pub mod svg;
pub mod text;

pub use renderer::{
    ObjectStatusSummary, RenderOptions, RenderOutcome, Renderer, StpDelta, StpMutation,
};
pub use shapes::{ImageDescriptor, ImageSource, ShapeRegistry, StaticImageSource};
pub use svg::{SvgRenderOptions, render_map_svg};
pub use text::{DeterministicTextMeasurer, TextMeasurer, TextStyle};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] netmap_core::Error),
    #[error("unknown shape: {name}")]
    UnknownShape { name: String },
    #[error("invalid glyph code point {code:#x}")]
    InvalidGlyph { code: u32 },
    #[error("filters must be initialized before a map is rendered")]
    FiltersNotInitialized,
    #[error("invalid zoom factor {factor}")]
    InvalidZoom { factor: f64 },
    #[error("status for {node_id} rejected: {source}")]
    StatusRejected {
        node_id: String,
        #[source]
        source: netmap_core::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
