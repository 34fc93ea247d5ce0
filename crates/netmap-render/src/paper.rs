//! The drawing surface hosting the graph.

use crate::geom::Size;
use crate::shapes::ImageDescriptor;
use crate::style::FilterDef;
use indexmap::IndexMap;

#[derive(Debug, Clone, Default)]
pub struct Defs {
    pub filters: IndexMap<&'static str, FilterDef>,
    pub images: IndexMap<String, ImageDescriptor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    pub href: String,
    pub opacity: f64,
}

#[derive(Debug, Clone)]
pub struct Paper {
    /// Pixel size of the surface.
    pub size: Size,
    /// Translation applied to graph coordinates before scaling.
    pub origin: (f64, f64),
    pub scale: f64,
    /// Visible area of the hosting panel.
    pub visible: Size,
    pub grid_size: Option<f64>,
    pub background: Option<Background>,
    defs: Defs,
}

impl Default for Paper {
    fn default() -> Self {
        Self {
            size: Size::default(),
            origin: (0.0, 0.0),
            scale: 1.0,
            visible: Size::default(),
            grid_size: None,
            background: None,
            defs: Defs::default(),
        }
    }
}

impl Paper {
    pub fn defs(&self) -> &Defs {
        &self.defs
    }

    /// Adds a filter definition; an existing definition with the same name is kept.
    pub fn add_filter(&mut self, def: FilterDef) -> bool {
        if self.defs.filters.contains_key(def.name) {
            return false;
        }
        self.defs.filters.insert(def.name, def);
        true
    }

    pub fn has_filter(&self, name: &str) -> bool {
        self.defs.filters.contains_key(name)
    }

    /// Attaches an image definition on first use only.
    pub fn ensure_image_def(&mut self, image: &ImageDescriptor) -> bool {
        if self.defs.images.contains_key(&image.name) {
            return false;
        }
        self.defs.images.insert(image.name.clone(), image.clone());
        true
    }

    /// Maps a graph coordinate to a surface pixel.
    pub fn to_surface(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.origin.0 + x * self.scale,
            self.origin.1 + y * self.scale,
        )
    }

    /// Maps a surface pixel (e.g. a scroll offset) back to graph coordinates.
    pub fn to_graph(&self, x: f64, y: f64) -> (f64, f64) {
        let s = if self.scale > 0.0 { self.scale } else { 1.0 };
        ((x - self.origin.0) / s, (y - self.origin.1) / s)
    }
}
