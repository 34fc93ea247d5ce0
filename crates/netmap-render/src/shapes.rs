//! Shape registry: glyph and image shape classes, built lazily and cached by name.

use crate::geom::Size;
use crate::style::{icon_class, status_filter_name};
use crate::{Error, Result};
use indexmap::IndexMap;
use netmap_core::ObjectStatus;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Prefix of registry keys for glyph shapes; the remainder is the icon size token.
pub const ICON_SHAPE_PREFIX: &str = "icon:";

/// Common capability of every node shape.
pub trait Drawable {
    fn shape_name(&self) -> &str;
    fn size(&self) -> Size;
    /// Horizontal room available to the node label.
    fn label_width(&self) -> f64 {
        self.size().width
    }
    /// Display class carrying `status`, for shapes drawn from a glyph.
    fn status_class(&self, status: ObjectStatus) -> Option<String>;
    /// Paper filter id carrying `status`, for shapes drawn from an image.
    fn status_filter(&self, status: ObjectStatus) -> Option<&'static str>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct IconShape {
    pub name: String,
    pub size_token: String,
    pub size: Size,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageShape {
    pub name: String,
    pub image: ImageDescriptor,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeClass {
    Icon(IconShape),
    Image(ImageShape),
}

impl Drawable for ShapeClass {
    fn shape_name(&self) -> &str {
        match self {
            Self::Icon(s) => &s.name,
            Self::Image(s) => &s.name,
        }
    }

    fn size(&self) -> Size {
        match self {
            Self::Icon(s) => s.size,
            Self::Image(s) => Size::new(s.image.width, s.image.height),
        }
    }

    fn label_width(&self) -> f64 {
        // Glyph labels may spill a little past the icon itself.
        match self {
            Self::Icon(s) => s.size.width * 2.0,
            Self::Image(s) => s.image.width,
        }
    }

    fn status_class(&self, status: ObjectStatus) -> Option<String> {
        match self {
            Self::Icon(s) => Some(icon_class(&s.size_token, status)),
            Self::Image(_) => None,
        }
    }

    fn status_filter(&self, status: ObjectStatus) -> Option<&'static str> {
        match self {
            Self::Icon(_) => None,
            Self::Image(_) => Some(status_filter_name(status)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub name: String,
    pub href: String,
    pub width: f64,
    pub height: f64,
}

impl ImageDescriptor {
    /// Id of the paper `<defs>` entry holding this image.
    pub fn def_id(&self) -> String {
        let mut out = String::with_capacity(self.name.len() + 4);
        out.push_str("img-");
        for ch in self.name.chars() {
            out.push(if ch.is_ascii_alphanumeric() { ch } else { '-' });
        }
        out
    }
}

/// Where image shapes come from (a stencil directory, an HTTP catalog, ...).
pub trait ImageSource {
    fn load(&self, name: &str) -> Option<ImageDescriptor>;
}

/// In-memory image catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticImageSource {
    images: IndexMap<String, ImageDescriptor>,
}

impl StaticImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, image: ImageDescriptor) -> &mut Self {
        self.images.insert(image.name.clone(), image);
        self
    }
}

impl ImageSource for StaticImageSource {
    fn load(&self, name: &str) -> Option<ImageDescriptor> {
        self.images.get(name).cloned()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IconDescriptor {
    pub glyph: u32,
    pub size_token: Option<String>,
}

/// Visual state of one node. For glyph nodes the status lives in `css_class`; image nodes carry
/// it as a status filter.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeVisual {
    pub shape: Arc<ShapeClass>,
    pub glyph: Option<char>,
    pub css_class: Option<String>,
    pub status_filter: Option<&'static str>,
    pub label: String,
    pub highlighted: bool,
    pub stp_root: bool,
}

impl NodeVisual {
    pub fn is_icon(&self) -> bool {
        matches!(*self.shape, ShapeClass::Icon(_))
    }

    pub fn set_status(&mut self, status: ObjectStatus) {
        self.css_class = self.shape.status_class(status);
        self.status_filter = self.shape.status_filter(status);
    }
}

pub struct ShapeRegistry {
    icon_size: String,
    icon_dims: Size,
    source: Box<dyn ImageSource + Send + Sync>,
    shapes: FxHashMap<String, Arc<ShapeClass>>,
    images: FxHashMap<String, ImageDescriptor>,
}

impl ShapeRegistry {
    pub fn new(
        icon_size: impl Into<String>,
        icon_dims: Size,
        source: Box<dyn ImageSource + Send + Sync>,
    ) -> Self {
        Self {
            icon_size: icon_size.into(),
            icon_dims,
            source,
            shapes: FxHashMap::default(),
            images: FxHashMap::default(),
        }
    }

    pub fn default_icon_shape(&self) -> String {
        format!("{ICON_SHAPE_PREFIX}{}", self.icon_size)
    }

    /// Shape class for `name`, built on first request and shared afterwards.
    pub fn get_shape(&mut self, name: &str) -> Result<Arc<ShapeClass>> {
        if let Some(shape) = self.shapes.get(name) {
            return Ok(Arc::clone(shape));
        }
        let class = match name.strip_prefix(ICON_SHAPE_PREFIX) {
            Some(token) if !token.is_empty() => ShapeClass::Icon(IconShape {
                name: name.to_string(),
                size_token: token.to_string(),
                size: self.icon_dims,
            }),
            Some(_) => {
                return Err(Error::UnknownShape {
                    name: name.to_string(),
                });
            }
            None => ShapeClass::Image(ImageShape {
                name: name.to_string(),
                image: self.get_image(name)?,
            }),
        };
        tracing::debug!(shape = name, "shape class created");
        let class = Arc::new(class);
        self.shapes.insert(name.to_string(), Arc::clone(&class));
        Ok(class)
    }

    pub fn get_image(&mut self, name: &str) -> Result<ImageDescriptor> {
        if let Some(img) = self.images.get(name) {
            return Ok(img.clone());
        }
        let img = self.source.load(name).ok_or_else(|| Error::UnknownShape {
            name: name.to_string(),
        })?;
        self.images.insert(name.to_string(), img.clone());
        Ok(img)
    }

    pub fn get_icon_node(&mut self, descriptor: &IconDescriptor, label: &str) -> Result<NodeVisual> {
        let glyph = char::from_u32(descriptor.glyph).ok_or(Error::InvalidGlyph {
            code: descriptor.glyph,
        })?;
        let name = match &descriptor.size_token {
            Some(token) => format!("{ICON_SHAPE_PREFIX}{token}"),
            None => self.default_icon_shape(),
        };
        let shape = self.get_shape(&name)?;
        let mut visual = NodeVisual {
            shape,
            glyph: Some(glyph),
            css_class: None,
            status_filter: None,
            label: label.to_string(),
            highlighted: false,
            stp_root: false,
        };
        visual.set_status(ObjectStatus::Unknown);
        Ok(visual)
    }

    pub fn get_image_node(&mut self, shape_name: &str, label: &str) -> Result<NodeVisual> {
        let shape = self.get_shape(shape_name)?;
        if !matches!(*shape, ShapeClass::Image(_)) {
            return Err(Error::UnknownShape {
                name: shape_name.to_string(),
            });
        }
        let mut visual = NodeVisual {
            shape,
            glyph: None,
            css_class: None,
            status_filter: None,
            label: label.to_string(),
            highlighted: false,
            stp_root: false,
        };
        visual.set_status(ObjectStatus::Unknown);
        Ok(visual)
    }

    pub fn cached_shapes(&self) -> usize {
        self.shapes.len()
    }
}
