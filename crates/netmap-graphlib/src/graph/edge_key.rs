//! Edge key types.
//!
//! Edges are addressed by `v`, `w` and a `name`. The name is unique across the graph, which lets
//! callers look an edge up by name alone.

use std::hash::{Hash, Hasher};

#[derive(Debug, Clone)]
pub struct EdgeKey {
    pub v: String,
    pub w: String,
    pub name: String,
}

impl EdgeKey {
    pub fn new(v: impl Into<String>, w: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            v: v.into(),
            w: w.into(),
            name: name.into(),
        }
    }

    pub fn touches(&self, node: &str) -> bool {
        self.v == node || self.w == node
    }
}

impl PartialEq for EdgeKey {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.v == other.v && self.w == other.w
    }
}

impl Eq for EdgeKey {}

impl Hash for EdgeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}
