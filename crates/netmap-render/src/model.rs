//! In-memory map model: nodes, links and the badges embedded in nodes.

use crate::geom::{Rect, Size};
use crate::shapes::NodeVisual;
use crate::style::LinkState;
use indexmap::IndexMap;
use netmap_core::{Bandwidth, BadgeForm, ObjectStatus, Point, PortMetrics};
use netmap_graphlib::{Graph, GraphOptions};

#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    pub kind: String,
    /// Backend id (the part after the `:` of the node id).
    pub object_id: String,
    pub numeric_id: Option<i64>,
    pub parent_id: Option<String>,
    pub caps: Vec<String>,
    pub in_maintenance: bool,
    pub portal: Option<String>,
    pub object_filter: Option<String>,
    pub metrics_template: Option<String>,
    pub shape_width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub size: Size,
    pub name: String,
    pub address: Option<String>,
    pub data: NodeData,
    pub status: ObjectStatus,
    pub metrics_label: Option<String>,
    pub visual: NodeVisual,
}

impl MapNode {
    pub fn bbox(&self) -> Rect {
        Rect::new(self.x, self.y, self.size.width, self.size.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeKind {
    Maintenance,
    Overlay,
}

impl BadgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Maintenance => "maintenance",
            Self::Overlay => "overlay",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    pub id: String,
    pub owner: String,
    pub kind: BadgeKind,
    pub form: BadgeForm,
    pub glyph: char,
    /// Center as fractions of the owner's box.
    pub anchor: (f64, f64),
    pub size: f64,
}

impl Badge {
    pub fn maintenance_id(owner: &str) -> String {
        format!("{owner}::maintenance")
    }

    pub fn overlay_id(owner: &str, index: usize) -> String {
        format!("{owner}::overlay:{index}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Node(MapNode),
    Badge(Badge),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkData {
    pub kind: String,
    pub object_id: String,
    /// `[source, destination]` port ids.
    pub ports: [String; 2],
    pub bw: Bandwidth,
    /// Last load values per port, kept for tooltips.
    pub metrics: IndexMap<String, PortMetrics>,
    pub connector: String,
    pub vertices: Option<Vec<Point>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkLabel {
    pub text: String,
    pub font_size: f64,
    /// Position along the route, 0 = source, 1 = destination.
    pub ratio: f64,
    pub fill: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub stroke: &'static str,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapLink {
    pub id: String,
    pub source: String,
    pub target: String,
    pub data: LinkData,
    pub state: LinkState,
    /// `None` draws the default stroke.
    pub style: Option<StrokeStyle>,
    /// Midpoint label; `None` when hidden.
    pub label: Option<LinkLabel>,
}

pub struct GraphModel {
    graph: Graph<Cell, MapLink>,
    viewport: Rect,
}

impl Default for GraphModel {
    fn default() -> Self {
        Self {
            graph: Graph::new(GraphOptions {
                compound: true,
                cascade_children: true,
            }),
            viewport: Rect::default(),
        }
    }
}

impl GraphModel {
    pub fn clear(&mut self) {
        self.graph.clear();
        self.viewport = Rect::default();
    }

    pub fn add_nodes(&mut self, nodes: Vec<MapNode>) {
        for n in nodes {
            let id = n.id.clone();
            self.graph.set_node(id, Cell::Node(n));
        }
    }

    /// Inserts links whose endpoints exist; returns how many were dropped.
    pub fn add_links(&mut self, links: Vec<MapLink>) -> usize {
        let mut dropped = 0;
        for l in links {
            let endpoints_ok = self.node(&l.source).is_some() && self.node(&l.target).is_some();
            if !endpoints_ok {
                tracing::debug!(link = l.id.as_str(), "link endpoint missing; dropped");
                dropped += 1;
                continue;
            }
            let (v, w, name) = (l.source.clone(), l.target.clone(), l.id.clone());
            self.graph.set_edge(v, w, name, l);
        }
        dropped
    }

    pub fn add_badges(&mut self, badges: Vec<Badge>) -> usize {
        badges.into_iter().filter(|b| self.add_badge(b.clone())).count()
    }

    /// Embeds a badge into its owner. A badge id that is already present, or an owner that is
    /// not a node, leaves the model untouched.
    pub fn add_badge(&mut self, badge: Badge) -> bool {
        if self.graph.has_node(&badge.id) || self.node(&badge.owner).is_none() {
            return false;
        }
        let (id, owner) = (badge.id.clone(), badge.owner.clone());
        self.graph.set_node(id.clone(), Cell::Badge(badge));
        self.graph.set_parent(&id, &owner)
    }

    pub fn remove_badge(&mut self, id: &str) -> bool {
        if !matches!(self.graph.node(id), Some(Cell::Badge(_))) {
            return false;
        }
        self.graph.remove_node(id)
    }

    pub fn badge(&self, id: &str) -> Option<&Badge> {
        match self.graph.node(id)? {
            Cell::Badge(b) => Some(b),
            Cell::Node(_) => None,
        }
    }

    pub fn has_badge(&self, id: &str) -> bool {
        self.badge(id).is_some()
    }

    pub fn badges_of(&self, owner: &str) -> Vec<&Badge> {
        self.graph
            .children(owner)
            .into_iter()
            .filter_map(|id| self.badge(id))
            .collect()
    }

    pub fn remove_node(&mut self, id: &str) -> bool {
        if self.node(id).is_none() {
            return false;
        }
        self.graph.remove_node(id)
    }

    pub fn node(&self, id: &str) -> Option<&MapNode> {
        match self.graph.node(id)? {
            Cell::Node(n) => Some(n),
            Cell::Badge(_) => None,
        }
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut MapNode> {
        match self.graph.node_mut(id)? {
            Cell::Node(n) => Some(n),
            Cell::Badge(_) => None,
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &MapNode> {
        self.graph.node_entries().filter_map(|(_, cell)| match cell {
            Cell::Node(n) => Some(n),
            Cell::Badge(_) => None,
        })
    }

    pub fn badges(&self) -> impl Iterator<Item = &Badge> {
        self.graph.node_entries().filter_map(|(_, cell)| match cell {
            Cell::Badge(b) => Some(b),
            Cell::Node(_) => None,
        })
    }

    pub fn for_each_node_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut MapNode),
    {
        self.graph.for_each_node_mut(|_, cell| {
            if let Cell::Node(n) = cell {
                f(n);
            }
        });
    }

    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }

    pub fn link(&self, id: &str) -> Option<&MapLink> {
        self.graph.edge(id)
    }

    pub fn link_mut(&mut self, id: &str) -> Option<&mut MapLink> {
        self.graph.edge_mut(id)
    }

    pub fn links(&self) -> impl Iterator<Item = &MapLink> {
        self.graph.edge_entries().map(|(_, l)| l)
    }

    pub fn link_ids(&self) -> Vec<String> {
        self.graph.edge_names()
    }

    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Polyline from the source center through the vertices to the target center.
    pub fn link_route(&self, id: &str) -> Option<Vec<(f64, f64)>> {
        let link = self.link(id)?;
        let src = self.node(&link.source)?.bbox().center();
        let dst = self.node(&link.target)?.bbox().center();
        let mut route = vec![src];
        if let Some(vs) = &link.data.vertices {
            route.extend(vs.iter().map(|p| (p.x, p.y)));
        }
        route.push(dst);
        Some(route)
    }

    /// Bounding box of every node and link vertex.
    pub fn content_bbox(&self) -> Option<Rect> {
        let mut bbox: Option<Rect> = None;
        let mut grow = |r: Rect| {
            bbox = Some(match bbox {
                Some(b) => b.union(&r),
                None => r,
            });
        };
        for n in self.nodes() {
            grow(n.bbox());
        }
        for l in self.links() {
            for p in l.data.vertices.iter().flatten() {
                grow(Rect::new(p.x, p.y, 0.0, 0.0));
            }
        }
        bbox
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn set_viewport(&mut self, rect: Rect) {
        self.viewport = rect;
    }
}
