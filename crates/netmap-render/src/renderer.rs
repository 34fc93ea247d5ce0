//! Builds the graph model from a topology snapshot and keeps its styling in sync with status,
//! load and spanning-tree polls.

use crate::geom::{Rect, Size};
use crate::model::{
    Badge, BadgeKind, GraphModel, LinkData, LinkLabel, MapLink, MapNode, NodeData, StrokeStyle,
};
use crate::paper::{Background, Paper};
use crate::shapes::{Drawable, IconDescriptor, NodeVisual, ShapeClass, ShapeRegistry};
use crate::style::{
    DEFAULT_LINK_WIDTH, DEFAULT_NODE_GLYPH, GLYPH_LOAD, GLYPH_MAINTENANCE, LINK_LABEL_FONT_SIZE,
    LinkState, filter_palette, link_state_style, load_style,
};
use crate::text::{TextMeasurer, TextStyle, WrapOptions, wrap_text};
use crate::{Error, Result};
use indexmap::{IndexMap, IndexSet};
use netmap_core::{
    BadgeForm, MapPayload, ObjectStatus, OverlayPosition, OverlayReport, PanelSettings,
    PayloadLink, PayloadNode, PortMetrics, STP_CAPABILITY, SnapshotLink, SnapshotNode,
    StatusReport, StpStatus, TopologySnapshot,
};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::time::Duration;

const MAINTENANCE_POSITION: OverlayPosition = OverlayPosition::NE;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Draw external nodes even when the map exceeds its link budget.
    pub view_all: bool,
    /// Label nodes with their address instead of their name.
    pub show_address: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutcome {
    pub status_interval: Duration,
    pub stp_available: bool,
    pub nodes: usize,
    pub links: usize,
    pub badges: usize,
    pub skipped_nodes: usize,
    pub dropped_links: usize,
}

#[derive(Debug, Default)]
pub struct ObjectStatusSummary {
    pub updated: usize,
    pub ignored: usize,
    pub rejected: Vec<Error>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StpMutation {
    RootMarked(String),
    RootCleared(String),
    LinkBlocked(String),
    LinkUnblocked(String),
}

/// Style changes caused by one spanning-tree update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StpDelta {
    mutations: Vec<StpMutation>,
}

impl StpDelta {
    pub fn mutations(&self) -> &[StpMutation] {
        &self.mutations
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }
}

pub struct Renderer {
    settings: PanelSettings,
    measurer: Arc<dyn TextMeasurer + Send + Sync>,
    label_style: TextStyle,
    registry: ShapeRegistry,
    paper: Paper,
    model: GraphModel,
    filters_ready: bool,
    port_index: FxHashMap<String, String>,
    /// Declared background size of a configured (hand-drawn) map.
    configured: Option<Size>,
    status_interval: Duration,
    zoom: f64,
    show_address: bool,
    stp_available: bool,
    stp_roots: IndexSet<String>,
    stp_blocked: IndexSet<String>,
    highlighted: Option<String>,
    dirty: bool,
}

impl Renderer {
    pub fn new(
        settings: PanelSettings,
        measurer: Arc<dyn TextMeasurer + Send + Sync>,
        registry: ShapeRegistry,
    ) -> Self {
        let label_style = TextStyle {
            font_family: settings.label_font_family.clone(),
            font_size: settings.label_font_size,
            font_weight: None,
        };
        let status_interval = settings.status_refresh_interval;
        Self {
            settings,
            measurer,
            label_style,
            registry,
            paper: Paper::default(),
            model: GraphModel::default(),
            filters_ready: false,
            port_index: FxHashMap::default(),
            configured: None,
            status_interval,
            zoom: 1.0,
            show_address: false,
            stp_available: false,
            stp_roots: IndexSet::new(),
            stp_blocked: IndexSet::new(),
            highlighted: None,
            dirty: false,
        }
    }

    /// Installs the status palette and the effect filters on the paper. Repeated calls add
    /// nothing.
    pub fn init_filters(&mut self) {
        let added = filter_palette()
            .into_iter()
            .filter(|def| self.paper.add_filter(def.clone()))
            .count();
        self.filters_ready = true;
        tracing::debug!(added, "paper filters initialized");
    }

    pub fn filters_ready(&self) -> bool {
        self.filters_ready
    }

    /// Rebuilds the whole model from `snapshot`.
    pub fn render_map(
        &mut self,
        snapshot: &TopologySnapshot,
        opts: RenderOptions,
    ) -> Result<RenderOutcome> {
        if !self.filters_ready {
            return Err(Error::FiltersNotInitialized);
        }
        self.reset_map_state();
        self.show_address = opts.show_address;

        self.configured = if snapshot.is_configured() {
            snapshot
                .width
                .zip(snapshot.height)
                .map(|(w, h)| Size::new(w, h))
        } else {
            None
        };
        self.paper.grid_size = snapshot.grid_size;
        self.paper.background = snapshot.background_image.as_ref().map(|href| Background {
            href: href.clone(),
            opacity: snapshot.background_opacity.unwrap_or(1.0).clamp(0.0, 1.0),
        });

        let max_links = snapshot.max_links.unwrap_or(self.settings.max_links);
        let skip_external = !opts.view_all && snapshot.links.len() > max_links;

        let mut nodes = Vec::with_capacity(snapshot.nodes.len());
        let mut badges = Vec::new();
        let mut skipped_nodes = 0;
        for sn in &snapshot.nodes {
            if skip_external && sn.external {
                skipped_nodes += 1;
                continue;
            }
            let node = self.build_node(sn)?;
            for group in &sn.ports {
                self.port_index.insert(group.id.clone(), node.id.clone());
                for port in &group.ports {
                    self.port_index.insert(port.clone(), node.id.clone());
                }
            }
            badges.extend(self.node_badges(sn, &node));
            nodes.push(node);
        }

        let mut dropped_links = 0;
        let mut links = Vec::with_capacity(snapshot.links.len());
        for sl in &snapshot.links {
            match self.build_link(sl) {
                Some(link) => links.push(link),
                None => {
                    tracing::debug!(link = %sl.object_ref(), "link endpoint not drawn; dropped");
                    dropped_links += 1;
                }
            }
        }

        self.stp_available = nodes
            .iter()
            .any(|n| n.data.caps.iter().any(|c| c == STP_CAPABILITY));

        self.model.add_nodes(nodes);
        dropped_links += self.model.add_links(links);
        let badge_count = self.model.add_badges(badges);

        if let Some(secs) = snapshot.object_status_refresh_interval.filter(|s| *s > 0) {
            self.status_interval = Duration::from_secs(secs);
        }

        self.set_paper_dimension(None)?;

        let outcome = RenderOutcome {
            status_interval: self.status_interval,
            stp_available: self.stp_available,
            nodes: self.model.node_count(),
            links: self.model.link_count(),
            badges: badge_count,
            skipped_nodes,
            dropped_links,
        };
        tracing::info!(
            nodes = outcome.nodes,
            links = outcome.links,
            skipped = skipped_nodes,
            dropped = dropped_links,
            configured = self.configured.is_some(),
            "map rendered"
        );
        Ok(outcome)
    }

    fn reset_map_state(&mut self) {
        self.model.clear();
        self.port_index.clear();
        self.configured = None;
        self.stp_available = false;
        self.stp_roots.clear();
        self.stp_blocked.clear();
        self.highlighted = None;
        self.dirty = false;
    }

    fn build_node(&mut self, sn: &SnapshotNode) -> Result<MapNode> {
        let id = sn.object_ref().to_string();
        let mut visual = match &sn.shape {
            Some(shape) => {
                let visual = self.registry.get_image_node(shape, &sn.name)?;
                if let ShapeClass::Image(img) = &*visual.shape {
                    self.paper.ensure_image_def(&img.image);
                }
                visual
            }
            None => self.registry.get_icon_node(
                &IconDescriptor {
                    glyph: sn.glyph.unwrap_or(DEFAULT_NODE_GLYPH),
                    size_token: None,
                },
                &sn.name,
            )?,
        };
        let natural = visual.shape.size();
        let size = Size::new(
            sn.shape_width.unwrap_or(natural.width),
            sn.shape_height.unwrap_or(natural.height),
        );
        visual.label = self.compose_label(
            self.title_of(&sn.name, sn.address.as_deref()),
            sn.metrics_label.as_deref(),
            label_width(&visual, size),
        );
        Ok(MapNode {
            id,
            x: sn.x,
            y: sn.y,
            size,
            name: sn.name.clone(),
            address: sn.address.clone(),
            data: NodeData {
                kind: sn.kind.clone(),
                object_id: sn.id.clone(),
                numeric_id: sn.object_ref().numeric_id(),
                parent_id: sn.parent_id.clone(),
                caps: sn.caps.clone(),
                in_maintenance: sn.in_maintenance,
                portal: sn.portal.clone(),
                object_filter: sn.object_filter.clone(),
                metrics_template: sn.metrics_template.clone(),
                shape_width: size.width,
            },
            status: ObjectStatus::Unknown,
            metrics_label: sn.metrics_label.clone(),
            visual,
        })
    }

    fn node_badges(&self, sn: &SnapshotNode, node: &MapNode) -> Vec<Badge> {
        let mut out = Vec::new();
        if sn.in_maintenance {
            out.push(self.maintenance_badge(&node.id));
        }
        for (i, overlay) in sn.shape_overlay.iter().enumerate() {
            let Some(glyph) = char::from_u32(overlay.code) else {
                tracing::debug!(node = node.id.as_str(), code = overlay.code, "bad overlay glyph");
                continue;
            };
            out.push(Badge {
                id: Badge::overlay_id(&node.id, i),
                owner: node.id.clone(),
                kind: BadgeKind::Overlay,
                form: overlay.form,
                glyph,
                anchor: overlay.position.anchor(),
                size: self.settings.badge_size,
            });
        }
        out
    }

    fn maintenance_badge(&self, owner: &str) -> Badge {
        Badge {
            id: Badge::maintenance_id(owner),
            owner: owner.to_string(),
            kind: BadgeKind::Maintenance,
            form: BadgeForm::Circle,
            glyph: GLYPH_MAINTENANCE,
            anchor: MAINTENANCE_POSITION.anchor(),
            size: self.settings.badge_size,
        }
    }

    fn build_link(&self, sl: &SnapshotLink) -> Option<MapLink> {
        let [src_port, dst_port] = sl.ports.as_slice() else {
            return None;
        };
        let source = self.port_index.get(src_port)?;
        let target = self.port_index.get(dst_port)?;
        Some(MapLink {
            id: sl.object_ref().to_string(),
            source: source.clone(),
            target: target.clone(),
            data: LinkData {
                kind: sl.kind.clone(),
                object_id: sl.id.clone(),
                ports: [src_port.clone(), dst_port.clone()],
                bw: sl.bw,
                metrics: IndexMap::new(),
                connector: sl.connector.clone(),
                vertices: sl.vertices.clone(),
            },
            state: LinkState::Ok,
            style: None,
            label: None,
        })
    }

    fn title_of<'a>(&self, name: &'a str, address: Option<&'a str>) -> &'a str {
        match address {
            Some(addr) if self.show_address && !addr.is_empty() => addr,
            _ => name,
        }
    }

    /// Wrapped title followed by the wrapped metrics label. A part that cannot be wrapped at
    /// all is kept verbatim.
    fn compose_label(&self, title: &str, metrics_label: Option<&str>, width: f64) -> String {
        let mut opts = WrapOptions::width(width);
        if let Some(m) = self.settings.label_line_height {
            opts = opts.with_line_height(m);
        }
        let wrap = |text: &str| {
            let wrapped = wrap_text(text, self.measurer.as_ref(), &self.label_style, opts);
            if wrapped.is_empty() {
                text.to_string()
            } else {
                wrapped
            }
        };
        let mut label = wrap(title);
        if let Some(m) = metrics_label.filter(|m| !m.trim().is_empty()) {
            label.push('\n');
            label.push_str(&wrap(m));
        }
        label
    }

    fn relabel(&mut self, node_id: &str) -> bool {
        let Some(node) = self.model.node(node_id) else {
            return false;
        };
        let label = self.compose_label(
            self.title_of(&node.name, node.address.as_deref()),
            node.metrics_label.as_deref(),
            label_width(&node.visual, node.size),
        );
        match self.model.node_mut(node_id) {
            Some(node) if node.visual.label != label => {
                node.visual.label = label;
                true
            }
            _ => false,
        }
    }

    /// Applies one status poll. Nodes not on the map are ignored; a node whose status code is
    /// not recognized is left untouched and reported in `rejected`.
    pub fn apply_object_statuses(&mut self, report: &StatusReport) -> ObjectStatusSummary {
        let mut summary = ObjectStatusSummary::default();
        for (node_id, entry) in report {
            if self.model.node(node_id).is_none() {
                summary.ignored += 1;
                continue;
            }
            let code = entry.code();
            let status = match code.status() {
                Ok(s) => s,
                Err(source) => {
                    tracing::warn!(node = node_id.as_str(), code = entry.status_code, "status rejected");
                    summary.rejected.push(Error::StatusRejected {
                        node_id: node_id.clone(),
                        source,
                    });
                    continue;
                }
            };
            let maintenance = code.in_maintenance();
            let mut label_changed = false;
            if let Some(node) = self.model.node_mut(node_id) {
                node.status = status;
                node.visual.set_status(status);
                node.data.in_maintenance = maintenance;
                if node.metrics_label != entry.metrics_label {
                    node.metrics_label = entry.metrics_label.clone();
                    label_changed = true;
                }
            }
            if label_changed {
                self.relabel(node_id);
            }
            self.set_maintenance_badge(node_id, maintenance);
            summary.updated += 1;
        }
        tracing::debug!(
            updated = summary.updated,
            ignored = summary.ignored,
            rejected = summary.rejected.len(),
            "object statuses applied"
        );
        summary
    }

    fn set_maintenance_badge(&mut self, node_id: &str, on: bool) {
        let badge_id = Badge::maintenance_id(node_id);
        if on {
            if !self.model.has_badge(&badge_id) {
                let badge = self.maintenance_badge(node_id);
                self.model.add_badge(badge);
            }
        } else {
            self.model.remove_badge(&badge_id);
        }
    }

    /// Restyles one link; `LinkState::Ok` removes any override and midpoint glyph.
    pub fn set_link_style(&mut self, link_id: &str, state: LinkState) -> bool {
        let Some(link) = self.model.link_mut(link_id) else {
            return false;
        };
        link.state = state;
        match link_state_style(state) {
            None => {
                link.style = None;
                link.label = None;
            }
            Some(s) => {
                link.style = Some(StrokeStyle {
                    stroke: s.stroke,
                    width: DEFAULT_LINK_WIDTH,
                });
                link.label = Some(LinkLabel {
                    text: s.glyph.to_string(),
                    font_size: s.font_size,
                    ratio: 0.5,
                    fill: s.stroke.to_string(),
                });
            }
        }
        true
    }

    /// Applies one load-overlay poll keyed by port id; returns the number of restyled links.
    ///
    /// Ports missing from the poll count as up with no load. A down endpoint wins over
    /// spanning-tree blocking; once both ends are up again a blocked link gets its blocked style
    /// back.
    pub fn set_load_overlay_data(&mut self, report: &OverlayReport) -> usize {
        let mut touched = 0;
        for link_id in self.model.link_ids() {
            let Some(link) = self.model.link(&link_id) else {
                continue;
            };
            let src = report.get(&link.data.ports[0]);
            let dst = report.get(&link.data.ports[1]);
            let ends = [src, dst];
            let ports = link.data.ports.clone();
            let metrics: Vec<(String, PortMetrics)> = ports
                .iter()
                .zip(ends)
                .filter_map(|(p, m)| m.map(|m| (p.clone(), m.clone())))
                .collect();

            let down = if ends.iter().flatten().any(|m| !m.admin_up()) {
                Some(LinkState::AdminDown)
            } else if ends.iter().flatten().any(|m| !m.oper_up()) {
                Some(LinkState::OperDown)
            } else {
                None
            };
            let blocked = self.stp_blocked.contains(&link_id);
            let was_blocked = link.state == LinkState::StpBlocked;

            let (src_in, src_out) = src.map_or((0.0, 0.0), |m| (m.load_in(), m.load_out()));
            let (dst_in, dst_out) = dst.map_or((0.0, 0.0), |m| (m.load_in(), m.load_out()));
            let to_dest = src_out.max(dst_in);
            let to_src = src_in.max(dst_out);
            let utilization = ratio_of(to_dest, link.data.bw.outbound)
                .max(ratio_of(to_src, link.data.bw.inbound));

            if let Some(link) = self.model.link_mut(&link_id) {
                link.data.metrics.clear();
                link.data.metrics.extend(metrics);
            }
            if let Some(state) = down {
                touched += usize::from(self.set_link_style(&link_id, state));
                continue;
            }
            if blocked {
                if !was_blocked {
                    touched += usize::from(self.set_link_style(&link_id, LinkState::StpBlocked));
                }
                continue;
            }

            let style = load_style(utilization);
            let label_ratio = if to_dest + to_src > 0.0 {
                to_dest / (to_dest + to_src)
            } else {
                0.5
            };
            if let Some(link) = self.model.link_mut(&link_id) {
                link.state = LinkState::Ok;
                link.style = Some(StrokeStyle {
                    stroke: style.stroke,
                    width: style.stroke_width,
                });
                link.label = Some(LinkLabel {
                    text: GLYPH_LOAD.to_string(),
                    font_size: LINK_LABEL_FONT_SIZE,
                    ratio: label_ratio,
                    fill: style.stroke.to_string(),
                });
                touched += 1;
                tracing::trace!(link = link_id.as_str(), utilization, "load style applied");
            }
        }
        touched
    }

    /// Drops every load/port-state override. Spanning-tree blocked links keep, or get back,
    /// their blocked style.
    pub fn reset_overlay_data(&mut self) -> usize {
        let mut reset = 0;
        for link_id in self.model.link_ids() {
            let blocked = self.stp_blocked.contains(&link_id);
            let Some(link) = self.model.link_mut(&link_id) else {
                continue;
            };
            link.data.metrics.clear();
            if blocked {
                if link.state != LinkState::StpBlocked {
                    reset += usize::from(self.set_link_style(&link_id, LinkState::StpBlocked));
                }
                continue;
            }
            if link.style.is_some() || link.label.is_some() {
                reset += 1;
            }
            link.state = LinkState::Ok;
            link.style = None;
            link.label = None;
        }
        reset
    }

    /// Switches node titles between names and addresses; metrics labels are kept.
    pub fn change_label_text(&mut self, show_address: bool) -> usize {
        self.show_address = show_address;
        let ids: Vec<String> = self.model.nodes().map(|n| n.id.clone()).collect();
        ids.iter().filter(|id| self.relabel(id)).count()
    }

    pub fn show_address(&self) -> bool {
        self.show_address
    }

    /// Host viewport size, in pixels.
    pub fn set_visible_size(&mut self, size: Size) {
        self.paper.visible = size;
    }

    /// Fits the paper to the content (or to the declared background of a configured map) and
    /// to the host viewport. Calling it again without changes yields the same geometry.
    pub fn set_paper_dimension(&mut self, zoom: Option<f64>) -> Result<()> {
        if let Some(z) = zoom {
            if !(z.is_finite() && z > 0.0) {
                return Err(Error::InvalidZoom { factor: z });
            }
            self.zoom = z;
        }
        let zoom = self.zoom;
        let pad = self.settings.paper_padding;
        let visible = self.paper.visible;

        let content = match self.configured {
            Some(bg) => Rect::new(0.0, 0.0, bg.width, bg.height),
            None => self.model.content_bbox().unwrap_or_default(),
        };
        self.paper.scale = zoom;
        self.paper.origin = (pad - content.x * zoom, pad - content.y * zoom);
        self.paper.size = Size::new(
            visible.width.max(content.width * zoom + 2.0 * pad),
            visible.height.max(content.height * zoom + 2.0 * pad),
        );
        tracing::trace!(
            width = self.paper.size.width,
            height = self.paper.size.height,
            zoom,
            "paper fitted"
        );
        Ok(())
    }

    pub fn set_zoom(&mut self, factor: f64) -> Result<()> {
        self.set_paper_dimension(Some(factor))
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Marks spanning-tree roots and blocked links, touching only what changed since the
    /// previous update. Unknown ids are ignored.
    pub fn set_stp_status(&mut self, status: &StpStatus) -> StpDelta {
        let roots: IndexSet<String> = status
            .roots
            .iter()
            .filter(|id| self.model.node(id).is_some())
            .cloned()
            .collect();
        let blocked: IndexSet<String> = status
            .blocked
            .iter()
            .filter(|id| self.model.link(id).is_some())
            .cloned()
            .collect();

        let mut delta = StpDelta::default();
        let old_roots = std::mem::take(&mut self.stp_roots);
        for id in old_roots.difference(&roots) {
            if let Some(node) = self.model.node_mut(id) {
                node.visual.stp_root = false;
                delta.mutations.push(StpMutation::RootCleared(id.clone()));
            }
        }
        for id in roots.difference(&old_roots) {
            if let Some(node) = self.model.node_mut(id) {
                node.visual.stp_root = true;
                delta.mutations.push(StpMutation::RootMarked(id.clone()));
            }
        }

        let old_blocked = std::mem::take(&mut self.stp_blocked);
        for id in old_blocked.difference(&blocked) {
            if self.set_link_style(id, LinkState::Ok) {
                delta.mutations.push(StpMutation::LinkUnblocked(id.clone()));
            }
        }
        for id in blocked.difference(&old_blocked) {
            if self.set_link_style(id, LinkState::StpBlocked) {
                delta.mutations.push(StpMutation::LinkBlocked(id.clone()));
            }
        }

        self.stp_roots = roots;
        self.stp_blocked = blocked;
        tracing::debug!(mutations = delta.len(), "spanning tree state applied");
        delta
    }

    pub fn clear_stp(&mut self) -> StpDelta {
        self.set_stp_status(&StpStatus::default())
    }

    pub fn stp_available(&self) -> bool {
        self.stp_available
    }

    /// Moves the single highlight to `node_id`, or removes it.
    pub fn highlight(&mut self, node_id: Option<&str>) -> bool {
        if self.highlighted.as_deref() == node_id {
            return false;
        }
        if let Some(prev) = self.highlighted.take() {
            if let Some(node) = self.model.node_mut(&prev) {
                node.visual.highlighted = false;
            }
        }
        let Some(id) = node_id else {
            return true;
        };
        match self.model.node_mut(id) {
            Some(node) => {
                node.visual.highlighted = true;
                self.highlighted = Some(id.to_string());
                true
            }
            None => false,
        }
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    /// Repositions a node after a drag; the layout becomes unsaved.
    pub fn move_node(&mut self, node_id: &str, x: f64, y: f64) -> bool {
        let Some(node) = self.model.node_mut(node_id) else {
            return false;
        };
        node.x = x;
        node.y = y;
        self.dirty = true;
        true
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Tracks the visible region given as a surface scroll offset.
    pub fn set_viewport(&mut self, scroll_x: f64, scroll_y: f64) {
        let (x, y) = self.paper.to_graph(scroll_x, scroll_y);
        let scale = if self.paper.scale > 0.0 {
            self.paper.scale
        } else {
            1.0
        };
        let visible = self.paper.visible;
        self.model.set_viewport(Rect::new(
            x,
            y,
            visible.width / scale,
            visible.height / scale,
        ));
    }

    /// Layout to persist: node positions, link routing and, for configured maps, the size.
    pub fn payload(&self) -> MapPayload {
        MapPayload {
            nodes: self
                .model
                .nodes()
                .map(|n| PayloadNode {
                    kind: n.data.kind.clone(),
                    id: n.data.object_id.clone(),
                    x: n.x,
                    y: n.y,
                })
                .collect(),
            links: self
                .model
                .links()
                .map(|l| PayloadLink {
                    kind: l.data.kind.clone(),
                    id: l.data.object_id.clone(),
                    connector: l.data.connector.clone(),
                    vertices: l.data.vertices.clone(),
                })
                .collect(),
            width: self.configured.map(|s| s.width),
            height: self.configured.map(|s| s.height),
        }
    }

    /// Hover text of a link: bandwidth followed by the last load seen on each port.
    pub fn link_tooltip(&self, link_id: &str) -> Option<String> {
        let link = self.model.link(link_id)?;
        let mut lines = vec![format!(
            "Bandwidth: in {} / out {}",
            humanize_bps(link.data.bw.inbound),
            humanize_bps(link.data.bw.outbound)
        )];
        for (port, m) in &link.data.metrics {
            lines.push(format!(
                "{port}: in {} / out {}",
                humanize_bps(m.load_in()),
                humanize_bps(m.load_out())
            ));
        }
        Some(lines.join("\n"))
    }

    pub fn node_for_port(&self, port_id: &str) -> Option<&str> {
        self.port_index.get(port_id).map(String::as_str)
    }

    /// Node ids to request in status polls.
    pub fn object_ids(&self) -> Vec<String> {
        self.model.nodes().map(|n| n.id.clone()).collect()
    }

    /// Port ids of every drawn link, in link order, to request in overlay polls.
    pub fn port_ids(&self) -> Vec<String> {
        let mut out = IndexSet::new();
        for l in self.model.links() {
            out.extend(l.data.ports.iter().cloned());
        }
        out.into_iter().collect()
    }

    pub fn status_interval(&self) -> Duration {
        self.status_interval
    }

    pub fn is_configured(&self) -> bool {
        self.configured.is_some()
    }

    /// Declared background size of a configured map.
    pub fn configured_size(&self) -> Option<Size> {
        self.configured
    }

    pub fn settings(&self) -> &PanelSettings {
        &self.settings
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn paper(&self) -> &Paper {
        &self.paper
    }

    pub fn registry(&self) -> &ShapeRegistry {
        &self.registry
    }
}

fn ratio_of(value: f64, capacity: f64) -> f64 {
    if capacity > 0.0 { value / capacity } else { 0.0 }
}

/// Label room for a node of `size` drawn with `visual`'s shape.
fn label_width(visual: &NodeVisual, size: Size) -> f64 {
    let natural = visual.shape.size().width;
    if natural > 0.0 {
        visual.shape.label_width() * size.width / natural
    } else {
        size.width
    }
}

fn humanize_bps(bps: f64) -> String {
    const UNITS: [&str; 5] = ["bit/s", "Kbit/s", "Mbit/s", "Gbit/s", "Tbit/s"];
    if !bps.is_finite() || bps <= 0.0 {
        return "0 bit/s".to_string();
    }
    let mut value = bps;
    let mut unit = 0;
    while value >= 1000.0 && unit + 1 < UNITS.len() {
        value /= 1000.0;
        unit += 1;
    }
    if (value - value.round()).abs() < 0.05 {
        format!("{:.0} {}", value.round(), UNITS[unit])
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests;
