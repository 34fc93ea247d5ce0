//! The map panel: owns a renderer and its timers, talks to the backend through typed fetch
//! requests and reports to the host through a typed event queue.

use crate::schedule::{Due, Scheduler};
use crate::{HeadlessError, HeadlessResult};
use netmap_core::{
    MapPayload, OverlayMode, OverlayReport, PanelSettings, StatusReport, StpStatus,
    TopologySnapshot,
};
use netmap_render::geom::{Rect, Size};
use netmap_render::text::DeterministicTextMeasurer;
use netmap_render::{ImageSource, RenderOptions, RenderOutcome, Renderer, ShapeRegistry};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

/// Identifies the request a response answers. Responses from an older generation than the
/// panel's current one are stale and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub generation: u64,
    pub seq: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchKind {
    Snapshot { map_id: String },
    ObjectStatus { map_id: String, objects: Vec<String> },
    Overlay {
        map_id: String,
        mode: OverlayMode,
        ports: Vec<String>,
    },
    Stp { map_id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub ticket: Ticket,
    pub kind: FetchKind,
}

#[derive(Debug, Clone)]
pub enum FetchData {
    Snapshot(TopologySnapshot),
    ObjectStatus(StatusReport),
    Overlay(OverlayReport),
    Stp(StpStatus),
}

#[derive(Debug)]
pub struct FetchResponse {
    pub ticket: Ticket,
    pub result: HeadlessResult<FetchData>,
}

/// What the host should open for a selected cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionAction {
    InspectObject { object_id: String },
    OpenSegment { segment_id: String },
    InspectLinkGroup { object_id: String },
    InspectLink { link_id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    Rendered(RenderOutcome),
    StpAvailability(bool),
    StatusApplied { updated: usize, rejected: usize },
    /// Time since the last successful status poll, e.g. `"10 sec"`.
    Tick(String),
    OverlayApplied { links: usize },
    OverlayReset,
    StpApplied { mutations: usize },
    /// User-visible message, typically a failed fetch.
    Notice(String),
    Selected {
        id: String,
        action: Option<SelectionAction>,
    },
    ContextMenu {
        id: String,
        kind: String,
        x: f64,
        y: f64,
    },
    Dragged { id: String, x: f64, y: f64 },
    ViewportChanged(Rect),
    Saved,
}

pub struct MapPanel {
    renderer: Renderer,
    scheduler: Scheduler,
    map_id: Option<String>,
    generation: u64,
    seq: u64,
    requests: VecDeque<FetchRequest>,
    events: VecDeque<MapEvent>,
    overlay_mode: OverlayMode,
    stp_enabled: bool,
    view_all: bool,
    show_address: bool,
    rendered: bool,
    pending_scroll: Option<(f64, f64)>,
    torn_down: bool,
}

impl MapPanel {
    /// Wraps `renderer`; its filters are installed here, once for the panel's lifetime.
    pub fn new(mut renderer: Renderer) -> Self {
        renderer.init_filters();
        let scheduler = Scheduler::new(renderer.settings().ticker_interval);
        Self {
            renderer,
            scheduler,
            map_id: None,
            generation: 0,
            seq: 0,
            requests: VecDeque::new(),
            events: VecDeque::new(),
            overlay_mode: OverlayMode::None,
            stp_enabled: false,
            view_all: false,
            show_address: false,
            rendered: false,
            pending_scroll: None,
            torn_down: false,
        }
    }

    /// Panel measuring labels with the deterministic measurer.
    pub fn with_settings(
        settings: PanelSettings,
        images: Box<dyn ImageSource + Send + Sync>,
    ) -> Self {
        let registry = ShapeRegistry::new(
            settings.icon_size.clone(),
            Size::new(settings.icon_width, settings.icon_height),
            images,
        );
        Self::new(Renderer::new(
            settings,
            Arc::new(DeterministicTextMeasurer::default()),
            registry,
        ))
    }

    /// Starts loading `map_id`. Everything in flight for the previous map becomes stale.
    pub fn load_map(&mut self, map_id: impl Into<String>) -> HeadlessResult<()> {
        self.ensure_alive()?;
        let map_id = map_id.into();
        self.generation += 1;
        self.scheduler.stop_status();
        self.scheduler.stop_overlay();
        self.scheduler.stop_ticker();
        self.rendered = false;
        tracing::debug!(map = map_id.as_str(), generation = self.generation, "loading map");
        self.push_request(FetchKind::Snapshot {
            map_id: map_id.clone(),
        });
        self.map_id = Some(map_id);
        Ok(())
    }

    /// Applies one backend answer. Stale answers are dropped without effect.
    pub fn deliver(&mut self, response: FetchResponse, now: Instant) -> HeadlessResult<()> {
        self.ensure_alive()?;
        if response.ticket.generation != self.generation {
            tracing::debug!(
                ticket = response.ticket.generation,
                current = self.generation,
                "stale response dropped"
            );
            return Ok(());
        }
        let data = match response.result {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!(error = %err, "fetch failed");
                self.events.push_back(MapEvent::Notice(err.to_string()));
                return Ok(());
            }
        };
        match data {
            FetchData::Snapshot(snapshot) => self.on_snapshot(&snapshot, now)?,
            FetchData::ObjectStatus(report) => self.on_status(&report, now),
            FetchData::Overlay(report) => {
                if self.overlay_mode == OverlayMode::None {
                    tracing::debug!("overlay data after overlay was switched off");
                } else {
                    let links = self.renderer.set_load_overlay_data(&report);
                    self.events.push_back(MapEvent::OverlayApplied { links });
                }
            }
            FetchData::Stp(status) => {
                if self.stp_enabled {
                    let delta = self.renderer.set_stp_status(&status);
                    self.events.push_back(MapEvent::StpApplied {
                        mutations: delta.len(),
                    });
                }
            }
        }
        Ok(())
    }

    fn on_snapshot(&mut self, snapshot: &TopologySnapshot, now: Instant) -> HeadlessResult<()> {
        let outcome = self.renderer.render_map(
            snapshot,
            RenderOptions {
                view_all: self.view_all,
                show_address: self.show_address,
            },
        )?;
        // Answers to requests issued for the previous rendering are stale from here on.
        self.generation += 1;
        self.rendered = true;
        self.pending_scroll = None;

        self.scheduler.start_status(now, outcome.status_interval);
        self.request_status();
        if self.overlay_mode != OverlayMode::None {
            self.request_overlay();
            self.scheduler.start_overlay(now, outcome.status_interval);
        }
        if self.stp_enabled && outcome.stp_available {
            self.request_stp();
        }
        self.events
            .push_back(MapEvent::StpAvailability(outcome.stp_available));
        self.events.push_back(MapEvent::Rendered(outcome));
        Ok(())
    }

    fn on_status(&mut self, report: &StatusReport, now: Instant) {
        let summary = self.renderer.apply_object_statuses(report);
        for err in &summary.rejected {
            self.events.push_back(MapEvent::Notice(err.to_string()));
        }
        self.events.push_back(MapEvent::StatusApplied {
            updated: summary.updated,
            rejected: summary.rejected.len(),
        });
        self.scheduler.restart_ticker(now);
    }

    /// Runs the timers up to `now`: due polls are queued as requests, ticks and viewport
    /// updates become events.
    pub fn advance(&mut self, now: Instant) {
        if self.torn_down {
            return;
        }
        for due in self.scheduler.advance(now) {
            match due {
                Due::StatusPoll => self.request_status(),
                Due::OverlayPoll => self.request_overlay(),
                Due::Tick { seconds } => {
                    self.events.push_back(MapEvent::Tick(format!("{seconds} sec")));
                }
                Due::Frame => self.on_animation_frame(),
            }
        }
    }

    pub fn set_overlay_mode(&mut self, mode: OverlayMode, now: Instant) -> HeadlessResult<()> {
        self.ensure_alive()?;
        if mode == self.overlay_mode {
            return Ok(());
        }
        self.overlay_mode = mode;
        match mode {
            OverlayMode::None => {
                self.scheduler.stop_overlay();
                self.renderer.reset_overlay_data();
                self.events.push_back(MapEvent::OverlayReset);
            }
            OverlayMode::Load => {
                if self.rendered {
                    self.request_overlay();
                    self.scheduler
                        .start_overlay(now, self.renderer.status_interval());
                }
            }
        }
        Ok(())
    }

    pub fn overlay_mode(&self) -> OverlayMode {
        self.overlay_mode
    }

    /// Spanning-tree display is a one-shot fetch per toggle; there is no refresh loop.
    pub fn toggle_stp(&mut self, enabled: bool) -> HeadlessResult<()> {
        self.ensure_alive()?;
        if enabled == self.stp_enabled {
            return Ok(());
        }
        self.stp_enabled = enabled;
        if enabled {
            if self.rendered && self.renderer.stp_available() {
                self.request_stp();
            }
        } else {
            let delta = self.renderer.clear_stp();
            self.events.push_back(MapEvent::StpApplied {
                mutations: delta.len(),
            });
        }
        Ok(())
    }

    /// Toggles external nodes on crowded maps; the current map is fetched again.
    pub fn set_view_all(&mut self, view_all: bool) -> HeadlessResult<()> {
        self.ensure_alive()?;
        if view_all == self.view_all {
            return Ok(());
        }
        self.view_all = view_all;
        match self.map_id.clone() {
            Some(map_id) => self.load_map(map_id),
            None => Ok(()),
        }
    }

    pub fn set_show_address(&mut self, show_address: bool) -> usize {
        self.show_address = show_address;
        if self.rendered && !self.torn_down {
            self.renderer.change_label_text(show_address)
        } else {
            0
        }
    }

    /// Selects a node or link: moves the highlight and tells the host what to open.
    pub fn select(&mut self, id: &str) -> Option<SelectionAction> {
        if self.torn_down {
            return None;
        }
        let action = if let Some(node) = self.renderer.model().node(id) {
            let data = &node.data;
            let action = match data.kind.as_str() {
                "managedobject" => Some(SelectionAction::InspectObject {
                    object_id: data.object_id.clone(),
                }),
                "objectgroup" | "objectsegment" => Some(SelectionAction::OpenSegment {
                    segment_id: data.object_id.clone(),
                }),
                "cloud" => Some(SelectionAction::InspectLinkGroup {
                    object_id: data.object_id.clone(),
                }),
                _ => None,
            };
            self.renderer.highlight(Some(id));
            action
        } else if let Some(link) = self.renderer.model().link(id) {
            let action = (link.data.kind == "link").then(|| SelectionAction::InspectLink {
                link_id: link.data.object_id.clone(),
            });
            self.renderer.highlight(None);
            action
        } else {
            return None;
        };
        self.events.push_back(MapEvent::Selected {
            id: id.to_string(),
            action: action.clone(),
        });
        action
    }

    pub fn context_menu(&mut self, id: &str, x: f64, y: f64) -> bool {
        if self.torn_down {
            return false;
        }
        let kind = if let Some(node) = self.renderer.model().node(id) {
            node.data.kind.clone()
        } else if let Some(link) = self.renderer.model().link(id) {
            link.data.kind.clone()
        } else {
            return false;
        };
        self.events.push_back(MapEvent::ContextMenu {
            id: id.to_string(),
            kind,
            x,
            y,
        });
        true
    }

    /// Ends a drag: the node is moved and the layout is left unsaved.
    pub fn drag(&mut self, id: &str, x: f64, y: f64) -> bool {
        if self.torn_down || !self.renderer.move_node(id, x, y) {
            return false;
        }
        self.events.push_back(MapEvent::Dragged {
            id: id.to_string(),
            x,
            y,
        });
        true
    }

    /// Records a scroll position; the viewport follows on the next animation frame.
    pub fn on_scroll(&mut self, scroll_x: f64, scroll_y: f64, now: Instant) {
        if self.torn_down {
            return;
        }
        self.pending_scroll = Some((scroll_x, scroll_y));
        self.scheduler.request_frame(now);
    }

    fn on_animation_frame(&mut self) {
        let Some((x, y)) = self.pending_scroll.take() else {
            return;
        };
        self.renderer.set_viewport(x, y);
        self.events
            .push_back(MapEvent::ViewportChanged(self.renderer.model().viewport()));
    }

    pub fn resize(&mut self, width: f64, height: f64) -> HeadlessResult<()> {
        self.ensure_alive()?;
        self.renderer.set_visible_size(Size::new(width, height));
        self.renderer.set_paper_dimension(None)?;
        Ok(())
    }

    pub fn set_zoom(&mut self, factor: f64) -> HeadlessResult<()> {
        self.ensure_alive()?;
        self.renderer.set_zoom(factor)?;
        Ok(())
    }

    /// Layout to hand to the backend; the map counts as saved afterwards.
    pub fn save(&mut self) -> HeadlessResult<MapPayload> {
        self.ensure_alive()?;
        let payload = self.renderer.payload();
        self.renderer.mark_saved();
        self.events.push_back(MapEvent::Saved);
        Ok(payload)
    }

    pub fn is_dirty(&self) -> bool {
        self.renderer.is_dirty()
    }

    /// Stops all timers, cancels the pending frame and drops queued requests.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.scheduler.cancel_frame();
        self.scheduler.shutdown();
        self.requests.clear();
        self.pending_scroll = None;
        self.torn_down = true;
        tracing::debug!(
            map = self.map_id.as_deref().unwrap_or_default(),
            "map panel torn down"
        );
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn take_requests(&mut self) -> Vec<FetchRequest> {
        self.requests.drain(..).collect()
    }

    pub fn poll_event(&mut self) -> Option<MapEvent> {
        self.events.pop_front()
    }

    pub fn drain_events(&mut self) -> Vec<MapEvent> {
        self.events.drain(..).collect()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    fn ensure_alive(&self) -> HeadlessResult<()> {
        if self.torn_down {
            return Err(HeadlessError::TornDown);
        }
        Ok(())
    }

    fn push_request(&mut self, kind: FetchKind) {
        self.seq += 1;
        self.requests.push_back(FetchRequest {
            ticket: Ticket {
                generation: self.generation,
                seq: self.seq,
            },
            kind,
        });
    }

    fn request_status(&mut self) {
        let Some(map_id) = self.map_id.clone() else {
            return;
        };
        let objects = self.renderer.object_ids();
        self.push_request(FetchKind::ObjectStatus { map_id, objects });
    }

    fn request_overlay(&mut self) {
        let Some(map_id) = self.map_id.clone() else {
            return;
        };
        let ports = self.renderer.port_ids();
        self.push_request(FetchKind::Overlay {
            map_id,
            mode: self.overlay_mode,
            ports,
        });
    }

    fn request_stp(&mut self) {
        if let Some(map_id) = self.map_id.clone() {
            self.push_request(FetchKind::Stp { map_id });
        }
    }
}

impl Drop for MapPanel {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Synchronous data source answering the panel's requests.
pub trait MapBackend {
    fn fetch(&mut self, kind: &FetchKind) -> HeadlessResult<FetchData>;
}

/// Serves queued requests from `backend` until the panel stops asking; returns how many were
/// answered.
pub fn pump(
    panel: &mut MapPanel,
    backend: &mut dyn MapBackend,
    now: Instant,
) -> HeadlessResult<usize> {
    let mut served = 0;
    loop {
        let requests = panel.take_requests();
        if requests.is_empty() {
            return Ok(served);
        }
        for request in requests {
            let result = backend.fetch(&request.kind);
            served += 1;
            panel.deliver(
                FetchResponse {
                    ticket: request.ticket,
                    result,
                },
                now,
            )?;
        }
    }
}
