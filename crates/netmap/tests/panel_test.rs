use netmap::panel::{
    FetchData, FetchKind, FetchResponse, MapBackend, MapEvent, MapPanel, SelectionAction, pump,
};
use netmap::render::{ImageDescriptor, Rect, StaticImageSource};
use netmap::schedule::{FRAME_INTERVAL, TimerKind};
use netmap::{
    HeadlessError, HeadlessResult, OverlayMode, OverlayReport, PanelSettings, StatusReport,
    StpStatus, TopologySnapshot,
};
use std::path::PathBuf;
use std::time::{Duration, Instant};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn fixture(name: &str) -> String {
    let path = workspace_root().join("fixtures").join("maps").join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
}

#[derive(Default)]
struct FixtureBackend {
    fail_status: bool,
    served: Vec<&'static str>,
}

impl MapBackend for FixtureBackend {
    fn fetch(&mut self, kind: &FetchKind) -> HeadlessResult<FetchData> {
        match kind {
            FetchKind::Snapshot { map_id } => {
                self.served.push("snapshot");
                let text = fixture(&format!("{map_id}.json"));
                Ok(FetchData::Snapshot(TopologySnapshot::from_json_str(&text)?))
            }
            FetchKind::ObjectStatus { .. } => {
                self.served.push("status");
                if self.fail_status {
                    return Err(HeadlessError::Fetch {
                        message: "status service unavailable".to_string(),
                    });
                }
                let report: StatusReport = serde_json::from_str(&fixture("campus.status.json"))
                    .map_err(netmap::Error::from)?;
                Ok(FetchData::ObjectStatus(report))
            }
            FetchKind::Overlay { .. } => {
                self.served.push("overlay");
                let report: OverlayReport = serde_json::from_str(&fixture("campus.overlay.json"))
                    .map_err(netmap::Error::from)?;
                Ok(FetchData::Overlay(report))
            }
            FetchKind::Stp { .. } => {
                self.served.push("stp");
                let status: StpStatus = serde_json::from_str(&fixture("campus.stp.json"))
                    .map_err(netmap::Error::from)?;
                Ok(FetchData::Stp(status))
            }
        }
    }
}

fn panel() -> MapPanel {
    let stencils: Vec<ImageDescriptor> =
        serde_json::from_str(&fixture("stencils.json")).expect("stencils");
    let mut images = StaticImageSource::new();
    for s in stencils {
        images.insert(s);
    }
    MapPanel::with_settings(PanelSettings::default(), Box::new(images))
}

fn loaded(t0: Instant) -> (MapPanel, FixtureBackend) {
    let mut p = panel();
    let mut backend = FixtureBackend::default();
    p.load_map("campus").expect("load");
    pump(&mut p, &mut backend, t0).expect("pump");
    p.drain_events();
    (p, backend)
}

#[test]
fn loading_a_map_renders_it_and_polls_statuses() {
    let t0 = Instant::now();
    let mut p = panel();
    let mut backend = FixtureBackend::default();
    p.load_map("campus").expect("load");
    let served = pump(&mut p, &mut backend, t0).expect("pump");
    assert_eq!(served, 2);
    assert_eq!(backend.served, vec!["snapshot", "status"]);

    let events = p.drain_events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0], MapEvent::StpAvailability(true));
    assert!(matches!(&events[1], MapEvent::Rendered(o) if o.nodes == 2 && o.links == 1));
    assert_eq!(
        events[2],
        MapEvent::StatusApplied {
            updated: 2,
            rejected: 0
        }
    );
    assert!(p.scheduler().is_active(TimerKind::StatusPoll));
    assert!(p.scheduler().is_active(TimerKind::Ticker));
    assert!(!p.scheduler().is_active(TimerKind::OverlayPoll));
}

#[test]
fn responses_for_an_older_map_are_dropped() {
    let t0 = Instant::now();
    let mut p = panel();
    let mut backend = FixtureBackend::default();
    p.load_map("campus").expect("load");
    let snapshot = p.take_requests().remove(0);
    p.deliver(
        FetchResponse {
            ticket: snapshot.ticket,
            result: backend.fetch(&snapshot.kind),
        },
        t0,
    )
    .expect("deliver snapshot");
    let status = p.take_requests().remove(0);
    assert!(matches!(status.kind, FetchKind::ObjectStatus { .. }));
    p.drain_events();

    p.load_map("configured").expect("reload");
    p.deliver(
        FetchResponse {
            ticket: status.ticket,
            result: backend.fetch(&status.kind),
        },
        t0,
    )
    .expect("stale delivery is not an error");
    assert!(p.drain_events().is_empty());
    let core = p
        .renderer()
        .model()
        .node("managedobject:1")
        .expect("campus is still drawn");
    assert_eq!(core.visual.css_class.as_deref(), Some("gf gf-3x gf-unknown"));
}

#[test]
fn failed_fetches_raise_a_notice_and_polling_continues() {
    let t0 = Instant::now();
    let mut p = panel();
    let mut backend = FixtureBackend {
        fail_status: true,
        ..Default::default()
    };
    p.load_map("campus").expect("load");
    pump(&mut p, &mut backend, t0).expect("pump");
    let events = p.drain_events();
    assert_eq!(
        events.last(),
        Some(&MapEvent::Notice(
            "fetch failed: status service unavailable".to_string()
        ))
    );
    assert!(p.scheduler().is_active(TimerKind::StatusPoll));

    // The snapshot asks for a poll every 30 s.
    p.advance(t0 + Duration::from_secs(30));
    assert_eq!(p.take_requests().len(), 1);
}

#[test]
fn ticker_counts_seconds_since_the_last_status_poll() {
    let t0 = Instant::now();
    let (mut p, mut backend) = loaded(t0);
    let mut ticks = Vec::new();
    for k in 1..=6 {
        p.advance(t0 + Duration::from_secs(5 * k));
        ticks.extend(p.drain_events());
    }
    assert_eq!(
        ticks,
        ["5 sec", "10 sec", "15 sec", "20 sec", "25 sec", "30 sec"]
            .iter()
            .map(|s| MapEvent::Tick(s.to_string()))
            .collect::<Vec<_>>()
    );

    // The 30 s status poll came due with the last tick.
    let t30 = t0 + Duration::from_secs(30);
    pump(&mut p, &mut backend, t30).expect("pump");
    p.drain_events();
    p.advance(t30 + Duration::from_secs(5));
    assert_eq!(p.drain_events(), vec![MapEvent::Tick("5 sec".to_string())]);
}

#[test]
fn overlay_mode_controls_the_overlay_poll() {
    let t0 = Instant::now();
    let (mut p, mut backend) = loaded(t0);
    p.set_overlay_mode(OverlayMode::Load, t0).expect("overlay on");
    assert!(p.scheduler().is_active(TimerKind::OverlayPoll));
    pump(&mut p, &mut backend, t0).expect("pump");
    assert_eq!(p.drain_events(), vec![MapEvent::OverlayApplied { links: 1 }]);
    let link = p.renderer().model().link("link:1001").expect("link");
    assert_eq!(link.style.map(|s| s.stroke), Some("#990000"));

    p.set_overlay_mode(OverlayMode::None, t0).expect("overlay off");
    assert!(!p.scheduler().is_active(TimerKind::OverlayPoll));
    assert_eq!(p.drain_events(), vec![MapEvent::OverlayReset]);
    let link = p.renderer().model().link("link:1001").expect("link");
    assert!(link.style.is_none());
}

#[test]
fn stp_is_fetched_once_per_toggle() {
    let t0 = Instant::now();
    let (mut p, mut backend) = loaded(t0);
    p.toggle_stp(true).expect("stp on");
    pump(&mut p, &mut backend, t0).expect("pump");
    assert_eq!(p.drain_events(), vec![MapEvent::StpApplied { mutations: 2 }]);

    p.advance(t0 + Duration::from_secs(600));
    assert!(
        p.take_requests()
            .iter()
            .all(|r| !matches!(r.kind, FetchKind::Stp { .. }))
    );

    p.toggle_stp(false).expect("stp off");
    assert_eq!(p.drain_events(), vec![MapEvent::StpApplied { mutations: 2 }]);
}

#[test]
fn selection_dispatches_on_the_object_type() {
    let t0 = Instant::now();
    let (mut p, _) = loaded(t0);
    assert_eq!(
        p.select("managedobject:1"),
        Some(SelectionAction::InspectObject {
            object_id: "1".to_string()
        })
    );
    assert_eq!(p.renderer().highlighted(), Some("managedobject:1"));
    assert_eq!(
        p.select("link:1001"),
        Some(SelectionAction::InspectLink {
            link_id: "1001".to_string()
        })
    );
    assert_eq!(p.renderer().highlighted(), None);
    assert_eq!(p.select("managedobject:404"), None);
    assert_eq!(p.drain_events().len(), 2);

    assert!(p.context_menu("managedobject:2", 10.0, 20.0));
    assert_eq!(
        p.poll_event(),
        Some(MapEvent::ContextMenu {
            id: "managedobject:2".to_string(),
            kind: "managedobject".to_string(),
            x: 10.0,
            y: 20.0,
        })
    );
}

#[test]
fn drag_marks_the_map_dirty_until_saved() {
    let t0 = Instant::now();
    let (mut p, _) = loaded(t0);
    assert!(p.drag("managedobject:2", 320.0, 110.0));
    assert!(p.is_dirty());
    let payload = p.save().expect("save");
    assert!(!p.is_dirty());
    let moved = payload
        .nodes
        .iter()
        .find(|n| n.id == "2")
        .expect("payload node");
    assert_eq!((moved.x, moved.y), (320.0, 110.0));
    assert_eq!(
        p.drain_events(),
        vec![
            MapEvent::Dragged {
                id: "managedobject:2".to_string(),
                x: 320.0,
                y: 110.0
            },
            MapEvent::Saved
        ]
    );
}

#[test]
fn scrolling_is_throttled_to_one_update_per_frame() {
    let t0 = Instant::now();
    let (mut p, _) = loaded(t0);
    p.resize(400.0, 300.0).expect("resize");
    p.on_scroll(10.0, 20.0, t0);
    p.on_scroll(20.0, 30.0, t0 + Duration::from_millis(4));
    p.on_scroll(30.0, 40.0, t0 + Duration::from_millis(8));
    p.advance(t0 + FRAME_INTERVAL);
    // The paper origin sits at (-80, -80): the content starts at (100, 100) plus 20px padding.
    assert_eq!(
        p.drain_events(),
        vec![MapEvent::ViewportChanged(Rect::new(
            110.0, 120.0, 400.0, 300.0
        ))]
    );
    assert_eq!(p.renderer().model().viewport(), Rect::new(110.0, 120.0, 400.0, 300.0));
}

#[test]
fn view_all_reloads_the_map() {
    let t0 = Instant::now();
    let (mut p, mut backend) = loaded(t0);
    let before = p.generation();
    p.set_view_all(true).expect("view all");
    assert!(p.generation() > before);
    pump(&mut p, &mut backend, t0).expect("pump");
    assert_eq!(p.renderer().model().node_count(), 3);
    assert_eq!(p.renderer().model().link_count(), 3);
}

#[test]
fn teardown_stops_everything() {
    let t0 = Instant::now();
    let (mut p, _) = loaded(t0);
    p.set_overlay_mode(OverlayMode::Load, t0).expect("overlay on");
    p.on_scroll(5.0, 5.0, t0);
    p.teardown();
    assert!(p.is_torn_down());
    assert!(p.scheduler().is_shut_down());
    assert!(!p.scheduler().frame_pending());
    assert!(p.take_requests().is_empty());
    p.advance(t0 + Duration::from_secs(3600));
    assert!(p.take_requests().is_empty());
    assert!(matches!(p.load_map("campus"), Err(HeadlessError::TornDown)));
}

#[test]
fn interactions_after_teardown_are_ignored() {
    let t0 = Instant::now();
    let (mut p, _) = loaded(t0);
    p.drain_events();
    let before = p.renderer().payload();
    p.teardown();

    assert_eq!(p.select("managedobject:2"), None);
    assert!(!p.context_menu("managedobject:2", 1.0, 1.0));
    assert!(!p.drag("managedobject:2", 500.0, 500.0));
    assert_eq!(p.set_show_address(true), 0);
    assert!(matches!(p.resize(800.0, 600.0), Err(HeadlessError::TornDown)));
    assert!(matches!(p.set_zoom(2.0), Err(HeadlessError::TornDown)));
    assert!(matches!(p.save(), Err(HeadlessError::TornDown)));

    assert!(p.drain_events().is_empty());
    assert!(!p.is_dirty());
    assert_eq!(p.renderer().payload(), before);
}
