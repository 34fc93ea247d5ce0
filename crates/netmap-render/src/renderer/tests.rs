use super::*;
use crate::shapes::StaticImageSource;
use crate::text::DeterministicTextMeasurer;
use serde_json::json;

fn renderer(settings: PanelSettings) -> Renderer {
    let registry = ShapeRegistry::new(
        settings.icon_size.clone(),
        Size::new(settings.icon_width, settings.icon_height),
        Box::new(StaticImageSource::new()),
    );
    Renderer::new(
        settings,
        Arc::new(DeterministicTextMeasurer::default()),
        registry,
    )
}

fn single_node() -> TopologySnapshot {
    serde_json::from_value(json!({
        "nodes": [
            {"type": "managedobject", "id": 7, "name": "edge router north", "address": "10.0.0.7"}
        ],
        "links": []
    }))
    .expect("snapshot")
}

#[test]
fn rendering_requires_filters() {
    let mut r = renderer(PanelSettings::default());
    let err = r
        .render_map(&single_node(), RenderOptions::default())
        .expect_err("filters missing");
    assert!(matches!(err, Error::FiltersNotInitialized));

    r.init_filters();
    r.init_filters();
    assert_eq!(r.paper().defs().filters.len(), 8);
    r.render_map(&single_node(), RenderOptions::default())
        .expect("render");
}

#[test]
fn icon_labels_get_twice_the_icon_width() {
    let mut r = renderer(PanelSettings::default());
    r.init_filters();
    r.render_map(&single_node(), RenderOptions::default())
        .expect("render");
    let node = r.model().node("managedobject:7").expect("node");
    assert_eq!(label_width(&node.visual, node.size), 96.0);
    // 17 glyphs at 6px overflow 96px: the last word fills the line and its tail wraps.
    assert_eq!(node.visual.label, "edge router nort\nh");
}

#[test]
fn label_line_height_does_not_affect_unbounded_labels() {
    let settings = PanelSettings {
        label_line_height: Some(1.0),
        ..PanelSettings::default()
    };
    let mut r = renderer(settings);
    r.init_filters();
    r.render_map(&single_node(), RenderOptions::default())
        .expect("render");
    let node = r.model().node("managedobject:7").expect("node");
    assert_eq!(node.visual.label, "edge router nort\nh");
}

#[test]
fn unknown_image_shapes_fail_the_render() {
    let mut r = renderer(PanelSettings::default());
    r.init_filters();
    let snapshot: TopologySnapshot = serde_json::from_value(json!({
        "nodes": [{"type": "managedobject", "id": 1, "name": "x", "shape": "Vendor/missing"}]
    }))
    .expect("snapshot");
    let err = r
        .render_map(&snapshot, RenderOptions::default())
        .expect_err("unknown shape");
    assert!(matches!(err, Error::UnknownShape { name } if name == "Vendor/missing"));
}

#[test]
fn zoom_must_be_positive() {
    let mut r = renderer(PanelSettings::default());
    assert!(matches!(
        r.set_zoom(0.0),
        Err(Error::InvalidZoom { factor }) if factor == 0.0
    ));
    assert!(r.set_zoom(f64::NAN).is_err());
    assert_eq!(r.zoom(), 1.0);
    r.set_zoom(2.0).expect("zoom");
    assert_eq!(r.zoom(), 2.0);
}

#[test]
fn bandwidth_is_humanized() {
    assert_eq!(humanize_bps(0.0), "0 bit/s");
    assert_eq!(humanize_bps(950.0), "950 bit/s");
    assert_eq!(humanize_bps(1_000_000_000.0), "1 Gbit/s");
    assert_eq!(humanize_bps(810_000_000.0), "810 Mbit/s");
    assert_eq!(humanize_bps(1_500_000.0), "1.5 Mbit/s");
}

#[test]
fn utilization_without_capacity_is_zero() {
    assert_eq!(ratio_of(500.0, 0.0), 0.0);
    assert_eq!(ratio_of(500.0, 1000.0), 0.5);
}
