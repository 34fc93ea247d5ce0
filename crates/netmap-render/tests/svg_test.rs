use netmap_core::{OverlayReport, PanelSettings, StatusReport, TopologySnapshot};
use netmap_render::geom::Size;
use netmap_render::text::DeterministicTextMeasurer;
use netmap_render::{
    ImageDescriptor, RenderOptions, Renderer, ShapeRegistry, StaticImageSource, SvgRenderOptions,
    render_map_svg,
};
use std::path::PathBuf;
use std::sync::Arc;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn fixture(name: &str) -> String {
    let path = workspace_root().join("fixtures").join("maps").join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
}

fn rendered(name: &str) -> Renderer {
    let stencils: Vec<ImageDescriptor> =
        serde_json::from_str(&fixture("stencils.json")).expect("stencils");
    let mut images = StaticImageSource::new();
    for s in stencils {
        images.insert(s);
    }
    let settings = PanelSettings::default();
    let registry = ShapeRegistry::new(
        settings.icon_size.clone(),
        Size::new(settings.icon_width, settings.icon_height),
        Box::new(images),
    );
    let mut r = Renderer::new(
        settings,
        Arc::new(DeterministicTextMeasurer::default()),
        registry,
    );
    r.init_filters();
    let snapshot = TopologySnapshot::from_json_str(&fixture(name)).expect("snapshot");
    r.render_map(
        &snapshot,
        RenderOptions {
            view_all: true,
            show_address: false,
        },
    )
    .expect("render");
    r
}

fn class_of<'a>(n: &roxmltree::Node<'a, '_>) -> &'a str {
    n.attribute("class").unwrap_or_default()
}

#[test]
fn svg_contains_defs_nodes_links_and_badges() {
    let mut r = rendered("campus.json");
    let status: StatusReport =
        serde_json::from_str(&fixture("campus.status.json")).expect("status");
    r.apply_object_statuses(&status);
    let overlay: OverlayReport =
        serde_json::from_str(&fixture("campus.overlay.json")).expect("overlay");
    r.set_load_overlay_data(&overlay);

    let svg = render_map_svg(&r, &SvgRenderOptions::default());
    let doc = roxmltree::Document::parse(&svg).expect("svg parses");
    let root = doc.root_element();
    assert_eq!(root.tag_name().name(), "svg");

    let filters: Vec<&str> = doc
        .descendants()
        .filter(|n| n.has_tag_name("filter"))
        .filter_map(|n| n.attribute("id"))
        .collect();
    assert!(filters.contains(&"osOk"));
    assert!(filters.contains(&"solid"));
    assert_eq!(filters.len(), 8);

    let nodes: Vec<_> = doc
        .descendants()
        .filter(|n| n.has_tag_name("g") && class_of(n) == "node")
        .collect();
    assert_eq!(nodes.len(), 3);
    let links: Vec<_> = doc
        .descendants()
        .filter(|n| n.has_tag_name("path") && class_of(n).starts_with("link "))
        .collect();
    assert_eq!(links.len(), 3);
    let badges = doc
        .descendants()
        .filter(|n| n.has_tag_name("g") && class_of(n).starts_with("badge "))
        .count();
    assert_eq!(badges, 2);

    let loaded = links
        .iter()
        .find(|n| n.attribute("id") == Some("link:1001"))
        .expect("link:1001");
    assert_eq!(loaded.attribute("stroke"), Some("#990000"));
    let down = links
        .iter()
        .find(|n| n.attribute("id") == Some("link:1003"))
        .expect("link:1003");
    assert_eq!(class_of(down), "link link-oper-down");

    let core_label: Vec<String> = doc
        .descendants()
        .filter(|n| n.has_tag_name("g") && n.attribute("id") == Some("managedobject:1"))
        .flat_map(|g| g.descendants().filter(|n| n.has_tag_name("tspan")))
        .filter_map(|t| t.text().map(str::to_string))
        .collect();
    assert_eq!(core_label, vec!["core-1", "CPU 12%"]);

    let glyph = doc
        .descendants()
        .find(|n| class_of(n) == "gf gf-3x gf-ok")
        .and_then(|n| n.text())
        .expect("icon glyph");
    assert_eq!(glyph, "\u{f233}");

    let image_use = doc
        .descendants()
        .find(|n| n.has_tag_name("use"))
        .expect("image node");
    assert_eq!(image_use.attribute("href"), Some("#img-Cisco-router"));
    assert_eq!(image_use.attribute("filter"), Some("url(#osOk)"));
}

#[test]
fn configured_maps_draw_their_background() {
    let r = rendered("configured.json");
    let svg = render_map_svg(
        &r,
        &SvgRenderOptions {
            diagram_id: Some("floor-2".to_string()),
            ..Default::default()
        },
    );
    let doc = roxmltree::Document::parse(&svg).expect("svg parses");
    assert_eq!(doc.root_element().attribute("id"), Some("floor-2"));
    let bg = doc
        .descendants()
        .find(|n| n.has_tag_name("image") && class_of(n) == "background")
        .expect("background");
    assert_eq!(bg.attribute("href"), Some("backgrounds/floor-2.png"));
    assert_eq!(bg.attribute("opacity"), Some("0.4"));
    assert_eq!(bg.attribute("width"), Some("800"));
}

#[test]
fn optional_layers_can_be_left_out() {
    let r = rendered("campus.json");
    let svg = render_map_svg(
        &r,
        &SvgRenderOptions {
            include_links: false,
            include_badges: false,
            include_labels: false,
            ..Default::default()
        },
    );
    let doc = roxmltree::Document::parse(&svg).expect("svg parses");
    assert!(!doc.descendants().any(|n| n.has_tag_name("path")));
    assert!(!doc.descendants().any(|n| n.has_tag_name("tspan")));
    assert!(!doc.descendants().any(|n| class_of(&n).starts_with("badge ")));
}
