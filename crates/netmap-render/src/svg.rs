//! SVG serialization of the paper and everything drawn on it.

mod util;

use crate::geom::{Size, point_along};
use crate::model::{Badge, MapLink, MapNode};
use crate::paper::Paper;
use crate::renderer::Renderer;
use crate::shapes::ShapeClass;
use crate::style::{
    DEFAULT_LINK_STROKE, DEFAULT_LINK_WIDTH, FILTER_HIGHLIGHT, FILTER_SOLID, FILTER_STP_ROOT,
    FilterKind, LinkState,
};
use netmap_core::BadgeForm;
use std::fmt::Write as _;
use util::{escape_xml, fmt};

#[derive(Debug, Clone)]
pub struct SvgRenderOptions {
    /// `id` of the root element.
    pub diagram_id: Option<String>,
    pub include_links: bool,
    pub include_badges: bool,
    pub include_labels: bool,
    /// Draws the background image of configured maps.
    pub include_background: bool,
}

impl Default for SvgRenderOptions {
    fn default() -> Self {
        Self {
            diagram_id: None,
            include_links: true,
            include_badges: true,
            include_labels: true,
            include_background: true,
        }
    }
}

pub fn render_map_svg(renderer: &Renderer, options: &SvgRenderOptions) -> String {
    let paper = renderer.paper();
    let model = renderer.model();
    let label_font = renderer.settings().label_font_size;
    let mut out = String::new();

    let (w, h) = (fmt(paper.size.width), fmt(paper.size.height));
    let _ = write!(
        &mut out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" class="netmap" width="{w}" height="{h}" viewBox="0 0 {w} {h}""#
    );
    if let Some(id) = &options.diagram_id {
        let _ = write!(&mut out, r#" id="{}""#, escape_xml(id));
    }
    out.push('>');

    render_defs(&mut out, paper);

    let _ = write!(
        &mut out,
        r#"<g class="viewport" transform="translate({},{}) scale({})">"#,
        fmt(paper.origin.0),
        fmt(paper.origin.1),
        fmt(paper.scale)
    );

    if options.include_background {
        if let Some(bg) = &paper.background {
            let _ = write!(
                &mut out,
                r#"<image class="background" href="{}" x="0" y="0" opacity="{}""#,
                escape_xml(&bg.href),
                fmt(bg.opacity)
            );
            let size = renderer.configured_size().unwrap_or_else(|| {
                let bbox = model.content_bbox().unwrap_or_default();
                Size::new(bbox.max_x(), bbox.max_y())
            });
            let _ = write!(
                &mut out,
                r#" width="{}" height="{}""#,
                fmt(size.width),
                fmt(size.height)
            );
            out.push_str("/>");
        }
    }

    if options.include_links {
        out.push_str(r#"<g class="links">"#);
        for link in model.links() {
            let Some(route) = model.link_route(&link.id) else {
                continue;
            };
            render_link(&mut out, link, &route);
        }
        out.push_str("</g>");
    }

    out.push_str(r#"<g class="nodes">"#);
    for node in model.nodes() {
        let badges = if options.include_badges {
            model.badges_of(&node.id)
        } else {
            Vec::new()
        };
        render_node(&mut out, node, &badges, options.include_labels, label_font);
    }
    out.push_str("</g>");

    out.push_str("</g></svg>");
    out
}

fn render_defs(out: &mut String, paper: &Paper) {
    out.push_str("<defs>");
    for def in paper.defs().filters.values() {
        match &def.kind {
            FilterKind::Flood { color } => {
                let _ = write!(
                    out,
                    r#"<filter id="{}"><feFlood flood-color="{color}" result="tint"/><feComposite in="tint" in2="SourceAlpha" operator="in"/></filter>"#,
                    def.name
                );
            }
            FilterKind::Glow { color, blur } => {
                let _ = write!(
                    out,
                    r#"<filter id="{}" x="-50%" y="-50%" width="200%" height="200%"><feGaussianBlur in="SourceAlpha" stdDeviation="{}" result="blur"/><feFlood flood-color="{color}" result="tint"/><feComposite in="tint" in2="blur" operator="in" result="halo"/><feMerge><feMergeNode in="halo"/><feMergeNode in="SourceGraphic"/></feMerge></filter>"#,
                    def.name,
                    fmt(*blur)
                );
            }
            FilterKind::Solid { color } => {
                let _ = write!(
                    out,
                    r#"<filter id="{}" x="0" y="0" width="1" height="1"><feFlood flood-color="{color}"/><feComposite in="SourceGraphic"/></filter>"#,
                    def.name
                );
            }
        }
    }
    for img in paper.defs().images.values() {
        let _ = write!(
            out,
            r#"<image id="{}" href="{}" width="{}" height="{}"/>"#,
            img.def_id(),
            escape_xml(&img.href),
            fmt(img.width),
            fmt(img.height)
        );
    }
    out.push_str("</defs>");
}

fn render_link(out: &mut String, link: &MapLink, route: &[(f64, f64)]) {
    let (stroke, width) = link
        .style
        .map(|s| (s.stroke, s.width))
        .unwrap_or((DEFAULT_LINK_STROKE, DEFAULT_LINK_WIDTH));
    let mut d = String::new();
    for (i, (x, y)) in route.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        let _ = write!(&mut d, "{cmd}{},{}", fmt(*x), fmt(*y));
    }
    let _ = write!(
        out,
        r#"<path class="link link-{}" id="{}" d="{d}" fill="none" stroke="{stroke}" stroke-width="{}"/>"#,
        link_state_token(link.state),
        escape_xml(&link.id),
        fmt(width)
    );
    if let Some(label) = &link.label {
        if let Some((x, y)) = point_along(route, label.ratio) {
            let _ = write!(
                out,
                r#"<text class="link-label" x="{}" y="{}" font-size="{}" fill="{}" text-anchor="middle" dominant-baseline="central">{}</text>"#,
                fmt(x),
                fmt(y),
                fmt(label.font_size),
                escape_xml(&label.fill),
                escape_xml(&label.text)
            );
        }
    }
}

fn link_state_token(state: LinkState) -> &'static str {
    match state {
        LinkState::Ok => "ok",
        LinkState::AdminDown => "admin-down",
        LinkState::OperDown => "oper-down",
        LinkState::StpBlocked => "stp-blocked",
    }
}

fn render_node(
    out: &mut String,
    node: &MapNode,
    badges: &[&Badge],
    include_label: bool,
    label_font: f64,
) {
    let (w, h) = (node.size.width, node.size.height);
    let _ = write!(
        out,
        r#"<g class="node" id="{}" data-type="{}" transform="translate({},{})""#,
        escape_xml(&node.id),
        escape_xml(&node.data.kind),
        fmt(node.x),
        fmt(node.y)
    );
    if node.visual.highlighted {
        let _ = write!(out, r#" filter="url(#{FILTER_HIGHLIGHT})""#);
    } else if node.visual.stp_root {
        let _ = write!(out, r#" filter="url(#{FILTER_STP_ROOT})""#);
    }
    out.push('>');

    match &*node.visual.shape {
        ShapeClass::Icon(_) => {
            let glyph = node.visual.glyph.map(String::from).unwrap_or_default();
            let _ = write!(
                out,
                r#"<text class="{}" x="{}" y="{}" font-size="{}" text-anchor="middle">{}</text>"#,
                escape_xml(node.visual.css_class.as_deref().unwrap_or_default()),
                fmt(w / 2.0),
                fmt(h),
                fmt(h),
                escape_xml(&glyph)
            );
        }
        ShapeClass::Image(img) => {
            let _ = write!(
                out,
                r##"<use href="#{}" width="{}" height="{}""##,
                img.image.def_id(),
                fmt(w),
                fmt(h)
            );
            if let Some(filter) = node.visual.status_filter {
                let _ = write!(out, r#" filter="url(#{filter})""#);
            }
            out.push_str("/>");
        }
    }

    if include_label && !node.visual.label.is_empty() {
        let _ = write!(
            out,
            r#"<text class="node-label" x="{}" y="{}" font-size="{}" text-anchor="middle" filter="url(#{FILTER_SOLID})">"#,
            fmt(w / 2.0),
            fmt(h),
            fmt(label_font)
        );
        for line in node.visual.label.lines() {
            let _ = write!(
                out,
                r#"<tspan x="{}" dy="1.2em">{}</tspan>"#,
                fmt(w / 2.0),
                escape_xml(line)
            );
        }
        out.push_str("</text>");
    }

    for badge in badges {
        render_badge(out, badge, w, h);
    }
    out.push_str("</g>");
}

fn render_badge(out: &mut String, badge: &Badge, w: f64, h: f64) {
    let (cx, cy) = (badge.anchor.0 * w, badge.anchor.1 * h);
    let r = badge.size / 2.0;
    let _ = write!(
        out,
        r#"<g class="badge badge-{}" id="{}">"#,
        badge.kind.as_str(),
        escape_xml(&badge.id)
    );
    match badge.form {
        BadgeForm::Circle => {
            let _ = write!(
                out,
                r##"<circle cx="{}" cy="{}" r="{}" fill="#ffffff" stroke="#333333"/>"##,
                fmt(cx),
                fmt(cy),
                fmt(r)
            );
        }
        BadgeForm::Square => {
            let _ = write!(
                out,
                r##"<rect x="{}" y="{}" width="{}" height="{}" fill="#ffffff" stroke="#333333"/>"##,
                fmt(cx - r),
                fmt(cy - r),
                fmt(badge.size),
                fmt(badge.size)
            );
        }
    }
    let _ = write!(
        out,
        r#"<text x="{}" y="{}" font-size="{}" text-anchor="middle" dominant-baseline="central">{}</text></g>"#,
        fmt(cx),
        fmt(cy),
        fmt(r * 1.4),
        escape_xml(&badge.glyph.to_string())
    );
}
