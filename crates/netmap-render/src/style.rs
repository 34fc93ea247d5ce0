//! Fixed visual tables: status palette, effect filters, link states and load styles.

use netmap_core::ObjectStatus;
use serde::Serialize;

/// Class prefix shared by every glyph node.
pub const ICON_CLASS_PREFIX: &str = "gf";

pub const DEFAULT_LINK_STROKE: &str = "#000000";
pub const DEFAULT_LINK_WIDTH: f64 = 2.0;
pub const LINK_LABEL_FONT_SIZE: f64 = 10.0;

pub const FILTER_GLOW: &str = "glow";
pub const FILTER_HIGHLIGHT: &str = "highlight";
pub const FILTER_SOLID: &str = "solid";
/// Marker applied to spanning-tree root nodes.
pub const FILTER_STP_ROOT: &str = FILTER_GLOW;

/// Glyph drawn for icon nodes that do not name one.
pub const DEFAULT_NODE_GLYPH: u32 = 0xf0e8;
pub const GLYPH_MAINTENANCE: char = '\u{f0ad}';
const GLYPH_ADMIN_DOWN: char = '\u{f00d}';
const GLYPH_OPER_DOWN: char = '\u{f071}';
const GLYPH_STP_BLOCKED: char = '\u{f05e}';
pub const GLYPH_LOAD: char = '\u{f111}';

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FilterKind {
    /// Recolors the source graphic with a flat color.
    Flood { color: &'static str },
    /// Soft colored halo around the source graphic.
    Glow { color: &'static str, blur: f64 },
    /// Opaque backdrop behind text.
    Solid { color: &'static str },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterDef {
    pub name: &'static str,
    pub kind: FilterKind,
}

pub fn status_filter_name(status: ObjectStatus) -> &'static str {
    match status {
        ObjectStatus::Unknown => "osUnknown",
        ObjectStatus::Ok => "osOk",
        ObjectStatus::Alarm => "osAlarm",
        ObjectStatus::Unreach => "osUnreach",
        ObjectStatus::Down => "osDown",
    }
}

pub fn status_color(status: ObjectStatus) -> &'static str {
    match status {
        ObjectStatus::Unknown => "#bdc3c7",
        ObjectStatus::Ok => "#2ecc71",
        ObjectStatus::Alarm => "#f39c12",
        ObjectStatus::Unreach => "#7f8c8d",
        ObjectStatus::Down => "#e74c3c",
    }
}

/// Status palette followed by the generic effect filters.
pub fn filter_palette() -> Vec<FilterDef> {
    let mut out: Vec<FilterDef> = ObjectStatus::ALL
        .iter()
        .map(|&s| FilterDef {
            name: status_filter_name(s),
            kind: FilterKind::Flood {
                color: status_color(s),
            },
        })
        .collect();
    out.push(FilterDef {
        name: FILTER_GLOW,
        kind: FilterKind::Glow {
            color: "#3498db",
            blur: 4.0,
        },
    });
    out.push(FilterDef {
        name: FILTER_HIGHLIGHT,
        kind: FilterKind::Glow {
            color: "#f1c40f",
            blur: 6.0,
        },
    });
    out.push(FilterDef {
        name: FILTER_SOLID,
        kind: FilterKind::Solid { color: "#ffffff" },
    });
    out
}

/// Icon node status-display class, e.g. `gf gf-3x gf-ok`.
pub fn icon_class(size_token: &str, status: ObjectStatus) -> String {
    format!(
        "{ICON_CLASS_PREFIX} {ICON_CLASS_PREFIX}-{size_token} {ICON_CLASS_PREFIX}-{}",
        status.token()
    )
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum LinkState {
    #[default]
    Ok,
    AdminDown,
    OperDown,
    StpBlocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinkStateStyle {
    pub stroke: &'static str,
    pub glyph: char,
    pub font_size: f64,
}

/// Override for a non-OK link state; `Ok` clears the override.
pub fn link_state_style(state: LinkState) -> Option<LinkStateStyle> {
    match state {
        LinkState::Ok => None,
        LinkState::AdminDown => Some(LinkStateStyle {
            stroke: "#7f8c8d",
            glyph: GLYPH_ADMIN_DOWN,
            font_size: LINK_LABEL_FONT_SIZE,
        }),
        LinkState::OperDown => Some(LinkStateStyle {
            stroke: "#c0392b",
            glyph: GLYPH_OPER_DOWN,
            font_size: LINK_LABEL_FONT_SIZE,
        }),
        LinkState::StpBlocked => Some(LinkStateStyle {
            stroke: "#8e44ad",
            glyph: GLYPH_STP_BLOCKED,
            font_size: 16.0,
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoadStyle {
    pub threshold: f64,
    pub stroke: &'static str,
    pub stroke_width: f64,
}

/// Utilization -> style, highest threshold first.
pub const LOAD_STYLES: [LoadStyle; 4] = [
    LoadStyle {
        threshold: 0.95,
        stroke: "#ff0000",
        stroke_width: 4.0,
    },
    LoadStyle {
        threshold: 0.8,
        stroke: "#990000",
        stroke_width: 3.0,
    },
    LoadStyle {
        threshold: 0.5,
        stroke: "#ff9933",
        stroke_width: 2.5,
    },
    LoadStyle {
        threshold: 0.0,
        stroke: "#006600",
        stroke_width: 2.0,
    },
];

/// First style whose threshold the utilization reaches.
pub fn load_style(utilization: f64) -> &'static LoadStyle {
    let u = if utilization.is_finite() {
        utilization
    } else {
        0.0
    };
    LOAD_STYLES
        .iter()
        .find(|s| u >= s.threshold)
        .unwrap_or(&LOAD_STYLES[LOAD_STYLES.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utilization_picks_the_first_reached_threshold() {
        assert_eq!(load_style(0.81).threshold, 0.8);
        assert_eq!(load_style(0.95).threshold, 0.95);
        assert_eq!(load_style(1.7).threshold, 0.95);
        assert_eq!(load_style(0.5).threshold, 0.5);
        assert_eq!(load_style(0.1).threshold, 0.0);
        assert_eq!(load_style(-1.0).threshold, 0.0);
        assert_eq!(load_style(f64::NAN).threshold, 0.0);
    }

    #[test]
    fn palette_has_one_filter_per_status_plus_effects() {
        let names: Vec<&str> = filter_palette().iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            vec![
                "osUnknown",
                "osOk",
                "osAlarm",
                "osUnreach",
                "osDown",
                "glow",
                "highlight",
                "solid"
            ]
        );
    }

    #[test]
    fn icon_class_combines_prefix_size_and_status() {
        assert_eq!(icon_class("3x", ObjectStatus::Down), "gf gf-3x gf-down");
    }

    #[test]
    fn stp_blocked_uses_a_larger_label() {
        let blocked = link_state_style(LinkState::StpBlocked).expect("override");
        let down = link_state_style(LinkState::OperDown).expect("override");
        assert!(blocked.font_size > down.font_size);
        assert_ne!(blocked.glyph, down.glyph);
        assert!(link_state_style(LinkState::Ok).is_none());
    }
}
