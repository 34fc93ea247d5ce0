//! Typed panel settings resolved from a [`MapConfig`].

use super::MapConfig;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct PanelSettings {
    /// Status poll cadence used until a snapshot provides its own.
    pub status_refresh_interval: Duration,
    /// Cadence of the "seconds since last update" ticker.
    pub ticker_interval: Duration,
    /// Links above which external nodes are hidden unless "view all" is on.
    pub max_links: usize,
    /// Icon size token, e.g. `"3x"` -> `gf-3x`.
    pub icon_size: String,
    pub icon_width: f64,
    pub icon_height: f64,
    pub label_font_family: Option<String>,
    pub label_font_size: f64,
    /// Multiplier over the font's natural line box; `None` keeps the 1.5 default.
    pub label_line_height: Option<f64>,
    pub paper_padding: f64,
    pub badge_size: f64,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            status_refresh_interval: Duration::from_secs(60),
            ticker_interval: Duration::from_secs(5),
            max_links: 1000,
            icon_size: "3x".to_string(),
            icon_width: 48.0,
            icon_height: 48.0,
            label_font_family: None,
            label_font_size: 10.0,
            label_line_height: None,
            paper_padding: 20.0,
            badge_size: 16.0,
        }
    }
}

impl PanelSettings {
    pub fn from_config(cfg: &MapConfig) -> Self {
        let d = Self::default();
        let positive = |v: f64| v.is_finite() && v > 0.0;
        Self {
            status_refresh_interval: cfg
                .get_u64("status.refresh_interval")
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .unwrap_or(d.status_refresh_interval),
            ticker_interval: cfg
                .get_u64("status.ticker_interval")
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .unwrap_or(d.ticker_interval),
            max_links: cfg
                .get_u64("render.max_links")
                .map(|n| n as usize)
                .unwrap_or(d.max_links),
            icon_size: cfg
                .get_str("icon.size")
                .map(str::to_string)
                .unwrap_or(d.icon_size),
            icon_width: cfg
                .get_f64("icon.width")
                .filter(|v| positive(*v))
                .unwrap_or(d.icon_width),
            icon_height: cfg
                .get_f64("icon.height")
                .filter(|v| positive(*v))
                .unwrap_or(d.icon_height),
            label_font_family: cfg
                .get_str("label.font_family")
                .map(str::to_string)
                .or(d.label_font_family),
            label_font_size: cfg
                .get_f64("label.font_size")
                .filter(|v| positive(*v))
                .unwrap_or(d.label_font_size),
            label_line_height: cfg
                .get_f64("label.line_height")
                .filter(|v| positive(*v))
                .or(d.label_line_height),
            paper_padding: cfg
                .get_f64("paper.padding")
                .filter(|v| v.is_finite() && *v >= 0.0)
                .unwrap_or(d.paper_padding),
            badge_size: cfg
                .get_f64("badge.size")
                .filter(|v| positive(*v))
                .unwrap_or(d.badge_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_config_yields_defaults() {
        assert_eq!(
            PanelSettings::from_config(&MapConfig::default()),
            PanelSettings::default()
        );
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let cfg = MapConfig::from_value(json!({
            "status": {"refresh_interval": 0, "ticker_interval": 2},
            "label": {"font_size": -3, "line_height": 1.2},
            "render": {"max_links": 50}
        }));
        let s = PanelSettings::from_config(&cfg);
        assert_eq!(s.status_refresh_interval, Duration::from_secs(60));
        assert_eq!(s.ticker_interval, Duration::from_secs(2));
        assert_eq!(s.label_font_size, 10.0);
        assert_eq!(s.label_line_height, Some(1.2));
        assert_eq!(s.max_links, 50);
    }
}
