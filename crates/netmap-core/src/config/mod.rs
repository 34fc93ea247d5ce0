use serde_json::{Map, Value};

mod settings;

pub use settings::PanelSettings;

/// Free-form JSON configuration addressed by dotted paths (`"status.refresh_interval"`).
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig(Value);

impl Default for MapConfig {
    fn default() -> Self {
        Self::empty_object()
    }
}

impl MapConfig {
    pub fn empty_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn from_json_str(text: &str) -> crate::Result<Self> {
        Ok(Self(serde_json::from_str(text)?))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    fn lookup(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.lookup(dotted_path)?.as_str()
    }

    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        let v = self.lookup(dotted_path)?;
        v.as_f64().filter(|n| n.is_finite())
    }

    pub fn get_u64(&self, dotted_path: &str) -> Option<u64> {
        self.lookup(dotted_path)?.as_u64()
    }

    /// Layers `other` over this config: objects merge key by key, anything else replaces.
    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dotted_paths_read_nested_values() {
        let cfg = MapConfig::from_json_str(
            r#"{"status": {"refresh_interval": 30}, "label": {"font_family": "Verdana"}}"#,
        )
        .expect("config");
        assert_eq!(cfg.get_u64("status.refresh_interval"), Some(30));
        assert_eq!(cfg.get_str("label.font_family"), Some("Verdana"));
        assert_eq!(cfg.get_f64("label.missing"), None);
        assert_eq!(cfg.get_str("status.refresh_interval.deeper"), None);
    }

    #[test]
    fn deep_merge_keeps_untouched_siblings() {
        let mut cfg = MapConfig::from_value(json!({"paper": {"padding": 10, "zoom": 1}}));
        cfg.deep_merge(&json!({"paper": {"padding": 40}}));
        assert_eq!(cfg.get_f64("paper.padding"), Some(40.0));
        assert_eq!(cfg.get_f64("paper.zoom"), Some(1.0));
    }

    #[test]
    fn deep_merge_replaces_non_object_roots() {
        let mut cfg = MapConfig::from_value(json!([1, 2, 3]));
        cfg.deep_merge(&json!({"icon": {"size": "2x"}}));
        assert_eq!(cfg.get_str("icon.size"), Some("2x"));
    }
}
