//! Configuration loading for the conversation folders extension
//!
//! Settings arrive as JSON documents from several places (compile-time
//! embedding, extension storage, defaults). This crate provides the
//! helpers to parse them with useful error context and to layer them on
//! top of each other.
//!
//! Call [`load_layered`] with the layers in increasing priority.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parse a JSON document, naming its source in the error
pub fn parse_json<T: DeserializeOwned>(source: &str, content: &str) -> Result<T> {
    serde_json::from_str(content)
        .with_context(|| format!("Failed to parse config from {}", source))
}

/// Deep-merge `overlay` into `base`
///
/// Objects are merged key by key; any other value in the overlay replaces
/// the base value. `null` in the overlay leaves the base untouched.
pub fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Load settings by layering JSON documents over the type's defaults
///
/// Each layer is `(source, content)`; later layers win. A layer that fails
/// to parse aborts the load with an error naming its source.
pub fn load_layered<T>(layers: &[(&str, &str)]) -> Result<T>
where
    T: Default + Serialize + DeserializeOwned,
{
    let mut merged =
        serde_json::to_value(T::default()).context("Failed to serialize default config")?;

    for (source, content) in layers {
        let overlay: Value = parse_json(source, content)?;
        merge_json(&mut merged, overlay);
    }

    serde_json::from_value(merged).context("Layered config does not match the expected shape")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    #[serde(default)]
    struct Sample {
        name: String,
        delay_ms: u32,
        nested: Nested,
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    #[serde(default)]
    struct Nested {
        enabled: bool,
        label: String,
    }

    impl Default for Sample {
        fn default() -> Self {
            Self {
                name: "default".to_string(),
                delay_ms: 1000,
                nested: Nested::default(),
            }
        }
    }

    impl Default for Nested {
        fn default() -> Self {
            Self {
                enabled: true,
                label: "inner".to_string(),
            }
        }
    }

    #[test]
    fn test_merge_json_objects() {
        let mut base = json!({"a": 1, "b": {"c": 2, "d": 3}});
        merge_json(&mut base, json!({"b": {"d": 4}, "e": 5}));
        assert_eq!(base, json!({"a": 1, "b": {"c": 2, "d": 4}, "e": 5}));
    }

    #[test]
    fn test_merge_json_null_keeps_base() {
        let mut base = json!({"a": 1});
        merge_json(&mut base, Value::Null);
        assert_eq!(base, json!({"a": 1}));
    }

    #[test]
    fn test_load_layered_defaults() {
        let sample: Sample = load_layered(&[]).unwrap();
        assert_eq!(sample, Sample::default());
    }

    #[test]
    fn test_load_layered_priority() {
        let sample: Sample = load_layered(&[
            ("compile-time", r#"{"name": "embedded", "delay_ms": 10}"#),
            ("storage", r#"{"delay_ms": 250, "nested": {"enabled": false}}"#),
        ])
        .unwrap();

        assert_eq!(sample.name, "embedded");
        assert_eq!(sample.delay_ms, 250);
        assert!(!sample.nested.enabled);
        assert_eq!(sample.nested.label, "inner");
    }

    #[test]
    fn test_load_layered_reports_source() {
        let err = load_layered::<Sample>(&[("storage", "{not json")]).unwrap_err();
        assert!(err.to_string().contains("storage"));
    }
}
