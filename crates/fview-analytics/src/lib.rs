//! Tolerant analytics payload normalizer.
//!
//! The AI service reports analytics as an opaque text blob. Usually it is
//! well-formed JSON, but some producers hand us a Python-flavored dict
//! rendering instead: bare identifier keys, single quotes, `True`/`False`/
//! `None` literals, bare-word values. Normalization is lazy (read time only)
//! and never fails: a payload no interpretation can rescue degrades to a
//! tagged fallback value carrying an `error` field.

pub mod rewrite;

use serde_json::{json, Map, Value};
use tracing::debug;

pub use rewrite::rewrite_loose_payload;

/// Outcome of normalizing a raw analytics payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    /// The payload was a well-formed JSON object.
    Strict(Map<String, Value>),
    /// The payload parsed after the loose-syntax rewrite.
    Rewritten(Map<String, Value>),
    /// No interpretation succeeded; placeholder with an `error` field.
    Fallback(Map<String, Value>),
}

impl Normalized {
    /// True when normalization had to give up.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Normalized::Fallback(_))
    }

    /// The canonical mapping, whatever the route taken.
    pub fn into_map(self) -> Map<String, Value> {
        match self {
            Normalized::Strict(m) | Normalized::Rewritten(m) | Normalized::Fallback(m) => m,
        }
    }

    /// The canonical mapping as a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.into_map())
    }
}

/// Normalize a raw analytics payload into a canonical JSON mapping.
///
/// Stages: strict JSON parse; on failure, a best-effort rewrite of loose
/// dict syntax followed by a second strict parse; on failure, the fallback
/// placeholder. Never panics, never returns an error.
pub fn normalize(raw: &str) -> Normalized {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => return Normalized::Strict(map),
        Ok(other) => {
            debug!("Analytics payload parsed to non-object JSON: {}", other);
            return Normalized::Fallback(fallback_map());
        }
        Err(_) => {}
    }

    let rewritten = rewrite_loose_payload(raw);
    match serde_json::from_str::<Value>(&rewritten) {
        Ok(Value::Object(map)) => Normalized::Rewritten(map),
        _ => {
            debug!("Analytics payload unrecoverable after rewrite: {}", raw);
            Normalized::Fallback(fallback_map())
        }
    }
}

/// Placeholder returned when a stored payload cannot be interpreted.
fn fallback_map() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("team_stats".to_string(), json!({}));
    map.insert("speed_analysis".to_string(), json!({}));
    map.insert("processing_completed".to_string(), json!(false));
    map.insert(
        "error".to_string(),
        json!("Failed to parse analytics data"),
    );
    map
}

/// Placeholder returned when no payload has been stored yet.
pub fn empty_placeholder() -> Value {
    json!({
        "team_stats": {},
        "speed_analysis": {},
        "processing_completed": false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_json_passes_through() {
        let out = normalize(r#"{"total_passes": 234, "team_stats": {"team1_passes": 152}}"#);
        let Normalized::Strict(map) = out else {
            panic!("expected strict parse");
        };
        assert_eq!(map["total_passes"], json!(234));
        assert_eq!(map["team_stats"]["team1_passes"], json!(152));
    }

    #[test]
    fn test_python_dict_is_rewritten() {
        // Scenario from the field: a Python dict repr stored verbatim
        let out = normalize("{team='A', score=3, won=True}");
        assert!(!out.is_fallback());
        let map = out.into_map();
        assert_eq!(map["team"], json!("A"));
        assert_eq!(map["score"], json!(3));
        assert_eq!(map["won"], json!(true));
    }

    #[test]
    fn test_python_repr_with_colons_and_none() {
        let out = normalize("{'possession': 65.5, 'scorer': None, 'home': False}");
        let map = out.into_map();
        assert_eq!(map["possession"], json!(65.5));
        assert_eq!(map["scorer"], Value::Null);
        assert_eq!(map["home"], json!(false));
    }

    #[test]
    fn test_bare_word_values_are_quoted() {
        let out = normalize("{formation=diamond, side=home}");
        let map = out.into_map();
        assert_eq!(map["formation"], json!("diamond"));
        assert_eq!(map["side"], json!("home"));
    }

    #[test]
    fn test_nested_loose_objects() {
        let out = normalize("{team_stats={passes=10, accurate=True}, speed=22.5}");
        let map = out.into_map();
        assert_eq!(map["team_stats"]["passes"], json!(10));
        assert_eq!(map["team_stats"]["accurate"], json!(true));
        assert_eq!(map["speed"], json!(22.5));
    }

    #[test]
    fn test_garbage_degrades_to_fallback() {
        let out = normalize("not even close to a dict");
        assert!(out.is_fallback());
        let map = out.into_map();
        assert_eq!(map["error"], json!("Failed to parse analytics data"));
        assert_eq!(map["team_stats"], json!({}));
        assert_eq!(map["speed_analysis"], json!({}));
        assert_eq!(map["processing_completed"], json!(false));
    }

    #[test]
    fn test_non_object_json_degrades_to_fallback() {
        assert!(normalize("[1, 2, 3]").is_fallback());
        assert!(normalize("42").is_fallback());
        assert!(normalize("\"just a string\"").is_fallback());
    }

    #[test]
    fn test_empty_placeholder_shape() {
        let value = empty_placeholder();
        assert_eq!(value["team_stats"], json!({}));
        assert_eq!(value["processing_completed"], json!(false));
        assert!(value.get("error").is_none());
    }
}
