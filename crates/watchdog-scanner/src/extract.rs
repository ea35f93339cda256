//! Content extraction keyed by tool name.
//!
//! The source material dispatched extraction through a dynamic lookup
//! over tool names with no declared fallback; here that becomes an
//! explicit, extensible registration map with a default extractor that
//! walks every string-valued field, so an unrecognized tool name still
//! gets scanned instead of silently skipped.

use std::collections::HashMap;

use serde_json::Value;

/// Extracts the scannable text content from a tool call's arguments.
pub trait ContentExtractor: Send + Sync {
    fn extract(&self, tool_args: &Value) -> String;
}

/// Walks every string leaf in the JSON value, joining them with
/// newlines. Used both as the default for unregistered tool names and
/// as a component inside tool-specific extractors.
pub struct WalkStringsExtractor;

impl ContentExtractor for WalkStringsExtractor {
    fn extract(&self, tool_args: &Value) -> String {
        let mut out = String::new();
        walk(tool_args, &mut out);
        out
    }
}

fn walk(value: &Value, out: &mut String) {
    match value {
        Value::String(s) => {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(s);
        }
        Value::Array(items) => {
            for item in items {
                walk(item, out);
            }
        }
        Value::Object(map) => {
            for v in map.values() {
                walk(v, out);
            }
        }
        _ => {}
    }
}

/// Tool-name-keyed registry of extractors, falling back to
/// [`WalkStringsExtractor`] for anything unregistered.
pub struct ExtractorRegistry {
    by_tool: HashMap<String, Box<dyn ContentExtractor>>,
    default: WalkStringsExtractor,
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        ExtractorRegistry {
            by_tool: HashMap::new(),
            default: WalkStringsExtractor,
        }
    }

    pub fn register(&mut self, tool_name: impl Into<String>, extractor: Box<dyn ContentExtractor>) {
        self.by_tool.insert(tool_name.into(), extractor);
    }

    pub fn extract(&self, tool_name: &str, tool_args: &Value) -> String {
        match self.by_tool.get(tool_name) {
            Some(extractor) => extractor.extract(tool_args),
            None => self.default.extract(tool_args),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unregistered_tool_falls_back_to_walking_all_strings() {
        let registry = ExtractorRegistry::new();
        let args = json!({"message": "hello", "meta": {"note": "world"}});
        let out = registry.extract("unknown_tool", &args);
        assert!(out.contains("hello"));
        assert!(out.contains("world"));
    }

    #[test]
    fn registered_extractor_overrides_default() {
        struct OnlyMessage;
        impl ContentExtractor for OnlyMessage {
            fn extract(&self, tool_args: &Value) -> String {
                tool_args
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            }
        }

        let mut registry = ExtractorRegistry::new();
        registry.register("post_message", Box::new(OnlyMessage));
        let args = json!({"message": "hello", "meta": {"note": "ignored"}});
        let out = registry.extract("post_message", &args);
        assert_eq!(out, "hello");
    }

    #[test]
    fn arrays_of_strings_are_all_collected() {
        let registry = ExtractorRegistry::new();
        let args = json!({"lines": ["one", "two", "three"]});
        let out = registry.extract("anything", &args);
        assert!(out.contains("one"));
        assert!(out.contains("two"));
        assert!(out.contains("three"));
    }
}
