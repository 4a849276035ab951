//! Type-safe schema generation for Gemini structured outputs.
//!
//! Gemini's `responseSchema` accepts a subset of OpenAPI 3.0 rather than full
//! JSON Schema: no `$ref`, no `definitions`, no `additionalProperties`, and
//! nullability is spelled `nullable: true` instead of a `"null"` type.
//! `schemars` output is rewritten to fit.
//!
//! # Example
//!
//! ```rust,ignore
//! use gemini_client::to_gemini_schema;
//! use schemars::{schema_for, JsonSchema};
//!
//! #[derive(JsonSchema)]
//! struct Topics {
//!     topics: Vec<String>,
//! }
//!
//! let schema = to_gemini_schema(serde_json::to_value(schema_for!(Topics))?);
//! ```

use serde_json::{Map, Value};

/// Keywords Gemini rejects or ignores.
const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "$schema",
    "$id",
    "definitions",
    "$defs",
    "title",
    "additionalProperties",
    "default",
    "examples",
    "format",
    "minimum",
    "maximum",
    "minItems",
    "maxItems",
];

/// Rewrite a JSON Schema document (as produced by `schemars`) into Gemini's
/// OpenAPI subset.
///
/// Safe to call on a schema that is already in Gemini form.
pub fn to_gemini_schema(mut root: Value) -> Value {
    let definitions = match &root {
        Value::Object(map) => map
            .get("definitions")
            .or_else(|| map.get("$defs"))
            .cloned()
            .unwrap_or(Value::Null),
        _ => Value::Null,
    };

    rewrite_schema(&mut root, &definitions, 0);
    root
}

/// Rewrite one schema node. Only walks schema positions (`properties`
/// values, `items`, `anyOf` members), so a property literally named
/// `title` or `format` is left alone.
fn rewrite_schema(value: &mut Value, definitions: &Value, depth: usize) {
    // Recursive types would loop forever once inlined.
    if depth > 32 {
        *value = Value::Object(Map::new());
        return;
    }

    let Value::Object(map) = value else {
        return;
    };

    if let Some(Value::String(reference)) = map.get("$ref").cloned() {
        let name = reference
            .trim_start_matches("#/definitions/")
            .trim_start_matches("#/$defs/");
        if let Some(def) = definitions.get(name) {
            *value = def.clone();
            rewrite_schema(value, definitions, depth + 1);
        }
        return;
    }

    // `Option<Struct>` becomes `anyOf: [{$ref}, {type: null}]`
    if let Some(Value::Array(variants)) = map.get("anyOf").cloned() {
        let non_null: Vec<Value> = variants
            .iter()
            .filter(|v| v.get("type") != Some(&Value::String("null".to_string())))
            .cloned()
            .collect();
        if non_null.len() == 1 && non_null.len() < variants.len() {
            let mut inner = non_null.into_iter().next().unwrap_or_default();
            rewrite_schema(&mut inner, definitions, depth + 1);
            if let Value::Object(inner_map) = &mut inner {
                inner_map.insert("nullable".to_string(), Value::Bool(true));
            }
            *value = inner;
            return;
        }
    }

    // Single-member `allOf` wraps a `$ref` when a field carries a doc comment
    if let Some(Value::Array(members)) = map.get("allOf").cloned() {
        if members.len() == 1 {
            let description = map.get("description").cloned();
            let mut inner = members.into_iter().next().unwrap_or_default();
            rewrite_schema(&mut inner, definitions, depth + 1);
            if let (Value::Object(inner_map), Some(description)) = (&mut inner, description) {
                inner_map.insert("description".to_string(), description);
            }
            *value = inner;
            return;
        }
    }

    for keyword in UNSUPPORTED_KEYWORDS {
        map.remove(*keyword);
    }

    match map.get("type").cloned() {
        Some(Value::Array(types)) => {
            let nullable = types.iter().any(|t| t == "null");
            let primary = types
                .iter()
                .filter_map(|t| t.as_str())
                .find(|t| *t != "null")
                .unwrap_or("string")
                .to_uppercase();
            map.insert("type".to_string(), Value::String(primary));
            if nullable {
                map.insert("nullable".to_string(), Value::Bool(true));
            }
        }
        Some(Value::String(t)) => {
            map.insert("type".to_string(), Value::String(t.to_uppercase()));
        }
        _ => {}
    }

    if let Some(Value::Object(properties)) = map.get_mut("properties") {
        for property in properties.values_mut() {
            rewrite_schema(property, definitions, depth + 1);
        }
    }

    if let Some(items) = map.get_mut("items") {
        rewrite_schema(items, definitions, depth + 1);
    }

    if let Some(Value::Array(variants)) = map.get_mut("anyOf") {
        for variant in variants.iter_mut() {
            rewrite_schema(variant, definitions, depth + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::{schema_for, JsonSchema};
    use serde::Deserialize;

    fn gemini_schema<T: JsonSchema>() -> Value {
        to_gemini_schema(serde_json::to_value(schema_for!(T)).unwrap())
    }

    #[derive(Debug, Deserialize, JsonSchema)]
    #[serde(rename_all = "lowercase")]
    #[allow(dead_code)]
    enum Level {
        High,
        Low,
    }

    #[derive(Debug, Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct Link {
        url: String,
        title: Option<String>,
    }

    #[derive(Debug, Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct Answer {
        /// Overall confidence
        level: Level,
        links: Vec<Link>,
        best: Option<Link>,
    }

    #[test]
    fn test_refs_are_inlined() {
        let schema = gemini_schema::<Answer>();
        let text = serde_json::to_string(&schema).unwrap();

        assert!(!text.contains("$ref"));
        assert!(!text.contains("definitions"));
        assert!(!text.contains("$schema"));
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["properties"]["links"]["type"], "ARRAY");
        assert_eq!(schema["properties"]["links"]["items"]["type"], "OBJECT");
    }

    #[test]
    fn test_nullable_fields() {
        let schema = gemini_schema::<Answer>();

        let title = &schema["properties"]["links"]["items"]["properties"]["title"];
        assert_eq!(title["type"], "STRING");
        assert_eq!(title["nullable"], true);

        let best = &schema["properties"]["best"];
        assert_eq!(best["type"], "OBJECT");
        assert_eq!(best["nullable"], true);
    }

    #[test]
    fn test_enum_values_survive() {
        let schema = gemini_schema::<Answer>();
        let level = &schema["properties"]["level"];

        assert_eq!(level["type"], "STRING");
        assert_eq!(level["enum"], serde_json::json!(["high", "low"]));
    }

    #[test]
    fn test_property_named_title_is_kept() {
        let schema = gemini_schema::<Answer>();
        let props = schema["properties"]["links"]["items"]["properties"]
            .as_object()
            .unwrap();
        assert!(props.contains_key("title"));
        assert!(props.contains_key("url"));
    }
}
