//! Schema inference from example payloads.
//!
//! Annotations document bodies and responses by example rather than by type,
//! so the shape is recovered from the example value itself:
//!
//! - objects become `type: object` with one property per key, in key order
//! - arrays become `type: array`, typed by their first element (`items: {}` when empty)
//! - strings become `type: string`, with a `format` hint for email, date,
//!   date-time and UUID literals
//! - integral numbers become `integer`, other numbers `number`
//! - `null` follows the configured [`NullPolicy`]
//!
//! An object of the form `{"$ref": "Name"}` embeds the named schema declared
//! with a [`SchemaAnnotation`]. Names already being expanded yield an empty
//! `{type: object}` placeholder, which breaks mutually referencing schemas.

use crate::annotation::{SchemaAnnotation, ValueType};
use crate::config::NullPolicy;
use crate::error::{Error, Result};
use crate::schema::Schema;
use indexmap::IndexMap;
use log::debug;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Key marking an embedded reference inside an example payload
pub const EXAMPLE_REF_KEY: &str = "$ref";

struct FormatPatterns {
    uuid: Regex,
    date: Regex,
    date_time: Regex,
    email: Regex,
}

fn patterns() -> &'static FormatPatterns {
    static PATTERNS: OnceLock<FormatPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| FormatPatterns {
        uuid: Regex::new(
            r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$",
        )
        .expect("uuid pattern is valid"),
        date: Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"),
        date_time: Regex::new(
            r"^\d{4}-\d{2}-\d{2}[Tt]\d{2}:\d{2}:\d{2}(\.\d+)?([Zz]|[+-]\d{2}:\d{2})?$",
        )
        .expect("date-time pattern is valid"),
        email: Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid"),
    })
}

/// Format hint for a string literal, if it has a recognised shape
pub fn string_format(value: &str) -> Option<&'static str> {
    let patterns = patterns();
    if patterns.uuid.is_match(value) {
        Some("uuid")
    } else if patterns.date_time.is_match(value) {
        Some("date-time")
    } else if patterns.date.is_match(value) {
        Some("date")
    } else if patterns.email.is_match(value) {
        Some("email")
    } else {
        None
    }
}

/// Infers schemas from example values
pub struct SchemaInferencer<'a> {
    /// Declared schemas that `{"$ref": ...}` markers may name
    named: &'a [SchemaAnnotation],
    null_policy: NullPolicy,
}

impl<'a> SchemaInferencer<'a> {
    pub fn new(named: &'a [SchemaAnnotation], null_policy: NullPolicy) -> Self {
        Self { named, null_policy }
    }

    /// Infer a schema from `example`.
    ///
    /// `visited` holds the names of schemas currently being expanded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownReference`] when an embedded `$ref` names a
    /// schema that was never declared.
    pub fn infer(&self, example: &Value, visited: &mut Vec<String>) -> Result<Schema> {
        match example {
            Value::Null => Ok(match self.null_policy {
                NullPolicy::NullableString => Schema::string().nullable(),
                NullPolicy::Unconstrained => Schema::default().nullable(),
            }),
            Value::Bool(_) => Ok(Schema::of_type("boolean")),
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    Ok(Schema::of_type("integer"))
                } else {
                    Ok(Schema::of_type("number"))
                }
            }
            Value::String(s) => Ok(match string_format(s) {
                Some(format) => Schema::string().with_format(format),
                None => Schema::string(),
            }),
            Value::Array(values) => {
                let items = match values.first() {
                    Some(first) => self.infer(first, visited)?,
                    None => Schema::default(),
                };
                Ok(Schema::array(items))
            }
            Value::Object(map) => match embedded_reference(map) {
                Some(name) => self.expand_named(name, visited),
                None => {
                    let mut properties = IndexMap::with_capacity(map.len());
                    for (key, value) in map {
                        properties.insert(key.clone(), self.infer(value, visited)?);
                    }
                    Ok(Schema::object(properties))
                }
            },
        }
    }

    /// Infer a schema from a top-level example
    pub fn infer_example(&self, example: &Value) -> Result<Schema> {
        self.infer(example, &mut Vec::new())
    }

    /// Expand the declared schema `name` into its full shape.
    pub fn expand_named(&self, name: &str, visited: &mut Vec<String>) -> Result<Schema> {
        if visited.iter().any(|v| v == name) {
            debug!("Schema {} is already being expanded, using placeholder", name);
            return Ok(Schema::of_type("object"));
        }

        let declared = self
            .named
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::unknown_reference(name))?;

        visited.push(name.to_string());
        let shape = match &declared.example {
            Some(example) => self.infer(example, visited),
            None => Ok(Self::from_properties(&declared.properties, &[])),
        };
        visited.pop();

        Ok(shape?.with_description(&declared.description))
    }

    /// Object schema from a declared name → type map
    pub fn from_properties(
        properties: &IndexMap<String, ValueType>,
        required: &[String],
    ) -> Schema {
        let properties = properties
            .iter()
            .map(|(name, value_type)| (name.clone(), Schema::from(*value_type)))
            .collect();
        Schema::object(properties).with_required(required)
    }
}

fn embedded_reference(map: &Map<String, Value>) -> Option<&str> {
    if map.len() != 1 {
        return None;
    }
    map.get(EXAMPLE_REF_KEY).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn infer(example: Value) -> Schema {
        SchemaInferencer::new(&[], NullPolicy::default())
            .infer_example(&example)
            .unwrap()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(infer(json!(true)), Schema::of_type("boolean"));
        assert_eq!(infer(json!(30)), Schema::of_type("integer"));
        assert_eq!(infer(json!(-4)), Schema::of_type("integer"));
        assert_eq!(infer(json!(19.99)), Schema::of_type("number"));
        assert_eq!(infer(json!("John")), Schema::string());
    }

    #[test]
    fn test_string_formats() {
        assert_eq!(string_format("john@example.com"), Some("email"));
        assert_eq!(string_format("2024-01-15"), Some("date"));
        assert_eq!(string_format("2024-01-15T10:30:00Z"), Some("date-time"));
        assert_eq!(string_format("2024-01-15T10:30:00.000000Z"), Some("date-time"));
        assert_eq!(string_format("2024-01-15T10:30:00+02:00"), Some("date-time"));
        assert_eq!(
            string_format("550e8400-e29b-41d4-a716-446655440000"),
            Some("uuid")
        );
        assert_eq!(string_format("John Doe"), None);
        assert_eq!(string_format("not@an email"), None);
        assert_eq!(string_format("2024-1-5"), None);
    }

    #[test]
    fn test_null_policies() {
        assert_eq!(infer(json!(null)), Schema::string().nullable());

        let unconstrained = SchemaInferencer::new(&[], NullPolicy::Unconstrained)
            .infer_example(&json!(null))
            .unwrap();
        assert_eq!(
            serde_json::to_value(&unconstrained).unwrap(),
            json!({"nullable": true})
        );
    }

    #[test]
    fn test_object_body_example() {
        let schema = infer(json!({"name": "John", "age": 30}));
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "age": {"type": "integer"}
                }
            })
        );
    }

    #[test]
    fn test_arrays_use_first_element() {
        let schema = infer(json!([{"id": 1}, "ignored"]));
        assert_eq!(schema.schema_type.as_deref(), Some("array"));
        let items = schema.items.unwrap();
        assert_eq!(items.schema_type.as_deref(), Some("object"));

        let empty = infer(json!([]));
        assert_eq!(serde_json::to_value(&empty).unwrap(), json!({"type": "array", "items": {}}));
    }

    #[test]
    fn test_key_order_and_nesting_preserved() {
        let source = r#"{"zeta":1,"alpha":{"inner_b":true,"inner_a":[1.5]},"mid":"x"}"#;
        let example: Value = serde_json::from_str(source).unwrap();
        let schema = infer(example);

        let keys: Vec<_> = schema.properties.as_ref().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);

        let alpha = &schema.properties.as_ref().unwrap()["alpha"];
        let inner: Vec<_> = alpha.properties.as_ref().unwrap().keys().cloned().collect();
        assert_eq!(inner, vec!["inner_b", "inner_a"]);

        let encoded = serde_json::to_string(&schema).unwrap();
        let zeta = encoded.find("\"zeta\"").unwrap();
        let alpha_pos = encoded.find("\"alpha\"").unwrap();
        let mid = encoded.find("\"mid\"").unwrap();
        assert!(zeta < alpha_pos && alpha_pos < mid);
    }

    #[test]
    fn test_deterministic() {
        let example = json!({"a": [{"b": null}], "c": "2024-01-01"});
        assert_eq!(infer(example.clone()), infer(example));
    }

    #[test]
    fn test_embedded_reference_expands_named_schema() {
        let named = vec![SchemaAnnotation::new("Address")
            .with_description("Postal address")
            .with_example(json!({"city": "Berlin"}))];
        let inferencer = SchemaInferencer::new(&named, NullPolicy::default());

        let schema = inferencer
            .infer_example(&json!({"address": {"$ref": "Address"}}))
            .unwrap();
        let address = &schema.properties.unwrap()["address"];
        assert_eq!(address.description.as_deref(), Some("Postal address"));
        assert!(address.properties.as_ref().unwrap().contains_key("city"));
    }

    #[test]
    fn test_mutual_references_are_cut() {
        let named = vec![
            SchemaAnnotation::new("User").with_example(json!({"id": 1, "team": {"$ref": "Team"}})),
            SchemaAnnotation::new("Team").with_example(json!({"members": [{"$ref": "User"}]})),
        ];
        let inferencer = SchemaInferencer::new(&named, NullPolicy::default());

        let user = inferencer.expand_named("User", &mut Vec::new()).unwrap();
        let team = &user.properties.as_ref().unwrap()["team"];
        let members = &team.properties.as_ref().unwrap()["members"];
        assert_eq!(members.items.as_deref(), Some(&Schema::of_type("object")));
    }

    #[test]
    fn test_visited_is_restored_after_expansion() {
        let named = vec![SchemaAnnotation::new("Tag").with_example(json!({"label": "x"}))];
        let inferencer = SchemaInferencer::new(&named, NullPolicy::default());

        let mut visited = Vec::new();
        let schema = inferencer
            .infer(&json!([{"$ref": "Tag"}, {"$ref": "Tag"}]), &mut visited)
            .unwrap();
        assert!(visited.is_empty());
        assert!(schema.items.unwrap().properties.is_some());
    }

    #[test]
    fn test_unknown_embedded_reference_fails() {
        let inferencer = SchemaInferencer::new(&[], NullPolicy::default());
        let err = inferencer
            .infer_example(&json!({"owner": {"$ref": "Ghost"}}))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownReference { name } if name == "Ghost"));
    }

    #[test]
    fn test_ref_key_with_siblings_is_plain_object() {
        let schema = infer(json!({"$ref": "User", "extra": 1}));
        let keys: Vec<_> = schema.properties.unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["$ref", "extra"]);
    }

    #[test]
    fn test_from_properties() {
        let mut properties = IndexMap::new();
        properties.insert("name".to_string(), ValueType::String);
        properties.insert("tags".to_string(), ValueType::Array);
        let schema = SchemaInferencer::from_properties(&properties, &["name".to_string()]);

        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "tags": {"type": "array", "items": {"type": "string"}}
                },
                "required": ["name"]
            })
        );
    }
}
