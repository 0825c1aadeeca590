use crate::annotation::ValueType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Prefix of every component schema reference
pub const COMPONENTS_SCHEMAS: &str = "#/components/schemas/";

/// OpenAPI Schema definition
///
/// Every keyword is optional; `Schema::default()` serializes to `{}`, the
/// unconstrained schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// The type of the schema (string, integer, object, array, etc.)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Format hint (e.g., "email", "date-time", "uuid")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Properties for object types, in declaration order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,
    /// Required field names for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Reference to a component schema
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Schema {
    /// A schema constrained only by its `type`
    pub fn of_type(schema_type: &str) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            ..Self::default()
        }
    }

    pub fn string() -> Self {
        Self::of_type("string")
    }

    pub fn object(properties: IndexMap<String, Schema>) -> Self {
        Self {
            schema_type: Some("object".to_string()),
            properties: Some(properties),
            ..Self::default()
        }
    }

    pub fn array(items: Schema) -> Self {
        Self {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(items)),
            ..Self::default()
        }
    }

    /// A `$ref` to `#/components/schemas/{name}`
    pub fn reference(name: &str) -> Self {
        Self {
            reference: Some(format!("{}{}", COMPONENTS_SCHEMAS, name)),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        if !description.is_empty() {
            self.description = Some(description.to_string());
        }
        self
    }

    /// Sets `required`, leaving it absent when `names` is empty
    pub fn with_required(mut self, names: &[String]) -> Self {
        self.required = if names.is_empty() {
            None
        } else {
            Some(names.to_vec())
        };
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = Some(true);
        self
    }

    /// True for the unconstrained schema `{}`
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Component name this schema refers to, if it is a `$ref`
    pub fn reference_name(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .and_then(|r| r.strip_prefix(COMPONENTS_SCHEMAS))
    }
}

impl From<ValueType> for Schema {
    fn from(value_type: ValueType) -> Self {
        match value_type {
            // Declared arrays carry no element type; document them as string lists
            ValueType::Array => Schema::array(Schema::string()),
            other => Schema::of_type(other.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_schema_serializes_to_empty_object() {
        let schema = Schema::default();
        assert!(schema.is_empty());
        assert_eq!(serde_json::to_value(&schema).unwrap(), json!({}));
    }

    #[test]
    fn test_reference_round_trip() {
        let schema = Schema::reference("User");
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({"$ref": "#/components/schemas/User"})
        );
        assert_eq!(schema.reference_name(), Some("User"));
        assert_eq!(Schema::string().reference_name(), None);
    }

    #[test]
    fn test_from_value_type() {
        assert_eq!(Schema::from(ValueType::Integer), Schema::of_type("integer"));
        let array = Schema::from(ValueType::Array);
        assert_eq!(array.schema_type.as_deref(), Some("array"));
        assert_eq!(array.items.as_deref(), Some(&Schema::string()));
    }

    #[test]
    fn test_required_omitted_when_empty() {
        let schema = Schema::object(IndexMap::new()).with_required(&[]);
        assert!(schema.required.is_none());
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({"type": "object", "properties": {}})
        );
    }
}
