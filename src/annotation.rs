//! Handler annotation model.
//!
//! Annotations are plain records describing what a handler documents about
//! itself. They are registered explicitly against a handler reference in an
//! [`AnnotationRegistry`], either through the builder methods below or by
//! loading a [`crate::manifest::Manifest`].
//!
//! ```
//! use openapi_from_routes::annotation::{
//!     AnnotationRegistry, EndpointAnnotation, RequestParamAnnotation, ResponseAnnotation,
//!     ParamLocation, ValueType,
//! };
//! use serde_json::json;
//!
//! let mut registry = AnnotationRegistry::new();
//! registry
//!     .handler("UserController@show")
//!     .endpoint(EndpointAnnotation::new("Show a user").with_tags(["Users"]))
//!     .param(RequestParamAnnotation::new("id", ValueType::Integer, ParamLocation::Path).required())
//!     .response(ResponseAnnotation::new(200).with_example(json!({"id": 1})));
//!
//! assert!(registry.get("UserController@show").is_some());
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Endpoint-level documentation: summary, description, tags, deprecation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointAnnotation {
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub deprecated: bool,
}

impl EndpointAnnotation {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }
}

/// Declared value types for parameters and body properties.
///
/// Parameters use every variant except `Object`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ValueType {
    /// OpenAPI `type` keyword for this value type
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
            ValueType::Array => "array",
            ValueType::Object => "object",
        }
    }
}

/// Where a request parameter is carried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    #[default]
    Query,
    Path,
    Header,
    Cookie,
}

impl ParamLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamLocation::Query => "query",
            ParamLocation::Path => "path",
            ParamLocation::Header => "header",
            ParamLocation::Cookie => "cookie",
        }
    }
}

/// One documented request parameter. Repeatable per handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestParamAnnotation {
    pub name: String,
    #[serde(rename = "type", default)]
    pub param_type: ValueType,
    #[serde(rename = "in", default)]
    pub location: ParamLocation,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl RequestParamAnnotation {
    pub fn new(name: impl Into<String>, param_type: ValueType, location: ParamLocation) -> Self {
        Self {
            name: name.into(),
            param_type,
            location,
            description: String::new(),
            required: false,
            example: None,
        }
    }

    /// A query string parameter of type string, the original attribute defaults
    pub fn query(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::String, ParamLocation::Query)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }
}

/// Request body shape. At most one per handler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestBodyAnnotation {
    #[serde(default)]
    pub properties: IndexMap<String, ValueType>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Map<String, Value>>,
}

impl RequestBodyAnnotation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property(mut self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.properties.insert(name.into(), value_type);
        self
    }

    pub fn with_required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the example payload. Non-object values are ignored.
    pub fn with_example(mut self, example: Value) -> Self {
        if let Value::Object(map) = example {
            self.example = Some(map);
        }
        self
    }
}

fn default_status() -> u16 {
    200
}

fn default_response_description() -> String {
    "Successful response".to_string()
}

/// One documented response. Repeatable per handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseAnnotation {
    #[serde(default = "default_status")]
    pub status: u16,
    #[serde(default = "default_response_description")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// Name of a reusable schema declared with a [`SchemaAnnotation`]
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub schema_ref: Option<String>,
}

impl ResponseAnnotation {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            description: default_response_description(),
            example: None,
            schema_ref: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }

    pub fn with_schema_ref(mut self, name: impl Into<String>) -> Self {
        self.schema_ref = Some(name.into());
        self
    }
}

/// A named reusable schema.
///
/// The shape comes from `example` when one is given, otherwise from the
/// declared `properties`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaAnnotation {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub properties: IndexMap<String, ValueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl SchemaAnnotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn property(mut self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.properties.insert(name.into(), value_type);
        self
    }

    pub fn with_example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }
}

/// Every annotation attached to one handler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandlerAnnotations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<EndpointAnnotation>,
    #[serde(default)]
    pub params: Vec<RequestParamAnnotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<RequestBodyAnnotation>,
    #[serde(default)]
    pub responses: Vec<ResponseAnnotation>,
}

impl HandlerAnnotations {
    /// Sets the endpoint annotation, replacing any earlier one
    pub fn endpoint(&mut self, endpoint: EndpointAnnotation) -> &mut Self {
        self.endpoint = Some(endpoint);
        self
    }

    pub fn param(&mut self, param: RequestParamAnnotation) -> &mut Self {
        self.params.push(param);
        self
    }

    /// Sets the request body annotation, replacing any earlier one
    pub fn body(&mut self, body: RequestBodyAnnotation) -> &mut Self {
        self.body = Some(body);
        self
    }

    pub fn response(&mut self, response: ResponseAnnotation) -> &mut Self {
        self.responses.push(response);
        self
    }
}

/// Handler reference → annotations, plus the named schemas they may reference.
#[derive(Debug, Clone, Default)]
pub struct AnnotationRegistry {
    handlers: HashMap<String, HandlerAnnotations>,
    schemas: Vec<SchemaAnnotation>,
}

impl AnnotationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the annotations for `handler`, creating an empty entry if needed
    pub fn handler(&mut self, handler: impl Into<String>) -> &mut HandlerAnnotations {
        self.handlers.entry(handler.into()).or_default()
    }

    /// Replaces every annotation registered for `handler`
    pub fn insert(&mut self, handler: impl Into<String>, annotations: HandlerAnnotations) {
        self.handlers.insert(handler.into(), annotations);
    }

    pub fn get(&self, handler: &str) -> Option<&HandlerAnnotations> {
        self.handlers.get(handler)
    }

    /// Declares a named reusable schema
    pub fn schema(&mut self, schema: SchemaAnnotation) -> &mut Self {
        self.schemas.push(schema);
        self
    }

    /// Named schemas in declaration order
    pub fn schemas(&self) -> &[SchemaAnnotation] {
        &self.schemas
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
