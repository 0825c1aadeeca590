use crate::annotation::{
    ParamLocation, RequestBodyAnnotation, RequestParamAnnotation, ResponseAnnotation,
    SchemaAnnotation,
};
use crate::config::OpenApiConfig;
use crate::error::Result;
use crate::inferencer::SchemaInferencer;
use crate::path::{self, TranslatedPath};
use crate::registry::SchemaRegistry;
use crate::route::HttpMethod;
use crate::schema::Schema;
use crate::walker::WalkedRoute;
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// OpenAPI version emitted in every document
pub const OPENAPI_VERSION: &str = "3.0.3";

const JSON_CONTENT_TYPE: &str = "application/json";

/// OpenAPI document builder for a single generation pass
pub struct OpenApiBuilder<'a> {
    /// OpenAPI info section
    info: Info,
    servers: Vec<Server>,
    /// Paths collection (URL path -> PathItem)
    paths: IndexMap<String, PathItem>,
    /// Distinct tags in first-appearance order
    tags: Vec<String>,
    security_schemes: IndexMap<String, Value>,
    named_schemas: &'a [SchemaAnnotation],
    registry: SchemaRegistry,
    inferencer: SchemaInferencer<'a>,
    extract_response_schemas: bool,
    /// operationId assigned to each (path, method), unique across the document
    operation_ids: HashMap<(String, HttpMethod), String>,
    used_operation_ids: HashSet<String>,
}

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI Server object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI Tag object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
}

/// OpenAPI PathItem object - represents all operations for a single path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// POST operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// PUT operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// DELETE operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// PATCH operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// OPTIONS operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    /// HEAD operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
}

impl PathItem {
    fn slot(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
        }
    }

    /// Store `operation` under `method`, returning the one it replaced
    pub fn set(&mut self, method: HttpMethod, operation: Operation) -> Option<Operation> {
        self.slot(method).replace(operation)
    }

    pub fn get(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
        }
    }

    /// Number of operations on this path
    pub fn len(&self) -> usize {
        [
            &self.get,
            &self.post,
            &self.put,
            &self.delete,
            &self.patch,
            &self.options,
            &self.head,
        ]
        .iter()
        .filter(|op| op.is_some())
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Operation summary
    pub summary: String,
    /// Operation description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Operation ID
    #[serde(rename = "operationId")]
    pub operation_id: String,
    /// Parameters (path, query, header, cookie)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    /// Request body
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code
    pub responses: IndexMap<String, Response>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Parameter location (path, query, header, cookie)
    #[serde(rename = "in")]
    pub location: ParamLocation,
    /// Parameter description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the parameter is required
    pub required: bool,
    /// Parameter schema
    pub schema: Schema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl Parameter {
    /// A required string path parameter, for placeholders nobody declared
    pub fn path(name: &str) -> Self {
        Self {
            name: name.to_string(),
            location: ParamLocation::Path,
            description: None,
            required: true,
            schema: Schema::string(),
            example: None,
        }
    }

    /// Path parameters are always required, whatever the annotation says
    fn from_annotation(param: &RequestParamAnnotation) -> Self {
        Self {
            name: param.name.clone(),
            location: param.location,
            description: non_empty(&param.description),
            required: param.required || param.location == ParamLocation::Path,
            schema: Schema::from(param.param_type),
            example: param.example.clone(),
        }
    }
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Request body description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the request body is required
    pub required: bool,
    /// Content types and their schemas
    pub content: IndexMap<String, MediaType>,
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    /// Schema for this media type
    pub schema: Schema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Response description
    pub description: String,
    /// Response content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,
}

/// OpenAPI Components object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    /// Schema definitions
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, Schema>,
    #[serde(
        rename = "securitySchemes",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub security_schemes: IndexMap<String, Value>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    /// API info
    pub info: Info,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// API paths
    pub paths: IndexMap<String, PathItem>,
    /// Components (schemas, security schemes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
}

impl OpenApiDocument {
    /// The operation documented for `method` on `path`, if any
    pub fn operation(&self, path: &str, method: HttpMethod) -> Option<&Operation> {
        self.paths.get(path).and_then(|item| item.get(method))
    }

    /// Total number of operations across all paths
    pub fn operation_count(&self) -> usize {
        self.paths.values().map(PathItem::len).sum()
    }
}

impl<'a> OpenApiBuilder<'a> {
    /// Create a builder whose metadata and policies come from `config`.
    ///
    /// `named_schemas` are the reusable schemas responses may reference.
    pub fn new(config: &OpenApiConfig, named_schemas: &'a [SchemaAnnotation]) -> Self {
        debug!("Initializing OpenApiBuilder");
        Self {
            info: Info {
                title: config.title.clone(),
                version: config.version.clone(),
                description: config.description.clone(),
            },
            servers: config
                .servers
                .iter()
                .map(|s| Server {
                    url: s.url.clone(),
                    description: s.description.clone(),
                })
                .collect(),
            paths: IndexMap::new(),
            tags: Vec::new(),
            security_schemes: config.security_schemes.clone(),
            named_schemas,
            registry: SchemaRegistry::new(config.schema_name_suffixing),
            inferencer: SchemaInferencer::new(named_schemas, config.null_policy),
            extract_response_schemas: config.extract_response_schemas,
            operation_ids: HashMap::new(),
            used_operation_ids: HashSet::new(),
        }
    }

    /// Set custom info for the API
    pub fn with_info(
        mut self,
        title: String,
        version: String,
        description: Option<String>,
    ) -> Self {
        self.info = Info {
            title,
            version,
            description,
        };
        self
    }

    /// Register every declared named schema as a component.
    pub fn register_named_schemas(&mut self) -> Result<()> {
        for declared in self.named_schemas {
            let shape = self.inferencer.expand_named(&declared.name, &mut Vec::new())?;
            self.registry.register(Some(&declared.name), shape)?;
        }
        Ok(())
    }

    /// Add a walked route to the OpenAPI document
    pub fn add_route(&mut self, walked: &WalkedRoute) -> Result<()> {
        let route = &walked.route;
        debug!("Adding route: {} {}", route.method, route.path);

        let translated = path::translate(&route.path)?;
        let parameters = self.build_parameters(&translated, &walked.params);
        let request_body = walked
            .body
            .as_ref()
            .map(|body| self.build_request_body(body))
            .transpose()?;
        let responses = self.build_responses(&walked.responses)?;

        for tag in &walked.endpoint.tags {
            if !self.tags.contains(tag) {
                self.tags.push(tag.clone());
            }
        }

        let operation = Operation {
            tags: walked.endpoint.tags.clone(),
            summary: walked.endpoint.summary.clone(),
            description: non_empty(&walked.endpoint.description),
            operation_id: self.unique_operation_id(route.method, &translated.openapi_path),
            parameters: if parameters.is_empty() {
                None
            } else {
                Some(parameters)
            },
            request_body,
            responses,
            deprecated: walked.endpoint.deprecated.then_some(true),
        };

        let path_item = self.paths.entry(translated.openapi_path.clone()).or_default();
        if path_item.set(route.method, operation).is_some() {
            warn!(
                "Duplicate route {} {}; the later registration wins",
                route.method, translated.openapi_path
            );
        }
        Ok(())
    }

    /// The operationId for `method` on `openapi_path`. A replaced operation keeps
    /// its id; a clash with another operation gets `_2`, `_3`, ... appended.
    fn unique_operation_id(&mut self, method: HttpMethod, openapi_path: &str) -> String {
        let key = (openapi_path.to_string(), method);
        if let Some(id) = self.operation_ids.get(&key) {
            return id.clone();
        }

        let base = operation_id(method, openapi_path);
        let mut id = base.clone();
        let mut suffix = 2;
        while self.used_operation_ids.contains(&id) {
            id = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        if id != base {
            debug!("operationId {} taken, using {}", base, id);
        }

        self.used_operation_ids.insert(id.clone());
        self.operation_ids.insert(key, id.clone());
        id
    }

    /// Path parameters in placeholder order, then every other declared parameter
    fn build_parameters(
        &self,
        translated: &TranslatedPath,
        declared: &[RequestParamAnnotation],
    ) -> Vec<Parameter> {
        let undeclared = path::undeclared_params(translated, declared);
        let mut parameters = Vec::with_capacity(translated.params.len() + declared.len());

        for name in &translated.params {
            if undeclared.contains(&name.as_str()) {
                parameters.push(Parameter::path(name));
            } else if let Some(param) = declared
                .iter()
                .rev()
                .find(|p| p.location == ParamLocation::Path && p.name == *name)
            {
                parameters.push(Parameter::from_annotation(param));
            }
        }

        for param in declared {
            if param.location != ParamLocation::Path {
                parameters.push(Parameter::from_annotation(param));
            } else if !translated.params.contains(&param.name) {
                warn!(
                    "Path parameter '{}' is not in {}; dropping it",
                    param.name, translated.openapi_path
                );
            }
        }

        parameters
    }

    fn build_request_body(&self, body: &RequestBodyAnnotation) -> Result<RequestBody> {
        let schema = match &body.example {
            Some(example) => {
                let mut schema = self
                    .inferencer
                    .infer_example(&Value::Object(example.clone()))?;
                // declared property types take precedence over inferred ones
                if let Some(properties) = schema.properties.as_mut() {
                    for (name, value_type) in &body.properties {
                        properties.insert(name.clone(), Schema::from(*value_type));
                    }
                }
                schema.with_required(&body.required)
            }
            None => SchemaInferencer::from_properties(&body.properties, &body.required),
        };

        Ok(RequestBody {
            description: non_empty(&body.description),
            required: true,
            content: json_content(schema, body.example.clone().map(Value::Object)),
        })
    }

    fn build_responses(
        &mut self,
        annotations: &[ResponseAnnotation],
    ) -> Result<IndexMap<String, Response>> {
        let mut responses = IndexMap::new();

        if annotations.is_empty() {
            responses.insert(
                "200".to_string(),
                Response {
                    description: "Successful response".to_string(),
                    content: None,
                },
            );
            return Ok(responses);
        }

        for annotation in annotations {
            let content = if let Some(name) = &annotation.schema_ref {
                let schema = self.registry.reference_to(name)?;
                Some(json_content(schema, annotation.example.clone()))
            } else if let Some(example) = &annotation.example {
                let mut schema = self.inferencer.infer_example(example)?;
                if self.extract_response_schemas && schema.properties.is_some() {
                    let token = self.registry.register(None, schema)?;
                    schema = Schema::reference(&token);
                }
                Some(json_content(schema, Some(example.clone())))
            } else {
                None
            };

            let status = annotation.status.to_string();
            let response = Response {
                description: annotation.description.clone(),
                content,
            };
            // Several annotations for one status: the last one declared is kept
            if responses.insert(status.clone(), response).is_some() {
                warn!("Response {} declared more than once; keeping the last", status);
            }
        }

        Ok(responses)
    }

    /// Build the final OpenAPI document
    pub fn build(self) -> OpenApiDocument {
        debug!("Building final OpenAPI document");

        let components = Components {
            schemas: self.registry.into_schemas(),
            security_schemes: self.security_schemes,
        };
        let components =
            if components.schemas.is_empty() && components.security_schemes.is_empty() {
                None
            } else {
                Some(components)
            };

        OpenApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: self.info,
            servers: self.servers,
            tags: self.tags.into_iter().map(|name| Tag { name }).collect(),
            paths: self.paths,
            components,
        }
    }
}

fn json_content(schema: Schema, example: Option<Value>) -> IndexMap<String, MediaType> {
    let mut content = IndexMap::new();
    content.insert(JSON_CONTENT_TYPE.to_string(), MediaType { schema, example });
    content
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// `GET /users/{id}` → `get_users_id`
fn operation_id(method: HttpMethod, openapi_path: &str) -> String {
    let mut id = method.openapi_key().to_string();
    let mut pending_separator = true;
    for c in openapi_path.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator {
                id.push('_');
                pending_separator = false;
            }
            id.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    if id == method.openapi_key() {
        id.push_str("_root");
    }
    id
}
