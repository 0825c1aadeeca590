//! Declarative route and annotation manifests.
//!
//! A manifest describes everything a host would otherwise register in code:
//! the `openapi` configuration section, the route table, per-handler
//! annotations and named schemas. YAML and JSON are both accepted.
//!
//! ```yaml
//! openapi:
//!   title: Demo API
//! routes:
//!   - { method: GET, path: /users/{id}, handler: UserController@show }
//! handlers:
//!   UserController@show:
//!     endpoint: { summary: Show a user, tags: [Users] }
//!     responses:
//!       - { status: 200, ref: User }
//! schemas:
//!   - { name: User, example: { id: 1, name: John } }
//! ```

use crate::annotation::{AnnotationRegistry, HandlerAnnotations, SchemaAnnotation};
use crate::config::OpenApiConfig;
use crate::error::{Error, Result};
use crate::generator::Generator;
use crate::route::Route;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A complete declarative registration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub openapi: OpenApiConfig,
    #[serde(default)]
    pub routes: Vec<Route>,
    /// Handler reference → annotations
    #[serde(default)]
    pub handlers: IndexMap<String, HandlerAnnotations>,
    #[serde(default)]
    pub schemas: Vec<SchemaAnnotation>,
}

impl Manifest {
    /// Load a manifest from disk; `.json` files are read as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading manifest from {}", path.display());
        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        };

        parsed.map_err(|err| match err {
            Error::Json(_) | Error::Yaml(_) | Error::InvalidManifest { .. } => {
                Error::InvalidManifest {
                    file: path.to_path_buf(),
                    message: err.to_string(),
                }
            }
            other => other,
        })
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let manifest: Manifest = serde_yaml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Rejects manifests that are well-formed but inconsistent
    fn validate(&self) -> Result<()> {
        for schema in &self.schemas {
            if schema.name.is_empty() {
                return Err(invalid("schema declared without a name"));
            }
        }
        for route in &self.routes {
            if route.handler.is_empty() {
                return Err(invalid(format!(
                    "route {} {} has no handler",
                    route.method, route.path
                )));
            }
        }
        if let Some(default) = &self.openapi.default_version {
            if self.openapi.find_version(default).is_none() {
                return Err(invalid(format!(
                    "default version '{}' is not among the configured versions",
                    default
                )));
            }
        }
        Ok(())
    }

    /// The handler annotations and named schemas as a registry
    pub fn annotation_registry(&self) -> AnnotationRegistry {
        let mut registry = AnnotationRegistry::new();
        for (handler, annotations) in &self.handlers {
            registry.insert(handler.clone(), annotations.clone());
        }
        for schema in &self.schemas {
            registry.schema(schema.clone());
        }
        registry
    }

    pub fn into_generator(self) -> Generator {
        let annotations = self.annotation_registry();
        Generator::from_routes(self.openapi, self.routes, annotations)
    }
}

/// A validation failure; `load` fills in the file afterwards
fn invalid(message: impl Into<String>) -> Error {
    Error::InvalidManifest {
        file: Default::default(),
        message: message.into(),
    }
}
