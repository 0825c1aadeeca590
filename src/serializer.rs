//! Serialization module for converting OpenAPI documents to YAML or JSON format.
//!
//! Key order follows the document's construction order: paths appear in route
//! table order and schema properties in declaration order.

use crate::openapi_builder::OpenApiDocument;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes an OpenAPI document to YAML format.
///
/// # Errors
///
/// Returns an error if serialization fails.
///
/// # Example
///
/// ```
/// use openapi_from_routes::annotation::AnnotationRegistry;
/// use openapi_from_routes::config::OpenApiConfig;
/// use openapi_from_routes::generator::Generator;
/// use openapi_from_routes::route::{HttpMethod, Route};
/// use openapi_from_routes::serializer::serialize_yaml;
///
/// let routes = vec![Route::new(HttpMethod::Get, "/users", "users.index")];
/// let generator = Generator::from_routes(OpenApiConfig::default(), routes, AnnotationRegistry::new());
/// let yaml = serialize_yaml(&generator.generate(None).unwrap()).unwrap();
/// assert!(yaml.contains("/users:"));
/// ```
pub fn serialize_yaml(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize OpenAPI document to YAML")
}

/// Serializes an OpenAPI document to JSON format with pretty printing.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize OpenAPI document to JSON")
}

/// Writes string content to a file, creating parent directories as needed.
///
/// Overwrites the file if it already exists.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
