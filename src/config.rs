//! Generator configuration.
//!
//! Mirrors the host-level `openapi` settings: document metadata, servers,
//! the documentation route to hide, configured API versions and a few
//! inference policies. Every field has a default so an empty section is valid.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How an example `null` is inferred
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullPolicy {
    /// `{type: string, nullable: true}`
    #[default]
    NullableString,
    /// `{nullable: true}` with no type constraint
    Unconstrained,
}

/// One configured API version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionConfig {
    /// Version identifier used in route tags and paths, e.g. `v1`
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl VersionConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: String::new(),
            description: String::new(),
        }
    }
}

/// One entry of the document's `servers` list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_title() -> String {
    "API Documentation".to_string()
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_docs_route() -> String {
    "api-docs".to_string()
}

fn default_servers() -> Vec<ServerConfig> {
    vec![ServerConfig {
        url: "/".to_string(),
        description: None,
    }]
}

/// Configuration scalars supplied by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiConfig {
    /// Whether documentation is generated at all
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Document version used when no API version is requested
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_servers")]
    pub servers: Vec<ServerConfig>,
    /// Route prefix under which the documentation viewer itself is served
    #[serde(default = "default_docs_route")]
    pub docs_route: String,
    /// Further route prefixes that are never documented
    #[serde(default)]
    pub exclude_prefixes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_version: Option<String>,
    #[serde(default)]
    pub versions: Vec<VersionConfig>,
    /// Raw OpenAPI security scheme objects, keyed by scheme name
    #[serde(default)]
    pub security_schemes: IndexMap<String, Value>,
    #[serde(default)]
    pub null_policy: NullPolicy,
    /// Disambiguate colliding schema names with numeric suffixes instead of failing
    #[serde(default = "default_true")]
    pub schema_name_suffixing: bool,
    /// Register object-shaped response schemas as components instead of inlining them
    #[serde(default)]
    pub extract_response_schemas: bool,
    /// Branding for documentation viewers; not used by the generator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<String>,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title: default_title(),
            description: None,
            version: default_version(),
            servers: default_servers(),
            docs_route: default_docs_route(),
            exclude_prefixes: Vec::new(),
            default_version: None,
            versions: Vec::new(),
            security_schemes: IndexMap::new(),
            null_policy: NullPolicy::default(),
            schema_name_suffixing: true,
            extract_response_schemas: false,
            app_name: None,
            app_logo: None,
            theme_color: None,
        }
    }
}

impl OpenApiConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_server(mut self, url: impl Into<String>) -> Self {
        self.servers = vec![ServerConfig {
            url: url.into(),
            description: None,
        }];
        self
    }

    pub fn with_version(mut self, version: VersionConfig) -> Self {
        self.versions.push(version);
        self
    }

    pub fn find_version(&self, name: &str) -> Option<&VersionConfig> {
        self.versions.iter().find(|v| v.name == name)
    }

    /// The configured default version, falling back to the first configured one
    pub fn default_version(&self) -> Option<&str> {
        self.default_version
            .as_deref()
            .or_else(|| self.versions.first().map(|v| v.name.as_str()))
    }

    /// Every route prefix the walker skips, the docs route first
    pub fn excluded_prefixes(&self) -> Vec<String> {
        let mut prefixes = Vec::with_capacity(self.exclude_prefixes.len() + 1);
        if !self.docs_route.is_empty() {
            prefixes.push(self.docs_route.clone());
        }
        prefixes.extend(self.exclude_prefixes.iter().cloned());
        prefixes
    }
}
