//! Route table model.
//!
//! The host framework owns routing; this module only describes what the
//! generator reads from it. A host exposes its registered routes through the
//! [`RouteSource`] trait, and a plain `Vec<Route>` is already a source.
//!
//! # Example
//!
//! ```
//! use openapi_from_routes::route::{HttpMethod, Route, RouteSource};
//!
//! let routes = vec![
//!     Route::new(HttpMethod::Get, "/users", "UserController@index"),
//!     Route::new(HttpMethod::Get, "/users/{id}", "UserController@show"),
//! ];
//! assert_eq!(routes.routes().len(), 2);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Read-only access to the host's registered routes.
///
/// Implementations return a snapshot in registration order. The generator
/// never mutates the table it is handed.
pub trait RouteSource: Send + Sync {
    /// Returns every registered route, in registration order.
    fn routes(&self) -> Vec<Route>;
}

impl RouteSource for Vec<Route> {
    fn routes(&self) -> Vec<Route> {
        self.clone()
    }
}

/// A single registered route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// HTTP method bound by this route
    pub method: HttpMethod,
    /// The path template in the host's native placeholder syntax
    pub path: String,
    /// Opaque handler reference used to look up annotations
    pub handler: String,
    /// Version tag reported by the host, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Internal routes are never documented
    #[serde(default)]
    pub internal: bool,
}

/// HTTP methods a route can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Head,
}

impl HttpMethod {
    /// Upper-case wire name (`GET`)
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Lower-case key used inside an OpenAPI path item (`get`)
    pub fn openapi_key(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Route {
    /// Create a new Route with no version tag
    pub fn new(method: HttpMethod, path: impl Into<String>, handler: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            handler: handler.into(),
            version: None,
            internal: false,
        }
    }

    /// Tag this route with an API version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Mark this route as internal so it is left out of the document
    pub fn internal(mut self) -> Self {
        self.internal = true;
        self
    }
}
