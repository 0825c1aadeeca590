//! Route walking.
//!
//! Pairs every documentable route from the host's table with the annotations
//! registered for its handler. Routes are reported in table order; internal
//! routes and routes under an excluded prefix (the docs viewer's own routes)
//! are dropped here so the document never lists itself.

use crate::annotation::{
    AnnotationRegistry, EndpointAnnotation, RequestBodyAnnotation, RequestParamAnnotation,
    ResponseAnnotation,
};
use crate::config::OpenApiConfig;
use crate::path;
use crate::route::{HttpMethod, Route, RouteSource};
use log::debug;

/// Which routes the walker keeps, and how it spots version tags
#[derive(Debug, Clone, Default)]
pub struct RouteFilter {
    /// Path prefixes never documented, compared segment-wise without leading `/`
    pub excluded_prefixes: Vec<String>,
    /// Configured version names, recognised as path segments
    pub versions: Vec<String>,
}

impl RouteFilter {
    pub fn from_config(config: &OpenApiConfig) -> Self {
        Self {
            excluded_prefixes: config.excluded_prefixes(),
            versions: config.versions.iter().map(|v| v.name.clone()).collect(),
        }
    }

    fn is_excluded(&self, route: &Route) -> bool {
        if route.internal {
            return true;
        }
        let path = route.path.trim_start_matches('/');
        self.excluded_prefixes.iter().any(|prefix| {
            let prefix = prefix.trim_matches('/');
            !prefix.is_empty()
                && (path == prefix
                    || path
                        .strip_prefix(prefix)
                        .is_some_and(|rest| rest.starts_with('/')))
        })
    }

    fn version_of(&self, route: &Route) -> Option<String> {
        route.version.clone().or_else(|| {
            route
                .path
                .split('/')
                .find(|segment| self.versions.iter().any(|v| v == segment))
                .map(str::to_string)
        })
    }
}

/// One route together with everything documented about its handler
#[derive(Debug, Clone, PartialEq)]
pub struct WalkedRoute {
    pub route: Route,
    /// The handler's endpoint annotation, or one synthesized from the route
    pub endpoint: EndpointAnnotation,
    pub params: Vec<RequestParamAnnotation>,
    pub body: Option<RequestBodyAnnotation>,
    pub responses: Vec<ResponseAnnotation>,
    /// Version tag; `None` means the route belongs to every version
    pub version: Option<String>,
}

impl WalkedRoute {
    /// Whether this route is part of the document for `version`
    pub fn in_version(&self, version: &str) -> bool {
        self.version.as_deref().map_or(true, |v| v == version)
    }
}

/// Walk the route table and attach annotations to each documentable route.
pub fn walk(
    source: &dyn RouteSource,
    annotations: &AnnotationRegistry,
    filter: &RouteFilter,
) -> Vec<WalkedRoute> {
    let routes = source.routes();
    let mut walked = Vec::with_capacity(routes.len());

    for route in routes {
        if filter.is_excluded(&route) {
            debug!("Skipping undocumented route {} {}", route.method, route.path);
            continue;
        }

        let version = filter.version_of(&route);
        let handler = annotations.get(&route.handler).cloned().unwrap_or_default();
        let endpoint = handler
            .endpoint
            .unwrap_or_else(|| EndpointAnnotation::new(humanize(route.method, &route.path)));

        walked.push(WalkedRoute {
            route,
            endpoint,
            params: handler.params,
            body: handler.body,
            responses: handler.responses,
            version,
        });
    }

    debug!("Walked {} documentable routes", walked.len());
    walked
}

/// Summary for an unannotated route: `GET /users/{id}` → `Get users by id`
pub fn humanize(method: HttpMethod, path: &str) -> String {
    let method = method.as_str();
    let mut verb = method[..1].to_string();
    verb.push_str(&method[1..].to_lowercase());

    // a malformed path is reported by the builder; describe it as written
    let template = path::translate(path)
        .map(|translated| translated.openapi_path)
        .unwrap_or_else(|_| path.to_string());

    let mut words: Vec<String> = Vec::new();
    for segment in template.split('/') {
        let mut rest = segment;
        while !rest.is_empty() {
            let (literal, tail) = match rest.find('{') {
                Some(open) => rest.split_at(open),
                None => (rest, ""),
            };
            words.extend(
                literal
                    .split(['-', '_', '.'])
                    .filter(|word| !word.is_empty())
                    .map(str::to_string),
            );
            match tail.find('}') {
                Some(close) => {
                    words.push(format!("by {}", &tail[1..close]));
                    rest = &tail[close + 1..];
                }
                None => {
                    if !tail.is_empty() {
                        words.push(tail.to_string());
                    }
                    rest = "";
                }
            }
        }
    }

    if words.is_empty() {
        format!("{} root", verb)
    } else {
        format!("{} {}", verb, words.join(" "))
    }
}
