//! Document generation with a per-version cache.
//!
//! [`Generator`] ties the pieces together: it checks the requested version,
//! walks the host's routes, filters them by version, assembles the document
//! with a fresh [`OpenApiBuilder`] and caches the result. One instance is
//! meant to live as long as the host process and be shared across requests.
//!
//! ```
//! use openapi_from_routes::annotation::AnnotationRegistry;
//! use openapi_from_routes::config::OpenApiConfig;
//! use openapi_from_routes::generator::Generator;
//! use openapi_from_routes::route::{HttpMethod, Route};
//!
//! let routes = vec![Route::new(HttpMethod::Get, "/users/{id}", "users.show")];
//! let generator = Generator::from_routes(OpenApiConfig::default(), routes, AnnotationRegistry::new());
//!
//! let document = generator.generate(None).unwrap();
//! assert!(document.paths.contains_key("/users/{id}"));
//! ```

use crate::annotation::AnnotationRegistry;
use crate::config::{OpenApiConfig, VersionConfig};
use crate::error::{Error, Result};
use crate::openapi_builder::{OpenApiBuilder, OpenApiDocument};
use crate::route::{Route, RouteSource};
use crate::walker::{self, RouteFilter};
use log::{debug, info};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cache slot key: one document per requested version, plus one for "all"
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    AllVersions,
    Version(String),
}

impl CacheKey {
    fn new(version: Option<&str>) -> Self {
        match version {
            Some(v) => CacheKey::Version(v.to_string()),
            None => CacheKey::AllVersions,
        }
    }
}

type Slot = Arc<Mutex<Option<Arc<OpenApiDocument>>>>;

/// Generates and caches OpenAPI documents for a host's route table
pub struct Generator {
    config: OpenApiConfig,
    routes: Arc<dyn RouteSource>,
    annotations: AnnotationRegistry,
    /// The outer lock only guards slot lookup; each slot's own lock is held
    /// for the whole check-generate-store sequence.
    cache: Mutex<HashMap<CacheKey, Slot>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Slots only ever hold complete documents, so a poisoned lock is still consistent
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Generator {
    pub fn new(
        config: OpenApiConfig,
        routes: Arc<dyn RouteSource>,
        annotations: AnnotationRegistry,
    ) -> Self {
        Self {
            config,
            routes,
            annotations,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Build a generator over a fixed route list
    pub fn from_routes(
        config: OpenApiConfig,
        routes: Vec<Route>,
        annotations: AnnotationRegistry,
    ) -> Self {
        Self::new(config, Arc::new(routes), annotations)
    }

    pub fn config(&self) -> &OpenApiConfig {
        &self.config
    }

    /// Configured API versions
    pub fn available_versions(&self) -> &[VersionConfig] {
        &self.config.versions
    }

    pub fn default_version(&self) -> Option<&str> {
        self.config.default_version()
    }

    /// Generate the document for `version`, or for every route when `None`.
    ///
    /// Repeated calls for the same version return the cached document until
    /// [`Generator::refresh`] is called.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownVersion`] is raised before any route is read. Path,
    /// reference and naming errors abort the whole call; failed generations
    /// are not cached.
    pub fn generate(&self, version: Option<&str>) -> Result<Arc<OpenApiDocument>> {
        let version_config = match version {
            Some(name) => Some(self.config.find_version(name).ok_or_else(|| {
                Error::UnknownVersion {
                    version: name.to_string(),
                    available: self.config.versions.iter().map(|v| v.name.clone()).collect(),
                }
            })?),
            None => None,
        };

        let slot = Arc::clone(lock(&self.cache).entry(CacheKey::new(version)).or_default());

        let mut cached = lock(&slot);
        if let Some(document) = cached.as_ref() {
            debug!("Serving cached document for {:?}", version);
            return Ok(Arc::clone(document));
        }

        let document = Arc::new(self.assemble(version_config)?);
        info!(
            "Generated OpenAPI document ({} paths, {} operations)",
            document.paths.len(),
            document.operation_count()
        );
        *cached = Some(Arc::clone(&document));
        Ok(document)
    }

    /// Drop every cached document, e.g. after routes were re-registered
    pub fn refresh(&self) {
        debug!("Clearing document cache");
        lock(&self.cache).clear();
    }

    /// Whether a document for `version` is currently cached
    pub fn is_cached(&self, version: Option<&str>) -> bool {
        let slot = lock(&self.cache).get(&CacheKey::new(version)).cloned();
        match slot {
            Some(slot) => {
                let cached = lock(&slot);
                cached.is_some()
            }
            None => false,
        }
    }

    fn assemble(&self, version: Option<&VersionConfig>) -> Result<OpenApiDocument> {
        let filter = RouteFilter::from_config(&self.config);
        let mut walked = walker::walk(self.routes.as_ref(), &self.annotations, &filter);
        if let Some(version) = version {
            walked.retain(|route| route.in_version(&version.name));
            debug!("{} routes in version {}", walked.len(), version.name);
        }

        let mut builder = OpenApiBuilder::new(&self.config, self.annotations.schemas());
        if let Some(version) = version {
            let title = if version.title.is_empty() {
                self.config.title.clone()
            } else {
                version.title.clone()
            };
            let description = if version.description.is_empty() {
                self.config.description.clone()
            } else {
                Some(version.description.clone())
            };
            builder = builder.with_info(title, version.name.clone(), description);
        }

        builder.register_named_schemas()?;
        for route in &walked {
            builder.add_route(route)?;
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{EndpointAnnotation, ResponseAnnotation, SchemaAnnotation};
    use crate::route::HttpMethod;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    /// Route source that counts how often the table is read
    struct CountingRoutes {
        routes: Vec<Route>,
        reads: AtomicUsize,
    }

    impl CountingRoutes {
        fn new(routes: Vec<Route>) -> Arc<Self> {
            Arc::new(Self {
                routes,
                reads: AtomicUsize::new(0),
            })
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    impl RouteSource for CountingRoutes {
        fn routes(&self) -> Vec<Route> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.routes.clone()
        }
    }

    fn versioned_config() -> OpenApiConfig {
        let mut v2 = VersionConfig::new("v2");
        v2.title = "Demo API v2".to_string();
        OpenApiConfig::default()
            .with_title("Demo API")
            .with_version(VersionConfig::new("v1"))
            .with_version(v2)
    }

    fn versioned_routes() -> Vec<Route> {
        vec![
            Route::new(HttpMethod::Get, "/api/v1/users", "v1.users"),
            Route::new(HttpMethod::Get, "/api/v2/users", "v2.users"),
            Route::new(HttpMethod::Get, "/health", "health"),
        ]
    }

    #[test]
    fn test_unknown_version_fails_before_walking() {
        let routes = CountingRoutes::new(versioned_routes());
        let config = OpenApiConfig::default().with_version(VersionConfig::new("v1"));
        let generator = Generator::new(config, routes.clone(), AnnotationRegistry::new());

        let err = generator.generate(Some("v2")).unwrap_err();
        assert!(matches!(&err, Error::UnknownVersion { version, available }
            if version == "v2" && available == &vec!["v1".to_string()]));
        assert_eq!(routes.reads(), 0);
        assert!(!generator.is_cached(Some("v2")));
    }

    #[test]
    fn test_second_call_hits_cache() {
        let routes = CountingRoutes::new(versioned_routes());
        let generator = Generator::new(
            versioned_config(),
            routes.clone(),
            AnnotationRegistry::new(),
        );

        let first = generator.generate(None).unwrap();
        let second = generator.generate(None).unwrap();

        assert_eq!(routes.reads(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
        assert!(generator.is_cached(None));
    }

    #[test]
    fn test_refresh_rewalks_routes() {
        let routes = CountingRoutes::new(versioned_routes());
        let generator = Generator::new(
            versioned_config(),
            routes.clone(),
            AnnotationRegistry::new(),
        );

        generator.generate(Some("v1")).unwrap();
        generator.refresh();
        assert!(!generator.is_cached(Some("v1")));
        generator.generate(Some("v1")).unwrap();

        assert_eq!(routes.reads(), 2);
    }

    #[test]
    fn test_versions_are_cached_separately() {
        let routes = CountingRoutes::new(versioned_routes());
        let generator = Generator::new(
            versioned_config(),
            routes.clone(),
            AnnotationRegistry::new(),
        );

        let v1 = generator.generate(Some("v1")).unwrap();
        let v2 = generator.generate(Some("v2")).unwrap();
        let all = generator.generate(None).unwrap();

        assert_eq!(routes.reads(), 3);
        let v1_paths: Vec<_> = v1.paths.keys().cloned().collect();
        assert_eq!(v1_paths, vec!["/api/v1/users", "/health"]);
        let v2_paths: Vec<_> = v2.paths.keys().cloned().collect();
        assert_eq!(v2_paths, vec!["/api/v2/users", "/health"]);
        assert_eq!(all.paths.len(), 3);
    }

    #[test]
    fn test_version_info() {
        let generator = Generator::from_routes(
            versioned_config(),
            versioned_routes(),
            AnnotationRegistry::new(),
        );

        let v1 = generator.generate(Some("v1")).unwrap();
        assert_eq!(v1.info.title, "Demo API");
        assert_eq!(v1.info.version, "v1");

        let v2 = generator.generate(Some("v2")).unwrap();
        assert_eq!(v2.info.title, "Demo API v2");

        let all = generator.generate(None).unwrap();
        assert_eq!(all.info.version, "1.0.0");
    }

    #[test]
    fn test_failed_generation_not_cached() {
        let mut annotations = AnnotationRegistry::new();
        annotations
            .handler("broken")
            .response(ResponseAnnotation::new(200).with_schema_ref("Missing"));
        let routes = CountingRoutes::new(vec![Route::new(HttpMethod::Get, "/broken", "broken")]);
        let generator = Generator::new(OpenApiConfig::default(), routes.clone(), annotations);

        assert!(matches!(
            generator.generate(None),
            Err(Error::UnknownReference { .. })
        ));
        assert!(!generator.is_cached(None));
        assert!(generator.generate(None).is_err());
        assert_eq!(routes.reads(), 2);
    }

    #[test]
    fn test_malformed_route_aborts_whole_document() {
        let routes = vec![
            Route::new(HttpMethod::Get, "/fine", "fine"),
            Route::new(HttpMethod::Get, "/users/{id", "broken"),
        ];
        let generator =
            Generator::from_routes(OpenApiConfig::default(), routes, AnnotationRegistry::new());
        assert!(matches!(
            generator.generate(None),
            Err(Error::MalformedPath { .. })
        ));
    }

    #[test]
    fn test_fresh_registry_per_generation() {
        let mut annotations = AnnotationRegistry::new();
        annotations
            .schema(SchemaAnnotation::new("User").with_example(serde_json::json!({"id": 1})));
        annotations
            .handler("users.show")
            .endpoint(EndpointAnnotation::new("Show"))
            .response(ResponseAnnotation::new(200).with_schema_ref("User"));
        let generator = Generator::from_routes(
            versioned_config(),
            vec![Route::new(HttpMethod::Get, "/users/{id}", "users.show")],
            annotations,
        );

        let first = generator.generate(None).unwrap();
        generator.refresh();
        let second = generator.generate(None).unwrap();

        let names: Vec<_> = second.components.as_ref().unwrap().schemas.keys().cloned().collect();
        assert_eq!(names, vec!["User"]);
        assert_eq!(*first, *second);
    }

    #[test]
    fn test_concurrent_callers_walk_once() {
        let routes = CountingRoutes::new(versioned_routes());
        let generator = Arc::new(Generator::new(
            versioned_config(),
            routes.clone(),
            AnnotationRegistry::new(),
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let generator = Arc::clone(&generator);
                thread::spawn(move || generator.generate(Some("v1")).unwrap())
            })
            .collect();
        let documents: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(routes.reads(), 1);
        assert!(documents.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn test_versions_accessors() {
        let config = OpenApiConfig {
            default_version: Some("v2".to_string()),
            ..versioned_config()
        };
        let generator = Generator::from_routes(config, Vec::new(), AnnotationRegistry::new());

        let names: Vec<_> = generator
            .available_versions()
            .iter()
            .map(|v| v.name.as_str())
            .collect();
        assert_eq!(names, vec!["v1", "v2"]);
        assert_eq!(generator.default_version(), Some("v2"));
        assert!(generator.generate(None).unwrap().paths.is_empty());
    }
}
