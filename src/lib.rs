//! OpenAPI from Routes - OpenAPI 3.0 documents from a host's route table.
//!
//! Routes come from the host's router; what a route means is declared by
//! annotations registered per handler. Request and response schemas are
//! inferred from example payloads, so handlers never need typed models.
//!
//! # Architecture
//!
//! 1. [`route`] - Route entries and the [`route::RouteSource`] the host implements
//! 2. [`annotation`] - Endpoint, parameter, body, response and schema annotations
//! 3. [`walker`] - Pairs documentable routes with their annotations
//! 4. [`path`] - Translates router path syntax to OpenAPI templates
//! 5. [`inferencer`] - Infers schemas from example values
//! 6. [`registry`] - Deduplicates named component schemas
//! 7. [`openapi_builder`] - Constructs the OpenAPI document
//! 8. [`generator`] - Per-version generation and caching
//! 9. [`manifest`] - Declarative route and annotation files
//! 10. [`serializer`] - Serializes the document to YAML or JSON
//!
//! # Example Usage
//!
//! ```
//! use openapi_from_routes::annotation::{AnnotationRegistry, EndpointAnnotation, ResponseAnnotation};
//! use openapi_from_routes::config::OpenApiConfig;
//! use openapi_from_routes::generator::Generator;
//! use openapi_from_routes::route::{HttpMethod, Route};
//! use openapi_from_routes::serializer::serialize_json;
//! use serde_json::json;
//!
//! let mut annotations = AnnotationRegistry::new();
//! annotations
//!     .handler("users.show")
//!     .endpoint(EndpointAnnotation::new("Show user").with_tags(["Users"]))
//!     .response(ResponseAnnotation::new(200).with_example(json!({"id": 1, "name": "John"})));
//!
//! let routes = vec![Route::new(HttpMethod::Get, "/users/{id}", "users.show")];
//! let generator = Generator::from_routes(OpenApiConfig::default(), routes, annotations);
//!
//! let document = generator.generate(None).unwrap();
//! assert!(document.operation("/users/{id}", HttpMethod::Get).is_some());
//! println!("{}", serialize_json(&document).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod annotation;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod inferencer;
pub mod manifest;
pub mod openapi_builder;
pub mod path;
pub mod registry;
pub mod route;
pub mod schema;
pub mod serializer;
pub mod walker;

pub use error::{Error, Result};
