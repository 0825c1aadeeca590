//! OpenAPI from Routes - Command-line tool for generating OpenAPI documentation.
//!
//! Reads a route manifest (the route table plus handler annotations and named
//! schemas) and writes an OpenAPI 3.0 document for it.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-routes [OPTIONS] <MANIFEST>
//! ```
//!
//! # Examples
//!
//! Generate JSON documentation for the default version:
//! ```bash
//! openapi-from-routes routes.yaml -o openapi.json
//! ```
//!
//! Generate YAML documentation for one version:
//! ```bash
//! openapi-from-routes routes.yaml -f yaml --api-version v2 -o openapi.yaml
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! openapi-from-routes routes.yaml -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_routes::cli;
use std::env;

fn main() -> Result<()> {
    // Parse first so the verbose flag can pick the log level
    let args_for_verbose = cli::CliArgs::parse();

    let rust_log = env::var("RUST_LOG").ok();
    env_logger::Builder::new()
        .parse_filters(&cli::log_filter(args_for_verbose.verbose, rust_log.as_deref()))
        .init();

    info!("OpenAPI from Routes starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    cli::run(args)?;

    info!("OpenAPI document generation completed successfully");

    Ok(())
}
