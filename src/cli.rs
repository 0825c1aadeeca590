use crate::manifest::Manifest;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// OpenAPI from Routes - Generate OpenAPI documentation from an annotated route manifest
#[derive(Parser, Debug)]
#[command(name = "openapi-from-routes")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the route manifest (YAML, or JSON with a .json extension)
    #[arg(value_name = "MANIFEST")]
    pub manifest_path: PathBuf,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Document only this API version (defaults to the configured default version)
    #[arg(long = "api-version", value_name = "VERSION")]
    pub api_version: Option<String>,

    /// Document every route regardless of version
    #[arg(long = "all-versions", conflicts_with = "api_version")]
    pub all_versions: bool,

    /// List the configured API versions and exit
    #[arg(long = "list-versions")]
    pub list_versions: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Log filter directives: `-v` forces `debug`, otherwise `RUST_LOG` or `info`
pub fn log_filter(verbose: bool, rust_log: Option<&str>) -> String {
    match rust_log {
        _ if verbose => "debug".to_string(),
        Some(filters) if !filters.trim().is_empty() => filters.to_string(),
        _ => "info".to_string(),
    }
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.manifest_path.exists() {
        anyhow::bail!(
            "Manifest does not exist: {}",
            args.manifest_path.display()
        );
    }

    if !args.manifest_path.is_file() {
        anyhow::bail!(
            "Manifest is not a file: {}",
            args.manifest_path.display()
        );
    }

    info!("Manifest: {}", args.manifest_path.display());
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }
    if let Some(ref version) = args.api_version {
        info!("API version: {}", version);
    }

    Ok(args)
}

/// `openapi.json` becomes `openapi.yaml` when YAML was requested
pub fn output_path_for(path: &Path, format: OutputFormat) -> PathBuf {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if format == OutputFormat::Yaml && is_json {
        path.with_extension("yaml")
    } else {
        path.to_path_buf()
    }
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting OpenAPI document generation...");

    // Step 1: Load the manifest
    let manifest = Manifest::load(&args.manifest_path)
        .with_context(|| format!("Failed to load {}", args.manifest_path.display()))?;
    info!(
        "Loaded {} routes, {} annotated handlers and {} named schemas",
        manifest.routes.len(),
        manifest.handlers.len(),
        manifest.schemas.len()
    );

    if !manifest.openapi.enabled {
        anyhow::bail!("OpenAPI documentation is disabled in the manifest configuration");
    }

    let generator = manifest.into_generator();

    if args.list_versions {
        for version in generator.available_versions() {
            let marker = if generator.default_version() == Some(version.name.as_str()) {
                " (default)"
            } else {
                ""
            };
            println!("{}{}", version.name, marker);
        }
        return Ok(());
    }

    // Step 2: Generate the document
    let version = if args.all_versions {
        None
    } else {
        args.api_version.as_deref().or(generator.default_version())
    };
    info!("Building OpenAPI document for {}", version.unwrap_or("all versions"));
    let document = generator.generate(version)?;

    // Step 3: Serialize to requested format
    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&document)?,
        OutputFormat::Json => serialize_json(&document)?,
    };

    // Step 4: Output to file or stdout
    if let Some(output_path) = &args.output_path {
        let output_path = output_path_for(output_path, args.output_format);
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, &output_path)?;
        info!("Successfully wrote OpenAPI document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    // Step 5: Display summary
    info!("Generation complete!");
    info!("Summary:");
    info!("  - Paths: {}", document.paths.len());
    info!("  - Operations: {}", document.operation_count());
    info!(
        "  - Schemas: {}",
        document.components.as_ref().map_or(0, |c| c.schemas.len())
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"
openapi:
  title: CLI API
  versions: [{ name: v1 }, { name: v2 }]
  default_version: v2
routes:
  - { method: GET, path: /v1/users, handler: users.v1 }
  - { method: GET, path: /v2/users, handler: users.v2 }
"#;

    fn args(manifest: PathBuf) -> CliArgs {
        CliArgs {
            manifest_path: manifest,
            output_format: OutputFormat::Json,
            output_path: None,
            api_version: None,
            all_versions: false,
            list_versions: false,
            verbose: false,
        }
    }

    fn write_manifest(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("routes.yaml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::try_parse_from([
            "openapi-from-routes",
            "routes.yaml",
            "-f",
            "yaml",
            "-o",
            "out.yaml",
            "--api-version",
            "v1",
        ])
        .unwrap();
        assert_eq!(args.output_format, OutputFormat::Yaml);
        assert_eq!(args.output_path, Some(PathBuf::from("out.yaml")));
        assert_eq!(args.api_version.as_deref(), Some("v1"));
    }

    #[test]
    fn test_cli_default_format_is_json() {
        let args = CliArgs::try_parse_from(["openapi-from-routes", "routes.yaml"]).unwrap();
        assert_eq!(args.output_format, OutputFormat::Json);
    }

    #[test]
    fn test_all_versions_conflicts_with_api_version() {
        let result = CliArgs::try_parse_from([
            "openapi-from-routes",
            "routes.yaml",
            "--api-version",
            "v1",
            "--all-versions",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_filter() {
        assert_eq!(log_filter(false, None), "info");
        assert_eq!(log_filter(false, Some("warn")), "warn");
        assert_eq!(log_filter(false, Some("  ")), "info");
        assert_eq!(
            log_filter(false, Some("openapi_from_routes=trace")),
            "openapi_from_routes=trace"
        );
        assert_eq!(log_filter(true, Some("warn")), "debug");
    }

    #[test]
    fn test_missing_manifest_rejected() {
        let result = parse_args_from_parsed(args(PathBuf::from("/definitely/missing.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_directory_manifest_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let result = parse_args_from_parsed(args(temp_dir.path().to_path_buf()));
        assert!(result.is_err());
    }

    #[test]
    fn test_output_path_for() {
        assert_eq!(
            output_path_for(Path::new("docs/openapi.json"), OutputFormat::Yaml),
            PathBuf::from("docs/openapi.yaml")
        );
        assert_eq!(
            output_path_for(Path::new("docs/openapi.json"), OutputFormat::Json),
            PathBuf::from("docs/openapi.json")
        );
        assert_eq!(
            output_path_for(Path::new("docs.yml"), OutputFormat::Yaml),
            PathBuf::from("docs.yml")
        );
    }

    #[test]
    fn test_run_uses_default_version() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("openapi.json");
        let mut cli = args(write_manifest(&temp_dir, MANIFEST));
        cli.output_path = Some(output.clone());

        run(cli).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(parsed["info"]["version"], "v2");
        assert!(parsed["paths"]["/v2/users"].is_object());
        assert!(parsed["paths"].get("/v1/users").is_none());
    }

    #[test]
    fn test_run_all_versions_as_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let mut cli = args(write_manifest(&temp_dir, MANIFEST));
        cli.output_format = OutputFormat::Yaml;
        cli.output_path = Some(temp_dir.path().join("openapi.json"));
        cli.all_versions = true;

        run(cli).unwrap();

        let yaml = fs::read_to_string(temp_dir.path().join("openapi.yaml")).unwrap();
        assert!(yaml.contains("/v1/users:"));
        assert!(yaml.contains("/v2/users:"));
        assert!(!temp_dir.path().join("openapi.json").exists());
    }

    #[test]
    fn test_run_unknown_version_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut cli = args(write_manifest(&temp_dir, MANIFEST));
        cli.api_version = Some("v7".to_string());

        let err = run(cli).unwrap_err();
        assert!(format!("{:#}", err).contains("v7"));
    }

    #[test]
    fn test_run_disabled_fails() {
        let temp_dir = TempDir::new().unwrap();
        let cli = args(write_manifest(&temp_dir, "openapi: { enabled: false }"));
        assert!(run(cli).is_err());
    }
}
