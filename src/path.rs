//! Path template translation.
//!
//! Hosts register paths in their own placeholder syntax. OpenAPI only knows
//! `{name}`, so every template goes through [`translate`] before it becomes a
//! key in the document's `paths` map.
//!
//! Recognised placeholders:
//!
//! | Native         | OpenAPI   |
//! |----------------|-----------|
//! | `{id}`         | `{id}`    |
//! | `{id?}`        | `{id}`    |
//! | `{id:[0-9]+}`  | `{id}`    |
//! | `{*rest}`      | `{rest}`  |
//! | `:id`          | `{id}`    |
//! | `*rest`        | `{rest}`  |
//!
//! `:` and `*` only start a placeholder at the beginning of a segment, so
//! literals such as `/items:batch` pass through untouched.

use crate::annotation::{ParamLocation, RequestParamAnnotation};
use crate::error::{Error, Result};
use log::debug;

/// Result of translating one path template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedPath {
    /// The path in OpenAPI `{name}` syntax
    pub openapi_path: String,
    /// Placeholder names in order of appearance
    pub params: Vec<String>,
}

/// Translate a native path template into OpenAPI syntax.
///
/// # Errors
///
/// Returns [`Error::MalformedPath`] for unmatched braces, braces nested
/// outside a constraint regex, empty or invalid placeholder names, and
/// placeholders repeated in one path.
pub fn translate(path: &str) -> Result<TranslatedPath> {
    let mut openapi_path = String::with_capacity(path.len());
    let mut params: Vec<String> = Vec::new();
    let mut chars = path.chars().peekable();
    let mut at_segment_start = true;

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                let mut raw = String::new();
                let mut closed = false;
                // braces after the `:` belong to the constraint regex, e.g. `{id:\d{2,4}}`
                let mut depth = 0usize;
                for inner in chars.by_ref() {
                    match inner {
                        '}' if depth == 0 => {
                            closed = true;
                            break;
                        }
                        '}' => {
                            depth -= 1;
                            raw.push(inner);
                        }
                        '{' if raw.contains(':') => {
                            depth += 1;
                            raw.push(inner);
                        }
                        '{' => return Err(Error::malformed_path(path, "nested '{'")),
                        _ => raw.push(inner),
                    }
                }
                if !closed {
                    return Err(Error::malformed_path(path, "unclosed '{'"));
                }
                let name = brace_placeholder_name(&raw);
                push_param(path, name, &mut openapi_path, &mut params)?;
                at_segment_start = false;
            }
            '}' => return Err(Error::malformed_path(path, "unmatched '}'")),
            ':' | '*' if at_segment_start => {
                let mut raw = String::new();
                while let Some(&next) = chars.peek() {
                    if next == '/' {
                        break;
                    }
                    if next == '{' || next == '}' {
                        return Err(Error::malformed_path(path, "brace inside ':' placeholder"));
                    }
                    raw.push(next);
                    chars.next();
                }
                let name = raw.strip_suffix('?').unwrap_or(&raw);
                push_param(path, name, &mut openapi_path, &mut params)?;
                at_segment_start = false;
            }
            '/' => {
                openapi_path.push('/');
                at_segment_start = true;
            }
            other => {
                openapi_path.push(other);
                at_segment_start = false;
            }
        }
    }

    debug!("Translated path {} -> {}", path, openapi_path);
    Ok(TranslatedPath {
        openapi_path,
        params,
    })
}

/// Names in `translated` that have no declared parameter with `location = path`.
pub fn undeclared_params<'a>(
    translated: &'a TranslatedPath,
    declared: &[RequestParamAnnotation],
) -> Vec<&'a str> {
    translated
        .params
        .iter()
        .map(String::as_str)
        .filter(|name| {
            !declared
                .iter()
                .any(|p| p.location == ParamLocation::Path && p.name == *name)
        })
        .collect()
}

/// `*rest` → `rest`, `id:[0-9]+` → `id`, `id?` → `id`
fn brace_placeholder_name(raw: &str) -> &str {
    let raw = raw.strip_prefix('*').unwrap_or(raw);
    let raw = raw.split(':').next().unwrap_or(raw);
    raw.strip_suffix('?').unwrap_or(raw)
}

fn push_param(
    path: &str,
    name: &str,
    openapi_path: &mut String,
    params: &mut Vec<String>,
) -> Result<()> {
    if name.is_empty() {
        return Err(Error::malformed_path(path, "empty placeholder name"));
    }
    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(Error::malformed_path(
            path,
            format!("invalid placeholder name '{}'", name),
        ));
    }
    if params.iter().any(|p| p == name) {
        return Err(Error::malformed_path(
            path,
            format!("placeholder '{}' appears more than once", name),
        ));
    }
    openapi_path.push('{');
    openapi_path.push_str(name);
    openapi_path.push('}');
    params.push(name.to_string());
    Ok(())
}
