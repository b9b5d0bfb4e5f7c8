//! Companion file locator.
//!
//! Derives the conventional paths of a sheet's context, override, JSON
//! sidecar, and sibling sheet files:
//!
//! | Artifact        | no prefix              | prefix `P`             |
//! |-----------------|------------------------|------------------------|
//! | sheet           | `<name>.tsv`           | `P_<name>.tsv`         |
//! | record context  | `ctx.jsonld`           | `P.ctx.jsonld`         |
//! | sheet context   | `<stem>.ctx.jsonld`    | `<stem>.ctx.jsonld`    |
//! | override        | `<stem>.override.json` | `<stem>.override.json` |
//! | JSON sidecar    | `<stem>.json`          | `<stem>.json`          |

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use tabby_shared::{ContextMap, Result, TabbyError};

use crate::resolver::{resolve_existing, tabby_prefix};

fn sibling(sheet: &Path, file_name: String) -> PathBuf {
    sheet
        .parent()
        .map(|dir| dir.join(&file_name))
        .unwrap_or_else(|| PathBuf::from(file_name))
}

fn stem(sheet: &Path) -> String {
    sheet
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Sibling sheet `name` of the record that `sheet` belongs to.
pub fn sheet_candidate(sheet: &Path, name: &str) -> PathBuf {
    let prefix = tabby_prefix(sheet);
    if prefix.is_empty() {
        sibling(sheet, format!("{name}.tsv"))
    } else {
        sibling(sheet, format!("{prefix}_{name}.tsv"))
    }
}

/// Record-level context shared by all sheets with the same prefix.
pub fn record_context_candidate(sheet: &Path) -> PathBuf {
    let prefix = tabby_prefix(sheet);
    if prefix.is_empty() {
        sibling(sheet, "ctx.jsonld".to_string())
    } else {
        sibling(sheet, format!("{prefix}.ctx.jsonld"))
    }
}

pub fn sheet_context_candidate(sheet: &Path) -> PathBuf {
    sibling(sheet, format!("{}.ctx.jsonld", stem(sheet)))
}

pub fn override_candidate(sheet: &Path) -> PathBuf {
    sibling(sheet, format!("{}.override.json", stem(sheet)))
}

pub fn jsondata_candidate(sheet: &Path) -> PathBuf {
    sibling(sheet, format!("{}.json", stem(sheet)))
}

/// Read and parse a JSON file. Parse failures are fatal.
pub fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| TabbyError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| TabbyError::json(path, e))
}

/// Read a JSON file whose top level must be an object.
pub fn read_json_object(path: &Path) -> Result<serde_json::Map<String, Value>> {
    match read_json(path)? {
        Value::Object(map) => Ok(map),
        other => Err(TabbyError::validation(format!(
            "{} must contain a JSON object, found {}",
            path.display(),
            json_kind(&other)
        ))),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Load and merge the record-level and sheet-level contexts of `sheet`.
///
/// Sheet-level terms overwrite record-level ones silently. Missing files
/// contribute nothing.
pub fn locate_context(sheet: &Path, class_paths: &[PathBuf]) -> Result<ContextMap> {
    let mut ctx = ContextMap::new();
    for candidate in [record_context_candidate(sheet), sheet_context_candidate(sheet)] {
        match resolve_existing(&candidate, class_paths) {
            Some(path) => {
                debug!(path = %path.display(), "loading context");
                // TODO report terms redefined by the sheet-level context
                ctx.extend(read_json_object(&path)?);
            }
            None => debug!(candidate = %candidate.display(), "no context file"),
        }
    }
    Ok(ctx)
}
