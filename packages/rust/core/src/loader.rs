//! Sheet loader session.
//!
//! Drives the engine over a directory of tabby files:
//! 1. Read the sheet's rows (and its JSON sidecar, if any)
//! 2. Aggregate rows into objects
//! 3. Resolve `@tabby-single-<sheet>` / `@tabby-many-<sheet>` imports, depth-first
//! 4. Apply overrides, attach the context, compact

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, instrument};

use tabby_shared::{
    AssembledObject, CONTEXT_KEY, ContextMap, LoadConfig, Record, Result, SheetMode, TabbyError,
};

use crate::companions::{
    json_kind, jsondata_candidate, locate_context, read_json, sheet_candidate,
};
use crate::finalize::finalize;
use crate::overrides::{OverrideSpec, apply_overrides};
use crate::resolver::{resolve, resolve_existing};
use crate::rows::{aggregate_row, header_fields, keyed_row};
use crate::sheet::{SheetReader, TsvReader};
use crate::trace::ImportTrace;

const SINGLE_IMPORT: &str = "@tabby-single-";
const MANY_IMPORT: &str = "@tabby-many-";

/// A cell value that pulls in another sheet of the same record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportDirective<'a> {
    pub mode: SheetMode,
    pub sheet: &'a str,
}

impl<'a> ImportDirective<'a> {
    /// Parse `@tabby-single-<sheet>` or `@tabby-many-<sheet>`.
    pub fn parse(value: &'a str) -> Option<Self> {
        let (mode, sheet) = if let Some(sheet) = value.strip_prefix(SINGLE_IMPORT) {
            (SheetMode::Single, sheet)
        } else if let Some(sheet) = value.strip_prefix(MANY_IMPORT) {
            (SheetMode::Many, sheet)
        } else {
            return None;
        };
        (!sheet.is_empty()).then_some(Self { mode, sheet })
    }
}

/// Companion data shared by every row of one sheet.
struct SheetCompanions {
    overrides: Option<OverrideSpec>,
    context: Option<ContextMap>,
}

/// Loads tabby records. Every top-level call is an independent session with
/// its own import trace.
#[derive(Debug, Clone)]
pub struct TabbyLoader<R = TsvReader> {
    class_paths: Vec<PathBuf>,
    jsonld: bool,
    recursive: bool,
    reader: R,
}

impl TabbyLoader<TsvReader> {
    pub fn new(config: &LoadConfig) -> Self {
        Self::with_reader(config, TsvReader)
    }
}

impl<R: SheetReader> TabbyLoader<R> {
    /// Use a custom row reader instead of the TSV one.
    pub fn with_reader(config: &LoadConfig, reader: R) -> Self {
        Self {
            class_paths: config.class_paths.clone(),
            jsonld: config.jsonld,
            recursive: config.recursive,
            reader,
        }
    }

    /// Load `src` as JSON: an object for [`SheetMode::Single`], an array for
    /// [`SheetMode::Many`].
    #[instrument(skip_all, fields(src = %src.display(), mode = ?mode))]
    pub fn load(&self, src: &Path, mode: SheetMode) -> Result<Value> {
        let mut trace = ImportTrace::new();
        let value = self.load_sheet(src, mode, &mut trace)?;
        info!(sheets = trace.len(), "record loaded");
        Ok(value)
    }

    /// Load a single-record sheet.
    #[instrument(skip_all, fields(src = %src.display()))]
    pub fn load_single(&self, src: &Path) -> Result<Record> {
        self.single(src, &mut ImportTrace::new())
    }

    /// Load a sheet with one record per row.
    #[instrument(skip_all, fields(src = %src.display()))]
    pub fn load_many(&self, src: &Path) -> Result<Vec<Record>> {
        self.many(src, &mut ImportTrace::new())
    }

    fn load_sheet(&self, src: &Path, mode: SheetMode, trace: &mut ImportTrace) -> Result<Value> {
        match mode {
            SheetMode::Single => Ok(self.single(src, trace)?.into_json()),
            SheetMode::Many => Ok(Value::Array(
                self.many(src, trace)?
                    .into_iter()
                    .map(Record::into_json)
                    .collect(),
            )),
        }
    }

    fn single(&self, src: &Path, trace: &mut ImportTrace) -> Result<Record> {
        let found = resolve_existing(src, &self.class_paths);
        let src = found.as_deref().unwrap_or(src);
        trace.extend(src)?;
        let sidecar = self.read_sidecar(src)?;

        let mut obj = match &sidecar {
            Some((path, value)) => sidecar_object(value.clone(), path)?,
            None => AssembledObject::new(),
        };

        match &found {
            Some(path) => {
                for row in self.reader.read_rows(path)? {
                    if let Some((key, values)) = keyed_row(&row) {
                        obj.extend(key, values);
                    }
                }
            }
            None if sidecar.is_some() => debug!(src = %src.display(), "sheet given by JSON sidecar only"),
            None => return Err(missing_sheet(src)),
        }

        let companions = self.companions(src)?;
        self.postprocess(obj, src, &companions, trace)
    }

    fn many(&self, src: &Path, trace: &mut ImportTrace) -> Result<Vec<Record>> {
        let found = resolve_existing(src, &self.class_paths);
        let src = found.as_deref().unwrap_or(src);
        trace.extend(src)?;
        let sidecar = self.read_sidecar(src)?;

        let objects = match (&found, sidecar) {
            (Some(path), sidecar) => {
                let template = match sidecar {
                    Some((sidecar_path, value)) => sidecar_object(value, &sidecar_path)?,
                    None => AssembledObject::new(),
                };
                let rows = self.reader.read_rows(path)?;
                let mut rows = rows.iter();
                let header = rows.next().map(|r| header_fields(r)).unwrap_or_default();
                debug!(fields = ?header, "sheet header");

                let mut objects = Vec::new();
                for row in rows {
                    let (fields, _) = aggregate_row(row, &header).into_parts();
                    if fields.is_empty() {
                        continue;
                    }
                    let mut obj = template.clone();
                    for (key, values) in fields {
                        obj.extend(key, values);
                    }
                    objects.push(obj);
                }
                objects
            }
            (None, Some((sidecar_path, Value::Array(items)))) => items
                .into_iter()
                .map(|item| sidecar_object(item, &sidecar_path))
                .collect::<Result<Vec<_>>>()?,
            (None, Some((sidecar_path, value))) => vec![sidecar_object(value, &sidecar_path)?],
            (None, None) => return Err(missing_sheet(src)),
        };

        let companions = self.companions(src)?;
        objects
            .into_iter()
            .map(|obj| self.postprocess(obj, src, &companions, trace))
            .collect()
    }

    fn read_sidecar(&self, src: &Path) -> Result<Option<(PathBuf, Value)>> {
        let Some(path) = resolve_existing(&jsondata_candidate(src), &self.class_paths) else {
            return Ok(None);
        };
        debug!(path = %path.display(), "loading JSON sidecar");
        let value = read_json(&path)?;
        Ok(Some((path, value)))
    }

    fn companions(&self, src: &Path) -> Result<SheetCompanions> {
        let overrides = OverrideSpec::locate(src, &self.class_paths)?;
        let context = if self.jsonld {
            let ctx = locate_context(src, &self.class_paths)?;
            (!ctx.is_empty()).then_some(ctx)
        } else {
            None
        };
        Ok(SheetCompanions { overrides, context })
    }

    fn postprocess(
        &self,
        mut obj: AssembledObject,
        src: &Path,
        companions: &SheetCompanions,
        trace: &mut ImportTrace,
    ) -> Result<Record> {
        if self.recursive {
            self.resolve_imports(&mut obj, src, trace)?;
        }
        if let Some(spec) = &companions.overrides {
            let overrides = spec.expand(&obj);
            apply_overrides(&mut obj, overrides);
        }
        Ok(finalize(obj, companions.context.clone()))
    }

    fn resolve_imports(
        &self,
        obj: &mut AssembledObject,
        src: &Path,
        trace: &mut ImportTrace,
    ) -> Result<()> {
        for (key, values) in obj.iter_mut() {
            for value in values.iter_mut() {
                let Value::String(text) = value else { continue };
                let Some(directive) = ImportDirective::parse(text) else {
                    continue;
                };
                let mode = directive.mode;
                let sheet = resolve(&sheet_candidate(src, directive.sheet), &self.class_paths);
                debug!(field = %key, sheet = %sheet.display(), ?mode, "resolving import");
                *value = self.load_sheet(&sheet, mode, trace)?;
            }
        }
        Ok(())
    }
}

fn missing_sheet(src: &Path) -> TabbyError {
    TabbyError::io(src, std::io::Error::from(std::io::ErrorKind::NotFound))
}

/// Seed an object from a JSON sidecar entry.
///
/// Arrays contribute their elements; any other value contributes itself.
/// An `@context` object becomes the object's context.
fn sidecar_object(value: Value, path: &Path) -> Result<AssembledObject> {
    let map = match value {
        Value::Object(map) => map,
        other => {
            return Err(TabbyError::validation(format!(
                "{} must contain JSON objects, found {}",
                path.display(),
                json_kind(&other)
            )));
        }
    };

    let mut obj = AssembledObject::new();
    for (key, value) in map {
        if key == CONTEXT_KEY {
            let Value::Object(ctx) = value else {
                return Err(TabbyError::validation(format!(
                    "{}: {CONTEXT_KEY} must be an object",
                    path.display()
                )));
            };
            *obj.context_mut() = Some(ctx);
            continue;
        }
        match value {
            Value::Array(items) => obj.extend(key, items),
            other => obj.push(key, other),
        }
    }
    Ok(obj)
}
