//! Resolution-and-assembly engine for tabby records.
//!
//! A tabby record is spread over a directory of loosely-linked files: a
//! primary TSV sheet, optional JSON-LD context files, an optional override
//! file, a JSON sidecar, and sibling sheets that may live in class
//! directories. This crate locates those files by naming convention,
//! aggregates rows into objects, applies overrides, attaches contexts, and
//! guards recursive sheet imports against cycles.

pub mod companions;
pub mod finalize;
pub mod loader;
pub mod overrides;
pub mod resolver;
pub mod rows;
pub mod sheet;
pub mod trace;

use std::path::Path;

use serde_json::Value;

use tabby_shared::{LoadConfig, Result, SheetMode};

pub use loader::{ImportDirective, TabbyLoader};
pub use sheet::{SheetReader, TsvReader};
pub use trace::ImportTrace;

/// Load the tabby record rooted at `src` with the default TSV reader.
pub fn load_tabby(src: &Path, mode: SheetMode, config: &LoadConfig) -> Result<Value> {
    TabbyLoader::new(config).load(src, mode)
}
