//! Shared types, error model, and configuration for tabby.
//!
//! This crate is the foundation depended on by all other tabby crates.
//! It provides:
//! - [`TabbyError`], the unified error type
//! - Record types ([`AssembledObject`], [`Record`], [`FieldValue`], [`ContextMap`])
//! - Configuration ([`TabbyConfig`], [`LoadConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    LoadConfig, LoadSection, TabbyConfig, config_dir, config_file_path, init_config, load_config,
    load_config_from, render_config,
};
pub use error::{Result, TabbyError};
pub use types::{AssembledObject, CONTEXT_KEY, ContextMap, FieldValue, Record, SheetMode};
