//! Import trace guard.
//!
//! The trace is the chain of sheet files entered during one load session.
//! It is owned by the session and threaded through the depth-first descent
//! by `&mut` and is not `Clone`.
//! Loading sheets in parallel would need one trace per branch.

use std::path::{Path, PathBuf};

use tracing::trace;

use tabby_shared::{Result, TabbyError};

#[derive(Debug, Default)]
pub struct ImportTrace {
    chain: Vec<PathBuf>,
}

impl ImportTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `path` is being entered.
    ///
    /// Fails with [`TabbyError::CircularReference`] if `path` is already on
    /// the trace; otherwise appends it.
    pub fn extend(&mut self, path: &Path) -> Result<&mut Self> {
        if self.contains(path) {
            return Err(TabbyError::CircularReference {
                path: path.to_path_buf(),
                trace: self.chain.clone(),
            });
        }
        trace!(path = %path.display(), depth = self.chain.len(), "entering sheet");
        self.chain.push(path.to_path_buf());
        Ok(self)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.chain.iter().any(|p| p == path)
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.chain
    }
}
