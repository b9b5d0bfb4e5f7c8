//! Path resolution with class-directory fallback.
//!
//! A file named `<name>@<class>.<ext>` (optionally carrying a tabby prefix,
//! `<prefix>_<name>@<class>.<ext>`) that does not exist next to its sheet is
//! looked up as `<root>/<class>/<prefix>_<name>.<ext>` in each class root, in
//! order. All filesystem existence probes of the loader happen here.

use std::path::{Path, PathBuf};

use tracing::debug;

/// The multi-sheet namespace of a file: its stem up to, not including, the last `_`.
///
/// Returns an empty string when the stem has no underscore.
pub fn tabby_prefix(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    match stem.rfind('_') {
        Some(idx) => stem[..idx].to_string(),
        None => String::new(),
    }
}

/// A class declaration parsed out of a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDeclaration {
    /// Tabby prefix of the file (may be empty).
    pub prefix: String,
    /// Name without prefix, class, or extensions.
    pub name: String,
    /// Declared class; names the subdirectory of a class root.
    pub class: String,
    /// Everything after the name-and-class part, e.g. `.ctx.jsonld`.
    pub suffix: String,
}

impl ClassDeclaration {
    /// Parse `[<prefix>_]<name>@<class><suffix>` from the file name of `path`.
    ///
    /// The suffix starts at the first `.` after the prefix. Returns `None`
    /// when no class (or an empty class) is declared.
    pub fn parse(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        let prefix = tabby_prefix(path);
        let rest = if prefix.is_empty() {
            file_name
        } else {
            file_name.strip_prefix(prefix.as_str())?.strip_prefix('_')?
        };
        let sheet_len = rest.find('.').unwrap_or(rest.len());
        let (sheet, suffix) = rest.split_at(sheet_len);
        let (name, class) = sheet.split_once('@')?;
        if class.is_empty() {
            return None;
        }
        Some(Self {
            prefix,
            name: name.to_string(),
            class: class.to_string(),
            suffix: suffix.to_string(),
        })
    }

    /// File name with the class declaration removed.
    pub fn file_name(&self) -> String {
        if self.prefix.is_empty() {
            format!("{}{}", self.name, self.suffix)
        } else {
            format!("{}_{}{}", self.prefix, self.name, self.suffix)
        }
    }

    /// The candidate location of this file under one class root.
    pub fn candidate_in(&self, class_root: &Path) -> PathBuf {
        class_root.join(&self.class).join(self.file_name())
    }
}

/// Find the file on disk that answers for `candidate`.
///
/// Returns `candidate` itself if it exists, otherwise the first existing
/// class-root alternative, otherwise `None`.
pub fn resolve_existing(candidate: &Path, class_paths: &[PathBuf]) -> Option<PathBuf> {
    if candidate.exists() {
        return Some(candidate.to_path_buf());
    }

    let decl = ClassDeclaration::parse(candidate)?;
    let found = class_paths
        .iter()
        .map(|root| decl.candidate_in(root))
        .find(|alt| alt.exists());

    match &found {
        Some(alt) => debug!(
            candidate = %candidate.display(),
            resolved = %alt.display(),
            class = %decl.class,
            "resolved via class fallback"
        ),
        None => debug!(
            candidate = %candidate.display(),
            class = %decl.class,
            "no class fallback found"
        ),
    }
    found
}

/// Like [`resolve_existing`], but defaults to the unresolved `candidate`.
///
/// The returned path may not exist; callers treat that as "file absent".
pub fn resolve(candidate: &Path, class_paths: &[PathBuf]) -> PathBuf {
    resolve_existing(candidate, class_paths).unwrap_or_else(|| candidate.to_path_buf())
}
