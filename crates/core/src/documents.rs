use crate::search::{search_documents, SearchHit, SearchOptions};
use crate::utils::{has_text_extension, walk_text_files};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document '{0}' not found")]
    NotFound(String),
    #[error("document path '{0}' escapes the document root")]
    OutsideRoot(String),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Category name to the sorted file names directly inside it.
pub type DocumentListing = BTreeMap<String, Vec<String>>;

/// Read-only view over a directory of `.txt` documents grouped by category
/// directory.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Immediate subdirectories and their documents, non-recursive.
    /// Categories without any readable document are left out.
    pub fn list_documents(&self) -> Result<DocumentListing, DocumentError> {
        let mut listing = DocumentListing::new();

        for entry in fs::read_dir(&self.root)?.filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            let docs = category_documents(&path);
            if docs.is_empty() {
                continue;
            }

            listing.insert(entry.file_name().to_string_lossy().into_owned(), docs);
        }

        Ok(listing)
    }

    /// Full text of the document at `path`, relative to the root.
    ///
    /// Absolute paths, `..` segments and symlinks resolving outside the root
    /// are refused with [`DocumentError::OutsideRoot`].
    pub fn read_document(&self, path: &str) -> Result<String, DocumentError> {
        let relative = Path::new(path);
        let lexically_inside = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !lexically_inside {
            return Err(DocumentError::OutsideRoot(path.to_string()));
        }

        let candidate = self.root.join(relative);
        if !candidate.exists() {
            return Err(DocumentError::NotFound(path.to_string()));
        }

        let root = self.root.canonicalize()?;
        let resolved = candidate.canonicalize()?;
        if !resolved.starts_with(&root) {
            return Err(DocumentError::OutsideRoot(path.to_string()));
        }

        Ok(fs::read_to_string(resolved)?)
    }

    pub fn search(&self, query: &str, options: &SearchOptions) -> Vec<SearchHit> {
        search_documents(&self.root, query, options)
    }

    /// Number of visible documents anywhere under the root.
    pub fn document_count(&self) -> usize {
        walk_text_files(&self.root).count()
    }
}

/// Sorted `.txt` file names directly inside `dir`. An unreadable directory
/// has none.
fn category_documents(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut docs: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file() && has_text_extension(&e.path()))
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    docs.sort();
    docs
}
