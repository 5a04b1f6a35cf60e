use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Extension of the only files the document store exposes.
pub const DOCUMENT_EXTENSION: &str = "txt";

pub fn has_text_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == DOCUMENT_EXTENSION)
        .unwrap_or(false)
}

/// Returns true if the entry is a visible document.
pub fn is_text_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() && has_text_extension(entry.path())
}

/// Recursive walk over documents under `root`, in file-name order.
/// Unreadable directories are skipped.
pub fn walk_text_files(root: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(is_text_file)
}

/// `path` relative to `root`, joined with `/` on every platform.
pub fn relative_display(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn recognises_txt_extension_only() {
        assert!(has_text_extension(Path::new("products/pricing.txt")));
        assert!(!has_text_extension(Path::new("products/pricing.md")));
        assert!(!has_text_extension(Path::new("products/txt")));
    }

    #[test]
    fn walks_text_files() {
        let dir = TempDir::new().unwrap();

        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("b.md"), "b").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/c.txt"), "c").unwrap();
        fs::create_dir(dir.path().join("folder.txt")).unwrap();

        let files: Vec<_> = walk_text_files(dir.path())
            .map(|e| relative_display(dir.path(), e.path()))
            .collect();

        assert_eq!(files, vec!["a.txt", "sub/c.txt"]);
    }

    #[test]
    fn missing_root_yields_nothing() {
        let files: Vec<_> = walk_text_files(Path::new("/nonexistent/toolhost/root")).collect();
        assert!(files.is_empty());
    }
}
