use crate::utils::{relative_display, walk_text_files};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_MAX_RESULTS: usize = 10;

/// One matching line with a line of context on each side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub file_path: String,
    pub line_number: usize,
    pub excerpt: String,
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub max_results: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

/// Case-insensitive substring search over every document under `root`.
///
/// Hits come back in walk order and stop at `max_results` across all files,
/// possibly in the middle of a file. Unreadable files are skipped.
pub fn search_documents(root: &Path, query: &str, options: &SearchOptions) -> Vec<SearchHit> {
    let needle = query.to_lowercase();
    let mut hits = Vec::new();

    if options.max_results == 0 {
        return hits;
    }

    for entry in walk_text_files(root) {
        let Ok(content) = fs::read_to_string(entry.path()) else {
            continue;
        };

        if !content.to_lowercase().contains(&needle) {
            continue;
        }

        let file_path = relative_display(root, entry.path());
        let lines: Vec<&str> = content.lines().collect();

        for (i, line) in lines.iter().enumerate() {
            if !line.to_lowercase().contains(&needle) {
                continue;
            }

            let from = i.saturating_sub(1);
            let to = (i + 2).min(lines.len());
            hits.push(SearchHit {
                file_path: file_path.clone(),
                line_number: i + 1,
                excerpt: lines[from..to].join("\n"),
            });

            if hits.len() >= options.max_results {
                return hits;
            }
        }
    }

    hits
}
