use crate::rules::ExclusionEngine;
use std::collections::HashSet;
use std::path::{Component, Path};
use walkdir::WalkDir;

/// One surviving filesystem entry, keyed by its normalized relative path
/// (forward-slash separated, root = "").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub relative_path: String,
    pub is_directory: bool,
}

/// Ordered, deduplicated entries sorted lexicographically by relative path.
/// This ordering governs both the printed structure and file-processing
/// order, so identical inputs always produce identical output.
pub type CollectedTree = Vec<Entry>;

const STRUCTURE_HEADER: &str = "Directory Structure:\n====================\n";
const DIR_MARKER: &str = "\u{1F4C1} ";
const FILE_MARKER: &str = "\u{1F4C4} ";

/// Walks the tree top-down, consulting the exclusion engine at every
/// directory and file. Excluded directories are pruned before recursing, so
/// their descendants are never visited, let alone re-evaluated.
pub fn collect_tree(root: &Path, engine: &ExclusionEngine) -> CollectedTree {
    log::debug!("Collecting tree under: {}", root.display());
    let mut entries: Vec<Entry> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            match relative_key(root, entry.path()) {
                Some(rel) => !engine.is_excluded(&rel, true),
                None => true,
            }
        });

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Error walking directory: {}", e);
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }
        let Some(rel) = relative_key(root, entry.path()) else {
            log::warn!("Could not get relative path for: {}", entry.path().display());
            continue;
        };
        if !seen.insert(rel.clone()) {
            continue;
        }

        let is_directory = entry.file_type().is_dir();
        if is_directory {
            entries.push(Entry {
                relative_path: rel,
                is_directory: true,
            });
        } else if !engine.is_excluded(&rel, false) {
            entries.push(Entry {
                relative_path: rel,
                is_directory: false,
            });
        } else {
            log::trace!("Excluding file: {}", rel);
        }
    }

    entries.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    log::debug!("Collected {} entries.", entries.len());
    entries
}

fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let rel = pathdiff::diff_paths(path, root)?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Renders the indented structure listing: a fixed two-line header, then one
/// line per entry with indentation proportional to directory depth and a
/// marker distinguishing files from directories.
pub fn render_structure_summary(entries: &[Entry]) -> String {
    let mut lines = Vec::with_capacity(entries.len());
    for entry in entries {
        let depth = entry.relative_path.matches('/').count();
        let base_name = entry
            .relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&entry.relative_path);
        let marker = if entry.is_directory {
            DIR_MARKER
        } else {
            FILE_MARKER
        };
        lines.push(format!("{}{}{}", "  ".repeat(depth), marker, base_name));
    }
    format!("{}{}\n\n", STRUCTURE_HEADER, lines.join("\n"))
}
