use crate::config::{IGNORE_FILE_NAME, RuleSet};
use crate::error::{AppError, Result};
use crate::pattern::IgnorePattern;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Compiled form of a `RuleSet`, producing one inclusion/exclusion verdict
/// per filesystem entry. The first applicable exclusion source wins; the
/// sources are never unioned.
#[derive(Debug)]
pub struct ExclusionEngine {
    dir_names: HashSet<String>,
    file_names: HashSet<String>,
    file_patterns: GlobSet,
    extensions: HashSet<String>,
    ignore_patterns: Vec<IgnorePattern>,
    use_ignore_file: bool,
}

impl ExclusionEngine {
    pub fn new(rules: &RuleSet) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern_str in &rules.excluded_file_patterns {
            let glob = Glob::new(pattern_str).map_err(|e| {
                AppError::Glob(format!(
                    "Invalid file exclusion pattern \"{}\": {}",
                    pattern_str, e
                ))
            })?;
            builder.add(glob);
        }
        let file_patterns = builder.build()?;

        let ignore_patterns = rules
            .ignore_patterns
            .iter()
            .filter_map(|line| IgnorePattern::parse(line))
            .collect();

        Ok(ExclusionEngine {
            dir_names: rules.excluded_dir_names.clone(),
            file_names: rules.excluded_file_names.clone(),
            file_patterns,
            extensions: rules.excluded_extensions.clone(),
            ignore_patterns,
            use_ignore_file: rules.use_ignore_file,
        })
    }

    /// Exclusion verdict for one entry, in fixed order: directory name, file
    /// name/pattern, extension, then the ignore patterns.
    pub fn is_excluded(&self, relative_path: &str, is_directory: bool) -> bool {
        let base_name = base_name(relative_path);

        if is_directory && self.dir_names.contains(base_name) {
            log::trace!("Excluded by directory name: {}", relative_path);
            return true;
        }

        if !is_directory {
            if self.file_names.contains(base_name)
                || self.file_patterns.is_match(Path::new(base_name))
            {
                log::trace!("Excluded by file name/pattern: {}", relative_path);
                return true;
            }

            if let Some(ext) = file_extension(base_name) {
                if self.extensions.contains(&ext) {
                    log::trace!("Excluded by extension {}: {}", ext, relative_path);
                    return true;
                }
            }
        }

        if self.use_ignore_file && self.ignore_excluded(relative_path, is_directory) {
            return true;
        }

        false
    }

    /// First-match-wins evaluation over the ignore patterns in declaration
    /// order. The first matching pattern decides: excluded for a standard
    /// pattern, NOT excluded for a negated one; later patterns are never
    /// consulted. This intentionally diverges from real gitignore semantics
    /// (where the last match wins) to stay compatible with the original tool.
    pub fn ignore_excluded(&self, relative_path: &str, is_directory: bool) -> bool {
        for pattern in &self.ignore_patterns {
            if pattern.matches(relative_path, is_directory) {
                if pattern.is_negated() {
                    log::trace!(
                        "Kept by negated pattern \"{}\": {}",
                        pattern.raw(),
                        relative_path
                    );
                    return false;
                }
                log::trace!(
                    "Excluded by pattern \"{}\": {}",
                    pattern.raw(),
                    relative_path
                );
                return true;
            }
        }
        false
    }
}

fn base_name(relative_path: &str) -> &str {
    relative_path.rsplit('/').next().unwrap_or(relative_path)
}

/// Lowercase extension including the dot, mirroring `os.path.splitext`: a
/// base name whose only dot is the leading one has no extension.
fn file_extension(base_name: &str) -> Option<String> {
    match base_name.rfind('.') {
        Some(idx) if idx > 0 => Some(base_name[idx..].to_lowercase()),
        _ => None,
    }
}

/// Reads the ignore file at the scan root, if present. Blank lines and `#`
/// comments are skipped; everything else is kept verbatim, in order.
pub fn load_ignore_file(root: &Path) -> Result<Vec<String>> {
    let path = root.join(IGNORE_FILE_NAME);
    if !path.is_file() {
        log::debug!("{} not found at root.", IGNORE_FILE_NAME);
        return Ok(Vec::new());
    }
    let bytes = fs::read(&path).map_err(|e| AppError::FileRead {
        path: path.clone(),
        source: e,
    })?;
    let content = String::from_utf8_lossy(&bytes);
    let patterns: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();
    log::debug!(
        "Loaded {} patterns from {}.",
        patterns.len(),
        path.display()
    );
    Ok(patterns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with(rules: RuleSet) -> ExclusionEngine {
        ExclusionEngine::new(&rules).unwrap()
    }

    fn engine_with_ignores(patterns: &[&str]) -> ExclusionEngine {
        let mut rules = RuleSet::from_lists::<&str>(&[], &[], &[], true);
        rules.ignore_patterns = patterns.iter().map(|s| s.to_string()).collect();
        engine_with(rules)
    }

    #[test]
    fn dir_names_only_apply_to_directories() {
        let engine = engine_with(RuleSet::default());
        assert!(engine.is_excluded("node_modules", true));
        assert!(engine.is_excluded("pkg/node_modules", true));
        assert!(!engine.is_excluded("node_modules", false));
    }

    #[test]
    fn file_names_patterns_and_extensions() {
        let engine = engine_with(RuleSet::default());
        assert!(engine.is_excluded("package-lock.json", false));
        assert!(engine.is_excluded("src/cache.pyc", false));
        assert!(engine.is_excluded("logs/app.LOG", false));
        assert!(!engine.is_excluded("src/main.py", false));
    }

    #[test]
    fn leading_dot_names_have_no_extension() {
        assert_eq!(file_extension(".gitignore"), None);
        assert_eq!(file_extension("archive.tar.gz"), Some(".gz".to_string()));
        assert_eq!(file_extension("README"), None);
        assert_eq!(file_extension("Image.PNG"), Some(".png".to_string()));
    }

    #[test]
    fn first_match_wins_over_later_patterns() {
        let engine = engine_with_ignores(&["!keep.txt", "*.txt"]);
        assert!(!engine.ignore_excluded("keep.txt", false));
        assert!(engine.ignore_excluded("other.txt", false));
    }

    #[test]
    fn negation_after_first_match_is_never_reached() {
        // "build/" matches first for everything under build, so the
        // re-inclusion of keep.txt never takes effect.
        let engine = engine_with_ignores(&["build/", "!build/keep.txt"]);
        assert!(engine.ignore_excluded("build", true));
        // The dir-only pattern does not match files textually, but the
        // engine consults it per entry; files under build are pruned with
        // the directory during traversal, not matched individually here.
        assert!(!engine.ignore_excluded("build/keep.txt", false));

        let rooted = engine_with_ignores(&["/build", "!build/keep.txt"]);
        assert!(rooted.ignore_excluded("build/tmp.o", false));
        assert!(rooted.ignore_excluded("build/keep.txt", false));
    }

    #[test]
    fn no_match_means_included() {
        let engine = engine_with_ignores(&["*.log"]);
        assert!(!engine.ignore_excluded("src/main.rs", false));
    }

    #[test]
    fn ignore_patterns_disabled_without_flag() {
        let mut rules = RuleSet::from_lists::<&str>(&[], &[], &[], false);
        rules.ignore_patterns = vec!["*.rs".to_string()];
        let engine = engine_with(rules);
        assert!(!engine.is_excluded("main.rs", false));
    }

    #[test]
    fn loads_ignore_file_skipping_comments() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(".gitignore"),
            "# comment\n\nbuild/\n!keep.txt\n  \n*.log\n",
        )
        .unwrap();
        let patterns = load_ignore_file(dir.path()).unwrap();
        assert_eq!(patterns, vec!["build/", "!keep.txt", "*.log"]);
    }

    #[test]
    fn missing_ignore_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_ignore_file(dir.path()).unwrap().is_empty());
    }
}
