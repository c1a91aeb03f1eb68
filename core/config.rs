use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILENAME: &str = "condenser.toml";
pub const IGNORE_FILE_NAME: &str = ".gitignore";
pub const DEFAULT_MAX_LINES_PER_CHUNK: usize = 15_000;

/// Directory names pruned by default, matched against the base name only.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "venv",
    "__pycache__",
    "build",
    "dist",
    ".svn",
    "env",
    ".idea",
    ".vscode",
    "target",
    "out",
];

/// Default file exclusions; entries may be exact names or glob patterns.
pub const DEFAULT_EXCLUDE_FILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "*.pyc",
    "*.pyo",
    "*.exe",
    "*.dll",
    "*.so",
    "*.dylib",
    "*.o",
    "*.a",
    "*.class",
    "*.jar",
];

/// Extensions excluded by default (lowercase, dot-prefixed).
pub const DEFAULT_EXCLUDE_EXTENSIONS: &[&str] = &[
    // Images
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".svg", ".ico", ".tif", ".tiff",
    // Videos
    ".mp4", ".avi", ".mov", ".wmv", ".flv", ".mkv",
    // Audio
    ".mp3", ".wav", ".ogg", ".aac", ".flac",
    // Fonts
    ".ttf", ".otf", ".woff", ".woff2", ".eot",
    // Archives
    ".zip", ".rar", ".tar", ".gz", ".7z", ".bz2", ".iso",
    // Documents
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".odt", ".ods", ".odp",
    // Data/Logs/Temp
    ".db", ".sqlite", ".sqlite3", ".log", ".tmp", ".bak", ".swp",
    // Other Binary/Compiled
    ".bin", ".dat", ".cache", ".img", ".dmg", ".pkl", ".joblib",
];

/// The layered exclusion rules for one scan. Built once by the caller and
/// treated as read-only for the pipeline's duration.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    pub excluded_dir_names: HashSet<String>,
    pub excluded_file_names: HashSet<String>,
    pub excluded_file_patterns: Vec<String>,
    /// Lowercase, dot-prefixed.
    pub excluded_extensions: HashSet<String>,
    /// Ignore patterns in declaration order; usually loaded from `.gitignore`.
    pub ignore_patterns: Vec<String>,
    pub use_ignore_file: bool,
}

impl RuleSet {
    /// Builds a rule set from plain string lists, splitting file entries into
    /// exact names and glob patterns and normalizing extensions.
    pub fn from_lists<S: AsRef<str>>(
        dirs: &[S],
        files: &[S],
        extensions: &[S],
        use_ignore_file: bool,
    ) -> Self {
        let mut excluded_file_names = HashSet::new();
        let mut excluded_file_patterns = Vec::new();
        for entry in files {
            let entry = entry.as_ref().trim();
            if entry.is_empty() {
                continue;
            }
            if has_glob_meta(entry) {
                excluded_file_patterns.push(entry.to_string());
            } else {
                excluded_file_names.insert(entry.to_string());
            }
        }

        RuleSet {
            excluded_dir_names: dirs
                .iter()
                .map(|d| d.as_ref().trim().to_string())
                .filter(|d| !d.is_empty())
                .collect(),
            excluded_file_names,
            excluded_file_patterns,
            excluded_extensions: extensions
                .iter()
                .map(|e| normalize_extension(e.as_ref()))
                .filter(|e| e.len() > 1)
                .collect(),
            ignore_patterns: Vec::new(),
            use_ignore_file,
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet::from_lists(
            DEFAULT_EXCLUDE_DIRS,
            DEFAULT_EXCLUDE_FILES,
            DEFAULT_EXCLUDE_EXTENSIONS,
            true,
        )
    }
}

fn has_glob_meta(entry: &str) -> bool {
    entry.contains(['*', '?', '['])
}

/// Lowercases and dot-prefixes an extension entry (".LOG", "log" -> ".log").
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

/// Optional project configuration loaded from `condenser.toml`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub filters: FiltersConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FiltersConfig {
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
    #[serde(default = "default_exclude_files")]
    pub exclude_files: Vec<String>,
    #[serde(default = "default_exclude_extensions")]
    pub exclude_extensions: Vec<String>,
    /// Additional extensions merged on top of `exclude_extensions`.
    #[serde(default)]
    pub extra_extensions: Vec<String>,
    #[serde(default = "default_true")]
    pub use_gitignore: bool,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        FiltersConfig {
            exclude_dirs: default_exclude_dirs(),
            exclude_files: default_exclude_files(),
            exclude_extensions: default_exclude_extensions(),
            extra_extensions: Vec::new(),
            use_gitignore: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_true")]
    pub include_structure: bool,
    #[serde(default)]
    pub structure_only: bool,
    #[serde(default)]
    pub chunked: bool,
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            include_structure: true,
            structure_only: false,
            chunked: false,
            max_lines: DEFAULT_MAX_LINES_PER_CHUNK,
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_max_lines() -> usize {
    DEFAULT_MAX_LINES_PER_CHUNK
}
fn default_exclude_dirs() -> Vec<String> {
    DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect()
}
fn default_exclude_files() -> Vec<String> {
    DEFAULT_EXCLUDE_FILES
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_exclude_extensions() -> Vec<String> {
    DEFAULT_EXCLUDE_EXTENSIONS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Config {
    /// Determines which config file (if any) applies to this invocation.
    pub fn resolve_config_path(
        root: &Path,
        cli_path: Option<&PathBuf>,
        disabled: bool,
    ) -> Result<Option<PathBuf>> {
        if disabled {
            log::debug!("Config file loading disabled via CLI.");
            return Ok(None);
        }
        if let Some(path) = cli_path {
            let resolved = if path.is_absolute() {
                path.clone()
            } else {
                root.join(path)
            };
            if !resolved.is_file() {
                return Err(AppError::Config(format!(
                    "Specified config file not found: {}",
                    resolved.display()
                )));
            }
            return Ok(Some(resolved));
        }
        let default_path = root.join(DEFAULT_CONFIG_FILENAME);
        Ok(default_path.is_file().then_some(default_path))
    }

    pub fn load_from_path(path: &Path) -> Result<Config> {
        log::debug!("Loading config from: {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| AppError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content)
            .map_err(|e| AppError::TomlParse(format!("{}: {}", path.display(), e)))
    }

    /// Translates the filter section into the immutable scan rule set.
    pub fn to_rule_set(&self) -> RuleSet {
        let mut extensions = self.filters.exclude_extensions.clone();
        extensions.extend(self.filters.extra_extensions.iter().cloned());
        RuleSet::from_lists(
            &self.filters.exclude_dirs,
            &self.filters.exclude_files,
            &extensions,
            self.filters.use_gitignore,
        )
    }
}

/// Full configuration for one pipeline run, assembled by the caller.
#[derive(Debug, Clone)]
pub struct CondenseOptions {
    pub root_dir: PathBuf,
    pub output_path: PathBuf,
    pub rules: RuleSet,
    pub include_structure: bool,
    pub structure_only: bool,
    pub chunked: bool,
    pub max_lines: usize,
}

impl CondenseOptions {
    /// Checks everything that must block execution before the pipeline starts:
    /// the root must be an existing directory, the output path must be
    /// non-empty, and an explicitly named output directory must exist.
    pub fn validate(&self) -> Result<()> {
        if self.root_dir.as_os_str().is_empty() || !self.root_dir.is_dir() {
            return Err(AppError::Config(format!(
                "Project root is not a valid directory: {}",
                self.root_dir.display()
            )));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(AppError::Config(
                "No output file name/path specified".to_string(),
            ));
        }
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(AppError::Config(format!(
                    "The output directory does not exist: {}",
                    parent.display()
                )));
            }
        }
        if self.chunked && self.max_lines == 0 {
            return Err(AppError::InvalidArgument(
                "Maximum lines per chunk must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_set_splits_names_and_patterns() {
        let rules = RuleSet::default();
        assert!(rules.excluded_file_names.contains("package-lock.json"));
        assert!(rules.excluded_file_names.contains("yarn.lock"));
        assert!(rules.excluded_file_patterns.contains(&"*.pyc".to_string()));
        assert!(!rules.excluded_file_names.contains("*.pyc"));
    }

    #[test]
    fn extensions_are_normalized() {
        let rules = RuleSet::from_lists(&[], &[], &["LOG", ".Tmp", " bak "], false);
        assert!(rules.excluded_extensions.contains(".log"));
        assert!(rules.excluded_extensions.contains(".tmp"));
        assert!(rules.excluded_extensions.contains(".bak"));
    }

    #[test]
    fn config_defaults_round_trip() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.output.include_structure);
        assert_eq!(config.output.max_lines, DEFAULT_MAX_LINES_PER_CHUNK);
        assert!(config.filters.use_gitignore);
    }

    #[test]
    fn config_partial_override() {
        let config: Config = toml::from_str(
            "[output]\nchunked = true\nmax_lines = 500\n\n[filters]\nextra_extensions = [\"generated\"]\n",
        )
        .unwrap();
        assert!(config.output.chunked);
        assert_eq!(config.output.max_lines, 500);
        let rules = config.to_rule_set();
        assert!(rules.excluded_extensions.contains(".generated"));
        assert!(rules.excluded_extensions.contains(".log"));
    }
}
