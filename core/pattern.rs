use globset::{GlobBuilder, GlobMatcher};

/// One ignore-file rule line with its derived flags. Patterns keep their
/// declaration order; the engine evaluates them first-match-wins.
#[derive(Debug, Clone)]
pub struct IgnorePattern {
    raw: String,
    text: String,
    negated: bool,
    dir_only: bool,
    rooted: bool,
    matcher: GlobMatcher,
}

impl IgnorePattern {
    /// Parses a single pattern line. Returns `None` for lines that reduce to
    /// nothing after stripping markers (`!`, trailing `/`, leading `/`) and
    /// for patterns whose glob fails to compile.
    pub fn parse(line: &str) -> Option<IgnorePattern> {
        let raw = line.to_string();
        let mut text = line;

        let negated = text.starts_with('!');
        if negated {
            text = &text[1..];
            if text.is_empty() {
                return None;
            }
        }

        let dir_only = text.ends_with('/');
        text = text.trim_end_matches('/');
        if text.is_empty() {
            return None;
        }

        let rooted = text.starts_with('/');
        text = text.trim_start_matches('/');
        if text.is_empty() {
            return None;
        }

        // A rooted pattern's wildcards stay within one path segment unless the
        // pattern itself spells out literal slashes.
        let matcher = match GlobBuilder::new(text).literal_separator(true).build() {
            Ok(glob) => glob.compile_matcher(),
            Err(e) => {
                log::warn!("Skipping invalid ignore pattern \"{}\": {}", raw, e);
                return None;
            }
        };

        Some(IgnorePattern {
            raw,
            text: text.to_string(),
            negated,
            dir_only,
            rooted,
            matcher,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Raw textual match against a forward-slash relative path. Negation is
    /// NOT applied here; it belongs to rule combination, not character
    /// matching, and is handled by the exclusion engine.
    pub fn matches(&self, relative_path: &str, is_directory: bool) -> bool {
        if self.dir_only && !is_directory {
            return false;
        }

        if self.rooted {
            // Anchored to the scan root: match the full relative path, or
            // treat the pattern as a directory that covers its descendants.
            return self.matcher.is_match(relative_path)
                || relative_path.starts_with(&format!("{}/", self.text));
        }

        // Unanchored: the base name or any single path component may match.
        let base_name = relative_path.rsplit('/').next().unwrap_or(relative_path);
        if self.matcher.is_match(base_name) {
            return true;
        }
        relative_path
            .split('/')
            .any(|component| self.matcher.is_match(component))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> IgnorePattern {
        IgnorePattern::parse(line).expect("pattern should parse")
    }

    #[test]
    fn derives_flags() {
        let p = parse("!/build/");
        assert!(p.is_negated());
        assert!(p.dir_only);
        assert!(p.rooted);
        assert_eq!(p.text, "build");
        assert_eq!(p.raw(), "!/build/");
    }

    #[test]
    fn rejects_empty_after_stripping() {
        assert!(IgnorePattern::parse("!").is_none());
        assert!(IgnorePattern::parse("/").is_none());
        assert!(IgnorePattern::parse("!/").is_none());
    }

    #[test]
    fn dir_only_never_matches_files() {
        let p = parse("build/");
        assert!(p.matches("build", true));
        assert!(!p.matches("build", false));
    }

    #[test]
    fn rooted_matches_full_path_and_descendants() {
        let p = parse("/build");
        assert!(p.matches("build", true));
        assert!(p.matches("build/tmp.o", false));
        assert!(!p.matches("src/build2", false));
        // Rooted means anchored: a nested "build" is only covered via the
        // literal prefix rule, which this path does not satisfy.
        assert!(!p.matches("src/build", true));
    }

    #[test]
    fn rooted_wildcard_stays_in_one_segment() {
        let p = parse("/docs/*.md");
        assert!(p.matches("docs/readme.md", false));
        assert!(!p.matches("docs/sub/notes.md", false));
    }

    #[test]
    fn unanchored_matches_any_component() {
        let p = parse("__pycache__");
        assert!(p.matches("__pycache__", true));
        assert!(p.matches("src/__pycache__", true));
        assert!(p.matches("src/__pycache__/mod.cpython-311.pyc", false));
    }

    #[test]
    fn glob_wildcards_follow_shell_semantics() {
        assert!(parse("*.log").matches("app/debug.log", false));
        assert!(parse("file?.txt").matches("file1.txt", false));
        assert!(!parse("file?.txt").matches("file12.txt", false));
        assert!(parse("[abc].txt").matches("b.txt", false));
        assert!(!parse("[abc].txt").matches("d.txt", false));
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert!(!parse("*.LOG").matches("debug.log", false));
        assert!(parse("*.LOG").matches("debug.LOG", false));
    }
}
