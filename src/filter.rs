use crate::errors::CollectError;
use glob::Pattern;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

pub const DEFAULT_EXTENSIONS: &[&str] = &[".py"];
pub const DEFAULT_IGNORE_FILE: &str = "hh-c2t-ignore";

/// Decides which relative paths make it into the document: an extension
/// allow-list followed by an ignore-pattern deny-list.
#[derive(Debug, Clone)]
pub struct FileFilter {
    extensions: Vec<String>,
    patterns: Vec<IgnorePattern>,
}

#[derive(Debug, Clone)]
struct IgnorePattern {
    direct: Pattern,
    nested: Pattern,
}

impl Default for FileFilter {
    fn default() -> Self {
        FileFilter::new(
            DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            Vec::new(),
        )
    }
}

impl FileFilter {
    /// An empty `extensions` list accepts every extension.
    pub fn new(extensions: Vec<String>, patterns: Vec<String>) -> Self {
        let compiled_patterns = patterns
            .iter()
            .filter_map(|p| {
                let translated = fnmatch_to_glob(p);
                let direct = Pattern::new(&translated);
                let nested = Pattern::new(&format!("*/{}", translated));
                match (direct, nested) {
                    (Ok(direct), Ok(nested)) => Some(IgnorePattern { direct, nested }),
                    (Err(e), _) | (_, Err(e)) => {
                        warn!("Invalid ignore pattern '{}': {}", p, e);
                        None
                    }
                }
            })
            .collect();

        debug!("Using extensions: {:?}", extensions);
        debug!("Using ignore patterns: {:?}", patterns);

        FileFilter {
            extensions,
            patterns: compiled_patterns,
        }
    }

    /// Builds a filter from an ignore file. A missing file contributes no
    /// patterns.
    pub fn from_ignore_file<P: AsRef<Path>>(
        extensions: Vec<String>,
        ignore_file: P,
    ) -> Result<Self, CollectError> {
        let ignore_file = ignore_file.as_ref();
        if !ignore_file.exists() {
            debug!("No ignore file at {}", ignore_file.display());
            return Ok(FileFilter::new(extensions, Vec::new()));
        }

        let content = fs::read_to_string(ignore_file).map_err(|e| {
            CollectError::ConfigError(format!(
                "cannot read ignore file {}: {}",
                ignore_file.display(),
                e
            ))
        })?;
        Ok(FileFilter::new(extensions, parse_ignore_patterns(&content)))
    }

    pub fn should_include(&self, relative_path: &str) -> bool {
        if !self.extensions.is_empty()
            && !self
                .extensions
                .iter()
                .any(|ext| relative_path.ends_with(ext.as_str()))
        {
            return false;
        }

        !self
            .patterns
            .iter()
            .any(|p| p.direct.matches(relative_path) || p.nested.matches(relative_path))
    }
}

/// Rewrites shell-style patterns into `glob` syntax: runs of `*` collapse
/// to one `*` (which already crosses `/`), and a `[` without a closing `]`
/// is a literal bracket.
fn fnmatch_to_glob(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut translated = String::with_capacity(pattern.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                translated.push('*');
                while i + 1 < chars.len() && chars[i + 1] == '*' {
                    i += 1;
                }
            }
            '[' => {
                let mut j = i + 1;
                if j < chars.len() && chars[j] == '!' {
                    j += 1;
                }
                if j < chars.len() && chars[j] == ']' {
                    j += 1;
                }
                while j < chars.len() && chars[j] != ']' {
                    j += 1;
                }
                if j >= chars.len() {
                    translated.push_str("[[]");
                } else {
                    translated.extend(&chars[i..=j]);
                    i = j;
                }
            }
            c => translated.push(c),
        }
        i += 1;
    }
    translated
}

/// One pattern per line; blank lines and `#` comments are skipped.
pub fn parse_ignore_patterns(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_owned)
        .collect()
}

/// Splits a comma-separated `--extensions` value, dropping blank entries.
pub fn parse_extensions(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|ext| !ext.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn filter(extensions: &[&str], patterns: &[&str]) -> FileFilter {
        FileFilter::new(
            extensions.iter().map(|s| s.to_string()).collect(),
            patterns.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_extension_is_required() {
        let f = filter(&[".py"], &[]);
        assert!(f.should_include("a.py"));
        assert!(f.should_include("pkg/mod/a.py"));
        assert!(!f.should_include("b.txt"));
        assert!(!f.should_include("a.PY"));
    }

    #[test]
    fn test_bare_pattern_matches_at_any_depth() {
        let f = filter(&[".py"], &["c.py"]);
        assert!(!f.should_include("c.py"));
        assert!(!f.should_include("sub/c.py"));
        assert!(!f.should_include("sub/deeper/c.py"));
        assert!(f.should_include("sub/d.py"));
    }

    #[test]
    fn test_glob_syntax() {
        let f = filter(&[".py"], &["test_?.py", "build/*", "[ab]x.py"]);
        assert!(!f.should_include("test_1.py"));
        assert!(f.should_include("test_10.py"));
        assert!(!f.should_include("build/gen.py"));
        assert!(!f.should_include("ax.py"));
        assert!(f.should_include("cx.py"));
    }

    #[test]
    fn test_empty_extension_list_accepts_everything() {
        let f = filter(&[], &["*.lock"]);
        assert!(f.should_include("README"));
        assert!(f.should_include("src/main.rs"));
        assert!(!f.should_include("Cargo.lock"));
    }

    #[test]
    #[traced_test]
    fn test_unclosed_bracket_is_literal() {
        let f = filter(&[".py"], &["gen[.py", "[", "skip.py"]);
        assert!(!f.should_include("gen[.py"));
        assert!(!f.should_include("out/gen[.py"));
        assert!(!f.should_include("skip.py"));
        assert!(f.should_include("gen.py"));
        assert!(f.should_include("keep.py"));
        assert!(!logs_contain("Invalid ignore pattern"));
    }

    #[test]
    fn test_double_star_behaves_like_single_star() {
        let f = filter(&[".py"], &["**/generated.py", "a**b.py"]);
        assert!(!f.should_include("pkg/generated.py"));
        assert!(!f.should_include("pkg/deep/generated.py"));
        assert!(!f.should_include("a/x/b.py"));
        assert!(f.should_include("generated_not.py"));
    }

    #[test]
    fn test_fnmatch_to_glob() {
        assert_eq!(fnmatch_to_glob("gen[.py"), "gen[[].py");
        assert_eq!(fnmatch_to_glob("[ab]x.py"), "[ab]x.py");
        assert_eq!(fnmatch_to_glob("[!]x]y"), "[!]x]y");
        assert_eq!(fnmatch_to_glob("**/a***b"), "*/a*b");
    }

    #[test]
    fn test_parse_ignore_patterns() {
        let patterns = parse_ignore_patterns("# comment\n\n  venv/*  \nsetup.py\n");
        assert_eq!(patterns, vec!["venv/*".to_string(), "setup.py".to_string()]);
    }

    #[test]
    fn test_parse_extensions() {
        assert_eq!(
            parse_extensions(" .py, .txt ,,"),
            vec![".py".to_string(), ".txt".to_string()]
        );
        assert!(parse_extensions("").is_empty());
    }
}
