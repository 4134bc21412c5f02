//! Initial discovery of compilable root files.
//!
//! Resolves include/exclude glob patterns against a root directory. The
//! output seeds the tracked root file set: every path matching at least
//! one include pattern and no exclude pattern, in discovery order, each
//! path at most once.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use thiserror::Error;
use tracing::warn;

use crate::watcher::path_key;

/// Include patterns used when neither the CLI nor the config file supplies
/// any.
pub const DEFAULT_INCLUDE_GLOBS: &[&str] = &["**/*.sass", "**/*.scss"];

/// Default exclusions: partial files and build/tooling directories.
pub const DEFAULT_EXCLUDE_GLOBS: &[&str] = &[
    "**/_*.sass",
    "**/_*.scss",
    "**/.vs/**",
    "**/bin/**",
    "**/obj/**",
];

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },
}

/// Resolves include/exclude globs against a root directory.
///
/// Pattern matching is case-insensitive, and an exclude match always wins
/// over an include match.
#[derive(Debug)]
pub struct GlobScanner {
    root: PathBuf,
    includes: Vec<String>,
    excludes: Vec<Pattern>,
    options: MatchOptions,
}

impl GlobScanner {
    /// Build a scanner from pattern lists. Duplicate patterns are dropped
    /// before matching; invalid patterns are rejected.
    pub fn new(
        root: &Path,
        include_globs: &[String],
        exclude_globs: &[String],
    ) -> Result<Self, ScanError> {
        let includes = dedup_patterns(include_globs);
        for pattern in &includes {
            Pattern::new(pattern).map_err(|source| ScanError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        }

        let excludes = dedup_patterns(exclude_globs)
            .into_iter()
            .map(|pattern| {
                Pattern::new(&pattern).map_err(|source| ScanError::InvalidPattern {
                    pattern,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            root: root.to_path_buf(),
            includes,
            excludes,
            options: MatchOptions {
                case_sensitive: false,
                require_literal_separator: false,
                require_literal_leading_dot: false,
            },
        })
    }

    /// Paths matching at least one include pattern and no exclude pattern,
    /// in discovery order, deduplicated.
    pub fn scan(&self) -> Vec<PathBuf> {
        let escaped_root = Pattern::escape(&self.root.to_string_lossy());
        let mut seen = HashSet::new();
        let mut found = Vec::new();

        for pattern in &self.includes {
            let full_pattern = format!("{escaped_root}/{pattern}");
            let entries = match glob::glob_with(&full_pattern, self.options) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("skipping include pattern '{pattern}': {e}");
                    continue;
                }
            };

            for path in entries.filter_map(Result::ok) {
                if !path.is_file() {
                    continue;
                }
                if self.is_excluded(&path) {
                    continue;
                }
                if seen.insert(path_key(&path)) {
                    found.push(path);
                }
            }
        }

        found
    }

    /// Exclude patterns match against the root-relative path.
    fn is_excluded(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        self.excludes
            .iter()
            .any(|pattern| pattern.matches_path_with(relative, self.options))
    }
}

fn dedup_patterns(patterns: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    patterns
        .iter()
        .filter(|p| seen.insert(p.to_lowercase()))
        .cloned()
        .collect()
}
