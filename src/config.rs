//! Configuration for the watch command.
//!
//! Layered: built-in defaults, then the optional `sasswatch.json` file in
//! the watched root, then environment variable overrides.
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `SASSWATCH_`:
//! - `SASSWATCH_COMPRESSED=true` sets `compressed`
//!
//! # Config file
//!
//! ```json
//! {
//!   "includeGlobs": ["themes/**/*.scss"],
//!   "excludeGlobs": ["**/legacy/**"],
//!   "compressed": true,
//!   "sources": [{ "source": "main.scss", "target": "dist/site.css" }]
//! }
//! ```
//!
//! Glob lists from the file are appended to the CLI lists; the scanner
//! deduplicates the merged patterns. `sources` paths are resolved relative
//! to the watched root.

use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fixed name of the optional config file in the watched root.
pub const CONFIG_FILENAME: &str = "sasswatch.json";

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Extra glob patterns selecting compilable root files.
    pub include_globs: Vec<String>,

    /// Extra glob patterns excluding files from the scan.
    pub exclude_globs: Vec<String>,

    /// Emit compressed CSS instead of expanded.
    pub compressed: bool,

    /// Explicit source -> target overrides, relative to the watched root.
    pub sources: Vec<SourceTargetConfig>,
}

/// One source -> target override as written in the config file.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SourceTargetConfig {
    pub source: String,
    pub target: String,
}

/// A resolved override: absolute source and target paths, immutable for
/// the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTargetMapping {
    pub source: PathBuf,
    pub target: PathBuf,
}

impl Settings {
    /// Load settings for a watched root.
    ///
    /// Returns the settings and the config file path when one was found.
    /// An absent file is not an error; the defaults apply.
    pub fn load(root: &Path) -> Result<(Self, Option<PathBuf>), Box<figment::Error>> {
        let config_path = root.join(CONFIG_FILENAME);
        let found = config_path.is_file().then(|| config_path.clone());

        let settings = Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Json::file(config_path))
            .merge(Env::prefixed("SASSWATCH_"))
            .extract()
            .map_err(Box::new)?;

        Ok((settings, found))
    }

    /// Resolve the configured `sources` against the watched root.
    ///
    /// A target whose path carries no file name (a trailing separator,
    /// e.g. `dist/`) gets `<source-stem>.css` appended, matching the
    /// default output naming.
    pub fn resolved_sources(&self, root: &Path) -> Vec<SourceTargetMapping> {
        self.sources
            .iter()
            .map(|entry| {
                let source = root.join(&entry.source);
                let target_is_dir = entry.target.ends_with('/')
                    || entry.target.ends_with(std::path::MAIN_SEPARATOR);
                let target = if target_is_dir {
                    let stem = source
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    root.join(&entry.target).join(format!("{stem}.css"))
                } else {
                    root.join(&entry.target)
                };
                SourceTargetMapping { source, target }
            })
            .collect()
    }
}
