//! Common utilities shared across modules.

use std::path::Path;

/// Render a path relative to the watched root for log output.
///
/// Falls back to the full path when it is not under the root.
pub fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
