//! Change event types fed into the watch loop.

use std::path::{Path, PathBuf};

use notify::EventKind;
use notify::event::ModifyKind;

/// What happened to a path. The resolver treats every kind identically;
/// the kind only affects log labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Changed,
    Created,
    Deleted,
    Renamed,
}

impl ChangeKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Changed => "Changed",
            Self::Created => "Created",
            Self::Deleted => "Deleted",
            Self::Renamed => "Renamed",
        }
    }
}

/// A single filesystem change observed by the watch primitive.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Map a notify event onto engine change events, dropping paths that
    /// are not style files.
    ///
    /// A rename is normalized to the carried old path; the new name is
    /// never processed as a distinct event. Access notifications are
    /// ignored.
    pub fn from_notify(event: &notify::Event) -> Vec<ChangeEvent> {
        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Remove(_) => ChangeKind::Deleted,
            EventKind::Modify(ModifyKind::Name(_)) => ChangeKind::Renamed,
            EventKind::Modify(_) => ChangeKind::Changed,
            _ => return Vec::new(),
        };

        let paths: &[PathBuf] = if kind == ChangeKind::Renamed {
            // [old, new] for a full rename; only the old path matters
            match event.paths.first() {
                Some(first) => std::slice::from_ref(first),
                None => &[],
            }
        } else {
            &event.paths
        };

        paths
            .iter()
            .filter(|path| is_style_path(path))
            .map(|path| ChangeEvent::new(path.clone(), kind))
            .collect()
    }
}

/// The watch stream only carries `.sass`/`.scss` paths, matching the
/// original watcher filters.
pub(crate) fn is_style_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("sass") || ext.eq_ignore_ascii_case("scss"))
}
