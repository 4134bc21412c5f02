//! Root file tracking and the root -> partial dependency graph.
//!
//! Paths are compared case-insensitively but stored with their original
//! casing. The graph only tracks root -> partial edges; partials have no
//! lifecycle of their own, so there is nothing to cycle-check.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

/// Case-insensitive comparison key for a path.
pub fn path_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

/// A set of paths compared case-insensitively, preserving original casing
/// and insertion order.
#[derive(Debug, Clone, Default)]
pub struct PathSet {
    inner: IndexMap<String, PathBuf>,
}

impl PathSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a path; returns false when an equivalent path is already
    /// present (the stored casing is kept).
    pub fn insert(&mut self, path: PathBuf) -> bool {
        match self.inner.entry(path_key(&path)) {
            indexmap::map::Entry::Occupied(_) => false,
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(path);
                true
            }
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.inner.contains_key(&path_key(path))
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.inner.values()
    }
}

/// A tracked compilable entry.
#[derive(Debug, Clone)]
pub struct RootFile {
    path: PathBuf,
    last_compiled_at: Option<DateTime<Utc>>,
    dependencies: PathSet,
}

impl RootFile {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            last_compiled_at: None,
            dependencies: PathSet::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn last_compiled_at(&self) -> Option<DateTime<Utc>> {
        self.last_compiled_at
    }

    /// Stamp the entry after a compile attempt, successful or not.
    pub fn mark_compiled(&mut self) {
        self.last_compiled_at = Some(Utc::now());
    }

    pub fn dependencies(&self) -> &PathSet {
        &self.dependencies
    }

    pub fn depends_on(&self, path: &Path) -> bool {
        self.dependencies.contains(path)
    }

    /// Replace the dependency set from a compile's reported read set.
    /// The previous set is discarded, never merged, and the root's own
    /// path is filtered out.
    pub fn replace_dependencies(&mut self, included: impl IntoIterator<Item = PathBuf>) {
        let own = path_key(&self.path);
        self.dependencies.clear();
        for path in included {
            if path_key(&path) != own {
                self.dependencies.insert(path);
            }
        }
    }

    /// Record a single dependency discovered outside a successful compile
    /// (a failed compile naming an offending file). Returns false when the
    /// path is the root itself or already tracked.
    pub fn add_dependency(&mut self, path: PathBuf) -> bool {
        if path_key(&path) == path_key(&self.path) {
            return false;
        }
        self.dependencies.insert(path)
    }
}

/// All tracked root files, keyed case-insensitively, in discovery order.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    roots: IndexMap<String, RootFile>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a root file; returns false when an equivalent path
    /// is already tracked.
    pub fn track(&mut self, path: PathBuf) -> bool {
        match self.roots.entry(path_key(&path)) {
            indexmap::map::Entry::Occupied(_) => false,
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(RootFile::new(path));
                true
            }
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.roots.contains_key(&path_key(path))
    }

    pub fn get(&self, path: &Path) -> Option<&RootFile> {
        self.roots.get(&path_key(path))
    }

    pub fn get_mut(&mut self, path: &Path) -> Option<&mut RootFile> {
        self.roots.get_mut(&path_key(path))
    }

    /// Drop a root from tracking, keeping the order of the remaining
    /// entries.
    pub fn forget(&mut self, path: &Path) -> Option<RootFile> {
        self.roots.shift_remove(&path_key(path))
    }

    pub fn roots(&self) -> impl Iterator<Item = &RootFile> {
        self.roots.values()
    }

    /// Tracked paths in discovery order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.roots.values().map(|r| r.path().to_path_buf()).collect()
    }

    /// Roots whose dependency set contains `partial`, in tracked order.
    pub fn dependents_of(&self, partial: &Path) -> Vec<PathBuf> {
        self.roots
            .values()
            .filter(|root| root.depends_on(partial))
            .map(|root| root.path().to_path_buf())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
