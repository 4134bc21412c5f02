//! Maps one deduplicated change event to the roots needing recompilation.

use std::path::PathBuf;

use super::event::ChangeEvent;
use super::graph::DependencyGraph;

/// Marker prefix naming a partial file.
pub const PARTIAL_PREFIX: char = '_';

/// Decide which root files a change event touches, in order:
///
/// 1. The path is a tracked root: recompile that root alone.
/// 2. The file name carries no partial marker: a newly appeared root —
///    track it and schedule it.
/// 3. A partial: schedule every root whose dependency set contains it. A
///    partial with no dependents resolves to nothing; only live
///    dependents matter.
///
/// Existence on disk is deliberately not checked here; the dispatcher
/// re-checks at compile time to tolerate the settle delay.
pub fn resolve(graph: &mut DependencyGraph, event: &ChangeEvent) -> Vec<PathBuf> {
    if let Some(root) = graph.get(&event.path) {
        return vec![root.path().to_path_buf()];
    }

    let is_partial = event
        .path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(PARTIAL_PREFIX));

    if !is_partial {
        graph.track(event.path.clone());
        return vec![event.path.clone()];
    }

    graph.dependents_of(&event.path)
}
