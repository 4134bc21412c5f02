//! Sass compilation via the `grass` crate.
//!
//! `grass` reports neither the files a compile read nor a structured
//! offending file, so the compiler runs against a filesystem wrapper that
//! logs every read and every failed probe. The log yields the included
//! paths on success and attributes the failure on error: trailing missing
//! probes mean an import could not be resolved, otherwise the error sits
//! in the deepest file read.
//!
//! `source_map_inline` is accepted for interface compatibility; `grass`
//! has no source-map support.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{CompileError, CompileOptions, CompileOutput, Compiler, OutputStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    Read,
    Missing,
}

#[derive(Debug, Default)]
struct ReadLog {
    entries: Vec<(PathBuf, Probe)>,
}

impl ReadLog {
    fn push(&mut self, path: &Path, probe: Probe) {
        self.entries.push((path.to_path_buf(), probe));
    }

    fn reads(&self) -> Vec<PathBuf> {
        self.entries
            .iter()
            .filter(|(_, probe)| *probe == Probe::Read)
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Missing probes after the last successful read. Non-empty when the
    /// compile died resolving an import.
    fn trailing_missing(&self) -> Vec<&PathBuf> {
        self.entries
            .iter()
            .rev()
            .take_while(|(_, probe)| *probe == Probe::Missing)
            .map(|(path, _)| path)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect()
    }

    fn last_read(&self) -> Option<&PathBuf> {
        self.entries
            .iter()
            .rev()
            .find(|(_, probe)| *probe == Probe::Read)
            .map(|(path, _)| path)
    }
}

/// `grass::Fs` over the real filesystem, recording reads and failed
/// probes. The compiler resolves imports by probing candidate paths, so
/// the log sees every file the compile touched or wanted.
#[derive(Debug, Default)]
struct RecordingFs {
    log: Mutex<ReadLog>,
}

impl RecordingFs {
    fn into_log(self) -> ReadLog {
        self.log.into_inner().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, path: &Path, probe: Probe) {
        if let Ok(mut log) = self.log.lock() {
            log.push(path, probe);
        }
    }
}

impl ::grass::Fs for RecordingFs {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        let exists = path.is_file();
        if !exists {
            self.record(path, Probe::Missing);
        }
        exists
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let bytes = std::fs::read(path)?;
        self.record(path, Probe::Read);
        Ok(bytes)
    }
}

/// Compiles Sass/SCSS through `grass`.
#[derive(Debug, Default)]
pub struct GrassCompiler;

impl GrassCompiler {
    pub fn new() -> Self {
        Self
    }
}

impl Compiler for GrassCompiler {
    fn compile(
        &self,
        path: &Path,
        options: &CompileOptions,
    ) -> Result<CompileOutput, CompileError> {
        let style = match options.style {
            OutputStyle::Expanded => ::grass::OutputStyle::Expanded,
            OutputStyle::Compressed => ::grass::OutputStyle::Compressed,
        };

        let fs = RecordingFs::default();
        let result = {
            let grass_options = ::grass::Options::default().style(style).fs(&fs);
            ::grass::from_path(path, &grass_options)
        };
        let log = fs.into_log();

        match result {
            Ok(css) => Ok(CompileOutput {
                css,
                included_paths: log.reads(),
            }),
            Err(e) => Err(attribute_failure(path, &log, &e.to_string())),
        }
    }
}

/// Pin a failed compile on a file.
///
/// Import resolution probes `name.ext`, `_name.ext` and the `index`
/// variants in turn; when a compile dies on an unresolvable import, those
/// probes are the tail of the log and the `_`-prefixed candidate is the
/// conventional partial name. Without trailing probes the error occurred
/// while parsing the deepest file read.
fn attribute_failure(root: &Path, log: &ReadLog, message: &str) -> CompileError {
    let trailing = log.trailing_missing();

    let offending = trailing
        .iter()
        .find(|path| is_partial_candidate(path))
        .or_else(|| trailing.iter().find(|path| !is_index_candidate(path)))
        .or_else(|| trailing.first())
        .map(|path| (*path).clone())
        .or_else(|| log.last_read().cloned())
        .unwrap_or_else(|| root.to_path_buf());

    let (description, source_fragment) = match message.split_once('\n') {
        Some((first, rest)) => (first.to_string(), rest.to_string()),
        None => (message.to_string(), String::new()),
    };

    CompileError::Compilation {
        offending_file: offending,
        description,
        source_fragment,
    }
}

fn is_partial_candidate(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('_'))
        && !is_index_candidate(path)
}

fn is_index_candidate(path: &Path) -> bool {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem == "index" || stem == "_index")
}
