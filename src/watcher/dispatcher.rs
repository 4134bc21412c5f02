//! Compile dispatch: target resolution, compiler invocation, output
//! writes, and dependency bookkeeping.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{error, info, trace};

use crate::compiler::{CompileError, CompileOptions, Compiler};
use crate::config::SourceTargetMapping;
use crate::utils::display_relative;

use super::graph::{DependencyGraph, RootFile, path_key};

/// Invokes the compiler for scheduled roots and feeds every outcome back
/// into the dependency graph.
pub struct CompileDispatcher {
    compiler: Box<dyn Compiler>,
    options: CompileOptions,
    mappings: Vec<SourceTargetMapping>,
    root_dir: PathBuf,
}

impl CompileDispatcher {
    pub fn new(
        compiler: Box<dyn Compiler>,
        options: CompileOptions,
        mappings: Vec<SourceTargetMapping>,
        root_dir: PathBuf,
    ) -> Self {
        Self {
            compiler,
            options,
            mappings,
            root_dir,
        }
    }

    /// Compile every scheduled root in order.
    ///
    /// The existence check happens here, not at scheduling time, to
    /// tolerate the settle delay: a scheduled root whose backing file
    /// disappeared is dropped from tracking instead of compiled.
    pub fn dispatch(&self, graph: &mut DependencyGraph, scheduled: &[PathBuf]) {
        for path in scheduled {
            if !path.exists() {
                if graph.forget(path).is_some() {
                    info!("forgetting '{}', file no longer exists", self.rel(path));
                }
                continue;
            }

            if let Some(root) = graph.get_mut(path) {
                self.compile_root(root);
            }
        }
    }

    /// Compile a single root and update its bookkeeping. Returns whether
    /// the compile and the output write both succeeded.
    ///
    /// Failures are contained here; they are logged and never propagate
    /// to the watch loop.
    pub fn compile_root(&self, root: &mut RootFile) -> bool {
        info!("  {}", self.rel(root.path()));

        let outcome = match self.compiler.compile(root.path(), &self.options) {
            Ok(output) => {
                for file in output.included_paths.iter() {
                    if path_key(file) == path_key(root.path()) {
                        continue;
                    }
                    trace!("  - {}", self.rel(file));
                }

                let target = self.resolve_target(root.path());
                info!("    -> {}", self.rel(&target));

                let written = match write_target(&target, &output.css) {
                    Ok(()) => true,
                    Err(e) => {
                        error!("could not write file '{}': {e}", self.rel(&target));
                        false
                    }
                };

                // The compile itself succeeded, so its read set is current
                // even when the write failed.
                root.replace_dependencies(output.included_paths);
                written
            }
            Err(CompileError::Compilation {
                offending_file,
                description,
                source_fragment,
            }) => {
                if root.add_dependency(offending_file.clone()) {
                    trace!(
                        "tracking '{}' as dependency of '{}'",
                        self.rel(&offending_file),
                        self.rel(root.path())
                    );
                }
                error!(
                    "compilation error\n  file: {}\n  message: {description}\n{source_fragment}",
                    self.rel(&offending_file)
                );
                false
            }
            Err(e) => {
                error!("unhandled compiler failure: {e}");
                false
            }
        };

        root.mark_compiled();
        outcome
    }

    /// Resolve where a root's compiled output goes: the explicit mapping
    /// when one is configured for this source, else a same-directory
    /// sibling with a `.css` extension.
    pub fn resolve_target(&self, source: &Path) -> PathBuf {
        let key = path_key(source);
        self.mappings
            .iter()
            .find(|mapping| path_key(&mapping.source) == key)
            .map(|mapping| mapping.target.clone())
            .unwrap_or_else(|| source.with_extension("css"))
    }

    fn rel(&self, path: &Path) -> String {
        display_relative(path, &self.root_dir)
    }
}

/// Overwrite the target file with the compiled text, creating missing
/// parent directories for mapped targets like `dist/site.css`.
fn write_target(target: &Path, css: &str) -> io::Result<()> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(target, css)
}
