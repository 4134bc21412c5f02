//! Integration tests for the recompilation engine: change resolution,
//! dispatch bookkeeping, and the watch session, driven through a scripted
//! stub compiler.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use sasswatch::compiler::{CompileError, CompileOptions, CompileOutput, Compiler};
use sasswatch::config::SourceTargetMapping;
use sasswatch::watcher::{
    ChangeEvent, ChangeKind, CompileDispatcher, DependencyGraph, WatchSession, resolve,
};

#[derive(Clone)]
enum Plan {
    Succeed {
        css: String,
        included: Vec<PathBuf>,
    },
    FailOn {
        offending: PathBuf,
        message: String,
    },
}

/// Compiler stub with per-path scripted outcomes and a call log.
#[derive(Default)]
struct ScriptedCompiler {
    plans: Mutex<HashMap<String, Plan>>,
    calls: Mutex<Vec<PathBuf>>,
}

impl ScriptedCompiler {
    fn key(path: &Path) -> String {
        path.to_string_lossy().to_lowercase()
    }

    fn succeed(&self, path: &Path, css: &str, included: &[PathBuf]) {
        self.plans.lock().unwrap().insert(
            Self::key(path),
            Plan::Succeed {
                css: css.to_string(),
                included: included.to_vec(),
            },
        );
    }

    fn fail_on(&self, path: &Path, offending: &Path) {
        self.plans.lock().unwrap().insert(
            Self::key(path),
            Plan::FailOn {
                offending: offending.to_path_buf(),
                message: "Can't find stylesheet to import.".to_string(),
            },
        );
    }

    fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }

    fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

/// Boxable handle so tests keep scripting the compiler after the
/// dispatcher takes ownership.
#[derive(Clone)]
struct SharedCompiler(Arc<ScriptedCompiler>);

impl Compiler for SharedCompiler {
    fn compile(
        &self,
        path: &Path,
        _options: &CompileOptions,
    ) -> Result<CompileOutput, CompileError> {
        self.0.calls.lock().unwrap().push(path.to_path_buf());
        match self.0.plans.lock().unwrap().get(&ScriptedCompiler::key(path)) {
            Some(Plan::Succeed { css, included }) => Ok(CompileOutput {
                css: css.clone(),
                included_paths: included.clone(),
            }),
            Some(Plan::FailOn { offending, message }) => Err(CompileError::Compilation {
                offending_file: offending.clone(),
                description: message.clone(),
                source_fragment: String::new(),
            }),
            None => Ok(CompileOutput {
                css: "/* stub */\n".to_string(),
                included_paths: Vec::new(),
            }),
        }
    }
}

struct Fixture {
    temp: TempDir,
    compiler: Arc<ScriptedCompiler>,
    dispatcher: CompileDispatcher,
    graph: DependencyGraph,
}

impl Fixture {
    fn new() -> Self {
        Self::with_mappings(Vec::new())
    }

    fn with_mappings(mappings: Vec<(String, String)>) -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path().to_path_buf();
        let mappings = mappings
            .into_iter()
            .map(|(source, target)| SourceTargetMapping {
                source: root.join(source),
                target: root.join(target),
            })
            .collect();

        let compiler = Arc::new(ScriptedCompiler::default());
        let dispatcher = CompileDispatcher::new(
            Box::new(SharedCompiler(compiler.clone())),
            CompileOptions::default(),
            mappings,
            root,
        );

        Self {
            temp,
            compiler,
            dispatcher,
            graph: DependencyGraph::new(),
        }
    }

    fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Create a style file on disk and start tracking it.
    fn add_root(&mut self, name: &str) -> PathBuf {
        let path = self.root().join(name);
        fs::write(&path, "// fixture\n").unwrap();
        self.graph.track(path.clone());
        path
    }

    fn change(&mut self, path: &Path) -> Vec<PathBuf> {
        let event = ChangeEvent::new(path, ChangeKind::Changed);
        let scheduled = resolve(&mut self.graph, &event);
        self.dispatcher.dispatch(&mut self.graph, &scheduled);
        scheduled
    }
}

#[test]
fn test_editing_a_partial_recompiles_only_its_dependents() {
    // Scenario A: app.scss includes _vars.scss, other.scss does not
    let mut fx = Fixture::new();
    let app = fx.add_root("app.scss");
    let other = fx.add_root("other.scss");
    let vars = fx.root().join("_vars.scss");
    fs::write(&vars, "$accent: red;\n").unwrap();

    fx.compiler.succeed(&app, "a { color: red; }\n", &[vars.clone()]);
    let initial = fx.graph.paths();
    fx.dispatcher.dispatch(&mut fx.graph, &initial);
    fx.compiler.reset_calls();

    let scheduled = fx.change(&vars);
    assert_eq!(scheduled, vec![app.clone()]);
    assert_eq!(fx.compiler.calls(), vec![app.clone()]);
    assert!(!fx.compiler.calls().contains(&other));
    assert_eq!(
        fs::read_to_string(fx.root().join("app.css")).unwrap(),
        "a { color: red; }\n"
    );
}

#[test]
fn test_failed_compile_still_records_the_offending_dependency() {
    // Scenario B: the compile fails over a missing partial, which must
    // become a watched dependency anyway
    let mut fx = Fixture::new();
    let app = fx.add_root("app.scss");
    let missing = fx.root().join("_missing.scss");

    fx.compiler.fail_on(&app, &missing);
    let initial = fx.graph.paths();
    fx.dispatcher.dispatch(&mut fx.graph, &initial);

    let root = fx.graph.get(&app).unwrap();
    assert!(root.depends_on(&missing));
    assert!(root.last_compiled_at().is_some());
    assert!(!fx.root().join("app.css").exists());

    // creating the partial with valid content retriggers app.scss
    fs::write(&missing, "$accent: red;\n").unwrap();
    fx.compiler
        .succeed(&app, "a { color: red; }\n", &[missing.clone()]);
    fx.compiler.reset_calls();

    let scheduled = fx.change(&missing);
    assert_eq!(scheduled, vec![app.clone()]);
    assert!(fx.root().join("app.css").exists());
    assert!(fx.graph.get(&app).unwrap().depends_on(&missing));
}

#[test]
fn test_new_root_file_is_tracked_and_compiled_without_restart() {
    // Scenario C
    let mut fx = Fixture::new();
    let widget = fx.root().join("widget.scss");
    fs::write(&widget, "// new\n").unwrap();

    let event = ChangeEvent::new(&widget, ChangeKind::Created);
    let scheduled = resolve(&mut fx.graph, &event);
    fx.dispatcher.dispatch(&mut fx.graph, &scheduled);

    assert!(fx.graph.contains(&widget));
    assert_eq!(fx.compiler.calls(), vec![widget.clone()]);
    assert!(fx.root().join("widget.css").exists());
}

#[test]
fn test_deleted_root_is_forgotten_instead_of_compiled() {
    // Scenario D: tracked, but gone from disk by dispatch time
    let mut fx = Fixture::new();
    let ghost = fx.root().join("ghost.scss");
    fx.graph.track(ghost.clone());

    fx.dispatcher.dispatch(&mut fx.graph, &[ghost.clone()]);

    assert!(fx.graph.is_empty());
    assert!(fx.compiler.calls().is_empty());
}

#[test]
fn test_explicit_mapping_redirects_the_output() {
    // Scenario E
    let mut fx = Fixture::with_mappings(vec![("main.scss".into(), "dist/site.css".into())]);
    let main = fx.add_root("main.scss");
    fx.compiler.succeed(&main, "body { margin: 0; }\n", &[]);

    let initial = fx.graph.paths();
    fx.dispatcher.dispatch(&mut fx.graph, &initial);

    assert_eq!(
        fs::read_to_string(fx.root().join("dist/site.css")).unwrap(),
        "body { margin: 0; }\n"
    );
    assert!(!fx.root().join("main.css").exists());
}

#[test]
fn test_recompile_replaces_the_dependency_set() {
    let mut fx = Fixture::new();
    let app = fx.add_root("app.scss");
    let old_dep = fx.root().join("_old.scss");
    let new_dep = fx.root().join("_new.scss");

    fx.compiler.succeed(&app, "a {}\n", &[old_dep.clone()]);
    let initial = fx.graph.paths();
    fx.dispatcher.dispatch(&mut fx.graph, &initial);
    assert!(fx.graph.get(&app).unwrap().depends_on(&old_dep));

    fx.compiler.succeed(&app, "a {}\n", &[new_dep.clone()]);
    fx.change(&app);

    let root = fx.graph.get(&app).unwrap();
    assert!(root.depends_on(&new_dep));
    assert!(!root.depends_on(&old_dep));
    assert_eq!(root.dependencies().len(), 1);
}

#[test]
fn test_write_failure_still_updates_dependencies() {
    // the target's parent is a regular file, so the write cannot succeed
    let mut fx = Fixture::with_mappings(vec![("app.scss".into(), "blocker/out.css".into())]);
    fs::write(fx.root().join("blocker"), "in the way").unwrap();
    let app = fx.add_root("app.scss");
    let vars = fx.root().join("_vars.scss");

    fx.compiler.succeed(&app, "a {}\n", &[vars.clone()]);
    let initial = fx.graph.paths();
    fx.dispatcher.dispatch(&mut fx.graph, &initial);

    let root = fx.graph.get(&app).unwrap();
    assert!(root.depends_on(&vars));
    assert!(root.last_compiled_at().is_some());
    assert!(!fx.root().join("blocker/out.css").exists());
}

#[test]
fn test_unreferenced_partial_schedules_nothing() {
    let mut fx = Fixture::new();
    fx.add_root("app.scss");
    let orphan = fx.root().join("_orphan.scss");
    fs::write(&orphan, "").unwrap();

    let scheduled = fx.change(&orphan);
    assert!(scheduled.is_empty());
    assert!(fx.compiler.calls().is_empty());
}

#[tokio::test]
async fn test_session_stops_on_cancellation() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_path_buf();
    let dispatcher = CompileDispatcher::new(
        Box::new(SharedCompiler(Arc::new(ScriptedCompiler::default()))),
        CompileOptions::default(),
        Vec::new(),
        root.clone(),
    );

    let cancel = CancellationToken::new();
    let session = WatchSession::new(root, DependencyGraph::new(), dispatcher, cancel.clone())
        .expect("session should start");

    let handle = tokio::spawn(session.run());
    cancel.cancel();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("session should stop after cancellation")
        .expect("session task should not panic");
    assert!(result.is_ok());
}
