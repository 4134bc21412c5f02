//! The `watch` command: scan, initial compile-all pass, then the event
//! loop until Ctrl-C.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::compiler::{CompileOptions, GrassCompiler, OutputStyle};
use crate::config::Settings;
use crate::scanner::GlobScanner;
use crate::watcher::{CompileDispatcher, DependencyGraph, WatchSession};

pub struct WatchArgs {
    pub dir: PathBuf,
    pub include_globs: Vec<String>,
    pub exclude_globs: Vec<String>,
}

pub async fn run(args: WatchArgs) -> Result<()> {
    let root = std::fs::canonicalize(&args.dir)
        .with_context(|| format!("cannot resolve watch directory '{}'", args.dir.display()))?;

    let (settings, config_path) =
        Settings::load(&root).map_err(|e| anyhow!("configuration error: {e}"))?;
    if let Some(path) = &config_path {
        info!("reading settings from '{}'", path.display());
    }

    // config file globs extend the CLI lists; the scanner deduplicates
    let mut include_globs = args.include_globs;
    include_globs.extend(settings.include_globs.iter().cloned());
    let mut exclude_globs = args.exclude_globs;
    exclude_globs.extend(settings.exclude_globs.iter().cloned());

    let scanner = GlobScanner::new(&root, &include_globs, &exclude_globs)?;
    let mut graph = DependencyGraph::new();
    for path in scanner.scan() {
        graph.track(path);
    }
    debug!("found {} root files", graph.len());

    let options = CompileOptions {
        source_map_inline: true,
        style: if settings.compressed {
            OutputStyle::Compressed
        } else {
            OutputStyle::Expanded
        },
    };
    let dispatcher = CompileDispatcher::new(
        Box::new(GrassCompiler::new()),
        options,
        settings.resolved_sources(&root),
        root.clone(),
    );

    // initial compile-all pass seeds the dependency graph
    let initial = graph.paths();
    dispatcher.dispatch(&mut graph, &initial);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let session = WatchSession::new(root, graph, dispatcher, cancel)?;
    session.run().await?;

    Ok(())
}
