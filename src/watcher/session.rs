//! The watch session: notify producers feeding an unbounded change
//! stream, drained by a single consumer loop.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, trace};

use crate::utils::display_relative;

use super::debouncer::Debouncer;
use super::dispatcher::CompileDispatcher;
use super::error::WatchError;
use super::event::ChangeEvent;
use super::graph::DependencyGraph;
use super::resolver;

/// Fixed pause after receiving a raw event, before evaluating it; absorbs
/// editors that emit several events per logical save.
pub const SETTLE_DELAY_MS: u64 = 100;

/// Owns the watch loop state: the dependency graph, the debounce table,
/// the dispatcher and the notify watcher feeding the stream.
///
/// The graph and the debounce table belong exclusively to this consumer;
/// the stream is the only resource shared with the producer threads.
pub struct WatchSession {
    root_dir: PathBuf,
    graph: DependencyGraph,
    debouncer: Debouncer,
    dispatcher: CompileDispatcher,
    events: mpsc::UnboundedReceiver<ChangeEvent>,
    cancel: CancellationToken,
    // Held for its side effect: dropping it stops event production.
    _watcher: RecommendedWatcher,
}

impl WatchSession {
    /// Start watching `root_dir` recursively.
    ///
    /// The graph is expected to be seeded by the initial scan and compile
    /// pass before the session takes it over.
    pub fn new(
        root_dir: PathBuf,
        graph: DependencyGraph,
        dispatcher: CompileDispatcher,
        cancel: CancellationToken,
    ) -> Result<Self, WatchError> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher =
            notify::recommended_watcher(move |res: notify::Result<notify::Event>| match res {
                Ok(event) => {
                    for change in ChangeEvent::from_notify(&event) {
                        // an unbounded send cannot block a producer; a
                        // closed stream means the session is shutting down
                        let _ = tx.send(change);
                    }
                }
                Err(e) => error!("file watch error: {e}"),
            })?;

        watcher
            .watch(&root_dir, RecursiveMode::Recursive)
            .map_err(|e| WatchError::PathWatchFailed {
                path: root_dir.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            root_dir,
            graph,
            debouncer: Debouncer::default(),
            dispatcher,
            events: rx,
            cancel,
            _watcher: watcher,
        })
    }

    /// Drain the change stream until cancellation closes it.
    ///
    /// Cancellation is observed only between events; an event already
    /// being processed always runs to completion. Per-file failures are
    /// contained by the dispatcher and never end the loop.
    pub async fn run(mut self) -> Result<(), WatchError> {
        info!("watching '{}'", self.root_dir.display());

        loop {
            let event = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                event = self.events.recv() => match event {
                    Some(event) => event,
                    // the producer only goes away on shutdown; a closed
                    // stream without cancellation is a fault
                    None if self.cancel.is_cancelled() => break,
                    None => return Err(WatchError::ChannelClosed),
                },
            };

            self.process(event).await;
        }

        info!("stopped watching '{}'", self.root_dir.display());
        Ok(())
    }

    async fn process(&mut self, event: ChangeEvent) {
        sleep(Duration::from_millis(SETTLE_DELAY_MS)).await;

        if !self.debouncer.admit(&event.path) {
            trace!("skipping duplicate event for {}", event.path.display());
            return;
        }

        info!("{} -> {}", event.kind.label(), self.rel(&event.path));

        let scheduled = resolver::resolve(&mut self.graph, &event);
        self.dispatcher.dispatch(&mut self.graph, &scheduled);
    }

    fn rel(&self, path: &Path) -> String {
        display_relative(path, &self.root_dir)
    }
}
