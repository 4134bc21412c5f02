pub mod cli;
pub mod compiler;
pub mod config;
pub mod logging;
pub mod scanner;
pub mod utils;
pub mod watcher;

pub use compiler::{CompileError, CompileOptions, CompileOutput, Compiler, OutputStyle};
pub use config::{Settings, SourceTargetMapping};
pub use scanner::GlobScanner;
pub use watcher::{
    ChangeEvent, ChangeKind, CompileDispatcher, Debouncer, DependencyGraph, RootFile, WatchError,
    WatchSession,
};
