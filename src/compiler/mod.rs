//! The compiler boundary.
//!
//! The engine drives a style-to-CSS compiler through this seam and knows
//! nothing about its internals. Implementations report every file a
//! compile read, and name the offending file on failure, so a broken or
//! missing partial still becomes a watched dependency.

mod grass;

pub use self::grass::GrassCompiler;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Output style for compiled CSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStyle {
    #[default]
    Expanded,
    Compressed,
}

/// Compilation options, fixed for the process lifetime.
#[derive(Debug, Clone, Copy)]
pub struct CompileOptions {
    /// Embed the source map in the compiled output.
    pub source_map_inline: bool,
    pub style: OutputStyle,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            source_map_inline: true,
            style: OutputStyle::Expanded,
        }
    }
}

/// A successful compile: the CSS text and every file the compiler read.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub css: String,
    pub included_paths: Vec<PathBuf>,
}

/// Why a compile failed.
#[derive(Error, Debug)]
pub enum CompileError {
    /// The compiler rejected the input and identified the file at fault.
    #[error("compilation failed in '{}': {description}", .offending_file.display())]
    Compilation {
        offending_file: PathBuf,
        description: String,
        source_fragment: String,
    },

    /// The compiler failed without naming a file (unreadable source and
    /// similar conditions).
    #[error("compiler failure for '{}': {reason}", .path.display())]
    Internal { path: PathBuf, reason: String },
}

impl CompileError {
    pub fn offending_file(&self) -> Option<&Path> {
        match self {
            Self::Compilation { offending_file, .. } => Some(offending_file),
            Self::Internal { .. } => None,
        }
    }
}

/// The style-to-CSS compiler the engine drives.
pub trait Compiler: Send + Sync {
    fn compile(
        &self,
        path: &Path,
        options: &CompileOptions,
    ) -> Result<CompileOutput, CompileError>;
}
