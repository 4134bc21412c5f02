//! CLI argument parsing using clap.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

use crate::scanner::{DEFAULT_EXCLUDE_GLOBS, DEFAULT_INCLUDE_GLOBS};

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Incremental Sass/SCSS watcher and recompiler
#[derive(Parser)]
#[command(
    name = "sasswatch",
    version = env!("CARGO_PKG_VERSION"),
    about = "Watch a directory tree and incrementally recompile Sass/SCSS files",
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// Verbose logging
    #[arg(short = 'v', global = true)]
    pub verbose: bool,

    /// Verbose logging, host internals included
    #[arg(long = "vv", global = true)]
    pub verbose_all: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Watch a directory and recompile on change
    Watch {
        /// Directory to watch
        #[arg(value_name = "DIR", default_value = ".")]
        dir: PathBuf,

        /// Glob patterns selecting compilable root files
        #[arg(
            long = "include-globs",
            value_name = "GLOB",
            num_args = 1..,
            default_values_t = DEFAULT_INCLUDE_GLOBS.iter().map(|s| s.to_string())
        )]
        include_globs: Vec<String>,

        /// Glob patterns excluding files from the scan
        #[arg(
            long = "exclude-globs",
            value_name = "GLOB",
            num_args = 1..,
            default_values_t = DEFAULT_EXCLUDE_GLOBS.iter().map(|s| s.to_string())
        )]
        exclude_globs: Vec<String>,
    },
}
