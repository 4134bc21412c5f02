use clap::Parser;
use tracing::error;

use sasswatch::cli::commands::watch;
use sasswatch::cli::{Cli, Commands};
use sasswatch::logging::{self, Verbosity};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(Verbosity::from_flags(cli.verbose, cli.verbose_all));

    match cli.command {
        Commands::Watch {
            dir,
            include_globs,
            exclude_globs,
        } => {
            let args = watch::WatchArgs {
                dir,
                include_globs,
                exclude_globs,
            };
            // per-file failures are contained inside the loop; anything
            // landing here ended the watch. The process still exits 0.
            if let Err(e) = watch::run(args).await {
                error!("error in file watcher: {e:#}");
            }
        }
    }
}
