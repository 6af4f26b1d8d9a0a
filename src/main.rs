//! Fixpoint CLI entry point.

use clap::Parser;

use fixpoint::cli::{handle_error, Cli, Commands};
use fixpoint::infrastructure::{logging, ConfigLoader};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ConfigLoader::load() {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };
    let _log_guard = match logging::init(&config.logging) {
        Ok(guard) => guard,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Submit {
            archive,
            language,
            max_iters,
        } => fixpoint::cli::commands::submit::execute(config, archive, language, max_iters, cli.json)
            .await,
        Commands::Run {
            workspace,
            max_iters,
        } => fixpoint::cli::commands::run::execute(config, workspace, max_iters, cli.json).await,
        Commands::Status { workspace } => {
            fixpoint::cli::commands::status::execute(config, workspace, cli.json).await
        }
        Commands::List { limit } => {
            fixpoint::cli::commands::list::execute(config, limit, cli.json).await
        }
        Commands::Serve { host, port } => {
            fixpoint::cli::commands::serve::execute(config, host, port).await
        }
        Commands::Eval { dataset } => {
            fixpoint::cli::commands::eval::execute(config, dataset, cli.json).await
        }
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
