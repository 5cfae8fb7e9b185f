//! treehouse CLI - Inventory and clean up git worktrees

mod cli;
mod colors;
mod commands;
mod interaction;
mod logging;
mod output;

use std::process::ExitCode;

use cli::Commands;
use commands::{DeleteArgs, ListArgs};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let config = match commands::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {:#}", e);
            return ExitCode::from(commands::CONFIG_EXIT_CODE as u8);
        }
    };

    let result = match cli.command {
        Some(Commands::List {
            dir,
            filter,
            status,
            no_github,
            watch,
            interval,
        }) => {
            let args = ListArgs {
                dir,
                filter,
                status,
                no_github,
                watch,
                interval,
            };
            commands::run_list(args, &config, cli.json, cli.quiet).await
        }
        Some(Commands::Delete {
            id,
            branch,
            delete_branch,
            dir,
            yes,
        }) => {
            let args = DeleteArgs {
                id,
                branch,
                delete_branch,
                dir,
                yes,
            };
            commands::run_delete(args, &config, cli.json, cli.quiet).await
        }
        Some(Commands::Github) => commands::run_github(&config, cli.json, cli.quiet).await,
        None => {
            // No subcommand - print version info
            if !cli.quiet {
                println!("treehouse v{}", env!("CARGO_PKG_VERSION"));
                println!("Use --help for usage information");
            }
            Ok(0)
        }
    };

    match result {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(1)
        }
    }
}
