use std::process;

mod annotate;
mod check;
mod cli;
mod error;
mod exit_codes;

use clap::CommandFactory;
use cli::{Cli, Commands};
use exit_codes::EXIT_SUCCESS;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    // Fast path for help
    if cli.command.is_none() {
        Cli::command().print_help().expect("Failed to print help");
        process::exit(EXIT_SUCCESS);
    }

    use tracing::Level;

    let log_level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(log_level)
        .init();

    let exit_code = match cli.command {
        Some(Commands::Annotate {
            text,
            base_url,
            pattern,
            tooltips,
            fallback,
        }) => {
            tracing::debug!("running annotate command");
            run_annotate(
                annotate::AnnotateArgs {
                    text,
                    base_url,
                    pattern,
                    tooltips,
                    fallback,
                },
                cli.config.as_ref(),
            )
            .await
        }
        Some(Commands::Check { subcommand, format }) => {
            tracing::debug!("running check command");
            check::run_check_command(subcommand, format).await
        }
        None => {
            // handled early above
            unreachable!()
        }
    };

    process::exit(exit_code);
}

async fn run_annotate(
    args: annotate::AnnotateArgs,
    config_path: Option<&std::path::PathBuf>,
) -> i32 {
    use error::handle_cli_result;

    handle_cli_result(annotate::run_annotate_command(args, config_path).await)
}
