mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::config::Presentation;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "aseko", &mut std::io::stdout());
            Ok(())
        }

        // Config commands don't need a resolved key
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global).await,

        cmd => {
            let cfg = config::load_config()?;
            let view = Presentation::resolve(&cli.global, &cfg);
            let coordinator_config = config::coordinator_config(&cli.global, &cfg)?;

            tracing::debug!(command = ?cmd, base_url = %coordinator_config.base_url, "dispatching command");
            commands::dispatch(cmd, coordinator_config, &cfg, view).await
        }
    }
}
