use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Parse CLI arguments first to get verbosity level
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let runtime = tokio::runtime::Runtime::new()?;
    match cli.command {
        Commands::Run(args) => {
            info!("Run command: {:?}", args);
            let succeeded = runtime.block_on(cli::commands::run::execute(args, cli.config))?;
            if !succeeded {
                std::process::exit(1);
            }
        }
        Commands::Reconcile(args) => {
            info!("Reconcile command: {:?}", args);
            runtime.block_on(cli::commands::reconcile::execute(args, cli.config))?;
        }
        Commands::Diagnose(args) => {
            info!("Diagnose command: {:?}", args);
            runtime.block_on(cli::commands::diagnose::execute(args, cli.config))?;
        }
    }

    Ok(())
}
