//! Iris MLOps - Main Entry Point

use clap::Parser;
use iris_mlops::cli::{cmd_promote, cmd_serve, cmd_train, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "iris_mlops=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train { data, experiment, store } => {
            cmd_train(data.as_ref(), &experiment, &store)?;
        }
        Commands::Promote { experiment, model, store, registry } => {
            cmd_promote(&experiment, &model, &store, &registry)?;
        }
        Commands::Serve { host, port, registry } => {
            cmd_serve(host, port, registry).await?;
        }
    }

    Ok(())
}
