use std::sync::Arc;

use clap::Parser;

use equiplend_backend::AppData;
use equiplend_backend::cli::{self, Cli, Commands};
use equiplend_backend::config::{
    DatabaseConnections, LoggingConfig, Settings, SystemEnvironment, init_logging,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let logging_config = LoggingConfig::from_env_provider(&SystemEnvironment);
    init_logging(&logging_config)?;

    let cli = Cli::parse();
    let settings = Settings::from_env()?;
    tracing::debug!("{:?}", settings);

    if let Commands::Migrate = cli.command {
        return cli::migrate::run_migrations(&settings).await;
    }

    let connections = DatabaseConnections::init(&settings).await?;
    connections.migrate().await?;
    tracing::info!("Database migrations completed");

    let app_data = Arc::new(AppData::init(connections, &settings)?);

    cli::execute_command(cli, app_data, &settings).await
}
