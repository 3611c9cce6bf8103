use crate::config::{DatabaseConnections, Settings};

/// Run database migrations for the lending and audit databases
///
/// Connects to both databases and runs all pending migrations without
/// building the full AppData structure.
pub async fn run_migrations(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Running database migrations...");

    let connections = DatabaseConnections::init(settings).await?;
    connections.migrate().await?;

    tracing::info!("All migrations completed successfully");
    println!("✅ Lending and audit databases are up to date");
    Ok(())
}
