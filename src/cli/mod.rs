// CLI module for administrative operations requiring server access

pub mod migrate;
mod review;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::app_data::AppData;
use crate::config::Settings;
use crate::coordinators::AdminCoordinator;
use crate::types::internal::context::RequestContext;

/// Equipment lending CLI for administrative operations
#[derive(Parser)]
#[command(name = "equiplend")]
#[command(about = "Equipment lending access-control core CLI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run pending migrations on both databases
    Migrate,

    /// RuBAC approval window management
    #[command(subcommand)]
    ApprovalWindow(ApprovalWindowCommands),

    /// Security alert review
    #[command(subcommand)]
    Alerts(AlertCommands),

    /// Audit log review
    #[command(subcommand)]
    Audit(AuditCommands),
}

#[derive(Subcommand)]
pub enum ApprovalWindowCommands {
    /// Display the current approval window
    Show,

    /// Replace the approval window (hours 0-23, both inclusive)
    Set { start_hour: u32, end_hour: u32 },
}

#[derive(Subcommand)]
pub enum AlertCommands {
    /// List unresolved alerts, most severe first
    List {
        #[arg(long)]
        json: bool,
    },

    /// Mark an alert resolved
    Resolve { id: i64 },
}

#[derive(Subcommand)]
pub enum AuditCommands {
    /// Show the most recent audit entries
    Tail {
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: u64,

        #[arg(long)]
        json: bool,
    },
}

/// Build the request context CLI commands run under
///
/// Commands act as the admin named by `CLI_ADMIN_ID`; the account must exist.
async fn admin_context(
    app_data: &AppData,
    settings: &Settings,
    command_name: &str,
) -> Result<RequestContext, Box<dyn std::error::Error>> {
    let admin_id = settings
        .cli_admin_id()
        .ok_or("CLI_ADMIN_ID must be set to run administrative commands")?;
    let admin = app_data
        .user_store
        .get_user(&app_data.connections.lending, admin_id)
        .await?
        .ok_or_else(|| format!("CLI_ADMIN_ID {} does not match any user", admin_id))?;

    Ok(RequestContext::for_cli(command_name).with_identity(admin.identity()))
}

/// Execute CLI command
///
/// Routes the parsed CLI command to the appropriate handler function.
/// `Migrate` is handled before AppData exists and is rejected here.
pub async fn execute_command(
    cli: Cli,
    app_data: Arc<AppData>,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let coordinator = AdminCoordinator::new(app_data.clone());

    match cli.command {
        Commands::Migrate => {
            return Err("migrate runs before application startup".into());
        }
        Commands::ApprovalWindow(cmd) => {
            let ctx = admin_context(&app_data, settings, "approval_window").await?;
            match cmd {
                ApprovalWindowCommands::Show => {
                    let window = coordinator.get_approval_window(&ctx).await?;
                    println!(
                        "Approval window: {:02}:00 - {:02}:59",
                        window.start_hour, window.end_hour
                    );
                }
                ApprovalWindowCommands::Set {
                    start_hour,
                    end_hour,
                } => {
                    let window = coordinator
                        .set_approval_window(&ctx, start_hour, end_hour)
                        .await?;
                    println!(
                        "✅ Approval window set to {}-{}",
                        window.start_hour, window.end_hour
                    );
                }
            }
        }
        Commands::Alerts(cmd) => {
            let ctx = admin_context(&app_data, settings, "alerts").await?;
            match cmd {
                AlertCommands::List { json } => {
                    let alerts = coordinator.list_unresolved_alerts(&ctx).await?;
                    review::print_alerts(&alerts, json)?;
                }
                AlertCommands::Resolve { id } => {
                    let alert = coordinator.resolve_alert(&ctx, id).await?;
                    println!("✅ Resolved alert {} ({})", alert.id, alert.alert_type);
                }
            }
        }
        Commands::Audit(AuditCommands::Tail { limit, json }) => {
            let ctx = admin_context(&app_data, settings, "audit_tail").await?;
            let entries = coordinator.recent_audit_entries(&ctx, Some(limit)).await?;
            review::print_audit_entries(&entries, json)?;
        }
    }

    Ok(())
}
