//! FreshFold CLI - catalog seeding and operations tools.
//!
//! # Usage
//!
//! ```bash
//! # Validate a catalog without touching the backend
//! ff-cli seed catalog.yaml --dry-run
//!
//! # Create the businesses and products in a catalog
//! ff-cli seed catalog.yaml
//!
//! # Check which businesses serve a postcode
//! ff-cli postcode CO1
//!
//! # List orders, optionally by status
//! ff-cli orders list --status pending
//!
//! # Move an order along
//! ff-cli orders set-status <order-id> completed
//!
//! # Confirm the configured admin credentials work
//! ff-cli whoami
//! ```
//!
//! # Commands
//!
//! - `seed` - Create businesses and products from a YAML catalog
//! - `postcode` - Run the postcode availability check
//! - `orders` - List orders and update their status
//! - `whoami` - Sign in and show the configured admin account

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use freshfold_core::OrderStatus;

mod commands;

#[derive(Parser)]
#[command(name = "ff-cli")]
#[command(author, version, about = "FreshFold CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed businesses and products from a YAML catalog
    Seed {
        /// Path to the catalog file
        file: PathBuf,

        /// Validate and summarize without creating anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Check whether a postcode is served
    Postcode {
        /// Postcode to check, e.g. CO1
        code: String,
    },
    /// Manage orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Sign in with the configured admin credentials and show the account
    Whoami,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List orders
    List {
        /// Only orders in this status (`pending`, `confirmed`, `processing`, `completed`, `cancelled`)
        #[arg(short, long)]
        status: Option<OrderStatus>,
    },
    /// Update an order's status
    SetStatus {
        /// Order id
        id: String,

        /// New status
        status: OrderStatus,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Seed { file, dry_run } => {
            let report = commands::seed::run(&file, dry_run).await?;
            if !report.failures.is_empty() {
                return Err(commands::CliError::Invalid(format!(
                    "{} item(s) failed to seed",
                    report.failures.len()
                )));
            }
        }
        Commands::Postcode { code } => {
            commands::postcode::check(&code).await?;
        }
        Commands::Whoami => {
            commands::account::whoami().await?;
        }
        Commands::Orders { action } => match action {
            OrdersAction::List { status } => {
                commands::orders::list(status).await?;
            }
            OrdersAction::SetStatus { id, status } => {
                commands::orders::set_status(&id, status).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_status_filter() {
        let cli = Cli::try_parse_from(["ff-cli", "orders", "list", "--status", "completed"])
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(
            cli.command,
            Commands::Orders {
                action: OrdersAction::List {
                    status: Some(OrderStatus::Completed)
                }
            }
        ));

        assert!(Cli::try_parse_from(["ff-cli", "orders", "set-status", "o1", "shipped"]).is_err());
    }
}
