//! Help desk CLI - database migrations and account management.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! hd-cli migrate
//!
//! # Create an account with a role
//! hd-cli user create -e admin@example.com -n "Admin Name" -p 'correct horse' -r super_admin
//!
//! # Grant an extra role to an existing account
//! hd-cli user grant -e agent@example.com -r agent
//!
//! # Load demo departments, SLA policies, categories, rules and templates
//! hd-cli seed
//! ```
//!
//! Reads `HELPDESK_DATABASE_URL` (or `DATABASE_URL`) like the server does.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "hd-cli")]
#[command(author, version, about = "Help desk CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Insert demo reference data into empty tables
    Seed,
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new account
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Initial password (at least 8 characters)
        #[arg(short, long)]
        password: String,

        /// Role (`super_admin`, `agent`, `light_agent`, `viewer`)
        #[arg(short, long, default_value = "agent")]
        role: String,
    },
    /// Grant a role to an existing account
    Grant {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Role to add
        #[arg(short, long)]
        role: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let pool = commands::connect().await?;

    match cli.command {
        Commands::Migrate => commands::migrate::run(&pool).await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                password,
                role,
            } => {
                commands::user::create(&pool, &email, &name, &password, &role).await?;
            }
            UserAction::Grant { email, role } => {
                commands::user::grant(&pool, &email, &role).await?;
            }
        },
        Commands::Seed => {
            commands::seed::run(&pool).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_user_create_defaults_to_agent() {
        let cli = Cli::try_parse_from([
            "hd-cli", "user", "create", "-e", "a@example.com", "-n", "A", "-p", "password1",
        ])
        .unwrap();
        match cli.command {
            Commands::User {
                action: UserAction::Create { role, .. },
            } => assert_eq!(role, "agent"),
            _ => panic!("expected user create"),
        }
    }

    #[test]
    fn test_grant_requires_role() {
        assert!(Cli::try_parse_from(["hd-cli", "user", "grant", "-e", "a@example.com"]).is_err());
    }
}
