//! Atelier CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run portal database migrations (includes the session store)
//! atl-cli migrate
//!
//! # Create a user
//! atl-cli user create -e studio@example.com -n "Ada" -r admin -p "a long password"
//! atl-cli user create -e client@example.com -n "Max" -r client --client-id 1 -p "..."
//!
//! # Seed demo data
//! atl-cli seed
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user create` - Create portal users
//! - `seed` - Seed the database with demo data

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "atl-cli")]
#[command(author, version, about = "Atelier CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage portal users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Seed the database with demo data
    Seed,
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Role (`admin`, `team`, `client`)
        #[arg(short, long, default_value = "team")]
        role: String,

        /// Client company id (required for client users)
        #[arg(long)]
        client_id: Option<i32>,

        /// Password
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                role,
                client_id,
                password,
            } => {
                let id = commands::user::create(&email, &name, &role, client_id, &password).await?;
                tracing::info!("Created user with id {id}");
            }
        },
        Commands::Seed => commands::seed::run().await?,
    }
    Ok(())
}
