//! authpair CLI - Command-line client
//!
//! Usage:
//!   authpair register --email <email> --password <password> --name <name>
//!   authpair login --email <email> --password <password>
//!   authpair profile
//!   authpair refresh
//!   authpair logout
//!
//! The access token is never written to disk, so every invocation starts
//! without one and authenticated calls go through the refresh path.

use anyhow::Context;
use authpair_client::{AuthClient, ClientError, FileRefreshTokenStore};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "authpair")]
#[command(about = "authpair token client")]
#[command(version)]
struct Cli {
    /// API base URL
    #[arg(long, global = true, env = "AUTHPAIR_URL", default_value = "http://localhost:3001")]
    url: String,

    /// Refresh token file (default: ~/.authpair/refresh_token)
    #[arg(long, global = true, env = "AUTHPAIR_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and start a session
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
    },
    /// Start a session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Show the current user
    Profile,
    /// Exchange the stored refresh token for a new access token
    Refresh,
    /// End the session
    Logout,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let token_file = cli
        .token_file
        .or_else(FileRefreshTokenStore::default_path)
        .context("No home directory; pass --token-file")?;
    let client = AuthClient::new(&cli.url, Arc::new(FileRefreshTokenStore::new(token_file)))?;

    let result = run(&client, cli.command).await;
    if let Err(ClientError::ReauthenticationRequired) = result {
        anyhow::bail!("Session expired or missing. Run `authpair login` first.");
    }
    result?;

    Ok(())
}

async fn run(client: &AuthClient, command: Commands) -> Result<(), ClientError> {
    match command {
        Commands::Register {
            email,
            password,
            name,
        } => {
            let session = client.register(&email, &password, &name).await?;
            println!("Registered {} ({})", session.user.email, session.user.id);
        }
        Commands::Login { email, password } => {
            let session = client.login(&email, &password).await?;
            println!("Logged in as {}", session.user.email);
        }
        Commands::Profile => {
            let profile = client.profile().await?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        Commands::Refresh => {
            let token = client.refresh_token().await?;
            println!("{token}");
        }
        Commands::Logout => {
            client.logout().await?;
            println!("Logged out");
        }
    }

    Ok(())
}
