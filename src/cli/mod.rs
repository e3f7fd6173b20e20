use anyhow::bail;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::server;

#[derive(Parser)]
#[command(name = "coffee-shop-api")]
#[command(about = "Coffee shop menu API - drinks behind permission-scoped bearer tokens")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides COFFEE_API_PORT)")]
        port: Option<u16>,
    },

    #[command(about = "Database maintenance")]
    Db {
        #[command(subcommand)]
        cmd: DbCommands,
    },
}

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Create the drink table if it does not exist")]
    Init,

    #[command(about = "Drop all drinks, recreate the table and seed the starter drink")]
    Reset {
        #[arg(long, help = "Confirm that every existing drink will be deleted")]
        yes: bool,
    },
}

pub async fn run(cli: Cli, mut config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            server::serve(config).await
        }
        Commands::Db { cmd } => {
            let pool = DatabaseManager::connect(&config.database).await?;
            match cmd {
                DbCommands::Init => {
                    DatabaseManager::ensure_schema(&pool).await?;
                    println!("drink table ready");
                }
                DbCommands::Reset { yes } => {
                    if !yes {
                        bail!("refusing to drop the drink table without --yes");
                    }
                    DatabaseManager::reset(&pool).await?;
                    println!("drink table reset");
                }
            }
            pool.close().await;
            Ok(())
        }
    }
}
