use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sea_orm_migration::MigratorTrait;
use shopfront_api::{
    db::{self, DbConfig},
    migrator::Migrator,
    services::users::UserService,
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "migration", about = "Schema migrations and bootstrap tasks", version)]
struct Cli {
    /// Database URL; falls back to APP__DATABASE_URL, then DATABASE_URL
    #[arg(long, global = true)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations
    Up {
        #[arg(long)]
        steps: Option<u32>,
    },
    /// Roll back applied migrations (one by default)
    Down {
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// Show applied and pending migrations
    Status,
    /// Drop every table and re-apply all migrations
    Fresh,
    /// Create an admin account, or promote an existing one
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

fn resolve_database_url(flag: Option<String>) -> String {
    flag.or_else(|| std::env::var("APP__DATABASE_URL").ok())
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite://shopfront.db?mode=rwc".to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();
    let url = resolve_database_url(cli.database_url);
    info!("Connecting to database");

    let db = db::establish_connection_with_config(&DbConfig {
        url,
        max_connections: 2,
        ..Default::default()
    })
    .await
    .context("failed to connect to database")?;

    match cli.command {
        Commands::Up { steps } => {
            Migrator::up(&db, steps).await?;
            info!("Migrations applied");
        }
        Commands::Down { steps } => {
            Migrator::down(&db, Some(steps)).await?;
            info!(steps, "Migrations rolled back");
        }
        Commands::Status => Migrator::status(&db).await?,
        Commands::Fresh => {
            Migrator::fresh(&db).await?;
            info!("Schema recreated");
        }
        Commands::CreateAdmin { email, password } => {
            Migrator::up(&db, None).await?;
            let users = UserService::new(Arc::new(db));
            let admin = users
                .ensure_admin(&email, &password)
                .await
                .context("failed to create admin account")?;
            info!(user_id = %admin.id, email = %admin.email, "Admin account ready");
        }
    }

    Ok(())
}
