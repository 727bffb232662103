mod config;
mod directory;
mod graphql;
mod http;
mod seed;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use platform_db::{DatabaseSettings, DbPool, connect};
use platform_obs::{ObsConfig, init_tracing};
use products_hr::{export, filter::EmployeeFilter};
use tracing::info;

use crate::{
    config::{AppConfig, Backend},
    directory::Directory,
    http::{AppState, ServeConfig},
};

#[derive(Parser, Debug)]
#[command(name = "directory-server", version, about = "Employee directory server")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP + GraphQL server.
    Serve(ServeCommand),
    /// Run database migrations.
    #[command(subcommand)]
    Migrate(MigrateCommand),
    /// Insert demo departments and employees into an empty database.
    Seed,
    /// Print the GraphQL schema snapshot.
    #[command(name = "schema:print")]
    SchemaPrint {
        #[arg(long, value_name = "FILE", help = "Destination file path")]
        output: Option<PathBuf>,
    },
    /// Write the (optionally filtered) employee list as CSV.
    Export(ExportCommand),
    /// Print every employee as JSON.
    Dump {
        #[arg(long, help = "Use storage field names (first_name_c, ...)")]
        storage: bool,
    },
}

#[derive(Subcommand, Debug)]
enum MigrateCommand {
    /// Apply pending migrations.
    Up,
    /// Rollback the most recent migration.
    Down,
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, default_value = "0.0.0.0")]
    host: std::net::IpAddr,
    #[arg(long, default_value_t = 8080)]
    port: u16,
    #[arg(long, help = "Allow starting even when migrations are pending")]
    allow_dirty: bool,
}

impl From<&ServeCommand> for ServeConfig {
    fn from(value: &ServeCommand) -> Self {
        ServeConfig::new(value.host, value.port)
    }
}

#[derive(Args, Debug)]
struct ExportCommand {
    #[arg(long, value_name = "DIR", default_value = ".")]
    dir: PathBuf,
    #[arg(long, help = "Free-text search over name, email and role")]
    q: Option<String>,
    #[arg(long)]
    department: Option<String>,
    #[arg(long)]
    role: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(ObsConfig::from_env())?;
    let cli = Cli::parse();
    let app_config = Arc::new(AppConfig::load()?);
    match cli.command {
        Command::Serve(cmd) => run_server(cmd, app_config).await,
        Command::Migrate(action) => match action {
            MigrateCommand::Up => migrate_up().await,
            MigrateCommand::Down => migrate_down().await,
        },
        Command::Seed => run_seed().await,
        Command::SchemaPrint { output } => schema_print(output),
        Command::Export(cmd) => run_export(cmd, &app_config).await,
        Command::Dump { storage } => run_dump(storage, &app_config).await,
    }
}

async fn run_seed() -> Result<()> {
    let pool = setup_pool().await?;
    ensure_migrations(&pool, false).await?;
    let report = seed::seed_if_empty(&Directory::database(pool)).await?;
    if report.is_empty() {
        info!("nothing seeded");
    }
    Ok(())
}

fn schema_print(path: Option<PathBuf>) -> Result<()> {
    let sdl = graphql::build_schema(Directory::in_memory(Default::default())).sdl();
    match path {
        Some(target) => {
            std::fs::write(&target, sdl)
                .with_context(|| format!("failed to write {}", target.display()))?;
            info!(path = %target.display(), "schema snapshot written");
        }
        None => println!("{sdl}"),
    }
    Ok(())
}

async fn run_export(cmd: ExportCommand, config: &AppConfig) -> Result<()> {
    let (directory, _pool) = open_directory(config, false).await?;
    let filter = EmployeeFilter {
        query: cmd.q,
        department: cmd.department,
        role: cmd.role,
    };
    let employees = directory.filtered_employees(&filter).await?;
    let csv = export::export_employees(&employees, Utc::now().date_naive())?;
    let target = write_export(&cmd.dir, &csv.filename, &csv.content)?;
    info!(rows = employees.len(), path = %target.display(), "employee export written");
    Ok(())
}

fn write_export(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let target = dir.join(filename);
    std::fs::write(&target, content)
        .with_context(|| format!("failed to write {}", target.display()))?;
    Ok(target)
}

async fn run_dump(storage: bool, config: &AppConfig) -> Result<()> {
    let (directory, _pool) = open_directory(config, false).await?;
    let employees = directory.employees.get_all().await?;
    let json = if storage {
        let shapes: Vec<_> = employees.iter().map(|e| e.storage_shape()).collect();
        serde_json::to_string_pretty(&shapes)?
    } else {
        serde_json::to_string_pretty(&employees)?
    };
    println!("{json}");
    Ok(())
}

async fn setup_pool() -> Result<DbPool> {
    let settings = DatabaseSettings::from_env();
    connect(&settings).await.map_err(Into::into)
}

/// Builds the services for the configured backend. The memory backend is
/// seeded with demo data when enabled.
async fn open_directory(config: &AppConfig, allow_dirty: bool) -> Result<(Directory, Option<DbPool>)> {
    match config.backend {
        Backend::Memory => {
            let directory = Directory::in_memory(config.simulated_latency);
            if config.seed_demo_data {
                seed::seed_if_empty(&directory).await?;
            }
            Ok((directory, None))
        }
        Backend::Database => {
            let pool = setup_pool().await?;
            ensure_migrations(&pool, allow_dirty).await?;
            Ok((Directory::database(pool.clone()), Some(pool)))
        }
    }
}

async fn run_server(cmd: ServeCommand, config: Arc<AppConfig>) -> Result<()> {
    let (directory, pool) = open_directory(&config, cmd.allow_dirty).await?;
    info!(backend = config.backend.as_str(), "directory ready");
    let schema = graphql::build_schema(directory.clone());
    let state = AppState {
        schema,
        directory,
        config: config.clone(),
        pool,
    };
    http::serve((&cmd).into(), state).await
}

async fn ensure_migrations(pool: &DbPool, allow_dirty: bool) -> Result<()> {
    let pending = Migrator::get_pending_migrations(pool).await?;
    if !pending.is_empty() && !allow_dirty {
        anyhow::bail!(
            "pending migrations detected; run `directory-server migrate up` or pass --allow-dirty"
        );
    }
    Ok(())
}

async fn migrate_up() -> Result<()> {
    let pool = setup_pool().await?;
    Migrator::up(&pool, None).await?;
    info!("database migrations applied");
    Ok(())
}

async fn migrate_down() -> Result<()> {
    let pool = setup_pool().await?;
    Migrator::down(&pool, Some(1)).await?;
    info!("most recent migration rolled back");
    Ok(())
}
