//! # Command Line Interface
//!
//! `serve` runs the vault; `database` manages the SQLite schema.

use crate::config::{load_config, AppConfig, StorageBackendKind, StorageConfig};
use crate::observability::{init_logging, init_observability};
use crate::storage::{
    create_pool, list_applied_migrations, pending_migration_count, run_migrations, MigrationInfo,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(name = "deadswitch")]
#[command(about = "Dead man's switch secret vault")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path (YAML, TOML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Database URL override
    #[arg(long)]
    pub database_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the vault server
    Serve {
        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind to
        #[arg(short, long)]
        addr: Option<String>,
    },

    /// Database management commands
    Database {
        #[command(subcommand)]
        command: DatabaseCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum DatabaseCommands {
    /// Run pending migrations
    Migrate,

    /// Show applied migrations and whether any are pending
    Status,
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(url) = &cli.database_url {
        config.storage.database_url = url.clone();
    }

    match cli.command {
        Some(Commands::Database { command }) => {
            init_logging(&config.observability, cli.verbose)?;
            handle_database_command(command, &config.storage).await?;
        }
        Some(Commands::Serve { port, addr }) => {
            apply_serve_overrides(&mut config, port, addr);
            config.validate()?;
            init_observability(&config.observability, cli.verbose)?;
            crate::startup::run_server(config).await?;
        }
        None => {
            init_observability(&config.observability, cli.verbose)?;
            crate::startup::run_server(config).await?;
        }
    }

    Ok(())
}

fn apply_serve_overrides(config: &mut AppConfig, port: Option<u16>, addr: Option<String>) {
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(addr) = addr {
        config.server.host = addr;
    }
}

/// Handle database management commands
async fn handle_database_command(
    command: DatabaseCommands,
    config: &StorageConfig,
) -> anyhow::Result<()> {
    if config.backend != StorageBackendKind::Sqlite {
        anyhow::bail!("database commands need the sqlite storage backend");
    }

    // Migrations run explicitly below, never as a side effect of connecting
    let config = StorageConfig { auto_migrate: false, ..config.clone() };
    let pool = create_pool(&config).await?;

    match command {
        DatabaseCommands::Migrate => {
            println!("Running database migrations...");
            run_migrations(&pool).await?;
            println!("Migrations completed successfully!");
        }

        DatabaseCommands::Status => {
            let migrations = list_applied_migrations(&pool).await?;
            if migrations.is_empty() {
                println!("No migrations have been applied");
            } else {
                println!("Applied migrations:");
                print_migrations_table(&migrations);
            }

            let pending = pending_migration_count(&pool).await?;
            if pending > 0 {
                println!("{} pending migration(s)", pending);
                pool.close().await;
                process::exit(1);
            }
            println!("Database schema is up to date");
        }
    }

    pool.close().await;
    Ok(())
}

/// Print migrations in a formatted table
fn print_migrations_table(migrations: &[MigrationInfo]) {
    println!();
    println!("{:<15} {:<50} {:<25} {:<10}", "Version", "Description", "Applied On", "Time (ms)");
    println!("{}", "-".repeat(100));

    for migration in migrations {
        println!(
            "{:<15} {:<50} {:<25} {:<10}",
            migration.version,
            truncate_string(&migration.description, 48),
            migration.installed_on.format("%Y-%m-%d %H:%M:%S"),
            migration.execution_time
        );
    }
    println!();
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["deadswitch", "database", "status"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Database { command: DatabaseCommands::Status })
        ));
    }

    #[test]
    fn test_serve_flags_override_config() {
        let cli = Cli::try_parse_from([
            "deadswitch",
            "--database-url",
            "sqlite::memory:",
            "serve",
            "--port",
            "9999",
            "--addr",
            "0.0.0.0",
        ])
        .unwrap();
        assert_eq!(cli.database_url.as_deref(), Some("sqlite::memory:"));

        let Some(Commands::Serve { port, addr }) = cli.command else {
            panic!("expected serve command");
        };
        let mut config = AppConfig::default();
        apply_serve_overrides(&mut config, port, addr);
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["deadswitch", "-v"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.verbose);
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("this is a very long string", 10), "this is...");
    }
}
