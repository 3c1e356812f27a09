//! Command-line interface.
//!
//! Without a subcommand the binary serves the operator pages. Subcommands
//! work directly on the database file for maintenance from a terminal:
//! - `stats` - Show the dashboard counts and recent customers
//! - `backup` - Write a backup copy of the database
//! - `backups` - List backup files, newest first
//! - `restore <file>` - Replace the database with a backup
//! - `passwd` - Change the admin password
//! - `config check` - Validate configuration file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Password};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::CrmError;
use crate::service::Desk;

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "kaichuan-crm")]
#[command(author, version, about = "Customer management for coal trading", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "KAICHUAN_CONFIG", default_value = "kaichuan-crm.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Subcommand to run (if none, starts the server)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show customer counts and the most recent customers
    Stats,

    /// Write a timestamped backup copy of the database
    Backup,

    /// List backup files, newest first
    Backups,

    /// Replace the database with a backup file
    Restore {
        /// Backup file name, as shown by `backups`
        file: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Change the admin password
    Passwd,

    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Check,
}

impl Commands {
    /// Whether the command needs the database opened first
    pub fn needs_store(&self) -> bool {
        !matches!(self, Commands::Config(_))
    }
}

/// Run a CLI command against an opened desk
pub async fn run_command(cli: &Cli, config: &Config, desk: &Desk) -> Result<()> {
    match &cli.command {
        Some(Commands::Stats) => cmd_stats(desk).await,
        Some(Commands::Backup) => cmd_backup(desk).await,
        Some(Commands::Backups) => cmd_backups(desk).await,
        Some(Commands::Restore { file, yes }) => cmd_restore(desk, file, *yes).await,
        Some(Commands::Passwd) => cmd_passwd(config, desk).await,
        Some(Commands::Config(ConfigCommands::Check)) => cmd_config_check(&cli.config),
        None => {
            // No subcommand means start the server - this is handled in main.rs
            Ok(())
        }
    }
}

async fn cmd_stats(desk: &Desk) -> Result<()> {
    let summary = desk.dashboard().await?;

    println!();
    println!("=== Customer Overview ===");
    println!();
    println!("Total:      {}", summary.total);
    println!("Clean coal: {}", summary.clean_coal);
    println!("Middlings:  {}", summary.middlings);

    if summary.recent.is_empty() {
        println!();
        println!("No customers yet.");
        println!();
        return Ok(());
    }

    println!();
    println!("Recent customers:");
    println!(
        "  {:<6}  {:<24}  {:<12}  {:<12}  {:<6}  {:<10}",
        "ID", "COMPANY", "CONTACT", "PHONE", "TYPE", "REGISTERED"
    );
    println!("  {}", "-".repeat(84));
    for customer in &summary.recent {
        println!(
            "  {:<6}  {:<24}  {:<12}  {:<12}  {:<6}  {:<10}",
            customer.id,
            truncate(&customer.company_name, 24),
            truncate(&customer.contact_name, 12),
            customer.phone,
            customer.customer_type,
            customer.registration_date
        );
    }
    println!();
    Ok(())
}

async fn cmd_backup(desk: &Desk) -> Result<()> {
    let path = desk.backup().await.context("Backup failed")?;
    println!("[OK] Database backed up to {}", path.display());
    Ok(())
}

async fn cmd_backups(desk: &Desk) -> Result<()> {
    let backups = desk.list_backups().await?;
    if backups.is_empty() {
        println!(
            "No backup files found in {}",
            desk.backups().backup_dir().display()
        );
        return Ok(());
    }

    for name in backups {
        println!("{}", name);
    }
    Ok(())
}

async fn cmd_restore(desk: &Desk, file: &str, yes: bool) -> Result<()> {
    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Restoring {} overwrites the current data. Continue?",
                file
            ))
            .default(false)
            .interact()
            .context("Failed to get user input")?;
        if !confirmed {
            println!("Restore cancelled.");
            return Ok(());
        }
    }

    match desk.restore(file).await {
        Ok(()) => {
            println!("[OK] Database restored from {}", file);
            Ok(())
        }
        Err(CrmError::NoBackups) => anyhow::bail!(
            "No backup files found in {}",
            desk.backups().backup_dir().display()
        ),
        Err(e) => Err(e).context("Restore failed"),
    }
}

async fn cmd_passwd(config: &Config, desk: &Desk) -> Result<()> {
    let username = &config.auth.admin_username;
    println!("Changing password for {}", username);

    let current = prompt_password("Current password")?;
    let session = match desk.login(username, &current).await {
        Ok(session) => session,
        Err(CrmError::InvalidCredentials) => anyhow::bail!("Current password is incorrect"),
        Err(e) => return Err(e.into()),
    };

    let new = prompt_password("New password")?;
    let confirm = prompt_password("Repeat new password")?;
    desk.change_password(&session, &current, &new, &confirm)
        .await
        .context("Password not changed")?;

    println!("[OK] Password updated");
    Ok(())
}

fn prompt_password(prompt: &str) -> Result<String> {
    Password::new()
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()
        .context("Failed to get user input")
}

/// Validate configuration file
pub fn cmd_config_check(config_path: &Path) -> Result<()> {
    println!("Checking configuration file: {}", config_path.display());
    println!();

    let found = config_path.exists();
    if !found {
        println!(
            "[!!] Configuration file not found: {}",
            config_path.display()
        );
        println!();
        println!("A default configuration will be used when starting the server.");
        println!();
    }

    match load_checked(config_path) {
        Ok(config) => {
            if found {
                println!("[OK] Configuration file is valid!");
            } else {
                println!("[OK] Default configuration is valid!");
            }
            println!();
            println!("=== Configuration Summary ===");
            println!();
            println!("Server:");
            println!("  Listen:       http://{}", config.listen_addr());
            println!("  Data Dir:     {}", config.server.data_dir.display());
            println!(
                "  Open Browser: {}",
                if config.server.open_browser {
                    "Enabled"
                } else {
                    "Disabled"
                }
            );
            println!();
            println!("Database:");
            println!("  File:         {}", config.database_path().display());
            println!("  Backups:      {}", config.backup_dir().display());
            println!();
            println!("Auth:");
            println!("  Admin:        {}", config.auth.admin_username);
            println!();

            if config.auth.admin_password == Config::default().auth.admin_password {
                println!("Warnings:");
                println!("  [!] auth.admin_password is the default; change it after first login");
                println!();
            }
            Ok(())
        }
        Err(e) => {
            println!("[!!] Configuration file is invalid!");
            println!();
            println!("Error: {:#}", e);
            println!();
            println!("Please check the configuration file syntax and try again.");
            anyhow::bail!("Invalid configuration file");
        }
    }
}

/// Load the configuration (defaults when the file is absent) and validate it
fn load_checked(config_path: &Path) -> Result<Config> {
    let config = Config::load(config_path)?;
    config.validate()?;
    Ok(config)
}

/// Truncate a string to max characters with ellipsis
fn truncate(s: &str, max_len: usize) -> String {
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
    use crate::db::{CustomerInput, CustomerType};
    use crate::service::testing::temp_desk;
    use std::io::Write;

    #[test]
    fn test_parse_commands() {
        let cli = Cli::parse_from(["kaichuan-crm"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("kaichuan-crm.toml"));

        let cli = Cli::parse_from(["kaichuan-crm", "restore", "a.db", "--yes"]);
        match cli.command {
            Some(Commands::Restore { file, yes }) => {
                assert_eq!(file, "a.db");
                assert!(yes);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::parse_from(["kaichuan-crm", "-c", "other.toml", "config", "check"]);
        assert!(!cli.command.as_ref().unwrap().needs_store());
        assert_eq!(cli.config, PathBuf::from("other.toml"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("凯川矿业有限责任公司", 6), "凯川矿...");
    }

    #[test]
    fn test_config_check() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(cmd_config_check(&missing).is_ok());
        let defaults = load_checked(&missing).unwrap();
        assert_eq!(
            defaults.database_path(),
            PathBuf::from("./data").join("customer_data.db")
        );

        let path = dir.path().join("bad.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[server]\nport = 0").unwrap();
        assert!(cmd_config_check(&path).is_err());
    }

    #[tokio::test]
    async fn test_backup_and_restore_commands() {
        let (_dir, desk) = temp_desk().await;
        let config = Config::default();
        desk.add_customer(&CustomerInput::new(
            "Kept",
            "联系人",
            "13800138000",
            CustomerType::CleanCoal,
            "",
        ))
        .await
        .unwrap();

        let backup = Cli::parse_from(["kaichuan-crm", "backup"]);
        run_command(&backup, &config, &desk).await.unwrap();
        let stats = Cli::parse_from(["kaichuan-crm", "stats"]);
        run_command(&stats, &config, &desk).await.unwrap();
        let name = desk.list_backups().await.unwrap().remove(0);

        let restore = Cli::parse_from(["kaichuan-crm", "restore", name.as_str(), "--yes"]);
        run_command(&restore, &config, &desk).await.unwrap();

        let missing = Cli::parse_from(["kaichuan-crm", "restore", "nope.db", "-y"]);
        assert!(run_command(&missing, &config, &desk).await.is_err());
    }
}
