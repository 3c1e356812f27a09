//! Database backup and restore
//!
//! Backups are consistent snapshots taken by SQLite itself (`VACUUM INTO`),
//! written next to the live file as `customer_data_backup_YYYYMMDD_HHMMSS.db`.
//! A restore swaps the live file for one of those copies and always leaves the
//! store with an open connection, even when the swap fails halfway.

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{error, info, warn};

use crate::db::Store;
use crate::error::{CrmError, CrmResult};

pub const BACKUP_PREFIX: &str = "customer_data_backup_";
pub const BACKUP_EXTENSION: &str = "db";

#[derive(Clone)]
pub struct BackupManager {
    store: Store,
    backup_dir: PathBuf,
}

impl BackupManager {
    pub fn new(store: Store, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            backup_dir: backup_dir.into(),
        }
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Snapshot the live database into a new timestamped file
    pub async fn backup(&self) -> CrmResult<PathBuf> {
        tokio::fs::create_dir_all(&self.backup_dir).await?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let file_name = format!("{BACKUP_PREFIX}{timestamp}.{BACKUP_EXTENSION}");
        let backup_path = self.backup_dir.join(&file_name);

        // VACUUM INTO refuses an existing target; a second backup in the same second replaces the first
        remove_if_exists(&backup_path).await?;

        sqlx::query("VACUUM INTO ?")
            .bind(backup_path.to_string_lossy().into_owned())
            .execute(&*self.store.pool())
            .await?;

        info!(path = %backup_path.display(), "Database backup created");
        Ok(backup_path)
    }

    /// Backup file names, newest first
    pub async fn list(&self) -> CrmResult<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.backup_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(&format!(".{BACKUP_EXTENSION}")) {
                names.push(name);
            }
        }

        names.sort_unstable_by(|a, b| b.cmp(a));
        Ok(names)
    }

    /// Replace the live database with the named backup.
    ///
    /// The connection is reopened whether or not the copy succeeded; the
    /// first error encountered is returned.
    pub async fn restore(&self, file_name: &str) -> CrmResult<()> {
        let source = self.resolve(file_name).await?;

        info!(backup = %file_name, "Restoring database");
        self.store.close().await;

        let replaced = replace_file(&source, self.store.path()).await;
        if let Err(e) = &replaced {
            error!(backup = %file_name, error = %e, "Database restore failed");
        }

        let reopened = self.store.reopen().await;
        if let Err(e) = &reopened {
            error!(error = %e, "Failed to reopen database after restore");
        }

        replaced?;
        reopened?;
        info!(backup = %file_name, "Database restored");
        Ok(())
    }

    /// Path of an existing backup. Anything that is not a bare file name in the
    /// backup directory is reported as not found.
    async fn resolve(&self, file_name: &str) -> CrmResult<PathBuf> {
        let file_name = file_name.trim();
        if file_name.is_empty()
            || file_name == ".."
            || file_name.contains(['/', '\\'])
        {
            warn!(backup = %file_name, "Rejected backup file name");
            return Err(CrmError::BackupNotFound(file_name.to_string()));
        }

        if !tokio::fs::try_exists(&self.backup_dir).await.unwrap_or(false) {
            return Err(CrmError::NoBackups);
        }

        let path = self.backup_dir.join(file_name);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            _ => Err(CrmError::BackupNotFound(file_name.to_string())),
        }
    }
}

async fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

async fn replace_file(source: &Path, live: &Path) -> std::io::Result<()> {
    remove_if_exists(live).await?;
    tokio::fs::copy(source, live).await?;
    Ok(())
}
