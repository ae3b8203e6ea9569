use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Mode for the live config file and its backups.
pub const OWNER_READ_WRITE: u32 = 0o600;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to create backup {}: {source}", .path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to get file info for {}: {source}", .path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to save config {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("saved, but failed to restore permissions {:o} on {}: {source}", .mode, .path.display())]
    Permissions {
        path: PathBuf,
        mode: u32,
        #[source]
        source: std::io::Error,
    },
}

impl PersistError {
    /// True when the content reached disk and only the mode restore failed.
    pub fn is_permission_error(&self) -> bool {
        matches!(self, PersistError::Permissions { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub backup_path: PathBuf,
    pub bytes_written: usize,
    pub line_count: usize,
}

/// `<path>.backup.<pid>`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".backup.{}", std::process::id()));
    PathBuf::from(name)
}

/// Write `content` over the config file at `path`.
///
/// The current file is copied to [`backup_path`] first; if that fails the
/// file is left untouched. The content is written owner read/write only and
/// any broader original mode is put back afterwards.
pub async fn save(content: &str, path: &Path) -> Result<SaveReport, PersistError> {
    let backup = create_backup(path).await?;

    let original_mode = fs::metadata(path)
        .await
        .map(|metadata| permission_bits(&metadata))
        .map_err(|source| PersistError::Metadata {
            path: path.to_path_buf(),
            source,
        })?;

    write_restricted(path, content.as_bytes())
        .await
        .map_err(|source| PersistError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    log::info!("Saved {} bytes to {}", content.len(), path.display());

    restore_original_mode(path, original_mode).await?;

    Ok(SaveReport {
        backup_path: backup,
        bytes_written: content.len(),
        line_count: content.lines().count(),
    })
}

async fn create_backup(path: &Path) -> Result<PathBuf, PersistError> {
    let backup = backup_path(path);
    let backup_err = |source| PersistError::Backup {
        path: backup.clone(),
        source,
    };

    let original = fs::read(path).await.map_err(backup_err)?;
    write_restricted(&backup, &original)
        .await
        .map_err(backup_err)?;
    // A leftover backup from an earlier process keeps its old mode otherwise.
    set_mode(&backup, OWNER_READ_WRITE)
        .await
        .map_err(backup_err)?;

    log::info!("Created backup: {}", backup.display());
    Ok(backup)
}

async fn write_restricted(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(OWNER_READ_WRITE);

    let mut file = options.open(path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    Ok(())
}

#[cfg(unix)]
fn permission_bits(metadata: &std::fs::Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(metadata.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn permission_bits(_metadata: &std::fs::Metadata) -> Option<u32> {
    None
}

/// Put back a mode other than [`OWNER_READ_WRITE`] after the content write.
async fn restore_original_mode(path: &Path, original_mode: Option<u32>) -> Result<(), PersistError> {
    let Some(mode) = original_mode.filter(|mode| *mode != OWNER_READ_WRITE) else {
        return Ok(());
    };

    set_mode(path, mode).await.map_err(|source| {
        log::warn!(
            "Failed to restore mode {:o} on {}: {}",
            mode,
            path.display(),
            source
        );
        PersistError::Permissions {
            path: path.to_path_buf(),
            mode,
            source,
        }
    })
}

#[cfg(unix)]
async fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await
}

#[cfg(not(unix))]
async fn set_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}
