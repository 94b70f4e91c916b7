use super::{AttendanceStore, StoreError};
use crate::backup::{export_backup, restore_backup};
use crate::roster::Roster;
use chrono::Local;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Roster persisted as a single JSON document on disk.
///
/// With auto-backup enabled, the previous document is copied to
/// `<stem>.auto-backup.json` before each save and the copy time is written
/// to `<stem>.auto-backup-timestamp`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    auto_backup: bool,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            auto_backup: false,
        }
    }

    pub fn with_auto_backup(mut self, enabled: bool) -> Self {
        self.auto_backup = enabled;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn auto_backup_path(&self) -> PathBuf {
        self.sibling("auto-backup.json")
    }

    pub fn auto_backup_timestamp_path(&self) -> PathBuf {
        self.sibling("auto-backup-timestamp")
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attendance".to_string());
        self.path.with_file_name(format!("{stem}.{suffix}"))
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn write_auto_backup(&self) -> Result<(), StoreError> {
        let backup_path = self.auto_backup_path();
        match fs::copy(&self.path, &backup_path) {
            Ok(_) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(self.io_error(&backup_path, err)),
        }

        let stamp_path = self.auto_backup_timestamp_path();
        fs::write(&stamp_path, Local::now().to_rfc3339())
            .map_err(|err| self.io_error(&stamp_path, err))?;

        debug!(path = %backup_path.display(), "auto-backup written");
        Ok(())
    }
}

impl AttendanceStore for JsonFileStore {
    /// A missing file is an empty roster.
    fn load(&self) -> Result<Roster, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no data file yet; starting empty");
                return Ok(Roster::default());
            }
            Err(err) => return Err(self.io_error(&self.path, err)),
        };

        restore_backup(&raw).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, roster: &Roster) -> Result<(), StoreError> {
        let document = export_backup(roster)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.io_error(parent, err))?;
        }

        if self.auto_backup {
            self.write_auto_backup()?;
        }

        let staging = self.sibling("json.tmp");
        fs::write(&staging, document).map_err(|err| self.io_error(&staging, err))?;
        fs::rename(&staging, &self.path).map_err(|err| self.io_error(&self.path, err))?;

        info!(
            path = %self.path.display(),
            employees = roster.employees.len(),
            incidents = roster.incidents.len(),
            "roster saved"
        );
        Ok(())
    }
}
