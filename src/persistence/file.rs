//! JSON-file backed store for native builds
//!
//! Writes go to `<save>.tmp` first; the previous save is rotated to
//! `<save>.bak` before the temp file replaces it. Loading falls back to the
//! backup when the main file is missing or corrupt. An unreadable main file
//! is moved aside (`<save>.corrupt`, or `<save>.v<N>` for a save from a newer
//! version) so it never replaces a good backup.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{Envelope, KeyValueStore};
use crate::error::StoreError;

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    dirty: bool,
    /// Move the current save to the backup on flush. Off while an unreadable
    /// save could not be moved aside.
    rotate: bool,
}

impl FileStore {
    /// Open the store at `path`. A missing file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match read_envelope(&path)? {
            Some(envelope) => envelope.entries,
            None => BTreeMap::new(),
        };
        Ok(Self {
            path,
            entries,
            dirty: false,
            rotate: true,
        })
    }

    /// Open the store, recovering from the backup or starting empty if the
    /// main save cannot be read.
    pub fn open_or_recover(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::open(&path) {
            Ok(store) => store,
            Err(e) => {
                log::warn!("{e}");
                let rotate = move_aside(&path, &e);
                let backup = backup_path_for(&path);
                let entries = match read_envelope(&backup) {
                    Ok(Some(envelope)) => {
                        log::info!("Recovered save data from {}", backup.display());
                        envelope.entries
                    }
                    Ok(None) => BTreeMap::new(),
                    Err(e) => {
                        log::warn!("Backup unusable, starting fresh: {e}");
                        BTreeMap::new()
                    }
                };
                Self {
                    path,
                    entries,
                    dirty: true,
                    rotate,
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.entries.get(key).map(String::as_str) != Some(value) {
            self.entries.insert(key.to_string(), value.to_string());
            self.dirty = true;
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.dirty = true;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }
        let json = serde_json::to_string_pretty(&Envelope::new(self.entries.clone()))?;
        write_rotating(&self.path, json.as_bytes(), self.rotate).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        self.dirty = false;
        self.rotate = true;
        Ok(())
    }
}

fn read_envelope(path: &Path) -> Result<Option<Envelope>, StoreError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let envelope: Envelope = serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;
    if envelope.version != Envelope::CURRENT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: envelope.version,
            expected: Envelope::CURRENT_VERSION,
        });
    }
    Ok(Some(envelope))
}

/// Rename an unreadable save out of the rotation. Returns false if it is
/// still in place, in which case the next flush must not rotate it.
fn move_aside(path: &Path, error: &StoreError) -> bool {
    if !path.exists() {
        return true;
    }
    let suffix = match error {
        StoreError::UnsupportedVersion { found, .. } => format!("v{found}"),
        _ => "corrupt".to_string(),
    };
    let target = sibling_path(path, &suffix);
    match fs::rename(path, &target) {
        Ok(()) => {
            log::warn!("Moved unreadable save to {}", target.display());
            true
        }
        Err(e) => {
            log::warn!("Could not move {} aside: {e}", path.display());
            false
        }
    }
}

fn write_rotating(path: &Path, bytes: &[u8], rotate: bool) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = sibling_path(path, "tmp");
    fs::write(&tmp_path, bytes)?;

    if rotate && path.exists() {
        let backup = backup_path_for(path);
        match fs::remove_file(&backup) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                let _ = fs::remove_file(&tmp_path);
                return Err(e);
            }
        }
        if let Err(e) = fs::rename(path, &backup) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
    }

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    Ok(())
}

fn backup_path_for(path: &Path) -> PathBuf {
    sibling_path(path, "bak")
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("save.json");
    let name = format!("{file_name}.{suffix}");
    match path.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}
