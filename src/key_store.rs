// Key persistence: a single file holding the user's relay key.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Result, TeleputError};

const KEY_FILE_NAME: &str = "key";

#[derive(Debug, Clone)]
pub struct KeyStore {
    path: PathBuf,
}

impl KeyStore {
    /// Key store backed by `<config_dir>/key`.
    pub fn new<P: AsRef<Path>>(config_dir: P) -> Self {
        KeyStore {
            path: config_dir.as_ref().join(KEY_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored key, or `None` when the file is missing or blank.
    pub fn load(&self) -> Result<Option<String>> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let key = data.trim();
        if key.is_empty() {
            return Ok(None);
        }
        Ok(Some(key.to_string()))
    }

    /// Overwrite the key file with the trimmed key, creating the directory
    /// on demand.
    pub fn save(&self, key: &str) -> Result<()> {
        let write_err = |source| TeleputError::KeyWrite {
            path: self.path.clone(),
            source,
        };
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(write_err)?;
        }
        fs::write(&self.path, key.trim()).map_err(write_err)?;
        log::info!("saved key to {}", self.path.display());
        Ok(())
    }
}
