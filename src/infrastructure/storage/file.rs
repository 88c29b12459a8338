#[cfg(test)]
#[path = "file_test.rs"]
mod tests;

use std::fs;
use std::io;
use std::path;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Storage;

/// Stores each key as its own file under `dir`. Writes go through a temporary
/// file and a rename so a crash never leaves a half written transcript.
pub struct FileStorage {
    pub dir: path::PathBuf,
}

impl Default for FileStorage {
    fn default() -> FileStorage {
        return FileStorage::new(path::PathBuf::from(Config::get(ConfigKey::DataDir)));
    }
}

impl FileStorage {
    pub fn new(dir: path::PathBuf) -> FileStorage {
        return FileStorage { dir };
    }

    fn get_file_path(&self, key: &str) -> path::PathBuf {
        return self.dir.join(key);
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        let tmp_path = self.dir.join(format!(".{key}.tmp"));
        fs::write(&tmp_path, value)?;
        fs::rename(tmp_path, self.get_file_path(key))?;

        return Ok(());
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let file_path = self.get_file_path(key);
        match fs::read_to_string(&file_path) {
            Ok(payload) => return Some(payload),
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!(error = ?err, path = ?file_path, "Failed to read from storage");
                return None;
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(err) = self.write(key, value) {
            tracing::warn!(error = ?err, key = key, "Failed to write to storage");
        }
    }

    fn remove(&self, key: &str) {
        let file_path = self.get_file_path(key);
        if !file_path.exists() {
            return;
        }

        if let Err(err) = fs::remove_file(&file_path) {
            tracing::warn!(error = ?err, path = ?file_path, "Failed to remove from storage");
        }
    }
}
