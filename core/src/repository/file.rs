use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{TrackerError, TrackerResult};
use crate::repository::traits::KeyValueStore;

const DEFAULT_DIR_NAME: &str = ".kpss";

/// Keeps every key in its own `<key>.json` file under a data directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    pub fn new(base_dir: Option<PathBuf>) -> TrackerResult<Self> {
        let path = match base_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        fs::create_dir_all(&path)?;
        debug!(dir = %path.display(), "opened file store");
        Ok(FileStore { base_dir: path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", key))
    }
}

pub fn default_data_dir() -> TrackerResult<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| {
        TrackerError::Store(std::io::Error::new(
            ErrorKind::NotFound,
            "could not determine home directory",
        ))
    })?;
    Ok(home_dir.join(DEFAULT_DIR_NAME))
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> TrackerResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> TrackerResult<()> {
        let path = self.path_for(key);
        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(value.as_bytes())?;
        writer.flush()?;
        debug!(key, bytes = value.len(), "wrote store entry");
        Ok(())
    }
}
