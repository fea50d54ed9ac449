use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde_json::Value;
use tempfile::NamedTempFile;

use crate::error::Result;
use crate::matrix::Dataset;

/// Where the matrix lives between requests.
///
/// Every operation reads or writes the whole dataset.
pub trait DataStore: Send + Sync {
    fn load(&self) -> Result<Dataset>;
    fn save(&self, dataset: &Dataset) -> Result<()>;

    /// The stored document as plain JSON, without requiring every element
    /// to be a well-formed row. This is what readers of the matrix get.
    fn load_document(&self) -> Result<Value> {
        Ok(serde_json::to_value(self.load()?)?)
    }
}

/// The matrix as a pretty-printed JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Option<BufReader<File>>> {
        match File::open(&self.path) {
            Ok(file) => Ok(Some(BufReader::new(file))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl DataStore for JsonFileStore {
    /// A missing file reads as an empty matrix.
    fn load(&self) -> Result<Dataset> {
        match self.open()? {
            Some(reader) => Ok(serde_json::from_reader(reader)?),
            None => Ok(Dataset::default()),
        }
    }

    fn load_document(&self) -> Result<Value> {
        match self.open()? {
            Some(reader) => Ok(serde_json::from_reader(reader)?),
            None => Ok(Value::Array(Vec::new())),
        }
    }

    /// Writes to a sibling temp file and renames it over the target.
    fn save(&self, dataset: &Dataset) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let temp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, dataset)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;

        Ok(())
    }
}

/// Keeps the matrix in memory. Useful for tests and for embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    dataset: Mutex<Dataset>,
}

impl MemoryStore {
    pub fn new(dataset: Dataset) -> Self {
        MemoryStore {
            dataset: Mutex::new(dataset),
        }
    }

    pub fn snapshot(&self) -> Dataset {
        self.dataset
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DataStore for MemoryStore {
    fn load(&self) -> Result<Dataset> {
        Ok(self.snapshot())
    }

    fn save(&self, dataset: &Dataset) -> Result<()> {
        let mut current = self.dataset.lock().unwrap_or_else(PoisonError::into_inner);
        *current = dataset.clone();
        Ok(())
    }
}
