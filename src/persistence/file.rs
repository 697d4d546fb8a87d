use super::{ChoreRecord, ChoreStore, WorkerStore};
use crate::chore::ChoreHandle;
use crate::error::StoreResult;
use crate::worker::Worker;
use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A collection stored as one pretty-printed JSON array in a file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/<name>.json`
    pub fn in_dir<P: AsRef<Path>>(dir: P, name: &str) -> Self {
        Self::new(dir.as_ref().join(format!("{name}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all<T: DeserializeOwned>(&self) -> StoreResult<Vec<T>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "store file absent, starting empty");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Writes a sibling temp file and renames it over the target, so a
    /// failed write leaves the previous contents in place.
    fn write_all<T: Serialize>(&self, items: &[T]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        {
            let file = File::create(&tmp)?;
            let mut writer = io::BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, items)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ChoreStore for JsonFileStore {
    fn load_chores(&self) -> StoreResult<Vec<ChoreRecord>> {
        self.read_all()
    }

    fn save_chores(&self, chores: &[ChoreRecord]) -> StoreResult<()> {
        self.write_all(chores)
    }
}

impl WorkerStore for JsonFileStore {
    fn load_workers(&self) -> StoreResult<Vec<Worker>> {
        self.read_all()
    }

    fn save_workers(&self, workers: &[Worker]) -> StoreResult<()> {
        self.write_all(workers)
    }
}

#[derive(Default, Serialize)]
struct ChoreCsvRow {
    id: String,
    date: String,
    name: String,
    description: String,
    comment: String,
    worker: String,
    state: String,
    value: String,
    locked: bool,
    completed: String,
    last_modified: String,
}

impl From<&ChoreHandle> for ChoreCsvRow {
    fn from(handle: &ChoreHandle) -> Self {
        let chore = handle.borrow();
        Self {
            id: chore.id().to_string(),
            date: chore.date().format("%Y-%m-%d").to_string(),
            name: chore.name().to_string(),
            description: chore.description().to_string(),
            comment: chore.comment().to_string(),
            worker: chore.worker().map(|w| w.to_string()).unwrap_or_default(),
            state: chore.state().as_str().to_string(),
            value: chore.value().map(|v| v.to_string()).unwrap_or_default(),
            locked: chore.is_locked(),
            completed: format_timestamp(chore.completed()),
            last_modified: format_timestamp(Some(chore.last_modified())),
        }
    }
}

/// One CSV row per chore, in the order given.
pub fn write_chores_csv<W: Write>(chores: &[ChoreHandle], writer: W) -> StoreResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for chore in chores {
        writer.serialize(ChoreCsvRow::from(chore))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_chores_to_csv<P: AsRef<Path>>(chores: &[ChoreHandle], path: P) -> StoreResult<()> {
    let file = File::create(path)?;
    write_chores_csv(chores, file)
}

fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|ts| ts.to_rfc3339()).unwrap_or_default()
}
