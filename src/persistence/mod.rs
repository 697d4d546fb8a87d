//! External stores for the chore and worker collections.
//!
//! A store reads and writes a whole collection at once; there is no partial
//! or incremental write. Concurrent processes sharing one store overwrite
//! each other's changes (last writer wins).

use crate::error::StoreResult;
use crate::worker::Worker;
use std::rc::Rc;

pub mod file;
pub mod memory;
pub mod record;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{JsonFileStore, export_chores_to_csv, write_chores_csv};
pub use memory::MemoryStore;
pub use record::ChoreRecord;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

pub trait ChoreStore {
    /// An absent or empty store yields an empty collection.
    fn load_chores(&self) -> StoreResult<Vec<ChoreRecord>>;
    /// Replaces the stored collection with `chores`.
    fn save_chores(&self, chores: &[ChoreRecord]) -> StoreResult<()>;
}

pub trait WorkerStore {
    fn load_workers(&self) -> StoreResult<Vec<Worker>>;
    fn save_workers(&self, workers: &[Worker]) -> StoreResult<()>;
}

impl<S: ChoreStore + ?Sized> ChoreStore for Rc<S> {
    fn load_chores(&self) -> StoreResult<Vec<ChoreRecord>> {
        (**self).load_chores()
    }

    fn save_chores(&self, chores: &[ChoreRecord]) -> StoreResult<()> {
        (**self).save_chores(chores)
    }
}

impl<S: WorkerStore + ?Sized> WorkerStore for Rc<S> {
    fn load_workers(&self) -> StoreResult<Vec<Worker>> {
        (**self).load_workers()
    }

    fn save_workers(&self, workers: &[Worker]) -> StoreResult<()> {
        (**self).save_workers(workers)
    }
}
