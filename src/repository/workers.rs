use crate::error::{ChoreError, Result};
use crate::ids::WorkerId;
use crate::persistence::WorkerStore;
use crate::worker::Worker;
use tracing::{debug, warn};

/// Load-once collection of workers.
pub struct WorkerRepository {
    workers: Vec<Worker>,
    store: Box<dyn WorkerStore>,
}

impl WorkerRepository {
    pub fn load<S: WorkerStore + 'static>(store: S) -> Result<Self> {
        let workers = store.load_workers()?;
        debug!(count = workers.len(), "loaded workers");
        Ok(Self {
            workers,
            store: Box::new(store),
        })
    }

    /// Fails with `NotFound` unless exactly one worker carries `id`.
    pub fn get_by_id(&self, id: &WorkerId) -> Result<&Worker> {
        let mut matches = self.workers.iter().filter(|w| w.id() == id);
        match (matches.next(), matches.next()) {
            (Some(worker), None) => Ok(worker),
            (None, _) => Err(ChoreError::not_found("worker", id.as_str(), 0)),
            (Some(_), Some(_)) => {
                let count = self.workers.iter().filter(|w| w.id() == id).count();
                warn!(worker = %id, count, "duplicate worker id");
                Err(ChoreError::not_found("worker", id.as_str(), count))
            }
        }
    }

    /// Resolves a chore's worker reference, which may dangle.
    pub fn resolve(&self, id: &WorkerId) -> Option<&Worker> {
        self.get_by_id(id).ok()
    }

    pub fn get_all(&self) -> &[Worker] {
        &self.workers
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn save(&self) -> Result<()> {
        self.store.save_workers(&self.workers)?;
        debug!(count = self.workers.len(), "saved workers");
        Ok(())
    }
}
