use super::{ChoreRecord, ChoreStore, WorkerStore};
use crate::error::{StoreError, StoreResult};
use crate::worker::Worker;
use std::cell::{Cell, RefCell};

/// In-process store. Counts writes and can be told to fail them, which
/// makes write-through behaviour observable.
#[derive(Debug)]
pub struct MemoryStore<T> {
    items: RefCell<Vec<T>>,
    saves: Cell<usize>,
    fail_saves: Cell<bool>,
}

impl<T: Clone> MemoryStore<T> {
    pub fn new() -> Self {
        Self::with_items(Vec::new())
    }

    pub fn with_items(items: Vec<T>) -> Self {
        Self {
            items: RefCell::new(items),
            saves: Cell::new(0),
            fail_saves: Cell::new(false),
        }
    }

    pub fn items(&self) -> Vec<T> {
        self.items.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }

    fn replace(&self, items: &[T]) -> StoreResult<()> {
        if self.fail_saves.get() {
            return Err(StoreError::Io(std::io::Error::other("memory store refused write")));
        }
        *self.items.borrow_mut() = items.to_vec();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

impl<T: Clone> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl ChoreStore for MemoryStore<ChoreRecord> {
    fn load_chores(&self) -> StoreResult<Vec<ChoreRecord>> {
        Ok(self.items())
    }

    fn save_chores(&self, chores: &[ChoreRecord]) -> StoreResult<()> {
        self.replace(chores)
    }
}

impl WorkerStore for MemoryStore<Worker> {
    fn load_workers(&self) -> StoreResult<Vec<Worker>> {
        Ok(self.items())
    }

    fn save_workers(&self, workers: &[Worker]) -> StoreResult<()> {
        self.replace(workers)
    }
}
