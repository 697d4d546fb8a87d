use crate::error::{ChoreError, Result, StoreResult};
use crate::ids::{ChoreId, WorkerId};
use crate::state::ChoreState;
use crate::worker::Worker;
use chrono::{DateTime, NaiveDate, Utc};
use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, warn};

/// Callback fired after a successful chore mutation. Returning an error
/// (typically a failed store write) is reported to whoever made the change.
pub type ChoreObserver = Rc<dyn Fn(&Chore) -> StoreResult<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub(crate) struct Observers {
    next_id: u64,
    entries: Vec<(SubscriptionId, ChoreObserver)>,
}

impl Observers {
    fn subscribe(&mut self, observer: ChoreObserver) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.entries.push((id, observer));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    fn unsubscribe_observer(&mut self, observer: &ChoreObserver) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(_, entry)| !Rc::ptr_eq(entry, observer));
        self.entries.len() != before
    }

    /// Registration order is invocation order.
    fn snapshot(&self) -> Vec<ChoreObserver> {
        self.entries.iter().map(|(_, obs)| Rc::clone(obs)).collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.entries.len())
            .finish()
    }
}

/// A single day's instance of a household task.
#[derive(Debug)]
pub struct Chore {
    pub(crate) id: ChoreId,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) comment: String,
    pub(crate) date: NaiveDate,
    pub(crate) last_modified: DateTime<Utc>,
    pub(crate) completed: Option<DateTime<Utc>>,
    pub(crate) worker: Option<WorkerId>,
    pub(crate) state: ChoreState,
    pub(crate) value: Option<f64>,
    pub(crate) locked: bool,
    pub(crate) observers: Observers,
}

impl Chore {
    pub fn new(
        id: ChoreId,
        name: impl Into<String>,
        description: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            comment: String::new(),
            date,
            last_modified: Utc::now(),
            completed: None,
            worker: None,
            state: ChoreState::Blank,
            value: None,
            locked: false,
            observers: Observers::default(),
        }
    }

    /// Assigns the worker while building, before anyone observes the chore.
    pub fn with_worker(mut self, worker: impl Into<WorkerId>) -> Self {
        self.worker = Some(worker.into());
        self
    }

    pub fn id(&self) -> &ChoreId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    /// First time the chore entered DONE or PAUSED. Never cleared.
    pub fn completed(&self) -> Option<DateTime<Utc>> {
        self.completed
    }

    pub fn worker(&self) -> Option<&WorkerId> {
        self.worker.as_ref()
    }

    pub fn state(&self) -> ChoreState {
        self.state
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.last_modified = now;
    }

    fn refuse_if_locked(&self, what: &str) -> bool {
        if self.locked {
            debug!(chore = %self.id, "refusing {what} on locked chore");
        }
        self.locked
    }

    fn apply_state(&mut self, state: ChoreState) -> bool {
        if self.refuse_if_locked("state change") {
            return false;
        }
        let now = Utc::now();
        if state.counts_as_complete() && self.completed.is_none() {
            self.completed = Some(now);
        }
        self.state = state;
        self.touch(now);
        true
    }

    fn apply_worker(&mut self, worker: WorkerId) -> bool {
        if self.refuse_if_locked("worker reassignment") {
            return false;
        }
        self.worker = Some(worker);
        self.touch(Utc::now());
        true
    }

    fn apply_lock(&mut self, locked: bool) -> bool {
        self.locked = locked;
        self.touch(Utc::now());
        true
    }

    fn apply_edit(&mut self, what: &str, edit: impl FnOnce(&mut Chore)) -> bool {
        if self.refuse_if_locked(what) {
            return false;
        }
        edit(&mut *self);
        self.touch(Utc::now());
        true
    }
}

/// Shared handle to a chore owned by a repository.
///
/// All mutation goes through the handle so that observers run after the
/// change is applied. Observers receive the chore by shared reference and
/// must not mutate it (or subscribe/unsubscribe on it) from inside the
/// callback.
#[derive(Debug, Clone)]
pub struct ChoreHandle(Rc<RefCell<Chore>>);

impl ChoreHandle {
    pub fn new(chore: Chore) -> Self {
        Self(Rc::new(RefCell::new(chore)))
    }

    pub fn borrow(&self) -> Ref<'_, Chore> {
        self.0.borrow()
    }

    pub fn id(&self) -> ChoreId {
        self.0.borrow().id.clone()
    }

    pub fn is_locked(&self) -> bool {
        self.0.borrow().locked
    }

    /// True when both handles point at the same chore instance.
    pub fn ptr_eq(&self, other: &ChoreHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Identity of the shared chore, usable as a set key.
    pub(crate) fn as_ptr(&self) -> *const RefCell<Chore> {
        Rc::as_ptr(&self.0)
    }

    /// Returns `Ok(false)` without touching the chore when it is locked.
    pub fn set_state(&self, state: ChoreState) -> Result<bool> {
        self.mutate(|chore| chore.apply_state(state))
    }

    /// Advance to the next state in the cycle. A locked chore does not move.
    pub fn cycle_state(&self) -> Result<bool> {
        let next = self.0.borrow().state.next();
        self.set_state(next)
    }

    pub fn set_worker(&self, worker: &Worker) -> Result<bool> {
        self.set_worker_by_id(worker.id().clone())
    }

    pub fn set_worker_by_id(&self, worker: impl Into<WorkerId>) -> Result<bool> {
        let worker = worker.into();
        self.mutate(|chore| chore.apply_worker(worker))
    }

    pub fn lock(&self) -> Result<()> {
        self.mutate(|chore| chore.apply_lock(true)).map(|_| ())
    }

    pub fn unlock(&self) -> Result<()> {
        self.mutate(|chore| chore.apply_lock(false)).map(|_| ())
    }

    pub fn set_name(&self, name: impl Into<String>) -> Result<bool> {
        let name = name.into();
        self.mutate(|chore| chore.apply_edit("rename", |c| c.name = name))
    }

    pub fn set_description(&self, description: impl Into<String>) -> Result<bool> {
        let description = description.into();
        self.mutate(|chore| chore.apply_edit("description edit", |c| c.description = description))
    }

    pub fn set_comment(&self, comment: impl Into<String>) -> Result<bool> {
        let comment = comment.into();
        self.mutate(|chore| chore.apply_edit("comment edit", |c| c.comment = comment))
    }

    pub fn set_value(&self, value: Option<f64>) -> Result<bool> {
        self.mutate(|chore| chore.apply_edit("value edit", |c| c.value = value))
    }

    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&Chore) -> StoreResult<()> + 'static,
    {
        self.subscribe_shared(Rc::new(observer))
    }

    pub fn subscribe_shared(&self, observer: ChoreObserver) -> SubscriptionId {
        self.0.borrow_mut().observers.subscribe(observer)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.0.borrow_mut().observers.unsubscribe(id)
    }

    /// Removes every registration of this exact observer.
    pub fn unsubscribe_shared(&self, observer: &ChoreObserver) -> bool {
        self.0.borrow_mut().observers.unsubscribe_observer(observer)
    }

    fn mutate<F>(&self, apply: F) -> Result<bool>
    where
        F: FnOnce(&mut Chore) -> bool,
    {
        let observers = {
            let mut chore = self.0.borrow_mut();
            if !apply(&mut *chore) {
                return Ok(false);
            }
            chore.observers.snapshot()
        };
        self.notify(&observers)?;
        Ok(true)
    }

    /// Every observer runs even if an earlier one failed; the first failure
    /// is returned.
    fn notify(&self, observers: &[ChoreObserver]) -> Result<()> {
        let chore = self.0.borrow();
        let mut first_error = None;
        for observer in observers {
            if let Err(err) = observer(&*chore) {
                warn!(chore = %chore.id, error = %err, "chore observer failed");
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(ChoreError::StorageUnavailable(err)),
            None => Ok(()),
        }
    }
}
