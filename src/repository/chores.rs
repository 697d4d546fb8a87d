use crate::calendar::{self, CalendarQueries};
use crate::chore::{Chore, ChoreHandle, ChoreObserver};
use crate::error::{ChoreError, Result, StoreResult};
use crate::ids::{ChoreId, WorkerId};
use crate::persistence::{ChoreRecord, ChoreStore};
use crate::sort::{self, CHORE_FIELDS, DATE_FIELD, FieldAccessor, SortDirection, SortState};
use chrono::{Duration, NaiveDate};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::{Rc, Weak};
use tracing::{debug, info, warn};

const DEFAULT_SORT_FIELD: &str = "date";

struct ChoreCollection {
    chores: RefCell<Vec<ChoreHandle>>,
    sort: Cell<SortState>,
    store: Box<dyn ChoreStore>,
    /// Shared by every chore in the collection; writes the whole
    /// collection back whenever one of them changes.
    observer: ChoreObserver,
}

impl ChoreCollection {
    fn save(&self) -> StoreResult<()> {
        let records: Vec<ChoreRecord> = self
            .chores
            .borrow()
            .iter()
            .map(|handle| ChoreRecord::from(&*handle.borrow()))
            .collect();
        self.store.save_chores(&records)?;
        debug!(count = records.len(), "saved chores");
        Ok(())
    }

    fn apply_sort(&self, accessor: &'static FieldAccessor<Chore>, direction: SortDirection) {
        sort::sort_handles(&mut self.chores.borrow_mut(), accessor, direction);
        self.sort.set(SortState {
            field: accessor.name,
            direction,
        });
    }
}

/// Owns the authoritative in-memory chore collection.
///
/// Loaded once from its store; every successful change to one of its
/// chores writes the full collection back (write-through, unbatched).
pub struct ChoreRepository {
    inner: Rc<ChoreCollection>,
}

impl ChoreRepository {
    /// Loads every chore from `store` and orders them by date.
    pub fn load<S: ChoreStore + 'static>(store: S) -> Result<Self> {
        Self::load_sorted_by(store, DEFAULT_SORT_FIELD)
    }

    pub fn load_sorted_by<S: ChoreStore + 'static>(store: S, field: &str) -> Result<Self> {
        let accessor = Self::accessor(field)?;
        let records = store.load_chores()?;
        debug!(count = records.len(), "loaded chores");

        let distinct: HashSet<&ChoreId> = records.iter().map(|r| &r.id).collect();
        if distinct.len() != records.len() {
            warn!(
                duplicates = records.len() - distinct.len(),
                "chore store contains duplicate ids"
            );
        }

        let inner = Rc::new_cyclic(|weak: &Weak<ChoreCollection>| {
            let weak = weak.clone();
            let observer: ChoreObserver = Rc::new(move |_changed: &Chore| match weak.upgrade() {
                Some(collection) => collection.save(),
                None => Ok(()),
            });
            ChoreCollection {
                chores: RefCell::new(Vec::with_capacity(records.len())),
                sort: Cell::new(SortState {
                    field: accessor.name,
                    direction: SortDirection::Ascending,
                }),
                store: Box::new(store),
                observer,
            }
        });

        let handles: Vec<ChoreHandle> = records
            .into_iter()
            .map(|record| {
                let handle = ChoreHandle::new(Chore::from(record));
                handle.subscribe_shared(Rc::clone(&inner.observer));
                handle
            })
            .collect();
        *inner.chores.borrow_mut() = handles;
        inner.apply_sort(accessor, SortDirection::Ascending);

        Ok(Self { inner })
    }

    fn accessor(field: &str) -> Result<&'static FieldAccessor<Chore>> {
        CHORE_FIELDS
            .lookup(field)
            .ok_or_else(|| ChoreError::UnknownSortField(field.to_string()))
    }

    /// Sort by `field`, flipping the direction when `field` was also the
    /// previous sort field and starting ascending otherwise.
    pub fn sort(&self, field: &str) -> Result<()> {
        let accessor = Self::accessor(field)?;
        let current = self.inner.sort.get();
        let direction = if current.field == accessor.name {
            current.direction.reversed()
        } else {
            SortDirection::Ascending
        };
        self.inner.apply_sort(accessor, direction);
        Ok(())
    }

    pub fn sort_with(&self, field: &str, direction: SortDirection) -> Result<()> {
        let accessor = Self::accessor(field)?;
        self.inner.apply_sort(accessor, direction);
        Ok(())
    }

    pub fn sort_state(&self) -> SortState {
        self.inner.sort.get()
    }

    /// Reorders by `field` until the returned guard is dropped, then puts
    /// the previous order and sort state back.
    pub fn sort_override(&self, field: &str, direction: SortDirection) -> Result<SortOverride<'_>> {
        let accessor = Self::accessor(field)?;
        Ok(self.begin_override(accessor, direction))
    }

    pub(crate) fn scoped_date_order(&self, direction: SortDirection) -> SortOverride<'_> {
        self.begin_override(&DATE_FIELD, direction)
    }

    fn begin_override(
        &self,
        accessor: &'static FieldAccessor<Chore>,
        direction: SortDirection,
    ) -> SortOverride<'_> {
        let guard = SortOverride {
            collection: &self.inner,
            previous_order: self.inner.chores.borrow().clone(),
            previous_state: self.inner.sort.get(),
        };
        self.inner.apply_sort(accessor, direction);
        guard
    }

    /// Writes the whole collection to the store.
    pub fn save(&self) -> Result<()> {
        self.inner.save()?;
        Ok(())
    }

    /// Fails with `NotFound` unless exactly one chore carries `id`.
    pub fn get_by_id(&self, id: &ChoreId) -> Result<ChoreHandle> {
        let chores = self.inner.chores.borrow();
        let matches: Vec<&ChoreHandle> = chores
            .iter()
            .filter(|handle| handle.borrow().id() == id)
            .collect();
        match matches.as_slice() {
            [only] => Ok((*only).clone()),
            other => {
                if other.len() > 1 {
                    warn!(chore = %id, count = other.len(), "duplicate chore id");
                }
                Err(ChoreError::not_found("chore", id.as_str(), other.len()))
            }
        }
    }

    /// The collection in its current order.
    pub fn get_all(&self) -> Vec<ChoreHandle> {
        self.inner.chores.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.chores.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.chores.borrow().is_empty()
    }

    pub fn get_for_worker(&self, worker: &WorkerId) -> Vec<ChoreHandle> {
        self.filter(|chore| chore.worker() == Some(worker))
    }

    /// Chores of `worker` in the Monday-based week containing `date`,
    /// oldest first.
    pub fn get_for_worker_in_week(&self, worker: &WorkerId, date: NaiveDate) -> Vec<ChoreHandle> {
        let monday = calendar::week_start(date);
        self.filter_by_date(|chore| {
            chore.worker() == Some(worker) && calendar::week_start(chore.date()) == monday
        })
    }

    /// Chores of `worker` in the calendar month containing `date`, oldest
    /// first.
    pub fn get_for_worker_in_month(&self, worker: &WorkerId, date: NaiveDate) -> Vec<ChoreHandle> {
        self.filter_by_date(|chore| {
            chore.worker() == Some(worker) && calendar::same_month(chore.date(), date)
        })
    }

    /// Chores dated in `[start, start + days)`, oldest first. `None` for
    /// `worker` matches every chore.
    pub fn get_for_date_range(
        &self,
        start: NaiveDate,
        days: i64,
        worker: Option<&WorkerId>,
    ) -> Vec<ChoreHandle> {
        if days <= 0 {
            return Vec::new();
        }
        // past the representable calendar the range is open-ended
        let end = Duration::try_days(days).and_then(|span| start.checked_add_signed(span));
        self.filter_by_date(|chore| {
            let date = chore.date();
            date >= start
                && end.is_none_or(|end| date < end)
                && worker.is_none_or(|worker| chore.worker() == Some(worker))
        })
    }

    /// One chore per day from `from` to `to` inclusive, all assigned to
    /// `worker`. The new chores are appended and the collection is saved
    /// once. Returns how many were created.
    pub fn create_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        name: &str,
        description: &str,
        worker: &WorkerId,
    ) -> Result<usize> {
        let created: Vec<ChoreHandle> = calendar::days_inclusive(from, to)
            .map(|date| {
                let chore = Chore::new(ChoreId::generate(), name, description, date)
                    .with_worker(worker.clone());
                let handle = ChoreHandle::new(chore);
                handle.subscribe_shared(Rc::clone(&self.inner.observer));
                handle
            })
            .collect();
        if created.is_empty() {
            return Ok(0);
        }

        let count = created.len();
        self.inner.chores.borrow_mut().extend(created);
        info!(count, %from, %to, chore_name = name, worker = %worker, "created chores");
        self.inner.save()?;
        Ok(count)
    }

    /// Removes `chore` from the collection. Refused (`Ok(false)`) when the
    /// chore is locked or not part of this repository.
    pub fn delete(&self, chore: &ChoreHandle) -> Result<bool> {
        if chore.is_locked() {
            debug!(chore = %chore.id(), "refusing to delete locked chore");
            return Ok(false);
        }
        let removed = {
            let mut chores = self.inner.chores.borrow_mut();
            chores
                .iter()
                .position(|handle| handle.ptr_eq(chore))
                .map(|index| chores.remove(index))
        };
        let Some(removed) = removed else {
            return Ok(false);
        };
        removed.unsubscribe_shared(&self.inner.observer);
        info!(chore = %removed.id(), "deleted chore");
        self.inner.save()?;
        Ok(true)
    }

    pub fn calendar(&self) -> CalendarQueries<'_> {
        CalendarQueries::new(self)
    }

    fn filter<F: Fn(&Chore) -> bool>(&self, keep: F) -> Vec<ChoreHandle> {
        self.inner
            .chores
            .borrow()
            .iter()
            .filter(|handle| keep(&*handle.borrow()))
            .cloned()
            .collect()
    }

    fn filter_by_date<F: Fn(&Chore) -> bool>(&self, keep: F) -> Vec<ChoreHandle> {
        let _order = self.scoped_date_order(SortDirection::Ascending);
        self.filter(keep)
    }
}

/// Scoped sort override. Dropping it restores the order and sort state
/// that were in place when it was taken.
pub struct SortOverride<'a> {
    collection: &'a ChoreCollection,
    previous_order: Vec<ChoreHandle>,
    previous_state: SortState,
}

impl SortOverride<'_> {
    pub fn previous_state(&self) -> SortState {
        self.previous_state
    }
}

impl Drop for SortOverride<'_> {
    fn drop(&mut self) {
        let same_members = {
            let chores = self.collection.chores.borrow();
            chores.len() == self.previous_order.len() && {
                let previous: HashSet<_> =
                    self.previous_order.iter().map(ChoreHandle::as_ptr).collect();
                chores.iter().all(|handle| previous.contains(&handle.as_ptr()))
            }
        };
        if same_members {
            *self.collection.chores.borrow_mut() = std::mem::take(&mut self.previous_order);
            self.collection.sort.set(self.previous_state);
        } else if let Some(accessor) = CHORE_FIELDS.lookup(self.previous_state.field) {
            // chores were added or removed meanwhile; re-sort instead
            self.collection
                .apply_sort(accessor, self.previous_state.direction);
        }
    }
}
