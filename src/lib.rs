//! Household chore tracking.
//!
//! Chores are dated tasks assigned to workers and moved through a small
//! state cycle. [`ChoreRepository`] owns the loaded collection and writes it
//! back to its store after every successful change; [`CalendarQueries`]
//! buckets the collection into weeks and months.

pub mod calendar;
pub mod chore;
pub mod config;
pub mod error;
pub mod ids;
pub mod persistence;
pub mod repository;
pub mod sort;
pub mod state;
pub mod worker;

pub use calendar::CalendarQueries;
pub use chore::{Chore, ChoreHandle, ChoreObserver, SubscriptionId};
pub use config::{StoreBackend, TrackerConfig};
pub use error::{ChoreError, ConfigError, Result, StoreError, StoreResult};
pub use ids::{ChoreId, WorkerId};
pub use persistence::{ChoreRecord, ChoreStore, JsonFileStore, MemoryStore, WorkerStore};
#[cfg(feature = "sqlite")]
pub use persistence::SqliteStore;
pub use repository::{ChoreRepository, SortOverride, WorkerRepository};
pub use sort::{SortDirection, SortState};
pub use state::ChoreState;
pub use worker::Worker;
