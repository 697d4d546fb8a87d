mod chores;
mod workers;

pub use chores::{ChoreRepository, SortOverride};
pub use workers::WorkerRepository;
