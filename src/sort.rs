//! Field-name driven ordering of chores.
//!
//! Callers name a field ("date", "name", ...) and the repository reorders
//! its collection by that field's natural ordering. The lookup goes
//! through a fixed accessor table instead of any runtime introspection.

use crate::chore::{Chore, ChoreHandle};
use crate::state::ChoreState;
use chrono::{DateTime, NaiveDate, Utc};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        }
    }

    pub fn is_ascending(self) -> bool {
        self == SortDirection::Ascending
    }

    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Field and direction of the most recent sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub field: &'static str,
    pub direction: SortDirection,
}

/// A field value as seen by the sorter. Missing values order first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    OptionalText(Option<&'a str>),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    OptionalTimestamp(Option<DateTime<Utc>>),
    State(ChoreState),
    Amount(Option<f64>),
    Flag(bool),
}

impl FieldValue<'_> {
    pub fn compare(&self, other: &FieldValue<'_>) -> Ordering {
        use FieldValue::*;
        match (self, other) {
            (Text(a), Text(b)) => a.cmp(b),
            (OptionalText(a), OptionalText(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (Timestamp(a), Timestamp(b)) => a.cmp(b),
            (OptionalTimestamp(a), OptionalTimestamp(b)) => a.cmp(b),
            (State(a), State(b)) => a.cmp(b),
            (Amount(a), Amount(b)) => match (a, b) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(a), Some(b)) => a.total_cmp(b),
            },
            (Flag(a), Flag(b)) => a.cmp(b),
            // a single accessor always yields one variant
            _ => Ordering::Equal,
        }
    }
}

pub struct FieldAccessor<T> {
    pub name: &'static str,
    pub get: for<'a> fn(&'a T) -> FieldValue<'a>,
}

pub struct FieldTable<T: 'static> {
    fields: &'static [FieldAccessor<T>],
}

impl<T: 'static> FieldTable<T> {
    pub const fn new(fields: &'static [FieldAccessor<T>]) -> Self {
        Self { fields }
    }

    /// Case-insensitive, so `Date` and `date` name the same field.
    pub fn lookup(&self, name: &str) -> Option<&'static FieldAccessor<T>> {
        let name = name.trim();
        self.fields
            .iter()
            .find(|accessor| accessor.name.eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|accessor| accessor.name)
    }
}

fn chore_id(c: &Chore) -> FieldValue<'_> {
    FieldValue::Text(c.id().as_str())
}

fn chore_name(c: &Chore) -> FieldValue<'_> {
    FieldValue::Text(c.name())
}

fn chore_description(c: &Chore) -> FieldValue<'_> {
    FieldValue::Text(c.description())
}

fn chore_comment(c: &Chore) -> FieldValue<'_> {
    FieldValue::Text(c.comment())
}

fn chore_date(c: &Chore) -> FieldValue<'_> {
    FieldValue::Date(c.date())
}

fn chore_last_modified(c: &Chore) -> FieldValue<'_> {
    FieldValue::Timestamp(c.last_modified())
}

fn chore_completed(c: &Chore) -> FieldValue<'_> {
    FieldValue::OptionalTimestamp(c.completed())
}

fn chore_worker(c: &Chore) -> FieldValue<'_> {
    FieldValue::OptionalText(c.worker().map(|w| w.as_str()))
}

fn chore_state(c: &Chore) -> FieldValue<'_> {
    FieldValue::State(c.state())
}

fn chore_value(c: &Chore) -> FieldValue<'_> {
    FieldValue::Amount(c.value())
}

fn chore_locked(c: &Chore) -> FieldValue<'_> {
    FieldValue::Flag(c.is_locked())
}

pub(crate) const DATE_FIELD: FieldAccessor<Chore> = FieldAccessor {
    name: "date",
    get: chore_date,
};

static CHORE_ACCESSORS: [FieldAccessor<Chore>; 11] = [
    FieldAccessor { name: "id", get: chore_id },
    FieldAccessor { name: "name", get: chore_name },
    FieldAccessor { name: "description", get: chore_description },
    FieldAccessor { name: "comment", get: chore_comment },
    DATE_FIELD,
    FieldAccessor { name: "lastModified", get: chore_last_modified },
    FieldAccessor { name: "completed", get: chore_completed },
    FieldAccessor { name: "worker", get: chore_worker },
    FieldAccessor { name: "state", get: chore_state },
    FieldAccessor { name: "value", get: chore_value },
    FieldAccessor { name: "locked", get: chore_locked },
];

/// Sortable chore fields, keyed by their wire names.
pub static CHORE_FIELDS: FieldTable<Chore> = FieldTable::new(&CHORE_ACCESSORS);

/// Stable sort, so equal keys keep their previous relative order in both
/// directions.
pub(crate) fn sort_handles(
    chores: &mut [ChoreHandle],
    accessor: &FieldAccessor<Chore>,
    direction: SortDirection,
) {
    chores.sort_by(|a, b| {
        let a = a.borrow();
        let b = b.borrow();
        let ordering = (accessor.get)(&*a).compare(&(accessor.get)(&*b));
        direction.apply(ordering)
    });
}
