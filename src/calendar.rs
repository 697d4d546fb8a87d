use crate::repository::ChoreRepository;
use crate::sort::SortDirection;
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Week number under the first-four-day-week rule with Monday as the first
/// day (ISO-8601). Late-December days can belong to week 1 of the next
/// year and early-January days to week 52/53 of the previous one.
pub fn week_number(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// Year owning the majority of the days in `date`'s week.
pub fn week_year(date: NaiveDate) -> i32 {
    date.iso_week().year()
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

pub fn same_week(a: NaiveDate, b: NaiveDate) -> bool {
    week_start(a) == week_start(b)
}

pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Every calendar day from `from` to `to`, both inclusive.
pub fn days_inclusive(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    from.iter_days().take_while(move |day| *day <= to)
}

/// Navigation buckets derived from the dates of a repository's chores.
///
/// Both queries walk the collection newest first under a scoped sort
/// override, so the repository's own ordering is untouched afterwards.
pub struct CalendarQueries<'a> {
    chores: &'a ChoreRepository,
}

impl<'a> CalendarQueries<'a> {
    pub fn new(chores: &'a ChoreRepository) -> Self {
        Self { chores }
    }

    /// Distinct Mondays that start a week holding at least one chore,
    /// mapped to that week's number.
    pub fn mondays_and_weeks(&self) -> BTreeMap<NaiveDate, u32> {
        let _order = self.chores.scoped_date_order(SortDirection::Descending);
        let mut weeks = BTreeMap::new();
        for chore in self.chores.get_all() {
            let date = chore.borrow().date();
            weeks
                .entry(week_start(date))
                .or_insert_with(|| week_number(date));
        }
        weeks
    }

    /// First day of every month holding at least one chore, most recent
    /// month first.
    pub fn months(&self) -> Vec<NaiveDate> {
        let _order = self.chores.scoped_date_order(SortDirection::Descending);
        let mut months: Vec<NaiveDate> = Vec::new();
        for chore in self.chores.get_all() {
            let first = month_start(chore.borrow().date());
            if !months.contains(&first) {
                months.push(first);
            }
        }
        months
    }
}
