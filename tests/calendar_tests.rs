use chore_tracker::calendar::{days_inclusive, month_start, same_week, week_number, week_start};
use chore_tracker::{ChoreId, ChoreRecord, ChoreRepository, ChoreState, MemoryStore, SortDirection};
use chrono::{Datelike, NaiveDate, Utc, Weekday};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn dated(id: &str, date: NaiveDate) -> ChoreRecord {
    ChoreRecord {
        id: ChoreId::new(id),
        name: id.to_string(),
        description: String::new(),
        comment: String::new(),
        date,
        last_modified: Utc::now(),
        completed: None,
        worker: None,
        state: ChoreState::Blank,
        value: None,
        locked: false,
    }
}

fn repository(dates: &[NaiveDate]) -> ChoreRepository {
    let records = dates
        .iter()
        .enumerate()
        .map(|(i, date)| dated(&format!("c-{i}"), *date))
        .collect();
    ChoreRepository::load(MemoryStore::with_items(records)).unwrap()
}

#[test]
fn week_starts_on_monday() {
    // 2024-01-07 is a Sunday, so its week began on 2024-01-01
    assert_eq!(week_start(d(2024, 1, 7)), d(2024, 1, 1));
    assert_eq!(week_start(d(2024, 1, 8)), d(2024, 1, 8));
    assert_eq!(week_start(d(2024, 1, 8)).weekday(), Weekday::Mon);
    assert!(!same_week(d(2024, 1, 7), d(2024, 1, 8)));
}

#[test]
fn week_numbers_follow_first_four_day_week_rule() {
    assert_eq!(week_number(d(2024, 1, 1)), 1);
    assert_eq!(week_number(d(2024, 1, 8)), 2);
    // Friday 2021-01-01 still belongs to the last week of 2020
    assert_eq!(week_number(d(2021, 1, 1)), 53);
    assert_eq!(week_number(d(2024, 12, 30)), 1);
}

#[test]
fn month_start_is_first_day() {
    assert_eq!(month_start(d(2024, 2, 29)), d(2024, 2, 1));
}

#[test]
fn days_inclusive_covers_both_ends() {
    let days: Vec<NaiveDate> = days_inclusive(d(2024, 2, 27), d(2024, 3, 1)).collect();
    assert_eq!(
        days,
        vec![d(2024, 2, 27), d(2024, 2, 28), d(2024, 2, 29), d(2024, 3, 1)]
    );
    assert_eq!(days_inclusive(d(2024, 3, 2), d(2024, 3, 1)).count(), 0);
}

#[test]
fn mondays_and_weeks_maps_each_week_once() {
    let repo = repository(&[d(2024, 1, 1), d(2024, 1, 3), d(2024, 1, 8)]);
    let weeks = repo.calendar().mondays_and_weeks();
    let pairs: Vec<(NaiveDate, u32)> = weeks.into_iter().collect();
    assert_eq!(pairs, vec![(d(2024, 1, 1), 1), (d(2024, 1, 8), 2)]);
}

#[test]
fn mondays_and_weeks_across_year_boundary() {
    let repo = repository(&[d(2020, 12, 28), d(2021, 1, 3), d(2021, 1, 4)]);
    let weeks = repo.calendar().mondays_and_weeks();
    assert_eq!(weeks.len(), 2);
    assert_eq!(weeks.get(&d(2020, 12, 28)), Some(&53));
    assert_eq!(weeks.get(&d(2021, 1, 4)), Some(&1));
}

#[test]
fn months_are_distinct_and_newest_first() {
    let repo = repository(&[
        d(2024, 1, 15),
        d(2024, 3, 2),
        d(2024, 1, 2),
        d(2023, 12, 31),
    ]);
    assert_eq!(
        repo.calendar().months(),
        vec![d(2024, 3, 1), d(2024, 1, 1), d(2023, 12, 1)]
    );
}

#[test]
fn empty_repository_has_no_buckets() {
    let repo = repository(&[]);
    assert!(repo.calendar().mondays_and_weeks().is_empty());
    assert!(repo.calendar().months().is_empty());
}

#[test]
fn calendar_queries_leave_sort_state_alone() {
    let repo = repository(&[d(2024, 1, 15), d(2024, 3, 2), d(2024, 1, 2)]);
    repo.sort_with("id", SortDirection::Descending).unwrap();
    let before: Vec<String> = repo.get_all().iter().map(|c| c.id().to_string()).collect();

    repo.calendar().mondays_and_weeks();
    repo.calendar().months();

    let after: Vec<String> = repo.get_all().iter().map(|c| c.id().to_string()).collect();
    assert_eq!(after, before);
    assert_eq!(repo.sort_state().field, "id");
    assert_eq!(repo.sort_state().direction, SortDirection::Descending);
}
