use chore_tracker::{
    ChoreError, ChoreHandle, ChoreId, ChoreRecord, ChoreRepository, ChoreState, MemoryStore,
    SortDirection, Worker, WorkerId, WorkerRepository,
};
use chrono::{NaiveDate, Utc};
use std::rc::Rc;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn record(id: &str, name: &str, date: NaiveDate, worker: Option<&str>) -> ChoreRecord {
    ChoreRecord {
        id: ChoreId::new(id),
        name: name.into(),
        description: String::new(),
        comment: String::new(),
        date,
        last_modified: Utc::now(),
        completed: None,
        worker: worker.map(WorkerId::from),
        state: ChoreState::Blank,
        value: None,
        locked: false,
    }
}

fn sample_store() -> Rc<MemoryStore<ChoreRecord>> {
    Rc::new(MemoryStore::with_items(vec![
        record("c-3", "Vacuum", d(2024, 1, 10), Some("alice")),
        record("c-1", "Dishes", d(2024, 1, 1), Some("alice")),
        record("c-2", "Laundry", d(2024, 1, 3), Some("bob")),
        record("c-4", "Bins", d(2024, 2, 5), None),
    ]))
}

fn ids(chores: &[ChoreHandle]) -> Vec<String> {
    chores.iter().map(|c| c.id().to_string()).collect()
}

fn alice() -> WorkerId {
    WorkerId::new("alice")
}

#[test]
fn load_orders_by_date_ascending() {
    let repo = ChoreRepository::load(sample_store()).unwrap();
    assert_eq!(ids(&repo.get_all()), vec!["c-1", "c-2", "c-3", "c-4"]);
    let state = repo.sort_state();
    assert_eq!(state.field, "date");
    assert_eq!(state.direction, SortDirection::Ascending);
}

#[test]
fn empty_store_loads_empty_repository() {
    let repo = ChoreRepository::load(MemoryStore::<ChoreRecord>::new()).unwrap();
    assert!(repo.is_empty());
    assert_eq!(repo.len(), 0);
}

#[test]
fn sorting_same_field_twice_flips_direction() {
    let repo = ChoreRepository::load(sample_store()).unwrap();
    repo.sort("name").unwrap();
    assert_eq!(ids(&repo.get_all()), vec!["c-4", "c-1", "c-2", "c-3"]);
    assert_eq!(repo.sort_state().direction, SortDirection::Ascending);

    repo.sort("name").unwrap();
    assert_eq!(ids(&repo.get_all()), vec!["c-3", "c-2", "c-1", "c-4"]);
    assert_eq!(repo.sort_state().direction, SortDirection::Descending);

    repo.sort("date").unwrap();
    assert_eq!(repo.sort_state().direction, SortDirection::Ascending);
}

#[test]
fn sort_field_names_are_case_insensitive() {
    let repo = ChoreRepository::load(sample_store()).unwrap();
    repo.sort_with("LastModified", SortDirection::Descending).unwrap();
    assert_eq!(repo.sort_state().field, "lastModified");
}

#[test]
fn unknown_sort_field_leaves_order_untouched() {
    let repo = ChoreRepository::load(sample_store()).unwrap();
    repo.sort("name").unwrap();
    let before = ids(&repo.get_all());

    let err = repo.sort("colour").unwrap_err();
    assert!(matches!(err, ChoreError::UnknownSortField(ref f) if f == "colour"));
    assert_eq!(ids(&repo.get_all()), before);
    assert_eq!(repo.sort_state().field, "name");
}

#[test]
fn sort_is_stable_for_equal_keys() {
    let store = MemoryStore::with_items(vec![
        record("a", "Same", d(2024, 1, 2), None),
        record("b", "Same", d(2024, 1, 1), None),
        record("c", "Same", d(2024, 1, 3), None),
    ]);
    let repo = ChoreRepository::load(store).unwrap();
    assert_eq!(ids(&repo.get_all()), vec!["b", "a", "c"]);
    repo.sort("name").unwrap();
    assert_eq!(ids(&repo.get_all()), vec!["b", "a", "c"]);
    repo.sort("name").unwrap();
    assert_eq!(ids(&repo.get_all()), vec!["b", "a", "c"]);
}

#[test]
fn missing_values_sort_first() {
    let mut valued = record("v", "Valued", d(2024, 1, 1), None);
    valued.value = Some(2.0);
    let store = MemoryStore::with_items(vec![valued, record("n", "Unvalued", d(2024, 1, 2), None)]);
    let repo = ChoreRepository::load(store).unwrap();
    repo.sort("value").unwrap();
    assert_eq!(ids(&repo.get_all()), vec!["n", "v"]);
}

#[test]
fn sort_override_restores_previous_order() {
    let repo = ChoreRepository::load(sample_store()).unwrap();
    repo.sort("name").unwrap();
    repo.sort("name").unwrap();
    let before = ids(&repo.get_all());
    {
        let guard = repo.sort_override("worker", SortDirection::Ascending).unwrap();
        assert_eq!(guard.previous_state().field, "name");
        assert_eq!(repo.sort_state().field, "worker");
    }
    assert_eq!(ids(&repo.get_all()), before);
    assert_eq!(repo.sort_state().field, "name");
    assert_eq!(repo.sort_state().direction, SortDirection::Descending);
}

#[test]
fn sort_override_resorts_when_members_change() {
    let repo = ChoreRepository::load(sample_store()).unwrap();
    repo.sort("name").unwrap();
    repo.sort("name").unwrap();
    {
        let _guard = repo.sort_override("date", SortDirection::Ascending).unwrap();
        let bins = repo.get_by_id(&ChoreId::new("c-4")).unwrap();
        assert!(repo.delete(&bins).unwrap());
        repo.create_range(d(2024, 3, 1), d(2024, 3, 1), "Attic", "", &alice())
            .unwrap();
        assert_eq!(repo.len(), 4);
    }
    let names: Vec<String> = repo
        .get_all()
        .iter()
        .map(|c| c.borrow().name().to_string())
        .collect();
    assert_eq!(names, vec!["Vacuum", "Laundry", "Dishes", "Attic"]);
    assert_eq!(repo.sort_state().field, "name");
    assert_eq!(repo.sort_state().direction, SortDirection::Descending);
}

#[test]
fn get_by_id_finds_unique_chore() {
    let repo = ChoreRepository::load(sample_store()).unwrap();
    let chore = repo.get_by_id(&ChoreId::new("c-2")).unwrap();
    assert_eq!(chore.borrow().name(), "Laundry");
}

#[test]
fn get_by_id_reports_missing_chore() {
    let repo = ChoreRepository::load(sample_store()).unwrap();
    match repo.get_by_id(&ChoreId::new("nope")) {
        Err(ChoreError::NotFound { entity, matches, .. }) => {
            assert_eq!(entity, "chore");
            assert_eq!(matches, 0);
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn get_by_id_rejects_duplicate_ids() {
    let store = MemoryStore::with_items(vec![
        record("dup", "One", d(2024, 1, 1), None),
        record("dup", "Two", d(2024, 1, 2), None),
    ]);
    let repo = ChoreRepository::load(store).unwrap();
    assert_eq!(repo.len(), 2);
    assert!(matches!(
        repo.get_by_id(&ChoreId::new("dup")),
        Err(ChoreError::NotFound { matches: 2, .. })
    ));
}

#[test]
fn get_for_worker_keeps_current_order() {
    let repo = ChoreRepository::load(sample_store()).unwrap();
    repo.sort_with("date", SortDirection::Descending).unwrap();
    assert_eq!(ids(&repo.get_for_worker(&alice())), vec!["c-3", "c-1"]);
}

#[test]
fn week_query_uses_monday_based_weeks() {
    let store = MemoryStore::with_items(vec![
        record("sun", "Sunday", d(2024, 1, 7), Some("alice")),
        record("mon", "Monday", d(2024, 1, 8), Some("alice")),
        record("tue", "Tuesday", d(2024, 1, 9), Some("alice")),
        record("other", "Other", d(2024, 1, 9), Some("bob")),
    ]);
    let repo = ChoreRepository::load(store).unwrap();
    let week = repo.get_for_worker_in_week(&alice(), d(2024, 1, 14));
    assert_eq!(ids(&week), vec!["mon", "tue"]);
}

#[test]
fn week_query_does_not_match_same_week_number_in_other_year() {
    let store = MemoryStore::with_items(vec![
        record("y24", "This year", d(2024, 1, 3), Some("alice")),
        record("y23", "Last year", d(2023, 1, 4), Some("alice")),
    ]);
    let repo = ChoreRepository::load(store).unwrap();
    assert_eq!(ids(&repo.get_for_worker_in_week(&alice(), d(2024, 1, 1))), vec!["y24"]);
}

#[test]
fn month_query_returns_oldest_first_and_restores_order() {
    let repo = ChoreRepository::load(sample_store()).unwrap();
    repo.sort("name").unwrap();
    let before = ids(&repo.get_all());

    let january = repo.get_for_worker_in_month(&alice(), d(2024, 1, 20));
    assert_eq!(ids(&january), vec!["c-1", "c-3"]);
    assert_eq!(ids(&repo.get_all()), before);
    assert_eq!(repo.sort_state().field, "name");
}

#[test]
fn date_range_is_half_open() {
    let repo = ChoreRepository::load(sample_store()).unwrap();
    let range = repo.get_for_date_range(d(2024, 1, 1), 2, None);
    assert_eq!(ids(&range), vec!["c-1"]);
    let range = repo.get_for_date_range(d(2024, 1, 1), 3, None);
    assert_eq!(ids(&range), vec!["c-1", "c-2"]);
    let range = repo.get_for_date_range(d(2024, 1, 3), 8, None);
    assert_eq!(ids(&range), vec!["c-2", "c-3"]);
}

#[test]
fn date_range_filters_by_worker() {
    let repo = ChoreRepository::load(sample_store()).unwrap();
    let bob = WorkerId::new("bob");
    let range = repo.get_for_date_range(d(2024, 1, 1), 60, Some(&bob));
    assert_eq!(ids(&range), vec!["c-2"]);
}

#[test]
fn empty_date_range_returns_nothing() {
    let repo = ChoreRepository::load(sample_store()).unwrap();
    assert!(repo.get_for_date_range(d(2024, 1, 1), 0, None).is_empty());
    assert!(repo.get_for_date_range(d(2024, 1, 1), -5, None).is_empty());
}

#[test]
fn create_range_adds_one_chore_per_day() {
    let store = Rc::new(MemoryStore::<ChoreRecord>::new());
    let repo = ChoreRepository::load(Rc::clone(&store)).unwrap();

    let created = repo
        .create_range(d(2024, 1, 1), d(2024, 1, 3), "Dishes", "Evening", &alice())
        .unwrap();
    assert_eq!(created, 3);
    assert_eq!(repo.len(), 3);
    assert_eq!(store.save_count(), 1);

    let saved = store.items();
    let dates: Vec<NaiveDate> = saved.iter().map(|r| r.date).collect();
    assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 3)]);
    assert!(saved.iter().all(|r| r.worker == Some(alice())));
    assert!(saved.iter().all(|r| r.state == ChoreState::Blank && !r.locked));
    assert!(saved.iter().all(|r| r.completed.is_none()));
    assert!(saved.iter().all(|r| r.name == "Dishes" && r.description == "Evening"));

    let distinct: std::collections::HashSet<_> = saved.iter().map(|r| r.id.clone()).collect();
    assert_eq!(distinct.len(), 3);
}

#[test]
fn create_range_single_day_and_inverted_range() {
    let store = Rc::new(MemoryStore::<ChoreRecord>::new());
    let repo = ChoreRepository::load(Rc::clone(&store)).unwrap();
    assert_eq!(
        repo.create_range(d(2024, 5, 1), d(2024, 5, 1), "Bins", "", &alice()).unwrap(),
        1
    );
    assert_eq!(
        repo.create_range(d(2024, 5, 3), d(2024, 5, 1), "Bins", "", &alice()).unwrap(),
        0
    );
    assert_eq!(repo.len(), 1);
    assert_eq!(store.save_count(), 1);
}

#[test]
fn created_chores_write_through() {
    let store = Rc::new(MemoryStore::<ChoreRecord>::new());
    let repo = ChoreRepository::load(Rc::clone(&store)).unwrap();
    repo.create_range(d(2024, 1, 1), d(2024, 1, 1), "Dishes", "", &alice()).unwrap();

    let chore = repo.get_all().remove(0);
    chore.set_state(ChoreState::Done).unwrap();
    assert_eq!(store.save_count(), 2);
    assert_eq!(store.items()[0].state, ChoreState::Done);
}

#[test]
fn every_successful_mutation_saves_the_collection() {
    let store = sample_store();
    let repo = ChoreRepository::load(Rc::clone(&store)).unwrap();
    let chore = repo.get_by_id(&ChoreId::new("c-1")).unwrap();

    chore.set_state(ChoreState::Done).unwrap();
    chore.set_comment("sparkling").unwrap();
    chore.lock().unwrap();
    assert_eq!(store.save_count(), 3);

    let saved = store.items();
    let stored = saved.iter().find(|r| r.id.as_str() == "c-1").unwrap();
    assert_eq!(stored.state, ChoreState::Done);
    assert_eq!(stored.comment, "sparkling");
    assert!(stored.locked);
    assert!(stored.completed.is_some());
    assert_eq!(saved.len(), 4);
}

#[test]
fn refused_mutation_does_not_save() {
    let store = sample_store();
    let repo = ChoreRepository::load(Rc::clone(&store)).unwrap();
    let chore = repo.get_by_id(&ChoreId::new("c-1")).unwrap();
    chore.lock().unwrap();
    let saves = store.save_count();

    assert!(!chore.set_state(ChoreState::Done).unwrap());
    assert!(!chore.set_worker(&Worker::new("bob", "Bob")).unwrap());
    assert_eq!(store.save_count(), saves);
}

#[test]
fn failed_write_surfaces_storage_error() {
    let store = sample_store();
    let repo = ChoreRepository::load(Rc::clone(&store)).unwrap();
    let chore = repo.get_by_id(&ChoreId::new("c-2")).unwrap();

    store.set_fail_saves(true);
    let err = chore.set_state(ChoreState::Done).unwrap_err();
    assert!(matches!(err, ChoreError::StorageUnavailable(_)));
    // the in-memory change stays applied
    assert_eq!(chore.borrow().state(), ChoreState::Done);

    assert!(matches!(
        repo.create_range(d(2024, 3, 1), d(2024, 3, 2), "Mop", "", &alice()),
        Err(ChoreError::StorageUnavailable(_))
    ));
}

#[test]
fn delete_removes_and_persists() {
    let store = sample_store();
    let repo = ChoreRepository::load(Rc::clone(&store)).unwrap();
    let chore = repo.get_by_id(&ChoreId::new("c-2")).unwrap();

    assert!(repo.delete(&chore).unwrap());
    assert_eq!(repo.len(), 3);
    assert!(repo.get_by_id(&ChoreId::new("c-2")).is_err());
    assert_eq!(store.items().len(), 3);
    assert_eq!(chore.borrow().observer_count(), 0);

    // a detached chore no longer writes the repository
    let saves = store.save_count();
    chore.set_state(ChoreState::Done).unwrap();
    assert_eq!(store.save_count(), saves);
}

#[test]
fn delete_refuses_locked_chore() {
    let store = sample_store();
    let repo = ChoreRepository::load(Rc::clone(&store)).unwrap();
    let chore = repo.get_by_id(&ChoreId::new("c-2")).unwrap();
    chore.lock().unwrap();
    let saves = store.save_count();

    assert!(!repo.delete(&chore).unwrap());
    assert_eq!(repo.len(), 4);
    assert_eq!(store.save_count(), saves);
}

#[test]
fn delete_of_foreign_chore_is_refused() {
    let repo = ChoreRepository::load(sample_store()).unwrap();
    let other = ChoreRepository::load(sample_store()).unwrap();
    let foreign = other.get_by_id(&ChoreId::new("c-1")).unwrap();
    assert!(!repo.delete(&foreign).unwrap());
    assert_eq!(repo.len(), 4);
}

#[test]
fn worker_repository_lookups() {
    let workers = WorkerRepository::load(MemoryStore::with_items(vec![
        Worker::new("alice", "Alice"),
        Worker::new("bob", "Bob"),
        Worker::new("bob", "Robert"),
    ]))
    .unwrap();

    assert_eq!(workers.len(), 3);
    assert_eq!(workers.get_by_id(&alice()).unwrap().name, "Alice");
    assert!(matches!(
        workers.get_by_id(&WorkerId::new("bob")),
        Err(ChoreError::NotFound { matches: 2, .. })
    ));
    assert!(matches!(
        workers.get_by_id(&WorkerId::new("carol")),
        Err(ChoreError::NotFound { entity: "worker", matches: 0, .. })
    ));
    assert!(workers.resolve(&WorkerId::new("carol")).is_none());
}

#[test]
fn worker_repository_save_writes_all_workers() {
    let store = Rc::new(MemoryStore::with_items(vec![Worker::new("alice", "Alice")]));
    let workers = WorkerRepository::load(Rc::clone(&store)).unwrap();
    workers.save().unwrap();
    assert_eq!(store.save_count(), 1);
    assert_eq!(store.items(), vec![Worker::new("alice", "Alice")]);
}
