//! Tests for application state construction.

use catalog::{CatalogStore, Database};
use server::AppState;
use std::sync::Arc;

fn test_store() -> CatalogStore {
    let db = Database::new(":memory:").expect("connect");
    let store = CatalogStore::new(db);
    store.init_schema().expect("init schema");
    store
}

#[test]
fn app_state_builds_from_a_catalog_store() {
    let state = AppState::new(test_store()).expect("state");
    assert!(state.max_candidate_stations > 0);
}

#[test]
fn app_state_clone_shares_the_catalog_arc() {
    let state = AppState::new(test_store()).expect("state");
    let cloned = state.clone();

    assert_eq!(Arc::strong_count(&state.catalog), Arc::strong_count(&cloned.catalog));
}
