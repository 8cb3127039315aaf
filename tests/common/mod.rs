//! Test utilities and fixtures for Gatepass integration tests

#![allow(dead_code)]

use chrono::{Duration, NaiveDateTime, Timelike, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

pub use gatepass::expiry::{self, ExpiryWindow};
pub use gatepass::handlers::{self, AppState};
pub use gatepass::models::LicenseCode;
pub use gatepass::service::{LicenseService, Verdict};
pub use gatepass::store::{init_db, queries, DbPool};

/// Create an in-memory store pool with the schema initialized.
///
/// max_size is pinned to 1: every checkout must see the same in-memory
/// database.
pub fn test_pool() -> DbPool {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(1).build(manager).unwrap();
    {
        let conn = pool.get().unwrap();
        init_db(&conn).unwrap();
    }
    pool
}

/// Create a license service plus a handle on its underlying pool, so tests
/// can inspect and doctor records directly.
pub fn test_service() -> (DbPool, LicenseService) {
    let pool = test_pool();
    (pool.clone(), LicenseService::new(pool))
}

/// Create an AppState for handler tests.
pub fn create_test_state() -> AppState {
    AppState {
        licenses: LicenseService::new(test_pool()),
    }
}

/// Fetch a record by code, panicking if it does not exist.
pub fn fetch_code(pool: &DbPool, code: &str) -> LicenseCode {
    let conn = pool.get().unwrap();
    queries::get_code(&conn, code)
        .expect("store read should succeed")
        .expect("code should exist")
}

/// Replace a record wholesale (for backdating timestamps and crafting
/// legacy shapes).
pub fn store_code(pool: &DbPool, record: &LicenseCode) {
    let conn = pool.get().unwrap();
    assert!(
        queries::put_code(&conn, record).expect("store write should succeed"),
        "record to replace should exist"
    );
}

/// Insert a record directly, bypassing the service.
pub fn insert_code(pool: &DbPool, record: &LicenseCode) -> LicenseCode {
    let conn = pool.get().unwrap();
    queries::append_code(&conn, record).expect("store append should succeed")
}

/// Current instant, truncated to whole seconds like stored timestamps.
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc().with_nanosecond(0).unwrap()
}

/// A timestamp string at a signed offset from now.
pub fn ts_offset(offset: Duration) -> String {
    expiry::format_timestamp(now() + offset)
}

/// Build an unassigned, unused record for a handwritten code string.
pub fn make_record(code: &str, window: ExpiryWindow) -> LicenseCode {
    LicenseCode::new(code.to_string(), window, now())
}
