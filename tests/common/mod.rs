#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use fintrack_core::{
    core::{FixedClock, LedgerSession},
    domain::{CalendarZone, UserId},
    storage::MemoryStore,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Offset used by every session in the integration suite (UTC-5).
pub const OFFSET_MINUTES: i32 = -300;

pub fn zone() -> CalendarZone {
    CalendarZone::from_offset_minutes(OFFSET_MINUTES).expect("valid offset")
}

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 20, 15, 0, 0).unwrap()
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn alice() -> UserId {
    UserId::new("alice")
}

/// Opens a session for `user` on `store` with the suite's clock and zone.
pub fn session_on(store: &Arc<MemoryStore>, user: UserId) -> LedgerSession {
    fintrack_core::init();
    LedgerSession::for_user(user, store.clone(), Arc::new(FixedClock(now())), zone())
        .expect("open session")
}

pub fn setup_session() -> (Arc<MemoryStore>, LedgerSession) {
    let store = Arc::new(MemoryStore::new());
    let session = session_on(&store, alice());
    (store, session)
}

/// Creates an isolated directory that outlives the calling test.
pub fn temp_dir() -> std::path::PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}
