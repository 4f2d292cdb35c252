#![doc(test(attr(deny(warnings))))]

//! Fintrack Core keeps per-user income/expense records and their categories in
//! sync with a live document store, and derives the dashboard and history
//! views from the latest snapshots.

pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod identity;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Fintrack Core tracing initialized.");
    });
}

/// Same as [`init`], using the log filter from `config`.
pub fn init_with_config(config: &config::Config) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing_with(&config.log_filter);
        tracing::info!("Fintrack Core tracing initialized.");
    });
}
