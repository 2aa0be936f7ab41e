//! Shared fixtures for orchestrator integration tests

#![allow(dead_code)]

pub mod bed;
pub mod config;
pub mod mock_gemini;
pub mod stores;

use std::sync::Once;

static INIT: Once = Once::new();

/// Route orchestrator logs through `RUST_LOG` once per test binary
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}
