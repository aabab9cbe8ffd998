//! Test support: one-time tracing setup for unit and integration tests

use std::sync::Once;

use tracing::info;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when RUST_LOG is unset; the AWS SDK crates are noisy at debug.
const DEFAULT_TEST_FILTER: &str = "cb=debug";

static TEST_SETUP: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// Safe to call from every test; later calls are no-ops, and an already
/// installed global subscriber is left alone.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_TEST_FILTER));

        let layer = fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(filter);

        if tracing_subscriber::registry().with(layer).try_init().is_ok() {
            info!("test logging initialised");
        }
    });
}
