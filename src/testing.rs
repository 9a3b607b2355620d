//! Helpers for test suites, enabled by the `test-utils` feature.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

use crate::time::{LogicalClock, VectorClock};

static INIT: Once = Once::new();

/// Installs a `tracing` subscriber that writes through the test harness.
/// Filtering follows `RUST_LOG`. Safe to call from every test.
pub fn init_test_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A logical clock ticked `ticks` times.
pub fn logical(ticks: u64) -> LogicalClock {
    let mut clock = LogicalClock::new();
    for _ in 0..ticks {
        clock.tick();
    }
    clock
}

/// A vector clock with each named process ticked the given number of times.
pub fn vector(entries: &[(&str, u64)]) -> VectorClock {
    let mut clock = VectorClock::new();
    for (name, ticks) in entries {
        for _ in 0..*ticks {
            clock.tick(name);
        }
    }
    clock
}
