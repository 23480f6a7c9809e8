//! Shared helpers for taskdag's integration tests.
//!
//! - [`builders`]: the `foo -> bar -> baz` workflow and failing variants
//! - [`recorder`]: captures a workflow's event stream for assertions
//! - [`recording_executor`]: a custom strategy that logs what it ran

pub mod builders;
pub mod recorder;
pub mod recording_executor;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use taskdag::logging::LOG_ENV_VAR;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Per-test timeout used by [`with_timeout`].
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Initialise tracing for tests.
///
/// Logs go through `with_test_writer()`, so the harness only shows them for
/// failing tests (or with `-- --nocapture`). The filter is read from
/// `TASKDAG_LOG`, then `RUST_LOG`, and defaults to `info`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await `f`, failing the test if a run hangs (a lost completion signal in
/// an executor shows up this way).
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(TEST_TIMEOUT, f)
        .await
        .expect("Test timed out after 5 seconds")
}
