//! Staggered polling schedule.
//!
//! Status is checked every second for the first few seconds, then every ten
//! seconds, then once a minute.

use std::time::Duration;

/// Poll interval while the query is young.
const FAST_WAIT: Duration = Duration::from_secs(1);

/// Poll interval for the first minute.
const MEDIUM_WAIT: Duration = Duration::from_secs(10);

/// Poll interval after the first minute.
const SLOW_WAIT: Duration = Duration::from_secs(60);

/// Elapsed time after which polling slows to `MEDIUM_WAIT`.
const FAST_UNTIL: Duration = Duration::from_secs(5);

/// Elapsed time after which polling slows to `SLOW_WAIT`.
const MEDIUM_UNTIL: Duration = Duration::from_secs(60);

/// Returns the wait before the next status check.
pub fn wait_time(elapsed: Duration) -> Duration {
    if elapsed < FAST_UNTIL {
        FAST_WAIT
    } else if elapsed < MEDIUM_UNTIL {
        MEDIUM_WAIT
    } else {
        SLOW_WAIT
    }
}

/// Returns the wait before the next status check, capped so the check
/// lands no later than `timeout`.
pub fn next_wait(elapsed: Duration, timeout: Duration) -> Duration {
    wait_time(elapsed).min(timeout.saturating_sub(elapsed))
}
