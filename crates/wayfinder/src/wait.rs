//! Polling helpers for asynchronous UI state
//!
//! The remote application converges eventually: a provider refresh shows up
//! after a while, a utilization chart appears once data is collected.
//! [`wait_for`] polls a condition until it holds or the timeout expires.
//! [`wait_for_with`] additionally runs a fail action (typically a browser
//! refresh) between unsuccessful polls.

use crate::result::{NavError, NavResult};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
    /// Treat a condition error as "not yet" instead of aborting
    pub handle_errors: bool,
    /// Description used in logs
    pub message: Option<String>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            handle_errors: false,
            message: None,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Swallow condition errors until the timeout
    #[must_use]
    pub const fn handling_errors(mut self) -> Self {
        self.handle_errors = true;
        self
    }

    /// Set a description for logging
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Outcome of a successful wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitResult {
    /// Number of condition evaluations, including the successful one
    pub attempts: u32,
    /// Time spent waiting
    pub elapsed: Duration,
}

// =============================================================================
// WAIT FUNCTIONS
// =============================================================================

/// Poll `condition` until it returns `Ok(true)`.
///
/// The condition is always evaluated at least once, so a zero timeout
/// means "check exactly once".
///
/// # Errors
///
/// [`NavError::Timeout`] when the timeout expires, or the condition's own
/// error when `handle_errors` is off.
pub fn wait_for<F>(condition: F, options: &WaitOptions) -> NavResult<WaitResult>
where
    F: FnMut() -> NavResult<bool>,
{
    wait_for_with(condition, options, || Ok(()))
}

/// Like [`wait_for`], running `on_fail` after every unsuccessful poll that
/// will be followed by another one.
///
/// # Example
///
/// ```ignore
/// wait_for_with(
///     || Ok(browser.menu_item_enabled("Utilization")),
///     &WaitOptions::new().with_timeout(1_200_000).with_poll_interval(10_000),
///     || browser.refresh(),
/// )?;
/// ```
///
/// # Errors
///
/// As [`wait_for`]; an `on_fail` error aborts the wait.
pub fn wait_for_with<F, R>(
    mut condition: F,
    options: &WaitOptions,
    mut on_fail: R,
) -> NavResult<WaitResult>
where
    F: FnMut() -> NavResult<bool>,
    R: FnMut() -> NavResult<()>,
{
    let start = Instant::now();
    let timeout = options.timeout();
    let label = options.message.as_deref().unwrap_or("condition");
    let mut attempts = 0;

    loop {
        attempts += 1;
        match condition() {
            Ok(true) => {
                let elapsed = start.elapsed();
                debug!(label, attempts, ?elapsed, "wait satisfied");
                return Ok(WaitResult { attempts, elapsed });
            }
            Ok(false) => trace!(label, attempts, "wait condition not met"),
            Err(e) if options.handle_errors => {
                trace!(label, attempts, error = %e, "wait condition errored, ignoring");
            }
            Err(e) => return Err(e),
        }

        if start.elapsed() >= timeout {
            debug!(label, attempts, timeout_ms = options.timeout_ms, "wait timed out");
            return Err(NavError::Timeout {
                ms: options.timeout_ms,
            });
        }

        on_fail()?;
        // Never sleep past the deadline; the last poll lands on it
        let remaining = timeout.saturating_sub(start.elapsed());
        std::thread::sleep(options.poll_interval().min(remaining));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod wait_options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let opts = WaitOptions::default();
            assert_eq!(opts.timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
            assert_eq!(opts.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
            assert!(!opts.handle_errors);
            assert!(opts.message.is_none());
        }

        #[test]
        fn test_builder() {
            let opts = WaitOptions::new()
                .with_timeout(500)
                .with_poll_interval(5)
                .handling_errors()
                .with_message("zone listed");
            assert_eq!(opts.timeout(), Duration::from_millis(500));
            assert_eq!(opts.poll_interval(), Duration::from_millis(5));
            assert!(opts.handle_errors);
            assert_eq!(opts.message.as_deref(), Some("zone listed"));
        }
    }

    mod wait_for_tests {
        use super::*;

        fn fast() -> WaitOptions {
            WaitOptions::new().with_timeout(1_000).with_poll_interval(1)
        }

        #[test]
        fn test_immediate_success() {
            let result = wait_for(|| Ok(true), &fast()).unwrap();
            assert_eq!(result.attempts, 1);
        }

        #[test]
        fn test_eventual_success() {
            let mut polls = 0;
            let result = wait_for(
                || {
                    polls += 1;
                    Ok(polls >= 3)
                },
                &fast(),
            )
            .unwrap();
            assert_eq!(result.attempts, 3);
        }

        #[test]
        fn test_zero_timeout_checks_once() {
            let mut polls = 0;
            let err = wait_for(
                || {
                    polls += 1;
                    Ok(false)
                },
                &WaitOptions::new().with_timeout(0),
            )
            .unwrap_err();
            assert!(matches!(err, NavError::Timeout { ms: 0 }));
            assert_eq!(polls, 1);
        }

        #[test]
        fn test_timeout() {
            let opts = WaitOptions::new().with_timeout(20).with_poll_interval(5);
            let err = wait_for(|| Ok(false), &opts).unwrap_err();
            assert!(matches!(err, NavError::Timeout { ms: 20 }));
        }

        #[test]
        fn test_long_poll_interval_does_not_overshoot_timeout() {
            let started = Instant::now();
            let mut polls = 0;
            let err = wait_for(
                || {
                    polls += 1;
                    Ok(false)
                },
                &WaitOptions::new().with_timeout(50).with_poll_interval(1_000),
            )
            .unwrap_err();

            assert!(matches!(err, NavError::Timeout { ms: 50 }));
            assert!(started.elapsed() < Duration::from_millis(500));
            // Checked once up front and once at the deadline
            assert_eq!(polls, 2);
        }

        #[test]
        fn test_error_propagates() {
            let err = wait_for(|| Err(NavError::step_failed("poll", "boom")), &fast()).unwrap_err();
            assert!(matches!(err, NavError::StepFailed { .. }));
        }

        #[test]
        fn test_handled_errors_keep_polling() {
            let mut polls = 0;
            let result = wait_for(
                || {
                    polls += 1;
                    if polls < 3 {
                        Err(NavError::step_failed("poll", "not rendered"))
                    } else {
                        Ok(true)
                    }
                },
                &fast().handling_errors(),
            )
            .unwrap();
            assert_eq!(result.attempts, 3);
        }

        #[test]
        fn test_fail_action_runs_between_polls() {
            let mut polls = 0;
            let mut refreshes = 0;
            wait_for_with(
                || {
                    polls += 1;
                    Ok(polls == 4)
                },
                &fast(),
                || {
                    refreshes += 1;
                    Ok(())
                },
            )
            .unwrap();
            assert_eq!(refreshes, 3);
        }

        #[test]
        fn test_fail_action_error_aborts() {
            let err = wait_for_with(
                || Ok(false),
                &fast(),
                || Err(NavError::step_failed("refresh", "browser gone")),
            )
            .unwrap_err();
            assert!(matches!(err, NavError::StepFailed { .. }));
        }
    }
}
