//! Bounded wait for an externally launched process to exit.
//!
//! The external tool is fire-and-forget, so completion is observed by
//! polling the process table rather than holding a child handle. The tool
//! runs for a few seconds at most; a 500 ms poll is small relative to that,
//! and the only cancellation point is the timeout itself.

use std::thread;
use std::time::{Duration, Instant};

use sysinfo::System;
use tracing::debug;

/// Default interval between process-table polls.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// The watched process outlived the allowed wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitTimedOut {
    pub process: String,
    pub timeout: Duration,
}

/// Polls the process table until a named process disappears.
pub struct CompletionWatcher {
    poll_interval: Duration,
}

impl Default for CompletionWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionWatcher {
    pub fn new() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Mostly for tests; production callers keep the default interval.
    pub fn with_poll_interval(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// Block until no running process matches `process_name`
    /// (case-insensitively), or until `timeout` elapses.
    ///
    /// Succeeds immediately if no match exists at the first poll. Blocks the
    /// calling thread; callers wanting responsiveness run the whole
    /// collection off their main thread.
    pub fn await_exit(&self, process_name: &str, timeout: Duration) -> Result<(), WaitTimedOut> {
        let wanted = process_name.to_lowercase();
        let mut sys = System::new();

        let gone = || {
            sys.refresh_processes();
            !sys
                .processes()
                .values()
                .any(|p| p.name().to_lowercase() == wanted)
        };

        if self.wait_until_gone(timeout, gone) {
            debug!("process {} has exited", process_name);
            Ok(())
        } else {
            Err(WaitTimedOut {
                process: process_name.to_string(),
                timeout,
            })
        }
    }

    /// Poll loop over an arbitrary liveness probe. Returns true as soon as
    /// the probe reports the process gone, false once elapsed wall time
    /// exceeds the timeout.
    fn wait_until_gone(&self, timeout: Duration, mut gone: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        loop {
            if gone() {
                return true;
            }
            if start.elapsed() > timeout {
                return false;
            }
            thread::sleep(self.poll_interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_watcher() -> CompletionWatcher {
        CompletionWatcher::with_poll_interval(Duration::from_millis(1))
    }

    #[test]
    fn returns_immediately_when_process_already_gone() {
        let ok = fast_watcher().wait_until_gone(Duration::from_secs(1), || true);
        assert!(ok);
    }

    #[test]
    fn waits_through_simulated_lifetime() {
        let mut polls_left = 3;
        let ok = fast_watcher().wait_until_gone(Duration::from_secs(1), || {
            if polls_left == 0 {
                true
            } else {
                polls_left -= 1;
                false
            }
        });
        assert!(ok);
    }

    #[test]
    fn times_out_when_process_never_exits() {
        let ok = fast_watcher().wait_until_gone(Duration::from_millis(10), || false);
        assert!(!ok);
    }

    #[test]
    fn await_exit_succeeds_for_absent_process() {
        let result = fast_watcher().await_exit(
            "drivesense-no-such-process.exe",
            Duration::from_millis(100),
        );
        assert!(result.is_ok());
    }
}
