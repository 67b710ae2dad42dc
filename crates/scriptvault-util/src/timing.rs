//! RAII-based timing for dispatched requests.
//!
//! ```rust,ignore
//! use scriptvault_util::timing::TimingGuard;
//!
//! async fn handle(operation: &str) {
//!     let _timing = TimingGuard::request(operation);
//!     // ... run the operation ...
//! }
//! ```

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Logs the elapsed time of an operation when dropped.
///
/// Durations below the info threshold are logged at debug level, durations
/// at or above the warn threshold are reported as slow.
pub struct TimingGuard {
    operation_type: &'static str,
    operation_name: String,
    start: Instant,
    info_threshold_ms: u64,
    warn_threshold_ms: u64,
}

impl TimingGuard {
    /// Create a new timing guard.
    pub fn new(operation_type: &'static str, operation_name: impl Into<String>) -> Self {
        let operation_name = operation_name.into();
        debug!(
            operation_type = operation_type,
            operation_name = %operation_name,
            "Starting operation"
        );
        Self {
            operation_type,
            operation_name,
            start: Instant::now(),
            info_threshold_ms: 100,
            warn_threshold_ms: 5000,
        }
    }

    /// Timing guard for one dispatched request.
    pub fn request(operation: impl Into<String>) -> Self {
        Self::new("request", operation)
    }

    /// Set the threshold for info-level logging (in milliseconds).
    pub fn with_info_threshold(mut self, ms: u64) -> Self {
        self.info_threshold_ms = ms;
        self
    }

    /// Set the threshold for warn-level logging (in milliseconds).
    pub fn with_warn_threshold(mut self, ms: u64) -> Self {
        self.warn_threshold_ms = ms;
        self
    }

    /// Get the elapsed time so far.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Render a duration the way operators read it in logs.
fn human_duration(duration: Duration) -> String {
    let ms = duration.as_millis();
    match ms {
        0..=999 => format!("{ms}ms"),
        1000..=59_999 => format!("{:.2}s", ms as f64 / 1000.0),
        _ => format!("{}m {:.1}s", ms / 60_000, (ms % 60_000) as f64 / 1000.0),
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let duration_ms = duration.as_millis() as u64;
        let pretty = human_duration(duration);

        if duration_ms >= self.warn_threshold_ms {
            warn!(
                operation_type = self.operation_type,
                operation_name = %self.operation_name,
                duration_ms,
                duration = %pretty,
                "Slow operation completed"
            );
        } else if duration_ms >= self.info_threshold_ms {
            info!(
                operation_type = self.operation_type,
                operation_name = %self.operation_name,
                duration_ms,
                duration = %pretty,
                "Operation completed"
            );
        } else {
            debug!(
                operation_type = self.operation_type,
                operation_name = %self.operation_name,
                duration_ms,
                duration = %pretty,
                "Operation completed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_timing_guard_measures_elapsed() {
        let guard = TimingGuard::request("store");
        sleep(Duration::from_millis(10));
        assert!(guard.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_timing_guard_thresholds() {
        let guard = TimingGuard::new("test", "thresholds")
            .with_info_threshold(0)
            .with_warn_threshold(1000);
        drop(guard);
    }

    #[test]
    fn test_human_duration() {
        assert_eq!(human_duration(Duration::from_millis(42)), "42ms");
        assert_eq!(human_duration(Duration::from_millis(1500)), "1.50s");
        assert_eq!(human_duration(Duration::from_millis(61_000)), "1m 1.0s");
    }
}
