//! Snapshot data structures.

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use regex::Regex;
use scriptvault_provider::SourceFile;
use serde::{Deserialize, Serialize};

/// One captured version of a project's full source.
///
/// Snapshots are never edited after capture; the log only grows by append
/// and shrinks by delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// ISO-8601 UTC capture time, millisecond precision. Also the snapshot's
    /// identity for revert and delete (exact string match).
    pub timestamp: String,

    /// Files in provider order.
    pub files: Vec<SourceFile>,
}

impl Snapshot {
    pub fn new(timestamp: impl Into<String>, files: Vec<SourceFile>) -> Self {
        Self {
            timestamp: timestamp.into(),
            files,
        }
    }

    /// Capture `files` now, stamped strictly after `previous`.
    pub fn capture(files: Vec<SourceFile>, previous: Option<&Snapshot>) -> Self {
        let timestamp = next_timestamp(Utc::now(), previous.map(|s| s.timestamp.as_str()));
        Self { timestamp, files }
    }

    /// True if any file's source matches.
    pub fn matches(&self, pattern: &Regex) -> bool {
        self.files.iter().any(|f| pattern.is_match(&f.source))
    }
}

/// Format an instant the way timestamps are persisted: `2024-05-01T12:00:00.123Z`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Timestamp for a snapshot captured at `now`, given the last timestamp in
/// the log.
///
/// A clock that has not advanced past `last` (same millisecond, or skewed
/// backwards) yields `last + 1ms`, so appends stay strictly ordered. An
/// unparseable `last` is ignored.
pub fn next_timestamp(now: DateTime<Utc>, last: Option<&str>) -> String {
    let now = now.trunc_subsecs(3);
    let last = last
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        .map(|t| t.with_timezone(&Utc));

    match last {
        Some(last) if now <= last => format_timestamp(last + Duration::milliseconds(1)),
        _ => format_timestamp(now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn test_format_matches_iso_millis() {
        let ts = format_timestamp(at(1_714_564_800_123));
        assert_eq!(ts, "2024-05-01T12:00:00.123Z");
    }

    #[test]
    fn test_next_timestamp_uses_clock_when_ahead() {
        let last = format_timestamp(at(1_000));
        assert_eq!(next_timestamp(at(2_000), Some(&last)), format_timestamp(at(2_000)));
        assert_eq!(next_timestamp(at(2_000), None), format_timestamp(at(2_000)));
    }

    #[test]
    fn test_next_timestamp_bumps_same_millisecond() {
        let last = format_timestamp(at(5_000));
        let now = at(5_000) + Duration::microseconds(400);
        assert_eq!(next_timestamp(now, Some(&last)), format_timestamp(at(5_001)));
    }

    #[test]
    fn test_next_timestamp_bumps_skewed_clock() {
        let last = format_timestamp(at(9_000));
        assert_eq!(next_timestamp(at(3_000), Some(&last)), format_timestamp(at(9_001)));
    }

    #[test]
    fn test_next_timestamp_ignores_garbage_last() {
        assert_eq!(
            next_timestamp(at(3_000), Some("yesterday")),
            format_timestamp(at(3_000))
        );
    }

    #[test]
    fn test_matches_any_file() {
        let snapshot = Snapshot::new(
            "t",
            vec![
                SourceFile::script("A", "const x = 1;"),
                SourceFile::script("B", "function Foo() {}"),
            ],
        );
        assert!(snapshot.matches(&Regex::new("(?i)foo").unwrap()));
        assert!(!snapshot.matches(&Regex::new("bar").unwrap()));
    }

    #[test]
    fn test_persisted_shape() {
        let snapshot = Snapshot::new("2024-05-01T12:00:00.123Z", vec![SourceFile::script("Code", "x")]);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "timestamp": "2024-05-01T12:00:00.123Z",
                "files": [{"name": "Code", "kind": "SERVER_JS", "source": "x"}]
            })
        );
    }
}
