//
//  tf-collect
//  util/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Utility Module
//!
//! Small formatting helpers used by the report renderers.
//!
//! ## Categories
//!
//! - **Time Utilities**: [`format_timestamp`], [`format_duration`]
//! - **String Utilities**: [`truncate`], [`first_line`]
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use tf_collect::util::{format_duration, truncate};
//!
//! assert_eq!(format_duration(Duration::from_secs(75)), "1m 15s");
//! assert_eq!(truncate("fatal: could not read from remote", 12), "fatal: co...");
//! ```

use std::time::Duration;

use chrono::{DateTime, Local, Utc};

/// Formats a UTC timestamp in the local timezone as `YYYY-MM-DD HH:MM:SS`.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Formats a duration into a compact human-readable string.
///
/// # Returns
///
/// | Duration | Output |
/// |----------|--------|
/// | < 1 second | `"850ms"` |
/// | < 1 minute | `"42s"` |
/// | < 1 hour | `"5m 30s"` |
/// | otherwise | `"2h 15m"` |
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs == 0 {
        format!("{}ms", duration.as_millis())
    } else if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

/// Truncates a string to at most `max_len` characters, appending `...` when
/// something was cut.
///
/// # Notes
///
/// - Counts characters, not bytes, so multi-byte text is never split
/// - When `max_len` is 3 or less, the string is simply cut without ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{kept}...")
    } else {
        s.chars().take(max_len).collect()
    }
}

/// The first non-empty line of `s`, trimmed.
///
/// Tool diagnostics often span many lines; tables show only the first.
pub fn first_line(s: &str) -> &str {
    s.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("short", 3), "sho");
        assert_eq!(truncate("ñandú-terraform", 6), "ñan...");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(850)), "850ms");
        assert_eq!(format_duration(Duration::from_secs(42)), "42s");
        assert_eq!(format_duration(Duration::from_secs(330)), "5m 30s");
        assert_eq!(format_duration(Duration::from_secs(8100)), "2h 15m");
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("\n  fatal: nope \nhint: more"), "fatal: nope");
        assert_eq!(first_line(""), "");
    }
}
