use chrono::{DateTime, Utc};

pub(crate) const NO_MESSAGES: &str = "No messages";
const SNIPPET_LEN: usize = 50;

/// Compact age label for a timestamp relative to `now`: "Now" under a
/// minute, then "{m}m" / "{h}h" / "{d}d", and a short month/day label
/// ("Feb 4") once a week has passed. Deterministic given both instants.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(then);
    let mins = diff.num_minutes();
    let hours = diff.num_hours();
    let days = diff.num_days();

    if mins < 1 {
        "Now".to_owned()
    } else if mins < 60 {
        format!("{mins}m")
    } else if hours < 24 {
        format!("{hours}h")
    } else if days < 7 {
        format!("{days}d")
    } else {
        then.format("%b %-d").to_string()
    }
}

/// Chat-list preview: the first 50 chars of the latest message, with an
/// ellipsis when the content was longer.
pub fn snippet(content: &str) -> String {
    let mut preview: String = content.chars().take(SNIPPET_LEN).collect();
    if content.chars().count() > SNIPPET_LEN {
        preview.push_str("...");
    }
    preview
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn time_ago_buckets() {
        let now = at(2024, 1, 10, 12, 0, 0);

        assert_eq!(time_ago(at(2024, 1, 10, 11, 59, 30), now), "Now");
        assert_eq!(time_ago(at(2024, 1, 10, 11, 45, 0), now), "15m");
        assert_eq!(time_ago(at(2024, 1, 10, 9, 0, 0), now), "3h");
        assert_eq!(time_ago(at(2024, 1, 8, 12, 0, 0), now), "2d");
        assert_eq!(time_ago(at(2023, 12, 1, 12, 0, 0), now), "Dec 1");
    }

    #[test]
    fn time_ago_boundaries() {
        let now = at(2024, 1, 10, 12, 0, 0);

        assert_eq!(time_ago(now, now), "Now");
        assert_eq!(time_ago(at(2024, 1, 10, 11, 59, 0), now), "1m");
        assert_eq!(time_ago(at(2024, 1, 10, 11, 0, 0), now), "1h");
        assert_eq!(time_ago(at(2024, 1, 9, 12, 0, 0), now), "1d");
        assert_eq!(time_ago(at(2024, 1, 3, 12, 0, 0), now), "Jan 3");
    }

    #[test]
    fn snippet_truncates_at_fifty_chars() {
        let long = "x".repeat(60);
        let cut = snippet(&long);
        assert_eq!(cut.len(), 53);
        assert!(cut.ends_with("..."));

        assert_eq!(snippet("hello"), "hello");
        assert_eq!(snippet(&"y".repeat(50)), "y".repeat(50));
    }

    #[test]
    fn snippet_respects_char_boundaries() {
        let cyrillic = "б".repeat(60);
        let cut = snippet(&cyrillic);
        assert_eq!(cut.chars().count(), 53);
    }
}
