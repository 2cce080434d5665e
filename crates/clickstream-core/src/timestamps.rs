use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

static OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%:z",
];

static NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parses an ISO-8601 instant. Values without an offset are taken as UTC; a bare date means
/// midnight. Returns `None` for anything else.
pub fn parse_event_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.and_utc());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn parses_rfc3339_with_zulu_and_offsets() {
        assert_eq!(
            parse_event_timestamp("2024-03-05T10:15:30Z"),
            Some(utc(2024, 3, 5, 10, 15, 30))
        );
        assert_eq!(
            parse_event_timestamp("2024-03-05T23:30:00-02:00"),
            Some(utc(2024, 3, 6, 1, 30, 0))
        );
        assert_eq!(
            parse_event_timestamp("2024-03-05T10:15:30+0100"),
            Some(utc(2024, 3, 5, 9, 15, 30))
        );
    }

    #[test]
    fn parses_naive_forms_as_utc() {
        assert_eq!(
            parse_event_timestamp("2024-03-05T10:15:30.123456"),
            Some(
                utc(2024, 3, 5, 10, 15, 30)
                    + chrono::Duration::microseconds(123_456)
            )
        );
        assert_eq!(
            parse_event_timestamp(" 2024-03-05 10:15:30 "),
            Some(utc(2024, 3, 5, 10, 15, 30))
        );
        assert_eq!(
            parse_event_timestamp("2024-03-05T10:15"),
            Some(utc(2024, 3, 5, 10, 15, 0))
        );
        assert_eq!(
            parse_event_timestamp("2024-03-05"),
            Some(utc(2024, 3, 5, 0, 0, 0))
        );
    }

    #[test]
    fn rejects_malformed_values() {
        for value in ["", "   ", "yesterday", "2024-13-01T00:00:00Z", "05/03/2024 10:00", "1709633730"] {
            assert_eq!(parse_event_timestamp(value), None, "{value:?} should not parse");
        }
    }
}
