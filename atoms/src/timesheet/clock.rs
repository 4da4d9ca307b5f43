use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::model::TimeRecord;

/// Daily threshold between regular and overtime work.
pub const REGULAR_SHIFT_MINUTES: i64 = 480;
/// Fixed lunch deduction applied when raw elapsed time exceeds 8 hours.
pub const LUNCH_BREAK_MINUTES: i64 = 60;
/// Hourly wage applied when a user has no wage_rate row.
pub const DEFAULT_WAGE_RATE: f64 = 350.0;
/// Hourly OT rate applied when a user has no ot_rate row (absolute rate, not a multiplier).
pub const DEFAULT_OT_RATE: f64 = 525.0;
/// Costcenter label used when a machine has no costcenter row.
pub const DEFAULT_COSTCENTER: &str = "N/A";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MinuteBuckets {
    pub regular_minutes: i64,
    pub ot_minutes: i64,
    pub break_minutes: i64,
    pub work_minutes: i64,
}

/// Normalize flexible operator input into canonical "HH:MM".
///
/// Accepted forms, in order: "830"/"0830" (HHMM), "8" (hour only),
/// "8:" (hour only), "8:30"/"8:3" (hour:minute). Anything else, or an
/// out-of-range hour/minute, is None.
pub fn normalize_time(raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    let all_digits = value.chars().all(|c| c.is_ascii_digit());

    // 3-4 digit string: left-pad to 4 and read as HHMM
    if all_digits && (value.len() == 3 || value.len() == 4) {
        let digits = format!("{:0>4}", value);
        let hour: u32 = digits[0..2].parse().ok()?;
        let minute: u32 = digits[2..4].parse().ok()?;
        return hhmm(hour, minute);
    }

    // 1-2 digit string: hour, minute defaults to 00
    if all_digits && value.len() <= 2 {
        let hour: u32 = value.parse().ok()?;
        return hhmm(hour, 0);
    }

    // "H:" / "HH:": hour, minute defaults to 00
    if let Some(head) = value.strip_suffix(':') {
        if !head.is_empty() && head.len() <= 2 && head.chars().all(|c| c.is_ascii_digit()) {
            let hour: u32 = head.parse().ok()?;
            return hhmm(hour, 0);
        }
        return None;
    }

    // "H:M" / "HH:MM"
    let (h, m) = value.split_once(':')?;
    if h.is_empty() || h.len() > 2 || m.is_empty() || m.len() > 2 {
        return None;
    }
    if !h.chars().all(|c| c.is_ascii_digit()) || !m.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hour: u32 = h.parse().ok()?;
    let minute: u32 = m.parse().ok()?;
    hhmm(hour, minute)
}

fn hhmm(hour: u32, minute: u32) -> Option<String> {
    if hour <= 23 && minute <= 59 {
        Some(format!("{:02}:{:02}", hour, minute))
    } else {
        None
    }
}

/// Split a worked interval on one calendar date into minute buckets.
///
/// Unparseable input degrades to all-zero buckets instead of an error so
/// display paths never fail on bad legacy rows. An end at or before the
/// start also yields zeros; there is no past-midnight wrap.
pub fn compute_minutes(date: &str, start_time: &str, end_time: &str) -> MinuteBuckets {
    let (start, end) = match (datetime_on(date, start_time), datetime_on(date, end_time)) {
        (Some(s), Some(e)) => (s, e),
        _ => return MinuteBuckets::default(),
    };

    let raw_minutes = (end - start).num_minutes().max(0);
    let break_minutes = if raw_minutes > REGULAR_SHIFT_MINUTES {
        LUNCH_BREAK_MINUTES
    } else {
        0
    };
    let work_minutes = (raw_minutes - break_minutes).max(0);
    let regular_minutes = work_minutes.min(REGULAR_SHIFT_MINUTES);
    let ot_minutes = (work_minutes - REGULAR_SHIFT_MINUTES).max(0);

    MinuteBuckets {
        regular_minutes,
        ot_minutes,
        break_minutes,
        work_minutes,
    }
}

fn datetime_on(date: &str, time: &str) -> Option<NaiveDateTime> {
    let d = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let t = NaiveTime::parse_from_str(time, "%H:%M").ok()?;
    Some(d.and_time(t))
}

/// Minute buckets for a stored record. Precomputed fields win when all
/// three are present (new rows); otherwise the buckets are derived from the
/// stored date and time range (legacy rows). Anything unusable is zeros.
pub fn record_minutes(record: &TimeRecord) -> MinuteBuckets {
    if let (Some(regular), Some(ot), Some(brk)) = (
        record.regular_minutes,
        record.ot_minutes,
        record.break_minutes,
    ) {
        return MinuteBuckets {
            regular_minutes: regular,
            ot_minutes: ot,
            break_minutes: brk,
            work_minutes: regular + ot,
        };
    }

    if record.date.is_empty() || record.start_time.is_empty() || record.end_time.is_empty() {
        return MinuteBuckets::default();
    }

    let start = match normalize_time(trim_seconds(&record.start_time)) {
        Some(t) => t,
        None => return MinuteBuckets::default(),
    };
    let end = match normalize_time(trim_seconds(&record.end_time)) {
        Some(t) => t,
        None => return MinuteBuckets::default(),
    };

    compute_minutes(&record.date, &start, &end)
}

// Some stores hand back "HH:MM:SS" for time columns; keep only "HH:MM".
// Stored strings are untrusted, so the cut must not assume byte 5 is a char
// boundary; anything unsliceable passes through for normalize to reject.
fn trim_seconds(time: &str) -> &str {
    if time.len() > 5 && time.as_bytes().get(2) == Some(&b':') {
        time.get(..5).unwrap_or(time)
    } else {
        time
    }
}

/// Human-readable duration, e.g. "8h 30m". Negative input clamps to zero.
pub fn format_duration_minutes(total_minutes: i64) -> String {
    let total = total_minutes.max(0);
    format!("{}h {}m", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        date: &str,
        start: &str,
        end: &str,
        buckets: Option<(i64, i64, i64)>,
    ) -> TimeRecord {
        TimeRecord {
            record_id: "r1".to_string(),
            machine_id: "M-01".to_string(),
            date: date.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            regular_minutes: buckets.map(|b| b.0),
            ot_minutes: buckets.map(|b| b.1),
            break_minutes: buckets.map(|b| b.2),
            work_minutes: buckets.map(|b| b.0 + b.1),
            duration: String::new(),
            user_email: "op@example.com".to_string(),
            user_name: "Op".to_string(),
            created_at: String::new(),
        }
    }

    #[test]
    fn normalize_digit_forms() {
        assert_eq!(normalize_time("830").as_deref(), Some("08:30"));
        assert_eq!(normalize_time("0830").as_deref(), Some("08:30"));
        assert_eq!(normalize_time("1745").as_deref(), Some("17:45"));
        assert_eq!(normalize_time("8").as_deref(), Some("08:00"));
        assert_eq!(normalize_time("17").as_deref(), Some("17:00"));
    }

    #[test]
    fn normalize_colon_forms() {
        assert_eq!(normalize_time("8:").as_deref(), Some("08:00"));
        assert_eq!(normalize_time("8:30").as_deref(), Some("08:30"));
        assert_eq!(normalize_time("8:3").as_deref(), Some("08:03"));
        assert_eq!(normalize_time("08:30").as_deref(), Some("08:30"));
        assert_eq!(normalize_time(" 08:30 ").as_deref(), Some("08:30"));
    }

    #[test]
    fn normalize_rejects_out_of_range_and_junk() {
        assert_eq!(normalize_time("25:00"), None);
        assert_eq!(normalize_time("12:60"), None);
        assert_eq!(normalize_time("2500"), None);
        assert_eq!(normalize_time("abc"), None);
        assert_eq!(normalize_time("8:3b"), None);
        assert_eq!(normalize_time(""), None);
        assert_eq!(normalize_time(":30"), None);
        assert_eq!(normalize_time("12345"), None);
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in ["830", "8", "8:", "8:3", "08:30", "23:59", "0"] {
            let once = normalize_time(raw).unwrap();
            assert_eq!(normalize_time(&once).as_deref(), Some(once.as_str()));
        }
    }

    #[test]
    fn nine_hour_shift_deducts_lunch() {
        let b = compute_minutes("2024-05-01", "08:00", "17:00");
        assert_eq!(b.break_minutes, 60);
        assert_eq!(b.work_minutes, 480);
        assert_eq!(b.regular_minutes, 480);
        assert_eq!(b.ot_minutes, 0);
    }

    #[test]
    fn twelve_hour_shift_splits_overtime() {
        let b = compute_minutes("2024-05-01", "08:00", "20:00");
        assert_eq!(b.break_minutes, 60);
        assert_eq!(b.work_minutes, 660);
        assert_eq!(b.regular_minutes, 480);
        assert_eq!(b.ot_minutes, 180);
    }

    #[test]
    fn short_shift_has_no_break_or_ot() {
        let b = compute_minutes("2024-05-01", "08:00", "16:00");
        assert_eq!(b.break_minutes, 0);
        assert_eq!(b.work_minutes, 480);
        assert_eq!(b.regular_minutes, 480);
        assert_eq!(b.ot_minutes, 0);

        let b = compute_minutes("2024-05-01", "09:00", "12:30");
        assert_eq!(b.work_minutes, 210);
        assert_eq!(b.regular_minutes, 210);
        assert_eq!(b.ot_minutes, 0);
    }

    #[test]
    fn end_before_start_is_all_zero() {
        let b = compute_minutes("2024-05-01", "17:00", "08:00");
        assert_eq!(b, MinuteBuckets::default());
        let b = compute_minutes("2024-05-01", "08:00", "08:00");
        assert_eq!(b, MinuteBuckets::default());
    }

    #[test]
    fn bad_input_is_all_zero_not_an_error() {
        assert_eq!(compute_minutes("not-a-date", "08:00", "17:00"), MinuteBuckets::default());
        assert_eq!(compute_minutes("2024-05-01", "junk", "17:00"), MinuteBuckets::default());
        assert_eq!(compute_minutes("2024-05-01", "08:00", ""), MinuteBuckets::default());
    }

    #[test]
    fn work_always_equals_regular_plus_ot() {
        for (s, e) in [("06:15", "14:45"), ("08:00", "22:10"), ("00:00", "23:59")] {
            let b = compute_minutes("2024-05-01", s, e);
            assert_eq!(b.regular_minutes + b.ot_minutes, b.work_minutes);
        }
    }

    #[test]
    fn record_minutes_prefers_stored_buckets() {
        // Stored buckets disagree with the time range on purpose: stored wins.
        let r = record("2024-05-01", "08:00", "20:00", Some((480, 0, 60)));
        let b = record_minutes(&r);
        assert_eq!(b.regular_minutes, 480);
        assert_eq!(b.ot_minutes, 0);
        assert_eq!(b.work_minutes, 480);
    }

    #[test]
    fn record_minutes_derives_for_legacy_rows() {
        let r = record("2024-05-01", "08:00:00", "20:00:00", None);
        let b = record_minutes(&r);
        assert_eq!(b.regular_minutes, 480);
        assert_eq!(b.ot_minutes, 180);
        assert_eq!(b.break_minutes, 60);
    }

    #[test]
    fn record_minutes_zero_on_unusable_rows() {
        let r = record("", "08:00", "17:00", None);
        assert_eq!(record_minutes(&r), MinuteBuckets::default());
        let r = record("2024-05-01", "garbage", "17:00", None);
        assert_eq!(record_minutes(&r), MinuteBuckets::default());
    }

    #[test]
    fn record_minutes_degrades_on_multibyte_time_strings() {
        // Legacy rows can hold arbitrary text; a multibyte char around the
        // seconds cut must degrade to zeros, not panic.
        let r = record("2024-05-01", "08:3é", "17:00:00", None);
        assert_eq!(record_minutes(&r), MinuteBuckets::default());
        let r = record("2024-05-01", "08:00:00", "17:0é0", None);
        assert_eq!(record_minutes(&r), MinuteBuckets::default());
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration_minutes(480), "8h 0m");
        assert_eq!(format_duration_minutes(505), "8h 25m");
        assert_eq!(format_duration_minutes(0), "0h 0m");
        assert_eq!(format_duration_minutes(-30), "0h 0m");
    }
}
