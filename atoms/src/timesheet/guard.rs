use super::model::TimeRecord;

/// Duplicate-day rule: at most one time record may exist per calendar date,
/// system-wide, regardless of machine.
///
/// Returns the conflicting record so callers can show the operator which
/// machine and time range already occupy the date. This is an application
/// level pre-check, not a store constraint; a second writer can still land
/// between the check and the insert.
pub fn record_on_date<'a>(records: &'a [TimeRecord], date: &str) -> Option<&'a TimeRecord> {
    records.iter().find(|r| r.date == date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timesheet::model::TimeRecord;

    fn record(machine_id: &str, date: &str) -> TimeRecord {
        TimeRecord {
            record_id: format!("{}-{}", machine_id, date),
            machine_id: machine_id.to_string(),
            date: date.to_string(),
            start_time: "08:00".to_string(),
            end_time: "17:00".to_string(),
            regular_minutes: Some(480),
            ot_minutes: Some(0),
            break_minutes: Some(60),
            work_minutes: Some(480),
            duration: "8h 0m".to_string(),
            user_email: "op@example.com".to_string(),
            user_name: "Op".to_string(),
            created_at: String::new(),
        }
    }

    #[test]
    fn same_date_conflicts_regardless_of_machine() {
        let existing = vec![record("CNC-01", "2024-05-01")];
        let hit = record_on_date(&existing, "2024-05-01").unwrap();
        assert_eq!(hit.machine_id, "CNC-01");
        // A different machine on the same date is still a conflict.
        assert!(record_on_date(&existing, "2024-05-01").is_some());
    }

    #[test]
    fn other_dates_are_free() {
        let existing = vec![record("CNC-01", "2024-05-01"), record("CNC-02", "2024-05-03")];
        assert!(record_on_date(&existing, "2024-05-02").is_none());
        assert!(record_on_date(&existing, "2024-05-03").is_some());
    }

    #[test]
    fn empty_list_never_conflicts() {
        assert!(record_on_date(&[], "2024-05-01").is_none());
    }
}
