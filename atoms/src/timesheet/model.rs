use serde::{Deserialize, Serialize};

/// One day's logged start/end time for one machine by one user.
///
/// Minute buckets are Options because legacy rows predate the derived
/// columns; readers go through `clock::record_minutes` instead of touching
/// the raw fields.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TimeRecord {
    pub record_id: String,
    pub machine_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub regular_minutes: Option<i64>,
    pub ot_minutes: Option<i64>,
    pub break_minutes: Option<i64>,
    pub work_minutes: Option<i64>,
    pub duration: String,
    pub user_email: String,
    pub user_name: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateTimeRecordPayload {
    pub machine_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}
