use serde::{Deserialize, Serialize};

/// Allow-list entry - one row per user permitted into the system.
/// wage_rate/ot_rate are hourly currency amounts; absent values fall back
/// to the defaults in `timesheet::clock` at aggregation time.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AllowedUser {
    pub email: String,
    pub user_name: String,
    pub position: String,
    pub is_electrical_responsible: bool,
    pub wage_rate: Option<f64>,
    pub ot_rate: Option<f64>,
}

/// Resolved hourly rates for one user; defaults already applied.
#[derive(Debug, Serialize, Clone, Copy)]
pub struct WageRates {
    pub wage_rate: f64,
    pub ot_rate: f64,
}
