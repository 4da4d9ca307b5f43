use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

use jobtrack_atoms::machines;
use jobtrack_atoms::timesheet::clock::{self, DEFAULT_COSTCENTER, DEFAULT_OT_RATE, DEFAULT_WAGE_RATE};
use jobtrack_atoms::timesheet::model::TimeRecord;
use jobtrack_atoms::timesheet::service::load_time_records;
use jobtrack_atoms::users::model::WageRates;
use jobtrack_atoms::users::service::load_wage_rates;

/// Summed minutes for one (machine, user) pair before rates are applied.
#[derive(Debug, Clone)]
pub struct GroupTotals {
    pub machine_id: String,
    pub user_email: String,
    pub user_name: String,
    pub regular_minutes: i64,
    pub ot_minutes: i64,
    pub record_count: usize,
}

/// One costed (machine, user) row of the summary.
#[derive(Debug, Serialize, Clone)]
pub struct CostLine {
    pub machine_id: String,
    pub user_email: String,
    pub user_name: String,
    pub costcenter: String,
    pub regular_hours: f64,
    pub ot_hours: f64,
    pub wage_rate: f64,
    pub ot_rate: f64,
    pub regular_cost: f64,
    pub ot_cost: f64,
    pub total_cost: f64,
    pub record_count: usize,
}

/// Per-costcenter rollup of cost lines.
#[derive(Debug, Serialize, Clone)]
pub struct CostcenterRollup {
    pub costcenter: String,
    pub regular_hours: f64,
    pub ot_hours: f64,
    pub regular_cost: f64,
    pub ot_cost: f64,
    pub total_cost: f64,
    pub machine_count: usize,
    pub user_count: usize,
    pub lines: Vec<CostLine>,
}

#[derive(Debug, Default, Serialize, Clone)]
pub struct CostTotals {
    pub regular_hours: f64,
    pub ot_hours: f64,
    pub regular_cost: f64,
    pub ot_cost: f64,
    pub total_cost: f64,
}

#[derive(Debug, Serialize)]
pub struct CostSummary {
    pub lines: Vec<CostLine>,
    pub costcenters: Vec<CostcenterRollup>,
    pub totals: CostTotals,
}

/// Partition records by (machine, user) and sum their minute buckets.
/// Records without a machine id are excluded entirely; rows lacking
/// precomputed buckets are derived from their stored time range.
pub fn group_records(records: &[TimeRecord]) -> Vec<GroupTotals> {
    let mut groups: BTreeMap<(String, String), GroupTotals> = BTreeMap::new();
    for record in records {
        if record.machine_id.is_empty() {
            continue;
        }
        let key = (record.machine_id.clone(), record.user_email.clone());
        let entry = groups.entry(key).or_insert_with(|| GroupTotals {
            machine_id: record.machine_id.clone(),
            user_email: record.user_email.clone(),
            user_name: record.user_name.clone(),
            regular_minutes: 0,
            ot_minutes: 0,
            record_count: 0,
        });
        let buckets = clock::record_minutes(record);
        entry.regular_minutes += buckets.regular_minutes;
        entry.ot_minutes += buckets.ot_minutes;
        entry.record_count += 1;
    }
    groups.into_values().collect()
}

/// Apply wage rates and costcenters to grouped minutes. Lookup misses fall
/// back to the named defaults; costs carry full precision (rounding is a
/// display concern).
pub fn price_groups(
    groups: Vec<GroupTotals>,
    wage_rates: &HashMap<String, WageRates>,
    costcenters: &HashMap<String, String>,
) -> Vec<CostLine> {
    groups
        .into_iter()
        .map(|group| {
            let regular_hours = group.regular_minutes as f64 / 60.0;
            let ot_hours = group.ot_minutes as f64 / 60.0;

            let (wage_rate, ot_rate) = match wage_rates.get(&group.user_email) {
                Some(rates) => (rates.wage_rate, rates.ot_rate),
                None => (DEFAULT_WAGE_RATE, DEFAULT_OT_RATE),
            };
            let costcenter = costcenters
                .get(&group.machine_id)
                .cloned()
                .unwrap_or_else(|| DEFAULT_COSTCENTER.to_string());

            let regular_cost = regular_hours * wage_rate;
            // ot_rate is an absolute hourly rate, not a multiplier on wage_rate
            let ot_cost = ot_hours * ot_rate;

            CostLine {
                machine_id: group.machine_id,
                user_email: group.user_email,
                user_name: group.user_name,
                costcenter,
                regular_hours,
                ot_hours,
                wage_rate,
                ot_rate,
                regular_cost,
                ot_cost,
                total_cost: regular_cost + ot_cost,
                record_count: group.record_count,
            }
        })
        .collect()
}

/// Re-group cost lines by costcenter with distinct machine/user counts.
pub fn rollup_by_costcenter(lines: &[CostLine]) -> Vec<CostcenterRollup> {
    let mut rollups: BTreeMap<String, CostcenterRollup> = BTreeMap::new();
    let mut machines_seen: HashMap<String, HashSet<String>> = HashMap::new();
    let mut users_seen: HashMap<String, HashSet<String>> = HashMap::new();

    for line in lines {
        let rollup = rollups
            .entry(line.costcenter.clone())
            .or_insert_with(|| CostcenterRollup {
                costcenter: line.costcenter.clone(),
                regular_hours: 0.0,
                ot_hours: 0.0,
                regular_cost: 0.0,
                ot_cost: 0.0,
                total_cost: 0.0,
                machine_count: 0,
                user_count: 0,
                lines: Vec::new(),
            });
        rollup.regular_hours += line.regular_hours;
        rollup.ot_hours += line.ot_hours;
        rollup.regular_cost += line.regular_cost;
        rollup.ot_cost += line.ot_cost;
        rollup.total_cost += line.total_cost;
        rollup.lines.push(line.clone());

        machines_seen
            .entry(line.costcenter.clone())
            .or_default()
            .insert(line.machine_id.clone());
        users_seen
            .entry(line.costcenter.clone())
            .or_default()
            .insert(line.user_email.clone());
    }

    let mut out: Vec<CostcenterRollup> = rollups.into_values().collect();
    for rollup in &mut out {
        rollup.machine_count = machines_seen
            .get(&rollup.costcenter)
            .map(|s| s.len())
            .unwrap_or(0);
        rollup.user_count = users_seen
            .get(&rollup.costcenter)
            .map(|s| s.len())
            .unwrap_or(0);
    }
    out
}

pub fn grand_totals(lines: &[CostLine]) -> CostTotals {
    let mut totals = CostTotals::default();
    for line in lines {
        totals.regular_hours += line.regular_hours;
        totals.ot_hours += line.ot_hours;
        totals.regular_cost += line.regular_cost;
        totals.ot_cost += line.ot_cost;
        totals.total_cost += line.total_cost;
    }
    totals
}

/// HTTP handler: GET /summary/costs
///
/// Costcenter lookups run per machine and are individually fallible; one
/// failed lookup defaults that machine to "N/A" without touching the rest.
pub async fn cost_summary_handler(
    client: &DynamoClient,
    table_name: &str,
) -> Result<Response<Body>, Error> {
    let records = match load_time_records(client, table_name, None).await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!("Failed to load time records for cost summary: {}", e);
            return Ok(Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header("Content-Type", "application/json")
                .header("Access-Control-Allow-Origin", "*")
                .body(serde_json::json!({ "error": e }).to_string().into())
                .map_err(Box::new)?);
        }
    };

    let groups = group_records(&records);

    let mut machine_ids: Vec<String> = groups.iter().map(|g| g.machine_id.clone()).collect();
    machine_ids.sort();
    machine_ids.dedup();

    let mut costcenters = HashMap::new();
    for machine_id in &machine_ids {
        let label = match machines::service::lookup_costcenter(client, table_name, machine_id).await
        {
            Ok(Some(label)) => label,
            Ok(None) => DEFAULT_COSTCENTER.to_string(),
            Err(e) => {
                tracing::error!("Costcenter lookup failed for {}: {}", machine_id, e);
                DEFAULT_COSTCENTER.to_string()
            }
        };
        costcenters.insert(machine_id.clone(), label);
    }

    let mut emails: Vec<String> = groups.iter().map(|g| g.user_email.clone()).collect();
    emails.sort();
    emails.dedup();
    let wage_rates = load_wage_rates(client, table_name, &emails).await;

    let lines = price_groups(groups, &wage_rates, &costcenters);
    let summary = CostSummary {
        costcenters: rollup_by_costcenter(&lines),
        totals: grand_totals(&lines),
        lines,
    };

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(&summary)?.into())
        .map_err(Box::new)?)
}
