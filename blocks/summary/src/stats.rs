use aws_sdk_dynamodb::Client as DynamoClient;
use chrono::{Datelike, NaiveDate};
use lambda_http::{http::StatusCode, Body, Error, Response};
use serde::Serialize;
use std::collections::HashSet;

use jobtrack_atoms::jobs::model::Job;
use jobtrack_atoms::jobs::service::load_jobs;
use jobtrack_atoms::timesheet::model::TimeRecord;
use jobtrack_atoms::timesheet::service::load_time_records;

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct TimeStats {
    pub total_records: usize,
    pub total_work_minutes: i64,
    pub total_ot_minutes: i64,
    pub avg_work_minutes: i64,
    pub unique_machines: usize,
    pub this_month_records: usize,
    pub today_records: usize,
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct JobStats {
    pub total_jobs: usize,
    pub open_jobs: usize,
    pub closed_jobs: usize,
    pub this_month_jobs: usize,
    /// Mean open->close span of closed jobs, rounded to whole days.
    pub avg_job_duration_days: i64,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub time: TimeStats,
    pub jobs: JobStats,
}

pub fn time_stats(records: &[TimeRecord], today: NaiveDate) -> TimeStats {
    if records.is_empty() {
        return TimeStats::default();
    }

    let today_str = today.format("%Y-%m-%d").to_string();
    let mut total_work_minutes = 0;
    let mut total_ot_minutes = 0;
    let mut machines = HashSet::new();
    let mut this_month_records = 0;
    let mut today_records = 0;

    for record in records {
        total_work_minutes += record.work_minutes.unwrap_or(0);
        total_ot_minutes += record.ot_minutes.unwrap_or(0);
        machines.insert(record.machine_id.clone());
        if let Ok(date) = NaiveDate::parse_from_str(&record.date, "%Y-%m-%d") {
            if date.month() == today.month() && date.year() == today.year() {
                this_month_records += 1;
            }
        }
        if record.date == today_str {
            today_records += 1;
        }
    }

    TimeStats {
        total_records: records.len(),
        total_work_minutes,
        total_ot_minutes,
        avg_work_minutes: (total_work_minutes as f64 / records.len() as f64).round() as i64,
        unique_machines: machines.len(),
        this_month_records,
        today_records,
    }
}

pub fn job_stats(jobs: &[Job], today: NaiveDate) -> JobStats {
    if jobs.is_empty() {
        return JobStats::default();
    }

    let open_jobs = jobs.iter().filter(|j| j.status == "open").count();
    let closed_jobs = jobs.iter().filter(|j| j.status == "closed").count();

    let this_month_jobs = jobs
        .iter()
        .filter(|j| {
            NaiveDate::parse_from_str(&j.open_date, "%Y-%m-%d")
                .map(|d| d.month() == today.month() && d.year() == today.year())
                .unwrap_or(false)
        })
        .count();

    let mut completed_days = Vec::new();
    for job in jobs {
        if job.status != "closed" {
            continue;
        }
        let close_date = match &job.close_date {
            Some(d) => d,
            None => continue,
        };
        if let (Ok(open), Ok(close)) = (
            NaiveDate::parse_from_str(&job.open_date, "%Y-%m-%d"),
            NaiveDate::parse_from_str(close_date, "%Y-%m-%d"),
        ) {
            completed_days.push((close - open).num_days().max(0));
        }
    }

    let avg_job_duration_days = if completed_days.is_empty() {
        0
    } else {
        let mean = completed_days.iter().sum::<i64>() as f64 / completed_days.len() as f64;
        mean.round() as i64
    };

    JobStats {
        total_jobs: jobs.len(),
        open_jobs,
        closed_jobs,
        this_month_jobs,
        avg_job_duration_days,
    }
}

/// HTTP handler: GET /summary/stats
pub async fn stats_handler(
    client: &DynamoClient,
    table_name: &str,
) -> Result<Response<Body>, Error> {
    let (jobs_result, records_result) = tokio::join!(
        load_jobs(client, table_name, None, None),
        load_time_records(client, table_name, None)
    );

    let jobs = jobs_result.map_err(|e| {
        Box::new(std::io::Error::new(std::io::ErrorKind::Other, e))
            as Box<dyn std::error::Error + Send + Sync>
    })?;
    let records = records_result.map_err(|e| {
        Box::new(std::io::Error::new(std::io::ErrorKind::Other, e))
            as Box<dyn std::error::Error + Send + Sync>
    })?;

    let today = chrono::Utc::now().date_naive();
    let stats = DashboardStats {
        time: time_stats(&records, today),
        jobs: job_stats(&jobs, today),
    };

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(&stats)?.into())
        .map_err(Box::new)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(machine: &str, date: &str, work: i64, ot: i64) -> TimeRecord {
        TimeRecord {
            record_id: format!("{}-{}", machine, date),
            machine_id: machine.to_string(),
            date: date.to_string(),
            start_time: "08:00".to_string(),
            end_time: "17:00".to_string(),
            regular_minutes: Some(work - ot),
            ot_minutes: Some(ot),
            break_minutes: Some(0),
            work_minutes: Some(work),
            duration: String::new(),
            user_email: "op@example.com".to_string(),
            user_name: "Op".to_string(),
            created_at: String::new(),
        }
    }

    fn job(status: &str, open_date: &str, close_date: Option<&str>) -> Job {
        Job {
            job_id: format!("{}-{}", status, open_date),
            machine_name: "CNC-01".to_string(),
            job_name: "CNC-01".to_string(),
            status: status.to_string(),
            open_date: open_date.to_string(),
            close_date: close_date.map(|d| d.to_string()),
            open_images: vec![],
            close_images: vec![],
            user_email: "op@example.com".to_string(),
            user_name: "Op".to_string(),
            electrical_responsible: None,
            created_at: String::new(),
            updated_at: None,
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn time_stats_bucket_by_month_and_day() {
        let records = vec![
            record("CNC-01", "2024-05-15", 480, 0),
            record("CNC-02", "2024-05-01", 660, 180),
            record("CNC-01", "2024-04-30", 480, 0),
        ];
        let stats = time_stats(&records, day("2024-05-15"));
        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.total_work_minutes, 1620);
        assert_eq!(stats.total_ot_minutes, 180);
        assert_eq!(stats.avg_work_minutes, 540);
        assert_eq!(stats.unique_machines, 2);
        assert_eq!(stats.this_month_records, 2);
        assert_eq!(stats.today_records, 1);
    }

    #[test]
    fn time_stats_empty_is_all_zero() {
        assert_eq!(time_stats(&[], day("2024-05-15")), TimeStats::default());
    }

    #[test]
    fn job_stats_count_statuses_and_average_duration() {
        let jobs = vec![
            job("open", "2024-05-10", None),
            job("closed", "2024-05-01", Some("2024-05-04")), // 3 days
            job("closed", "2024-04-01", Some("2024-04-09")), // 8 days
        ];
        let stats = job_stats(&jobs, day("2024-05-15"));
        assert_eq!(stats.total_jobs, 3);
        assert_eq!(stats.open_jobs, 1);
        assert_eq!(stats.closed_jobs, 2);
        assert_eq!(stats.this_month_jobs, 2);
        // Mean of 3 and 8 days is 5.5; the dashboard shows whole days.
        assert_eq!(stats.avg_job_duration_days, 6);
    }

    #[test]
    fn closed_job_without_close_date_is_ignored_for_duration() {
        let jobs = vec![job("closed", "2024-05-01", None)];
        let stats = job_stats(&jobs, day("2024-05-15"));
        assert_eq!(stats.closed_jobs, 1);
        assert_eq!(stats.avg_job_duration_days, 0);
    }
}
