use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};

use super::clock;
use super::guard;
use super::model::{CreateTimeRecordPayload, TimeRecord};
use super::service;

/// HTTP handler: POST /time-records
///
/// Validation order mirrors the form: required fields, time format, range,
/// then the duplicate-day guard against a fresh read, then the insert.
pub async fn create_time_record_handler(
    client: &DynamoClient,
    table_name: &str,
    user_email: &str,
    user_name: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: CreateTimeRecordPayload = match serde_json::from_slice(body) {
        Ok(p) => p,
        Err(e) => return bad_request(&format!("Invalid request body: {}", e)),
    };

    let machine_id = payload.machine_id.trim().to_uppercase();
    if machine_id.is_empty() || payload.date.trim().is_empty() {
        return bad_request("machine_id and date are required");
    }
    let date = payload.date.trim().to_string();

    let (start_time, end_time) = match (
        clock::normalize_time(&payload.start_time),
        clock::normalize_time(&payload.end_time),
    ) {
        (Some(s), Some(e)) => (s, e),
        _ => return bad_request("Times must look like HH:MM, e.g. 08:00"),
    };

    if end_time <= start_time {
        return bad_request("End time must be after start time");
    }

    // Duplicate-day guard: re-read the store right before inserting. Narrows
    // the race window between concurrent writers, does not close it.
    let existing = service::load_time_records(client, table_name, None)
        .await
        .map_err(|e| {
            Box::new(std::io::Error::new(std::io::ErrorKind::Other, e))
                as Box<dyn std::error::Error + Send + Sync>
        })?;
    if let Some(conflict) = guard::record_on_date(&existing, &date) {
        tracing::info!(
            "Rejected duplicate-day record: date={} already taken by machine={}",
            date,
            conflict.machine_id
        );
        return Ok(Response::builder()
            .status(StatusCode::CONFLICT)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(
                serde_json::json!({
                    "error": "duplicate_day",
                    "message": "A time record already exists for this date; only one machine per day",
                    "conflict": {
                        "machine_id": conflict.machine_id,
                        "date": conflict.date,
                        "start_time": conflict.start_time,
                        "end_time": conflict.end_time,
                    }
                })
                .to_string()
                .into(),
            )
            .map_err(Box::new)?);
    }

    let buckets = clock::compute_minutes(&date, &start_time, &end_time);
    let record = TimeRecord {
        record_id: uuid::Uuid::new_v4().to_string(),
        machine_id,
        date,
        start_time,
        end_time,
        regular_minutes: Some(buckets.regular_minutes),
        ot_minutes: Some(buckets.ot_minutes),
        break_minutes: Some(buckets.break_minutes),
        work_minutes: Some(buckets.work_minutes),
        duration: clock::format_duration_minutes(buckets.work_minutes),
        user_email: user_email.to_string(),
        user_name: user_name.to_string(),
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    match service::create_time_record(client, table_name, &record).await {
        Ok(()) => {
            tracing::info!(
                "Time record created: machine={} date={} work={}m",
                record.machine_id,
                record.date,
                buckets.work_minutes
            );
            Ok(Response::builder()
                .status(StatusCode::CREATED)
                .header("Content-Type", "application/json")
                .header("Access-Control-Allow-Origin", "*")
                .body(serde_json::to_string(&record)?.into())
                .map_err(Box::new)?)
        }
        Err(e) => {
            tracing::error!("Failed to create time record: {}", e);
            internal_error(&e)
        }
    }
}

/// HTTP handler: GET /time-records[?owner=email]
pub async fn list_time_records_handler(
    client: &DynamoClient,
    table_name: &str,
    owner: Option<&str>,
) -> Result<Response<Body>, Error> {
    match service::load_time_records(client, table_name, owner).await {
        Ok(records) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(serde_json::to_string(&records)?.into())
            .map_err(Box::new)?),
        Err(e) => {
            tracing::error!("Failed to list time records: {}", e);
            internal_error(&e)
        }
    }
}

/// HTTP handler: DELETE /time-records/{id}
pub async fn delete_time_record_handler(
    client: &DynamoClient,
    table_name: &str,
    record_id: &str,
) -> Result<Response<Body>, Error> {
    match service::delete_time_record(client, table_name, record_id).await {
        Ok(()) => Ok(Response::builder()
            .status(StatusCode::NO_CONTENT)
            .header("Access-Control-Allow-Origin", "*")
            .body(Body::Empty)
            .map_err(Box::new)?),
        Err(e) => {
            tracing::error!("Failed to delete time record {}: {}", record_id, e);
            internal_error(&e)
        }
    }
}

fn bad_request(message: &str) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::BAD_REQUEST)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::json!({ "error": message }).to_string().into())
        .map_err(Box::new)?)
}

fn internal_error(message: &str) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::json!({ "error": message }).to_string().into())
        .map_err(Box::new)?)
}
