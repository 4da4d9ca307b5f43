use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};

use super::model::{AddImagesPayload, CloseJobPayload, CreateJobPayload, ImageList};
use super::service;
use crate::media;

/// HTTP handler: POST /jobs
pub async fn create_job_handler(
    client: &DynamoClient,
    table_name: &str,
    user_email: &str,
    user_name: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: CreateJobPayload = match serde_json::from_slice(body) {
        Ok(p) => p,
        Err(e) => return bad_request(&format!("Invalid request body: {}", e)),
    };

    let machine_name = payload.machine_name.trim().to_uppercase();
    if machine_name.is_empty() {
        return bad_request("machine_name is required");
    }
    let job_name = payload
        .job_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| machine_name.clone());
    let open_date = payload
        .open_date
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(today);
    let electrical_responsible = payload
        .electrical_responsible
        .filter(|r| !r.trim().is_empty());

    let open_images = media::prepare_images(payload.open_images).await;

    match service::create_job(
        client,
        table_name,
        &machine_name,
        &job_name,
        &open_date,
        open_images,
        electrical_responsible,
        user_email,
        user_name,
    )
    .await
    {
        Ok(job) => {
            tracing::info!(
                "Job opened: id={} machine={} images={}",
                job.job_id,
                job.machine_name,
                job.open_images.len()
            );
            Ok(Response::builder()
                .status(StatusCode::CREATED)
                .header("Content-Type", "application/json")
                .header("Access-Control-Allow-Origin", "*")
                .body(serde_json::to_string(&job)?.into())
                .map_err(Box::new)?)
        }
        Err(e) => {
            tracing::error!("Failed to create job: {}", e);
            internal_error(&e)
        }
    }
}

/// HTTP handler: GET /jobs[?owner=email][?status=open|closed]
pub async fn list_jobs_handler(
    client: &DynamoClient,
    table_name: &str,
    owner: Option<&str>,
    status: Option<&str>,
) -> Result<Response<Body>, Error> {
    if let Some(s) = status {
        if s != "open" && s != "closed" {
            return bad_request("status must be open or closed");
        }
    }
    match service::load_jobs(client, table_name, owner, status).await {
        Ok(jobs) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(serde_json::to_string(&jobs)?.into())
            .map_err(Box::new)?),
        Err(e) => {
            tracing::error!("Failed to list jobs: {}", e);
            internal_error(&e)
        }
    }
}

/// HTTP handler: GET /jobs/{id}
pub async fn get_job_handler(
    client: &DynamoClient,
    table_name: &str,
    job_id: &str,
) -> Result<Response<Body>, Error> {
    match service::get_job(client, table_name, job_id).await {
        Ok(job) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(serde_json::to_string(&job)?.into())
            .map_err(Box::new)?),
        Err(e) if e == service::JOB_NOT_FOUND => not_found(&e),
        Err(e) => {
            tracing::error!("Failed to get job {}: {}", job_id, e);
            internal_error(&e)
        }
    }
}

/// HTTP handler: PATCH /jobs/{id}/close
///
/// Empty body is a quick close: today's date, no photos.
pub async fn close_job_handler(
    client: &DynamoClient,
    table_name: &str,
    job_id: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: CloseJobPayload = if body.is_empty() {
        CloseJobPayload::default()
    } else {
        match serde_json::from_slice(body) {
            Ok(p) => p,
            Err(e) => return bad_request(&format!("Invalid request body: {}", e)),
        }
    };

    let close_date = payload
        .close_date
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(today);
    let close_images = media::prepare_images(payload.close_images).await;

    match service::close_job(client, table_name, job_id, &close_date, close_images).await {
        Ok(job) => {
            tracing::info!("Job closed: id={} machine={}", job.job_id, job.machine_name);
            Ok(Response::builder()
                .status(StatusCode::OK)
                .header("Content-Type", "application/json")
                .header("Access-Control-Allow-Origin", "*")
                .body(serde_json::to_string(&job)?.into())
                .map_err(Box::new)?)
        }
        Err(e) if e == service::JOB_ALREADY_CLOSED => Ok(Response::builder()
            .status(StatusCode::CONFLICT)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(serde_json::json!({ "error": e }).to_string().into())
            .map_err(Box::new)?),
        Err(e) if e == service::JOB_NOT_FOUND => not_found(&e),
        Err(e) => {
            tracing::error!("Failed to close job {}: {}", job_id, e);
            internal_error(&e)
        }
    }
}

/// HTTP handler: DELETE /jobs/{id}
pub async fn delete_job_handler(
    client: &DynamoClient,
    table_name: &str,
    job_id: &str,
) -> Result<Response<Body>, Error> {
    match service::delete_job(client, table_name, job_id).await {
        Ok(()) => Ok(Response::builder()
            .status(StatusCode::NO_CONTENT)
            .header("Access-Control-Allow-Origin", "*")
            .body(Body::Empty)
            .map_err(Box::new)?),
        Err(e) => {
            tracing::error!("Failed to delete job {}: {}", job_id, e);
            internal_error(&e)
        }
    }
}

/// HTTP handler: POST /jobs/{id}/images?list=open|close
pub async fn add_images_handler(
    client: &DynamoClient,
    table_name: &str,
    job_id: &str,
    list: ImageList,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: AddImagesPayload = match serde_json::from_slice(body) {
        Ok(p) => p,
        Err(e) => return bad_request(&format!("Invalid request body: {}", e)),
    };

    let images = media::prepare_images(payload.images).await;
    match service::add_images(client, table_name, job_id, images, list).await {
        Ok(job) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(serde_json::to_string(&job)?.into())
            .map_err(Box::new)?),
        Err(e) if e == service::JOB_NOT_FOUND => not_found(&e),
        Err(e) => {
            tracing::error!("Failed to add images to job {}: {}", job_id, e);
            internal_error(&e)
        }
    }
}

/// HTTP handler: DELETE /jobs/{id}/images/{image_id}?list=open|close
pub async fn delete_image_handler(
    client: &DynamoClient,
    table_name: &str,
    job_id: &str,
    image_id: &str,
    list: ImageList,
) -> Result<Response<Body>, Error> {
    match service::delete_image(client, table_name, job_id, image_id, list).await {
        Ok(job) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(serde_json::to_string(&job)?.into())
            .map_err(Box::new)?),
        Err(e) if e == service::JOB_NOT_FOUND => not_found(&e),
        Err(e) => {
            tracing::error!(
                "Failed to delete image {} from job {}: {}",
                image_id,
                job_id,
                e
            );
            internal_error(&e)
        }
    }
}

fn today() -> String {
    chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

fn bad_request(message: &str) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::BAD_REQUEST)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::json!({ "error": message }).to_string().into())
        .map_err(Box::new)?)
}

fn not_found(message: &str) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::NOT_FOUND)
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
