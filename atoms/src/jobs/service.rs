use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;

use super::model::{ImageList, Job};
use crate::media::model::JobImage;

/// Error string for a missing job; http layer maps it to 404.
pub const JOB_NOT_FOUND: &str = "Job not found";
/// Error string for a close attempt on a closed job; http layer maps it to 409.
pub const JOB_ALREADY_CLOSED: &str = "Job already closed";

/// Load all jobs, newest first. Optional owner and status filters.
pub async fn load_jobs(
    client: &DynamoClient,
    table_name: &str,
    owner: Option<&str>,
    status: Option<&str>,
) -> Result<Vec<Job>, String> {
    let result = client
        .query()
        .table_name(table_name)
        .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
        .expression_attribute_values(":pk", AttributeValue::S("JOB".to_string()))
        .expression_attribute_values(":sk_prefix", AttributeValue::S("JOB#".to_string()))
        .send()
        .await
        .map_err(|e| format!("DynamoDB query error: {}", e))?;

    let mut jobs = Vec::new();
    for item in result.items() {
        if let Some(sk) = item.get("SK").and_then(|v| v.as_s().ok()) {
            if let Some(job_id) = sk.strip_prefix("JOB#") {
                let job = job_from_item(job_id, item);
                if let Some(owner_email) = owner {
                    if job.user_email != owner_email {
                        continue;
                    }
                }
                if let Some(wanted) = status {
                    if job.status != wanted {
                        continue;
                    }
                }
                jobs.push(job);
            }
        }
    }

    jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(jobs)
}

/// Get a single job by id.
pub async fn get_job(
    client: &DynamoClient,
    table_name: &str,
    job_id: &str,
) -> Result<Job, String> {
    let result = client
        .get_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S("JOB".to_string()))
        .key("SK", AttributeValue::S(format!("JOB#{}", job_id)))
        .send()
        .await
        .map_err(|e| format!("DynamoDB get_item error: {}", e))?;

    match result.item() {
        Some(item) => Ok(job_from_item(job_id, item)),
        None => Err(JOB_NOT_FOUND.to_string()),
    }
}

/// Open a new job. Images are already processed by the media atom.
#[allow(clippy::too_many_arguments)]
pub async fn create_job(
    client: &DynamoClient,
    table_name: &str,
    machine_name: &str,
    job_name: &str,
    open_date: &str,
    open_images: Vec<JobImage>,
    electrical_responsible: Option<String>,
    user_email: &str,
    user_name: &str,
) -> Result<Job, String> {
    let job_id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    let images_json = images_to_json(&open_images)?;
    let mut builder = client
        .put_item()
        .table_name(table_name)
        .item("PK", AttributeValue::S("JOB".to_string()))
        .item("SK", AttributeValue::S(format!("JOB#{}", job_id)))
        .item("machine_name", AttributeValue::S(machine_name.to_string()))
        .item("job_name", AttributeValue::S(job_name.to_string()))
        .item("job_status", AttributeValue::S("open".to_string()))
        .item("open_date", AttributeValue::S(open_date.to_string()))
        .item("open_images", AttributeValue::S(images_json))
        .item("close_images", AttributeValue::S("[]".to_string()))
        .item("user_email", AttributeValue::S(user_email.to_string()))
        .item("user_name", AttributeValue::S(user_name.to_string()))
        .item("created_at", AttributeValue::S(now.clone()));

    if let Some(responsible) = &electrical_responsible {
        builder = builder.item(
            "electrical_responsible",
            AttributeValue::S(responsible.clone()),
        );
    }

    builder
        .send()
        .await
        .map_err(|e| format!("DynamoDB put_item error: {}", e))?;

    Ok(Job {
        job_id,
        machine_name: machine_name.to_string(),
        job_name: job_name.to_string(),
        status: "open".to_string(),
        open_date: open_date.to_string(),
        close_date: None,
        open_images,
        close_images: vec![],
        user_email: user_email.to_string(),
        user_name: user_name.to_string(),
        electrical_responsible,
        created_at: now,
        updated_at: None,
    })
}

/// Close an open job. The conditional write makes the open->closed
/// transition one-way and exactly-once; a second close attempt fails with
/// JOB_ALREADY_CLOSED instead of overwriting the first close. A missing job
/// fails with JOB_NOT_FOUND before any write is attempted, since a failed
/// condition alone cannot tell the two apart.
pub async fn close_job(
    client: &DynamoClient,
    table_name: &str,
    job_id: &str,
    close_date: &str,
    close_images: Vec<JobImage>,
) -> Result<Job, String> {
    let current = get_job(client, table_name, job_id).await?;
    close_precondition(&current)?;

    let now = chrono::Utc::now().to_rfc3339();
    let images_json = images_to_json(&close_images)?;

    let outcome = client
        .update_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S("JOB".to_string()))
        .key("SK", AttributeValue::S(format!("JOB#{}", job_id)))
        .update_expression(
            "SET job_status = :closed, close_date = :close_date, \
             close_images = :close_images, updated_at = :now",
        )
        .condition_expression("job_status = :open")
        .expression_attribute_values(":closed", AttributeValue::S("closed".to_string()))
        .expression_attribute_values(":open", AttributeValue::S("open".to_string()))
        .expression_attribute_values(":close_date", AttributeValue::S(close_date.to_string()))
        .expression_attribute_values(":close_images", AttributeValue::S(images_json))
        .expression_attribute_values(":now", AttributeValue::S(now))
        .send()
        .await;

    if let Err(e) = outcome {
        let service_error = e.into_service_error();
        if service_error.is_conditional_check_failed_exception() {
            // Lost a race with a concurrent close between the read and the write.
            return Err(JOB_ALREADY_CLOSED.to_string());
        }
        return Err(format!("DynamoDB update_item error: {}", service_error));
    }

    get_job(client, table_name, job_id).await
}

// Close is only legal from "open"; any other stored status reads as already
// closed.
fn close_precondition(job: &Job) -> Result<(), String> {
    if job.status == "open" {
        Ok(())
    } else {
        Err(JOB_ALREADY_CLOSED.to_string())
    }
}

/// Delete one job by id.
pub async fn delete_job(
    client: &DynamoClient,
    table_name: &str,
    job_id: &str,
) -> Result<(), String> {
    client
        .delete_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S("JOB".to_string()))
        .key("SK", AttributeValue::S(format!("JOB#{}", job_id)))
        .send()
        .await
        .map_err(|e| format!("DynamoDB delete_item error: {}", e))?;
    Ok(())
}

/// Append processed images to one of the job's lists (read-modify-write).
pub async fn add_images(
    client: &DynamoClient,
    table_name: &str,
    job_id: &str,
    new_images: Vec<JobImage>,
    list: ImageList,
) -> Result<Job, String> {
    let job = get_job(client, table_name, job_id).await?;
    let mut images = match list {
        ImageList::Open => job.open_images,
        ImageList::Close => job.close_images,
    };
    images.extend(new_images);
    write_image_list(client, table_name, job_id, &images, list).await?;
    get_job(client, table_name, job_id).await
}

/// Remove one image from a job's list by string equality on its id.
pub async fn delete_image(
    client: &DynamoClient,
    table_name: &str,
    job_id: &str,
    image_id: &str,
    list: ImageList,
) -> Result<Job, String> {
    let job = get_job(client, table_name, job_id).await?;
    let images: Vec<JobImage> = match list {
        ImageList::Open => job.open_images,
        ImageList::Close => job.close_images,
    }
    .into_iter()
    .filter(|img| img.id != image_id)
    .collect();
    write_image_list(client, table_name, job_id, &images, list).await?;
    get_job(client, table_name, job_id).await
}

async fn write_image_list(
    client: &DynamoClient,
    table_name: &str,
    job_id: &str,
    images: &[JobImage],
    list: ImageList,
) -> Result<(), String> {
    let images_json =
        serde_json::to_string(images).map_err(|e| format!("Image list encode error: {}", e))?;
    let now = chrono::Utc::now().to_rfc3339();

    client
        .update_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S("JOB".to_string()))
        .key("SK", AttributeValue::S(format!("JOB#{}", job_id)))
        .update_expression(format!("SET {} = :images, updated_at = :now", list.column()))
        .expression_attribute_values(":images", AttributeValue::S(images_json))
        .expression_attribute_values(":now", AttributeValue::S(now))
        .send()
        .await
        .map_err(|e| format!("DynamoDB update_item error: {}", e))?;
    Ok(())
}

fn images_to_json(images: &[JobImage]) -> Result<String, String> {
    serde_json::to_string(images).map_err(|e| format!("Image list encode error: {}", e))
}

fn job_from_item(job_id: &str, item: &HashMap<String, AttributeValue>) -> Job {
    Job {
        job_id: job_id.to_string(),
        machine_name: attr_s(item, "machine_name"),
        job_name: attr_s(item, "job_name"),
        status: attr_s(item, "job_status"),
        open_date: attr_s(item, "open_date"),
        close_date: attr_opt_s(item, "close_date"),
        open_images: images_from_attr(item, "open_images"),
        close_images: images_from_attr(item, "close_images"),
        user_email: attr_s(item, "user_email"),
        user_name: attr_s(item, "user_name"),
        electrical_responsible: attr_opt_s(item, "electrical_responsible"),
        created_at: attr_s(item, "created_at"),
        updated_at: attr_opt_s(item, "updated_at"),
    }
}

// Unparseable stored image lists render as empty rather than failing the read.
fn images_from_attr(item: &HashMap<String, AttributeValue>, name: &str) -> Vec<JobImage> {
    let raw = match item.get(name).and_then(|v| v.as_s().ok()) {
        Some(s) => s,
        None => return vec![],
    };
    match serde_json::from_str(raw) {
        Ok(images) => images,
        Err(e) => {
            tracing::warn!("Ignoring unparseable {} attribute: {}", name, e);
            vec![]
        }
    }
}

fn attr_s(item: &HashMap<String, AttributeValue>, name: &str) -> String {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .unwrap_or_default()
}

fn attr_opt_s(item: &HashMap<String, AttributeValue>, name: &str) -> Option<String> {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(status: &str) -> Job {
        Job {
            job_id: "j1".to_string(),
            machine_name: "CNC-01".to_string(),
            job_name: "CNC-01".to_string(),
            status: status.to_string(),
            open_date: "2024-05-01".to_string(),
            close_date: None,
            open_images: vec![],
            close_images: vec![],
            user_email: "op@example.com".to_string(),
            user_name: "Op".to_string(),
            electrical_responsible: None,
            created_at: String::new(),
            updated_at: None,
        }
    }

    #[test]
    fn close_only_allowed_from_open() {
        assert!(close_precondition(&job("open")).is_ok());
        assert_eq!(
            close_precondition(&job("closed")).unwrap_err(),
            JOB_ALREADY_CLOSED
        );
        // A missing job never reaches this check: close_job surfaces
        // JOB_NOT_FOUND from the preceding read instead.
        assert_eq!(close_precondition(&job("")).unwrap_err(), JOB_ALREADY_CLOSED);
    }
}
