use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;

use super::model::TimeRecord;

/// Load all time records, newest first (pure domain logic, no HTTP).
/// Optional owner filter narrows to one user's records.
pub async fn load_time_records(
    client: &DynamoClient,
    table_name: &str,
    owner: Option<&str>,
) -> Result<Vec<TimeRecord>, String> {
    let result = client
        .query()
        .table_name(table_name)
        .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
        .expression_attribute_values(":pk", AttributeValue::S("TIME".to_string()))
        .expression_attribute_values(":sk_prefix", AttributeValue::S("TIME#".to_string()))
        .send()
        .await
        .map_err(|e| format!("DynamoDB query error: {}", e))?;

    let mut records = Vec::new();
    for item in result.items() {
        if let Some(sk) = item.get("SK").and_then(|v| v.as_s().ok()) {
            if let Some(record_id) = sk.strip_prefix("TIME#") {
                let record = record_from_item(record_id, item);
                if let Some(owner_email) = owner {
                    if record.user_email != owner_email {
                        continue;
                    }
                }
                records.push(record);
            }
        }
    }

    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(records)
}

/// Persist a fully derived record (buckets already computed by the caller).
pub async fn create_time_record(
    client: &DynamoClient,
    table_name: &str,
    record: &TimeRecord,
) -> Result<(), String> {
    let mut builder = client
        .put_item()
        .table_name(table_name)
        .item("PK", AttributeValue::S("TIME".to_string()))
        .item("SK", AttributeValue::S(format!("TIME#{}", record.record_id)))
        .item("machine_id", AttributeValue::S(record.machine_id.clone()))
        .item("record_date", AttributeValue::S(record.date.clone()))
        .item("start_time", AttributeValue::S(record.start_time.clone()))
        .item("end_time", AttributeValue::S(record.end_time.clone()))
        .item("duration", AttributeValue::S(record.duration.clone()))
        .item("user_email", AttributeValue::S(record.user_email.clone()))
        .item("user_name", AttributeValue::S(record.user_name.clone()))
        .item("created_at", AttributeValue::S(record.created_at.clone()));

    for (name, value) in [
        ("regular_minutes", record.regular_minutes),
        ("ot_minutes", record.ot_minutes),
        ("break_minutes", record.break_minutes),
        ("work_minutes", record.work_minutes),
    ] {
        if let Some(minutes) = value {
            builder = builder.item(name, AttributeValue::N(minutes.to_string()));
        }
    }

    builder
        .send()
        .await
        .map_err(|e| format!("DynamoDB put_item error: {}", e))?;
    Ok(())
}

/// Delete one record by id.
pub async fn delete_time_record(
    client: &DynamoClient,
    table_name: &str,
    record_id: &str,
) -> Result<(), String> {
    client
        .delete_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S("TIME".to_string()))
        .key("SK", AttributeValue::S(format!("TIME#{}", record_id)))
        .send()
        .await
        .map_err(|e| format!("DynamoDB delete_item error: {}", e))?;
    Ok(())
}

fn record_from_item(record_id: &str, item: &HashMap<String, AttributeValue>) -> TimeRecord {
    TimeRecord {
        record_id: record_id.to_string(),
        machine_id: attr_s(item, "machine_id"),
        date: attr_s(item, "record_date"),
        start_time: attr_s(item, "start_time"),
        end_time: attr_s(item, "end_time"),
        regular_minutes: attr_n(item, "regular_minutes"),
        ot_minutes: attr_n(item, "ot_minutes"),
        break_minutes: attr_n(item, "break_minutes"),
        work_minutes: attr_n(item, "work_minutes"),
        duration: attr_s(item, "duration"),
        user_email: attr_s(item, "user_email"),
        user_name: attr_s(item, "user_name"),
        created_at: attr_s(item, "created_at"),
    }
}

fn attr_s(item: &HashMap<String, AttributeValue>, name: &str) -> String {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .unwrap_or_default()
}

fn attr_n(item: &HashMap<String, AttributeValue>, name: &str) -> Option<i64> {
    item.get(name)
        .and_then(|v| v.as_n().ok())
        .and_then(|n| n.parse().ok())
}
