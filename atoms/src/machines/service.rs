use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;

/// Costcenter label for a machine; Ok(None) when the machine has no row.
pub async fn lookup_costcenter(
    client: &DynamoClient,
    table_name: &str,
    machine_id: &str,
) -> Result<Option<String>, String> {
    if machine_id.trim().is_empty() {
        return Ok(None);
    }

    let result = client
        .get_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S("COSTCENTER".to_string()))
        .key("SK", AttributeValue::S(format!("MACHINE#{}", machine_id)))
        .send()
        .await
        .map_err(|e| format!("DynamoDB get_item error: {}", e))?;

    Ok(result
        .item()
        .and_then(|item| item.get("costcenter"))
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string()))
}
