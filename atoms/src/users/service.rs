use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;

use super::model::{AllowedUser, WageRates};
use crate::timesheet::clock::{DEFAULT_OT_RATE, DEFAULT_WAGE_RATE};

/// Look up one allow-list entry by email (case-insensitive on the email).
/// Ok(None) means the user is simply not on the list.
pub async fn check_user_allowed(
    client: &DynamoClient,
    table_name: &str,
    email: &str,
) -> Result<Option<AllowedUser>, String> {
    let email = email.trim().to_lowercase();
    let sk = format!("USER#{}", email);

    let result = client
        .get_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S("USER".to_string()))
        .key("SK", AttributeValue::S(sk))
        .send()
        .await
        .map_err(|e| format!("DynamoDB get_item error: {}", e))?;

    Ok(result.item().map(|item| user_from_item(&email, item)))
}

/// All users flagged as electrical responsible, sorted by name. Populates
/// the open-job form's responsible dropdown.
pub async fn load_electrical_responsible(
    client: &DynamoClient,
    table_name: &str,
) -> Result<Vec<AllowedUser>, String> {
    let mut users = load_allowed_users(client, table_name).await?;
    users.retain(|u| u.is_electrical_responsible);
    users.sort_by(|a, b| a.user_name.cmp(&b.user_name));
    Ok(users)
}

/// Batch wage-rate lookup. Emails with no allow-list row are simply absent
/// from the map; rows with null rates get the documented defaults. Lookup
/// failures degrade to an empty map (cost views fall back to defaults for
/// everyone) rather than failing the render.
pub async fn load_wage_rates(
    client: &DynamoClient,
    table_name: &str,
    emails: &[String],
) -> HashMap<String, WageRates> {
    let users = match load_allowed_users(client, table_name).await {
        Ok(users) => users,
        Err(e) => {
            tracing::error!("Failed to load wage rates: {}", e);
            return HashMap::new();
        }
    };

    rates_from_roster(&users, emails)
}

// Keyed by the caller's own email strings, so case differences between a
// roster row and the records it prices never hide a configured rate.
fn rates_from_roster(users: &[AllowedUser], emails: &[String]) -> HashMap<String, WageRates> {
    let mut rates = HashMap::new();
    for user in users {
        if let Some(email) = emails.iter().find(|e| e.eq_ignore_ascii_case(&user.email)) {
            rates.insert(
                email.clone(),
                WageRates {
                    wage_rate: user.wage_rate.unwrap_or(DEFAULT_WAGE_RATE),
                    ot_rate: user.ot_rate.unwrap_or(DEFAULT_OT_RATE),
                },
            );
        }
    }
    rates
}

async fn load_allowed_users(
    client: &DynamoClient,
    table_name: &str,
) -> Result<Vec<AllowedUser>, String> {
    let result = client
        .query()
        .table_name(table_name)
        .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
        .expression_attribute_values(":pk", AttributeValue::S("USER".to_string()))
        .expression_attribute_values(":sk_prefix", AttributeValue::S("USER#".to_string()))
        .send()
        .await
        .map_err(|e| format!("DynamoDB query error: {}", e))?;

    let mut users = Vec::new();
    for item in result.items() {
        if let Some(sk) = item.get("SK").and_then(|v| v.as_s().ok()) {
            if let Some(email) = sk.strip_prefix("USER#") {
                users.push(user_from_item(email, item));
            }
        }
    }
    Ok(users)
}

fn user_from_item(email: &str, item: &HashMap<String, AttributeValue>) -> AllowedUser {
    AllowedUser {
        email: email.to_string(),
        user_name: item
            .get("user_name")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default(),
        position: item
            .get("position")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default(),
        is_electrical_responsible: item
            .get("is_electrical_responsible")
            .and_then(|v| v.as_bool().ok())
            .copied()
            .unwrap_or(false),
        wage_rate: item
            .get("wage_rate")
            .and_then(|v| v.as_n().ok())
            .and_then(|n| n.parse().ok()),
        ot_rate: item
            .get("ot_rate")
            .and_then(|v| v.as_n().ok())
            .and_then(|n| n.parse().ok()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str, wage_rate: Option<f64>, ot_rate: Option<f64>) -> AllowedUser {
        AllowedUser {
            email: email.to_string(),
            user_name: "Op".to_string(),
            position: "Operator".to_string(),
            is_electrical_responsible: false,
            wage_rate,
            ot_rate,
        }
    }

    #[test]
    fn rates_are_keyed_by_the_queried_email() {
        // Roster row differs in case from what the time records carry.
        let roster = vec![user("Op@Example.com", Some(400.0), Some(600.0))];
        let emails = vec!["op@example.com".to_string()];

        let rates = rates_from_roster(&roster, &emails);
        let entry = rates.get("op@example.com").unwrap();
        assert_eq!(entry.wage_rate, 400.0);
        assert_eq!(entry.ot_rate, 600.0);
        assert!(rates.get("Op@Example.com").is_none());
    }

    #[test]
    fn null_rates_get_defaults_and_unqueried_rows_are_absent() {
        let roster = vec![
            user("a@x.com", None, None),
            user("unqueried@x.com", Some(999.0), Some(999.0)),
        ];
        let emails = vec!["a@x.com".to_string()];

        let rates = rates_from_roster(&roster, &emails);
        assert_eq!(rates.len(), 1);
        let entry = rates.get("a@x.com").unwrap();
        assert_eq!(entry.wage_rate, DEFAULT_WAGE_RATE);
        assert_eq!(entry.ot_rate, DEFAULT_OT_RATE);
    }
}
