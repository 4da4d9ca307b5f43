use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::http::{HeaderMap, StatusCode};
use lambda_http::{Body, Response};
use std::env;

use jobtrack_atoms::users;

/// Identity attached to an authorized request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_email: String,
    pub user_name: String,
}

/// Resolve the CORS origin to echo back. ALLOWED_ORIGINS is a
/// comma-separated list; "*" (the default) allows everything.
pub fn get_cors_origin(request_origin: Option<&str>) -> String {
    let allowed = env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string());
    if allowed == "*" {
        return "*".to_string();
    }
    match request_origin {
        Some(origin) if allowed.split(',').any(|a| a.trim() == origin) => origin.to_string(),
        _ => allowed
            .split(',')
            .next()
            .unwrap_or("*")
            .trim()
            .to_string(),
    }
}

/// Access gate: the caller identifies itself with an X-User-Email header
/// and must have an allow-list row. Err carries a ready-to-send response
/// (401 without the header, 403 when not on the list, 500 on lookup
/// failure).
pub async fn authorize_request(
    client: &DynamoClient,
    table_name: &str,
    headers: &HeaderMap,
) -> Result<AuthContext, Response<Body>> {
    let email = match headers.get("X-User-Email").and_then(|v| v.to_str().ok()) {
        Some(email) if !email.trim().is_empty() => email.trim().to_lowercase(),
        _ => {
            return Err(error_response(
                StatusCode::UNAUTHORIZED,
                "Missing X-User-Email header",
            ))
        }
    };

    match users::service::check_user_allowed(client, table_name, &email).await {
        Ok(Some(user)) => {
            // Fall back to the mailbox name when the roster has no display name.
            let user_name = if user.user_name.trim().is_empty() {
                email.split('@').next().unwrap_or("User").to_string()
            } else {
                user.user_name
            };
            Ok(AuthContext {
                user_email: email,
                user_name,
            })
        }
        Ok(None) => {
            tracing::info!("Access denied for {}: not on allow list", email);
            Err(error_response(StatusCode::FORBIDDEN, "User not allowed"))
        }
        Err(e) => {
            tracing::error!("Allow-list check failed for {}: {}", email, e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authorization check failed",
            ))
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response<Body> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::json!({ "error": message }).to_string().into())
        .unwrap_or_default()
}
