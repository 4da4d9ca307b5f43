use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};

use super::service;

/// HTTP handler: GET /users/allowed?email=
///
/// Drives the client's access gate; public so the login screen can ask
/// before a session exists.
pub async fn check_allowed_handler(
    client: &DynamoClient,
    table_name: &str,
    email: Option<&str>,
) -> Result<Response<Body>, Error> {
    let email = match email {
        Some(e) if !e.trim().is_empty() => e,
        _ => {
            return Ok(Response::builder()
                .status(StatusCode::BAD_REQUEST)
                .header("Content-Type", "application/json")
                .header("Access-Control-Allow-Origin", "*")
                .body(
                    serde_json::json!({ "error": "email query parameter is required" })
                        .to_string()
                        .into(),
                )
                .map_err(Box::new)?)
        }
    };

    match service::check_user_allowed(client, table_name, email).await {
        Ok(Some(user)) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(serde_json::to_string(&user)?.into())
            .map_err(Box::new)?),
        Ok(None) => Ok(Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(
                serde_json::json!({ "error": "User not allowed" })
                    .to_string()
                    .into(),
            )
            .map_err(Box::new)?),
        Err(e) => {
            tracing::error!("Allow-list lookup failed for {}: {}", email, e);
            Ok(Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header("Content-Type", "application/json")
                .header("Access-Control-Allow-Origin", "*")
                .body(serde_json::json!({ "error": e }).to_string().into())
                .map_err(Box::new)?)
        }
    }
}

/// HTTP handler: GET /users/electrical-responsible
pub async fn electrical_responsible_handler(
    client: &DynamoClient,
    table_name: &str,
) -> Result<Response<Body>, Error> {
    match service::load_electrical_responsible(client, table_name).await {
        Ok(users) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(serde_json::to_string(&users)?.into())
            .map_err(Box::new)?),
        Err(e) => {
            tracing::error!("Failed to list electrical responsible users: {}", e);
            Ok(Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header("Content-Type", "application/json")
                .header("Access-Control-Allow-Origin", "*")
                .body(serde_json::json!({ "error": e }).to_string().into())
                .map_err(Box::new)?)
        }
    }
}
