use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};

use super::model::MachineCostcenter;
use super::service;

/// HTTP handler: GET /machines/{machine_id}/costcenter
pub async fn get_costcenter_handler(
    client: &DynamoClient,
    table_name: &str,
    machine_id: &str,
) -> Result<Response<Body>, Error> {
    match service::lookup_costcenter(client, table_name, machine_id).await {
        Ok(Some(costcenter)) => {
            let entry = MachineCostcenter {
                machine_id: machine_id.to_string(),
                costcenter,
            };
            Ok(Response::builder()
                .status(StatusCode::OK)
                .header("Content-Type", "application/json")
                .header("Access-Control-Allow-Origin", "*")
                .body(serde_json::to_string(&entry)?.into())
                .map_err(Box::new)?)
        }
        Ok(None) => Ok(Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(
                serde_json::json!({ "error": "Costcenter not found" })
                    .to_string()
                    .into(),
            )
            .map_err(Box::new)?),
        Err(e) => {
            tracing::error!("Costcenter lookup failed for {}: {}", machine_id, e);
            Ok(Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header("Content-Type", "application/json")
                .header("Access-Control-Allow-Origin", "*")
                .body(serde_json::json!({ "error": e }).to_string().into())
                .map_err(Box::new)?)
        }
    }
}
