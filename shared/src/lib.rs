pub mod auth;
pub mod types;

use aws_sdk_dynamodb::Client as DynamoClient;

/// Shared clients, built once at cold start and cloned into every request.
pub struct AppState {
    pub dynamo_client: DynamoClient,
}

impl AppState {
    pub async fn from_env() -> Self {
        let config = aws_config::load_from_env().await;
        AppState {
            dynamo_client: DynamoClient::new(&config),
        }
    }
}
