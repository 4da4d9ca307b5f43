mod http_handler;
use http_handler::function_handler;

use jobtrack_shared::AppState;
use lambda_http::{run, service_fn, tracing, Error};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    // Clients are built once at cold start and shared across invocations.
    let state = Arc::new(AppState::from_env().await);

    run(service_fn(move |event| {
        let state = state.clone();
        async move { function_handler(event, state).await }
    }))
    .await
}
