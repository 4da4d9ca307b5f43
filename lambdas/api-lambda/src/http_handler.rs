use jobtrack_atoms as atoms;
use jobtrack_shared::{auth, AppState};
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, RequestExt, Response,
};
use std::env;
use std::sync::Arc;

use jobtrack_shared::types::ImageList;
use lambda_http::http::header::{HeaderValue, VARY};

fn with_cors_headers(mut resp: Response<Body>, request_origin: Option<&str>) -> Response<Body> {
    let cors_origin = auth::get_cors_origin(request_origin);

    let headers = resp.headers_mut();
    headers.insert(
        "Access-Control-Allow-Origin",
        HeaderValue::from_str(&cors_origin).unwrap_or_else(|_| HeaderValue::from_static("*")),
    );
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET,POST,PATCH,DELETE,OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type,X-User-Email"),
    );
    headers.append(VARY, HeaderValue::from_static("Origin"));

    resp
}

fn finalize_response(
    resp: Result<Response<Body>, Error>,
    request_origin: Option<&str>,
) -> Result<Response<Body>, Error> {
    resp.map(|r| with_cors_headers(r, request_origin))
}

fn not_found() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(serde_json::json!({"error": "Not found"}).to_string().into())
        .map_err(Box::new)?)
}

/// Main Lambda handler - routes requests to the job, timesheet and summary
/// endpoints.
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    let path = event.uri().path();
    let body = event.body();
    let request_origin = event.headers().get("Origin").and_then(|v| v.to_str().ok());
    tracing::info!("API Lambda invoked - Method: {} Path: {}", method, path);

    // Handle CORS preflight
    if method == "OPTIONS" {
        let resp = Response::builder()
            .status(StatusCode::OK)
            .body(Body::Empty)
            .map_err(Box::new)?;
        return Ok(with_cors_headers(resp, request_origin));
    }

    let table_name = env::var("TABLE_NAME").unwrap_or_else(|_| "jobtrack".to_string());

    // Allow-list lookup is public: the login screen calls it before the
    // caller has an identity to send.
    if path == "/users/allowed" {
        return match method {
            &Method::GET => {
                let email = event
                    .query_string_parameters_ref()
                    .and_then(|params| params.first("email"));
                finalize_response(
                    atoms::users::http::check_allowed_handler(
                        &state.dynamo_client,
                        &table_name,
                        email,
                    )
                    .await,
                    request_origin,
                )
            }
            _ => {
                let resp = Response::builder()
                    .status(StatusCode::METHOD_NOT_ALLOWED)
                    .header("Content-Type", "application/json")
                    .body(
                        serde_json::json!({"error": "Method not allowed"})
                            .to_string()
                            .into(),
                    )
                    .map_err(Box::new)?;
                finalize_response(Ok(resp), request_origin)
            }
        };
    }

    // Everything else requires a caller on the allow list.
    let auth_ctx =
        match auth::authorize_request(&state.dynamo_client, &table_name, event.headers()).await {
            Ok(ctx) => ctx,
            Err(resp) => return Ok(with_cors_headers(resp, request_origin)),
        };

    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let resp = match (method, parts.as_slice()) {
        // --- JOBS ---
        // POST /jobs - open a job
        (&Method::POST, ["jobs"]) => {
            atoms::jobs::http::create_job_handler(
                &state.dynamo_client,
                &table_name,
                &auth_ctx.user_email,
                &auth_ctx.user_name,
                body,
            )
            .await
        }
        // GET /jobs - list jobs, optionally ?owner=me&status=open|closed
        (&Method::GET, ["jobs"]) => {
            let params = event.query_string_parameters();
            let owner = match params.first("owner") {
                Some("me") => Some(auth_ctx.user_email.as_str()),
                other => other,
            };
            atoms::jobs::http::list_jobs_handler(
                &state.dynamo_client,
                &table_name,
                owner,
                params.first("status"),
            )
            .await
        }
        // GET /jobs/{id} - get a job with its image lists
        (&Method::GET, ["jobs", job_id]) => {
            atoms::jobs::http::get_job_handler(&state.dynamo_client, &table_name, job_id).await
        }
        // PATCH /jobs/{id}/close - close a job (empty body = quick close)
        (&Method::PATCH, ["jobs", job_id, "close"]) => {
            atoms::jobs::http::close_job_handler(&state.dynamo_client, &table_name, job_id, body)
                .await
        }
        // DELETE /jobs/{id}
        (&Method::DELETE, ["jobs", job_id]) => {
            atoms::jobs::http::delete_job_handler(&state.dynamo_client, &table_name, job_id).await
        }
        // POST /jobs/{id}/images?list=open|close - append images
        (&Method::POST, ["jobs", job_id, "images"]) => {
            match image_list_param(&event) {
                Ok(list) => {
                    atoms::jobs::http::add_images_handler(
                        &state.dynamo_client,
                        &table_name,
                        job_id,
                        list,
                        body,
                    )
                    .await
                }
                Err(resp) => Ok(resp),
            }
        }
        // DELETE /jobs/{id}/images/{image_id}?list=open|close
        (&Method::DELETE, ["jobs", job_id, "images", image_id]) => {
            match image_list_param(&event) {
                Ok(list) => {
                    atoms::jobs::http::delete_image_handler(
                        &state.dynamo_client,
                        &table_name,
                        job_id,
                        image_id,
                        list,
                    )
                    .await
                }
                Err(resp) => Ok(resp),
            }
        }

        // --- TIME RECORDS ---
        // POST /time-records - log a machine day
        (&Method::POST, ["time-records"]) => {
            atoms::timesheet::http::create_time_record_handler(
                &state.dynamo_client,
                &table_name,
                &auth_ctx.user_email,
                &auth_ctx.user_name,
                body,
            )
            .await
        }
        // GET /time-records - list records, optionally ?owner=me
        (&Method::GET, ["time-records"]) => {
            let params = event.query_string_parameters();
            let owner = match params.first("owner") {
                Some("me") => Some(auth_ctx.user_email.as_str()),
                other => other,
            };
            atoms::timesheet::http::list_time_records_handler(
                &state.dynamo_client,
                &table_name,
                owner,
            )
            .await
        }
        // DELETE /time-records/{id}
        (&Method::DELETE, ["time-records", record_id]) => {
            atoms::timesheet::http::delete_time_record_handler(
                &state.dynamo_client,
                &table_name,
                record_id,
            )
            .await
        }

        // --- USERS ---
        // GET /users/electrical-responsible - pickable responsibles
        (&Method::GET, ["users", "electrical-responsible"]) => {
            atoms::users::http::electrical_responsible_handler(&state.dynamo_client, &table_name)
                .await
        }

        // --- MACHINES ---
        // GET /machines/{id}/costcenter
        (&Method::GET, ["machines", machine_id, "costcenter"]) => {
            atoms::machines::http::get_costcenter_handler(
                &state.dynamo_client,
                &table_name,
                machine_id,
            )
            .await
        }

        // --- SUMMARY ---
        // GET /summary/costs - wage cost rollup (JOIN LOGIC)
        (&Method::GET, ["summary", "costs"]) => {
            summary_block::costs::cost_summary_handler(&state.dynamo_client, &table_name).await
        }
        // GET /summary/stats - dashboard counters
        (&Method::GET, ["summary", "stats"]) => {
            summary_block::stats::stats_handler(&state.dynamo_client, &table_name).await
        }

        _ => {
            tracing::warn!("No route matched - Method: {} Path: {}", method, path);
            not_found()
        }
    };

    finalize_response(resp, request_origin)
}

// ?list=open|close selects which image list a jobs/{id}/images call touches.
// Defaults to the close list, which is what the close form uploads to.
fn image_list_param(event: &Request) -> Result<ImageList, Response<Body>> {
    let value = event
        .query_string_parameters_ref()
        .and_then(|params| params.first("list"))
        .map(|v| v.to_string())
        .unwrap_or_else(|| "close".to_string());

    ImageList::parse(&value).ok_or_else(|| {
        Response::builder()
            .status(StatusCode::BAD_REQUEST)
            .header("Content-Type", "application/json")
            .body(
                serde_json::json!({"error": "list must be 'open' or 'close'"})
                    .to_string()
                    .into(),
            )
            .unwrap_or_default()
    })
}
