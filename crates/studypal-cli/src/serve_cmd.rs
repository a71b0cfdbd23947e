//! `studypal serve`: the HTTP backend for the browser frontend.
//!
//! Three routes: an index page, `POST /generate_plan`, and
//! `POST /download_schedule`. Requests are stateless; the only shared data
//! is the read-only catalog, so handlers need no locking.

use std::net::SocketAddr;

use anyhow::Result;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use studypal_core::catalog::Catalog;
use studypal_core::export;
use studypal_core::plan::{self, GenerateRequest, PlanResult, ScheduleEntry};

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateResponse {
    success: bool,
    #[serde(flatten)]
    result: PlanResult,
}

#[derive(Debug, Deserialize)]
struct ExportRequest {
    #[serde(default)]
    plan: Vec<ScheduleEntry>,
    #[serde(default = "default_export_subject")]
    subject: String,
}

fn default_export_subject() -> String {
    "Study".to_string()
}

#[derive(Debug, Serialize)]
struct ExportResponse {
    csv_content: String,
    filename: String,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(catalog: &'static Catalog) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/generate_plan", post(generate_plan))
        .route("/download_schedule", post(download_schedule))
        .layer(CorsLayer::permissive())
        .with_state(catalog)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(bind: &str, port: u16) -> Result<()> {
    let app = build_router(Catalog::shared());
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("studypal serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("studypal serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index(State(catalog): State<&'static Catalog>) -> Html<String> {
    let rows = catalog
        .subject_names()
        .iter()
        .map(|name| {
            format!(
                "<tr><td>{name}</td><td>{activities}</td><td>{questions}</td></tr>",
                activities = catalog.activities(name).len(),
                questions = catalog.question_count(name),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let html = format!(
        "<!DOCTYPE html>\
<html><head><title>studypal</title></head><body>\
<h1>studypal</h1>\
<p>POST <code>/generate_plan</code> with {{\"subject\", \"hours\"}} | \
POST <code>/download_schedule</code> with {{\"plan\", \"subject\"}}</p>\
<table><tr><th>Subject</th><th>Activities</th><th>Questions</th></tr>{rows}</table>\
<p>Any other subject gets the generic template and no quiz.</p>\
</body></html>"
    );

    Html(html)
}

/// The single boundary catch: any parse failure becomes a
/// `{success: false, error}` payload with HTTP 200, matching what the
/// frontend expects. The body is read raw so even a non-JSON body lands in
/// the same envelope instead of a framework rejection.
async fn generate_plan(
    State(catalog): State<&'static Catalog>,
    body: Bytes,
) -> axum::response::Response {
    let request = serde_json::from_slice::<serde_json::Value>(&body)
        .map_err(|e| e.to_string())
        .and_then(|value| GenerateRequest::from_json(&value).map_err(|e| e.to_string()));

    match request {
        Ok(req) => {
            let result = plan::generate_with(catalog, &req.subject, req.hours, &mut rand::rng());
            Json(GenerateResponse {
                success: true,
                result,
            })
            .into_response()
        }
        Err(message) => {
            tracing::warn!(error = %message, "rejected generate_plan request");
            let body = serde_json::json!({ "success": false, "error": message });
            Json(body).into_response()
        }
    }
}

async fn download_schedule(Json(request): Json<ExportRequest>) -> Json<ExportResponse> {
    Json(ExportResponse {
        csv_content: export::schedule_csv(&request.plan),
        filename: export::schedule_filename(&request.subject),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
