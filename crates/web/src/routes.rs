//! HTTP route handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Form, State};
use axum::response::Html;
use curie_agents::ResearchRequest;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::AppState;
use crate::page::{default_request, render_page};

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub agents: usize,
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_seconds(),
        agents: state.generator.agent_count(),
    })
}

/// The form, pre-filled with the default request.
pub async fn index() -> Html<String> {
    Html(render_page(&default_request(), None))
}

/// Form submission: generate a report and render it below the form.
pub async fn submit_report(
    State(state): State<Arc<AppState>>,
    Form(request): Form<ResearchRequest>,
) -> Html<String> {
    info!(topic = %request.topic, "Report requested from form");
    let report = state.generator.generate(&request).await;
    Html(render_page(&request, Some(&report)))
}

/// Report response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReportResponse {
    pub report: String,
}

/// JSON API: generate a report and return its text.
pub async fn api_report(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ResearchRequest>,
) -> Json<ReportResponse> {
    info!(topic = %request.topic, "Report requested from API");
    let report = state.generator.generate(&request).await;
    Json(ReportResponse { report })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy",
            version: "0.1.0",
            uptime_seconds: 100,
            agents: 4,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["agents"], 4);
    }

    #[test]
    fn test_report_request_deserialization() {
        let json = r#"{"topic": "Dark matter", "scope": "Galaxy rotation curves"}"#;
        let request: ResearchRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.topic, "Dark matter");
        assert_eq!(request.scope, "Galaxy rotation curves");
        assert!(request.depth.is_empty());
    }
}
