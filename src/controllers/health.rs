use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::domain::credentials::CredentialPools;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Ready when at least one provider can take jobs
pub async fn health_ready(State(pools): State<Arc<CredentialPools>>) -> impl IntoResponse {
    let statuses = pools.status();
    let ready = statuses.iter().any(|status| status.configured);

    let providers: Map<String, Value> = statuses
        .iter()
        .map(|status| {
            (
                status.provider.to_string(),
                Value::from(if status.configured {
                    "configured"
                } else {
                    "unconfigured"
                }),
            )
        })
        .collect();

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if ready { "ready" } else { "not_ready" },
            "providers": providers,
        })),
    )
}
