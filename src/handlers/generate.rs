use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{ConnectInfo, Query, State};
use axum::http::HeaderMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::error::ApiError;
use crate::metrics::{
    ORIGIN_REJECTED, PASSWORDS_GENERATED, RATE_LIMITED, REQUEST_LATENCY, REQUEST_TOTAL,
};
use crate::models::{GenerateParams, GenerateResponse};
use crate::password::{self, PasswordOptions};
use crate::state::AppState;

const MAX_LENGTH: usize = 1000;

/// Identifier the rate limiter keys on: first `X-Forwarded-For` entry when
/// present, the peer address otherwise. Not validated as an IP.
pub fn client_identifier(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|xff| xff.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty())
        .map_or_else(|| peer.ip().to_string(), str::to_string)
}

pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    params: Result<Query<GenerateParams>, QueryRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    REQUEST_TOTAL.inc();
    let start_time = Instant::now();

    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if !(1..=MAX_LENGTH).contains(&params.length) {
        return Err(ApiError::BadRequest(format!(
            "length must be between 1 and {MAX_LENGTH}"
        )));
    }

    let origin = headers.get("origin").and_then(|v| v.to_str().ok());
    if !state.is_origin_allowed(origin) {
        ORIGIN_REJECTED.inc();
        tracing::warn!(origin = origin.unwrap_or("<none>"), "origin rejected");
        return Err(ApiError::Forbidden("origin not allowed".to_string()));
    }

    let client = client_identifier(&headers, peer);
    if state.rate_limiter.is_rate_limited(&client).await {
        RATE_LIMITED.inc();
        tracing::info!(%client, "rate limited");
        return Err(ApiError::TooManyRequests);
    }

    let options = PasswordOptions::from(&params);
    let password = password::generate(&options, &mut rand::thread_rng())
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    PASSWORDS_GENERATED.inc();
    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

    Ok(Json(GenerateResponse { password }))
}
