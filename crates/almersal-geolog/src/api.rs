use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::GeologError;
use crate::ping_log::{GeoPing, PingLog};

/// Confirmation returned after a ping is stored ("location recorded").
pub const PING_LOGGED_MESSAGE: &str = "تم تسجيل الموقع";

#[derive(Clone)]
pub struct AppState {
    pub log: Arc<dyn PingLog>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/log", get(log_ping))
        .route("/data/:uid", get(query_pings))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Deserialize)]
struct LogParams {
    uid: Option<String>,
    lat: Option<String>,
    lon: Option<String>,
}

async fn log_ping(
    State(state): State<AppState>,
    Query(params): Query<LogParams>,
) -> Result<&'static str, GeologError> {
    let uid = params
        .uid
        .filter(|u| !u.is_empty())
        .ok_or_else(|| GeologError::BadRequest("Missing 'uid' query parameter".into()))?;

    let ping = GeoPing::now(uid, params.lat, params.lon);
    info!(uid = %ping.uid, lat = ?ping.lat, lon = ?ping.lon, "Ping received");
    state.log.append(ping).await?;

    Ok(PING_LOGGED_MESSAGE)
}

async fn query_pings(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<Vec<GeoPing>>, GeologError> {
    Ok(Json(state.log.query_by_uid(&uid).await?))
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting location logger");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
