//! Axum-based HTTP server exposing the live program and the merged schedule

use crate::error::{OnAirError, Result};
use crate::schedule::DayKey;
use crate::service::{LiveService, LiveSnapshot};
use axum::extract::Path;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LiveService>,
}

impl AppState {
    pub fn new(service: Arc<LiveService>) -> Self {
        Self { service }
    }

    /// Latest snapshot, refreshing once if the loop has not produced one yet
    async fn snapshot(&self) -> Arc<LiveSnapshot> {
        self.service.latest_or_refresh().await
    }
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/health", responses(
    (status = 200, description = "Service is healthy")
)))]
pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({"status": "ok", "version": env!("APP_VERSION")})),
    )
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/now", responses((status = 200))))]
pub async fn now(State(state): State<AppState>) -> impl IntoResponse {
    let instant = state.service.current_instant();
    Json(serde_json::json!({
        "timezone": state.service.config().timezone,
        "instant": instant,
    }))
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/live", responses((status = 200))))]
pub async fn live(State(state): State<AppState>) -> impl IntoResponse {
    let snap = state.snapshot().await;
    Json(serde_json::json!({
        "refreshed_at": snap.refreshed_at,
        "timezone": snap.timezone,
        "origin": snap.origin,
        "status": snap.status,
    }))
}

#[cfg_attr(
    feature = "openapi",
    utoipa::path(get, path = "/api/schedule", responses((status = 200)))
)]
pub async fn schedule(State(state): State<AppState>) -> impl IntoResponse {
    let snap = state.snapshot().await;
    Json(serde_json::json!({
        "origin": snap.origin,
        "days": snap.schedule,
    }))
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/schedule/{day}",
    params(("day" = String, Path, description = "Lowercase day name")),
    responses((status = 200), (status = 400, description = "Unknown day"))))]
pub async fn schedule_day(State(state): State<AppState>, Path(day): Path<String>) -> Response {
    let Some(day) = DayKey::from_name(&day) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": format!("unknown day '{}'", day)})),
        )
            .into_response();
    };
    let snap = state.snapshot().await;
    let live_index = (snap.status.day == day).then_some(snap.status.index).flatten();
    Json(serde_json::json!({
        "day": day,
        "items": snap.schedule.day(day),
        "live_index": live_index,
    }))
    .into_response()
}

#[cfg_attr(
    feature = "openapi",
    utoipa::path(get, path = "/api/countdowns", responses((status = 200)))
)]
pub async fn countdowns(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.service.events())
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/config", responses((status = 200))))]
pub async fn get_config(State(state): State<AppState>) -> impl IntoResponse {
    let mut json = serde_json::to_value(state.service.config().clone())
        .unwrap_or(serde_json::json!({"error":"serialization"}));
    if let Some(remote) = json.get_mut("remote").and_then(|v| v.as_object_mut()) {
        remote.remove("api_key");
    }
    Json(json)
}

#[cfg(feature = "openapi")]
#[utoipa::path(get, path = "/api/config/schema", responses((status = 200)))]
pub async fn get_config_schema() -> impl IntoResponse {
    let schema = schemars::schema_for!(crate::config::Config);
    Json(serde_json::to_value(&schema).unwrap_or(serde_json::json!({"error":"schema"})))
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/events", responses((status = 200))))]
pub async fn events(State(state): State<AppState>) -> impl IntoResponse {
    let rx = state.service.subscribe_status();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(payload) => Some(Ok::<Event, std::convert::Infallible>(
            Event::default().event("live").data(payload),
        )),
        Err(_) => None,
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(feature = "openapi")]
#[derive(utoipa::OpenApi)]
#[openapi(
    paths(
        health,
        now,
        live,
        schedule,
        schedule_day,
        countdowns,
        get_config,
        get_config_schema,
        events
    ),
    tags((name = "onair", description = "OnAir live schedule API"))
)]
pub struct ApiDoc;

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/api/health", get(health))
        .route("/api/now", get(now))
        .route("/api/live", get(live))
        .route("/api/schedule", get(schedule))
        .route("/api/schedule/{day}", get(schedule_day))
        .route("/api/countdowns", get(countdowns))
        .route("/api/config", get(get_config))
        .route("/api/events", get(events));

    #[cfg(feature = "openapi")]
    let router = {
        use utoipa::OpenApi;
        router
            .route("/api/config/schema", get(get_config_schema))
            .merge(
                utoipa_swagger_ui::SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()),
            )
    };

    router
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(service: Arc<LiveService>, host: &str, port: u16) -> Result<()> {
    let router = build_router(AppState::new(service));

    let logger = crate::logging::get_logger("web");
    logger.info(&format!(
        "Starting web server; requested host={}, port={}",
        host, port
    ));

    let addr = match host.parse::<IpAddr>() {
        Ok(ip) => SocketAddr::new(ip, port),
        Err(_) => {
            logger.warn(&format!("Invalid host '{}'; falling back to 127.0.0.1", host));
            ([127, 0, 0, 1], port).into()
        }
    };

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| OnAirError::web(format!("Failed to bind {}: {}", addr, e)))?;
    let local_addr = listener.local_addr()?;
    logger.info(&format!(
        "Web server listening at http://{}:{} (API /api)",
        local_addr.ip(),
        local_addr.port()
    ));

    axum::serve(listener, router)
        .await
        .map_err(|e| OnAirError::web(format!("Server stopped: {}", e)))
}
