//! HTTP API: action-dispatched email endpoint plus status, history and health

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

use crate::alert::AlertNotification;
use crate::dispatcher::{BulkEntry, NotificationDispatcher};
use crate::history::LogHandle;
use crate::settings::NotificationSettings;

const ACTIONS: [&str; 4] = [
    "send-alert",
    "send-bulk-alerts",
    "test-connection",
    "update-settings",
];

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<RwLock<NotificationDispatcher>>,
    /// Copy of the active settings, readable while a batch holds the dispatcher
    pub settings: Arc<RwLock<NotificationSettings>>,
    pub log: LogHandle,
}

impl AppState {
    pub fn new(dispatcher: NotificationDispatcher) -> Self {
        let log = Arc::clone(dispatcher.log());
        let settings = Arc::new(RwLock::new(dispatcher.settings().clone()));
        Self {
            dispatcher: Arc::new(RwLock::new(dispatcher)),
            settings,
            log,
        }
    }
}

/// Request-level failure returned to the HTTP caller
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed field; 400
    BadRequest(String),
    /// Anything unexpected; 500
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(error) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": error }))).into_response()
            }
            ApiError::Internal(message) => {
                tracing::error!("Email API error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error",
                        "message": message,
                    })),
                )
                    .into_response()
            }
        }
    }
}

impl From<crate::MailerError> for ApiError {
    fn from(e: crate::MailerError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

/// Build the axum router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/email", get(describe_handler).post(email_handler))
        .route("/api/status", get(status_handler))
        .route("/api/history", get(history_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn email_handler(
    State(app): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let request: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::Internal(format!("Invalid request body: {}", e)))?;

    let action = request.get("action").and_then(Value::as_str).unwrap_or("");
    tracing::debug!("Email API action '{}'", action);

    match action {
        "send-alert" => send_alert(&app, present(&request, "alert")).await,
        "send-bulk-alerts" => send_bulk_alerts(&app, present(&request, "alert")).await,
        "test-connection" => test_connection(&app).await,
        "update-settings" => update_settings(&app, present(&request, "settings")).await,
        _ => Err(ApiError::BadRequest("Invalid action".to_string())),
    }
}

/// Field value, treating JSON null as absent
fn present<'a>(request: &'a Value, field: &str) -> Option<&'a Value> {
    request.get(field).filter(|v| !v.is_null())
}

async fn send_alert(app: &AppState, alert: Option<&Value>) -> Result<Json<Value>, ApiError> {
    let Some(alert) = alert else {
        return Err(ApiError::BadRequest("Alert data required".to_string()));
    };
    let alert = parse_alert(alert)?;

    let success = app.dispatcher.read().await.send_alert(&alert).await;
    let message = if success {
        "Email sent successfully"
    } else {
        "Failed to send email"
    };
    Ok(Json(json!({ "success": success, "message": message })))
}

async fn send_bulk_alerts(
    app: &AppState,
    alerts: Option<&Value>,
) -> Result<Json<Value>, ApiError> {
    let Some(Value::Array(items)) = alerts else {
        return Err(ApiError::BadRequest("Alerts array required".to_string()));
    };
    let entries: Vec<BulkEntry> = items
        .iter()
        .map(|item| match parse_alert(item) {
            Ok(alert) => BulkEntry::Alert(alert),
            Err(e) => BulkEntry::Invalid(e.to_string()),
        })
        .collect();

    let outcome = app.dispatcher.read().await.send_bulk_entries(&entries).await;
    Ok(Json(json!({
        "success": outcome.failed == 0,
        "sent": outcome.sent,
        "failed": outcome.failed,
        "message": format!("Sent {} emails, {} failed", outcome.sent, outcome.failed),
    })))
}

async fn test_connection(app: &AppState) -> Result<Json<Value>, ApiError> {
    let connected = app.dispatcher.read().await.test_connection().await;
    let message = if connected {
        "Email service connected successfully"
    } else {
        "Email service connection failed"
    };
    Ok(Json(json!({ "success": connected, "message": message })))
}

async fn update_settings(
    app: &AppState,
    settings: Option<&Value>,
) -> Result<Json<Value>, ApiError> {
    let Some(settings) = settings else {
        return Err(ApiError::BadRequest("Settings data required".to_string()));
    };
    let settings: NotificationSettings = serde_json::from_value(settings.clone())
        .map_err(|e| ApiError::BadRequest(format!("Invalid settings data: {}", e)))?;

    // Write lock waits for in-flight sends to finish
    let mut dispatcher = app.dispatcher.write().await;
    dispatcher.replace_settings(settings.clone())?;
    *app.settings.write().await = settings;
    drop(dispatcher);

    Ok(Json(json!({
        "success": true,
        "message": "Email settings updated successfully",
    })))
}

fn parse_alert(value: &Value) -> Result<AlertNotification, ApiError> {
    serde_json::from_value(value.clone())
        .map_err(|e| ApiError::BadRequest(format!("Invalid alert data: {}", e)))
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(message) | ApiError::Internal(message) => f.write_str(message),
        }
    }
}

async fn describe_handler() -> impl IntoResponse {
    Json(json!({
        "message": "Email notification API",
        "endpoints": {
            "POST /api/email": "Send email notifications",
            "actions": ACTIONS,
        },
    }))
}

async fn status_handler(State(app): State<AppState>) -> impl IntoResponse {
    let settings = app.settings.read().await.clone();
    let log = app.log.read().await;

    Json(json!({
        "enabled": settings.enabled,
        "recipient": settings.email,
        "priorities": {
            "high": settings.high_priority_only,
            "medium": settings.medium_priority_only,
            "low": settings.low_priority_only,
        },
        "smtp": {
            "host": settings.smtp_config.host,
            "port": settings.smtp_config.port,
            "secure": settings.smtp_config.secure,
        },
        "totals": log.totals,
        "uptime_seconds": log.started_at.elapsed().as_secs(),
    }))
}

async fn history_handler(State(app): State<AppState>) -> impl IntoResponse {
    let log = app.log.read().await;
    let records: Vec<_> = log.records.iter().cloned().collect();
    Json(records)
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}
