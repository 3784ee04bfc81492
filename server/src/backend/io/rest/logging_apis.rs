use axum::{response::Json, routing::post, Router};
use tracing::{debug, error, info, warn};

use crate::backend::AppState;
use shared::{LogEntry, LogResponse};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(log_message))
}

/// Forward a kiosk or portal log line into the server log
pub async fn log_message(Json(entry): Json<LogEntry>) -> Json<LogResponse> {
    let component = entry.component.as_deref().unwrap_or("client");

    match entry.level.to_lowercase().as_str() {
        "debug" => debug!(component, "{}", entry.message),
        "warn" | "warning" => warn!(component, "{}", entry.message),
        "error" => error!(component, "{}", entry.message),
        _ => info!(component, "{}", entry.message),
    }

    Json(LogResponse { success: true })
}
