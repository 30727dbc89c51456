//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use tracing::{error, info, warn};

use crate::{
    directory::select_next_upcoming,
    scheduler::{CommandOutcome, SchedulerCommand},
    state::AppState,
};
use super::responses::{ApiResponse, HealthResponse, NextContestResponse, StatusResponse, UpcomingContest};

fn command_response(outcome: CommandOutcome, done: &str) -> ApiResponse {
    match outcome.persistence_error {
        None => ApiResponse::phase(done.to_string(), outcome.status),
        Some(e) => {
            warn!("{} but state was not saved: {}", done, e);
            ApiResponse::degraded(format!("{} (not saved: {})", done, e), outcome.status)
        }
    }
}

/// Handle POST /reminders/enable - Turn contest reminders on
pub async fn enable_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.send_command(SchedulerCommand::Enable).await {
        Ok(outcome) => {
            info!("Enable endpoint called - reminders {}", outcome.status.phase);
            Ok(Json(command_response(outcome, "Contest reminders enabled")))
        }
        Err(e) => {
            error!("Failed to enable reminders: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Handle POST /reminders/disable - Turn contest reminders off
pub async fn disable_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.send_command(SchedulerCommand::Disable).await {
        Ok(outcome) => {
            info!("Disable endpoint called - reminders turned off");
            Ok(Json(command_response(outcome, "Contest reminders disabled")))
        }
        Err(e) => {
            error!("Failed to disable reminders: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Handle GET /status - Return current scheduler status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        reminder: state.get_status(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /contest/next - Return the next upcoming contest
pub async fn next_contest_handler(State(state): State<Arc<AppState>>) -> Result<Json<NextContestResponse>, StatusCode> {
    match state.directory.fetch_contests().await {
        Ok(contests) => {
            let contest = select_next_upcoming(&contests)
                .as_ref()
                .and_then(UpcomingContest::from_contest);
            Ok(Json(NextContestResponse {
                contest,
                timestamp: Utc::now(),
            }))
        }
        Err(e) => {
            error!("Failed to fetch contest data: {}", e);
            Err(StatusCode::BAD_GATEWAY)
        }
    }
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
