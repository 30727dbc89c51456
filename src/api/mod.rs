//! HTTP API module
//! 
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/reminders/enable", post(enable_handler))
        .route("/reminders/disable", post(disable_handler))
        .route("/contest/next", get(next_contest_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        directory::{contest::contest, ContestPhase},
        scheduler::{CommandOutcome, SchedulerCommand, SchedulerEvent},
        state::SchedulerStatus,
        testing::FakeDirectory,
    };
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    fn app(directory: Arc<FakeDirectory>) -> (Router, mpsc::Receiver<SchedulerEvent>) {
        let (tx, rx) = mpsc::channel(4);
        let state = Arc::new(AppState::new(tx, directory, 20554, "127.0.0.1".to_string()));
        (create_router(state), rx)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (router, _rx) = app(Arc::new(FakeDirectory::new()));
        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn next_contest_lists_earliest_upcoming() {
        let directory = Arc::new(FakeDirectory::new());
        directory.set_next(Some(contest(1234, ContestPhase::Before, 1_000_000_000)));
        let (router, _rx) = app(directory);

        let response = router
            .oneshot(Request::builder().uri("/contest/next").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["contest"]["id"], 1234);
        assert_eq!(body["contest"]["start_time_seconds"], 1_000_000_000);
        assert_eq!(body["contest"]["reminder_at"], "2001-09-09T01:41:40Z");
    }

    #[tokio::test]
    async fn next_contest_is_null_when_none_upcoming() {
        let (router, _rx) = app(Arc::new(FakeDirectory::new()));
        let response = router
            .oneshot(Request::builder().uri("/contest/next").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_json(response).await["contest"].is_null());
    }

    #[tokio::test]
    async fn enable_forwards_command_to_scheduler() {
        let (router, mut rx) = app(Arc::new(FakeDirectory::new()));

        let responder = tokio::spawn(async move {
            match rx.recv().await {
                Some(SchedulerEvent::Command { command, reply }) => {
                    let status = SchedulerStatus {
                        phase: "idle".to_string(),
                        enabled: true,
                        ..SchedulerStatus::default()
                    };
                    let _ = reply.send(CommandOutcome {
                        status,
                        persistence_error: None,
                    });
                    Some(command)
                }
                _ => None,
            }
        });

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/reminders/enable")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "idle");
        assert_eq!(body["reminder"]["enabled"], true);
        assert_eq!(
            responder.await.expect("responder"),
            Some(SchedulerCommand::Enable)
        );
    }

    #[tokio::test]
    async fn disable_without_scheduler_is_unavailable() {
        let (router, rx) = app(Arc::new(FakeDirectory::new()));
        drop(rx);

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/reminders/disable")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
