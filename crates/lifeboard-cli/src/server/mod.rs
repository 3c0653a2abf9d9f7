//! JSON HTTP API over the repository.
//!
//! Every route is a thin handler: it resolves the current user, calls one
//! repository operation and wraps the result in the `{ success, data }`
//! envelope. Streaks and successors are computed in the core.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::NaiveDate;
use chrono_tz::Tz;
use lifeboard_core::db;
use lifeboard_core::models::UserId;
use lifeboard_core::repository::SqliteRepository;
use lifeboard_core::timezone::today_in;
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod error;
pub mod extract;
pub mod habits;
pub mod response;
pub mod tasks;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<SqliteRepository>,
    pub timezone: Tz,
    pub default_user: UserId,
}

impl AppState {
    pub fn new(repo: SqliteRepository, timezone: Tz, default_user: UserId) -> Self {
        Self {
            repo: Arc::new(repo),
            timezone,
            default_user,
        }
    }

    /// Reference day for streaks
    pub fn today(&self) -> NaiveDate {
        today_in(self.timezone)
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(habit_routes())
        .merge(task_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

fn habit_routes() -> Router<AppState> {
    Router::new()
        .route("/api/habits", get(habits::list_habits).post(habits::create_habit))
        .route(
            "/api/habits/:id",
            get(habits::get_habit)
                .put(habits::update_habit)
                .delete(habits::delete_habit),
        )
        .route("/api/habits/:id/complete", post(habits::complete_habit))
        .route("/api/habits/:id/stats", get(habits::get_habit_stats))
}

fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/api/tasks/:id",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/api/tasks/:id/status", patch(tasks::set_task_status))
        .route("/api/tasks/:id/complete", post(tasks::complete_task))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match db::ping(state.repo.pool()).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => {
            tracing::error!(error = ?e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(error::ApiError::ServiceUnavailable("database unavailable".to_string()).to_json()),
            )
        }
    }
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(%addr, timezone = %state.timezone, "lifeboard API listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "failed to listen for shutdown signal");
            }
        })
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn setup_app() -> (Router, TempDir) {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("api.db");
        let pool = db::establish_connection(&db_path.to_string_lossy())
            .await
            .expect("Failed to establish test database connection");
        let state = AppState::new(SqliteRepository::new(pool), Tz::UTC, UserId::new("local"));
        (app(state), temp_dir)
    }

    async fn send(app: &Router, method: Method, uri: &str, user: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            request = request.header(extract::USER_HEADER, user);
        }
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _dir) = setup_app().await;
        let (status, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"]["database"], json!("ok"));
    }

    #[tokio::test]
    async fn test_habit_lifecycle() {
        let (app, _dir) = setup_app().await;

        let (status, created) =
            send(&app, Method::POST, "/api/habits", None, Some(json!({ "name": "Meditate" }))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["data"]["stats"]["currentStreak"], json!(0));
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let uri = format!("/api/habits/{}/complete", id);
        let (status, done) = send(&app, Method::POST, &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(done["data"]["stats"]["currentStreak"], json!(1));
        assert_eq!(done["data"]["stats"]["completionRate"], json!(100.0));

        // Same day again replaces the entry
        let (_, again) = send(&app, Method::POST, &uri, None, Some(json!({ "notes": "twice" }))).await;
        assert_eq!(again["data"]["history"].as_array().unwrap().len(), 1);
        assert_eq!(again["data"]["history"][0]["notes"], json!("twice"));

        let (_, stats) = send(&app, Method::GET, &format!("/api/habits/{}/stats", id), None, None).await;
        assert_eq!(stats["data"]["longestStreak"], json!(1));

        let (status, _) = send(&app, Method::DELETE, &format!("/api/habits/{}", id), None, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send(&app, Method::GET, &format!("/api/habits/{}", id), None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], json!("NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_backdated_completion() {
        let (app, _dir) = setup_app().await;
        let (_, created) =
            send(&app, Method::POST, "/api/habits", None, Some(json!({ "name": "Run" }))).await;
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/habits/{}/complete", id),
            None,
            Some(json!({ "date": "2020-01-01", "value": 5.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["history"][0]["date"], json!("2020-01-01"));
        assert_eq!(body["data"]["stats"]["currentStreak"], json!(0));
        assert_eq!(body["data"]["stats"]["longestStreak"], json!(1));
    }

    #[tokio::test]
    async fn test_completion_date_with_time_of_day() {
        let (app, _dir) = setup_app().await;
        let (_, created) =
            send(&app, Method::POST, "/api/habits", None, Some(json!({ "name": "Stretch" }))).await;
        let uri = format!("/api/habits/{}/complete", created["data"]["id"].as_str().unwrap());

        let (status, body) =
            send(&app, Method::POST, &uri, None, Some(json!({ "date": "2020-01-01T08:00:00Z" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["history"][0]["date"], json!("2020-01-01"));

        let (status, body) =
            send(&app, Method::POST, &uri, None, Some(json!({ "date": "2019-12-31T22:15:00.000Z" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["history"].as_array().unwrap().len(), 2);
        assert_eq!(body["data"]["stats"]["longestStreak"], json!(2));

        let (status, body) =
            send(&app, Method::POST, &uri, None, Some(json!({ "date": "someday" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let (app, _dir) = setup_app().await;
        let (_, created) =
            send(&app, Method::POST, "/api/tasks", Some("alice"), Some(json!({ "title": "Secret" }))).await;
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let (_, alice) = send(&app, Method::GET, "/api/tasks", Some("alice"), None).await;
        assert_eq!(alice["data"].as_array().unwrap().len(), 1);

        let (_, bob) = send(&app, Method::GET, "/api/tasks", Some("bob"), None).await;
        assert!(bob["data"].as_array().unwrap().is_empty());

        let (status, _) = send(&app, Method::GET, &format!("/api/tasks/{}", id), Some("bob"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // No header falls back to the default user
        let (_, local) = send(&app, Method::GET, "/api/tasks", None, None).await;
        assert!(local["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recurring_task_completion() {
        let (app, _dir) = setup_app().await;
        let (status, created) = send(
            &app,
            Method::POST,
            "/api/tasks",
            None,
            Some(json!({
                "title": "Clean gutters",
                "dueDate": "2024-01-10T08:00:00Z",
                "recurrencePattern": { "frequency": "weekly", "interval": 2 },
                "subtasks": ["Front", { "title": "Back" }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["data"]["recurring"], json!(true));
        assert_eq!(created["data"]["subtasks"].as_array().unwrap().len(), 2);
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let (status, done) =
            send(&app, Method::POST, &format!("/api/tasks/{}/complete", id), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(done["data"]["task"]["status"], json!("completed"));
        assert_eq!(done["data"]["next"]["dueDate"], json!("2024-01-24T08:00:00Z"));
        assert_eq!(done["data"]["next"]["status"], json!("todo"));

        let (_, todo) = send(&app, Method::GET, "/api/tasks?status=todo", None, None).await;
        assert_eq!(todo["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_status_patch_and_update() {
        let (app, _dir) = setup_app().await;
        let (_, created) = send(
            &app,
            Method::POST,
            "/api/tasks",
            None,
            Some(json!({ "title": "Report", "project": "Work", "tags": ["q1"] })),
        )
        .await;
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let (status, patched) = send(
            &app,
            Method::PATCH,
            &format!("/api/tasks/{}/status", id),
            None,
            Some(json!({ "status": "in-progress" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(patched["data"]["task"]["status"], json!("in-progress"));
        assert_eq!(patched["data"]["next"], Value::Null);

        let (status, updated) = send(
            &app,
            Method::PUT,
            &format!("/api/tasks/{}", id),
            None,
            Some(json!({ "project": null, "priority": "high", "status": "completed" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["data"]["project"], Value::Null);
        assert_eq!(updated["data"]["priority"], json!("high"));
        assert_eq!(updated["data"]["status"], json!("completed"));
        assert_eq!(updated["data"]["tags"], json!(["q1"]));
    }

    #[tokio::test]
    async fn test_error_envelopes() {
        let (app, _dir) = setup_app().await;

        let (status, body) =
            send(&app, Method::POST, "/api/tasks", None, Some(json!({ "title": "  " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/tasks",
            None,
            Some(json!({ "title": "x", "recurrencePattern": { "frequency": "daily", "interval": 0 } })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, Method::POST, "/api/habits", None, Some(json!({ "title": "no name" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], json!("UNPROCESSABLE_ENTITY"));

        let (status, _) = send(&app, Method::GET, "/api/tasks?status=someday", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::GET, "/api/tasks/not-a-uuid", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let missing = uuid::Uuid::new_v4();
        let (status, _) =
            send(&app, Method::POST, &format!("/api/tasks/{}/complete", missing), None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
