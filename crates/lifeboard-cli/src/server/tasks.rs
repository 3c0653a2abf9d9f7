use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use lifeboard_core::models::{
    CompletionResult, NewTaskData, RecurrencePattern, Task, TaskFilter, TaskPriority, TaskStatus,
    UpdateTaskData,
};
use lifeboard_core::repository::TaskRepository;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::ApiError;
use super::extract::{parse_id, CurrentUser};
use super::response::{ApiResponse, ApiResult};
use super::AppState;

/// Outcome of a status change: the task and the successor it spawned, if any.
#[derive(Debug, Serialize)]
pub struct TaskTransition {
    pub task: Task,
    pub next: Option<Task>,
}

impl From<CompletionResult> for TaskTransition {
    fn from(result: CompletionResult) -> Self {
        match result {
            CompletionResult::Single(task) => TaskTransition { task, next: None },
            CompletionResult::Recurring { completed, next } => TaskTransition {
                task: completed,
                next: Some(next),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    pub status: Option<String>,
    pub project: Option<String>,
    pub tag: Option<String>,
}

impl TryFrom<TaskListQuery> for TaskFilter {
    type Error = ApiError;

    fn try_from(query: TaskListQuery) -> Result<Self, Self::Error> {
        let status = query
            .status
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<TaskStatus>())
            .transpose()
            .map_err(|e| ApiError::bad_request(e.to_string()))?;
        Ok(TaskFilter {
            status,
            project: query.project.filter(|p| !p.is_empty()),
            tag: query.tag.filter(|t| !t.is_empty()),
        })
    }
}

/// Subtasks may be sent as bare titles or as `{ "title": ... }` objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SubtaskInput {
    Title(String),
    Object { title: String },
}

impl SubtaskInput {
    fn into_title(self) -> String {
        match self {
            SubtaskInput::Title(title) | SubtaskInput::Object { title } => title,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub subtasks: Vec<SubtaskInput>,
    #[serde(default)]
    pub recurring: Option<bool>,
    #[serde(default)]
    pub recurrence_pattern: Option<RecurrencePattern>,
}

impl TryFrom<CreateTaskRequest> for NewTaskData {
    type Error = ApiError;

    fn try_from(request: CreateTaskRequest) -> Result<Self, Self::Error> {
        let recurrence = match (request.recurring, request.recurrence_pattern) {
            (Some(false), _) => None,
            (Some(true), None) => {
                return Err(ApiError::bad_request("A recurring task needs a recurrencePattern"))
            }
            (_, pattern) => pattern,
        };

        Ok(NewTaskData {
            title: request.title,
            description: request.description,
            category: request.category,
            project: request.project,
            priority: request.priority,
            tags: request.tags,
            notes: request.notes,
            due_date: request.due_date,
            subtasks: request.subtasks.into_iter().map(SubtaskInput::into_title).collect(),
            recurrence,
        })
    }
}

/// Partial update; absent fields are left alone, `null` clears.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub category: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub project: Option<Option<String>>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub notes: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(default)]
    pub recurring: Option<bool>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub recurrence_pattern: Option<Option<RecurrencePattern>>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
}

impl UpdateTaskRequest {
    fn into_parts(self) -> (UpdateTaskData, Option<TaskStatus>) {
        let data = UpdateTaskData {
            title: self.title,
            description: self.description,
            category: self.category,
            project: self.project,
            priority: self.priority,
            tags: self.tags,
            notes: self.notes,
            due_date: self.due_date,
            recurring: self.recurring,
            recurrence_pattern: self.recurrence_pattern,
        };
        (data, self.status)
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: TaskStatus,
}

/// GET /api/tasks?status=&project=&tag=
pub async fn list_tasks(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
    Query(query): Query<TaskListQuery>,
) -> ApiResult<Vec<Task>> {
    let filter = TaskFilter::try_from(query)?;
    let tasks = state.repo.find_tasks(&owner, &filter).await?;
    Ok(ApiResponse::success(tasks))
}

/// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<Task> {
    let Json(body) = payload?;
    let task = state.repo.add_task(&owner, NewTaskData::try_from(body)?).await?;
    Ok(ApiResponse::created(task))
}

/// GET /api/tasks/:id
pub async fn get_task(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Task> {
    let id = parse_id(&id)?;
    let task = state
        .repo
        .find_task_by_id(&owner, id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Task {} not found", id)))?;
    Ok(ApiResponse::success(task))
}

/// PUT /api/tasks/:id
///
/// A `status` field is applied after the other fields, through the same
/// transition as PATCH /status, so completing a recurring task here also
/// schedules its successor.
pub async fn update_task(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Task> {
    let id = parse_id(&id)?;
    let Json(body) = payload?;
    let (data, status) = body.into_parts();

    let mut task = state.repo.update_task(&owner, id, data).await?;
    if let Some(status) = status {
        let result = state.repo.set_task_status(&owner, id, status).await?;
        if let Some(next) = result.next() {
            tracing::debug!(task_id = %id, next_id = %next.id, "successor scheduled by update");
        }
        task = TaskTransition::from(result).task;
    }
    Ok(ApiResponse::success(task))
}

/// DELETE /api/tasks/:id
pub async fn delete_task(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    state.repo.delete_task(&owner, id).await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}

/// PATCH /api/tasks/:id/status
pub async fn set_task_status(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<StatusRequest>, JsonRejection>,
) -> ApiResult<TaskTransition> {
    let id = parse_id(&id)?;
    let Json(body) = payload?;
    let result = state.repo.set_task_status(&owner, id, body.status).await?;
    Ok(ApiResponse::success(result.into()))
}

/// POST /api/tasks/:id/complete
pub async fn complete_task(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<TaskTransition> {
    let id = parse_id(&id)?;
    let result = state.repo.complete_task(&owner, id).await?;
    Ok(ApiResponse::success(result.into()))
}
