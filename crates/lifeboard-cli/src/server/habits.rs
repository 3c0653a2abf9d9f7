use axum::{
    body::Bytes,
    extract::{Path, State},
};
use chrono::NaiveDate;
use lifeboard_core::models::{
    entry_date, Habit, HabitCompletion, HabitEntry, HabitStats, NewHabitData, UpdateHabitData,
};
use lifeboard_core::repository::HabitRepository;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::ApiError;
use super::extract::{parse_id, CurrentUser};
use super::response::{ApiResponse, ApiResult};
use super::AppState;

/// A habit together with its derived numbers.
#[derive(Debug, Serialize)]
pub struct HabitView {
    #[serde(flatten)]
    pub habit: Habit,
    pub stats: HabitStats,
}

impl From<HabitCompletion> for HabitView {
    fn from(completion: HabitCompletion) -> Self {
        Self {
            habit: completion.habit,
            stats: completion.stats,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateHabitRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateHabitRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub category: Option<Option<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompleteHabitRequest {
    /// Defaults to true
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    /// Defaults to today in the server's timezone. Timestamps keep only their day.
    #[serde(default, deserialize_with = "entry_date::strict")]
    pub date: Option<NaiveDate>,
}

impl From<CompleteHabitRequest> for HabitEntry {
    fn from(request: CompleteHabitRequest) -> Self {
        HabitEntry {
            date: request.date,
            completed: request.completed.unwrap_or(true),
            notes: request.notes,
            value: request.value,
        }
    }
}

async fn load(state: &AppState, owner: &CurrentUser, raw_id: &str) -> Result<Habit, ApiError> {
    let id = parse_id(raw_id)?;
    state
        .repo
        .find_habit_by_id(&owner.0, id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Habit {} not found", id)))
}

/// GET /api/habits
pub async fn list_habits(State(state): State<AppState>, CurrentUser(owner): CurrentUser) -> ApiResult<Vec<HabitView>> {
    let today = state.today();
    let habits = state
        .repo
        .find_habits(&owner)
        .await?
        .into_iter()
        .map(|habit| {
            let stats = HabitStats::compute(&habit.history, today);
            HabitView { habit, stats }
        })
        .collect();
    Ok(ApiResponse::success(habits))
}

/// POST /api/habits
pub async fn create_habit(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
    payload: Result<axum::Json<CreateHabitRequest>, axum::extract::rejection::JsonRejection>,
) -> ApiResult<HabitView> {
    let axum::Json(body) = payload?;
    let habit = state
        .repo
        .add_habit(
            &owner,
            NewHabitData {
                name: body.name,
                description: body.description,
                category: body.category,
            },
        )
        .await?;
    let stats = HabitStats::compute(&habit.history, state.today());
    Ok(ApiResponse::created(HabitView { habit, stats }))
}

/// GET /api/habits/:id
pub async fn get_habit(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<HabitView> {
    let habit = load(&state, &user, &id).await?;
    let stats = HabitStats::compute(&habit.history, state.today());
    Ok(ApiResponse::success(HabitView { habit, stats }))
}

/// GET /api/habits/:id/stats
pub async fn get_habit_stats(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<HabitStats> {
    let habit = load(&state, &user, &id).await?;
    Ok(ApiResponse::success(HabitStats::compute(&habit.history, state.today())))
}

/// PUT /api/habits/:id
pub async fn update_habit(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
    Path(id): Path<String>,
    payload: Result<axum::Json<UpdateHabitRequest>, axum::extract::rejection::JsonRejection>,
) -> ApiResult<HabitView> {
    let id = parse_id(&id)?;
    let axum::Json(body) = payload?;
    let habit = state
        .repo
        .update_habit(
            &owner,
            id,
            UpdateHabitData {
                name: body.name,
                description: body.description,
                category: body.category,
            },
        )
        .await?;
    let stats = HabitStats::compute(&habit.history, state.today());
    Ok(ApiResponse::success(HabitView { habit, stats }))
}

/// DELETE /api/habits/:id
pub async fn delete_habit(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    state.repo.delete_habit(&owner, id).await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}

/// POST /api/habits/:id/complete
///
/// The body is optional; an empty body logs today as completed.
pub async fn complete_habit(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<HabitView> {
    let id = parse_id(&id)?;
    let request: CompleteHabitRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CompleteHabitRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?
    };

    let completion = state
        .repo
        .complete_habit_for_day(&owner, id, request.into(), state.today())
        .await?;
    Ok(ApiResponse::success(completion.into()))
}
