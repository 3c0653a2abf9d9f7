use crate::db::DbPool;
use crate::error::CoreError;
use crate::models::{
    CompletionResult, Habit, HabitCompletion, HabitEntry, NewHabitData, NewTaskData, Task,
    TaskFilter, TaskStatus, UpdateHabitData, UpdateTaskData, UserId,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

pub mod collection;
pub mod habits;
pub mod tasks;
pub mod query_builder;

pub use collection::{Collection, Document};

/// Domain-specific trait for habit operations
#[async_trait]
pub trait HabitRepository {
    async fn add_habit(&self, owner: &UserId, data: NewHabitData) -> Result<Habit, CoreError>;
    async fn find_habit_by_id(&self, owner: &UserId, id: Uuid) -> Result<Option<Habit>, CoreError>;
    async fn find_habits(&self, owner: &UserId) -> Result<Vec<Habit>, CoreError>;
    async fn find_habits_by_short_id_prefix(&self, owner: &UserId, short_id: &str) -> Result<Vec<Habit>, CoreError>;
    async fn update_habit(&self, owner: &UserId, id: Uuid, data: UpdateHabitData) -> Result<Habit, CoreError>;
    async fn delete_habit(&self, owner: &UserId, id: Uuid) -> Result<(), CoreError>;
    /// Append-or-replace the entry for its day (defaulting to `today`), then compute stats.
    async fn complete_habit_for_day(
        &self,
        owner: &UserId,
        id: Uuid,
        entry: HabitEntry,
        today: NaiveDate,
    ) -> Result<HabitCompletion, CoreError>;
}

/// Domain-specific trait for task operations
#[async_trait]
pub trait TaskRepository {
    async fn add_task(&self, owner: &UserId, data: NewTaskData) -> Result<Task, CoreError>;
    async fn find_task_by_id(&self, owner: &UserId, id: Uuid) -> Result<Option<Task>, CoreError>;
    async fn find_tasks(&self, owner: &UserId, filter: &TaskFilter) -> Result<Vec<Task>, CoreError>;
    async fn find_tasks_by_short_id_prefix(&self, owner: &UserId, short_id: &str) -> Result<Vec<Task>, CoreError>;
    async fn update_task(&self, owner: &UserId, id: Uuid, data: UpdateTaskData) -> Result<Task, CoreError>;
    async fn delete_task(&self, owner: &UserId, id: Uuid) -> Result<(), CoreError>;
    /// Moves a task to `status`. A transition into `Completed` spawns the
    /// recurring successor, if any, in the same transaction.
    async fn set_task_status(&self, owner: &UserId, id: Uuid, status: TaskStatus) -> Result<CompletionResult, CoreError>;
    async fn complete_task(&self, owner: &UserId, id: Uuid) -> Result<CompletionResult, CoreError>;
}

/// Main repository trait that composes all domain traits
pub trait Repository: HabitRepository + TaskRepository {}

impl<T: HabitRepository + TaskRepository> Repository for T {}

/// SQLite document-store implementation of the repository pattern
pub struct SqliteRepository {
    pool: DbPool,
    habits: Collection<Habit>,
    tasks: Collection<Task>,
}

impl SqliteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self::with_collections(pool, Collection::new("habits"), Collection::new("tasks"))
    }

    pub fn with_collections(pool: DbPool, habits: Collection<Habit>, tasks: Collection<Task>) -> Self {
        Self { pool, habits, tasks }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub(crate) fn habits(&self) -> &Collection<Habit> {
        &self.habits
    }

    pub(crate) fn tasks(&self) -> &Collection<Task> {
        &self.tasks
    }
}

/// Trims `value` and rejects it if nothing is left.
pub(crate) fn required_text(field: &str, value: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}
