use crate::error::CoreError;
use crate::models::{
    CompletionResult, NewTaskData, RecurrencePattern, Subtask, Task, TaskFilter, TaskStatus,
    UpdateTaskData, UserId,
};
use crate::recurrence::RecurrenceExpander;
use crate::repository::query_builder::TaskQueryBuilder;
use crate::repository::{required_text, Collection, SqliteRepository, TaskRepository};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

fn validate_pattern(pattern: &RecurrencePattern) -> Result<(), CoreError> {
    if pattern.interval == 0 {
        return Err(CoreError::InvalidInput(
            "Recurrence interval must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl TaskRepository for SqliteRepository {
    async fn add_task(&self, owner: &UserId, data: NewTaskData) -> Result<Task, CoreError> {
        let mut task = Task::new(owner.clone(), required_text("Task title", &data.title)?);
        task.description = data.description;
        task.category = data.category;
        task.project = data.project;
        task.priority = data.priority.unwrap_or_default();
        task.tags = data.tags;
        task.notes = data.notes;
        task.due_date = data.due_date;
        task.subtasks = data
            .subtasks
            .iter()
            .map(|title| required_text("Subtask title", title).map(Subtask::new))
            .collect::<Result<_, _>>()?;

        if let Some(pattern) = data.recurrence {
            validate_pattern(&pattern)?;
            task.recurring = true;
            task.recurrence_pattern = Some(pattern);
        }

        self.tasks().insert(self.pool(), &task).await?;
        tracing::info!(task_id = %task.id, owner = %owner, recurring = task.recurring, "task created");
        Ok(task)
    }

    async fn find_task_by_id(&self, owner: &UserId, id: Uuid) -> Result<Option<Task>, CoreError> {
        self.tasks().find(self.pool(), owner, id).await
    }

    async fn find_tasks(&self, owner: &UserId, filter: &TaskFilter) -> Result<Vec<Task>, CoreError> {
        let mut query_builder = TaskQueryBuilder::build(self.tasks().name(), owner, filter);
        let bodies: Vec<String> = query_builder
            .build_query_scalar()
            .fetch_all(self.pool())
            .await?;

        let tasks = Collection::<Task>::decode_all(bodies)?;
        tracing::debug!(owner = %owner, count = tasks.len(), ?filter, "listed tasks");
        Ok(tasks)
    }

    async fn find_tasks_by_short_id_prefix(&self, owner: &UserId, short_id: &str) -> Result<Vec<Task>, CoreError> {
        self.tasks().find_by_id_prefix(self.pool(), owner, short_id).await
    }

    async fn update_task(&self, owner: &UserId, id: Uuid, data: UpdateTaskData) -> Result<Task, CoreError> {
        let mut task = self
            .tasks()
            .find(self.pool(), owner, id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;

        if let Some(title) = data.title {
            task.title = required_text("Task title", &title)?;
        }
        if let Some(description) = data.description {
            task.description = description;
        }
        if let Some(category) = data.category {
            task.category = category;
        }
        if let Some(project) = data.project {
            task.project = project;
        }
        if let Some(priority) = data.priority {
            task.priority = priority;
        }
        if let Some(tags) = data.tags {
            task.tags = tags;
        }
        if let Some(notes) = data.notes {
            task.notes = notes;
        }
        if let Some(due_date) = data.due_date {
            task.due_date = due_date;
        }
        if let Some(pattern) = data.recurrence_pattern {
            if let Some(pattern) = &pattern {
                validate_pattern(pattern)?;
            }
            task.recurrence_pattern = pattern;
        }
        if let Some(recurring) = data.recurring {
            task.recurring = recurring;
        }
        task.updated_at = Utc::now();

        self.tasks().replace(self.pool(), &task).await?;
        tracing::info!(task_id = %task.id, "task updated");
        Ok(task)
    }

    async fn delete_task(&self, owner: &UserId, id: Uuid) -> Result<(), CoreError> {
        self.tasks().delete(self.pool(), owner, id).await?;
        tracing::info!(task_id = %id, "task deleted");
        Ok(())
    }

    async fn set_task_status(&self, owner: &UserId, id: Uuid, status: TaskStatus) -> Result<CompletionResult, CoreError> {
        let mut tx = self.pool().begin().await?;

        let mut task = self
            .tasks()
            .find(&mut *tx, owner, id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;

        // Completing an already completed task must not spawn a second successor
        let completing = status == TaskStatus::Completed && task.status != TaskStatus::Completed;
        if task.status == status {
            tx.commit().await?;
            return Ok(CompletionResult::Single(task));
        }

        let now = Utc::now();
        task.status = status;
        task.completed_at = if status == TaskStatus::Completed { Some(now) } else { None };
        task.updated_at = now;
        self.tasks().replace(&mut *tx, &task).await?;

        let next = if completing {
            RecurrenceExpander::new(&task).next_occurrence(now)
        } else {
            None
        };

        let result = match next {
            Some(next) => {
                self.tasks().insert(&mut *tx, &next).await?;
                tracing::info!(
                    task_id = %task.id,
                    next_id = %next.id,
                    next_due = ?next.due_date,
                    "recurring task completed, successor created"
                );
                CompletionResult::Recurring { completed: task, next }
            }
            None => {
                tracing::info!(task_id = %task.id, %status, "task status changed");
                CompletionResult::Single(task)
            }
        };

        tx.commit().await?;
        Ok(result)
    }

    async fn complete_task(&self, owner: &UserId, id: Uuid) -> Result<CompletionResult, CoreError> {
        self.set_task_status(owner, id, TaskStatus::Completed).await
    }
}
