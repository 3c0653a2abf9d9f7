use chrono::{DateTime, Duration, Months, Utc};
use uuid::Uuid;

use crate::models::{Frequency, RecurrencePattern, Subtask, Task, TaskStatus};

/// Computes the due date that follows `due` under `pattern`.
///
/// # Behavior
/// - `daily` / `weekly` add `interval` days / weeks
/// - `monthly` / `yearly` add calendar months / years, clamping to the last
///   day of the target month (Jan 31 + 1 month = Feb 28 or 29)
/// - `unspecified` adds one week regardless of `interval`
/// - An `interval` of 0 counts as 1
/// - Returns `None` if the arithmetic overflows the supported date range
pub fn next_due_date(due: DateTime<Utc>, pattern: &RecurrencePattern) -> Option<DateTime<Utc>> {
    let interval = pattern.interval.max(1);
    match pattern.frequency {
        Frequency::Daily => due.checked_add_signed(Duration::days(i64::from(interval))),
        Frequency::Weekly => due.checked_add_signed(Duration::weeks(i64::from(interval))),
        Frequency::Monthly => due.checked_add_months(Months::new(interval)),
        Frequency::Yearly => interval
            .checked_mul(12)
            .and_then(|months| due.checked_add_months(Months::new(months))),
        Frequency::Unspecified => due.checked_add_signed(Duration::weeks(1)),
    }
}

/// RecurrenceExpander: turns one completed recurring task into its successor.
///
/// The expander never touches storage. It is handed a copy of the task and
/// hands back a new, unsaved `Task` (or nothing); saving it is the
/// repository's job.
#[derive(Debug)]
pub struct RecurrenceExpander<'a> {
    task: &'a Task,
}

impl<'a> RecurrenceExpander<'a> {
    pub fn new(task: &'a Task) -> Self {
        Self { task }
    }

    /// Due date of the successor, or `None` when the task should not recur.
    ///
    /// # Behavior
    /// - Requires `recurring`, a pattern and a due date; any missing means no successor
    /// - Suppressed when the next date is strictly after the pattern's `end_date`
    pub fn next_due_date(&self) -> Option<DateTime<Utc>> {
        if !self.task.recurring {
            return None;
        }
        let pattern = self.task.recurrence_pattern.as_ref()?;
        let due = self.task.due_date?;

        let next = match next_due_date(due, pattern) {
            Some(next) => next,
            None => {
                tracing::warn!(task_id = %self.task.id, "next due date out of range, not recurring");
                return None;
            }
        };

        match pattern.end_date {
            Some(end) if next > end => None,
            _ => Some(next),
        }
    }

    /// Builds the successor task, stamped with `now`.
    ///
    /// Carries over the descriptive fields and the recurrence settings. The
    /// successor starts as `todo`; subtasks keep their id and title but lose
    /// all completion state.
    pub fn next_occurrence(&self, now: DateTime<Utc>) -> Option<Task> {
        let due_date = self.next_due_date()?;
        let source = self.task;

        Some(Task {
            id: Uuid::new_v4(),
            owner_id: source.owner_id.clone(),
            title: source.title.clone(),
            description: source.description.clone(),
            category: source.category.clone(),
            project: source.project.clone(),
            priority: source.priority,
            tags: source.tags.clone(),
            notes: source.notes.clone(),
            due_date: Some(due_date),
            status: TaskStatus::Todo,
            completed_at: None,
            subtasks: source
                .subtasks
                .iter()
                .map(|s| Subtask {
                    id: s.id,
                    title: s.title.clone(),
                    completed: false,
                    completed_at: None,
                })
                .collect(),
            recurring: source.recurring,
            recurrence_pattern: source.recurrence_pattern.clone(),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Shorthand for `RecurrenceExpander::new(task).next_occurrence(now)`.
pub fn next_occurrence(task: &Task, now: DateTime<Utc>) -> Option<Task> {
    RecurrenceExpander::new(task).next_occurrence(now)
}
