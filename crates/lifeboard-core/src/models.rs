use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Identifier of the user a record belongs to.
///
/// Supplied by whatever sits in front of the core (the HTTP header, the CLI
/// configuration); the engines never look at it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Habits
// ============================================================================

/// One day's record for a habit.
///
/// Deserialization is lenient: a missing `completed` reads as `false` and a
/// missing or unparseable `date` reads as `None`. Timestamped dates keep only
/// their calendar day.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitEntry {
    #[serde(default, deserialize_with = "entry_date::lenient")]
    pub date: Option<NaiveDate>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl HabitEntry {
    pub fn new(date: NaiveDate, completed: bool) -> Self {
        Self {
            date: Some(date),
            completed,
            notes: None,
            value: None,
        }
    }
}

/// Day-level date fields that may arrive as `2024-06-15` or as an RFC 3339
/// timestamp. The time of day is dropped, keeping the date as written.
pub mod entry_date {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|dt| dt.date())
            })
    }

    /// Anything that is not a recognisable date becomes `None`.
    pub fn lenient<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(Value::as_str).and_then(parse))
    }

    /// Like [`lenient`], but a present value that is not a date is an error.
    pub fn strict<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid date '{}'", raw))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: Uuid,
    pub owner_id: UserId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Insertion order, not date order.
    #[serde(default)]
    pub history: Vec<HabitEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewHabitData {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateHabitData {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<Option<String>>,
}

/// Derived numbers for a habit; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitStats {
    pub completion_rate: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_entries: usize,
    pub completed_entries: usize,
}

/// Result of logging a day against a habit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitCompletion {
    pub habit: Habit,
    pub stats: HabitStats,
}

// ============================================================================
// Tasks
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid task status: {0}")]
pub struct ParseTaskStatusError(String);

impl FromStr for TaskStatus {
    type Err = ParseTaskStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "todo" => Ok(TaskStatus::Todo),
            "in-progress" | "in_progress" | "inprogress" => Ok(TaskStatus::InProgress),
            "completed" | "done" => Ok(TaskStatus::Completed),
            "cancelled" | "canceled" => Ok(TaskStatus::Cancelled),
            _ => Err(ParseTaskStatusError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    #[default]
    None,
    Low,
    Medium,
    High,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid task priority: {0}")]
pub struct ParseTaskPriorityError(String);

impl FromStr for TaskPriority {
    type Err = ParseTaskPriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(TaskPriority::None),
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            _ => Err(ParseTaskPriorityError(s.to_string())),
        }
    }
}

/// How often a recurring task comes back.
///
/// Unknown strings land in `Unspecified`, which the expander treats as weekly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    #[default]
    #[serde(other)]
    Unspecified,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid frequency: {0}")]
pub struct ParseFrequencyError(String);

impl FromStr for Frequency {
    type Err = ParseFrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            _ => Err(ParseFrequencyError(s.to_string())),
        }
    }
}

fn default_interval() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrencePattern {
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

impl RecurrencePattern {
    pub fn new(frequency: Frequency, interval: u32) -> Self {
        Self {
            frequency,
            interval,
            end_date: None,
        }
    }

    pub fn until(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Subtask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            completed: false,
            completed_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub owner_id: UserId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub recurring: bool,
    #[serde(default)]
    pub recurrence_pattern: Option<RecurrencePattern>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// A fresh `todo` task with every optional field empty.
    pub fn new(owner_id: UserId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: title.into(),
            description: None,
            category: None,
            project: None,
            priority: TaskPriority::None,
            tags: Vec::new(),
            notes: None,
            due_date: None,
            status: TaskStatus::Todo,
            completed_at: None,
            subtasks: Vec::new(),
            recurring: false,
            recurrence_pattern: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewTaskData {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub project: Option<String>,
    pub priority: Option<TaskPriority>,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    /// Titles of subtasks to create alongside the task
    pub subtasks: Vec<String>,
    /// When present the task is created as recurring
    pub recurrence: Option<RecurrencePattern>,
}

/// Partial update. `Option<Option<T>>` distinguishes "leave alone" from "clear".
#[derive(Debug, Clone, Default)]
pub struct UpdateTaskData {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<Option<String>>,
    pub project: Option<Option<String>>,
    pub priority: Option<TaskPriority>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<Option<String>>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub recurring: Option<bool>,
    pub recurrence_pattern: Option<Option<RecurrencePattern>>,
}

/// Filter for listing tasks. Every set field must match.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub project: Option<String>,
    pub tag: Option<String>,
}

#[derive(Debug)]
pub enum CompletionResult {
    /// Status changed; no successor was spawned
    Single(Task),
    Recurring { completed: Task, next: Task },
}

impl CompletionResult {
    pub fn task(&self) -> &Task {
        match self {
            CompletionResult::Single(task) => task,
            CompletionResult::Recurring { completed, .. } => completed,
        }
    }

    pub fn next(&self) -> Option<&Task> {
        match self {
            CompletionResult::Single(_) => None,
            CompletionResult::Recurring { next, .. } => Some(next),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_habit_entry_lenient_deserialization() {
        let entry: HabitEntry = serde_json::from_value(json!({ "notes": "ran" })).unwrap();
        assert_eq!(entry.date, None);
        assert!(!entry.completed);

        let entry: HabitEntry =
            serde_json::from_value(json!({ "date": "not-a-date", "completed": true })).unwrap();
        assert_eq!(entry.date, None);
        assert!(entry.completed);

        let entry: HabitEntry =
            serde_json::from_value(json!({ "date": "2024-03-01", "completed": "yes" })).unwrap();
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert!(!entry.completed);

        let entry: HabitEntry = serde_json::from_value(json!({ "date": 20240301 })).unwrap();
        assert_eq!(entry.date, None);
    }

    #[rstest]
    #[case("2024-06-15", 15)]
    #[case("2024-06-15T08:00:00Z", 15)]
    #[case("2024-06-14T21:30:00.000Z", 14)]
    #[case("2024-06-14T23:30:00-05:00", 14)]
    #[case("2024-06-15T07:45:10", 15)]
    fn test_entry_date_drops_time_of_day(#[case] raw: &str, #[case] day: u32) {
        let entry: HabitEntry =
            serde_json::from_value(json!({ "date": raw, "completed": true })).unwrap();
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 6, day));
    }

    #[test]
    fn test_unknown_frequency_is_unspecified() {
        let pattern: RecurrencePattern =
            serde_json::from_value(json!({ "frequency": "fortnightly" })).unwrap();
        assert_eq!(pattern.frequency, Frequency::Unspecified);
        assert_eq!(pattern.interval, 1);
        assert!(pattern.end_date.is_none());
    }

    #[test]
    fn test_task_status_wire_format() {
        assert_eq!(serde_json::to_value(TaskStatus::InProgress).unwrap(), json!("in-progress"));
        assert_eq!("in_progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("Done".parse::<TaskStatus>().unwrap(), TaskStatus::Completed);
        assert!("later".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_task_camel_case_fields() {
        let mut task = Task::new(UserId::new("u1"), "Water plants");
        task.recurring = true;
        task.recurrence_pattern = Some(RecurrencePattern::new(Frequency::Weekly, 2));
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["ownerId"], json!("u1"));
        assert_eq!(value["recurrencePattern"]["frequency"], json!("weekly"));
        assert_eq!(value["status"], json!("todo"));
        assert!(value.get("dueDate").is_some());
    }
}
