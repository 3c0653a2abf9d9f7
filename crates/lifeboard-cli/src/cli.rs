use clap::{Args, Parser, Subcommand};
use lifeboard_core::models::{Frequency, TaskPriority, TaskStatus};

/// Lifeboard: habit streaks and recurring tasks from the command line
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the HTTP API
    Serve(ServeCommand),
    /// Track habits
    Habit(HabitCommand),
    /// Manage tasks
    Task(TaskCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct ServeCommand {
    /// Address to bind (overrides server.bind)
    #[arg(long)]
    pub bind: Option<String>,
    /// Port to listen on (overrides server.port)
    #[arg(short, long)]
    pub port: Option<u16>,
}

// ============================================================================
// Habits
// ============================================================================

#[derive(Parser, Debug, Clone)]
pub struct HabitCommand {
    #[command(subcommand)]
    pub command: HabitSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum HabitSubcommand {
    /// Add a new habit
    Add(AddHabitCommand),
    /// List habits with their streaks
    List,
    /// Log a day for a habit (today unless --date is given)
    Done(DoneHabitCommand),
    /// Show completion statistics for a habit
    Stats(StatsHabitCommand),
    /// Delete a habit and its history
    Delete(DeleteCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddHabitCommand {
    /// The name of the habit
    pub name: String,
    #[arg(short, long)]
    pub description: Option<String>,
    #[arg(short, long)]
    pub category: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct DoneHabitCommand {
    /// The ID (or unambiguous prefix) of the habit
    pub id: String,
    /// Day to log (e.g. "yesterday", "2024-03-01")
    #[arg(short, long)]
    pub date: Option<String>,
    /// Record the day as missed instead of completed
    #[arg(long)]
    pub missed: bool,
    #[arg(short, long)]
    pub notes: Option<String>,
    /// Optional measurement for the day (minutes, pages, ...)
    #[arg(long)]
    pub value: Option<f64>,
}

#[derive(Parser, Debug, Clone)]
pub struct StatsHabitCommand {
    /// The ID (or unambiguous prefix) of the habit
    pub id: String,
}

// ============================================================================
// Tasks
// ============================================================================

#[derive(Parser, Debug, Clone)]
pub struct TaskCommand {
    #[command(subcommand)]
    pub command: TaskSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TaskSubcommand {
    /// Add a new task
    Add(AddTaskCommand),
    /// List tasks
    List(ListTaskCommand),
    /// Mark a task as completed
    Do(DoCommand),
    /// Move a task to another status
    Status(StatusCommand),
    /// Delete a task
    Delete(DeleteCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddTaskCommand {
    /// The title of the task
    pub title: String,
    #[arg(short, long)]
    pub description: Option<String>,
    /// The due date of the task
    #[arg(long)]
    pub due: Option<String>,
    /// none, low, medium or high
    #[arg(long)]
    pub priority: Option<TaskPriority>,
    #[arg(short, long)]
    pub project: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    /// Tags to add to the task
    #[arg(short, long)]
    pub tag: Vec<String>,
    /// Subtasks to create alongside the task
    #[arg(short, long)]
    pub subtask: Vec<String>,
    #[command(flatten)]
    pub recurrence: RecurrenceArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RecurrenceArgs {
    /// Make the task recurring: daily, weekly, monthly or yearly
    #[arg(long)]
    pub every: Option<Frequency>,
    /// Repeat every N periods
    #[arg(long, requires = "every", default_value_t = 1)]
    pub interval: u32,
    /// Stop recurring after this date
    #[arg(long, requires = "every")]
    pub until: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ListTaskCommand {
    #[arg(long)]
    pub status: Option<TaskStatus>,
    #[arg(short, long)]
    pub project: Option<String>,
    #[arg(short, long)]
    pub tag: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct DoCommand {
    /// The ID of the task to mark as completed
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct StatusCommand {
    /// The ID of the task
    pub id: String,
    /// todo, in-progress, completed or cancelled
    pub status: TaskStatus,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    /// The ID of the record to delete
    pub id: String,
    /// Force deletion without confirmation
    #[arg(short, long)]
    pub force: bool,
}
