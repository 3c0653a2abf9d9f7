//! # Lifeboard Core Library
//!
//! Storage and domain logic behind the Lifeboard personal dashboard: habits
//! with day-level completion history and tasks that can recur.
//!
//! ## Core Modules
//!
//! - [`db`]: Database connection and migration management
//! - [`models`]: Core data structures and transfer objects
//! - [`repository`]: Document-store data access behind async traits
//! - [`streak`]: Completion rate and streak calculation for habits
//! - [`recurrence`]: Next-occurrence expansion for recurring tasks
//! - [`timezone`]: Timezone utilities and validation
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use lifeboard_core::{
//!     db, models::{NewTaskData, RecurrencePattern, Frequency, UserId},
//!     repository::{SqliteRepository, TaskRepository},
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = db::establish_connection("lifeboard.db").await?;
//!     let repo = SqliteRepository::new(pool);
//!     let me = UserId::new("local");
//!
//!     let task = repo.add_task(&me, NewTaskData {
//!         title: "Water plants".to_string(),
//!         due_date: Some(chrono::Utc::now()),
//!         recurrence: Some(RecurrencePattern::new(Frequency::Weekly, 1)),
//!         ..Default::default()
//!     }).await?;
//!
//!     let result = repo.complete_task(&me, task.id).await?;
//!     if let Some(next) = result.next() {
//!         println!("Next one due {:?}", next.due_date);
//!     }
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
pub mod models;
pub mod recurrence;
pub mod repository;
pub mod streak;
pub mod timezone;
