use crate::error::CoreError;
use crate::models::{
    Habit, HabitCompletion, HabitEntry, HabitStats, NewHabitData, UpdateHabitData, UserId,
};
use crate::repository::{required_text, HabitRepository, SqliteRepository};
use crate::streak;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

#[async_trait]
impl HabitRepository for SqliteRepository {
    async fn add_habit(&self, owner: &UserId, data: NewHabitData) -> Result<Habit, CoreError> {
        let now = Utc::now();
        let habit = Habit {
            id: Uuid::new_v4(),
            owner_id: owner.clone(),
            name: required_text("Habit name", &data.name)?,
            description: data.description,
            category: data.category,
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.habits().insert(self.pool(), &habit).await?;
        tracing::info!(habit_id = %habit.id, owner = %owner, "habit created");
        Ok(habit)
    }

    async fn find_habit_by_id(&self, owner: &UserId, id: Uuid) -> Result<Option<Habit>, CoreError> {
        self.habits().find(self.pool(), owner, id).await
    }

    async fn find_habits(&self, owner: &UserId) -> Result<Vec<Habit>, CoreError> {
        let habits = self.habits().find_all(self.pool(), owner).await?;
        tracing::debug!(owner = %owner, count = habits.len(), "listed habits");
        Ok(habits)
    }

    async fn find_habits_by_short_id_prefix(&self, owner: &UserId, short_id: &str) -> Result<Vec<Habit>, CoreError> {
        self.habits().find_by_id_prefix(self.pool(), owner, short_id).await
    }

    async fn update_habit(&self, owner: &UserId, id: Uuid, data: UpdateHabitData) -> Result<Habit, CoreError> {
        let mut habit = self
            .habits()
            .find(self.pool(), owner, id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;

        if let Some(name) = data.name {
            habit.name = required_text("Habit name", &name)?;
        }
        if let Some(description) = data.description {
            habit.description = description;
        }
        if let Some(category) = data.category {
            habit.category = category;
        }
        habit.updated_at = Utc::now();

        self.habits().replace(self.pool(), &habit).await?;
        tracing::info!(habit_id = %habit.id, "habit updated");
        Ok(habit)
    }

    async fn delete_habit(&self, owner: &UserId, id: Uuid) -> Result<(), CoreError> {
        self.habits().delete(self.pool(), owner, id).await?;
        tracing::info!(habit_id = %id, "habit deleted");
        Ok(())
    }

    async fn complete_habit_for_day(
        &self,
        owner: &UserId,
        id: Uuid,
        mut entry: HabitEntry,
        today: NaiveDate,
    ) -> Result<HabitCompletion, CoreError> {
        let mut tx = self.pool().begin().await?;

        let mut habit = self
            .habits()
            .find(&mut *tx, owner, id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;

        let day = *entry.date.get_or_insert(today);
        let replaced = streak::upsert_entry(&mut habit.history, entry);
        habit.updated_at = Utc::now();

        self.habits().replace(&mut *tx, &habit).await?;
        tx.commit().await?;

        let stats = HabitStats::compute(&habit.history, today);
        tracing::info!(
            habit_id = %habit.id,
            %day,
            replaced,
            current_streak = stats.current_streak,
            "habit day logged"
        );

        Ok(HabitCompletion { habit, stats })
    }
}
