use anyhow::{anyhow, Result};
use lifeboard_core::error::CoreError;
use lifeboard_core::models::UserId;
use lifeboard_core::repository::Repository;
use uuid::Uuid;

fn check_prefix(short_id: &str) -> Result<()> {
    if short_id.len() < 2 {
        return Err(anyhow!(CoreError::InvalidInput(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }
    if !short_id.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
        return Err(anyhow!(CoreError::InvalidInput(format!(
            "Short ID '{}' may only contain hex digits and '-'.",
            short_id
        ))));
    }
    Ok(())
}

/// Resolves a unique match among `(id, label)` candidates for `short_id`.
fn pick(kind: &str, short_id: &str, mut candidates: Vec<(Uuid, String)>) -> Result<Uuid> {
    match candidates.len() {
        1 => Ok(candidates.remove(0).0),
        0 => Err(anyhow!(CoreError::NotFound(format!(
            "No {} found with ID prefix '{}'",
            kind, short_id
        )))),
        _ => Err(anyhow!(CoreError::AmbiguousId(
            candidates
                .into_iter()
                .map(|(id, label)| (id.to_string(), label))
                .collect()
        ))),
    }
}

pub async fn resolve_task_id(repo: &impl Repository, owner: &UserId, short_id: &str) -> Result<Uuid> {
    check_prefix(short_id)?;
    let tasks = repo.find_tasks_by_short_id_prefix(owner, short_id).await?;
    pick("task", short_id, tasks.into_iter().map(|t| (t.id, t.title)).collect())
}

pub async fn resolve_habit_id(repo: &impl Repository, owner: &UserId, short_id: &str) -> Result<Uuid> {
    check_prefix(short_id)?;
    let habits = repo.find_habits_by_short_id_prefix(owner, short_id).await?;
    pick("habit", short_id, habits.into_iter().map(|h| (h.id, h.name)).collect())
}
