use anyhow::{anyhow, Result};
use dialoguer::Confirm;
use lifeboard_core::error::CoreError;
use lifeboard_core::models::{HabitEntry, HabitStats, NewHabitData};
use lifeboard_core::repository::Repository;
use owo_colors::{OwoColorize, Style};

use super::Context;
use crate::cli::{AddHabitCommand, DeleteCommand, DoneHabitCommand, HabitSubcommand, StatsHabitCommand};
use crate::parser::parse_day;
use crate::util::resolve_habit_id;
use crate::views::table::{display_habit_stats, display_habits};

pub async fn run(repo: &impl Repository, ctx: &Context, command: HabitSubcommand) -> Result<()> {
    match command {
        HabitSubcommand::Add(command) => add_habit(repo, ctx, command).await,
        HabitSubcommand::List => list_habits(repo, ctx).await,
        HabitSubcommand::Done(command) => complete_habit(repo, ctx, command).await,
        HabitSubcommand::Stats(command) => habit_stats(repo, ctx, command).await,
        HabitSubcommand::Delete(command) => delete_habit(repo, ctx, command).await,
    }
}

pub async fn add_habit(repo: &impl Repository, ctx: &Context, command: AddHabitCommand) -> Result<()> {
    let habit = repo
        .add_habit(
            &ctx.owner,
            NewHabitData {
                name: command.name,
                description: command.description,
                category: command.category,
            },
        )
        .await?;

    println!(
        "{} Created habit: {}",
        "✓".style(Style::new().green().bold()),
        habit.name.bright_white().bold()
    );
    println!("  {} Habit ID: {}", "→".blue(), habit.id.to_string().yellow());
    Ok(())
}

pub async fn list_habits(repo: &impl Repository, ctx: &Context) -> Result<()> {
    let today = ctx.today();
    let rows: Vec<_> = repo
        .find_habits(&ctx.owner)
        .await?
        .into_iter()
        .map(|habit| {
            let stats = HabitStats::compute(&habit.history, today);
            (habit, stats)
        })
        .collect();

    display_habits(&rows);
    Ok(())
}

pub async fn complete_habit(repo: &impl Repository, ctx: &Context, command: DoneHabitCommand) -> Result<()> {
    let habit_id = resolve_habit_id(repo, &ctx.owner, &command.id).await?;
    let date = command
        .date
        .as_deref()
        .map(|d| parse_day(d, ctx.timezone))
        .transpose()?;

    let entry = HabitEntry {
        date,
        completed: !command.missed,
        notes: command.notes,
        value: command.value,
    };
    let completion = repo
        .complete_habit_for_day(&ctx.owner, habit_id, entry, ctx.today())
        .await?;

    let verb = if command.missed { "Missed" } else { "Completed" };
    println!("{} '{}'", verb, completion.habit.name);
    println!(
        "  {} Current streak: {} (best {})",
        "→".blue(),
        completion.stats.current_streak.to_string().green().bold(),
        completion.stats.longest_streak
    );
    Ok(())
}

pub async fn habit_stats(repo: &impl Repository, ctx: &Context, command: StatsHabitCommand) -> Result<()> {
    let habit_id = resolve_habit_id(repo, &ctx.owner, &command.id).await?;
    let habit = repo
        .find_habit_by_id(&ctx.owner, habit_id)
        .await?
        .ok_or_else(|| anyhow!(CoreError::NotFound(format!("Habit with ID '{}' not found.", habit_id))))?;

    let stats = HabitStats::compute(&habit.history, ctx.today());
    display_habit_stats(&habit, &stats);
    Ok(())
}

pub async fn delete_habit(repo: &impl Repository, ctx: &Context, command: DeleteCommand) -> Result<()> {
    let habit_id = resolve_habit_id(repo, &ctx.owner, &command.id).await?;
    let habit = repo
        .find_habit_by_id(&ctx.owner, habit_id)
        .await?
        .ok_or_else(|| anyhow!(CoreError::NotFound(format!("Habit with ID '{}' not found.", habit_id))))?;

    if !command.force {
        let confirmation = Confirm::new()
            .with_prompt(format!(
                "Delete habit '{}' and its {} logged days?",
                habit.name,
                habit.history.len()
            ))
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirmation {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    repo.delete_habit(&ctx.owner, habit_id).await?;
    println!("Deleted habit: '{}'", habit.name);
    Ok(())
}
