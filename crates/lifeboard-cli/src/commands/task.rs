use anyhow::{anyhow, Result};
use dialoguer::Confirm;
use lifeboard_core::error::CoreError;
use lifeboard_core::models::{CompletionResult, NewTaskData, RecurrencePattern, Task, TaskFilter};
use lifeboard_core::repository::Repository;
use owo_colors::{OwoColorize, Style};

use super::Context;
use crate::cli::{AddTaskCommand, DeleteCommand, DoCommand, ListTaskCommand, StatusCommand, TaskSubcommand};
use crate::parser::parse_due_date;
use crate::util::resolve_task_id;
use crate::views::table::display_tasks;

pub async fn run(repo: &impl Repository, ctx: &Context, command: TaskSubcommand) -> Result<()> {
    match command {
        TaskSubcommand::Add(command) => add_task(repo, ctx, command).await,
        TaskSubcommand::List(command) => list_tasks(repo, ctx, command).await,
        TaskSubcommand::Do(command) => do_task(repo, ctx, command).await,
        TaskSubcommand::Status(command) => set_status(repo, ctx, command).await,
        TaskSubcommand::Delete(command) => delete_task(repo, ctx, command).await,
    }
}

pub async fn add_task(repo: &impl Repository, ctx: &Context, command: AddTaskCommand) -> Result<()> {
    let due_date = command
        .due
        .as_deref()
        .map(|d| parse_due_date(d, ctx.timezone))
        .transpose()?;

    let recurrence = match command.recurrence.every {
        Some(frequency) => {
            let mut pattern = RecurrencePattern::new(frequency, command.recurrence.interval);
            if let Some(until) = command.recurrence.until.as_deref() {
                pattern = pattern.until(parse_due_date(until, ctx.timezone)?);
            }
            Some(pattern)
        }
        None => None,
    };

    let task = repo
        .add_task(
            &ctx.owner,
            NewTaskData {
                title: command.title,
                description: command.description,
                category: command.category,
                project: command.project,
                priority: command.priority,
                tags: command.tag,
                notes: None,
                due_date,
                subtasks: command.subtask,
                recurrence,
            },
        )
        .await?;

    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();

    let label = if task.recurring { "Created recurring task" } else { "Created task" };
    println!("{} {}: {}", "✓".style(success_style), label, task.title.bright_white().bold());
    println!("  {} Task ID: {}", "→".style(info_style), task.id.to_string().yellow());
    if let Some(due) = task.due_date {
        println!(
            "  {} Due: {}",
            "→".style(info_style),
            due.with_timezone(&ctx.timezone).format("%Y-%m-%d %H:%M").to_string().cyan()
        );
    }
    if task.recurring && task.due_date.is_none() {
        println!(
            "  {} No due date set, so completing it will not schedule a next one",
            "!".yellow()
        );
    }
    Ok(())
}

pub async fn list_tasks(repo: &impl Repository, ctx: &Context, command: ListTaskCommand) -> Result<()> {
    let filter = TaskFilter {
        status: command.status,
        project: command.project,
        tag: command.tag,
    };
    let tasks = repo.find_tasks(&ctx.owner, &filter).await?;
    display_tasks(&tasks);
    Ok(())
}

fn report_transition(ctx: &Context, result: &CompletionResult) {
    let task = result.task();
    println!("Task '{}' is now {}", task.title, task.status);
    if let Some(next) = result.next() {
        match next.due_date {
            Some(due) => println!(
                "Created recurring task '{}' for {}",
                next.title,
                due.with_timezone(&ctx.timezone).format("%Y-%m-%d %H:%M")
            ),
            None => println!("Created recurring task '{}'", next.title),
        }
    }
}

pub async fn do_task(repo: &impl Repository, ctx: &Context, command: DoCommand) -> Result<()> {
    let task_id = resolve_task_id(repo, &ctx.owner, &command.id).await?;
    let result = repo.complete_task(&ctx.owner, task_id).await?;

    match &result {
        CompletionResult::Single(task) => println!("Completed task: '{}'", task.title),
        CompletionResult::Recurring { .. } => report_transition(ctx, &result),
    }
    Ok(())
}

pub async fn set_status(repo: &impl Repository, ctx: &Context, command: StatusCommand) -> Result<()> {
    let task_id = resolve_task_id(repo, &ctx.owner, &command.id).await?;
    let result = repo.set_task_status(&ctx.owner, task_id, command.status).await?;
    report_transition(ctx, &result);
    Ok(())
}

async fn find_task(repo: &impl Repository, ctx: &Context, short_id: &str) -> Result<Task> {
    let task_id = resolve_task_id(repo, &ctx.owner, short_id).await?;
    repo.find_task_by_id(&ctx.owner, task_id)
        .await?
        .ok_or_else(|| anyhow!(CoreError::NotFound(format!("Task with ID '{}' not found.", task_id))))
}

pub async fn delete_task(repo: &impl Repository, ctx: &Context, command: DeleteCommand) -> Result<()> {
    let task = find_task(repo, ctx, &command.id).await?;

    if !command.force {
        let confirmation = Confirm::new()
            .with_prompt(format!("Are you sure you want to delete task '{}'?", task.title))
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirmation {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    repo.delete_task(&ctx.owner, task.id).await?;
    println!("Deleted task: '{}'", task.title);
    Ok(())
}
