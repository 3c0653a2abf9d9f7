use chrono::{DateTime, Utc};
use chrono_humanize::Humanize;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use lifeboard_core::models::{Habit, HabitStats, Task, TaskPriority, TaskStatus};

fn short_id(id: &uuid::Uuid) -> String {
    id.to_string()[..8].to_string()
}

pub fn display_habits(habits: &[(Habit, HabitStats)]) {
    if habits.is_empty() {
        println!("No habits found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Category", "Streak", "Best", "Rate"]);

    for (habit, stats) in habits {
        let mut row = Row::new();
        row.add_cell(Cell::new(short_id(&habit.id)));
        row.add_cell(Cell::new(&habit.name).add_attribute(Attribute::Bold));
        row.add_cell(Cell::new(habit.category.as_deref().unwrap_or("None")));

        let streak_cell = Cell::new(stats.current_streak);
        row.add_cell(if stats.current_streak > 0 {
            streak_cell.fg(Color::Green)
        } else {
            streak_cell.fg(Color::DarkGrey)
        });
        row.add_cell(Cell::new(stats.longest_streak));
        row.add_cell(Cell::new(format!("{:.0}%", stats.completion_rate)));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_habit_stats(habit: &Habit, stats: &HabitStats) {
    let mut table = Table::new();
    table.set_header(vec![Cell::new(&habit.name).add_attribute(Attribute::Bold), Cell::new("")]);
    table.add_row(vec!["Current streak".to_string(), format!("{} days", stats.current_streak)]);
    table.add_row(vec!["Longest streak".to_string(), format!("{} days", stats.longest_streak)]);
    table.add_row(vec![
        "Completion rate".to_string(),
        format!("{:.1}% ({}/{})", stats.completion_rate, stats.completed_entries, stats.total_entries),
    ]);
    println!("{table}");
}

fn due_cell(task: &Task, now: DateTime<Utc>) -> Cell {
    let Some(due) = task.due_date else {
        return Cell::new("None");
    };

    let cell = Cell::new(due.humanize());
    let open = matches!(task.status, TaskStatus::Todo | TaskStatus::InProgress);
    if !open {
        cell
    } else if due < now {
        cell.fg(Color::Red) // Overdue
    } else if due.date_naive() == now.date_naive() {
        cell.fg(Color::Yellow) // Due today
    } else {
        cell
    }
}

pub fn display_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }

    let now = Utc::now();
    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Status", "Due Date", "Project", "Tags"]);

    for task in tasks {
        let mut row = Row::new();
        row.add_cell(Cell::new(short_id(&task.id)));

        let mut display_title = String::new();
        if task.recurring {
            display_title.push_str("↻ ");
        }
        display_title.push_str(&task.title);
        if !task.subtasks.is_empty() {
            let done = task.subtasks.iter().filter(|s| s.completed).count();
            display_title.push_str(&format!(" [{}/{}]", done, task.subtasks.len()));
        }

        let mut title_cell = Cell::new(display_title);
        title_cell = match task.status {
            TaskStatus::Completed | TaskStatus::Cancelled => title_cell
                .add_attribute(Attribute::CrossedOut)
                .fg(Color::DarkGrey),
            TaskStatus::Todo | TaskStatus::InProgress => match task.priority {
                TaskPriority::High => title_cell.fg(Color::Red).add_attribute(Attribute::Bold),
                TaskPriority::Medium => title_cell.fg(Color::Yellow),
                TaskPriority::Low => title_cell.fg(Color::Green),
                TaskPriority::None => title_cell,
            },
        };
        row.add_cell(title_cell);

        let status_cell = Cell::new(task.status);
        row.add_cell(match task.status {
            TaskStatus::Completed => status_cell.fg(Color::Green),
            TaskStatus::Cancelled => status_cell.fg(Color::DarkGrey),
            TaskStatus::InProgress => status_cell.fg(Color::Cyan),
            TaskStatus::Todo => status_cell,
        });

        row.add_cell(due_cell(task, now));
        row.add_cell(Cell::new(task.project.as_deref().unwrap_or("None")));
        row.add_cell(Cell::new(if task.tags.is_empty() {
            "None".to_string()
        } else {
            task.tags.join(", ")
        }));
        table.add_row(row);
    }

    println!("{table}");
}
