//! Streak and completion-rate calculation over a habit's history.
//!
//! Everything here is a pure function of the history slice (and `today`
//! where the answer depends on it). History order is insertion order, so
//! every function that cares about dates sorts its own view of the entries.

use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

use crate::models::{HabitEntry, HabitStats};

/// Percentage of entries marked completed, in `[0, 100]`.
///
/// Empty history yields `0.0`.
pub fn completion_rate(history: &[HabitEntry]) -> f64 {
    if history.is_empty() {
        return 0.0;
    }
    let completed = history.iter().filter(|e| e.completed).count();
    100.0 * completed as f64 / history.len() as f64
}

/// Length of the streak ending today or yesterday.
///
/// # Behavior
/// - Entries are walked newest first; undated entries sort last.
/// - The newest entry must fall on `today` or the day before (the one-day
///   grace period), otherwise the streak is 0.
/// - The newest entry counts only if completed. An incomplete entry for the
///   newest day does not stop the walk, so a run ending the day before is
///   still credited.
/// - Every later entry must be exactly one day before the previous counted
///   day and completed; the first one that is not ends the walk for good.
pub fn current_streak(history: &[HabitEntry], today: NaiveDate) -> u32 {
    if history.is_empty() {
        return 0;
    }

    let mut entries: Vec<&HabitEntry> = history.iter().collect();
    // Option orders None before Some, so descending puts undated entries last
    entries.sort_by(|a, b| b.date.cmp(&a.date));

    let Some(most_recent) = entries[0].date else {
        return 0;
    };
    let yesterday = today - Duration::days(1);
    if most_recent != today && most_recent != yesterday {
        return 0;
    }

    let mut streak = u32::from(entries[0].completed);
    let mut cursor = most_recent;

    for entry in &entries[1..] {
        match entry.date {
            Some(date) if date == cursor - Duration::days(1) && entry.completed => {
                streak += 1;
                cursor = date;
            }
            _ => break,
        }
    }

    streak
}

/// Longest run of consecutive calendar days with a completed entry.
///
/// Undated entries are ignored. A day with several entries counts as
/// completed when any of them is.
pub fn longest_streak(history: &[HabitEntry]) -> u32 {
    let mut days: BTreeMap<NaiveDate, bool> = BTreeMap::new();
    for entry in history {
        if let Some(date) = entry.date {
            let done = days.entry(date).or_insert(false);
            *done |= entry.completed;
        }
    }

    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for (&date, &done) in &days {
        if !done {
            run = 0;
            previous = None;
            continue;
        }
        run = match previous {
            Some(prev) if date - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(date);
    }

    longest
}

/// Appends `entry`, or replaces the existing entry for the same day.
///
/// Returns `true` when an existing entry was replaced. Undated entries are
/// always appended.
pub fn upsert_entry(history: &mut Vec<HabitEntry>, entry: HabitEntry) -> bool {
    if entry.date.is_some() {
        if let Some(existing) = history.iter_mut().find(|e| e.date == entry.date) {
            *existing = entry;
            return true;
        }
    }
    history.push(entry);
    false
}

impl HabitStats {
    pub fn compute(history: &[HabitEntry], today: NaiveDate) -> Self {
        Self {
            completion_rate: completion_rate(history),
            current_streak: current_streak(history, today),
            longest_streak: longest_streak(history),
            total_entries: history.len(),
            completed_entries: history.iter().filter(|e| e.completed).count(),
        }
    }
}
