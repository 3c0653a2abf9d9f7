use chrono::{Duration, NaiveDate, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lifeboard_core::models::{Frequency, HabitEntry, HabitStats, RecurrencePattern, Task, UserId};
use lifeboard_core::recurrence::{next_due_date, RecurrenceExpander};
use lifeboard_core::streak::{current_streak, longest_streak};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
}

/// A history of `days` entries ending today, shuffled, with roughly one miss in ten.
fn create_history(days: i64) -> Vec<HabitEntry> {
    let mut rng = fastrand::Rng::with_seed(42);
    let mut history: Vec<HabitEntry> = (0..days)
        .map(|offset| HabitEntry::new(today() - Duration::days(offset), rng.u8(0..10) != 0))
        .collect();
    rng.shuffle(&mut history);
    history
}

fn bench_habit_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("habit_stats");

    for days in [30, 365, 3650] {
        let history = create_history(days);

        group.bench_with_input(BenchmarkId::new("compute", days), &history, |b, history| {
            b.iter(|| HabitStats::compute(black_box(history), black_box(today())))
        });
        group.bench_with_input(BenchmarkId::new("current_streak", days), &history, |b, history| {
            b.iter(|| current_streak(black_box(history), black_box(today())))
        });
        group.bench_with_input(BenchmarkId::new("longest_streak", days), &history, |b, history| {
            b.iter(|| longest_streak(black_box(history)))
        });
    }

    group.finish();
}

fn bench_next_occurrence(c: &mut Criterion) {
    let due = Utc.with_ymd_and_hms(2024, 1, 31, 9, 0, 0).unwrap();
    let mut task = Task::new(UserId::new("bench"), "Benchmark Task");
    task.due_date = Some(due);
    task.recurring = true;
    task.recurrence_pattern = Some(RecurrencePattern::new(Frequency::Monthly, 1));

    c.bench_function("next_due_date_monthly", |b| {
        let pattern = RecurrencePattern::new(Frequency::Monthly, 1);
        b.iter(|| next_due_date(black_box(due), black_box(&pattern)))
    });

    c.bench_function("next_occurrence", |b| {
        b.iter(|| RecurrenceExpander::new(black_box(&task)).next_occurrence(black_box(due)))
    });
}

criterion_group!(benches, bench_habit_stats, bench_next_occurrence);
criterion_main!(benches);
