//! Performance benchmarks for the aggregations every widget recomputes on update
//!
//! The survey is ~7k rows; a full dashboard update must stay well under a frame.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mindboard_core::analytics::{
    category_breakdown, counseling_summary, course_age_counts, course_attribute_counts, min_max,
};
use mindboard_core::models::{CounselingUse, Course, Level, Row, RowId};
use mindboard_core::{Dashboard, DashboardConfig, DashboardEvent};

/// Generate deterministic survey rows
fn generate_rows(count: usize) -> Vec<Row> {
    (0..count)
        .map(|i| Row {
            id: RowId(i as u32),
            age: 18 + (i % 7) as u8,
            course: Course::ALL[i % Course::ALL.len()],
            cgpa: 2.5 + (i % 15) as f64 / 10.0,
            stress_level: (i % 6) as u8,
            depression_score: (i / 3 % 6) as u8,
            anxiety_score: (i / 7 % 6) as u8,
            financial_stress: (i % 6) as u8,
            sleep_quality: Level::ALL[i % 3],
            physical_activity: Level::ALL[(i / 2) % 3],
            diet_quality: Level::ALL[(i / 5) % 3],
            social_support: Level::ALL[(i / 11) % 3],
            extracurricular_involvement: Level::ALL[(i / 13) % 3],
            counseling: CounselingUse::ORDER[i % 3],
        })
        .collect()
}

/// Benchmark 1: the building blocks
fn aggregation_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregations");

    for count in [1_000, 7_000] {
        let rows = generate_rows(count);
        group.bench_with_input(BenchmarkId::new("course_table", count), &rows, |b, rows| {
            b.iter(|| {
                let table = course_attribute_counts(black_box(rows));
                black_box(min_max(&table));
            });
        });
        group.bench_with_input(BenchmarkId::new("course_age", count), &rows, |b, rows| {
            b.iter(|| black_box(course_age_counts(rows, 18..=24)));
        });
        group.bench_with_input(BenchmarkId::new("categories", count), &rows, |b, rows| {
            b.iter(|| black_box(category_breakdown(rows, 3)));
        });
        group.bench_with_input(BenchmarkId::new("counseling", count), &rows, |b, rows| {
            b.iter(|| black_box(counseling_summary(rows)));
        });
    }

    group.finish();
}

/// Benchmark 2: one full clear cascade across all 20 widgets
fn cascade_benchmark(c: &mut Criterion) {
    let mut dashboard = Dashboard::new(DashboardConfig::default());
    dashboard.load(generate_rows(7_000));

    c.bench_function("clear_cascade_7000", |b| {
        b.iter(|| black_box(dashboard.dispatch(DashboardEvent::Cleared)));
    });
}

criterion_group!(benches, aggregation_benchmark, cascade_benchmark);
criterion_main!(benches);
