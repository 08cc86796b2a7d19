//! Startup pipeline benchmarks: clean + aggregate over a synthetic multi-year dataset.
//!
//! Run with: `cargo bench`

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use covid_tracker::dashboard::Dashboard;
use covid_tracker::data::aggregate::{country_snapshot, region_series, weekly_sums};
use covid_tracker::data::clean::clean_records;
use covid_tracker::data::record::{DailyRecord, Measures};

const DAYS: i64 = 1_000;
const COUNTRIES: usize = 200;

fn synthetic_records() -> Vec<DailyRecord> {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let mut records = Vec::with_capacity(DAYS as usize * (COUNTRIES + 1));
    for day in 0..DAYS {
        let date = start + Duration::days(day);
        let total = (day * 100) as f64;
        records.push(DailyRecord {
            iso_code: Some("OWID_WRL".to_string()),
            location: "World".to_string(),
            continent: None,
            date,
            measures: Measures {
                new_cases: Some(100.0),
                total_cases: Some(total),
                total_deaths: Some(total / 50.0),
                people_fully_vaccinated: (day > 300).then_some(total * 2.0),
                ..Measures::default()
            },
        });
        for country in 0..COUNTRIES {
            records.push(DailyRecord {
                iso_code: Some(format!("C{country:03}")),
                location: format!("Country {country:03}"),
                continent: Some("Europe".to_string()),
                date,
                measures: Measures {
                    // Sparse reporting, as in the real dataset.
                    new_cases: (day % 3 == 0).then_some(5.0),
                    total_cases: (day % 7 == 0).then_some(total / 100.0),
                    ..Measures::default()
                },
            });
        }
    }
    records
}

fn bench_pipeline(c: &mut Criterion) {
    let records = synthetic_records();
    let cleaned = clean_records(&records);

    let mut group = c.benchmark_group("pipeline");
    group.sample_size(20);
    group.throughput(Throughput::Elements(records.len() as u64));

    group.bench_function("clean", |b| b.iter(|| clean_records(black_box(&records))));
    group.bench_function("weekly_sums", |b| {
        let world = region_series(&cleaned, "World");
        b.iter(|| weekly_sums(black_box(&world)))
    });
    group.bench_function("country_snapshot", |b| {
        b.iter(|| country_snapshot(black_box(&cleaned)))
    });
    group.bench_function("dashboard_from_records", |b| {
        b.iter(|| Dashboard::from_records(black_box(&records), "World"))
    });

    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
