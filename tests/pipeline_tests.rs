//! Load -> clean -> aggregate over the fixture CSV in tests/fixtures.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use covid_tracker::dashboard::Dashboard;
use covid_tracker::data::aggregate::{previous_full_week, region_series, weekly_sums};
use covid_tracker::data::clean::clean_records;
use covid_tracker::data::loader::{load_records, DataSource};
use covid_tracker::data::record::{Column, DailyRecord};

const FIXTURE: &str = "tests/fixtures/owid_sample.csv";

fn fixture_records() -> Vec<DailyRecord> {
    let source = DataSource::File(PathBuf::from(FIXTURE));
    load_records(&source, Duration::from_secs(5)).expect("fixture should load")
}

fn day(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, m, d).unwrap()
}

#[test]
fn cleaning_leaves_no_missing_daily_deltas() {
    let raw = fixture_records();
    assert!(
        raw.iter().any(|r| r.value(Column::NewCases).is_none()),
        "fixture should contain gaps to clean"
    );
    let cleaned = clean_records(&raw);
    for record in &cleaned {
        for column in Column::DAILY_DELTAS {
            assert!(
                record.value(column).is_some(),
                "{} {} missing {column}",
                record.location,
                record.date
            );
        }
    }
}

#[test]
fn weekly_sums_conserve_daily_new_cases() {
    let cleaned = clean_records(&fixture_records());
    let world = region_series(&cleaned, "World");
    let weeks = weekly_sums(&world);

    let daily: f64 = world.iter().filter_map(|r| r.value(Column::NewCases)).sum();
    let weekly: f64 = weeks.iter().map(|w| w.new_cases).sum();
    assert_eq!(daily, weekly);
    assert_eq!(weekly, 2930.0);

    let endings: Vec<_> = weeks.iter().map(|w| w.week_ending).collect();
    assert_eq!(endings, vec![day(3, 7), day(3, 14), day(3, 21)]);
}

#[test]
fn dashboard_views_match_fixture() {
    let dashboard = Dashboard::from_records(&fixture_records(), "World").expect("views build");

    let totals = dashboard.totals();
    assert_eq!(totals.total_cases, 3060);
    assert_eq!(totals.total_deaths, 289);
    // Last day has no vaccination total; the last observed one is used.
    assert_eq!(totals.people_fully_vaccinated, 7500);
    assert_eq!(totals.as_of, day(3, 17));

    let week = previous_full_week(dashboard.weekly()).expect("three weeks");
    assert_eq!(week.week_ending, day(3, 14));
    assert_eq!(week.new_cases, 1400.0);
    assert_eq!(week.new_deaths, 147.0);
    assert_eq!(week.new_vaccinations, 70000.0);
}

#[test]
fn snapshot_contains_exactly_the_countries() {
    let records = fixture_records();
    let dashboard = Dashboard::from_records(&records, "World").expect("views build");

    let expected: BTreeSet<_> = records
        .iter()
        .filter(|r| r.continent.is_some())
        .map(|r| r.location.clone())
        .collect();
    let actual: BTreeSet<_> = dashboard
        .snapshot()
        .iter()
        .map(|c| c.location.clone())
        .collect();
    assert_eq!(actual, expected);
    assert!(!actual.contains("World"));
    assert!(!actual.contains("Europe"));

    let norway = dashboard
        .snapshot()
        .iter()
        .find(|c| c.location == "Norway")
        .expect("Norway present");
    assert_eq!(norway.value(Column::TotalCases), Some(1020.0));
    assert_eq!(norway.value(Column::PeopleFullyVaccinated), Some(300.0));
    assert_eq!(norway.value(Column::TotalVaccinationsPerHundred), Some(3.1));
    assert_eq!(norway.value(Column::NewCases), Some(0.0));
    assert_eq!(norway.latest_date, day(3, 3));

    let sweden = dashboard
        .snapshot()
        .iter()
        .find(|c| c.location == "Sweden")
        .expect("Sweden present");
    assert_eq!(sweden.value(Column::PeopleFullyVaccinated), None);
}

#[test]
fn unknown_world_region_is_fatal() {
    let err = Dashboard::from_records(&fixture_records(), "Planet").expect_err("no such region");
    assert!(err.to_string().contains("Planet"));
}
