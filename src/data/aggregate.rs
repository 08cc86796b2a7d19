//! Derived views over the cleaned records: global totals, weekly world sums and the
//! per-country latest snapshot. All pure functions of the record set.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use thiserror::Error;

use crate::data::record::{Column, DailyRecord, Measures};

pub const DEFAULT_WORLD_LOCATION: &str = "World";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("no rows for aggregate region '{0}' in dataset")]
    MissingRegion(String),
    #[error("region '{region}' never reports a value for {column}")]
    MissingValue { region: String, column: Column },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GlobalTotals {
    pub total_deaths: i64,
    pub total_cases: i64,
    pub people_fully_vaccinated: i64,
    /// Date of the last row in the region series.
    pub as_of: NaiveDate,
}

/// Summed daily deltas for one week (Monday through the Sunday in `week_ending`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyAggregate {
    pub location: String,
    pub week_ending: NaiveDate,
    pub new_cases: f64,
    pub new_deaths: f64,
    pub new_vaccinations: f64,
}

impl WeeklyAggregate {
    /// Only daily-delta columns are summed per week; every other column is `None`.
    pub fn get(&self, column: Column) -> Option<f64> {
        match column {
            Column::NewCases => Some(self.new_cases),
            Column::NewDeaths => Some(self.new_deaths),
            Column::NewVaccinations => Some(self.new_vaccinations),
            _ => None,
        }
    }
}

/// Latest known values for one country. Each column reflects its own latest
/// non-missing observation, so columns may come from different dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountrySnapshot {
    pub iso_code: Option<String>,
    pub location: String,
    pub continent: String,
    pub latest_date: NaiveDate,
    #[serde(flatten)]
    pub measures: Measures,
}

impl CountrySnapshot {
    pub fn value(&self, column: Column) -> Option<f64> {
        self.measures.get(column)
    }
}

/// Rows of `region`, ordered by date ascending.
pub fn region_series(records: &[DailyRecord], region: &str) -> Vec<DailyRecord> {
    let mut series: Vec<DailyRecord> = records
        .iter()
        .filter(|r| r.location == region)
        .cloned()
        .collect();
    series.sort_by_key(|r| r.date);
    series
}

/// Totals read from the last observed value of each total column in the region series.
pub fn global_totals(series: &[DailyRecord], region: &str) -> Result<GlobalTotals, AggregateError> {
    let last = series
        .last()
        .ok_or_else(|| AggregateError::MissingRegion(region.to_string()))?;

    let mut latest = Measures::default();
    for record in series {
        latest.carry_forward(&record.measures);
    }

    let read = |column: Column| {
        latest
            .get(column)
            .map(|value| value as i64)
            .ok_or_else(|| AggregateError::MissingValue {
                region: region.to_string(),
                column,
            })
    };

    Ok(GlobalTotals {
        total_deaths: read(Column::TotalDeaths)?,
        total_cases: read(Column::TotalCases)?,
        people_fully_vaccinated: read(Column::PeopleFullyVaccinated)?,
        as_of: last.date,
    })
}

/// Sunday closing the Monday-to-Sunday week that contains `date`.
pub fn week_ending(date: NaiveDate) -> NaiveDate {
    let days_to_sunday = 6 - i64::from(date.weekday().num_days_from_monday());
    date + Duration::days(days_to_sunday)
}

/// Weekly sums of the daily deltas, one row per week from the first to the last
/// observed week. Weeks without rows are kept with zero sums.
pub fn weekly_sums(series: &[DailyRecord]) -> Vec<WeeklyAggregate> {
    let Some(location) = series.first().map(|r| r.location.clone()) else {
        return Vec::new();
    };

    let mut by_week: BTreeMap<NaiveDate, [f64; 3]> = BTreeMap::new();
    for record in series {
        let sums = by_week.entry(week_ending(record.date)).or_default();
        for (slot, column) in sums.iter_mut().zip(WEEKLY_COLUMNS) {
            *slot += record.value(column).unwrap_or(0.0);
        }
    }

    let (Some(&first), Some(&last)) = (by_week.keys().next(), by_week.keys().next_back()) else {
        return Vec::new();
    };

    let mut weeks = Vec::with_capacity(by_week.len());
    let mut week = first;
    while week <= last {
        let [new_cases, new_deaths, new_vaccinations] =
            by_week.get(&week).copied().unwrap_or_default();
        weeks.push(WeeklyAggregate {
            location: location.clone(),
            week_ending: week,
            new_cases,
            new_deaths,
            new_vaccinations,
        });
        week += Duration::days(7);
    }
    weeks
}

const WEEKLY_COLUMNS: [Column; 3] = [Column::NewCases, Column::NewDeaths, Column::NewVaccinations];

/// The week before the last one. The last week is usually still being reported.
pub fn previous_full_week(weeks: &[WeeklyAggregate]) -> Option<&WeeklyAggregate> {
    weeks.len().checked_sub(2).and_then(|idx| weeks.get(idx))
}

/// Latest known values per location, restricted to real countries (non-missing continent).
pub fn country_snapshot(records: &[DailyRecord]) -> Vec<CountrySnapshot> {
    let mut by_location: BTreeMap<&str, Vec<&DailyRecord>> = BTreeMap::new();
    for record in records {
        by_location.entry(record.location.as_str()).or_default().push(record);
    }

    by_location
        .into_iter()
        .filter_map(|(location, mut rows)| {
            rows.sort_by_key(|r| r.date);
            let latest_date = rows.last()?.date;
            let mut iso_code = None;
            let mut continent = None;
            let mut measures = Measures::default();
            for row in rows {
                if row.iso_code.is_some() {
                    iso_code.clone_from(&row.iso_code);
                }
                if row.continent.is_some() {
                    continent.clone_from(&row.continent);
                }
                measures.carry_forward(&row.measures);
            }
            Some(CountrySnapshot {
                iso_code,
                location: location.to_string(),
                continent: continent?,
                latest_date,
                measures,
            })
        })
        .collect()
}
