//! Startup-built dashboard data. Load once, then share read-only via `Arc`
//! with every request handler; nothing writes to it after startup.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::data::aggregate::{
    country_snapshot, global_totals, region_series, weekly_sums, AggregateError, CountrySnapshot,
    GlobalTotals, WeeklyAggregate,
};
use crate::data::clean::clean_records;
use crate::data::loader::{load_records, LoadError};
use crate::data::record::DailyRecord;

/// Every way startup can fail. None of these are retried.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

#[derive(Debug)]
pub struct Dashboard {
    world_location: String,
    record_count: usize,
    totals: GlobalTotals,
    weekly: Vec<WeeklyAggregate>,
    snapshot: Vec<CountrySnapshot>,
}

impl Dashboard {
    /// Fetch, clean and aggregate according to `config`.
    pub fn load(config: &Config) -> Result<Arc<Dashboard>, DashboardError> {
        let records = load_records(&config.data_source, config.fetch_timeout)?;
        let dashboard = Dashboard::from_records(&records, &config.world_location)?;
        Ok(Arc::new(dashboard))
    }

    /// Clean `records` and derive the three views.
    pub fn from_records(records: &[DailyRecord], world_location: &str) -> Result<Dashboard, AggregateError> {
        let cleaned = clean_records(records);
        let world = region_series(&cleaned, world_location);
        let totals = global_totals(&world, world_location)?;
        let weekly = weekly_sums(&world);
        let snapshot = country_snapshot(&cleaned);

        info!(
            records = cleaned.len(),
            world_rows = world.len(),
            weeks = weekly.len(),
            countries = snapshot.len(),
            as_of = %totals.as_of,
            "dashboard views built"
        );

        Ok(Dashboard {
            world_location: world_location.to_string(),
            record_count: cleaned.len(),
            totals,
            weekly,
            snapshot,
        })
    }

    pub fn world_location(&self) -> &str {
        &self.world_location
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn totals(&self) -> &GlobalTotals {
        &self.totals
    }

    /// World weekly sums, oldest week first.
    pub fn weekly(&self) -> &[WeeklyAggregate] {
        &self.weekly
    }

    /// One row per country, ordered by location name.
    pub fn snapshot(&self) -> &[CountrySnapshot] {
        &self.snapshot
    }
}
