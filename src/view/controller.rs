//! Two-stage reaction to dropdown changes.
//!
//! Transition A (variable changed) recomputes the metric options and resets the metric
//! to the variable's default. Transition B (variable or metric changed) resolves the
//! column and re-renders the map, the weekly bar chart and the current-week summary.
//! Everything is synchronous and reads the shared [`Dashboard`] without mutating it.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::dashboard::Dashboard;
use crate::data::aggregate::previous_full_week;
use crate::data::record::Column;
use crate::view::render::{format_count, render_bar, render_map, BarFigure, MapFigure};
use crate::view::selector::{
    default_metric, is_offered, metric_options, weekly_column, Metric, SelectOption, Selection,
    SelectionError, Variable,
};

/// Output of transition A.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricOptionsUpdate {
    pub variable: Variable,
    pub options: Vec<SelectOption<Metric>>,
    pub value: Metric,
}

/// Summary next to the bar chart: the last complete week of the variable's daily delta.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentWeek {
    pub variable: Variable,
    pub week_ending: Option<NaiveDate>,
    pub value: Option<i64>,
    /// Thousands-separated value, or "n/a" with fewer than two weeks of data.
    pub display: String,
    pub period: &'static str,
}

/// Output of transition B.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderUpdate {
    pub selection: Selection,
    pub column: Column,
    pub map: MapFigure,
    pub bar: BarFigure,
    pub current_week: CurrentWeek,
}

pub struct InteractionController<'a> {
    dashboard: &'a Dashboard,
    selection: Selection,
}

impl<'a> InteractionController<'a> {
    /// Starts from the default selection (deaths / total).
    pub fn new(dashboard: &'a Dashboard) -> Self {
        InteractionController {
            dashboard,
            selection: Selection::default(),
        }
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Transition A.
    pub fn on_variable_changed(&mut self, variable: Variable) -> MetricOptionsUpdate {
        let value = default_metric(variable);
        self.selection = Selection {
            variable,
            metric: value,
        };
        debug!(%variable, metric = %value, "metric reset to default");
        MetricOptionsUpdate {
            variable,
            options: metric_options(variable),
            value,
        }
    }

    /// Only metrics offered for the current variable are accepted.
    pub fn on_metric_changed(&mut self, metric: Metric) -> Result<(), SelectionError> {
        let variable = self.selection.variable;
        if !is_offered(variable, metric) {
            return Err(SelectionError::MetricNotOffered { variable, metric });
        }
        self.selection.metric = metric;
        Ok(())
    }

    /// Transition B.
    pub fn render(&self) -> Result<RenderUpdate, SelectionError> {
        let column = self.selection.column()?;
        let weekly = weekly_column(self.selection.variable);
        debug!(%column, %weekly, "rendering selection");

        Ok(RenderUpdate {
            selection: self.selection,
            column,
            map: render_map(self.dashboard.snapshot(), column),
            bar: render_bar(self.dashboard.weekly(), weekly),
            current_week: self.current_week(weekly),
        })
    }

    fn current_week(&self, column: Column) -> CurrentWeek {
        let week = previous_full_week(self.dashboard.weekly());
        let value = week.and_then(|w| w.get(column)).map(|v| v as i64);
        CurrentWeek {
            variable: self.selection.variable,
            week_ending: week.map(|w| w.week_ending),
            value,
            display: value.map_or_else(|| "n/a".to_string(), format_count),
            period: "last week",
        }
    }
}
