//! Figure descriptions handed to the page. Plotly draws them; nothing here decides
//! what to show beyond passing the resolved column through.

use chrono::NaiveDate;
use serde::Serialize;

use crate::data::aggregate::{CountrySnapshot, WeeklyAggregate};
use crate::data::record::Column;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Margin {
    pub t: u32,
    pub b: u32,
    pub l: u32,
    pub r: u32,
}

const NO_MARGIN: Margin = Margin {
    t: 0,
    b: 0,
    l: 0,
    r: 0,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarFigure {
    pub kind: &'static str,
    pub column: Column,
    /// Week-ending dates.
    pub x: Vec<NaiveDate>,
    pub y: Vec<Option<f64>>,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub height: u32,
    pub margin: Margin,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapFigure {
    pub kind: &'static str,
    pub column: Column,
    pub scope: &'static str,
    /// ISO 3166 alpha-3 region codes; used for placement only, never shown on hover.
    pub locations: Vec<String>,
    pub z: Vec<Option<f64>>,
    pub hover_names: Vec<String>,
    pub value_label: &'static str,
    pub show_frame: bool,
    pub show_scale: bool,
    pub margin: Margin,
}

/// One bar per week, height = the week's value in `column`.
pub fn render_bar(weeks: &[WeeklyAggregate], column: Column) -> BarFigure {
    BarFigure {
        kind: "bar",
        column,
        x: weeks.iter().map(|w| w.week_ending).collect(),
        y: weeks.iter().map(|w| w.get(column)).collect(),
        x_label: "Date",
        y_label: "Week sum",
        height: 250,
        margin: NO_MARGIN,
    }
}

/// One region per country coloured by `column`. Countries without a region code can't be placed.
pub fn render_map(snapshot: &[CountrySnapshot], column: Column) -> MapFigure {
    let placed: Vec<(&str, &CountrySnapshot)> = snapshot
        .iter()
        .filter_map(|country| country.iso_code.as_deref().map(|code| (code, country)))
        .collect();

    MapFigure {
        kind: "choropleth",
        column,
        scope: "world",
        locations: placed.iter().map(|(code, _)| (*code).to_string()).collect(),
        z: placed.iter().map(|(_, c)| c.value(column)).collect(),
        hover_names: placed.iter().map(|(_, c)| c.location.clone()).collect(),
        value_label: "value",
        show_frame: false,
        show_scale: true,
        margin: NO_MARGIN,
    }
}

/// Thousands-separated integer, e.g. `6,881,955`.
pub fn format_count(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
