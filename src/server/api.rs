use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::dashboard::Dashboard;
use crate::view::controller::{InteractionController, MetricOptionsUpdate, RenderUpdate};
use crate::view::render::format_count;
use crate::view::selector::{variable_options, Metric, SelectOption, SelectionError, Variable};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "covid-tracker",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[derive(Debug, Clone, Serialize)]
pub struct TotalCard {
    pub id: &'static str,
    pub label: &'static str,
    pub value: i64,
    pub display: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TotalsResponse {
    pub region: String,
    pub as_of: NaiveDate,
    pub cards: Vec<TotalCard>,
}

pub fn totals_payload(dashboard: &Dashboard) -> Result<String, serde_json::Error> {
    let totals = dashboard.totals();
    let card = |id, label, value| TotalCard {
        id,
        label,
        value,
        display: format_count(value),
    };
    let response = TotalsResponse {
        region: dashboard.world_location().to_string(),
        as_of: totals.as_of,
        cards: vec![
            card("total_deaths", "Total deaths", totals.total_deaths),
            card("total_cases", "Total cases", totals.total_cases),
            card(
                "people_fully_vaccinated",
                "People vaccinated",
                totals.people_fully_vaccinated,
            ),
        ],
    };
    serde_json::to_string_pretty(&response)
}

#[derive(Debug, Clone, Serialize)]
pub struct VariablesResponse {
    pub options: Vec<SelectOption<Variable>>,
    pub value: Variable,
}

pub fn variables_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&VariablesResponse {
        options: variable_options(),
        value: Variable::default(),
    })
}

fn parse_variable(raw: Option<&str>) -> Result<Variable, SelectionError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => raw.parse(),
        None => Ok(Variable::default()),
    }
}

fn parse_metric(raw: Option<&str>) -> Result<Option<Metric>, SelectionError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse::<Metric>)
        .transpose()
}

/// Variable dropdown changed: new metric options and the reset metric.
pub fn metrics_payload(dashboard: &Dashboard, variable: Option<&str>) -> Result<String, ApiError> {
    let variable = parse_variable(variable)?;
    let mut controller = InteractionController::new(dashboard);
    let update = controller.on_variable_changed(variable);
    Ok(serde_json::to_string_pretty(&update)?)
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewResponse {
    pub metric_options: MetricOptionsUpdate,
    #[serde(flatten)]
    pub view: RenderUpdate,
}

/// Either dropdown changed: replay the selection through the controller and render it.
/// Without a metric the variable's default is used.
pub fn view_payload(
    dashboard: &Dashboard,
    variable: Option<&str>,
    metric: Option<&str>,
) -> Result<String, ApiError> {
    let variable = parse_variable(variable)?;
    let metric = parse_metric(metric)?;

    let mut controller = InteractionController::new(dashboard);
    let metric_options = controller.on_variable_changed(variable);
    if let Some(metric) = metric {
        controller.on_metric_changed(metric)?;
    }
    let view = controller.render()?;
    Ok(serde_json::to_string_pretty(&ViewResponse {
        metric_options,
        view,
    })?)
}
