//! Map a (variable, metric) selection to the dataset column it displays.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::data::record::Column;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("unknown variable '{0}' (expected deaths, cases or vaccinations)")]
    UnknownVariable(String),
    #[error("unknown metric '{0}'")]
    UnknownMetric(String),
    #[error("metric '{metric}' is not offered for variable '{variable}'")]
    MetricNotOffered { variable: Variable, metric: Metric },
    #[error("no column '{column}' for variable '{variable}' with metric '{metric}'")]
    UnavailableColumn {
        variable: Variable,
        metric: Metric,
        column: String,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    #[default]
    Deaths,
    Cases,
    Vaccinations,
}

impl Variable {
    pub const ALL: [Variable; 3] = [Variable::Deaths, Variable::Cases, Variable::Vaccinations];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deaths => "deaths",
            Self::Cases => "cases",
            Self::Vaccinations => "vaccinations",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Deaths => "Deaths",
            Self::Cases => "Cases",
            Self::Vaccinations => "Vaccinations",
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variable {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Variable::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SelectionError::UnknownVariable(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Total,
    TotalPerMillion,
    #[serde(rename = "last_24h")]
    Last24h,
    TotalVaccinationsPerHundred,
    PeopleVaccinatedPerHundred,
    PeopleFullyVaccinated,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Total,
        Metric::TotalPerMillion,
        Metric::Last24h,
        Metric::TotalVaccinationsPerHundred,
        Metric::PeopleVaccinatedPerHundred,
        Metric::PeopleFullyVaccinated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Total => "total",
            Self::TotalPerMillion => "total_per_million",
            Self::Last24h => "last_24h",
            Self::TotalVaccinationsPerHundred => "total_vaccinations_per_hundred",
            Self::PeopleVaccinatedPerHundred => "people_vaccinated_per_hundred",
            Self::PeopleFullyVaccinated => "people_fully_vaccinated",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Total => "Total",
            Self::TotalPerMillion => "Total per 1 million population",
            Self::Last24h => "Newly reported in last 24 hours",
            Self::TotalVaccinationsPerHundred => "Total doses administered per 100 population",
            Self::PeopleVaccinatedPerHundred => {
                "Persons vaccinated with at least one dose per 100 population"
            }
            Self::PeopleFullyVaccinated => {
                "Persons fully vaccinated with last dose of primary series"
            }
        }
    }

    /// Column name this metric selects for `variable`, before checking the dataset has it.
    pub fn column_name(&self, variable: Variable) -> String {
        match self {
            Self::Last24h => format!("new_{variable}"),
            Self::Total => format!("total_{variable}"),
            Self::TotalPerMillion => format!("total_{variable}_per_million"),
            literal => literal.as_str().to_string(),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Metric::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SelectionError::UnknownMetric(s.to_string()))
    }
}

/// Dropdown entry, serialized the way the page consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectOption<T> {
    pub label: &'static str,
    pub value: T,
}

pub fn variable_options() -> Vec<SelectOption<Variable>> {
    Variable::ALL
        .into_iter()
        .map(|value| SelectOption {
            label: value.label(),
            value,
        })
        .collect()
}

fn offered_metrics(variable: Variable) -> [Metric; 3] {
    match variable {
        Variable::Vaccinations => [
            Metric::TotalVaccinationsPerHundred,
            Metric::PeopleVaccinatedPerHundred,
            Metric::PeopleFullyVaccinated,
        ],
        Variable::Deaths | Variable::Cases => {
            [Metric::Total, Metric::TotalPerMillion, Metric::Last24h]
        }
    }
}

pub fn metric_options(variable: Variable) -> Vec<SelectOption<Metric>> {
    offered_metrics(variable)
        .into_iter()
        .map(|value| SelectOption {
            label: value.label(),
            value,
        })
        .collect()
}

pub fn default_metric(variable: Variable) -> Metric {
    match variable {
        Variable::Vaccinations => Metric::TotalVaccinationsPerHundred,
        Variable::Deaths | Variable::Cases => Metric::Total,
    }
}

pub fn is_offered(variable: Variable, metric: Metric) -> bool {
    offered_metrics(variable).contains(&metric)
}

/// Resolve a selection to a dataset column. Pairs whose derived name is not a
/// dataset column (e.g. vaccinations + total) are rejected.
pub fn resolve_column(variable: Variable, metric: Metric) -> Result<Column, SelectionError> {
    let name = metric.column_name(variable);
    Column::from_name(&name).ok_or(SelectionError::UnavailableColumn {
        variable,
        metric,
        column: name,
    })
}

/// Weekly bar chart column: the variable's daily delta.
pub fn weekly_column(variable: Variable) -> Column {
    match variable {
        Variable::Deaths => Column::NewDeaths,
        Variable::Cases => Column::NewCases,
        Variable::Vaccinations => Column::NewVaccinations,
    }
}

/// Transient UI state: created with defaults, changed only by user interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub variable: Variable,
    pub metric: Metric,
}

impl Selection {
    pub fn new(variable: Variable) -> Self {
        Selection {
            variable,
            metric: default_metric(variable),
        }
    }

    pub fn column(&self) -> Result<Column, SelectionError> {
        resolve_column(self.variable, self.metric)
    }
}

impl Default for Selection {
    fn default() -> Self {
        Selection::new(Variable::default())
    }
}
