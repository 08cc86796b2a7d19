//! Typed rows of the Our World in Data COVID-19 dataset.
//! Only the columns the dashboard displays are kept; everything else in the CSV is ignored.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

/// Non-numeric columns that must be present in the CSV header.
pub const KEY_COLUMNS: [&str; 4] = ["iso_code", "location", "continent", "date"];

/// Numeric columns read from the CSV. Each one may be missing on any given row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    NewCases,
    TotalCases,
    TotalCasesPerMillion,
    NewDeaths,
    TotalDeaths,
    TotalDeathsPerMillion,
    PeopleFullyVaccinated,
    TotalVaccinationsPerHundred,
    PeopleVaccinatedPerHundred,
    NewVaccinations,
}

impl Column {
    pub const ALL: [Column; 10] = [
        Column::NewCases,
        Column::TotalCases,
        Column::TotalCasesPerMillion,
        Column::NewDeaths,
        Column::TotalDeaths,
        Column::TotalDeathsPerMillion,
        Column::PeopleFullyVaccinated,
        Column::TotalVaccinationsPerHundred,
        Column::PeopleVaccinatedPerHundred,
        Column::NewVaccinations,
    ];

    /// Daily-delta columns: a missing cell means "nothing reported", i.e. zero.
    pub const DAILY_DELTAS: [Column; 3] =
        [Column::NewDeaths, Column::NewCases, Column::NewVaccinations];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewCases => "new_cases",
            Self::TotalCases => "total_cases",
            Self::TotalCasesPerMillion => "total_cases_per_million",
            Self::NewDeaths => "new_deaths",
            Self::TotalDeaths => "total_deaths",
            Self::TotalDeathsPerMillion => "total_deaths_per_million",
            Self::PeopleFullyVaccinated => "people_fully_vaccinated",
            Self::TotalVaccinationsPerHundred => "total_vaccinations_per_hundred",
            Self::PeopleVaccinatedPerHundred => "people_vaccinated_per_hundred",
            Self::NewVaccinations => "new_vaccinations",
        }
    }

    pub fn from_name(name: &str) -> Option<Column> {
        Self::ALL.into_iter().find(|column| column.as_str() == name)
    }

    pub fn is_daily_delta(&self) -> bool {
        Self::DAILY_DELTAS.contains(self)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric values of one row (or of a snapshot). `None` marks an absent observation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Measures {
    pub new_cases: Option<f64>,
    pub total_cases: Option<f64>,
    pub total_cases_per_million: Option<f64>,
    pub new_deaths: Option<f64>,
    pub total_deaths: Option<f64>,
    pub total_deaths_per_million: Option<f64>,
    pub people_fully_vaccinated: Option<f64>,
    pub total_vaccinations_per_hundred: Option<f64>,
    pub people_vaccinated_per_hundred: Option<f64>,
    pub new_vaccinations: Option<f64>,
}

impl Measures {
    pub fn get(&self, column: Column) -> Option<f64> {
        *self.slot(column)
    }

    pub fn set(&mut self, column: Column, value: Option<f64>) {
        *self.slot_mut(column) = value;
    }

    /// Overwrite each column with `newer`'s value where `newer` has one.
    pub fn carry_forward(&mut self, newer: &Measures) {
        for column in Column::ALL {
            if let Some(value) = newer.get(column) {
                self.set(column, Some(value));
            }
        }
    }

    fn slot(&self, column: Column) -> &Option<f64> {
        match column {
            Column::NewCases => &self.new_cases,
            Column::TotalCases => &self.total_cases,
            Column::TotalCasesPerMillion => &self.total_cases_per_million,
            Column::NewDeaths => &self.new_deaths,
            Column::TotalDeaths => &self.total_deaths,
            Column::TotalDeathsPerMillion => &self.total_deaths_per_million,
            Column::PeopleFullyVaccinated => &self.people_fully_vaccinated,
            Column::TotalVaccinationsPerHundred => &self.total_vaccinations_per_hundred,
            Column::PeopleVaccinatedPerHundred => &self.people_vaccinated_per_hundred,
            Column::NewVaccinations => &self.new_vaccinations,
        }
    }

    fn slot_mut(&mut self, column: Column) -> &mut Option<f64> {
        match column {
            Column::NewCases => &mut self.new_cases,
            Column::TotalCases => &mut self.total_cases,
            Column::TotalCasesPerMillion => &mut self.total_cases_per_million,
            Column::NewDeaths => &mut self.new_deaths,
            Column::TotalDeaths => &mut self.total_deaths,
            Column::TotalDeathsPerMillion => &mut self.total_deaths_per_million,
            Column::PeopleFullyVaccinated => &mut self.people_fully_vaccinated,
            Column::TotalVaccinationsPerHundred => &mut self.total_vaccinations_per_hundred,
            Column::PeopleVaccinatedPerHundred => &mut self.people_vaccinated_per_hundred,
            Column::NewVaccinations => &mut self.new_vaccinations,
        }
    }
}

/// One row per (location, date).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRecord {
    pub iso_code: Option<String>,
    pub location: String,
    /// `None` marks an aggregate region such as "World" or a continent.
    pub continent: Option<String>,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub measures: Measures,
}

impl DailyRecord {
    pub fn value(&self, column: Column) -> Option<f64> {
        self.measures.get(column)
    }

    pub fn is_aggregate_region(&self) -> bool {
        self.continent.is_none()
    }
}
