//! Fetch the dataset (remote URL or local file) and parse it into typed records.
//! Startup fails fast on any fetch, schema or parse problem; no partial dataset is returned.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use csv::StringRecord;
use thiserror::Error;
use tracing::{debug, info};

use crate::data::record::{Column, DailyRecord, Measures, KEY_COLUMNS};

pub const DEFAULT_DATA_URL: &str = "https://covid.ourworldindata.org/data/owid-covid-data.csv";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to fetch {url}: HTTP {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("schema mismatch: missing column(s) {}", .missing.join(", "))]
    Schema { missing: Vec<String> },
    #[error("row {row}: invalid date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { row: usize, value: String },
    #[error("row {row}: invalid number '{value}' in column {column}")]
    InvalidNumber {
        row: usize,
        column: Column,
        value: String,
    },
    #[error("row {row}: missing location")]
    MissingLocation { row: usize },
    #[error("duplicate row for location '{location}' on {date}")]
    DuplicateRow { location: String, date: NaiveDate },
}

/// Where the raw CSV comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Remote(String),
    File(PathBuf),
}

impl DataSource {
    /// `http://` / `https://` means remote; anything else is treated as a file path.
    pub fn parse(raw: &str) -> DataSource {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            DataSource::Remote(trimmed.to_string())
        } else {
            DataSource::File(PathBuf::from(trimmed.trim_start_matches("file://")))
        }
    }
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::Remote(DEFAULT_DATA_URL.to_string())
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => f.write_str(url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Retrieve and parse the full dataset. Blocking; call before any async runtime starts.
pub fn load_records(source: &DataSource, timeout: Duration) -> Result<Vec<DailyRecord>, LoadError> {
    info!(%source, "loading dataset");
    let records = match source {
        DataSource::Remote(url) => {
            let bytes = fetch_remote(url, timeout)?;
            parse_records(bytes.as_slice())?
        }
        DataSource::File(path) => {
            let file = fs::File::open(path).map_err(|source| LoadError::Read {
                path: path.clone(),
                source,
            })?;
            parse_records(file)?
        }
    };
    info!(rows = records.len(), "dataset loaded");
    Ok(records)
}

fn fetch_remote(url: &str, timeout: Duration) -> Result<Vec<u8>, LoadError> {
    let fetch_err = |source| LoadError::Fetch {
        url: url.to_string(),
        source,
    };
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(fetch_err)?;
    let response = client.get(url).send().map_err(fetch_err)?;
    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    let bytes = response.bytes().map_err(fetch_err)?;
    debug!(bytes = bytes.len(), "fetched dataset");
    Ok(bytes.to_vec())
}

/// Header positions of every column the dashboard needs.
struct ColumnIndex {
    iso_code: usize,
    location: usize,
    continent: usize,
    date: usize,
    numeric: Vec<(Column, usize)>,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self, LoadError> {
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);

        let missing: Vec<String> = KEY_COLUMNS
            .iter()
            .copied()
            .chain(Column::ALL.iter().map(Column::as_str))
            .filter(|name| position(*name).is_none())
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::Schema { missing });
        }

        let required = |name: &str| position(name).ok_or_else(|| LoadError::Schema {
            missing: vec![name.to_string()],
        });
        let numeric = Column::ALL
            .into_iter()
            .map(|column| required(column.as_str()).map(|idx| (column, idx)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ColumnIndex {
            iso_code: required("iso_code")?,
            location: required("location")?,
            continent: required("continent")?,
            date: required("date")?,
            numeric,
        })
    }
}

/// Parse CSV bytes. Extra columns are ignored; a missing required column is a schema error.
pub fn parse_records<R: Read>(reader: R) -> Result<Vec<DailyRecord>, LoadError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let index = ColumnIndex::from_headers(reader.headers()?)?;
    debug!("schema check passed");

    let mut seen: HashSet<(String, NaiveDate)> = HashSet::new();
    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row = i + 1;
        let raw = result?;
        let record = parse_row(&raw, &index, row)?;
        if !seen.insert((record.location.clone(), record.date)) {
            return Err(LoadError::DuplicateRow {
                location: record.location,
                date: record.date,
            });
        }
        records.push(record);
    }
    Ok(records)
}

fn parse_row(raw: &StringRecord, index: &ColumnIndex, row: usize) -> Result<DailyRecord, LoadError> {
    let location = optional_cell(raw.get(index.location)).ok_or(LoadError::MissingLocation { row })?;
    let date_cell = raw.get(index.date).unwrap_or("").trim();
    let date = NaiveDate::parse_from_str(date_cell, "%Y-%m-%d").map_err(|_| LoadError::InvalidDate {
        row,
        value: date_cell.to_string(),
    })?;

    let mut measures = Measures::default();
    for &(column, idx) in &index.numeric {
        let Some(cell) = optional_cell(raw.get(idx)) else {
            continue;
        };
        if is_na_token(&cell) {
            continue;
        }
        let value = cell
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| LoadError::InvalidNumber {
                row,
                column,
                value: cell.clone(),
            })?;
        measures.set(column, Some(value));
    }

    Ok(DailyRecord {
        iso_code: optional_cell(raw.get(index.iso_code)),
        location,
        continent: optional_cell(raw.get(index.continent)),
        date,
        measures,
    })
}

/// Placeholders the dataset's producers write for an absent observation.
const NA_TOKENS: [&str; 5] = ["NaN", "nan", "NA", "N/A", "null"];

fn is_na_token(cell: &str) -> bool {
    NA_TOKENS.contains(&cell)
}

/// Empty cells are absent values.
fn optional_cell(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "iso_code,continent,location,date,total_cases,new_cases,total_deaths,new_deaths,total_cases_per_million,total_deaths_per_million,new_vaccinations,people_fully_vaccinated,total_vaccinations_per_hundred,people_vaccinated_per_hundred,population";

    #[test]
    fn parses_rows_and_treats_empty_cells_as_missing() {
        let csv = format!(
            "{HEADER}\nNOR,Europe,Norway,2021-03-01,100,5,2,,20.5,0.4,,,1.5,1.2,5400000\nOWID_WRL,,World,2021-03-01,1000,50,20,1,,,300,10,,,7800000000\n"
        );
        let records = parse_records(csv.as_bytes()).expect("fixture should parse");
        assert_eq!(records.len(), 2);

        let norway = &records[0];
        assert_eq!(norway.iso_code.as_deref(), Some("NOR"));
        assert_eq!(norway.continent.as_deref(), Some("Europe"));
        assert_eq!(norway.value(Column::NewCases), Some(5.0));
        assert_eq!(norway.value(Column::NewDeaths), None);
        assert_eq!(norway.value(Column::TotalVaccinationsPerHundred), Some(1.5));

        let world = &records[1];
        assert!(world.is_aggregate_region());
        assert_eq!(world.value(Column::NewVaccinations), Some(300.0));
    }

    #[test]
    fn missing_columns_are_all_reported() {
        let csv = "iso_code,location,date,new_cases\nNOR,Norway,2021-03-01,1\n";
        let err = parse_records(csv.as_bytes()).expect_err("schema should be rejected");
        match err {
            LoadError::Schema { missing } => {
                assert!(missing.contains(&"continent".to_string()));
                assert!(missing.contains(&"new_vaccinations".to_string()));
                assert!(!missing.contains(&"new_cases".to_string()));
            }
            other => panic!("expected schema error, got {other}"),
        }
    }

    #[test]
    fn invalid_date_reports_row() {
        let csv = format!("{HEADER}\nNOR,Europe,Norway,01/03/2021,,,,,,,,,,,\n");
        let err = parse_records(csv.as_bytes()).expect_err("date should be rejected");
        assert!(matches!(err, LoadError::InvalidDate { row: 1, .. }));
    }

    #[test]
    fn invalid_number_is_rejected() {
        let csv = format!("{HEADER}\nNOR,Europe,Norway,2021-03-01,lots,,,,,,,,,,\n");
        let err = parse_records(csv.as_bytes()).expect_err("number should be rejected");
        assert!(matches!(
            err,
            LoadError::InvalidNumber {
                column: Column::TotalCases,
                ..
            }
        ));
    }

    #[test]
    fn na_tokens_are_missing_values() {
        for token in NA_TOKENS {
            let csv = format!(
                "{HEADER}\nOWID_WRL,,World,2021-03-01,{token},{token},20,1,,,300,10,,,\n"
            );
            let records = parse_records(csv.as_bytes()).expect("NA tokens should parse");
            assert_eq!(records[0].value(Column::TotalCases), None, "token {token}");
            assert_eq!(records[0].value(Column::NewCases), None, "token {token}");
            assert_eq!(records[0].value(Column::TotalDeaths), Some(20.0));
        }
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        for cell in ["inf", "-inf", "infinity", "Infinity"] {
            let csv = format!("{HEADER}\nOWID_WRL,,World,2021-03-01,{cell},,,,,,,,,,\n");
            let err = parse_records(csv.as_bytes()).expect_err("infinite value should be rejected");
            match err {
                LoadError::InvalidNumber { row, column, value } => {
                    assert_eq!(row, 1);
                    assert_eq!(column, Column::TotalCases);
                    assert_eq!(value, cell);
                }
                other => panic!("expected invalid number for {cell}, got {other}"),
            }
        }
    }

    #[test]
    fn na_daily_delta_is_zero_filled_and_totals_stay_observed() {
        let csv = format!(
            "{HEADER}\n\
             OWID_WRL,,World,2021-03-01,100,NaN,10,1,,,,5,,,\n\
             OWID_WRL,,World,2021-03-02,NaN,2,NaN,1,,,,NaN,,,\n"
        );
        let records = parse_records(csv.as_bytes()).expect("fixture should parse");
        let cleaned = crate::data::clean::clean_records(&records);
        assert_eq!(cleaned[0].value(Column::NewCases), Some(0.0));

        let world = crate::data::aggregate::region_series(&cleaned, "World");
        let totals = crate::data::aggregate::global_totals(&world, "World").expect("totals");
        assert_eq!(totals.total_cases, 100);
        assert_eq!(totals.total_deaths, 10);
        assert_eq!(totals.people_fully_vaccinated, 5);
    }

    #[test]
    fn duplicate_location_date_is_rejected() {
        let csv = format!(
            "{HEADER}\nNOR,Europe,Norway,2021-03-01,,,,,,,,,,,\nNOR,Europe,Norway,2021-03-01,,,,,,,,,,,\n"
        );
        let err = parse_records(csv.as_bytes()).expect_err("duplicate should be rejected");
        assert!(matches!(err, LoadError::DuplicateRow { .. }));
    }

    #[test]
    fn data_source_parse_distinguishes_urls_and_paths() {
        assert_eq!(
            DataSource::parse("https://example.org/data.csv"),
            DataSource::Remote("https://example.org/data.csv".to_string())
        );
        assert_eq!(
            DataSource::parse("file://data/owid.csv"),
            DataSource::File(PathBuf::from("data/owid.csv"))
        );
        assert_eq!(
            DataSource::parse("tests/fixtures/owid_sample.csv"),
            DataSource::File(PathBuf::from("tests/fixtures/owid_sample.csv"))
        );
    }

    /// Serve exactly one HTTP response on an ephemeral local port.
    fn serve_once(response: String) -> String {
        use std::io::Write;
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").expect("ephemeral port should bind");
        let addr = listener.local_addr().expect("listener has an address");
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{addr}/owid-covid-data.csv")
    }

    #[test]
    fn non_success_status_is_a_fetch_failure() {
        let url = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                .to_string(),
        );
        let err = load_records(&DataSource::Remote(url.clone()), Duration::from_secs(5))
            .expect_err("500 should fail startup");
        match err {
            LoadError::HttpStatus { url: failed, status } => {
                assert_eq!(status, 500);
                assert_eq!(failed, url);
            }
            other => panic!("expected http status error, got {other}"),
        }
    }

    #[test]
    fn remote_csv_is_parsed() {
        const BODY: &str = "iso_code,continent,location,date,total_cases,new_cases,total_deaths,new_deaths,total_cases_per_million,total_deaths_per_million,new_vaccinations,people_fully_vaccinated,total_vaccinations_per_hundred,people_vaccinated_per_hundred,population\nNOR,Europe,Norway,2021-03-01,100,5,2,,20.5,0.4,,,1.5,1.2,5400000\n";
        let url = serve_once(format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{BODY}",
            BODY.len()
        ));
        let records = load_records(&DataSource::Remote(url), Duration::from_secs(5))
            .expect("remote dataset should load");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].location, "Norway");
    }

    #[test]
    fn unreachable_host_is_a_fetch_error() {
        let port = {
            let listener =
                std::net::TcpListener::bind("127.0.0.1:0").expect("ephemeral port should bind");
            listener.local_addr().expect("listener has an address").port()
        };
        let source = DataSource::Remote(format!("http://127.0.0.1:{port}/owid-covid-data.csv"));
        let err = load_records(&source, Duration::from_secs(5)).expect_err("port is closed");
        assert!(matches!(err, LoadError::Fetch { .. }), "got {err}");
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let source = DataSource::File(PathBuf::from("does/not/exist.csv"));
        let err = load_records(&source, Duration::from_secs(1)).expect_err("file is missing");
        assert!(matches!(err, LoadError::Read { .. }));
    }
}
