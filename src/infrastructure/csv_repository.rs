// CSV repository implementation - loads the merged measurements file
use crate::application::measurement_repository::MeasurementRepository;
use crate::domain::measurement::{MeasurementRow, MeasurementTable, MonthCategory, TableSchema};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use csv::{ReaderBuilder, Trim};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("file has no header row")]
    MissingHeader,
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M", "%H:%M:%S%.f", "%I:%M:%S %p", "%I:%M %p"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const MISSING_MARKERS: &[&str] = &["na", "n/a", "nan", "null", "none", "-"];

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub region_column: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            region_column: "Region".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CsvRepository {
    path: PathBuf,
    options: LoadOptions,
}

impl CsvRepository {
    pub fn new(path: impl Into<PathBuf>, options: LoadOptions) -> Self {
        Self {
            path: path.into(),
            options,
        }
    }
}

#[async_trait]
impl MeasurementRepository for CsvRepository {
    async fn load_table(&self) -> MeasurementTable {
        let path = self.path.clone();
        let options = self.options.clone();

        match tokio::task::spawn_blocking(move || load(&path, &options)).await {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!("Table loading task failed: {}", e);
                MeasurementTable::empty()
            }
        }
    }
}

/// Load a measurements file. Any failure yields an empty table.
pub fn load(path: &Path, options: &LoadOptions) -> MeasurementTable {
    match read_table(path, options) {
        Ok(table) => {
            tracing::info!(
                "Data loaded successfully: {} rows, {} sensor columns",
                table.row_count(),
                table.columns().len()
            );
            table
        }
        Err(e) => {
            tracing::warn!("Error loading data from {}: {}", path.display(), e);
            MeasurementTable::empty()
        }
    }
}

pub fn read_table(path: &Path, options: &LoadOptions) -> Result<MeasurementTable, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_reader(file, options)
}

/// Positions of the reserved (non-sensor) columns
#[derive(Debug, Default)]
struct Layout {
    date: Option<usize>,
    time: Option<usize>,
    month: Option<usize>,
    hour: Option<usize>,
    timestamp: Option<usize>,
    region: Option<usize>,
    sensors: Vec<(usize, String)>,
}

impl Layout {
    fn from_headers<'a>(headers: impl Iterator<Item = &'a str>, options: &LoadOptions) -> Self {
        let mut layout = Layout::default();
        let mut seen = HashSet::new();

        for (idx, name) in headers.enumerate() {
            let slot = match name {
                "DATE" | "Date" | "date" => &mut layout.date,
                "TIME" | "Time" | "time" => &mut layout.time,
                "Month" | "MONTH" | "month" => &mut layout.month,
                "Hour" | "HOUR" | "hour" => &mut layout.hour,
                "timestamp" | "Timestamp" => &mut layout.timestamp,
                n if n.eq_ignore_ascii_case(&options.region_column) || n.eq_ignore_ascii_case("Province") => {
                    &mut layout.region
                }
                "" => {
                    tracing::warn!("Ignoring unnamed column at position {}", idx);
                    continue;
                }
                _ => {
                    if seen.insert(name.to_string()) {
                        layout.sensors.push((idx, name.to_string()));
                    } else {
                        tracing::warn!("Ignoring duplicate column {}", name);
                    }
                    continue;
                }
            };
            if slot.is_none() {
                *slot = Some(idx);
            }
        }

        layout
    }

    fn schema(&self, headers: &csv::StringRecord) -> TableSchema {
        TableSchema {
            has_date: self.date.is_some(),
            has_time: self.time.is_some(),
            has_timestamp: self.timestamp.is_some(),
            has_month: self.month.is_some(),
            has_hour: self.hour.is_some(),
            region_column: self.region.and_then(|i| headers.get(i)).map(str::to_string),
        }
    }
}

pub fn parse_reader<R: Read>(reader: R, options: &LoadOptions) -> Result<MeasurementTable, LoadError> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(LoadError::MissingHeader);
    }

    let layout = Layout::from_headers(headers.iter(), options);
    let mut rows = Vec::new();

    for record in rdr.records() {
        let record = record?;
        let field = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };

        let timestamp = field(layout.timestamp).and_then(parse_datetime);
        let date = field(layout.date)
            .and_then(parse_date)
            .or(timestamp.map(|ts| ts.date()));
        let time = field(layout.time)
            .and_then(parse_time)
            .or(timestamp.map(|ts| ts.time()))
            .or_else(|| {
                field(layout.hour)
                    .and_then(|h| h.parse::<u32>().ok())
                    .and_then(|h| NaiveTime::from_hms_opt(h, 0, 0))
            });
        let month = field(layout.month).and_then(MonthCategory::parse);
        let region = field(layout.region).map(str::to_string);

        let values = layout
            .sensors
            .iter()
            .map(|(idx, _)| record.get(*idx).and_then(parse_value))
            .collect();

        rows.push(MeasurementRow::new(date, time, month, region, values));
    }

    let schema = layout.schema(&headers);
    let columns = layout.sensors.into_iter().map(|(_, name)| name).collect();
    Ok(MeasurementTable::new(columns, rows, schema))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| parse_datetime(raw).map(|dt| dt.date()))
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
        .or_else(|| parse_datetime(raw).map(|dt| dt.time()))
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_local())
        .ok()
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        })
}

fn parse_value(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() || MISSING_MARKERS.iter().any(|m| raw.eq_ignore_ascii_case(m)) {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}
