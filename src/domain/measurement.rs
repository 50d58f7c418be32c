// Measurement table domain model
use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// Months covered by the study, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum StudyMonth {
    May,
    June,
    July,
    August,
    October,
}

impl StudyMonth {
    pub const ORDER: [StudyMonth; 5] = [
        StudyMonth::May,
        StudyMonth::June,
        StudyMonth::July,
        StudyMonth::August,
        StudyMonth::October,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StudyMonth::May => "May",
            StudyMonth::June => "June",
            StudyMonth::July => "July",
            StudyMonth::August => "August",
            StudyMonth::October => "October",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ORDER
            .iter()
            .copied()
            .find(|month| month.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for StudyMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Month of a row. Only `Study` months take part in ordered grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonthCategory {
    Study(StudyMonth),
    Other(String),
}

impl MonthCategory {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(match StudyMonth::from_name(raw) {
            Some(month) => MonthCategory::Study(month),
            None => MonthCategory::Other(raw.to_string()),
        })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        let name = date.format("%B").to_string();
        match StudyMonth::from_name(&name) {
            Some(month) => MonthCategory::Study(month),
            None => MonthCategory::Other(name),
        }
    }

    pub fn study_month(&self) -> Option<StudyMonth> {
        match self {
            MonthCategory::Study(month) => Some(*month),
            MonthCategory::Other(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRow {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub hour: Option<u8>,
    pub month: Option<MonthCategory>,
    pub region: Option<String>,
    values: Vec<Option<f64>>,
}

impl MeasurementRow {
    pub fn new(
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
        month: Option<MonthCategory>,
        region: Option<String>,
        values: Vec<Option<f64>>,
    ) -> Self {
        let hour = time.map(|t| t.hour() as u8);
        let month = month.or_else(|| date.map(MonthCategory::from_date));
        Self {
            date,
            time,
            hour,
            month,
            region,
            values,
        }
    }

    pub fn value(&self, column_index: usize) -> Option<f64> {
        self.values.get(column_index).copied().flatten()
    }
}

/// Non-sensor columns that were present in the source file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSchema {
    pub has_date: bool,
    pub has_time: bool,
    pub has_timestamp: bool,
    pub has_month: bool,
    pub has_hour: bool,
    pub region_column: Option<String>,
}

/// Wide-form measurement table, one column per sensor
#[derive(Debug, Clone, Default)]
pub struct MeasurementTable {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<MeasurementRow>,
    schema: TableSchema,
}

impl MeasurementTable {
    /// Builds a table; rows must carry one value per sensor column.
    pub fn new(columns: Vec<String>, rows: Vec<MeasurementRow>, schema: TableSchema) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            columns,
            index,
            rows,
            schema,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn rows(&self) -> &[MeasurementRow] {
        &self.rows
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Rows matching the filter; borrows when the filter is empty
    pub fn filtered(&self, filter: &RowFilter) -> Cow<'_, MeasurementTable> {
        if filter.is_empty() {
            return Cow::Borrowed(self);
        }

        let rows = self
            .rows
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect();

        Cow::Owned(Self {
            columns: self.columns.clone(),
            index: self.index.clone(),
            rows,
            schema: self.schema.clone(),
        })
    }
}

/// Year / region narrowing applied before aggregation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFilter {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub region: Option<String>,
}

/// Blank region strings from form inputs mean "no region filter"
fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

impl RowFilter {
    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.region.is_none()
    }

    pub fn matches(&self, row: &MeasurementRow) -> bool {
        if let Some(year) = self.year {
            if row.date.map(|d| d.year()) != Some(year) {
                return false;
            }
        }
        if let Some(region) = &self.region {
            match &row.region {
                Some(r) if r.trim().eq_ignore_ascii_case(region.trim()) => {}
                _ => return false,
            }
        }
        true
    }
}
