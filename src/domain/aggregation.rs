// Aggregation result domain models (long-form tables)
use super::classification::{MeasurementType, PlotType};
use super::measurement::StudyMonth;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    Hour,
    Month,
    PlotMeasurement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Mean,
    Sum,
}

/// How box-plot quartiles are placed between observations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuartileMethod {
    /// Linear interpolation between closest ranks
    #[default]
    Linear,
    /// Median of each half; an odd count leaves the median out of both halves
    Exclusive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey {
    Hour(u8),
    Month(StudyMonth),
    PlotMeasurement(PlotType, MeasurementType),
}

impl GroupKey {
    /// Label used on the category axis
    pub fn category_label(&self) -> String {
        match self {
            GroupKey::Hour(hour) => hour.to_string(),
            GroupKey::Month(month) => month.name().to_string(),
            GroupKey::PlotMeasurement(_, measurement) => measurement.label().to_string(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Hour(hour) => write!(f, "{}:00", hour),
            GroupKey::Month(month) => write!(f, "{}", month),
            GroupKey::PlotMeasurement(plot, measurement) => write!(f, "{} / {}", plot, measurement),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregationRow {
    pub key: GroupKey,
    pub series: String,
    pub value: f64,
}

impl AggregationRow {
    pub fn new(key: GroupKey, series: String, value: f64) -> Self {
        Self { key, series, value }
    }
}

/// Ordered (group, series, value) triples
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationResult {
    pub rows: Vec<AggregationRow>,
}

impl AggregationResult {
    pub fn new(rows: Vec<AggregationRow>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Series labels in first-appearance order
    pub fn series_labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !labels.contains(&row.series.as_str()) {
                labels.push(&row.series);
            }
        }
        labels
    }
}

/// Five-number summary of one series, for box plots
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub series: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistributionResult {
    pub boxes: Vec<BoxSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    /// Row-major, `labels.len()` squared; `None` where undefined
    pub values: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ColumnTypeCounts {
    pub numeric: usize,
    pub categorical: usize,
    pub datetime: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    EmptyTable,
    NoMatchingColumns,
    NoValues,
}

/// Outcome of computing one chart slot
#[derive(Debug, Clone, PartialEq)]
pub enum SlotData {
    Aggregated(AggregationResult),
    Distribution(DistributionResult),
    Correlation(CorrelationMatrix),
    ColumnTypes(ColumnTypeCounts),
    Empty(EmptyReason),
}

impl SlotData {
    pub fn is_empty(&self) -> bool {
        matches!(self, SlotData::Empty(_))
    }
}
