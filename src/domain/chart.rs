// Chart slot specifications and the declarative descriptions handed to the renderer
use super::aggregation::{Grouping, QuartileMethod, Reducer};
use super::classification::{MeasurementType, PlotType};
use super::view::View;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
    Box,
    Heatmap,
    Pie,
}

/// What a slot computes from the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Computation {
    Aggregate { grouping: Grouping, reducer: Reducer },
    Distribution { quartiles: QuartileMethod },
    Correlation,
    ColumnTypes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStrategy {
    PlotType,
    Station,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSpec {
    pub column: String,
    pub label: Option<String>,
    pub color: Option<String>,
}

#[cfg(test)]
impl SeriesSpec {
    pub fn column(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            label: None,
            color: None,
        }
    }

    pub fn labelled(column: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            label: Some(label.into()),
            color: None,
        }
    }
}

/// Which sensor columns feed a slot
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesSelection {
    Columns(Vec<SeriesSpec>),
    Auto {
        measurement: Option<MeasurementType>,
        plot_types: Vec<PlotType>,
        label_by: LabelStrategy,
    },
    AllColumns,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub id: String,
    pub title: String,
    pub view: View,
    pub kind: ChartKind,
    pub computation: Computation,
    pub selection: SeriesSelection,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub legend_title: Option<String>,
    pub palette: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisDescription {
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tick_values: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tick_labels: Vec<String>,
}

impl AxisDescription {
    pub fn titled(title: Option<String>) -> Self {
        Self {
            title,
            tick_values: Vec::new(),
            tick_labels: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub category: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesDescription {
    pub name: String,
    pub color: String,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxDescription {
    pub name: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<String>,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliceDescription {
    pub name: String,
    pub color: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartBody {
    Series { series: Vec<SeriesDescription> },
    Boxes { boxes: Vec<BoxDescription> },
    Heatmap {
        labels: Vec<String>,
        z: Vec<Vec<Option<f64>>>,
        color_scale: String,
    },
    Slices { slices: Vec<SliceDescription> },
    Placeholder { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDescription {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub x_axis: AxisDescription,
    pub y_axis: AxisDescription,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_title: Option<String>,
    pub body: ChartBody,
}

#[cfg(test)]
impl ChartDescription {
    pub fn is_placeholder(&self) -> bool {
        matches!(self.body, ChartBody::Placeholder { .. })
    }
}
