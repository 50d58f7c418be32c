// Chart binder - turns computed slot data into renderer-ready descriptions
use crate::domain::aggregation::{AggregationResult, ColumnTypeCounts, CorrelationMatrix, DistributionResult, Grouping, SlotData};
use crate::domain::chart::{
    AxisDescription, BoxDescription, ChartBody, ChartDescription, ChartPoint, ChartSpec, Computation,
    SeriesDescription, SeriesSelection, SliceDescription,
};
use crate::domain::classification::{classify_plot, station_code};

pub const PLACEHOLDER_MESSAGE: &str = "No data available";

const DEFAULT_PALETTE: [&str; 5] = ["green", "lime", "teal", "#006400", "#9DC183"];
const DEFAULT_COLOR_SCALE: &str = "Greens";
const HOUR_TICK_STEP: usize = 5;

/// Bind one slot's data to its chart description. Never fails; empty data
/// yields a placeholder.
pub fn bind(data: &SlotData, spec: &ChartSpec) -> ChartDescription {
    let body = match data {
        SlotData::Aggregated(result) => series_body(result, spec),
        SlotData::Distribution(result) => box_body(result, spec),
        SlotData::Correlation(matrix) => heatmap_body(matrix, spec),
        SlotData::ColumnTypes(counts) => slice_body(counts, spec),
        SlotData::Empty(reason) => {
            tracing::debug!("Chart {} has no data: {:?}", spec.id, reason);
            ChartBody::Placeholder {
                message: PLACEHOLDER_MESSAGE.to_string(),
            }
        }
    };

    let mut x_axis = AxisDescription::titled(spec.x_label.clone());
    if is_hourly(spec) && !data.is_empty() {
        x_axis.tick_values = (0..24).step_by(HOUR_TICK_STEP).map(|h| h.to_string()).collect();
        x_axis.tick_labels = (0..24).step_by(HOUR_TICK_STEP).map(|h| format!("{}:00", h)).collect();
    }

    ChartDescription {
        id: spec.id.clone(),
        title: spec.title.clone(),
        kind: spec.kind,
        x_axis,
        y_axis: AxisDescription::titled(spec.y_label.clone()),
        legend_title: spec.legend_title.clone(),
        body,
    }
}

fn is_hourly(spec: &ChartSpec) -> bool {
    matches!(
        spec.computation,
        Computation::Aggregate {
            grouping: Grouping::Hour,
            ..
        }
    )
}

/// Colour for the `index`-th series named `name`
fn series_color(spec: &ChartSpec, name: &str, index: usize) -> String {
    if let SeriesSelection::Columns(series) = &spec.selection {
        let explicit = series.iter().find_map(|s| {
            let label = s.label.as_deref().unwrap_or_else(|| classify_plot(&s.column).label());
            (label == name).then_some(s.color.as_ref()).flatten()
        });
        if let Some(color) = explicit {
            return color.clone();
        }
    }

    if spec.palette.is_empty() {
        DEFAULT_PALETTE[index % DEFAULT_PALETTE.len()].to_string()
    } else {
        spec.palette[index % spec.palette.len()].clone()
    }
}

fn series_body(result: &AggregationResult, spec: &ChartSpec) -> ChartBody {
    let series = result
        .series_labels()
        .into_iter()
        .enumerate()
        .map(|(index, name)| SeriesDescription {
            name: name.to_string(),
            color: series_color(spec, name, index),
            points: result
                .rows
                .iter()
                .filter(|row| row.series == name)
                .map(|row| ChartPoint {
                    category: row.key.category_label(),
                    value: row.value,
                })
                .collect(),
        })
        .collect();

    ChartBody::Series { series }
}

fn box_body(result: &DistributionResult, spec: &ChartSpec) -> ChartBody {
    let boxes = result
        .boxes
        .iter()
        .enumerate()
        .map(|(index, summary)| BoxDescription {
            name: summary.series.clone(),
            color: series_color(spec, &summary.series, index),
            legend: station_code(&summary.series)
                .filter(|code| code.code() == summary.series)
                .map(|code| code.description().to_string()),
            count: summary.count,
            min: summary.min,
            q1: summary.q1,
            median: summary.median,
            q3: summary.q3,
            max: summary.max,
        })
        .collect();

    ChartBody::Boxes { boxes }
}

fn heatmap_body(matrix: &CorrelationMatrix, spec: &ChartSpec) -> ChartBody {
    ChartBody::Heatmap {
        labels: matrix.labels.clone(),
        z: matrix.values.clone(),
        color_scale: spec
            .palette
            .first()
            .cloned()
            .unwrap_or_else(|| DEFAULT_COLOR_SCALE.to_string()),
    }
}

fn slice_body(counts: &ColumnTypeCounts, spec: &ChartSpec) -> ChartBody {
    let slices = [
        ("Numeric", counts.numeric),
        ("Categorical", counts.categorical),
        ("Datetime", counts.datetime),
    ]
    .into_iter()
    .filter(|(_, count)| *count > 0)
    .enumerate()
    .map(|(index, (name, count))| SliceDescription {
        name: name.to_string(),
        color: series_color(spec, name, index),
        value: count as f64,
    })
    .collect();

    ChartBody::Slices { slices }
}
