// Aggregation engine - reshapes the wide sensor table into long-form summaries
use crate::domain::aggregation::{
    AggregationResult, AggregationRow, BoxSummary, ColumnTypeCounts, CorrelationMatrix,
    DistributionResult, EmptyReason, GroupKey, Grouping, QuartileMethod, Reducer, SlotData,
};
use crate::domain::chart::{ChartSpec, Computation, LabelStrategy, SeriesSelection};
use crate::domain::classification::{classify, classify_measurement, classify_plot, station_code};
use crate::domain::measurement::MeasurementTable;
use std::collections::BTreeMap;

/// A selected column that exists in the table, with its series label
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSeries {
    pub column: String,
    pub index: usize,
    pub label: String,
}

/// Map a selection onto the table's columns. Absent columns are skipped.
pub fn resolve_selection(table: &MeasurementTable, selection: &SeriesSelection) -> Vec<ResolvedSeries> {
    match selection {
        SeriesSelection::Columns(specs) => specs
            .iter()
            .filter_map(|spec| {
                let Some(index) = table.column_index(&spec.column) else {
                    tracing::debug!("Skipping column {} - not present in table", spec.column);
                    return None;
                };
                let label = spec
                    .label
                    .clone()
                    .unwrap_or_else(|| classify_plot(&spec.column).label().to_string());
                Some(ResolvedSeries {
                    column: spec.column.clone(),
                    index,
                    label,
                })
            })
            .collect(),
        SeriesSelection::Auto {
            measurement,
            plot_types,
            label_by,
        } => table
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, column)| measurement.is_none_or(|m| classify_measurement(column) == m))
            .filter(|(_, column)| plot_types.is_empty() || plot_types.contains(&classify_plot(column)))
            .filter_map(|(index, column)| {
                let label = match label_by {
                    LabelStrategy::PlotType => classify_plot(column).label().to_string(),
                    LabelStrategy::Station => station_code(column)?.code().to_string(),
                };
                Some(ResolvedSeries {
                    column: column.clone(),
                    index,
                    label,
                })
            })
            .collect(),
        SeriesSelection::AllColumns => table
            .columns()
            .iter()
            .enumerate()
            .map(|(index, column)| ResolvedSeries {
                column: column.clone(),
                index,
                label: classify_plot(column).label().to_string(),
            })
            .collect(),
    }
}

/// Distinct labels in first-appearance order, plus each series' position in that list
fn label_positions(series: &[ResolvedSeries]) -> (Vec<String>, Vec<usize>) {
    let mut labels: Vec<String> = Vec::new();
    let positions = series
        .iter()
        .map(|s| match labels.iter().position(|l| *l == s.label) {
            Some(pos) => pos,
            None => {
                labels.push(s.label.clone());
                labels.len() - 1
            }
        })
        .collect();
    (labels, positions)
}

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn reduce(&self, reducer: Reducer) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        match reducer {
            Reducer::Mean => Some(self.sum / self.count as f64),
            Reducer::Sum => Some(self.sum),
        }
    }
}

pub fn aggregate(
    table: &MeasurementTable,
    selection: &SeriesSelection,
    grouping: Grouping,
    reducer: Reducer,
) -> AggregationResult {
    let series = resolve_selection(table, selection);
    aggregate_resolved(table, &series, grouping, reducer)
}

fn aggregate_resolved(
    table: &MeasurementTable,
    series: &[ResolvedSeries],
    grouping: Grouping,
    reducer: Reducer,
) -> AggregationResult {
    if table.is_empty() || series.is_empty() {
        return AggregationResult::default();
    }

    let (labels, positions) = label_positions(series);
    let pair_keys: Vec<GroupKey> = series
        .iter()
        .map(|s| {
            let (plot, measurement) = classify(&s.column);
            GroupKey::PlotMeasurement(plot, measurement)
        })
        .collect();

    // Keyed by (group, label position) so iteration yields group-ascending,
    // then series in selection order.
    let mut groups: BTreeMap<(GroupKey, usize), Accumulator> = BTreeMap::new();

    for row in table.rows() {
        let row_key = match grouping {
            Grouping::Hour => row.hour.map(GroupKey::Hour),
            Grouping::Month => row
                .month
                .as_ref()
                .and_then(|m| m.study_month())
                .map(GroupKey::Month),
            Grouping::PlotMeasurement => None,
        };

        for (i, s) in series.iter().enumerate() {
            let Some(value) = row.value(s.index) else {
                continue;
            };
            let key = match grouping {
                Grouping::PlotMeasurement => pair_keys[i],
                _ => match row_key {
                    Some(key) => key,
                    None => continue,
                },
            };
            groups.entry((key, positions[i])).or_default().push(value);
        }
    }

    let rows = groups
        .into_iter()
        .filter_map(|((key, position), acc)| {
            acc.reduce(reducer)
                .map(|value| AggregationRow::new(key, labels[position].clone(), value))
        })
        .collect();

    AggregationResult::new(rows)
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// (q1, median, q3) of a non-empty sorted slice
fn quartiles(sorted: &[f64], method: QuartileMethod) -> (f64, f64, f64) {
    let median = quantile(sorted, 0.5);
    match method {
        QuartileMethod::Linear => (quantile(sorted, 0.25), median, quantile(sorted, 0.75)),
        QuartileMethod::Exclusive => {
            let n = sorted.len();
            let lower = &sorted[..n / 2];
            let upper = &sorted[(n + 1) / 2..];
            if lower.is_empty() {
                return (median, median, median);
            }
            (quantile(lower, 0.5), median, quantile(upper, 0.5))
        }
    }
}

pub fn distribution(table: &MeasurementTable, selection: &SeriesSelection, method: QuartileMethod) -> DistributionResult {
    let series = resolve_selection(table, selection);
    let (labels, positions) = label_positions(&series);
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); labels.len()];

    for row in table.rows() {
        for (i, s) in series.iter().enumerate() {
            if let Some(value) = row.value(s.index) {
                values[positions[i]].push(value);
            }
        }
    }

    let boxes = labels
        .into_iter()
        .zip(values)
        .filter(|(_, v)| !v.is_empty())
        .map(|(label, mut v)| {
            v.sort_by(f64::total_cmp);
            let (q1, median, q3) = quartiles(&v, method);
            BoxSummary {
                series: label,
                count: v.len(),
                min: v[0],
                q1,
                median,
                q3,
                max: v[v.len() - 1],
            }
        })
        .collect();

    DistributionResult { boxes }
}

fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len();
    if n < 2 {
        return None;
    }
    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    let r = cov / (var_x.sqrt() * var_y.sqrt());
    Some((r * 100.0).round() / 100.0)
}

/// Pearson correlation over rows where every selected column has a value
pub fn correlation(table: &MeasurementTable, selection: &SeriesSelection) -> Option<CorrelationMatrix> {
    let series = resolve_selection(table, selection);
    if series.len() < 2 {
        return None;
    }

    let complete: Vec<Vec<f64>> = table
        .rows()
        .iter()
        .filter_map(|row| series.iter().map(|s| row.value(s.index)).collect::<Option<Vec<f64>>>())
        .collect();
    if complete.is_empty() {
        return None;
    }

    let columns: Vec<Vec<f64>> = (0..series.len())
        .map(|i| complete.iter().map(|row| row[i]).collect())
        .collect();

    let values = columns
        .iter()
        .map(|a| columns.iter().map(|b| pearson(a, b)).collect())
        .collect();

    Some(CorrelationMatrix {
        labels: series.into_iter().map(|s| s.label).collect(),
        values,
    })
}

pub fn column_types(table: &MeasurementTable) -> ColumnTypeCounts {
    let schema = table.schema();
    ColumnTypeCounts {
        numeric: table.columns().len() + usize::from(schema.has_hour),
        categorical: usize::from(schema.has_month) + usize::from(schema.region_column.is_some()),
        datetime: usize::from(schema.has_date)
            + usize::from(schema.has_time)
            + usize::from(schema.has_timestamp),
    }
}

/// Compute the data behind one chart slot. Never fails: unusable input maps
/// to `SlotData::Empty` with the reason.
pub fn compute_slot(table: &MeasurementTable, spec: &ChartSpec) -> SlotData {
    if table.is_empty() {
        return SlotData::Empty(EmptyReason::EmptyTable);
    }

    if spec.computation == Computation::ColumnTypes {
        return SlotData::ColumnTypes(column_types(table));
    }

    if resolve_selection(table, &spec.selection).is_empty() {
        tracing::debug!("Chart {} has no matching columns", spec.id);
        return SlotData::Empty(EmptyReason::NoMatchingColumns);
    }

    let data = match spec.computation {
        Computation::Aggregate { grouping, reducer } => {
            let result = aggregate(table, &spec.selection, grouping, reducer);
            (!result.is_empty()).then_some(SlotData::Aggregated(result))
        }
        Computation::Distribution { quartiles } => {
            let result = distribution(table, &spec.selection, quartiles);
            (!result.boxes.is_empty()).then_some(SlotData::Distribution(result))
        }
        Computation::Correlation => correlation(table, &spec.selection).map(SlotData::Correlation),
        Computation::ColumnTypes => Some(SlotData::ColumnTypes(column_types(table))),
    };

    data.unwrap_or(SlotData::Empty(EmptyReason::NoValues))
}
