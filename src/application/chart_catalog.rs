// Chart catalog - validated chart slot specifications per view
use crate::domain::aggregation::{Grouping, QuartileMethod, Reducer};
use crate::domain::chart::{ChartKind, ChartSpec, Computation, LabelStrategy, SeriesSelection, SeriesSpec};
use crate::domain::classification::{MeasurementType, PlotType};
use crate::domain::view::{SlotDirectory, View};
use crate::infrastructure::config::{ChartConfig, ChartsConfig, SelectConfig};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("chart {chart}: unknown view '{value}'")]
    UnknownView { chart: String, value: String },
    #[error("chart {chart}: unknown kind '{value}'")]
    UnknownKind { chart: String, value: String },
    #[error("chart {chart}: unknown statistic '{value}'")]
    UnknownStatistic { chart: String, value: String },
    #[error("chart {chart}: unknown grouping '{value}'")]
    UnknownGrouping { chart: String, value: String },
    #[error("chart {chart}: statistic '{statistic}' requires a grouping")]
    MissingGrouping { chart: String, statistic: String },
    #[error("chart {chart}: unknown measurement type '{value}'")]
    UnknownMeasurement { chart: String, value: String },
    #[error("chart {chart}: unknown plot type '{value}'")]
    UnknownPlotType { chart: String, value: String },
    #[error("chart {chart}: unknown label strategy '{value}'")]
    UnknownLabelStrategy { chart: String, value: String },
    #[error("chart {chart}: unknown quartile method '{value}'")]
    UnknownQuartileMethod { chart: String, value: String },
    #[error("duplicate chart id '{0}'")]
    DuplicateChart(String),
}

#[derive(Debug, Clone, Default)]
pub struct ChartCatalog {
    charts: Vec<ChartSpec>,
}

impl ChartCatalog {
    pub fn new(charts: Vec<ChartSpec>) -> Self {
        Self { charts }
    }

    pub fn from_config(config: &ChartsConfig) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        let mut charts = Vec::with_capacity(config.charts.len());

        for chart in &config.charts {
            if !seen.insert(chart.id.as_str()) {
                return Err(CatalogError::DuplicateChart(chart.id.clone()));
            }
            charts.push(parse_chart(chart)?);
        }

        Ok(Self { charts })
    }

    pub fn get(&self, id: &str) -> Option<&ChartSpec> {
        self.charts.iter().find(|c| c.id == id)
    }

    /// Chart specs shown by a view, in catalog order
    pub fn specs_for(&self, view: View) -> impl Iterator<Item = &ChartSpec> {
        self.charts.iter().filter(move |c| c.view == view)
    }
}

impl SlotDirectory for ChartCatalog {
    fn slots_for(&self, view: View) -> Vec<String> {
        self.specs_for(view).map(|c| c.id.clone()).collect()
    }
}

fn parse_chart(chart: &ChartConfig) -> Result<ChartSpec, CatalogError> {
    let view = chart.view.parse::<View>().map_err(|value| CatalogError::UnknownView {
        chart: chart.id.clone(),
        value,
    })?;

    let kind = match chart.kind.as_str() {
        "line" => ChartKind::Line,
        "bar" => ChartKind::Bar,
        "box" => ChartKind::Box,
        "heatmap" => ChartKind::Heatmap,
        "pie" => ChartKind::Pie,
        other => {
            return Err(CatalogError::UnknownKind {
                chart: chart.id.clone(),
                value: other.to_string(),
            });
        }
    };

    let computation = parse_computation(chart)?;

    let selection = if !chart.series.is_empty() {
        SeriesSelection::Columns(
            chart
                .series
                .iter()
                .map(|s| SeriesSpec {
                    column: s.column.clone(),
                    label: s.label.clone(),
                    color: s.color.clone(),
                })
                .collect(),
        )
    } else if let Some(select) = &chart.select {
        parse_select(&chart.id, select)?
    } else {
        SeriesSelection::AllColumns
    };

    Ok(ChartSpec {
        id: chart.id.clone(),
        title: chart.title.clone(),
        view,
        kind,
        computation,
        selection,
        x_label: chart.x_label.clone(),
        y_label: chart.y_label.clone(),
        legend_title: chart.legend_title.clone(),
        palette: chart.palette.clone(),
    })
}

fn parse_computation(chart: &ChartConfig) -> Result<Computation, CatalogError> {
    let reducer = match chart.statistic.as_str() {
        "mean" => Reducer::Mean,
        "sum" => Reducer::Sum,
        "distribution" => {
            let quartiles = match chart.quartile_method.as_deref() {
                None | Some("linear") => QuartileMethod::Linear,
                Some("exclusive") => QuartileMethod::Exclusive,
                Some(other) => {
                    return Err(CatalogError::UnknownQuartileMethod {
                        chart: chart.id.clone(),
                        value: other.to_string(),
                    });
                }
            };
            return Ok(Computation::Distribution { quartiles });
        }
        "correlation" => return Ok(Computation::Correlation),
        "column_types" => return Ok(Computation::ColumnTypes),
        other => {
            return Err(CatalogError::UnknownStatistic {
                chart: chart.id.clone(),
                value: other.to_string(),
            });
        }
    };

    let grouping = match chart.grouping.as_deref() {
        Some("hour") => Grouping::Hour,
        Some("month") => Grouping::Month,
        Some("plot_measurement") => Grouping::PlotMeasurement,
        Some(other) => {
            return Err(CatalogError::UnknownGrouping {
                chart: chart.id.clone(),
                value: other.to_string(),
            });
        }
        None => {
            return Err(CatalogError::MissingGrouping {
                chart: chart.id.clone(),
                statistic: chart.statistic.clone(),
            });
        }
    };

    Ok(Computation::Aggregate { grouping, reducer })
}

fn parse_select(chart: &str, select: &SelectConfig) -> Result<SeriesSelection, CatalogError> {
    let measurement = select
        .measurement
        .as_deref()
        .map(|m| {
            m.parse::<MeasurementType>()
                .map_err(|value| CatalogError::UnknownMeasurement {
                    chart: chart.to_string(),
                    value,
                })
        })
        .transpose()?;

    let plot_types = select
        .plot_types
        .iter()
        .map(|p| {
            p.parse::<PlotType>().map_err(|value| CatalogError::UnknownPlotType {
                chart: chart.to_string(),
                value,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let label_by = match select.label_by.as_str() {
        "plot_type" => LabelStrategy::PlotType,
        "station" => LabelStrategy::Station,
        other => {
            return Err(CatalogError::UnknownLabelStrategy {
                chart: chart.to_string(),
                value: other.to_string(),
            });
        }
    };

    Ok(SeriesSelection::Auto {
        measurement,
        plot_types,
        label_by,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::parse_charts_config;

    fn catalog(toml: &str) -> Result<ChartCatalog, CatalogError> {
        ChartCatalog::from_config(&parse_charts_config(toml).unwrap())
    }

    #[test]
    fn test_shipped_catalog_is_valid() {
        let toml = std::fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/config/charts.toml")).unwrap();
        let catalog = catalog(&toml).unwrap();

        assert_eq!(
            catalog.slots_for(View::Temperature),
            vec!["temperature-comparison", "hourly-temperature", "monthly-temperature"]
        );
        assert_eq!(
            catalog.slots_for(View::ExecutiveSummary),
            vec!["rainfall-trend", "environmental-conditions", "summary-statistics"]
        );
        assert_eq!(catalog.slots_for(View::Environment).len(), 3);
        assert_eq!(catalog.slots_for(View::Energy).len(), 3);
        assert!(catalog.slots_for(View::Overview).is_empty());
        assert!(catalog.slots_for(View::Conclusion).is_empty());

        let rainfall = catalog.get("rainfall-trend").unwrap();
        assert_eq!(
            rainfall.computation,
            Computation::Aggregate {
                grouping: Grouping::Month,
                reducer: Reducer::Mean
            }
        );
        assert_eq!(rainfall.y_label.as_deref(), Some("Avg Rainfall (mm)"));

        let irradiance = catalog.get("irradiance-comparison").unwrap();
        assert_eq!(
            irradiance.computation,
            Computation::Distribution {
                quartiles: QuartileMethod::Exclusive
            }
        );
        let humidity = catalog.get("humidity-comparison").unwrap();
        assert_eq!(
            humidity.computation,
            Computation::Distribution {
                quartiles: QuartileMethod::Linear
            }
        );
    }

    #[test]
    fn test_auto_selection() {
        let catalog = catalog(
            r#"
            [[charts]]
            id = "environmental-conditions"
            title = "Environmental Conditions by Plot Type"
            view = "executive"
            kind = "bar"
            statistic = "mean"
            grouping = "plot_measurement"
            select = { plot_types = ["agrivoltaic", "control", "ground_pv"] }
            "#,
        )
        .unwrap();

        let spec = catalog.get("environmental-conditions").unwrap();
        assert_eq!(
            spec.selection,
            SeriesSelection::Auto {
                measurement: None,
                plot_types: vec![PlotType::Agrivoltaic, PlotType::Control, PlotType::GroundPv],
                label_by: LabelStrategy::PlotType,
            }
        );
    }

    #[test]
    fn test_rejects_invalid_charts() {
        let base = |extra: &str| {
            format!(
                "[[charts]]\nid = \"c\"\ntitle = \"C\"\nview = \"energy\"\nkind = \"line\"\n{}",
                extra
            )
        };

        assert!(matches!(
            catalog(&base("statistic = \"mean\"\n")),
            Err(CatalogError::MissingGrouping { .. })
        ));
        assert!(matches!(
            catalog(&base("statistic = \"median\"\n")),
            Err(CatalogError::UnknownStatistic { .. })
        ));
        assert!(matches!(
            catalog(&base("statistic = \"mean\"\ngrouping = \"week\"\n")),
            Err(CatalogError::UnknownGrouping { .. })
        ));
        assert!(matches!(
            catalog(&base("statistic = \"distribution\"\nselect = { measurement = \"wind\" }\n")),
            Err(CatalogError::UnknownMeasurement { .. })
        ));
        assert!(matches!(
            catalog(&base("statistic = \"distribution\"\nquartile_method = \"tukey\"\n")),
            Err(CatalogError::UnknownQuartileMethod { .. })
        ));

        let duplicate = format!("{}{}", base("statistic = \"correlation\"\n"), base("statistic = \"correlation\"\n"));
        assert_eq!(catalog(&duplicate).unwrap_err(), CatalogError::DuplicateChart("c".to_string()));

        let bad_view = "[[charts]]\nid = \"c\"\ntitle = \"C\"\nview = \"settings\"\nkind = \"line\"\nstatistic = \"sum\"\n";
        assert!(matches!(catalog(bad_view), Err(CatalogError::UnknownView { .. })));
    }
}
