// Dashboard service - Use case for building view pages
use crate::application::aggregation_engine::compute_slot;
use crate::application::chart_binder::bind;
use crate::application::chart_catalog::ChartCatalog;
use crate::domain::chart::{ChartDescription, ChartSpec};
use crate::domain::classification::{classify_plot, PlotType};
use crate::domain::dashboard::{TileData, ViewPage, ViewSummary};
use crate::domain::measurement::{MeasurementTable, RowFilter};
use crate::domain::view::{SlotDirectory, View};
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Clone)]
pub struct DashboardService {
    table: Arc<MeasurementTable>,
    catalog: Arc<ChartCatalog>,
}

impl DashboardService {
    pub fn new(table: Arc<MeasurementTable>, catalog: Arc<ChartCatalog>) -> Self {
        Self { table, catalog }
    }

    pub fn list_views(&self) -> Vec<ViewSummary> {
        View::ALL
            .iter()
            .map(|view| ViewSummary {
                view: *view,
                label: view.label().to_string(),
                slots: self.catalog.slots_for(*view),
            })
            .collect()
    }

    /// Build the full page for a view: tiles plus every bound chart slot
    pub fn get_view(&self, view: View, filter: &RowFilter) -> ViewPage {
        let table = self.table.filtered(filter);

        let tiles = if view == View::Overview {
            overview_tiles(&table)
        } else {
            Vec::new()
        };

        let charts = self
            .catalog
            .specs_for(view)
            .map(|spec| bind_chart(&table, spec))
            .collect();

        ViewPage::new(view, tiles, charts)
    }

    /// A single bound chart, or `None` for an unknown chart id
    pub fn chart(&self, chart_id: &str, filter: &RowFilter) -> Option<ChartDescription> {
        let spec = self.catalog.get(chart_id)?;
        let table = self.table.filtered(filter);
        Some(bind_chart(&table, spec))
    }
}

pub fn bind_chart(table: &MeasurementTable, spec: &ChartSpec) -> ChartDescription {
    bind(&compute_slot(table, spec), spec)
}

/// Headline counts shown on the overview page
pub fn overview_tiles(table: &MeasurementTable) -> Vec<TileData> {
    let months: BTreeSet<_> = table
        .rows()
        .iter()
        .filter_map(|row| row.month.as_ref().and_then(|m| m.study_month()))
        .collect();

    let plot_types: BTreeSet<_> = table
        .columns()
        .iter()
        .map(|column| classify_plot(column))
        .filter(|plot| matches!(plot, PlotType::Agrivoltaic | PlotType::Control | PlotType::GroundPv))
        .collect();

    vec![
        TileData::new("data-points", "Data Points", table.row_count() as f64, 0),
        TileData::new("months", "Months Covered", months.len() as f64, 0),
        TileData::new("plot-types", "Plot Types", plot_types.len() as f64, 0),
        TileData::new("sensors", "Sensors", table.columns().len() as f64, 0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::ChartBody;
    use crate::infrastructure::config::parse_charts_config;
    use crate::infrastructure::csv_repository::{parse_reader, LoadOptions};

    const CSV: &str = "DATE,TIME,Month,Region,AG-PV P3/T (oC),AO-TI P2/T (oC),PO-PV/T (oC),WS/P (mm)\n\
        2023-05-14,05:00:00,May,Ashanti,24,26,25,0.0\n\
        2024-05-14,05:00:00,May,Ashanti,26,27,28,1.5\n\
        2024-06-11,06:00:00,June,Volta,30,31,32,4.0\n\
        2024-10-08,12:00:00,October,Volta,35,36,37,0.5\n";

    fn service() -> DashboardService {
        let table = parse_reader(CSV.as_bytes(), &LoadOptions::default()).unwrap();
        let toml = std::fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/config/charts.toml")).unwrap();
        let catalog = ChartCatalog::from_config(&parse_charts_config(&toml).unwrap()).unwrap();
        DashboardService::new(Arc::new(table), Arc::new(catalog))
    }

    fn tile_value(page: &ViewPage, id: &str) -> f64 {
        page.tiles.iter().find(|t| t.id == id).unwrap().value
    }

    #[test]
    fn test_overview_tiles() {
        let page = service().get_view(View::Overview, &RowFilter::default());
        assert_eq!(page.title, "Overview");
        assert!(page.charts.is_empty());
        assert_eq!(tile_value(&page, "data-points"), 4.0);
        assert_eq!(tile_value(&page, "months"), 3.0);
        assert_eq!(tile_value(&page, "plot-types"), 3.0);
        assert_eq!(tile_value(&page, "sensors"), 4.0);
    }

    #[test]
    fn test_filter_narrows_tiles() {
        let filter = RowFilter {
            year: Some(2024),
            region: Some("volta".to_string()),
        };
        let page = service().get_view(View::Overview, &filter);
        assert_eq!(tile_value(&page, "data-points"), 2.0);
        assert_eq!(tile_value(&page, "months"), 2.0);
    }

    #[test]
    fn test_temperature_view_binds_slots_in_order() {
        let page = service().get_view(View::Temperature, &RowFilter::default());
        let ids: Vec<_> = page.charts.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["temperature-comparison", "hourly-temperature", "monthly-temperature"]);
        assert!(page.tiles.is_empty());

        let hourly = &page.charts[1];
        let ChartBody::Series { series } = &hourly.body else {
            panic!("expected series body");
        };
        assert_eq!(series[0].name, "Agrivoltaic");
        assert_eq!(series[0].points[0].category, "5");
        assert_eq!(series[0].points[0].value, 25.0);
    }

    #[test]
    fn test_missing_sensors_become_placeholders() {
        let page = service().get_view(View::Environment, &RowFilter::default());
        assert_eq!(page.charts.len(), 3);
        assert!(page.charts.iter().all(|c| c.is_placeholder()));
    }

    #[test]
    fn test_chart_lookup() {
        let service = service();
        let rainfall = service.chart("rainfall-trend", &RowFilter::default()).unwrap();
        let ChartBody::Series { series } = rainfall.body else {
            panic!("expected series body");
        };
        assert_eq!(series[0].points[0].category, "May");
        assert_eq!(series[0].points[0].value, 0.75);
        assert_eq!(series[0].points[1].category, "June");
        assert_eq!(series[0].points[1].value, 4.0);

        assert!(service.chart("no-such-chart", &RowFilter::default()).is_none());
    }

    #[test]
    fn test_monthly_rainfall_is_averaged() {
        let csv = "DATE,TIME,WS/P (mm)\n2024-05-01,06:00:00,2.0\n2024-05-02,06:00:00,4.0\n";
        let table = parse_reader(csv.as_bytes(), &LoadOptions::default()).unwrap();
        let service = DashboardService::new(Arc::new(table), service().catalog);

        let rainfall = service.chart("rainfall-trend", &RowFilter::default()).unwrap();
        assert_eq!(rainfall.y_axis.title.as_deref(), Some("Avg Rainfall (mm)"));
        let ChartBody::Series { series } = rainfall.body else {
            panic!("expected series body");
        };
        assert_eq!(series[0].points.len(), 1);
        assert_eq!(series[0].points[0].category, "May");
        assert_eq!(series[0].points[0].value, 3.0);
    }

    #[test]
    fn test_list_views() {
        let views = service().list_views();
        assert_eq!(views.len(), 6);
        assert_eq!(views[0].view, View::Overview);
        assert!(views[0].slots.is_empty());
        assert_eq!(views[2].label, "Temperature Analysis");
        assert_eq!(views[2].slots.len(), 3);
    }
}
