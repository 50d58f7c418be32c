// Streaming dashboard service - Progressive loading of a view page
use crate::application::chart_catalog::ChartCatalog;
use crate::application::dashboard_service::{bind_chart, overview_tiles};
use crate::domain::measurement::{MeasurementTable, RowFilter};
use crate::domain::stream::{ChartSkeleton, CompletionEvent, StreamMessage, TileSkeleton, ViewSkeleton};
use crate::domain::view::View;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

const CHANNEL_CAPACITY: usize = 100;

#[derive(Clone)]
pub struct StreamingDashboardService {
    table: Arc<MeasurementTable>,
    catalog: Arc<ChartCatalog>,
}

impl StreamingDashboardService {
    pub fn new(table: Arc<MeasurementTable>, catalog: Arc<ChartCatalog>) -> Self {
        Self { table, catalog }
    }

    /// Stream a view: skeleton first, then tile and chart updates as they are
    /// ready, then a completion event once every chart task has finished.
    pub async fn stream_view(&self, view: View, filter: &RowFilter) -> mpsc::Receiver<StreamMessage> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let start_time = Instant::now();

        let table = match self.table.filtered(filter) {
            Cow::Borrowed(_) => self.table.clone(),
            Cow::Owned(filtered) => Arc::new(filtered),
        };

        // 1. Skeleton
        let tiles = if view == View::Overview {
            overview_tiles(&table)
        } else {
            Vec::new()
        };
        let specs: Vec<_> = self.catalog.specs_for(view).cloned().collect();
        let total_widgets = tiles.len() + specs.len();

        let skeleton = ViewSkeleton {
            view,
            title: view.label().to_string(),
            tiles: tiles
                .iter()
                .map(|t| TileSkeleton {
                    id: t.id.clone(),
                    title: t.title.clone(),
                    precision: t.precision,
                })
                .collect(),
            charts: specs
                .iter()
                .map(|c| ChartSkeleton {
                    id: c.id.clone(),
                    title: c.title.clone(),
                    kind: c.kind,
                })
                .collect(),
        };
        let _ = tx.send(StreamMessage::Skeleton(skeleton)).await;

        // 2. Tiles are plain counts, send them straight away
        for tile in tiles {
            let _ = tx.send(StreamMessage::TileUpdate(tile)).await;
        }

        // 3. One task per chart slot
        let handles: Vec<_> = specs
            .into_iter()
            .map(|spec| {
                let tx = tx.clone();
                let table = table.clone();
                tokio::spawn(async move {
                    let chart = bind_chart(&table, &spec);
                    if tx.send(StreamMessage::ChartUpdate(chart)).await.is_err() {
                        tracing::debug!("Stream receiver dropped before chart {} was sent", spec.id);
                    }
                })
            })
            .collect();

        // 4. Completion after every chart task has finished
        tokio::spawn(async move {
            for result in futures::future::join_all(handles).await {
                if let Err(e) = result {
                    tracing::warn!("Chart task failed: {}", e);
                }
            }

            let complete = CompletionEvent {
                total_widgets,
                duration_ms: start_time.elapsed().as_millis() as u64,
            };
            let _ = tx.send(StreamMessage::Complete(complete)).await;
        });

        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::parse_charts_config;
    use crate::infrastructure::csv_repository::{parse_reader, LoadOptions};
    use tokio_stream::wrappers::ReceiverStream;
    use tokio_stream::StreamExt;

    fn service(csv: &str) -> StreamingDashboardService {
        let table = parse_reader(csv.as_bytes(), &LoadOptions::default()).unwrap();
        let toml = std::fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/config/charts.toml")).unwrap();
        let catalog = ChartCatalog::from_config(&parse_charts_config(&toml).unwrap()).unwrap();
        StreamingDashboardService::new(Arc::new(table), Arc::new(catalog))
    }

    async fn collect(service: &StreamingDashboardService, view: View) -> Vec<StreamMessage> {
        let rx = service.stream_view(view, &RowFilter::default()).await;
        ReceiverStream::new(rx).collect().await
    }

    #[tokio::test]
    async fn test_stream_order() {
        let service = service(
            "DATE,TIME,AG-PV P1/Irr (W/m2),PO-PV/Irr (W/m2)\n\
             2024-05-14,12:00:00,800,900\n\
             2024-05-14,13:00:00,750,950\n",
        );
        let messages = collect(&service, View::Energy).await;

        assert_eq!(messages.len(), 5);
        let StreamMessage::Skeleton(skeleton) = &messages[0] else {
            panic!("expected skeleton first");
        };
        assert_eq!(skeleton.charts.len(), 3);
        assert!(skeleton.tiles.is_empty());

        let mut chart_ids: Vec<_> = messages[1..4]
            .iter()
            .map(|m| match m {
                StreamMessage::ChartUpdate(chart) => chart.id.clone(),
                other => panic!("unexpected message {:?}", other),
            })
            .collect();
        chart_ids.sort();
        assert_eq!(chart_ids, vec!["correlation-analysis", "hourly-irradiance", "irradiance-comparison"]);

        let StreamMessage::Complete(complete) = &messages[4] else {
            panic!("expected completion last");
        };
        assert_eq!(complete.total_widgets, 3);
    }

    #[tokio::test]
    async fn test_overview_stream_sends_tiles() {
        let service = service("DATE,TIME,AG-PV P1/T (oC)\n2024-05-14,05:00:00,24\n");
        let messages = collect(&service, View::Overview).await;

        let tiles: Vec<_> = messages
            .iter()
            .filter_map(|m| match m {
                StreamMessage::TileUpdate(tile) => Some(tile.id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(tiles, vec!["data-points", "months", "plot-types", "sensors"]);
        assert!(matches!(
            messages.last(),
            Some(StreamMessage::Complete(CompletionEvent { total_widgets: 4, .. }))
        ));
    }

    #[tokio::test]
    async fn test_empty_table_streams_placeholders() {
        let service = StreamingDashboardService::new(
            Arc::new(MeasurementTable::empty()),
            service("DATE\n").catalog.clone(),
        );
        let messages = collect(&service, View::Temperature).await;

        let charts: Vec<_> = messages
            .iter()
            .filter_map(|m| match m {
                StreamMessage::ChartUpdate(chart) => Some(chart),
                _ => None,
            })
            .collect();
        assert_eq!(charts.len(), 3);
        assert!(charts.iter().all(|c| c.is_placeholder()));
    }
}
