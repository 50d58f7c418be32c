// HTTP request handlers
use crate::domain::measurement::RowFilter;
use crate::domain::view::View;
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::json_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct SelectViewRequest {
    pub view: View,
}

#[derive(Debug, Serialize)]
pub struct SelectViewResponse {
    pub view: View,
    pub visible_slots: Vec<String>,
}

fn into_response(result: Result<Response, StatusCode>) -> Response {
    match result {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List all views with their chart slots
pub async fn list_views(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let views = state.dashboard_service.list_views();
    into_response(json_response(&views, accepts_brotli(&headers)).await)
}

/// Full page for the session's current view
pub async fn get_session_view(
    Path(session_id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let session = state.session_service.get(&session_id).await;
    let page = state
        .dashboard_service
        .get_view(session.router.current(), &session.filter);
    into_response(json_response(&page, accepts_brotli(&headers)).await)
}

pub async fn select_view(
    Path(session_id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectViewRequest>,
) -> Response {
    let visible_slots = state.session_service.select_view(&session_id, request.view).await;
    let response = SelectViewResponse {
        view: request.view,
        visible_slots,
    };
    into_response(json_response(&response, accepts_brotli(&headers)).await)
}

pub async fn set_filters(
    Path(session_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(filter): Json<RowFilter>,
) -> StatusCode {
    state.session_service.set_filter(&session_id, filter).await;
    StatusCode::NO_CONTENT
}

/// Stream the session's current view (progressive loading)
pub async fn stream_view(
    Path(session_id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let session = state.session_service.get(&session_id).await;
    let rx = state
        .streaming_service
        .stream_view(session.router.current(), &session.filter)
        .await;
    stream_from_receiver(rx, accepts_brotli(&headers))
}

/// One bound chart, filtered by the query string
pub async fn get_chart(
    Path(chart_id): Path<String>,
    Query(filter): Query<RowFilter>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.dashboard_service.chart(&chart_id, &filter) {
        Some(chart) => into_response(json_response(&chart, accepts_brotli(&headers)).await),
        None => {
            tracing::debug!("Unknown chart requested: {}", chart_id);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::chart_catalog::ChartCatalog;
    use crate::application::dashboard_service::DashboardService;
    use crate::application::session_service::{SessionLimits, SessionService};
    use crate::application::streaming_service::StreamingDashboardService;
    use crate::infrastructure::config::parse_charts_config;
    use crate::infrastructure::csv_repository::{parse_reader, LoadOptions};

    const CSV: &str = "DATE,TIME,Month,AG-PV P3/T (oC),AO-TI P2/T (oC)\n\
        2024-05-14,05:00:00,May,24,26\n\
        2024-05-14,06:00:00,May,30,31\n";

    fn state() -> Arc<AppState> {
        let table = Arc::new(parse_reader(CSV.as_bytes(), &LoadOptions::default()).unwrap());
        let toml = std::fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/config/charts.toml")).unwrap();
        let catalog = Arc::new(ChartCatalog::from_config(&parse_charts_config(&toml).unwrap()).unwrap());
        Arc::new(AppState {
            dashboard_service: DashboardService::new(table.clone(), catalog.clone()),
            streaming_service: StreamingDashboardService::new(table, catalog.clone()),
            session_service: SessionService::new(catalog, SessionLimits::default()),
        })
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_select_then_get_view() {
        let state = state();

        let response = select_view(
            Path("s1".to_string()),
            HeaderMap::new(),
            State(state.clone()),
            Json(SelectViewRequest {
                view: View::Temperature,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["view"], "temperature");
        assert_eq!(json["visible_slots"].as_array().unwrap().len(), 3);

        let response = get_session_view(Path("s1".to_string()), HeaderMap::new(), State(state.clone())).await;
        let json = body_json(response).await;
        assert_eq!(json["view"], "temperature");
        assert_eq!(json["charts"][1]["id"], "hourly-temperature");
        assert_eq!(json["charts"][1]["body"]["type"], "series");

        let response = get_session_view(Path("s2".to_string()), HeaderMap::new(), State(state)).await;
        let json = body_json(response).await;
        assert_eq!(json["view"], "overview");
        assert_eq!(json["tiles"][0]["value"], 2.0);
    }

    #[tokio::test]
    async fn test_filters_apply_to_session() {
        let state = state();
        let status = set_filters(
            Path("s1".to_string()),
            State(state.clone()),
            Json(RowFilter {
                year: Some(2023),
                region: None,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let response = get_session_view(Path("s1".to_string()), HeaderMap::new(), State(state)).await;
        let json = body_json(response).await;
        assert_eq!(json["tiles"][0]["id"], "data-points");
        assert_eq!(json["tiles"][0]["value"], 0.0);
    }

    #[tokio::test]
    async fn test_get_chart() {
        let state = state();

        let response = get_chart(
            Path("monthly-temperature".to_string()),
            Query(RowFilter::default()),
            HeaderMap::new(),
            State(state.clone()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["body"]["series"][0]["points"][0]["category"], "May");
        assert_eq!(json["body"]["series"][0]["points"][0]["value"], 27.0);

        let response = get_chart(
            Path("no-such-chart".to_string()),
            Query(RowFilter::default()),
            HeaderMap::new(),
            State(state),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_blank_region_query_keeps_all_rows() {
        let uri: axum::http::Uri = "/charts/monthly-temperature?region=".parse().unwrap();
        let Query(filter) = Query::<RowFilter>::try_from_uri(&uri).unwrap();
        assert!(filter.is_empty());

        let response = get_chart(
            Path("monthly-temperature".to_string()),
            Query(filter),
            HeaderMap::new(),
            State(state()),
        )
        .await;
        let json = body_json(response).await;
        assert_eq!(json["body"]["type"], "series");
        assert_eq!(json["body"]["series"][0]["points"][0]["value"], 27.0);
    }

    #[tokio::test]
    async fn test_list_views() {
        let response = list_views(HeaderMap::new(), State(state())).await;
        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 6);
        assert_eq!(json[5]["view"], "finals");
    }

    #[test]
    fn test_select_view_request_rejects_unknown_view() {
        assert!(serde_json::from_str::<SelectViewRequest>(r#"{"view": "settings"}"#).is_err());
        let request: SelectViewRequest = serde_json::from_str(r#"{"view": "executive"}"#).unwrap();
        assert_eq!(request.view, View::ExecutiveSummary);
    }
}
