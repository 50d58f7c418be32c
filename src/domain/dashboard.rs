// Dashboard page domain model
use super::chart::ChartDescription;
use super::view::View;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileData {
    pub id: String,
    pub title: String,
    pub value: f64,
    pub precision: i32,
}

impl TileData {
    pub fn new(id: &str, title: &str, value: f64, precision: i32) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            value,
            precision,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewPage {
    pub view: View,
    pub title: String,
    pub tiles: Vec<TileData>,
    pub charts: Vec<ChartDescription>,
}

impl ViewPage {
    pub fn new(view: View, tiles: Vec<TileData>, charts: Vec<ChartDescription>) -> Self {
        Self {
            view,
            title: view.label().to_string(),
            tiles,
            charts,
        }
    }
}

/// A view as listed to clients, with the chart slots it shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSummary {
    pub view: View,
    pub label: String,
    pub slots: Vec<String>,
}
