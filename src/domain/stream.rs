// Progressive view streaming messages
use super::chart::{ChartDescription, ChartKind};
use super::dashboard::TileData;
use super::view::View;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileSkeleton {
    pub id: String,
    pub title: String,
    pub precision: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSkeleton {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
}

/// Page layout sent before any data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSkeleton {
    pub view: View,
    pub title: String,
    pub tiles: Vec<TileSkeleton>,
    pub charts: Vec<ChartSkeleton>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionEvent {
    pub total_widgets: usize,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamMessage {
    Skeleton(ViewSkeleton),
    TileUpdate(TileData),
    ChartUpdate(ChartDescription),
    Complete(CompletionEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_is_tagged() {
        let msg = StreamMessage::Complete(CompletionEvent {
            total_widgets: 3,
            duration_ms: 12,
        });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "complete");
        assert_eq!(json["total_widgets"], 3);

        let msg = StreamMessage::TileUpdate(TileData::new("sensors", "Sensors", 14.0, 0));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "tile_update");
        assert_eq!(json["id"], "sensors");
    }
}
