// Dashboard views and the per-session view router
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum View {
    #[default]
    #[serde(rename = "overview")]
    Overview,
    #[serde(rename = "executive")]
    ExecutiveSummary,
    #[serde(rename = "temperature")]
    Temperature,
    #[serde(rename = "environment")]
    Environment,
    #[serde(rename = "energy")]
    Energy,
    #[serde(rename = "finals")]
    Conclusion,
}

impl View {
    pub const ALL: [View; 6] = [
        View::Overview,
        View::ExecutiveSummary,
        View::Temperature,
        View::Environment,
        View::Energy,
        View::Conclusion,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            View::Overview => "overview",
            View::ExecutiveSummary => "executive",
            View::Temperature => "temperature",
            View::Environment => "environment",
            View::Energy => "energy",
            View::Conclusion => "finals",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::ExecutiveSummary => "Executive Summary",
            View::Temperature => "Temperature Analysis",
            View::Environment => "Environmental Conditions",
            View::Energy => "Energy Analysis",
            View::Conclusion => "Conclusion & Recommendation",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        View::ALL
            .iter()
            .copied()
            .find(|view| view.id() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Anything that knows which chart slots a view shows
pub trait SlotDirectory {
    fn slots_for(&self, view: View) -> Vec<String>;
}

/// Single-selection state machine over the dashboard views
#[derive(Debug, Clone, Default)]
pub struct ViewRouter {
    current: View,
}

impl ViewRouter {
    pub fn current(&self) -> View {
        self.current
    }

    /// Switch to `view` and return the chart slots that are now visible
    pub fn select(&mut self, view: View, directory: &dyn SlotDirectory) -> Vec<String> {
        if self.current != view {
            tracing::debug!("View changed: {} -> {}", self.current, view);
        }
        self.current = view;
        directory.slots_for(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSlots;

    impl SlotDirectory for FixedSlots {
        fn slots_for(&self, view: View) -> Vec<String> {
            match view {
                View::Temperature => vec!["hourly-temperature".to_string()],
                View::Energy => vec!["hourly-irradiance".to_string(), "correlation-analysis".to_string()],
                _ => Vec::new(),
            }
        }
    }

    #[test]
    fn test_router_transitions() {
        let mut router = ViewRouter::default();
        assert_eq!(router.current(), View::Overview);
        assert!(FixedSlots.slots_for(router.current()).is_empty());

        let visible = router.select(View::Temperature, &FixedSlots);
        assert_eq!(router.current(), View::Temperature);
        assert_eq!(visible, vec!["hourly-temperature"]);

        let visible = router.select(View::Energy, &FixedSlots);
        assert_eq!(router.current(), View::Energy);
        assert_eq!(visible, vec!["hourly-irradiance", "correlation-analysis"]);
    }

    #[test]
    fn test_reselecting_same_view() {
        let mut router = ViewRouter::default();
        router.select(View::Energy, &FixedSlots);
        router.select(View::Energy, &FixedSlots);
        assert_eq!(router.current(), View::Energy);
    }

    #[test]
    fn test_view_ids_round_trip() {
        for view in View::ALL {
            assert_eq!(view.id().parse::<View>(), Ok(view));
        }
        assert!("settings".parse::<View>().is_err());
        assert_eq!(serde_json::to_string(&View::Conclusion).unwrap(), "\"finals\"");
    }
}
