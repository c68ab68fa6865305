use super::route::Route;
use serde::{Deserialize, Serialize};

/// The single active phase of a navigation session. The tagged variants make
/// impossible combinations (arrived while mid-reroute, a step list without a
/// route) unrepresentable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NavigationState {
    Idle,
    AwaitingFirstFix,
    Routed(Route),
    Arrived,
}

impl NavigationState {
    pub fn route(&self) -> Option<&Route> {
        match self {
            NavigationState::Routed(route) => Some(route),
            _ => None,
        }
    }

    pub fn is_arrived(&self) -> bool {
        matches!(self, NavigationState::Arrived)
    }

    /// Short phase name for logging.
    pub fn phase(&self) -> &'static str {
        match self {
            NavigationState::Idle => "idle",
            NavigationState::AwaitingFirstFix => "awaiting_first_fix",
            NavigationState::Routed(_) => "routed",
            NavigationState::Arrived => "arrived",
        }
    }
}
