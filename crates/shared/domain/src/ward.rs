use crate::ids::WardId;
use serde::{Deserialize, Serialize};

/// Registry view of a ward. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ward {
    pub id: WardId,
    pub name: String,
    pub population: u64,
    pub avg_supply_hours: f64,
    /// Last equity score cached by the registry, neutral until first computed.
    #[serde(default = "neutral_score")]
    pub equity_score: f64,
}

const fn neutral_score() -> f64 {
    1.0
}
