use crate::ids::WardId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Equity band, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquityLevel {
    Excellent,
    Fair,
    Moderate,
    Poor,
}

impl EquityLevel {
    /// Dashboard color for the band.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Excellent => "#10B981",
            Self::Fair => "#3B82F6",
            Self::Moderate => "#F59E0B",
            Self::Poor => "#EF4444",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Excellent => "Above average water access",
            Self::Fair => "Adequate water access",
            Self::Moderate => "Below average, needs attention",
            Self::Poor => "Critical water access issues",
        }
    }
}

/// Inputs that produced a ward's score, kept for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityMetrics {
    pub supply_hours: f64,
    pub city_avg_supply_hours: f64,
    pub avg_pressure: Option<f64>,
    pub city_avg_pressure: Option<f64>,
    pub open_complaints: u32,
}

/// Equity score of one ward. Recomputed on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquitySnapshot {
    pub ward_id: WardId,
    pub ward_name: String,
    /// Clamped to the configured bounds and rounded to two decimals.
    pub score: f64,
    pub level: EquityLevel,
    pub color: String,
    pub description: String,
    pub metrics: EquityMetrics,
    pub recommendations: Vec<String>,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CityStatus {
    HighInequality,
    ModerateInequality,
    GoodEquity,
}

impl CityStatus {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::HighInequality => "Significant disparities in water access across wards",
            Self::ModerateInequality => "Noticeable differences in water access",
            Self::GoodEquity => "Relatively equitable water distribution",
        }
    }

    #[must_use]
    pub const fn action(self) -> &'static str {
        match self {
            Self::HighInequality => "Immediate redistributive measures recommended",
            Self::ModerateInequality => "Targeted improvements needed in low-scoring wards",
            Self::GoodEquity => "Maintain and monitor current distribution",
        }
    }
}

/// Citywide fairness summary over every scored ward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitywideEquityReport {
    pub mean_score: f64,
    pub gini: f64,
    pub status: CityStatus,
    pub message: String,
    pub action: String,
    pub ward_count: usize,
    /// Ascending by score, worst ward first.
    pub wards: Vec<EquitySnapshot>,
    pub generated_at: DateTime<Utc>,
}

impl CitywideEquityReport {
    /// Report for a city with no scored wards.
    #[must_use]
    pub fn empty(generated_at: DateTime<Utc>) -> Self {
        let status = CityStatus::GoodEquity;
        Self {
            mean_score: 0.0,
            gini: 0.0,
            status,
            message: status.message().to_owned(),
            action: status.action().to_owned(),
            ward_count: 0,
            wards: Vec::new(),
            generated_at,
        }
    }
}
