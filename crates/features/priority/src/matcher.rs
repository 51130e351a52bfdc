//! Issue text classification.

use jal_domain::config::KeywordConfig;
use std::fmt::Debug;

/// Problem categories recognised in free-text issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueSignal {
    NoWater,
    LowPressure,
    Leak,
}

impl IssueSignal {
    pub const ALL: [Self; 3] = [Self::NoWater, Self::LowPressure, Self::Leak];
}

/// Decides whether an issue text carries a signal.
///
/// Implementations must return `false` for empty text.
pub trait IssueMatcher: Send + Sync + Debug {
    fn matches(&self, issue: &str, signal: IssueSignal) -> bool;
}

/// Case-insensitive substring matcher over configured phrases.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    no_water: Vec<String>,
    low_pressure: Vec<String>,
    leak: Vec<String>,
}

impl KeywordMatcher {
    #[must_use]
    pub fn new(keywords: &KeywordConfig) -> Self {
        let normalize = |phrases: &[String]| {
            phrases
                .iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
        };
        Self {
            no_water: normalize(&keywords.no_water),
            low_pressure: normalize(&keywords.low_pressure),
            leak: normalize(&keywords.leak),
        }
    }

    fn phrases(&self, signal: IssueSignal) -> &[String] {
        match signal {
            IssueSignal::NoWater => &self.no_water,
            IssueSignal::LowPressure => &self.low_pressure,
            IssueSignal::Leak => &self.leak,
        }
    }
}

impl Default for KeywordMatcher {
    fn default() -> Self {
        Self::new(&KeywordConfig::default())
    }
}

impl IssueMatcher for KeywordMatcher {
    fn matches(&self, issue: &str, signal: IssueSignal) -> bool {
        if issue.trim().is_empty() {
            return false;
        }
        let issue = issue.to_lowercase();
        self.phrases(signal).iter().any(|phrase| issue.contains(phrase.as_str()))
    }
}
