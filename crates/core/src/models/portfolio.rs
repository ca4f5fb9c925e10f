use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::fund::{Fund, Horizon};

/// Body of the "suggest portfolio" request. These four fields are all the
/// client ever sends; the optimisation happens remotely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRequest {
    /// Amount to invest, in EUR
    pub amount: f64,
    pub horizon: Horizon,
    /// Target risk level (SRI 1–7)
    pub target_sri: u8,
    /// Accepted distance from `target_sri`
    pub sri_tolerance: u8,
}

/// One fund's share of a suggested portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundAllocation {
    pub fund: Fund,
    pub allocation_percent: f64,
    pub amount_eur: f64,
}

/// Portfolio proposed by the service, displayed as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSuggestion {
    pub allocations: Vec<FundAllocation>,
    pub total_amount: f64,
    pub average_sri: f64,
    pub num_funds: usize,
    /// Asset class → percent of the portfolio
    pub asset_class_distribution: BTreeMap<String, f64>,
    pub explanation: String,
    #[serde(default)]
    pub average_confidence: Option<f64>,
    #[serde(default)]
    pub consensus_summary: Option<String>,
}

impl PortfolioSuggestion {
    /// Sum of all allocation percentages (≈ 100).
    pub fn allocation_total(&self) -> f64 {
        self.allocations.iter().map(|a| a.allocation_percent).sum()
    }

    /// Sum of the asset-class distribution percentages (≈ 100).
    pub fn distribution_total(&self) -> f64 {
        self.asset_class_distribution.values().sum()
    }
}
