use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::errors::CoreError;

// ── Consensus ───────────────────────────────────────────────────────

/// Agreement between scoring brains, bucketed by the spread of their scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConsensusLevel {
    Strong,
    Moderate,
    Weak,
    Divergence,
}

impl ConsensusLevel {
    pub const ALL: [ConsensusLevel; 4] = [
        ConsensusLevel::Strong,
        ConsensusLevel::Moderate,
        ConsensusLevel::Weak,
        ConsensusLevel::Divergence,
    ];

    /// Bucket a standard deviation of brain scores (10 / 20 / 30 cut-offs).
    /// A non-finite sigma is treated as full divergence.
    pub fn from_sigma(sigma: f64) -> Self {
        match sigma {
            s if s < 10.0 => ConsensusLevel::Strong,
            s if s < 20.0 => ConsensusLevel::Moderate,
            s if s < 30.0 => ConsensusLevel::Weak,
            _ => ConsensusLevel::Divergence,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConsensusLevel::Strong => "STRONG",
            ConsensusLevel::Moderate => "MODERATE",
            ConsensusLevel::Weak => "WEAK",
            ConsensusLevel::Divergence => "DIVERGENCE",
        }
    }
}

impl fmt::Display for ConsensusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Brain registry ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrainType {
    Fundamental,
    Quant,
    Macro,
    Behavioral,
    Adaptive,
    Hybrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrainRole {
    #[default]
    Core,
    Experimental,
    Hybrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrainHorizon {
    ShortTerm,
    #[default]
    MediumTerm,
    LongTerm,
}

fn default_brain_version() -> String {
    "1.0.0".to_string()
}

fn default_brain_weight() -> f64 {
    0.25
}

fn default_true() -> bool {
    true
}

/// One scoring engine registered with the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrainRegistryItem {
    pub brain_id: String,
    pub label: String,
    pub brain_type: BrainType,
    #[serde(default = "default_brain_version")]
    pub version: String,
    #[serde(default)]
    pub role: BrainRole,
    #[serde(default)]
    pub horizon: BrainHorizon,
    #[serde(default = "default_brain_weight")]
    pub default_weight: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub description: Option<String>,
}

// ── Composite ranking ───────────────────────────────────────────────

/// Position of a fund in the composite ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrunkRankingEntry {
    pub fund_id: String,
    pub score_composite: f64,
    pub sri: u8,
    pub rank: u32,
}

/// Per-brain breakdown behind a fund's composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundCompositeScore {
    pub fund_id: String,
    pub score_composite: f64,
    /// brain id → score (0-100)
    #[serde(default)]
    pub scores_by_brain: BTreeMap<String, f64>,
    /// brain id → confidence (0-1)
    #[serde(default)]
    pub confidences_by_brain: BTreeMap<String, f64>,
    pub consensus_sigma: f64,
    pub consensus_level: ConsensusLevel,
    pub sri: u8,
}

impl FundCompositeScore {
    /// Brains that scored this fund, in id order, with their confidence if reported.
    pub fn brain_rows(&self) -> Vec<(&str, f64, Option<f64>)> {
        self.scores_by_brain
            .iter()
            .map(|(id, score)| (id.as_str(), *score, self.confidences_by_brain.get(id).copied()))
            .collect()
    }
}

/// Consensus statistics over the latest composite run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrunkStats {
    pub total_funds: usize,
    #[serde(default)]
    pub active_brains: Vec<String>,
    /// brain id → normalised weight
    #[serde(default)]
    pub brain_weights: BTreeMap<String, f64>,
    #[serde(default)]
    pub consensus_distribution: BTreeMap<ConsensusLevel, usize>,
    #[serde(default)]
    pub contradiction_count: usize,
    pub timestamp: String,
}

impl TrunkStats {
    /// Funds at a consensus level (0 when the level is absent).
    pub fn funds_with_consensus(&self, level: ConsensusLevel) -> usize {
        self.consensus_distribution.get(&level).copied().unwrap_or(0)
    }
}

/// Two confident brains that disagree sharply on one fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contradiction {
    pub fund_id: String,
    pub brain_1: String,
    pub brain_2: String,
    pub score_1: f64,
    pub score_2: f64,
    pub score_diff: f64,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContradictionReport {
    pub count: usize,
    #[serde(default)]
    pub contradictions: Vec<Contradiction>,
}

// ── Queries ─────────────────────────────────────────────────────────

/// Filters for `GET /trunk/ranking`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrunkRankingQuery {
    pub top_n: u32,
    /// Lowest composite score to include (0-100).
    pub min_score: Option<f64>,
}

impl Default for TrunkRankingQuery {
    fn default() -> Self {
        Self {
            top_n: 100,
            min_score: None,
        }
    }
}

impl TrunkRankingQuery {
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(1..=2000).contains(&self.top_n) {
            return Err(CoreError::ValidationError(format!(
                "top_n {} is out of range (1-2000)",
                self.top_n
            )));
        }
        if let Some(min) = self.min_score {
            if !(min.is_finite() && (0.0..=100.0).contains(&min)) {
                return Err(CoreError::ValidationError(format!(
                    "min_score {min} is out of range (0-100)"
                )));
            }
        }
        Ok(())
    }

    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("top_n", self.top_n.to_string())];
        if let Some(min) = self.min_score {
            pairs.push(("min_score", min.to_string()));
        }
        pairs
    }
}

/// Check the risk band passed to `GET /trunk/funds_for_allocation`:
/// target SRI 1-7 and a tolerance of 0-3 levels either side.
pub fn validate_allocation_band(sri_target: u8, tolerance: f64) -> Result<(), CoreError> {
    if !(1..=7).contains(&sri_target) {
        return Err(CoreError::ValidationError(format!(
            "sri_target {sri_target} is out of range (1-7)"
        )));
    }
    if !(tolerance.is_finite() && (0.0..=3.0).contains(&tolerance)) {
        return Err(CoreError::ValidationError(format!(
            "tolerance {tolerance} is out of range (0-3)"
        )));
    }
    Ok(())
}
