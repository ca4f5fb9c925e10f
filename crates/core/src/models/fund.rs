use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Investment horizon bucket chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Horizon {
    /// 0–3 years
    Short,
    /// 3–7 years
    #[default]
    Medium,
    /// 7+ years
    Long,
}

impl Horizon {
    /// Wire value, as used in query strings and request bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Horizon::Short => "short",
            Horizon::Medium => "medium",
            Horizon::Long => "long",
        }
    }
}

impl std::fmt::Display for Horizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority tag attached to a fund by the scoring service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// Performance and risk metrics computed by the service from NAV history.
/// Every value is individually optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundMetrics {
    #[serde(default)]
    pub perf_1w: Option<f64>,
    #[serde(default)]
    pub perf_1m: Option<f64>,
    #[serde(default)]
    pub perf_3m: Option<f64>,
    #[serde(default)]
    pub perf_1y: Option<f64>,
    #[serde(default)]
    pub perf_3y: Option<f64>,
    #[serde(default)]
    pub perf_5y: Option<f64>,
    /// 60-day annualized volatility, in percent
    #[serde(default)]
    pub vol_60d: Option<f64>,
    #[serde(default)]
    pub max_drawdown: Option<f64>,
    #[serde(default)]
    pub sharpe_ratio: Option<f64>,
    #[serde(default)]
    pub sortino_ratio: Option<f64>,
    #[serde(default)]
    pub alpha: Option<f64>,
    #[serde(default)]
    pub beta: Option<f64>,
}

/// Immutable snapshot of a fund as returned by the fund service.
///
/// Funds are identified by ISIN. The client never mutates or re-sorts them;
/// list order is the ranking computed remotely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fund {
    pub isin: String,
    pub name: String,
    #[serde(default)]
    pub management_company: Option<String>,
    /// Synthetic risk indicator, 1 (lowest) to 7 (highest)
    pub sri: u8,
    /// Enum-like string such as "actions" or "obligations"
    pub asset_class: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub available_platforms: Vec<String>,
    #[serde(default = "default_standard_isin")]
    pub is_standard_isin: bool,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub metrics: Option<FundMetrics>,
    /// Composite 0–100 quality score
    #[serde(default)]
    pub fundamental_score: Option<f64>,
    #[serde(default)]
    pub top_week_score: Option<f64>,
    #[serde(default)]
    pub priority: Option<Priority>,
    /// 0.0–1.0
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub quality_score: Option<f64>,
    #[serde(default)]
    pub valuation_score: Option<f64>,
    #[serde(default)]
    pub stability_score: Option<f64>,
    #[serde(default)]
    pub consensus_level: Option<String>,
}

fn default_standard_isin() -> bool {
    true
}

impl Fund {
    /// Minimal fund with only the required fields set.
    pub fn new(
        isin: impl Into<String>,
        name: impl Into<String>,
        sri: u8,
        asset_class: impl Into<String>,
    ) -> Self {
        Self {
            isin: isin.into(),
            name: name.into(),
            management_company: None,
            sri,
            asset_class: asset_class.into(),
            description: None,
            available_platforms: Vec::new(),
            is_standard_isin: true,
            label: None,
            metrics: None,
            fundamental_score: None,
            top_week_score: None,
            priority: None,
            confidence: None,
            reasoning: None,
            quality_score: None,
            valuation_score: None,
            stability_score: None,
            consensus_level: None,
        }
    }

    /// True when the provider supplied no usable sub-score: each of the three
    /// is absent or non-finite.
    pub fn sub_scores_missing(&self) -> bool {
        [self.quality_score, self.valuation_score, self.stability_score]
            .iter()
            .all(|score| !score.is_some_and(f64::is_finite))
    }
}

/// One page of the full fund catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundPage {
    pub funds: Vec<Fund>,
    pub total: usize,
    pub page: u32,
    pub page_size: u32,
}

/// Filters for browsing the fund catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundQuery {
    pub page: u32,
    pub page_size: u32,
    pub asset_class: Option<String>,
    pub min_sri: Option<u8>,
    pub max_sri: Option<u8>,
    pub search: Option<String>,
}

impl Default for FundQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 50,
            asset_class: None,
            min_sri: None,
            max_sri: None,
            search: None,
        }
    }
}

impl FundQuery {
    /// Reject filters the service would refuse anyway.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.page == 0 {
            return Err(CoreError::ValidationError("page must be at least 1".into()));
        }
        if !(1..=100).contains(&self.page_size) {
            return Err(CoreError::ValidationError(format!(
                "page_size {} is out of range (1-100)",
                self.page_size
            )));
        }
        for (name, sri) in [("min_sri", self.min_sri), ("max_sri", self.max_sri)] {
            if let Some(value) = sri {
                if !(1..=7).contains(&value) {
                    return Err(CoreError::ValidationError(format!(
                        "{name} {value} is out of range (1-7)"
                    )));
                }
            }
        }
        if let (Some(min), Some(max)) = (self.min_sri, self.max_sri) {
            if min > max {
                return Err(CoreError::ValidationError(format!(
                    "min_sri ({min}) must not exceed max_sri ({max})"
                )));
            }
        }
        Ok(())
    }

    /// Query-string pairs, omitting unset filters.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
        ];
        if let Some(class) = &self.asset_class {
            pairs.push(("asset_class", class.clone()));
        }
        if let Some(min) = self.min_sri {
            pairs.push(("min_sri", min.to_string()));
        }
        if let Some(max) = self.max_sri {
            pairs.push(("max_sri", max.to_string()));
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        pairs
    }
}

/// Response of the service health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}
