use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate statistics about the fund database, fetched once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundStats {
    pub total_funds: usize,
    pub standard_isin_funds: usize,
    pub special_funds: usize,
    /// SRI level → number of funds
    pub sri_distribution: BTreeMap<u8, usize>,
    /// Asset class → number of funds
    pub asset_class_distribution: BTreeMap<String, usize>,
    /// Distribution platform → number of funds (ten largest)
    #[serde(default)]
    pub top_platforms: BTreeMap<String, usize>,
}

impl FundStats {
    /// Number of funds at a given SRI level (0 when the level is absent).
    pub fn funds_at_sri(&self, sri: u8) -> usize {
        self.sri_distribution.get(&sri).copied().unwrap_or(0)
    }

    /// Asset classes ordered by fund count, largest first.
    pub fn asset_classes_by_size(&self) -> Vec<(&str, usize)> {
        let mut classes: Vec<(&str, usize)> = self
            .asset_class_distribution
            .iter()
            .map(|(class, count)| (class.as_str(), *count))
            .collect();
        classes.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        classes
    }
}
