use crate::models::portfolio::PortfolioSuggestion;
use crate::models::view::ViewMode;
use crate::services::presentation::{
    asset_class_label, present, DisplayState, PresentationDescriptor,
};

/// Allowed drift of allocation percentages from 100.
pub const ALLOCATION_TOLERANCE: f64 = 0.1;

/// The four headline figures above the allocation list.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTiles {
    pub total_amount: f64,
    pub fund_count: usize,
    pub average_sri: f64,
    pub asset_class_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistributionBadge {
    pub asset_class: String,
    pub label: String,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExplanationBlock {
    pub text: String,
    pub average_confidence: DisplayState<f64>,
    pub consensus_summary: DisplayState<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationRow {
    pub fund: PresentationDescriptor,
    pub allocation_percent: f64,
    pub amount_eur: f64,
}

/// Render-ready view of a portfolio suggestion.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioResultView {
    pub tiles: SummaryTiles,
    /// Largest share first
    pub distribution: Vec<DistributionBadge>,
    pub explanation: ExplanationBlock,
    /// In the order the service allocated them; rank = position + 1
    pub allocations: Vec<AllocationRow>,
}

impl PortfolioResultView {
    /// Pure transformation; no I/O.
    pub fn build(suggestion: &PortfolioSuggestion, mode: ViewMode) -> Self {
        let mut distribution: Vec<DistributionBadge> = suggestion
            .asset_class_distribution
            .iter()
            .map(|(class, percent)| DistributionBadge {
                asset_class: class.clone(),
                label: asset_class_label(class),
                percent: *percent,
            })
            .collect();
        distribution.sort_by(|a, b| {
            b.percent
                .partial_cmp(&a.percent)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.asset_class.cmp(&b.asset_class))
        });

        let allocations = suggestion
            .allocations
            .iter()
            .enumerate()
            .map(|(idx, alloc)| AllocationRow {
                fund: present(&alloc.fund, idx + 1, mode),
                allocation_percent: alloc.allocation_percent,
                amount_eur: alloc.amount_eur,
            })
            .collect();

        Self {
            tiles: SummaryTiles {
                total_amount: suggestion.total_amount,
                fund_count: suggestion.allocations.len(),
                average_sri: suggestion.average_sri,
                asset_class_count: suggestion.asset_class_distribution.len(),
            },
            distribution,
            explanation: ExplanationBlock {
                text: suggestion.explanation.clone(),
                average_confidence: suggestion
                    .average_confidence
                    .filter(|c| c.is_finite())
                    .into(),
                consensus_summary: suggestion
                    .consensus_summary
                    .clone()
                    .filter(|s| !s.trim().is_empty())
                    .into(),
            },
            allocations,
        }
    }

    /// Sum of the displayed allocation percentages.
    pub fn allocation_total(&self) -> f64 {
        self.allocations.iter().map(|a| a.allocation_percent).sum()
    }

    /// Whether the allocations add up to 100 within [`ALLOCATION_TOLERANCE`].
    pub fn is_balanced(&self) -> bool {
        (self.allocation_total() - 100.0).abs() <= ALLOCATION_TOLERANCE
    }
}
