use crate::models::fund::{Fund, FundMetrics, Priority};
use crate::models::trunk::{ConsensusLevel, FundCompositeScore};
use crate::models::view::ViewMode;

/// A single optional field as the renderer sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayState<T> {
    Present(T),
    Unavailable,
}

impl<T> DisplayState<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, DisplayState::Present(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            DisplayState::Present(v) => Some(v),
            DisplayState::Unavailable => None,
        }
    }
}

impl<T> From<Option<T>> for DisplayState<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => DisplayState::Present(v),
            None => DisplayState::Unavailable,
        }
    }
}

impl DisplayState<f64> {
    /// Treats NaN and infinities as missing.
    fn finite(value: Option<f64>) -> Self {
        value.filter(|v| v.is_finite()).into()
    }
}

/// Podium highlight derived from list position alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightTier {
    Gold,
    Silver,
    Bronze,
    NoHighlight,
}

impl HighlightTier {
    pub fn for_rank(rank: usize) -> Self {
        match rank {
            1 => HighlightTier::Gold,
            2 => HighlightTier::Silver,
            3 => HighlightTier::Bronze,
            _ => HighlightTier::NoHighlight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PerformanceField {
    OneWeek,
    OneMonth,
    OneYear,
    ThreeYears,
    Volatility,
}

impl PerformanceField {
    const SIMPLE: [PerformanceField; 2] = [PerformanceField::OneMonth, PerformanceField::OneYear];
    const ADVANCED: [PerformanceField; 5] = [
        PerformanceField::OneWeek,
        PerformanceField::OneMonth,
        PerformanceField::OneYear,
        PerformanceField::ThreeYears,
        PerformanceField::Volatility,
    ];

    /// Fields shown for a display density, in display order.
    pub fn visible_in(mode: ViewMode) -> &'static [PerformanceField] {
        match mode {
            ViewMode::Simple => &Self::SIMPLE,
            ViewMode::Advanced => &Self::ADVANCED,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PerformanceField::OneWeek => "1W",
            PerformanceField::OneMonth => "1M",
            PerformanceField::OneYear => "1Y",
            PerformanceField::ThreeYears => "3Y",
            PerformanceField::Volatility => "Vol 60d",
        }
    }

    fn read(&self, metrics: &FundMetrics) -> Option<f64> {
        match self {
            PerformanceField::OneWeek => metrics.perf_1w,
            PerformanceField::OneMonth => metrics.perf_1m,
            PerformanceField::OneYear => metrics.perf_1y,
            PerformanceField::ThreeYears => metrics.perf_3y,
            PerformanceField::Volatility => metrics.vol_60d,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Performance {
    Fields(Vec<(PerformanceField, DisplayState<f64>)>),
    /// Every selected field was missing
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubScoreKind {
    Quality,
    Valuation,
    Stability,
}

impl SubScoreKind {
    pub const ALL: [SubScoreKind; 3] = [
        SubScoreKind::Quality,
        SubScoreKind::Valuation,
        SubScoreKind::Stability,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SubScoreKind::Quality => "Quality",
            SubScoreKind::Valuation => "Valuation",
            SubScoreKind::Stability => "Stability",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBar {
    pub kind: SubScoreKind,
    /// Clamped to 0–100
    pub value: DisplayState<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubScores {
    /// Always quality, valuation, stability, in that order
    Bars([ScoreBar; 3]),
    /// The provider supplied none of the three
    ProviderUnavailable,
}

/// Fields hidden behind the detail toggle in simple mode.
#[derive(Debug, Clone, PartialEq)]
pub struct SecondaryFields {
    pub sharpe_ratio: DisplayState<f64>,
    pub sortino_ratio: DisplayState<f64>,
    pub max_drawdown: DisplayState<f64>,
    pub confidence: DisplayState<f64>,
    pub reasoning: DisplayState<String>,
    pub management_company: DisplayState<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailSection {
    /// Simple mode, toggle closed
    Collapsed,
    /// Simple mode, toggle open
    Expanded(SecondaryFields),
    /// Advanced mode: always shown, no toggle
    Inline(SecondaryFields),
}

impl DetailSection {
    pub fn has_toggle(&self) -> bool {
        !matches!(self, DetailSection::Inline(_))
    }

    pub fn fields(&self) -> Option<&SecondaryFields> {
        match self {
            DetailSection::Collapsed => None,
            DetailSection::Expanded(fields) | DetailSection::Inline(fields) => Some(fields),
        }
    }
}

/// Everything a fund card needs to render, with every gap made explicit.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationDescriptor {
    pub rank: usize,
    pub tier: HighlightTier,
    pub isin: String,
    pub name: String,
    pub sri: u8,
    pub asset_class: String,
    pub asset_class_label: String,
    pub priority: DisplayState<Priority>,
    pub fundamental_score: DisplayState<f64>,
    pub performance: Performance,
    pub sub_scores: SubScores,
    pub details: DetailSection,
}

/// Build a fund card with the detail toggle collapsed.
pub fn present(fund: &Fund, rank: usize, mode: ViewMode) -> PresentationDescriptor {
    present_with_details(fund, rank, mode, false)
}

/// Build a fund card. `expanded` only matters in simple mode.
pub fn present_with_details(
    fund: &Fund,
    rank: usize,
    mode: ViewMode,
    expanded: bool,
) -> PresentationDescriptor {
    let details = match mode {
        ViewMode::Advanced => DetailSection::Inline(secondary_fields(fund)),
        ViewMode::Simple if expanded => DetailSection::Expanded(secondary_fields(fund)),
        ViewMode::Simple => DetailSection::Collapsed,
    };

    PresentationDescriptor {
        rank,
        tier: HighlightTier::for_rank(rank),
        isin: fund.isin.clone(),
        name: fund.name.clone(),
        sri: fund.sri,
        asset_class: fund.asset_class.clone(),
        asset_class_label: asset_class_label(&fund.asset_class),
        priority: fund.priority.into(),
        fundamental_score: DisplayState::finite(fund.fundamental_score).map_present(clamp_score),
        performance: performance(fund.metrics.as_ref(), mode),
        sub_scores: sub_scores(fund),
        details,
    }
}

fn performance(metrics: Option<&FundMetrics>, mode: ViewMode) -> Performance {
    let Some(metrics) = metrics else {
        return Performance::Unavailable;
    };
    let fields: Vec<(PerformanceField, DisplayState<f64>)> = PerformanceField::visible_in(mode)
        .iter()
        .map(|field| (*field, DisplayState::finite(field.read(metrics))))
        .collect();

    if fields.iter().all(|(_, v)| !v.is_present()) {
        Performance::Unavailable
    } else {
        Performance::Fields(fields)
    }
}

fn sub_scores(fund: &Fund) -> SubScores {
    if fund.sub_scores_missing() {
        return SubScores::ProviderUnavailable;
    }
    SubScores::Bars(SubScoreKind::ALL.map(|kind| {
        let raw = match kind {
            SubScoreKind::Quality => fund.quality_score,
            SubScoreKind::Valuation => fund.valuation_score,
            SubScoreKind::Stability => fund.stability_score,
        };
        ScoreBar {
            kind,
            value: DisplayState::finite(raw).map_present(clamp_score),
        }
    }))
}

fn secondary_fields(fund: &Fund) -> SecondaryFields {
    let metrics = fund.metrics.as_ref();
    SecondaryFields {
        sharpe_ratio: DisplayState::finite(metrics.and_then(|m| m.sharpe_ratio)),
        sortino_ratio: DisplayState::finite(metrics.and_then(|m| m.sortino_ratio)),
        max_drawdown: DisplayState::finite(metrics.and_then(|m| m.max_drawdown)),
        confidence: DisplayState::finite(fund.confidence).map_present(|c| c.clamp(0.0, 1.0)),
        reasoning: non_blank(fund.reasoning.as_deref()),
        management_company: non_blank(fund.management_company.as_deref()),
    }
}

// ── Composite score breakdown ───────────────────────────────────────

/// One brain's contribution to a composite score.
#[derive(Debug, Clone, PartialEq)]
pub struct BrainScoreRow {
    pub brain_id: String,
    pub score: DisplayState<f64>,
    pub confidence: DisplayState<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeBreakdown {
    pub fund_id: String,
    pub score: DisplayState<f64>,
    pub consensus: ConsensusLevel,
    pub sri: u8,
    /// Ordered by brain id.
    pub brains: Vec<BrainScoreRow>,
}

/// Render a composite score with the same clamping rules as fund cards.
pub fn present_composite(composite: &FundCompositeScore) -> CompositeBreakdown {
    let brains = composite
        .brain_rows()
        .into_iter()
        .map(|(id, score, confidence)| BrainScoreRow {
            brain_id: id.to_string(),
            score: DisplayState::finite(Some(score)).map_present(clamp_score),
            confidence: DisplayState::finite(confidence).map_present(|c| c.clamp(0.0, 1.0)),
        })
        .collect();
    CompositeBreakdown {
        fund_id: composite.fund_id.clone(),
        score: DisplayState::finite(Some(composite.score_composite)).map_present(clamp_score),
        consensus: composite.consensus_level,
        sri: composite.sri,
        brains,
    }
}

impl<T> DisplayState<T> {
    fn map_present<U>(self, f: impl FnOnce(T) -> U) -> DisplayState<U> {
        match self {
            DisplayState::Present(v) => DisplayState::Present(f(v)),
            DisplayState::Unavailable => DisplayState::Unavailable,
        }
    }
}

fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

fn non_blank(text: Option<&str>) -> DisplayState<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .into()
}

/// Human label for the service's asset-class keys. Unknown keys are shown
/// capitalised as-is.
pub fn asset_class_label(asset_class: &str) -> String {
    let label = match asset_class {
        "actions" => "Actions",
        "obligations" => "Obligations",
        "diversifie" => "Diversifié",
        "immobilier" => "Immobilier",
        "monetaire" => "Monétaire",
        "fonds_euros" => "Fonds euros",
        "autres" => "Autres",
        other => {
            let mut chars = other.chars();
            return match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>().replace('_', " "),
                None => "Autres".to_string(),
            };
        }
    };
    label.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_keeps_scores_in_range() {
        assert_eq!(clamp_score(-4.0), 0.0);
        assert_eq!(clamp_score(142.0), 100.0);
        assert_eq!(clamp_score(57.5), 57.5);
    }

    #[test]
    fn non_finite_values_are_unavailable() {
        assert_eq!(DisplayState::finite(Some(f64::NAN)), DisplayState::Unavailable);
        assert_eq!(DisplayState::finite(Some(f64::INFINITY)), DisplayState::Unavailable);
        assert_eq!(DisplayState::finite(Some(1.5)), DisplayState::Present(1.5));
    }

    #[test]
    fn blank_text_is_unavailable() {
        assert_eq!(non_blank(Some("   ")), DisplayState::Unavailable);
        assert_eq!(non_blank(Some(" Amundi ")), DisplayState::Present("Amundi".to_string()));
    }
}
