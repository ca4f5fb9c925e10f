// ═══════════════════════════════════════════════════════════════════
// Shared test helpers: fixture funds and a counting mock FundService
// ═══════════════════════════════════════════════════════════════════

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use min_trade_core::errors::CoreError;
use min_trade_core::models::fund::{Fund, FundMetrics, FundPage, FundQuery, HealthStatus, Horizon, Priority};
use min_trade_core::models::portfolio::{FundAllocation, PortfolioRequest, PortfolioSuggestion};
use min_trade_core::models::stats::FundStats;
use min_trade_core::models::trunk::{
    BrainHorizon, BrainRegistryItem, BrainRole, BrainType, ConsensusLevel, Contradiction,
    ContradictionReport, FundCompositeScore, TrunkRankingEntry, TrunkRankingQuery, TrunkStats,
};
use min_trade_core::providers::traits::FundService;

// ── Fixtures ────────────────────────────────────────────────────────

pub fn fund(isin: &str, name: &str) -> Fund {
    Fund::new(isin, name, 4, "actions")
}

/// A fund with every optional field populated.
pub fn full_fund(isin: &str, name: &str) -> Fund {
    let mut f = Fund::new(isin, name, 5, "actions");
    f.management_company = Some("Amundi".into());
    f.metrics = Some(FundMetrics {
        perf_1w: Some(1.2),
        perf_1m: Some(3.4),
        perf_3m: Some(5.0),
        perf_1y: Some(12.5),
        perf_3y: Some(28.0),
        perf_5y: None,
        vol_60d: Some(14.2),
        max_drawdown: Some(-18.3),
        sharpe_ratio: Some(0.9),
        sortino_ratio: Some(1.3),
        alpha: None,
        beta: None,
    });
    f.fundamental_score = Some(78.0);
    f.priority = Some(Priority::High);
    f.confidence = Some(0.87);
    f.reasoning = Some("Performance solide, volatilité maîtrisée".into());
    f.quality_score = Some(81.0);
    f.valuation_score = Some(64.0);
    f.stability_score = Some(72.0);
    f
}

pub fn funds(prefix: &str, n: usize) -> Vec<Fund> {
    (1..=n)
        .map(|i| full_fund(&format!("{prefix}{i:04}"), &format!("Fund {prefix} {i}")))
        .collect()
}

pub fn sample_stats() -> FundStats {
    FundStats {
        total_funds: 2916,
        standard_isin_funds: 2800,
        special_funds: 116,
        sri_distribution: BTreeMap::from([(1, 40), (4, 1200), (6, 300)]),
        asset_class_distribution: BTreeMap::from([
            ("actions".to_string(), 1500),
            ("obligations".to_string(), 900),
        ]),
        top_platforms: BTreeMap::new(),
    }
}

pub fn allocation(fund: Fund, percent: f64, total: f64) -> FundAllocation {
    FundAllocation {
        fund,
        allocation_percent: percent,
        amount_eur: total * percent / 100.0,
    }
}

/// Three funds at 60 / 25 / 15 percent of 50 000 EUR.
pub fn sample_suggestion() -> PortfolioSuggestion {
    let total = 50_000.0;
    let mut bond = full_fund("FR0000000002", "Oblig Euro");
    bond.asset_class = "obligations".into();
    bond.sri = 3;
    PortfolioSuggestion {
        allocations: vec![
            allocation(full_fund("FR0000000001", "Actions Monde"), 60.0, total),
            allocation(bond, 25.0, total),
            allocation(fund("FR0000000003", "Actions Europe"), 15.0, total),
        ],
        total_amount: total,
        average_sri: 4.35,
        num_funds: 3,
        asset_class_distribution: BTreeMap::from([
            ("actions".to_string(), 75.0),
            ("obligations".to_string(), 25.0),
        ]),
        explanation: "Portefeuille dynamique orienté actions.".into(),
        average_confidence: Some(0.85),
        consensus_summary: Some("2 fonds priorite haute, 0 moyenne, 0 basse".into()),
    }
}

/// Composite ranking over `n` funds, scores falling by five from 95.
pub fn trunk_ranking(n: usize) -> Vec<TrunkRankingEntry> {
    (1..=n)
        .map(|i| TrunkRankingEntry {
            fund_id: format!("TR{i:04}"),
            score_composite: 100.0 - 5.0 * i as f64,
            sri: (i % 7 + 1) as u8,
            rank: i as u32,
        })
        .collect()
}

pub fn sample_brains() -> Vec<BrainRegistryItem> {
    vec![
        BrainRegistryItem {
            brain_id: "fundamental_v1".into(),
            label: "Cerveau Fondamental".into(),
            brain_type: BrainType::Fundamental,
            version: "1.0.0".into(),
            role: BrainRole::Core,
            horizon: BrainHorizon::MediumTerm,
            default_weight: 0.6,
            is_active: true,
            description: None,
        },
        BrainRegistryItem {
            brain_id: "quant_v0".into(),
            label: "Cerveau Quant".into(),
            brain_type: BrainType::Quant,
            version: "0.3.0".into(),
            role: BrainRole::Experimental,
            horizon: BrainHorizon::ShortTerm,
            default_weight: 0.4,
            is_active: false,
            description: Some("momentum".into()),
        },
    ]
}

pub fn sample_composite(fund_id: &str) -> FundCompositeScore {
    FundCompositeScore {
        fund_id: fund_id.into(),
        score_composite: 71.5,
        scores_by_brain: BTreeMap::from([
            ("fundamental_v1".to_string(), 78.0),
            ("quant_v0".to_string(), 61.0),
        ]),
        confidences_by_brain: BTreeMap::from([("fundamental_v1".to_string(), 0.9)]),
        consensus_sigma: 12.0,
        consensus_level: ConsensusLevel::Moderate,
        sri: 4,
    }
}

pub fn sample_trunk_stats() -> TrunkStats {
    TrunkStats {
        total_funds: 120,
        active_brains: vec!["fundamental_v1".into()],
        brain_weights: BTreeMap::from([("fundamental_v1".to_string(), 1.0)]),
        consensus_distribution: BTreeMap::from([
            (ConsensusLevel::Strong, 100),
            (ConsensusLevel::Moderate, 20),
        ]),
        contradiction_count: 1,
        timestamp: "2026-10-16T08:00:00".into(),
    }
}

pub fn sample_contradictions() -> ContradictionReport {
    ContradictionReport {
        count: 1,
        contradictions: vec![Contradiction {
            fund_id: "TR0003".into(),
            brain_1: "fundamental_v1".into(),
            brain_2: "quant_v0".into(),
            score_1: 82.0,
            score_2: 40.0,
            score_diff: 42.0,
            timestamp: "2026-10-16T08:00:00".into(),
        }],
    }
}

// ── Mock service ────────────────────────────────────────────────────

/// Call counters and failure switches shared between a test and its mock.
#[derive(Default)]
pub struct Calls {
    pub top_week: AtomicUsize,
    pub ranking: AtomicUsize,
    pub stats: AtomicUsize,
    pub suggest: AtomicUsize,
    pub list: AtomicUsize,
    pub get_fund: AtomicUsize,
    pub health: AtomicUsize,
    pub trunk: AtomicUsize,
    pub fail_top_week: AtomicBool,
    pub fail_ranking: AtomicBool,
    pub fail_stats: AtomicBool,
    pub fail_suggest: AtomicBool,
    pub fail_trunk: AtomicBool,
    pub suggest_requests: Mutex<Vec<PortfolioRequest>>,
    pub ranking_requests: Mutex<Vec<(u8, Horizon, u32)>>,
    pub top_week_limits: Mutex<Vec<u32>>,
    pub allocation_bands: Mutex<Vec<(u8, f64)>>,
}

impl Calls {
    pub fn total(&self) -> usize {
        [
            &self.top_week,
            &self.ranking,
            &self.stats,
            &self.suggest,
            &self.list,
            &self.get_fund,
            &self.health,
            &self.trunk,
        ]
        .iter()
        .map(|c| c.load(Ordering::SeqCst))
        .sum()
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn set(flag: &AtomicBool, value: bool) {
        flag.store(value, Ordering::SeqCst);
    }
}

pub struct MockFundService {
    pub calls: Arc<Calls>,
    pub top_week: Vec<Fund>,
    pub ranking: Vec<Fund>,
    pub catalogue: Vec<Fund>,
    pub suggestion: PortfolioSuggestion,
    pub trunk_ranking: Vec<TrunkRankingEntry>,
    pub brains: Vec<BrainRegistryItem>,
}

impl MockFundService {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Calls::default()),
            top_week: funds("TW", 5),
            ranking: funds("FR", 8),
            catalogue: funds("CA", 12),
            suggestion: sample_suggestion(),
            trunk_ranking: trunk_ranking(10),
            brains: sample_brains(),
        }
    }

    pub fn calls(&self) -> Arc<Calls> {
        Arc::clone(&self.calls)
    }

    fn trunk_call(&self) -> Result<(), CoreError> {
        self.calls.trunk.fetch_add(1, Ordering::SeqCst);
        if self.calls.fail_trunk.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        Ok(())
    }
}

fn server_error() -> CoreError {
    CoreError::Server {
        status: 500,
        message: "Internal Server Error".into(),
    }
}

#[async_trait]
impl FundService for MockFundService {
    fn name(&self) -> &str {
        "MockFundService"
    }

    async fn get_top_of_week(&self, limit: u32) -> Result<Vec<Fund>, CoreError> {
        self.calls.top_week.fetch_add(1, Ordering::SeqCst);
        self.calls.top_week_limits.lock().unwrap().push(limit);
        if self.calls.fail_top_week.load(Ordering::SeqCst) {
            return Err(CoreError::Network("connection refused".into()));
        }
        Ok(self.top_week.iter().take(limit as usize).cloned().collect())
    }

    async fn get_fundamental_ranking(
        &self,
        target_sri: u8,
        horizon: Horizon,
        limit: u32,
    ) -> Result<Vec<Fund>, CoreError> {
        self.calls.ranking.fetch_add(1, Ordering::SeqCst);
        self.calls
            .ranking_requests
            .lock()
            .unwrap()
            .push((target_sri, horizon, limit));
        if self.calls.fail_ranking.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        Ok(self.ranking.iter().take(limit as usize).cloned().collect())
    }

    async fn get_stats(&self) -> Result<FundStats, CoreError> {
        self.calls.stats.fetch_add(1, Ordering::SeqCst);
        if self.calls.fail_stats.load(Ordering::SeqCst) {
            return Err(CoreError::MalformedResponse("missing field `total_funds`".into()));
        }
        Ok(sample_stats())
    }

    async fn suggest_portfolio(
        &self,
        request: &PortfolioRequest,
    ) -> Result<PortfolioSuggestion, CoreError> {
        self.calls.suggest.fetch_add(1, Ordering::SeqCst);
        self.calls.suggest_requests.lock().unwrap().push(request.clone());
        if self.calls.fail_suggest.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        Ok(self.suggestion.clone())
    }

    async fn list_funds(&self, query: &FundQuery) -> Result<FundPage, CoreError> {
        self.calls.list.fetch_add(1, Ordering::SeqCst);
        let start = ((query.page - 1) * query.page_size) as usize;
        let funds: Vec<Fund> = self
            .catalogue
            .iter()
            .skip(start)
            .take(query.page_size as usize)
            .cloned()
            .collect();
        Ok(FundPage {
            funds,
            total: self.catalogue.len(),
            page: query.page,
            page_size: query.page_size,
        })
    }

    async fn get_fund(&self, isin: &str) -> Result<Fund, CoreError> {
        self.calls.get_fund.fetch_add(1, Ordering::SeqCst);
        self.catalogue
            .iter()
            .find(|f| f.isin == isin)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(isin.to_string()))
    }

    async fn health_check(&self) -> Result<HealthStatus, CoreError> {
        self.calls.health.fetch_add(1, Ordering::SeqCst);
        Ok(HealthStatus { status: "ok".into() })
    }

    async fn get_trunk_ranking(
        &self,
        query: &TrunkRankingQuery,
    ) -> Result<Vec<TrunkRankingEntry>, CoreError> {
        self.trunk_call()?;
        query.validate()?;
        let min = query.min_score.unwrap_or(0.0);
        Ok(self
            .trunk_ranking
            .iter()
            .filter(|e| e.score_composite >= min)
            .take(query.top_n as usize)
            .cloned()
            .collect())
    }

    async fn get_funds_for_allocation(
        &self,
        sri_target: u8,
        tolerance: f64,
    ) -> Result<Vec<TrunkRankingEntry>, CoreError> {
        self.trunk_call()?;
        self.calls
            .allocation_bands
            .lock()
            .unwrap()
            .push((sri_target, tolerance));
        Ok(self
            .trunk_ranking
            .iter()
            .filter(|e| (f64::from(e.sri) - f64::from(sri_target)).abs() <= tolerance)
            .cloned()
            .collect())
    }

    async fn list_brains(&self, active_only: bool) -> Result<Vec<BrainRegistryItem>, CoreError> {
        self.trunk_call()?;
        Ok(self
            .brains
            .iter()
            .filter(|b| !active_only || b.is_active)
            .cloned()
            .collect())
    }

    async fn get_trunk_stats(&self) -> Result<TrunkStats, CoreError> {
        self.trunk_call()?;
        Ok(sample_trunk_stats())
    }

    async fn get_composite_score(&self, fund_id: &str) -> Result<FundCompositeScore, CoreError> {
        self.trunk_call()?;
        if self.trunk_ranking.iter().any(|e| e.fund_id == fund_id) {
            Ok(sample_composite(fund_id))
        } else {
            Err(CoreError::NotFound(fund_id.to_string()))
        }
    }

    async fn get_contradictions(&self) -> Result<ContradictionReport, CoreError> {
        self.trunk_call()?;
        Ok(sample_contradictions())
    }
}
