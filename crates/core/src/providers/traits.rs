use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::fund::{Fund, FundPage, FundQuery, HealthStatus, Horizon};
use crate::models::portfolio::{PortfolioRequest, PortfolioSuggestion};
use crate::models::stats::FundStats;
use crate::models::trunk::{
    BrainRegistryItem, ContradictionReport, FundCompositeScore, TrunkRankingEntry,
    TrunkRankingQuery, TrunkStats,
};

/// Contract of the remote fund service.
///
/// Rankings and portfolio optimisation are computed remotely; implementations
/// only transport requests and decode responses. Tests and alternative
/// transports implement this trait instead of talking HTTP.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait FundService: Send + Sync {
    /// Human-readable name of this service (for logs/errors).
    fn name(&self) -> &str;

    /// Funds ranked by risk-adjusted weekly performance, best first.
    async fn get_top_of_week(&self, limit: u32) -> Result<Vec<Fund>, CoreError>;

    /// Funds ranked by fundamental score for a given risk profile, best first.
    async fn get_fundamental_ranking(
        &self,
        target_sri: u8,
        horizon: Horizon,
        limit: u32,
    ) -> Result<Vec<Fund>, CoreError>;

    /// Aggregate statistics about the fund database.
    async fn get_stats(&self) -> Result<FundStats, CoreError>;

    /// Ask the service to build a portfolio for the given constraints.
    async fn suggest_portfolio(
        &self,
        request: &PortfolioRequest,
    ) -> Result<PortfolioSuggestion, CoreError>;

    /// Browse the full catalogue, one page at a time.
    async fn list_funds(&self, query: &FundQuery) -> Result<FundPage, CoreError>;

    /// A single fund by ISIN. Unknown ISINs yield `CoreError::NotFound`.
    async fn get_fund(&self, isin: &str) -> Result<Fund, CoreError>;

    /// Liveness check.
    async fn health_check(&self) -> Result<HealthStatus, CoreError>;

    // ── Composite scoring (read-only) ──

    /// Funds ordered by composite score, best first.
    async fn get_trunk_ranking(
        &self,
        query: &TrunkRankingQuery,
    ) -> Result<Vec<TrunkRankingEntry>, CoreError>;

    /// Ranked funds whose SRI lies within `tolerance` of `sri_target`.
    async fn get_funds_for_allocation(
        &self,
        sri_target: u8,
        tolerance: f64,
    ) -> Result<Vec<TrunkRankingEntry>, CoreError>;

    /// Registered scoring brains, optionally only the active ones.
    async fn list_brains(&self, active_only: bool) -> Result<Vec<BrainRegistryItem>, CoreError>;

    async fn get_trunk_stats(&self) -> Result<TrunkStats, CoreError>;

    /// Composite breakdown for one fund. Unknown ids yield `CoreError::NotFound`.
    async fn get_composite_score(&self, fund_id: &str) -> Result<FundCompositeScore, CoreError>;

    /// Pairs of confident brains that disagree on a fund.
    async fn get_contradictions(&self) -> Result<ContradictionReport, CoreError>;
}
