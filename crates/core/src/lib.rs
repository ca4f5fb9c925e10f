pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use std::collections::HashSet;

use models::{
    fetch::FetchState,
    fund::{Fund, FundPage, FundQuery, HealthStatus},
    portfolio::PortfolioSuggestion,
    settings::ClientSettings,
    stats::FundStats,
    trunk::{
        BrainRegistryItem, ContradictionReport, TrunkRankingEntry, TrunkRankingQuery, TrunkStats,
    },
    view::ViewMode,
};
use providers::{http::HttpFundService, traits::FundService};
use services::{
    fetch_slot::FetchSlot,
    portfolio_result::PortfolioResultView,
    presentation::{present_composite, present_with_details, CompositeBreakdown, PresentationDescriptor},
    ranked_list::{RankedListController, RankedListKind},
    view_preference::{ListenerId, ViewPreferenceStore},
    wizard::{WizardController, WizardPhase},
};

use errors::CoreError;

/// How a facade-driven wizard submission ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The suggestion is available through [`FundAdvisor::portfolio_result`]
    /// and the wizard has been closed.
    Completed,
    /// The wizard stays open in `Failed` with this message; values are kept.
    Failed(String),
}

/// Main entry point for the Min-Trade client core.
/// Holds all request-derived state and the service used to fetch it.
#[must_use]
pub struct FundAdvisor {
    settings: ClientSettings,
    service: Box<dyn FundService>,
    view: ViewPreferenceStore,
    lists: RankedListController,
    stats: FetchSlot<FundStats>,
    wizard: Option<WizardController>,
    /// ISINs whose detail toggle is open (simple mode only)
    expanded: HashSet<String>,
    result: Option<PortfolioSuggestion>,
}

impl std::fmt::Debug for FundAdvisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FundAdvisor")
            .field("service", &self.service.name())
            .field("base_url", &self.settings.base_url)
            .field("view_mode", &self.view.get())
            .field("top_of_week", &self.lists.state(RankedListKind::TopOfWeek).status())
            .field(
                "fundamental_ranking",
                &self.lists.state(RankedListKind::FundamentalRanking).status(),
            )
            .field("stats", &self.stats.state().status())
            .field("wizard", &self.wizard.as_ref().map(|w| w.phase().name()))
            .field("has_result", &self.result.is_some())
            .finish()
    }
}

impl FundAdvisor {
    /// Create a client talking HTTP to `settings.base_url`.
    pub fn new(settings: ClientSettings) -> Result<Self, CoreError> {
        let service = HttpFundService::new(settings.clone())?;
        Self::with_service(settings, Box::new(service))
    }

    /// Create a client on top of any [`FundService`] implementation.
    pub fn with_service(
        settings: ClientSettings,
        service: Box<dyn FundService>,
    ) -> Result<Self, CoreError> {
        settings.validate()?;
        Ok(Self {
            lists: RankedListController::new(&settings),
            settings,
            service,
            view: ViewPreferenceStore::new(),
            stats: FetchSlot::new("stats"),
            wizard: None,
            expanded: HashSet::new(),
            result: None,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    // ── Startup ─────────────────────────────────────────────────────

    /// Initial load: top-of-week list and statistics, fetched concurrently.
    /// Each resolves independently; one failing leaves the other intact.
    /// Returns the number of requests issued; a second call only refetches
    /// what failed with a retryable error.
    pub async fn mount(&mut self) -> usize {
        let top = self.lists.activate(RankedListKind::TopOfWeek);
        let stats = self.stats.begin();
        let service = self.service.as_ref();

        let top_fut = async {
            match &top {
                Some(fetch) => Some(fetch.run(service).await),
                None => None,
            }
        };
        let stats_fut = async {
            match stats {
                Some(_) => Some(service.get_stats().await),
                None => None,
            }
        };
        let (top_result, stats_result) = futures::join!(top_fut, stats_fut);

        let mut issued = 0;
        if let (Some(fetch), Some(result)) = (top, top_result) {
            self.lists.resolve(fetch, result);
            issued += 1;
        }
        if let (Some(ticket), Some(result)) = (stats, stats_result) {
            self.stats.resolve(ticket, result);
            issued += 1;
        }
        issued
    }

    // ── Ranked lists ────────────────────────────────────────────────

    /// The view for `kind` became visible. Fetches on first activation and
    /// again after a retryable failure.
    /// Returns `true` if a request was sent.
    pub async fn activate_list(&mut self, kind: RankedListKind) -> bool {
        self.lists.load(self.service.as_ref(), kind).await
    }

    /// Forget a list so that its next activation refetches.
    pub fn invalidate_list(&mut self, kind: RankedListKind) {
        self.lists.invalidate(kind);
    }

    /// User-initiated retry of a failed list. Returns `true` if a request was sent.
    pub async fn retry_list(&mut self, kind: RankedListKind) -> bool {
        let Some(fetch) = self.lists.retry(kind) else {
            return false;
        };
        let result = fetch.run(self.service.as_ref()).await;
        self.lists.resolve(fetch, result);
        true
    }

    #[must_use]
    pub fn list_state(&self, kind: RankedListKind) -> &FetchState<Vec<Fund>> {
        self.lists.state(kind)
    }

    /// Fund cards for a list under the current view mode; empty unless loaded.
    #[must_use]
    pub fn present_list(&self, kind: RankedListKind) -> Vec<PresentationDescriptor> {
        self.lists.present(kind, self.view.get(), &self.expanded)
    }

    /// Direct access to the list controller, for callers driving fetches
    /// themselves (activate → run → resolve).
    pub fn lists_mut(&mut self) -> &mut RankedListController {
        &mut self.lists
    }

    // ── Statistics ──────────────────────────────────────────────────

    #[must_use]
    pub fn stats_state(&self) -> &FetchState<FundStats> {
        self.stats.state()
    }

    /// User-initiated retry of a failed statistics load.
    pub async fn retry_stats(&mut self) -> bool {
        if !self.stats.clear_error() {
            return false;
        }
        let Some(ticket) = self.stats.begin() else {
            return false;
        };
        let result = self.service.get_stats().await;
        self.stats.resolve(ticket, result);
        true
    }

    // ── View density ────────────────────────────────────────────────

    #[must_use]
    pub fn view_mode(&self) -> ViewMode {
        self.view.get()
    }

    /// Returns `true` if the mode changed. Never triggers a fetch.
    pub fn set_view_mode(&mut self, mode: ViewMode) -> bool {
        self.view.set(mode)
    }

    pub fn toggle_view_mode(&mut self) -> ViewMode {
        self.view.toggle()
    }

    pub fn subscribe_view_mode(
        &mut self,
        listener: impl Fn(ViewMode) + Send + Sync + 'static,
    ) -> ListenerId {
        self.view.subscribe(listener)
    }

    pub fn unsubscribe_view_mode(&mut self, id: ListenerId) -> bool {
        self.view.unsubscribe(id)
    }

    /// Open or close the detail section of one fund card (simple mode).
    /// Returns the new state.
    pub fn toggle_details(&mut self, isin: &str) -> bool {
        if self.expanded.remove(isin) {
            false
        } else {
            self.expanded.insert(isin.to_string());
            true
        }
    }

    #[must_use]
    pub fn is_expanded(&self, isin: &str) -> bool {
        self.expanded.contains(isin)
    }

    // ── Portfolio wizard ────────────────────────────────────────────

    /// Start a fresh wizard, discarding any previous one.
    pub fn open_wizard(&mut self) -> &mut WizardController {
        self.wizard.insert(WizardController::new())
    }

    #[must_use]
    pub fn wizard(&self) -> Option<&WizardController> {
        self.wizard.as_ref()
    }

    pub fn wizard_mut(&mut self) -> Option<&mut WizardController> {
        self.wizard.as_mut()
    }

    /// Dismiss the wizard. Any in-flight submission result is dropped.
    pub fn close_wizard(&mut self) {
        if let Some(wizard) = self.wizard.as_mut() {
            wizard.cancel();
        }
        self.wizard = None;
    }

    /// Submit the open wizard and wait for the service.
    ///
    /// On success the suggestion is stored for [`portfolio_result`](Self::portfolio_result)
    /// and the wizard is closed. On failure the wizard stays in `Failed`
    /// and can be resubmitted.
    pub async fn submit_wizard(&mut self) -> Result<SubmitOutcome, CoreError> {
        let wizard = self
            .wizard
            .as_mut()
            .ok_or_else(|| CoreError::InvalidTransition {
                state: "Closed".into(),
                action: "submit".into(),
            })?;

        let submission = wizard.submit()?;
        let result = submission.run(self.service.as_ref()).await;
        wizard.resolve(&submission, result);

        let outcome = match wizard.phase() {
            WizardPhase::Failed { message } => SubmitOutcome::Failed(message.clone()),
            _ => SubmitOutcome::Completed,
        };
        if let Some(suggestion) = wizard.take_result() {
            self.result = Some(suggestion);
            self.wizard = None;
        }
        Ok(outcome)
    }

    /// The last successful suggestion, rendered under the current view mode.
    #[must_use]
    pub fn portfolio_result(&self) -> Option<PortfolioResultView> {
        self.result
            .as_ref()
            .map(|s| PortfolioResultView::build(s, self.view.get()))
    }

    /// Close the result view.
    pub fn dismiss_result(&mut self) -> Option<PortfolioSuggestion> {
        self.result.take()
    }

    // ── Catalogue ───────────────────────────────────────────────────

    /// Browse the full fund catalogue.
    pub async fn search_funds(&self, query: &FundQuery) -> Result<FundPage, CoreError> {
        query.validate()?;
        self.service.list_funds(query).await
    }

    /// One fund rendered as a standalone card (rank 0: no podium highlight).
    pub async fn fund_detail(&self, isin: &str) -> Result<PresentationDescriptor, CoreError> {
        let fund = self.service.get_fund(isin).await?;
        Ok(present_with_details(
            &fund,
            0,
            self.view.get(),
            self.expanded.contains(&fund.isin),
        ))
    }

    pub async fn health_check(&self) -> Result<HealthStatus, CoreError> {
        self.service.health_check().await
    }

    // ── Composite scoring ───────────────────────────────────────────
    // Read-only views of the service's multi-brain ranking. Nothing here
    // is cached; each call is one request.

    pub async fn composite_ranking(
        &self,
        query: &TrunkRankingQuery,
    ) -> Result<Vec<TrunkRankingEntry>, CoreError> {
        query.validate()?;
        self.service.get_trunk_ranking(query).await
    }

    /// Ranked funds eligible for a target SRI, within `tolerance` levels.
    pub async fn funds_for_allocation(
        &self,
        sri_target: u8,
        tolerance: f64,
    ) -> Result<Vec<TrunkRankingEntry>, CoreError> {
        models::trunk::validate_allocation_band(sri_target, tolerance)?;
        self.service.get_funds_for_allocation(sri_target, tolerance).await
    }

    pub async fn brains(&self, active_only: bool) -> Result<Vec<BrainRegistryItem>, CoreError> {
        self.service.list_brains(active_only).await
    }

    pub async fn composite_stats(&self) -> Result<TrunkStats, CoreError> {
        self.service.get_trunk_stats().await
    }

    pub async fn composite_breakdown(&self, fund_id: &str) -> Result<CompositeBreakdown, CoreError> {
        let composite = self.service.get_composite_score(fund_id).await?;
        tracing::debug!(
            fund = %composite.fund_id,
            consensus = %composite.consensus_level,
            "composite score received"
        );
        Ok(present_composite(&composite))
    }

    pub async fn contradictions(&self) -> Result<ContradictionReport, CoreError> {
        self.service.get_contradictions().await
    }
}
