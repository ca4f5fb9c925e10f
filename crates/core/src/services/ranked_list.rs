use std::collections::HashSet;

use crate::errors::CoreError;
use crate::models::fetch::{FetchState, FetchTicket};
use crate::models::fund::{Fund, Horizon};
use crate::models::settings::ClientSettings;
use crate::models::view::ViewMode;
use crate::providers::traits::FundService;
use crate::services::fetch_slot::FetchSlot;
use crate::services::presentation::{present_with_details, PresentationDescriptor};

/// The two independently cached rankings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankedListKind {
    /// Fetched eagerly when the app mounts
    TopOfWeek,
    /// Fetched the first time its view is opened
    FundamentalRanking,
}

impl RankedListKind {
    pub const ALL: [RankedListKind; 2] = [RankedListKind::TopOfWeek, RankedListKind::FundamentalRanking];

    pub fn name(&self) -> &'static str {
        match self {
            RankedListKind::TopOfWeek => "top-of-week",
            RankedListKind::FundamentalRanking => "fundamental-ranking",
        }
    }
}

impl std::fmt::Display for RankedListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ListRequest {
    TopOfWeek {
        limit: u32,
    },
    FundamentalRanking {
        target_sri: u8,
        horizon: Horizon,
        limit: u32,
    },
}

/// An issued list fetch. Run it against a [`FundService`], then hand the
/// result back to [`RankedListController::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct ListFetch {
    kind: RankedListKind,
    ticket: FetchTicket,
    request: ListRequest,
}

impl ListFetch {
    pub fn kind(&self) -> RankedListKind {
        self.kind
    }

    pub fn ticket(&self) -> FetchTicket {
        self.ticket
    }

    pub async fn run(&self, service: &dyn FundService) -> Result<Vec<Fund>, CoreError> {
        match &self.request {
            ListRequest::TopOfWeek { limit } => service.get_top_of_week(*limit).await,
            ListRequest::FundamentalRanking {
                target_sri,
                horizon,
                limit,
            } => {
                service
                    .get_fundamental_ranking(*target_sri, *horizon, *limit)
                    .await
            }
        }
    }
}

/// Load state and cached contents of the ranked fund lists.
///
/// Each list is fetched at most once per session: activation while loading
/// or loaded does nothing, and only `invalidate` allows a refetch. Order is
/// taken from the service as-is; rank is position + 1.
#[derive(Debug)]
pub struct RankedListController {
    top_of_week: FetchSlot<Vec<Fund>>,
    fundamental_ranking: FetchSlot<Vec<Fund>>,
    top_week_limit: u32,
    ranking_limit: u32,
    ranking_target_sri: u8,
    ranking_horizon: Horizon,
}

impl RankedListController {
    pub fn new(settings: &ClientSettings) -> Self {
        Self {
            top_of_week: FetchSlot::new(RankedListKind::TopOfWeek.name()),
            fundamental_ranking: FetchSlot::new(RankedListKind::FundamentalRanking.name()),
            top_week_limit: settings.top_week_limit,
            ranking_limit: settings.ranking_limit,
            ranking_target_sri: settings.ranking_target_sri,
            ranking_horizon: settings.ranking_horizon,
        }
    }

    /// Issue the list's fetch if it is idle or failed with a retryable
    /// error; `None` otherwise.
    pub fn activate(&mut self, kind: RankedListKind) -> Option<ListFetch> {
        let ticket = self.slot_mut(kind).begin()?;
        let request = match kind {
            RankedListKind::TopOfWeek => ListRequest::TopOfWeek {
                limit: self.top_week_limit,
            },
            RankedListKind::FundamentalRanking => ListRequest::FundamentalRanking {
                target_sri: self.ranking_target_sri,
                horizon: self.ranking_horizon,
                limit: self.ranking_limit,
            },
        };
        Some(ListFetch {
            kind,
            ticket,
            request,
        })
    }

    /// Apply a fetch result. Returns `false` if the fetch was superseded.
    pub fn resolve(&mut self, fetch: ListFetch, result: Result<Vec<Fund>, CoreError>) -> bool {
        let count = result.as_ref().map(Vec::len).ok();
        let applied = self.slot_mut(fetch.kind).resolve(fetch.ticket, result);
        if let (true, Some(count)) = (applied, count) {
            tracing::info!(list = %fetch.kind, count, "ranked list received");
        }
        applied
    }

    /// Reset to idle, discarding cached funds and superseding any in-flight fetch.
    pub fn invalidate(&mut self, kind: RankedListKind) {
        self.slot_mut(kind).invalidate();
    }

    /// Re-issue a failed fetch, permanent failures included. `None` unless
    /// the list is in error.
    pub fn retry(&mut self, kind: RankedListKind) -> Option<ListFetch> {
        if self.slot_mut(kind).clear_error() {
            self.activate(kind)
        } else {
            None
        }
    }

    /// Activate and, if a fetch was issued, run and resolve it.
    /// Returns `true` if a request was sent.
    pub async fn load(&mut self, service: &dyn FundService, kind: RankedListKind) -> bool {
        let Some(fetch) = self.activate(kind) else {
            return false;
        };
        let result = fetch.run(service).await;
        self.resolve(fetch, result);
        true
    }

    pub fn state(&self, kind: RankedListKind) -> &FetchState<Vec<Fund>> {
        self.slot(kind).state()
    }

    /// Cached funds in rank order; empty unless loaded.
    pub fn funds(&self, kind: RankedListKind) -> &[Fund] {
        self.state(kind).data().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Fund cards for a loaded list. `expanded` holds the ISINs whose detail
    /// toggle is open.
    pub fn present(
        &self,
        kind: RankedListKind,
        mode: ViewMode,
        expanded: &HashSet<String>,
    ) -> Vec<PresentationDescriptor> {
        self.funds(kind)
            .iter()
            .enumerate()
            .map(|(idx, fund)| present_with_details(fund, idx + 1, mode, expanded.contains(&fund.isin)))
            .collect()
    }

    fn slot(&self, kind: RankedListKind) -> &FetchSlot<Vec<Fund>> {
        match kind {
            RankedListKind::TopOfWeek => &self.top_of_week,
            RankedListKind::FundamentalRanking => &self.fundamental_ranking,
        }
    }

    fn slot_mut(&mut self, kind: RankedListKind) -> &mut FetchSlot<Vec<Fund>> {
        match kind {
            RankedListKind::TopOfWeek => &mut self.top_of_week,
            RankedListKind::FundamentalRanking => &mut self.fundamental_ranking,
        }
    }
}
