use chrono::Utc;

use crate::errors::CoreError;
use crate::models::fetch::{FetchState, FetchTicket};

/// Cache cell for one remotely fetched resource.
///
/// Fetching is split in two so the caller owns the I/O: [`begin`](Self::begin)
/// moves `Idle → Loading` and hands out a ticket, and
/// [`resolve`](Self::resolve) applies the result only if that ticket is
/// still current. At most one ticket is outstanding per slot.
#[derive(Debug, Clone)]
pub struct FetchSlot<T> {
    label: &'static str,
    state: FetchState<T>,
}

impl<T> FetchSlot<T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            state: FetchState::Idle,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }

    /// Start a fetch if the slot is idle or holds a retryable error.
    /// Returns `None` while loading, loaded, or after a permanent failure.
    pub fn begin(&mut self) -> Option<FetchTicket> {
        let startable = match &self.state {
            FetchState::Idle => true,
            FetchState::Error { retryable, .. } => *retryable,
            FetchState::Loading { .. } | FetchState::Loaded { .. } => false,
        };
        if !startable {
            tracing::debug!(resource = self.label, status = self.state.status(), "fetch skipped");
            return None;
        }
        let ticket = FetchTicket::new();
        self.state = FetchState::Loading { ticket };
        tracing::debug!(resource = self.label, %ticket, "fetch started");
        Some(ticket)
    }

    /// Apply the outcome of the fetch identified by `ticket`.
    /// Returns `false` (and changes nothing) if the ticket is stale.
    pub fn resolve(&mut self, ticket: FetchTicket, result: Result<T, CoreError>) -> bool {
        match &self.state {
            FetchState::Loading { ticket: current } if *current == ticket => {}
            _ => {
                tracing::warn!(
                    resource = self.label,
                    %ticket,
                    status = self.state.status(),
                    "discarding stale response"
                );
                return false;
            }
        }

        self.state = match result {
            Ok(data) => {
                tracing::info!(resource = self.label, "fetch completed");
                FetchState::Loaded {
                    data,
                    fetched_at: Utc::now(),
                }
            }
            Err(err) => {
                tracing::warn!(resource = self.label, error = %err, "fetch failed");
                FetchState::Error {
                    retryable: err.is_retryable(),
                    message: err.to_string(),
                }
            }
        };
        true
    }

    /// Drop cached data and any in-flight ticket. The next `begin` refetches.
    pub fn invalidate(&mut self) {
        if !self.state.is_idle() {
            tracing::debug!(resource = self.label, status = self.state.status(), "invalidated");
        }
        self.state = FetchState::Idle;
    }

    /// Leave the error state so a user-initiated retry can `begin` again.
    /// Returns `false` if the slot was not in error.
    pub fn clear_error(&mut self) -> bool {
        if self.state.is_error() {
            self.state = FetchState::Idle;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_twice_hands_out_one_ticket() {
        let mut slot: FetchSlot<u32> = FetchSlot::new("numbers");
        assert!(slot.begin().is_some());
        assert!(slot.begin().is_none());
        assert!(slot.state().is_loading());
    }

    #[test]
    fn resolve_with_current_ticket_loads() {
        let mut slot = FetchSlot::new("numbers");
        let ticket = slot.begin().unwrap();
        assert!(slot.resolve(ticket, Ok(7)));
        assert_eq!(slot.state().data(), Some(&7));
        assert!(slot.state().fetched_at().is_some());
        assert!(slot.begin().is_none());
    }

    #[test]
    fn resolve_after_invalidate_is_discarded() {
        let mut slot = FetchSlot::new("numbers");
        let stale = slot.begin().unwrap();
        slot.invalidate();
        let fresh = slot.begin().unwrap();

        assert!(!slot.resolve(stale, Ok(1)));
        assert!(slot.state().is_loading());
        assert!(slot.resolve(fresh, Ok(2)));
        assert_eq!(slot.state().data(), Some(&2));
    }

    #[test]
    fn failure_records_retryable_flag() {
        let mut slot: FetchSlot<u32> = FetchSlot::new("numbers");
        let ticket = slot.begin().unwrap();
        slot.resolve(ticket, Err(CoreError::Network("refused".into())));
        match slot.state() {
            FetchState::Error { message, retryable } => {
                assert!(message.contains("refused"));
                assert!(*retryable);
            }
            other => panic!("expected error state, got {other:?}"),
        }
        assert!(slot.begin().is_some());
        assert!(slot.state().is_loading());
    }

    #[test]
    fn permanent_failure_needs_clear_error() {
        let mut slot: FetchSlot<u32> = FetchSlot::new("numbers");
        let ticket = slot.begin().unwrap();
        slot.resolve(ticket, Err(CoreError::MalformedResponse("bad json".into())));

        assert!(slot.begin().is_none());
        assert!(slot.clear_error());
        assert!(slot.begin().is_some());
    }
}
