use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Identifies one outstanding request. A response is applied only if its
/// ticket still matches the resource's current `Loading` ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket(Uuid);

impl FetchTicket {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl Default for FetchTicket {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FetchTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Load state of a remotely fetched resource.
///
/// `Idle → Loading → Loaded | Error`. `Loaded` is sticky until the resource
/// is explicitly invalidated.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Idle,
    Loading {
        ticket: FetchTicket,
    },
    Loaded {
        data: T,
        fetched_at: DateTime<Utc>,
    },
    Error {
        message: String,
        /// Whether offering a manual retry makes sense
        retryable: bool,
    },
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        FetchState::Idle
    }
}

impl<T> FetchState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, FetchState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading { .. })
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, FetchState::Loaded { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, FetchState::Error { .. })
    }

    /// Loaded data, if any.
    pub fn data(&self) -> Option<&T> {
        match self {
            FetchState::Loaded { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        match self {
            FetchState::Loaded { fetched_at, .. } => Some(*fetched_at),
            _ => None,
        }
    }

    /// Short status label for logs and debugging output.
    pub fn status(&self) -> &'static str {
        match self {
            FetchState::Idle => "idle",
            FetchState::Loading { .. } => "loading",
            FetchState::Loaded { .. } => "loaded",
            FetchState::Error { .. } => "error",
        }
    }
}
