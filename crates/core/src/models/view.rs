use serde::{Deserialize, Serialize};

/// Display density applied to every fund card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Headline figures only; secondary fields behind a per-card toggle
    #[default]
    Simple,
    /// Every available field, always expanded
    Advanced,
}

impl ViewMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Simple => ViewMode::Advanced,
            ViewMode::Advanced => ViewMode::Simple,
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewMode::Simple => write!(f, "simple"),
            ViewMode::Advanced => write!(f, "advanced"),
        }
    }
}
