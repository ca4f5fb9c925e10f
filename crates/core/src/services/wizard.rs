use crate::errors::CoreError;
use crate::models::fetch::FetchTicket;
use crate::models::fund::Horizon;
use crate::models::portfolio::{PortfolioRequest, PortfolioSuggestion};
use crate::providers::traits::FundService;

pub const DEFAULT_AMOUNT: &str = "100000";
pub const DEFAULT_TARGET_RISK: u8 = 4;

/// SRI distance the service may deviate from the target.
pub const SRI_TOLERANCE: u8 = 1;

/// Shown inline in the wizard for any failed submission.
pub const SUBMISSION_FAILED_MESSAGE: &str =
    "Impossible de générer une suggestion de portefeuille. Veuillez réessayer.";

/// One-click risk profiles offered on the last step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresetId {
    Prudent,
    Equilibre,
    Dynamique,
}

impl PresetId {
    pub const ALL: [PresetId; 3] = [PresetId::Prudent, PresetId::Equilibre, PresetId::Dynamique];

    pub fn id(&self) -> &'static str {
        match self {
            PresetId::Prudent => "prudent",
            PresetId::Equilibre => "equilibre",
            PresetId::Dynamique => "dynamique",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PresetId::Prudent => "Prudent",
            PresetId::Equilibre => "Équilibré",
            PresetId::Dynamique => "Dynamique",
        }
    }

    pub fn risk(&self) -> u8 {
        match self {
            PresetId::Prudent => 2,
            PresetId::Equilibre => 4,
            PresetId::Dynamique => 6,
        }
    }

    pub fn horizon(&self) -> Horizon {
        match self {
            PresetId::Prudent => Horizon::Short,
            PresetId::Equilibre => Horizon::Medium,
            PresetId::Dynamique => Horizon::Long,
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id() == id)
    }
}

impl std::fmt::Display for PresetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// How the current risk target was chosen. A preset stays selected only
/// until the risk or horizon control is touched directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskSelection {
    Preset(PresetId),
    Manual(u8),
}

impl RiskSelection {
    pub fn risk(&self) -> u8 {
        match self {
            RiskSelection::Preset(preset) => preset.risk(),
            RiskSelection::Manual(risk) => *risk,
        }
    }

    pub fn preset(&self) -> Option<PresetId> {
        match self {
            RiskSelection::Preset(preset) => Some(*preset),
            RiskSelection::Manual(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    /// Step 1
    Amount,
    /// Step 2
    Horizon,
    /// Step 3
    Risk,
}

impl WizardStep {
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::Amount => 1,
            WizardStep::Horizon => 2,
            WizardStep::Risk => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WizardPhase {
    Editing(WizardStep),
    Submitting { ticket: FetchTicket },
    Succeeded(PortfolioSuggestion),
    Failed { message: String },
    Closed,
}

impl WizardPhase {
    pub fn name(&self) -> &'static str {
        match self {
            WizardPhase::Editing(WizardStep::Amount) => "Step1",
            WizardPhase::Editing(WizardStep::Horizon) => "Step2",
            WizardPhase::Editing(WizardStep::Risk) => "Step3",
            WizardPhase::Submitting { .. } => "Submitting",
            WizardPhase::Succeeded(_) => "Succeeded",
            WizardPhase::Failed { .. } => "Failed",
            WizardPhase::Closed => "Closed",
        }
    }
}

/// An issued portfolio request, to be run and then resolved on the wizard.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    ticket: FetchTicket,
    request: PortfolioRequest,
}

impl Submission {
    pub fn ticket(&self) -> FetchTicket {
        self.ticket
    }

    pub fn request(&self) -> &PortfolioRequest {
        &self.request
    }

    pub async fn run(&self, service: &dyn FundService) -> Result<PortfolioSuggestion, CoreError> {
        service.suggest_portfolio(&self.request).await
    }
}

/// Three-step portfolio wizard: amount, horizon, risk, then submission.
///
/// Values survive navigation and failed submissions; they are only reset
/// when the result is handed off with [`take_result`](Self::take_result).
#[derive(Debug, Clone, PartialEq)]
pub struct WizardController {
    phase: WizardPhase,
    amount: String,
    horizon: Horizon,
    risk: RiskSelection,
}

impl WizardController {
    pub fn new() -> Self {
        Self {
            phase: WizardPhase::Editing(WizardStep::Amount),
            amount: DEFAULT_AMOUNT.to_string(),
            horizon: Horizon::Medium,
            risk: RiskSelection::Manual(DEFAULT_TARGET_RISK),
        }
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn phase(&self) -> &WizardPhase {
        &self.phase
    }

    /// Current step number (1–3) while editing.
    pub fn step(&self) -> Option<u8> {
        match &self.phase {
            WizardPhase::Editing(step) => Some(step.number()),
            _ => None,
        }
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    pub fn target_risk(&self) -> u8 {
        self.risk.risk()
    }

    pub fn risk_selection(&self) -> RiskSelection {
        self.risk
    }

    pub fn selected_preset(&self) -> Option<PresetId> {
        self.risk.preset()
    }

    pub fn is_closed(&self) -> bool {
        self.phase == WizardPhase::Closed
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, WizardPhase::Submitting { .. })
    }

    // ── Field edits ─────────────────────────────────────────────────

    pub fn set_amount(&mut self, amount: impl Into<String>) -> Result<(), CoreError> {
        self.require_step(&[WizardStep::Amount], "set_amount")?;
        self.amount = amount.into();
        Ok(())
    }

    /// Change the horizon directly. Deselects any preset.
    pub fn set_horizon(&mut self, horizon: Horizon) -> Result<(), CoreError> {
        self.require_step(&[WizardStep::Horizon, WizardStep::Risk], "set_horizon")?;
        self.horizon = horizon;
        self.risk = RiskSelection::Manual(self.risk.risk());
        Ok(())
    }

    /// Change the risk target directly. Deselects any preset.
    pub fn set_risk(&mut self, risk: u8) -> Result<(), CoreError> {
        self.require_step(&[WizardStep::Risk], "set_risk")?;
        if !(1..=7).contains(&risk) {
            return Err(CoreError::ValidationError(format!(
                "target risk {risk} is out of range (1-7)"
            )));
        }
        self.risk = RiskSelection::Manual(risk);
        Ok(())
    }

    /// Set risk and horizon from a preset in one step.
    pub fn apply_preset(&mut self, preset: PresetId) -> Result<(), CoreError> {
        self.require_step(&[WizardStep::Risk], "apply_preset")?;
        self.horizon = preset.horizon();
        self.risk = RiskSelection::Preset(preset);
        tracing::debug!(%preset, risk = preset.risk(), horizon = %preset.horizon(), "preset applied");
        Ok(())
    }

    // ── Navigation ──────────────────────────────────────────────────

    pub fn next(&mut self) -> Result<(), CoreError> {
        let next = match &self.phase {
            WizardPhase::Editing(WizardStep::Amount) => {
                if parse_amount(&self.amount).is_none() {
                    return Err(CoreError::ValidationError(format!(
                        "amount '{}' is not a number",
                        self.amount
                    )));
                }
                WizardStep::Horizon
            }
            WizardPhase::Editing(WizardStep::Horizon) => WizardStep::Risk,
            _ => return Err(self.invalid("next")),
        };
        self.phase = WizardPhase::Editing(next);
        Ok(())
    }

    /// Go back one step. On step 1 this cancels the wizard; from `Failed`
    /// it returns to step 3 for editing.
    pub fn back(&mut self) -> Result<(), CoreError> {
        self.phase = match &self.phase {
            WizardPhase::Editing(WizardStep::Amount) => WizardPhase::Closed,
            WizardPhase::Editing(WizardStep::Horizon) => WizardPhase::Editing(WizardStep::Amount),
            WizardPhase::Editing(WizardStep::Risk) => WizardPhase::Editing(WizardStep::Horizon),
            WizardPhase::Failed { .. } => WizardPhase::Editing(WizardStep::Risk),
            _ => return Err(self.invalid("back")),
        };
        Ok(())
    }

    /// Dismiss the wizard. A submission still in flight will be ignored
    /// when it completes. Terminal phases (`Succeeded`, `Closed`) are left
    /// untouched so an untaken result survives.
    pub fn cancel(&mut self) {
        if !matches!(self.phase, WizardPhase::Succeeded(_) | WizardPhase::Closed) {
            tracing::debug!(from = self.phase.name(), "wizard cancelled");
            self.phase = WizardPhase::Closed;
        }
    }

    // ── Submission ──────────────────────────────────────────────────

    /// Build the request from the current values and enter `Submitting`.
    /// Allowed on step 3 and after a failure (retry).
    pub fn submit(&mut self) -> Result<Submission, CoreError> {
        match &self.phase {
            WizardPhase::Editing(WizardStep::Risk) | WizardPhase::Failed { .. } => {}
            _ => return Err(self.invalid("submit")),
        }

        let amount = parse_amount(&self.amount)
            .filter(|a| *a > 0.0)
            .ok_or_else(|| {
                CoreError::ValidationError(format!(
                    "amount '{}' must be a positive number",
                    self.amount
                ))
            })?;

        let request = PortfolioRequest {
            amount,
            horizon: self.horizon,
            target_sri: self.risk.risk(),
            sri_tolerance: SRI_TOLERANCE,
        };
        let ticket = FetchTicket::new();
        self.phase = WizardPhase::Submitting { ticket };
        tracing::info!(
            %ticket,
            amount,
            horizon = %request.horizon,
            target_sri = request.target_sri,
            "portfolio submission started"
        );
        Ok(Submission { ticket, request })
    }

    /// Apply the outcome of a submission. Returns `false` if the wizard has
    /// moved on (cancelled or resubmitted) and the outcome was dropped.
    pub fn resolve(
        &mut self,
        submission: &Submission,
        result: Result<PortfolioSuggestion, CoreError>,
    ) -> bool {
        match &self.phase {
            WizardPhase::Submitting { ticket } if *ticket == submission.ticket => {}
            _ => {
                tracing::warn!(
                    ticket = %submission.ticket,
                    phase = self.phase.name(),
                    "discarding stale portfolio response"
                );
                return false;
            }
        }

        self.phase = match result {
            Ok(suggestion) => {
                tracing::info!(funds = suggestion.allocations.len(), "portfolio suggestion received");
                WizardPhase::Succeeded(suggestion)
            }
            Err(err) => {
                tracing::warn!(error = %err, "portfolio submission failed");
                WizardPhase::Failed {
                    message: SUBMISSION_FAILED_MESSAGE.to_string(),
                }
            }
        };
        true
    }

    /// Submit, run against `service` and resolve in one go.
    pub async fn submit_with(
        &mut self,
        service: &dyn FundService,
    ) -> Result<&WizardPhase, CoreError> {
        let submission = self.submit()?;
        let result = submission.run(service).await;
        self.resolve(&submission, result);
        Ok(&self.phase)
    }

    /// Hand off a successful result and reset the wizard for next use.
    pub fn take_result(&mut self) -> Option<PortfolioSuggestion> {
        if !matches!(self.phase, WizardPhase::Succeeded(_)) {
            return None;
        }
        match std::mem::take(self).phase {
            WizardPhase::Succeeded(suggestion) => Some(suggestion),
            _ => None,
        }
    }

    // ── Internal ────────────────────────────────────────────────────

    fn require_step(&self, allowed: &[WizardStep], action: &str) -> Result<(), CoreError> {
        match &self.phase {
            WizardPhase::Editing(step) if allowed.contains(step) => Ok(()),
            _ => Err(self.invalid(action)),
        }
    }

    fn invalid(&self, action: &str) -> CoreError {
        CoreError::InvalidTransition {
            state: self.phase.name().to_string(),
            action: action.to_string(),
        }
    }
}

impl Default for WizardController {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a user-typed amount. Accepts whitespace as thousands separator and
/// a comma as decimal separator ("100 000,50").
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_amount_accepts_french_formatting() {
        assert_eq!(parse_amount("100 000"), Some(100_000.0));
        assert_eq!(parse_amount("1\u{a0}500,50"), Some(1500.5));
        assert_eq!(parse_amount(" 42 "), Some(42.0));
    }

    #[test]
    fn parse_amount_rejects_garbage() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("   "), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("inf"), None);
    }

    #[test]
    fn parse_amount_keeps_sign() {
        assert_eq!(parse_amount("-10"), Some(-10.0));
    }

    #[test]
    fn preset_lookup_by_id() {
        assert_eq!(PresetId::from_id("dynamique"), Some(PresetId::Dynamique));
        assert_eq!(PresetId::from_id("aggressive"), None);
    }
}
