//! Drives the two-stage estimation workflow and exposes its lifecycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

use crate::core::analysis::{AnalysisContext, BudgetAnalyst};
use crate::core::ledger::ExpenseLedger;
use crate::core::tax::{FilingStatus, TaxEstimator, TaxProfile};
use crate::core::validate;

pub const INVALID_INPUT_MESSAGE: &str =
    "Please fill in your income, location, and at least one valid expense.";
pub const ESTIMATION_FAILED_MESSAGE: &str =
    "An error occurred during the analysis. Please check your inputs and try again.";
pub const CALCULATION_IN_PROGRESS_MESSAGE: &str =
    "A calculation is already in progress. Please wait for it to finish.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Validating,
    EstimatingTax,
    AnalyzingBudget,
    Complete,
    Errored,
}

/// One immutable view of a calculation's lifecycle.
///
/// A fresh snapshot is produced per transition and per run, so stale result
/// fields from an earlier run can never leak into the current one. Terminal
/// snapshots (`Complete`, `Errored`) carry no loading status.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateSnapshot {
    pub phase: Phase,
    pub show_results: bool,
    pub loading_status: Option<String>,
    pub net_income: Option<f64>,
    pub total_tax: Option<f64>,
    pub disclaimer: Option<String>,
    pub analysis: Option<String>,
    pub total_expenses: f64,
    pub remaining_balance: Option<f64>,
    pub error: Option<String>,
}

impl EstimateSnapshot {
    pub fn idle() -> Self {
        EstimateSnapshot {
            phase: Phase::Idle,
            show_results: false,
            loading_status: None,
            net_income: None,
            total_tax: None,
            disclaimer: None,
            analysis: None,
            total_expenses: 0.0,
            remaining_balance: None,
            error: None,
        }
    }

    fn errored(message: &str) -> Self {
        EstimateSnapshot {
            phase: Phase::Errored,
            error: Some(message.to_string()),
            ..Self::idle()
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            self.phase,
            Phase::Validating | Phase::EstimatingTax | Phase::AnalyzingBudget
        )
    }
}

/// The user's submission, as entered: income stays a string until validated.
#[derive(Debug, Clone)]
pub struct BudgetInput {
    pub gross_income: String,
    pub location: String,
    pub filing_status: FilingStatus,
}

/// Releases the busy flag when the run ends, on every exit path.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn claim(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Sequences validation, net-income estimation, and budget analysis.
///
/// The two remote calls are strictly sequential; the second depends on the
/// first's result. A second `calculate` while one is outstanding is rejected
/// with an errored snapshot rather than starting an overlapping run.
#[derive(Clone)]
pub struct BudgetPlanner {
    estimator: Arc<dyn TaxEstimator>,
    analyst: Arc<dyn BudgetAnalyst>,
    ledger: ExpenseLedger,
    busy: Arc<AtomicBool>,
}

impl BudgetPlanner {
    pub fn new(
        estimator: Arc<dyn TaxEstimator>,
        analyst: Arc<dyn BudgetAnalyst>,
        ledger: ExpenseLedger,
    ) -> Self {
        BudgetPlanner {
            estimator,
            analyst,
            ledger,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn ledger(&self) -> &ExpenseLedger {
        &self.ledger
    }

    /// Runs one calculation and returns its terminal snapshot.
    ///
    /// Every phase transition is also emitted through `on_transition`, so a
    /// presentation layer can render the pending view while the remote calls
    /// are in flight.
    pub async fn calculate<F>(&self, input: &BudgetInput, on_transition: F) -> EstimateSnapshot
    where
        F: Fn(&EstimateSnapshot),
    {
        let Some(_busy) = BusyGuard::claim(&self.busy) else {
            warn!("calculate() invoked while another run is in flight");
            let snapshot = EstimateSnapshot::errored(CALCULATION_IN_PROGRESS_MESSAGE);
            on_transition(&snapshot);
            return snapshot;
        };

        let mut snapshot = EstimateSnapshot::idle();
        snapshot.phase = Phase::Validating;
        snapshot.loading_status = Some("Checking your inputs...".to_string());
        on_transition(&snapshot);

        let Some(gross_income) = validate::parse_amount(&input.gross_income)
            .filter(|_| validate::is_submittable(&input.gross_income, &input.location))
        else {
            debug!("Input rejected by validation; no remote calls made");
            let snapshot = EstimateSnapshot::errored(INVALID_INPUT_MESSAGE);
            on_transition(&snapshot);
            return snapshot;
        };

        snapshot.phase = Phase::EstimatingTax;
        // The pending view starts rendering before any data arrives.
        snapshot.show_results = true;
        snapshot.loading_status = Some("Estimating your taxes...".to_string());
        on_transition(&snapshot);

        let profile = TaxProfile {
            gross_monthly_income: gross_income,
            location: input.location.trim().to_string(),
            filing_status: input.filing_status,
        };
        let estimate = match self.estimator.estimate_net_income(&profile).await {
            Ok(estimate) => estimate,
            Err(e) => {
                warn!(error = %e, "Net-income estimation failed");
                let snapshot = EstimateSnapshot::errored(ESTIMATION_FAILED_MESSAGE);
                on_transition(&snapshot);
                return snapshot;
            }
        };

        snapshot.net_income = Some(estimate.net_income);
        snapshot.total_tax = Some(estimate.total_tax);
        snapshot.disclaimer = Some(estimate.disclaimer.clone());

        // The ledger may have changed while the first call was in flight;
        // the balance uses its total as of now, not as of submission.
        let total_expenses = self.ledger.total().await;
        let remaining_balance = estimate.net_income - total_expenses;
        snapshot.total_expenses = total_expenses;
        snapshot.remaining_balance = Some(remaining_balance);

        snapshot.phase = Phase::AnalyzingBudget;
        snapshot.loading_status = Some("Writing your budget review...".to_string());
        on_transition(&snapshot);

        let context = AnalysisContext {
            gross_income,
            net_income: estimate.net_income,
            location: profile.location.clone(),
            expenses: self.ledger.filled_entries().await,
            total_expenses,
            remaining_balance,
        };
        match self.analyst.analyze_budget(&context).await {
            Ok(narrative) => {
                snapshot.analysis = Some(narrative);
                snapshot.phase = Phase::Complete;
                snapshot.loading_status = None;
                on_transition(&snapshot);
                snapshot
            }
            Err(e) => {
                warn!(error = %e, "Budget analysis failed");
                // A half-completed result is never shown; the tax estimate
                // obtained in the previous stage is discarded with it.
                let snapshot = EstimateSnapshot::errored(ESTIMATION_FAILED_MESSAGE);
                on_transition(&snapshot);
                snapshot
            }
        }
    }
}
