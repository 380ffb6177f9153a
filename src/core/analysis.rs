//! Narrative budget analysis abstractions

use async_trait::async_trait;

use crate::core::error::EstimationError;
use crate::core::ledger::ExpenseEntry;

/// The full financial picture sent to the analysis call.
///
/// `expenses` carries the filled (non-empty name and amount) entries in
/// display order; `remaining_balance` is `net_income - total_expenses` as
/// computed at the moment the analysis is invoked.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    pub gross_income: f64,
    pub net_income: f64,
    pub location: String,
    pub expenses: Vec<ExpenseEntry>,
    pub total_expenses: f64,
    pub remaining_balance: f64,
}

#[async_trait]
pub trait BudgetAnalyst: Send + Sync {
    async fn analyze_budget(&self, context: &AnalysisContext) -> Result<String, EstimationError>;
}
