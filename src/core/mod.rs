//! Core business logic abstractions

pub mod analysis;
pub mod error;
pub mod ledger;
pub mod tax;
pub mod validate;

// Re-export main types for cleaner imports
pub use analysis::{AnalysisContext, BudgetAnalyst};
pub use error::EstimationError;
pub use ledger::{ExpenseEntry, ExpenseLedger};
pub use tax::{FilingStatus, TaxEstimate, TaxEstimator, TaxProfile};
