pub mod cli;
pub mod config;
pub mod core;
pub mod log;
pub mod planner;
pub mod providers;

use crate::core::ExpenseLedger;
use crate::planner::{BudgetInput, BudgetPlanner, Phase};
use crate::providers::GeminiEstimator;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub async fn run(config_path: Option<&str>) -> Result<()> {
    info!("Budgeteer starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    // Missing credential is a startup error, not a per-call one.
    let api_key = config.resolve_api_key()?;
    let service = Arc::new(GeminiEstimator::new(
        &config.service.base_url,
        &config.service.model,
        &api_key,
    ));

    let ledger = ExpenseLedger::new();
    for expense in &config.budget.expenses {
        let id = ledger.add().await;
        ledger.set_name(id, &expense.name).await;
        ledger.set_amount(id, &expense.amount).await;
    }

    let planner = BudgetPlanner::new(service.clone(), service, ledger.clone());
    let input = BudgetInput {
        gross_income: config.budget.gross_monthly_income.clone(),
        location: config.budget.location.clone(),
        filing_status: config.budget.filing_status,
    };

    let pb = cli::ui::new_spinner();
    let snapshot = planner
        .calculate(&input, |snapshot| {
            if let Some(status) = &snapshot.loading_status {
                pb.set_message(status.clone());
            }
        })
        .await;
    pb.finish_and_clear();

    if snapshot.phase == Phase::Errored {
        anyhow::bail!(
            snapshot
                .error
                .unwrap_or_else(|| "estimation failed".to_string())
        );
    }

    let entries = ledger.entries().await;
    println!("{}", cli::estimate::render(&snapshot, &entries));

    Ok(())
}
