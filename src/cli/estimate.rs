use super::ui;
use crate::core::ledger::ExpenseEntry;
use crate::core::validate::parse_amount;
use crate::planner::EstimateSnapshot;
use comfy_table::Cell;

/// Renders a terminal snapshot and the ledger's entries as the results view.
///
/// All formatting (two-decimal currency, color-coding of the balance) lives
/// here; the snapshot itself carries raw numbers.
pub fn render(snapshot: &EstimateSnapshot, entries: &[ExpenseEntry]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Expense"), ui::header_cell("Amount")]);

    for entry in entries {
        let amount = match parse_amount(&entry.amount) {
            Some(value) => ui::amount_cell(value),
            // Invalid rows stay visible; they just don't count.
            None => ui::na_cell(false),
        };
        table.add_row(vec![Cell::new(&entry.name), amount]);
    }

    let mut output = format!(
        "{}\n\n{}\n",
        ui::style_text("Budget Estimate", ui::StyleType::Title),
        table
    );

    if let Some(net_income) = snapshot.net_income {
        output.push_str(&format!(
            "\n{} {net_income:.2}",
            ui::style_text("Estimated Net Income:", ui::StyleType::TotalLabel)
        ));
    }
    if let Some(total_tax) = snapshot.total_tax {
        output.push_str(&format!(
            "\n{} {total_tax:.2}",
            ui::style_text("Estimated Total Tax:", ui::StyleType::TotalLabel)
        ));
    }
    output.push_str(&format!(
        "\n{} {:.2}",
        ui::style_text("Total Expenses:", ui::StyleType::TotalLabel),
        snapshot.total_expenses
    ));
    if let Some(balance) = snapshot.remaining_balance {
        let style_type = if balance >= 0.0 {
            ui::StyleType::TotalValue
        } else {
            ui::StyleType::Error
        };
        output.push_str(&format!(
            "\n{} {}",
            ui::style_text("Remaining Balance:", ui::StyleType::TotalLabel),
            ui::style_text(&format!("{balance:.2}"), style_type)
        ));
    }

    if let Some(analysis) = &snapshot.analysis {
        output.push_str(&format!("\n\n{analysis}\n"));
    }
    if let Some(disclaimer) = &snapshot.disclaimer {
        output.push_str(&format!(
            "\n{}\n",
            ui::style_text(disclaimer, ui::StyleType::Subtle)
        ));
    }

    output
}
