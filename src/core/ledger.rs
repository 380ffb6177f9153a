//! The expense ledger: an ordered, shared collection of expense entries

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::core::validate::parse_amount;

/// A single expense row as entered by the user.
///
/// The amount stays a string; numeric interpretation happens only in the
/// ledger's filters and totals.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseEntry {
    pub id: Uuid,
    pub name: String,
    pub amount: String,
}

impl ExpenseEntry {
    /// Non-empty name and amount, regardless of whether the amount parses.
    pub fn is_filled(&self) -> bool {
        !self.name.is_empty() && !self.amount.is_empty()
    }
}

/// Cheaply clonable handle over the shared expense collection.
///
/// The presentation layer may mutate the ledger while a calculation is in
/// flight; totals are always computed from the collection as it is at the
/// moment of the call.
#[derive(Clone, Default)]
pub struct ExpenseLedger {
    inner: Arc<Mutex<Vec<ExpenseEntry>>>,
}

impl ExpenseLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a blank entry and returns its freshly generated id.
    pub async fn add(&self) -> Uuid {
        let id = Uuid::new_v4();
        let mut entries = self.inner.lock().await;
        entries.push(ExpenseEntry {
            id,
            name: String::new(),
            amount: String::new(),
        });
        debug!(%id, "Added expense entry");
        id
    }

    /// Removes the entry with the given id. No-op if absent.
    pub async fn remove(&self, id: Uuid) {
        let mut entries = self.inner.lock().await;
        entries.retain(|entry| entry.id != id);
    }

    /// Replaces the name of the matching entry. No-op if absent.
    pub async fn set_name(&self, id: Uuid, name: &str) {
        let mut entries = self.inner.lock().await;
        if let Some(entry) = entries.iter_mut().find(|entry| entry.id == id) {
            entry.name = name.to_string();
        }
    }

    /// Replaces the amount of the matching entry. No-op if absent.
    pub async fn set_amount(&self, id: Uuid, amount: &str) {
        let mut entries = self.inner.lock().await;
        if let Some(entry) = entries.iter_mut().find(|entry| entry.id == id) {
            entry.amount = amount.to_string();
        }
    }

    /// Snapshot of all entries in display order.
    pub async fn entries(&self) -> Vec<ExpenseEntry> {
        self.inner.lock().await.clone()
    }

    /// Entries with non-empty name and amount, in order.
    ///
    /// This is the looser filter used for the analysis itemization: an entry
    /// whose amount does not parse is still included here even though it
    /// contributes nothing to [`total`](Self::total).
    pub async fn filled_entries(&self) -> Vec<ExpenseEntry> {
        self.inner
            .lock()
            .await
            .iter()
            .filter(|entry| entry.is_filled())
            .cloned()
            .collect()
    }

    /// Sum of amounts over entries with a non-empty name and a finite,
    /// parseable amount. Invalid entries contribute zero; an empty ledger
    /// totals 0.
    pub async fn total(&self) -> f64 {
        self.inner
            .lock()
            .await
            .iter()
            .filter(|entry| !entry.name.is_empty())
            .filter_map(|entry| parse_amount(&entry.amount))
            .sum()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn ledger_with(entries: &[(&str, &str)]) -> ExpenseLedger {
        let ledger = ExpenseLedger::new();
        for (name, amount) in entries {
            let id = ledger.add().await;
            ledger.set_name(id, name).await;
            ledger.set_amount(id, amount).await;
        }
        ledger
    }

    #[tokio::test]
    async fn test_total_empty_ledger() {
        let ledger = ExpenseLedger::new();
        assert_eq!(ledger.total().await, 0.0);
        assert!(ledger.is_empty().await);
    }

    #[tokio::test]
    async fn test_total_excludes_invalid_entries() {
        let ledger = ledger_with(&[
            ("Rent", "1500"),
            ("", "200"),
            ("Gym", "abc"),
            ("Internet", ""),
            ("Groceries", "450.50"),
        ])
        .await;

        assert_eq!(ledger.total().await, 1950.50);
        // Invalid entries stay visible to the user.
        assert_eq!(ledger.len().await, 5);
    }

    #[tokio::test]
    async fn test_total_is_order_independent() {
        let forward = ledger_with(&[("Rent", "1500"), ("Groceries", "450")]).await;
        let backward = ledger_with(&[("Groceries", "450"), ("Rent", "1500")]).await;

        assert_eq!(forward.total().await, backward.total().await);
    }

    #[tokio::test]
    async fn test_add_generates_distinct_ids() {
        let ledger = ExpenseLedger::new();
        let first = ledger.add().await;
        let second = ledger.add().await;

        assert_ne!(first, second);
        assert_eq!(ledger.len().await, 2);
        // Blank entries do not count toward the total.
        assert_eq!(ledger.total().await, 0.0);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let ledger = ledger_with(&[("Rent", "1500")]).await;
        let id = ledger.entries().await[0].id;

        ledger.remove(id).await;
        assert!(ledger.is_empty().await);

        // Removing again (or an unknown id) is a no-op.
        ledger.remove(id).await;
        ledger.remove(Uuid::new_v4()).await;
        assert!(ledger.is_empty().await);
    }

    #[tokio::test]
    async fn test_set_on_absent_id_is_noop() {
        let ledger = ledger_with(&[("Rent", "1500")]).await;

        ledger.set_name(Uuid::new_v4(), "Utilities").await;
        ledger.set_amount(Uuid::new_v4(), "99").await;

        let entries = ledger.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Rent");
        assert_eq!(entries[0].amount, "1500");
    }

    #[tokio::test]
    async fn test_update_replaces_fields_in_place() {
        let ledger = ledger_with(&[("Rent", "1500")]).await;
        let id = ledger.entries().await[0].id;

        ledger.set_amount(id, "1650").await;
        ledger.set_name(id, "Rent + parking").await;

        let entries = ledger.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Rent + parking");
        assert_eq!(ledger.total().await, 1650.0);
    }

    #[tokio::test]
    async fn test_filled_entries_uses_loose_filter() {
        let ledger = ledger_with(&[
            ("Rent", "1500"),
            ("Gym", "abc"),
            ("", "200"),
            ("Internet", ""),
        ])
        .await;

        let filled = ledger.filled_entries().await;
        let names: Vec<&str> = filled.iter().map(|e| e.name.as_str()).collect();

        // "Gym" is filled even though its amount does not parse; the
        // nameless and amountless rows are not.
        assert_eq!(names, vec!["Rent", "Gym"]);
        assert_eq!(ledger.total().await, 1500.0);
    }
}
