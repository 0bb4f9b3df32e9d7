use crate::core::ledger::LedgerStore;
use crate::domain::ports::{ConfirmPrompt, Storage};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    #[default]
    Normal,
    Selecting,
}

/// Result of clicking a record in the ledger view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    OpenDetail(i64),
    Toggled { timestamp: i64, selected: bool },
}

/// Multi-select over record timestamps.
///
/// A selection only makes sense against the ledger view that produced it, so it is
/// dropped whenever the mode flips or a deletion commits.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    mode: SelectionMode,
    selected: BTreeSet<i64>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn is_selecting(&self) -> bool {
        self.mode == SelectionMode::Selecting
    }

    pub fn selected(&self) -> &BTreeSet<i64> {
        &self.selected
    }

    pub fn is_selected(&self, timestamp: i64) -> bool {
        self.selected.contains(&timestamp)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn enter_selecting(&mut self) {
        self.selected.clear();
        self.mode = SelectionMode::Selecting;
    }

    pub fn exit_selecting(&mut self) {
        self.selected.clear();
        self.mode = SelectionMode::Normal;
    }

    pub fn toggle_mode(&mut self) {
        match self.mode {
            SelectionMode::Normal => self.enter_selecting(),
            SelectionMode::Selecting => self.exit_selecting(),
        }
    }

    /// Flips membership and returns whether the timestamp is now selected.
    /// Outside selecting mode nothing changes.
    pub fn toggle(&mut self, timestamp: i64) -> bool {
        if !self.is_selecting() {
            tracing::debug!("Ignoring toggle of {} outside selecting mode", timestamp);
            return false;
        }
        if self.selected.remove(&timestamp) {
            false
        } else {
            self.selected.insert(timestamp);
            true
        }
    }

    pub fn click(&mut self, timestamp: i64) -> ClickOutcome {
        match self.mode {
            SelectionMode::Normal => ClickOutcome::OpenDetail(timestamp),
            SelectionMode::Selecting => ClickOutcome::Toggled {
                timestamp,
                selected: self.toggle(timestamp),
            },
        }
    }

    /// Deletes the selected records after the prompt agrees.
    ///
    /// Outside selecting mode, or with an empty selection, it never prompts and deletes nothing. Declining leaves mode and
    /// selection untouched. Returns the number of records removed.
    pub fn commit_delete<S, P>(&mut self, store: &mut LedgerStore<S>, prompt: &mut P) -> usize
    where
        S: Storage,
        P: ConfirmPrompt + ?Sized,
    {
        if !self.is_selecting() || self.selected.is_empty() {
            tracing::debug!("Nothing selected, skipping delete");
            return 0;
        }

        if !prompt.confirm(self.selected.len()) {
            tracing::info!("Delete of {} records cancelled", self.selected.len());
            return 0;
        }

        let selected = std::mem::take(&mut self.selected);
        let removed = store.remove_where(|record| selected.contains(&record.timestamp));
        self.exit_selecting();
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemoryStorage;
    use crate::core::ledger::DEFAULT_LEDGER_KEY;
    use crate::domain::model::{OrderRecord, Weight};

    struct ScriptedPrompt {
        answer: bool,
        asked_with: Vec<usize>,
    }

    impl ScriptedPrompt {
        fn answering(answer: bool) -> Self {
            Self {
                answer,
                asked_with: Vec::new(),
            }
        }
    }

    impl ConfirmPrompt for ScriptedPrompt {
        fn confirm(&mut self, count: usize) -> bool {
            self.asked_with.push(count);
            self.answer
        }
    }

    fn store_with(timestamps: &[i64]) -> LedgerStore<MemoryStorage> {
        let mut store = LedgerStore::load(MemoryStorage::new(), DEFAULT_LEDGER_KEY);
        for &timestamp in timestamps {
            store.append(OrderRecord {
                service_name: "Acme".to_string(),
                order_number: String::new(),
                customer_name: String::new(),
                delivery_address: String::new(),
                weight: Weight::Kg(1.0),
                price: Some(5.0),
                confidence: 1.0,
                timestamp,
                weight_photo: None,
                customer_photo: None,
            });
        }
        store
    }

    #[test]
    fn test_click_in_normal_mode_opens_detail() {
        let mut selection = Selection::new();
        assert_eq!(selection.click(42), ClickOutcome::OpenDetail(42));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_toggle_is_symmetric() {
        let mut selection = Selection::new();
        selection.enter_selecting();

        assert_eq!(
            selection.click(7),
            ClickOutcome::Toggled {
                timestamp: 7,
                selected: true
            }
        );
        assert!(!selection.toggle(7));
        assert!(selection.toggle(7));
        assert!(selection.is_selected(7));
    }

    #[test]
    fn test_mode_changes_clear_selection() {
        let mut selection = Selection::new();
        selection.enter_selecting();
        selection.toggle(1);
        selection.toggle_mode();
        assert_eq!(selection.mode(), SelectionMode::Normal);
        assert!(selection.is_empty());

        selection.toggle_mode();
        assert!(selection.is_selecting());
        assert!(selection.is_empty());
    }

    #[test]
    fn test_toggle_outside_selecting_mode_is_ignored() {
        let mut selection = Selection::new();

        assert!(!selection.toggle(1));
        assert!(selection.is_empty());
        assert_eq!(selection.mode(), SelectionMode::Normal);
    }

    #[test]
    fn test_commit_outside_selecting_mode_never_deletes() {
        let mut store = store_with(&[1, 2]);
        let mut selection = Selection::new();
        selection.toggle(1);

        let mut prompt = ScriptedPrompt::answering(true);
        assert_eq!(selection.commit_delete(&mut store, &mut prompt), 0);
        assert!(prompt.asked_with.is_empty());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_commit_removes_selected_and_resets() {
        let mut store = store_with(&[1, 2, 3, 4]);
        let mut selection = Selection::new();
        selection.enter_selecting();
        selection.toggle(2);
        selection.toggle(4);
        selection.toggle(99);

        let mut prompt = ScriptedPrompt::answering(true);
        let removed = selection.commit_delete(&mut store, &mut prompt);

        assert_eq!(removed, 2);
        assert_eq!(prompt.asked_with, vec![3]);
        let remaining: Vec<i64> = store.records().iter().map(|r| r.timestamp).collect();
        assert_eq!(remaining, vec![3, 1]);
        assert_eq!(selection.mode(), SelectionMode::Normal);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_empty_selection_is_noop_without_prompt() {
        let mut store = store_with(&[1, 2]);
        let mut selection = Selection::new();
        selection.enter_selecting();

        let mut prompt = ScriptedPrompt::answering(true);
        assert_eq!(selection.commit_delete(&mut store, &mut prompt), 0);
        assert!(prompt.asked_with.is_empty());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_declined_prompt_keeps_everything() {
        let mut store = store_with(&[1, 2]);
        let mut selection = Selection::new();
        selection.enter_selecting();
        selection.toggle(1);

        let mut prompt = ScriptedPrompt::answering(false);
        assert_eq!(selection.commit_delete(&mut store, &mut prompt), 0);
        assert_eq!(store.len(), 2);
        assert!(selection.is_selecting());
        assert!(selection.is_selected(1));
    }
}
