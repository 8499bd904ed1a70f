use std::collections::BTreeMap;

use hashbrown::HashMap;

use super::action::{Action, ActionSpec};
use super::callbacks::CallbackRegistry;
use crate::trigger::TriggerKey;

/// A guide document as authored: trigger key -> untyped actions.
///
/// Actions stay untyped until [`GuideTable::from_document`] so one badly
/// written action can't fail the whole file.
pub type GuideDocument = BTreeMap<String, Vec<serde_json::Value>>;

/// Trigger key -> ordered actions for one zone.
///
/// Tables are immutable once loaded; a zone change swaps in a whole new table.
#[derive(Debug, Clone, Default)]
pub struct GuideTable {
    entries: HashMap<String, Vec<Action>>,
    /// Actions dropped at load time because they failed validation
    rejected: usize,
}

impl GuideTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from an authored document.
    ///
    /// Invalid actions are logged and left out; the rest of their entry still
    /// loads, so one typo doesn't disable a whole mechanic.
    pub fn from_document(document: GuideDocument, callbacks: &CallbackRegistry) -> Self {
        let mut table = Self::new();

        for (key, specs) in document {
            let mut actions = Vec::with_capacity(specs.len());
            for (index, raw) in specs.into_iter().enumerate() {
                match ActionSpec::from_value(raw).and_then(|spec| spec.into_action(callbacks)) {
                    Ok(action) => actions.push(action),
                    Err(e) => {
                        tracing::warn!(target: "guide", key = %key, index, error = %e, "Skipping invalid action");
                        table.rejected += 1;
                    }
                }
            }
            table.entries.insert(key, actions);
        }

        table
    }

    /// Insert an entry. A later insert under the same key wins.
    pub fn insert(&mut self, key: TriggerKey, actions: Vec<Action>) {
        self.entries.insert(key.into_string(), actions);
    }

    /// Builder-style [`GuideTable::insert`].
    pub fn with(mut self, key: TriggerKey, actions: Vec<Action>) -> Self {
        self.insert(key, actions);
        self
    }

    pub fn get(&self, key: &TriggerKey) -> Option<&[Action]> {
        self.entries.get(key.as_str()).map(Vec::as_slice)
    }

    pub fn contains(&self, key: &TriggerKey) -> bool {
        self.entries.contains_key(key.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }
}
