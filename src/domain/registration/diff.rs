use std::collections::BTreeSet;

use serde::Serialize;

/// Pairs to insert and delete to turn `current` into `desired`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationDiff<K: Ord> {
    pub added: Vec<K>,
    pub removed: Vec<K>,
}

impl<K: Ord + Copy> RegistrationDiff<K> {
    /// Duplicates in either input are ignored; outputs are sorted
    pub fn between(current: &[K], desired: &[K]) -> Self {
        let current: BTreeSet<K> = current.iter().copied().collect();
        let desired: BTreeSet<K> = desired.iter().copied().collect();

        Self {
            added: desired.difference(&current).copied().collect(),
            removed: current.difference(&desired).copied().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

impl<K: Ord> Default for RegistrationDiff<K> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            removed: Vec::new(),
        }
    }
}
