//! Ranked observation counts per runtime type.

use crate::symbol::{Symbol, SymbolTable};

/// A type paired with its monotonically-incrementing observation count.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CountedType {
    ty: Symbol,
    count: u64,
}

impl CountedType {
    pub fn ty(&self) -> Symbol {
        self.ty
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

/// The mutable ranked collection the sampler feeds and the correlator reads.
///
/// Invariant: `total` equals the sum of all entry counts. Mutation happens
/// only inside safepoint-executed operations; ranking order is meaningful
/// only snapshot-to-snapshot.
#[derive(Default)]
pub struct TypeFrequencyTracker {
    entries: Vec<CountedType>,
    total: u64,
}

impl TypeFrequencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bumps the count for `ty`, creating the entry on first observation.
    pub fn record_access(&mut self, ty: Symbol) {
        self.total += 1;

        for entry in self.entries.iter_mut() {
            if entry.ty == ty {
                entry.count += 1;
                return;
            }
        }

        self.entries.push(CountedType { ty, count: 1 });
    }

    pub fn count_of(&self, ty: Symbol) -> u64 {
        self.entries
            .iter()
            .find(|entry| entry.ty == ty)
            .map_or(0, |entry| entry.count)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reorders entries by descending count. The sort is stable, so
    /// equal-count types keep first-observed-first order across calls.
    pub fn rank_descending(&mut self) {
        self.verify();
        self.entries.sort_by(|a, b| b.count.cmp(&a.count));
    }

    /// Discards every entry and resets the total.
    pub fn flush(&mut self) {
        self.verify();
        self.entries.clear();
        self.total = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = &CountedType> + '_ {
        self.entries.iter()
    }

    /// Dumps current entries in their current order.
    pub fn dump(&self, symbols: &SymbolTable) {
        for entry in &self.entries {
            log::info!(target: "profiler", "    {}", symbols.name(entry.ty));
        }
    }

    fn verify(&self) {
        let sum: u64 = self.entries.iter().map(|entry| entry.count).sum();
        assert_eq!(
            self.total, sum,
            "tracker total diverged from entry counts"
        );
    }
}
