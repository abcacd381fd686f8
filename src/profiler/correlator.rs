//! Heap correlation: how much of the live heap do the hot types occupy?
//!
//! Walks the whole heap once for live totals, then once per candidate type,
//! greedily accepting types into the hot set until the byte cutoff is
//! exhausted. O(tracked types x heap size); acceptable because it runs at a
//! configurable, infrequent interval, always at a safepoint.

use crate::{
    symbol::{Symbol, SymbolTable},
    traits::{HeapModel, ObjectClosure, ObjectView},
};

use super::tracker::TypeFrequencyTracker;

/// Whole-heap totals.
#[derive(Default)]
struct LiveCounter {
    count: u64,
    size: u64,
}

impl ObjectClosure for LiveCounter {
    fn do_object(&mut self, obj: ObjectView) {
        self.count = self
            .count
            .checked_add(1)
            .expect("live object count overflowed");
        self.size = self
            .size
            .checked_add(obj.size as u64)
            .expect("live byte size overflowed");
    }
}

/// Totals for objects whose exact type equals one candidate type.
struct InstanceCounter {
    ty: Symbol,
    count: u64,
    size: u64,
}

impl InstanceCounter {
    fn new(ty: Symbol) -> Self {
        Self {
            ty,
            count: 0,
            size: 0,
        }
    }
}

impl ObjectClosure for InstanceCounter {
    fn do_object(&mut self, obj: ObjectView) {
        if obj.ty == self.ty {
            self.count += 1;
            self.size += obj.size as u64;
        }
    }
}

/// `(part / whole) * 100`, with a zero whole reported as 0 rather than NaN.
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

pub struct HeapCorrelator<'a> {
    tracker: &'a mut TypeFrequencyTracker,
    symbols: &'a SymbolTable,
}

impl<'a> HeapCorrelator<'a> {
    pub fn new(tracker: &'a mut TypeFrequencyTracker, symbols: &'a SymbolTable) -> Self {
        Self { tracker, symbols }
    }

    /// Selects the hot set under `cutoff` bytes and reports hot-vs-live
    /// ratios. A zero cutoff accepts every tracked type in current order;
    /// a positive cutoff considers types most-frequent-first.
    ///
    /// Returns accepted types in acceptance order. The tracker is read, not
    /// flushed; the scheduling wrapper flushes after each pass.
    pub fn correlate(&mut self, heap: &mut dyn HeapModel, cutoff: usize) -> Vec<Symbol> {
        if cutoff > 0 {
            self.tracker.rank_descending();
        }

        let mut live = LiveCounter::default();
        heap.ensure_parsable();
        heap.object_iterate(&mut live);

        let candidates: Vec<(Symbol, u64)> = self
            .tracker
            .iter()
            .map(|entry| (entry.ty(), entry.count()))
            .collect();

        let mut hot_set = Vec::new();
        let mut hot_count = 0u64;
        let mut hot_size = 0u64;

        for (ty, observed) in candidates {
            let mut instances = InstanceCounter::new(ty);
            heap.ensure_parsable();
            heap.object_iterate(&mut instances);

            // Types that would push the running hot size past the cutoff are
            // skipped, not retried.
            if cutoff != 0 && hot_size + instances.size > cutoff as u64 {
                continue;
            }

            log::info!(target: "profiler", "{} --- {}", self.symbols.name(ty), observed);
            log::info!(
                target: "profiler",
                "   count: {:7}, {:6.2}%",
                instances.count,
                percentage(instances.count, live.count)
            );
            log::info!(
                target: "profiler",
                "   size:  {:7}, {:6.2}%",
                instances.size,
                percentage(instances.size, live.size)
            );

            hot_count += instances.count;
            hot_size += instances.size;
            hot_set.push(ty);
        }

        log::info!(target: "profiler", "      |    Hot    |    Live   | Hot / Live");
        log::info!(target: "profiler", "-------------------------------------------");
        log::info!(
            target: "profiler",
            "Count | {:9} | {:9} | {:8.4}%",
            hot_count,
            live.count,
            percentage(hot_count, live.count)
        );
        log::info!(
            target: "profiler",
            "Size  | {:9} | {:9} | {:8.4}%",
            hot_size,
            live.size,
            percentage(hot_size, live.size)
        );

        hot_set
    }
}
