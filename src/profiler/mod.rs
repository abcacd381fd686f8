//! The profile-guided heap-locality optimizer.
//!
//! Data flow: the JIT registers per-method access sets once per compiled
//! method; the periodic stack sampler attributes execution activity to types
//! through those sets; the periodic heap correlator turns the attributed
//! counts into a hot set under a byte budget and flushes the counts; the
//! reorder engine independently resorts collector traversals by type name.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::{
    env::read_uint_from_env,
    symbol::{Symbol, SymbolTable},
    traits::{HeapModel, ThreadSet},
};

use self::{
    access_registry::{AccessRegistry, AccessSet, MethodKey},
    correlator::HeapCorrelator,
    sampler::StackSampler,
    tracker::TypeFrequencyTracker,
};

pub mod access_registry;
pub mod correlator;
pub mod reorder;
pub mod sampler;
pub mod scheduler;
pub mod tracker;

/// Tunables. The only configuration surface: two scheduling intervals and
/// the correlator's byte-size cutoff (0 = accept every tracked type).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ProfilerArguments {
    pub sample_interval_ms: usize,
    pub correlate_interval_ms: usize,
    pub hot_set_cutoff: usize,
}

impl Default for ProfilerArguments {
    fn default() -> Self {
        Self {
            sample_interval_ms: 10,
            correlate_interval_ms: 1000,
            hot_set_cutoff: 500_000,
        }
    }
}

impl ProfilerArguments {
    pub fn from_env() -> Self {
        let mut args = Self::default();

        if let Some(value) = read_uint_from_env("HOTLAYOUT_SAMPLE_INTERVAL") {
            args.sample_interval_ms = value;
        }
        if let Some(value) = read_uint_from_env("HOTLAYOUT_CORRELATE_INTERVAL") {
            args.correlate_interval_ms = value;
        }
        if let Some(value) = read_uint_from_env("HOTLAYOUT_HOT_SET_CUTOFF") {
            args.hot_set_cutoff = value;
        }

        args
    }
}

/// Process-scoped profiler context: the access registry and frequency
/// tracker behind their single-writer locks, plus the shared symbol table.
///
/// Contention on the locks is impossible under the documented discipline
/// (all mutation happens inside serialized safepoint operations); they exist
/// so the context can be shared across the scheduling threads at all.
pub struct Profiler {
    arguments: ProfilerArguments,
    symbols: Arc<SymbolTable>,
    registry: Mutex<AccessRegistry>,
    tracker: Mutex<TypeFrequencyTracker>,
}

impl Profiler {
    pub fn new(symbols: Arc<SymbolTable>, arguments: ProfilerArguments) -> Arc<Self> {
        Arc::new(Self {
            arguments,
            symbols,
            registry: Mutex::new(AccessRegistry::new()),
            tracker: Mutex::new(TypeFrequencyTracker::new()),
        })
    }

    pub fn arguments(&self) -> &ProfilerArguments {
        &self.arguments
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Compile-time entry point: publishes the access set for one compiled
    /// method. Returns `false` if a record for this key already exists, in
    /// which case nothing is created.
    pub fn register_method(&self, key: MethodKey, accesses: AccessSet) -> bool {
        self.registry.lock().create(key, accesses).is_some()
    }

    pub fn registry(&self) -> MutexGuard<'_, AccessRegistry> {
        self.registry.lock()
    }

    pub fn tracker(&self) -> MutexGuard<'_, TypeFrequencyTracker> {
        self.tracker.lock()
    }

    /// One sampling pass. Must be called from a safepoint operation.
    pub fn sample_threads(&self, threads: &dyn ThreadSet) {
        let registry = self.registry.lock();
        let mut tracker = self.tracker.lock();
        StackSampler::new(&registry, &mut tracker).sample(threads);
    }

    /// One correlation pass; the tracker keeps its counts. Must be called
    /// from a safepoint operation.
    pub fn correlate(&self, heap: &mut dyn HeapModel) -> Vec<Symbol> {
        let mut tracker = self.tracker.lock();
        HeapCorrelator::new(&mut tracker, &self.symbols).correlate(heap, self.arguments.hot_set_cutoff)
    }

    /// One correlation pass followed by a tracker flush, as the periodic
    /// wrapper drives it.
    pub fn correlate_and_flush(&self, heap: &mut dyn HeapModel) -> Vec<Symbol> {
        let mut tracker = self.tracker.lock();
        let hot_set =
            HeapCorrelator::new(&mut tracker, &self.symbols).correlate(heap, self.arguments.hot_set_cutoff);
        tracker.flush();
        hot_set
    }
}
