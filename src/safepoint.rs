//! Safepoint-executed operations.
//!
//! The embedding runtime owns safepoint orchestration; this crate only
//! submits operations to it. Every piece of shared profiler state is mutated
//! exclusively inside such an operation, which is the crate's sole
//! concurrency discipline.

use parking_lot::Mutex;

/// A unit of work to be run while the world is stopped. Operations are not
/// cancellable; once started they run to completion.
pub trait VmOperation {
    fn name(&self) -> &'static str;
    fn doit(&mut self);
}

/// The safepoint collaborator: requests execution of `op` at the next
/// available global pause point. Implementations must serialize operations
/// with respect to each other and to any other pause-triggering activity.
pub trait SafepointExecutor: Send + Sync {
    fn execute(&self, op: &mut dyn VmOperation);
}

/// Executor for embeddings (and tests) without a real safepoint mechanism:
/// runs operations inline, serialized behind one lock. This preserves the
/// single-writer discipline but stops nobody's world.
#[derive(Default)]
pub struct SerialExecutor {
    lock: Mutex<()>,
}

impl SerialExecutor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SafepointExecutor for SerialExecutor {
    fn execute(&self, op: &mut dyn VmOperation) {
        let _guard = self.lock.lock();
        log::debug!(target: "profiler", "executing {} inline", op.name());
        op.doit();
    }
}
