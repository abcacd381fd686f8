//! Profile-guided heap locality optimizer for garbage-collected runtimes.
//!
//! The crate samples call stacks at safepoints to learn which runtime types
//! hot compiled code touches, correlates those types against the live heap to
//! select a "hot set" under a byte budget, and reorders the references a
//! collector traverses so same-typed objects are processed contiguously.
//!
//! The embedding runtime supplies the heap, thread, object-model and
//! safepoint collaborators (see [`traits`] and [`safepoint`]); this crate
//! supplies the registries, the sampling and correlation passes, the reorder
//! adapters and the periodic scheduling around them.

pub mod env;
pub mod error;
pub mod profiler;
pub mod safepoint;
pub mod symbol;
pub mod traits;

pub use error::{ProfilerError, ProfilerResult};
pub use profiler::{Profiler, ProfilerArguments};
pub use symbol::{CompilerSymbol, Symbol, SymbolTable};

#[cfg(test)]
pub(crate) fn init_test_logging() {
    use once_cell::sync::Lazy;

    static GUARD: Lazy<()> = Lazy::new(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });

    Lazy::force(&GUARD);
}
