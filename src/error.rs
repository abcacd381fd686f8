//! Error types for the profiler.

use thiserror::Error;

/// Errors surfaced by the profiler's public operations.
///
/// Most abnormal-but-expected outcomes in this crate are not errors at all
/// (an unknown method during sampling is skipped, a duplicate registry
/// creation returns `None`); this type covers the operations that must fail
/// loudly instead of silently doing nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfilerError {
    /// A collector traversal shape that is declared but not adapted.
    #[error("unsupported traversal interception: {0}")]
    UnsupportedTraversal(&'static str),
}

pub type ProfilerResult<T> = Result<T, ProfilerError>;
