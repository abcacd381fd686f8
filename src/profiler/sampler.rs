//! Safepoint stack sampling.
//!
//! For every live execution thread the sampler finds the topmost managed
//! frame, requires it to be compiled code, resolves its owning method in the
//! access registry and bumps the frequency tracker once per member that
//! method accesses. Threads with no such frame and methods the instrumented
//! compilation path never saw are skipped silently; both are common.

use crate::traits::{ExecutionThread, FrameKind, FrameView, ThreadSet};

use super::{access_registry::AccessRegistry, tracker::TypeFrequencyTracker};

pub struct StackSampler<'a> {
    registry: &'a AccessRegistry,
    tracker: &'a mut TypeFrequencyTracker,
}

impl<'a> StackSampler<'a> {
    pub fn new(registry: &'a AccessRegistry, tracker: &'a mut TypeFrequencyTracker) -> Self {
        Self { registry, tracker }
    }

    /// One linear pass over the thread set. Must run at a safepoint.
    pub fn sample(&mut self, threads: &dyn ThreadSet) {
        threads.threads_do(&mut |thread| self.sample_thread(thread));
    }

    fn sample_thread(&mut self, thread: &dyn ExecutionThread) {
        if !thread.is_managed() || !thread.has_frames() {
            return;
        }

        // Topmost managed frame; the walk skips native frames and terminates
        // at the first hit or the stack bottom.
        let mut top: Option<FrameView> = None;
        thread.walk_frames(&mut |frame| {
            if frame.kind == FrameKind::Native {
                return true;
            }
            top = Some(frame);
            false
        });

        let frame = match top {
            Some(frame) => frame,
            None => return,
        };

        if frame.kind != FrameKind::Compiled {
            return;
        }

        // A compiled frame without a method means the frame-walking
        // collaborator broke its own invariant; the instrumentation cannot be
        // trusted past this point.
        let method = frame
            .method
            .expect("compiled frame without an associated method");

        // Some methods never go through the instrumented compilation path
        // and have no record. Ignore them.
        if let Some(record) = self.registry.lookup(&method) {
            for &member in record.accesses().iter() {
                self.tracker.record_access(member);
            }
        }
    }
}
