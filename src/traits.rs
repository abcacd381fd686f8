//! Collaborator contracts.
//!
//! The profiler has no heap, threads, or collector of its own; the embedding
//! runtime implements these traits and every heavy operation in this crate is
//! driven through them at a safepoint.

use crate::{profiler::access_registry::MethodKey, symbol::Symbol};

/// Per-object view the heap hands to iteration closures: exact runtime type
/// and byte size.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ObjectView {
    pub ty: Symbol,
    pub size: usize,
}

pub trait ObjectClosure {
    fn do_object(&mut self, obj: ObjectView);
}

/// The heap collaborator. `ensure_parsable` must be requested before every
/// traversal; `object_iterate` visits every live object exactly once.
pub trait HeapModel {
    fn ensure_parsable(&mut self);
    fn object_iterate(&mut self, closure: &mut dyn ObjectClosure);
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FrameKind {
    Interpreted,
    Native,
    Compiled,
}

/// One stack frame as seen by the sampler. Compiled frames must carry their
/// owning method; a compiled frame without one is a broken invariant in the
/// frame-walking collaborator.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FrameView {
    pub kind: FrameKind,
    pub method: Option<MethodKey>,
}

pub trait ExecutionThread {
    /// Whether this thread runs managed code at all. Pure-native threads are
    /// skipped by the sampler.
    fn is_managed(&self) -> bool;

    fn has_frames(&self) -> bool;

    /// Visits frames from the top of the stack downwards, stopping when `f`
    /// returns `false` or the stack bottom is reached.
    fn walk_frames(&self, f: &mut dyn FnMut(FrameView) -> bool);
}

/// The thread-set collaborator: iterates every live execution thread while
/// the world is stopped.
pub trait ThreadSet {
    fn threads_do(&self, f: &mut dyn FnMut(&dyn ExecutionThread));
}

/// An opaque full-width reference slot owned by the collector.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Slot(pub usize);

/// An opaque compressed reference slot. Its target's type cannot be resolved
/// without a decode step, so these are never reordered.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NarrowSlot(pub usize);

/// The closure shape the collector's traversal drivers invoke per reference.
pub trait ReferenceVisitor {
    fn visit(&mut self, slot: Slot);
    fn visit_narrow(&mut self, slot: NarrowSlot);
}

/// The object-model collaborator the reorder engine consults per full slot:
/// a liveness/validity predicate and exact-type resolution of the target.
pub trait TargetModel {
    fn is_valid(&self, slot: Slot) -> bool;
    fn type_of(&self, slot: Slot) -> Symbol;
}
