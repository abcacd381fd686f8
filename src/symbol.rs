//! Interned qualified-name handles.
//!
//! The runtime's type system owns the canonical name storage; the profiler
//! only stores and compares [`Symbol`] handles. One table serves both
//! compile-time interning (registry population) and pause-time name
//! resolution (ranking reports, reference sorting), so it is internally
//! locked.

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;

/// A process-wide-unique handle for an interned qualified name.
///
/// Handles from different tables must never be mixed; equality is index
/// equality.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Symbol(u32);

impl Symbol {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Default)]
struct TableInner {
    names: Vec<Arc<str>>,
    index: HashMap<Arc<str>, Symbol>,
}

#[derive(Default)]
pub struct SymbolTable {
    inner: Mutex<TableInner>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle for `name`, creating one on first sight.
    pub fn intern(&self, name: &str) -> Symbol {
        let mut inner = self.inner.lock();

        if let Some(&sym) = inner.index.get(name) {
            return sym;
        }

        let sym = Symbol(inner.names.len() as u32);
        let name: Arc<str> = Arc::from(name);
        inner.names.push(name.clone());
        inner.index.insert(name, sym);

        sym
    }

    /// Resolves a handle back to its name. A handle this table never handed
    /// out is an internal-consistency violation.
    pub fn name(&self, sym: Symbol) -> Arc<str> {
        self.inner
            .lock()
            .names
            .get(sym.index())
            .cloned()
            .expect("symbol handle does not belong to this table")
    }

    pub fn len(&self) -> usize {
        self.inner.lock().names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A compiler-side symbolic identifier, as handed over by the JIT when it
/// publishes per-method access metadata.
///
/// Resolution to a canonical [`Symbol`] is one-way and side-effect-free; an
/// unresolvable identifier has no error path of its own and is treated as
/// not-found by whoever asked.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CompilerSymbol {
    sym: Option<Symbol>,
}

impl CompilerSymbol {
    pub fn resolved(sym: Symbol) -> Self {
        Self { sym: Some(sym) }
    }

    pub fn unresolved() -> Self {
        Self { sym: None }
    }

    pub fn resolve(self) -> Option<Symbol> {
        self.sym
    }
}
