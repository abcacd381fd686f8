//! Deduplicated per-method access metadata.
//!
//! The JIT publishes, once per compiled method, the set of members that
//! method's code touches. The sampler later resolves a thread's topmost
//! compiled frame back to its record here.

use crate::symbol::{CompilerSymbol, Symbol, SymbolTable};

/// Identity of a compiled method: declaring type, member name, descriptor.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MethodKey {
    pub declaring: Symbol,
    pub name: Symbol,
    pub descriptor: Symbol,
}

impl MethodKey {
    pub fn new(declaring: Symbol, name: Symbol, descriptor: Symbol) -> Self {
        Self {
            declaring,
            name,
            descriptor,
        }
    }

    /// Resolves a compiler-side triple to a key. Any unresolvable part makes
    /// the whole key unresolvable, which lookups treat as not-found.
    pub fn resolve(
        declaring: CompilerSymbol,
        name: CompilerSymbol,
        descriptor: CompilerSymbol,
    ) -> Option<Self> {
        Some(Self {
            declaring: declaring.resolve()?,
            name: name.resolve()?,
            descriptor: descriptor.resolve()?,
        })
    }
}

/// Insertion-ordered, insertion-deduplicated set of accessed members.
/// Iteration order is insertion order so reports are reproducible.
#[derive(Clone, Default, Debug)]
pub struct AccessSet {
    members: Vec<Symbol>,
}

impl AccessSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member, ignoring repeats. Returns whether the set grew.
    pub fn add(&mut self, member: Symbol) -> bool {
        if self.members.contains(&member) {
            return false;
        }
        self.members.push(member);
        true
    }

    pub fn contains(&self, member: Symbol) -> bool {
        self.members.contains(&member)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> + '_ {
        self.members.iter()
    }
}

impl FromIterator<Symbol> for AccessSet {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        let mut set = Self::new();
        for member in iter {
            set.add(member);
        }
        set
    }
}

/// One registry entry: a method key plus the members its code accesses.
/// At most one record exists per distinct key.
pub struct AccessRecord {
    key: MethodKey,
    accesses: AccessSet,
}

impl AccessRecord {
    pub fn key(&self) -> &MethodKey {
        &self.key
    }

    pub fn accesses(&self) -> &AccessSet {
        &self.accesses
    }

    /// Appends a newly discovered access; repeats are ignored. The key is
    /// never mutated.
    pub fn add_access(&mut self, member: Symbol) -> bool {
        self.accesses.add(member)
    }
}

/// The process-lifetime method registry. Lookup is a linear scan; the
/// expected scale is hundreds to low thousands of compiled methods.
#[derive(Default)]
pub struct AccessRegistry {
    records: Vec<AccessRecord>,
}

impl AccessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record for `key`. A duplicate key creates nothing and
    /// returns `None`; the caller treats this as a non-fatal no-op.
    pub fn create(&mut self, key: MethodKey, accesses: AccessSet) -> Option<&mut AccessRecord> {
        if self.lookup(&key).is_some() {
            return None;
        }

        self.records.push(AccessRecord { key, accesses });
        self.records.last_mut()
    }

    pub fn lookup(&self, key: &MethodKey) -> Option<&AccessRecord> {
        self.records.iter().find(|record| record.key == *key)
    }

    /// Lookup by compiler-side identifiers. An unresolvable identifier is
    /// simply not found.
    pub fn lookup_unresolved(
        &self,
        declaring: CompilerSymbol,
        name: CompilerSymbol,
        descriptor: CompilerSymbol,
    ) -> Option<&AccessRecord> {
        let key = MethodKey::resolve(declaring, name, descriptor)?;
        self.lookup(&key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AccessRecord> + '_ {
        self.records.iter()
    }

    /// Dumps every record and its access set, in insertion order.
    pub fn print_all(&self, symbols: &SymbolTable) {
        log::info!(target: "profiler", "---------------------------------");
        for record in &self.records {
            log::info!(
                target: "profiler",
                "{}.{}{}:",
                symbols.name(record.key.declaring),
                symbols.name(record.key.name),
                symbols.name(record.key.descriptor)
            );
            for &member in record.accesses.iter() {
                log::info!(target: "profiler", "    {}", symbols.name(member));
            }
        }
        log::info!(target: "profiler", "---------------------------------");
    }
}
