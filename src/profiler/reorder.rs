//! Reference reordering between a collector's traversal driver and its real
//! processing closure.
//!
//! Each adapter collects the driver's references into call-scoped buffers,
//! sorts the full-width slots by the qualified name of the target's type and
//! forwards everything to the destination: narrow slots first in encounter
//! order, then the sorted full slots. The forwarded set is a permutation of
//! the collected set; only the visitation order changes.

use std::sync::Arc;

use crate::{
    error::{ProfilerError, ProfilerResult},
    symbol::SymbolTable,
    traits::{NarrowSlot, ReferenceVisitor, Slot, TargetModel},
};

/// Buffering visitor substituted for the collector's own closure while the
/// driver runs. Full slots must pass the validity predicate; narrow slots
/// are taken unconditionally.
struct CollectingVisitor<'a> {
    model: &'a dyn TargetModel,
    full: Vec<Slot>,
    narrow: Vec<NarrowSlot>,
}

impl<'a> CollectingVisitor<'a> {
    fn new(model: &'a dyn TargetModel) -> Self {
        Self {
            model,
            full: Vec::with_capacity(512),
            narrow: Vec::with_capacity(512),
        }
    }
}

impl ReferenceVisitor for CollectingVisitor<'_> {
    fn visit(&mut self, slot: Slot) {
        if self.model.is_valid(slot) {
            self.full.push(slot);
        }
    }

    fn visit_narrow(&mut self, slot: NarrowSlot) {
        self.narrow.push(slot);
    }
}

pub struct ReorderEngine<'a> {
    model: &'a dyn TargetModel,
    symbols: &'a SymbolTable,
}

impl<'a> ReorderEngine<'a> {
    pub fn new(model: &'a dyn TargetModel, symbols: &'a SymbolTable) -> Self {
        Self { model, symbols }
    }

    /// Sorts full slots by the target type's qualified name, byte-wise
    /// lexicographic. `Vec::sort_by` is stable, so equal names keep their
    /// encounter order.
    fn sort(&self, slots: &mut Vec<Slot>) {
        let mut keyed: Vec<(Arc<str>, Slot)> = slots
            .drain(..)
            .map(|slot| (self.symbols.name(self.model.type_of(slot)), slot))
            .collect();

        keyed.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

        slots.extend(keyed.into_iter().map(|(_, slot)| slot));
    }

    fn forward(
        &self,
        narrow: Vec<NarrowSlot>,
        full: Vec<Slot>,
        destination: &mut dyn ReferenceVisitor,
    ) {
        for slot in narrow {
            destination.visit_narrow(slot);
        }
        for slot in full {
            destination.visit(slot);
        }
    }

    /// Adapter for the single-argument driver shape.
    pub fn intercept(
        &self,
        driver: &mut dyn FnMut(&mut dyn ReferenceVisitor),
        destination: &mut dyn ReferenceVisitor,
    ) {
        let mut collector = CollectingVisitor::new(self.model);
        driver(&mut collector);

        let CollectingVisitor {
            mut full, narrow, ..
        } = collector;
        self.sort(&mut full);
        self.forward(narrow, full, destination);
    }

    /// Adapter for the driver shape carrying an extra flag; the flag is
    /// forwarded unset, as the traversal phases using this shape expect.
    pub fn intercept_flagged(
        &self,
        driver: &mut dyn FnMut(&mut dyn ReferenceVisitor, bool),
        destination: &mut dyn ReferenceVisitor,
    ) {
        let mut collector = CollectingVisitor::new(self.model);
        driver(&mut collector, false);

        let CollectingVisitor {
            mut full, narrow, ..
        } = collector;
        self.sort(&mut full);
        self.forward(narrow, full, destination);
    }

    /// Declared adapter for the class-following driver shape. Not adapted:
    /// no traversal phase with a known semantic uses it yet.
    pub fn intercept_with_class_following(
        &self,
        _driver: &mut dyn FnMut(&mut dyn ReferenceVisitor),
        _destination: &mut dyn ReferenceVisitor,
        _follow_class: &mut dyn ReferenceVisitor,
    ) -> ProfilerResult<()> {
        Err(ProfilerError::UnsupportedTraversal(
            "class-following traversal",
        ))
    }

    /// Declared adapter for the code-blob-scanning driver shape. Not
    /// adapted, as above.
    pub fn intercept_with_code_blob_scan(
        &self,
        _driver: &mut dyn FnMut(&mut dyn ReferenceVisitor),
        _destination: &mut dyn ReferenceVisitor,
        _class_loader_data: &mut dyn ReferenceVisitor,
        _code_blobs: &mut dyn ReferenceVisitor,
    ) -> ProfilerResult<()> {
        Err(ProfilerError::UnsupportedTraversal(
            "code-blob-scanning traversal",
        ))
    }

    /// Logs the full slots a driver offers, in encounter order, with their
    /// target type names. Diagnostic aid for checking the layout a previous
    /// interception produced.
    pub fn dump_order(&self, driver: &mut dyn FnMut(&mut dyn ReferenceVisitor)) {
        let mut collector = CollectingVisitor::new(self.model);
        driver(&mut collector);

        for (index, &slot) in collector.full.iter().enumerate() {
            log::info!(
                target: "profiler",
                "{:4}: {}",
                index,
                self.symbols.name(self.model.type_of(slot))
            );
        }
    }

    pub fn dump_order_flagged(&self, driver: &mut dyn FnMut(&mut dyn ReferenceVisitor, bool)) {
        let mut collector = CollectingVisitor::new(self.model);
        driver(&mut collector, false);

        for (index, &slot) in collector.full.iter().enumerate() {
            log::info!(
                target: "profiler",
                "{:4}: {}",
                index,
                self.symbols.name(self.model.type_of(slot))
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use super::*;
    use crate::symbol::{Symbol, SymbolTable};

    struct MockModel {
        types: HashMap<Slot, Symbol>,
        invalid: HashSet<Slot>,
    }

    impl TargetModel for MockModel {
        fn is_valid(&self, slot: Slot) -> bool {
            !self.invalid.contains(&slot)
        }

        fn type_of(&self, slot: Slot) -> Symbol {
            self.types[&slot]
        }
    }

    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    enum Forwarded {
        Full(Slot),
        Narrow(NarrowSlot),
    }

    #[derive(Default)]
    struct RecordingVisitor {
        events: Vec<Forwarded>,
    }

    impl ReferenceVisitor for RecordingVisitor {
        fn visit(&mut self, slot: Slot) {
            self.events.push(Forwarded::Full(slot));
        }

        fn visit_narrow(&mut self, slot: NarrowSlot) {
            self.events.push(Forwarded::Narrow(slot));
        }
    }

    fn model_of(table: &SymbolTable, names: &[&str]) -> MockModel {
        let types = names
            .iter()
            .enumerate()
            .map(|(index, name)| (Slot(index), table.intern(name)))
            .collect();
        MockModel {
            types,
            invalid: HashSet::new(),
        }
    }

    #[test]
    fn full_slots_are_sorted_by_type_name() {
        let table = SymbolTable::new();
        let model = model_of(&table, &["Zebra", "Apple", "Mango"]);
        let engine = ReorderEngine::new(&model, &table);

        let mut destination = RecordingVisitor::default();
        engine.intercept(
            &mut |visitor| {
                visitor.visit(Slot(0));
                visitor.visit(Slot(1));
                visitor.visit(Slot(2));
            },
            &mut destination,
        );

        assert_eq!(
            destination.events,
            vec![
                Forwarded::Full(Slot(1)), // Apple
                Forwarded::Full(Slot(2)), // Mango
                Forwarded::Full(Slot(0)), // Zebra
            ]
        );
    }

    #[test]
    fn narrow_slots_come_first_in_encounter_order() {
        let table = SymbolTable::new();
        let model = model_of(&table, &["Beta", "Alpha"]);
        let engine = ReorderEngine::new(&model, &table);

        let mut destination = RecordingVisitor::default();
        engine.intercept(
            &mut |visitor| {
                visitor.visit(Slot(0));
                visitor.visit_narrow(NarrowSlot(7));
                visitor.visit(Slot(1));
                visitor.visit_narrow(NarrowSlot(3));
            },
            &mut destination,
        );

        assert_eq!(
            destination.events,
            vec![
                Forwarded::Narrow(NarrowSlot(7)),
                Forwarded::Narrow(NarrowSlot(3)),
                Forwarded::Full(Slot(1)), // Alpha
                Forwarded::Full(Slot(0)), // Beta
            ]
        );
    }

    #[test]
    fn forwarded_set_is_a_permutation_of_the_offered_set() {
        let table = SymbolTable::new();
        let names: Vec<String> = (0..32).map(|i| format!("Type{:02}", 31 - i)).collect();
        let name_refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
        let model = model_of(&table, &name_refs);
        let engine = ReorderEngine::new(&model, &table);

        let mut destination = RecordingVisitor::default();
        engine.intercept(
            &mut |visitor| {
                for index in 0..32 {
                    visitor.visit(Slot(index));
                }
            },
            &mut destination,
        );

        let forwarded: HashSet<Slot> = destination
            .events
            .iter()
            .map(|event| match event {
                Forwarded::Full(slot) => *slot,
                Forwarded::Narrow(_) => unreachable!(),
            })
            .collect();
        assert_eq!(forwarded.len(), 32);
        assert_eq!(forwarded, (0..32).map(Slot).collect::<HashSet<_>>());

        // And the order is nondecreasing by type name.
        let ordered: Vec<Arc<str>> = destination
            .events
            .iter()
            .map(|event| match event {
                Forwarded::Full(slot) => table.name(model.type_of(*slot)),
                Forwarded::Narrow(_) => unreachable!(),
            })
            .collect();
        assert!(ordered.windows(2).all(|w| w[0].as_bytes() <= w[1].as_bytes()));
    }

    #[test]
    fn equal_names_keep_encounter_order() {
        let table = SymbolTable::new();
        let model = model_of(&table, &["Same", "Same", "Aardvark", "Same"]);
        let engine = ReorderEngine::new(&model, &table);

        let mut destination = RecordingVisitor::default();
        engine.intercept(
            &mut |visitor| {
                for index in 0..4 {
                    visitor.visit(Slot(index));
                }
            },
            &mut destination,
        );

        assert_eq!(
            destination.events,
            vec![
                Forwarded::Full(Slot(2)), // Aardvark
                Forwarded::Full(Slot(0)),
                Forwarded::Full(Slot(1)),
                Forwarded::Full(Slot(3)),
            ]
        );
    }

    #[test]
    fn invalid_references_are_not_forwarded() {
        let table = SymbolTable::new();
        let mut model = model_of(&table, &["Apple", "Mango"]);
        model.invalid.insert(Slot(0));
        let engine = ReorderEngine::new(&model, &table);

        let mut destination = RecordingVisitor::default();
        engine.intercept(
            &mut |visitor| {
                visitor.visit(Slot(0));
                visitor.visit(Slot(1));
            },
            &mut destination,
        );

        assert_eq!(destination.events, vec![Forwarded::Full(Slot(1))]);
    }

    #[test]
    fn flagged_adapter_behaves_like_the_plain_one() {
        let table = SymbolTable::new();
        let model = model_of(&table, &["Zebra", "Apple"]);
        let engine = ReorderEngine::new(&model, &table);

        let mut seen_flag = None;
        let mut destination = RecordingVisitor::default();
        engine.intercept_flagged(
            &mut |visitor, flag| {
                seen_flag = Some(flag);
                visitor.visit(Slot(0));
                visitor.visit(Slot(1));
            },
            &mut destination,
        );

        assert_eq!(seen_flag, Some(false));
        assert_eq!(
            destination.events,
            vec![Forwarded::Full(Slot(1)), Forwarded::Full(Slot(0))]
        );
    }

    #[test]
    fn dump_order_reports_without_reordering() {
        crate::init_test_logging();
        let table = SymbolTable::new();
        let model = model_of(&table, &["Zebra", "Apple"]);
        let engine = ReorderEngine::new(&model, &table);

        let mut offered = 0;
        engine.dump_order(&mut |visitor| {
            visitor.visit(Slot(0));
            visitor.visit(Slot(1));
            offered += 1;
        });
        engine.dump_order_flagged(&mut |visitor, _flag| {
            visitor.visit(Slot(0));
            offered += 1;
        });
        assert_eq!(offered, 2);
    }

    #[test]
    fn unadapted_shapes_fail_loudly() {
        let table = SymbolTable::new();
        let model = model_of(&table, &[]);
        let engine = ReorderEngine::new(&model, &table);

        let mut destination = RecordingVisitor::default();
        let mut other = RecordingVisitor::default();
        let mut third = RecordingVisitor::default();

        let err = engine
            .intercept_with_class_following(&mut |_| {}, &mut destination, &mut other)
            .unwrap_err();
        assert!(matches!(err, ProfilerError::UnsupportedTraversal(_)));

        let err = engine
            .intercept_with_code_blob_scan(&mut |_| {}, &mut destination, &mut other, &mut third)
            .unwrap_err();
        assert!(matches!(err, ProfilerError::UnsupportedTraversal(_)));
        assert!(destination.events.is_empty());
    }
}
