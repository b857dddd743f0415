//! Scope-aware resolution of slot indices to declared variables.
//!
//! Variable visibility is modeled as lexical block nesting approximated by
//! program-order label adjacency: a declaration not visible at a block's
//! start label may be visible at the label of an enclosing block, which in
//! program order is an earlier label. The registry records labels in the
//! order the forward scan encounters them, so "enclosing block" becomes
//! "one position earlier".

use crate::insn::LabelId;
use crate::meta::{LocalVar, MethodMeta};

/// Append-only sequence of labels in program order, one entry per label
/// instruction seen so far in the current pass.
#[derive(Clone, Debug, Default)]
pub struct LabelRegistry {
    labels: Vec<LabelId>,
}

impl LabelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: LabelId) {
        self.labels.push(label);
    }

    pub fn position(&self, label: LabelId) -> Option<usize> {
        self.labels.iter().position(|&l| l == label)
    }

    pub fn get(&self, index: usize) -> Option<LabelId> {
        self.labels.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Find the declared variable for `slot` visible at `start`.
///
/// Queries the metadata table at `start`; on a miss, steps exactly one
/// label back in the registry and re-queries, until a declaration is found
/// or no earlier label exists.
pub fn resolve<'m>(
    meta: &'m MethodMeta,
    registry: &LabelRegistry,
    slot: u16,
    start: LabelId,
) -> Option<&'m LocalVar> {
    let mut label = start;
    let mut pos: Option<usize> = None;
    loop {
        if let Some(var) = meta.local_variable(slot, label) {
            return Some(var);
        }
        let p = match pos {
            Some(p) => p,
            None => registry.position(label)?,
        };
        if p == 0 {
            return None;
        }
        label = registry.get(p - 1)?;
        pos = Some(p - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(count: u32) -> LabelRegistry {
        let mut registry = LabelRegistry::new();
        for i in 0..count {
            registry.push(LabelId(i));
        }
        registry
    }

    fn meta(locals: Vec<LocalVar>) -> MethodMeta {
        MethodMeta {
            name: "demo.Pages.show".into(),
            is_static: true,
            has_return_type: false,
            context_slot: None,
            locals: Some(locals),
        }
    }

    fn local(slot: u16, name: &str, start: u32) -> LocalVar {
        LocalVar {
            slot,
            name: name.into(),
            type_tag: 'I',
            scope_start: LabelId(start),
            scope_end: LabelId(start + 1),
        }
    }

    #[test]
    fn test_direct_hit() {
        let meta = meta(vec![local(1, "age", 2)]);
        let registry = registry(3);
        let var = resolve(&meta, &registry, 1, LabelId(2)).unwrap();
        assert_eq!(var.name, "age");
    }

    #[test]
    fn test_steps_back_through_enclosing_blocks() {
        // Declared at L0, queried from L2: misses at L2 and L1, hits at L0
        let meta = meta(vec![local(1, "age", 0)]);
        let registry = registry(3);
        let var = resolve(&meta, &registry, 1, LabelId(2)).unwrap();
        assert_eq!(var.name, "age");
    }

    #[test]
    fn test_exhausted_at_first_label() {
        let meta = meta(vec![local(1, "age", 5)]);
        let registry = registry(3);
        assert!(resolve(&meta, &registry, 1, LabelId(0)).is_none());
    }

    #[test]
    fn test_unknown_label() {
        let meta = meta(vec![local(1, "age", 0)]);
        let registry = registry(3);
        // Label never registered and no declaration at it: unresolvable
        assert!(resolve(&meta, &registry, 1, LabelId(9)).is_none());
    }

    #[test]
    fn test_wrong_slot_never_resolves() {
        let meta = meta(vec![local(1, "age", 0)]);
        let registry = registry(3);
        assert!(resolve(&meta, &registry, 2, LabelId(2)).is_none());
    }

    #[test]
    fn test_nearest_enclosing_declaration_wins() {
        // Slot 1 declared at both L0 and L1; querying from L2 must find
        // the L1 declaration first
        let meta = meta(vec![local(1, "outer", 0), local(1, "inner", 1)]);
        let registry = registry(3);
        let var = resolve(&meta, &registry, 1, LabelId(2)).unwrap();
        assert_eq!(var.name, "inner");
    }
}
