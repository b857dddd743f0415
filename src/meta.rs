//! Method metadata collaborator value.
//!
//! Supplied already-parsed and read-only, once per method, before the
//! transformation begins. The engine consumes four facts: whether the
//! method is static, whether it declares a real return type, the optional
//! explicit context parameter slot, and the local-variable table.

use serde::{Deserialize, Serialize};

use crate::insn::LabelId;

/// One declared local variable with its valid-scope interval.
///
/// Scope intervals for the same slot never overlap within one method.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocalVar {
    pub slot: u16,
    pub name: String,
    /// Primitive/reference type tag (`'I'`, `'Z'`, `'S'`, `'B'`, `'C'`
    /// for the boxable primitives; anything else is a reference or wide
    /// type and is never boxed).
    pub type_tag: char,
    pub scope_start: LabelId,
    pub scope_end: LabelId,
}

/// Read-only metadata for the method being transformed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodMeta {
    /// Qualified method name, used in fatal-error reports.
    pub name: String,
    pub is_static: bool,
    /// True when the method declares a real return type. Raise conversion
    /// only applies when this is false.
    pub has_return_type: bool,
    /// Slot of an explicit context parameter, when the method takes one.
    pub context_slot: Option<u16>,
    /// Declared local variables; `None` models a compiled method with no
    /// local-variable table at all.
    pub locals: Option<Vec<LocalVar>>,
}

impl MethodMeta {
    pub fn has_local_table(&self) -> bool {
        self.locals.is_some()
    }

    /// Declaration of `slot` visible at `label`.
    ///
    /// A declaration is attached to its scope-start label; enclosing blocks
    /// are reached by the scope resolver walking the label registry, not by
    /// interval arithmetic here.
    pub fn local_variable(&self, slot: u16, label: LabelId) -> Option<&LocalVar> {
        self.locals
            .as_ref()?
            .iter()
            .find(|var| var.slot == slot && var.scope_start == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta_with(locals: Option<Vec<LocalVar>>) -> MethodMeta {
        MethodMeta {
            name: "demo.Pages.show".into(),
            is_static: true,
            has_return_type: false,
            context_slot: None,
            locals,
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
    fn test_local_variable_exact_start() {
        let meta = meta_with(Some(vec![local(1, "age", 0), local(2, "count", 3)]));
        let var = meta.local_variable(1, LabelId(0)).unwrap();
        assert_eq!(var.name, "age");
        assert_eq!(meta.local_variable(2, LabelId(3)).unwrap().name, "count");
    }

    #[test]
    fn test_local_variable_misses_other_label() {
        let meta = meta_with(Some(vec![local(1, "age", 0)]));
        assert!(meta.local_variable(1, LabelId(1)).is_none());
        assert!(meta.local_variable(2, LabelId(0)).is_none());
    }

    #[test]
    fn test_missing_table() {
        let meta = meta_with(None);
        assert!(!meta.has_local_table());
        assert!(meta.local_variable(1, LabelId(0)).is_none());
    }
}
