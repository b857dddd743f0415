//! actionweave — post-compilation instrumentation of compiled method bodies.
//!
//! Rewrites the instruction stream of a single method so that (a) arguments
//! present at qualifying call sites are captured into an ambient context,
//! and (b) calls whose outcome-typed result is otherwise discarded are
//! converted into a raise instead of falling through to normal return.
//!
//! The enclosing class framework locates methods, loads their metadata and
//! serializes the result; this crate owns only the in-place transformation
//! of one method's instruction sequence.

pub mod diagnostic;
pub mod insn;
pub mod meta;
pub mod rewrite;
pub mod scope;

pub use diagnostic::{Diagnostic, Severity};
pub use insn::{Insn, InsnId, InsnList, LabelId, PlainOp, VarKind};
pub use meta::{LocalVar, MethodMeta};
pub use rewrite::{TransformError, TransformReport, Transformer, WeaveConfig};

use rayon::prelude::*;

/// Transform one method body in place.
pub fn transform_method(
    list: &mut InsnList,
    meta: &MethodMeta,
    config: &WeaveConfig,
) -> Result<TransformReport, TransformError> {
    Transformer::new(list, meta, config).run()
}

/// Transform a batch of independent method bodies in parallel.
///
/// Each method owns its instruction sequence exclusively and shares no
/// state with the others, so the batch is embarrassingly parallel.
/// Results are returned in input order.
pub fn transform_methods(
    methods: &mut [(InsnList, MethodMeta)],
    config: &WeaveConfig,
) -> Vec<Result<TransformReport, TransformError>> {
    methods
        .par_iter_mut()
        .map(|(list, meta)| transform_method(list, meta, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(insns: Vec<Insn>) -> InsnList {
        insns.into_iter().collect()
    }

    fn meta(name: &str) -> MethodMeta {
        MethodMeta {
            name: name.into(),
            is_static: true,
            has_return_type: false,
            context_slot: None,
            locals: None,
        }
    }

    fn config() -> WeaveConfig {
        WeaveConfig::new("demo.Outcome", "demo.Context")
    }

    fn outcome_call() -> Insn {
        Insn::call("demo.Pages", "render", "()Ldemo/Outcome;", "demo.Outcome")
    }

    #[test]
    fn test_transform_methods_batch() {
        let ok_body = vec![
            Insn::Label(LabelId(0)),
            outcome_call(),
            Insn::Plain(PlainOp::Pop),
            Insn::Plain(PlainOp::Return),
        ];
        let bad_body = vec![
            Insn::Label(LabelId(0)),
            outcome_call(),
            Insn::Plain(PlainOp::Pop),
            Insn::Line(9),
            // A call cannot legally follow a diverted call site
            Insn::call("demo.Util", "touch", "()V", "void"),
        ];
        let mut methods = vec![
            (body(ok_body), meta("demo.Pages.show")),
            (body(bad_body), meta("demo.Pages.broken")),
        ];
        let results = transform_methods(&mut methods, &config());
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert_eq!(
            results[1],
            Err(TransformError::InvalidAfterRaise {
                method: "demo.Pages.broken".into(),
                line: Some(9),
            })
        );
        // The successful method was rewritten in place
        let listing = methods[0].0.render();
        assert!(listing.contains(&"    raise".to_string()));
    }
}
