//! Argument-capture rewrite.
//!
//! For a qualifying call, scan strictly backward to the enclosing block
//! boundary to recover the loads that produced the call's visible
//! arguments, resolve each to a declared variable, and synthesize a run of
//! instructions that registers every named argument into the ambient
//! context before the block executes.

use crate::diagnostic::Diagnostic;
use crate::insn::{Insn, InsnId, LabelId, PlainOp, VarKind};
use crate::scope;

use super::{TransformError, Transformer};

/// A recovered argument-producing load: width tag plus slot index.
/// Lives for the duration of one call-site rewrite.
#[derive(Clone, Copy, Debug)]
struct LoadInfo {
    kind: VarKind,
    slot: u16,
}

/// Wrapper-conversion call target (owner, descriptor) for an
/// integer-width primitive tag. The five supported tags; anything else
/// reaching this match is a configuration error.
fn boxing_call(tag: char) -> Option<(&'static str, &'static str)> {
    match tag {
        'I' => Some(("java.lang.Integer", "(I)Ljava/lang/Integer;")),
        'Z' => Some(("java.lang.Boolean", "(Z)Ljava/lang/Boolean;")),
        'S' => Some(("java.lang.Short", "(S)Ljava/lang/Short;")),
        'B' => Some(("java.lang.Byte", "(B)Ljava/lang/Byte;")),
        'C' => Some(("java.lang.Character", "(C)Ljava/lang/Character;")),
        _ => None,
    }
}

impl Transformer<'_> {
    /// Synthesize and insert the capture run for the call at `call`.
    ///
    /// The call instruction itself is never moved or altered; the
    /// synthesized run lands immediately before the boundary label the
    /// backward scan stopped at.
    pub(super) fn inject_capture(
        &mut self,
        call: InsnId,
        segment_start: LabelId,
    ) -> Result<(), TransformError> {
        if !self.meta.has_local_table() {
            if !self.warned_missing_table {
                self.warnings.push(Diagnostic::warning(
                    "local variable table missing; named arguments will not be captured".into(),
                ));
                self.warned_missing_table = true;
            }
            return Ok(());
        }
        let meta = self.meta;

        // Backward scan: recover argument-producing loads, nearest to the
        // call first. A label is the block boundary; stores and the
        // implicit receiver of an instance method are never arguments.
        let mut loads: Vec<LoadInfo> = Vec::new();
        let mut boundary: Option<InsnId> = None;
        let mut cur = self.list.prev(call);
        while let Some(id) = cur {
            match *self.list.get(id) {
                Insn::Label(_) => {
                    boundary = Some(id);
                    break;
                }
                Insn::Var { kind, slot } => {
                    let receiver = slot == 0 && !meta.is_static;
                    if !receiver && !kind.is_store() {
                        loads.push(LoadInfo { kind, slot });
                    }
                }
                _ => {}
            }
            cur = self.list.prev(id);
        }

        // Context handle: explicit parameter slot when the method has one,
        // otherwise the static accessor.
        let mut synth: Vec<Insn> = Vec::new();
        match meta.context_slot {
            Some(slot) => synth.push(Insn::var(VarKind::ALoad, slot)),
            None => synth.push(self.config.accessor_call()),
        }

        for info in &loads {
            let var = match scope::resolve(meta, &self.registry, info.slot, segment_start) {
                Some(var) => var,
                // Synthetic temporary without a declaration, not a user
                // argument
                None => continue,
            };
            synth.push(Insn::Const(var.name.clone()));
            synth.push(Insn::var(info.kind, info.slot));
            if info.kind == VarKind::ILoad {
                let (owner, desc) = boxing_call(var.type_tag).ok_or_else(|| {
                    TransformError::UnsupportedTypeTag {
                        method: meta.name.clone(),
                        tag: var.type_tag,
                    }
                })?;
                synth.push(Insn::call(owner, "valueOf", desc, owner));
            }
            synth.push(self.config.bind_call());
        }

        // The register operation returns the handle; discard the last one.
        // Also covers the zero-argument case: handle fetched, then popped.
        synth.push(Insn::Plain(PlainOp::Pop));

        let anchor = boundary.or_else(|| self.list.head());
        match anchor {
            Some(at) => {
                for insn in synth {
                    self.list.insert_before(at, insn);
                }
            }
            None => {
                for insn in synth {
                    self.list.push_back(insn);
                }
            }
        }
        Ok(())
    }
}
