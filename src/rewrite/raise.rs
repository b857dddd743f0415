//! Raise conversion rewrite.
//!
//! A qualifying call whose result is immediately discarded, inside a
//! method that declares no real return type, is converted to raise the
//! result instead. The conversion leaves dead fallthrough code behind
//! (and/or an explicit void return) that must be excised to keep the
//! stream structurally valid; labels survive because other parts of the
//! method may still jump to them.

use crate::insn::{Insn, InsnId, PlainOp};

use super::{TransformError, Transformer};

impl Transformer<'_> {
    /// Convert the discard after the call at `call` into a raise and prune
    /// now-unreachable code up to the next control-flow merge point.
    pub(super) fn convert_raise(&mut self, call: InsnId) -> Result<(), TransformError> {
        if self.meta.has_return_type {
            return Ok(());
        }
        let follower = match self.list.next(call) {
            Some(id) => id,
            None => return Ok(()),
        };
        // Not a discard pattern: the result is being used normally.
        if !matches!(self.list.get(follower), Insn::Plain(PlainOp::Pop)) {
            return Ok(());
        }

        let raise = self.list.insert_after(call, Insn::Plain(PlainOp::Raise));
        self.list.remove(follower);

        // Forward pruning. Labels are skipped, never removed; line markers
        // are removed but remembered for diagnostics; jumps and plain
        // returns are removed; a frame marker is the merge point that ends
        // the walk. Anything else cannot legally follow a diverted call.
        let mut line: Option<u32> = None;
        let mut cur = self.list.next(raise);
        while let Some(id) = cur {
            let insn = self.list.get(id).clone();
            match insn {
                Insn::Label(_) => cur = self.list.next(id),
                Insn::Line(n) => {
                    line = Some(n);
                    cur = self.list.remove(id);
                }
                Insn::Jump { .. } => cur = self.list.remove(id),
                Insn::Plain(PlainOp::Return) => cur = self.list.remove(id),
                Insn::Frame => break,
                _ => {
                    return Err(TransformError::InvalidAfterRaise {
                        method: self.meta.name.clone(),
                        line,
                    })
                }
            }
        }
        Ok(())
    }
}
