//! Instruction model for one compiled method body.
//!
//! A method body is a doubly-traversable ordered sequence of instruction
//! nodes (`InsnList`), each tagged with one of a closed set of kinds
//! (`Insn`). The transformation engine matches exhaustively on the kind;
//! anything outside the recognized set is carried as `Insn::Other`, which
//! is always legal to skip during the forward scan.

pub mod list;

pub use list::{InsnId, InsnList};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identity of a label instruction. Labels are zero-size markers
/// used as jump targets and as lexical scope boundaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelId(pub u32);

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Width/kind tag of a variable-access instruction.
///
/// The five load tags map to the stack-machine load families; every store
/// opcode collapses into the single `Store` tag, which is never a captured
/// argument and is invalid in boxing position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarKind {
    ILoad,
    LLoad,
    FLoad,
    DLoad,
    ALoad,
    Store,
}

impl VarKind {
    pub fn is_store(self) -> bool {
        self == VarKind::Store
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            VarKind::ILoad => "iload",
            VarKind::LLoad => "lload",
            VarKind::FLoad => "fload",
            VarKind::DLoad => "dload",
            VarKind::ALoad => "aload",
            VarKind::Store => "store",
        }
    }
}

/// Plain (payload-free) opcodes the engine recognizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlainOp {
    /// Discard the top-of-stack value.
    Pop,
    /// Raise the top-of-stack value as a condition (non-local exit).
    Raise,
    /// Plain void return.
    Return,
    Nop,
    Dup,
}

impl PlainOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            PlainOp::Pop => "pop",
            PlainOp::Raise => "raise",
            PlainOp::Return => "return",
            PlainOp::Nop => "nop",
            PlainOp::Dup => "dup",
        }
    }
}

/// A single instruction node. The closed kind set of the engine; exhaustive
/// matching everywhere, with `Other` as the explicit catch-all for kinds
/// the engine has no business inspecting.
#[derive(Clone, Debug, PartialEq)]
pub enum Insn {
    /// Label marker (jump target / scope boundary).
    Label(LabelId),
    /// Variable load or store.
    Var { kind: VarKind, slot: u16 },
    /// Method call: owner type, member name, descriptor, and the qualified
    /// name of the declared return type.
    Call {
        owner: String,
        name: String,
        desc: String,
        ret: String,
    },
    /// Conditional or unconditional jump. The engine never follows the
    /// edge; it only needs to know the kind.
    Jump { target: LabelId },
    /// Source line marker.
    Line(u32),
    /// Frame-synchronization marker (control-flow merge point).
    Frame,
    /// Plain opcode.
    Plain(PlainOp),
    /// String constant load.
    Const(String),
    /// Unrecognized instruction kind, carried opaquely.
    Other(u16),
}

impl Insn {
    pub fn call(
        owner: impl Into<String>,
        name: impl Into<String>,
        desc: impl Into<String>,
        ret: impl Into<String>,
    ) -> Self {
        Insn::Call {
            owner: owner.into(),
            name: name.into(),
            desc: desc.into(),
            ret: ret.into(),
        }
    }

    pub fn var(kind: VarKind, slot: u16) -> Self {
        Insn::Var { kind, slot }
    }
}

impl fmt::Display for Insn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Insn::Label(label) => write!(f, "{}:", label),
            Insn::Var { kind, slot } => write!(f, "{} {}", kind.mnemonic(), slot),
            Insn::Call {
                owner, name, desc, ..
            } => write!(f, "invoke {}.{}{}", owner, name, desc),
            Insn::Jump { target } => write!(f, "goto {}", target),
            Insn::Line(line) => write!(f, "line {}", line),
            Insn::Frame => write!(f, "frame"),
            Insn::Plain(op) => write!(f, "{}", op.mnemonic()),
            Insn::Const(value) => write!(f, "const \"{}\"", value),
            Insn::Other(opcode) => write!(f, "op {}", opcode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insn_display() {
        assert_eq!(format!("{}", Insn::Label(LabelId(0))), "L0:");
        assert_eq!(format!("{}", Insn::var(VarKind::ILoad, 1)), "iload 1");
        assert_eq!(format!("{}", Insn::var(VarKind::Store, 2)), "store 2");
        assert_eq!(
            format!("{}", Insn::Jump { target: LabelId(3) }),
            "goto L3"
        );
        assert_eq!(format!("{}", Insn::Line(42)), "line 42");
        assert_eq!(format!("{}", Insn::Frame), "frame");
        assert_eq!(format!("{}", Insn::Plain(PlainOp::Raise)), "raise");
        assert_eq!(format!("{}", Insn::Const("age".into())), "const \"age\"");
        assert_eq!(format!("{}", Insn::Other(186)), "op 186");
    }

    #[test]
    fn test_call_display() {
        let call = Insn::call("demo.Pages", "render", "()Ldemo/Outcome;", "demo.Outcome");
        assert_eq!(format!("{}", call), "invoke demo.Pages.render()Ldemo/Outcome;");
    }

    #[test]
    fn test_varkind_store() {
        assert!(VarKind::Store.is_store());
        assert!(!VarKind::ILoad.is_store());
        assert!(!VarKind::ALoad.is_store());
    }

    #[test]
    fn test_all_kinds_construct() {
        // Verify every kind of the closed set can be constructed
        let _insns = vec![
            Insn::Label(LabelId(0)),
            Insn::var(VarKind::ILoad, 1),
            Insn::var(VarKind::LLoad, 2),
            Insn::var(VarKind::FLoad, 3),
            Insn::var(VarKind::DLoad, 4),
            Insn::var(VarKind::ALoad, 5),
            Insn::var(VarKind::Store, 6),
            Insn::call("a.B", "c", "()V", "void"),
            Insn::Jump { target: LabelId(1) },
            Insn::Line(7),
            Insn::Frame,
            Insn::Plain(PlainOp::Pop),
            Insn::Plain(PlainOp::Raise),
            Insn::Plain(PlainOp::Return),
            Insn::Plain(PlainOp::Nop),
            Insn::Plain(PlainOp::Dup),
            Insn::Const("x".into()),
            Insn::Other(0),
        ];
    }
}
