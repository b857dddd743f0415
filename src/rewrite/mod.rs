//! Method-body transformation engine.
//!
//! A single forward pass partitions the instruction sequence into
//! label-delimited segments and dispatches every instruction inside the
//! current segment by kind. The only registered handler is the call
//! handler: a call whose declared return type matches the configured
//! outcome type triggers the argument-capture rewrite and then the raise
//! conversion, in that order, before the cursor advances past the site.

mod capture;
mod raise;


use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diagnostic::Diagnostic;
use crate::insn::{Insn, InsnId, InsnList, LabelId};
use crate::meta::MethodMeta;
use crate::scope::LabelRegistry;

/// Configuration for one transformation run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaveConfig {
    /// Qualified name of the distinguished outcome type. A call qualifies
    /// for both rewrites exactly when its declared return type equals this.
    pub outcome_type: String,
    /// Qualified name of the ambient-context type whose static accessor
    /// and chaining register operation the capture rewrite synthesizes.
    pub context_type: String,
}

impl WeaveConfig {
    pub fn new(outcome_type: impl Into<String>, context_type: impl Into<String>) -> Self {
        Self {
            outcome_type: outcome_type.into(),
            context_type: context_type.into(),
        }
    }

    fn context_internal(&self) -> String {
        self.context_type.replace('.', "/")
    }

    /// Static "get current context" accessor: no arguments, returns the
    /// context handle.
    pub(crate) fn accessor_call(&self) -> Insn {
        Insn::call(
            self.context_type.clone(),
            "current",
            format!("()L{};", self.context_internal()),
            self.context_type.clone(),
        )
    }

    /// Chaining "register named argument" operation: takes (name, value),
    /// returns the context handle again.
    pub(crate) fn bind_call(&self) -> Insn {
        Insn::call(
            self.context_type.clone(),
            "bind",
            format!(
                "(Ljava/lang/String;Ljava/lang/Object;)L{};",
                self.context_internal()
            ),
            self.context_type.clone(),
        )
    }
}

/// Fatal condition aborting the current method's transformation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransformError {
    /// Configuration error: an argument's primitive type tag is outside
    /// the five supported kinds during boxing.
    UnsupportedTypeTag { method: String, tag: char },
    /// Structural inconsistency: forward pruning after a raise conversion
    /// hit an instruction that cannot follow a diverted call.
    InvalidAfterRaise { method: String, line: Option<u32> },
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformError::UnsupportedTypeTag { method, tag } => {
                write!(f, "{}: variable type tag not recognized: {}", method, tag)
            }
            TransformError::InvalidAfterRaise {
                method,
                line: Some(line),
            } => write!(
                f,
                "{}: invalid statement after outcome-raising call near line {}",
                method, line
            ),
            TransformError::InvalidAfterRaise { method, line: None } => write!(
                f,
                "{}: invalid statement after outcome-raising call",
                method
            ),
        }
    }
}

impl std::error::Error for TransformError {}

/// Outcome of a successful transformation: the mutated instruction list
/// plus any non-fatal conditions encountered along the way.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransformReport {
    pub warnings: Vec<Diagnostic>,
}

/// One method's transformation pass. Created fresh per method; nothing
/// survives across methods.
pub struct Transformer<'a> {
    pub(crate) list: &'a mut InsnList,
    pub(crate) meta: &'a MethodMeta,
    pub(crate) config: &'a WeaveConfig,
    pub(crate) registry: LabelRegistry,
    pub(crate) warnings: Vec<Diagnostic>,
    pub(crate) warned_missing_table: bool,
}

impl<'a> Transformer<'a> {
    pub fn new(list: &'a mut InsnList, meta: &'a MethodMeta, config: &'a WeaveConfig) -> Self {
        Self {
            list,
            meta,
            config,
            registry: LabelRegistry::new(),
            warnings: Vec::new(),
            warned_missing_table: false,
        }
    }

    /// Run the single forward pass over the instruction sequence.
    ///
    /// A label opens a new segment and is appended to the registry.
    /// Instructions before the first label are ignored (a supported method
    /// body always begins with a label). Edits performed by the handlers
    /// are visible to the continuing traversal through stable node links.
    pub fn run(mut self) -> Result<TransformReport, TransformError> {
        let mut cur = self.list.head();
        let mut segment: Option<LabelId> = None;
        while let Some(id) = cur {
            let insn = self.list.get(id).clone();
            if let Insn::Label(label) = insn {
                segment = Some(label);
                self.registry.push(label);
            } else if let Some(start) = segment {
                self.handle(id, &insn, start)?;
            }
            cur = self.list.next(id);
        }
        Ok(TransformReport {
            warnings: self.warnings,
        })
    }

    /// Dispatch one instruction inside the current segment. Only calls
    /// have a registered handler; every other kind is skipped.
    fn handle(
        &mut self,
        id: InsnId,
        insn: &Insn,
        segment_start: LabelId,
    ) -> Result<(), TransformError> {
        if let Insn::Call { ret, .. } = insn {
            if *ret == self.config.outcome_type {
                self.inject_capture(id, segment_start)?;
                self.convert_raise(id)?;
            }
        }
        Ok(())
    }
}
