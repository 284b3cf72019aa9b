//! The SSA value representation.

use sift_types::SymbolId;

pub mod ops;
pub mod types;

pub use ops::{Op, OpFlags, OpInfo, PRIO_HASH, PRIO_INIT, PRIO_MEM, PRIO_PARSE, PRIO_ZERO};
pub use types::{RegClass, TypeSet};

/// Index of a value in its program's pool.
pub type ValueId = u32;

/// Immediate payload attached to a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Imm {
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// Boolean literal.
    Bool(bool),
    /// String literal, interned in the program dictionary.
    Str(Box<str>),
    /// Opaque bytes: an encoded record literal or a compiled pattern.
    Bytes(Box<[u8]>),
    /// Timestamp literal, microseconds since the epoch.
    Ts(i64),
    /// Resolved symbol id, present after symbolization.
    Sym(SymbolId),
    /// Handle into the program's hash-tree table.
    Tree(u32),
    /// Aggregate buffer byte offset.
    Agg(u32),
    /// Aggregate buffer byte offset plus a HyperLogLog precision.
    AggPrec(u32, u8),
    /// Reserved stack slot reference.
    Slot(u16),
    /// Diagnostic carried by an `invalid` value.
    Error(Box<str>),
}

/// Hashable projection of an immediate, used by the CSE table.
///
/// Floats and timestamps hash by bit pattern; strings hash by their
/// dictionary index, so interning must happen before the key is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ImmKey {
    Int(i64),
    Float(u64),
    Bool(bool),
    Dict(u16),
    Bytes(Box<[u8]>),
    Ts(i64),
    Sym(u32),
    Tree(u32),
    Agg(u32),
    AggPrec(u32, u8),
    Slot(u16),
}

/// One SSA value: an op applied to prior values, plus an optional immediate.
///
/// Arguments are ids into the owning program's pool, never owning
/// references, so the DAG has no ownership cycles. Values are never
/// destroyed; dead ones are simply not scheduled.
#[derive(Debug, Clone)]
pub struct Value {
    /// This value's id; equals its pool index after renumbering.
    pub id: ValueId,
    /// The operation.
    pub op: Op,
    /// Ordered argument ids.
    pub args: Vec<ValueId>,
    /// Immediate payload, when the op's format calls for one.
    pub imm: Option<Imm>,
    /// Memoized predicate tracking why a lane's result is absent; computed
    /// lazily by `Program::not_missing`.
    pub not_missing: Option<ValueId>,
}

impl Value {
    /// The type bits this value defines.
    pub fn ret_type(&self) -> TypeSet {
        self.op.ret_type()
    }

    /// Whether this value carries a build-time diagnostic.
    pub fn is_invalid(&self) -> bool {
        self.op == Op::Invalid
    }

    /// The diagnostic of an invalid value.
    pub fn diagnostic(&self) -> Option<&str> {
        match &self.imm {
            Some(Imm::Error(e)) => Some(e),
            _ => None,
        }
    }

    /// The canonical mask argument: the last argument, when its declared
    /// type includes `bool`.
    pub fn mask_arg(&self) -> Option<ValueId> {
        let info = self.op.info();
        let n = self.args.len();
        if n == 0 {
            return None;
        }
        let decl = if n <= info.args.len() {
            info.args.get(n - 1)
        } else if info.vararg.is_empty() {
            None
        } else {
            let extra = n - info.args.len();
            info.vararg.get((extra - 1) % info.vararg.len())
        };
        match decl {
            Some(t) if t.contains(TypeSet::BOOL) => Some(self.args[n - 1]),
            _ => None,
        }
    }

    /// Index of the canonical mask argument, if any.
    pub fn mask_arg_index(&self) -> Option<usize> {
        self.mask_arg().map(|_| self.args.len() - 1)
    }
}
