//! Immediate operand formats.

/// Shape of the immediate bytes following an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ImmFmt {
    /// No immediate bytes.
    None,
    /// One `u16` byte offset into the operand's register-class stack.
    Slot,
    /// Two `u16` stack slots.
    Slot2,
    /// Three `u16` stack slots.
    Slot3,
    /// One boolean byte.
    Bool,
    /// Eight bytes, little-endian two's-complement.
    I64,
    /// Eight bytes, little-endian IEEE-754 bit pattern.
    F64,
    /// One `u16` index into the program dictionary.
    Dict,
    /// A dictionary index followed by a stack slot.
    DictSlot,
    /// One `u32` resolved symbol id.
    Sym,
    /// A resolved symbol id followed by a stack slot.
    SymSlot,
    /// One `u32` byte offset into the aggregate buffer.
    AggSlot,
    /// An aggregate buffer offset followed by a precision byte.
    AggPrec,
    /// `(u32 offset, u32 length)` into the literal pool.
    LitRef,
    /// One `u16` index into the compiled hash-tree table.
    Tree,
    /// A `u32` byte length followed by that many payload bytes.
    Var,
}

impl ImmFmt {
    /// Fixed byte width of the immediate, or `None` for [`ImmFmt::Var`].
    pub const fn width(self) -> Option<usize> {
        match self {
            ImmFmt::None => Some(0),
            ImmFmt::Bool => Some(1),
            ImmFmt::Slot | ImmFmt::Dict | ImmFmt::Tree => Some(2),
            ImmFmt::Slot2 | ImmFmt::DictSlot | ImmFmt::Sym | ImmFmt::AggSlot => Some(4),
            ImmFmt::Slot3 | ImmFmt::SymSlot => Some(6),
            ImmFmt::AggPrec => Some(5),
            ImmFmt::I64 | ImmFmt::F64 | ImmFmt::LitRef => Some(8),
            ImmFmt::Var => None,
        }
    }
}

/// Decoded immediate operands of a single instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Operands {
    /// No operands.
    None,
    /// A stack slot.
    Slot(u16),
    /// Two stack slots.
    Slot2(u16, u16),
    /// Three stack slots.
    Slot3(u16, u16, u16),
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    I64(i64),
    /// A float, carried by bit pattern.
    F64(f64),
    /// A dictionary index.
    Dict(u16),
    /// A dictionary index and a stack slot.
    DictSlot(u16, u16),
    /// A resolved symbol id.
    Sym(u32),
    /// A resolved symbol id and a stack slot.
    SymSlot(u32, u16),
    /// An aggregate buffer offset.
    AggSlot(u32),
    /// An aggregate buffer offset and a precision.
    AggPrec(u32, u8),
    /// An `(offset, length)` literal-pool reference.
    LitRef(u32, u32),
    /// A hash-tree index.
    Tree(u16),
    /// Raw variadic payload.
    Var(Vec<u8>),
}
