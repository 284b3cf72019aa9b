//! Atomic types shared by the sift record codec, compiler and interpreter.

#![warn(missing_docs)]

mod record;
mod symbol;
mod symtab;

pub use record::{tag_info, uvarint, RecordError, TagInfo};
pub use symbol::{SymbolError, SymbolId, MAX_SYMBOL, MAX_VARINT_SYMBOL};
pub use symtab::SymbolTable;

/// Number of lanes a bytecode program advances per step.
pub const LANE_COUNT: usize = 16;

/// Lane mask with every lane selected.
pub const MASK_ALL: u16 = u16::MAX;
