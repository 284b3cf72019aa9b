//! Bytecode instruction set of the sift lane-parallel VM.
//!
//! A compiled program is a flat byte stream of little-endian `u16` opcodes,
//! each followed by the immediate bytes its [`ImmFmt`] prescribes. The VM is
//! an accumulator machine: every virtual register class holds one current
//! value, and binary operations fetch their second operand from a per-class
//! stack slot named by a `u16` immediate.

#![warn(missing_docs)]

mod disasm;
mod encode;
mod imm;
mod opcode;

pub use disasm::{disassemble, DisasmError, Instr};
pub use encode::{put_bool, put_f64, put_i64, put_op, put_u16, put_u32, put_u8};
pub use imm::{ImmFmt, Operands};
pub use opcode::{InvalidOpcode, Opcode};

/// Error an interpreter invocation reports back to the dispatch layer.
///
/// The compiler never constructs these; they are part of the contract with
/// the execution kernels. `MoreScratch` in particular is recoverable: the
/// caller flushes accumulated output and re-enters the program at the same
/// record offset with an empty scratch buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ExecError {
    /// The per-worker scratch buffer overflowed mid-invocation.
    #[error("scratch buffer exhausted; flush output and retry")]
    MoreScratch,
    /// The program executed an undefined or corrupt instruction.
    #[error("trap: malformed bytecode")]
    Trap,
}
