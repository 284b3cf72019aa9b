//! A linear disassembler for compiled byte streams.
//!
//! Every immediate format is either fixed-width or self-describing (Var
//! carries its own byte length), so the stream can be walked without any
//! side tables. Used by compiler debug output and by tests asserting on the
//! emitted program shape.

use core::fmt;

use crate::imm::{ImmFmt, Operands};
use crate::opcode::{InvalidOpcode, Opcode};

/// Errors produced while decoding a byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DisasmError {
    /// A `u16` at this offset does not name an opcode.
    #[error("at byte {offset}: {source}")]
    BadOpcode {
        /// Byte offset of the offending word.
        offset: usize,
        /// The undecodable value.
        source: InvalidOpcode,
    },
    /// The stream ended inside an instruction.
    #[error("truncated instruction at byte {0}")]
    Truncated(usize),
}

/// One decoded instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Instr {
    /// Byte offset of the opcode word.
    pub offset: usize,
    /// The operation.
    pub op: Opcode,
    /// Decoded immediates.
    pub operands: Operands,
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>6}: {}", self.offset, self.op.mnemonic())?;
        match &self.operands {
            Operands::None => Ok(()),
            Operands::Slot(a) => write!(f, " [{a}]"),
            Operands::Slot2(a, b) => write!(f, " [{a}] [{b}]"),
            Operands::Slot3(a, b, c) => write!(f, " [{a}] [{b}] [{c}]"),
            Operands::Bool(v) => write!(f, " {v}"),
            Operands::I64(v) => write!(f, " {v}"),
            Operands::F64(v) => write!(f, " {v}"),
            Operands::Dict(i) => write!(f, " dict({i})"),
            Operands::DictSlot(i, s) => write!(f, " dict({i}) [{s}]"),
            Operands::Sym(s) => write!(f, " ${s}"),
            Operands::SymSlot(s, slot) => write!(f, " ${s} [{slot}]"),
            Operands::AggSlot(a) => write!(f, " agg({a})"),
            Operands::AggPrec(a, p) => write!(f, " agg({a}) p={p}"),
            Operands::LitRef(off, len) => write!(f, " lit({off},{len})"),
            Operands::Tree(t) => write!(f, " tree({t})"),
            Operands::Var(bytes) => write!(f, " var({} bytes)", bytes.len()),
        }
    }
}

fn read<const N: usize>(buf: &[u8], at: usize) -> Result<[u8; N], DisasmError> {
    buf.get(at..at + N)
        .and_then(|s| s.try_into().ok())
        .ok_or(DisasmError::Truncated(at))
}

fn read_u16(buf: &[u8], at: usize) -> Result<u16, DisasmError> {
    Ok(u16::from_le_bytes(read::<2>(buf, at)?))
}

fn read_u32(buf: &[u8], at: usize) -> Result<u32, DisasmError> {
    Ok(u32::from_le_bytes(read::<4>(buf, at)?))
}

/// Decode a full byte stream into instructions.
pub fn disassemble(buf: &[u8]) -> Result<Vec<Instr>, DisasmError> {
    let mut out = Vec::new();
    let mut at = 0;
    while at < buf.len() {
        let offset = at;
        let raw = read_u16(buf, at)?;
        let op = Opcode::try_from(raw)
            .map_err(|source| DisasmError::BadOpcode { offset, source })?;
        at += 2;
        let operands = match op.imm_fmt() {
            ImmFmt::None => Operands::None,
            ImmFmt::Bool => {
                let b = *buf.get(at).ok_or(DisasmError::Truncated(at))?;
                at += 1;
                Operands::Bool(b != 0)
            }
            ImmFmt::Slot => {
                let s = read_u16(buf, at)?;
                at += 2;
                Operands::Slot(s)
            }
            ImmFmt::Dict => {
                let d = read_u16(buf, at)?;
                at += 2;
                Operands::Dict(d)
            }
            ImmFmt::Tree => {
                let t = read_u16(buf, at)?;
                at += 2;
                Operands::Tree(t)
            }
            ImmFmt::Slot2 => {
                let a = read_u16(buf, at)?;
                let b = read_u16(buf, at + 2)?;
                at += 4;
                Operands::Slot2(a, b)
            }
            ImmFmt::Slot3 => {
                let a = read_u16(buf, at)?;
                let b = read_u16(buf, at + 2)?;
                let c = read_u16(buf, at + 4)?;
                at += 6;
                Operands::Slot3(a, b, c)
            }
            ImmFmt::DictSlot => {
                let d = read_u16(buf, at)?;
                let s = read_u16(buf, at + 2)?;
                at += 4;
                Operands::DictSlot(d, s)
            }
            ImmFmt::Sym => {
                let s = read_u32(buf, at)?;
                at += 4;
                Operands::Sym(s)
            }
            ImmFmt::SymSlot => {
                let s = read_u32(buf, at)?;
                let slot = read_u16(buf, at + 4)?;
                at += 6;
                Operands::SymSlot(s, slot)
            }
            ImmFmt::AggSlot => {
                let a = read_u32(buf, at)?;
                at += 4;
                Operands::AggSlot(a)
            }
            ImmFmt::AggPrec => {
                let a = read_u32(buf, at)?;
                let p = *buf.get(at + 4).ok_or(DisasmError::Truncated(at + 4))?;
                at += 5;
                Operands::AggPrec(a, p)
            }
            ImmFmt::I64 => {
                let v = i64::from_le_bytes(read::<8>(buf, at)?);
                at += 8;
                Operands::I64(v)
            }
            ImmFmt::F64 => {
                let v = f64::from_bits(u64::from_le_bytes(read::<8>(buf, at)?));
                at += 8;
                Operands::F64(v)
            }
            ImmFmt::LitRef => {
                let off = read_u32(buf, at)?;
                let len = read_u32(buf, at + 4)?;
                at += 8;
                Operands::LitRef(off, len)
            }
            ImmFmt::Var => {
                let len = read_u32(buf, at)? as usize;
                let payload = buf
                    .get(at + 4..at + 4 + len)
                    .ok_or(DisasmError::Truncated(at + 4))?
                    .to_vec();
                at += 4 + len;
                Operands::Var(payload)
            }
        };
        out.push(Instr { offset, op, operands });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{put_i64, put_op, put_u16};

    #[test]
    fn decodes_a_small_program() {
        let mut buf = Vec::new();
        put_op(&mut buf, Opcode::INIT);
        put_op(&mut buf, Opcode::CMPEQIMMI);
        put_i64(&mut buf, 42);
        put_op(&mut buf, Opcode::SAVEK);
        put_u16(&mut buf, 2);
        put_op(&mut buf, Opcode::RET);

        let prog = disassemble(&buf).unwrap();
        let ops: Vec<_> = prog.iter().map(|i| i.op).collect();
        assert_eq!(
            ops,
            vec![Opcode::INIT, Opcode::CMPEQIMMI, Opcode::SAVEK, Opcode::RET]
        );
        assert_eq!(prog[1].operands, Operands::I64(42));
        assert_eq!(prog[2].operands, Operands::Slot(2));
    }

    #[test]
    fn truncation_and_bad_opcodes_are_reported() {
        assert!(matches!(
            disassemble(&[0xff, 0xff]),
            Err(DisasmError::BadOpcode { offset: 0, .. })
        ));
        let mut buf = Vec::new();
        put_op(&mut buf, Opcode::SAVEK);
        assert_eq!(disassemble(&buf), Err(DisasmError::Truncated(2)));
    }
}
