//! Byte-stream writers used by the compiler's emitter.

use crate::Opcode;

/// Append a little-endian opcode.
pub fn put_op(out: &mut Vec<u8>, op: Opcode) {
    out.extend_from_slice(&op.raw().to_le_bytes());
}

/// Append a single byte.
pub fn put_u8(out: &mut Vec<u8>, v: u8) {
    out.push(v);
}

/// Append a boolean as one byte.
pub fn put_bool(out: &mut Vec<u8>, v: bool) {
    out.push(v as u8);
}

/// Append a little-endian `u16`.
pub fn put_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

/// Append a little-endian `u32`.
pub fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

/// Append a little-endian `i64`.
pub fn put_i64(out: &mut Vec<u8>, v: i64) {
    out.extend_from_slice(&v.to_le_bytes());
}

/// Append a float by its little-endian bit pattern.
pub fn put_f64(out: &mut Vec<u8>, v: f64) {
    out.extend_from_slice(&v.to_bits().to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_is_little_endian() {
        let mut out = Vec::new();
        put_op(&mut out, Opcode::FINDSYM);
        assert_eq!(out, vec![0x60, 0x00]);
    }

    #[test]
    fn floats_keep_their_bit_pattern() {
        let mut out = Vec::new();
        put_f64(&mut out, f64::NAN);
        assert_eq!(u64::from_le_bytes(out.try_into().unwrap()), f64::NAN.to_bits());
    }
}
