//! Symbol identifiers and their wire encoding.
//!
//! Record field names are interned into a [`crate::SymbolTable`] and referred
//! to by numeric id everywhere else. On the wire a symbol id is a big-endian
//! base-128 varint of one to four bytes; every used byte has its high bit set
//! and carries seven payload bits, so the encoded form of a symbol can be
//! located (and compared) byte-wise inside a record without decoding it.

use core::fmt;

/// Largest id a [`crate::SymbolTable`] will hand out.
///
/// Resolved symbol immediates are packed into 21 bits of the instruction
/// stream; the varint wire form can carry more (see [`MAX_VARINT_SYMBOL`]),
/// but the compiler rejects tables that grow past this bound.
pub const MAX_SYMBOL: u32 = (1 << 21) - 1;

/// Largest id representable in the 4-byte varint wire form.
pub const MAX_VARINT_SYMBOL: u32 = (1 << 28) - 2;

/// Numeric id of an interned record field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SymbolId(u32);

/// Errors produced while encoding or decoding symbol ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SymbolError {
    /// The input buffer ended before a complete varint was read.
    #[error("truncated symbol varint")]
    Truncated,
    /// The lead byte of a symbol varint must have its high bit set.
    #[error("invalid symbol lead byte {0:#04x}")]
    BadLeadByte(u8),
    /// The id does not fit the 4-byte wire form.
    #[error("symbol id {0} exceeds the varint maximum")]
    TooLarge(u32),
}

impl SymbolId {
    /// Construct an id, rejecting values outside the wire-representable range.
    pub fn new(id: u32) -> Result<Self, SymbolError> {
        if id > MAX_VARINT_SYMBOL {
            return Err(SymbolError::TooLarge(id));
        }
        Ok(SymbolId(id))
    }

    /// The raw numeric id.
    pub const fn id(self) -> u32 {
        self.0
    }

    /// Number of bytes [`Self::encode`] will use for this id.
    pub const fn encoded_len(self) -> usize {
        match self.0 {
            0..=0x7f => 1,
            0x80..=0x3fff => 2,
            0x4000..=0x1f_ffff => 3,
            _ => 4,
        }
    }

    /// Encode the id big-endian into at most four bytes.
    ///
    /// Every produced byte has its high bit set and carries seven payload
    /// bits; a zero id encodes as the single byte `0x80`.
    pub fn encode(self) -> ([u8; 4], usize) {
        let size = self.encoded_len();
        let mut buf = [0u8; 4];
        let mut i = 0;
        while i < size {
            let shift = 7 * (size - 1 - i);
            buf[i] = 0x80 | ((self.0 >> shift) as u8 & 0x7f);
            i += 1;
        }
        (buf, size)
    }

    /// Decode a symbol id from the head of `buf`.
    ///
    /// Returns the id and the number of bytes consumed, which always equals
    /// the number of leading bytes with a set high bit (at most four). Fails
    /// when the lead byte's high bit is clear.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize), SymbolError> {
        let lead = *buf.first().ok_or(SymbolError::Truncated)?;
        if lead & 0x80 == 0 {
            return Err(SymbolError::BadLeadByte(lead));
        }
        let mut id = u32::from(lead & 0x7f);
        let mut size = 1;
        while size < 4 {
            match buf.get(size) {
                Some(&b) if b & 0x80 != 0 => {
                    id = (id << 7) | u32::from(b & 0x7f);
                    size += 1;
                }
                _ => break,
            }
        }
        Ok((SymbolId(id), size))
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

impl From<SymbolId> for u32 {
    fn from(s: SymbolId) -> u32 {
        s.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn round_trip_vectors() {
        let cases = [
            1u32,
            127,
            128,
            129,
            255,
            256,
            257,
            511,
            512,
            1023,
            1024,
            1025,
            (1 << 28) - 2,
        ];
        for s in cases {
            let sym = SymbolId::new(s).unwrap();
            let (buf, size) = sym.encode();
            let set = buf[..size].iter().filter(|b| *b & 0x80 != 0).count();
            assert_eq!(set, size, "every used byte carries the high bit: {s}");
            let (back, read) = SymbolId::decode(&buf[..size]).unwrap();
            assert_eq!(back.id(), s);
            assert_eq!(read, size);
        }
    }

    #[test]
    fn zero_is_one_marker_byte() {
        let (buf, size) = SymbolId::new(0).unwrap().encode();
        assert_eq!((buf[0], size), (0x80, 1));
        let (sym, read) = SymbolId::decode(&buf[..size]).unwrap();
        assert_eq!((sym.id(), read), (0, 1));
    }

    #[test]
    fn clear_lead_bit_is_rejected() {
        assert_eq!(
            SymbolId::decode(&[0x7f]),
            Err(SymbolError::BadLeadByte(0x7f))
        );
        assert_eq!(SymbolId::decode(&[]), Err(SymbolError::Truncated));
    }

    #[test]
    fn over_range_ids_are_rejected() {
        assert!(SymbolId::new(MAX_VARINT_SYMBOL).is_ok());
        assert_eq!(
            SymbolId::new(MAX_VARINT_SYMBOL + 1),
            Err(SymbolError::TooLarge(MAX_VARINT_SYMBOL + 1))
        );
    }

    #[quickcheck]
    fn round_trip_any(id: u32) -> bool {
        let id = id & MAX_VARINT_SYMBOL;
        let sym = SymbolId::new(id).unwrap();
        let (buf, size) = sym.encode();
        SymbolId::decode(&buf[..size]) == Ok((sym, size))
    }
}
