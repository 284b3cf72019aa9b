//! Sizing rules for self-describing record values.
//!
//! The compiler never parses record payloads, but the emitter and the literal
//! pool need to know how many bytes a value occupies: the lead byte carries a
//! type nibble and either an inline length or an escape to a base-128 length
//! varint whose final byte has its high bit set.

/// Errors produced while sizing a record value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// The buffer ended inside a value header.
    #[error("truncated record value header")]
    Truncated,
    /// A length varint ran past the supported width.
    #[error("record length varint overflows")]
    LengthOverflow,
}

/// Header and payload sizes of a single record value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagInfo {
    /// Bytes occupied by the descriptor (and length varint, when present).
    pub header_size: usize,
    /// Bytes occupied by the payload following the header.
    pub object_size: usize,
}

impl TagInfo {
    /// Total bytes the value occupies.
    pub const fn total_size(self) -> usize {
        self.header_size + self.object_size
    }
}

/// Decode a base-128 length whose final byte has its high bit set.
///
/// Returns the value and the number of bytes consumed. At most five bytes are
/// read, which is enough for any length the record format can express.
pub fn uvarint(buf: &[u8]) -> Result<(usize, usize), RecordError> {
    let mut value = 0usize;
    for (i, &b) in buf.iter().enumerate() {
        if i == 5 {
            return Err(RecordError::LengthOverflow);
        }
        value = (value << 7) | usize::from(b & 0x7f);
        if b & 0x80 != 0 {
            return Ok((value, i + 1));
        }
    }
    Err(RecordError::Truncated)
}

/// Size the record value starting at `buf[0]`.
///
/// The rules, keyed off the lead byte `b`:
/// - `b >> 4 == 1`: one-byte boolean, no payload;
/// - `b & 0xf == 15`: one-byte null, no payload;
/// - `b & 0xf == 14`: the payload length follows as a varint and the header
///   spans the descriptor plus that varint;
/// - otherwise the low nibble is the payload length.
pub fn tag_info(buf: &[u8]) -> Result<TagInfo, RecordError> {
    let b = *buf.first().ok_or(RecordError::Truncated)?;
    if b >> 4 == 1 {
        return Ok(TagInfo {
            header_size: 1,
            object_size: 0,
        });
    }
    match b & 0xf {
        15 => Ok(TagInfo {
            header_size: 1,
            object_size: 0,
        }),
        14 => {
            let (len, len_bytes) = uvarint(&buf[1..])?;
            Ok(TagInfo {
                header_size: 1 + len_bytes,
                object_size: len,
            })
        }
        n => Ok(TagInfo {
            header_size: 1,
            object_size: n as usize,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booleans_and_nulls_are_single_bytes() {
        for b in [0x10u8, 0x11, 0x1f] {
            assert_eq!(
                tag_info(&[b]).unwrap(),
                TagInfo {
                    header_size: 1,
                    object_size: 0
                }
            );
        }
        assert_eq!(tag_info(&[0x2f]).unwrap().total_size(), 1);
        assert_eq!(tag_info(&[0x8f]).unwrap().total_size(), 1);
    }

    #[test]
    fn inline_lengths_use_the_low_nibble() {
        let info = tag_info(&[0x84, b'a', b'b', b'c', b'd']).unwrap();
        assert_eq!(info.header_size, 1);
        assert_eq!(info.object_size, 4);
    }

    #[test]
    fn escaped_lengths_use_a_varint() {
        // low nibble 14 escapes to a varint: 0x01 0x90 => (1 << 7) | 0x10
        let info = tag_info(&[0x8e, 0x01, 0x90]).unwrap();
        assert_eq!(info.header_size, 3);
        assert_eq!(info.object_size, 0x90);

        let (len, size) = uvarint(&[0x85]).unwrap();
        assert_eq!((len, size), (5, 1));
    }

    #[test]
    fn truncation_is_detected() {
        assert_eq!(tag_info(&[]), Err(RecordError::Truncated));
        assert_eq!(tag_info(&[0x8e]), Err(RecordError::Truncated));
        assert_eq!(tag_info(&[0x8e, 0x00]), Err(RecordError::Truncated));
    }
}
