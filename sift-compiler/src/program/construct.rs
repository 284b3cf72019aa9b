//! Boxing, list/struct construction, and blends.

use crate::program::Program;
use crate::ssa::{Imm, Op, TypeSet, ValueId};

impl Program {
    /// Box `v` into the scratch buffer as lane values.
    ///
    /// Already-boxed values pass through; predicates box as booleans under
    /// their not-missing mask.
    pub fn box_value(&mut self, v: ValueId) -> ValueId {
        let rt = self.value(v).ret_type();
        if rt.contains(TypeSet::VALUE) {
            return v;
        }
        if rt == TypeSet::BOOL {
            let valid = self.not_missing(v);
            return self.ssa(Op::BoxMask, &[v, valid], None);
        }
        let op = match self.scalar_kind(v) {
            TypeSet::INT => Op::BoxInt,
            TypeSet::FLOAT => Op::BoxFloat,
            TypeSet::STRING => Op::BoxStr,
            TypeSet::TIME => Op::BoxTs,
            TypeSet::LIST => Op::BoxList,
            other => {
                return self.invalid_value(Op::BoxInt, format!("cannot box {other}"));
            }
        };
        let mask = self.validity(v);
        self.ssa(op, &[v, mask], None)
    }

    /// Assemble a list value from `items` on the lanes `mask` selects.
    ///
    /// Items missing on a lane are skipped rather than nulled, so the
    /// element count can vary per lane.
    pub fn make_list(&mut self, mask: ValueId, items: &[ValueId]) -> ValueId {
        let mut args = vec![mask];
        for &item in items {
            let boxed = self.box_value(item);
            let valid = self.validity(boxed);
            args.push(boxed);
            args.push(valid);
        }
        self.ssa(Op::MakeList, &args, None)
    }

    /// Assemble a structure value from named `fields` on the lanes `mask`
    /// selects. Field names travel in the immediate and are rewritten to
    /// symbol ids during symbolization.
    pub fn make_struct(&mut self, mask: ValueId, fields: &[(&str, ValueId)]) -> ValueId {
        let mut args = vec![mask];
        for &(_, item) in fields {
            let boxed = self.box_value(item);
            let valid = self.validity(boxed);
            args.push(boxed);
            args.push(valid);
        }
        let names: Vec<&str> = fields.iter().map(|(n, _)| *n).collect();
        self.ssa(Op::MakeStruct, &args, Some(Imm::Bytes(encode_field_names(&names))))
    }

    /// Lanes from `b` where `bmask` holds, else from `a`.
    pub fn blend(&mut self, a: ValueId, b: ValueId, bmask: ValueId) -> ValueId {
        let ka = self.scalar_kind(a);
        let kb = self.scalar_kind(b);
        if ka == TypeSet::VALUE || kb == TypeSet::VALUE {
            let a = self.box_value(a);
            let b = self.box_value(b);
            return self.ssa(Op::BlendV, &[a, b, bmask], None);
        }
        let op = match (ka, kb) {
            (TypeSet::INT, TypeSet::INT) => Op::BlendI,
            (TypeSet::STRING, TypeSet::STRING) => Op::BlendStr,
            _ => {
                let fa = self.to_float(a);
                let fb = self.to_float(b);
                return self.ssa(Op::BlendF, &[fa, fb, bmask], None);
            }
        };
        self.ssa(op, &[a, b, bmask], None)
    }

    /// `v` where present, else `fallback`: the two-armed COALESCE.
    pub fn coalesce(&mut self, v: ValueId, fallback: ValueId) -> ValueId {
        let present = self.not_missing(v);
        let absent = self.not(present);
        self.blend(v, fallback, absent)
    }
}

/// Name-list layout: tag 0, u16 count, then (u16 len, bytes) per name. The
/// symbolizer replaces it with tag 1, u16 count, u32 ids.
pub(crate) fn encode_field_names(names: &[&str]) -> Box<[u8]> {
    let mut out = vec![0u8];
    out.extend_from_slice(&(names.len() as u16).to_le_bytes());
    for n in names {
        out.extend_from_slice(&(n.len() as u16).to_le_bytes());
        out.extend_from_slice(n.as_bytes());
    }
    out.into_boxed_slice()
}

/// Decode a tag-0 name list back into strings.
pub(crate) fn decode_field_names(bytes: &[u8]) -> Option<Vec<String>> {
    if bytes.first() != Some(&0) {
        return None;
    }
    let count = u16::from_le_bytes([bytes[1], bytes[2]]) as usize;
    let mut at = 3;
    let mut names = Vec::with_capacity(count);
    for _ in 0..count {
        let len = u16::from_le_bytes([*bytes.get(at)?, *bytes.get(at + 1)?]) as usize;
        at += 2;
        let name = core::str::from_utf8(bytes.get(at..at + len)?).ok()?;
        at += len;
        names.push(name.to_owned());
    }
    Some(names)
}

/// Encode a resolved id list: tag 1, u16 count, u32 ids.
pub(crate) fn encode_field_ids(ids: &[u32]) -> Box<[u8]> {
    let mut out = vec![1u8];
    out.extend_from_slice(&(ids.len() as u16).to_le_bytes());
    for id in ids {
        out.extend_from_slice(&id.to_le_bytes());
    }
    out.into_boxed_slice()
}

/// Decode a tag-1 id list.
pub(crate) fn decode_field_ids(bytes: &[u8]) -> Option<Vec<u32>> {
    if bytes.first() != Some(&1) {
        return None;
    }
    let count = u16::from_le_bytes([bytes[1], bytes[2]]) as usize;
    let mut at = 3;
    let mut ids = Vec::with_capacity(count);
    for _ in 0..count {
        let raw: [u8; 4] = bytes.get(at..at + 4)?.try_into().ok()?;
        ids.push(u32::from_le_bytes(raw));
        at += 4;
    }
    Some(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_name_lists_round_trip() {
        let names = ["make", "model"];
        let bytes = encode_field_names(&names);
        assert_eq!(
            decode_field_names(&bytes),
            Some(vec!["make".to_owned(), "model".to_owned()])
        );
        let ids = encode_field_ids(&[3, 1 << 20]);
        assert_eq!(decode_field_ids(&ids), Some(vec![3, 1 << 20]));
    }

    #[test]
    fn boxing_dispatches_on_kind() {
        let mut p = Program::begin();
        let f = p.path("x");
        assert_eq!(p.box_value(f), f, "already boxed");
        let i = p.to_int(f);
        let bi = p.box_value(i);
        assert_eq!(p.value(bi).op, Op::BoxInt);
        let pred = p.ssa(Op::IsNull, &[f, f], None);
        let bk = p.box_value(pred);
        assert_eq!(p.value(bk).op, Op::BoxMask);
    }
}
