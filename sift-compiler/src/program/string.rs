//! String predicates and transforms.

use crate::program::Program;
use crate::ssa::{Imm, Op, ValueId};

/// Most segments a compiled wildcard pattern may hold.
pub const MAX_PATTERN_SEGMENTS: usize = 16;

const SEG_LITERAL: u8 = 0;
const SEG_ANY_RUN: u8 = 1;
const SEG_ANY_ONE: u8 = 2;

impl Program {
    /// `v` starts with `prefix`.
    pub fn has_prefix(&mut self, v: ValueId, prefix: &str, case_insensitive: bool) -> ValueId {
        let op = if case_insensitive {
            Op::HasPrefixCi
        } else {
            Op::HasPrefix
        };
        self.str_pred(op, v, prefix)
    }

    /// `v` ends with `suffix`.
    pub fn has_suffix(&mut self, v: ValueId, suffix: &str, case_insensitive: bool) -> ValueId {
        let op = if case_insensitive {
            Op::HasSuffixCi
        } else {
            Op::HasSuffix
        };
        self.str_pred(op, v, suffix)
    }

    /// `v` contains `needle`.
    pub fn contains(&mut self, v: ValueId, needle: &str, case_insensitive: bool) -> ValueId {
        let op = if case_insensitive {
            Op::ContainsCi
        } else {
            Op::Contains
        };
        self.str_pred(op, v, needle)
    }

    fn str_pred(&mut self, op: Op, v: ValueId, lit: &str) -> ValueId {
        let s = self.to_str(v);
        let mask = self.validity(s);
        self.ssa(op, &[s, mask], Some(Imm::Str(lit.into())))
    }

    /// SQL LIKE: `%` matches any run, `_` any single character, and
    /// `escape` (when given) quotes the next character.
    ///
    /// Patterns without wildcards lower to plain equality; pure
    /// prefix/suffix/infix shapes lower to the dedicated predicates; the
    /// general case compiles the segment list into the literal pool for the
    /// pattern matcher.
    pub fn like(
        &mut self,
        v: ValueId,
        pattern: &str,
        escape: Option<char>,
        case_insensitive: bool,
    ) -> ValueId {
        let segments = match parse_pattern(pattern, escape) {
            Ok(s) => s,
            Err(count) => {
                return self.invalid_value(
                    Op::MatchPat,
                    format!(
                        "pattern has too many wildcards ({count} > {MAX_PATTERN_SEGMENTS})"
                    ),
                );
            }
        };
        match classify(&segments) {
            Shape::Exact(lit) => {
                let s = self.to_str(v);
                let eq = if case_insensitive {
                    Op::CmpEqImmStrCi
                } else {
                    Op::CmpEqImmStr
                };
                let mask = self.validity(s);
                self.ssa(eq, &[s, mask], Some(Imm::Str(lit.into())))
            }
            Shape::Prefix(lit) => self.has_prefix(v, &lit, case_insensitive),
            Shape::Suffix(lit) => self.has_suffix(v, &lit, case_insensitive),
            Shape::Infix(lit) => self.contains(v, &lit, case_insensitive),
            Shape::General => {
                let op = if case_insensitive {
                    Op::MatchPatCi
                } else {
                    Op::MatchPat
                };
                let s = self.to_str(v);
                let mask = self.validity(s);
                let bytes = encode_pattern(&segments);
                self.ssa(op, &[s, mask], Some(Imm::Bytes(bytes.into())))
            }
        }
    }

    /// Lowercase.
    pub fn lower(&mut self, v: ValueId) -> ValueId {
        self.str_unary(Op::LowerStr, v)
    }

    /// Uppercase.
    pub fn upper(&mut self, v: ValueId) -> ValueId {
        self.str_unary(Op::UpperStr, v)
    }

    /// Strip leading whitespace.
    pub fn ltrim(&mut self, v: ValueId) -> ValueId {
        self.str_unary(Op::LtrimStr, v)
    }

    /// Strip trailing whitespace.
    pub fn rtrim(&mut self, v: ValueId) -> ValueId {
        self.str_unary(Op::RtrimStr, v)
    }

    /// Strip whitespace on both ends.
    pub fn trim(&mut self, v: ValueId) -> ValueId {
        self.str_unary(Op::TrimStr, v)
    }

    /// Character count.
    pub fn char_length(&mut self, v: ValueId) -> ValueId {
        self.str_unary(Op::CharLen, v)
    }

    /// Byte count.
    pub fn octet_length(&mut self, v: ValueId) -> ValueId {
        self.str_unary(Op::OctetLen, v)
    }

    fn str_unary(&mut self, op: Op, v: ValueId) -> ValueId {
        let s = self.to_str(v);
        let mask = self.validity(s);
        self.ssa(op, &[s, mask], None)
    }

    /// Substring starting at `start` (1-based), limited to `len` characters.
    pub fn substring(&mut self, v: ValueId, start: ValueId, len: ValueId) -> ValueId {
        let s = self.to_str(v);
        let start = self.to_int(start);
        let len = self.to_int(len);
        let mut mask = self.validity(s);
        for operand in [start, len] {
            let m = self.validity(operand);
            mask = self.and(mask, m);
        }
        self.ssa(Op::SubStr, &[s, start, len, mask], None)
    }

    /// The `idx`-th field (1-based) of `v` split on `delim`.
    pub fn split_part(&mut self, v: ValueId, delim: &str, idx: ValueId) -> ValueId {
        let s = self.to_str(v);
        let idx = self.to_int(idx);
        let vs = self.validity(s);
        let vi = self.validity(idx);
        let mask = self.and(vs, vi);
        self.ssa(Op::SplitPart, &[s, idx, mask], Some(Imm::Str(delim.into())))
    }

    /// Concatenation of two or more string parts.
    pub fn concat(&mut self, parts: &[ValueId]) -> ValueId {
        debug_assert!(parts.len() >= 2);
        let mut args = Vec::with_capacity(parts.len() * 2);
        for &part in parts {
            let s = self.to_str(part);
            let m = self.validity(s);
            args.push(s);
            args.push(m);
        }
        self.ssa(Op::ConcatStr, &args, None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    AnyRun,
    AnyOne,
}

enum Shape {
    Exact(String),
    Prefix(String),
    Suffix(String),
    Infix(String),
    General,
}

fn parse_pattern(pattern: &str, escape: Option<char>) -> Result<Vec<Segment>, usize> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut lit = String::new();
    let mut escaped = false;
    for ch in pattern.chars() {
        if escaped {
            lit.push(ch);
            escaped = false;
            continue;
        }
        if Some(ch) == escape {
            escaped = true;
            continue;
        }
        match ch {
            '%' => {
                if !lit.is_empty() {
                    segments.push(Segment::Literal(core::mem::take(&mut lit)));
                }
                if segments.last() != Some(&Segment::AnyRun) {
                    segments.push(Segment::AnyRun);
                }
            }
            '_' => {
                if !lit.is_empty() {
                    segments.push(Segment::Literal(core::mem::take(&mut lit)));
                }
                segments.push(Segment::AnyOne);
            }
            _ => lit.push(ch),
        }
    }
    if !lit.is_empty() {
        segments.push(Segment::Literal(lit));
    }
    if segments.len() > MAX_PATTERN_SEGMENTS {
        return Err(segments.len());
    }
    Ok(segments)
}

fn classify(segments: &[Segment]) -> Shape {
    match segments {
        [] => Shape::Exact(String::new()),
        [Segment::Literal(l)] => Shape::Exact(l.clone()),
        [Segment::Literal(l), Segment::AnyRun] => Shape::Prefix(l.clone()),
        [Segment::AnyRun, Segment::Literal(l)] => Shape::Suffix(l.clone()),
        [Segment::AnyRun, Segment::Literal(l), Segment::AnyRun] => Shape::Infix(l.clone()),
        _ => Shape::General,
    }
}

fn encode_pattern(segments: &[Segment]) -> Vec<u8> {
    let mut out = vec![segments.len() as u8];
    for seg in segments {
        match seg {
            Segment::Literal(l) => {
                out.push(SEG_LITERAL);
                out.extend_from_slice(&(l.len() as u16).to_le_bytes());
                out.extend_from_slice(l.as_bytes());
            }
            Segment::AnyRun => out.push(SEG_ANY_RUN),
            Segment::AnyOne => out.push(SEG_ANY_ONE),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_shapes_lower_to_dedicated_predicates() {
        let mut p = Program::begin();
        let v = p.path("s");
        let eq = p.like(v, "abc", None, false);
        assert_eq!(p.value(eq).op, Op::CmpEqImmStr);
        let pre = p.like(v, "abc%", None, false);
        assert_eq!(p.value(pre).op, Op::HasPrefix);
        let suf = p.like(v, "%abc", None, false);
        assert_eq!(p.value(suf).op, Op::HasSuffix);
        let inf = p.like(v, "%abc%", None, false);
        assert_eq!(p.value(inf).op, Op::Contains);
        let gen = p.like(v, "a%b_c", None, false);
        assert_eq!(p.value(gen).op, Op::MatchPat);
    }

    #[test]
    fn escapes_quote_wildcards() {
        let mut p = Program::begin();
        let v = p.path("s");
        let eq = p.like(v, r"100\%", Some('\\'), false);
        assert_eq!(p.value(eq).op, Op::CmpEqImmStr);
        assert_eq!(p.value(eq).imm, Some(Imm::Str("100%".into())));
    }

    #[test]
    fn oversized_patterns_are_rejected_in_band() {
        let mut p = Program::begin();
        let v = p.path("s");
        let pat = "a_".repeat(MAX_PATTERN_SEGMENTS);
        let bad = p.like(v, &pat, None, false);
        assert!(p.value(bad).is_invalid());
        assert!(p
            .value(bad)
            .diagnostic()
            .unwrap()
            .contains("too many wildcards"));
    }
}
