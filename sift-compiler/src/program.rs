//! The SSA program builder core.
//!
//! A [`Program`] owns a monotonically growing pool of values, the
//! common-subexpression table, the string dictionary that doubles as the
//! emitted literal dictionary, the path-prefix stack, and the hash trees
//! referenced by membership and lookup ops. Typed constructors live in the
//! submodules; this file owns value numbering, argument type checking, and
//! the pool plumbing every constructor goes through.

use hashbrown::HashMap;
use sift_asm::ImmFmt;
use sift_types::SymbolId;

use crate::radix::HashTree;
use crate::ssa::{Imm, ImmKey, Op, TypeSet, Value, ValueId};

mod agg;
mod arith;
pub(crate) mod construct;
mod date;
pub(crate) mod hash;
mod logic;
mod path;
mod string;

pub use agg::AggHandle;
pub use arith::{CmpOp, NumOp};
pub use date::{DatePart, DateUnit};
pub use hash::wide_hash;
pub use string::MAX_PATTERN_SEGMENTS;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CseKey {
    op: Op,
    args: Vec<ValueId>,
    imm: Option<ImmKey>,
}

/// An SSA program under construction (and, post-optimization, the unit that
/// is symbolized and compiled).
#[derive(Debug, Clone, Default)]
pub struct Program {
    values: Vec<Value>,
    ret: Option<ValueId>,
    exprs: HashMap<CseKey, ValueId>,
    dict: Vec<Box<str>>,
    dict_ids: HashMap<Box<str>, u16>,
    path_prefix: Vec<String>,
    reserved: Vec<u16>,
    pub(crate) trees: Vec<HashTree>,
    pub(crate) tree_sources: Vec<hash::TreeSource>,
    agg_size: u32,
    pub(crate) symbolized: bool,
    pub(crate) literals: bool,
    pub(crate) resolved: Vec<(Box<str>, Option<SymbolId>)>,
}

impl Program {
    /// The row cursor and all-true lane mask; always value 0.
    pub const INIT: ValueId = 0;
    /// The constant false (and MISSING) mask; always value 1.
    pub const FALSE: ValueId = 1;
    /// The don't-care input; always value 2.
    pub const UNDEF: ValueId = 2;
    /// The root memory token; always value 3.
    pub const INIT_MEM: ValueId = 3;

    /// Start a fresh program, pre-seeded with the four distinguished values.
    pub fn begin() -> Program {
        let mut prog = Program::default();
        for op in [Op::Init, Op::KFalse, Op::Undef, Op::InitMem] {
            let id = prog.values.len() as ValueId;
            prog.values.push(Value {
                id,
                op,
                args: Vec::new(),
                imm: None,
                not_missing: None,
            });
        }
        prog
    }

    /// The value pool; index equals id after [`Program::renumber`].
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Borrow one value.
    pub fn value(&self, id: ValueId) -> &Value {
        &self.values[id as usize]
    }

    pub(crate) fn value_mut(&mut self, id: ValueId) -> &mut Value {
        &mut self.values[id as usize]
    }

    /// The designated return value, set by one of the `ret_*` builders.
    pub fn ret(&self) -> Option<ValueId> {
        self.ret
    }

    /// The interned string dictionary.
    pub fn dict(&self) -> &[Box<str>] {
        &self.dict
    }

    /// Total aggregate-buffer bytes the program's aggregates occupy.
    pub fn agg_size(&self) -> u32 {
        self.agg_size
    }

    /// Stack slots the caller wants left untouched by the allocator.
    pub fn reserved_slots(&self) -> &[u16] {
        &self.reserved
    }

    /// Mark a value stack slot as externally owned.
    pub fn reserve_slot(&mut self, slot: u16) {
        if !self.reserved.contains(&slot) {
            self.reserved.push(slot);
        }
    }

    /// The dictionary index of an already-interned string.
    pub(crate) fn dict_index(&self, s: &str) -> Option<u16> {
        self.dict_ids.get(s).copied()
    }

    /// Intern `s` into the dictionary, returning its index.
    pub(crate) fn intern(&mut self, s: &str) -> u16 {
        if let Some(&id) = self.dict_ids.get(s) {
            return id;
        }
        let id = self.dict.len() as u16;
        self.dict.push(s.into());
        self.dict_ids.insert(s.into(), id);
        id
    }

    /// Drop the expression table. In-place rewrites invalidate its keys,
    /// so the optimizer clears it before mutating anything.
    pub(crate) fn invalidate_cse(&mut self) {
        self.exprs.clear();
    }

    /// Allocate `size` aggregate-buffer bytes, 8-byte aligned.
    pub(crate) fn alloc_agg(&mut self, size: u32) -> u32 {
        let off = self.agg_size;
        self.agg_size += (size + 7) & !7;
        off
    }

    /// Core value-numbering constructor every typed builder goes through.
    ///
    /// Propagates invalid arguments, type-checks, then consults the
    /// expression table; a structurally identical prior value is returned
    /// instead of allocating a new one.
    pub(crate) fn ssa(&mut self, op: Op, args: &[ValueId], imm: Option<Imm>) -> ValueId {
        for &a in args {
            if self.values[a as usize].is_invalid() {
                return a;
            }
        }
        if let Some(detail) = self.type_check(op, args) {
            return self.invalid_value(op, detail);
        }
        let key = self.cse_key(op, args, &imm);
        if let Some(k) = &key {
            if let Some(&id) = self.exprs.get(k) {
                return id;
            }
        }
        let id = self.values.len() as ValueId;
        self.values.push(Value {
            id,
            op,
            args: args.to_vec(),
            imm,
            not_missing: None,
        });
        if let Some(k) = key {
            self.exprs.insert(k, id);
        }
        id
    }

    /// Allocate an `invalid` value carrying a diagnostic.
    pub(crate) fn invalid_value(&mut self, op: Op, detail: String) -> ValueId {
        let id = self.values.len() as ValueId;
        self.values.push(Value {
            id,
            op: Op::Invalid,
            args: Vec::new(),
            imm: Some(Imm::Error(
                format!("{}: {detail}", op.name()).into_boxed_str(),
            )),
            not_missing: None,
        });
        id
    }

    /// Check `args` against `op`'s declared signature.
    ///
    /// Every argument's produced set is intersected with the declared set;
    /// exactly one bit must survive, except for `undef` (and `invalid`,
    /// which never reaches this point).
    fn type_check(&self, op: Op, args: &[ValueId]) -> Option<String> {
        let info = op.info();
        let fixed = info.args.len();
        if info.vararg.is_empty() {
            if args.len() != fixed {
                return Some(format!("wants {} arguments, got {}", fixed, args.len()));
            }
        } else if args.len() < fixed || (args.len() - fixed) % info.vararg.len() != 0 {
            return Some(format!(
                "wants {} arguments plus {}-tuples, got {}",
                fixed,
                info.vararg.len(),
                args.len()
            ));
        }
        for (i, &a) in args.iter().enumerate() {
            let decl = if i < fixed {
                info.args[i]
            } else {
                info.vararg[(i - fixed) % info.vararg.len()]
            };
            let produced = self.values[a as usize].ret_type();
            if produced == TypeSet::ANY {
                continue;
            }
            let got = produced & decl;
            if got.is_empty() {
                return Some(format!(
                    "argument {i} has type {produced}, wants {decl}"
                ));
            }
            if !got.is_single() {
                return Some(format!(
                    "argument {i} is ambiguous: {produced} against {decl}"
                ));
            }
        }
        None
    }

    /// Build the CSE key, or `None` for values that must stay unique.
    ///
    /// Variadic-format ops are excluded: their immediates are rebuilt by
    /// the emitter and cannot be hashed structurally.
    fn cse_key(&mut self, op: Op, args: &[ValueId], imm: &Option<Imm>) -> Option<CseKey> {
        if op == Op::Invalid || op.info().imm == ImmFmt::Var {
            return None;
        }
        let imm = match imm {
            None => None,
            Some(Imm::Int(i)) => Some(ImmKey::Int(*i)),
            Some(Imm::Float(f)) => Some(ImmKey::Float(f.to_bits())),
            Some(Imm::Bool(b)) => Some(ImmKey::Bool(*b)),
            Some(Imm::Str(s)) => {
                let idx = self.intern(s);
                Some(ImmKey::Dict(idx))
            }
            Some(Imm::Bytes(b)) => Some(ImmKey::Bytes(b.clone())),
            Some(Imm::Ts(t)) => Some(ImmKey::Ts(*t)),
            Some(Imm::Sym(s)) => Some(ImmKey::Sym(s.id())),
            Some(Imm::Tree(t)) => Some(ImmKey::Tree(*t)),
            Some(Imm::Agg(a)) => Some(ImmKey::Agg(*a)),
            Some(Imm::AggPrec(a, p)) => Some(ImmKey::AggPrec(*a, *p)),
            Some(Imm::Slot(s)) => Some(ImmKey::Slot(*s)),
            Some(Imm::Error(_)) => return None,
        };
        Some(CseKey {
            op,
            args: args.to_vec(),
            imm,
        })
    }

    /// The literal payload of a `lit.*` value, if it is one.
    pub(crate) fn literal(&self, v: ValueId) -> Option<&Imm> {
        let val = &self.values[v as usize];
        match val.op {
            Op::LitInt | Op::LitFloat | Op::LitStr | Op::LitTs | Op::LitRecord => {
                val.imm.as_ref()
            }
            _ => None,
        }
    }

    /// The predicate under which `v` carries defined lanes.
    ///
    /// Composite values (`value|bool` and friends) are their own validity;
    /// plain scalars inherit their producer's canonical mask; constants are
    /// valid everywhere.
    pub(crate) fn validity(&self, v: ValueId) -> ValueId {
        let val = &self.values[v as usize];
        let rt = val.ret_type();
        if rt.contains(TypeSet::BOOL) {
            return v;
        }
        val.mask_arg().unwrap_or(Self::INIT)
    }

    /// Integer literal.
    pub fn lit_int(&mut self, v: i64) -> ValueId {
        self.ssa(Op::LitInt, &[], Some(Imm::Int(v)))
    }

    /// Float literal.
    pub fn lit_float(&mut self, v: f64) -> ValueId {
        self.ssa(Op::LitFloat, &[], Some(Imm::Float(v)))
    }

    /// String literal, interned into the dictionary.
    pub fn lit_str(&mut self, s: &str) -> ValueId {
        self.ssa(Op::LitStr, &[], Some(Imm::Str(s.into())))
    }

    /// Timestamp literal. Timestamps are normalized to microseconds at
    /// intern time, so equal instants always value-number together.
    pub fn lit_ts(&mut self, micros: i64) -> ValueId {
        self.ssa(Op::LitTs, &[], Some(Imm::Ts(micros)))
    }

    /// Boolean literal: `true` is the all-true mask, `false` is the shared
    /// false/MISSING constant.
    pub fn lit_bool(&mut self, v: bool) -> ValueId {
        if v {
            Self::INIT
        } else {
            Self::FALSE
        }
    }

    /// Encoded record literal. Forces re-symbolization on every invocation
    /// since the encoding embeds symbol ids.
    pub fn lit_record(&mut self, bytes: &[u8]) -> ValueId {
        self.literals = true;
        self.ssa(Op::LitRecord, &[], Some(Imm::Bytes(bytes.into())))
    }

    /// Finalize with a mask result.
    pub fn ret_mask(&mut self, k: ValueId) -> ValueId {
        let r = self.ssa(Op::RetK, &[k], None);
        self.ret = Some(r);
        r
    }

    /// Finalize with boxed values and their mask.
    pub fn ret_value(&mut self, v: ValueId, k: ValueId) -> ValueId {
        let r = self.ssa(Op::RetV, &[v, k], None);
        self.ret = Some(r);
        r
    }

    /// Finalize with a base pointer and its mask.
    pub fn ret_base(&mut self, b: ValueId, k: ValueId) -> ValueId {
        let r = self.ssa(Op::RetB, &[b, k], None);
        self.ret = Some(r);
        r
    }

    /// Finalize an aggregation program on its final memory token.
    pub fn ret_mem(&mut self, m: ValueId) -> ValueId {
        let r = self.ssa(Op::RetM, &[m], None);
        self.ret = Some(r);
        r
    }

    /// Compact the pool to the values reachable from the return value, in
    /// original order, so that id equals index again.
    pub fn renumber(&mut self) {
        let Some(ret) = self.ret else { return };
        let mut live = vec![false; self.values.len()];
        let mut stack = vec![ret];
        for seed in [Self::INIT, Self::FALSE, Self::UNDEF, Self::INIT_MEM] {
            stack.push(seed);
        }
        while let Some(v) = stack.pop() {
            if live[v as usize] {
                continue;
            }
            live[v as usize] = true;
            stack.extend(self.values[v as usize].args.iter().copied());
        }
        let mut remap = vec![u32::MAX; self.values.len()];
        let mut next = 0u32;
        for (i, l) in live.iter().enumerate() {
            if *l {
                remap[i] = next;
                next += 1;
            }
        }
        let old = core::mem::take(&mut self.values);
        self.values = old
            .into_iter()
            .enumerate()
            .filter(|(i, _)| live[*i])
            .map(|(i, mut v)| {
                v.id = remap[i];
                for a in &mut v.args {
                    *a = remap[*a as usize];
                }
                v.not_missing = v
                    .not_missing
                    .and_then(|nm| live[nm as usize].then(|| remap[nm as usize]));
                v
            })
            .collect();
        self.ret = Some(remap[ret as usize]);
        // the expression table holds stale ids now; building is over
        self.exprs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinguished_values_are_seeded() {
        let prog = Program::begin();
        assert_eq!(prog.value(Program::INIT).op, Op::Init);
        assert_eq!(prog.value(Program::FALSE).op, Op::KFalse);
        assert_eq!(prog.value(Program::UNDEF).op, Op::Undef);
        assert_eq!(prog.value(Program::INIT_MEM).op, Op::InitMem);
    }

    #[test]
    fn literals_value_number() {
        let mut prog = Program::begin();
        assert_eq!(prog.lit_int(7), prog.lit_int(7));
        assert_ne!(prog.lit_int(7), prog.lit_int(8));
        assert_eq!(prog.lit_str("a"), prog.lit_str("a"));
        // distinct encodings of one instant normalize to the same value
        assert_eq!(prog.lit_ts(1_000_000), prog.lit_ts(1_000_000));
        // floats hash by bit pattern
        assert_eq!(prog.lit_float(0.5), prog.lit_float(0.5));
        assert_ne!(prog.lit_float(0.0), prog.lit_float(-0.0));
    }

    #[test]
    fn type_mismatches_poison_the_value() {
        let mut prog = Program::begin();
        let s = prog.lit_str("x");
        // integer negate over a string argument
        let v = prog.ssa(Op::NegI, &[s, Program::INIT], None);
        assert!(prog.value(v).is_invalid());
        assert!(prog.value(v).diagnostic().unwrap().contains("neg.i"));
        // and invalids propagate through consumers
        let w = prog.ssa(Op::AddI, &[v, v, Program::INIT], None);
        assert_eq!(w, v);
    }

    #[test]
    fn undef_suppresses_the_ambiguity_check() {
        let mut prog = Program::begin();
        let v = prog.ssa(Op::NegI, &[Program::UNDEF, Program::INIT], None);
        assert!(!prog.value(v).is_invalid());
    }
}
