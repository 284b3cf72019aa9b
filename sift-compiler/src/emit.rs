//! The bytecode emitter.
//!
//! Walks the final instruction order with the virtual register state in
//! hand. Each value's emit routine places its operands — in-register when
//! the accumulator already holds them, otherwise from spill slots, saving a
//! displaced occupant that is still live — then writes the opcode word and
//! its immediates. The literal pool, dictionary, and hash trees accumulate
//! alongside and land in the compiled output.

use hashbrown::HashMap;

use sift_asm::{put_f64, put_i64, put_op, put_u16, put_u32, put_u8, ImmFmt, Opcode};

use crate::error::CompileError;
use crate::program::construct::decode_field_ids;
use crate::program::Program;
use crate::radix::HashTree;
use crate::regalloc::{Liveness, RegState};
use crate::schedule;
use crate::ssa::{Imm, Op, RegClass, ValueId};

/// Bytes of one scratch page; the literal pool plus the boxed-output
/// estimate must fit.
pub const PAGE_SIZE: usize = 4096;

static_assertions::const_assert!(PAGE_SIZE.is_power_of_two());

/// A fully compiled program, immutable and shareable across workers.
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    /// The instruction stream: `u16` opcodes with embedded immediates.
    pub compiled: Vec<u8>,
    /// Interned strings; `dict` immediates index into this.
    pub dict: Vec<Box<str>>,
    /// Radix trees; `tree` immediates index into this.
    pub trees: Vec<HashTree>,
    /// Absolute scratch offset of each tree's payload table.
    pub tree_payload_base: Vec<u32>,
    /// One scratch page, prefilled with the literal pool and tree payloads.
    pub scratch: Vec<u8>,
    /// Per-worker bytes for the K/S/V/B/L spill stacks.
    pub vstack_size: usize,
    /// Per-worker bytes for the hash spill stack.
    pub hstack_size: usize,
}

impl Program {
    /// Compile the (optimized, symbolized) program to bytecode.
    ///
    /// Collects in-band type diagnostics first; no partial bytecode is ever
    /// produced.
    pub fn compile(&self) -> Result<CompiledProgram, CompileError> {
        self.ret().ok_or(CompileError::NoReturn)?;
        let order = schedule::finalorder(self);
        let mut invalids = order
            .iter()
            .filter(|&&v| self.value(v).is_invalid());
        if let Some(&first) = invalids.next() {
            return Err(CompileError::IllTypedSsa {
                detail: self
                    .value(first)
                    .diagnostic()
                    .unwrap_or("unknown")
                    .to_owned(),
                extra: invalids.count(),
            });
        }
        let live = Liveness::compute(self, &order);
        let mut em = Emitter {
            prog: self,
            pos: 0,
            live,
            regs: RegState::new(),
            out: Vec::new(),
            lits: Vec::new(),
            lit_refs: HashMap::new(),
            scratch_estimate: 0,
        };
        for &slot in self.reserved_slots() {
            em.regs.stacks[RegClass::V.index()].reserve_past(slot);
        }
        for pos in 0..order.len() {
            em.pos = pos;
            let v = order[pos];
            tracing::trace!(value = v, op = self.value(v).op.name(), "emit");
            match self.value(v).op.info().emit {
                Some(f) => f(&mut em, v)?,
                None => emit_auto(&mut em, v)?,
            }
            em.release_dead(v);
        }
        em.finish()
    }
}

/// Mutable emitter state threaded through every emit routine.
pub struct Emitter<'a> {
    prog: &'a Program,
    pos: usize,
    live: Liveness,
    regs: RegState,
    out: Vec<u8>,
    lits: Vec<u8>,
    lit_refs: HashMap<Box<[u8]>, (u32, u32)>,
    scratch_estimate: usize,
}

impl<'a> Emitter<'a> {
    fn value(&self, v: ValueId) -> &'a crate::ssa::Value {
        self.prog.value(v)
    }

    /// Non-mem operands with their register classes, and the canonical
    /// mask argument.
    fn operands(&self, v: ValueId) -> (Vec<(ValueId, RegClass)>, Option<ValueId>) {
        let val = self.value(v);
        let info = val.op.info();
        let mask_idx = val.mask_arg_index();
        let mut ops = Vec::new();
        for (i, &a) in val.args.iter().enumerate() {
            if Some(i) == mask_idx {
                continue;
            }
            let decl = if i < info.args.len() {
                info.args[i]
            } else if info.vararg.is_empty() {
                continue;
            } else {
                info.vararg[(i - info.args.len()) % info.vararg.len()]
            };
            let consumed = self.value(a).ret_type() & decl;
            if let Some(c) = consumed.reg_class() {
                ops.push((a, c));
            }
        }
        (ops, val.mask_arg())
    }

    /// Spill a displaced occupant of `c` that is still live and unslotted.
    fn save_displaced(&mut self, c: RegClass) {
        let Some(w) = self.regs.occupant(c) else { return };
        if w == Program::UNDEF {
            return;
        }
        if self.live.last_use(w, c) <= self.pos {
            return;
        }
        if self.regs.slot(w, c).is_some() {
            return;
        }
        let slot = self.regs.assign_slot(w, c);
        put_op(&mut self.out, save_op(c));
        put_u16(&mut self.out, slot);
    }

    /// Make sure `v` has a spill slot in class `c`, saving it from the
    /// register if that is where it currently lives.
    pub(crate) fn ensure_slotted(&mut self, c: RegClass, v: ValueId) -> Result<u16, CompileError> {
        if v == Program::UNDEF {
            // don't-care operand: any slot contents will do
            return Ok(0);
        }
        if let Some(slot) = self.regs.slot(v, c) {
            return Ok(slot);
        }
        if self.regs.occupant(c) == Some(v) {
            let slot = self.regs.assign_slot(v, c);
            put_op(&mut self.out, save_op(c));
            put_u16(&mut self.out, slot);
            return Ok(slot);
        }
        unreachable!(
            "%{v} has neither register nor slot in {c:?}; scheduling broke the spill invariant"
        )
    }

    /// Make sure `v` occupies the class-`c` register.
    ///
    /// When the displaced occupant still needs saving and `v` already has a
    /// slot, a single exchange swaps them: the register takes `v` and the
    /// occupant inherits the slot.
    pub(crate) fn ensure_reg(&mut self, c: RegClass, v: ValueId) -> Result<(), CompileError> {
        if v == Program::UNDEF {
            return Ok(());
        }
        if self.regs.occupant(c) == Some(v) {
            return Ok(());
        }
        if let Some(w) = self.regs.occupant(c) {
            let w_live = w != Program::UNDEF && self.live.last_use(w, c) > self.pos;
            if w_live && self.regs.slot(w, c).is_none() && self.regs.slot(v, c).is_some() {
                if let Some(slot) = self.regs.transfer_slot(v, w, c) {
                    put_op(&mut self.out, xchg_op(c));
                    put_u16(&mut self.out, slot);
                    self.regs.seat(c, v);
                    return Ok(());
                }
            }
        }
        self.save_displaced(c);
        let slot = match self.regs.slot(v, c) {
            Some(s) => s,
            None => unreachable!(
                "%{v} has neither register nor slot in {c:?}; scheduling broke the spill invariant"
            ),
        };
        put_op(&mut self.out, load_op(c));
        put_u16(&mut self.out, slot);
        self.regs.seat(c, v);
        Ok(())
    }

    /// Make sure the canonical mask occupies K.
    pub(crate) fn ensure_mask(&mut self, k: Option<ValueId>) -> Result<(), CompileError> {
        match k {
            Some(k) => self.ensure_reg(RegClass::K, k),
            None => Ok(()),
        }
    }

    /// Seat `v` in every class its return set defines, saving displaced
    /// live occupants first.
    pub(crate) fn seat_results(&mut self, v: ValueId) {
        let ret = self.value(v).ret_type();
        for c in ret.reg_classes() {
            if self.regs.occupant(c) != Some(v) {
                self.save_displaced(c);
            }
            self.regs.seat(c, v);
        }
    }

    /// Write the opcode word.
    pub(crate) fn write_op(&mut self, op: Opcode) {
        put_op(&mut self.out, op);
    }

    /// Intern `bytes` into the literal pool, returning `(offset, length)`.
    pub(crate) fn lit_ref(&mut self, bytes: &[u8]) -> (u32, u32) {
        if let Some(&r) = self.lit_refs.get(bytes) {
            return r;
        }
        let r = (self.lits.len() as u32, bytes.len() as u32);
        self.lits.extend_from_slice(bytes);
        self.lit_refs.insert(bytes.into(), r);
        r
    }

    /// Account scratch bytes the op may box per invocation.
    pub(crate) fn add_scratch(&mut self, v: ValueId) -> Result<(), CompileError> {
        let op = self.value(v).op;
        if !op.uses_scratch() {
            return Ok(());
        }
        let cost = scratch_cost(op, self.value(v).args.len())
            .ok_or(CompileError::ScratchNotHandled(op.name()))?;
        self.scratch_estimate += cost;
        Ok(())
    }

    /// Free spill slots of arguments whose live range ends here.
    fn release_dead(&mut self, v: ValueId) {
        let args = self.value(v).args.clone();
        for a in args {
            for c in self.value(a).ret_type().reg_classes() {
                if self.live.last_use(a, c) <= self.pos {
                    self.regs.release_slot(a, c);
                }
            }
        }
    }

    /// Fixed-format immediate writer shared by the default emitter.
    fn write_imm(
        &mut self,
        v: ValueId,
        fmt: ImmFmt,
        slot_imm: Option<u16>,
    ) -> Result<(), CompileError> {
        let imm = self.value(v).imm.clone();
        let name = self.value(v).op.name();
        match (fmt, imm) {
            (ImmFmt::None, _) => {}
            (ImmFmt::Slot, _) => {
                let slot = slot_imm.unwrap_or_default();
                put_u16(&mut self.out, slot);
            }
            (ImmFmt::Bool, Some(Imm::Bool(b))) => put_u8(&mut self.out, b as u8),
            (ImmFmt::I64, Some(Imm::Int(i))) => put_i64(&mut self.out, i),
            (ImmFmt::I64, Some(Imm::Ts(t))) => put_i64(&mut self.out, t),
            (ImmFmt::F64, Some(Imm::Float(f))) => put_f64(&mut self.out, f),
            (ImmFmt::Dict, Some(Imm::Str(s))) => {
                let idx = self.prog.dict_index(&s).unwrap_or_default();
                put_u16(&mut self.out, idx);
            }
            (ImmFmt::Sym, Some(Imm::Sym(s))) => put_u32(&mut self.out, s.id()),
            (ImmFmt::Sym, Some(Imm::Str(_))) => {
                return Err(CompileError::NotSymbolized);
            }
            (ImmFmt::AggSlot, Some(Imm::Agg(a))) => put_u32(&mut self.out, a),
            (ImmFmt::AggPrec, Some(Imm::AggPrec(a, p))) => {
                put_u32(&mut self.out, a);
                put_u8(&mut self.out, p);
            }
            (ImmFmt::Tree, Some(Imm::Tree(t))) => put_u16(&mut self.out, t as u16),
            (ImmFmt::LitRef, Some(Imm::Bytes(b))) => {
                let (off, len) = self.lit_ref(&b);
                put_u32(&mut self.out, off);
                put_u32(&mut self.out, len);
            }
            (fmt, imm) => unreachable!(
                "`{name}` carries {imm:?} against immediate format {fmt:?}"
            ),
        }
        Ok(())
    }

    /// Final assembly: page layout, tree payload patching, stack sizing.
    fn finish(self) -> Result<CompiledProgram, CompileError> {
        let tree_bytes: usize = self.prog.trees.iter().map(|t| t.payload_bytes().len()).sum();
        let need = self.lits.len() + tree_bytes;
        if need > PAGE_SIZE {
            return Err(CompileError::LiteralTooLarge {
                need,
                max: PAGE_SIZE,
            });
        }
        if need + self.scratch_estimate > PAGE_SIZE {
            return Err(CompileError::ScratchTooSmall {
                need: need + self.scratch_estimate,
                max: PAGE_SIZE,
            });
        }
        let mut scratch = vec![0u8; PAGE_SIZE];
        scratch[..self.lits.len()].copy_from_slice(&self.lits);
        // tree payloads follow the literal pool; record each absolute base
        // so relative payload references resolve against the page
        let mut tree_payload_base = Vec::with_capacity(self.prog.trees.len());
        let mut at = self.lits.len();
        for tree in &self.prog.trees {
            tree_payload_base.push(at as u32);
            let p = tree.payload_bytes();
            scratch[at..at + p.len()].copy_from_slice(p);
            at += p.len();
        }
        let stacks = &self.regs.stacks;
        let vstack_size = [RegClass::K, RegClass::S, RegClass::V, RegClass::B, RegClass::L]
            .iter()
            .map(|c| stacks[c.index()].high_water())
            .sum();
        let hstack_size = stacks[RegClass::H.index()].high_water();
        Ok(CompiledProgram {
            compiled: self.out,
            dict: self.prog.dict().to_vec(),
            trees: self.prog.trees.clone(),
            tree_payload_base,
            scratch,
            vstack_size,
            hstack_size,
        })
    }
}

const fn save_op(c: RegClass) -> Opcode {
    match c {
        RegClass::K => Opcode::SAVEK,
        RegClass::S => Opcode::SAVES,
        RegClass::V => Opcode::SAVEV,
        RegClass::B => Opcode::SAVEB,
        RegClass::H => Opcode::SAVEH,
        RegClass::L => Opcode::SAVEL,
    }
}

const fn load_op(c: RegClass) -> Opcode {
    match c {
        RegClass::K => Opcode::LOADK,
        RegClass::S => Opcode::LOADS,
        RegClass::V => Opcode::LOADV,
        RegClass::B => Opcode::LOADB,
        RegClass::H => Opcode::LOADH,
        RegClass::L => Opcode::LOADL,
    }
}

const fn xchg_op(c: RegClass) -> Opcode {
    match c {
        RegClass::K => Opcode::XCHGK,
        RegClass::S => Opcode::XCHGS,
        RegClass::V => Opcode::XCHGV,
        RegClass::B => Opcode::XCHGB,
        RegClass::H => Opcode::XCHGH,
        RegClass::L => Opcode::XCHGL,
    }
}

/// Opcodes whose two register-class operands commute.
fn bc_commutative(op: Opcode) -> bool {
    use Opcode::*;
    matches!(
        op,
        ADDI | MULI | MINI | MAXI | BITANDI | BITORI | BITXORI | ADDF | MULF | MINF
            | MAXF | HYPOTF | CMPEQI | CMPEQF | CMPEQSTR | CMPEQSTRCI | CMPEQTS | CMPEQV
            | ANDK | ORK | XORK | XNORK
    )
}

fn scratch_cost(op: Op, nargs: usize) -> Option<usize> {
    match op {
        // fixed-width boxes: 16 lanes of tag + 8-byte payload
        Op::BoxInt | Op::BoxFloat | Op::BoxTs => Some(16 * 9),
        Op::BoxMask => Some(16),
        // variable-width boxes budget a conservative per-lane width
        Op::BoxStr | Op::BoxList => Some(16 * 32),
        Op::MakeList | Op::MakeStruct => Some((nargs / 2 + 1) * 16 * 10),
        _ => None,
    }
}

/// The default emitter: operand placement from the op table alone.
pub(crate) fn emit_auto(em: &mut Emitter<'_>, v: ValueId) -> Result<(), CompileError> {
    let val = em.value(v);
    let info = val.op.info();
    let Some(bc) = info.bc else {
        unreachable!("`{}` has neither opcode nor emitter", val.op.name())
    };
    let (ops, mask) = em.operands(v);
    let mut opcode = bc;
    let mut slot_imm = None;
    match (info.imm, ops.as_slice()) {
        (ImmFmt::Slot, &[(a, RegClass::K)]) => {
            // pure mask arithmetic: one side rides in K, the other spills
            let Some(m) = mask else {
                unreachable!("mask logic without a mask argument")
            };
            if bc_commutative(bc) && em.regs.occupant(RegClass::K) == Some(a) {
                slot_imm = Some(em.ensure_slotted(RegClass::K, m)?);
            } else {
                slot_imm = Some(em.ensure_slotted(RegClass::K, a)?);
                em.ensure_reg(RegClass::K, m)?;
            }
        }
        (ImmFmt::Slot, &[(x, cx), (y, cy)]) => {
            debug_assert_eq!(cx, cy, "slot-format operands share a class");
            if em.regs.occupant(cx) == Some(y) {
                if bc_commutative(bc) {
                    slot_imm = Some(em.ensure_slotted(cx, x)?);
                } else if bc.has_reverse() {
                    opcode = bc.reversed();
                    slot_imm = Some(em.ensure_slotted(cx, x)?);
                } else {
                    slot_imm = Some(em.ensure_slotted(cx, y)?);
                    em.ensure_reg(cx, x)?;
                }
            } else {
                slot_imm = Some(em.ensure_slotted(cx, y)?);
                em.ensure_reg(cx, x)?;
            }
            em.ensure_mask(mask)?;
        }
        (_, operands) => {
            for &(x, c) in operands {
                em.ensure_reg(c, x)?;
            }
            em.ensure_mask(mask)?;
        }
    }
    if info.imm == ImmFmt::Slot && slot_imm.is_none() {
        unreachable!("`{}` produced no slot operand", val.op.name());
    }
    em.add_scratch(v)?;
    em.seat_results(v);
    em.write_op(opcode);
    em.write_imm(v, info.imm, slot_imm)
}

/// Ops that exist only in the SSA (tokens, undef) emit nothing.
pub(crate) fn emit_nothing(_em: &mut Emitter<'_>, _v: ValueId) -> Result<(), CompileError> {
    Ok(())
}

/// Terminal ops: place the returned registers, then `ret`.
pub(crate) fn emit_ret(em: &mut Emitter<'_>, v: ValueId) -> Result<(), CompileError> {
    let (ops, mask) = em.operands(v);
    for (x, c) in ops {
        em.ensure_reg(c, x)?;
    }
    em.ensure_mask(mask)?;
    em.write_op(Opcode::RET);
    Ok(())
}

/// `dot`: base in B, mask in K, resolved symbol id in the immediate.
pub(crate) fn emit_dot(em: &mut Emitter<'_>, v: ValueId) -> Result<(), CompileError> {
    let val = em.value(v);
    let (base, mask) = (val.args[0], val.args[1]);
    let sym = match &val.imm {
        Some(Imm::Sym(s)) => s.id(),
        _ => return Err(CompileError::NotSymbolized),
    };
    em.ensure_reg(RegClass::B, base)?;
    em.ensure_mask(Some(mask))?;
    em.seat_results(v);
    em.write_op(Opcode::FINDSYM);
    put_u32(&mut em.out, sym);
    Ok(())
}

/// `dot2`: like `dot`, plus the prior field's spill slot as a start hint.
pub(crate) fn emit_dot2(em: &mut Emitter<'_>, v: ValueId) -> Result<(), CompileError> {
    let val = em.value(v);
    let (base, prior, mask) = (val.args[0], val.args[1], val.args[2]);
    let sym = match &val.imm {
        Some(Imm::Sym(s)) => s.id(),
        _ => return Err(CompileError::NotSymbolized),
    };
    let prior_slot = em.ensure_slotted(RegClass::V, prior)?;
    em.ensure_reg(RegClass::B, base)?;
    em.ensure_mask(Some(mask))?;
    em.seat_results(v);
    em.write_op(Opcode::FINDSYM2);
    put_u32(&mut em.out, sym);
    put_u16(&mut em.out, prior_slot);
    Ok(())
}

/// Reserved-slot read, ordered by its memory token.
pub(crate) fn emit_loadslot(em: &mut Emitter<'_>, v: ValueId) -> Result<(), CompileError> {
    let val = em.value(v);
    let mask = val.args[1];
    let Some(&Imm::Slot(slot)) = val.imm.as_ref() else {
        unreachable!("load.slot without a slot immediate")
    };
    em.ensure_mask(Some(mask))?;
    em.seat_results(v);
    em.write_op(Opcode::LOADV);
    put_u16(&mut em.out, slot);
    Ok(())
}

/// Reserved-slot write, ordered by its memory token.
pub(crate) fn emit_storeslot(em: &mut Emitter<'_>, v: ValueId) -> Result<(), CompileError> {
    let val = em.value(v);
    let (value, mask) = (val.args[1], val.args[2]);
    let Some(&Imm::Slot(slot)) = val.imm.as_ref() else {
        unreachable!("store.slot without a slot immediate")
    };
    em.ensure_reg(RegClass::V, value)?;
    em.ensure_mask(Some(mask))?;
    em.write_op(Opcode::SAVEV);
    put_u16(&mut em.out, slot);
    Ok(())
}

/// First operand in its register, remaining operands as trailing slots.
pub(crate) fn emit_trailing_slots(em: &mut Emitter<'_>, v: ValueId) -> Result<(), CompileError> {
    let (ops, mask) = em.operands(v);
    let mut slots = Vec::with_capacity(ops.len() - 1);
    for &(x, c) in &ops[1..] {
        slots.push(em.ensure_slotted(c, x)?);
    }
    let (first, c) = ops[0];
    em.ensure_reg(c, first)?;
    em.ensure_mask(mask)?;
    em.seat_results(v);
    let val = em.value(v);
    let info = val.op.info();
    em.write_op(info.bc.unwrap_or(Opcode::RET));
    debug_assert_eq!(info.imm.width(), Some(2 * slots.len()));
    for slot in slots {
        put_u16(&mut em.out, slot);
    }
    Ok(())
}

/// `splitpart`: delimiter from the dictionary plus the index slot.
pub(crate) fn emit_splitpart(em: &mut Emitter<'_>, v: ValueId) -> Result<(), CompileError> {
    let val = em.value(v);
    let (s, idx, mask) = (val.args[0], val.args[1], val.args[2]);
    let Some(Imm::Str(delim)) = val.imm.clone() else {
        unreachable!("splitpart without a delimiter")
    };
    let idx_slot = em.ensure_slotted(RegClass::S, idx)?;
    em.ensure_reg(RegClass::S, s)?;
    em.ensure_mask(Some(mask))?;
    em.seat_results(v);
    em.write_op(Opcode::SPLITPART);
    let dict = em.prog.dict_index(&delim).unwrap_or_default();
    put_u16(&mut em.out, dict);
    put_u16(&mut em.out, idx_slot);
    Ok(())
}

/// `concat.str`: variadic (string slot, mask slot) pairs.
pub(crate) fn emit_concat(em: &mut Emitter<'_>, v: ValueId) -> Result<(), CompileError> {
    let args = em.value(v).args.clone();
    let mut payload = Vec::new();
    put_u32(&mut payload, (args.len() / 2) as u32);
    for pair in args.chunks(2) {
        let s_slot = em.ensure_slotted(RegClass::S, pair[0])?;
        let k_slot = em.ensure_slotted(RegClass::K, pair[1])?;
        put_u16(&mut payload, s_slot);
        put_u16(&mut payload, k_slot);
    }
    em.ensure_mask(Some(args[args.len() - 1]))?;
    em.seat_results(v);
    em.write_op(Opcode::CONCATSTR);
    put_u32(&mut em.out, payload.len() as u32);
    em.out.extend_from_slice(&payload);
    Ok(())
}

/// `boxmask`: the boxed predicate rides in K, its validity in a slot.
pub(crate) fn emit_boxmask(em: &mut Emitter<'_>, v: ValueId) -> Result<(), CompileError> {
    let val = em.value(v);
    let (k, valid) = (val.args[0], val.args[1]);
    let valid_slot = em.ensure_slotted(RegClass::K, valid)?;
    em.ensure_reg(RegClass::K, k)?;
    em.add_scratch(v)?;
    em.seat_results(v);
    em.write_op(Opcode::BOXMASK);
    put_u16(&mut em.out, valid_slot);
    Ok(())
}

fn emit_variadic_construct(
    em: &mut Emitter<'_>,
    v: ValueId,
    opcode: Opcode,
    syms: Option<Vec<u32>>,
) -> Result<(), CompileError> {
    let args = em.value(v).args.clone();
    let pairs = &args[1..];
    let mut payload = Vec::new();
    put_u32(&mut payload, (pairs.len() / 2) as u32);
    for (i, pair) in pairs.chunks(2).enumerate() {
        if let Some(syms) = &syms {
            put_u32(&mut payload, syms[i]);
        }
        let v_slot = em.ensure_slotted(RegClass::V, pair[0])?;
        let k_slot = em.ensure_slotted(RegClass::K, pair[1])?;
        put_u16(&mut payload, v_slot);
        put_u16(&mut payload, k_slot);
    }
    em.ensure_mask(Some(args[0]))?;
    em.add_scratch(v)?;
    em.seat_results(v);
    em.write_op(opcode);
    put_u32(&mut em.out, payload.len() as u32);
    em.out.extend_from_slice(&payload);
    Ok(())
}

/// `makelist`: construct mask in K, items as (value, mask) slot pairs.
pub(crate) fn emit_makelist(em: &mut Emitter<'_>, v: ValueId) -> Result<(), CompileError> {
    emit_variadic_construct(em, v, Opcode::MAKELIST, None)
}

/// `makestruct`: like `makelist`, with a resolved symbol id per field.
pub(crate) fn emit_makestruct(em: &mut Emitter<'_>, v: ValueId) -> Result<(), CompileError> {
    let syms = match &em.value(v).imm {
        Some(Imm::Bytes(b)) => decode_field_ids(b).ok_or(CompileError::NotSymbolized)?,
        _ => return Err(CompileError::NotSymbolized),
    };
    emit_variadic_construct(em, v, Opcode::MAKESTRUCT, Some(syms))
}

/// Blends: the preferred arm rides in the register, the fallback spills.
pub(crate) fn emit_blend(em: &mut Emitter<'_>, v: ValueId) -> Result<(), CompileError> {
    let val = em.value(v);
    let (a, b, k) = (val.args[0], val.args[1], val.args[2]);
    let bc = val.op.info().bc.unwrap_or(Opcode::BLENDV);
    let class = if bc == Opcode::BLENDV {
        RegClass::V
    } else {
        RegClass::S
    };
    let a_slot = em.ensure_slotted(class, a)?;
    em.ensure_reg(class, b)?;
    em.ensure_mask(Some(k))?;
    em.seat_results(v);
    em.write_op(bc);
    put_u16(&mut em.out, a_slot);
    Ok(())
}

/// `hashvalue`: hashes land in H and persist in a fresh H slot.
pub(crate) fn emit_hashvalue(em: &mut Emitter<'_>, v: ValueId) -> Result<(), CompileError> {
    let val = em.value(v);
    let (boxed, mask) = (val.args[0], val.args[1]);
    em.ensure_reg(RegClass::V, boxed)?;
    em.ensure_mask(Some(mask))?;
    em.seat_results(v);
    let dest = em.regs.assign_slot(v, RegClass::H);
    em.write_op(Opcode::HASHVALUE);
    put_u16(&mut em.out, dest);
    Ok(())
}

/// `hashvalue+`: mixes a prior hash slot into a fresh one.
pub(crate) fn emit_hashvalueplus(em: &mut Emitter<'_>, v: ValueId) -> Result<(), CompileError> {
    let val = em.value(v);
    let (h, boxed, mask) = (val.args[0], val.args[1], val.args[2]);
    let src = em.ensure_slotted(RegClass::H, h)?;
    em.ensure_reg(RegClass::V, boxed)?;
    em.ensure_mask(Some(mask))?;
    em.seat_results(v);
    let dest = em.regs.assign_slot(v, RegClass::H);
    em.write_op(Opcode::HASHVALUEPLUS);
    put_u16(&mut em.out, src);
    put_u16(&mut em.out, dest);
    Ok(())
}

/// Tree-indexed ops: hash in H, mask in K, tree index immediate.
pub(crate) fn emit_tree_imm(em: &mut Emitter<'_>, v: ValueId) -> Result<(), CompileError> {
    let val = em.value(v);
    let (h, mask) = (val.args[0], val.args[1]);
    let Some(&Imm::Tree(t)) = val.imm.as_ref() else {
        unreachable!("tree op without a tree immediate")
    };
    let bc = val.op.info().bc.unwrap_or(Opcode::HASHMEMBER);
    em.ensure_reg(RegClass::H, h)?;
    em.ensure_mask(Some(mask))?;
    em.seat_results(v);
    em.write_op(bc);
    put_u16(&mut em.out, t as u16);
    Ok(())
}
