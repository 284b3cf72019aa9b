//! Constant and false-mask propagation.

use crate::optimize::Rewriter;
use crate::program::construct::{decode_field_names, encode_field_names};
use crate::program::Program;
use crate::schedule;
use crate::ssa::{Imm, Op, TypeSet, ValueId};

impl Program {
    /// One round of false propagation plus the peephole set, iterated until
    /// no redirect fires. Returns whether anything changed.
    pub(crate) fn fold_pass(&mut self) -> bool {
        let mut changed = false;
        loop {
            let order = schedule::rpo(self);
            if order.is_empty() {
                return changed;
            }
            let mut rw = Rewriter::new(self.values().len());
            for &v in &order {
                // substitute earlier redirects into this value's arguments
                let mut args = self.value(v).args.clone();
                let mut dirty = false;
                for a in &mut args {
                    let mut r = rw.resolve(*a);
                    // symbolization leaves in-place false values behind;
                    // normalize them to the shared constant so the
                    // identity-based folds below see them
                    if self.value(r).op == Op::KFalse && r != Self::FALSE {
                        r = Self::FALSE;
                    }
                    if r != *a {
                        *a = r;
                        dirty = true;
                    }
                }
                if dirty {
                    self.value_mut(v).args = args.clone();
                    changed = true;
                }
                if let Some(nm) = self.value(v).not_missing {
                    let r = rw.resolve(nm);
                    if r != nm {
                        self.value_mut(v).not_missing = Some(r);
                    }
                }
                if let Some(rep) = self.fold_value(v, &args, &mut changed) {
                    if rep != v {
                        rw.redirect(v, rep);
                    }
                }
            }
            if let Some(ret) = self.ret() {
                let r = rw.resolve(ret);
                if r != ret {
                    // the return op itself never folds; only its inputs do
                    debug_assert!(self.value(r).op.is_return() || r == Self::FALSE);
                }
            }
            if !rw.took_effect() {
                return changed;
            }
            changed = true;
        }
    }

    /// The replacement for `v`, if one of the rewrites applies.
    fn fold_value(
        &mut self,
        v: ValueId,
        args: &[ValueId],
        changed: &mut bool,
    ) -> Option<ValueId> {
        let op = self.value(v).op;
        match op {
            Op::And => {
                let (a, b) = (args[0], args[1]);
                if a == Self::FALSE || b == Self::FALSE {
                    return Some(Self::FALSE);
                }
                if a == Self::INIT {
                    return Some(b);
                }
                if b == Self::INIT || a == b {
                    return Some(a);
                }
                None
            }
            Op::Or => {
                let (a, b) = (args[0], args[1]);
                if a == Self::INIT || b == Self::INIT {
                    return Some(Self::INIT);
                }
                if a == Self::FALSE {
                    return Some(b);
                }
                if b == Self::FALSE || a == b {
                    return Some(a);
                }
                None
            }
            Op::Xor => {
                let (a, b) = (args[0], args[1]);
                if a == b {
                    return Some(Self::FALSE);
                }
                if a == Self::FALSE {
                    return Some(b);
                }
                if b == Self::FALSE {
                    return Some(a);
                }
                if a == Self::INIT {
                    return Some(self.not(b));
                }
                if b == Self::INIT {
                    return Some(self.not(a));
                }
                None
            }
            Op::Xnor => {
                let (a, b) = (args[0], args[1]);
                if a == b {
                    return Some(Self::INIT);
                }
                if a == Self::INIT {
                    return Some(b);
                }
                if b == Self::INIT {
                    return Some(a);
                }
                if a == Self::FALSE {
                    return Some(self.not(b));
                }
                if b == Self::FALSE {
                    return Some(self.not(a));
                }
                None
            }
            Op::Not => {
                let a = args[0];
                if a == Self::FALSE {
                    return Some(Self::INIT);
                }
                if a == Self::INIT {
                    return Some(Self::FALSE);
                }
                if self.value(a).op == Op::Not {
                    return Some(self.value(a).args[0]);
                }
                None
            }
            Op::AndNot => {
                let (a, b) = (args[0], args[1]);
                if a == Self::FALSE {
                    return Some(b);
                }
                if a == Self::INIT || b == Self::FALSE || a == b {
                    return Some(Self::FALSE);
                }
                None
            }
            Op::BlendV | Op::BlendI | Op::BlendF | Op::BlendStr => {
                // a blend whose second arm never applies is its first arm
                (args[2] == Self::FALSE).then(|| args[0])
            }
            Op::ConcatStr => args
                .chunks(2)
                .any(|pair| pair.len() == 2 && pair[1] == Self::FALSE)
                .then_some(Self::FALSE),
            Op::MakeList | Op::MakeStruct => {
                if args[0] == Self::FALSE {
                    return Some(Self::FALSE);
                }
                self.drop_dead_pairs(v, args, changed);
                None
            }
            _ => {
                if op.is_disjunctive() || op.is_return() {
                    return None;
                }
                let mask = self.value(v).mask_arg()?;
                if mask != Self::FALSE {
                    return None;
                }
                if op.ret_type().contains(TypeSet::MEM) {
                    // dead side effect: pass the memory token through
                    return Some(args[0]);
                }
                Some(Self::FALSE)
            }
        }
    }

    /// Remove (value, mask) pairs that can never contribute to a
    /// constructed list or structure.
    fn drop_dead_pairs(&mut self, v: ValueId, args: &[ValueId], changed: &mut bool) {
        let dead: Vec<usize> = args[1..]
            .chunks(2)
            .enumerate()
            .filter(|(_, pair)| pair[1] == Self::FALSE)
            .map(|(i, _)| i)
            .collect();
        if dead.is_empty() {
            return;
        }
        let keep = |i: &usize| !dead.contains(i);
        let mut new_args = vec![args[0]];
        for (i, pair) in args[1..].chunks(2).enumerate() {
            if keep(&i) {
                new_args.extend_from_slice(pair);
            }
        }
        let new_imm = match &self.value(v).imm {
            Some(Imm::Bytes(b)) => decode_field_names(b).map(|names| {
                let kept: Vec<&str> = names
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| keep(i))
                    .map(|(_, n)| n.as_str())
                    .collect();
                Imm::Bytes(encode_field_names(&kept))
            }),
            _ => None,
        };
        let val = self.value_mut(v);
        val.args = new_args;
        if let Some(imm) = new_imm {
            val.imm = Some(imm);
        }
        *changed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn false_masks_collapse_conjunctive_chains() {
        let mut p = Program::begin();
        let style = p.path("BodyStyle");
        let lit = p.lit_str("PA");
        let eq = p.equals(style, lit);
        let gone = p.ssa(Op::And, &[eq, Program::FALSE], None);
        p.ret_mask(gone);
        p.optimize();
        assert_eq!(p.ret().map(|r| p.value(r).args[0]), Some(Program::FALSE));
    }

    #[test]
    fn double_negation_cancels() {
        let mut p = Program::begin();
        let f = p.path("x");
        let pred = p.is_null(f);
        let n1 = p.ssa(Op::Not, &[pred], None);
        let n2 = p.ssa(Op::Not, &[n1], None);
        p.ret_mask(n2);
        p.optimize();
        assert_eq!(p.ret().map(|r| p.value(r).args[0]), Some(pred));
    }

    #[test]
    fn blends_with_impossible_arms_fold_away() {
        let mut p = Program::begin();
        let a = p.path("a");
        let b = p.path("b");
        let blended = p.ssa(Op::BlendV, &[a, b, Program::FALSE], None);
        let isn = p.is_null(blended);
        p.ret_mask(isn);
        p.optimize();
        let ret_arg = p.value(p.ret().unwrap()).args[0];
        assert_eq!(p.value(ret_arg).args[0], a);
    }
}
