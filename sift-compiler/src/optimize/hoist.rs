//! Mask-argument hoisting.
//!
//! When an op runs under the mask `a AND b`, and `a`'s producer chain is
//! private to that op, the `b` side can rotate down the chain to the
//! articulation point — the first op still running under the initial true
//! mask — so the expensive parse and unbox work above it only touches lanes
//! that survive `b` anyway. Legality hinges on the post-dominator tree:
//! narrowing a value is safe only when every use funnels into the op whose
//! mask already includes `b`, the chain crossed is conjunctive, and `b`
//! itself does not depend on the point being narrowed.

use crate::optimize::postdom;
use crate::program::Program;
use crate::schedule;
use crate::ssa::{Op, ValueId};

impl Program {
    /// Apply one `androtate` when a legal one exists. Returns whether the
    /// program changed; the driver loops to the fixed point.
    pub(crate) fn hoist_masks(&mut self) -> bool {
        let order = schedule::rpo(self);
        if order.is_empty() {
            return false;
        }
        let pd = postdom::compute(self, &order);
        for &v in &order {
            let Some(mi) = self.value(v).mask_arg_index() else {
                continue;
            };
            let m = self.value(v).args[mi];
            if self.value(m).op != Op::And {
                continue;
            }
            let (a, b) = (self.value(m).args[0], self.value(m).args[1]);
            for (keep, hoist) in [(a, b), (b, a)] {
                let Some(articulation) = self.find_articulation(keep, v, hoist, &pd) else {
                    continue;
                };
                tracing::debug!(
                    op = self.value(v).op.name(),
                    articulation = self.value(articulation).op.name(),
                    "rotated mask below the articulation point"
                );
                let last = self.value(articulation).args.len() - 1;
                self.value_mut(articulation).args[last] = hoist;
                self.value_mut(v).args[mi] = keep;
                return true;
            }
        }
        false
    }

    /// Walk down `start`'s mask-argument chain looking for an op still
    /// running under the initial true mask.
    ///
    /// Every op crossed must be conjunctive and post-dominated by `v` (its
    /// result must only matter where `v`'s mask applies), and `hoist` must
    /// not transitively depend on the articulation point, or gating it
    /// there would create a cycle.
    fn find_articulation(
        &self,
        start: ValueId,
        v: ValueId,
        hoist: ValueId,
        pd: &postdom::PostDom,
    ) -> Option<ValueId> {
        let mut c = start;
        loop {
            let val = self.value(c);
            if val.op.is_disjunctive() {
                return None;
            }
            if !pd.postdominates(v, c) {
                return None;
            }
            let mask = val.mask_arg()?;
            if mask == Self::INIT {
                if self.depends_on(hoist, c) {
                    return None;
                }
                return Some(c);
            }
            c = mask;
        }
    }

    /// Whether `from` transitively consumes `target`.
    fn depends_on(&self, from: ValueId, target: ValueId) -> bool {
        if from == target {
            return true;
        }
        let mut seen = vec![false; self.values().len()];
        let mut stack = vec![from];
        while let Some(v) = stack.pop() {
            if v == target {
                return true;
            }
            if seen[v as usize] {
                continue;
            }
            seen[v as usize] = true;
            stack.extend(self.value(v).args.iter().copied());
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ssa::Imm;

    fn payload_dot(p: &Program) -> &crate::ssa::Value {
        p.values()
            .iter()
            .find(|val| {
                val.op == Op::Dot
                    && matches!(&val.imm, Some(Imm::Str(s)) if &**s == "payload")
            })
            .unwrap()
    }

    /// WHERE expensive-parse(payload) AND cheap(flag): the cheap predicate
    /// should gate the parse of payload after hoisting.
    #[test]
    fn narrow_predicates_gate_expensive_parses() {
        let mut p = Program::begin();
        let flag = p.path("flag");
        let cheap = p.is_true(flag);
        let deep = p.path("payload");
        let deep_str = p.to_str(deep);
        let lit = p.lit_str("PA");
        let expensive = p.equals(deep_str, lit);
        let cond = p.and(expensive, cheap);
        p.ret_mask(cond);
        p.optimize();
        assert_eq!(*payload_dot(&p).args.last().unwrap(), cheap);
        // and the combining AND is gone from the return's mask position
        let ret_mask = p.value(p.ret().unwrap()).args[0];
        assert_ne!(p.value(ret_mask).op, Op::And);
    }

    /// A chain with a use escaping the masked op must not be narrowed.
    #[test]
    fn shared_chains_are_left_alone() {
        let mut p = Program::begin();
        let flag = p.path("flag");
        let cheap = p.is_true(flag);
        let deep = p.path("payload");
        let deep_str = p.to_str(deep);
        let lit = p.lit_str("PA");
        let expensive = p.equals(deep_str, lit);
        let cond = p.and(expensive, cheap);
        // an op masked by the AND, whose input chain also escapes into the
        // return through a second predicate
        let gated = p.ssa(Op::IsNull, &[deep, cond], None);
        let escaping = p.is_false(deep);
        let both = p.or(gated, escaping);
        p.ret_mask(both);
        p.optimize();
        assert_eq!(
            *payload_dot(&p).args.last().unwrap(),
            Program::INIT,
            "dot with an escaping use keeps the true mask"
        );
    }
}
