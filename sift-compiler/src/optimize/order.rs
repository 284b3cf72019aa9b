//! Symbol-access ordering.
//!
//! After symbolization every `dot` carries a numeric id. For each base
//! pointer, accesses sorted by ascending id can reuse the previous field's
//! offset as a search hint, which is what the `findsym2` kernel expects —
//! monotone id order is its precondition. This pass groups live `dot`s by
//! (base, mask), sorts each group, and rewrites every non-first access to
//! `dot2` chained off its predecessor.

use hashbrown::HashMap;
use itertools::Itertools;

use crate::program::Program;
use crate::schedule;
use crate::ssa::{Imm, Op, ValueId};

impl Program {
    pub(crate) fn order_symbols(&mut self) -> bool {
        if !self.symbolized {
            return false;
        }
        let order = schedule::rpo(self);
        let mut groups: HashMap<(ValueId, ValueId), Vec<(u32, ValueId)>> = HashMap::new();
        for &v in &order {
            let val = self.value(v);
            if val.op != Op::Dot {
                continue;
            }
            let Some(&Imm::Sym(sym)) = val.imm.as_ref() else {
                continue;
            };
            groups
                .entry((val.args[0], val.args[1]))
                .or_default()
                .push((sym.id(), v));
        }
        let mut changed = false;
        for ((base, mask), group) in groups {
            if group.len() < 2 {
                continue;
            }
            let sorted: Vec<ValueId> = group
                .into_iter()
                .sorted_by_key(|&(sym, _)| sym)
                .map(|(_, v)| v)
                .collect();
            for pair in sorted.windows(2) {
                let (prev, cur) = (pair[0], pair[1]);
                let val = self.value_mut(cur);
                val.op = Op::Dot2;
                val.args = vec![base, prev, mask];
                changed = true;
            }
        }
        if changed {
            tracing::debug!("chained symbol accesses into findsym2 order");
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_types::SymbolTable;

    #[test]
    fn sibling_accesses_chain_in_ascending_id_order() {
        let mut table = SymbolTable::new();
        for name in ["alpha", "beta", "gamma"] {
            table.intern(name).unwrap();
        }
        let mut p = Program::begin();
        // build in shuffled order; ids come from the table. the predicates
        // join through OR so every access keeps the initial mask and the
        // whole sibling group stays chainable
        let g = p.path("gamma");
        let a = p.path("alpha");
        let b = p.path("beta");
        let ka = p.is_not_null(a);
        let kb = p.is_not_null(b);
        let kg = p.is_not_null(g);
        let t = p.or(ka, kb);
        let all = p.or(t, kg);
        p.ret_mask(all);
        p.optimize();
        let symp = p.symbolize(&table).unwrap();

        let dots: Vec<_> = symp
            .values()
            .iter()
            .filter(|v| v.op == Op::Dot || v.op == Op::Dot2)
            .collect();
        assert_eq!(dots.len(), 3);
        let heads: Vec<_> = dots.iter().filter(|v| v.op == Op::Dot).collect();
        assert_eq!(heads.len(), 1, "one chain head per base");
        let Some(&Imm::Sym(first)) = heads[0].imm.as_ref() else {
            panic!("head must carry a symbol id")
        };
        assert_eq!(first.id(), 0, "chain starts at the lowest id");
        // each dot2 resumes from the access one id earlier
        for d in dots.iter().filter(|v| v.op == Op::Dot2) {
            let Some(&Imm::Sym(cur)) = d.imm.as_ref() else { panic!() };
            let prev = &symp.values()[d.args[1] as usize];
            let Some(&Imm::Sym(prev_sym)) = prev.imm.as_ref() else {
                panic!()
            };
            assert_eq!(prev_sym.id() + 1, cur.id());
        }
    }
}
