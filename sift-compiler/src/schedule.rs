//! Instruction scheduling.
//!
//! Two phases. `rpo` walks the DAG depth-first from the return value,
//! visiting arguments left to right, so the canonical mask argument (the
//! rightmost) lands immediately before its user. `finalorder` then rebuilds
//! the order backward from the return value through a priority heap: a value
//! becomes ready once its last user is placed, and among ready values the
//! lowest static priority is placed closest to its consumer. Parse and
//! unbox ops (lowest priority) therefore sink to just before their use,
//! while memory-token chains (highest short of `init`) drag their operand
//! subtrees together. Anything unreachable from the return value is never
//! scheduled, which is the whole dead-code story.

use core::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::program::Program;
use crate::ssa::ValueId;

/// A valid execution ordering: depth-first post-order from the return
/// value, arguments before users, mask arguments scheduled nearest.
pub(crate) fn rpo(prog: &Program) -> Vec<ValueId> {
    let Some(ret) = prog.ret() else {
        return Vec::new();
    };
    let n = prog.values().len();
    let mut seen = vec![false; n];
    let mut out = Vec::new();
    let mut stack: Vec<(ValueId, usize)> = vec![(ret, 0)];
    seen[ret as usize] = true;
    while let Some(&mut (v, ref mut next)) = stack.last_mut() {
        let args = &prog.value(v).args;
        if *next < args.len() {
            let a = args[*next];
            *next += 1;
            if !seen[a as usize] {
                seen[a as usize] = true;
                stack.push((a, 0));
            }
        } else {
            stack.pop();
            out.push(v);
        }
    }
    out
}

#[derive(Debug, PartialEq, Eq)]
struct Ready {
    prio: i32,
    rpo: usize,
    id: ValueId,
}

impl Ord for Ready {
    fn cmp(&self, other: &Self) -> Ordering {
        // pop order: lowest priority first; ties keep reverse rpo order so
        // later producers stay near the consumers that made them ready
        other
            .prio
            .cmp(&self.prio)
            .then(self.rpo.cmp(&other.rpo))
            .then(self.id.cmp(&other.id))
    }
}

impl PartialOrd for Ready {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The final instruction order.
pub(crate) fn finalorder(prog: &Program) -> Vec<ValueId> {
    let order = rpo(prog);
    let Some(&ret) = order.last() else {
        return order;
    };
    let n = prog.values().len();
    let mut rpo_idx = vec![usize::MAX; n];
    for (i, &v) in order.iter().enumerate() {
        rpo_idx[v as usize] = i;
    }
    let mut uses = vec![0usize; n];
    for &v in &order {
        for &a in &prog.value(v).args {
            uses[a as usize] += 1;
        }
    }
    let mut heap = BinaryHeap::with_capacity(order.len());
    heap.push(Ready {
        prio: prog.value(ret).op.priority(),
        rpo: rpo_idx[ret as usize],
        id: ret,
    });
    let mut placed = vec![false; n];
    let mut out = Vec::with_capacity(order.len());
    while let Some(Ready { id, .. }) = heap.pop() {
        if placed[id as usize] {
            continue;
        }
        placed[id as usize] = true;
        out.push(id);
        for &a in &prog.value(id).args {
            uses[a as usize] -= 1;
            if uses[a as usize] == 0 {
                heap.push(Ready {
                    prio: prog.value(a).op.priority(),
                    rpo: rpo_idx[a as usize],
                    id: a,
                });
            }
        }
    }
    out.reverse();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ssa::Op;

    fn check_valid(prog: &Program, order: &[ValueId]) {
        let mut pos = vec![usize::MAX; prog.values().len()];
        for (i, &v) in order.iter().enumerate() {
            pos[v as usize] = i;
        }
        for &v in order {
            for &a in &prog.value(v).args {
                assert!(
                    pos[a as usize] < pos[v as usize],
                    "%{a} scheduled after its user %{v}"
                );
            }
        }
    }

    #[test]
    fn every_value_precedes_its_users() {
        let mut p = Program::begin();
        let make = p.path("Make");
        let style = p.path("BodyStyle");
        let lit = p.lit_str("PA");
        let eq = p.equals(style, lit);
        let also = p.is_not_null(make);
        let cond = p.and(eq, also);
        p.ret_mask(cond);
        check_valid(&p, &rpo(&p));
        check_valid(&p, &finalorder(&p));
    }

    #[test]
    fn dead_values_are_not_scheduled() {
        let mut p = Program::begin();
        let used = p.path("a");
        let dead = p.path("zzz");
        let lit = p.lit_str("x");
        let eq = p.equals(used, lit);
        p.ret_mask(eq);
        let order = finalorder(&p);
        assert!(!order.contains(&dead));
        assert!(order.contains(&eq));
    }

    #[test]
    fn init_runs_first_and_parsing_sinks_to_its_use() {
        let mut p = Program::begin();
        let a = p.path("a");
        let b = p.path("b");
        let la = p.lit_str("1");
        let lb = p.lit_str("2");
        let ea = p.equals(a, la);
        let eb = p.equals(b, lb);
        let both = p.and(ea, eb);
        p.ret_mask(both);
        let order = finalorder(&p);
        assert_eq!(order.first(), Some(&Program::INIT));
        // each dot's unbox-and-compare chain completes before the next dot
        // starts, so the K register survives between producer and consumer
        let pos: std::collections::HashMap<_, _> =
            order.iter().enumerate().map(|(i, &v)| (v, i)).collect();
        let dots: Vec<ValueId> = order
            .iter()
            .copied()
            .filter(|&v| p.value(v).op == Op::Dot)
            .collect();
        assert_eq!(dots.len(), 2);
        let cmp_over = |d: ValueId| {
            let unbox = order
                .iter()
                .copied()
                .find(|&v| p.value(v).op == Op::ToStr && p.value(v).args[0] == d)
                .unwrap();
            if p.value(ea).args[0] == unbox {
                ea
            } else {
                eb
            }
        };
        assert!(pos[&cmp_over(dots[0])] < pos[&dots[1]]);
    }
}
