//! The fixed-point SSA rewriter.
//!
//! Three passes run until none of them changes the program: constant/false
//! propagation with the peephole set, symbol-access ordering (post
//! symbolization only), and mask-argument hoisting through the
//! post-dominator tree. Replacements go through a redirect table; uses are
//! substituted as the walk reaches them, so a fold cascades through its
//! consumers within a single pass.

use crate::program::Program;
use crate::ssa::ValueId;

mod fold;
mod hoist;
mod order;
pub(crate) mod postdom;

/// Union-find-flavored redirect table for value replacement.
pub(crate) struct Rewriter {
    to: Vec<ValueId>,
    changed: bool,
}

impl Rewriter {
    pub(crate) fn new(n: usize) -> Rewriter {
        Rewriter {
            to: (0..n as ValueId).collect(),
            changed: false,
        }
    }

    /// Follow redirects to the live replacement of `v`. Values allocated
    /// after this table was sized (by a rewrite itself) map to themselves.
    pub(crate) fn resolve(&self, mut v: ValueId) -> ValueId {
        while (v as usize) < self.to.len() && self.to[v as usize] != v {
            v = self.to[v as usize];
        }
        v
    }

    /// Replace `from` with `to` everywhere downstream.
    pub(crate) fn redirect(&mut self, from: ValueId, to: ValueId) {
        let to = self.resolve(to);
        if (from as usize) < self.to.len() && self.resolve(from) != to {
            self.to[from as usize] = to;
            self.changed = true;
        }
    }

    pub(crate) fn took_effect(&self) -> bool {
        self.changed
    }
}

impl Program {
    /// Run the rewrite passes to their joint fixed point.
    pub fn optimize(&mut self) {
        if self.ret().is_none() {
            return;
        }
        self.invalidate_cse();
        let mut rounds = 0usize;
        loop {
            let mut changed = self.fold_pass();
            changed |= self.order_symbols();
            changed |= self.hoist_masks();
            rounds += 1;
            if !changed {
                break;
            }
        }
        tracing::debug!(rounds, values = self.values().len(), "optimizer fixed point");
    }
}
