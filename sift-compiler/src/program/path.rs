//! Path navigation into self-describing records.

use crate::program::Program;
use crate::ssa::{Imm, Op, TypeSet, ValueId};

impl Program {
    /// One field access on a base pointer.
    pub fn dot(&mut self, name: &str, base: ValueId, mask: ValueId) -> ValueId {
        self.ssa(Op::Dot, &[base, mask], Some(Imm::Str(name.into())))
    }

    /// Materialize a composite value as an interior base pointer.
    pub fn tuples(&mut self, v: ValueId, mask: ValueId) -> ValueId {
        self.ssa(Op::Tuples, &[v, mask], None)
    }

    /// Navigate a dotted path from the row cursor.
    ///
    /// `path("a.b.c")` decomposes into a `dot` chain, each nested step
    /// re-based through `tuples`. Any prefix pushed with
    /// [`Program::push_path_prefix`] is prepended first, so constructors
    /// running under a scope resolve relative to it.
    pub fn path(&mut self, path: &str) -> ValueId {
        let full: Vec<String> = self
            .path_prefix
            .iter()
            .flat_map(|p| p.split('.'))
            .chain(path.split('.'))
            .map(str::to_owned)
            .collect();
        self.walk(Self::INIT, Self::INIT, &full)
    }

    /// Navigate a dotted path from an existing value or base.
    pub fn rel_path(&mut self, base: ValueId, path: &str) -> ValueId {
        let segs: Vec<String> = path.split('.').map(str::to_owned).collect();
        let mask = self.validity(base);
        if self.value(base).ret_type().contains(TypeSet::BASE) {
            self.walk(base, mask, &segs)
        } else {
            let rebased = self.tuples(base, mask);
            self.walk(rebased, rebased, &segs)
        }
    }

    fn walk(&mut self, base: ValueId, mask: ValueId, segments: &[String]) -> ValueId {
        let mut cur = self.dot(&segments[0], base, mask);
        for seg in &segments[1..] {
            let inner = self.tuples(cur, cur);
            cur = self.dot(seg, inner, inner);
        }
        cur
    }

    /// Enter a path scope; subsequent [`Program::path`] calls resolve
    /// beneath it.
    pub fn push_path_prefix(&mut self, prefix: &str) {
        self.path_prefix.push(prefix.to_owned());
    }

    /// Leave the innermost path scope.
    pub fn pop_path_prefix(&mut self) {
        self.path_prefix.pop();
    }

    /// Split a list into its head value and tail list.
    ///
    /// The result carries three classes at once: consumed as `value` it is
    /// the head, as `list` the tail, as `bool` the non-empty mask. Chained
    /// splits value-number, so successive indexing reuses earlier steps.
    pub fn split(&mut self, list: ValueId, mask: ValueId) -> ValueId {
        self.ssa(Op::Split, &[list, mask], None)
    }

    /// Lanes where `v` is null (present, with a null value).
    pub fn is_null(&mut self, v: ValueId) -> ValueId {
        let mask = self.validity(v);
        self.ssa(Op::IsNull, &[v, mask], None)
    }

    /// Lanes where `v` is present and not null.
    pub fn is_not_null(&mut self, v: ValueId) -> ValueId {
        let mask = self.validity(v);
        self.ssa(Op::IsNotNull, &[v, mask], None)
    }

    /// Lanes where `v` is boolean true.
    pub fn is_true(&mut self, v: ValueId) -> ValueId {
        let mask = self.validity(v);
        self.ssa(Op::IsTrue, &[v, mask], None)
    }

    /// Lanes where `v` is boolean false.
    pub fn is_false(&mut self, v: ValueId) -> ValueId {
        let mask = self.validity(v);
        self.ssa(Op::IsFalse, &[v, mask], None)
    }

    /// Write `v` into a reserved value slot, ordered by `mem`.
    pub fn store_slot(&mut self, mem: ValueId, v: ValueId, slot: u16) -> ValueId {
        self.reserve_slot(slot);
        let boxed = self.box_value(v);
        let mask = self.validity(boxed);
        self.ssa(Op::StoreSlot, &[mem, boxed, mask], Some(Imm::Slot(slot)))
    }

    /// Read a reserved value slot, ordered by `mem`.
    pub fn load_slot(&mut self, mem: ValueId, slot: u16) -> ValueId {
        self.reserve_slot(slot);
        self.ssa(Op::LoadSlot, &[mem, Self::INIT], Some(Imm::Slot(slot)))
    }

    /// The `n`-th element of a list value (zero-based).
    pub fn index(&mut self, list: ValueId, n: usize) -> ValueId {
        let mask = self.validity(list);
        let unboxed = if self.value(list).ret_type().contains(TypeSet::LIST) {
            list
        } else {
            self.ssa(Op::ToList, &[list, mask], None)
        };
        let mut cur = self.split(unboxed, mask);
        for _ in 0..n {
            cur = self.split(cur, cur);
        }
        cur
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_decompose_and_value_number() {
        let mut p = Program::begin();
        let before = p.values().len();
        let a = p.path("a.b.c");
        let dots = p
            .values()
            .iter()
            .filter(|v| v.op == Op::Dot)
            .count();
        assert_eq!(dots, 3);
        // the same path reuses every value
        let b = p.path("a.b.c");
        assert_eq!(a, b);
        let after = p.values().len();
        let c = p.path("a.b.c");
        assert_eq!(a, c);
        assert_eq!(p.values().len(), after);
        assert!(after > before);
    }

    #[test]
    fn prefixes_scope_path_resolution() {
        let mut p = Program::begin();
        p.push_path_prefix("outer");
        let scoped = p.path("x");
        p.pop_path_prefix();
        let direct = p.path("outer.x");
        assert_eq!(scoped, direct);
        assert_ne!(scoped, p.path("x"));
    }

    #[test]
    fn repeated_indexing_shares_splits() {
        let mut p = Program::begin();
        let l = p.path("xs");
        let before = p.values().len();
        let _x1 = p.index(l, 1);
        let mid = p.values().len();
        let _x2 = p.index(l, 2);
        // index 2 only adds one more split on top of index 1's chain
        assert_eq!(p.values().len(), mid + 1);
        assert!(mid > before);
    }
}
