//! Mask logic and the three-valued MISSING calculus.

use crate::program::Program;
use crate::ssa::{Op, ValueId};

impl Program {
    /// Lane-wise AND of two predicates.
    pub fn and(&mut self, a: ValueId, b: ValueId) -> ValueId {
        if a == Self::FALSE || b == Self::FALSE {
            return Self::FALSE;
        }
        if a == Self::INIT {
            return b;
        }
        if b == Self::INIT || a == b {
            return a;
        }
        self.ssa(Op::And, &[a, b], None)
    }

    /// Lane-wise OR of two predicates.
    pub fn or(&mut self, a: ValueId, b: ValueId) -> ValueId {
        if a == Self::INIT || b == Self::INIT {
            return Self::INIT;
        }
        if a == Self::FALSE {
            return b;
        }
        if b == Self::FALSE || a == b {
            return a;
        }
        self.ssa(Op::Or, &[a, b], None)
    }

    /// Lane-wise XOR of two predicates.
    pub fn xor(&mut self, a: ValueId, b: ValueId) -> ValueId {
        if a == b {
            return Self::FALSE;
        }
        if a == Self::FALSE {
            return b;
        }
        if b == Self::FALSE {
            return a;
        }
        if a == Self::INIT {
            return self.not(b);
        }
        if b == Self::INIT {
            return self.not(a);
        }
        self.ssa(Op::Xor, &[a, b], None)
    }

    /// Lane-wise XNOR (equivalence) of two predicates.
    pub fn xnor(&mut self, a: ValueId, b: ValueId) -> ValueId {
        if a == b {
            return Self::INIT;
        }
        if a == Self::INIT {
            return b;
        }
        if b == Self::INIT {
            return a;
        }
        if a == Self::FALSE {
            return self.not(b);
        }
        if b == Self::FALSE {
            return self.not(a);
        }
        self.ssa(Op::Xnor, &[a, b], None)
    }

    /// Lane-wise complement of a predicate.
    pub fn not(&mut self, a: ValueId) -> ValueId {
        if a == Self::INIT {
            return Self::FALSE;
        }
        if a == Self::FALSE {
            return Self::INIT;
        }
        let val = self.value(a);
        if val.op == Op::Not {
            return val.args[0];
        }
        self.ssa(Op::Not, &[a], None)
    }

    /// `b` minus `a`: lanes in `b` where `a` does not hold.
    pub fn and_not(&mut self, a: ValueId, b: ValueId) -> ValueId {
        if a == Self::FALSE {
            return b;
        }
        if a == Self::INIT || b == Self::FALSE || a == b {
            return Self::FALSE;
        }
        self.ssa(Op::AndNot, &[a, b], None)
    }

    /// The predicate under which `v` is defined (not MISSING).
    ///
    /// Walks backward over the logical connectives with SQL's three-valued
    /// semantics: an AND is defined when both sides are, or when either side
    /// is definitely false; an OR is defined when both sides are, or when
    /// either side is definitely true; XOR and XNOR need both sides. The
    /// result is memoized onto the value so later uses agree.
    pub fn not_missing(&mut self, v: ValueId) -> ValueId {
        if let Some(nm) = self.value(v).not_missing {
            return nm;
        }
        let (op, args) = {
            let val = self.value(v);
            (val.op, val.args.clone())
        };
        let nm = match op {
            Op::Init | Op::LitInt | Op::LitFloat | Op::LitStr | Op::LitTs
            | Op::LitRecord | Op::Undef => Self::INIT,
            Op::KFalse => Self::FALSE,
            Op::Not => self.not_missing(args[0]),
            Op::And => {
                let nma = self.not_missing(args[0]);
                let nmb = self.not_missing(args[1]);
                let both = self.and(nma, nmb);
                let fa = self.and_not(args[0], nma);
                let fb = self.and_not(args[1], nmb);
                let t = self.or(both, fa);
                self.or(t, fb)
            }
            Op::Or => {
                let nma = self.not_missing(args[0]);
                let nmb = self.not_missing(args[1]);
                let both = self.and(nma, nmb);
                let t = self.or(both, args[0]);
                self.or(t, args[1])
            }
            Op::Xor | Op::Xnor => {
                let nma = self.not_missing(args[0]);
                let nmb = self.not_missing(args[1]);
                self.and(nma, nmb)
            }
            _ => self.validity(v),
        };
        self.value_mut(v).not_missing = Some(nm);
        nm
    }

    /// Lanes where `v` is MISSING, within the lanes `ctx` selects.
    pub fn is_missing(&mut self, v: ValueId, ctx: ValueId) -> ValueId {
        let nm = self.not_missing(v);
        self.and_not(nm, ctx)
    }

    /// SQL NOT: true only where `v` is defined and false.
    ///
    /// The raw [`Program::not`] complements the whole mask, which would
    /// turn MISSING lanes true; the logical form intersects with the
    /// not-missing predicate.
    pub fn logical_not(&mut self, v: ValueId) -> ValueId {
        let nm = self.not_missing(v);
        let n = self.not(v);
        self.and(n, nm)
    }

    /// SQL XOR: defined only where both sides are.
    pub fn logical_xor(&mut self, a: ValueId, b: ValueId) -> ValueId {
        let x = self.xor(a, b);
        let nma = self.not_missing(a);
        let nmb = self.not_missing(b);
        let both = self.and(nma, nmb);
        self.and(x, both)
    }

    /// SQL equivalence (XNOR): defined only where both sides are.
    pub fn logical_xnor(&mut self, a: ValueId, b: ValueId) -> ValueId {
        let x = self.xnor(a, b);
        let nma = self.not_missing(a);
        let nmb = self.not_missing(b);
        let both = self.and(nma, nmb);
        self.and(x, both)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_pred(p: &mut Program, name: &str) -> ValueId {
        let v = p.dot(name, Program::INIT, Program::INIT);
        p.ssa(Op::IsNull, &[v, v], None)
    }

    #[test]
    fn connective_folds() {
        let mut p = Program::begin();
        let x = field_pred(&mut p, "x");
        assert_eq!(p.and(x, Program::FALSE), Program::FALSE);
        assert_eq!(p.and(x, Program::INIT), x);
        assert_eq!(p.or(x, Program::FALSE), x);
        assert_eq!(p.or(x, Program::INIT), Program::INIT);
        assert_eq!(p.xor(x, x), Program::FALSE);
        assert_eq!(p.xnor(x, x), Program::INIT);
        let nx = p.not(x);
        assert_eq!(p.not(nx), x);
        assert_eq!(p.xor(x, Program::INIT), nx);
    }

    #[test]
    fn not_missing_is_memoized() {
        let mut p = Program::begin();
        let x = field_pred(&mut p, "x");
        let y = field_pred(&mut p, "y");
        let both = p.and(x, y);
        let nm = p.not_missing(both);
        assert_eq!(p.not_missing(both), nm);
        assert_eq!(p.value(both).not_missing, Some(nm));
    }
}
