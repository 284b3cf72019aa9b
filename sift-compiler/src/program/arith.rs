//! Numeric coercions, arithmetic, and comparisons.

use crate::program::Program;
use crate::ssa::{Imm, Op, TypeSet, ValueId};

/// Binary numeric operators exposed by the builder surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
    /// Modulo.
    Mod,
    /// Minimum.
    Min,
    /// Maximum.
    Max,
}

impl NumOp {
    const fn is_commutative(self) -> bool {
        matches!(self, NumOp::Add | NumOp::Mul | NumOp::Min | NumOp::Max)
    }
}

/// Comparison operators exposed by the builder surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// Equality.
    Eq,
    /// Inequality.
    Ne,
    /// Less-than.
    Lt,
    /// Less-or-equal.
    Le,
    /// Greater-than.
    Gt,
    /// Greater-or-equal.
    Ge,
}

impl CmpOp {
    /// The comparison with swapped operands.
    pub const fn swapped(self) -> CmpOp {
        match self {
            CmpOp::Lt => CmpOp::Gt,
            CmpOp::Gt => CmpOp::Lt,
            CmpOp::Le => CmpOp::Ge,
            CmpOp::Ge => CmpOp::Le,
            other => other,
        }
    }
}

impl Program {
    /// The single scalar kind of `v`, `VALUE` when it is still boxed, or
    /// `ANY` for `undef`.
    pub(crate) fn scalar_kind(&self, v: ValueId) -> TypeSet {
        let rt = self.value(v).ret_type();
        if rt == TypeSet::ANY {
            return TypeSet::ANY;
        }
        let s = rt & TypeSet::SCALAR;
        if s.is_single() {
            return s;
        }
        if rt.contains(TypeSet::VALUE) {
            return TypeSet::VALUE;
        }
        s
    }

    /// Coerce `v` to integer lanes. Boxed values narrow to integer lanes;
    /// floats round; literals fold.
    pub fn to_int(&mut self, v: ValueId) -> ValueId {
        if let Some(Imm::Float(f)) = self.literal(v) {
            let f = *f;
            return self.lit_int(f.round() as i64);
        }
        match self.scalar_kind(v) {
            TypeSet::INT | TypeSet::ANY => v,
            TypeSet::FLOAT => {
                let mask = self.validity(v);
                self.ssa(Op::CvtF2I, &[v, mask], None)
            }
            TypeSet::VALUE => {
                let mask = self.validity(v);
                self.ssa(Op::ToInt, &[v, mask], None)
            }
            other => self.invalid_value(Op::ToInt, format!("cannot coerce {other} to int")),
        }
    }

    /// Coerce `v` to float lanes. Boxed values narrow to numeric lanes,
    /// widening integers; literals fold.
    pub fn to_float(&mut self, v: ValueId) -> ValueId {
        if let Some(Imm::Int(i)) = self.literal(v) {
            let i = *i;
            return self.lit_float(i as f64);
        }
        match self.scalar_kind(v) {
            TypeSet::FLOAT | TypeSet::ANY => v,
            TypeSet::INT => {
                let mask = self.validity(v);
                self.ssa(Op::CvtI2F, &[v, mask], None)
            }
            TypeSet::VALUE => {
                let mask = self.validity(v);
                self.ssa(Op::ToFloat, &[v, mask], None)
            }
            other => self.invalid_value(Op::ToFloat, format!("cannot coerce {other} to float")),
        }
    }

    /// Coerce `v` to string lanes.
    pub fn to_str(&mut self, v: ValueId) -> ValueId {
        match self.scalar_kind(v) {
            TypeSet::STRING | TypeSet::ANY => v,
            TypeSet::VALUE => {
                let mask = self.validity(v);
                self.ssa(Op::ToStr, &[v, mask], None)
            }
            other => self.invalid_value(Op::ToStr, format!("cannot coerce {other} to string")),
        }
    }

    /// Coerce `v` to timestamp lanes.
    pub fn to_time(&mut self, v: ValueId) -> ValueId {
        if let Some(Imm::Int(i)) = self.literal(v) {
            let i = *i;
            return self.lit_ts(i);
        }
        match self.scalar_kind(v) {
            TypeSet::TIME | TypeSet::ANY => v,
            TypeSet::VALUE => {
                let mask = self.validity(v);
                self.ssa(Op::ToTime, &[v, mask], None)
            }
            TypeSet::INT => {
                let mask = self.validity(v);
                self.ssa(Op::TsFromMicros, &[v, mask], None)
            }
            other => self.invalid_value(Op::ToTime, format!("cannot coerce {other} to time")),
        }
    }

    fn lit_num(&self, v: ValueId) -> Option<Imm> {
        match self.literal(v) {
            Some(Imm::Int(i)) => Some(Imm::Int(*i)),
            Some(Imm::Float(f)) => Some(Imm::Float(*f)),
            _ => None,
        }
    }

    /// Whether both sides stay in the integer domain.
    fn int_context(&self, a: ValueId, b: ValueId) -> bool {
        self.scalar_kind(a) == TypeSet::INT && self.scalar_kind(b) == TypeSet::INT
    }

    /// Addition.
    pub fn add(&mut self, a: ValueId, b: ValueId) -> ValueId {
        self.numeric(NumOp::Add, a, b)
    }

    /// Subtraction.
    pub fn sub(&mut self, a: ValueId, b: ValueId) -> ValueId {
        self.numeric(NumOp::Sub, a, b)
    }

    /// Multiplication.
    pub fn mul(&mut self, a: ValueId, b: ValueId) -> ValueId {
        self.numeric(NumOp::Mul, a, b)
    }

    /// Division.
    pub fn div(&mut self, a: ValueId, b: ValueId) -> ValueId {
        self.numeric(NumOp::Div, a, b)
    }

    /// Modulo.
    pub fn modulo(&mut self, a: ValueId, b: ValueId) -> ValueId {
        self.numeric(NumOp::Mod, a, b)
    }

    /// Minimum.
    pub fn min(&mut self, a: ValueId, b: ValueId) -> ValueId {
        self.numeric(NumOp::Min, a, b)
    }

    /// Maximum.
    pub fn max(&mut self, a: ValueId, b: ValueId) -> ValueId {
        self.numeric(NumOp::Max, a, b)
    }

    /// Binary arithmetic with coercion, literal folding, and immediate
    /// selection.
    ///
    /// The domain is integral only when both sides are statically integers;
    /// a boxed operand otherwise coerces through the float path, which also
    /// accepts integer lanes.
    pub fn numeric(&mut self, op: NumOp, a: ValueId, b: ValueId) -> ValueId {
        if let (Some(x), Some(y)) = (self.lit_num(a), self.lit_num(b)) {
            if let Some(folded) = fold_numeric(op, &x, &y) {
                return match folded {
                    Imm::Int(i) => self.lit_int(i),
                    Imm::Float(f) => self.lit_float(f),
                    _ => unreachable!(),
                };
            }
        }
        let int_ctx = self.int_context(a, b);
        let (a, b) = if int_ctx {
            (a, b)
        } else {
            let af = self.to_float(a);
            let bf = self.to_float(b);
            (af, bf)
        };
        // literals fold into the immediate form; a left literal either
        // swaps (commutative) or selects the reversed-immediate opcode.
        // min/max have no immediate form and broadcast their literal
        let (reg_op, imm_op, rimm_op) = numeric_ops(op, int_ctx);
        if !matches!(op, NumOp::Min | NumOp::Max) {
            if let Some(imm) = self.lit_num(b) {
                let mask = self.validity(a);
                return self.ssa(imm_op, &[a, mask], Some(imm));
            }
            if let Some(imm) = self.lit_num(a) {
                let mask = self.validity(b);
                if op.is_commutative() {
                    return self.ssa(imm_op, &[b, mask], Some(imm));
                }
                return self.ssa(rimm_op, &[b, mask], Some(imm));
            }
        }
        let va = self.validity(a);
        let vb = self.validity(b);
        let mask = self.and(va, vb);
        self.ssa(reg_op, &[a, b, mask], None)
    }

    /// Negation.
    pub fn neg(&mut self, v: ValueId) -> ValueId {
        self.numeric_unary(Op::NegI, Op::NegF, v)
    }

    /// Absolute value.
    pub fn abs(&mut self, v: ValueId) -> ValueId {
        self.numeric_unary(Op::AbsI, Op::AbsF, v)
    }

    /// Sign.
    pub fn sign(&mut self, v: ValueId) -> ValueId {
        self.numeric_unary(Op::SignI, Op::SignF, v)
    }

    fn numeric_unary(&mut self, int_op: Op, float_op: Op, v: ValueId) -> ValueId {
        if self.scalar_kind(v) == TypeSet::INT {
            let mask = self.validity(v);
            return self.ssa(int_op, &[v, mask], None);
        }
        let f = self.to_float(v);
        let mask = self.validity(f);
        self.ssa(float_op, &[f, mask], None)
    }

    /// A float math function over one coerced operand.
    pub fn float_unary(&mut self, op: Op, v: ValueId) -> ValueId {
        let f = self.to_float(v);
        let mask = self.validity(f);
        self.ssa(op, &[f, mask], None)
    }

    /// A float math function over two coerced operands.
    pub fn float_binary(&mut self, op: Op, a: ValueId, b: ValueId) -> ValueId {
        let a = self.to_float(a);
        let b = self.to_float(b);
        let va = self.validity(a);
        let vb = self.validity(b);
        let mask = self.and(va, vb);
        self.ssa(op, &[a, b, mask], None)
    }

    /// Histogram bucket of `v` within `[lo, hi)` split into `count` buckets.
    pub fn width_bucket(&mut self, v: ValueId, lo: ValueId, hi: ValueId, count: ValueId) -> ValueId {
        let int_ctx = self.int_context(v, lo) && self.int_context(hi, count);
        let (op, v, lo, hi, count) = if int_ctx {
            (Op::WidthBucketI, v, lo, hi, count)
        } else {
            let v = self.to_float(v);
            let lo = self.to_float(lo);
            let hi = self.to_float(hi);
            let count = self.to_float(count);
            (Op::WidthBucketF, v, lo, hi, count)
        };
        let mut mask = self.validity(v);
        for operand in [lo, hi, count] {
            let m = self.validity(operand);
            mask = self.and(mask, m);
        }
        self.ssa(op, &[v, lo, hi, count, mask], None)
    }

    /// Comparison with coercion and immediate selection. `Ne` lowers to the
    /// complement of `Eq` within the compared lanes, keeping MISSING lanes
    /// out of the result.
    pub fn compare(&mut self, op: CmpOp, a: ValueId, b: ValueId) -> ValueId {
        if op == CmpOp::Ne {
            let eq = self.compare(CmpOp::Eq, a, b);
            let valid = self.value(eq).mask_arg().unwrap_or(Self::INIT);
            return self.and_not(eq, valid);
        }
        // literals move to the right-hand side; ordered comparisons swap
        // to their mirrored form
        if self.literal(a).is_some() && self.literal(b).is_none() {
            return self.compare(op.swapped(), b, a);
        }
        // predicate equality is equivalence; predicates have no order
        if self.value(a).ret_type() == TypeSet::BOOL
            && self.value(b).ret_type() == TypeSet::BOOL
        {
            return match op {
                CmpOp::Eq => self.logical_xnor(a, b),
                _ => self.invalid_value(
                    Op::CmpEqI,
                    "booleans only compare for equality".to_owned(),
                ),
            };
        }
        let ka = self.scalar_kind(a);
        let kb = self.scalar_kind(b);
        if ka == TypeSet::STRING || kb == TypeSet::STRING {
            return self.compare_str(op, a, b, false);
        }
        if ka == TypeSet::TIME || kb == TypeSet::TIME {
            return self.compare_ts(op, a, b);
        }
        if op == CmpOp::Eq
            && ka == TypeSet::VALUE
            && kb == TypeSet::VALUE
        {
            let va = self.validity(a);
            let vb = self.validity(b);
            let mask = self.and(va, vb);
            return self.ssa(Op::CmpEqV, &[a, b, mask], None);
        }
        self.compare_numeric(op, a, b)
    }

    fn compare_numeric(&mut self, op: CmpOp, a: ValueId, b: ValueId) -> ValueId {
        let int_ctx = self.int_context(a, b)
            || (self.scalar_kind(a) == TypeSet::INT && matches!(self.literal(b), Some(Imm::Int(_))))
            || (self.scalar_kind(b) == TypeSet::INT && matches!(self.literal(a), Some(Imm::Int(_))));
        let (a, b) = if int_ctx {
            (a, b)
        } else {
            let af = self.to_float(a);
            let bf = self.to_float(b);
            (af, bf)
        };
        if let Some(imm) = self.lit_num(b) {
            let imm_op = cmp_imm_op(op, int_ctx);
            let mask = self.validity(a);
            return self.ssa(imm_op, &[a, mask], Some(imm));
        }
        let reg_op = cmp_reg_op(op, int_ctx);
        let va = self.validity(a);
        let vb = self.validity(b);
        let mask = self.and(va, vb);
        self.ssa(reg_op, &[a, b, mask], None)
    }

    pub(crate) fn compare_str(
        &mut self,
        op: CmpOp,
        a: ValueId,
        b: ValueId,
        case_insensitive: bool,
    ) -> ValueId {
        let a = self.to_str(a);
        if op == CmpOp::Eq {
            if let Some(Imm::Str(s)) = self.literal(b).cloned() {
                let imm_op = if case_insensitive {
                    Op::CmpEqImmStrCi
                } else {
                    Op::CmpEqImmStr
                };
                let mask = self.validity(a);
                return self.ssa(imm_op, &[a, mask], Some(Imm::Str(s)));
            }
        }
        let b = self.to_str(b);
        let reg_op = match (op, case_insensitive) {
            (CmpOp::Eq, false) => Op::CmpEqStr,
            (CmpOp::Eq, true) => Op::CmpEqStrCi,
            (CmpOp::Lt, _) => Op::CmpLtStr,
            (CmpOp::Le, _) => Op::CmpLeStr,
            (CmpOp::Gt, _) => Op::CmpGtStr,
            (CmpOp::Ge, _) => Op::CmpGeStr,
            (CmpOp::Ne, _) => unreachable!("ne lowered by compare"),
        };
        let va = self.validity(a);
        let vb = self.validity(b);
        let mask = self.and(va, vb);
        self.ssa(reg_op, &[a, b, mask], None)
    }

    fn compare_ts(&mut self, op: CmpOp, a: ValueId, b: ValueId) -> ValueId {
        let a = self.to_time(a);
        if let Some(Imm::Ts(t)) = self.literal(b).map(|i| match i {
            Imm::Ts(t) => Imm::Ts(*t),
            Imm::Int(i) => Imm::Ts(*i),
            other => other.clone(),
        }) {
            let imm_op = match op {
                CmpOp::Eq => Op::CmpEqImmTs,
                CmpOp::Lt => Op::CmpLtImmTs,
                CmpOp::Le => Op::CmpLeImmTs,
                CmpOp::Gt => Op::CmpGtImmTs,
                CmpOp::Ge => Op::CmpGeImmTs,
                CmpOp::Ne => unreachable!("ne lowered by compare"),
            };
            let mask = self.validity(a);
            return self.ssa(imm_op, &[a, mask], Some(Imm::Ts(t)));
        }
        let b = self.to_time(b);
        let reg_op = match op {
            CmpOp::Eq => Op::CmpEqTs,
            CmpOp::Lt => Op::CmpLtTs,
            CmpOp::Le => Op::CmpLeTs,
            CmpOp::Gt => Op::CmpGtTs,
            CmpOp::Ge => Op::CmpGeTs,
            CmpOp::Ne => unreachable!("ne lowered by compare"),
        };
        let va = self.validity(a);
        let vb = self.validity(b);
        let mask = self.and(va, vb);
        self.ssa(reg_op, &[a, b, mask], None)
    }

    /// Equality, the most common comparison.
    pub fn equals(&mut self, a: ValueId, b: ValueId) -> ValueId {
        self.compare(CmpOp::Eq, a, b)
    }

    /// Geohash of `(lat, lon)` at `precision` characters.
    pub fn geo_hash(&mut self, lat: ValueId, lon: ValueId, precision: ValueId) -> ValueId {
        let lat = self.to_float(lat);
        let lon = self.to_float(lon);
        let precision = self.to_int(precision);
        let mut mask = self.validity(lat);
        for operand in [lon, precision] {
            let m = self.validity(operand);
            mask = self.and(mask, m);
        }
        self.ssa(Op::GeoHash, &[lat, lon, precision, mask], None)
    }

    /// Web-mercator tile X of a longitude at `zoom`.
    pub fn geo_tile_x(&mut self, lon: ValueId, zoom: ValueId) -> ValueId {
        let lon = self.to_float(lon);
        let zoom = self.to_int(zoom);
        let vl = self.validity(lon);
        let vz = self.validity(zoom);
        let mask = self.and(vl, vz);
        self.ssa(Op::GeoTileX, &[lon, zoom, mask], None)
    }

    /// Web-mercator tile Y of a latitude at `zoom`.
    pub fn geo_tile_y(&mut self, lat: ValueId, zoom: ValueId) -> ValueId {
        let lat = self.to_float(lat);
        let zoom = self.to_int(zoom);
        let vl = self.validity(lat);
        let vz = self.validity(zoom);
        let mask = self.and(vl, vz);
        self.ssa(Op::GeoTileY, &[lat, zoom, mask], None)
    }

    /// Great-circle distance between two coordinates, in meters.
    pub fn geo_distance(
        &mut self,
        lat1: ValueId,
        lon1: ValueId,
        lat2: ValueId,
        lon2: ValueId,
    ) -> ValueId {
        let lat1 = self.to_float(lat1);
        let lon1 = self.to_float(lon1);
        let lat2 = self.to_float(lat2);
        let lon2 = self.to_float(lon2);
        let mut mask = self.validity(lat1);
        for operand in [lon1, lat2, lon2] {
            let m = self.validity(operand);
            mask = self.and(mask, m);
        }
        self.ssa(Op::GeoDistance, &[lat1, lon1, lat2, lon2, mask], None)
    }
}

fn numeric_ops(op: NumOp, int_ctx: bool) -> (Op, Op, Op) {
    if int_ctx {
        match op {
            NumOp::Add => (Op::AddI, Op::AddImmI, Op::AddImmI),
            NumOp::Sub => (Op::SubI, Op::SubImmI, Op::RSubImmI),
            NumOp::Mul => (Op::MulI, Op::MulImmI, Op::MulImmI),
            NumOp::Div => (Op::DivI, Op::DivImmI, Op::RDivImmI),
            NumOp::Mod => (Op::ModI, Op::ModImmI, Op::RModImmI),
            NumOp::Min => (Op::MinI, Op::MinI, Op::MinI),
            NumOp::Max => (Op::MaxI, Op::MaxI, Op::MaxI),
        }
    } else {
        match op {
            NumOp::Add => (Op::AddF, Op::AddImmF, Op::AddImmF),
            NumOp::Sub => (Op::SubF, Op::SubImmF, Op::RSubImmF),
            NumOp::Mul => (Op::MulF, Op::MulImmF, Op::MulImmF),
            NumOp::Div => (Op::DivF, Op::DivImmF, Op::RDivImmF),
            NumOp::Mod => (Op::ModF, Op::ModImmF, Op::RModImmF),
            NumOp::Min => (Op::MinF, Op::MinF, Op::MinF),
            NumOp::Max => (Op::MaxF, Op::MaxF, Op::MaxF),
        }
    }
}

fn cmp_reg_op(op: CmpOp, int_ctx: bool) -> Op {
    match (op, int_ctx) {
        (CmpOp::Eq, true) => Op::CmpEqI,
        (CmpOp::Lt, true) => Op::CmpLtI,
        (CmpOp::Le, true) => Op::CmpLeI,
        (CmpOp::Gt, true) => Op::CmpGtI,
        (CmpOp::Ge, true) => Op::CmpGeI,
        (CmpOp::Eq, false) => Op::CmpEqF,
        (CmpOp::Lt, false) => Op::CmpLtF,
        (CmpOp::Le, false) => Op::CmpLeF,
        (CmpOp::Gt, false) => Op::CmpGtF,
        (CmpOp::Ge, false) => Op::CmpGeF,
        (CmpOp::Ne, _) => unreachable!("ne lowered by compare"),
    }
}

fn cmp_imm_op(op: CmpOp, int_ctx: bool) -> Op {
    match (op, int_ctx) {
        (CmpOp::Eq, true) => Op::CmpEqImmI,
        (CmpOp::Lt, true) => Op::CmpLtImmI,
        (CmpOp::Le, true) => Op::CmpLeImmI,
        (CmpOp::Gt, true) => Op::CmpGtImmI,
        (CmpOp::Ge, true) => Op::CmpGeImmI,
        (CmpOp::Eq, false) => Op::CmpEqImmF,
        (CmpOp::Lt, false) => Op::CmpLtImmF,
        (CmpOp::Le, false) => Op::CmpLeImmF,
        (CmpOp::Gt, false) => Op::CmpGtImmF,
        (CmpOp::Ge, false) => Op::CmpGeImmF,
        (CmpOp::Ne, _) => unreachable!("ne lowered by compare"),
    }
}

fn fold_numeric(op: NumOp, a: &Imm, b: &Imm) -> Option<Imm> {
    match (a, b) {
        (Imm::Int(x), Imm::Int(y)) => {
            let v = match op {
                NumOp::Add => x.wrapping_add(*y),
                NumOp::Sub => x.wrapping_sub(*y),
                NumOp::Mul => x.wrapping_mul(*y),
                NumOp::Div => return (*y != 0).then(|| Imm::Int(x.wrapping_div(*y))),
                NumOp::Mod => return (*y != 0).then(|| Imm::Int(x.wrapping_rem(*y))),
                NumOp::Min => *x.min(y),
                NumOp::Max => *x.max(y),
            };
            Some(Imm::Int(v))
        }
        _ => {
            let x = to_f64(a)?;
            let y = to_f64(b)?;
            let v = match op {
                NumOp::Add => x + y,
                NumOp::Sub => x - y,
                NumOp::Mul => x * y,
                NumOp::Div => x / y,
                NumOp::Mod => x % y,
                NumOp::Min => x.min(y),
                NumOp::Max => x.max(y),
            };
            Some(Imm::Float(v))
        }
    }
}

fn to_f64(imm: &Imm) -> Option<f64> {
    match imm {
        Imm::Int(i) => Some(*i as f64),
        Imm::Float(f) => Some(*f),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_pairs_fold() {
        let mut p = Program::begin();
        let a = p.lit_int(6);
        let b = p.lit_int(7);
        let r = p.mul(a, b);
        assert_eq!(p.literal(r), Some(&Imm::Int(42)));
        let c = p.lit_float(1.5);
        let r = p.add(b, c);
        assert_eq!(p.literal(r), Some(&Imm::Float(8.5)));
    }

    #[test]
    fn literal_operands_take_the_immediate_form() {
        let mut p = Program::begin();
        let f = p.path("x");
        let x = p.to_float(f);
        let one = p.lit_int(1);
        let r = p.add(x, one);
        assert_eq!(p.value(r).op, Op::AddImmF);
        // a left-side literal on a non-commutative op takes the reversed form
        let r = p.sub(one, x);
        assert_eq!(p.value(r).op, Op::RSubImmF);
        // commutative ops just swap
        let r = p.mul(one, x);
        assert_eq!(p.value(r).op, Op::MulImmF);
    }

    #[test]
    fn comparisons_canonicalize_literals_right() {
        let mut p = Program::begin();
        let f = p.path("x");
        let x = p.to_float(f);
        let lim = p.lit_float(3.0);
        let a = p.compare(CmpOp::Lt, lim, x);
        // 3.0 < x becomes x > 3.0
        assert_eq!(p.value(a).op, Op::CmpGtImmF);
        let b = p.compare(CmpOp::Gt, x, lim);
        assert_eq!(a, b);
    }

    #[test]
    fn string_equality_against_literal_uses_the_dictionary() {
        let mut p = Program::begin();
        let f = p.path("name");
        let lit = p.lit_str("PA");
        let eq = p.equals(f, lit);
        assert_eq!(p.value(eq).op, Op::CmpEqImmStr);
        assert_eq!(p.value(eq).imm, Some(Imm::Str("PA".into())));
    }

    #[test]
    fn ne_excludes_missing_lanes() {
        let mut p = Program::begin();
        let f = p.path("x");
        let lit = p.lit_int(3);
        let ne = p.compare(CmpOp::Ne, f, lit);
        assert_eq!(p.value(ne).op, Op::AndNot);
    }
}
