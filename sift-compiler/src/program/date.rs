//! Date and time builders.

use crate::program::Program;
use crate::ssa::{Imm, Op, ValueId};

/// Units accepted by [`Program::date_diff`] and [`Program::date_add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateUnit {
    /// Whole microseconds.
    Microsecond,
    /// Whole calendar months.
    Month,
    /// Whole calendar quarters.
    Quarter,
    /// Whole calendar years.
    Year,
}

/// Fields accepted by [`Program::extract`] and [`Program::date_trunc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    /// Calendar year.
    Year,
    /// Calendar quarter.
    Quarter,
    /// Calendar month.
    Month,
    /// Day of month.
    Day,
    /// Hour of day.
    Hour,
    /// Minute of hour.
    Minute,
    /// Second of minute.
    Second,
    /// Microsecond of second.
    Microsecond,
}

impl Program {
    /// Difference `b - a` in whole `unit`s.
    pub fn date_diff(&mut self, unit: DateUnit, a: ValueId, b: ValueId) -> ValueId {
        let op = match unit {
            DateUnit::Microsecond => Op::DateDiffUs,
            DateUnit::Month => Op::DateDiffMonth,
            DateUnit::Quarter => Op::DateDiffQuarter,
            DateUnit::Year => Op::DateDiffYear,
        };
        let a = self.to_time(a);
        let b = self.to_time(b);
        let va = self.validity(a);
        let vb = self.validity(b);
        let mask = self.and(va, vb);
        self.ssa(op, &[a, b, mask], None)
    }

    /// `v` advanced by `amount` `unit`s.
    ///
    /// Quarter and year additions lower to month additions by a constant
    /// factor, so the kernel only needs two addition shapes.
    pub fn date_add(&mut self, unit: DateUnit, v: ValueId, amount: ValueId) -> ValueId {
        let v = self.to_time(v);
        let (factor, reg_op, imm_op) = match unit {
            DateUnit::Microsecond => (1, Op::DateAddUs, Op::DateAddUsImm),
            DateUnit::Month => (1, Op::DateAddMonth, Op::DateAddMonthImm),
            DateUnit::Quarter => (3, Op::DateAddMonth, Op::DateAddMonthImm),
            DateUnit::Year => (12, Op::DateAddMonth, Op::DateAddMonthImm),
        };
        if let Some(Imm::Int(n)) = self.literal(amount) {
            let n = *n;
            let mask = self.validity(v);
            return self.ssa(imm_op, &[v, mask], Some(Imm::Int(n * factor)));
        }
        let mut amount = self.to_int(amount);
        if factor != 1 {
            let f = self.lit_int(factor);
            amount = self.mul(amount, f);
        }
        let vv = self.validity(v);
        let va = self.validity(amount);
        let mask = self.and(vv, va);
        self.ssa(reg_op, &[v, amount, mask], None)
    }

    /// Extract one calendar field as an integer.
    pub fn extract(&mut self, part: DatePart, v: ValueId) -> ValueId {
        let op = match part {
            DatePart::Year => Op::ExtractYear,
            DatePart::Quarter => {
                // quarter = (month + 2) / 3
                let month = self.extract(DatePart::Month, v);
                let two = self.lit_int(2);
                let shifted = self.add(month, two);
                let three = self.lit_int(3);
                return self.div(shifted, three);
            }
            DatePart::Month => Op::ExtractMonth,
            DatePart::Day => Op::ExtractDay,
            DatePart::Hour => Op::ExtractHour,
            DatePart::Minute => Op::ExtractMinute,
            DatePart::Second => Op::ExtractSecond,
            DatePart::Microsecond => Op::ExtractMicro,
        };
        let t = self.to_time(v);
        let mask = self.validity(t);
        self.ssa(op, &[t, mask], None)
    }

    /// Truncate to the start of a calendar field.
    pub fn date_trunc(&mut self, part: DatePart, v: ValueId) -> ValueId {
        let op = match part {
            DatePart::Year => Op::TruncYear,
            DatePart::Quarter => Op::TruncQuarter,
            DatePart::Month => Op::TruncMonth,
            DatePart::Day => Op::TruncDay,
            DatePart::Hour => Op::TruncHour,
            DatePart::Minute => Op::TruncMinute,
            DatePart::Second => Op::TruncSecond,
            DatePart::Microsecond => return self.to_time(v),
        };
        let t = self.to_time(v);
        let mask = self.validity(t);
        self.ssa(op, &[t, mask], None)
    }

    /// A timestamp as microseconds since the epoch.
    pub fn unix_micros(&mut self, v: ValueId) -> ValueId {
        let t = self.to_time(v);
        let mask = self.validity(t);
        self.ssa(Op::UnixMicros, &[t, mask], None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_additions_scale_into_months() {
        let mut p = Program::begin();
        let t = p.path("when");
        let n = p.lit_int(2);
        let v = p.date_add(DateUnit::Quarter, t, n);
        assert_eq!(p.value(v).op, Op::DateAddMonthImm);
        assert_eq!(p.value(v).imm, Some(Imm::Int(6)));
    }

    #[test]
    fn extract_quarter_derives_from_month() {
        let mut p = Program::begin();
        let t = p.path("when");
        let q = p.extract(DatePart::Quarter, t);
        // (month + 2) / 3 with both literals folded into immediates
        assert_eq!(p.value(q).op, Op::DivImmI);
    }
}
