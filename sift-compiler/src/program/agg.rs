//! Streaming aggregate builders.
//!
//! Aggregates thread a memory token: each takes the current token plus its
//! input and mask, and returns a fresh token, so the scheduler serializes
//! updates without explicit barriers. Each builder allocates the aggregate
//! buffer slot its kernel accumulates into and hands the offset back to the
//! caller for the reduction step.

use crate::program::hash::TreeSource;
use crate::program::Program;
use crate::radix::HashTree;
use crate::ssa::{Imm, Op, TypeSet, ValueId};

/// Bytes of one scalar aggregate state: the accumulator plus a seen marker.
const SCALAR_STATE: u32 = 16;

/// An aggregate update: the new memory token and the state's buffer offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggHandle {
    /// The memory token the update returns.
    pub mem: ValueId,
    /// Byte offset of the state in the aggregate buffer.
    pub offset: u32,
}

impl Program {
    fn agg(
        &mut self,
        int_op: Op,
        float_op: Op,
        mem: ValueId,
        v: ValueId,
        mask: ValueId,
    ) -> AggHandle {
        let offset = self.alloc_agg(SCALAR_STATE);
        let (op, v) = if self.scalar_kind(v) == TypeSet::INT {
            (int_op, v)
        } else {
            (float_op, self.to_float(v))
        };
        let valid = self.validity(v);
        let mask = self.and(mask, valid);
        let mem = self.ssa(op, &[mem, v, mask], Some(Imm::Agg(offset)));
        AggHandle { mem, offset }
    }

    /// Running sum.
    pub fn agg_sum(&mut self, mem: ValueId, v: ValueId, mask: ValueId) -> AggHandle {
        self.agg(Op::AggSumI, Op::AggSumF, mem, v, mask)
    }

    /// Running mean state (sum and count).
    pub fn agg_avg(&mut self, mem: ValueId, v: ValueId, mask: ValueId) -> AggHandle {
        self.agg(Op::AggAvgI, Op::AggAvgF, mem, v, mask)
    }

    /// Running minimum.
    pub fn agg_min(&mut self, mem: ValueId, v: ValueId, mask: ValueId) -> AggHandle {
        self.agg(Op::AggMinI, Op::AggMinF, mem, v, mask)
    }

    /// Running maximum.
    pub fn agg_max(&mut self, mem: ValueId, v: ValueId, mask: ValueId) -> AggHandle {
        self.agg(Op::AggMaxI, Op::AggMaxF, mem, v, mask)
    }

    fn agg_bits(&mut self, op: Op, mem: ValueId, v: ValueId, mask: ValueId) -> AggHandle {
        let offset = self.alloc_agg(SCALAR_STATE);
        let v = self.to_int(v);
        let valid = self.validity(v);
        let mask = self.and(mask, valid);
        let mem = self.ssa(op, &[mem, v, mask], Some(Imm::Agg(offset)));
        AggHandle { mem, offset }
    }

    /// Running bitwise AND.
    pub fn agg_and(&mut self, mem: ValueId, v: ValueId, mask: ValueId) -> AggHandle {
        self.agg_bits(Op::AggAndI, mem, v, mask)
    }

    /// Running bitwise OR.
    pub fn agg_or(&mut self, mem: ValueId, v: ValueId, mask: ValueId) -> AggHandle {
        self.agg_bits(Op::AggOrI, mem, v, mask)
    }

    /// Running bitwise XOR.
    pub fn agg_xor(&mut self, mem: ValueId, v: ValueId, mask: ValueId) -> AggHandle {
        self.agg_bits(Op::AggXorI, mem, v, mask)
    }

    /// Count of selected lanes.
    pub fn agg_count(&mut self, mem: ValueId, mask: ValueId) -> AggHandle {
        let offset = self.alloc_agg(8);
        let mem = self.ssa(Op::AggCount, &[mem, mask], Some(Imm::Agg(offset)));
        AggHandle { mem, offset }
    }

    fn agg_ts(&mut self, op: Op, mem: ValueId, v: ValueId, mask: ValueId) -> AggHandle {
        let offset = self.alloc_agg(SCALAR_STATE);
        let t = self.to_time(v);
        let valid = self.validity(t);
        let mask = self.and(mask, valid);
        let mem = self.ssa(op, &[mem, t, mask], Some(Imm::Agg(offset)));
        AggHandle { mem, offset }
    }

    /// Earliest timestamp.
    pub fn agg_earliest(&mut self, mem: ValueId, v: ValueId, mask: ValueId) -> AggHandle {
        self.agg_ts(Op::AggMinTs, mem, v, mask)
    }

    /// Latest timestamp.
    pub fn agg_latest(&mut self, mem: ValueId, v: ValueId, mask: ValueId) -> AggHandle {
        self.agg_ts(Op::AggMaxTs, mem, v, mask)
    }

    /// Approximate distinct count over a hash input, HyperLogLog-backed.
    pub fn agg_approx_count_distinct(
        &mut self,
        mem: ValueId,
        h: ValueId,
        mask: ValueId,
        precision: u8,
    ) -> AggHandle {
        let offset = self.alloc_agg(1 << precision);
        let vh = self.validity(h);
        let mask = self.and(mask, vh);
        let mem = self.ssa(
            Op::AggApproxCount,
            &[mem, h, mask],
            Some(Imm::AggPrec(offset, precision)),
        );
        AggHandle { mem, offset }
    }

    /// The shared per-group displacement all aggregates of one GROUP BY use.
    pub fn agg_bucket(&mut self, h: ValueId, mask: ValueId) -> ValueId {
        let handle = self.add_tree(HashTree::new(), TreeSource::Buckets);
        let vh = self.validity(h);
        let mask = self.and(mask, vh);
        self.ssa(Op::AggBucket, &[h, mask], Some(Imm::Tree(handle)))
    }

    fn agg_slot(
        &mut self,
        int_op: Op,
        float_op: Op,
        mem: ValueId,
        bucket: ValueId,
        v: ValueId,
        mask: ValueId,
    ) -> AggHandle {
        let offset = self.alloc_agg(SCALAR_STATE);
        let (op, v) = if self.scalar_kind(v) == TypeSet::INT {
            (int_op, v)
        } else {
            (float_op, self.to_float(v))
        };
        let valid = self.validity(v);
        let mask = self.and(mask, valid);
        let mem = self.ssa(op, &[mem, bucket, v, mask], Some(Imm::Agg(offset)));
        AggHandle { mem, offset }
    }

    /// Grouped running sum.
    pub fn agg_slot_sum(
        &mut self,
        mem: ValueId,
        bucket: ValueId,
        v: ValueId,
        mask: ValueId,
    ) -> AggHandle {
        self.agg_slot(Op::AggSlotSumI, Op::AggSlotSumF, mem, bucket, v, mask)
    }

    /// Grouped running mean state.
    pub fn agg_slot_avg(
        &mut self,
        mem: ValueId,
        bucket: ValueId,
        v: ValueId,
        mask: ValueId,
    ) -> AggHandle {
        self.agg_slot(Op::AggSlotAvgI, Op::AggSlotAvgF, mem, bucket, v, mask)
    }

    /// Grouped running minimum.
    pub fn agg_slot_min(
        &mut self,
        mem: ValueId,
        bucket: ValueId,
        v: ValueId,
        mask: ValueId,
    ) -> AggHandle {
        self.agg_slot(Op::AggSlotMinI, Op::AggSlotMinF, mem, bucket, v, mask)
    }

    /// Grouped running maximum.
    pub fn agg_slot_max(
        &mut self,
        mem: ValueId,
        bucket: ValueId,
        v: ValueId,
        mask: ValueId,
    ) -> AggHandle {
        self.agg_slot(Op::AggSlotMaxI, Op::AggSlotMaxF, mem, bucket, v, mask)
    }

    /// Grouped count of selected lanes.
    pub fn agg_slot_count(
        &mut self,
        mem: ValueId,
        bucket: ValueId,
        mask: ValueId,
    ) -> AggHandle {
        let offset = self.alloc_agg(8);
        let mem = self.ssa(Op::AggSlotCount, &[mem, bucket, mask], Some(Imm::Agg(offset)));
        AggHandle { mem, offset }
    }

    /// Grouped approximate distinct count.
    pub fn agg_slot_approx_count_distinct(
        &mut self,
        mem: ValueId,
        bucket: ValueId,
        h: ValueId,
        mask: ValueId,
        precision: u8,
    ) -> AggHandle {
        let offset = self.alloc_agg(1 << precision);
        let vh = self.validity(h);
        let mask = self.and(mask, vh);
        let mem = self.ssa(
            Op::AggSlotApproxCount,
            &[mem, bucket, h, mask],
            Some(Imm::AggPrec(offset, precision)),
        );
        AggHandle { mem, offset }
    }

    /// Join several memory tokens into one.
    pub fn merge_mem(&mut self, tokens: &[ValueId]) -> ValueId {
        match tokens {
            [] => Self::INIT_MEM,
            [one] => *one,
            many => self.ssa(Op::MergeMem, many, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregates_thread_the_memory_token() {
        let mut p = Program::begin();
        let f = p.path("x");
        let v = p.to_float(f);
        let s = p.agg_sum(Program::INIT_MEM, v, Program::INIT);
        let c = p.agg_count(s.mem, Program::INIT);
        assert_ne!(s.mem, c.mem);
        assert_eq!(p.value(c.mem).args[0], s.mem);
        // distinct states get distinct buffer offsets, 8-byte aligned
        assert_ne!(s.offset, c.offset);
        assert_eq!(p.agg_size() % 8, 0);
    }

    #[test]
    fn grouped_aggregates_share_one_bucket() {
        let mut p = Program::begin();
        let f = p.path("k");
        let h = p.hash_value(f);
        let b1 = p.agg_bucket(h, Program::INIT);
        let b2 = p.agg_bucket(h, Program::INIT);
        // value numbering cannot merge them: each owns a runtime tree
        assert_ne!(b1, b2);
        let x = p.path("v");
        let xv = p.to_float(x);
        let s = p.agg_slot_sum(Program::INIT_MEM, b1, xv, Program::INIT);
        let c = p.agg_slot_count(s.mem, b1, Program::INIT);
        assert_eq!(p.value(c.mem).args[1], b1);
    }
}
