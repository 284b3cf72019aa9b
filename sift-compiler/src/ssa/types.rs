//! The SSA type lattice and virtual register classes.

use core::fmt;

bitflags::bitflags! {
    /// Bitset of SSA value types.
    ///
    /// Argument types are duck-typed: an op accepts any of the advertised
    /// bits, and the single bit actually consumed must be unambiguously
    /// implied by the producer's return set.
    pub struct TypeSet: u16 {
        /// Lane predicate (the K register).
        const BOOL = 1 << 0;
        /// Interior-of-record base pointer.
        const BASE = 1 << 1;
        /// Opaque boxed record value.
        const VALUE = 1 << 2;
        /// 64-bit float lanes.
        const FLOAT = 1 << 3;
        /// 64-bit integer lanes.
        const INT = 1 << 4;
        /// String lanes.
        const STRING = 1 << 5;
        /// List lanes.
        const LIST = 1 << 6;
        /// Timestamp lanes, microseconds since the epoch.
        const TIME = 1 << 7;
        /// 128-bit hash lanes.
        const HASH = 1 << 8;
        /// Hash-aggregate bucket displacements.
        const BUCKET = 1 << 9;
        /// Memory-ordering token.
        const MEM = 1 << 10;

        /// Any unboxed scalar.
        const SCALAR = Self::FLOAT.bits | Self::INT.bits | Self::STRING.bits
            | Self::LIST.bits | Self::TIME.bits;
        /// Either numeric lane type.
        const NUMERIC = Self::FLOAT.bits | Self::INT.bits;
        /// A boxed value together with its presence mask.
        const VALUE_MASKED = Self::VALUE.bits | Self::BOOL.bits;
        /// A base pointer together with its validity mask.
        const BASE_MASKED = Self::BASE.bits | Self::BOOL.bits;
        /// Integer lanes together with a validity mask.
        const INT_MASKED = Self::INT.bits | Self::BOOL.bits;
        /// Float lanes together with a validity mask.
        const FLOAT_MASKED = Self::FLOAT.bits | Self::BOOL.bits;
        /// String lanes together with a validity mask.
        const STRING_MASKED = Self::STRING.bits | Self::BOOL.bits;
        /// List lanes together with a validity mask.
        const LIST_MASKED = Self::LIST.bits | Self::BOOL.bits;
        /// Timestamp lanes together with a validity mask.
        const TIME_MASKED = Self::TIME.bits | Self::BOOL.bits;
        /// The composite `split` returns: head value, tail list, and mask.
        const SPLIT_RET = Self::LIST.bits | Self::VALUE.bits | Self::BOOL.bits;
        /// Every type bit; the return set of `undef` and `invalid`.
        const ANY = Self::BOOL.bits | Self::BASE.bits | Self::VALUE.bits
            | Self::SCALAR.bits | Self::HASH.bits | Self::BUCKET.bits | Self::MEM.bits;
    }
}

impl TypeSet {
    /// Whether exactly one type bit is set.
    pub const fn is_single(self) -> bool {
        self.bits().count_ones() == 1
    }

    /// The virtual register class a single-bit type occupies, if any.
    ///
    /// `MEM` tokens order side effects but occupy no register.
    pub fn reg_class(self) -> Option<RegClass> {
        match self {
            TypeSet::BOOL => Some(RegClass::K),
            TypeSet::BASE => Some(RegClass::B),
            TypeSet::VALUE => Some(RegClass::V),
            TypeSet::HASH => Some(RegClass::H),
            TypeSet::BUCKET => Some(RegClass::L),
            t if TypeSet::SCALAR.contains(t) && t.is_single() => Some(RegClass::S),
            _ => None,
        }
    }

    /// Iterate the register classes a return set defines, mask last.
    pub fn reg_classes(self) -> impl Iterator<Item = RegClass> {
        RegClass::ALL
            .into_iter()
            .rev()
            .filter(move |c| self.intersects(c.types()))
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (TypeSet::BOOL, "bool"),
            (TypeSet::BASE, "base"),
            (TypeSet::VALUE, "value"),
            (TypeSet::FLOAT, "float"),
            (TypeSet::INT, "int"),
            (TypeSet::STRING, "string"),
            (TypeSet::LIST, "list"),
            (TypeSet::TIME, "time"),
            (TypeSet::HASH, "hash"),
            (TypeSet::BUCKET, "bucket"),
            (TypeSet::MEM, "mem"),
        ];
        let mut first = true;
        for (bit, name) in names {
            if self.contains(bit) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        if first {
            f.write_str("none")?;
        }
        Ok(())
    }
}

// every type bit is accounted for in ANY, and nothing beyond
static_assertions::const_assert_eq!(TypeSet::ANY.bits(), (1 << 11) - 1);

/// The six virtual register classes of the VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumCount)]
pub enum RegClass {
    /// The lane mask.
    K,
    /// Unboxed scalar lanes.
    S,
    /// Boxed value lanes.
    V,
    /// Record base pointers.
    B,
    /// Wide hashes.
    H,
    /// Aggregate bucket displacements.
    L,
}

impl RegClass {
    /// All classes, in spill-stack layout order.
    pub const ALL: [RegClass; 6] = [
        RegClass::K,
        RegClass::S,
        RegClass::V,
        RegClass::B,
        RegClass::H,
        RegClass::L,
    ];

    /// Dense index for per-class arrays.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The type bits that live in this class.
    pub const fn types(self) -> TypeSet {
        match self {
            RegClass::K => TypeSet::BOOL,
            RegClass::S => TypeSet::SCALAR,
            RegClass::V => TypeSet::VALUE,
            RegClass::B => TypeSet::BASE,
            RegClass::H => TypeSet::HASH,
            RegClass::L => TypeSet::BUCKET,
        }
    }

    /// Bytes one spilled value occupies on this class's stack.
    pub const fn slot_size(self) -> usize {
        match self {
            RegClass::K => 2,
            RegClass::S | RegClass::V | RegClass::B => 128,
            RegClass::H => 256,
            RegClass::L => 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_bits_map_to_classes() {
        assert_eq!(TypeSet::BOOL.reg_class(), Some(RegClass::K));
        assert_eq!(TypeSet::INT.reg_class(), Some(RegClass::S));
        assert_eq!(TypeSet::TIME.reg_class(), Some(RegClass::S));
        assert_eq!(TypeSet::MEM.reg_class(), None);
        assert_eq!(TypeSet::NUMERIC.reg_class(), None);
    }

    #[test]
    fn ret_sets_enumerate_their_classes() {
        let classes: Vec<_> = TypeSet::SPLIT_RET.reg_classes().collect();
        assert_eq!(classes, vec![RegClass::V, RegClass::S, RegClass::K]);
    }
}
