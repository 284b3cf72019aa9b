//! The opcode table.
//!
//! `impl_opcodes!` is the single source of truth: each row carries a short
//! docstring, the `u16` opcode value, the variant identifier, the mnemonic
//! used by the disassembler, and the immediate format. Everything else —
//! `TryFrom<u16>`, `mnemonic()`, `imm_fmt()` — is derived from the table.

use crate::imm::ImmFmt;

/// Raised when a `u16` does not name an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid opcode {0:#06x}")]
pub struct InvalidOpcode(pub u16);

macro_rules! impl_opcodes {
    ( $( $doc:literal $val:literal $Variant:ident $mn:literal $imm:ident )+ ) => {
        /// A single VM operation, identified by its `u16` wire value.
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
        #[derive(strum::EnumCount, strum::EnumIter)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(u16)]
        pub enum Opcode {
            $( #[doc = $doc] $Variant = $val, )+
        }

        impl Opcode {
            /// The disassembler mnemonic.
            pub const fn mnemonic(self) -> &'static str {
                match self { $( Self::$Variant => $mn, )+ }
            }

            /// Shape of the immediate bytes following this opcode.
            pub const fn imm_fmt(self) -> ImmFmt {
                match self { $( Self::$Variant => ImmFmt::$imm, )+ }
            }

            /// The `u16` wire value.
            pub const fn raw(self) -> u16 {
                self as u16
            }
        }

        impl core::convert::TryFrom<u16> for Opcode {
            type Error = InvalidOpcode;

            fn try_from(value: u16) -> Result<Self, InvalidOpcode> {
                match value {
                    $( $val => Ok(Self::$Variant), )+
                    _ => Err(InvalidOpcode(value)),
                }
            }
        }
    };
}

impl_opcodes! {
    "Seat the row cursor in B and the all-true mask in K."
    0x0000 INIT "init" None
    "Terminate the program; outputs are whatever the return registers hold."
    0x0001 RET "ret" None

    "Spill the K register to a mask stack slot."
    0x0010 SAVEK "save.k" Slot
    "Reload the K register from a mask stack slot."
    0x0011 LOADK "load.k" Slot
    "Swap the K register with a mask stack slot."
    0x0012 XCHGK "xchg.k" Slot
    "Set K to the empty mask."
    0x0013 FALSEK "false.k" None
    "Complement K under the lane-validity mask."
    0x0014 NOTK "not.k" None
    "AND K with a mask slot."
    0x0015 ANDK "and.k" Slot
    "OR K with a mask slot."
    0x0016 ORK "or.k" Slot
    "XOR K with a mask slot."
    0x0017 XORK "xor.k" Slot
    "XNOR K with a mask slot, under the lane-validity mask."
    0x0018 XNORK "xnor.k" Slot
    "Clear a mask slot's lanes from K: K AND NOT slot."
    0x0019 ANDNK "andn.k" Slot

    "Spill the S register to a scalar stack slot."
    0x0020 SAVES "save.s" Slot
    "Reload the S register from a scalar stack slot."
    0x0021 LOADS "load.s" Slot
    "Swap the S register with a scalar stack slot."
    0x0022 XCHGS "xchg.s" Slot
    "Spill the V register to a value stack slot."
    0x0028 SAVEV "save.v" Slot
    "Reload the V register from a value stack slot."
    0x0029 LOADV "load.v" Slot
    "Swap the V register with a value stack slot."
    0x002a XCHGV "xchg.v" Slot
    "Spill the B register to a base stack slot."
    0x0030 SAVEB "save.b" Slot
    "Reload the B register from a base stack slot."
    0x0031 LOADB "load.b" Slot
    "Swap the B register with a base stack slot."
    0x0032 XCHGB "xchg.b" Slot
    "Spill the H register to a hash stack slot."
    0x0038 SAVEH "save.h" Slot
    "Reload the H register from a hash stack slot."
    0x0039 LOADH "load.h" Slot
    "Swap the H register with a hash stack slot."
    0x003a XCHGH "xchg.h" Slot
    "Spill the L register to a bucket stack slot."
    0x0040 SAVEL "save.l" Slot
    "Reload the L register from a bucket stack slot."
    0x0041 LOADL "load.l" Slot
    "Swap the L register with a bucket stack slot."
    0x0042 XCHGL "xchg.l" Slot

    "Broadcast an integer immediate into S."
    0x0050 BCASTI "broadcast.i" I64
    "Broadcast a float immediate into S."
    0x0051 BCASTF "broadcast.f" F64
    "Broadcast a timestamp immediate (microseconds) into S."
    0x0052 BCASTTS "broadcast.ts" I64
    "Broadcast a dictionary string into S."
    0x0053 BCASTSTR "broadcast.str" Dict
    "Broadcast a boolean immediate into K under the validity mask."
    0x0054 BCASTK "broadcast.k" Bool

    "Walk the record in B for a symbol; V gets the field, K its presence."
    0x0060 FINDSYM "findsym" Sym
    "Like findsym, resuming from a prior field's offset slot."
    0x0061 FINDSYM2 "findsym2" SymSlot
    "Materialize the interior of the composite value in V as a new base in B."
    0x0062 TUPLES "tuples" None
    "Split the list in V into head (V) and tail (S); K narrows to non-empty."
    0x0063 SPLIT "split" None

    "K := lanes where V is boolean true."
    0x0070 ISTRUE "istrue" None
    "K := lanes where V is boolean false."
    0x0071 ISFALSE "isfalse" None
    "K := lanes where V is null."
    0x0072 ISNULL "isnull" None
    "K := lanes where V is present and not null."
    0x0073 ISNOTNULL "isnotnull" None
    "K := lanes where V is a boolean."
    0x0074 ISBOOL "isbool" None
    "K := lanes where V is an integer."
    0x0075 ISINT "isint" None
    "K := lanes where V is a float."
    0x0076 ISFLOAT "isfloat" None
    "K := lanes where V is any number."
    0x0077 ISNUM "isnum" None
    "K := lanes where V is a string."
    0x0078 ISSTR "isstr" None
    "K := lanes where V is a list."
    0x0079 ISLIST "islist" None
    "K := lanes where V is a structure."
    0x007a ISSTRUCT "isstruct" None
    "K := lanes where V is a timestamp."
    0x007b ISTIME "istime" None

    "Unbox the integer in V into S; K narrows to integer lanes."
    0x0080 UNBOXINT "unbox.i" None
    "Unbox the float in V into S; K narrows to float lanes."
    0x0081 UNBOXFLOAT "unbox.f" None
    "Unbox any number in V into S as float; K narrows to numeric lanes."
    0x0082 UNBOXNUM "unbox.num" None
    "Unbox the string in V into S; K narrows to string lanes."
    0x0083 UNBOXSTR "unbox.str" None
    "Unbox the timestamp in V into S; K narrows to timestamp lanes."
    0x0084 UNBOXTS "unbox.ts" None
    "Unbox the list in V into S; K narrows to list lanes."
    0x0085 UNBOXLIST "unbox.list" None

    "Convert the integers in S to floats."
    0x0090 CVTI2F "cvt.i2f" None
    "Convert the floats in S to integers, rounding to nearest."
    0x0091 CVTF2I "cvt.f2i" None
    "Materialize K as 0/1 integers in S."
    0x0092 CVTK2I "cvt.k2i" None
    "K := lanes where the integer in S is nonzero."
    0x0093 CVTI2K "cvt.i2k" None

    "Integer add: S += slot."
    0x00a0 ADDI "add.i" Slot
    "Integer add immediate."
    0x00a1 ADDIMMI "add.imm.i" I64
    "Integer subtract: S -= slot."
    0x00a2 SUBI "sub.i" Slot
    "Integer subtract immediate."
    0x00a3 SUBIMMI "sub.imm.i" I64
    "Reversed integer subtract immediate: S := imm - S."
    0x00a4 RSUBIMMI "rsub.imm.i" I64
    "Integer multiply: S *= slot."
    0x00a5 MULI "mul.i" Slot
    "Integer multiply immediate."
    0x00a6 MULIMMI "mul.imm.i" I64
    "Integer divide: S /= slot; K narrows to nonzero divisors."
    0x00a7 DIVI "div.i" Slot
    "Integer divide immediate."
    0x00a8 DIVIMMI "div.imm.i" I64
    "Reversed integer divide immediate: S := imm / S."
    0x00a9 RDIVIMMI "rdiv.imm.i" I64
    "Integer modulo: S %= slot; K narrows to nonzero divisors."
    0x00aa MODI "mod.i" Slot
    "Integer modulo immediate."
    0x00ab MODIMMI "mod.imm.i" I64
    "Reversed integer modulo immediate: S := imm % S."
    0x00ac RMODIMMI "rmod.imm.i" I64
    "Integer negate."
    0x00ad NEGI "neg.i" None
    "Integer absolute value."
    0x00ae ABSI "abs.i" None
    "Integer sign (-1, 0, 1)."
    0x00af SIGNI "sign.i" None
    "Integer minimum with a slot."
    0x00b0 MINI "min.i" Slot
    "Integer maximum with a slot."
    0x00b1 MAXI "max.i" Slot
    "Bitwise AND with a slot."
    0x00b2 BITANDI "bitand.i" Slot
    "Bitwise AND immediate."
    0x00b3 BITANDIMMI "bitand.imm.i" I64
    "Bitwise OR with a slot."
    0x00b4 BITORI "bitor.i" Slot
    "Bitwise OR immediate."
    0x00b5 BITORIMMI "bitor.imm.i" I64
    "Bitwise XOR with a slot."
    0x00b6 BITXORI "bitxor.i" Slot
    "Bitwise XOR immediate."
    0x00b7 BITXORIMMI "bitxor.imm.i" I64
    "Shift left logical by a slot."
    0x00b8 SLLI "sll.i" Slot
    "Shift left logical immediate."
    0x00b9 SLLIMMI "sll.imm.i" I64
    "Shift right logical by a slot."
    0x00ba SRLI "srl.i" Slot
    "Shift right logical immediate."
    0x00bb SRLIMMI "srl.imm.i" I64
    "Shift right arithmetic by a slot."
    0x00bc SRAI "sra.i" Slot
    "Shift right arithmetic immediate."
    0x00bd SRAIMMI "sra.imm.i" I64

    "Float add: S += slot."
    0x00c0 ADDF "add.f" Slot
    "Float add immediate."
    0x00c1 ADDIMMF "add.imm.f" F64
    "Float subtract: S -= slot."
    0x00c2 SUBF "sub.f" Slot
    "Float subtract immediate."
    0x00c3 SUBIMMF "sub.imm.f" F64
    "Reversed float subtract immediate: S := imm - S."
    0x00c4 RSUBIMMF "rsub.imm.f" F64
    "Float multiply: S *= slot."
    0x00c5 MULF "mul.f" Slot
    "Float multiply immediate."
    0x00c6 MULIMMF "mul.imm.f" F64
    "Float divide: S /= slot."
    0x00c7 DIVF "div.f" Slot
    "Float divide immediate."
    0x00c8 DIVIMMF "div.imm.f" F64
    "Reversed float divide immediate: S := imm / S."
    0x00c9 RDIVIMMF "rdiv.imm.f" F64
    "Float modulo: S %= slot."
    0x00ca MODF "mod.f" Slot
    "Float modulo immediate."
    0x00cb MODIMMF "mod.imm.f" F64
    "Reversed float modulo immediate: S := imm % S."
    0x00cc RMODIMMF "rmod.imm.f" F64
    "Float negate."
    0x00cd NEGF "neg.f" None
    "Float absolute value."
    0x00ce ABSF "abs.f" None
    "Float sign (-1, 0, 1)."
    0x00cf SIGNF "sign.f" None
    "Float minimum with a slot."
    0x00d0 MINF "min.f" Slot
    "Float maximum with a slot."
    0x00d1 MAXF "max.f" Slot
    "Square root."
    0x00d2 SQRTF "sqrt.f" None
    "Cube root."
    0x00d3 CBRTF "cbrt.f" None
    "Round half away from zero."
    0x00d4 ROUNDF "round.f" None
    "Round half to even."
    0x00d5 ROUNDEVENF "roundeven.f" None
    "Round toward negative infinity."
    0x00d6 FLOORF "floor.f" None
    "Round toward positive infinity."
    0x00d7 CEILF "ceil.f" None
    "Round toward zero."
    0x00d8 TRUNCF "trunc.f" None
    "S := S raised to the power in a slot."
    0x00d9 POWF "pow.f" Slot
    "Euclidean norm with a slot."
    0x00da HYPOTF "hypot.f" Slot
    "Two-argument arctangent with a slot."
    0x00db ATAN2F "atan2.f" Slot
    "Histogram bucket of S within [lo, hi) split into n buckets (float)."
    0x00dc WIDTHBUCKETF "widthbucket.f" Slot3
    "Histogram bucket of S within [lo, hi) split into n buckets (integer)."
    0x00dd WIDTHBUCKETI "widthbucket.i" Slot3
    "Natural logarithm."
    0x00e0 LNF "ln.f" None
    "ln(1 + S)."
    0x00e1 LN1PF "ln1p.f" None
    "Base-2 logarithm."
    0x00e2 LOG2F "log2.f" None
    "Base-10 logarithm."
    0x00e3 LOG10F "log10.f" None
    "Natural exponential."
    0x00e4 EXPF "exp.f" None
    "exp(S) - 1."
    0x00e5 EXPM1F "expm1.f" None
    "Base-2 exponential."
    0x00e6 EXP2F "exp2.f" None
    "Base-10 exponential."
    0x00e7 EXP10F "exp10.f" None
    "Sine."
    0x00e8 SINF "sin.f" None
    "Cosine."
    0x00e9 COSF "cos.f" None
    "Tangent."
    0x00ea TANF "tan.f" None
    "Arcsine."
    0x00eb ASINF "asin.f" None
    "Arccosine."
    0x00ec ACOSF "acos.f" None
    "Arctangent."
    0x00ed ATANF "atan.f" None

    "K := S == slot (integer)."
    0x0100 CMPEQI "cmpeq.i" Slot
    "K := S == imm (integer)."
    0x0101 CMPEQIMMI "cmpeq.imm.i" I64
    "K := S < slot (integer)."
    0x0102 CMPLTI "cmplt.i" Slot
    "K := S <= slot (integer)."
    0x0103 CMPLEI "cmple.i" Slot
    "K := S > slot (integer)."
    0x0104 CMPGTI "cmpgt.i" Slot
    "K := S >= slot (integer)."
    0x0105 CMPGEI "cmpge.i" Slot
    "K := S < imm (integer)."
    0x0106 CMPLTIMMI "cmplt.imm.i" I64
    "K := S <= imm (integer)."
    0x0107 CMPLEIMMI "cmple.imm.i" I64
    "K := S > imm (integer)."
    0x0108 CMPGTIMMI "cmpgt.imm.i" I64
    "K := S >= imm (integer)."
    0x0109 CMPGEIMMI "cmpge.imm.i" I64
    "K := S == slot (float)."
    0x0110 CMPEQF "cmpeq.f" Slot
    "K := S == imm (float)."
    0x0111 CMPEQIMMF "cmpeq.imm.f" F64
    "K := S < slot (float)."
    0x0112 CMPLTF "cmplt.f" Slot
    "K := S <= slot (float)."
    0x0113 CMPLEF "cmple.f" Slot
    "K := S > slot (float)."
    0x0114 CMPGTF "cmpgt.f" Slot
    "K := S >= slot (float)."
    0x0115 CMPGEF "cmpge.f" Slot
    "K := S < imm (float)."
    0x0116 CMPLTIMMF "cmplt.imm.f" F64
    "K := S <= imm (float)."
    0x0117 CMPLEIMMF "cmple.imm.f" F64
    "K := S > imm (float)."
    0x0118 CMPGTIMMF "cmpgt.imm.f" F64
    "K := S >= imm (float)."
    0x0119 CMPGEIMMF "cmpge.imm.f" F64
    "K := S == slot (string)."
    0x0120 CMPEQSTR "cmpeq.str" Slot
    "K := S == dictionary string."
    0x0121 CMPEQIMMSTR "cmpeq.imm.str" Dict
    "K := S < slot (string, lexicographic)."
    0x0122 CMPLTSTR "cmplt.str" Slot
    "K := S <= slot (string, lexicographic)."
    0x0123 CMPLESTR "cmple.str" Slot
    "K := S > slot (string, lexicographic)."
    0x0124 CMPGTSTR "cmpgt.str" Slot
    "K := S >= slot (string, lexicographic)."
    0x0125 CMPGESTR "cmpge.str" Slot
    "K := S == slot (string, case-insensitive)."
    0x0126 CMPEQSTRCI "cmpeq.str.ci" Slot
    "K := S == dictionary string, case-insensitive."
    0x0127 CMPEQIMMSTRCI "cmpeq.imm.str.ci" Dict
    "K := S == slot (timestamp)."
    0x0130 CMPEQTS "cmpeq.ts" Slot
    "K := S == imm (timestamp)."
    0x0131 CMPEQIMMTS "cmpeq.imm.ts" I64
    "K := S < slot (timestamp)."
    0x0132 CMPLTTS "cmplt.ts" Slot
    "K := S <= slot (timestamp)."
    0x0133 CMPLETS "cmple.ts" Slot
    "K := S > slot (timestamp)."
    0x0134 CMPGTTS "cmpgt.ts" Slot
    "K := S >= slot (timestamp)."
    0x0135 CMPGETS "cmpge.ts" Slot
    "K := S < imm (timestamp)."
    0x0136 CMPLTIMMTS "cmplt.imm.ts" I64
    "K := S <= imm (timestamp)."
    0x0137 CMPLEIMMTS "cmple.imm.ts" I64
    "K := S > imm (timestamp)."
    0x0138 CMPGTIMMTS "cmpgt.imm.ts" I64
    "K := S >= imm (timestamp)."
    0x0139 CMPGEIMMTS "cmpge.imm.ts" I64
    "K := V structurally equals the value in a slot."
    0x0140 CMPEQV "cmpeq.v" Slot
    "K := V structurally equals an encoded literal."
    0x0141 CMPEQIMMV "cmpeq.imm.v" LitRef

    "K := the string in S starts with a dictionary string."
    0x0150 HASPREFIX "hasprefix" Dict
    "Case-insensitive hasprefix."
    0x0151 HASPREFIXCI "hasprefix.ci" Dict
    "K := the string in S ends with a dictionary string."
    0x0152 HASSUFFIX "hassuffix" Dict
    "Case-insensitive hassuffix."
    0x0153 HASSUFFIXCI "hassuffix.ci" Dict
    "K := the string in S contains a dictionary string."
    0x0154 CONTAINSSTR "contains" Dict
    "Case-insensitive contains."
    0x0155 CONTAINSSTRCI "contains.ci" Dict
    "K := the string in S matches a compiled wildcard pattern."
    0x0156 MATCHPAT "matchpat" LitRef
    "Case-insensitive matchpat."
    0x0157 MATCHPATCI "matchpat.ci" LitRef

    "Lowercase the string in S."
    0x0160 LOWERSTR "lower" None
    "Uppercase the string in S."
    0x0161 UPPERSTR "upper" None
    "Strip leading whitespace."
    0x0162 LTRIMSTR "ltrim" None
    "Strip trailing whitespace."
    0x0163 RTRIMSTR "rtrim" None
    "Strip whitespace on both ends."
    0x0164 TRIMSTR "trim" None
    "S := number of characters in the string in S."
    0x0165 CHARLEN "charlen" None
    "S := number of bytes in the string in S."
    0x0166 OCTETLEN "octetlen" None
    "Substring of S from a start slot, limited by a length slot."
    0x0167 SUBSTR "substr" Slot2
    "Field of S split on a dictionary delimiter, selected by an index slot."
    0x0168 SPLITPART "splitpart" DictSlot
    "Concatenate S with the string slots in the variadic payload."
    0x0169 CONCATSTR "concat.str" Var

    "S := b - a in whole microseconds, a from a slot."
    0x0180 DATEDIFFUS "datediff.us" Slot
    "S := whole-month difference, earlier operand from a slot."
    0x0181 DATEDIFFMONTH "datediff.month" Slot
    "S := whole-year difference, earlier operand from a slot."
    0x0182 DATEDIFFYEAR "datediff.year" Slot
    "S := whole-quarter difference, earlier operand from a slot."
    0x0183 DATEDIFFQUARTER "datediff.quarter" Slot
    "Add microseconds from a slot to the timestamp in S."
    0x0184 DATEADDUS "dateadd.us" Slot
    "Add immediate microseconds to the timestamp in S."
    0x0185 DATEADDUSIMM "dateadd.imm.us" I64
    "Add calendar months from a slot to the timestamp in S."
    0x0186 DATEADDMONTH "dateadd.month" Slot
    "Add immediate calendar months to the timestamp in S."
    0x0187 DATEADDMONTHIMM "dateadd.imm.month" I64
    "S := year of the timestamp in S."
    0x0190 EXTRACTYEAR "extract.year" None
    "S := month of the timestamp in S."
    0x0191 EXTRACTMONTH "extract.month" None
    "S := day of month of the timestamp in S."
    0x0192 EXTRACTDAY "extract.day" None
    "S := hour of the timestamp in S."
    0x0193 EXTRACTHOUR "extract.hour" None
    "S := minute of the timestamp in S."
    0x0194 EXTRACTMINUTE "extract.minute" None
    "S := second of the timestamp in S."
    0x0195 EXTRACTSECOND "extract.second" None
    "S := microsecond of the timestamp in S."
    0x0196 EXTRACTMICRO "extract.micro" None
    "Truncate the timestamp in S to year start."
    0x01a0 TRUNCYEAR "datetrunc.year" None
    "Truncate the timestamp in S to quarter start."
    0x01a1 TRUNCQUARTER "datetrunc.quarter" None
    "Truncate the timestamp in S to month start."
    0x01a2 TRUNCMONTH "datetrunc.month" None
    "Truncate the timestamp in S to day start."
    0x01a3 TRUNCDAY "datetrunc.day" None
    "Truncate the timestamp in S to hour start."
    0x01a4 TRUNCHOUR "datetrunc.hour" None
    "Truncate the timestamp in S to minute start."
    0x01a5 TRUNCMINUTE "datetrunc.minute" None
    "Truncate the timestamp in S to second start."
    0x01a6 TRUNCSECOND "datetrunc.second" None
    "S := the timestamp in S as microseconds since the epoch."
    0x01b0 UNIXMICROS "unixmicros" None
    "S := the integer microseconds in S as a timestamp."
    0x01b1 TSFROMMICROS "ts.frommicros" None

    "S := geohash of (lat S, lon slot) at a precision slot."
    0x01c0 GEOHASH "geohash" Slot2
    "S := web-mercator tile X of (lon S) at a zoom slot."
    0x01c1 GEOTILEX "geotilex" Slot
    "S := web-mercator tile Y of (lat S) at a zoom slot."
    0x01c2 GEOTILEY "geotiley" Slot
    "S := great-circle distance from (lat S, lon/lat/lon slots) in meters."
    0x01c3 GEODISTANCE "geodistance" Slot3

    "Box the integers in S into the scratch buffer as values in V."
    0x01d0 BOXINT "box.i" None
    "Box the floats in S into the scratch buffer as values in V."
    0x01d1 BOXFLOAT "box.f" None
    "Box the strings in S into the scratch buffer as values in V."
    0x01d2 BOXSTR "box.str" None
    "Box the timestamps in S into the scratch buffer as values in V."
    0x01d3 BOXTS "box.ts" None
    "Box the lists in S into the scratch buffer as values in V."
    0x01d4 BOXLIST "box.list" None
    "Box K (under a validity mask slot) as boolean values in V."
    0x01d5 BOXMASK "boxmask" Slot
    "Assemble a list in scratch from the variadic (value, mask) slot pairs."
    0x01d6 MAKELIST "makelist" Var
    "Assemble a structure in scratch from the variadic (sym, value, mask) triples."
    0x01d7 MAKESTRUCT "makestruct" Var
    "V := V where K, else the value slot."
    0x01d8 BLENDV "blend.v" Slot
    "S := S where K, else the scalar slot."
    0x01d9 BLENDS "blend.s" Slot
    "V := the encoded literal at a literal-pool reference."
    0x01da LITREF "litref" LitRef

    "H := wide hash of the value in V."
    0x01e0 HASHVALUE "hashvalue" Slot
    "Mix the hash slot into H from the value in V."
    0x01e1 HASHVALUEPLUS "hashvalue+" Slot2
    "K := lanes whose H is a member of a compiled hash tree."
    0x01e2 HASHMEMBER "hashmember" Tree
    "V := tree-mapped value for H; K narrows to mapped lanes."
    0x01e3 HASHLOOKUP "hashlookup" Tree

    "Accumulate sum of the integers in S at an aggregate slot."
    0x0200 AGGSUMI "aggsum.i" AggSlot
    "Accumulate sum of the floats in S at an aggregate slot."
    0x0201 AGGSUMF "aggsum.f" AggSlot
    "Accumulate mean state (sum, count) of the integers in S."
    0x0202 AGGAVGI "aggavg.i" AggSlot
    "Accumulate mean state (sum, count) of the floats in S."
    0x0203 AGGAVGF "aggavg.f" AggSlot
    "Accumulate minimum of the integers in S."
    0x0204 AGGMINI "aggmin.i" AggSlot
    "Accumulate minimum of the floats in S."
    0x0205 AGGMINF "aggmin.f" AggSlot
    "Accumulate maximum of the integers in S."
    0x0206 AGGMAXI "aggmax.i" AggSlot
    "Accumulate maximum of the floats in S."
    0x0207 AGGMAXF "aggmax.f" AggSlot
    "Accumulate bitwise AND of the integers in S."
    0x0208 AGGANDI "aggand.i" AggSlot
    "Accumulate bitwise OR of the integers in S."
    0x0209 AGGORI "aggor.i" AggSlot
    "Accumulate bitwise XOR of the integers in S."
    0x020a AGGXORI "aggxor.i" AggSlot
    "Count lanes selected by K."
    0x020b AGGCOUNT "aggcount" AggSlot
    "Accumulate the earliest timestamp in S."
    0x020c AGGMINTS "aggmin.ts" AggSlot
    "Accumulate the latest timestamp in S."
    0x020d AGGMAXTS "aggmax.ts" AggSlot
    "Fold the hashes in H into a HyperLogLog state."
    0x020e AGGAPPROXCOUNT "aggapproxcount" AggPrec

    "L := per-group state displacement for the hashes in H."
    0x0220 AGGBUCKET "aggbucket" Tree
    "Bucketed sum of the integers in S, displaced by L."
    0x0221 AGGSLOTSUMI "aggslotsum.i" AggSlot
    "Bucketed sum of the floats in S, displaced by L."
    0x0222 AGGSLOTSUMF "aggslotsum.f" AggSlot
    "Bucketed mean state of the integers in S, displaced by L."
    0x0223 AGGSLOTAVGI "aggslotavg.i" AggSlot
    "Bucketed mean state of the floats in S, displaced by L."
    0x0224 AGGSLOTAVGF "aggslotavg.f" AggSlot
    "Bucketed minimum of the integers in S, displaced by L."
    0x0225 AGGSLOTMINI "aggslotmin.i" AggSlot
    "Bucketed minimum of the floats in S, displaced by L."
    0x0226 AGGSLOTMINF "aggslotmin.f" AggSlot
    "Bucketed maximum of the integers in S, displaced by L."
    0x0227 AGGSLOTMAXI "aggslotmax.i" AggSlot
    "Bucketed maximum of the floats in S, displaced by L."
    0x0228 AGGSLOTMAXF "aggslotmax.f" AggSlot
    "Bucketed bitwise AND of the integers in S, displaced by L."
    0x0229 AGGSLOTANDI "aggslotand.i" AggSlot
    "Bucketed bitwise OR of the integers in S, displaced by L."
    0x022a AGGSLOTORI "aggslotor.i" AggSlot
    "Bucketed bitwise XOR of the integers in S, displaced by L."
    0x022b AGGSLOTXORI "aggslotxor.i" AggSlot
    "Bucketed count of lanes selected by K, displaced by L."
    0x022c AGGSLOTCOUNT "aggslotcount" AggSlot
    "Bucketed earliest timestamp in S, displaced by L."
    0x022d AGGSLOTMINTS "aggslotmin.ts" AggSlot
    "Bucketed latest timestamp in S, displaced by L."
    0x022e AGGSLOTMAXTS "aggslotmax.ts" AggSlot
    "Bucketed HyperLogLog fold of the hashes in H, displaced by L."
    0x022f AGGSLOTAPPROXCOUNT "aggslotapproxcount" AggPrec
}

impl Opcode {
    /// The swapped-operand twin of an ordered comparison.
    ///
    /// The emitter uses this when the operand that should sit in the register
    /// is already on the stack and vice versa: `a < b` with `b` in the
    /// register emits as `b > a`. Symmetric opcodes return themselves.
    pub const fn reversed(self) -> Opcode {
        match self {
            Opcode::CMPLTI => Opcode::CMPGTI,
            Opcode::CMPGTI => Opcode::CMPLTI,
            Opcode::CMPLEI => Opcode::CMPGEI,
            Opcode::CMPGEI => Opcode::CMPLEI,
            Opcode::CMPLTF => Opcode::CMPGTF,
            Opcode::CMPGTF => Opcode::CMPLTF,
            Opcode::CMPLEF => Opcode::CMPGEF,
            Opcode::CMPGEF => Opcode::CMPLEF,
            Opcode::CMPLTSTR => Opcode::CMPGTSTR,
            Opcode::CMPGTSTR => Opcode::CMPLTSTR,
            Opcode::CMPLESTR => Opcode::CMPGESTR,
            Opcode::CMPGESTR => Opcode::CMPLESTR,
            Opcode::CMPLTTS => Opcode::CMPGTTS,
            Opcode::CMPGTTS => Opcode::CMPLTTS,
            Opcode::CMPLETS => Opcode::CMPGETS,
            Opcode::CMPGETS => Opcode::CMPLETS,
            other => other,
        }
    }

    /// Whether this opcode has a distinct swapped-operand twin.
    pub const fn has_reverse(self) -> bool {
        self.reversed() as u16 != self as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn raw_values_round_trip() {
        for op in Opcode::iter() {
            assert_eq!(Opcode::try_from(op.raw()), Ok(op));
        }
        assert_eq!(Opcode::try_from(0xffff), Err(InvalidOpcode(0xffff)));
    }

    #[test]
    fn mnemonics_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for op in Opcode::iter() {
            assert!(seen.insert(op.mnemonic()), "duplicate {}", op.mnemonic());
        }
    }

    #[test]
    fn reversal_is_an_involution() {
        for op in Opcode::iter() {
            assert_eq!(op.reversed().reversed(), op);
            if op.has_reverse() {
                assert_eq!(op.imm_fmt(), op.reversed().imm_fmt());
            }
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trip() {
        let s = serde_json::to_string(&Opcode::FINDSYM).unwrap();
        assert_eq!(serde_json::from_str::<Opcode>(&s).unwrap(), Opcode::FINDSYM);
    }
}
