//! The SSA op table.
//!
//! `ssa_ops!` is the single source of truth, in the same spirit as the
//! bytecode table in `sift-asm`: one row per op carrying the mnemonic, the
//! argument types, an optional repeating tuple for variadic ops, the return
//! set, the schedule priority, the bytecode opcode it lowers to, the
//! immediate format, flags, and an optional hand-written emitter. The
//! builder and the emitter consult [`OpInfo`] instead of matching on the op
//! tag, so extending the instruction set stays local to this table.

use sift_asm::{ImmFmt, Opcode};

use crate::emit::{
    emit_blend, emit_boxmask, emit_concat, emit_dot, emit_dot2, emit_hashvalue,
    emit_hashvalueplus, emit_loadslot, emit_makelist, emit_makestruct, emit_nothing,
    emit_ret, emit_splitpart, emit_storeslot, emit_trailing_slots, emit_tree_imm,
};
use crate::error::CompileError;
use crate::ssa::types::TypeSet;
use crate::ssa::ValueId;

/// Schedule priority of the program entry; always first.
pub const PRIO_INIT: i32 = 100_000;
/// Schedule priority of side-effecting (memory-token) ops.
pub const PRIO_MEM: i32 = 10_000;
/// Schedule priority of hash producers, just below their consumers.
pub const PRIO_HASH: i32 = 9_999;
/// Default priority.
pub const PRIO_ZERO: i32 = 0;
/// Priority of parse/unbox/load ops, delayed to just before their use.
pub const PRIO_PARSE: i32 = -100_000;

bitflags::bitflags! {
    /// Behavioral flags of an op.
    pub struct OpFlags: u8 {
        /// The result is meaningful even where the canonical mask argument
        /// is false (OR, XOR, blends, constructors, returns).
        const DISJUNCTIVE = 1 << 0;
        /// Terminal op; the program ends here.
        const RETURN_OP = 1 << 1;
        /// Writes the V register with lanes outside the valid mask zeroed,
        /// so a consuming blend can skip saving the displaced value.
        const SAFE_VALUE_MASK = 1 << 2;
        /// Boxes output into the per-worker scratch buffer.
        const SCRATCH = 1 << 3;
    }
}

/// A custom emit routine, overriding the default table-driven emitter.
pub type EmitFn = fn(&mut crate::emit::Emitter<'_>, ValueId) -> Result<(), CompileError>;

/// Immutable per-op metadata.
pub struct OpInfo {
    /// Mnemonic, also used by the pretty-printer.
    pub name: &'static str,
    /// Declared types of the fixed arguments.
    pub args: &'static [TypeSet],
    /// Declared types of the repeating trailing tuple, empty when the op is
    /// not variadic.
    pub vararg: &'static [TypeSet],
    /// Bitset of types the op defines.
    pub ret: TypeSet,
    /// Instruction-schedule priority.
    pub prio: i32,
    /// The bytecode opcode the default emitter lowers to; `None` for ops
    /// that exist only in the SSA (tokens, invalid, undef).
    pub bc: Option<Opcode>,
    /// Immediate format of the lowered instruction.
    pub imm: ImmFmt,
    /// Behavioral flags.
    pub flags: OpFlags,
    /// Hand-written emitter, when the default cannot encode the operands.
    pub emit: Option<EmitFn>,
}

macro_rules! ssa_ops {
    (@va) => { &[] };
    (@va [$($va:ident),+]) => { &[$(TypeSet::$va),+] };
    (@bc _) => { None };
    (@bc $bc:ident) => { Some(Opcode::$bc) };
    (@emit) => { None };
    (@emit $emit:path) => { Some($emit as EmitFn) };
    (@flags) => { OpFlags::empty() };
    (@flags $($flag:ident)|+) => {
        OpFlags::from_bits_truncate(0 $( | OpFlags::$flag.bits() )+)
    };
    (
        $( $doc:literal
           $Variant:ident : $name:literal,
           [ $($arg:ident),* ] $([ $($va:ident),+ ])? -> $ret:ident,
           $prio:ident, $bc:tt, $imm:ident
           $(, flags: $($flag:ident)|+ )?
           $(, emit: $emit:path )?
           ; )+
    ) => {
        /// An SSA operation tag.
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
        #[derive(strum::EnumCount, strum::EnumIter)]
        pub enum Op {
            $( #[doc = $doc] $Variant, )+
        }

        impl Op {
            /// Static metadata for this op.
            pub fn info(self) -> &'static OpInfo {
                match self {
                    $( Op::$Variant => {
                        static INFO: OpInfo = OpInfo {
                            name: $name,
                            args: &[ $( TypeSet::$arg ),* ],
                            vararg: ssa_ops!(@va $([$($va),+])?),
                            ret: TypeSet::$ret,
                            prio: $prio,
                            bc: ssa_ops!(@bc $bc),
                            imm: ImmFmt::$imm,
                            flags: ssa_ops!(@flags $($($flag)|+)?),
                            emit: ssa_ops!(@emit $($emit)?),
                        };
                        &INFO
                    } )+
                }
            }
        }
    };
}

ssa_ops! {
    "Carrier of a build-time diagnostic; poisons every consumer."
    Invalid: "invalid", [] -> ANY, PRIO_ZERO, _, None, emit: emit_nothing;
    "Don't-care input; suppresses the argument ambiguity check."
    Undef: "undef", [] -> ANY, PRIO_ZERO, _, None, emit: emit_nothing;
    "The row cursor and the all-true lane mask."
    Init: "init", [] -> BASE_MASKED, PRIO_INIT, INIT, None;
    "The constant false mask; doubles as MISSING."
    KFalse: "false", [] -> BOOL, PRIO_ZERO, FALSEK, None;
    "Root of the memory-token chain."
    InitMem: "initmem", [] -> MEM, PRIO_MEM, _, None, emit: emit_nothing;
    "Join of multiple memory tokens."
    MergeMem: "mergemem", [] [MEM] -> MEM, PRIO_MEM, _, None, emit: emit_nothing;

    "Broadcast integer literal."
    LitInt: "lit.i", [] -> INT, PRIO_ZERO, BCASTI, I64;
    "Broadcast float literal."
    LitFloat: "lit.f", [] -> FLOAT, PRIO_ZERO, BCASTF, F64;
    "Broadcast string literal."
    LitStr: "lit.str", [] -> STRING, PRIO_ZERO, BCASTSTR, Dict;
    "Broadcast timestamp literal."
    LitTs: "lit.ts", [] -> TIME, PRIO_ZERO, BCASTTS, I64;
    "Broadcast an encoded record literal."
    LitRecord: "lit.rec", [] -> VALUE, PRIO_ZERO, LITREF, LitRef, flags: SAFE_VALUE_MASK;

    "Lane-wise AND of two masks."
    And: "and", [BOOL, BOOL] -> BOOL, PRIO_ZERO, ANDK, Slot;
    "Lane-wise OR of two masks."
    Or: "or", [BOOL, BOOL] -> BOOL, PRIO_ZERO, ORK, Slot, flags: DISJUNCTIVE;
    "Lane-wise XOR of two masks."
    Xor: "xor", [BOOL, BOOL] -> BOOL, PRIO_ZERO, XORK, Slot, flags: DISJUNCTIVE;
    "Lane-wise XNOR of two masks."
    Xnor: "xnor", [BOOL, BOOL] -> BOOL, PRIO_ZERO, XNORK, Slot, flags: DISJUNCTIVE;
    "Lane-wise complement under the validity mask."
    Not: "not", [BOOL] -> BOOL, PRIO_ZERO, NOTK, None;
    "Lane-wise AND of the second mask with the first's complement."
    AndNot: "andn", [BOOL, BOOL] -> BOOL, PRIO_ZERO, ANDNK, Slot;

    "Return a mask."
    RetK: "ret.k", [BOOL] -> BOOL, PRIO_ZERO, RET, None,
        flags: RETURN_OP | DISJUNCTIVE, emit: emit_ret;
    "Return boxed values and their mask."
    RetV: "ret.v", [VALUE, BOOL] -> VALUE_MASKED, PRIO_ZERO, RET, None,
        flags: RETURN_OP | DISJUNCTIVE, emit: emit_ret;
    "Return a base pointer and its mask."
    RetB: "ret.b", [BASE, BOOL] -> BASE_MASKED, PRIO_ZERO, RET, None,
        flags: RETURN_OP | DISJUNCTIVE, emit: emit_ret;
    "Return after ordering on a memory token."
    RetM: "ret.m", [MEM] -> MEM, PRIO_ZERO, RET, None,
        flags: RETURN_OP | DISJUNCTIVE, emit: emit_ret;

    "Walk a record for one field; the mask narrows to presence."
    Dot: "dot", [BASE, BOOL] -> VALUE_MASKED, PRIO_PARSE, FINDSYM, Sym,
        flags: SAFE_VALUE_MASK, emit: emit_dot;
    "Like dot, resuming the walk from a prior field's offset."
    Dot2: "dot2", [BASE, VALUE, BOOL] -> VALUE_MASKED, PRIO_PARSE, FINDSYM2, SymSlot,
        flags: SAFE_VALUE_MASK, emit: emit_dot2;
    "Materialize a composite value as an interior base pointer."
    Tuples: "tuples", [VALUE, BOOL] -> BASE_MASKED, PRIO_PARSE, TUPLES, None;
    "Split a list into head value and tail list; narrows to non-empty."
    Split: "split", [LIST, BOOL] -> SPLIT_RET, PRIO_PARSE, SPLIT, None;
    "Read a reserved value slot, ordered by a memory token."
    LoadSlot: "load.slot", [MEM, BOOL] -> VALUE_MASKED, PRIO_PARSE, LOADV, Slot,
        emit: emit_loadslot;
    "Write a reserved value slot, ordered by a memory token."
    StoreSlot: "store.slot", [MEM, VALUE, BOOL] -> MEM, PRIO_MEM, SAVEV, Slot,
        emit: emit_storeslot;

    "Lanes whose value is boolean true."
    IsTrue: "istrue", [VALUE, BOOL] -> BOOL, PRIO_ZERO, ISTRUE, None;
    "Lanes whose value is boolean false."
    IsFalse: "isfalse", [VALUE, BOOL] -> BOOL, PRIO_ZERO, ISFALSE, None;
    "Lanes whose value is null."
    IsNull: "isnull", [VALUE, BOOL] -> BOOL, PRIO_ZERO, ISNULL, None;
    "Lanes whose value is present and not null."
    IsNotNull: "isnotnull", [VALUE, BOOL] -> BOOL, PRIO_ZERO, ISNOTNULL, None;
    "Lanes whose value is a boolean."
    IsBool: "isbool", [VALUE, BOOL] -> BOOL, PRIO_ZERO, ISBOOL, None;
    "Lanes whose value is an integer."
    IsInt: "isint", [VALUE, BOOL] -> BOOL, PRIO_ZERO, ISINT, None;
    "Lanes whose value is a float."
    IsFloat: "isfloat", [VALUE, BOOL] -> BOOL, PRIO_ZERO, ISFLOAT, None;
    "Lanes whose value is any number."
    IsNum: "isnum", [VALUE, BOOL] -> BOOL, PRIO_ZERO, ISNUM, None;
    "Lanes whose value is a string."
    IsStr: "isstr", [VALUE, BOOL] -> BOOL, PRIO_ZERO, ISSTR, None;
    "Lanes whose value is a list."
    IsList: "islist", [VALUE, BOOL] -> BOOL, PRIO_ZERO, ISLIST, None;
    "Lanes whose value is a structure."
    IsStruct: "isstruct", [VALUE, BOOL] -> BOOL, PRIO_ZERO, ISSTRUCT, None;
    "Lanes whose value is a timestamp."
    IsTime: "istime", [VALUE, BOOL] -> BOOL, PRIO_ZERO, ISTIME, None;

    "Unbox integer lanes; the mask narrows to integers."
    ToInt: "toint", [VALUE, BOOL] -> INT_MASKED, PRIO_PARSE, UNBOXINT, None;
    "Unbox numeric lanes as floats; the mask narrows to numbers."
    ToFloat: "tofloat", [VALUE, BOOL] -> FLOAT_MASKED, PRIO_PARSE, UNBOXNUM, None;
    "Unbox string lanes; the mask narrows to strings."
    ToStr: "tostr", [VALUE, BOOL] -> STRING_MASKED, PRIO_PARSE, UNBOXSTR, None;
    "Unbox timestamp lanes; the mask narrows to timestamps."
    ToTime: "totime", [VALUE, BOOL] -> TIME_MASKED, PRIO_PARSE, UNBOXTS, None;
    "Unbox list lanes; the mask narrows to lists."
    ToList: "tolist", [VALUE, BOOL] -> LIST_MASKED, PRIO_PARSE, UNBOXLIST, None;

    "Widen integers to floats."
    CvtI2F: "cvti2f", [INT, BOOL] -> FLOAT, PRIO_ZERO, CVTI2F, None;
    "Round floats to integers."
    CvtF2I: "cvtf2i", [FLOAT, BOOL] -> INT, PRIO_ZERO, CVTF2I, None;
    "Materialize a mask as 0/1 integers."
    CvtK2I: "cvtk2i", [BOOL] -> INT, PRIO_ZERO, CVTK2I, None;
    "Lanes whose integer is nonzero."
    CvtI2K: "cvti2k", [INT, BOOL] -> BOOL, PRIO_ZERO, CVTI2K, None;

    "Integer addition."
    AddI: "add.i", [INT, INT, BOOL] -> INT, PRIO_ZERO, ADDI, Slot;
    "Integer addition with an immediate."
    AddImmI: "add.imm.i", [INT, BOOL] -> INT, PRIO_ZERO, ADDIMMI, I64;
    "Integer subtraction."
    SubI: "sub.i", [INT, INT, BOOL] -> INT, PRIO_ZERO, SUBI, Slot;
    "Integer subtraction of an immediate."
    SubImmI: "sub.imm.i", [INT, BOOL] -> INT, PRIO_ZERO, SUBIMMI, I64;
    "Integer subtraction from an immediate."
    RSubImmI: "rsub.imm.i", [INT, BOOL] -> INT, PRIO_ZERO, RSUBIMMI, I64;
    "Integer multiplication."
    MulI: "mul.i", [INT, INT, BOOL] -> INT, PRIO_ZERO, MULI, Slot;
    "Integer multiplication by an immediate."
    MulImmI: "mul.imm.i", [INT, BOOL] -> INT, PRIO_ZERO, MULIMMI, I64;
    "Integer division; narrows to nonzero divisors."
    DivI: "div.i", [INT, INT, BOOL] -> INT_MASKED, PRIO_ZERO, DIVI, Slot;
    "Integer division by an immediate."
    DivImmI: "div.imm.i", [INT, BOOL] -> INT_MASKED, PRIO_ZERO, DIVIMMI, I64;
    "Integer division of an immediate."
    RDivImmI: "rdiv.imm.i", [INT, BOOL] -> INT_MASKED, PRIO_ZERO, RDIVIMMI, I64;
    "Integer modulo; narrows to nonzero divisors."
    ModI: "mod.i", [INT, INT, BOOL] -> INT_MASKED, PRIO_ZERO, MODI, Slot;
    "Integer modulo by an immediate."
    ModImmI: "mod.imm.i", [INT, BOOL] -> INT_MASKED, PRIO_ZERO, MODIMMI, I64;
    "Integer modulo of an immediate."
    RModImmI: "rmod.imm.i", [INT, BOOL] -> INT_MASKED, PRIO_ZERO, RMODIMMI, I64;
    "Integer negation."
    NegI: "neg.i", [INT, BOOL] -> INT, PRIO_ZERO, NEGI, None;
    "Integer absolute value."
    AbsI: "abs.i", [INT, BOOL] -> INT, PRIO_ZERO, ABSI, None;
    "Integer sign."
    SignI: "sign.i", [INT, BOOL] -> INT, PRIO_ZERO, SIGNI, None;
    "Integer minimum."
    MinI: "min.i", [INT, INT, BOOL] -> INT, PRIO_ZERO, MINI, Slot;
    "Integer maximum."
    MaxI: "max.i", [INT, INT, BOOL] -> INT, PRIO_ZERO, MAXI, Slot;
    "Bitwise AND."
    BitAndI: "bitand.i", [INT, INT, BOOL] -> INT, PRIO_ZERO, BITANDI, Slot;
    "Bitwise AND with an immediate."
    BitAndImmI: "bitand.imm.i", [INT, BOOL] -> INT, PRIO_ZERO, BITANDIMMI, I64;
    "Bitwise OR."
    BitOrI: "bitor.i", [INT, INT, BOOL] -> INT, PRIO_ZERO, BITORI, Slot;
    "Bitwise OR with an immediate."
    BitOrImmI: "bitor.imm.i", [INT, BOOL] -> INT, PRIO_ZERO, BITORIMMI, I64;
    "Bitwise XOR."
    BitXorI: "bitxor.i", [INT, INT, BOOL] -> INT, PRIO_ZERO, BITXORI, Slot;
    "Bitwise XOR with an immediate."
    BitXorImmI: "bitxor.imm.i", [INT, BOOL] -> INT, PRIO_ZERO, BITXORIMMI, I64;
    "Shift left logical."
    SllI: "sll.i", [INT, INT, BOOL] -> INT, PRIO_ZERO, SLLI, Slot;
    "Shift left logical by an immediate."
    SllImmI: "sll.imm.i", [INT, BOOL] -> INT, PRIO_ZERO, SLLIMMI, I64;
    "Shift right logical."
    SrlI: "srl.i", [INT, INT, BOOL] -> INT, PRIO_ZERO, SRLI, Slot;
    "Shift right logical by an immediate."
    SrlImmI: "srl.imm.i", [INT, BOOL] -> INT, PRIO_ZERO, SRLIMMI, I64;
    "Shift right arithmetic."
    SraI: "sra.i", [INT, INT, BOOL] -> INT, PRIO_ZERO, SRAI, Slot;
    "Shift right arithmetic by an immediate."
    SraImmI: "sra.imm.i", [INT, BOOL] -> INT, PRIO_ZERO, SRAIMMI, I64;

    "Float addition."
    AddF: "add.f", [FLOAT, FLOAT, BOOL] -> FLOAT, PRIO_ZERO, ADDF, Slot;
    "Float addition with an immediate."
    AddImmF: "add.imm.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, ADDIMMF, F64;
    "Float subtraction."
    SubF: "sub.f", [FLOAT, FLOAT, BOOL] -> FLOAT, PRIO_ZERO, SUBF, Slot;
    "Float subtraction of an immediate."
    SubImmF: "sub.imm.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, SUBIMMF, F64;
    "Float subtraction from an immediate."
    RSubImmF: "rsub.imm.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, RSUBIMMF, F64;
    "Float multiplication."
    MulF: "mul.f", [FLOAT, FLOAT, BOOL] -> FLOAT, PRIO_ZERO, MULF, Slot;
    "Float multiplication by an immediate."
    MulImmF: "mul.imm.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, MULIMMF, F64;
    "Float division."
    DivF: "div.f", [FLOAT, FLOAT, BOOL] -> FLOAT, PRIO_ZERO, DIVF, Slot;
    "Float division by an immediate."
    DivImmF: "div.imm.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, DIVIMMF, F64;
    "Float division of an immediate."
    RDivImmF: "rdiv.imm.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, RDIVIMMF, F64;
    "Float modulo."
    ModF: "mod.f", [FLOAT, FLOAT, BOOL] -> FLOAT, PRIO_ZERO, MODF, Slot;
    "Float modulo by an immediate."
    ModImmF: "mod.imm.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, MODIMMF, F64;
    "Float modulo of an immediate."
    RModImmF: "rmod.imm.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, RMODIMMF, F64;
    "Float negation."
    NegF: "neg.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, NEGF, None;
    "Float absolute value."
    AbsF: "abs.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, ABSF, None;
    "Float sign."
    SignF: "sign.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, SIGNF, None;
    "Float minimum."
    MinF: "min.f", [FLOAT, FLOAT, BOOL] -> FLOAT, PRIO_ZERO, MINF, Slot;
    "Float maximum."
    MaxF: "max.f", [FLOAT, FLOAT, BOOL] -> FLOAT, PRIO_ZERO, MAXF, Slot;
    "Square root."
    SqrtF: "sqrt.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, SQRTF, None;
    "Cube root."
    CbrtF: "cbrt.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, CBRTF, None;
    "Round half away from zero."
    RoundF: "round.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, ROUNDF, None;
    "Round half to even."
    RoundEvenF: "roundeven.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, ROUNDEVENF, None;
    "Round toward negative infinity."
    FloorF: "floor.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, FLOORF, None;
    "Round toward positive infinity."
    CeilF: "ceil.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, CEILF, None;
    "Round toward zero."
    TruncF: "trunc.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, TRUNCF, None;
    "Exponentiation."
    PowF: "pow.f", [FLOAT, FLOAT, BOOL] -> FLOAT, PRIO_ZERO, POWF, Slot;
    "Euclidean norm."
    HypotF: "hypot.f", [FLOAT, FLOAT, BOOL] -> FLOAT, PRIO_ZERO, HYPOTF, Slot;
    "Two-argument arctangent."
    Atan2F: "atan2.f", [FLOAT, FLOAT, BOOL] -> FLOAT, PRIO_ZERO, ATAN2F, Slot;
    "Natural logarithm."
    LnF: "ln.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, LNF, None;
    "ln(1 + x)."
    Ln1pF: "ln1p.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, LN1PF, None;
    "Base-2 logarithm."
    Log2F: "log2.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, LOG2F, None;
    "Base-10 logarithm."
    Log10F: "log10.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, LOG10F, None;
    "Natural exponential."
    ExpF: "exp.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, EXPF, None;
    "exp(x) - 1."
    Expm1F: "expm1.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, EXPM1F, None;
    "Base-2 exponential."
    Exp2F: "exp2.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, EXP2F, None;
    "Base-10 exponential."
    Exp10F: "exp10.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, EXP10F, None;
    "Sine."
    SinF: "sin.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, SINF, None;
    "Cosine."
    CosF: "cos.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, COSF, None;
    "Tangent."
    TanF: "tan.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, TANF, None;
    "Arcsine."
    AsinF: "asin.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, ASINF, None;
    "Arccosine."
    AcosF: "acos.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, ACOSF, None;
    "Arctangent."
    AtanF: "atan.f", [FLOAT, BOOL] -> FLOAT, PRIO_ZERO, ATANF, None;
    "Histogram bucket within [lo, hi) split into n buckets (float)."
    WidthBucketF: "widthbucket.f", [FLOAT, FLOAT, FLOAT, FLOAT, BOOL] -> INT,
        PRIO_ZERO, WIDTHBUCKETF, Slot3, emit: emit_trailing_slots;
    "Histogram bucket within [lo, hi) split into n buckets (integer)."
    WidthBucketI: "widthbucket.i", [INT, INT, INT, INT, BOOL] -> INT,
        PRIO_ZERO, WIDTHBUCKETI, Slot3, emit: emit_trailing_slots;

    "Integer equality."
    CmpEqI: "cmpeq.i", [INT, INT, BOOL] -> BOOL, PRIO_ZERO, CMPEQI, Slot;
    "Integer equality with an immediate."
    CmpEqImmI: "cmpeq.imm.i", [INT, BOOL] -> BOOL, PRIO_ZERO, CMPEQIMMI, I64;
    "Integer less-than."
    CmpLtI: "cmplt.i", [INT, INT, BOOL] -> BOOL, PRIO_ZERO, CMPLTI, Slot;
    "Integer less-or-equal."
    CmpLeI: "cmple.i", [INT, INT, BOOL] -> BOOL, PRIO_ZERO, CMPLEI, Slot;
    "Integer greater-than."
    CmpGtI: "cmpgt.i", [INT, INT, BOOL] -> BOOL, PRIO_ZERO, CMPGTI, Slot;
    "Integer greater-or-equal."
    CmpGeI: "cmpge.i", [INT, INT, BOOL] -> BOOL, PRIO_ZERO, CMPGEI, Slot;
    "Integer less-than an immediate."
    CmpLtImmI: "cmplt.imm.i", [INT, BOOL] -> BOOL, PRIO_ZERO, CMPLTIMMI, I64;
    "Integer less-or-equal an immediate."
    CmpLeImmI: "cmple.imm.i", [INT, BOOL] -> BOOL, PRIO_ZERO, CMPLEIMMI, I64;
    "Integer greater-than an immediate."
    CmpGtImmI: "cmpgt.imm.i", [INT, BOOL] -> BOOL, PRIO_ZERO, CMPGTIMMI, I64;
    "Integer greater-or-equal an immediate."
    CmpGeImmI: "cmpge.imm.i", [INT, BOOL] -> BOOL, PRIO_ZERO, CMPGEIMMI, I64;
    "Float equality."
    CmpEqF: "cmpeq.f", [FLOAT, FLOAT, BOOL] -> BOOL, PRIO_ZERO, CMPEQF, Slot;
    "Float equality with an immediate."
    CmpEqImmF: "cmpeq.imm.f", [FLOAT, BOOL] -> BOOL, PRIO_ZERO, CMPEQIMMF, F64;
    "Float less-than."
    CmpLtF: "cmplt.f", [FLOAT, FLOAT, BOOL] -> BOOL, PRIO_ZERO, CMPLTF, Slot;
    "Float less-or-equal."
    CmpLeF: "cmple.f", [FLOAT, FLOAT, BOOL] -> BOOL, PRIO_ZERO, CMPLEF, Slot;
    "Float greater-than."
    CmpGtF: "cmpgt.f", [FLOAT, FLOAT, BOOL] -> BOOL, PRIO_ZERO, CMPGTF, Slot;
    "Float greater-or-equal."
    CmpGeF: "cmpge.f", [FLOAT, FLOAT, BOOL] -> BOOL, PRIO_ZERO, CMPGEF, Slot;
    "Float less-than an immediate."
    CmpLtImmF: "cmplt.imm.f", [FLOAT, BOOL] -> BOOL, PRIO_ZERO, CMPLTIMMF, F64;
    "Float less-or-equal an immediate."
    CmpLeImmF: "cmple.imm.f", [FLOAT, BOOL] -> BOOL, PRIO_ZERO, CMPLEIMMF, F64;
    "Float greater-than an immediate."
    CmpGtImmF: "cmpgt.imm.f", [FLOAT, BOOL] -> BOOL, PRIO_ZERO, CMPGTIMMF, F64;
    "Float greater-or-equal an immediate."
    CmpGeImmF: "cmpge.imm.f", [FLOAT, BOOL] -> BOOL, PRIO_ZERO, CMPGEIMMF, F64;
    "String equality."
    CmpEqStr: "cmpeq.str", [STRING, STRING, BOOL] -> BOOL, PRIO_ZERO, CMPEQSTR, Slot;
    "String equality with a dictionary literal."
    CmpEqImmStr: "cmpeq.imm.str", [STRING, BOOL] -> BOOL, PRIO_ZERO, CMPEQIMMSTR, Dict;
    "Case-insensitive string equality."
    CmpEqStrCi: "cmpeq.str.ci", [STRING, STRING, BOOL] -> BOOL, PRIO_ZERO, CMPEQSTRCI, Slot;
    "Case-insensitive string equality with a dictionary literal."
    CmpEqImmStrCi: "cmpeq.imm.str.ci", [STRING, BOOL] -> BOOL, PRIO_ZERO, CMPEQIMMSTRCI, Dict;
    "Lexicographic string less-than."
    CmpLtStr: "cmplt.str", [STRING, STRING, BOOL] -> BOOL, PRIO_ZERO, CMPLTSTR, Slot;
    "Lexicographic string less-or-equal."
    CmpLeStr: "cmple.str", [STRING, STRING, BOOL] -> BOOL, PRIO_ZERO, CMPLESTR, Slot;
    "Lexicographic string greater-than."
    CmpGtStr: "cmpgt.str", [STRING, STRING, BOOL] -> BOOL, PRIO_ZERO, CMPGTSTR, Slot;
    "Lexicographic string greater-or-equal."
    CmpGeStr: "cmpge.str", [STRING, STRING, BOOL] -> BOOL, PRIO_ZERO, CMPGESTR, Slot;
    "Timestamp equality."
    CmpEqTs: "cmpeq.ts", [TIME, TIME, BOOL] -> BOOL, PRIO_ZERO, CMPEQTS, Slot;
    "Timestamp equality with an immediate."
    CmpEqImmTs: "cmpeq.imm.ts", [TIME, BOOL] -> BOOL, PRIO_ZERO, CMPEQIMMTS, I64;
    "Timestamp less-than."
    CmpLtTs: "cmplt.ts", [TIME, TIME, BOOL] -> BOOL, PRIO_ZERO, CMPLTTS, Slot;
    "Timestamp less-or-equal."
    CmpLeTs: "cmple.ts", [TIME, TIME, BOOL] -> BOOL, PRIO_ZERO, CMPLETS, Slot;
    "Timestamp greater-than."
    CmpGtTs: "cmpgt.ts", [TIME, TIME, BOOL] -> BOOL, PRIO_ZERO, CMPGTTS, Slot;
    "Timestamp greater-or-equal."
    CmpGeTs: "cmpge.ts", [TIME, TIME, BOOL] -> BOOL, PRIO_ZERO, CMPGETS, Slot;
    "Timestamp less-than an immediate."
    CmpLtImmTs: "cmplt.imm.ts", [TIME, BOOL] -> BOOL, PRIO_ZERO, CMPLTIMMTS, I64;
    "Timestamp less-or-equal an immediate."
    CmpLeImmTs: "cmple.imm.ts", [TIME, BOOL] -> BOOL, PRIO_ZERO, CMPLEIMMTS, I64;
    "Timestamp greater-than an immediate."
    CmpGtImmTs: "cmpgt.imm.ts", [TIME, BOOL] -> BOOL, PRIO_ZERO, CMPGTIMMTS, I64;
    "Timestamp greater-or-equal an immediate."
    CmpGeImmTs: "cmpge.imm.ts", [TIME, BOOL] -> BOOL, PRIO_ZERO, CMPGEIMMTS, I64;
    "Structural value equality."
    CmpEqV: "cmpeq.v", [VALUE, VALUE, BOOL] -> BOOL, PRIO_ZERO, CMPEQV, Slot;
    "Structural equality against an encoded literal."
    CmpEqImmV: "cmpeq.imm.v", [VALUE, BOOL] -> BOOL, PRIO_ZERO, CMPEQIMMV, LitRef;

    "String starts with a literal."
    HasPrefix: "hasprefix", [STRING, BOOL] -> BOOL, PRIO_ZERO, HASPREFIX, Dict;
    "Case-insensitive hasprefix."
    HasPrefixCi: "hasprefix.ci", [STRING, BOOL] -> BOOL, PRIO_ZERO, HASPREFIXCI, Dict;
    "String ends with a literal."
    HasSuffix: "hassuffix", [STRING, BOOL] -> BOOL, PRIO_ZERO, HASSUFFIX, Dict;
    "Case-insensitive hassuffix."
    HasSuffixCi: "hassuffix.ci", [STRING, BOOL] -> BOOL, PRIO_ZERO, HASSUFFIXCI, Dict;
    "String contains a literal."
    Contains: "contains", [STRING, BOOL] -> BOOL, PRIO_ZERO, CONTAINSSTR, Dict;
    "Case-insensitive contains."
    ContainsCi: "contains.ci", [STRING, BOOL] -> BOOL, PRIO_ZERO, CONTAINSSTRCI, Dict;
    "String matches a compiled wildcard pattern."
    MatchPat: "matchpat", [STRING, BOOL] -> BOOL, PRIO_ZERO, MATCHPAT, LitRef;
    "Case-insensitive matchpat."
    MatchPatCi: "matchpat.ci", [STRING, BOOL] -> BOOL, PRIO_ZERO, MATCHPATCI, LitRef;

    "Lowercase."
    LowerStr: "lower", [STRING, BOOL] -> STRING, PRIO_ZERO, LOWERSTR, None;
    "Uppercase."
    UpperStr: "upper", [STRING, BOOL] -> STRING, PRIO_ZERO, UPPERSTR, None;
    "Strip leading whitespace."
    LtrimStr: "ltrim", [STRING, BOOL] -> STRING, PRIO_ZERO, LTRIMSTR, None;
    "Strip trailing whitespace."
    RtrimStr: "rtrim", [STRING, BOOL] -> STRING, PRIO_ZERO, RTRIMSTR, None;
    "Strip whitespace on both ends."
    TrimStr: "trim", [STRING, BOOL] -> STRING, PRIO_ZERO, TRIMSTR, None;
    "Character count."
    CharLen: "charlen", [STRING, BOOL] -> INT, PRIO_ZERO, CHARLEN, None;
    "Byte count."
    OctetLen: "octetlen", [STRING, BOOL] -> INT, PRIO_ZERO, OCTETLEN, None;
    "Substring by start and length."
    SubStr: "substr", [STRING, INT, INT, BOOL] -> STRING, PRIO_ZERO, SUBSTR, Slot2,
        emit: emit_trailing_slots;
    "Delimited field by index; narrows to lanes with enough fields."
    SplitPart: "splitpart", [STRING, INT, BOOL] -> STRING_MASKED, PRIO_ZERO,
        SPLITPART, DictSlot, emit: emit_splitpart;
    "Concatenation of all string parts; narrows to fully-defined lanes."
    ConcatStr: "concat.str", [STRING, BOOL] [STRING, BOOL] -> STRING_MASKED,
        PRIO_ZERO, CONCATSTR, Var, emit: emit_concat;

    "Difference in whole microseconds."
    DateDiffUs: "datediff.us", [TIME, TIME, BOOL] -> INT, PRIO_ZERO, DATEDIFFUS, Slot;
    "Difference in whole months."
    DateDiffMonth: "datediff.month", [TIME, TIME, BOOL] -> INT, PRIO_ZERO, DATEDIFFMONTH, Slot;
    "Difference in whole years."
    DateDiffYear: "datediff.year", [TIME, TIME, BOOL] -> INT, PRIO_ZERO, DATEDIFFYEAR, Slot;
    "Difference in whole quarters."
    DateDiffQuarter: "datediff.quarter", [TIME, TIME, BOOL] -> INT, PRIO_ZERO, DATEDIFFQUARTER, Slot;
    "Add microseconds."
    DateAddUs: "dateadd.us", [TIME, INT, BOOL] -> TIME, PRIO_ZERO, DATEADDUS, Slot;
    "Add immediate microseconds."
    DateAddUsImm: "dateadd.imm.us", [TIME, BOOL] -> TIME, PRIO_ZERO, DATEADDUSIMM, I64;
    "Add calendar months."
    DateAddMonth: "dateadd.month", [TIME, INT, BOOL] -> TIME, PRIO_ZERO, DATEADDMONTH, Slot;
    "Add immediate calendar months."
    DateAddMonthImm: "dateadd.imm.month", [TIME, BOOL] -> TIME, PRIO_ZERO, DATEADDMONTHIMM, I64;
    "Extract the year."
    ExtractYear: "extract.year", [TIME, BOOL] -> INT, PRIO_ZERO, EXTRACTYEAR, None;
    "Extract the month."
    ExtractMonth: "extract.month", [TIME, BOOL] -> INT, PRIO_ZERO, EXTRACTMONTH, None;
    "Extract the day of month."
    ExtractDay: "extract.day", [TIME, BOOL] -> INT, PRIO_ZERO, EXTRACTDAY, None;
    "Extract the hour."
    ExtractHour: "extract.hour", [TIME, BOOL] -> INT, PRIO_ZERO, EXTRACTHOUR, None;
    "Extract the minute."
    ExtractMinute: "extract.minute", [TIME, BOOL] -> INT, PRIO_ZERO, EXTRACTMINUTE, None;
    "Extract the second."
    ExtractSecond: "extract.second", [TIME, BOOL] -> INT, PRIO_ZERO, EXTRACTSECOND, None;
    "Extract the microsecond."
    ExtractMicro: "extract.micro", [TIME, BOOL] -> INT, PRIO_ZERO, EXTRACTMICRO, None;
    "Truncate to year start."
    TruncYear: "datetrunc.year", [TIME, BOOL] -> TIME, PRIO_ZERO, TRUNCYEAR, None;
    "Truncate to quarter start."
    TruncQuarter: "datetrunc.quarter", [TIME, BOOL] -> TIME, PRIO_ZERO, TRUNCQUARTER, None;
    "Truncate to month start."
    TruncMonth: "datetrunc.month", [TIME, BOOL] -> TIME, PRIO_ZERO, TRUNCMONTH, None;
    "Truncate to day start."
    TruncDay: "datetrunc.day", [TIME, BOOL] -> TIME, PRIO_ZERO, TRUNCDAY, None;
    "Truncate to hour start."
    TruncHour: "datetrunc.hour", [TIME, BOOL] -> TIME, PRIO_ZERO, TRUNCHOUR, None;
    "Truncate to minute start."
    TruncMinute: "datetrunc.minute", [TIME, BOOL] -> TIME, PRIO_ZERO, TRUNCMINUTE, None;
    "Truncate to second start."
    TruncSecond: "datetrunc.second", [TIME, BOOL] -> TIME, PRIO_ZERO, TRUNCSECOND, None;
    "Timestamp as microseconds since the epoch."
    UnixMicros: "unixmicros", [TIME, BOOL] -> INT, PRIO_ZERO, UNIXMICROS, None;
    "Microseconds since the epoch as a timestamp."
    TsFromMicros: "ts.frommicros", [INT, BOOL] -> TIME, PRIO_ZERO, TSFROMMICROS, None;

    "Geohash of (lat, lon) at a precision."
    GeoHash: "geohash", [FLOAT, FLOAT, INT, BOOL] -> STRING, PRIO_ZERO, GEOHASH, Slot2,
        emit: emit_trailing_slots;
    "Web-mercator tile X of a longitude at a zoom."
    GeoTileX: "geotilex", [FLOAT, INT, BOOL] -> INT, PRIO_ZERO, GEOTILEX, Slot;
    "Web-mercator tile Y of a latitude at a zoom."
    GeoTileY: "geotiley", [FLOAT, INT, BOOL] -> INT, PRIO_ZERO, GEOTILEY, Slot;
    "Great-circle distance between two coordinates, in meters."
    GeoDistance: "geodistance", [FLOAT, FLOAT, FLOAT, FLOAT, BOOL] -> FLOAT,
        PRIO_ZERO, GEODISTANCE, Slot3, emit: emit_trailing_slots;

    "Box integers into scratch."
    BoxInt: "box.i", [INT, BOOL] -> VALUE, PRIO_ZERO, BOXINT, None,
        flags: SCRATCH | SAFE_VALUE_MASK;
    "Box floats into scratch."
    BoxFloat: "box.f", [FLOAT, BOOL] -> VALUE, PRIO_ZERO, BOXFLOAT, None,
        flags: SCRATCH | SAFE_VALUE_MASK;
    "Box strings into scratch."
    BoxStr: "box.str", [STRING, BOOL] -> VALUE, PRIO_ZERO, BOXSTR, None,
        flags: SCRATCH | SAFE_VALUE_MASK;
    "Box timestamps into scratch."
    BoxTs: "box.ts", [TIME, BOOL] -> VALUE, PRIO_ZERO, BOXTS, None,
        flags: SCRATCH | SAFE_VALUE_MASK;
    "Box lists into scratch."
    BoxList: "box.list", [LIST, BOOL] -> VALUE, PRIO_ZERO, BOXLIST, None,
        flags: SCRATCH | SAFE_VALUE_MASK;
    "Box a mask as boolean values under a validity mask."
    BoxMask: "boxmask", [BOOL, BOOL] -> VALUE, PRIO_ZERO, BOXMASK, Slot,
        flags: SCRATCH | SAFE_VALUE_MASK, emit: emit_boxmask;
    "Assemble a list value from (value, mask) parts."
    MakeList: "makelist", [BOOL] [VALUE, BOOL] -> VALUE_MASKED, PRIO_ZERO, MAKELIST, Var,
        flags: SCRATCH | DISJUNCTIVE | SAFE_VALUE_MASK, emit: emit_makelist;
    "Assemble a structure value from named (value, mask) parts."
    MakeStruct: "makestruct", [BOOL] [VALUE, BOOL] -> VALUE_MASKED, PRIO_ZERO, MAKESTRUCT, Var,
        flags: SCRATCH | DISJUNCTIVE | SAFE_VALUE_MASK, emit: emit_makestruct;
    "Values from the second arm where its mask holds, else the first."
    BlendV: "blend.v", [VALUE, VALUE, BOOL] -> VALUE_MASKED, PRIO_ZERO, BLENDV, Slot,
        flags: DISJUNCTIVE, emit: emit_blend;
    "Integers from the second arm where its mask holds, else the first."
    BlendI: "blend.i", [INT, INT, BOOL] -> INT_MASKED, PRIO_ZERO, BLENDS, Slot,
        flags: DISJUNCTIVE, emit: emit_blend;
    "Floats from the second arm where its mask holds, else the first."
    BlendF: "blend.f", [FLOAT, FLOAT, BOOL] -> FLOAT_MASKED, PRIO_ZERO, BLENDS, Slot,
        flags: DISJUNCTIVE, emit: emit_blend;
    "Strings from the second arm where its mask holds, else the first."
    BlendStr: "blend.str", [STRING, STRING, BOOL] -> STRING_MASKED, PRIO_ZERO, BLENDS, Slot,
        flags: DISJUNCTIVE, emit: emit_blend;

    "Wide hash of a boxed value."
    HashValue: "hashvalue", [VALUE, BOOL] -> HASH, PRIO_HASH, HASHVALUE, Slot,
        emit: emit_hashvalue;
    "Mix a further value into an existing hash."
    HashValuePlus: "hashvalue+", [HASH, VALUE, BOOL] -> HASH, PRIO_HASH, HASHVALUEPLUS, Slot2,
        emit: emit_hashvalueplus;
    "Membership of the hash in a compiled tree."
    HashMember: "hashmember", [HASH, BOOL] -> BOOL, PRIO_ZERO, HASHMEMBER, Tree,
        emit: emit_tree_imm;
    "Tree-mapped replacement value; narrows to mapped lanes."
    HashLookup: "hashlookup", [HASH, BOOL] -> VALUE_MASKED, PRIO_ZERO, HASHLOOKUP, Tree,
        flags: SAFE_VALUE_MASK, emit: emit_tree_imm;
    "Per-group state displacement for grouped aggregation."
    AggBucket: "aggbucket", [HASH, BOOL] -> BUCKET, PRIO_HASH, AGGBUCKET, Tree,
        emit: emit_tree_imm;

    "Accumulate an integer sum."
    AggSumI: "aggsum.i", [MEM, INT, BOOL] -> MEM, PRIO_MEM, AGGSUMI, AggSlot;
    "Accumulate a float sum."
    AggSumF: "aggsum.f", [MEM, FLOAT, BOOL] -> MEM, PRIO_MEM, AGGSUMF, AggSlot;
    "Accumulate integer mean state."
    AggAvgI: "aggavg.i", [MEM, INT, BOOL] -> MEM, PRIO_MEM, AGGAVGI, AggSlot;
    "Accumulate float mean state."
    AggAvgF: "aggavg.f", [MEM, FLOAT, BOOL] -> MEM, PRIO_MEM, AGGAVGF, AggSlot;
    "Accumulate an integer minimum."
    AggMinI: "aggmin.i", [MEM, INT, BOOL] -> MEM, PRIO_MEM, AGGMINI, AggSlot;
    "Accumulate a float minimum."
    AggMinF: "aggmin.f", [MEM, FLOAT, BOOL] -> MEM, PRIO_MEM, AGGMINF, AggSlot;
    "Accumulate an integer maximum."
    AggMaxI: "aggmax.i", [MEM, INT, BOOL] -> MEM, PRIO_MEM, AGGMAXI, AggSlot;
    "Accumulate a float maximum."
    AggMaxF: "aggmax.f", [MEM, FLOAT, BOOL] -> MEM, PRIO_MEM, AGGMAXF, AggSlot;
    "Accumulate a bitwise AND."
    AggAndI: "aggand.i", [MEM, INT, BOOL] -> MEM, PRIO_MEM, AGGANDI, AggSlot;
    "Accumulate a bitwise OR."
    AggOrI: "aggor.i", [MEM, INT, BOOL] -> MEM, PRIO_MEM, AGGORI, AggSlot;
    "Accumulate a bitwise XOR."
    AggXorI: "aggxor.i", [MEM, INT, BOOL] -> MEM, PRIO_MEM, AGGXORI, AggSlot;
    "Count selected lanes."
    AggCount: "aggcount", [MEM, BOOL] -> MEM, PRIO_MEM, AGGCOUNT, AggSlot;
    "Keep the earliest timestamp."
    AggMinTs: "aggmin.ts", [MEM, TIME, BOOL] -> MEM, PRIO_MEM, AGGMINTS, AggSlot;
    "Keep the latest timestamp."
    AggMaxTs: "aggmax.ts", [MEM, TIME, BOOL] -> MEM, PRIO_MEM, AGGMAXTS, AggSlot;
    "Fold hashes into a HyperLogLog state."
    AggApproxCount: "aggapproxcount", [MEM, HASH, BOOL] -> MEM, PRIO_MEM,
        AGGAPPROXCOUNT, AggPrec;

    "Grouped integer sum."
    AggSlotSumI: "aggslotsum.i", [MEM, BUCKET, INT, BOOL] -> MEM, PRIO_MEM, AGGSLOTSUMI, AggSlot;
    "Grouped float sum."
    AggSlotSumF: "aggslotsum.f", [MEM, BUCKET, FLOAT, BOOL] -> MEM, PRIO_MEM, AGGSLOTSUMF, AggSlot;
    "Grouped integer mean state."
    AggSlotAvgI: "aggslotavg.i", [MEM, BUCKET, INT, BOOL] -> MEM, PRIO_MEM, AGGSLOTAVGI, AggSlot;
    "Grouped float mean state."
    AggSlotAvgF: "aggslotavg.f", [MEM, BUCKET, FLOAT, BOOL] -> MEM, PRIO_MEM, AGGSLOTAVGF, AggSlot;
    "Grouped integer minimum."
    AggSlotMinI: "aggslotmin.i", [MEM, BUCKET, INT, BOOL] -> MEM, PRIO_MEM, AGGSLOTMINI, AggSlot;
    "Grouped float minimum."
    AggSlotMinF: "aggslotmin.f", [MEM, BUCKET, FLOAT, BOOL] -> MEM, PRIO_MEM, AGGSLOTMINF, AggSlot;
    "Grouped integer maximum."
    AggSlotMaxI: "aggslotmax.i", [MEM, BUCKET, INT, BOOL] -> MEM, PRIO_MEM, AGGSLOTMAXI, AggSlot;
    "Grouped float maximum."
    AggSlotMaxF: "aggslotmax.f", [MEM, BUCKET, FLOAT, BOOL] -> MEM, PRIO_MEM, AGGSLOTMAXF, AggSlot;
    "Grouped bitwise AND."
    AggSlotAndI: "aggslotand.i", [MEM, BUCKET, INT, BOOL] -> MEM, PRIO_MEM, AGGSLOTANDI, AggSlot;
    "Grouped bitwise OR."
    AggSlotOrI: "aggslotor.i", [MEM, BUCKET, INT, BOOL] -> MEM, PRIO_MEM, AGGSLOTORI, AggSlot;
    "Grouped bitwise XOR."
    AggSlotXorI: "aggslotxor.i", [MEM, BUCKET, INT, BOOL] -> MEM, PRIO_MEM, AGGSLOTXORI, AggSlot;
    "Grouped lane count."
    AggSlotCount: "aggslotcount", [MEM, BUCKET, BOOL] -> MEM, PRIO_MEM, AGGSLOTCOUNT, AggSlot;
    "Grouped earliest timestamp."
    AggSlotMinTs: "aggslotmin.ts", [MEM, BUCKET, TIME, BOOL] -> MEM, PRIO_MEM, AGGSLOTMINTS, AggSlot;
    "Grouped latest timestamp."
    AggSlotMaxTs: "aggslotmax.ts", [MEM, BUCKET, TIME, BOOL] -> MEM, PRIO_MEM, AGGSLOTMAXTS, AggSlot;
    "Grouped HyperLogLog fold."
    AggSlotApproxCount: "aggslotapproxcount", [MEM, BUCKET, HASH, BOOL] -> MEM, PRIO_MEM,
        AGGSLOTAPPROXCOUNT, AggPrec;
}

impl Op {
    /// The op mnemonic.
    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// The op's return type bitset.
    pub fn ret_type(self) -> TypeSet {
        self.info().ret
    }

    /// The op's schedule priority.
    pub fn priority(self) -> i32 {
        self.info().prio
    }

    /// Whether the result is meaningful when the canonical mask is false.
    pub fn is_disjunctive(self) -> bool {
        self.info().flags.contains(OpFlags::DISJUNCTIVE)
    }

    /// Whether this op terminates a program.
    pub fn is_return(self) -> bool {
        self.info().flags.contains(OpFlags::RETURN_OP)
    }

    /// Whether this op boxes output into scratch.
    pub fn uses_scratch(self) -> bool {
        self.info().flags.contains(OpFlags::SCRATCH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn names_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for op in Op::iter() {
            assert!(seen.insert(op.name()), "duplicate {}", op.name());
        }
    }

    #[test]
    fn fixed_args_put_the_mask_last() {
        // once a bool argument appears, everything after it is a bool too,
        // so the canonical mask is always the trailing argument
        for op in Op::iter() {
            let info = op.info();
            let mut saw_bool = false;
            for arg in info.args {
                if saw_bool {
                    assert_eq!(*arg, TypeSet::BOOL, "{}: non-bool after mask", op.name());
                }
                saw_bool |= *arg == TypeSet::BOOL;
            }
        }
    }

    #[test]
    fn return_ops_are_disjunctive() {
        for op in Op::iter() {
            if op.is_return() {
                assert!(op.is_disjunctive(), "{}", op.name());
            }
        }
    }

    #[test]
    fn slot_format_ops_have_a_bytecode_mapping() {
        for op in Op::iter() {
            let info = op.info();
            if info.emit.is_none() {
                assert!(info.bc.is_some(), "{} needs an opcode or an emitter", op.name());
            }
        }
    }
}
