//! SSA compiler for the sift lane-parallel VM.
//!
//! The compiler turns a relational expression — built through [`Program`]'s
//! typed constructors — into a linear bytecode program for the 16-lane
//! interpreter. The pipeline:
//!
//! ```text
//! Program::begin() .. ret_*()   build the value-numbered SSA graph
//! Program::optimize()           false propagation, access ordering,
//!                               mask hoisting, to a fixed point
//! Program::symbolize(table)     clone + rewrite field names to ids
//! Program::compile()            schedule, allocate registers, emit
//! ```
//!
//! Every value carries sixteen lanes and a validity mask; MISSING is
//! threaded through all operators as three-valued logic. The compiled
//! artifact is immutable and may be executed by any number of workers,
//! each holding only its own spill stacks and scratch page.

#![warn(missing_docs)]

mod display;
mod emit;
mod error;
mod hll;
mod optimize;
mod program;
mod radix;
mod regalloc;
mod schedule;
pub mod ssa;
mod symbolize;

pub use emit::{CompiledProgram, Emitter, PAGE_SIZE};
pub use error::CompileError;
pub use hll::{HllError, HllState, MAX_PRECISION, MIN_PRECISION};
pub use program::{
    wide_hash, AggHandle, CmpOp, DatePart, DateUnit, NumOp, Program, MAX_PATTERN_SEGMENTS,
};
pub use radix::{HashTree, TreeId};
