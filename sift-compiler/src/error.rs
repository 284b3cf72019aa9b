//! Compile-time error variants.

use thiserror::Error;

/// Errors surfaced by [`crate::Program::compile`] and
/// [`crate::Program::symbolize`].
///
/// Type errors are detected eagerly while the program is built: the
/// offending value's op becomes `invalid` and carries the diagnostic in its
/// immediate. `compile` aggregates those into [`CompileError::IllTypedSsa`],
/// reporting the first offender and how many more there are.
#[derive(Debug, Error)]
pub enum CompileError {
    /// An argument did not match its op's declared type.
    #[error("ill-typed ssa: {detail} (and {extra} more)")]
    IllTypedSsa {
        /// The first offending value's diagnostic, which names the source
        /// op and the unsatisfied constraint.
        detail: String,
        /// Count of additional ill-typed values.
        extra: usize,
    },
    /// The boxed-output estimate does not fit one scratch page alongside
    /// the literal pool.
    #[error("scratch buffer too small: {need} bytes exceed the {max}-byte page")]
    ScratchTooSmall {
        /// Bytes the program may box per invocation.
        need: usize,
        /// Bytes one scratch page offers.
        max: usize,
    },
    /// The literal pool outgrew the scratch page.
    #[error("literal buffer too large: {need} bytes exceed the {max}-byte page")]
    LiteralTooLarge {
        /// Bytes the pool requires.
        need: usize,
        /// Bytes one scratch page offers.
        max: usize,
    },
    /// A resolved symbol id cannot be carried in an immediate.
    #[error("symbol id {0} exceeds the immediate maximum")]
    SymbolTooLarge(u32),
    /// An op writes boxed output but its emitter declares no scratch cost.
    #[error("scratch not handled in emitter for `{0}`")]
    ScratchNotHandled(&'static str),
    /// The program was finalized without a return value.
    #[error("program has no return value")]
    NoReturn,
    /// The program references record fields but was never symbolized.
    #[error("program must be symbolized before compilation")]
    NotSymbolized,
}
