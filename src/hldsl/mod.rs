//! HLDSL: entity tokeniser, namespace, stack, accumulator-based builders,
//! operation dispatch and the evaluator that ties them together, plus the
//! lowering layer that turns drawing operations into LLIL instructions.

pub mod builder;
pub mod eval;
pub mod lower;
pub mod namespace;
pub mod ops;
pub mod stack;
pub mod token;

pub use eval::{peek_dialect, Evaluator};
