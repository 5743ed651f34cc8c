//! LLIL: the low-level, line-oriented instruction language a page program
//! lowers to. A layered state machine (`state`) validates instruction
//! order; `token`/`processor` parse the text wire format and dispatch
//! validated instructions to a `pdf::PdfSink`.

pub mod ops;
pub mod processor;
pub mod state;
pub mod token;

pub use processor::{run_document, Processor};
