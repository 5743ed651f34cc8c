//! A compiler from two small page-description languages to PDF bytes.
//!
//! HLDSL (`hldsl`) is the stack-based, entity-oriented surface language —
//! two dialects, `scent` and `scent-embed`, selected by the program's
//! header. It lowers to LLIL (`llil`), a line-oriented low-level
//! instruction language that drives the PDF writer (`pdf`) directly and can
//! also be written and run on its own.
//!
//! [`compile_hldsl`] and [`compile_llil`] are the two entry points; the
//! evaluator, processor, and object builders underneath are also public for
//! embedding a partial pipeline (parse HLDSL, inspect or rewrite the
//! lowered instructions, then hand them to a custom `PdfSink`).

pub mod atom;
pub mod constants;
pub mod dialect;
pub mod error;
pub mod fixed;
mod font;
pub mod hldsl;
pub mod llil;
pub mod object;
pub mod pdf;
pub mod validate;
pub mod value;

pub use dialect::Dialect;
pub use error::{Error, LlilError};
pub use hldsl::Evaluator;
pub use llil::Processor;

use pdf::{LopdfWriter, PdfSink};

/// Compiles a complete HLDSL program to PDF bytes.
///
/// The program's own header declares its dialect; `dialect_hint`, when
/// given, is checked against that declaration and rejected with a state
/// error rather than silently overridden. The header stays authoritative,
/// the hint is only a caller-side sanity check (catching, say, a build
/// pipeline that fed a `scent-embed` fragment down a `scent`-only path).
pub fn compile_hldsl(source: &str, dialect_hint: Option<Dialect>) -> Result<Vec<u8>, Error> {
    if let Some(hint) = dialect_hint {
        let declared = hldsl::peek_dialect(source)?;
        if declared != hint {
            return Err(Error::state(format!(
                "program declared dialect {} but caller expected {}",
                declared, hint
            )));
        }
    }
    let mut writer = LopdfWriter::new();
    Evaluator::run(source, &mut writer)?;
    Box::new(writer).finish()
}

/// Compiles a complete LLIL program to PDF bytes.
pub fn compile_llil(source: &str) -> Result<Vec<u8>, Error> {
    let mut writer = LopdfWriter::new();
    llil::run_document(source, &mut writer)?;
    Box::new(writer).finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_hldsl_rejects_dialect_mismatch() {
        let source = "<% scent 1.0 %>";
        let err = compile_hldsl(source, Some(Dialect::VariantB)).unwrap_err();
        assert_eq!(err.kind(), "StateError");
    }
}
