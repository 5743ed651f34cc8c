//! End-to-end coverage of the two public entry points, against raw source
//! text rather than the evaluator/processor internals exercised by the
//! inline unit tests.

use scent::{compile_hldsl, compile_llil, Dialect};

fn is_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF-")
}

#[test]
fn compile_hldsl_empty_variant_a_program() {
    let bytes = compile_hldsl("<% scent 1.0 %>\n%EOF%\n", None).unwrap();
    assert!(is_pdf(&bytes));
}

#[test]
fn compile_hldsl_matches_correct_dialect_hint() {
    let bytes = compile_hldsl("<% scent 1.0 %>\n%EOF%\n", Some(Dialect::VariantA)).unwrap();
    assert!(is_pdf(&bytes));
}

#[test]
fn compile_hldsl_variant_b_requires_its_bound_and_body_metas() {
    let source = "<% scent-embed 1.0 %>\n\
                  <% bound-x 0 %>\n\
                  <% bound-y 0 %>\n\
                  <% bound-w 100 %>\n\
                  <% bound-h 100 %>\n\
                  <% body %>\n\
                  %EOF%\n";
    let bytes = compile_hldsl(source, Some(Dialect::VariantB)).unwrap();
    assert!(is_pdf(&bytes));
}

#[test]
fn compile_hldsl_wrong_dialect_hint_is_rejected() {
    let err = compile_hldsl("<% scent 1.0 %>\n%EOF%\n", Some(Dialect::VariantB)).unwrap_err();
    assert_eq!(err.kind(), "StateError");
}

fn minimal_llil_page() -> &'static str {
    "scent-assembly 1.0\n\
     FontStandard \"Helvetica\"\n\
     BeginPage\n\
     Dim 612 792\n\
     Body\n\
     BeginPath true false false false\n\
     Move 0 0\n\
     Line 100 0\n\
     EndPath\n\
     EndPage\n"
}

#[test]
fn compile_llil_minimal_page() {
    let bytes = compile_llil(minimal_llil_page()).unwrap();
    assert!(is_pdf(&bytes));
}

/// S5: a `Write` with no font selected at the current frame depth is a
/// `StateError`, annotated with the offending line.
#[test]
fn compile_llil_write_without_font_is_rejected() {
    let source = "scent-assembly 1.0\n\
                  BeginPage\n\
                  Dim 100 100\n\
                  Body\n\
                  BeginText false\n\
                  Write \"Hello\"\n\
                  EndText\n\
                  EndPage\n";
    let err = compile_llil(source).unwrap_err();
    assert_eq!(err.kind(), "StateError");
}

/// S7: a font selected, overridden inside a `Save`/`Restore` pair, is active
/// again for a `Write` after `Restore`.
#[test]
fn compile_llil_restore_reverts_active_font() {
    let source = "scent-assembly 1.0\n\
                  FontStandard \"Helvetica\"\n\
                  FontStandard \"Times-Roman\"\n\
                  BeginPage\n\
                  Dim 100 100\n\
                  Body\n\
                  BeginText false\n\
                  Font \"Helvetica\" 12\n\
                  Save\n\
                  Font \"Times-Roman\" 14\n\
                  Restore\n\
                  Write \"x\"\n\
                  EndText\n\
                  EndPage\n";
    let bytes = compile_llil(source).unwrap();
    assert!(is_pdf(&bytes));
}
