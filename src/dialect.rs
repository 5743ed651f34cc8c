//! The two coexisting HLDSL dialects (spec §9).
//!
//! Variant A (`scent` header) uses single-op dictionary construction for
//! ream/stroke, permits ArtBox and TrimBox simultaneously, and keeps
//! synthetic fonts. Variant B (`scent-embed` header) uses accumulator-based
//! construction, allows only one of ArtBox/TrimBox, drops synthetic fonts,
//! and adds `sep`/`concat`/`draw_embed`. An operation from the wrong
//! dialect is a `StateError`, raised at the call site, not at parse time.

use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Dialect {
    /// `scent` header token: Dialect A, single-op construction.
    VariantA,
    /// `scent-embed` header token: Dialect B, accumulator-based construction.
    VariantB,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::VariantA => write!(f, "scent"),
            Dialect::VariantB => write!(f, "scent-embed"),
        }
    }
}
