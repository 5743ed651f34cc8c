//! Font object: built-in, external file, or synthetic (derived) font. Stays
//! a thin description; actual glyph/metric loading happens once in the font
//! loader resource table (`pdf::font_loader`), not per `Font` value.

use std::rc::Rc;

use crate::error::Error;
use crate::fixed::FixedPoint;
use crate::validate::validate_builtin_font_name;

/// Per-alteration overrides a synthetic font may apply. Each is
/// independently optional.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Alterations {
    pub h_scale: Option<FixedPoint>,
    pub oblique: Option<bool>,
    pub boldness: Option<FixedPoint>,
    pub small_caps: Option<bool>,
    pub char_spacing: Option<FixedPoint>,
}

impl Alterations {
    /// Merge `derived` over `self`: a defined field on `derived` wins,
    /// otherwise the field is inherited from `self` (the immediate base).
    fn merged_with(self, derived: Alterations) -> Alterations {
        Alterations {
            h_scale: derived.h_scale.or(self.h_scale),
            oblique: derived.oblique.or(self.oblique),
            boldness: derived.boldness.or(self.boldness),
            small_caps: derived.small_caps.or(self.small_caps),
            char_spacing: derived.char_spacing.or(self.char_spacing),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Font {
    BuiltIn { name: Rc<str> },
    File { path: Rc<str>, assigned_name: Rc<str> },
    /// Always wraps a non-synthetic base: nested synthetic-of-synthetic
    /// derivations collapse into this single override layer (see
    /// `derive_synthetic`).
    Synthetic { base: Rc<Font>, alterations: Alterations },
}

impl Font {
    pub fn new_builtin(name: &str) -> Result<Self, Error> {
        validate_builtin_font_name(name)?;
        Ok(Font::BuiltIn { name: Rc::from(name) })
    }

    pub fn new_file(path: &str, assigned_name: &str) -> Self {
        Font::File { path: Rc::from(path), assigned_name: Rc::from(assigned_name) }
    }
}

/// Builds a synthetic font over `existing`, collapsing any pre-existing
/// synthetic layer into one: the derived alterations win field-by-field,
/// undefined fields inherit from the immediate base (spec §9).
pub fn derive_synthetic(existing: &Font, new_alterations: Alterations) -> Font {
    match existing {
        Font::Synthetic { base, alterations } => {
            Font::Synthetic { base: base.clone(), alterations: alterations.merged_with(new_alterations) }
        }
        other => Font::Synthetic { base: Rc::new(other.clone()), alterations: new_alterations },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_font_name_validated() {
        assert!(Font::new_builtin("Helvetica").is_ok());
        assert!(Font::new_builtin("ComicSans").is_err());
    }

    #[test]
    fn synthetic_chain_collapses_to_one_layer() {
        let base = Font::new_builtin("Times-Roman").unwrap();
        let layer1 = derive_synthetic(
            &base,
            Alterations { h_scale: Some(FixedPoint::parse("1.2").unwrap()), ..Default::default() },
        );
        let layer2 = derive_synthetic(
            &layer1,
            Alterations { oblique: Some(true), ..Default::default() },
        );

        match layer2 {
            Font::Synthetic { base: ref b, alterations } => {
                assert_eq!(**b, base);
                // derived field wins
                assert_eq!(alterations.oblique, Some(true));
                // inherited from the immediate base layer
                assert_eq!(alterations.h_scale, Some(FixedPoint::parse("1.2").unwrap()));
            }
            _ => panic!("expected Synthetic"),
        }
    }

    #[test]
    fn derived_field_overrides_inherited() {
        let base = Font::new_builtin("Helvetica").unwrap();
        let layer1 = derive_synthetic(
            &base,
            Alterations { boldness: Some(FixedPoint::parse("0.5").unwrap()), ..Default::default() },
        );
        let layer2 = derive_synthetic(
            &layer1,
            Alterations { boldness: Some(FixedPoint::parse("1.0").unwrap()), ..Default::default() },
        );
        match layer2 {
            Font::Synthetic { alterations, .. } => {
                assert_eq!(alterations.boldness, Some(FixedPoint::parse("1.0").unwrap()));
            }
            _ => panic!("expected Synthetic"),
        }
    }
}
