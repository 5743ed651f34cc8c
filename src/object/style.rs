//! Style object: the text-painting attributes attached to a column span.
//! Grounded in the teacher's `graphics::ExtendedGraphicsState` (character
//! spacing, word spacing, horizontal scale, rise — the same fields PDF's
//! text-state operators expose) narrowed to the fields the language binds
//! per span rather than per graphics state.

use std::rc::Rc;

use crate::error::Error;
use crate::fixed::FixedPoint;
use crate::object::color::Cmyk;
use crate::object::font::Font;

#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub font: Rc<Font>,
    pub size: FixedPoint,
    pub char_space: FixedPoint,
    pub word_space: FixedPoint,
    pub rise: FixedPoint,
    pub h_scale: FixedPoint,
    pub stroke: Option<Cmyk>,
    pub fill: Option<Cmyk>,
}

pub fn validate_style(style: &Style) -> Result<(), Error> {
    if !style.size.is_positive() {
        return Err(Error::domain("style size must be > 0"));
    }
    if !style.char_space.is_non_negative() {
        return Err(Error::domain("style charSpace must be >= 0"));
    }
    if !style.word_space.is_non_negative() {
        return Err(Error::domain("style wordSpace must be >= 0"));
    }
    if !style.h_scale.is_positive() {
        return Err(Error::domain("style hScale must be > 0"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(s: &str) -> FixedPoint {
        FixedPoint::parse(s).unwrap()
    }

    fn base_style() -> Style {
        Style {
            font: Rc::new(Font::new_builtin("Helvetica").unwrap()),
            size: fp("12"),
            char_space: fp("0"),
            word_space: fp("0"),
            rise: fp("0"),
            h_scale: fp("1"),
            stroke: None,
            fill: Some(Cmyk::new(0, 0, 0, 255)),
        }
    }

    #[test]
    fn valid_style_passes() {
        assert!(validate_style(&base_style()).is_ok());
    }

    #[test]
    fn zero_size_rejected() {
        let mut s = base_style();
        s.size = fp("0");
        assert!(validate_style(&s).is_err());
    }

    #[test]
    fn negative_char_space_rejected() {
        let mut s = base_style();
        s.char_space = fp("-1");
        assert!(validate_style(&s).is_err());
    }

    #[test]
    fn zero_h_scale_rejected() {
        let mut s = base_style();
        s.h_scale = fp("0");
        assert!(validate_style(&s).is_err());
    }
}
