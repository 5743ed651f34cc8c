//! Stroke object: colour, width, cap/join style, miter limit, dash pattern.
//! Grounded in the teacher's `graphics::LineCapStyle`/`LineJoinStyle`/
//! `LineDashPattern` (`line_cap.rs`/`graphics.rs`), which already encode the
//! exact PDF `J`/`j`/`d` operator argument mapping this object lowers to.

use crate::dialect::Dialect;
use crate::error::Error;
use crate::fixed::FixedPoint;
use crate::object::color::Cmyk;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

impl LineCap {
    /// PDF `J` operator integer encoding.
    pub fn pdf_code(self) -> i64 {
        match self {
            LineCap::Butt => 0,
            LineCap::Round => 1,
            LineCap::Square => 2,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

impl LineJoin {
    /// PDF `j` operator integer encoding.
    pub fn pdf_code(self) -> i64 {
        match self {
            LineJoin::Miter => 0,
            LineJoin::Round => 1,
            LineJoin::Bevel => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashPattern {
    /// Alternating dash/gap lengths, each > 0.
    pub array: Vec<FixedPoint>,
    pub phase: FixedPoint,
}

/// Validates a dash array's length/shape. Variant A alone permits the
/// single-element form (spec §9 Open Question 2); Variant B requires an
/// even count of at least two elements.
pub fn validate_dash_array(dialect: Dialect, array: &[FixedPoint]) -> Result<(), Error> {
    for v in array {
        if !v.is_positive() {
            return Err(Error::domain("dash pattern elements must each be > 0"));
        }
    }
    match array.len() {
        0 => Ok(()),
        1 => match dialect {
            Dialect::VariantA => Ok(()),
            Dialect::VariantB => Err(Error::domain(
                "this dialect requires a dash pattern of zero or at least two (even count) elements",
            )),
        },
        n if n % 2 == 0 => Ok(()),
        _ => Err(Error::domain("dash pattern with >= 2 elements must have an even count")),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: Cmyk,
    pub width: FixedPoint,
    pub cap: LineCap,
    pub join: LineJoin,
    /// `Some` iff `join == Miter`.
    pub miter_limit: Option<FixedPoint>,
    pub dash_pattern: Option<DashPattern>,
}

pub fn validate_stroke(dialect: Dialect, stroke: &Stroke) -> Result<(), Error> {
    if !stroke.width.is_positive() {
        return Err(Error::domain("stroke width must be > 0"));
    }
    match (stroke.join, stroke.miter_limit) {
        (LineJoin::Miter, None) => {
            return Err(Error::domain("miter join requires a miter limit"));
        }
        (LineJoin::Miter, Some(limit)) if !limit.is_positive() => {
            return Err(Error::domain("miter limit must be > 0"));
        }
        (join, Some(_)) if join != LineJoin::Miter => {
            return Err(Error::domain("miter limit is only valid with a miter join"));
        }
        _ => {}
    }
    if let Some(dash) = &stroke.dash_pattern {
        validate_dash_array(dialect, &dash.array)?;
        if !dash.phase.is_non_negative() {
            return Err(Error::domain("dash phase must be >= 0"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(s: &str) -> FixedPoint {
        FixedPoint::parse(s).unwrap()
    }

    fn base_stroke() -> Stroke {
        Stroke {
            color: Cmyk::new(0, 0, 0, 255),
            width: fp("1"),
            cap: LineCap::Butt,
            join: LineJoin::Bevel,
            miter_limit: None,
            dash_pattern: None,
        }
    }

    #[test]
    fn miter_requires_limit() {
        let mut s = base_stroke();
        s.join = LineJoin::Miter;
        assert!(validate_stroke(Dialect::VariantA, &s).is_err());
        s.miter_limit = Some(fp("4"));
        assert!(validate_stroke(Dialect::VariantA, &s).is_ok());
    }

    #[test]
    fn non_miter_forbids_limit() {
        let mut s = base_stroke();
        s.miter_limit = Some(fp("4"));
        assert!(validate_stroke(Dialect::VariantA, &s).is_err());
    }

    #[test]
    fn single_dash_element_dialect_dependent() {
        assert!(validate_dash_array(Dialect::VariantA, &[fp("3")]).is_ok());
        assert!(validate_dash_array(Dialect::VariantB, &[fp("3")]).is_err());
        assert!(validate_dash_array(Dialect::VariantB, &[fp("3"), fp("2")]).is_ok());
        assert!(validate_dash_array(Dialect::VariantB, &[fp("3"), fp("2"), fp("1")]).is_err());
    }
}
