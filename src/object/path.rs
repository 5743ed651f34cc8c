//! Path object: an ordered list of subpaths plus a fill rule. Grounded in
//! the teacher's `graphics::Polygon`/`Line` (point lists with a closed
//! flag) and `graphics::PaintMode`-style rule enums, regrouped around the
//! language's own Rectangle/Motion subpath split.

use crate::error::Error;
use crate::fixed::FixedPoint;

pub type Point = (FixedPoint, FixedPoint);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FillRule {
    Nonzero,
    EvenOdd,
    /// Forbids fill or clip use of this path (spec §3); stroke-only paths
    /// use this rule.
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Line(Point),
    Cubic(Point, Point, Point),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Subpath {
    Rectangle { corner: Point, width: FixedPoint, height: FixedPoint },
    Motion { start: Point, segments: Vec<Segment>, closed: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub subpaths: Vec<Subpath>,
    pub fill_rule: FillRule,
}

pub fn validate_subpath(subpath: &Subpath) -> Result<(), Error> {
    match subpath {
        Subpath::Rectangle { width, height, .. } => {
            if !width.is_positive() {
                return Err(Error::domain("rectangle subpath width must be > 0"));
            }
            if !height.is_positive() {
                return Err(Error::domain("rectangle subpath height must be > 0"));
            }
            Ok(())
        }
        Subpath::Motion { segments, .. } => {
            if segments.is_empty() {
                return Err(Error::state("motion subpath requires at least one segment"));
            }
            Ok(())
        }
    }
}

pub fn validate_path(path: &Path) -> Result<(), Error> {
    if path.subpaths.is_empty() {
        return Err(Error::state("path requires at least one subpath"));
    }
    for subpath in &path.subpaths {
        validate_subpath(subpath)?;
    }
    Ok(())
}

/// Whether `rule` permits this path to be used for fill or clip (spec §3:
/// the Null rule forbids both).
pub fn rule_permits_fill_or_clip(rule: FillRule) -> bool {
    !matches!(rule, FillRule::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(s: &str) -> FixedPoint {
        FixedPoint::parse(s).unwrap()
    }

    #[test]
    fn rectangle_requires_positive_dims() {
        let bad = Subpath::Rectangle { corner: (fp("0"), fp("0")), width: fp("0"), height: fp("10") };
        assert!(validate_subpath(&bad).is_err());
        let good = Subpath::Rectangle { corner: (fp("0"), fp("0")), width: fp("10"), height: fp("10") };
        assert!(validate_subpath(&good).is_ok());
    }

    #[test]
    fn motion_requires_at_least_one_segment() {
        let bad = Subpath::Motion { start: (fp("0"), fp("0")), segments: vec![], closed: false };
        assert!(validate_subpath(&bad).is_err());
        let good = Subpath::Motion {
            start: (fp("0"), fp("0")),
            segments: vec![Segment::Line((fp("1"), fp("1")))],
            closed: true,
        };
        assert!(validate_subpath(&good).is_ok());
    }

    #[test]
    fn null_rule_forbids_fill_or_clip() {
        assert!(!rule_permits_fill_or_clip(FillRule::Null));
        assert!(rule_permits_fill_or_clip(FillRule::Nonzero));
        assert!(rule_permits_fill_or_clip(FillRule::EvenOdd));
    }

    #[test]
    fn empty_path_rejected() {
        let path = Path { subpaths: vec![], fill_rule: FillRule::Nonzero };
        assert!(validate_path(&path).is_err());
    }
}
