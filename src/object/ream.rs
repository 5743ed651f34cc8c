//! Ream object: paper dimensions, display rotation and boundary boxes.
//! Grounded in the teacher's `Rect`/box handling in `graphics.rs` (media vs.
//! trim vs. crop box) and `PdfPage { media_box, trim_box, crop_box, .. }` in
//! `ops.rs`, generalised to the three named boxes the language exposes.

use std::collections::BTreeMap;

use crate::dialect::Dialect;
use crate::error::Error;
use crate::fixed::FixedPoint;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum BoxKind {
    ArtBox,
    TrimBox,
    BleedBox,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Margins {
    pub left: FixedPoint,
    pub right: FixedPoint,
    pub top: FixedPoint,
    pub bottom: FixedPoint,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Rotation {
    None,
    Clockwise90,
    UpsideDown,
    CounterClockwise90,
}

impl Rotation {
    pub fn from_degrees(deg: i32) -> Result<Self, Error> {
        match deg {
            0 => Ok(Rotation::None),
            90 => Ok(Rotation::Clockwise90),
            180 => Ok(Rotation::UpsideDown),
            270 => Ok(Rotation::CounterClockwise90),
            other => Err(Error::domain(format!(
                "rotation must be one of 0, 90, 180, 270, got {}",
                other
            ))),
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise90 => 90,
            Rotation::UpsideDown => 180,
            Rotation::CounterClockwise90 => 270,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ream {
    pub width: FixedPoint,
    pub height: FixedPoint,
    pub rotation: Rotation,
    pub boxes: BTreeMap<BoxKind, Margins>,
}

/// Validates a completed ream against a dialect's rules. Called from both
/// the Dialect A single-op `ream` builder and Dialect B's `finish_ream`.
pub fn validate_ream(dialect: Dialect, ream: &Ream) -> Result<(), Error> {
    if !ream.width.is_positive() {
        return Err(Error::domain("ream width must be > 0"));
    }
    if !ream.height.is_positive() {
        return Err(Error::domain("ream height must be > 0"));
    }

    let has_art = ream.boxes.contains_key(&BoxKind::ArtBox);
    let has_trim = ream.boxes.contains_key(&BoxKind::TrimBox);

    match dialect {
        Dialect::VariantA => {
            if !(has_art || has_trim) {
                return Err(Error::domain("ream requires at least one of ArtBox or TrimBox"));
            }
        }
        Dialect::VariantB => {
            if has_art && has_trim {
                return Err(Error::domain(
                    "this dialect forbids defining both ArtBox and TrimBox on the same ream",
                ));
            }
            if !(has_art || has_trim) {
                return Err(Error::domain("ream requires exactly one of ArtBox or TrimBox"));
            }
        }
    }

    for (kind, margins) in &ream.boxes {
        validate_box_margins(*kind, margins, ream.width, ream.height)?;
    }

    if let Some(bleed) = ream.boxes.get(&BoxKind::BleedBox) {
        for kind in [BoxKind::ArtBox, BoxKind::TrimBox] {
            if let Some(m) = ream.boxes.get(&kind) {
                validate_margin_exceeds_bleed(kind, m, bleed)?;
            }
        }
    }

    Ok(())
}

fn validate_box_margins(
    kind: BoxKind,
    margins: &Margins,
    width: FixedPoint,
    height: FixedPoint,
) -> Result<(), Error> {
    if !(margins.left.is_positive()
        && margins.right.is_positive()
        && margins.top.is_positive()
        && margins.bottom.is_positive())
    {
        return Err(Error::domain(format!("{:?} margins must all be > 0", kind)));
    }
    if margins.left + margins.right >= width {
        return Err(Error::domain(format!(
            "{:?}: left + right margin must be < page width",
            kind
        )));
    }
    if margins.top + margins.bottom >= height {
        return Err(Error::domain(format!(
            "{:?}: top + bottom margin must be < page height",
            kind
        )));
    }
    Ok(())
}

fn validate_margin_exceeds_bleed(kind: BoxKind, m: &Margins, bleed: &Margins) -> Result<(), Error> {
    if !(m.left > bleed.left && m.right > bleed.right && m.top > bleed.top && m.bottom > bleed.bottom) {
        return Err(Error::domain(format!(
            "{:?} margins must each exceed the corresponding BleedBox margin",
            kind
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fp(s: &str) -> FixedPoint {
        FixedPoint::parse(s).unwrap()
    }

    fn sample_ream(left_margin: &str) -> Ream {
        let mut boxes = BTreeMap::new();
        boxes.insert(
            BoxKind::ArtBox,
            Margins {
                left: fp(left_margin),
                right: fp("36"),
                top: fp("36"),
                bottom: fp("36"),
            },
        );
        Ream {
            width: fp("595.27559"),
            height: fp("841.88976"),
            rotation: Rotation::None,
            boxes,
        }
    }

    #[test]
    fn s3_ream_validity_ok() {
        let ream = sample_ream("36");
        assert_eq!(validate_ream(Dialect::VariantA, &ream), Ok(()));
    }

    #[test]
    fn s3_ream_validity_left_margin_too_big() {
        let ream = sample_ream("595");
        assert!(validate_ream(Dialect::VariantA, &ream).is_err());
    }

    #[test]
    fn dialect_b_forbids_both_art_and_trim() {
        let mut ream = sample_ream("36");
        ream.boxes.insert(
            BoxKind::TrimBox,
            Margins { left: fp("36"), right: fp("36"), top: fp("36"), bottom: fp("36") },
        );
        assert!(validate_ream(Dialect::VariantA, &ream).is_ok());
        assert!(validate_ream(Dialect::VariantB, &ream).is_err());
    }

    #[test]
    fn bleed_margin_must_be_smaller() {
        let mut ream = sample_ream("36");
        ream.boxes.insert(
            BoxKind::BleedBox,
            Margins { left: fp("10"), right: fp("10"), top: fp("10"), bottom: fp("10") },
        );
        assert!(validate_ream(Dialect::VariantA, &ream).is_ok());

        ream.boxes.insert(
            BoxKind::BleedBox,
            Margins { left: fp("40"), right: fp("10"), top: fp("10"), bottom: fp("10") },
        );
        assert!(validate_ream(Dialect::VariantA, &ream).is_err());
    }
}
