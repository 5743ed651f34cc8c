//! Clipping object: a set of shape+transform components whose intersection
//! (with each other and with the page) forms the active clip region.
//! Grounded in the teacher's `xobject.rs` clip-path handling, generalised
//! to admit either a `Path` or a `Column` as the shape of a component.

use crate::error::Error;
use crate::object::column::Column;
use crate::object::path::{self, Path};
use crate::object::transform::Transform;

#[derive(Debug, Clone, PartialEq)]
pub enum ClipShape {
    Path(Path),
    Column(Column),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClipComponent {
    pub shape: ClipShape,
    pub transform: Transform,
}

/// Order of components is irrelevant: the final region is the intersection
/// of every component's shape (each projected through its own transform)
/// with the page (spec §3).
#[derive(Debug, Clone, PartialEq)]
pub struct Clipping {
    pub components: Vec<ClipComponent>,
}

pub fn validate_clipping(clipping: &Clipping) -> Result<(), Error> {
    if clipping.components.is_empty() {
        return Err(Error::state("clip requires at least one component"));
    }
    for component in &clipping.components {
        if let ClipShape::Path(p) = &component.shape {
            if !path::rule_permits_fill_or_clip(p.fill_rule) {
                return Err(Error::domain("a Null-rule path cannot be used for clipping"));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::FixedPoint;
    use crate::object::path::{FillRule, Subpath};

    fn fp(s: &str) -> FixedPoint {
        FixedPoint::parse(s).unwrap()
    }

    fn rect_path(rule: FillRule) -> Path {
        Path {
            subpaths: vec![Subpath::Rectangle {
                corner: (fp("0"), fp("0")),
                width: fp("10"),
                height: fp("10"),
            }],
            fill_rule: rule,
        }
    }

    #[test]
    fn empty_clipping_rejected() {
        assert!(validate_clipping(&Clipping { components: vec![] }).is_err());
    }

    #[test]
    fn null_rule_path_rejected_for_clip() {
        let clipping = Clipping {
            components: vec![ClipComponent {
                shape: ClipShape::Path(rect_path(FillRule::Null)),
                transform: Transform::identity(),
            }],
        };
        assert!(validate_clipping(&clipping).is_err());
    }

    #[test]
    fn nonzero_rule_path_accepted_for_clip() {
        let clipping = Clipping {
            components: vec![ClipComponent {
                shape: ClipShape::Path(rect_path(FillRule::Nonzero)),
                transform: Transform::identity(),
            }],
        };
        assert!(validate_clipping(&clipping).is_ok());
    }
}
