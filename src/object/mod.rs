//! Object kinds: the ten semantic contracts layered on top of the plain
//! `Value` tagged sum (spec §3 lists eight headline kinds; the corpus's own
//! section body enumerates ten — see DESIGN.md for the reconciliation).
//! Grounded in the teacher's split of `color.rs`/`graphics.rs`/`font.rs`/
//! `image.rs`/`matrix.rs` into one file per concern.

pub mod clipping;
pub mod color;
pub mod column;
pub mod font;
pub mod image;
pub mod path;
pub mod ream;
pub mod stroke;
pub mod style;
pub mod transform;

use std::rc::Rc;

use clipping::Clipping;
use color::Cmyk;
use column::Column;
use font::Font;
use image::Image;
use path::Path;
use ream::Ream;
use stroke::Stroke;
use style::Style;
use transform::Transform;

/// Any of the ten built object kinds, shared by `Rc` so that a value bound
/// once (a font used by many styles, say) is never deep-copied just to be
/// referenced again.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectValue {
    Ream(Rc<Ream>),
    Color(Rc<Cmyk>),
    Stroke(Rc<Stroke>),
    Font(Rc<Font>),
    Image(Rc<Image>),
    Path(Rc<Path>),
    Transform(Rc<Transform>),
    Column(Rc<Column>),
    Style(Rc<Style>),
    Clipping(Rc<Clipping>),
}

impl ObjectValue {
    /// Name used in type-error messages, matching the object-kind names the
    /// language itself uses.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ObjectValue::Ream(_) => "Ream",
            ObjectValue::Color(_) => "Color",
            ObjectValue::Stroke(_) => "Stroke",
            ObjectValue::Font(_) => "Font",
            ObjectValue::Image(_) => "Image",
            ObjectValue::Path(_) => "Path",
            ObjectValue::Transform(_) => "Transform",
            ObjectValue::Column(_) => "Column",
            ObjectValue::Style(_) => "Style",
            ObjectValue::Clipping(_) => "Clipping",
        }
    }
}
