//! LLIL instruction set (spec §6's "Operation inventory (LLIL)"). Grounded
//! in the teacher's `ops::Op` — a single flat enum of page-content
//! instructions dispatched by the page serialiser — generalised here to
//! the language's own instruction names and argument shapes.

use crate::fixed::FixedPoint;
use crate::object::color::Cmyk;
use crate::object::stroke::{LineCap, LineJoin};

pub type Point = (FixedPoint, FixedPoint);

#[derive(Debug, Clone, PartialEq)]
pub struct BoxRect {
    pub x0: FixedPoint,
    pub y0: FixedPoint,
    pub x1: FixedPoint,
    pub y1: FixedPoint,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    FontStandard { name: String },
    FontFile { path: String, assigned_name: String },
    ImageJpeg { path: String, assigned_name: String },
    ImagePng { path: String, assigned_name: String },

    BeginPage,
    EndPage,
    Body,
    Dim { width: FixedPoint, height: FixedPoint },
    BleedBox(BoxRect),
    TrimBox(BoxRect),
    ArtBox(BoxRect),
    ViewRotate { degrees: i32 },

    BeginPath { stroke: bool, fill: bool, clip: bool, even_odd: bool },
    EndPath,
    BeginText { clip: bool },
    EndText,

    LineWidth(FixedPoint),
    LineCap(LineCap),
    /// The non-miter form carries no second argument; the miter form
    /// requires one (spec §4.8).
    LineJoin { join: LineJoin, miter_limit: Option<FixedPoint> },
    /// Phase plus an odd-count-minus-one (i.e. even) list of dash/gap
    /// lengths: the full argument list length must be odd and >= 3.
    LineDash { phase: FixedPoint, array: Vec<FixedPoint> },
    LineUndash,
    StrokeColor(Cmyk),
    FillColor(Cmyk),

    Save,
    Restore,
    Matrix { a: FixedPoint, b: FixedPoint, c: FixedPoint, d: FixedPoint, e: FixedPoint, f: FixedPoint },
    Image { assigned_name: String },

    Move(Point),
    Line(Point),
    Curve(Point, Point, Point),
    Close,
    Rect { corner: Point, width: FixedPoint, height: FixedPoint },

    Cspace(FixedPoint),
    Wspace(FixedPoint),
    Hscale(FixedPoint),
    Lead(FixedPoint),
    Font { assigned_name: String, size: FixedPoint },
    TextRender(u8),
    Rise(FixedPoint),
    /// 0 args (no relative move) or 2 args `(dx, dy)`.
    Advance(Option<(FixedPoint, FixedPoint)>),
    Write(String),
}
