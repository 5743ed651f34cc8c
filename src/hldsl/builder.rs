//! Accumulator-based object builders (C6, Dialect B half of spec §4.6): the
//! single-slot accumulator register plus the nested structure machines for
//! path and column. Grounded in the teacher's multi-stage `PdfDocument`
//! builder (`pdf_document.rs`), which also carries one "thing under
//! construction" at a time before an explicit finish step freezes it.
//!
//! Dialect A's single-op construction (dictionary-driven `ream`/`stroke`
//! builders) lives in `hldsl::ops` instead, next to the operation dispatch
//! table it's part of — there's no accumulator state involved there.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::Error;
use crate::fixed::FixedPoint;
use crate::object::color::Cmyk;
use crate::object::column::{Column, Line, Span};
use crate::object::font::Font;
use crate::object::path::{FillRule, Path, Segment, Subpath};
use crate::object::ream::{BoxKind, Margins, Ream, Rotation};
use crate::object::stroke::{DashPattern, LineCap, LineJoin, Stroke};
use crate::object::style::Style;

#[derive(Debug, Clone, Default)]
pub struct PartialReam {
    pub width: Option<FixedPoint>,
    pub height: Option<FixedPoint>,
    pub rotation: Option<Rotation>,
    pub boxes: BTreeMap<BoxKind, Margins>,
}

impl PartialReam {
    pub fn from_existing(ream: &Ream) -> Self {
        PartialReam {
            width: Some(ream.width),
            height: Some(ream.height),
            rotation: Some(ream.rotation),
            boxes: ream.boxes.clone(),
        }
    }

    pub fn finish(&self) -> Result<Ream, Error> {
        let width = self.width.ok_or_else(|| Error::state("ream is missing its dim"))?;
        let height = self.height.ok_or_else(|| Error::state("ream is missing its dim"))?;
        Ok(Ream {
            width,
            height,
            rotation: self.rotation.unwrap_or(Rotation::None),
            boxes: self.boxes.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct PartialStroke {
    pub color: Option<Cmyk>,
    pub width: Option<FixedPoint>,
    pub cap: Option<LineCap>,
    pub join: Option<LineJoin>,
    pub miter_limit: Option<FixedPoint>,
    pub dash_pattern: Option<DashPattern>,
}

impl Default for PartialStroke {
    fn default() -> Self {
        PartialStroke { color: None, width: None, cap: None, join: None, miter_limit: None, dash_pattern: None }
    }
}

impl PartialStroke {
    pub fn from_existing(stroke: &Stroke) -> Self {
        PartialStroke {
            color: Some(stroke.color),
            width: Some(stroke.width),
            cap: Some(stroke.cap),
            join: Some(stroke.join),
            miter_limit: stroke.miter_limit,
            dash_pattern: stroke.dash_pattern.clone(),
        }
    }

    pub fn finish(&self) -> Result<Stroke, Error> {
        let color = self.color.ok_or_else(|| Error::state("stroke is missing its color"))?;
        let width = self.width.ok_or_else(|| Error::state("stroke is missing its width"))?;
        let cap = self.cap.unwrap_or(LineCap::Butt);
        let join = self.join.unwrap_or(LineJoin::Miter);
        let miter_limit = match join {
            LineJoin::Miter => Some(self.miter_limit.unwrap_or(FixedPoint::from_promotable_int(10).unwrap())),
            _ => None,
        };
        Ok(Stroke { color, width, cap, join, miter_limit, dash_pattern: self.dash_pattern.clone() })
    }
}

#[derive(Debug, Clone)]
struct MotionInProgress {
    start: (FixedPoint, FixedPoint),
    segments: Vec<Segment>,
    closed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PartialPath {
    subpaths: Vec<Subpath>,
    /// `Some` while inside a `start_motion ... finish_motion|close_motion`
    /// run — the mode table's Start/Subpath states collapse to this.
    motion: Option<MotionInProgress>,
    fill_rule: Option<FillRule>,
}

impl PartialPath {
    pub fn from_existing(path: &Path) -> Self {
        PartialPath { subpaths: path.subpaths.clone(), motion: None, fill_rule: Some(path.fill_rule) }
    }

    pub fn start_motion(&mut self, start: (FixedPoint, FixedPoint)) -> Result<(), Error> {
        if self.motion.is_some() {
            return Err(Error::state("start_motion requires no motion already open"));
        }
        self.motion = Some(MotionInProgress { start, segments: Vec::new(), closed: false });
        Ok(())
    }

    pub fn motion_line(&mut self, p: (FixedPoint, FixedPoint)) -> Result<(), Error> {
        let m = self.motion.as_mut().ok_or_else(|| Error::state("motion_line requires open motion"))?;
        m.segments.push(Segment::Line(p));
        Ok(())
    }

    pub fn motion_curve(
        &mut self,
        p2: (FixedPoint, FixedPoint),
        p3: (FixedPoint, FixedPoint),
        p4: (FixedPoint, FixedPoint),
    ) -> Result<(), Error> {
        let m = self.motion.as_mut().ok_or_else(|| Error::state("motion_curve requires open motion"))?;
        m.segments.push(Segment::Cubic(p2, p3, p4));
        Ok(())
    }

    fn end_motion(&mut self, closed: bool) -> Result<(), Error> {
        let m = self.motion.take().ok_or_else(|| {
            Error::state("finish_motion/close_motion requires an open motion with at least one segment")
        })?;
        if m.segments.is_empty() {
            self.motion = Some(m);
            return Err(Error::state("finish_motion/close_motion requires at least one segment"));
        }
        self.subpaths.push(Subpath::Motion { start: m.start, segments: m.segments, closed });
        Ok(())
    }

    pub fn finish_motion(&mut self) -> Result<(), Error> {
        self.end_motion(false)
    }

    pub fn close_motion(&mut self) -> Result<(), Error> {
        self.end_motion(true)
    }

    pub fn path_rect(&mut self, corner: (FixedPoint, FixedPoint), width: FixedPoint, height: FixedPoint) -> Result<(), Error> {
        if self.motion.is_some() {
            return Err(Error::state("path_rect requires no motion open"));
        }
        self.subpaths.push(Subpath::Rectangle { corner, width, height });
        Ok(())
    }

    pub fn path_include(&mut self, other: &Path) -> Result<(), Error> {
        if self.motion.is_some() {
            return Err(Error::state("path_include requires no motion open"));
        }
        self.subpaths.extend(other.subpaths.iter().cloned());
        Ok(())
    }

    pub fn set_fill_rule(&mut self, rule: FillRule) {
        self.fill_rule = Some(rule);
    }

    pub fn finish(&self) -> Result<Path, Error> {
        if self.motion.is_some() {
            return Err(Error::state("finish_path requires no motion open"));
        }
        if self.subpaths.is_empty() {
            return Err(Error::state("finish_path requires at least one subpath"));
        }
        let fill_rule = self.fill_rule.ok_or_else(|| Error::state("finish_path requires a fill rule"))?;
        Ok(Path { subpaths: self.subpaths.clone(), fill_rule })
    }
}

#[derive(Debug, Clone)]
pub struct PartialStyle {
    pub font: Option<Rc<Font>>,
    pub size: Option<FixedPoint>,
    pub char_space: FixedPoint,
    pub word_space: FixedPoint,
    pub rise: FixedPoint,
    pub h_scale: FixedPoint,
    pub stroke: Option<Cmyk>,
    pub fill: Option<Cmyk>,
}

impl Default for PartialStyle {
    fn default() -> Self {
        PartialStyle {
            font: None,
            size: None,
            char_space: FixedPoint::zero(),
            word_space: FixedPoint::zero(),
            rise: FixedPoint::zero(),
            h_scale: FixedPoint::from_promotable_int(1).unwrap(),
            stroke: None,
            fill: None,
        }
    }
}

impl PartialStyle {
    pub fn from_existing(style: &Style) -> Self {
        PartialStyle {
            font: Some(style.font.clone()),
            size: Some(style.size),
            char_space: style.char_space,
            word_space: style.word_space,
            rise: style.rise,
            h_scale: style.h_scale,
            stroke: style.stroke,
            fill: style.fill,
        }
    }

    pub fn finish(&self) -> Result<Style, Error> {
        let font = self.font.clone().ok_or_else(|| Error::state("style is missing its font"))?;
        let size = self.size.ok_or_else(|| Error::state("style is missing its size"))?;
        Ok(Style {
            font,
            size,
            char_space: self.char_space,
            word_space: self.word_space,
            rise: self.rise,
            h_scale: self.h_scale,
            stroke: self.stroke,
            fill: self.fill,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct PartialColumn {
    lines: Vec<Line>,
    current_line: Option<Line>,
}

impl PartialColumn {
    pub fn start_line(&mut self, baseline: (FixedPoint, FixedPoint)) -> Result<(), Error> {
        if self.current_line.is_some() {
            return Err(Error::state("start_line requires no line already open"));
        }
        self.current_line = Some(Line { baseline, spans: Vec::new() });
        Ok(())
    }

    pub fn line_span(&mut self, text: Rc<str>, style: Rc<Style>) -> Result<(), Error> {
        let line = self.current_line.as_mut().ok_or_else(|| Error::state("line_span requires an open line"))?;
        line.spans.push(Span { text, style });
        Ok(())
    }

    pub fn finish_line(&mut self) -> Result<(), Error> {
        let line = self.current_line.take().ok_or_else(|| Error::state("finish_line requires an open line"))?;
        if line.spans.is_empty() {
            self.current_line = Some(line);
            return Err(Error::state("finish_line requires at least one span"));
        }
        self.lines.push(line);
        Ok(())
    }

    pub fn finish(&self) -> Result<Column, Error> {
        if self.current_line.is_some() {
            return Err(Error::state("finish_column requires no line open"));
        }
        if self.lines.is_empty() {
            return Err(Error::state("finish_column requires at least one line"));
        }
        Ok(Column { lines: self.lines.clone() })
    }
}

#[derive(Debug, Clone)]
pub enum Accumulator {
    Ream(PartialReam),
    Stroke(PartialStroke),
    Path(PartialPath),
    Style(PartialStyle),
    Column(PartialColumn),
}

impl Accumulator {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Accumulator::Ream(_) => "ream",
            Accumulator::Stroke(_) => "stroke",
            Accumulator::Path(_) => "path",
            Accumulator::Style(_) => "style",
            Accumulator::Column(_) => "column",
        }
    }
}

/// Single-slot accumulator register (spec §3: "Null unless an object is
/// being built incrementally").
#[derive(Debug, Default)]
pub struct AccumulatorRegister {
    slot: Option<Accumulator>,
}

impl AccumulatorRegister {
    pub fn new() -> Self {
        AccumulatorRegister::default()
    }

    pub fn start(&mut self, accumulator: Accumulator) -> Result<(), Error> {
        if self.slot.is_some() {
            return Err(Error::state("accumulator is already in use"));
        }
        self.slot = Some(accumulator);
        Ok(())
    }

    pub fn is_null(&self) -> bool {
        self.slot.is_none()
    }

    pub fn current_mut(&mut self) -> Result<&mut Accumulator, Error> {
        self.slot.as_mut().ok_or_else(|| Error::state("no object is currently being built"))
    }

    /// Takes the accumulator out, leaving it Null, for a `finish_X` op.
    pub fn take(&mut self) -> Result<Accumulator, Error> {
        self.slot.take().ok_or_else(|| Error::state("no object is currently being built"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(s: &str) -> FixedPoint {
        FixedPoint::parse(s).unwrap()
    }

    #[test]
    fn s3_ream_accumulator_flow() {
        let mut partial = PartialReam::default();
        partial.width = Some(fp("595.27559"));
        partial.height = Some(fp("841.88976"));
        partial.rotation = Some(Rotation::None);
        partial.boxes.insert(
            BoxKind::ArtBox,
            Margins { left: fp("36"), right: fp("36"), top: fp("36"), bottom: fp("36") },
        );
        let ream = partial.finish().unwrap();
        assert_eq!(ream.width, fp("595.27559"));
    }

    #[test]
    fn s4_path_state_motion_line_without_start() {
        let mut partial = PartialPath::default();
        let err = partial.motion_line((fp("1"), fp("1"))).unwrap_err();
        assert_eq!(err.kind(), "StateError");
    }

    #[test]
    fn path_builder_full_motion_cycle() {
        let mut partial = PartialPath::default();
        partial.start_motion((fp("0"), fp("0"))).unwrap();
        partial.motion_line((fp("1"), fp("1"))).unwrap();
        partial.finish_motion().unwrap();
        partial.set_fill_rule(FillRule::Nonzero);
        let path = partial.finish().unwrap();
        assert_eq!(path.subpaths.len(), 1);
    }

    #[test]
    fn finish_motion_requires_a_segment() {
        let mut partial = PartialPath::default();
        partial.start_motion((fp("0"), fp("0"))).unwrap();
        assert!(partial.finish_motion().is_err());
        // the motion is still open afterwards, so a segment can still be added
        partial.motion_line((fp("1"), fp("1"))).unwrap();
        partial.finish_motion().unwrap();
    }

    #[test]
    fn column_builder_requires_nonempty_line_and_column() {
        let mut partial = PartialColumn::default();
        assert!(partial.finish().is_err());
        partial.start_line((fp("0"), fp("0"))).unwrap();
        assert!(partial.finish_line().is_err());
        let style = Rc::new(Style {
            font: Rc::new(Font::new_builtin("Helvetica").unwrap()),
            size: fp("12"),
            char_space: fp("0"),
            word_space: fp("0"),
            rise: fp("0"),
            h_scale: fp("1"),
            stroke: None,
            fill: Some(Cmyk::new(0, 0, 0, 255)),
        });
        partial.line_span(Rc::from("hi"), style).unwrap();
        partial.finish_line().unwrap();
        partial.finish().unwrap();
    }

    #[test]
    fn accumulator_register_single_slot() {
        let mut reg = AccumulatorRegister::new();
        reg.start(Accumulator::Ream(PartialReam::default())).unwrap();
        assert!(reg.start(Accumulator::Stroke(PartialStroke::default())).is_err());
        reg.take().unwrap();
        assert!(reg.is_null());
    }
}
