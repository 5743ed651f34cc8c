//! C7: the lowering layer. Translates the four drawing operations
//! (`draw_path`, `draw_text`, `draw_image`, `draw_embed`) into deterministic,
//! order-preserving `llil::Instruction` sequences against the evaluator's
//! shared `Processor`/`PdfSink` (spec §4.7). Grounded in the teacher's
//! `PdfLayer` content-emission methods (`pdf_layer.rs`), which likewise wrap
//! each drawing call in a save/restore pair and issue state-setting
//! operators before the shape itself.

use std::rc::Rc;

use crate::error::Error;
use crate::fixed::FixedPoint;
use crate::hldsl::eval::Evaluator;
use crate::llil::ops::Instruction;
use crate::object::clipping::{ClipComponent, ClipShape, Clipping};
use crate::object::color::Cmyk;
use crate::object::column::{Column, Line, Span};
use crate::object::font::{Alterations, Font};
use crate::object::image::Image;
use crate::object::path::{self, FillRule, Path, Point, Segment, Subpath};
use crate::object::stroke::Stroke;
use crate::object::transform::Transform;
use crate::object::ObjectValue;
use crate::value::Value;

impl<'a> Evaluator<'a> {
    pub(crate) fn op_draw_path(&mut self) -> Result<(), Error> {
        let transform = expect_transform(self.pop()?)?;
        let clipping = expect_optional_clipping(self.pop()?)?;
        let fill = expect_optional_color(self.pop()?)?;
        let stroke = expect_optional_stroke(self.pop()?)?;
        let path = expect_path(self.pop()?)?;
        self.lower_path_drawing(&path, stroke, fill, clipping, &transform)
    }

    pub(crate) fn op_draw_text(&mut self) -> Result<(), Error> {
        let transform = expect_transform(self.pop()?)?;
        let clipping = expect_optional_clipping(self.pop()?)?;
        let column = expect_column(self.pop()?)?;

        self.emit(Instruction::Save)?;
        self.emit(matrix_instruction(&transform))?;
        if let Some(clip) = &clipping {
            for component in &clip.components {
                self.emit_clip_component(component)?;
            }
        }
        self.emit_column(&column, |p| p, false)?;
        self.emit(Instruction::Restore)?;
        Ok(())
    }

    pub(crate) fn op_draw_image(&mut self) -> Result<(), Error> {
        let transform = expect_transform(self.pop()?)?;
        let clipping = expect_optional_clipping(self.pop()?)?;
        let image = expect_image(self.pop()?)?;

        self.emit(Instruction::Save)?;
        self.emit(matrix_instruction(&transform))?;
        if let Some(clip) = &clipping {
            for component in &clip.components {
                self.emit_clip_component(component)?;
            }
        }
        self.emit(Instruction::Image { assigned_name: image.path.clone() })?;
        self.emit(Instruction::Restore)?;
        Ok(())
    }

    /// Dialect B's embedded-fragment placement. Undocumented beyond its
    /// name in the operation inventory; grounded on the symmetry of the
    /// other three drawing ops, an embedded fragment is vector content
    /// bounded by the header's `bound-*` metas, so it lowers exactly like
    /// `draw_path`.
    pub(crate) fn op_draw_embed(&mut self) -> Result<(), Error> {
        self.op_draw_path()
    }

    fn lower_path_drawing(
        &mut self,
        path: &Path,
        stroke: Option<Rc<Stroke>>,
        fill: Option<Cmyk>,
        clipping: Option<Rc<Clipping>>,
        transform: &Transform,
    ) -> Result<(), Error> {
        if fill.is_some() && !path::rule_permits_fill_or_clip(path.fill_rule) {
            return Err(Error::domain("a Null-rule path cannot be filled"));
        }

        self.emit(Instruction::Save)?;
        self.emit(matrix_instruction(transform))?;

        if let Some(clip) = &clipping {
            for component in &clip.components {
                self.emit_clip_component(component)?;
            }
        }

        if let Some(s) = &stroke {
            self.emit_stroke_state(s)?;
        }
        if let Some(c) = fill {
            self.emit(Instruction::FillColor(c))?;
        }

        let even_odd = path.fill_rule == FillRule::EvenOdd;
        self.emit(Instruction::BeginPath { stroke: stroke.is_some(), fill: fill.is_some(), clip: false, even_odd })?;
        for subpath in &path.subpaths {
            self.emit_subpath(subpath)?;
        }
        self.emit(Instruction::EndPath)?;

        self.emit(Instruction::Restore)?;
        Ok(())
    }

    fn emit_stroke_state(&mut self, stroke: &Stroke) -> Result<(), Error> {
        self.emit(Instruction::LineWidth(stroke.width))?;
        self.emit(Instruction::LineCap(stroke.cap))?;
        self.emit(Instruction::LineJoin { join: stroke.join, miter_limit: stroke.miter_limit })?;
        match &stroke.dash_pattern {
            Some(dash) => {
                self.emit(Instruction::LineDash { phase: dash.phase, array: dash.array.clone() })?;
            }
            None => {
                self.emit(Instruction::LineUndash)?;
            }
        }
        self.emit(Instruction::StrokeColor(stroke.color))?;
        Ok(())
    }

    /// Establishes one clip component. A clip region's confinement must
    /// outlive the `Save`/`Restore` pair wrapping the transform that applies
    /// to it (restoring would undo the clip along with the matrix), so each
    /// component's shape is projected through its own transform by
    /// coordinate (spec §3: "each projected through its own transform")
    /// instead of being positioned via an LLIL `Matrix` instruction.
    fn emit_clip_component(&mut self, component: &ClipComponent) -> Result<(), Error> {
        match &component.shape {
            ClipShape::Path(path) => {
                let even_odd = path.fill_rule == FillRule::EvenOdd;
                self.emit(Instruction::BeginPath { stroke: false, fill: false, clip: true, even_odd })?;
                for subpath in &path.subpaths {
                    self.emit_subpath_projected(subpath, &component.transform)?;
                }
                self.emit(Instruction::EndPath)?;
            }
            ClipShape::Column(column) => {
                let transform = component.transform;
                self.emit_column(column, move |p| transform.apply(p), true)?;
            }
        }
        Ok(())
    }

    fn emit_subpath(&mut self, subpath: &Subpath) -> Result<(), Error> {
        match subpath {
            Subpath::Rectangle { corner, width, height } => {
                self.emit(Instruction::Rect { corner: *corner, width: *width, height: *height })?;
            }
            Subpath::Motion { start, segments, closed } => {
                self.emit(Instruction::Move(*start))?;
                for segment in segments {
                    match segment {
                        Segment::Line(p) => {
                            self.emit(Instruction::Line(*p))?;
                        }
                        Segment::Cubic(p2, p3, p4) => {
                            self.emit(Instruction::Curve(*p2, *p3, *p4))?;
                        }
                    }
                }
                if *closed {
                    self.emit(Instruction::Close)?;
                }
            }
        }
        Ok(())
    }

    /// Same as `emit_subpath`, but every coordinate is projected through
    /// `transform` first; a rectangle's four corners are projected
    /// individually and emitted as an explicit closed polygon, since an
    /// arbitrary transform (e.g. a rotation) no longer leaves it axis
    /// aligned and the `Rect` instruction can't represent that.
    fn emit_subpath_projected(&mut self, subpath: &Subpath, transform: &Transform) -> Result<(), Error> {
        match subpath {
            Subpath::Rectangle { corner, width, height } => {
                let corners = rect_corners(*corner, *width, *height);
                let mut projected = corners.iter().map(|p| transform.apply(*p));
                self.emit(Instruction::Move(projected.next().unwrap()))?;
                for p in projected {
                    self.emit(Instruction::Line(p))?;
                }
                self.emit(Instruction::Close)?;
            }
            Subpath::Motion { start, segments, closed } => {
                self.emit(Instruction::Move(transform.apply(*start)))?;
                for segment in segments {
                    match segment {
                        Segment::Line(p) => {
                            self.emit(Instruction::Line(transform.apply(*p)))?;
                        }
                        Segment::Cubic(p2, p3, p4) => {
                            self.emit(Instruction::Curve(
                                transform.apply(*p2),
                                transform.apply(*p3),
                                transform.apply(*p4),
                            ))?;
                        }
                    }
                }
                if *closed {
                    self.emit(Instruction::Close)?;
                }
            }
        }
        Ok(())
    }

    /// Emits a text block. `project` maps a span's baseline into the
    /// coordinate space the text is actually written in: identity for a
    /// draw call's own column (whose enclosing transform was already
    /// applied via `Matrix`), or a clip component's transform when the
    /// column is itself a clip shape.
    fn emit_column(&mut self, column: &Column, project: impl Fn(Point) -> Point, clip_mode: bool) -> Result<(), Error> {
        self.emit(Instruction::BeginText { clip: clip_mode })?;
        let mut last = (FixedPoint::zero(), FixedPoint::zero());
        for line in &column.lines {
            let baseline = project(line.baseline);
            self.emit(Instruction::Advance(Some((baseline.0 - last.0, baseline.1 - last.1))))?;
            last = baseline;
            for span in &line.spans {
                self.emit_span(span, clip_mode)?;
            }
        }
        self.emit(Instruction::EndText)?;
        Ok(())
    }

    /// Font/size/style changes are issued before each span (spec §4.7).
    /// `oblique`/`smallCaps` alterations have no native PDF counterpart
    /// reachable without a text-matrix primitive (which would require a
    /// `cm` inside the text object, invalid in a PDF content stream) and are
    /// not simulated; `hScale`/`charSpacing` compose directly into the
    /// span's own text-state operators; `boldness` is simulated as a
    /// synthetic stroke over the fill (the standard faux-bold technique).
    fn emit_span(&mut self, span: &Span, clip_mode: bool) -> Result<(), Error> {
        let style = &span.style;
        let (assigned_name, alterations) = resolve_font(&style.font);
        let h_scale = match alterations.h_scale {
            Some(extra) => style.h_scale * extra,
            None => style.h_scale,
        };
        let char_space = match alterations.char_spacing {
            Some(extra) => style.char_space + extra,
            None => style.char_space,
        };

        self.emit(Instruction::Font { assigned_name, size: style.size })?;
        self.emit(Instruction::Cspace(char_space))?;
        self.emit(Instruction::Wspace(style.word_space))?;
        self.emit(Instruction::Hscale(h_scale))?;
        self.emit(Instruction::Rise(style.rise))?;

        if let Some(c) = style.fill {
            self.emit(Instruction::FillColor(c))?;
        }
        let mut stroke_present = style.stroke.is_some();
        match (style.stroke, alterations.boldness) {
            (Some(c), _) => {
                self.emit(Instruction::StrokeColor(c))?;
            }
            (None, Some(boldness)) => {
                stroke_present = true;
                let synthetic_color = style.fill.unwrap_or(Cmyk::new(0, 0, 0, 255));
                self.emit(Instruction::LineWidth(boldness))?;
                self.emit(Instruction::StrokeColor(synthetic_color))?;
            }
            (None, None) => {}
        }

        let mode = text_render_mode(stroke_present, style.fill.is_some(), clip_mode);
        self.emit(Instruction::TextRender(mode))?;
        self.emit(Instruction::Write(span.text.to_string()))?;
        Ok(())
    }
}

fn matrix_instruction(t: &Transform) -> Instruction {
    Instruction::Matrix { a: t.a, b: t.b, c: t.c, d: t.d, e: t.e, f: t.f }
}

fn rect_corners(corner: Point, width: FixedPoint, height: FixedPoint) -> [Point; 4] {
    let (x, y) = corner;
    [(x, y), (x + width, y), (x + width, y + height), (x, y + height)]
}

/// Unwraps a (possibly nested, already-collapsed) synthetic font down to its
/// registered assigned name, carrying the synthetic layer's alterations
/// along (a `BuiltIn`/`File` base has none of its own).
fn resolve_font(font: &Font) -> (String, Alterations) {
    match font {
        Font::BuiltIn { name } => (name.to_string(), Alterations::default()),
        Font::File { assigned_name, .. } => (assigned_name.to_string(), Alterations::default()),
        Font::Synthetic { base, alterations } => {
            let (name, _) = resolve_font(base);
            (name, *alterations)
        }
    }
}

/// Spec §9's text-render-mode formula: fill-only=0, stroke-only=1,
/// fill+stroke=2, invisible=3, fill+clip=4, stroke+clip=5,
/// fill+stroke+clip=6, clip-only=7.
fn text_render_mode(stroke: bool, fill: bool, clip: bool) -> u8 {
    match (stroke, fill, clip) {
        (false, true, false) => 0,
        (true, false, false) => 1,
        (true, true, false) => 2,
        (false, false, false) => 3,
        (false, true, true) => 4,
        (true, false, true) => 5,
        (true, true, true) => 6,
        (false, false, true) => 7,
    }
}

fn expect_transform(value: Value) -> Result<Transform, Error> {
    match value {
        Value::Object(ObjectValue::Transform(t)) => Ok(*t),
        other => Err(Error::ty(format!("expected a Transform object, found {}", other.kind_name()))),
    }
}

fn expect_path(value: Value) -> Result<Rc<Path>, Error> {
    match value {
        Value::Object(ObjectValue::Path(p)) => Ok(p),
        other => Err(Error::ty(format!("expected a Path object, found {}", other.kind_name()))),
    }
}

fn expect_column(value: Value) -> Result<Rc<Column>, Error> {
    match value {
        Value::Object(ObjectValue::Column(c)) => Ok(c),
        other => Err(Error::ty(format!("expected a Column object, found {}", other.kind_name()))),
    }
}

fn expect_image(value: Value) -> Result<Rc<Image>, Error> {
    match value {
        Value::Object(ObjectValue::Image(i)) => Ok(i),
        other => Err(Error::ty(format!("expected an Image object, found {}", other.kind_name()))),
    }
}

fn expect_optional_clipping(value: Value) -> Result<Option<Rc<Clipping>>, Error> {
    match value {
        Value::Null => Ok(None),
        Value::Object(ObjectValue::Clipping(c)) => Ok(Some(c)),
        other => Err(Error::ty(format!("expected Null or a Clipping object, found {}", other.kind_name()))),
    }
}

fn expect_optional_stroke(value: Value) -> Result<Option<Rc<Stroke>>, Error> {
    match value {
        Value::Null => Ok(None),
        Value::Object(ObjectValue::Stroke(s)) => Ok(Some(s)),
        other => Err(Error::ty(format!("expected Null or a Stroke object, found {}", other.kind_name()))),
    }
}

fn expect_optional_color(value: Value) -> Result<Option<Cmyk>, Error> {
    match value {
        Value::Null => Ok(None),
        Value::Object(ObjectValue::Color(c)) => Ok(Some(*c)),
        other => Err(Error::ty(format!("expected Null or a Color object, found {}", other.kind_name()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_render_mode_formula() {
        assert_eq!(text_render_mode(false, true, false), 0);
        assert_eq!(text_render_mode(true, false, false), 1);
        assert_eq!(text_render_mode(true, true, false), 2);
        assert_eq!(text_render_mode(false, false, false), 3);
        assert_eq!(text_render_mode(false, true, true), 4);
        assert_eq!(text_render_mode(true, false, true), 5);
        assert_eq!(text_render_mode(true, true, true), 6);
        assert_eq!(text_render_mode(false, false, true), 7);
    }

    #[test]
    fn rect_corners_wind_counter_clockwise_from_origin() {
        let fp = |s: &str| FixedPoint::parse(s).unwrap();
        let corners = rect_corners((fp("0"), fp("0")), fp("10"), fp("5"));
        assert_eq!(corners[0], (fp("0"), fp("0")));
        assert_eq!(corners[2], (fp("10"), fp("5")));
    }
}
