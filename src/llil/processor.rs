//! C8: parses LLIL instructions (from text, via `llil::token`, or directly
//! as `Instruction` values per the "LLIL text or direct C8 calls" data-flow
//! note) and dispatches each through `llil::state::State` to a
//! `PdfSink`. Built as an instruction-dispatch table over a flat `match`
//! plus the `State`/`PdfSink` strategy objects, per the REDESIGN FLAGS
//! guidance — not a class hierarchy.

use crate::error::{Error, LlilError};
use crate::fixed::FixedPoint;
use crate::llil::ops::{BoxRect, Instruction};
use crate::llil::state::{BoxWhich, PathInstrKind, State};
use crate::llil::token::{tokenise_document, Line, Token};
use crate::object::color::Cmyk;
use crate::object::stroke::{LineCap, LineJoin};
use crate::pdf::PdfSink;

fn parse_fixed(token: &Token) -> Result<FixedPoint, Error> {
    match token {
        Token::Number(text) => FixedPoint::parse(text),
        other => Err(Error::syntax(format!("expected a number, found {:?}", other))),
    }
}

fn parse_i64(token: &Token) -> Result<i64, Error> {
    match token {
        Token::Number(text) => text.parse::<i64>().map_err(|_| Error::syntax(format!("invalid integer {:?}", text))),
        other => Err(Error::syntax(format!("expected a number, found {:?}", other))),
    }
}

fn parse_u8(token: &Token) -> Result<u8, Error> {
    let n = parse_i64(token)?;
    u8::try_from(n).map_err(|_| Error::domain(format!("{} is out of range [0, 255]", n)))
}

fn parse_name(token: &Token) -> Result<&str, Error> {
    match token {
        Token::Name(s) => Ok(s),
        other => Err(Error::syntax(format!("expected a name, found {:?}", other))),
    }
}

fn parse_str(token: &Token) -> Result<&str, Error> {
    match token {
        Token::Str(s) => Ok(s),
        other => Err(Error::syntax(format!("expected a string, found {:?}", other))),
    }
}

fn parse_bool(token: &Token) -> Result<bool, Error> {
    match parse_name(token)? {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(Error::syntax(format!("expected true or false, found {:?}", other))),
    }
}

fn parse_cap(token: &Token) -> Result<LineCap, Error> {
    match parse_name(token)? {
        "Butt" => Ok(LineCap::Butt),
        "Round" => Ok(LineCap::Round),
        "Square" => Ok(LineCap::Square),
        other => Err(Error::domain(format!("{:?} is not a recognised line cap", other))),
    }
}

fn parse_join(token: &Token) -> Result<LineJoin, Error> {
    match parse_name(token)? {
        "Miter" => Ok(LineJoin::Miter),
        "Round" => Ok(LineJoin::Round),
        "Bevel" => Ok(LineJoin::Bevel),
        other => Err(Error::domain(format!("{:?} is not a recognised line join", other))),
    }
}

fn expect_len(name: &str, tokens: &[Token], len: usize) -> Result<(), Error> {
    if tokens.len() != len {
        Err(Error::syntax(format!("{} expects {} argument(s), found {}", name, len, tokens.len())))
    } else {
        Ok(())
    }
}

fn parse_box_rect(tokens: &[Token]) -> Result<BoxRect, Error> {
    Ok(BoxRect {
        x0: parse_fixed(&tokens[0])?,
        y0: parse_fixed(&tokens[1])?,
        x1: parse_fixed(&tokens[2])?,
        y1: parse_fixed(&tokens[3])?,
    })
}

/// Parses one tokenised instruction line into an `Instruction`. The
/// mnemonic is the operator name verbatim (`BeginPage`, `LineJoin`, ...).
pub fn parse_instruction(tokens: &[Token]) -> Result<Instruction, Error> {
    let (head, rest) = tokens.split_first().ok_or_else(|| Error::syntax("empty instruction line"))?;
    let name = parse_name(head)?;
    match name {
        "FontStandard" => {
            expect_len(name, rest, 1)?;
            Ok(Instruction::FontStandard { name: parse_str(&rest[0])?.to_string() })
        }
        "FontFile" => {
            expect_len(name, rest, 2)?;
            Ok(Instruction::FontFile {
                path: parse_str(&rest[0])?.to_string(),
                assigned_name: parse_str(&rest[1])?.to_string(),
            })
        }
        "ImageJpeg" => {
            expect_len(name, rest, 2)?;
            Ok(Instruction::ImageJpeg {
                path: parse_str(&rest[0])?.to_string(),
                assigned_name: parse_str(&rest[1])?.to_string(),
            })
        }
        "ImagePng" => {
            expect_len(name, rest, 2)?;
            Ok(Instruction::ImagePng {
                path: parse_str(&rest[0])?.to_string(),
                assigned_name: parse_str(&rest[1])?.to_string(),
            })
        }
        "BeginPage" => {
            expect_len(name, rest, 0)?;
            Ok(Instruction::BeginPage)
        }
        "EndPage" => {
            expect_len(name, rest, 0)?;
            Ok(Instruction::EndPage)
        }
        "Body" => {
            expect_len(name, rest, 0)?;
            Ok(Instruction::Body)
        }
        "Dim" => {
            expect_len(name, rest, 2)?;
            Ok(Instruction::Dim { width: parse_fixed(&rest[0])?, height: parse_fixed(&rest[1])? })
        }
        "BleedBox" => {
            expect_len(name, rest, 4)?;
            Ok(Instruction::BleedBox(parse_box_rect(rest)?))
        }
        "TrimBox" => {
            expect_len(name, rest, 4)?;
            Ok(Instruction::TrimBox(parse_box_rect(rest)?))
        }
        "ArtBox" => {
            expect_len(name, rest, 4)?;
            Ok(Instruction::ArtBox(parse_box_rect(rest)?))
        }
        "ViewRotate" => {
            expect_len(name, rest, 1)?;
            Ok(Instruction::ViewRotate { degrees: parse_i64(&rest[0])? as i32 })
        }
        "BeginPath" => {
            expect_len(name, rest, 4)?;
            Ok(Instruction::BeginPath {
                stroke: parse_bool(&rest[0])?,
                fill: parse_bool(&rest[1])?,
                clip: parse_bool(&rest[2])?,
                even_odd: parse_bool(&rest[3])?,
            })
        }
        "EndPath" => {
            expect_len(name, rest, 0)?;
            Ok(Instruction::EndPath)
        }
        "BeginText" => {
            expect_len(name, rest, 1)?;
            Ok(Instruction::BeginText { clip: parse_bool(&rest[0])? })
        }
        "EndText" => {
            expect_len(name, rest, 0)?;
            Ok(Instruction::EndText)
        }
        "LineWidth" => {
            expect_len(name, rest, 1)?;
            Ok(Instruction::LineWidth(parse_fixed(&rest[0])?))
        }
        "LineCap" => {
            expect_len(name, rest, 1)?;
            Ok(Instruction::LineCap(parse_cap(&rest[0])?))
        }
        "LineJoin" => {
            expect_len(name, rest, 2)?;
            let join = parse_join(&rest[0])?;
            let miter_limit = match &rest[1] {
                Token::Dash => None,
                other => Some(parse_fixed(other)?),
            };
            Ok(Instruction::LineJoin { join, miter_limit })
        }
        "LineDash" => {
            if rest.len() < 3 || rest.len() % 2 == 0 {
                return Err(Error::syntax(
                    "LineDash expects an odd argument count of at least 3 (phase plus one or more dash/gap pairs)",
                ));
            }
            let phase = parse_fixed(&rest[0])?;
            let array = rest[1..].iter().map(parse_fixed).collect::<Result<Vec<_>, _>>()?;
            Ok(Instruction::LineDash { phase, array })
        }
        "LineUndash" => {
            expect_len(name, rest, 0)?;
            Ok(Instruction::LineUndash)
        }
        "StrokeColor" => {
            expect_len(name, rest, 1)?;
            Ok(Instruction::StrokeColor(parse_color(&rest[0])?))
        }
        "FillColor" => {
            expect_len(name, rest, 1)?;
            Ok(Instruction::FillColor(parse_color(&rest[0])?))
        }
        "Save" => {
            expect_len(name, rest, 0)?;
            Ok(Instruction::Save)
        }
        "Restore" => {
            expect_len(name, rest, 0)?;
            Ok(Instruction::Restore)
        }
        "Matrix" => {
            expect_len(name, rest, 6)?;
            Ok(Instruction::Matrix {
                a: parse_fixed(&rest[0])?,
                b: parse_fixed(&rest[1])?,
                c: parse_fixed(&rest[2])?,
                d: parse_fixed(&rest[3])?,
                e: parse_fixed(&rest[4])?,
                f: parse_fixed(&rest[5])?,
            })
        }
        "Image" => {
            expect_len(name, rest, 1)?;
            Ok(Instruction::Image { assigned_name: parse_str(&rest[0])?.to_string() })
        }
        "Move" => {
            expect_len(name, rest, 2)?;
            Ok(Instruction::Move((parse_fixed(&rest[0])?, parse_fixed(&rest[1])?)))
        }
        "Line" => {
            expect_len(name, rest, 2)?;
            Ok(Instruction::Line((parse_fixed(&rest[0])?, parse_fixed(&rest[1])?)))
        }
        "Curve" => {
            expect_len(name, rest, 6)?;
            Ok(Instruction::Curve(
                (parse_fixed(&rest[0])?, parse_fixed(&rest[1])?),
                (parse_fixed(&rest[2])?, parse_fixed(&rest[3])?),
                (parse_fixed(&rest[4])?, parse_fixed(&rest[5])?),
            ))
        }
        "Close" => {
            expect_len(name, rest, 0)?;
            Ok(Instruction::Close)
        }
        "Rect" => {
            expect_len(name, rest, 4)?;
            Ok(Instruction::Rect {
                corner: (parse_fixed(&rest[0])?, parse_fixed(&rest[1])?),
                width: parse_fixed(&rest[2])?,
                height: parse_fixed(&rest[3])?,
            })
        }
        "Cspace" => {
            expect_len(name, rest, 1)?;
            Ok(Instruction::Cspace(parse_fixed(&rest[0])?))
        }
        "Wspace" => {
            expect_len(name, rest, 1)?;
            Ok(Instruction::Wspace(parse_fixed(&rest[0])?))
        }
        "Hscale" => {
            expect_len(name, rest, 1)?;
            Ok(Instruction::Hscale(parse_fixed(&rest[0])?))
        }
        "Lead" => {
            expect_len(name, rest, 1)?;
            Ok(Instruction::Lead(parse_fixed(&rest[0])?))
        }
        "Font" => {
            expect_len(name, rest, 2)?;
            Ok(Instruction::Font { assigned_name: parse_str(&rest[0])?.to_string(), size: parse_fixed(&rest[1])? })
        }
        "TextRender" => {
            expect_len(name, rest, 1)?;
            Ok(Instruction::TextRender(parse_u8(&rest[0])?))
        }
        "Rise" => {
            expect_len(name, rest, 1)?;
            Ok(Instruction::Rise(parse_fixed(&rest[0])?))
        }
        "Advance" => {
            expect_len(name, rest, 2)?;
            match (&rest[0], &rest[1]) {
                (Token::Dash, Token::Dash) => Ok(Instruction::Advance(None)),
                (dx, dy) => Ok(Instruction::Advance(Some((parse_fixed(dx)?, parse_fixed(dy)?)))),
            }
        }
        "Write" => {
            expect_len(name, rest, 1)?;
            Ok(Instruction::Write(parse_str(&rest[0])?.to_string()))
        }
        other => Err(Error::syntax(format!("unknown instruction {:?}", other))),
    }
}

fn parse_color(token: &Token) -> Result<Cmyk, Error> {
    match token {
        Token::Color([c, m, y, k]) => Ok(Cmyk::new(*c, *m, *y, *k)),
        other => Err(Error::syntax(format!("expected a color literal, found {:?}", other))),
    }
}

/// Owns the layered state machine plus the bit of context that spans a
/// single begin/end pair but isn't part of `State` itself (the paint mode
/// declared by `BeginPath`, consumed by the matching `EndPath`). Exposed
/// directly so callers can dispatch hand-built `Instruction` values without
/// going through the text format at all (the "direct C8 calls" path).
pub struct Processor {
    state: State,
    pending_path_paint: Option<(bool, bool, bool, bool)>,
}

impl Processor {
    pub fn new() -> Self {
        Processor { state: State::new(), pending_path_paint: None }
    }

    pub fn can_stop(&self) -> bool {
        self.state.can_stop()
    }

    /// Drives one instruction through the state machine, dispatching to
    /// `sink` on success.
    pub fn dispatch(&mut self, sink: &mut dyn PdfSink, instruction: Instruction) -> Result<(), Error> {
        let state = &mut self.state;
        match instruction {
            Instruction::FontStandard { name } => {
                require_top_level(state)?;
                sink.load_standard_font(&name)
            }
            Instruction::FontFile { path, assigned_name } => {
                require_top_level(state)?;
                sink.load_file_font(&path, &assigned_name)
            }
            Instruction::ImageJpeg { path, assigned_name } => {
                require_top_level(state)?;
                sink.load_jpeg(&path, &assigned_name)
            }
            Instruction::ImagePng { path, assigned_name } => {
                require_top_level(state)?;
                sink.load_png(&path, &assigned_name)
            }
            Instruction::BeginPage => state.begin_page(),
            Instruction::Dim { width, height } => state.header_dim(width, height),
            Instruction::BleedBox(rect) => state.header_box(BoxWhich::Bleed, rect),
            Instruction::TrimBox(rect) => state.header_box(BoxWhich::Trim, rect),
            Instruction::ArtBox(rect) => state.header_box(BoxWhich::Art, rect),
            Instruction::ViewRotate { degrees } => {
                require_page_header(state)?;
                sink.set_rotation(degrees);
                Ok(())
            }
            Instruction::Body => {
                let (width, height, bleed, trim, art) = state.header_snapshot()?;
                state.body()?;
                sink.begin_page(width, height);
                if let Some(r) = bleed {
                    sink.set_bleed_box(r);
                }
                if let Some(r) = trim {
                    sink.set_trim_box(r);
                }
                if let Some(r) = art {
                    sink.set_art_box(r);
                }
                Ok(())
            }
            Instruction::EndPage => {
                state.end_page()?;
                sink.end_page();
                Ok(())
            }
            Instruction::BeginPath { stroke, fill, clip, even_odd } => {
                state.begin_path(stroke, fill, clip)?;
                self.pending_path_paint = Some((stroke, fill, clip, even_odd));
                Ok(())
            }
            Instruction::EndPath => {
                state.end_path()?;
                let (stroke, fill, clip, even_odd) = self
                    .pending_path_paint
                    .take()
                    .expect("end path validated by a matching begin path");
                sink.paint(stroke, fill, clip, even_odd);
                Ok(())
            }
            Instruction::BeginText { clip: _ } => {
                state.begin_text()?;
                sink.begin_text();
                Ok(())
            }
            Instruction::EndText => {
                state.end_text()?;
                sink.end_text();
                Ok(())
            }
            Instruction::LineWidth(w) => {
                sink.set_line_width(w);
                Ok(())
            }
            Instruction::LineCap(cap) => {
                sink.set_line_cap(cap);
                Ok(())
            }
            Instruction::LineJoin { join, miter_limit } => {
                sink.set_line_join(join, miter_limit);
                Ok(())
            }
            Instruction::LineDash { phase, array } => {
                sink.set_dash(phase, &array);
                Ok(())
            }
            Instruction::LineUndash => {
                sink.clear_dash();
                Ok(())
            }
            Instruction::StrokeColor(color) => {
                sink.set_stroke_color(color);
                Ok(())
            }
            Instruction::FillColor(color) => {
                sink.set_fill_color(color);
                Ok(())
            }
            Instruction::Save => {
                state.body_mut()?.save();
                sink.save();
                Ok(())
            }
            Instruction::Restore => {
                state.body_mut()?.restore()?;
                sink.restore();
                Ok(())
            }
            Instruction::Matrix { a, b, c, d, e, f } => {
                sink.set_matrix(crate::object::transform::Transform { a, b, c, d, e, f });
                Ok(())
            }
            Instruction::Image { assigned_name } => sink.place_image(&assigned_name),
            Instruction::Move(p) => {
                state.path_tracker_mut()?.record_move()?;
                sink.move_to(p);
                Ok(())
            }
            Instruction::Line(p) => {
                state.path_tracker_mut()?.record_line_or_curve(PathInstrKind::Line)?;
                sink.line_to(p);
                Ok(())
            }
            Instruction::Curve(p2, p3, p4) => {
                state.path_tracker_mut()?.record_line_or_curve(PathInstrKind::Curve)?;
                sink.curve_to(p2, p3, p4);
                Ok(())
            }
            Instruction::Close => {
                state.path_tracker_mut()?.record_close()?;
                sink.close_path();
                Ok(())
            }
            Instruction::Rect { corner, width, height } => {
                state.path_tracker_mut()?.record_rect()?;
                sink.rect(corner, width, height);
                Ok(())
            }
            Instruction::Cspace(v) => {
                sink.set_char_space(v);
                Ok(())
            }
            Instruction::Wspace(v) => {
                sink.set_word_space(v);
                Ok(())
            }
            Instruction::Hscale(v) => {
                sink.set_h_scale(v);
                Ok(())
            }
            Instruction::Lead(v) => {
                sink.set_leading(v);
                Ok(())
            }
            Instruction::Font { assigned_name, size } => {
                state.body_mut()?.select_font(assigned_name.clone());
                sink.set_font(&assigned_name, size)
            }
            Instruction::TextRender(mode) => {
                sink.set_text_render_mode(mode);
                Ok(())
            }
            Instruction::Rise(v) => {
                sink.set_rise(v);
                Ok(())
            }
            Instruction::Advance(delta) => {
                sink.advance(delta);
                Ok(())
            }
            Instruction::Write(text) => {
                state.record_write()?;
                sink.write(&text);
                Ok(())
            }
        }
    }
}

fn require_top_level(state: &State) -> Result<(), Error> {
    match state {
        State::TopLevel { .. } => Ok(()),
        _ => Err(Error::state("resource declarations are only valid at top level")),
    }
}

fn require_page_header(state: &State) -> Result<(), Error> {
    match state {
        State::PageHeader { .. } => Ok(()),
        _ => Err(Error::state("instruction is only valid in the page header")),
    }
}

/// Parses and runs an entire LLIL document against a fresh `Processor`,
/// stopping at the first error and annotating it with the source line.
pub fn run_document(source: &str, sink: &mut dyn PdfSink) -> Result<(), LlilError> {
    let lines: Vec<Line> = tokenise_document(source).map_err(|e| LlilError::new(0, e))?;
    let mut processor = Processor::new();
    for line in lines {
        let instruction = parse_instruction(&line.tokens).map_err(|e| LlilError::new(line.number, e))?;
        processor.dispatch(sink, instruction).map_err(|e| LlilError::new(line.number, e))?;
    }
    if !processor.can_stop() {
        return Err(LlilError::new(0, Error::state("document ended without a complete page")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llil::ops::BoxRect as LlilBoxRect;
    use crate::object::transform::Transform;

    struct RecordingSink {
        events: Vec<String>,
    }

    impl RecordingSink {
        fn new() -> Self {
            RecordingSink { events: Vec::new() }
        }
    }

    impl PdfSink for RecordingSink {
        fn load_standard_font(&mut self, assigned_name: &str) -> Result<(), Error> {
            self.events.push(format!("load_standard_font {}", assigned_name));
            Ok(())
        }
        fn load_file_font(&mut self, _path: &str, _assigned_name: &str) -> Result<(), Error> {
            Ok(())
        }
        fn load_jpeg(&mut self, _path: &str, _assigned_name: &str) -> Result<(), Error> {
            Ok(())
        }
        fn load_png(&mut self, _path: &str, _assigned_name: &str) -> Result<(), Error> {
            Ok(())
        }
        fn begin_page(&mut self, width: FixedPoint, height: FixedPoint) {
            self.events.push(format!("begin_page {} {}", width, height));
        }
        fn set_bleed_box(&mut self, _rect: LlilBoxRect) {}
        fn set_trim_box(&mut self, _rect: LlilBoxRect) {}
        fn set_art_box(&mut self, _rect: LlilBoxRect) {}
        fn set_rotation(&mut self, _degrees: i32) {}
        fn end_page(&mut self) {
            self.events.push("end_page".to_string());
        }
        fn save(&mut self) {}
        fn restore(&mut self) {}
        fn set_line_width(&mut self, _w: FixedPoint) {}
        fn set_line_cap(&mut self, _cap: LineCap) {}
        fn set_line_join(&mut self, _join: LineJoin, _miter_limit: Option<FixedPoint>) {}
        fn set_dash(&mut self, _phase: FixedPoint, _array: &[FixedPoint]) {}
        fn clear_dash(&mut self) {}
        fn set_stroke_color(&mut self, _color: Cmyk) {}
        fn set_fill_color(&mut self, _color: Cmyk) {}
        fn set_matrix(&mut self, _t: Transform) {}
        fn place_image(&mut self, _assigned_name: &str) -> Result<(), Error> {
            Ok(())
        }
        fn move_to(&mut self, _p: (FixedPoint, FixedPoint)) {}
        fn line_to(&mut self, _p: (FixedPoint, FixedPoint)) {}
        fn curve_to(&mut self, _p2: (FixedPoint, FixedPoint), _p3: (FixedPoint, FixedPoint), _p4: (FixedPoint, FixedPoint)) {}
        fn close_path(&mut self) {}
        fn rect(&mut self, _corner: (FixedPoint, FixedPoint), _width: FixedPoint, _height: FixedPoint) {}
        fn paint(&mut self, stroke: bool, fill: bool, clip: bool, even_odd: bool) {
            self.events.push(format!("paint {} {} {} {}", stroke, fill, clip, even_odd));
        }
        fn begin_text(&mut self) {
            self.events.push("begin_text".to_string());
        }
        fn end_text(&mut self) {
            self.events.push("end_text".to_string());
        }
        fn set_char_space(&mut self, _v: FixedPoint) {}
        fn set_word_space(&mut self, _v: FixedPoint) {}
        fn set_h_scale(&mut self, _v: FixedPoint) {}
        fn set_leading(&mut self, _v: FixedPoint) {}
        fn set_font(&mut self, assigned_name: &str, _size: FixedPoint) -> Result<(), Error> {
            self.events.push(format!("set_font {}", assigned_name));
            Ok(())
        }
        fn set_text_render_mode(&mut self, _mode: u8) {}
        fn set_rise(&mut self, _v: FixedPoint) {}
        fn advance(&mut self, _delta: Option<(FixedPoint, FixedPoint)>) {}
        fn write(&mut self, text: &str) {
            self.events.push(format!("write {}", text));
        }
        fn finish(self: Box<Self>) -> Result<Vec<u8>, Error> {
            Ok(Vec::new())
        }
    }

    fn sample_document() -> &'static str {
        "scent-assembly 1.0\n\
         FontStandard \"Helvetica\"\n\
         BeginPage\n\
         Dim 612 792\n\
         Body\n\
         BeginPath true false false false\n\
         Move 0 0\n\
         Line 100 0\n\
         EndPath\n\
         EndPage\n"
    }

    #[test]
    fn runs_a_minimal_page_document() {
        let mut sink = RecordingSink::new();
        run_document(sample_document(), &mut sink).unwrap();
        assert_eq!(
            sink.events,
            vec![
                "load_standard_font Helvetica".to_string(),
                "begin_page 612 792".to_string(),
                "paint true false false false".to_string(),
                "end_page".to_string(),
            ]
        );
    }

    /// S7: a font selected before `save`, overridden, then restored, must
    /// be active again for the following write.
    fn s7_document() -> &'static str {
        "scent-assembly 1.0\n\
         FontStandard \"Helvetica\"\n\
         FontStandard \"Times-Roman\"\n\
         BeginPage\n\
         Dim 100 100\n\
         Body\n\
         BeginText false\n\
         Font \"Helvetica\" 12\n\
         Save\n\
         Font \"Times-Roman\" 14\n\
         Restore\n\
         Write \"x\"\n\
         EndText\n\
         EndPage\n"
    }

    #[test]
    fn s7_restore_reverts_active_font() {
        let mut sink = RecordingSink::new();
        run_document(s7_document(), &mut sink).unwrap();
        assert!(sink.events.contains(&"write x".to_string()));
    }

    #[test]
    fn write_without_font_selection_is_rejected() {
        let doc = "scent-assembly 1.0\n\
                   BeginPage\n\
                   Dim 100 100\n\
                   Body\n\
                   BeginText false\n\
                   Write \"x\"\n\
                   EndText\n\
                   EndPage\n";
        let mut sink = RecordingSink::new();
        assert!(run_document(doc, &mut sink).is_err());
    }

    #[test]
    fn line_dash_rejects_even_or_short_argument_counts() {
        let tokens = vec![Token::Name("LineDash".to_string()), Token::Number("5".to_string())];
        assert!(parse_instruction(&tokens).is_err());

        let tokens = vec![
            Token::Name("LineDash".to_string()),
            Token::Number("5".to_string()),
            Token::Number("10".to_string()),
        ];
        assert!(parse_instruction(&tokens).is_err());

        let tokens = vec![
            Token::Name("LineDash".to_string()),
            Token::Number("5".to_string()),
            Token::Number("10".to_string()),
            Token::Number("3".to_string()),
        ];
        let instr = parse_instruction(&tokens).unwrap();
        match instr {
            Instruction::LineDash { phase, array } => {
                assert_eq!(phase, FixedPoint::parse("5").unwrap());
                assert_eq!(array, vec![FixedPoint::parse("10").unwrap(), FixedPoint::parse("3").unwrap()]);
            }
            other => panic!("expected LineDash, got {:?}", other),
        }
    }

    #[test]
    fn document_without_a_page_cannot_stop() {
        let doc = "scent-assembly 1.0\nFontStandard \"Helvetica\"\n";
        let mut sink = RecordingSink::new();
        assert!(run_document(doc, &mut sink).is_err());
    }
}
