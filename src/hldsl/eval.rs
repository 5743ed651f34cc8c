//! C5: the HLDSL evaluator. Walks the tokenised entity stream, drives the
//! interpreter stack/namespace/accumulator (spec §3-§4.6), and for the four
//! drawing operations and the page lifecycle hands off to the lowering layer
//! (`hldsl::lower`) and the shared LLIL `Processor`. Grounded in the
//! teacher's `PdfDocument`-level orchestration (`pdf_document.rs`), which
//! likewise owns one page-sequencing loop driving a lower-level writer.

use std::collections::HashSet;
use std::rc::Rc;

use crate::atom::Atom;
use crate::dialect::Dialect;
use crate::error::Error;
use crate::fixed::FixedPoint;
use crate::hldsl::builder::AccumulatorRegister;
use crate::hldsl::namespace::Namespace;
use crate::hldsl::ops;
use crate::hldsl::stack::EvalStack;
use crate::hldsl::token::{Entity, Tokeniser};
use crate::llil::ops::{BoxRect, Instruction};
use crate::llil::Processor;
use crate::object::font::Font;
use crate::object::image::{Image, ImageFormat};
use crate::object::ream::{Margins, Ream};
use crate::object::ObjectValue;
use crate::pdf::PdfSink;
use crate::validate::validate_content_string;
use crate::value::Value;

/// The evaluator owns the stack, namespace, and accumulator for the full
/// program and drives a single `Processor`/`PdfSink` pair across every page,
/// so graphics state declared between pages (fonts, images) and within a
/// page's drawing ops (`Save`/`Restore` nesting) is never reset mid-run.
pub struct Evaluator<'a> {
    dialect: Dialect,
    stack: EvalStack,
    namespace: Namespace,
    accumulator: AccumulatorRegister,
    processor: Processor,
    sink: &'a mut dyn PdfSink,
    page_open: bool,
    loaded_fonts: HashSet<String>,
    loaded_images: HashSet<String>,
}

impl<'a> Evaluator<'a> {
    fn new(dialect: Dialect, sink: &'a mut dyn PdfSink) -> Self {
        Evaluator {
            dialect,
            stack: EvalStack::new(),
            namespace: Namespace::new(),
            accumulator: AccumulatorRegister::new(),
            processor: Processor::new(),
            sink,
            page_open: false,
            loaded_fonts: HashSet::new(),
            loaded_images: HashSet::new(),
        }
    }

    /// Runs a complete HLDSL source text against `sink`, consuming the
    /// mandatory header first to pick the dialect before dispatching the
    /// body.
    pub fn run(source: &str, sink: &'a mut dyn PdfSink) -> Result<(), Error> {
        let entities = Tokeniser::new(source).tokenise()?;
        let mut cursor = 0usize;
        let dialect = parse_header(&entities, &mut cursor)?;
        let mut evaluator = Evaluator::new(dialect, sink);
        evaluator.run_body(&entities[cursor..])
    }

    pub(crate) fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub(crate) fn emit(&mut self, instruction: Instruction) -> Result<(), Error> {
        self.processor.dispatch(&mut *self.sink, instruction)
    }

    pub(crate) fn pop(&mut self) -> Result<Value, Error> {
        self.stack.pop()
    }

    pub(crate) fn push(&mut self, value: Value) {
        self.stack.push(value)
    }

    fn run_body(&mut self, entities: &[Entity]) -> Result<(), Error> {
        for entity in entities {
            match entity {
                Entity::ContentString(s) => {
                    validate_content_string(s)?;
                    self.stack.push(Value::String(Rc::from(s.as_str())));
                }
                Entity::AtomString(s) => {
                    self.stack.push(Value::Atom(Atom::new(s.clone())));
                }
                Entity::Number(n) => self.stack.push(Value::Integer(*n)),
                Entity::DeclareVariable(name) => {
                    let value = self.stack.pop()?;
                    self.namespace.declare_variable(name, value)?;
                }
                Entity::DeclareConstant(name) => {
                    let value = self.stack.pop()?;
                    self.namespace.declare_constant(name, value)?;
                }
                Entity::Assign(name) => {
                    let value = self.stack.pop()?;
                    self.namespace.assign(name, value)?;
                }
                Entity::Get(name) => {
                    let value = self.namespace.get(name)?;
                    self.stack.push(value);
                }
                Entity::GroupBegin => self.stack.begin_group(),
                Entity::GroupEnd => self.stack.end_group()?,
                Entity::ArrayBegin => self.stack.begin_array(),
                Entity::ArrayEnd => self.stack.end_array()?,
                Entity::Operation(name) => self.dispatch_operation(name)?,
                Entity::MetaBegin | Entity::MetaEnd | Entity::MetaWord(_) => {
                    return Err(Error::syntax("a meta block is only valid at the start of a program"));
                }
                Entity::EndOfFile => break,
            }
        }

        if !self.stack.is_empty() {
            return Err(Error::state("program must leave the stack empty"));
        }
        if self.page_open {
            return Err(Error::state("program must not end with an open page"));
        }
        if !self.accumulator.is_null() {
            return Err(Error::state("program must not end with an object under construction"));
        }
        Ok(())
    }

    fn dispatch_operation(&mut self, name: &str) -> Result<(), Error> {
        if ops::dispatch(name, self.dialect, &mut self.stack, &mut self.accumulator)? {
            if matches!(name, "font_get" | "font_load" | "image_load") {
                self.register_resource(name)?;
            }
            return Ok(());
        }

        match name {
            "begin_page" => self.op_begin_page(),
            "end_page" => self.op_end_page(),
            "draw_path" => self.op_draw_path(),
            "draw_text" => self.op_draw_text(),
            "draw_image" => self.op_draw_image(),
            "draw_embed" => {
                if self.dialect != Dialect::VariantB {
                    return Err(Error::state("draw_embed requires the scent-embed dialect"));
                }
                self.op_draw_embed()
            }
            other => Err(Error::name(format!("unrecognised operation {:?}", other))),
        }
    }

    /// `font_get`/`font_load`/`image_load` only build an object value in
    /// `hldsl::ops`; the LLIL resource-registration instructions they imply
    /// can only be dispatched while the processor is at the top level, so
    /// the evaluator issues them here, immediately after the object lands on
    /// the stack. A font_get of a synthetic (dictionary) font introduces no
    /// new resource: its base was already registered when it was itself
    /// built.
    fn register_resource(&mut self, op_name: &str) -> Result<(), Error> {
        let object = self.stack.peek()?.as_object()?.clone();
        match (op_name, object) {
            ("font_load", ObjectValue::Font(font)) => {
                if let Font::File { path, assigned_name } = font.as_ref() {
                    if self.loaded_fonts.insert(assigned_name.to_string()) {
                        self.emit(Instruction::FontFile {
                            path: path.to_string(),
                            assigned_name: assigned_name.to_string(),
                        })?;
                    }
                }
            }
            ("font_get", ObjectValue::Font(font)) => {
                if let Font::BuiltIn { name } = font.as_ref() {
                    if self.loaded_fonts.insert(name.to_string()) {
                        self.emit(Instruction::FontStandard { name: name.to_string() })?;
                    }
                }
            }
            ("image_load", ObjectValue::Image(image)) => {
                if self.loaded_images.insert(image.path.clone()) {
                    let instruction = image_load_instruction(&image);
                    self.emit(instruction)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn op_begin_page(&mut self) -> Result<(), Error> {
        if self.page_open {
            return Err(Error::state("begin_page requires no page already open"));
        }
        let ream = expect_ream(self.stack.pop()?)?;
        self.emit(Instruction::BeginPage)?;
        self.emit(Instruction::Dim { width: ream.width, height: ream.height })?;
        for (kind, margins) in ream.boxes.iter() {
            let rect = box_rect(&ream, margins);
            let instruction = match kind {
                crate::object::ream::BoxKind::BleedBox => Instruction::BleedBox(rect),
                crate::object::ream::BoxKind::TrimBox => Instruction::TrimBox(rect),
                crate::object::ream::BoxKind::ArtBox => Instruction::ArtBox(rect),
            };
            self.emit(instruction)?;
        }
        if ream.rotation != crate::object::ream::Rotation::None {
            self.emit(Instruction::ViewRotate { degrees: ream.rotation.degrees() })?;
        }
        self.emit(Instruction::Body)?;
        self.page_open = true;
        Ok(())
    }

    fn op_end_page(&mut self) -> Result<(), Error> {
        if !self.page_open {
            return Err(Error::state("end_page requires an open page"));
        }
        self.emit(Instruction::EndPage)?;
        self.page_open = false;
        Ok(())
    }
}

fn image_load_instruction(image: &Image) -> Instruction {
    match image.format {
        ImageFormat::Jpeg => {
            Instruction::ImageJpeg { path: image.path.clone(), assigned_name: image.path.clone() }
        }
        ImageFormat::Png => {
            Instruction::ImagePng { path: image.path.clone(), assigned_name: image.path.clone() }
        }
    }
}

fn expect_ream(value: Value) -> Result<Rc<Ream>, Error> {
    match value {
        Value::Object(ObjectValue::Ream(r)) => Ok(r),
        other => Err(Error::ty(format!("expected a Ream object, found {}", other.kind_name()))),
    }
}

/// A boundary box's margins are insets from each of the ream's four edges.
fn box_rect(ream: &Ream, margins: &Margins) -> BoxRect {
    BoxRect {
        x0: margins.left,
        y0: margins.bottom,
        x1: ream.width - margins.right,
        y1: ream.height - margins.top,
    }
}

/// Tokenises just far enough to read the header's dialect token, without
/// running the program. Lets a caller validate a dialect expectation before
/// committing to a full `Evaluator::run`.
pub fn peek_dialect(source: &str) -> Result<Dialect, Error> {
    let entities = Tokeniser::new(source).tokenise()?;
    let mut cursor = 0usize;
    parse_header(&entities, &mut cursor)
}

/// Consumes the mandatory 4-entity header meta (`<% scent 1.0 %>` or
/// `<% scent-embed 1.0 %>`), then, for Dialect B, the four bound-* metas and
/// the trailing `body` meta (spec §6). Rejects any version other than
/// exactly `"1.0"`.
fn parse_header(entities: &[Entity], cursor: &mut usize) -> Result<Dialect, Error> {
    let words = parse_meta_block(entities, cursor)?;
    if words.len() != 2 {
        return Err(Error::syntax("the header meta must contain exactly a dialect token and a version token"));
    }
    let dialect = match words[0].as_str() {
        "scent" => Dialect::VariantA,
        "scent-embed" => Dialect::VariantB,
        other => return Err(Error::syntax(format!("unrecognised HLDSL header token {:?}", other))),
    };
    if words[1] != "1.0" {
        return Err(Error::syntax(format!("unsupported HLDSL version {:?}, expected \"1.0\"", words[1])));
    }

    if dialect == Dialect::VariantB {
        expect_bound_meta(entities, cursor, "bound-x")?;
        expect_bound_meta(entities, cursor, "bound-y")?;
        expect_bound_meta(entities, cursor, "bound-w")?;
        expect_bound_meta(entities, cursor, "bound-h")?;
        let body_words = parse_meta_block(entities, cursor)?;
        if body_words != ["body"] {
            return Err(Error::syntax("expected a \"body\" meta after the bound-* header metas"));
        }
    }

    Ok(dialect)
}

fn parse_meta_block(entities: &[Entity], cursor: &mut usize) -> Result<Vec<String>, Error> {
    match entities.get(*cursor) {
        Some(Entity::MetaBegin) => *cursor += 1,
        _ => return Err(Error::syntax("expected a meta block")),
    }
    let mut words = Vec::new();
    loop {
        match entities.get(*cursor) {
            Some(Entity::MetaWord(w)) => {
                words.push(w.clone());
                *cursor += 1;
            }
            Some(Entity::MetaEnd) => {
                *cursor += 1;
                break;
            }
            _ => return Err(Error::syntax("unterminated meta block")),
        }
    }
    Ok(words)
}

fn expect_bound_meta(entities: &[Entity], cursor: &mut usize, keyword: &str) -> Result<FixedPoint, Error> {
    let words = parse_meta_block(entities, cursor)?;
    if words.len() != 2 || words[0] != keyword {
        return Err(Error::syntax(format!("expected a {:?} meta-command", keyword)));
    }
    FixedPoint::parse(&words[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::writer::LopdfWriter;

    fn compile(source: &str) -> Result<(), Error> {
        let mut sink = LopdfWriter::new();
        Evaluator::run(source, &mut sink)
    }

    #[test]
    fn rejects_unknown_dialect_token() {
        let err = compile("<% unknown 1.0 %>\n%EOF%\n").unwrap_err();
        assert_eq!(err.kind(), "SyntaxError");
    }

    #[test]
    fn rejects_unsupported_version() {
        let err = compile("<% scent 2.0 %>\n%EOF%\n").unwrap_err();
        assert_eq!(err.kind(), "SyntaxError");
    }

    #[test]
    fn empty_program_after_header_is_valid() {
        assert!(compile("<% scent 1.0 %>\n%EOF%\n").is_ok());
    }

    #[test]
    fn leftover_stack_value_is_rejected() {
        let err = compile("<% scent 1.0 %>\n1\n%EOF%\n").unwrap_err();
        assert_eq!(err.kind(), "StateError");
    }

    #[test]
    fn dialect_b_requires_bound_and_body_metas() {
        let err = compile("<% scent-embed 1.0 %>\n%EOF%\n").unwrap_err();
        assert_eq!(err.kind(), "SyntaxError");
        assert!(compile(
            "<% scent-embed 1.0 %>\n<% bound-x 0 %>\n<% bound-y 0 %>\n<% bound-w 100 %>\n<% bound-h 100 %>\n<% body %>\n%EOF%\n"
        )
        .is_ok());
    }

    #[test]
    fn begin_page_requires_a_ream_on_the_stack() {
        let err = compile("<% scent 1.0 %>\nbegin_page\n%EOF%\n").unwrap_err();
        assert_eq!(err.kind(), "StateError");
    }
}
