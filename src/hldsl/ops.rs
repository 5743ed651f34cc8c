//! HLDSL operation dispatch (C6 object builders, plus the stack-level
//! "Basic" operations). This is everything the evaluator's main loop
//! delegates to once it has already handled variable/constant/group/array
//! entities itself; `begin_page`/`end_page` and the four drawing operations
//! stay in `hldsl::eval`/`hldsl::lower`, since those need the page register
//! and the lowering path this module has no access to.
//!
//! Grounded in the teacher's per-concern object modules (`color.rs`,
//! `graphics.rs`, `font.rs`, `matrix.rs`) reshaped into one dispatch table,
//! the way the teacher's own `pdf_document.rs` groups builder methods by the
//! kind of thing under construction.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::atom::{expect_one_of, Atom};
use crate::dialect::Dialect;
use crate::error::Error;
use crate::fixed::{self, FixedPoint};
use crate::hldsl::builder::{
    Accumulator, AccumulatorRegister, PartialColumn, PartialPath, PartialReam, PartialStroke, PartialStyle,
};
use crate::hldsl::stack::EvalStack;
use crate::object::clipping::{validate_clipping, ClipComponent, ClipShape, Clipping};
use crate::object::color::{validate_channel, Cmyk};
use crate::object::font::{derive_synthetic, Alterations, Font};
use crate::object::image::{validate_image_metadata, ColorModel, Image, ImageFormat};
use crate::object::path::{validate_path, FillRule, Path};
use crate::object::ream::{validate_ream, BoxKind, Margins, Ream, Rotation};
use crate::object::stroke::{validate_dash_array, validate_stroke, DashPattern, LineCap, LineJoin, Stroke};
use crate::object::style::{validate_style, Style};
use crate::object::transform::{concat_sequence, Transform};
use crate::object::ObjectValue;
use crate::validate::parse_cmyk_string;
use crate::value::{Dictionary, Value};

/// Dispatches a single HLDSL operation name. Returns `Ok(false)` for a name
/// this module doesn't own (the page/drawing categories), so the caller can
/// try those next; an unrecognised name anywhere is the caller's concern.
pub fn dispatch(
    name: &str,
    dialect: Dialect,
    stack: &mut EvalStack,
    accumulator: &mut AccumulatorRegister,
) -> Result<bool, Error> {
    match name {
        "pop" => {
            stack.pop()?;
        }
        "dup" => {
            let v = stack.peek()?.clone();
            stack.push(v);
        }
        "null" => stack.push(Value::Null),
        "dict" => op_dict(stack)?,
        "sep" => op_sep(dialect, stack)?,
        "concat" => op_concat(dialect, stack)?,

        "ream" => op_ream(dialect, stack)?,
        "start_ream" => op_start_ream(dialect, accumulator)?,
        "ream_dim" => op_ream_dim(stack, accumulator)?,
        "ream_rotate" => op_ream_rotate(stack, accumulator)?,
        "ream_bound" => op_ream_bound(stack, accumulator)?,
        "ream_unbound" => op_ream_unbound(stack, accumulator)?,
        "ream_derive" => op_ream_derive(dialect, stack, accumulator)?,
        "finish_ream" => op_finish_ream(dialect, stack, accumulator)?,

        "gray" => op_gray(stack)?,
        "cmyk" => op_cmyk(stack)?,
        "fgray" => op_fgray(stack)?,
        "fcmyk" => op_fcmyk(stack)?,

        "dash_pattern" => op_dash_pattern(dialect, stack)?,
        "stroke_style" => op_stroke_style(dialect, stack)?,
        "stroke_derive" => op_stroke_derive(stack, accumulator)?,
        "miter_angle" => op_miter_angle(stack)?,
        "start_stroke" => op_start_stroke(dialect, accumulator)?,
        "stroke_width" => op_stroke_width(stack, accumulator)?,
        "stroke_color" => op_stroke_color(stack, accumulator)?,
        "stroke_cap" => op_stroke_cap(stack, accumulator)?,
        "stroke_join" => op_stroke_join(stack, accumulator)?,
        "stroke_join_r" => op_stroke_join_r(stack, accumulator)?,
        "stroke_dash" => op_stroke_dash(dialect, stack, accumulator)?,
        "stroke_undash" => op_stroke_undash(accumulator)?,
        "finish_stroke" => op_finish_stroke(dialect, stack, accumulator)?,

        "font_get" => op_font_get(dialect, stack)?,
        "font_load" => op_font_load(stack)?,

        "image_load" => op_image_load(stack)?,

        "start_path" => accumulator.start(Accumulator::Path(PartialPath::default()))?,
        "start_motion" => op_start_motion(stack, accumulator)?,
        "motion_line" => op_motion_line(stack, accumulator)?,
        "motion_curve" => op_motion_curve(stack, accumulator)?,
        "finish_motion" => current_path(accumulator)?.finish_motion()?,
        "close_motion" => current_path(accumulator)?.close_motion()?,
        "path_rect" => op_path_rect(stack, accumulator)?,
        "path_include" => op_path_include(stack, accumulator)?,
        "finish_path" => op_finish_path(stack, accumulator)?,

        "tx_identity" => stack.push(Value::Object(ObjectValue::Transform(Rc::new(Transform::identity())))),
        "tx_translate" => op_tx_translate(stack)?,
        "tx_rotate" => op_tx_rotate(stack)?,
        "tx_scale" => op_tx_scale(stack)?,
        "tx_seq" => op_tx_seq(stack)?,

        "start_style" => accumulator.start(Accumulator::Style(PartialStyle::default()))?,
        "style_font" => op_style_font(stack, accumulator)?,
        "style_size" => op_style_size(stack, accumulator)?,
        "style_stroke" => op_style_stroke(stack, accumulator)?,
        "style_fill" => op_style_fill(stack, accumulator)?,
        "style_cspace" => op_style_cspace(stack, accumulator)?,
        "style_wspace" => op_style_wspace(stack, accumulator)?,
        "style_hscale" => op_style_hscale(stack, accumulator)?,
        "style_rise" => op_style_rise(stack, accumulator)?,
        "style_derive" => op_style_derive(stack, accumulator)?,
        "finish_style" => op_finish_style(stack, accumulator)?,
        "style_setw" => op_style_size(stack, accumulator)?,
        "style_setwc" => op_style_setwc(stack, accumulator)?,

        "start_column" => accumulator.start(Accumulator::Column(PartialColumn::default()))?,
        "start_line" => op_start_line(stack, accumulator)?,
        "line_span" => op_line_span(stack, accumulator)?,
        "finish_line" => current_column(accumulator)?.finish_line()?,
        "finish_column" => op_finish_column(stack, accumulator)?,

        "clip" => op_clip(stack)?,

        _ => return Ok(false),
    }
    Ok(true)
}

fn require_variant_b(dialect: Dialect, op: &str) -> Result<(), Error> {
    if dialect != Dialect::VariantB {
        return Err(Error::state(format!("{} is only valid in this dialect", op)));
    }
    Ok(())
}

fn require_variant_a(dialect: Dialect, op: &str) -> Result<(), Error> {
    if dialect != Dialect::VariantA {
        return Err(Error::state(format!("{} is only valid in this dialect", op)));
    }
    Ok(())
}

fn pop_integer(stack: &mut EvalStack) -> Result<i64, Error> {
    stack.pop()?.as_integer()
}

fn pop_fixed(stack: &mut EvalStack) -> Result<FixedPoint, Error> {
    stack.pop()?.as_fixed()
}

fn pop_atom(stack: &mut EvalStack) -> Result<Atom, Error> {
    Ok(stack.pop()?.as_atom()?.clone())
}

fn pop_string(stack: &mut EvalStack) -> Result<Rc<str>, Error> {
    Ok(stack.pop()?.as_string()?.clone())
}

fn pop_dict(stack: &mut EvalStack) -> Result<Rc<Dictionary>, Error> {
    Ok(stack.pop()?.as_dictionary()?.clone())
}

fn pop_object(stack: &mut EvalStack) -> Result<ObjectValue, Error> {
    Ok(stack.pop()?.as_object()?.clone())
}

fn expect_color(v: ObjectValue) -> Result<Cmyk, Error> {
    match v {
        ObjectValue::Color(c) => Ok(*c),
        other => Err(Error::ty(format!("expected Color, found {}", other.kind_name()))),
    }
}

fn expect_font(v: ObjectValue) -> Result<Rc<Font>, Error> {
    match v {
        ObjectValue::Font(f) => Ok(f),
        other => Err(Error::ty(format!("expected Font, found {}", other.kind_name()))),
    }
}

fn expect_transform(v: ObjectValue) -> Result<Transform, Error> {
    match v {
        ObjectValue::Transform(t) => Ok(*t),
        other => Err(Error::ty(format!("expected Transform, found {}", other.kind_name()))),
    }
}

fn expect_path(v: ObjectValue) -> Result<Rc<Path>, Error> {
    match v {
        ObjectValue::Path(p) => Ok(p),
        other => Err(Error::ty(format!("expected Path, found {}", other.kind_name()))),
    }
}

fn expect_ream(v: ObjectValue) -> Result<Rc<Ream>, Error> {
    match v {
        ObjectValue::Ream(r) => Ok(r),
        other => Err(Error::ty(format!("expected Ream, found {}", other.kind_name()))),
    }
}

fn expect_stroke(v: ObjectValue) -> Result<Rc<Stroke>, Error> {
    match v {
        ObjectValue::Stroke(s) => Ok(s),
        other => Err(Error::ty(format!("expected Stroke, found {}", other.kind_name()))),
    }
}

fn expect_style(v: ObjectValue) -> Result<Rc<Style>, Error> {
    match v {
        ObjectValue::Style(s) => Ok(s),
        other => Err(Error::ty(format!("expected Style, found {}", other.kind_name()))),
    }
}

fn dict_get<'a>(dict: &'a Dictionary, key: &str) -> Option<&'a Value> {
    dict.get(&Atom::new(key))
}

fn dict_require<'a>(dict: &'a Dictionary, key: &str) -> Result<&'a Value, Error> {
    dict_get(dict, key).ok_or_else(|| Error::state(format!("dictionary is missing required key {:?}", key)))
}

// ---------------------------------------------------------------- Basic ---

fn op_dict(stack: &mut EvalStack) -> Result<(), Error> {
    let count = pop_integer(stack)?;
    if count < 0 || count % 2 != 0 {
        return Err(Error::state("dict requires an even, non-negative number of values"));
    }
    let mut dict = Dictionary::new();
    for _ in 0..count / 2 {
        let value = stack.pop()?;
        let key = pop_atom(stack)?;
        dict.insert(key, value);
    }
    stack.push(Value::Dictionary(Rc::new(dict)));
    Ok(())
}

/// Pushes the empty string: a neutral operand a program can interleave
/// between `concat` calls when joining more than two strings (`a sep b
/// concat concat` joins the same as `a concat b concat`, only with an
/// explicit placeholder at each join point). Open Question: the spec lists
/// `sep` in the Basic ops table without defining it; this is the narrowest
/// reading consistent with `concat` only ever taking two Strings.
fn op_sep(dialect: Dialect, stack: &mut EvalStack) -> Result<(), Error> {
    require_variant_b(dialect, "sep")?;
    stack.push(Value::String(Rc::from("")));
    Ok(())
}

fn op_concat(dialect: Dialect, stack: &mut EvalStack) -> Result<(), Error> {
    require_variant_b(dialect, "concat")?;
    let b = stack.pop()?;
    let a = stack.pop()?;
    match (a, b) {
        (Value::String(a), Value::String(b)) => {
            stack.push(Value::String(Rc::from(format!("{}{}", a, b))));
            Ok(())
        }
        (a, b) => Err(Error::ty(format!("concat expects two Strings, found {} and {}", a.kind_name(), b.kind_name()))),
    }
}

// ----------------------------------------------------------------- Ream ---

fn margins_from_dict(dict: &Dictionary) -> Result<Margins, Error> {
    Ok(Margins {
        left: dict_require(dict, "LeftMargin")?.as_fixed()?,
        right: dict_require(dict, "RightMargin")?.as_fixed()?,
        top: dict_require(dict, "TopMargin")?.as_fixed()?,
        bottom: dict_require(dict, "BottomMargin")?.as_fixed()?,
    })
}

fn box_kind_from_atom(atom: &Atom) -> Result<BoxKind, Error> {
    match expect_one_of(atom, &["ArtBox", "TrimBox", "BleedBox"])? {
        "ArtBox" => Ok(BoxKind::ArtBox),
        "TrimBox" => Ok(BoxKind::TrimBox),
        "BleedBox" => Ok(BoxKind::BleedBox),
        _ => unreachable!(),
    }
}

fn ream_from_dict(dict: &Dictionary) -> Result<Ream, Error> {
    let width = dict_require(dict, "Width")?.as_fixed()?;
    let height = dict_require(dict, "Height")?.as_fixed()?;
    let rotation = match dict_get(dict, "Rotation") {
        Some(v) => Rotation::from_degrees(v.as_integer()? as i32)?,
        None => Rotation::None,
    };
    let mut boxes = BTreeMap::new();
    for (key, kind) in [("ArtBox", BoxKind::ArtBox), ("TrimBox", BoxKind::TrimBox), ("BleedBox", BoxKind::BleedBox)] {
        if let Some(v) = dict_get(dict, key) {
            boxes.insert(kind, margins_from_dict(v.as_dictionary()?)?);
        }
    }
    Ok(Ream { width, height, rotation, boxes })
}

fn op_ream(dialect: Dialect, stack: &mut EvalStack) -> Result<(), Error> {
    require_variant_a(dialect, "ream")?;
    let dict = pop_dict(stack)?;
    let ream = ream_from_dict(&dict)?;
    validate_ream(dialect, &ream)?;
    stack.push(Value::Object(ObjectValue::Ream(Rc::new(ream))));
    Ok(())
}

fn op_start_ream(dialect: Dialect, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    require_variant_b(dialect, "start_ream")?;
    accumulator.start(Accumulator::Ream(PartialReam::default()))
}

fn current_ream(accumulator: &mut AccumulatorRegister) -> Result<&mut PartialReam, Error> {
    match accumulator.current_mut()? {
        Accumulator::Ream(r) => Ok(r),
        other => Err(Error::state(format!("expected an open ream builder, found {}", other.kind_name()))),
    }
}

fn op_ream_dim(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let height = pop_fixed(stack)?;
    let width = pop_fixed(stack)?;
    let ream = current_ream(accumulator)?;
    ream.width = Some(width);
    ream.height = Some(height);
    Ok(())
}

fn op_ream_rotate(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let degrees = pop_integer(stack)?;
    let rotation = Rotation::from_degrees(degrees as i32)?;
    current_ream(accumulator)?.rotation = Some(rotation);
    Ok(())
}

fn op_ream_bound(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let bottom = pop_fixed(stack)?;
    let top = pop_fixed(stack)?;
    let right = pop_fixed(stack)?;
    let left = pop_fixed(stack)?;
    let kind = box_kind_from_atom(&pop_atom(stack)?)?;
    current_ream(accumulator)?.boxes.insert(kind, Margins { left, right, top, bottom });
    Ok(())
}

fn op_ream_unbound(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let kind = box_kind_from_atom(&pop_atom(stack)?)?;
    current_ream(accumulator)?.boxes.remove(&kind);
    Ok(())
}

fn op_ream_derive(dialect: Dialect, stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    require_variant_b(dialect, "ream_derive")?;
    let existing = expect_ream(pop_object(stack)?)?;
    match accumulator.current_mut()? {
        Accumulator::Ream(r) => {
            *r = PartialReam::from_existing(&existing);
            Ok(())
        }
        other => Err(Error::state(format!("expected an open ream builder, found {}", other.kind_name()))),
    }
}

fn op_finish_ream(dialect: Dialect, stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let partial = match accumulator.take()? {
        Accumulator::Ream(r) => r,
        other => return Err(Error::state(format!("expected an open ream builder, found {}", other.kind_name()))),
    };
    let ream = partial.finish()?;
    validate_ream(dialect, &ream)?;
    stack.push(Value::Object(ObjectValue::Ream(Rc::new(ream))));
    Ok(())
}

// ---------------------------------------------------------------- Color ---

fn op_gray(stack: &mut EvalStack) -> Result<(), Error> {
    let percent = validate_channel(pop_integer(stack)? as i32)?;
    stack.push(Value::Object(ObjectValue::Color(Rc::new(Cmyk::from_gray(percent)))));
    Ok(())
}

fn op_cmyk(stack: &mut EvalStack) -> Result<(), Error> {
    let k = validate_channel(pop_integer(stack)? as i32)?;
    let y = validate_channel(pop_integer(stack)? as i32)?;
    let m = validate_channel(pop_integer(stack)? as i32)?;
    let c = validate_channel(pop_integer(stack)? as i32)?;
    stack.push(Value::Object(ObjectValue::Color(Rc::new(Cmyk::new(c, m, y, k)))));
    Ok(())
}

/// `%` followed by 2 hex digits, the single-channel analogue of the CMYK hex
/// string format (`validate_cmyk_string` in `crate::validate`).
fn parse_gray_hex_string(s: &str) -> Result<u8, Error> {
    let bytes = s.as_bytes();
    if bytes.len() != 3 || bytes[0] != b'%' || !s[1..].bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::syntax(format!("gray hex string {:?} must be '%' followed by 2 hex digits", s)));
    }
    u8::from_str_radix(&s[1..], 16).map_err(|_| Error::syntax(format!("invalid hex pair in {:?}", s)))
}

fn op_fgray(stack: &mut EvalStack) -> Result<(), Error> {
    let s = pop_string(stack)?;
    let channel = parse_gray_hex_string(&s)?;
    stack.push(Value::Object(ObjectValue::Color(Rc::new(Cmyk::from_gray(channel)))));
    Ok(())
}

fn op_fcmyk(stack: &mut EvalStack) -> Result<(), Error> {
    let s = pop_string(stack)?;
    let channels = parse_cmyk_string(&s)?;
    stack.push(Value::Object(ObjectValue::Color(Rc::new(Cmyk::from_hex_channels(channels)))));
    Ok(())
}

// --------------------------------------------------------------- Stroke ---

fn cap_from_atom(atom: &Atom) -> Result<LineCap, Error> {
    match expect_one_of(atom, &["Butt", "Round", "Square"])? {
        "Butt" => Ok(LineCap::Butt),
        "Round" => Ok(LineCap::Round),
        "Square" => Ok(LineCap::Square),
        _ => unreachable!(),
    }
}

/// Reads a dash pattern nested under a Dialect A dict's `DashPattern` key:
/// the count and each magnitude travel as positional keys (`"0"`, `"1"`, ...)
/// inside a nested dictionary, since `Value` has no array/list variant of
/// its own for an arbitrary-length list to ride inside a flat `Dictionary`.
fn dash_pattern_from_dict(dict: &Dictionary, phase_value: Option<&Value>) -> Result<DashPattern, Error> {
    let count = dict_require(dict, "Count")?.as_integer()?;
    if count < 0 {
        return Err(Error::domain("dash pattern count must be non-negative"));
    }
    let mut array = Vec::with_capacity(count as usize);
    for i in 0..count {
        array.push(dict_require(dict, &i.to_string())?.as_fixed()?);
    }
    let phase = match phase_value {
        Some(v) => v.as_fixed()?,
        None => FixedPoint::zero(),
    };
    Ok(DashPattern { array, phase })
}

fn stroke_from_dict(dict: &Dictionary) -> Result<Stroke, Error> {
    let color = expect_color(dict_require(dict, "Color")?.as_object()?.clone())?;
    let width = dict_require(dict, "Width")?.as_fixed()?;
    let cap = match dict_get(dict, "Cap") {
        Some(v) => cap_from_atom(v.as_atom()?)?,
        None => LineCap::Butt,
    };
    let (join, miter_limit) = match dict_get(dict, "Join") {
        Some(v) => match expect_one_of(v.as_atom()?, &["Miter", "Round", "Bevel"])? {
            "Miter" => (LineJoin::Miter, Some(dict_require(dict, "MiterLimit")?.as_fixed()?)),
            "Round" => (LineJoin::Round, None),
            "Bevel" => (LineJoin::Bevel, None),
            _ => unreachable!(),
        },
        None => (LineJoin::Miter, Some(FixedPoint::from_promotable_int(10)?)),
    };
    let dash_pattern = match dict_get(dict, "DashPattern") {
        Some(v) => Some(dash_pattern_from_dict(v.as_dictionary()?, dict_get(dict, "DashPhase"))?),
        None => None,
    };
    Ok(Stroke { color, width, cap, join, miter_limit, dash_pattern })
}

fn op_stroke_style(dialect: Dialect, stack: &mut EvalStack) -> Result<(), Error> {
    require_variant_a(dialect, "stroke_style")?;
    let dict = pop_dict(stack)?;
    let stroke = stroke_from_dict(&dict)?;
    validate_stroke(dialect, &stroke)?;
    stack.push(Value::Object(ObjectValue::Stroke(Rc::new(stroke))));
    Ok(())
}

/// Validating passthrough over the array-literal + count convention: checks
/// the popped magnitudes and re-pushes them unchanged, so a later op
/// (`stroke_dash`, or the Dialect A dict-embedded form) can consume them.
fn op_dash_pattern(dialect: Dialect, stack: &mut EvalStack) -> Result<(), Error> {
    let count = pop_integer(stack)?;
    if count < 0 {
        return Err(Error::state("dash_pattern requires a non-negative count"));
    }
    let mut values = Vec::with_capacity(count as usize);
    for _ in 0..count {
        values.push(pop_fixed(stack)?);
    }
    values.reverse();
    validate_dash_array(dialect, &values)?;
    for v in &values {
        stack.push(Value::Fixed(*v));
    }
    stack.push(Value::Integer(count));
    Ok(())
}

fn op_miter_angle(stack: &mut EvalStack) -> Result<(), Error> {
    let degrees = pop_fixed(stack)?;
    let result = fixed::miter_angle(degrees)?;
    stack.push(Value::Fixed(result));
    Ok(())
}

fn op_start_stroke(dialect: Dialect, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    require_variant_b(dialect, "start_stroke")?;
    accumulator.start(Accumulator::Stroke(PartialStroke::default()))
}

fn current_stroke(accumulator: &mut AccumulatorRegister) -> Result<&mut PartialStroke, Error> {
    match accumulator.current_mut()? {
        Accumulator::Stroke(s) => Ok(s),
        other => Err(Error::state(format!("expected an open stroke builder, found {}", other.kind_name()))),
    }
}

fn op_stroke_width(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let width = pop_fixed(stack)?;
    current_stroke(accumulator)?.width = Some(width);
    Ok(())
}

fn op_stroke_color(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let color = expect_color(pop_object(stack)?)?;
    current_stroke(accumulator)?.color = Some(color);
    Ok(())
}

fn op_stroke_cap(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let cap = cap_from_atom(&pop_atom(stack)?)?;
    current_stroke(accumulator)?.cap = Some(cap);
    Ok(())
}

fn op_stroke_join(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let atom = pop_atom(stack)?;
    let join = match expect_one_of(&atom, &["Round", "Bevel"])? {
        "Round" => LineJoin::Round,
        "Bevel" => LineJoin::Bevel,
        _ => unreachable!(),
    };
    let stroke = current_stroke(accumulator)?;
    stroke.join = Some(join);
    stroke.miter_limit = None;
    Ok(())
}

fn op_stroke_join_r(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let limit = pop_fixed(stack)?;
    let stroke = current_stroke(accumulator)?;
    stroke.join = Some(LineJoin::Miter);
    stroke.miter_limit = Some(limit);
    Ok(())
}

fn op_stroke_dash(dialect: Dialect, stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let phase = pop_fixed(stack)?;
    let count = pop_integer(stack)?;
    if count < 0 {
        return Err(Error::state("stroke_dash requires a non-negative count"));
    }
    let mut array = Vec::with_capacity(count as usize);
    for _ in 0..count {
        array.push(pop_fixed(stack)?);
    }
    array.reverse();
    validate_dash_array(dialect, &array)?;
    if !phase.is_non_negative() {
        return Err(Error::domain("dash phase must be >= 0"));
    }
    current_stroke(accumulator)?.dash_pattern = Some(DashPattern { array, phase });
    Ok(())
}

fn op_stroke_undash(accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    current_stroke(accumulator)?.dash_pattern = None;
    Ok(())
}

fn op_stroke_derive(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let existing = expect_stroke(pop_object(stack)?)?;
    match accumulator.current_mut()? {
        Accumulator::Stroke(s) => {
            *s = PartialStroke::from_existing(&existing);
            Ok(())
        }
        other => Err(Error::state(format!("expected an open stroke builder, found {}", other.kind_name()))),
    }
}

fn op_finish_stroke(dialect: Dialect, stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let partial = match accumulator.take()? {
        Accumulator::Stroke(s) => s,
        other => return Err(Error::state(format!("expected an open stroke builder, found {}", other.kind_name()))),
    };
    let stroke = partial.finish()?;
    validate_stroke(dialect, &stroke)?;
    stack.push(Value::Object(ObjectValue::Stroke(Rc::new(stroke))));
    Ok(())
}

// ----------------------------------------------------------------- Font ---

fn alterations_from_dict(dict: &Dictionary) -> Result<Alterations, Error> {
    Ok(Alterations {
        h_scale: dict_get(dict, "hScale").map(|v| v.as_fixed()).transpose()?,
        oblique: dict_get(dict, "oblique").map(|v| Ok::<bool, Error>(v.as_integer()? != 0)).transpose()?,
        boldness: dict_get(dict, "boldness").map(|v| v.as_fixed()).transpose()?,
        small_caps: dict_get(dict, "smallCaps").map(|v| Ok::<bool, Error>(v.as_integer()? != 0)).transpose()?,
        char_spacing: dict_get(dict, "charSpacing").map(|v| v.as_fixed()).transpose()?,
    })
}

fn op_font_get(dialect: Dialect, stack: &mut EvalStack) -> Result<(), Error> {
    let v = stack.pop()?;
    let font = match v {
        Value::Atom(a) => Font::new_builtin(a.as_str())?,
        Value::Dictionary(dict) => {
            require_variant_a(dialect, "synthetic font construction")?;
            let base = expect_font(dict_require(&dict, "Base")?.as_object()?.clone())?;
            let alterations = alterations_from_dict(&dict)?;
            derive_synthetic(&base, alterations)
        }
        other => return Err(Error::ty(format!("font_get expects an Atom or Dictionary, found {}", other.kind_name()))),
    };
    stack.push(Value::Object(ObjectValue::Font(Rc::new(font))));
    Ok(())
}

fn op_font_load(stack: &mut EvalStack) -> Result<(), Error> {
    let path = pop_string(stack)?;
    stack.push(Value::Object(ObjectValue::Font(Rc::new(Font::new_file(&path, &path)))));
    Ok(())
}

// ---------------------------------------------------------------- Image ---

/// Minimal byte-level metadata probes. The image decoders themselves are an
/// external black-box service (spec'd only as "given path + jpeg/png,
/// returns a handle with validated dimensions, colour model, interlace
/// state, bit depth") — `pdf::image_loader` serves the PDF writer's own
/// lazy placement-time needs and exposes none of those fields, so
/// `image_load`'s validation-time needs are met here directly, in the same
/// hand-rolled-scanner idiom the tokenisers already use.
mod image_probe {
    use std::convert::TryInto;
    use std::fs;

    use crate::error::Error;
    use crate::object::image::{ColorModel, ImageFormat};

    pub struct Probed {
        pub width: u32,
        pub height: u32,
        pub color_model: ColorModel,
        pub has_alpha: bool,
        pub interlaced: bool,
        pub bits_per_component: u8,
    }

    pub fn probe(path: &str, format: ImageFormat) -> Result<Probed, Error> {
        let bytes = fs::read(path).map_err(|e| Error::resource(format!("could not read image file {:?}: {}", path, e)))?;
        match format {
            ImageFormat::Png => probe_png(&bytes),
            ImageFormat::Jpeg => probe_jpeg(&bytes),
        }
    }

    fn probe_png(bytes: &[u8]) -> Result<Probed, Error> {
        const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        if bytes.len() < 29 || bytes[0..8] != SIGNATURE || &bytes[12..16] != b"IHDR" {
            return Err(Error::resource("not a valid PNG file (missing signature or IHDR chunk)"));
        }
        let width = u32::from_be_bytes(bytes[16..20].try_into().unwrap());
        let height = u32::from_be_bytes(bytes[20..24].try_into().unwrap());
        let bit_depth = bytes[24];
        let color_type = bytes[25];
        let interlaced = bytes[28] != 0;
        let (color_model, has_alpha) = match color_type {
            0 => (ColorModel::Gray, false),
            2 => (ColorModel::YCbCrOrRgb, false),
            3 => (ColorModel::IndexedRgb, false),
            4 => (ColorModel::Gray, true),
            6 => (ColorModel::YCbCrOrRgb, true),
            other => return Err(Error::resource(format!("unsupported PNG colour type {}", other))),
        };
        Ok(Probed { width, height, color_model, has_alpha, interlaced, bits_per_component: bit_depth })
    }

    fn probe_jpeg(bytes: &[u8]) -> Result<Probed, Error> {
        if bytes.len() < 4 || bytes[0] != 0xFF || bytes[1] != 0xD8 {
            return Err(Error::resource("not a valid JPEG file (missing SOI marker)"));
        }
        let mut pos = 2usize;
        while pos + 4 <= bytes.len() {
            if bytes[pos] != 0xFF {
                pos += 1;
                continue;
            }
            let marker = bytes[pos + 1];
            if marker == 0x01 || (0xD0..=0xD9).contains(&marker) {
                pos += 2;
                continue;
            }
            if pos + 4 > bytes.len() {
                break;
            }
            let seg_len = u16::from_be_bytes(bytes[pos + 2..pos + 4].try_into().unwrap()) as usize;
            let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
            if is_sof {
                let body = &bytes[pos + 4..pos + 2 + seg_len];
                let precision = body[0];
                let height = u16::from_be_bytes(body[1..3].try_into().unwrap()) as u32;
                let width = u16::from_be_bytes(body[3..5].try_into().unwrap()) as u32;
                let components = body[5];
                let progressive = matches!(marker, 0xC2 | 0xC3 | 0xC6 | 0xC7 | 0xCA | 0xCB);
                let color_model = if components == 1 { ColorModel::Gray } else { ColorModel::YCbCrOrRgb };
                return Ok(Probed {
                    width,
                    height,
                    color_model,
                    has_alpha: false,
                    interlaced: progressive,
                    bits_per_component: precision,
                });
            }
            pos += 2 + seg_len;
        }
        Err(Error::resource("JPEG file has no start-of-frame marker"))
    }
}

fn op_image_load(stack: &mut EvalStack) -> Result<(), Error> {
    let format_atom = pop_atom(stack)?;
    let path = pop_string(stack)?;
    let format = ImageFormat::from_atom(format_atom.as_str())?;
    let probed = image_probe::probe(&path, format)?;
    let image = Image {
        path: path.to_string(),
        format,
        width: probed.width,
        height: probed.height,
        color_model: probed.color_model,
        has_alpha: probed.has_alpha,
        interlaced: probed.interlaced,
        bits_per_component: probed.bits_per_component,
    };
    validate_image_metadata(&image)?;
    stack.push(Value::Object(ObjectValue::Image(Rc::new(image))));
    Ok(())
}

// ----------------------------------------------------------------- Path ---

fn current_path(accumulator: &mut AccumulatorRegister) -> Result<&mut PartialPath, Error> {
    match accumulator.current_mut()? {
        Accumulator::Path(p) => Ok(p),
        other => Err(Error::state(format!("expected an open path builder, found {}", other.kind_name()))),
    }
}

fn op_start_motion(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let y = pop_fixed(stack)?;
    let x = pop_fixed(stack)?;
    current_path(accumulator)?.start_motion((x, y))
}

fn op_motion_line(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let y = pop_fixed(stack)?;
    let x = pop_fixed(stack)?;
    current_path(accumulator)?.motion_line((x, y))
}

fn op_motion_curve(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let p4y = pop_fixed(stack)?;
    let p4x = pop_fixed(stack)?;
    let p3y = pop_fixed(stack)?;
    let p3x = pop_fixed(stack)?;
    let p2y = pop_fixed(stack)?;
    let p2x = pop_fixed(stack)?;
    current_path(accumulator)?.motion_curve((p2x, p2y), (p3x, p3y), (p4x, p4y))
}

fn op_path_rect(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let height = pop_fixed(stack)?;
    let width = pop_fixed(stack)?;
    let y = pop_fixed(stack)?;
    let x = pop_fixed(stack)?;
    current_path(accumulator)?.path_rect((x, y), width, height)
}

fn op_path_include(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let other = expect_path(pop_object(stack)?)?;
    current_path(accumulator)?.path_include(&other)
}

fn fill_rule_from_atom(atom: &Atom) -> Result<FillRule, Error> {
    match expect_one_of(atom, &["Nonzero", "EvenOdd", "Null"])? {
        "Nonzero" => Ok(FillRule::Nonzero),
        "EvenOdd" => Ok(FillRule::EvenOdd),
        "Null" => Ok(FillRule::Null),
        _ => unreachable!(),
    }
}

fn op_finish_path(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let rule = fill_rule_from_atom(&pop_atom(stack)?)?;
    current_path(accumulator)?.set_fill_rule(rule);
    let partial = match accumulator.take()? {
        Accumulator::Path(p) => p,
        other => return Err(Error::state(format!("expected an open path builder, found {}", other.kind_name()))),
    };
    let path = partial.finish()?;
    validate_path(&path)?;
    stack.push(Value::Object(ObjectValue::Path(Rc::new(path))));
    Ok(())
}

// ------------------------------------------------------------ Transform ---

fn op_tx_translate(stack: &mut EvalStack) -> Result<(), Error> {
    let ty = pop_fixed(stack)?;
    let tx = pop_fixed(stack)?;
    stack.push(Value::Object(ObjectValue::Transform(Rc::new(Transform::translate(tx, ty)))));
    Ok(())
}

fn op_tx_rotate(stack: &mut EvalStack) -> Result<(), Error> {
    let degrees = pop_fixed(stack)?;
    stack.push(Value::Object(ObjectValue::Transform(Rc::new(Transform::rotate(degrees.to_f64())))));
    Ok(())
}

fn op_tx_scale(stack: &mut EvalStack) -> Result<(), Error> {
    let sy = pop_fixed(stack)?;
    let sx = pop_fixed(stack)?;
    stack.push(Value::Object(ObjectValue::Transform(Rc::new(Transform::scale(sx, sy)))));
    Ok(())
}

fn op_tx_seq(stack: &mut EvalStack) -> Result<(), Error> {
    let count = pop_integer(stack)?;
    if count <= 0 {
        return Err(Error::state("tx_seq requires at least one transform"));
    }
    let mut transforms = Vec::with_capacity(count as usize);
    for _ in 0..count {
        transforms.push(expect_transform(pop_object(stack)?)?);
    }
    transforms.reverse();
    let combined = concat_sequence(&transforms)?;
    stack.push(Value::Object(ObjectValue::Transform(Rc::new(combined))));
    Ok(())
}

// ---------------------------------------------------------------- Style ---

fn current_style(accumulator: &mut AccumulatorRegister) -> Result<&mut PartialStyle, Error> {
    match accumulator.current_mut()? {
        Accumulator::Style(s) => Ok(s),
        other => Err(Error::state(format!("expected an open style builder, found {}", other.kind_name()))),
    }
}

fn op_style_font(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let font = expect_font(pop_object(stack)?)?;
    current_style(accumulator)?.font = Some(font);
    Ok(())
}

fn op_style_size(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let size = pop_fixed(stack)?;
    current_style(accumulator)?.size = Some(size);
    Ok(())
}

fn op_style_stroke(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let v = stack.pop()?;
    let stroke = match v {
        Value::Null => None,
        other => Some(expect_color(other.as_object()?.clone())?),
    };
    current_style(accumulator)?.stroke = stroke;
    Ok(())
}

fn op_style_fill(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let v = stack.pop()?;
    let fill = match v {
        Value::Null => None,
        other => Some(expect_color(other.as_object()?.clone())?),
    };
    current_style(accumulator)?.fill = fill;
    Ok(())
}

fn op_style_cspace(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let v = pop_fixed(stack)?;
    current_style(accumulator)?.char_space = v;
    Ok(())
}

fn op_style_wspace(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let v = pop_fixed(stack)?;
    current_style(accumulator)?.word_space = v;
    Ok(())
}

fn op_style_hscale(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let v = pop_fixed(stack)?;
    current_style(accumulator)?.h_scale = v;
    Ok(())
}

fn op_style_rise(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let v = pop_fixed(stack)?;
    current_style(accumulator)?.rise = v;
    Ok(())
}

fn op_style_derive(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let existing = expect_style(pop_object(stack)?)?;
    match accumulator.current_mut()? {
        Accumulator::Style(s) => {
            *s = PartialStyle::from_existing(&existing);
            Ok(())
        }
        other => Err(Error::state(format!("expected an open style builder, found {}", other.kind_name()))),
    }
}

fn op_finish_style(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let partial = match accumulator.take()? {
        Accumulator::Style(s) => s,
        other => return Err(Error::state(format!("expected an open style builder, found {}", other.kind_name()))),
    };
    let style = partial.finish()?;
    validate_style(&style)?;
    stack.push(Value::Object(ObjectValue::Style(Rc::new(style))));
    Ok(())
}

/// Shorthand over `style_size`/`style_fill`: sets a span's size and fill
/// colour in one call, the common case when a style doesn't otherwise
/// diverge from its column's running defaults.
fn op_style_setwc(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let fill = expect_color(pop_object(stack)?)?;
    let size = pop_fixed(stack)?;
    let style = current_style(accumulator)?;
    style.size = Some(size);
    style.fill = Some(fill);
    Ok(())
}

// --------------------------------------------------------------- Column ---

fn current_column(accumulator: &mut AccumulatorRegister) -> Result<&mut PartialColumn, Error> {
    match accumulator.current_mut()? {
        Accumulator::Column(c) => Ok(c),
        other => Err(Error::state(format!("expected an open column builder, found {}", other.kind_name()))),
    }
}

fn op_start_line(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let y = pop_fixed(stack)?;
    let x = pop_fixed(stack)?;
    current_column(accumulator)?.start_line((x, y))
}

fn op_line_span(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let style = expect_style(pop_object(stack)?)?;
    let text = pop_string(stack)?;
    current_column(accumulator)?.line_span(text, style)
}

fn op_finish_column(stack: &mut EvalStack, accumulator: &mut AccumulatorRegister) -> Result<(), Error> {
    let partial = match accumulator.take()? {
        Accumulator::Column(c) => c,
        other => return Err(Error::state(format!("expected an open column builder, found {}", other.kind_name()))),
    };
    let column = partial.finish()?;
    stack.push(Value::Object(ObjectValue::Column(Rc::new(column))));
    Ok(())
}

// -------------------------------------------------------------- Clipping --

fn op_clip(stack: &mut EvalStack) -> Result<(), Error> {
    let count = pop_integer(stack)?;
    if count < 0 {
        return Err(Error::state("clip requires a non-negative component count"));
    }
    let mut components = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let transform = expect_transform(pop_object(stack)?)?;
        let shape = match pop_object(stack)? {
            ObjectValue::Path(p) => ClipShape::Path((*p).clone()),
            ObjectValue::Column(c) => ClipShape::Column((*c).clone()),
            other => {
                return Err(Error::ty(format!("clip component shape must be Path or Column, found {}", other.kind_name())))
            }
        };
        components.push(ClipComponent { shape, transform });
    }
    components.reverse();
    let clipping = Clipping { components };
    validate_clipping(&clipping)?;
    stack.push(Value::Object(ObjectValue::Clipping(Rc::new(clipping))));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialect_a() -> Dialect {
        Dialect::VariantA
    }

    fn fp(s: &str) -> Value {
        Value::Fixed(FixedPoint::parse(s).unwrap())
    }

    #[test]
    fn gray_and_cmyk_build_colors() {
        let mut stack = EvalStack::new();
        let mut acc = AccumulatorRegister::new();
        stack.push(Value::Integer(128));
        assert!(dispatch("gray", dialect_a(), &mut stack, &mut acc).unwrap());
        let color = expect_color(stack.pop().unwrap().as_object().unwrap().clone()).unwrap();
        assert_eq!(color, Cmyk::from_gray(128));
    }

    #[test]
    fn cmyk_channel_out_of_range_is_domain_error() {
        let mut stack = EvalStack::new();
        let mut acc = AccumulatorRegister::new();
        stack.push(Value::Integer(0));
        stack.push(Value::Integer(0));
        stack.push(Value::Integer(0));
        stack.push(Value::Integer(999));
        let err = dispatch("cmyk", dialect_a(), &mut stack, &mut acc).unwrap_err();
        assert_eq!(err.kind(), "DomainError");
    }

    #[test]
    fn dict_builds_from_stack_pairs() {
        let mut stack = EvalStack::new();
        let mut acc = AccumulatorRegister::new();
        stack.push(Value::Atom(Atom::new("Width")));
        stack.push(fp("595.27559"));
        stack.push(Value::Atom(Atom::new("Height")));
        stack.push(fp("841.88976"));
        stack.push(Value::Integer(4));
        assert!(dispatch("dict", dialect_a(), &mut stack, &mut acc).unwrap());
        let dict = stack.pop().unwrap().as_dictionary().unwrap().clone();
        assert_eq!(dict.get(&Atom::new("Width")).unwrap().as_fixed().unwrap(), FixedPoint::parse("595.27559").unwrap());
    }

    #[test]
    fn sep_is_variant_b_only_and_pushes_empty_string() {
        let mut stack = EvalStack::new();
        let mut acc = AccumulatorRegister::new();
        let err = dispatch("sep", dialect_a(), &mut stack, &mut acc).unwrap_err();
        assert_eq!(err.kind(), "StateError");

        assert!(dispatch("sep", Dialect::VariantB, &mut stack, &mut acc).unwrap());
        assert_eq!(&**stack.pop().unwrap().as_string().unwrap(), "");
    }

    #[test]
    fn sep_and_concat_compose() {
        let mut stack = EvalStack::new();
        let mut acc = AccumulatorRegister::new();
        stack.push(Value::String(Rc::from("a")));
        assert!(dispatch("sep", Dialect::VariantB, &mut stack, &mut acc).unwrap());
        stack.push(Value::String(Rc::from("b")));
        assert!(dispatch("concat", Dialect::VariantB, &mut stack, &mut acc).unwrap());
        assert!(dispatch("concat", Dialect::VariantB, &mut stack, &mut acc).unwrap());
        assert_eq!(&**stack.pop().unwrap().as_string().unwrap(), "ab");
    }

    #[test]
    fn ream_dialect_gating() {
        let mut stack = EvalStack::new();
        let mut acc = AccumulatorRegister::new();
        stack.push(Value::Dictionary(Rc::new(Dictionary::new())));
        let err = dispatch("ream", Dialect::VariantB, &mut stack, &mut acc).unwrap_err();
        assert_eq!(err.kind(), "StateError");
    }

    #[test]
    fn ream_single_op_builds_valid_ream() {
        let mut stack = EvalStack::new();
        let mut acc = AccumulatorRegister::new();
        let mut art_box = Dictionary::new();
        art_box.insert(Atom::new("LeftMargin"), fp("36"));
        art_box.insert(Atom::new("RightMargin"), fp("36"));
        art_box.insert(Atom::new("TopMargin"), fp("36"));
        art_box.insert(Atom::new("BottomMargin"), fp("36"));
        let mut dict = Dictionary::new();
        dict.insert(Atom::new("Width"), fp("595.27559"));
        dict.insert(Atom::new("Height"), fp("841.88976"));
        dict.insert(Atom::new("ArtBox"), Value::Dictionary(Rc::new(art_box)));
        stack.push(Value::Dictionary(Rc::new(dict)));
        assert!(dispatch("ream", dialect_a(), &mut stack, &mut acc).unwrap());
        let ream = expect_ream(stack.pop().unwrap().as_object().unwrap().clone()).unwrap();
        assert_eq!(ream.width, FixedPoint::parse("595.27559").unwrap());
    }

    #[test]
    fn ream_accumulator_flow_dialect_b() {
        let mut stack = EvalStack::new();
        let mut acc = AccumulatorRegister::new();
        assert!(dispatch("start_ream", Dialect::VariantB, &mut stack, &mut acc).unwrap());
        stack.push(fp("595.27559"));
        stack.push(fp("841.88976"));
        assert!(dispatch("ream_dim", Dialect::VariantB, &mut stack, &mut acc).unwrap());
        stack.push(Value::Atom(Atom::new("TrimBox")));
        stack.push(fp("36"));
        stack.push(fp("36"));
        stack.push(fp("36"));
        stack.push(fp("36"));
        assert!(dispatch("ream_bound", Dialect::VariantB, &mut stack, &mut acc).unwrap());
        assert!(dispatch("finish_ream", Dialect::VariantB, &mut stack, &mut acc).unwrap());
        let ream = expect_ream(stack.pop().unwrap().as_object().unwrap().clone()).unwrap();
        assert!(ream.boxes.contains_key(&BoxKind::TrimBox));
    }

    #[test]
    fn path_builder_round_trip() {
        let mut stack = EvalStack::new();
        let mut acc = AccumulatorRegister::new();
        assert!(dispatch("start_path", dialect_a(), &mut stack, &mut acc).unwrap());
        stack.push(fp("0"));
        stack.push(fp("0"));
        assert!(dispatch("start_motion", dialect_a(), &mut stack, &mut acc).unwrap());
        stack.push(fp("10"));
        stack.push(fp("0"));
        assert!(dispatch("motion_line", dialect_a(), &mut stack, &mut acc).unwrap());
        assert!(dispatch("finish_motion", dialect_a(), &mut stack, &mut acc).unwrap());
        stack.push(Value::Atom(Atom::new("Nonzero")));
        assert!(dispatch("finish_path", dialect_a(), &mut stack, &mut acc).unwrap());
        let path = expect_path(stack.pop().unwrap().as_object().unwrap().clone()).unwrap();
        assert_eq!(path.fill_rule, FillRule::Nonzero);
    }

    #[test]
    fn tx_seq_concatenates_in_order() {
        let mut stack = EvalStack::new();
        let mut acc = AccumulatorRegister::new();
        stack.push(fp("10"));
        stack.push(fp("0"));
        assert!(dispatch("tx_translate", dialect_a(), &mut stack, &mut acc).unwrap());
        stack.push(fp("2"));
        stack.push(fp("2"));
        assert!(dispatch("tx_scale", dialect_a(), &mut stack, &mut acc).unwrap());
        stack.push(Value::Integer(2));
        assert!(dispatch("tx_seq", dialect_a(), &mut stack, &mut acc).unwrap());
        let t = expect_transform(stack.pop().unwrap().as_object().unwrap().clone()).unwrap();
        assert_eq!(t.e, FixedPoint::parse("10").unwrap());
        assert_eq!(t.a, FixedPoint::parse("2").unwrap());
    }

    #[test]
    fn style_and_column_round_trip() {
        let mut stack = EvalStack::new();
        let mut acc = AccumulatorRegister::new();
        stack.push(Value::Atom(Atom::new("Helvetica")));
        assert!(dispatch("font_get", dialect_a(), &mut stack, &mut acc).unwrap());
        assert!(dispatch("start_style", dialect_a(), &mut stack, &mut acc).unwrap());
        assert!(dispatch("style_font", dialect_a(), &mut stack, &mut acc).unwrap());
        stack.push(fp("12"));
        assert!(dispatch("style_size", dialect_a(), &mut stack, &mut acc).unwrap());
        assert!(dispatch("finish_style", dialect_a(), &mut stack, &mut acc).unwrap());

        assert!(dispatch("start_column", dialect_a(), &mut stack, &mut acc).unwrap());
        stack.push(fp("0"));
        stack.push(fp("0"));
        assert!(dispatch("start_line", dialect_a(), &mut stack, &mut acc).unwrap());
        stack.push(Value::String(Rc::from("hi")));
        // style is still on the stack from finish_style above
        assert!(dispatch("line_span", dialect_a(), &mut stack, &mut acc).unwrap());
        assert!(dispatch("finish_line", dialect_a(), &mut stack, &mut acc).unwrap());
        assert!(dispatch("finish_column", dialect_a(), &mut stack, &mut acc).unwrap());
        let column = stack.pop().unwrap().as_object().unwrap().clone();
        assert_eq!(column.kind_name(), "Column");
    }

    #[test]
    fn unknown_op_is_not_handled() {
        let mut stack = EvalStack::new();
        let mut acc = AccumulatorRegister::new();
        assert!(!dispatch("begin_page", dialect_a(), &mut stack, &mut acc).unwrap());
    }
}
