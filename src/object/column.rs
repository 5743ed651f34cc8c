//! Column object: an ordered list of text lines, each a baseline plus
//! non-empty spans. Grounded in the teacher's text-layout helpers in
//! `text.rs`/`components.rs`, regrouped into the Line/Span shape the
//! language exposes and stripped of the teacher's own layout engine (the
//! core only stores what the lowering layer needs, not computed layout).

use std::rc::Rc;

use crate::error::Error;
use crate::fixed::FixedPoint;
use crate::object::style::Style;

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: Rc<str>,
    pub style: Rc<Style>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub baseline: (FixedPoint, FixedPoint),
    pub spans: Vec<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub lines: Vec<Line>,
}

pub fn validate_line(line: &Line) -> Result<(), Error> {
    if line.spans.is_empty() {
        return Err(Error::state("finish_line requires at least one span"));
    }
    Ok(())
}

pub fn validate_column(column: &Column) -> Result<(), Error> {
    if column.lines.is_empty() {
        return Err(Error::state("finish_column requires at least one line"));
    }
    for line in &column.lines {
        validate_line(line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::color::Cmyk;
    use crate::object::font::Font;
    use crate::object::style::Style;

    fn fp(s: &str) -> FixedPoint {
        FixedPoint::parse(s).unwrap()
    }

    fn sample_style() -> Rc<Style> {
        Rc::new(Style {
            font: Rc::new(Font::new_builtin("Helvetica").unwrap()),
            size: fp("12"),
            char_space: fp("0"),
            word_space: fp("0"),
            rise: fp("0"),
            h_scale: fp("1"),
            stroke: None,
            fill: Some(Cmyk::new(0, 0, 0, 255)),
        })
    }

    #[test]
    fn empty_line_rejected() {
        let line = Line { baseline: (fp("0"), fp("0")), spans: vec![] };
        assert!(validate_line(&line).is_err());
    }

    #[test]
    fn empty_column_rejected() {
        let column = Column { lines: vec![] };
        assert!(validate_column(&column).is_err());
    }

    #[test]
    fn valid_column() {
        let line = Line {
            baseline: (fp("0"), fp("0")),
            spans: vec![Span { text: Rc::from("hello"), style: sample_style() }],
        };
        let column = Column { lines: vec![line] };
        assert!(validate_column(&column).is_ok());
    }
}
