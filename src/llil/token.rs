//! LLIL text-format tokeniser (spec §4.8's wire format): a `scent-assembly
//! 1.0` header line, `'`-prefixed comment lines, blank lines ignored,
//! forbidden leading whitespace on instruction lines, whitespace-run
//! collapsing outside quoted strings. Grounded in the same
//! hand-rolled-scanner style as `hldsl::token`, one forward cursor per line
//! rather than a parser-combinator crate.

use crate::error::Error;

pub const HEADER_LINE: &str = "scent-assembly 1.0";

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Name(String),
    /// Raw numeric text; the processor parses it as `FixedPoint`, `i64` or
    /// `u8` depending on which argument position it fills.
    Number(String),
    Str(String),
    /// `%` followed by exactly 8 hex digits: four CMYK channel bytes.
    Color([u8; 4]),
    /// A bare `-`: "this optional argument is absent".
    Dash,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub number: usize,
    pub tokens: Vec<Token>,
}

/// Tokenises a complete LLIL document: validates the header line, then
/// splits each remaining non-blank, non-comment line into tokens.
pub fn tokenise_document(source: &str) -> Result<Vec<Line>, Error> {
    let mut lines = source.lines().enumerate().map(|(i, text)| (i + 1, text));

    let (header_no, header_text) = lines
        .by_ref()
        .find(|(_, text)| !text.trim().is_empty())
        .ok_or_else(|| Error::syntax("empty LLIL document: missing header line"))?;
    if header_text.starts_with(char::is_whitespace) {
        return Err(Error::syntax(format!("line {}: header line must not be indented", header_no)));
    }
    if header_text != HEADER_LINE {
        return Err(Error::syntax(format!(
            "line {}: expected header {:?}, found {:?}",
            header_no, HEADER_LINE, header_text
        )));
    }

    let mut out = Vec::new();
    for (number, text) in lines {
        if text.trim().is_empty() {
            continue;
        }
        if text.starts_with(char::is_whitespace) {
            return Err(Error::syntax(format!("line {}: instruction lines must not be indented", number)));
        }
        if text.starts_with('\'') {
            continue;
        }
        let tokens = tokenise_line(text).map_err(|e| {
            Error::syntax(format!("line {}: {}", number, e))
        })?;
        out.push(Line { number, tokens });
    }
    Ok(out)
}

fn tokenise_line(text: &str) -> Result<Vec<Token>, String> {
    let bytes = text.as_bytes();
    let mut pos = 0;
    let mut tokens = Vec::new();
    while pos < bytes.len() {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= bytes.len() {
            break;
        }
        match bytes[pos] {
            b'"' => {
                let (token, next) = read_string(bytes, pos)?;
                tokens.push(token);
                pos = next;
            }
            b'%' => {
                let (token, next) = read_color(bytes, pos)?;
                tokens.push(token);
                pos = next;
            }
            b'-' if bytes.get(pos + 1).map(|c| c.is_ascii_whitespace()).unwrap_or(true) => {
                tokens.push(Token::Dash);
                pos += 1;
            }
            b'-' | b'0'..=b'9' => {
                let start = pos;
                pos += 1;
                while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() {
                    pos += 1;
                }
                tokens.push(Token::Number(text[start..pos].to_string()));
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                let start = pos;
                while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() {
                    pos += 1;
                }
                tokens.push(Token::Name(text[start..pos].to_string()));
            }
            other => return Err(format!("unexpected character {:?}", other as char)),
        }
    }
    Ok(tokens)
}

fn read_string(bytes: &[u8], start: usize) -> Result<(Token, usize), String> {
    let mut pos = start + 1;
    let mut out = String::new();
    loop {
        let c = *bytes.get(pos).ok_or("unterminated string")?;
        match c {
            b'"' => return Ok((Token::Str(out), pos + 1)),
            b'\\' => {
                let escaped = *bytes.get(pos + 1).ok_or("unterminated escape in string")?;
                match escaped {
                    b'\\' => out.push('\\'),
                    b'\'' => out.push('"'),
                    other => return Err(format!("invalid string escape '\\{}'", other as char)),
                }
                pos += 2;
            }
            other => {
                out.push(other as char);
                pos += 1;
            }
        }
    }
}

fn read_color(bytes: &[u8], start: usize) -> Result<(Token, usize), String> {
    let digits = bytes.get(start + 1..start + 9).ok_or("color literal requires 8 hex digits")?;
    if !digits.iter().all(|b| b.is_ascii_hexdigit()) {
        return Err("color literal requires 8 hex digits".to_string());
    }
    let text = std::str::from_utf8(digits).unwrap();
    let mut channels = [0u8; 4];
    for i in 0..4 {
        channels[i] = u8::from_str_radix(&text[i * 2..i * 2 + 2], 16).unwrap();
    }
    Ok((Token::Color(channels), start + 9))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_required() {
        assert!(tokenise_document("BeginPage\n").is_err());
        assert!(tokenise_document("scent-assembly 1.0\nBeginPage\n").is_ok());
    }

    #[test]
    fn comment_and_blank_lines_skipped() {
        let doc = tokenise_document("scent-assembly 1.0\n\n' a comment\nBeginPage\n").unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc[0].tokens, vec![Token::Name("BeginPage".into())]);
    }

    #[test]
    fn leading_whitespace_rejected() {
        assert!(tokenise_document("scent-assembly 1.0\n  BeginPage\n").is_err());
    }

    #[test]
    fn numbers_names_dash_color_string() {
        let doc = tokenise_document("scent-assembly 1.0\nDim 100 200\nLineJoin Miter -\nFillColor %0000FFFF\nWrite \"a\\'b\\\\c\"\n").unwrap();
        assert_eq!(doc[0].tokens, vec![Token::Name("Dim".into()), Token::Number("100".into()), Token::Number("200".into())]);
        assert_eq!(doc[1].tokens, vec![Token::Name("LineJoin".into()), Token::Name("Miter".into()), Token::Dash]);
        assert_eq!(doc[2].tokens, vec![Token::Name("FillColor".into()), Token::Color([0, 0, 0xFF, 0xFF])]);
        assert_eq!(doc[3].tokens, vec![Token::Name("Write".into()), Token::Str("a\"b\\c".into())]);
    }

    #[test]
    fn line_numbers_track_source() {
        let doc = tokenise_document("scent-assembly 1.0\n\nBeginPage\nEndPage\n").unwrap();
        assert_eq!(doc[0].number, 3);
        assert_eq!(doc[1].number, 4);
    }
}
