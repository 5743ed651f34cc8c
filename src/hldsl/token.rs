//! Entity tokeniser (C4): turns HLDSL source text into a flat stream of
//! `Entity` values. Grounded in the teacher's hand-rolled, `Result<T,
//! String>`-returning scanners in `cmap.rs`/`svg.rs` — a single forward
//! cursor over bytes, no external parser-combinator crate.
//!
//! Concrete lexical choices not pinned down by the language spec (sigils
//! for variable/constant manipulation, the meta-block delimiters) are
//! recorded in DESIGN.md; the escape set and numeric range come directly
//! from spec §4.4 and are implemented exactly.

use crate::error::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    /// `<%`
    MetaBegin,
    /// `%>`
    MetaEnd,
    /// `(`
    GroupBegin,
    /// `)`
    GroupEnd,
    /// `[`
    ArrayBegin,
    /// `]`
    ArrayEnd,
    /// Curly-quoted content string, escapes already decoded.
    ContentString(String),
    /// Double-quoted atom text, case-sensitive, membership checked at use.
    AtomString(String),
    /// Bare integer literal; only integers are ever tokenised (spec §4.4).
    Number(i64),
    /// `$name` — declare a mutable variable cell.
    DeclareVariable(String),
    /// `#name` — declare an immutable constant cell.
    DeclareConstant(String),
    /// `!name` — assign to an existing variable cell.
    Assign(String),
    /// `@name` — push a copy of a bound cell's value.
    Get(String),
    /// Bare identifier: an operation name.
    Operation(String),
    /// A bare word appearing inside a meta block (`scent`, `scent-embed`,
    /// `1.0`, `bound-x`, `body`, ...) — meta words permit `.`/`-` where
    /// ordinary identifiers don't.
    MetaWord(String),
    /// The end-of-file marker; everything after it is ignored.
    EndOfFile,
}

const MIN_NUMERIC: i64 = -(1i64 << 53) + 1;
const MAX_NUMERIC: i64 = (1i64 << 53) - 1;
const EOF_MARK: &str = "%EOF%";

pub struct Tokeniser<'a> {
    bytes: &'a [u8],
    pos: usize,
    /// True between a `MetaBegin` and its matching `MetaEnd`: meta words
    /// (`scent-embed`, `1.0`, `bound-x`, ...) get their own permissive
    /// lexical class there instead of being split across identifier/number
    /// rules meant for the operation body.
    in_meta: bool,
}

impl<'a> Tokeniser<'a> {
    pub fn new(source: &'a str) -> Self {
        Tokeniser { bytes: source.as_bytes(), pos: 0, in_meta: false }
    }

    /// Tokenises the entire source, stopping at (and including) an
    /// `EndOfFile` entity if one is present.
    pub fn tokenise(mut self) -> Result<Vec<Entity>, Error> {
        let mut entities = Vec::new();
        loop {
            self.skip_whitespace();
            if self.pos >= self.bytes.len() {
                break;
            }
            let entity = self.next_entity()?;
            match entity {
                Entity::MetaBegin => self.in_meta = true,
                Entity::MetaEnd => self.in_meta = false,
                _ => {}
            }
            let is_eof = entity == Entity::EndOfFile;
            entities.push(entity);
            if is_eof {
                break;
            }
        }
        Ok(entities)
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn next_entity(&mut self) -> Result<Entity, Error> {
        match self.peek().unwrap() {
            b'<' if self.bytes[self.pos..].starts_with(b"<%") => {
                self.pos += 2;
                Ok(Entity::MetaBegin)
            }
            b'%' if self.bytes[self.pos..].starts_with(b"%>") => {
                self.pos += 2;
                Ok(Entity::MetaEnd)
            }
            b'%' if self.bytes[self.pos..].starts_with(EOF_MARK.as_bytes()) => {
                self.pos += EOF_MARK.len();
                Ok(Entity::EndOfFile)
            }
            _ if self.in_meta => self.read_meta_word(),
            b'(' => {
                self.pos += 1;
                Ok(Entity::GroupBegin)
            }
            b')' => {
                self.pos += 1;
                Ok(Entity::GroupEnd)
            }
            b'[' => {
                self.pos += 1;
                Ok(Entity::ArrayBegin)
            }
            b']' => {
                self.pos += 1;
                Ok(Entity::ArrayEnd)
            }
            b'{' => self.read_content_string(),
            b'"' => self.read_atom_string(),
            b'$' => self.read_sigiled_name(Entity::DeclareVariable),
            b'#' => self.read_sigiled_name(Entity::DeclareConstant),
            b'!' => self.read_sigiled_name(Entity::Assign),
            b'@' => self.read_sigiled_name(Entity::Get),
            b'-' | b'0'..=b'9' => self.read_number(),
            c if is_name_start(c) => self.read_operation_name(),
            other => Err(Error::syntax(format!(
                "unexpected character {:?} at byte offset {}",
                other as char, self.pos
            ))),
        }
    }

    fn read_sigiled_name(&mut self, wrap: fn(String) -> Entity) -> Result<Entity, Error> {
        self.pos += 1;
        let start = self.pos;
        while self.peek().map(is_name_continue).unwrap_or(false) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(Error::syntax("expected a name after sigil"));
        }
        let name = std::str::from_utf8(&self.bytes[start..self.pos]).unwrap().to_string();
        Ok(wrap(name))
    }

    fn read_meta_word(&mut self) -> Result<Entity, Error> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_whitespace() || c == b'%' {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(Error::syntax("expected a meta word"));
        }
        let word = std::str::from_utf8(&self.bytes[start..self.pos]).unwrap().to_string();
        Ok(Entity::MetaWord(word))
    }

    fn read_operation_name(&mut self) -> Result<Entity, Error> {
        let start = self.pos;
        self.pos += 1;
        while self.peek().map(is_name_continue).unwrap_or(false) {
            self.pos += 1;
        }
        let name = std::str::from_utf8(&self.bytes[start..self.pos]).unwrap().to_string();
        Ok(Entity::Operation(name))
    }

    fn read_number(&mut self) -> Result<Entity, Error> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        let digits_start = self.pos;
        while self.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) {
            self.pos += 1;
        }
        if self.pos == digits_start {
            return Err(Error::syntax("invalid numeric literal: no digits"));
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos]).unwrap();
        let value: i64 = text
            .parse()
            .map_err(|_| Error::syntax(format!("invalid numeric literal {:?}", text)))?;
        if !(MIN_NUMERIC..=MAX_NUMERIC).contains(&value) {
            return Err(Error::syntax(format!(
                "numeric literal {} out of range [{}, {}]",
                value, MIN_NUMERIC, MAX_NUMERIC
            )));
        }
        Ok(Entity::Number(value))
    }

    fn read_atom_string(&mut self) -> Result<Entity, Error> {
        self.pos += 1;
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == b'"' {
                let text = std::str::from_utf8(&self.bytes[start..self.pos])
                    .map_err(|_| Error::syntax("atom string is not valid UTF-8"))?
                    .to_string();
                self.pos += 1;
                return Ok(Entity::AtomString(text));
            }
            self.pos += 1;
        }
        Err(Error::syntax("unterminated atom string"))
    }

    /// Curly-quoted content string. Balanced nested `{`/`}` are retained
    /// literally; the documented escape set is decoded; an unescaped LF is
    /// retained as-is.
    fn read_content_string(&mut self) -> Result<Entity, Error> {
        self.pos += 1; // consume opening '{'
        let mut depth = 1usize;
        let mut out = String::new();
        loop {
            let c = self.peek().ok_or_else(|| Error::syntax("unterminated curly string"))?;
            match c {
                b'{' => {
                    depth += 1;
                    out.push('{');
                    self.pos += 1;
                }
                b'}' => {
                    depth -= 1;
                    self.pos += 1;
                    if depth == 0 {
                        return Ok(Entity::ContentString(out));
                    }
                    out.push('}');
                }
                b'\\' => {
                    self.pos += 1;
                    self.read_escape(&mut out)?;
                }
                _ => {
                    // Advance by one UTF-8 scalar, not one byte.
                    let ch_len = utf8_len(c);
                    let slice = self.bytes.get(self.pos..self.pos + ch_len).ok_or_else(|| {
                        Error::syntax("truncated UTF-8 sequence in curly string")
                    })?;
                    let s = std::str::from_utf8(slice)
                        .map_err(|_| Error::syntax("invalid UTF-8 in curly string"))?;
                    out.push_str(s);
                    self.pos += ch_len;
                }
            }
        }
    }

    fn read_escape(&mut self, out: &mut String) -> Result<(), Error> {
        let c = self.peek().ok_or_else(|| Error::syntax("unterminated escape sequence"))?;
        match c {
            b'\\' => {
                out.push('\\');
                self.pos += 1;
            }
            b'{' => {
                out.push('{');
                self.pos += 1;
            }
            b'}' => {
                out.push('}');
                self.pos += 1;
            }
            b'n' => {
                out.push('\n');
                self.pos += 1;
            }
            b'u' => {
                self.pos += 1;
                out.push(self.read_hex_escape(4)?);
            }
            b'U' => {
                self.pos += 1;
                out.push(self.read_hex_escape(6)?);
            }
            b'.' => {
                // consumes through the following LF
                self.pos += 1;
                while let Some(c) = self.peek() {
                    self.pos += 1;
                    if c == b'\n' {
                        break;
                    }
                }
            }
            other => {
                return Err(Error::syntax(format!("invalid escape sequence '\\{}'", other as char)))
            }
        }
        Ok(())
    }

    fn read_hex_escape(&mut self, digit_count: usize) -> Result<char, Error> {
        let start = self.pos;
        let end = start + digit_count;
        let slice = self.bytes.get(start..end).ok_or_else(|| {
            Error::syntax(format!("expected exactly {} hex digits in escape", digit_count))
        })?;
        if !slice.iter().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::syntax(format!(
                "expected exactly {} hex digits in escape",
                digit_count
            )));
        }
        let text = std::str::from_utf8(slice).unwrap();
        let code = u32::from_str_radix(text, 16).unwrap();
        let ch = char::from_u32(code)
            .ok_or_else(|| Error::syntax(format!("escape denotes invalid codepoint U+{:X}", code)))?;
        self.pos = end;
        Ok(ch)
    }
}

fn is_name_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_name_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

fn utf8_len(first_byte: u8) -> usize {
    if first_byte & 0x80 == 0 {
        1
    } else if first_byte & 0xE0 == 0xC0 {
        2
    } else if first_byte & 0xF0 == 0xE0 {
        3
    } else {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_tokenises_to_meta_words() {
        let entities = Tokeniser::new("<% scent 1.0 %>").tokenise().unwrap();
        assert_eq!(
            entities,
            vec![
                Entity::MetaBegin,
                Entity::MetaWord("scent".into()),
                Entity::MetaWord("1.0".into()),
                Entity::MetaEnd,
            ]
        );
    }

    #[test]
    fn embed_dialect_header_word_with_hyphen() {
        let entities = Tokeniser::new("<% scent-embed 1.0 %>").tokenise().unwrap();
        assert_eq!(
            entities,
            vec![
                Entity::MetaBegin,
                Entity::MetaWord("scent-embed".into()),
                Entity::MetaWord("1.0".into()),
                Entity::MetaEnd,
            ]
        );
    }

    #[test]
    fn s2_group_program_tokens() {
        let entities = Tokeniser::new("1 2 ( 3 4 pop )").tokenise().unwrap();
        assert_eq!(
            entities,
            vec![
                Entity::Number(1),
                Entity::Number(2),
                Entity::GroupBegin,
                Entity::Number(3),
                Entity::Number(4),
                Entity::Operation("pop".into()),
                Entity::GroupEnd,
            ]
        );
    }

    #[test]
    fn curly_string_escapes() {
        let entities = Tokeniser::new(r"{a\nb\{c\}dAe}").tokenise().unwrap();
        assert_eq!(entities, vec![Entity::ContentString("a\nb{c}dAe".into())]);
    }

    #[test]
    fn curly_string_nested_balanced() {
        let entities = Tokeniser::new("{outer {inner} end}").tokenise().unwrap();
        assert_eq!(entities, vec![Entity::ContentString("outer {inner} end".into())]);
    }

    #[test]
    fn short_unicode_escape_is_error() {
        assert!(Tokeniser::new(r"{\u41}").tokenise().is_err());
    }

    #[test]
    fn atom_string() {
        let entities = Tokeniser::new(r#""ArtBox""#).tokenise().unwrap();
        assert_eq!(entities, vec![Entity::AtomString("ArtBox".into())]);
    }

    #[test]
    fn sigiled_names() {
        let entities = Tokeniser::new("$foo #bar !foo @bar").tokenise().unwrap();
        assert_eq!(
            entities,
            vec![
                Entity::DeclareVariable("foo".into()),
                Entity::DeclareConstant("bar".into()),
                Entity::Assign("foo".into()),
                Entity::Get("bar".into()),
            ]
        );
    }

    #[test]
    fn eof_mark_stops_tokenising() {
        let entities = Tokeniser::new("1 2 %EOF% garbage (((").tokenise().unwrap();
        assert_eq!(entities, vec![Entity::Number(1), Entity::Number(2), Entity::EndOfFile]);
    }

    #[test]
    fn numeric_out_of_range_rejected() {
        assert!(Tokeniser::new("9007199254740993").tokenise().is_err());
    }
}
