//! Predicates on identifiers, CMYK strings, content strings, and built-in
//! font names (C2). Each returns a `Result` carrying the specific error
//! variant rather than a bare `bool`, so callers don't have to re-derive why
//! a value was rejected — matching the teacher's precedent of dedicated
//! error variants (`SvgParseError`) over boolean predicates.

use crate::error::Error;

/// `[A-Za-z_][A-Za-z0-9_]{0,30}` — used for both variable and constant
/// names.
pub fn validate_name(name: &str) -> Result<(), Error> {
    let mut chars = name.chars();
    let first = chars.next().ok_or_else(|| Error::syntax("identifier is empty"))?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(Error::syntax(format!(
            "identifier {:?} must start with a letter or underscore",
            name
        )));
    }
    let rest_len = name.len() - first.len_utf8();
    if rest_len > 30 {
        return Err(Error::syntax(format!(
            "identifier {:?} exceeds maximum length of 31 characters",
            name
        )));
    }
    for c in chars {
        if !(c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::syntax(format!(
                "identifier {:?} contains invalid character {:?}",
                name, c
            )));
        }
    }
    Ok(())
}

/// Exactly `%` + 8 hex digits.
pub fn validate_cmyk_string(s: &str) -> Result<(), Error> {
    let bytes = s.as_bytes();
    if bytes.len() != 9 || bytes[0] != b'%' {
        return Err(Error::syntax(format!(
            "CMYK string {:?} must be '%' followed by 8 hex digits",
            s
        )));
    }
    if !s[1..].bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::syntax(format!("CMYK string {:?} contains non-hex digits", s)));
    }
    Ok(())
}

/// Parses a validated CMYK string into four 0..=255 channel values.
pub fn parse_cmyk_string(s: &str) -> Result<[u8; 4], Error> {
    validate_cmyk_string(s)?;
    let mut out = [0u8; 4];
    for (i, slot) in out.iter_mut().enumerate() {
        let hex = &s[1 + i * 2..3 + i * 2];
        *slot = u8::from_str_radix(hex, 16)
            .map_err(|_| Error::syntax(format!("invalid hex pair in CMYK string {:?}", s)))?;
    }
    Ok(out)
}

/// Content string: non-empty, codepoints in
/// `[U+0020..U+007E] ∪ [U+0080..U+D7FF] ∪ [U+E000..U+10FFFF]`, UTF-8 encoded
/// length <= 65535 bytes.
pub fn validate_content_string(s: &str) -> Result<(), Error> {
    if s.is_empty() {
        return Err(Error::domain("content string must be non-empty"));
    }
    if s.len() > 65535 {
        return Err(Error::domain(format!(
            "content string is {} bytes, exceeds the 65535-byte limit",
            s.len()
        )));
    }
    for c in s.chars() {
        let cp = c as u32;
        let allowed = (0x0020..=0x007E).contains(&cp)
            || (0x0080..=0xD7FF).contains(&cp)
            || (0xE000..=0x10FFFF).contains(&cp);
        if !allowed {
            return Err(Error::domain(format!(
                "content string contains forbidden codepoint U+{:04X}",
                cp
            )));
        }
    }
    Ok(())
}

/// The 14 standard PDF built-in font names.
pub const BUILTIN_FONT_NAMES: [&str; 14] = [
    "Times-Roman",
    "Times-Bold",
    "Times-Italic",
    "Times-BoldItalic",
    "Helvetica",
    "Helvetica-Bold",
    "Helvetica-Oblique",
    "Helvetica-BoldOblique",
    "Courier",
    "Courier-Oblique",
    "Courier-Bold",
    "Courier-BoldOblique",
    "Symbol",
    "ZapfDingbats",
];

pub fn validate_builtin_font_name(name: &str) -> Result<(), Error> {
    if BUILTIN_FONT_NAMES.contains(&name) {
        Ok(())
    } else {
        Err(Error::domain(format!("{:?} is not a recognised built-in font name", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn name_accepts_letters_digits_underscore() {
        assert!(validate_name("foo_Bar123").is_ok());
        assert!(validate_name("_private").is_ok());
    }

    #[test]
    fn name_rejects_leading_digit() {
        assert!(validate_name("1foo").is_err());
    }

    #[test]
    fn name_rejects_too_long() {
        let long = "a".repeat(32);
        assert!(validate_name(&long).is_err());
        let ok = "a".repeat(31);
        assert!(validate_name(&ok).is_ok());
    }

    #[test]
    fn cmyk_string_shape() {
        assert!(validate_cmyk_string("%00FF80AA").is_ok());
        assert!(validate_cmyk_string("00FF80AA").is_err());
        assert!(validate_cmyk_string("%00FF80").is_err());
        assert!(validate_cmyk_string("%ZZFF80AA").is_err());
    }

    #[test]
    fn cmyk_parses_channels() {
        assert_eq!(parse_cmyk_string("%00FF80AA").unwrap(), [0x00, 0xFF, 0x80, 0xAA]);
    }

    #[test]
    fn content_string_rejects_control_chars() {
        assert!(validate_content_string("hello\u{0007}").is_err());
        assert!(validate_content_string("hello world").is_ok());
    }

    #[test]
    fn content_string_rejects_surrogates_range_is_unreachable_but_bounds_hold() {
        // surrogates can't occur in a valid &str; just check boundary codepoints
        assert!(validate_content_string("\u{D7FF}").is_ok());
        assert!(validate_content_string("\u{E000}").is_ok());
    }

    #[test]
    fn builtin_font_names_recognised() {
        assert!(validate_builtin_font_name("Helvetica").is_ok());
        assert!(validate_builtin_font_name("ComicSans").is_err());
    }
}
