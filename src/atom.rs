//! Atoms: interned identifiers drawn from a closed set, distinct from
//! strings and integers.
//!
//! Per spec §9 Open Question 4, the tokeniser must *not* reject an unknown
//! atom at parse time — `"Foo"` always tokenises to an atom value. Only the
//! operation that actually consumes the atom (a builder keyword, a cap/join
//! name, a colour model, ...) checks membership in the relevant subset of
//! the closed set, and only then is an unrecognised atom a (Domain) error.

use std::fmt;
use std::rc::Rc;

use crate::error::Error;

/// An interned atom value. Two atoms are equal iff their text matches.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Atom(pub Rc<str>);

impl Atom {
    pub fn new(s: impl Into<Rc<str>>) -> Self {
        Atom(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<str> for Atom {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

/// The full closed set of atoms meaningful anywhere in the language. This is
/// the union of every atom literal named in the specification (box names,
/// cap/join/rule/colour-model names, font-alteration keys, dictionary keys
/// accepted by Dialect A single-op builders, ...).
pub const ATOM_SET: &[&str] = &[
    // boundary boxes
    "ArtBox", "TrimBox", "BleedBox",
    // stroke caps
    "Butt", "Round", "Square",
    // stroke joins (Round is shared with caps)
    "Miter", "Bevel",
    // fill rules
    "Nonzero", "EvenOdd", "Null",
    // image formats
    "JPEG", "PNG",
    // image colour models
    "Gray", "YCbCr", "RGB", "IndexedRGB",
    // font variants
    "BuiltIn", "File", "Synthetic",
    // font alterations
    "hScale", "oblique", "boldness", "smallCaps", "charSpacing",
    // ream dictionary keys (Dialect A)
    "Width", "Height", "Rotation",
    "LeftMargin", "RightMargin", "TopMargin", "BottomMargin",
    // stroke dictionary keys (Dialect A; "Width" is shared with the ream
    // dictionary's own Width key — dictionaries are per-object, so no
    // collision arises)
    "Color", "Cap", "Join", "MiterLimit", "DashPattern", "DashPhase",
];

/// Validates that an atom's text is a member of `allowed`. This is the
/// per-use-site check described in §9 Open Question 4: unknown atoms are
/// legal tokens, illegal only when consumed where a specific closed subset
/// is expected.
pub fn expect_one_of<'a>(atom: &'a Atom, allowed: &[&str]) -> Result<&'a str, Error> {
    let s = atom.as_str();
    if allowed.contains(&s) {
        Ok(s)
    } else {
        Err(Error::domain(format!(
            "atom {:?} is not one of the expected values {:?}",
            s, allowed
        )))
    }
}

/// Validates that an atom's text belongs to the global closed set at all
/// (used when an operation accepts "any atom" but still must reject
/// complete nonsense).
pub fn expect_known(atom: &Atom) -> Result<&str, Error> {
    let s = atom.as_str();
    if ATOM_SET.contains(&s) {
        Ok(s)
    } else {
        Err(Error::domain(format!("{:?} is not a recognised atom", s)))
    }
}
