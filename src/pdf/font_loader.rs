//! Font resource loading (C9): turns a built-in name or a font file's bytes
//! into the objects a page's `/Font` resource dictionary references. The
//! built-in path validates against the 14 standard PDF base fonts; the
//! embedded path is backed by `font::ParsedFont::from_bytes` (`allsorts`).

use std::fs;

use lopdf::{Dictionary as LoDictionary, Document, Object, Stream as LoStream};

use crate::error::Error;

const BUILTIN_BASE_FONTS: &[&str] = &[
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

/// A font resource ready to be turned into a PDF font dictionary.
pub enum LoadedFont {
    /// One of the 14 standard fonts: no embedding, just a `BaseFont` name.
    Standard { base_font: &'static str },
    /// A TrueType/OpenType file, parsed once at load time and embedded as
    /// `FontFile2` on first use.
    Embedded { num_glyphs: u16, units_per_em: u16, ascender: i16, descender: i16, bytes: Vec<u8> },
}

impl LoadedFont {
    pub fn standard(name: &str) -> Result<Self, Error> {
        let base_font = BUILTIN_BASE_FONTS
            .iter()
            .find(|&&candidate| candidate == name)
            .ok_or_else(|| Error::domain(format!("{:?} is not a recognised built-in font name", name)))?;
        Ok(LoadedFont::Standard { base_font })
    }

    pub fn from_file(path: &str) -> Result<Self, Error> {
        let bytes = fs::read(path).map_err(|e| Error::resource(format!("could not read font file {:?}: {}", path, e)))?;
        let parsed = crate::font::ParsedFont::from_bytes(&bytes, 0, false)
            .ok_or_else(|| Error::resource(format!("could not parse font file {:?}", path)))?;
        let metrics = &parsed.font_metrics;
        Ok(LoadedFont::Embedded {
            num_glyphs: parsed.num_glyphs,
            units_per_em: metrics.units_per_em,
            ascender: metrics.ascender,
            descender: metrics.descender,
            bytes,
        })
    }

    /// Builds the `/Font` resource entry, allocating any supporting objects
    /// (descriptor, embedded file stream) directly on `doc`.
    pub fn to_pdf_dict(&self, doc: &mut Document) -> LoDictionary {
        match self {
            LoadedFont::Standard { base_font } => LoDictionary::from_iter(vec![
                ("Type", Object::Name(b"Font".to_vec())),
                ("Subtype", Object::Name(b"Type1".to_vec())),
                ("BaseFont", Object::Name(base_font.as_bytes().to_vec())),
            ]),
            LoadedFont::Embedded { num_glyphs, units_per_em, ascender, descender, bytes } => {
                let file_dict = LoDictionary::from_iter(vec![("Length1", Object::Integer(bytes.len() as i64))]);
                let file_stream = LoStream::new(file_dict, bytes.clone());
                let file_id = doc.add_object(Object::Stream(file_stream));

                let descriptor = LoDictionary::from_iter(vec![
                    ("Type", Object::Name(b"FontDescriptor".to_vec())),
                    ("FontName", Object::Name(b"EmbeddedFont".to_vec())),
                    ("Flags", Object::Integer(32)),
                    ("Ascent", Object::Integer(*ascender as i64)),
                    ("Descent", Object::Integer(*descender as i64)),
                    ("CapHeight", Object::Integer(*ascender as i64)),
                    ("ItalicAngle", Object::Integer(0)),
                    ("StemV", Object::Integer(80)),
                    ("FontFile2", Object::Reference(file_id)),
                ]);
                let descriptor_id = doc.add_object(Object::Dictionary(descriptor));

                LoDictionary::from_iter(vec![
                    ("Type", Object::Name(b"Font".to_vec())),
                    ("Subtype", Object::Name(b"TrueType".to_vec())),
                    ("BaseFont", Object::Name(b"EmbeddedFont".to_vec())),
                    ("FirstChar", Object::Integer(0)),
                    ("LastChar", Object::Integer((*num_glyphs).min(255) as i64)),
                    ("FontDescriptor", Object::Reference(descriptor_id)),
                    ("UnitsPerEm", Object::Integer(*units_per_em as i64)),
                ])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_font_name_validated() {
        assert!(LoadedFont::standard("Helvetica").is_ok());
        assert!(LoadedFont::standard("ComicSans").is_err());
    }
}
