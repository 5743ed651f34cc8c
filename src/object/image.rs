//! Image object: a decoded raster handle plus its placement-relevant
//! metadata. Grounded in the teacher's `image_types::OutputImageFormat` and
//! `image::Image`/`ImageXObject`, narrowed to the colour models, size cap
//! and bit depth the language actually exposes (spec §3).

use crate::error::Error;

const MAX_DIMENSION: u32 = 16384;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn from_atom(s: &str) -> Result<Self, Error> {
        match s {
            "JPEG" => Ok(ImageFormat::Jpeg),
            "PNG" => Ok(ImageFormat::Png),
            other => Err(Error::domain(format!("unknown image format '{}'", other))),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColorModel {
    Gray,
    /// JPEG's YCbCr and PNG's RGB both land here: the writer treats both as
    /// a three-component device colour space.
    YCbCrOrRgb,
    /// PNG-only indexed-colour palette.
    IndexedRgb,
}

impl ColorModel {
    pub fn from_atom(s: &str) -> Result<Self, Error> {
        match s {
            "Gray" => Ok(ColorModel::Gray),
            "YCbCr" | "RGB" => Ok(ColorModel::YCbCrOrRgb),
            "IndexedRGB" => Ok(ColorModel::IndexedRgb),
            other => Err(Error::domain(format!("unknown colour model '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub path: String,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub color_model: ColorModel,
    pub has_alpha: bool,
    pub interlaced: bool,
    pub bits_per_component: u8,
}

/// Checks the metadata a decoder reported back against the language's
/// placement constraints. These are not decode errors; the decode already
/// succeeded — this rejects images the PDF writer cannot place as-is.
pub fn validate_image_metadata(image: &Image) -> Result<(), Error> {
    if image.width == 0 || image.height == 0 {
        return Err(Error::domain("image width and height must each be > 0"));
    }
    if image.width > MAX_DIMENSION || image.height > MAX_DIMENSION {
        return Err(Error::domain(format!(
            "image dimensions must each be <= {}",
            MAX_DIMENSION
        )));
    }
    if image.color_model == ColorModel::IndexedRgb && image.format != ImageFormat::Png {
        return Err(Error::domain("indexed-RGB colour model is only valid for PNG images"));
    }
    if image.has_alpha {
        return Err(Error::domain("images with an alpha channel are not supported"));
    }
    if image.interlaced {
        return Err(Error::domain("interlaced images are not supported"));
    }
    if image.bits_per_component == 0 || image.bits_per_component > 8 {
        return Err(Error::domain("images must have at most 8 bits per component"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Image {
        Image {
            path: "logo.png".into(),
            format: ImageFormat::Png,
            width: 100,
            height: 50,
            color_model: ColorModel::YCbCrOrRgb,
            has_alpha: false,
            interlaced: false,
            bits_per_component: 8,
        }
    }

    #[test]
    fn valid_image_passes() {
        assert!(validate_image_metadata(&sample()).is_ok());
    }

    #[test]
    fn alpha_rejected() {
        let mut img = sample();
        img.has_alpha = true;
        assert!(validate_image_metadata(&img).is_err());
    }

    #[test]
    fn interlaced_rejected() {
        let mut img = sample();
        img.interlaced = true;
        assert!(validate_image_metadata(&img).is_err());
    }

    #[test]
    fn over_8_bit_rejected() {
        let mut img = sample();
        img.bits_per_component = 16;
        assert!(validate_image_metadata(&img).is_err());
    }

    #[test]
    fn over_max_dimension_rejected() {
        let mut img = sample();
        img.width = 20000;
        assert!(validate_image_metadata(&img).is_err());
    }

    #[test]
    fn indexed_rgb_requires_png() {
        let mut img = sample();
        img.color_model = ColorModel::IndexedRgb;
        img.format = ImageFormat::Jpeg;
        assert!(validate_image_metadata(&img).is_err());
        img.format = ImageFormat::Png;
        assert!(validate_image_metadata(&img).is_ok());
    }

    #[test]
    fn format_and_color_model_atoms() {
        assert_eq!(ImageFormat::from_atom("JPEG").unwrap(), ImageFormat::Jpeg);
        assert!(ImageFormat::from_atom("Gif").is_err());
        assert_eq!(ColorModel::from_atom("IndexedRGB").unwrap(), ColorModel::IndexedRgb);
        assert!(ColorModel::from_atom("Pantone").is_err());
    }
}
