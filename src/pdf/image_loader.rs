//! Image resource loading (C9): decodes JPEG/PNG files into the XObject
//! streams a page's `/XObject` resource dictionary references. Grounded in
//! the teacher's `xobject.rs` image-dictionary assembly (`Width`/`Height`/
//! `BitsPerComponent`/`ColorSpace`/`Filter` keys), decoding with the `image`
//! crate the way the teacher's own `embedded_images` feature does.

use std::fs;

use image::{DynamicImage, GenericImageView};
use lopdf::{Dictionary as LoDictionary, Object, Stream as LoStream};

use crate::error::Error;

enum ImageData {
    /// Raw DCT-compressed bytes straight from the source file: JPEG is
    /// already in a PDF-native filter, no re-encoding needed.
    Jpeg { width: u32, height: u32, bytes: Vec<u8> },
    /// Decoded raw samples; `lopdf` applies `FlateDecode` on write.
    Png { width: u32, height: u32, gray: bool, samples: Vec<u8> },
}

pub struct LoadedImage {
    data: ImageData,
}

impl LoadedImage {
    pub fn from_jpeg_path(path: &str) -> Result<Self, Error> {
        let bytes = fs::read(path).map_err(|e| Error::resource(format!("could not read image file {:?}: {}", path, e)))?;
        let decoded = image::load_from_memory_with_format(&bytes, image::ImageFormat::Jpeg)
            .map_err(|e| Error::resource(format!("could not decode JPEG {:?}: {}", path, e)))?;
        let (width, height) = decoded.dimensions();
        Ok(LoadedImage { data: ImageData::Jpeg { width, height, bytes } })
    }

    pub fn from_png_path(path: &str) -> Result<Self, Error> {
        let bytes = fs::read(path).map_err(|e| Error::resource(format!("could not read image file {:?}: {}", path, e)))?;
        let decoded = image::load_from_memory_with_format(&bytes, image::ImageFormat::Png)
            .map_err(|e| Error::resource(format!("could not decode PNG {:?}: {}", path, e)))?;
        let (width, height) = decoded.dimensions();
        let gray = matches!(decoded, DynamicImage::ImageLuma8(_) | DynamicImage::ImageLuma16(_));
        let samples = if gray { decoded.to_luma8().into_raw() } else { decoded.to_rgb8().into_raw() };
        Ok(LoadedImage { data: ImageData::Png { width, height, gray, samples } })
    }

    pub fn to_pdf_stream(&self) -> LoStream {
        match &self.data {
            ImageData::Jpeg { width, height, bytes } => {
                let dict = LoDictionary::from_iter(vec![
                    ("Type", Object::Name(b"XObject".to_vec())),
                    ("Subtype", Object::Name(b"Image".to_vec())),
                    ("Width", Object::Integer(*width as i64)),
                    ("Height", Object::Integer(*height as i64)),
                    ("ColorSpace", Object::Name(b"DeviceRGB".to_vec())),
                    ("BitsPerComponent", Object::Integer(8)),
                    ("Filter", Object::Name(b"DCTDecode".to_vec())),
                ]);
                LoStream::new(dict, bytes.clone()).with_compression(false)
            }
            ImageData::Png { width, height, gray, samples } => {
                let color_space: &[u8] = if *gray { b"DeviceGray" } else { b"DeviceRGB" };
                let dict = LoDictionary::from_iter(vec![
                    ("Type", Object::Name(b"XObject".to_vec())),
                    ("Subtype", Object::Name(b"Image".to_vec())),
                    ("Width", Object::Integer(*width as i64)),
                    ("Height", Object::Integer(*height as i64)),
                    ("ColorSpace", Object::Name(color_space.to_vec())),
                    ("BitsPerComponent", Object::Integer(8)),
                ]);
                LoStream::new(dict, samples.clone())
            }
        }
    }
}
