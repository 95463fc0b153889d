//! Embedded cover extraction
//!
//! Tags are read with `lofty`, pictures decoded with `image`.

use image::{ColorType, DynamicImage, ImageFormat};
use lofty::file::TaggedFileExt;
use lofty::picture::{Picture, PictureType};
use std::io::Cursor;
use std::path::Path;

use crate::config::SizeMeasure;
use crate::error::TagError;
use crate::models::CoverInfo;

/// Reads the cover of a music file
pub trait CoverExtractor {
    /// Returns `None` if the file carries no embedded picture
    fn read_cover(&self, path: &Path) -> Result<Option<CoverInfo>, TagError>;
}

/// Extractor for all tag formats supported by lofty
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyCoverExtractor {
    size_measure: SizeMeasure,
}

impl LoftyCoverExtractor {
    pub fn new(size_measure: SizeMeasure) -> Self {
        Self { size_measure }
    }
}

impl CoverExtractor for LoftyCoverExtractor {
    fn read_cover(&self, path: &Path) -> Result<Option<CoverInfo>, TagError> {
        let tagged_file = lofty::read_from_path(path)?;
        let pictures: Vec<&Picture> = tagged_file
            .primary_tag()
            .into_iter()
            .chain(tagged_file.tags())
            .flat_map(|tag| tag.pictures())
            .collect();

        let Some(picture) = pictures
            .iter()
            .find(|p| p.pic_type() == PictureType::CoverFront)
            .or_else(|| pictures.first())
        else {
            return Ok(None);
        };

        decode_cover(picture.data().to_vec(), self.size_measure).map(Some)
    }
}

/// Decode embedded picture bytes and measure them
pub fn decode_cover(raw_bytes: Vec<u8>, size_measure: SizeMeasure) -> Result<CoverInfo, TagError> {
    let image = image::load_from_memory(&raw_bytes)?;
    let (width, height) = (image.width(), image.height());
    let measured_bytes = match size_measure {
        SizeMeasure::Embedded => raw_bytes.len() as u64,
        SizeMeasure::Reencoded => reencoded_len(&image)?,
    };
    Ok(CoverInfo::new(raw_bytes, width, height).with_measured_bytes(measured_bytes))
}

/// Byte length of the image encoded as BMP
pub fn reencoded_len(image: &DynamicImage) -> Result<u64, TagError> {
    let mut buf = Cursor::new(Vec::new());
    match image.color() {
        ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8 => {
            image.write_to(&mut buf, ImageFormat::Bmp)?;
        }
        // Deep color covers are narrowed to 8 bits per channel
        _ => {
            DynamicImage::ImageRgba8(image.to_rgba8()).write_to(&mut buf, ImageFormat::Bmp)?;
        }
    }
    Ok(buf.into_inner().len() as u64)
}
