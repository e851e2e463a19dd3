//! Decoding of downloaded raster tiles.

use crate::error::WherewiseError;

/// An image decoded into raw RGBA bytes.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    bytes: Vec<u8>,
    dimensions: (u32, u32),
}

impl DecodedImage {
    /// Decodes an image from a byte slice.
    ///
    /// Attempts to guess the format of the image from the data. Non-RGBA
    /// images are converted to RGBA.
    pub fn decode(bytes: &[u8]) -> Result<Self, WherewiseError> {
        use image::GenericImageView;

        let decoded = image::load_from_memory(bytes)?;
        let dimensions = decoded.dimensions();

        Ok(Self {
            bytes: decoded.to_rgba8().into_vec(),
            dimensions,
        })
    }

    /// Width of the image in pixels.
    pub fn width(&self) -> u32 {
        self.dimensions.0
    }

    /// Height of the image in pixels.
    pub fn height(&self) -> u32 {
        self.dimensions.1
    }

    /// Raw image data in RGBA order, four bytes per pixel.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}
