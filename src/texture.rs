//! Tile texture decoding
//!
//! The scheduler never looks inside a texture; fetch clients that talk to real
//! storage use [`TextureDecoder`] to turn downloaded bytes into a [`TileTexture`].

use image::io::Reader as ImageReader;
use image::ImageFormat;
use thiserror::Error;

/// Error type for texture decoding operations
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Image decoding error: {0}")]
    DecodeError(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Decoded pixel data for one tile
#[derive(Debug, Clone)]
pub struct TileTexture {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub format: TextureFormat,
}

impl TileTexture {
    /// Size of the pixel payload in bytes
    pub fn byte_size(&self) -> usize {
        self.data.len()
    }
}

/// Supported texture formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextureFormat {
    Rgba8,
    Rgb8,
}

/// Decodes JPEG and PNG tile payloads into RGBA8 textures
#[derive(Debug, Default, Clone, Copy)]
pub struct TextureDecoder;

impl TextureDecoder {
    /// Create a new texture decoder
    pub fn new() -> Self {
        Self
    }

    /// Decode a texture from binary data
    pub fn decode(&self, data: &[u8]) -> Result<TileTexture, TextureError> {
        let format =
            image::guess_format(data).map_err(|e| TextureError::DecodeError(e.to_string()))?;

        match format {
            ImageFormat::Jpeg | ImageFormat::Png => {}
            _ => {
                return Err(TextureError::UnsupportedFormat(format!(
                    "Only JPG/JPEG and PNG tiles are supported, got {:?}",
                    format.extensions_str()
                )))
            }
        }

        let img = ImageReader::with_format(std::io::Cursor::new(data), format)
            .decode()
            .map_err(|e| TextureError::DecodeError(e.to_string()))?;

        let rgba_img = img.into_rgba8();
        let (width, height) = rgba_img.dimensions();

        Ok(TileTexture {
            width,
            height,
            data: rgba_img.into_raw(),
            format: TextureFormat::Rgba8,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn encoded_tile(format: ImageFormat) -> Vec<u8> {
        let mut img = image::RgbImage::new(2, 2);
        img.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        img.put_pixel(1, 1, image::Rgb([0, 0, 255]));

        let mut encoded = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut encoded), format)
            .expect("Failed to encode test image");
        encoded
    }

    #[test]
    fn test_decode_jpeg() {
        let decoder = TextureDecoder::new();
        let result = decoder.decode(&encoded_tile(ImageFormat::Jpeg));
        assert!(result.is_ok(), "Failed to decode JPEG: {:?}", result.err());

        let texture = result.unwrap();
        assert_eq!(texture.width, 2);
        assert_eq!(texture.height, 2);
        assert_eq!(texture.format, TextureFormat::Rgba8);
        assert_eq!(texture.byte_size(), 2 * 2 * 4);
    }

    #[test]
    fn test_decode_png() {
        let decoder = TextureDecoder::new();
        let texture = decoder.decode(&encoded_tile(ImageFormat::Png)).unwrap();
        assert_eq!(texture.width, 2);
        assert_eq!(&texture.data[0..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_decode_garbage() {
        let decoder = TextureDecoder::new();
        let result = decoder.decode(b"definitely not an image");
        assert!(matches!(result, Err(TextureError::DecodeError(_))));
    }
}
