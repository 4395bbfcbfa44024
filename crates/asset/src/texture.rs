//! Texture loading and data structures.
//! Decoded pixels stay in their source channel layout (RGB8 or RGBA8);
//! the renderer expands to RGBA8 on upload.

use std::path::Path;

use crate::error::{AssetError, Result};

/// Texture data in CPU-friendly format before GPU upload.
#[derive(Clone, Debug)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

/// Supported texture formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureFormat {
    Rgb8,
    Rgba8,
}

impl TextureFormat {
    pub fn channels(self) -> u32 {
        match self {
            TextureFormat::Rgb8 => 3,
            TextureFormat::Rgba8 => 4,
        }
    }
}

/// Min/mag filter applied to every sampler. Wrap mode is always repeat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest,
    #[default]
    Linear,
}

impl TextureFilter {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "nearest" | "point" => Some(TextureFilter::Nearest),
            "linear" | "bilinear" => Some(TextureFilter::Linear),
            _ => None,
        }
    }
}

impl TextureData {
    /// Create a texture from raw pixels. Panics if `data` does not match the format size.
    pub fn new(width: u32, height: u32, format: TextureFormat, data: Vec<u8>) -> Self {
        assert_eq!(
            data.len(),
            (width * height * format.channels()) as usize,
            "Data size doesn't match {:?} format",
            format
        );
        Self {
            data,
            width,
            height,
            format,
        }
    }

    /// Decode an image file. Rows are flipped so v=0 is the bottom row, as OBJ expects.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading texture from {:?}", path);

        let img = image::open(path).map_err(|e| match e {
            image::ImageError::IoError(source) => AssetError::io(path, source),
            source => AssetError::Decode {
                path: path.to_path_buf(),
                source,
            },
        })?;
        let img = img.flipv();

        let texture = if img.color().has_alpha() {
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            Self::new(width, height, TextureFormat::Rgba8, rgba.into_raw())
        } else {
            let rgb = img.to_rgb8();
            let (width, height) = rgb.dimensions();
            Self::new(width, height, TextureFormat::Rgb8, rgb.into_raw())
        };

        log::info!(
            "Loaded texture {}x{} ({} channels, {} bytes)",
            texture.width,
            texture.height,
            texture.channels(),
            texture.data.len()
        );
        Ok(texture)
    }

    /// 1x1 opaque white, bound when a draw has no diffuse map.
    pub fn white() -> Self {
        Self::new(1, 1, TextureFormat::Rgba8, vec![255, 255, 255, 255])
    }

    pub fn channels(&self) -> u32 {
        self.format.channels()
    }

    /// Pixels as tightly packed RGBA8, adding an opaque alpha channel when needed.
    pub fn to_rgba8(&self) -> Vec<u8> {
        match self.format {
            TextureFormat::Rgba8 => self.data.clone(),
            TextureFormat::Rgb8 => {
                let mut out = Vec::with_capacity((self.width * self.height * 4) as usize);
                for px in self.data.chunks_exact(3) {
                    out.extend_from_slice(&[px[0], px[1], px[2], 255]);
                }
                out
            }
        }
    }

    /// Check if the texture data is valid.
    pub fn is_valid(&self) -> bool {
        let expected_size = (self.width * self.height * self.channels()) as usize;
        self.data.len() == expected_size && self.width > 0 && self.height > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_expands_to_opaque_rgba() {
        let tex = TextureData::new(2, 1, TextureFormat::Rgb8, vec![10, 20, 30, 40, 50, 60]);
        assert_eq!(tex.channels(), 3);
        assert_eq!(tex.to_rgba8(), vec![10, 20, 30, 255, 40, 50, 60, 255]);
    }

    #[test]
    fn white_fallback_is_valid() {
        let tex = TextureData::white();
        assert!(tex.is_valid());
        assert_eq!(tex.to_rgba8(), vec![255; 4]);
    }

    #[test]
    fn truncated_pixels_are_invalid() {
        let mut tex = TextureData::white();
        tex.data.pop();
        assert!(!tex.is_valid());
    }

    #[test]
    fn filter_names() {
        assert_eq!(TextureFilter::from_name("NEAREST"), Some(TextureFilter::Nearest));
        assert_eq!(TextureFilter::from_name("linear"), Some(TextureFilter::Linear));
        assert_eq!(TextureFilter::from_name("trilinear"), None);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = TextureData::load("/definitely/not/here/ball.png").unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }

    #[test]
    fn garbage_file_is_decode_error() {
        let path = std::env::temp_dir().join(format!("asset-garbage-{}.png", std::process::id()));
        std::fs::write(&path, b"not a png at all").unwrap();
        let err = TextureData::load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(err.is_recoverable(), "unexpected error: {err}");
    }

    #[test]
    fn decodes_png_and_flips_rows() {
        let path = std::env::temp_dir().join(format!("asset-flip-{}.png", std::process::id()));
        // Top row red, bottom row blue.
        let img = image::RgbImage::from_fn(1, 2, |_, y| {
            if y == 0 {
                image::Rgb([255, 0, 0])
            } else {
                image::Rgb([0, 0, 255])
            }
        });
        img.save(&path).unwrap();

        let tex = TextureData::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(tex.format, TextureFormat::Rgb8);
        assert_eq!((tex.width, tex.height), (1, 2));
        assert_eq!(&tex.data[0..3], &[0, 0, 255]);
        assert_eq!(&tex.data[3..6], &[255, 0, 0]);
    }
}
