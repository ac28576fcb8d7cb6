//! Decoded raster wrapper.

use crate::{CropRect, ImageError, Result, Size};
use image::{imageops, ImageFormat, RgbaImage};
use std::ffi::OsString;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// One immutable decoded raster.
///
/// Cropping produces a new independent `Image`; the source is never
/// mutated.
#[derive(Debug, Clone)]
pub struct Image {
    pixels: RgbaImage,
}

impl Image {
    /// Wrap an already-decoded RGBA buffer.
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// Decode a PNG byte buffer.
    pub fn from_png_bytes(bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .map_err(|e| ImageError::Decode(e.to_string()))?;
        Ok(Self {
            pixels: decoded.to_rgba8(),
        })
    }

    /// Read and decode a PNG file.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        Self::from_png_bytes(&bytes)
    }

    pub fn size(&self) -> Size {
        Size::new(self.pixels.width(), self.pixels.height())
    }

    /// Extract `rect` into a new image.
    ///
    /// The crop calculator never produces an out-of-bounds rectangle; if
    /// one arrives anyway this fails instead of returning clipped pixels.
    pub fn crop(&self, rect: CropRect) -> Result<Self> {
        if !rect.fits_within(self.size()) {
            return Err(ImageError::CropBounds {
                rect,
                size: self.size(),
            });
        }
        let view = imageops::crop_imm(&self.pixels, rect.left, rect.top, rect.width, rect.height);
        Ok(Self {
            pixels: view.to_image(),
        })
    }

    /// Encode the raster as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.pixels
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| ImageError::Encode(e.to_string()))?;
        Ok(buffer)
    }

    /// Write the raster to `path` as PNG.
    ///
    /// The file is encoded fully in memory and moved into place, so a
    /// failed save never leaves a partial file behind.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_png_bytes()?;
        write_atomic(path.as_ref(), &bytes).await
    }

    pub(crate) fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Write via a sibling temp file and rename into place.
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp_name = OsString::from(path.as_os_str());
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
