use std::sync::Arc;

use anyhow::Context;

use crate::{
    core::Size,
    error::{ForgeError, ForgeResult},
};

/// Raster image in premultiplied RGBA8 form.
///
/// The pixel buffer is shared; cloning an `ImageBuf` never copies pixels.
/// Images are immutable once built.
#[derive(Clone, Debug)]
pub struct ImageBuf {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl ImageBuf {
    /// Build an image from straight-alpha RGBA8 bytes, premultiplying in place.
    pub fn from_rgba8(width: u32, height: u32, mut rgba: Vec<u8>) -> ForgeResult<Self> {
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(ForgeError::validation(format!(
                "image buffer size mismatch: {width}x{height} expects {expected} bytes, got {}",
                rgba.len()
            )));
        }
        premultiply_rgba8_in_place(&mut rgba);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba),
        })
    }

    /// Decode an encoded image (PNG, JPEG, ...) into premultiplied RGBA8.
    pub fn decode(bytes: &[u8]) -> ForgeResult<Self> {
        let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
        let rgba = dyn_img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba8(width, height, rgba.into_raw())
    }

    /// Build a single-color opaque image. Used by fixtures and the CLI.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> ForgeResult<Self> {
        let px_count = (width as usize).saturating_mul(height as usize);
        let mut bytes = Vec::with_capacity(px_count * 4);
        for _ in 0..px_count {
            bytes.extend_from_slice(&rgba);
        }
        Self::from_rgba8(width, height, bytes)
    }

    /// Intrinsic size in layout space.
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    /// Convert back to straight-alpha RGBA8 for encoding.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.rgba8_premul.as_slice().to_vec();
        for px in out.chunks_exact_mut(4) {
            let a = px[3] as u16;
            if a == 0 || a == 255 {
                continue;
            }
            px[0] = ((px[0] as u16 * 255 + a / 2) / a).min(255) as u8;
            px[1] = ((px[1] as u16 * 255 + a / 2) / a).min(255) as u8;
            px[2] = ((px[2] as u16 * 255 + a / 2) / a).min(255) as u8;
        }
        out
    }
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 255 {
            continue;
        }
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

/// Opaque reference to a selectable library asset.
///
/// Carries the intrinsic pixel size and whether full-resolution data is only
/// available remotely ("in-cloud").
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AssetHandle {
    /// Provider-assigned identifier; treated as opaque.
    pub id: String,
    /// Intrinsic width in pixels.
    pub width: u32,
    /// Intrinsic height in pixels.
    pub height: u32,
    /// True when no local full-resolution copy exists.
    pub in_cloud: bool,
}

/// Terminal outcome of a full-resolution fetch.
#[derive(Clone, Debug)]
pub enum AssetFetch {
    /// Full-resolution pixel data was available locally.
    Local(ImageBuf),
    /// The only available copy is remote; nothing was downloaded.
    RemoteOnly,
}

/// External asset store.
///
/// Every call produces exactly one terminal result; the engine never retries
/// on its own. Hosts marshal asynchronous completions back onto the
/// interaction thread before calling in.
pub trait AssetLibrary {
    /// Enumerate the assets visible to the app, in store order.
    fn available_assets(&self) -> ForgeResult<Vec<AssetHandle>>;

    /// Request full-resolution pixel data for one asset.
    fn fetch_full(&mut self, handle: &AssetHandle) -> ForgeResult<AssetFetch>;
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn decode_png_dimensions_and_premul() {
        let src_rgba = vec![100u8, 50u8, 200u8, 128u8];
        let img = image::RgbaImage::from_raw(1, 1, src_rgba).unwrap();

        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();

        let decoded = ImageBuf::decode(&buf).unwrap();
        assert_eq!(decoded.width, 1);
        assert_eq!(decoded.height, 1);
        assert_eq!(
            decoded.rgba8_premul.as_slice(),
            &[
                ((100u16 * 128 + 127) / 255) as u8,
                ((50u16 * 128 + 127) / 255) as u8,
                ((200u16 * 128 + 127) / 255) as u8,
                128u8
            ]
        );
    }

    #[test]
    fn from_rgba8_rejects_size_mismatch() {
        assert!(ImageBuf::from_rgba8(2, 2, vec![0u8; 15]).is_err());
        assert!(ImageBuf::from_rgba8(0, 2, vec![]).is_err());
    }

    #[test]
    fn solid_is_fully_opaque() {
        let img = ImageBuf::solid(2, 1, [10, 20, 30, 255]).unwrap();
        assert_eq!(
            img.rgba8_premul.as_slice(),
            &[10, 20, 30, 255, 10, 20, 30, 255]
        );
    }

    #[test]
    fn straight_roundtrip_preserves_opaque_pixels() {
        let img = ImageBuf::from_rgba8(1, 1, vec![7, 8, 9, 255]).unwrap();
        assert_eq!(img.to_straight_rgba8(), vec![7, 8, 9, 255]);
    }
}
