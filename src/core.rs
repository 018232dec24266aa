use crate::error::{ForgeError, ForgeResult};

pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated canvas with non-zero dimensions.
    pub fn new(width: u32, height: u32) -> ForgeResult<Self> {
        if width == 0 || height == 0 {
            return Err(ForgeError::validation("canvas width/height must be > 0"));
        }
        Ok(Self { width, height })
    }

    /// Round a layout-space size to whole pixels.
    pub fn from_size(size: Size) -> ForgeResult<Self> {
        if !size.width.is_finite() || !size.height.is_finite() {
            return Err(ForgeError::validation("canvas size must be finite"));
        }
        Self::new(size.width.round() as u32, size.height.round() as u32)
    }

    /// Convert back to layout space.
    pub fn as_size(self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

/// Orientation class of a viewport, derived from its aspect.
///
/// Square viewports classify as portrait.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Classify a container size.
    pub fn of(size: Size) -> Self {
        if size.width > size.height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}
