use crate::{
    core::{Orientation, Size},
    error::{ForgeError, ForgeResult},
};

/// Caption margins by orientation class, in layout distance units.
///
/// The margin is the minimum gap kept between a caption field and the
/// rendered image edge; landscape viewports use a narrower margin.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayoutConfig {
    pub margin_portrait: f64,
    pub margin_landscape: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin_portrait: 50.0,
            margin_landscape: 40.0,
        }
    }
}

impl LayoutConfig {
    /// Margin for a container's orientation class.
    pub fn margin_for(&self, container: Size) -> f64 {
        match Orientation::of(container) {
            Orientation::Portrait => self.margin_portrait,
            Orientation::Landscape => self.margin_landscape,
        }
    }
}

/// Derived caption placement for one image/container pair.
///
/// Never stored: recomputed from intrinsic sizes whenever the source image
/// or the container changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutResult {
    /// Vertical center of the top caption, relative to the container center.
    pub top_offset: f64,
    /// Vertical center of the bottom caption, relative to the container center.
    pub bottom_offset: f64,
    /// Horizontal extent of both captions (the rendered image width).
    pub field_width: f64,
}

/// Uniformly scale `image` to the largest size fitting entirely inside
/// `container`.
pub fn aspect_fit(image: Size, container: Size) -> ForgeResult<Size> {
    validate_size("image", image)?;
    validate_size("container", container)?;
    let scale = (container.width / image.width).min(container.height / image.height);
    Ok(Size::new(image.width * scale, image.height * scale))
}

/// Place the two caption fields over an aspect-fit rendering of `image`
/// centered in `container`.
///
/// Deterministic and idempotent: equal inputs always produce an identical
/// result.
pub fn compute(image: Size, container: Size, config: &LayoutConfig) -> ForgeResult<LayoutResult> {
    let rendered = aspect_fit(image, container)?;
    let margin = config.margin_for(container);
    Ok(LayoutResult {
        top_offset: -(rendered.height / 2.0) + margin,
        bottom_offset: (rendered.height / 2.0) - margin,
        field_width: rendered.width,
    })
}

fn validate_size(what: &str, size: Size) -> ForgeResult<()> {
    if !size.width.is_finite() || !size.height.is_finite() || size.width <= 0.0 || size.height <= 0.0
    {
        return Err(ForgeError::validation(format!(
            "{what} size must be finite and > 0, got {}x{}",
            size.width, size.height
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_image_in_tall_container() {
        // scale = min(400/1000, 800/500) = 0.4, rendered 400x200.
        let layout = compute(
            Size::new(1000.0, 500.0),
            Size::new(400.0, 800.0),
            &LayoutConfig::default(),
        )
        .unwrap();
        assert_eq!(layout.top_offset, -150.0);
        assert_eq!(layout.bottom_offset, 150.0);
        assert_eq!(layout.field_width, 400.0);
    }

    #[test]
    fn tall_image_in_wide_container_uses_landscape_margin() {
        // scale = min(800/500, 400/1000) = 0.4, rendered 200x400.
        let layout = compute(
            Size::new(500.0, 1000.0),
            Size::new(800.0, 400.0),
            &LayoutConfig::default(),
        )
        .unwrap();
        assert_eq!(layout.top_offset, -160.0);
        assert_eq!(layout.bottom_offset, 160.0);
        assert_eq!(layout.field_width, 200.0);
    }

    #[test]
    fn aspect_fit_upscales_small_images() {
        let fitted = aspect_fit(Size::new(10.0, 5.0), Size::new(100.0, 100.0)).unwrap();
        assert_eq!(fitted, Size::new(100.0, 50.0));
    }

    #[test]
    fn same_aspect_fills_the_container() {
        let fitted = aspect_fit(Size::new(200.0, 100.0), Size::new(400.0, 200.0)).unwrap();
        assert_eq!(fitted, Size::new(400.0, 200.0));
    }

    #[test]
    fn compute_is_deterministic_across_calls() {
        let image = Size::new(1234.0, 777.0);
        let container = Size::new(390.0, 844.0);
        let config = LayoutConfig::default();
        let first = compute(image, container, &config).unwrap();
        for _ in 0..3 {
            assert_eq!(compute(image, container, &config).unwrap(), first);
        }
    }

    #[test]
    fn degenerate_sizes_are_rejected() {
        let config = LayoutConfig::default();
        assert!(compute(Size::new(0.0, 10.0), Size::new(10.0, 10.0), &config).is_err());
        assert!(compute(Size::new(10.0, 10.0), Size::new(10.0, f64::NAN), &config).is_err());
    }

    #[test]
    fn custom_margins_are_respected() {
        let config = LayoutConfig {
            margin_portrait: 10.0,
            margin_landscape: 5.0,
        };
        let layout = compute(Size::new(100.0, 100.0), Size::new(100.0, 100.0), &config).unwrap();
        assert_eq!(layout.top_offset, -40.0);
        assert_eq!(layout.bottom_offset, 40.0);
    }
}
