use crate::error::{ForgeError, ForgeResult};

/// RGBA8 brush color carried through Parley caption layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct CaptionBrush {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Stateful helper for building Parley caption layouts from raw font bytes.
///
/// The caption face is registered once, on first use; captions are laid out
/// as a single unwrapped line so width can be measured for shrink-to-fit.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<CaptionBrush>,
    family: Option<String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            family: None,
        }
    }

    fn ensure_family(&mut self, font_bytes: &[u8]) -> ForgeResult<String> {
        if let Some(name) = &self.family {
            return Ok(name.clone());
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            ForgeError::validation("no font families registered from font bytes")
        })?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| ForgeError::validation("registered font family has no name"))?
            .to_string();

        self.family = Some(family_name.clone());
        Ok(family_name)
    }

    /// Shape and lay out one caption line at the given size.
    pub(crate) fn layout_caption(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
    ) -> ForgeResult<parley::Layout<CaptionBrush>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ForgeError::validation(
                "caption size_px must be finite and > 0",
            ));
        }

        let family_name = self.ensure_family(font_bytes)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(CaptionBrush::default()));

        let mut layout: parley::Layout<CaptionBrush> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

/// Measured extent of a laid-out caption: (max line advance, total height).
pub(crate) fn measure(layout: &parley::Layout<CaptionBrush>) -> (f64, f64) {
    let mut w = 0.0f64;
    let mut h = 0.0f64;
    for line in layout.lines() {
        let m = line.metrics();
        w = w.max(f64::from(m.advance));
        h += f64::from(m.ascent + m.descent + m.leading);
    }
    (w, h)
}

/// Find the largest size `<= base_px` whose measured advance fits
/// `max_width`, floored at `min_px`.
///
/// Advance is close to linear in font size, so each step rescales
/// proportionally and re-measures; the step floor guarantees termination.
pub(crate) fn shrink_to_fit(
    base_px: f32,
    min_px: f32,
    max_width: f64,
    mut measure_at: impl FnMut(f32) -> ForgeResult<f64>,
) -> ForgeResult<f32> {
    let mut size = base_px.max(min_px);
    for _ in 0..8 {
        let width = measure_at(size)?;
        if width <= max_width || size <= min_px {
            break;
        }
        let scaled = (f64::from(size) * (max_width / width)) as f32;
        size = scaled.min(size - 0.5).max(min_px);
    }
    Ok(size)
}
