use std::sync::Arc;

use crate::{
    assets::ImageBuf,
    core::{Affine, Canvas},
    error::{ForgeError, ForgeResult},
    layout::{LayoutResult, aspect_fit},
    text::{TextLayoutEngine, measure, shrink_to_fit},
};

/// Caption styling: a heavy display face rendered as filled text over an
/// outline stroke, all-caps.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CaptionStyle {
    /// Starting font size before shrink-to-fit.
    pub base_size_px: f32,
    /// Shrink-to-fit floor.
    pub min_size_px: f32,
    /// Outline stroke width.
    pub stroke_width_px: f32,
    /// Fill color, straight RGBA8.
    pub fill: [u8; 4],
    /// Outline color, straight RGBA8.
    pub stroke: [u8; 4],
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            base_size_px: 40.0,
            min_size_px: 12.0,
            stroke_width_px: 2.0,
            fill: [255, 255, 255, 255],
            stroke: [0, 0, 0, 255],
        }
    }
}

/// Flattens a source image plus two captions into one output image.
///
/// The session layer depends on this seam so hosts and tests can substitute
/// their own renderer.
pub trait MemeRenderer {
    /// Render the flattened meme. Must not mutate `image` and must be
    /// deterministic: identical inputs produce identical output bytes.
    fn render(
        &mut self,
        image: &ImageBuf,
        top: &str,
        bottom: &str,
        layout: &LayoutResult,
        canvas: Canvas,
    ) -> ForgeResult<ImageBuf>;
}

/// CPU compositor backed by `vello_cpu`.
///
/// Draws the source image aspect-fit centered in the canvas, then each
/// caption centered horizontally within the layout's field width, vertically
/// at its offset relative to the canvas center. Empty captions draw nothing.
pub struct Compositor {
    style: CaptionStyle,
    font_bytes: Vec<u8>,
    font: vello_cpu::peniko::FontData,
    text_engine: TextLayoutEngine,
    ctx: Option<vello_cpu::RenderContext>,
}

impl Compositor {
    /// Build a compositor around the caption face's raw font bytes.
    ///
    /// The bytes are not parsed until the first non-empty caption is drawn.
    pub fn new(font_bytes: Vec<u8>, style: CaptionStyle) -> Self {
        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font_bytes.clone()),
            0,
        );
        Self {
            style,
            font_bytes,
            font,
            text_engine: TextLayoutEngine::new(),
            ctx: None,
        }
    }

    /// Current caption style.
    pub fn style(&self) -> CaptionStyle {
        self.style
    }

    fn take_ctx(&mut self, width: u16, height: u16) -> vello_cpu::RenderContext {
        let mut ctx = match self.ctx.take() {
            None => vello_cpu::RenderContext::new(width, height),
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            Some(_) => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        ctx
    }

    fn draw_source_image(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        image: &ImageBuf,
        canvas: Canvas,
    ) -> ForgeResult<()> {
        let fitted = aspect_fit(image.size(), canvas.as_size())?;
        let scale = fitted.width / f64::from(image.width);
        let tx = (f64::from(canvas.width) - fitted.width) / 2.0;
        let ty = (f64::from(canvas.height) - fitted.height) / 2.0;

        let paint = image_paint(image)?;
        ctx.set_transform(affine_to_cpu(
            Affine::translate((tx, ty)) * Affine::scale(scale),
        ));
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(image.width),
            f64::from(image.height),
        ));
        Ok(())
    }

    fn draw_caption(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        center_offset: f64,
        field_width: f64,
        canvas: Canvas,
    ) -> ForgeResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        let caption = text.to_uppercase();
        let style = self.style;

        let Self {
            text_engine,
            font_bytes,
            font,
            ..
        } = self;

        let size_px = shrink_to_fit(style.base_size_px, style.min_size_px, field_width, |s| {
            let layout = text_engine.layout_caption(&caption, font_bytes, s)?;
            Ok(measure(&layout).0)
        })?;

        let layout = text_engine.layout_caption(&caption, font_bytes, size_px)?;
        let (text_w, text_h) = measure(&layout);
        let origin_x = f64::from(canvas.width) / 2.0 - text_w / 2.0;
        let origin_y = f64::from(canvas.height) / 2.0 + center_offset - text_h / 2.0;
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((origin_x, origin_y)));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs: Vec<vello_cpu::Glyph> = run
                    .glyphs()
                    .map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    })
                    .collect();
                let font_size = run.run().font_size();

                // Outline pass beneath the fill pass.
                ctx.set_stroke(vello_cpu::kurbo::Stroke::new(f64::from(
                    style.stroke_width_px,
                )));
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    style.stroke[0],
                    style.stroke[1],
                    style.stroke[2],
                    style.stroke[3],
                ));
                ctx.glyph_run(font)
                    .font_size(font_size)
                    .stroke_glyphs(glyphs.iter().copied());

                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    style.fill[0],
                    style.fill[1],
                    style.fill[2],
                    style.fill[3],
                ));
                ctx.glyph_run(font)
                    .font_size(font_size)
                    .fill_glyphs(glyphs.into_iter());
            }
        }
        Ok(())
    }
}

impl MemeRenderer for Compositor {
    fn render(
        &mut self,
        image: &ImageBuf,
        top: &str,
        bottom: &str,
        layout: &LayoutResult,
        canvas: Canvas,
    ) -> ForgeResult<ImageBuf> {
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| ForgeError::validation("canvas width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| ForgeError::validation("canvas height exceeds u16"))?;

        let mut ctx = self.take_ctx(width, height);
        let result = (|| -> ForgeResult<ImageBuf> {
            self.draw_source_image(&mut ctx, image, canvas)?;
            self.draw_caption(&mut ctx, top, layout.top_offset, layout.field_width, canvas)?;
            self.draw_caption(
                &mut ctx,
                bottom,
                layout.bottom_offset,
                layout.field_width,
                canvas,
            )?;

            ctx.flush();
            let mut pixmap = vello_cpu::Pixmap::new(width, height);
            ctx.render_to_pixmap(&mut pixmap);
            Ok(ImageBuf {
                width: canvas.width,
                height: canvas.height,
                rgba8_premul: Arc::new(pixmap.data_as_u8_slice().to_vec()),
            })
        })();
        self.ctx = Some(ctx);
        result
    }
}

fn image_paint(image: &ImageBuf) -> ForgeResult<vello_cpu::Image> {
    let w: u16 = image
        .width
        .try_into()
        .map_err(|_| ForgeError::validation("image width exceeds u16"))?;
    let h: u16 = image
        .height
        .try_into()
        .map_err(|_| ForgeError::validation("image height exceeds u16"))?;

    // Pixmap stores PremulRgba8; ImageBuf bytes are already premultiplied.
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (image.width as usize) * (image.height as usize),
    );
    for px in image.rgba8_premul.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutConfig, compute};

    fn render_solid(compositor: &mut Compositor) -> ImageBuf {
        let image = ImageBuf::solid(10, 5, [200, 40, 40, 255]).unwrap();
        let canvas = Canvas::new(40, 80).unwrap();
        let layout = compute(image.size(), canvas.as_size(), &LayoutConfig::default()).unwrap();
        compositor
            .render(&image, "", "", &layout, canvas)
            .unwrap()
    }

    #[test]
    fn render_matches_canvas_dimensions() {
        let mut compositor = Compositor::new(Vec::new(), CaptionStyle::default());
        let out = render_solid(&mut compositor);
        assert_eq!((out.width, out.height), (40, 80));
    }

    #[test]
    fn render_is_deterministic() {
        let mut compositor = Compositor::new(Vec::new(), CaptionStyle::default());
        let first = render_solid(&mut compositor);
        let second = render_solid(&mut compositor);
        assert_eq!(first.rgba8_premul, second.rgba8_premul);
    }

    #[test]
    fn image_band_is_centered_in_the_canvas() {
        let mut compositor = Compositor::new(Vec::new(), CaptionStyle::default());
        let out = render_solid(&mut compositor);

        // 10x5 image in a 40x80 canvas fits to 40x20, centered: rows 30..50.
        let px = |x: u32, y: u32| {
            let idx = ((y * out.width + x) * 4) as usize;
            out.rgba8_premul[idx + 3]
        };
        assert_eq!(px(20, 40), 255, "canvas center is inside the image band");
        assert_eq!(px(20, 10), 0, "above the band is transparent");
        assert_eq!(px(20, 70), 0, "below the band is transparent");
    }

    #[test]
    fn render_does_not_mutate_the_source_image() {
        let image = ImageBuf::solid(8, 8, [10, 20, 30, 255]).unwrap();
        let before = image.rgba8_premul.clone();
        let canvas = Canvas::new(32, 32).unwrap();
        let layout = compute(image.size(), canvas.as_size(), &LayoutConfig::default()).unwrap();

        let mut compositor = Compositor::new(Vec::new(), CaptionStyle::default());
        compositor.render(&image, "", "", &layout, canvas).unwrap();
        assert_eq!(image.rgba8_premul, before);
    }

    #[test]
    fn oversized_canvas_is_rejected() {
        let image = ImageBuf::solid(2, 2, [0, 0, 0, 255]).unwrap();
        let canvas = Canvas::new(100_000, 10).unwrap();
        let layout = compute(
            image.size(),
            crate::core::Size::new(100.0, 10.0),
            &LayoutConfig::default(),
        )
        .unwrap();
        let mut compositor = Compositor::new(Vec::new(), CaptionStyle::default());
        assert!(compositor.render(&image, "", "", &layout, canvas).is_err());
    }
}
