use crate::{
    assets::ImageBuf,
    compose::MemeRenderer,
    core::{Canvas, Size},
    error::{ForgeError, ForgeResult},
    layout::{LayoutConfig, LayoutResult, compute},
    store::{Meme, MemeStore},
};

/// Seed caption shown in a fresh editor before the user types.
pub const SEED_TOP_TEXT: &str = "TOP";
/// Seed caption shown in a fresh editor before the user types.
pub const SEED_BOTTOM_TEXT: &str = "BOTTOM";

/// Lifecycle of one editing session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// No image loaded; editing controls are disabled.
    Empty,
    /// A source image is loaded and captions are at their seeds.
    ImageLoaded,
    /// The user has edited at least one caption.
    TextEditing,
    /// A flattened image has been handed to the share surface.
    Exporting,
    /// The share surface reported completion and the store was updated.
    Committed,
    /// The session ended without touching the store.
    Discarded,
}

/// Terminal outcome of an export attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The share completed; the meme now lives at `index` in the store.
    Committed { index: usize },
    /// The user dismissed the share surface; nothing was committed.
    Cancelled,
}

/// External export/share surface.
///
/// Reports success or cancellation exactly once per presented image. Hosts
/// marshal the completion back onto the interaction thread.
pub trait ShareSurface {
    fn present(&mut self, image: &ImageBuf) -> ForgeResult<ShareOutcome>;
}

/// Terminal report from the share surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShareOutcome {
    Completed,
    Cancelled,
}

/// One meme editing session: load an image, edit two captions, export.
///
/// The store is only written when the share surface reports successful
/// completion; cancelling (the editor or the share sheet) never writes.
/// The injected `on_finish` handle runs when the session reaches a terminal
/// phase, so display surfaces re-read the store when control returns to them
/// (the editor knows nothing about the host's navigation structure).
pub struct EditSession {
    phase: SessionPhase,
    viewport: Size,
    layout_config: LayoutConfig,
    image: Option<ImageBuf>,
    top_text: String,
    bottom_text: String,
    edit_index: Option<usize>,
    on_finish: Option<Box<dyn FnMut()>>,
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("phase", &self.phase)
            .field("viewport", &self.viewport)
            .field("edit_index", &self.edit_index)
            .finish_non_exhaustive()
    }
}

impl EditSession {
    /// Start a session for a brand-new meme.
    pub fn new(
        viewport: Size,
        layout_config: LayoutConfig,
        on_finish: Option<Box<dyn FnMut()>>,
    ) -> Self {
        Self {
            phase: SessionPhase::Empty,
            viewport,
            layout_config,
            image: None,
            top_text: SEED_TOP_TEXT.to_string(),
            bottom_text: SEED_BOTTOM_TEXT.to_string(),
            edit_index: None,
            on_finish,
        }
    }

    /// Start a session that edits the meme stored at `index` in place.
    ///
    /// Prefills both captions and the original (un-captioned) source image.
    pub fn edit_existing(
        index: usize,
        store: &MemeStore,
        viewport: Size,
        layout_config: LayoutConfig,
        on_finish: Option<Box<dyn FnMut()>>,
    ) -> ForgeResult<Self> {
        let meme = store.get(index).ok_or_else(|| {
            ForgeError::validation(format!("meme index {index} out of range"))
        })?;
        Ok(Self {
            phase: SessionPhase::ImageLoaded,
            viewport,
            layout_config,
            image: Some(meme.original.clone()),
            top_text: meme.top_text.clone(),
            bottom_text: meme.bottom_text.clone(),
            edit_index: Some(index),
            on_finish,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn top_text(&self) -> &str {
        &self.top_text
    }

    pub fn bottom_text(&self) -> &str {
        &self.bottom_text
    }

    /// Load (or replace) the source image.
    pub fn load_image(&mut self, image: ImageBuf) {
        self.image = Some(image);
        if self.phase == SessionPhase::Empty {
            self.phase = SessionPhase::ImageLoaded;
        }
    }

    /// Record the new viewport after a container-size change (rotation).
    ///
    /// Placement is derived on demand from intrinsic sizes; nothing cached
    /// here goes stale.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    pub fn set_top_text(&mut self, text: impl Into<String>) -> ForgeResult<()> {
        self.require_image()?;
        self.top_text = text.into();
        self.phase = SessionPhase::TextEditing;
        Ok(())
    }

    pub fn set_bottom_text(&mut self, text: impl Into<String>) -> ForgeResult<()> {
        self.require_image()?;
        self.bottom_text = text.into();
        self.phase = SessionPhase::TextEditing;
        Ok(())
    }

    /// Caption placement for the current image and viewport.
    ///
    /// Recomputed on every call from the image's intrinsic size, never from a
    /// previous layout pass.
    pub fn layout(&self) -> ForgeResult<LayoutResult> {
        let image = self.image.as_ref().ok_or_else(no_image)?;
        compute(image.size(), self.viewport, &self.layout_config)
    }

    /// Flatten the current state and hand it to the share surface.
    ///
    /// The store is written only when the surface reports completion: append
    /// for a new meme, replace-in-place for an edit. A cancelled share
    /// discards the session and leaves the store untouched. A share-surface
    /// error keeps the session alive so the user can retry.
    #[tracing::instrument(skip_all, fields(edit_index = ?self.edit_index))]
    pub fn export(
        &mut self,
        renderer: &mut dyn MemeRenderer,
        store: &mut MemeStore,
        share: &mut dyn ShareSurface,
    ) -> ForgeResult<ExportOutcome> {
        let image = self.image.clone().ok_or_else(no_image)?;
        let layout = compute(image.size(), self.viewport, &self.layout_config)?;
        let canvas = Canvas::from_size(self.viewport)?;
        let rendered =
            renderer.render(&image, &self.top_text, &self.bottom_text, &layout, canvas)?;

        let resume_phase = self.phase;
        self.phase = SessionPhase::Exporting;
        match share.present(&rendered) {
            Ok(ShareOutcome::Completed) => {
                let meme = Meme {
                    top_text: self.top_text.clone(),
                    bottom_text: self.bottom_text.clone(),
                    original: image,
                    rendered,
                };
                let index = match self.edit_index {
                    Some(index) => {
                        store.replace(meme, index)?;
                        index
                    }
                    None => {
                        store.append(meme);
                        store.len() - 1
                    }
                };
                self.phase = SessionPhase::Committed;
                self.finish();
                Ok(ExportOutcome::Committed { index })
            }
            Ok(ShareOutcome::Cancelled) => {
                self.phase = SessionPhase::Discarded;
                self.finish();
                Ok(ExportOutcome::Cancelled)
            }
            Err(err) => {
                // Attempt-local failure: the session stays editable.
                self.phase = resume_phase;
                Err(err)
            }
        }
    }

    /// Abandon the session: the image is cleared, captions return to their
    /// seeds, and the store is never touched.
    pub fn cancel(&mut self) {
        self.image = None;
        self.top_text = SEED_TOP_TEXT.to_string();
        self.bottom_text = SEED_BOTTOM_TEXT.to_string();
        self.phase = SessionPhase::Discarded;
        self.finish();
    }

    fn require_image(&self) -> ForgeResult<()> {
        if self.image.is_none() {
            return Err(no_image());
        }
        Ok(())
    }

    fn finish(&mut self) {
        if let Some(on_finish) = self.on_finish.as_mut() {
            on_finish();
        }
    }
}

fn no_image() -> ForgeError {
    ForgeError::validation("no source image is loaded")
}

/// Re-present an already-stored meme's flattened image (detail surface).
///
/// Never mutates the store, whatever the share surface reports.
pub fn share_existing(
    store: &MemeStore,
    index: usize,
    share: &mut dyn ShareSurface,
) -> ForgeResult<ShareOutcome> {
    let meme = store
        .get(index)
        .ok_or_else(|| ForgeError::validation(format!("meme index {index} out of range")))?;
    share.present(&meme.rendered)
}
