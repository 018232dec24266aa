//! Memeforge is a meme composition and collection-management engine.
//!
//! The pipeline is the classic meme editor's core, with the visual chrome
//! left to the host:
//!
//! - A [`permission`] gate maps external authorization states to an allowed
//!   next action, identically from every caller.
//! - An [`acquire::AssetSource`] obtains a source image from a capture
//!   device, the full photo library, or (under limited authorization) a
//!   [`selector::LimitedSelector`] over the visible asset subset.
//! - [`layout`] places two caption fields over an aspect-fit rendering of
//!   the image inside the current viewport.
//! - A [`compose::Compositor`] flattens image + captions into one output
//!   image on the CPU.
//! - A [`store::MemeStore`] keeps the ordered collection with edit-in-place,
//!   delete, and reorder semantics; an [`session::EditSession`] commits to it
//!   only on confirmed export.
#![forbid(unsafe_code)]

pub mod acquire;
pub mod assets;
pub mod compose;
pub mod core;
pub mod error;
pub mod layout;
pub mod permission;
pub mod selector;
pub mod session;
pub mod store;
mod text;

pub use crate::acquire::{AssetSource, CaptureDevice, LibraryFlow, PhotoPicker, PickOutcome};
pub use crate::assets::{AssetFetch, AssetHandle, AssetLibrary, ImageBuf};
pub use crate::compose::{CaptionStyle, Compositor, MemeRenderer};
pub use crate::core::{Canvas, Orientation, Size};
pub use crate::error::{ForgeError, ForgeResult};
pub use crate::layout::{LayoutConfig, LayoutResult, aspect_fit, compute};
pub use crate::permission::{
    AuthorizationProvider, GateAction, PermissionKind, PermissionState, evaluate, resolve,
};
pub use crate::selector::LimitedSelector;
pub use crate::session::{
    EditSession, ExportOutcome, SessionPhase, ShareOutcome, ShareSurface, share_existing,
};
pub use crate::store::{Meme, MemeStore};
