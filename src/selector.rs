use crate::{
    assets::{AssetFetch, AssetHandle, AssetLibrary, ImageBuf},
    error::{ForgeError, ForgeResult},
};

/// Single-select browser over the fixed asset set visible under limited
/// library authorization.
///
/// The handle list is fetched once when the selector opens and kept in store
/// order; at most one asset is marked at a time.
#[derive(Debug)]
pub struct LimitedSelector {
    assets: Vec<AssetHandle>,
    current: Option<usize>,
}

impl LimitedSelector {
    /// Open a selection session over the library's currently visible assets.
    pub fn open(library: &impl AssetLibrary) -> ForgeResult<Self> {
        Ok(Self {
            assets: library.available_assets()?,
            current: None,
        })
    }

    /// The fixed asset set, in store order.
    pub fn assets(&self) -> &[AssetHandle] {
        &self.assets
    }

    /// Index of the currently marked asset, if any.
    pub fn selected(&self) -> Option<usize> {
        self.current
    }

    /// Mark the asset at `index`, or clear the mark when `index` is already
    /// selected. Returns the new selection.
    pub fn select(&mut self, index: usize) -> ForgeResult<Option<usize>> {
        if index >= self.assets.len() {
            return Err(ForgeError::validation(format!(
                "asset index {index} out of range (have {})",
                self.assets.len()
            )));
        }
        self.current = if self.current == Some(index) {
            None
        } else {
            Some(index)
        };
        Ok(self.current)
    }

    /// Fetch the full-resolution image for the marked asset.
    ///
    /// An in-cloud asset fails with [`ForgeError::AssetRemoteOnly`] and
    /// performs no further action: the selection mark stays so the user can
    /// download the asset and retry. Degrading to a low-resolution substitute
    /// is disallowed. On success the caller ends the session by dropping the
    /// selector.
    pub fn confirm(&mut self, library: &mut impl AssetLibrary) -> ForgeResult<ImageBuf> {
        let index = self.current.ok_or(ForgeError::SelectionEmpty)?;
        let handle = &self.assets[index];
        tracing::debug!(id = %handle.id, "fetching full-resolution asset");
        match library.fetch_full(handle)? {
            AssetFetch::Local(image) => Ok(image),
            AssetFetch::RemoteOnly => Err(ForgeError::AssetRemoteOnly),
        }
    }

    /// End the session without selecting; all outer editing state is left
    /// unchanged.
    pub fn cancel(self) {}
}
