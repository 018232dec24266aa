use crate::permission::PermissionKind;

/// Convenience result type used across memeforge.
pub type ForgeResult<T> = Result<T, ForgeError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Every variant is terminal for the current attempt only; nothing here is
/// fatal to the process and the caller may retry by re-invoking the action.
/// User-initiated cancellation is never an error; it is reported through the
/// outcome enums of the operation that was cancelled.
#[derive(thiserror::Error, Debug)]
pub enum ForgeError {
    /// The user has denied access for this permission kind.
    #[error("{0} access has been denied; enable {0} access in the system privacy settings")]
    PermissionDenied(PermissionKind),

    /// Access for this permission kind is restricted by device policy.
    #[error("{0} access has been restricted; adjust {0} access in the system privacy settings")]
    PermissionRestricted(PermissionKind),

    /// The authorization provider reported a state this engine does not
    /// recognize. Forward-compatibility catch-all, not a real operating state.
    #[error("the authorization provider reported an unrecognized state")]
    UnknownAuthorization,

    /// No capture device is present on this machine.
    #[error("the capture device is not currently available")]
    DeviceUnavailable,

    /// The selected asset's full-resolution data is only available remotely.
    #[error("the selected image is only available in the cloud; download it and try again")]
    AssetRemoteOnly,

    /// Confirm was invoked without a current selection. Callers are expected
    /// to prevent this by disabling confirm while nothing is selected.
    #[error("no asset is selected")]
    SelectionEmpty,

    /// Invalid user-provided or composition data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ForgeError {
    /// Build a [`ForgeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
