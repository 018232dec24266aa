use crate::error::{ForgeError, ForgeResult};

/// Permission kinds this engine gates on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PermissionKind {
    /// Capture-device (camera) access.
    Camera,
    /// Read-write photo library access.
    Photos,
}

impl std::fmt::Display for PermissionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermissionKind::Camera => f.write_str("camera"),
            PermissionKind::Photos => f.write_str("photo library"),
        }
    }
}

/// Authorization state as reported by the external provider.
///
/// The provider owns the mechanism; this engine owns only the policy of what
/// each state permits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PermissionState {
    /// The user has not been asked yet.
    Unknown,
    /// Full access granted.
    Authorized,
    /// Access to a user-selected subset of assets (photos only).
    Limited,
    /// The user denied access.
    Denied,
    /// Access is restricted by device policy and cannot be granted.
    Restricted,
}

/// Allowed next action for an acquisition attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateAction {
    /// Open the capture device.
    OpenCapture,
    /// Open the full-library picker.
    OpenFullPicker,
    /// Open the limited-library selector.
    OpenLimitedPicker,
    /// Issue the one-shot authorization request, then evaluate the returned
    /// state. Never escapes [`resolve`].
    RequestThenEvaluate,
}

/// External authorization provider: current-status query plus a one-shot
/// request per permission kind.
///
/// `request` must report exactly one terminal state per invocation. Hosts
/// marshal the completion back onto the interaction thread before calling
/// back into the engine.
pub trait AuthorizationProvider {
    /// Current authorization state for `kind`.
    fn status(&self, kind: PermissionKind) -> PermissionState;

    /// Ask the user once; returns the state after their decision.
    fn request(&mut self, kind: PermissionKind) -> PermissionState;
}

/// Map an authorization state to the allowed next action.
///
/// Pure policy, shared by every acquisition path. `Limited` is meaningful
/// only for the photo library; a limited camera grant is treated as an
/// unrecognized provider state.
pub fn evaluate(kind: PermissionKind, state: PermissionState) -> ForgeResult<GateAction> {
    match (kind, state) {
        (PermissionKind::Camera, PermissionState::Authorized) => Ok(GateAction::OpenCapture),
        (PermissionKind::Photos, PermissionState::Authorized) => Ok(GateAction::OpenFullPicker),
        (PermissionKind::Photos, PermissionState::Limited) => Ok(GateAction::OpenLimitedPicker),
        (_, PermissionState::Unknown) => Ok(GateAction::RequestThenEvaluate),
        (_, PermissionState::Denied) => Err(ForgeError::PermissionDenied(kind)),
        (_, PermissionState::Restricted) => Err(ForgeError::PermissionRestricted(kind)),
        (PermissionKind::Camera, PermissionState::Limited) => {
            Err(ForgeError::UnknownAuthorization)
        }
    }
}

/// Evaluate the current state, issuing the one-shot request at most once.
///
/// Returns only `Open*` actions. A provider that reports `Unknown` again
/// after its own request has completed is out of contract; that case is
/// surfaced as [`ForgeError::UnknownAuthorization`] rather than retried.
pub fn resolve(
    kind: PermissionKind,
    provider: &mut dyn AuthorizationProvider,
) -> ForgeResult<GateAction> {
    match evaluate(kind, provider.status(kind))? {
        GateAction::RequestThenEvaluate => {
            tracing::debug!(?kind, "requesting authorization");
            match evaluate(kind, provider.request(kind))? {
                GateAction::RequestThenEvaluate => Err(ForgeError::UnknownAuthorization),
                action => Ok(action),
            }
        }
        action => Ok(action),
    }
}
