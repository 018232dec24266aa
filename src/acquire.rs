use crate::{
    assets::ImageBuf,
    error::{ForgeError, ForgeResult},
    permission::{AuthorizationProvider, GateAction, PermissionKind, resolve},
};

/// Terminal outcome of a capture or pick attempt.
///
/// Cancellation is a normal outcome reported by the provider, not an error,
/// and never leaves partial state behind.
#[derive(Clone, Debug)]
pub enum PickOutcome {
    /// The user produced an image.
    Picked(ImageBuf),
    /// The user dismissed the capture/picker surface.
    Cancelled,
}

/// External capture device (camera).
pub trait CaptureDevice {
    /// Whether a capture device is present at all.
    fn is_available(&self) -> bool;

    /// Run one capture interaction; exactly one terminal outcome.
    fn capture(&mut self) -> ForgeResult<PickOutcome>;
}

/// External full-library picker.
///
/// The pick targets a single image at maximum available resolution. The
/// provider contract is one terminal response per invocation; an empty
/// result list means the user cancelled.
pub trait PhotoPicker {
    /// Present the picker with a selection limit of one.
    fn pick_single(&mut self) -> ForgeResult<Vec<ImageBuf>>;
}

/// Outcome of a gated library-pick attempt.
#[derive(Clone, Debug)]
pub enum LibraryFlow {
    /// Full access: the picker ran and the user chose an image.
    Picked(ImageBuf),
    /// Full access: the picker ran and the user cancelled.
    Cancelled,
    /// Limited access: the caller should open a
    /// [`LimitedSelector`](crate::selector::LimitedSelector) instead.
    LimitedAccess,
}

/// Permission-gated acquisition of a source image.
///
/// Borrows its three provider handles for the duration of one attempt; the
/// same gating policy applies identically from every caller.
pub struct AssetSource<'a> {
    auth: &'a mut dyn AuthorizationProvider,
    camera: &'a mut dyn CaptureDevice,
    picker: &'a mut dyn PhotoPicker,
}

impl<'a> AssetSource<'a> {
    pub fn new(
        auth: &'a mut dyn AuthorizationProvider,
        camera: &'a mut dyn CaptureDevice,
        picker: &'a mut dyn PhotoPicker,
    ) -> Self {
        Self {
            auth,
            camera,
            picker,
        }
    }

    /// Capture an image from the device.
    ///
    /// Device availability is checked before the permission gate; an absent
    /// device fails with [`ForgeError::DeviceUnavailable`] without consulting
    /// the authorization provider.
    pub fn capture(&mut self) -> ForgeResult<PickOutcome> {
        if !self.camera.is_available() {
            return Err(ForgeError::DeviceUnavailable);
        }
        match resolve(PermissionKind::Camera, self.auth)? {
            GateAction::OpenCapture => self.camera.capture(),
            // Photos-only actions; cannot arise for the camera kind.
            _ => Err(ForgeError::UnknownAuthorization),
        }
    }

    /// Pick an image from the photo library.
    ///
    /// Under limited authorization the pick is not run here; the caller is
    /// told to open the limited selector.
    pub fn pick_from_library(&mut self) -> ForgeResult<LibraryFlow> {
        match resolve(PermissionKind::Photos, self.auth)? {
            GateAction::OpenFullPicker => {
                let results = self.picker.pick_single()?;
                // Selection limit is 1; a longer list is a provider contract
                // violation and only the first result is honored.
                match results.into_iter().next() {
                    Some(image) => Ok(LibraryFlow::Picked(image)),
                    None => Ok(LibraryFlow::Cancelled),
                }
            }
            GateAction::OpenLimitedPicker => Ok(LibraryFlow::LimitedAccess),
            _ => Err(ForgeError::UnknownAuthorization),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::PermissionState;

    struct FixedAuth {
        camera: PermissionState,
        photos: PermissionState,
        consulted: bool,
    }

    impl FixedAuth {
        fn new(camera: PermissionState, photos: PermissionState) -> Self {
            Self {
                camera,
                photos,
                consulted: false,
            }
        }
    }

    impl AuthorizationProvider for FixedAuth {
        fn status(&self, kind: PermissionKind) -> PermissionState {
            match kind {
                PermissionKind::Camera => self.camera,
                PermissionKind::Photos => self.photos,
            }
        }

        fn request(&mut self, kind: PermissionKind) -> PermissionState {
            self.consulted = true;
            self.status(kind)
        }
    }

    struct FakeCamera {
        available: bool,
        result: Option<PickOutcome>,
    }

    impl CaptureDevice for FakeCamera {
        fn is_available(&self) -> bool {
            self.available
        }

        fn capture(&mut self) -> ForgeResult<PickOutcome> {
            Ok(self.result.take().expect("capture called twice"))
        }
    }

    struct FakePicker {
        results: Vec<ImageBuf>,
    }

    impl PhotoPicker for FakePicker {
        fn pick_single(&mut self) -> ForgeResult<Vec<ImageBuf>> {
            Ok(std::mem::take(&mut self.results))
        }
    }

    fn px(rgba: [u8; 4]) -> ImageBuf {
        ImageBuf::from_rgba8(1, 1, rgba.to_vec()).unwrap()
    }

    #[test]
    fn absent_device_fails_before_the_gate() {
        let mut auth = FixedAuth::new(PermissionState::Unknown, PermissionState::Unknown);
        let mut camera = FakeCamera {
            available: false,
            result: None,
        };
        let mut picker = FakePicker { results: vec![] };

        let mut source = AssetSource::new(&mut auth, &mut camera, &mut picker);
        assert!(matches!(
            source.capture(),
            Err(ForgeError::DeviceUnavailable)
        ));
        assert!(!auth.consulted, "gate must not run for an absent device");
    }

    #[test]
    fn capture_yields_the_device_outcome() {
        let mut auth = FixedAuth::new(PermissionState::Authorized, PermissionState::Denied);
        let mut camera = FakeCamera {
            available: true,
            result: Some(PickOutcome::Cancelled),
        };
        let mut picker = FakePicker { results: vec![] };

        let mut source = AssetSource::new(&mut auth, &mut camera, &mut picker);
        assert!(matches!(source.capture(), Ok(PickOutcome::Cancelled)));
    }

    #[test]
    fn denied_photos_surface_the_remediation_error() {
        let mut auth = FixedAuth::new(PermissionState::Authorized, PermissionState::Denied);
        let mut camera = FakeCamera {
            available: true,
            result: None,
        };
        let mut picker = FakePicker { results: vec![] };

        let mut source = AssetSource::new(&mut auth, &mut camera, &mut picker);
        assert!(matches!(
            source.pick_from_library(),
            Err(ForgeError::PermissionDenied(PermissionKind::Photos))
        ));
    }

    #[test]
    fn multi_result_pick_honors_only_the_first() {
        let mut auth = FixedAuth::new(PermissionState::Denied, PermissionState::Authorized);
        let mut camera = FakeCamera {
            available: true,
            result: None,
        };
        let first = px([1, 2, 3, 255]);
        let mut picker = FakePicker {
            results: vec![first.clone(), px([9, 9, 9, 255])],
        };

        let mut source = AssetSource::new(&mut auth, &mut camera, &mut picker);
        let LibraryFlow::Picked(image) = source.pick_from_library().unwrap() else {
            panic!("expected a picked image");
        };
        assert_eq!(image.rgba8_premul, first.rgba8_premul);
    }

    #[test]
    fn empty_pick_is_a_cancellation() {
        let mut auth = FixedAuth::new(PermissionState::Denied, PermissionState::Authorized);
        let mut camera = FakeCamera {
            available: true,
            result: None,
        };
        let mut picker = FakePicker { results: vec![] };

        let mut source = AssetSource::new(&mut auth, &mut camera, &mut picker);
        assert!(matches!(
            source.pick_from_library(),
            Ok(LibraryFlow::Cancelled)
        ));
    }

    #[test]
    fn limited_photos_divert_to_the_limited_selector() {
        let mut auth = FixedAuth::new(PermissionState::Denied, PermissionState::Limited);
        let mut camera = FakeCamera {
            available: true,
            result: None,
        };
        let mut picker = FakePicker {
            results: vec![px([1, 1, 1, 255])],
        };

        let mut source = AssetSource::new(&mut auth, &mut camera, &mut picker);
        assert!(matches!(
            source.pick_from_library(),
            Ok(LibraryFlow::LimitedAccess)
        ));
        // The full picker must not have been consumed.
        assert_eq!(picker.results.len(), 1);
    }
}
