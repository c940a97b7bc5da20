pub mod controller;
pub mod device;
pub mod session;
pub mod synthetic;

pub use controller::{MediaCaptureController, CAMERA_FALLBACK_MESSAGE};
pub use device::{CaptureConstraints, FacingMode, StillFrame, VideoSource, VideoStream};
pub use session::CaptureSession;
pub use synthetic::SyntheticCamera;
