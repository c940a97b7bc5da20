use tracing::{debug, info, warn};

use crate::capture::StillFrame;
use crate::common::{ImagePayload, Provenance};
use crate::config::UploadSettings;
use crate::error::AppError;

/// Turns uploads and camera stills into `ImagePayload`s.
///
/// Uploads are checked against the size limit and the accepted MIME types
/// before any decoding happens. Decoding is a single-shot read with no
/// cancellation path: once started it resolves exactly once.
#[derive(Debug, Clone)]
pub struct ImageAcquisition {
    max_bytes: u64,
    accepted_mime_types: Vec<String>,
}

impl ImageAcquisition {
    pub fn new(settings: &UploadSettings) -> Self {
        Self {
            max_bytes: settings.max_bytes,
            accepted_mime_types: settings.accepted_mime_types.clone(),
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Size is checked before format.
    pub fn validate(&self, mime_type: &str, size_bytes: u64) -> Result<(), AppError> {
        if size_bytes > self.max_bytes {
            return Err(AppError::PayloadTooLarge {
                size: size_bytes,
                limit: self.max_bytes,
            });
        }

        let mime_type = normalize_mime(mime_type);
        if !self
            .accepted_mime_types
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(mime_type))
        {
            return Err(AppError::UnsupportedFormat(mime_type.to_string()));
        }

        Ok(())
    }

    pub async fn from_upload(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
        size_bytes: u64,
    ) -> Result<ImagePayload, AppError> {
        // The declared size is advisory; the received bytes count too.
        let size_bytes = size_bytes.max(bytes.len() as u64);
        if let Err(e) = self.validate(mime_type, size_bytes) {
            warn!("Rejected upload: {}", e);
            return Err(e);
        }

        let mime_type = normalize_mime(mime_type).to_ascii_lowercase();
        debug!("Decoding {} byte {} upload", bytes.len(), mime_type);

        let payload = tokio::task::spawn_blocking(move || decode_upload(&mime_type, &bytes))
            .await
            .map_err(|e| AppError::Decode(format!("decode task failed: {}", e)))??;

        info!("Accepted upload as payload {}", payload.id());
        Ok(payload)
    }

    pub fn from_capture(frame: StillFrame) -> ImagePayload {
        let payload = ImagePayload::from_bytes(StillFrame::MIME_TYPE, &frame.jpeg, Provenance::Capture);
        debug!(
            "Wrapped {}x{} still as payload {}",
            frame.width,
            frame.height,
            payload.id()
        );
        payload
    }
}

// Drops parameters such as "; charset=binary".
fn normalize_mime(mime_type: &str) -> &str {
    mime_type.split(';').next().unwrap_or_default().trim()
}

fn decode_upload(mime_type: &str, bytes: &[u8]) -> Result<ImagePayload, AppError> {
    let image = image::load_from_memory(bytes).map_err(|e| AppError::Decode(e.to_string()))?;
    debug!("Upload decoded to {}x{}", image.width(), image.height());
    Ok(ImagePayload::from_bytes(mime_type, bytes, Provenance::Upload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgb};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(8, 8, Rgb([200, 100, 50]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn acquisition() -> ImageAcquisition {
        ImageAcquisition::new(&UploadSettings::default())
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected_before_decoding() {
        // Not a valid image: proves decoding never ran.
        let result = acquisition()
            .from_upload(vec![0; 4], "image/png", 10 * 1024 * 1024 + 1)
            .await;
        assert!(matches!(
            result,
            Err(AppError::PayloadTooLarge { size: 10_485_761, limit: 10_485_760 })
        ));
    }

    #[tokio::test]
    async fn under_declared_size_is_checked_against_received_bytes() {
        let acquisition = ImageAcquisition::new(&UploadSettings {
            max_bytes: 32,
            ..UploadSettings::default()
        });
        let bytes = png_bytes();
        let actual = bytes.len() as u64;
        assert!(actual > 32);

        let result = acquisition.from_upload(bytes, "image/png", 1).await;
        assert!(matches!(
            result,
            Err(AppError::PayloadTooLarge { size, limit: 32 }) if size == actual
        ));
    }

    #[tokio::test]
    async fn exactly_ten_mebibytes_is_allowed() {
        let bytes = png_bytes();
        let payload = acquisition()
            .from_upload(bytes, "image/png", 10 * 1024 * 1024)
            .await
            .unwrap();
        assert_eq!(payload.provenance(), Provenance::Upload);
    }

    #[tokio::test]
    async fn unsupported_mime_type_is_rejected() {
        for mime in ["image/gif", "image/webp", "application/pdf", ""] {
            let result = acquisition().from_upload(png_bytes(), mime, 100).await;
            assert!(
                matches!(result, Err(AppError::UnsupportedFormat(_))),
                "{mime} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn mime_comparison_ignores_case_and_parameters() {
        let payload = acquisition()
            .from_upload(png_bytes(), "IMAGE/PNG; charset=binary", 100)
            .await
            .unwrap();
        assert_eq!(payload.mime_type(), Some("image/png"));
    }

    #[tokio::test]
    async fn undecodable_bytes_fail_with_decode_error() {
        let result = acquisition()
            .from_upload(b"not an image".to_vec(), "image/jpeg", 12)
            .await;
        assert!(matches!(result, Err(AppError::Decode(_))));
    }

    #[tokio::test]
    async fn upload_keeps_declared_mime_in_data_uri() {
        let bytes = png_bytes();
        let payload = acquisition()
            .from_upload(bytes.clone(), "image/png", bytes.len() as u64)
            .await
            .unwrap();
        assert!(payload.data_uri().starts_with("data:image/png;base64,"));
        assert_eq!(payload.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn capture_frames_become_jpeg_capture_payloads() {
        let frame = StillFrame {
            jpeg: vec![0xFF, 0xD8, 0xFF],
            width: 2,
            height: 2,
            captured_at: chrono::Utc::now(),
        };
        let payload = ImageAcquisition::from_capture(frame);
        assert_eq!(payload.provenance(), Provenance::Capture);
        assert_eq!(payload.mime_type(), Some("image/jpeg"));
    }
}
