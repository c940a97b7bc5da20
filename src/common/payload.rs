use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Upload,
    Capture,
}

/// Canonical encoded image, identical in shape whether it was uploaded or
/// captured. The encoded data is a `data:<mime>;base64,<...>` URI.
#[derive(Clone)]
pub struct ImagePayload {
    id: Uuid,
    data_uri: Arc<str>,
    provenance: Provenance,
    created_at: DateTime<Utc>,
}

impl ImagePayload {
    pub fn from_bytes(mime_type: &str, bytes: &[u8], provenance: Provenance) -> Self {
        let encoded = general_purpose::STANDARD.encode(bytes);
        let data_uri = format!("data:{};base64,{}", mime_type, encoded);
        Self {
            id: Uuid::new_v4(),
            data_uri: Arc::from(data_uri),
            provenance,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn mime_type(&self) -> Option<&str> {
        parse_data_uri(&self.data_uri).map(|(mime, _)| mime)
    }

    /// Decodes the base64 body back into the raw image bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, AppError> {
        let (_, body) = parse_data_uri(&self.data_uri)
            .ok_or_else(|| AppError::Decode("payload is not a base64 data URI".to_string()))?;
        general_purpose::STANDARD
            .decode(body)
            .map_err(|e| AppError::Decode(e.to_string()))
    }
}

impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("id", &self.id)
            .field("provenance", &self.provenance)
            .field("mime_type", &self.mime_type())
            .field("encoded_len", &self.data_uri.len())
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Splits `data:<mime>;base64,<body>` into its MIME type and body.
pub fn parse_data_uri(uri: &str) -> Option<(&str, &str)> {
    let rest = uri.strip_prefix("data:")?;
    let (header, body) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    Some((mime, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloning_payload_shares_encoded_data() {
        let p1 = ImagePayload::from_bytes("image/png", &[1, 2, 3], Provenance::Upload);
        let p2 = p1.clone();
        assert!(Arc::ptr_eq(&p1.data_uri, &p2.data_uri));
        assert_eq!(p1.id(), p2.id());
    }

    #[test]
    fn data_uri_is_self_describing() {
        let payload = ImagePayload::from_bytes("image/jpeg", b"abc", Provenance::Capture);
        assert_eq!(payload.data_uri(), "data:image/jpeg;base64,YWJj");
        assert_eq!(payload.mime_type(), Some("image/jpeg"));
        assert_eq!(payload.to_bytes().unwrap(), b"abc");
        assert_eq!(payload.provenance(), Provenance::Capture);
    }

    #[test]
    fn every_payload_gets_its_own_id() {
        let a = ImagePayload::from_bytes("image/png", &[0], Provenance::Upload);
        let b = ImagePayload::from_bytes("image/png", &[0], Provenance::Upload);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn parse_rejects_non_base64_uris() {
        assert!(parse_data_uri("data:text/plain,hello").is_none());
        assert!(parse_data_uri("https://example.com/a.png").is_none());
    }
}
