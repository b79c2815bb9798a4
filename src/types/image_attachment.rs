use base64::Engine;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// MIME type used when an attachment does not declare one.
const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// A base64-encoded image sent alongside a chat message.
///
/// Serializes to the `{"data": ..., "mime_type": ...}` shape the chat
/// service expects in the `images` list of a streaming request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageAttachment {
    /// The base64-encoded payload of the image.
    pub data: String,

    /// The MIME type of the image.
    pub mime_type: String,
}

impl ImageAttachment {
    /// Create a new attachment from an already-encoded payload.
    pub fn new(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Create an attachment by base64-encoding raw bytes.
    ///
    /// An absent or empty MIME type falls back to `image/jpeg`.
    pub fn from_bytes(bytes: &[u8], mime_type: Option<&str>) -> Self {
        let data = base64::engine::general_purpose::STANDARD.encode(bytes);
        let mime_type = mime_type
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MIME_TYPE);
        Self::new(data, mime_type)
    }

    /// Create an attachment from a file path.
    ///
    /// The MIME type is inferred from the file extension, defaulting to
    /// `image/jpeg` for unrecognized extensions.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mime_type = mime_type_for_path(path);
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            Error::io(format!("failed to read image {}", path.display()), e)
        })?;
        Ok(Self::from_bytes(&bytes, Some(mime_type)))
    }

    /// Convert a batch of files into attachments.
    ///
    /// Files are read concurrently; the output order matches the input
    /// order. The whole batch is awaited before any request is issued.
    pub async fn from_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Self>> {
        try_join_all(paths.iter().map(|p| Self::from_path(p.as_ref()))).await
    }
}

/// Infer an image MIME type from a file extension.
pub fn mime_type_for_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => DEFAULT_MIME_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization() {
        let attachment = ImageAttachment::new("SGVsbG8gV29ybGQ=", "image/png");

        let json = serde_json::to_string(&attachment).unwrap();
        let expected = r#"{"data":"SGVsbG8gV29ybGQ=","mime_type":"image/png"}"#;

        assert_eq!(json, expected);
    }

    #[test]
    fn test_deserialization() {
        let json = r#"{"data":"SGVsbG8gV29ybGQ=","mime_type":"image/webp"}"#;
        let attachment: ImageAttachment = serde_json::from_str(json).unwrap();

        assert_eq!(attachment.data, "SGVsbG8gV29ybGQ=");
        assert_eq!(attachment.mime_type, "image/webp");
    }

    #[test]
    fn from_bytes_encodes_and_defaults_mime_type() {
        let attachment = ImageAttachment::from_bytes(b"Hello World", None);
        assert_eq!(attachment.data, "SGVsbG8gV29ybGQ=");
        assert_eq!(attachment.mime_type, "image/jpeg");

        let attachment = ImageAttachment::from_bytes(b"Hello World", Some(""));
        assert_eq!(attachment.mime_type, "image/jpeg");

        let attachment = ImageAttachment::from_bytes(b"Hello World", Some("image/png"));
        assert_eq!(attachment.mime_type, "image/png");
    }

    #[test]
    fn mime_type_inference() {
        assert_eq!(mime_type_for_path(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(mime_type_for_path(Path::new("a.JPEG")), "image/jpeg");
        assert_eq!(mime_type_for_path(Path::new("a.png")), "image/png");
        assert_eq!(mime_type_for_path(Path::new("a.gif")), "image/gif");
        assert_eq!(mime_type_for_path(Path::new("a.webp")), "image/webp");
        assert_eq!(mime_type_for_path(Path::new("a.tiff")), "image/jpeg");
        assert_eq!(mime_type_for_path(Path::new("noext")), "image/jpeg");
    }

    #[tokio::test]
    async fn from_paths_preserves_order() {
        let dir = std::env::temp_dir().join("banchan-attachment-test");
        std::fs::create_dir_all(&dir).unwrap();
        let first = dir.join("first.png");
        let second = dir.join("second.webp");
        std::fs::write(&first, b"first").unwrap();
        std::fs::write(&second, b"second").unwrap();

        let attachments = ImageAttachment::from_paths(&[&first, &second])
            .await
            .unwrap();

        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0].mime_type, "image/png");
        assert_eq!(attachments[1].mime_type, "image/webp");
        assert!(!attachments[0].data.is_empty());
        assert!(!attachments[1].data.is_empty());

        std::fs::remove_file(&first).ok();
        std::fs::remove_file(&second).ok();
    }

    #[tokio::test]
    async fn from_path_missing_file_is_io_error() {
        let err = ImageAttachment::from_path("/definitely/not/here.png")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
