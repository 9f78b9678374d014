//! Attachment embedder resolving file references to self-contained data URIs.
//!
//! The offline report must render without any file-system access at view
//! time, so every screenshot, video and trace is inlined as base64.

use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::models::AttachmentRef;

/// An attachment inlined into the report payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedAttachment {
    /// Display name (the original file name for path-only references)
    pub name: String,
    /// Resolved content type
    pub content_type: String,
    /// `data:` URI holding the base64-encoded bytes
    pub data_uri: String,
}

/// Resolves attachment paths against the report output root and inlines
/// their bytes.
///
/// Every per-item failure is isolated: a missing or unreadable file drops
/// that one entry with a warning and generation continues.
#[derive(Debug, Clone)]
pub struct AttachmentEmbedder {
    root: PathBuf,
}

impl AttachmentEmbedder {
    /// Create an embedder resolving paths relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        AttachmentEmbedder { root: root.into() }
    }

    /// Inline screenshots; entries that cannot be read are omitted.
    pub async fn embed_screenshots(&self, paths: &[String]) -> Vec<EmbeddedAttachment> {
        let mut embedded = Vec::with_capacity(paths.len());
        for path in paths {
            match self.embed(path, image_content_type(path)).await {
                Ok(attachment) => embedded.push(attachment),
                Err(e) => warn!("Dropping screenshot: {}", e),
            }
        }
        embedded
    }

    /// Inline videos; entries that cannot be read are omitted.
    pub async fn embed_videos(&self, paths: &[String]) -> Vec<EmbeddedAttachment> {
        let mut embedded = Vec::with_capacity(paths.len());
        for path in paths {
            match self.embed(path, video_content_type(path)).await {
                Ok(attachment) => embedded.push(attachment),
                Err(e) => warn!("Dropping video: {}", e),
            }
        }
        embedded
    }

    /// Inline the trace archive; a missing file nulls the field.
    pub async fn embed_trace(&self, path: Option<&str>) -> Option<EmbeddedAttachment> {
        let path = path?;
        match self.embed(path, "application/zip").await {
            Ok(attachment) => Some(attachment),
            Err(e) => {
                warn!("Dropping trace: {}", e);
                None
            }
        }
    }

    /// Inline named attachments, using the content type the runner supplied.
    pub async fn embed_named(&self, attachments: &[AttachmentRef]) -> Vec<EmbeddedAttachment> {
        let mut embedded = Vec::with_capacity(attachments.len());
        for attachment in attachments {
            match self.embed(&attachment.path, &attachment.content_type).await {
                Ok(mut item) => {
                    item.name = attachment.name.clone();
                    embedded.push(item);
                }
                Err(e) => warn!("Dropping attachment '{}': {}", attachment.name, e),
            }
        }
        embedded
    }

    /// Read one file and wrap it as a data URI.
    async fn embed(&self, path: &str, content_type: &str) -> AppResult<EmbeddedAttachment> {
        let resolved = self.root.join(path);
        let bytes = tokio::fs::read(&resolved)
            .await
            .map_err(|e| AppError::MissingAttachment(format!("{}: {}", resolved.display(), e)))?;

        let name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string());

        Ok(EmbeddedAttachment {
            name,
            content_type: content_type.to_string(),
            data_uri: format!("data:{};base64,{}", content_type, BASE64.encode(&bytes)),
        })
    }
}

/// Video content type from the file extension; unknown extensions fall back
/// to mp4.
fn video_content_type(path: &str) -> &'static str {
    match extension(path).as_deref() {
        Some("webm") => "video/webm",
        Some("ogg") => "video/ogg",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        _ => "video/mp4",
    }
}

/// Image content type from the file extension; unknown extensions fall back
/// to png.
fn image_content_type(path: &str) -> &'static str {
    match extension(path).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}

fn extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_file(dir: &Path, name: &str, bytes: &[u8]) {
        std::fs::write(dir.join(name), bytes).unwrap();
    }

    #[tokio::test]
    async fn test_screenshot_embeds_as_data_uri() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "shot.png", b"fake-png-bytes");

        let embedder = AttachmentEmbedder::new(dir.path());
        let embedded = embedder.embed_screenshots(&["shot.png".to_string()]).await;

        assert_eq!(embedded.len(), 1);
        assert_eq!(embedded[0].name, "shot.png");
        assert_eq!(embedded[0].content_type, "image/png");
        assert!(embedded[0].data_uri.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_missing_screenshot_is_omitted_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "present.png", b"bytes");

        let embedder = AttachmentEmbedder::new(dir.path());
        let embedded = embedder
            .embed_screenshots(&["absent.png".to_string(), "present.png".to_string()])
            .await;

        assert_eq!(embedded.len(), 1);
        assert_eq!(embedded[0].name, "present.png");
    }

    #[tokio::test]
    async fn test_video_content_type_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "clip.webm", b"v");
        write_file(dir.path(), "clip.unknown", b"v");

        let embedder = AttachmentEmbedder::new(dir.path());
        let embedded = embedder
            .embed_videos(&["clip.webm".to_string(), "clip.unknown".to_string()])
            .await;

        assert_eq!(embedded[0].content_type, "video/webm");
        // Unknown extensions default to mp4.
        assert_eq!(embedded[1].content_type, "video/mp4");
    }

    #[tokio::test]
    async fn test_missing_trace_nulls_the_field() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = AttachmentEmbedder::new(dir.path());

        assert!(embedder.embed_trace(Some("trace.zip")).await.is_none());
        assert!(embedder.embed_trace(None).await.is_none());
    }

    #[tokio::test]
    async fn test_named_attachment_keeps_supplied_content_type() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "report.txt", b"log");

        let embedder = AttachmentEmbedder::new(dir.path());
        let embedded = embedder
            .embed_named(&[AttachmentRef {
                name: "console log".to_string(),
                content_type: "text/plain".to_string(),
                path: "report.txt".to_string(),
            }])
            .await;

        assert_eq!(embedded.len(), 1);
        assert_eq!(embedded[0].name, "console log");
        assert_eq!(embedded[0].content_type, "text/plain");
        assert!(embedded[0].data_uri.starts_with("data:text/plain;base64,"));
    }
}
