// SYNOID Upload Intake
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Client file names are untrusted: only the final component is kept and
// only still-image extensions the pipeline can decode are accepted.

use crate::error::{CanvasError, Result};
use std::path::{Component, Path, PathBuf};
use tracing::info;

pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Reduce a client-supplied name to a safe bare file name.
pub fn sanitize_file_name(raw: &str) -> Result<String> {
    // accept both separators regardless of host platform
    let base = raw.rsplit(|c| c == '/' || c == '\\').next().unwrap_or_default().trim();

    if base.is_empty() || base.starts_with('.') {
        return Err(CanvasError::InvalidUpload(format!(
            "'{}' is not an acceptable file name",
            raw
        )));
    }

    let mut components = Path::new(base).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => {}
        _ => {
            return Err(CanvasError::InvalidUpload(format!(
                "'{}' is not an acceptable file name",
                raw
            )))
        }
    }

    let extension = Path::new(base)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    match extension {
        Some(ext) if ACCEPTED_EXTENSIONS.contains(&ext.as_str()) => Ok(base.to_string()),
        _ => Err(CanvasError::InvalidUpload(format!(
            "'{}' must be a jpg, jpeg or png image",
            base
        ))),
    }
}

/// Store an uploaded image under `<output_dir>/<name>` and return its path.
pub async fn save_upload(output_dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let name = sanitize_file_name(file_name)?;
    if bytes.is_empty() {
        return Err(CanvasError::InvalidUpload(format!("'{}' is empty", name)));
    }

    tokio::fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(&name);
    tokio::fs::write(&path, bytes).await?;

    info!("[PIPELINE] Stored upload {:?} ({} bytes)", path, bytes.len());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_images_case_insensitively() {
        assert_eq!(sanitize_file_name("dog.png").unwrap(), "dog.png");
        assert_eq!(sanitize_file_name("Dog.JPG").unwrap(), "Dog.JPG");
        assert_eq!(sanitize_file_name("my drawing.jpeg").unwrap(), "my drawing.jpeg");
    }

    #[test]
    fn test_strips_directories() {
        assert_eq!(sanitize_file_name("../../etc/cat.png").unwrap(), "cat.png");
        assert_eq!(sanitize_file_name("C:\\Users\\kid\\sun.jpg").unwrap(), "sun.jpg");
    }

    #[test]
    fn test_rejects_bad_names() {
        let names = [
            "",
            "   ",
            "..",
            "../",
            ".hidden.png",
            "notes.txt",
            "archive.png.zip",
            "noext",
        ];
        for bad in names {
            let err = sanitize_file_name(bad).unwrap_err();
            assert!(
                matches!(err, CanvasError::InvalidUpload(_)),
                "{bad:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_save_upload_writes_bytes_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("outputs");

        let path = save_upload(&out, "uploads/../dog.png", b"\x89PNG fake").await.unwrap();

        assert_eq!(path, out.join("dog.png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"\x89PNG fake");
    }

    #[tokio::test]
    async fn test_save_upload_rejects_empty_body() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_upload(dir.path(), "dog.png", b"").await.unwrap_err();
        assert!(matches!(err, CanvasError::InvalidUpload(_)));
    }
}
