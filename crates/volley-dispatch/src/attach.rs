//! Resolves opaque upload references to raw bytes for multipart delivery.

use std::path::PathBuf;

use tracing::warn;

use crate::transport::FilePart;

/// URL prefix under which the gateway serves (and the resolver finds)
/// uploaded files.
const UPLOADS_PREFIX: &str = "/uploads/";

pub struct AttachmentResolver {
    uploads_dir: PathBuf,
}

impl AttachmentResolver {
    pub fn new(uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
        }
    }

    /// Resolve every recognised reference to its bytes.
    ///
    /// References outside `/uploads/`, traversal attempts, and unreadable
    /// files are skipped with a warning; the caller decides whether an
    /// empty result counts as a delivery failure.
    pub async fn resolve(&self, refs: &[String]) -> Vec<FilePart> {
        let mut files = Vec::new();
        for r in refs {
            let Some(rel) = r.strip_prefix(UPLOADS_PREFIX) else {
                warn!(reference = %r, "unrecognised attachment reference — skipped");
                continue;
            };
            if rel.is_empty() || rel.contains("..") {
                warn!(reference = %r, "rejected attachment reference");
                continue;
            }
            let path = self.uploads_dir.join(rel);
            match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    let filename = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| rel.to_string());
                    files.push(FilePart { filename, bytes });
                }
                Err(e) => {
                    warn!(reference = %r, error = %e, "attachment unreadable — skipped");
                }
            }
        }
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_files_under_uploads_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("images-1-abc.png"), b"pngdata").unwrap();

        let resolver = AttachmentResolver::new(dir.path());
        let files = resolver
            .resolve(&["/uploads/images-1-abc.png".to_string()])
            .await;

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].filename, "images-1-abc.png");
        assert_eq!(files[0].bytes, b"pngdata");
    }

    #[tokio::test]
    async fn skips_unknown_prefixes_and_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = AttachmentResolver::new(dir.path());
        let files = resolver
            .resolve(&[
                "https://elsewhere.example/x.png".to_string(),
                "/uploads/missing.png".to_string(),
            ])
            .await;
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = AttachmentResolver::new(dir.path());
        let files = resolver
            .resolve(&["/uploads/../secrets.txt".to_string()])
            .await;
        assert!(files.is_empty());
    }
}
