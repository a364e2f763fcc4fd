//! Local Image Storage
//!
//! Uploaded images live under `{uploads_dir}/{kind}/` and are served
//! read-only at `/uploads/{kind}/{file}`. Database rows keep the public
//! path.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::config::UploadSettings;
use crate::shared::error::AppError;

/// URL prefix uploads are served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Category of an uploaded image; decides directory and file prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Avatar,
    Cover,
    EventImage,
    TaskIcon,
}

impl UploadKind {
    const ALL: [UploadKind; 4] = [Self::Avatar, Self::Cover, Self::EventImage, Self::TaskIcon];

    pub fn dir(&self) -> &'static str {
        match self {
            Self::Avatar => "avatars",
            Self::Cover => "covers",
            Self::EventImage => "events",
            Self::TaskIcon => "event-tasks",
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            Self::Avatar => "avatar",
            Self::Cover => "cover",
            Self::EventImage => "event",
            Self::TaskIcon => "task",
        }
    }

    fn from_dir(dir: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.dir() == dir)
    }
}

/// File extension for an accepted image MIME type.
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    match content_type.to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Some(".jpg"),
        "image/png" => Some(".png"),
        "image/webp" => Some(".webp"),
        _ => None,
    }
}

/// Reject names that could escape the upload directory.
pub fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && !name.contains("..")
        && !name.contains('/')
        && !name.contains('\\')
}

/// An image received in a multipart form, not yet written to disk.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Disk-backed image store.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    max_file_size: usize,
}

impl LocalStorage {
    pub fn new(settings: &UploadSettings) -> Self {
        Self {
            root: PathBuf::from(&settings.dir),
            max_file_size: settings.max_file_size,
        }
    }

    /// Create the directory tree.
    pub async fn init(&self) -> Result<(), AppError> {
        for kind in UploadKind::ALL {
            fs::create_dir_all(self.root.join(kind.dir())).await?;
        }
        info!("Upload directory: {}", self.root.display());
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check type and size, returning the extension to store under.
    pub fn validate(&self, content_type: &str, len: usize) -> Result<&'static str, AppError> {
        let ext = image_extension(content_type).ok_or_else(|| {
            AppError::BadRequest("Only JPEG, PNG and WebP images are allowed".into())
        })?;
        if len == 0 {
            return Err(AppError::BadRequest("Uploaded file is empty".into()));
        }
        if len > self.max_file_size {
            return Err(AppError::BadRequest(format!(
                "File exceeds the {} byte limit",
                self.max_file_size
            )));
        }
        Ok(ext)
    }

    /// Store an image and return its public path.
    pub async fn save(
        &self,
        kind: UploadKind,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String, AppError> {
        let ext = self.validate(content_type, bytes.len())?;
        let file_name = format!(
            "{}-{}-{}{}",
            kind.prefix(),
            Utc::now().timestamp_millis(),
            rand::random::<u32>(),
            ext
        );

        let dir = self.root.join(kind.dir());
        fs::create_dir_all(&dir).await?;
        fs::write(dir.join(&file_name), bytes).await?;
        debug!(kind = kind.dir(), file = %file_name, size = bytes.len(), "Stored upload");

        Ok(public_path(kind, &file_name))
    }

    pub async fn store(&self, kind: UploadKind, file: &UploadedFile) -> Result<String, AppError> {
        self.save(kind, &file.content_type, &file.data).await
    }

    /// Delete the file behind a public path. Missing files are not an error.
    pub async fn remove(&self, public: &str) -> Result<bool, AppError> {
        let (kind, file_name) = parse_public_path(public)
            .ok_or_else(|| AppError::BadRequest("Invalid file path".into()))?;
        self.remove_file(kind, file_name).await
    }

    /// Delete `file_name` from the directory of `kind`.
    pub async fn remove_file(&self, kind: UploadKind, file_name: &str) -> Result<bool, AppError> {
        if !is_safe_file_name(file_name) {
            return Err(AppError::BadRequest("Invalid file name".into()));
        }
        match fs::remove_file(self.root.join(kind.dir()).join(file_name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Best-effort removal used when replacing an image.
    pub async fn discard(&self, public: Option<&str>) {
        if let Some(path) = public {
            if let Err(e) = self.remove(path).await {
                warn!(path, error = %e, "Failed to remove stale upload");
            }
        }
    }
}

/// Public path of a stored file.
pub fn public_path(kind: UploadKind, file_name: &str) -> String {
    format!("{}/{}/{}", PUBLIC_PREFIX, kind.dir(), file_name)
}

/// Split a public path into its kind and file name.
pub fn parse_public_path(public: &str) -> Option<(UploadKind, &str)> {
    let rest = public.strip_prefix(PUBLIC_PREFIX)?.strip_prefix('/')?;
    let (dir, file_name) = rest.split_once('/')?;
    let kind = UploadKind::from_dir(dir)?;
    is_safe_file_name(file_name).then_some((kind, file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn storage(dir: &Path) -> LocalStorage {
        LocalStorage::new(&UploadSettings {
            dir: dir.to_string_lossy().into_owned(),
            max_file_size: 16,
        })
    }

    fn temp_root(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("starsclub-{}-{}", name, uuid::Uuid::new_v4()))
    }

    #[test_case("image/jpeg", Some(".jpg"))]
    #[test_case("image/PNG", Some(".png"))]
    #[test_case("image/webp", Some(".webp"))]
    #[test_case("image/gif", None)]
    #[test_case("application/pdf", None)]
    fn extensions(content_type: &str, expected: Option<&str>) {
        assert_eq!(image_extension(content_type), expected);
    }

    #[test_case("cover-1-2.png", true)]
    #[test_case("../secret", false)]
    #[test_case("a/b.png", false)]
    #[test_case("a\\b.png", false)]
    #[test_case("", false)]
    fn safe_names(name: &str, expected: bool) {
        assert_eq!(is_safe_file_name(name), expected);
    }

    #[test]
    fn parses_public_paths() {
        assert_eq!(
            parse_public_path("/uploads/covers/cover-1.png"),
            Some((UploadKind::Cover, "cover-1.png"))
        );
        assert_eq!(parse_public_path("/uploads/other/x.png"), None);
        assert_eq!(parse_public_path("/uploads/covers/../x.png"), None);
        assert_eq!(parse_public_path("/etc/passwd"), None);
    }

    #[test]
    fn rejects_oversized_and_foreign_types() {
        let s = storage(Path::new("unused"));
        assert!(s.validate("image/png", 17).is_err());
        assert!(s.validate("image/png", 0).is_err());
        assert!(s.validate("text/plain", 4).is_err());
        assert_eq!(s.validate("image/png", 16).unwrap(), ".png");
    }

    #[tokio::test]
    async fn save_then_remove() {
        let root = temp_root("storage");
        let s = storage(&root);
        s.init().await.unwrap();

        let public = s.save(UploadKind::Avatar, "image/png", b"png-bytes").await.unwrap();
        assert!(public.starts_with("/uploads/avatars/avatar-"));
        assert!(public.ends_with(".png"));

        assert!(s.remove(&public).await.unwrap());
        assert!(!s.remove(&public).await.unwrap());

        let _ = std::fs::remove_dir_all(root);
    }
}
