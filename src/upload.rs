//! Image upload helper.
//!
//! An upload is checked locally before anything touches the object store:
//!
//! 1. **Type**: the extension must map to one of [`ALLOWED_TYPES`], and the
//!    file's magic bytes must agree with it.
//! 2. **Size**: at most [`MAX_UPLOAD_BYTES`]. Exactly 5 MiB is accepted.
//!
//! A file that passes is stored under a fresh key from
//! [`naming::object_key`](crate::naming::object_key) and the caller gets the
//! object's public URL back. Uploading does not save anything: the URL goes
//! into an editor draft, and an upload whose draft is never saved leaves an
//! orphaned object behind.

use crate::naming;
use crate::notify::{Notification, Notifier};
use image::ImageFormat;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

pub const ALLOWED_TYPES: [&str; 4] = ["image/webp", "image/png", "image/jpg", "image/jpeg"];

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Please upload a WebP, PNG, JPG, or JPEG image.")]
    UnsupportedType { file_name: String },
    #[error("Image must be less than 5MB.")]
    TooLarge { size: u64 },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage error: {0}")]
    Storage(String),
}

/// Object-store folder, one per kind of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Folder {
    Hero,
    Banners,
    Projects,
    Blog,
    Testimonials,
    PageHeroes,
    Uploads,
}

impl Folder {
    pub const ALL: [Folder; 7] = [
        Folder::Hero,
        Folder::Banners,
        Folder::Projects,
        Folder::Blog,
        Folder::Testimonials,
        Folder::PageHeroes,
        Folder::Uploads,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Folder::Hero => "hero",
            Folder::Banners => "banners",
            Folder::Projects => "projects",
            Folder::Blog => "blog",
            Folder::Testimonials => "testimonials",
            Folder::PageHeroes => "page-heroes",
            Folder::Uploads => "uploads",
        }
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Folder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Folder::ALL
            .into_iter()
            .find(|folder| folder.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Folder::ALL.iter().map(|f| f.as_str()).collect();
                format!("unknown folder `{s}` (expected one of {})", names.join(", "))
            })
    }
}

/// A file picked for upload.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn read(path: &Path) -> Result<Self, UploadError> {
        let bytes = fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { file_name, bytes })
    }

    /// Lowercased extension after the last dot.
    pub fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// MIME type for an image extension.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "webp" => Some("image/webp"),
        "png" => Some("image/png"),
        "jpg" => Some("image/jpg"),
        "jpeg" => Some("image/jpeg"),
        _ => None,
    }
}

fn format_matches(mime: &str, format: ImageFormat) -> bool {
    matches!(
        (mime, format),
        ("image/webp", ImageFormat::WebP)
            | ("image/png", ImageFormat::Png)
            | ("image/jpg" | "image/jpeg", ImageFormat::Jpeg)
    )
}

/// Check type then size. Returns the MIME type and extension on success.
pub fn validate(file: &ImageFile) -> Result<(&'static str, String), UploadError> {
    let unsupported = || UploadError::UnsupportedType {
        file_name: file.file_name.clone(),
    };
    let ext = file.extension().ok_or_else(unsupported)?;
    let mime = mime_for_extension(&ext)
        .filter(|mime| ALLOWED_TYPES.contains(mime))
        .ok_or_else(unsupported)?;
    match image::guess_format(&file.bytes) {
        Ok(format) if format_matches(mime, format) => {}
        _ => return Err(unsupported()),
    }

    if file.size() > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge { size: file.size() });
    }
    Ok((mime, ext))
}

pub trait ObjectStore {
    /// Store a new object. Fails if `key` already exists.
    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), UploadError>;

    fn public_url(&self, key: &str) -> String;
}

/// Bucket stored as a local directory, `<root>/<bucket>/<key>`, served under
/// `<public_base>/<bucket>/<key>`.
#[derive(Debug, Clone)]
pub struct DirBucket {
    root: PathBuf,
    bucket: String,
    public_base: String,
}

impl DirBucket {
    pub fn new(root: impl Into<PathBuf>, bucket: impl Into<String>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            bucket: bucket.into(),
            public_base: public_base.into(),
        }
    }

    pub fn dir(&self) -> PathBuf {
        self.root.join(&self.bucket)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn object_path(&self, key: &str) -> PathBuf {
        self.dir().join(key)
    }
}

impl ObjectStore for DirBucket {
    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), UploadError> {
        if key.split('/').any(|part| part.is_empty() || part == "..") {
            return Err(UploadError::Storage(format!("invalid object key `{key}`")));
        }
        let path = self.object_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(UploadError::Storage(format!("object `{key}` already exists")));
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(bytes)?;
        tracing::debug!(bucket = %self.bucket, key, content_type, size = bytes.len(), "stored object");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.public_base.trim_end_matches('/'),
            self.bucket,
            key
        )
    }
}

/// Validates, stores, and reports one upload at a time.
pub struct ImageUploader<'a> {
    store: &'a dyn ObjectStore,
    notifier: &'a dyn Notifier,
}

impl<'a> ImageUploader<'a> {
    pub fn new(store: &'a dyn ObjectStore, notifier: &'a dyn Notifier) -> Self {
        Self { store, notifier }
    }

    /// Upload `file` into `folder` and return its public URL.
    ///
    /// Emits exactly one notification. Rejected files never reach the store.
    pub fn upload(&self, file: &ImageFile, folder: Folder) -> Result<String, UploadError> {
        match self.try_upload(file, folder) {
            Ok(url) => {
                self.notifier
                    .notify(Notification::success("Image uploaded successfully!"));
                Ok(url)
            }
            Err(e) => {
                tracing::warn!(file = %file.file_name, error = %e, "upload rejected");
                self.notifier.notify(Notification::error(e.to_string()));
                Err(e)
            }
        }
    }

    fn try_upload(&self, file: &ImageFile, folder: Folder) -> Result<String, UploadError> {
        let (mime, ext) = validate(file)?;
        let key = naming::object_key(
            folder.as_str(),
            chrono::Utc::now().timestamp_millis(),
            &naming::random_suffix(),
            &ext,
        );
        self.store.put(&key, &file.bytes, mime)?;
        Ok(self.store.public_url(&key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{RecordingNotifier, RecordingObjectStore, jpeg_bytes, png_bytes};
    use crate::notify::Level;
    use tempfile::TempDir;

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn gif_is_rejected_before_store() {
        let store = RecordingObjectStore::default();
        let notifier = RecordingNotifier::default();
        let file = ImageFile::new("anim.gif", b"GIF89a....".to_vec());

        let err = ImageUploader::new(&store, &notifier)
            .upload(&file, Folder::Banners)
            .unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedType { .. }));
        assert!(store.keys().is_empty());
        assert_eq!(
            notifier.messages(),
            ["Please upload a WebP, PNG, JPG, or JPEG image."]
        );
    }

    #[test]
    fn six_mib_png_is_rejected_before_store() {
        let store = RecordingObjectStore::default();
        let notifier = RecordingNotifier::default();
        let file = ImageFile::new("big.png", png_bytes(6 * 1024 * 1024));

        let err = ImageUploader::new(&store, &notifier)
            .upload(&file, Folder::Projects)
            .unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { .. }));
        assert!(store.keys().is_empty());
        assert_eq!(notifier.messages(), ["Image must be less than 5MB."]);
    }

    #[test]
    fn exactly_five_mib_is_accepted() {
        let file = ImageFile::new("edge.png", png_bytes(MAX_UPLOAD_BYTES as usize));
        assert!(validate(&file).is_ok());
    }

    #[test]
    fn extension_must_match_contents() {
        let file = ImageFile::new("photo.png", jpeg_bytes(64));
        assert!(matches!(
            validate(&file),
            Err(UploadError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn uppercase_extension_is_accepted() {
        let file = ImageFile::new("PHOTO.JPEG", jpeg_bytes(64));
        assert_eq!(validate(&file).unwrap(), ("image/jpeg", "jpeg".to_string()));
    }

    #[test]
    fn missing_extension_is_rejected() {
        let file = ImageFile::new("photo", png_bytes(64));
        assert!(validate(&file).is_err());
    }

    // =========================================================================
    // Storing
    // =========================================================================

    #[test]
    fn four_mib_png_is_stored_under_folder() {
        let store = RecordingObjectStore::default();
        let notifier = RecordingNotifier::default();
        let file = ImageFile::new("hero.png", png_bytes(4 * 1024 * 1024));

        let url = ImageUploader::new(&store, &notifier)
            .upload(&file, Folder::Blog)
            .unwrap();
        assert!(url.starts_with("https://cdn.test/blog/"), "{url}");
        assert!(url.ends_with(".png"));

        let keys = store.keys();
        assert_eq!(keys.len(), 1);
        let name = keys[0].strip_prefix("blog/").unwrap();
        let (millis, rest) = name.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(rest.len(), naming::SUFFIX_LEN + ".png".len());
        assert_eq!(notifier.levels(), [Level::Success]);
    }

    #[test]
    fn dir_bucket_writes_file_and_builds_url() {
        let tmp = TempDir::new().unwrap();
        let bucket = DirBucket::new(tmp.path(), "cms-images", "/storage/");
        bucket.put("hero/1-abc.png", b"data", "image/png").unwrap();
        assert_eq!(
            fs::read(tmp.path().join("cms-images/hero/1-abc.png")).unwrap(),
            b"data"
        );
        assert_eq!(
            bucket.public_url("hero/1-abc.png"),
            "/storage/cms-images/hero/1-abc.png"
        );
    }

    #[test]
    fn dir_bucket_never_overwrites() {
        let tmp = TempDir::new().unwrap();
        let bucket = DirBucket::new(tmp.path(), "b", "/s");
        bucket.put("x/1.png", b"one", "image/png").unwrap();
        assert!(matches!(
            bucket.put("x/1.png", b"two", "image/png"),
            Err(UploadError::Storage(_))
        ));
        assert_eq!(fs::read(bucket.object_path("x/1.png")).unwrap(), b"one");
    }

    #[test]
    fn dir_bucket_rejects_traversal() {
        let tmp = TempDir::new().unwrap();
        let bucket = DirBucket::new(tmp.path(), "b", "/s");
        assert!(bucket.put("../escape.png", b"x", "image/png").is_err());
    }

    #[test]
    fn folder_names_parse() {
        assert_eq!("page-heroes".parse::<Folder>(), Ok(Folder::PageHeroes));
        assert!("avatars".parse::<Folder>().is_err());
    }
}
