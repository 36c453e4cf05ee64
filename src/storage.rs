//! File-backed object storage for ticket attachments and profile avatars.
//! An object is addressed by an opaque reference of the form
//! `{bucket}/{owner}/{name}`; the rest of the system only ever holds the
//! reference string.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::{Result, TrackerError};

/// Avatar uploads are capped at 2 MiB.
pub const MAX_AVATAR_BYTES: u64 = 2 * 1024 * 1024;

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    pub fn open(data_dir: &Path) -> Result<Self> {
        let root = data_dir.join("storage");
        fs::create_dir_all(&root)?;
        Ok(BlobStore { root })
    }

    /// Copy a local file into the store and return its reference. The object
    /// name is the upload timestamp plus the source extension.
    pub fn put(&self, bucket: &str, owner: i64, source: &Path) -> Result<String> {
        let bytes = fs::metadata(source)
            .map_err(|_| TrackerError::NotFound(format!("File {} not found", source.display())))?
            .len();
        if bytes == 0 {
            return Err(TrackerError::Validation(format!(
                "File {} is empty",
                source.display()
            )));
        }

        let ext = extension_of(source);
        let name = format!("{}.{}", Utc::now().timestamp_micros(), ext);
        let reference = format!("{}/{}/{}", bucket, owner, name);

        let target = self.root.join(bucket).join(owner.to_string());
        fs::create_dir_all(&target)?;
        fs::copy(source, target.join(&name))?;

        Ok(reference)
    }

    /// Store a profile image: must carry an image extension and fit the size
    /// cap.
    pub fn put_avatar(&self, owner: i64, source: &Path) -> Result<String> {
        let ext = extension_of(source).to_lowercase();
        if !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            return Err(TrackerError::Validation(
                "Avatar must be an image file".to_string(),
            ));
        }

        let bytes = fs::metadata(source)
            .map_err(|_| TrackerError::NotFound(format!("File {} not found", source.display())))?
            .len();
        if bytes > MAX_AVATAR_BYTES {
            return Err(TrackerError::Validation(
                "Avatar must be less than 2MB".to_string(),
            ));
        }

        self.put("avatars", owner, source)
    }

    /// Remove an object by reference. Missing objects are not an error; the
    /// reference may have already been cleaned up.
    pub fn delete(&self, reference: &str) -> Result<bool> {
        let path = self.path_of(reference)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Absolute path of a stored object. References never traverse outside
    /// the store root.
    pub fn path_of(&self, reference: &str) -> Result<PathBuf> {
        if reference.is_empty()
            || reference.split('/').any(|part| part.is_empty() || part == "..")
        {
            return Err(TrackerError::Validation(format!(
                "Malformed storage reference '{}'",
                reference
            )));
        }
        Ok(self.root.join(reference))
    }

    pub fn exists(&self, reference: &str) -> Result<bool> {
        Ok(self.path_of(reference)?.exists())
    }
}

fn extension_of(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("bin")
}
