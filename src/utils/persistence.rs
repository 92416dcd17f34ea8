use std::{fs, path::Path};

use serde::Deserialize;
use serde_json::{Map, Value};
use storefront_domain::FileBlob;
use storefront_engine::RemoteProfile;

use crate::errors::StorefrontError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileFile {
    store_id: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

/// Reads a `{ "storeId": ..., "fields": {...} }` profile fixture.
pub fn load_profile_from_file(path: &Path) -> Result<RemoteProfile, StorefrontError> {
    let data = fs::read_to_string(path)?;
    let file: ProfileFile = serde_json::from_str(&data)?;
    let store_id = file.store_id.trim();
    if store_id.is_empty() {
        return Err(StorefrontError::InvalidProfile(format!(
            "{} has an empty storeId",
            path.display()
        )));
    }
    Ok(RemoteProfile::new(store_id, file.fields))
}

/// Loads a local file as an attachment, guessing its MIME type from the
/// extension.
pub fn load_attachment(path: &Path, duration_secs: Option<u32>) -> Result<FileBlob, StorefrontError> {
    let bytes = fs::read(path)?;
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload")
        .to_string();
    let blob = FileBlob::new(name, guess_mime(path), bytes);
    Ok(match duration_secs {
        Some(seconds) => blob.with_duration(seconds),
        None => blob,
    })
}

fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn profile_file_requires_store_id() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile.json");
        fs::write(&path, r#"{ "storeId": "  ", "fields": {} }"#).unwrap();

        assert!(matches!(
            load_profile_from_file(&path),
            Err(StorefrontError::InvalidProfile(_))
        ));
    }

    #[test]
    fn attachment_mime_follows_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tour.MP4");
        fs::write(&path, [0u8; 8]).unwrap();

        let blob = load_attachment(&path, Some(45)).unwrap();
        assert_eq!(blob.descriptor.mime_type, "video/mp4");
        assert_eq!(blob.descriptor.size, 8);
        assert_eq!(blob.descriptor.duration_secs, Some(45));
    }
}
