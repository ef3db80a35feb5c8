use anyhow::{Context, Result, bail};
use reqwest::Url;
use tracing::warn;
use uuid::Uuid;

use crate::models::{MemberProfile, PLACEHOLDER_IMAGE};
use crate::profile_store::{ProfileStore, ProfileUpdate};

pub const PROFILE_IMAGE_BUCKET: &str = "profile-images";
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Blob storage for profile images.
pub trait ObjectStore: Send + Sync {
    /// Stores the object and returns its public URL.
    fn upload(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<String>;

    fn public_url(&self, path: &str) -> String;

    fn remove(&self, paths: &[String]) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub fn validate_image(upload: &ImageUpload) -> Result<()> {
    if !ALLOWED_IMAGE_TYPES.contains(&upload.content_type.as_str()) {
        bail!("Please upload a JPG, PNG, or WebP image");
    }
    if upload.bytes.len() > MAX_IMAGE_BYTES {
        bail!("Image must be less than 5MB");
    }
    Ok(())
}

/// `{profile_id}/{unix_millis}.{extension}`; the extension is whatever follows the last dot.
pub fn image_object_path(profile_id: Uuid, file_name: &str, unix_millis: i64) -> String {
    let extension = file_name.rsplit('.').next().unwrap_or(file_name);
    format!("{profile_id}/{unix_millis}.{extension}")
}

pub fn is_placeholder(url: &str) -> bool {
    url.contains("profilepic.svg")
}

/// Object path of a stored image: the last two URL path segments.
pub fn stored_object_path(url: &str) -> Option<String> {
    if url.is_empty() || is_placeholder(url) {
        return None;
    }
    let parsed = Url::parse(url).ok()?;
    let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 {
        return None;
    }
    Some(segments[segments.len() - 2..].join("/"))
}

/// Image to show for a profile, falling back to the placeholder.
pub fn display_image(profile: &MemberProfile) -> &str {
    profile
        .profile_image_url
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or(PLACEHOLDER_IMAGE)
}

fn remove_previous(objects: &dyn ObjectStore, profile: &MemberProfile) {
    let Some(url) = profile.profile_image_url.as_deref() else {
        return;
    };
    match stored_object_path(url) {
        Some(path) => {
            if let Err(err) = objects.remove(&[path]) {
                warn!(profile = %profile.id, error = %format!("{err:#}"), "failed to delete previous image");
            }
        }
        None if !url.is_empty() && !is_placeholder(url) => {
            warn!(profile = %profile.id, url, "could not derive object path from image url");
        }
        None => {}
    }
}

/// Replaces the profile's image and returns the updated profile.
pub fn replace_profile_image(
    objects: &dyn ObjectStore,
    store: &dyn ProfileStore,
    profile: &MemberProfile,
    upload: &ImageUpload,
    unix_millis: i64,
) -> Result<MemberProfile> {
    validate_image(upload)?;
    let path = image_object_path(profile.id, &upload.file_name, unix_millis);
    remove_previous(objects, profile);

    let url = objects
        .upload(&path, &upload.bytes, &upload.content_type)
        .with_context(|| format!("upload {path}"))?;
    store
        .update_profile(profile.id, &ProfileUpdate::image(Some(url.clone())))
        .context("save profile image url")?;

    let mut updated = profile.clone();
    updated.profile_image_url = Some(url);
    Ok(updated)
}

/// Deletes the stored image, if any, and clears the profile field.
pub fn remove_profile_image(
    objects: &dyn ObjectStore,
    store: &dyn ProfileStore,
    profile: &MemberProfile,
) -> Result<MemberProfile> {
    let has_image = profile
        .profile_image_url
        .as_deref()
        .is_some_and(|u| !u.is_empty() && !is_placeholder(u));
    if !has_image {
        return Ok(profile.clone());
    }
    remove_previous(objects, profile);
    store
        .update_profile(profile.id, &ProfileUpdate::image(None))
        .context("clear profile image url")?;
    let mut updated = profile.clone();
    updated.profile_image_url = None;
    Ok(updated)
}
