//! File storage buckets
//!
//! Uploaded objects are publicly readable; callers store the public URL on
//! the owning row (a profile's avatar, a progress entry's photo).

use std::path::Path;

use bytes::Bytes;
use http::Method;

use super::{Resource, require};
use crate::{
    client::Client,
    error::{Error, Result, ResultExt},
};

/// Bucket holding progress photos, keyed `{user_id}/{millis}.{ext}`.
pub const PROGRESS_BUCKET: &str = "progress";

/// Bucket holding avatars, keyed `{user_id}/avatar.{ext}`.
pub const AVATAR_BUCKET: &str = "avatars";

/// Image formats accepted for photo and avatar uploads.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

const CACHE_CONTROL: &str = "max-age=3600";

/// Storage resource.
#[derive(Clone)]
pub struct Storage {
    client: Client,
}

impl Resource for Storage {
    fn client(&self) -> &Client {
        &self.client
    }
}

impl Storage {
    /// Create a new Storage resource.
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Upload `bytes` to `bucket/key` and return the object's public URL.
    ///
    /// With `overwrite` an existing object is replaced and the upload is
    /// retried like any other idempotent write. Without it an existing
    /// object is a conflict and the upload is attempted once.
    pub async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        content_type: &str,
        overwrite: bool,
    ) -> Result<String> {
        require(bucket, "Bucket is required")?;
        require(key, "File name is required")?;
        if bytes.is_empty() {
            return Err(Error::invalid("File is required"));
        }

        let path = object_path(bucket, key);
        let client = &self.client;
        let attempt = || {
            let path = &path;
            let bytes = bytes.clone();
            async move {
                client
                    .request(Method::POST, path)?
                    .try_header("content-type", content_type)?
                    .try_header("cache-control", CACHE_CONTROL)?
                    .try_header("x-upsert", if overwrite { "true" } else { "false" })?
                    .body(bytes)
                    .send()
                    .await?
                    .ensure_success()
                    .map(drop)
            }
        };

        let uploaded = if overwrite {
            client.retrying(attempt).await
        } else {
            attempt().await
        };
        uploaded.context("Failed to upload file")?;

        tracing::debug!(bucket, key, overwrite, "Uploaded object");
        Ok(self.public_url(bucket, key))
    }

    /// Upload a local file under `{millis}_{file name}` without overwriting.
    pub async fn upload_file(&self, bucket: &str, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::invalid("File is required"))?;
        let bytes = tokio::fs::read(path).await?;

        let key = format!("{}_{name}", chrono::Utc::now().timestamp_millis());
        let content_type = extension(name)
            .map(|ext| content_type(&ext))
            .unwrap_or("application/octet-stream");

        self.upload(bucket, &key, Bytes::from(bytes), content_type, false)
            .await
    }

    /// Public URL of `bucket/key`. No request is made.
    pub fn public_url(&self, bucket: &str, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{bucket}/{key}",
            self.client.base_url().trim_end_matches('/')
        )
    }
}

fn object_path(bucket: &str, key: &str) -> String {
    format!("/storage/v1/object/{bucket}/{}", key.trim_start_matches('/'))
}

fn extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
}

/// Lower-cased extension of `file_name` if it names an accepted image format.
pub fn image_extension(file_name: &str) -> Result<String> {
    extension(file_name)
        .filter(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .ok_or_else(|| {
            Error::invalid("Invalid file type. Please upload a JPG, PNG, or WebP image.")
        })
}

/// MIME type for a lower-cased file extension.
pub fn content_type(extension: &str) -> &'static str {
    match extension {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}
