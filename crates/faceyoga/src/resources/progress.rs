//! Progress photos

use bytes::Bytes;
use http::Method;

use super::{Resource, require, storage};
use crate::{
    client::Client,
    error::{Result, ResultExt},
    http::Order,
    types::{NewProgressEntry, ProgressEntry},
};

const USER_PROGRESS: &str = "/rest/v1/user_progress";

/// Progress resource.
#[derive(Clone)]
pub struct Progress {
    client: Client,
}

impl Resource for Progress {
    fn client(&self) -> &Client {
        &self.client
    }
}

impl Progress {
    /// Create a new Progress resource.
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Entries of `user_id`, newest first.
    pub async fn list(&self, user_id: &str) -> Result<Vec<ProgressEntry>> {
        require(user_id, "User ID is required")?;

        let client = &self.client;
        client
            .retrying(|| async move {
                client
                    .request(Method::GET, USER_PROGRESS)?
                    .select("*")
                    .eq("user_id", user_id)
                    .order("created_at", Order::Descending)
                    .send()
                    .await?
                    .parse_result()
            })
            .await
            .context("Failed to fetch progress")
    }

    /// Record an entry and return the stored row.
    pub async fn create(&self, entry: &NewProgressEntry) -> Result<ProgressEntry> {
        require(&entry.user_id, "User ID is required")?;
        require(&entry.image_url, "Image URL is required")?;

        async {
            self.client
                .request(Method::POST, USER_PROGRESS)?
                .returning()
                .single()
                .json(entry)?
                .send()
                .await?
                .parse_result()
        }
        .await
        .context("Failed to create progress entry")
    }

    /// Delete entry `id` owned by `user_id`.
    pub async fn delete(&self, user_id: &str, id: &str) -> Result<()> {
        require(user_id, "User ID is required")?;
        require(id, "Progress ID is required")?;

        let client = &self.client;
        client
            .retrying(|| async move {
                client
                    .request(Method::DELETE, USER_PROGRESS)?
                    .eq("id", id)
                    .eq("user_id", user_id)
                    .send()
                    .await?
                    .ensure_success()
                    .map(drop)
            })
            .await
            .context("Failed to delete progress entry")
    }

    /// Upload a progress photo under a fresh key and return its public URL.
    pub async fn upload_image(&self, user_id: &str, file_name: &str, bytes: Bytes) -> Result<String> {
        require(user_id, "User ID is required")?;
        let ext = storage::image_extension(file_name)?;
        let key = format!("{user_id}/{}.{ext}", chrono::Utc::now().timestamp_millis());

        self.client
            .storage()
            .upload(
                storage::PROGRESS_BUCKET,
                &key,
                bytes,
                storage::content_type(&ext),
                false,
            )
            .await
    }
}
