use bytes::Bytes;
use faceyoga_core::cache::Collection;
use faceyoga_core::store::{Snapshot, Store};

use crate::{
    client::Client,
    error::Result,
    types::{NewProgressEntry, ProgressEntry},
};

/// Store for the signed-in user's progress photos.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    client: Client,
    store: Store<Collection<ProgressEntry>>,
}

impl ProgressStore {
    /// Create an empty store backed by `client`.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            store: Store::default(),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Store<Collection<ProgressEntry>> {
        &self.store
    }

    /// Copy of the cached entries with the loading and error flags.
    pub fn snapshot(&self) -> Snapshot<Collection<ProgressEntry>> {
        self.store.snapshot()
    }

    /// Cached entries, newest first.
    pub fn entries(&self) -> Vec<ProgressEntry> {
        self.store.read(|entries| entries.as_slice().to_vec())
    }

    /// Replace the cache with `user_id`'s entries.
    pub async fn fetch(&self, user_id: &str) -> bool {
        self.store
            .fetch(self.client.progress().list(user_id), Collection::replace_all)
            .await
    }

    /// Upload a photo, record it with `notes` and put the new entry first.
    ///
    /// Nothing is cached when either step fails. A photo uploaded before a
    /// failed insert stays in the bucket.
    pub async fn add(
        &self,
        user_id: &str,
        file_name: &str,
        image: Bytes,
        notes: &str,
    ) -> Result<ProgressEntry> {
        let progress = self.client.progress();
        let operation = async {
            let image_url = progress.upload_image(user_id, file_name, image).await?;
            let entry = NewProgressEntry::builder()
                .user_id(user_id)
                .image_url(image_url)
                .notes(notes)
                .build()?;
            progress.create(&entry).await
        };

        self.store
            .mutate(operation, |entries, created| {
                entries.prepend(created.clone());
                created
            })
            .await
    }

    /// Delete an entry of `user_id`.
    pub async fn remove(&self, user_id: &str, id: &str) -> Result<()> {
        self.store
            .mutate(self.client.progress().delete(user_id, id), |entries, ()| {
                entries.remove_by_id(&id.to_string());
            })
            .await
    }

    /// Forget everything cached.
    pub fn clear(&self) {
        self.store.reset();
    }
}
