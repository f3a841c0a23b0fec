use bytes::Bytes;
use faceyoga_core::store::{Snapshot, Store};

use crate::{
    client::Client,
    error::Result,
    types::{DashboardStats, Profile, ProfileUpdate, User},
};

/// Store for the signed-in user's profile.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    client: Client,
    store: Store<Option<Profile>>,
}

impl ProfileStore {
    /// Create an empty store backed by `client`.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            store: Store::default(),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Store<Option<Profile>> {
        &self.store
    }

    /// Copy of the cached profile with the loading and error flags.
    pub fn snapshot(&self) -> Snapshot<Option<Profile>> {
        self.store.snapshot()
    }

    /// The cached profile.
    pub fn profile(&self) -> Option<Profile> {
        self.store.read(Option::clone)
    }

    /// Dashboard figures for the cached profile.
    pub fn stats(&self, available_exercises: usize) -> Option<DashboardStats> {
        self.store
            .read(|profile| Some(profile.as_ref()?.dashboard_stats(available_exercises)))
    }

    /// Load `user`'s profile, creating it on first use.
    pub async fn fetch(&self, user: &User) -> bool {
        self.store
            .fetch(self.client.profiles().get(user), |cached, profile| {
                *cached = Some(profile)
            })
            .await
    }

    /// Save `update` and cache the stored profile.
    pub async fn update(&self, user_id: &str, update: &ProfileUpdate) -> Result<Profile> {
        self.store
            .mutate(
                self.client.profiles().update(user_id, update),
                |cached, profile| {
                    *cached = Some(profile.clone());
                    profile
                },
            )
            .await
    }

    /// Upload a new avatar and point the profile at it.
    pub async fn upload_avatar(
        &self,
        user_id: &str,
        file_name: &str,
        image: Bytes,
    ) -> Result<Profile> {
        let profiles = self.client.profiles();
        let operation = async {
            let avatar_url = profiles.upload_avatar(user_id, file_name, image).await?;
            let update = ProfileUpdate {
                avatar_url: Some(avatar_url),
                ..ProfileUpdate::default()
            };
            profiles.update(user_id, &update).await
        };

        self.store
            .mutate(operation, |cached, profile| {
                *cached = Some(profile.clone());
                profile
            })
            .await
    }

    /// Forget the cached profile.
    pub fn clear(&self) {
        self.store.reset();
    }
}
