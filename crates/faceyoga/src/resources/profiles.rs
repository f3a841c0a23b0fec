//! User profiles
//!
//! Every authenticated user has exactly one profile. It is created lazily
//! the first time it is read.

use bytes::Bytes;
use http::Method;
use serde::Serialize;

use super::{Resource, Stamped, require, storage};
use crate::{
    client::Client,
    error::{Result, ResultExt},
    types::{NewProfile, Profile, ProfileUpdate, User},
};

const PROFILES: &str = "/rest/v1/profiles";

/// Profiles resource.
#[derive(Clone)]
pub struct Profiles {
    client: Client,
}

impl Resource for Profiles {
    fn client(&self) -> &Client {
        &self.client
    }
}

#[derive(Serialize)]
struct ProfileUpsert<'a> {
    user_id: &'a str,
    #[serde(flatten)]
    fields: Stamped<'a, ProfileUpdate>,
}

impl Profiles {
    /// Create a new Profiles resource.
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// The profile of `user`, created with defaults if none exists yet.
    ///
    /// When two first loads race, the loser's insert fails with a uniqueness
    /// conflict; the row written by the winner is then read back instead.
    pub async fn get(&self, user: &User) -> Result<Profile> {
        require(&user.id, "User ID is required")?;

        async {
            match self.lookup(&user.id).await {
                Err(err) if err.is_no_rows() => {}
                found => return found,
            }

            tracing::info!(user_id = %user.id, "No profile found, creating default profile");
            let profile = NewProfile::default_for(user)?;
            match self.create(&profile).await {
                Err(err) if err.is_conflict() => {
                    tracing::debug!(user_id = %user.id, "Profile created concurrently, reading it back");
                    self.lookup(&user.id).await
                }
                created => created,
            }
        }
        .await
        .context("Failed to fetch profile")
    }

    async fn lookup(&self, user_id: &str) -> Result<Profile> {
        let client = &self.client;
        client
            .retrying(|| async move {
                client
                    .request(Method::GET, PROFILES)?
                    .select("*")
                    .eq("user_id", user_id)
                    .single()
                    .send()
                    .await?
                    .parse_result()
            })
            .await
    }

    /// Insert a profile row.
    pub async fn create(&self, profile: &NewProfile) -> Result<Profile> {
        require(&profile.user_id, "User ID is required")?;

        self.client
            .request(Method::POST, PROFILES)?
            .returning()
            .single()
            .json(profile)?
            .send()
            .await?
            .parse_result()
    }

    /// Write `update` to the profile of `user_id` and return the stored row.
    pub async fn update(&self, user_id: &str, update: &ProfileUpdate) -> Result<Profile> {
        require(user_id, "User ID is required")?;

        let body = ProfileUpsert {
            user_id,
            fields: Stamped::now(update),
        };
        let body = &body;

        let client = &self.client;
        client
            .retrying(|| async move {
                client
                    .request(Method::POST, PROFILES)?
                    .upsert(Some("user_id"))
                    .single()
                    .json(body)?
                    .send()
                    .await?
                    .parse_result()
            })
            .await
            .context("Failed to update profile")
    }

    /// Upload an avatar image, replacing any previous one, and return its
    /// public URL. The profile row itself is not changed.
    pub async fn upload_avatar(&self, user_id: &str, file_name: &str, bytes: Bytes) -> Result<String> {
        require(user_id, "User ID is required")?;
        let ext = storage::image_extension(file_name)?;

        self.client
            .storage()
            .upload(
                storage::AVATAR_BUCKET,
                &format!("{user_id}/avatar.{ext}"),
                bytes,
                storage::content_type(&ext),
                true,
            )
            .await
    }
}
