//! Application context
//!
//! One [`AppContext`] is created at startup and handed to whatever needs
//! data. It owns a single instance of every store, all backed by the same
//! [`Client`] and therefore the same session.
//!
//! ```rust,no_run
//! use faceyoga::AppContext;
//!
//! # async fn example() -> faceyoga::Result<()> {
//! let app = AppContext::from_env()?;
//! app.sign_in("maya@example.com", "hunter2").await?;
//!
//! app.exercises().fetch(None).await;
//! if let Some(stats) = app.dashboard_stats() {
//!     println!("{} day streak", stats.streak_days);
//! }
//! # Ok(())
//! # }
//! ```

use crate::{
    client::Client,
    error::Result,
    stores::{AuthStore, CourseStore, ExerciseStore, ProfileStore, ProgressStore},
    types::{DashboardStats, User},
};

/// Owner of the client and every entity store.
#[derive(Debug, Clone)]
pub struct AppContext {
    client: Client,
    auth: AuthStore,
    profile: ProfileStore,
    courses: CourseStore,
    exercises: ExerciseStore,
    progress: ProgressStore,
}

impl AppContext {
    /// Create a context with empty stores.
    pub fn new(client: Client) -> Self {
        Self {
            auth: AuthStore::new(client.clone()),
            profile: ProfileStore::new(client.clone()),
            courses: CourseStore::new(client.clone()),
            exercises: ExerciseStore::new(client.clone()),
            progress: ProgressStore::new(client.clone()),
            client,
        }
    }

    /// Create a context for a client configured from the environment.
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(Client::from_env()?))
    }

    /// The shared client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// The signed-in user.
    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    /// The signed-in user's profile.
    pub fn profile(&self) -> &ProfileStore {
        &self.profile
    }

    /// Courses and their structure.
    pub fn courses(&self) -> &CourseStore {
        &self.courses
    }

    /// The exercise catalogue.
    pub fn exercises(&self) -> &ExerciseStore {
        &self.exercises
    }

    /// The signed-in user's progress photos.
    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    /// Sign in, then load the user's profile.
    ///
    /// A profile that fails to load is recorded on the profile store and
    /// does not fail the sign-in.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        let user = self.auth.sign_in(email, password).await?;
        self.profile.fetch(&user).await;
        Ok(user)
    }

    /// Forget all cached data, then end the session remotely.
    pub async fn sign_out(&self) -> Result<()> {
        self.clear();
        self.client.auth().sign_out().await
    }

    /// Empty every store.
    pub fn clear(&self) {
        self.auth.clear();
        self.profile.clear();
        self.courses.clear();
        self.exercises.clear();
        self.progress.clear();
        tracing::debug!("Cleared all stores");
    }

    /// Dashboard figures for the cached profile and catalogue.
    pub fn dashboard_stats(&self) -> Option<DashboardStats> {
        self.profile.stats(self.exercises.len())
    }
}
