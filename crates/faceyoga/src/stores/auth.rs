use faceyoga_core::store::{Snapshot, Store};

use crate::{client::Client, error::Result, types::User};

/// Store for the signed-in user.
#[derive(Debug, Clone)]
pub struct AuthStore {
    client: Client,
    store: Store<Option<User>>,
}

impl AuthStore {
    /// Create a store backed by `client`, seeded with the client's current user.
    pub fn new(client: Client) -> Self {
        let store = Store::new(client.current_user());
        Self { client, store }
    }

    /// The underlying store.
    pub fn store(&self) -> &Store<Option<User>> {
        &self.store
    }

    /// Copy of the cached user with the loading and error flags.
    pub fn snapshot(&self) -> Snapshot<Option<User>> {
        self.store.snapshot()
    }

    /// The cached user.
    pub fn user(&self) -> Option<User> {
        self.store.read(Option::clone)
    }

    /// Whether a user is signed in.
    pub fn is_signed_in(&self) -> bool {
        self.store.read(Option::is_some)
    }

    /// Sign in with email and password.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        self.store
            .mutate(
                self.client.auth().sign_in_with_password(email, password),
                |cached, user| {
                    *cached = Some(user.clone());
                    user
                },
            )
            .await
    }

    /// Create an account and its profile.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<User> {
        self.store
            .mutate(self.client.auth().sign_up(email, password), |cached, user| {
                // unconfirmed accounts have no session yet
                if self.client.session().is_some() {
                    *cached = Some(user.clone());
                }
                user
            })
            .await
    }

    /// Refresh the cached user from the auth service.
    pub async fn load_user(&self) -> bool {
        self.store
            .fetch(self.client.auth().user(), |cached, user| *cached = Some(user))
            .await
    }

    /// Replace the cached user without a remote call.
    pub fn set_user(&self, user: Option<User>) {
        self.store.update(|cached| *cached = user);
    }

    /// Forget the cached user.
    pub fn clear(&self) {
        self.store.reset();
    }
}
