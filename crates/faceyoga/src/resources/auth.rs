//! Sign-in, sign-up and session management
//!
//! Auth failures are logged and returned as the auth service phrased them,
//! without an added context, so that "Invalid login credentials" reaches the
//! user unchanged.

use http::Method;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{Resource, require};
use crate::{
    client::Client,
    error::{Error, Result},
    types::{NewProfile, Session, User},
};

const TOKEN: &str = "/auth/v1/token";
const SIGNUP: &str = "/auth/v1/signup";
const LOGOUT: &str = "/auth/v1/logout";
const USER: &str = "/auth/v1/user";
const AUTHORIZE: &str = "/auth/v1/authorize";

/// Path on the web app that completes OAuth and email-confirmation flows.
pub const CALLBACK_PATH: &str = "/auth/callback";

/// Auth resource.
#[derive(Clone)]
pub struct Auth {
    client: Client,
}

impl Resource for Auth {
    fn client(&self) -> &Client {
        &self.client
    }
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

/// The sign-up endpoint returns a session when email confirmation is off
/// and only the new user otherwise.
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(Session),
    User(User),
}

impl Auth {
    /// Create a new Auth resource.
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Sign in with email and password. The session is installed on the client.
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<User> {
        require(email, "Email is required")?;
        require(password, "Password is required")?;

        let session: Session = async {
            self.client
                .request(Method::POST, TOKEN)?
                .query("grant_type", "password")
                .json(&Credentials { email, password })?
                .send()
                .await?
                .parse_result()
        }
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Error signing in"))?;

        tracing::info!(user_id = %session.user.id, "Signed in");
        let user = session.user.clone();
        self.client.set_session(Some(session));
        Ok(user)
    }

    /// URL that starts an OAuth sign-in with `provider`, e.g. "google".
    ///
    /// Offline access and a fresh consent prompt are requested; the provider
    /// redirects back to the web app's callback path.
    pub fn sign_in_with_oauth(&self, provider: &str) -> Result<Url> {
        require(provider, "Provider is required")?;
        let site_url = self.client.site_url().ok_or_else(|| {
            Error::MissingConfig("site URL is required to build OAuth redirects".to_string())
        })?;

        let mut url = Url::parse(self.client.base_url())?.join(AUTHORIZE)?;
        url.query_pairs_mut()
            .append_pair("provider", provider)
            .append_pair("redirect_to", &redirect_url(site_url))
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");
        Ok(url)
    }

    /// Create an account, then its profile.
    ///
    /// When the profile cannot be created the new session is signed out and
    /// the profile error is returned.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<User> {
        require(email, "Email is required")?;
        require(password, "Password is required")?;

        let mut request = self
            .client
            .request(Method::POST, SIGNUP)?
            .json(&Credentials { email, password })?;
        if let Some(site_url) = self.client.site_url() {
            request = request.query("redirect_to", &redirect_url(site_url));
        }

        let created = async { request.send().await?.parse_result::<SignUpResponse>() }
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error in sign up"))?;

        let user = match created {
            SignUpResponse::Session(session) => {
                let user = session.user.clone();
                self.client.set_session(Some(session));
                user
            }
            SignUpResponse::User(user) => user,
        };

        let profile = NewProfile::default_for(&user)?;
        if let Err(err) = self.client.profiles().create(&profile).await {
            tracing::error!(error = %err, user_id = %user.id, "Error creating profile");
            if let Err(sign_out_err) = self.sign_out().await {
                tracing::warn!(error = %sign_out_err, "Sign-out after failed sign up also failed");
            }
            return Err(err);
        }

        tracing::info!(user_id = %user.id, "Signed up");
        Ok(user)
    }

    /// Sign out locally, then revoke the session remotely.
    ///
    /// The local session is gone even when the remote call fails.
    pub async fn sign_out(&self) -> Result<()> {
        if self.client.session().is_none() {
            return Ok(());
        }

        let request = self.client.request(Method::POST, LOGOUT)?;
        self.client.set_session(None);

        async { request.send().await?.ensure_success().map(drop) }
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error signing out"))?;

        tracing::info!("Signed out");
        Ok(())
    }

    /// The signed-in user as the auth service currently knows it.
    pub async fn user(&self) -> Result<User> {
        if self.client.session().is_none() {
            return Err(Error::Authentication("Not signed in".to_string()));
        }

        let client = &self.client;
        client
            .retrying(|| async move {
                client
                    .request(Method::GET, USER)?
                    .send()
                    .await?
                    .parse_result()
            })
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error fetching user"))
    }

    /// The session installed on the client, if any.
    pub fn session(&self) -> Option<Session> {
        self.client.session()
    }

    /// Exchange the refresh token for a new session and install it.
    pub async fn refresh_session(&self) -> Result<Session> {
        let current = self
            .client
            .session()
            .ok_or_else(|| Error::Authentication("Not signed in".to_string()))?;

        let session: Session = async {
            self.client
                .request(Method::POST, TOKEN)?
                .query("grant_type", "refresh_token")
                .json(&RefreshGrant {
                    refresh_token: &current.refresh_token,
                })?
                .send()
                .await?
                .parse_result()
        }
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Error refreshing session"))?;

        tracing::debug!(user_id = %session.user.id, "Session refreshed");
        self.client.set_session(Some(session.clone()));
        Ok(session)
    }
}

fn redirect_url(site_url: &str) -> String {
    format!("{}{CALLBACK_PATH}", site_url.trim_end_matches('/'))
}
