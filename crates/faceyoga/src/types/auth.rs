use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An authenticated identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Auth user id; profiles reference it as `user_id`
    pub id: String,
    /// Email address, absent for some OAuth identities
    #[serde(default)]
    pub email: Option<String>,
    /// Sign-up time
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Provider-supplied metadata (name, avatar, ...)
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

/// Tokens issued on sign-in.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token for table, storage and auth calls
    pub access_token: String,
    /// Token exchanged for a new session when this one expires
    pub refresh_token: String,
    /// Usually "bearer"
    #[serde(default)]
    pub token_type: String,
    /// Lifetime of the access token in seconds
    #[serde(default)]
    pub expires_in: i64,
    /// Expiry as a unix timestamp
    #[serde(default)]
    pub expires_at: Option<i64>,
    /// The signed-in user
    pub user: User,
}

impl Session {
    /// Whether the access token has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|expires_at| now.timestamp() >= expires_at)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session(expires_at: Option<i64>) -> Session {
        Session {
            access_token: "secret-access".to_string(),
            refresh_token: "secret-refresh".to_string(),
            token_type: "bearer".to_string(),
            expires_in: 3600,
            expires_at,
            user: User {
                id: "u-1".to_string(),
                email: Some("maya@example.com".to_string()),
                created_at: None,
                user_metadata: serde_json::Value::Null,
            },
        }
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let rendered = format!("{:?}", session(None));
        assert!(!rendered.contains("secret-access"));
        assert!(!rendered.contains("secret-refresh"));
        assert!(rendered.contains("maya@example.com"));
    }

    #[test]
    fn test_is_expired() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert!(session(Some(1_699_999_999)).is_expired(now));
        assert!(!session(Some(1_700_003_600)).is_expired(now));
        assert!(!session(None).is_expired(now));
    }
}
