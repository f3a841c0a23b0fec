use chrono::{DateTime, Utc};
use derive_builder::Builder;
use faceyoga_core::cache::Identified;
use serde::{Deserialize, Serialize};

use super::{DashboardStats, User};
use crate::error::{Error, Result};

/// Access level stored on a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular member
    #[default]
    User,
    /// May manage courses and exercises
    Admin,
}

/// Per-user profile with practice counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Remote-assigned identifier
    pub id: String,
    /// Owning auth user; unique across profiles
    pub user_id: String,
    /// Contact email
    pub email: String,
    /// Display name
    #[serde(default)]
    pub username: String,
    /// Full name
    #[serde(default)]
    pub full_name: Option<String>,
    /// Phone number
    #[serde(default)]
    pub phone: Option<String>,
    /// Postal address
    #[serde(default)]
    pub address: Option<String>,
    /// Public avatar image
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Access level
    #[serde(default)]
    pub role: Role,
    /// Consecutive practice days
    #[serde(default)]
    pub streak: u32,
    /// Exercises completed
    #[serde(default)]
    pub exercises_done: u32,
    /// Total practice time in hours
    #[serde(default)]
    pub practice_time: f64,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Whether this profile may manage content.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Dashboard figures for this profile.
    pub fn dashboard_stats(&self, available_exercises: usize) -> DashboardStats {
        DashboardStats::new(self, available_exercises)
    }
}

impl Identified for Profile {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }
}

/// Row inserted for a user who has no profile yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProfile {
    /// Owning auth user
    pub user_id: String,
    /// Contact email
    pub email: String,
    /// Display name
    pub username: String,
    /// Full name, empty until edited
    pub full_name: String,
    /// Access level
    pub role: Role,
    /// Consecutive practice days
    pub streak: u32,
    /// Exercises completed
    pub exercises_done: u32,
    /// Total practice time in hours
    pub practice_time: f64,
}

impl NewProfile {
    /// The default profile for `user`: username from the email's local part,
    /// empty full name, regular role and zeroed counters.
    pub fn default_for(user: &User) -> Result<Self> {
        if user.id.is_empty() {
            return Err(Error::invalid("User ID is required"));
        }
        let email = user
            .email
            .as_deref()
            .filter(|email| !email.is_empty())
            .ok_or_else(|| Error::invalid("User email is required"))?;

        Ok(Self {
            user_id: user.id.clone(),
            email: email.to_string(),
            username: username_from_email(email).to_string(),
            full_name: String::new(),
            role: Role::User,
            streak: 0,
            exercises_done: 0,
            practice_time: 0.0,
        })
    }
}

/// The local part of an email address.
pub fn username_from_email(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

/// Partial update of a profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[builder(default, setter(into, strip_option), build_fn(error = "crate::Error"))]
pub struct ProfileUpdate {
    /// New display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// New full name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// New phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// New address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// New avatar image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// New streak
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak: Option<u32>,
    /// New exercise count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercises_done: Option<u32>,
    /// New practice time in hours
    #[serde(skip_serializing_if = "Option::is_none")]
    pub practice_time: Option<f64>,
}

impl ProfileUpdate {
    /// Create a builder for constructing a ProfileUpdate.
    pub fn builder() -> ProfileUpdateBuilder {
        ProfileUpdateBuilder::default()
    }
}
