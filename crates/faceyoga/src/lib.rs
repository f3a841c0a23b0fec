//! # faceyoga
//!
//! Client for the face yoga coaching backend:
//! - Courses, their sections and the exercises in each section
//! - The exercise catalogue
//! - Per-user profiles, created on first use
//! - Progress photos and avatars in file storage
//! - Email/password and OAuth sign-in
//! - Automatic retries with exponential backoff for idempotent calls
//! - Cached entity stores with loading and error tracking
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use faceyoga::{Client, NewCourse, Difficulty};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new("https://project.supabase.co", "anon-key")?;
//!     client.auth().sign_in_with_password("maya@example.com", "hunter2").await?;
//!
//!     let course = client.courses()
//!         .create(&NewCourse::builder()
//!             .title("Jawline Basics")
//!             .description("Two weeks of daily jaw work")
//!             .difficulty(Difficulty::Beginner)
//!             .duration("2 weeks")
//!             .build()?)
//!         .await?;
//!
//!     println!("created {}", course.id);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

use std::time::Duration;

// Re-export commonly used types
pub use client::{Client, ClientBuilder};
pub use config::ClientConfig;
pub use context::AppContext;
pub use error::{Error, Result};
pub use types::*;

// Module declarations
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod observability;
pub mod resources;
pub mod stores;
pub mod types;

pub use faceyoga_core::retry::RetryOn;

/// Prelude module for common imports
///
/// # Examples
///
/// ```rust
/// use faceyoga::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        AppContext, Client, ClientConfig, Error, Result,
        stores::{AuthStore, CourseStore, ExerciseStore, ProfileStore, ProgressStore},
        types::{
            Course, CourseSection, DashboardStats, Difficulty, Exercise, NewCourse, NewExercise,
            NewSection, Profile, ProfileUpdate, ProgressEntry, SectionExercise, User,
        },
    };
    pub use faceyoga_core::store::UserFacing;
}

/// SDK version, automatically updated from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Retries after the first attempt of a retried operation.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Delay before the first retry; doubled for each further retry.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

#[cfg(test)]
mod property_tests;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_defaults() {
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(30));
        assert_eq!(DEFAULT_MAX_RETRIES, 3);
        assert_eq!(DEFAULT_RETRY_DELAY, Duration::from_millis(1000));
    }
}
