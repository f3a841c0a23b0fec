//! Entity stores
//!
//! Each store caches one slice of remote state on top of
//! [`faceyoga_core::store::Store`]: reads replace the cache, writes patch it
//! with the row the backend returned. Failures are recorded as a
//! user-facing message; fetches absorb them and mutations also return them.

mod auth;
mod courses;
mod exercises;
mod profile;
mod progress;

pub use auth::AuthStore;
pub use courses::{CourseState, CourseStore};
pub use exercises::ExerciseStore;
pub use profile::ProfileStore;
pub use progress::ProgressStore;
