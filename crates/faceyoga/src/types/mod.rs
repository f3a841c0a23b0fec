//! Data model of the face yoga backend
//!
//! Rows are mirrored as returned by the table API. Ids and timestamps are
//! always assigned remotely; the `New*` types carry only client-supplied
//! fields and the `*Update` types only the fields being changed.

pub use auth::*;
pub use course::*;
pub use dashboard::*;
pub use exercise::*;
pub use profile::*;
pub use progress::*;

pub mod auth;
pub mod course;
pub mod dashboard;
pub mod exercise;
pub mod profile;
pub mod progress;
