use chrono::{DateTime, Utc};
use derive_builder::Builder;
use faceyoga_core::cache::Identified;
use serde::{Deserialize, Serialize};

/// A progress photo with notes. Entries are only ever added or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    /// Remote-assigned identifier
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Public URL of the uploaded photo
    pub image_url: String,
    /// Free-form notes
    #[serde(default)]
    pub notes: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Identified for ProgressEntry {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }
}

/// Fields for recording a progress entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into), build_fn(error = "crate::Error"))]
pub struct NewProgressEntry {
    /// Owning user
    pub user_id: String,
    /// Public URL of the uploaded photo
    pub image_url: String,
    /// Free-form notes
    #[builder(default)]
    pub notes: String,
}

impl NewProgressEntry {
    /// Create a builder for constructing a NewProgressEntry.
    pub fn builder() -> NewProgressEntryBuilder {
        NewProgressEntryBuilder::default()
    }
}
