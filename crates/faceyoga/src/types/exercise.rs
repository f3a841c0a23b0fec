use chrono::{DateTime, Utc};
use derive_builder::Builder;
use faceyoga_core::cache::Identified;
use serde::{Deserialize, Serialize};

/// A single face yoga exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    /// Remote-assigned identifier
    pub id: String,
    /// Exercise title
    pub title: String,
    /// Step-by-step instructions
    pub description: String,
    /// Facial area the exercise targets, e.g. "forehead"
    pub category: String,
    /// Human-readable duration, e.g. "2 min"
    pub duration: String,
    /// Illustration
    #[serde(default)]
    pub image_url: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Identified for Exercise {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }
}

/// Fields for creating an exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into), build_fn(error = "crate::Error"))]
pub struct NewExercise {
    /// Exercise title
    pub title: String,
    /// Instructions
    pub description: String,
    /// Targeted facial area
    pub category: String,
    /// Human-readable duration
    pub duration: String,
    /// Illustration
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option, into))]
    pub image_url: Option<String>,
}

impl NewExercise {
    /// Create a builder for constructing a NewExercise.
    pub fn builder() -> NewExerciseBuilder {
        NewExerciseBuilder::default()
    }
}

/// Partial update of an exercise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[builder(default, setter(into, strip_option), build_fn(error = "crate::Error"))]
pub struct ExerciseUpdate {
    /// New title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New instructions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// New duration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// New illustration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ExerciseUpdate {
    /// Create a builder for constructing an ExerciseUpdate.
    pub fn builder() -> ExerciseUpdateBuilder {
        ExerciseUpdateBuilder::default()
    }
}
