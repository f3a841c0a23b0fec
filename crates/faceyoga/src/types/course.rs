use chrono::{DateTime, Utc};
use derive_builder::Builder;
use faceyoga_core::cache::Identified;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Exercise;

/// Difficulty level of a course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// For first-time practitioners
    #[default]
    Beginner,
    /// Assumes the beginner routines are familiar
    Intermediate,
    /// Long holds and combined movements
    Advanced,
}

impl Difficulty {
    /// Every level, easiest first.
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    /// The stored representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| crate::Error::InvalidRequest(format!("Unknown difficulty '{s}'")))
    }
}

/// A guided course made of ordered sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Remote-assigned identifier
    pub id: String,
    /// Course title
    pub title: String,
    /// Short description shown on the course card
    pub description: String,
    /// Difficulty level
    pub difficulty: Difficulty,
    /// Human-readable duration, e.g. "4 weeks"
    pub duration: String,
    /// Cover image
    #[serde(default)]
    pub image_url: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Identified for Course {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }
}

/// Fields for creating a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into), build_fn(error = "crate::Error"))]
pub struct NewCourse {
    /// Course title
    pub title: String,
    /// Short description
    pub description: String,
    /// Difficulty level
    #[builder(default)]
    pub difficulty: Difficulty,
    /// Human-readable duration
    pub duration: String,
    /// Cover image
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option, into))]
    pub image_url: Option<String>,
}

impl NewCourse {
    /// Create a builder for constructing a NewCourse.
    pub fn builder() -> NewCourseBuilder {
        NewCourseBuilder::default()
    }
}

/// Partial update of a course. Unset fields are left untouched remotely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[builder(default, setter(into, strip_option), build_fn(error = "crate::Error"))]
pub struct CourseUpdate {
    /// New title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New difficulty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    /// New duration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// New cover image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CourseUpdate {
    /// Create a builder for constructing a CourseUpdate.
    pub fn builder() -> CourseUpdateBuilder {
        CourseUpdateBuilder::default()
    }
}

/// An ordered part of a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseSection {
    /// Remote-assigned identifier
    pub id: String,
    /// Owning course
    pub course_id: String,
    /// Section title
    pub title: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Position among the course's sections
    pub order_index: i32,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Identified for CourseSection {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }
}

/// Fields for creating a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into), build_fn(error = "crate::Error"))]
pub struct NewSection {
    /// Owning course
    pub course_id: String,
    /// Section title
    pub title: String,
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option, into))]
    pub description: Option<String>,
    /// Position among the course's sections
    #[builder(default)]
    pub order_index: i32,
}

impl NewSection {
    /// Create a builder for constructing a NewSection.
    pub fn builder() -> NewSectionBuilder {
        NewSectionBuilder::default()
    }
}

/// Partial update of a section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[builder(default, setter(into, strip_option), build_fn(error = "crate::Error"))]
pub struct SectionUpdate {
    /// New title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New position
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i32>,
}

impl SectionUpdate {
    /// Create a builder for constructing a SectionUpdate.
    pub fn builder() -> SectionUpdateBuilder {
        SectionUpdateBuilder::default()
    }
}

/// Membership of an exercise in a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionExercise {
    /// Remote-assigned identifier
    pub id: String,
    /// Section the exercise belongs to
    pub section_id: String,
    /// The exercise
    pub exercise_id: String,
    /// Position within the section
    pub order_index: i32,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// The embedded exercise row, when selected
    #[serde(default)]
    pub exercise: Option<Exercise>,
}

impl Identified for SectionExercise {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }
}

/// Row written when linking an exercise to a section.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SectionExerciseLink<'a> {
    pub section_id: &'a str,
    pub exercise_id: &'a str,
    pub order_index: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_course_deserializes_backend_row() {
        let course: Course = serde_json::from_value(json!({
            "id": "c-1",
            "title": "Jawline Basics",
            "description": "Release tension around the jaw",
            "difficulty": "Intermediate",
            "duration": "3 weeks",
            "image_url": null,
            "created_at": "2024-03-01T09:00:00+00:00",
            "updated_at": "2024-03-02T09:00:00+00:00"
        }))
        .unwrap();

        assert_eq!(course.difficulty, Difficulty::Intermediate);
        assert_eq!(course.image_url, None);
        assert_eq!(course.id(), "c-1");
    }

    #[test]
    fn test_difficulty_from_str() {
        assert_eq!("advanced".parse::<Difficulty>().unwrap(), Difficulty::Advanced);
        assert_eq!(" Beginner ".parse::<Difficulty>().unwrap(), Difficulty::Beginner);
        assert!("expert".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_new_course_builder() {
        let course = NewCourse::builder()
            .title("Cheek Lift")
            .description("Daily cheek routine")
            .difficulty(Difficulty::Beginner)
            .duration("10 min")
            .build()
            .unwrap();

        let value = serde_json::to_value(&course).unwrap();
        assert_eq!(
            value,
            json!({
                "title": "Cheek Lift",
                "description": "Daily cheek routine",
                "difficulty": "Beginner",
                "duration": "10 min"
            })
        );
    }

    #[test]
    fn test_new_course_builder_requires_title() {
        let err = NewCourse::builder()
            .description("no title")
            .duration("5 min")
            .build()
            .unwrap_err();
        assert!(matches!(err, crate::Error::InvalidRequest(msg) if msg.contains("title")));
    }

    #[test]
    fn test_course_update_skips_unset_fields() {
        let update = CourseUpdate::builder().title("Renamed").build().unwrap();
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({ "title": "Renamed" }));
    }

    #[test]
    fn test_section_exercise_with_embedded_exercise() {
        let row: SectionExercise = serde_json::from_value(json!({
            "id": "se-1",
            "section_id": "s-1",
            "exercise_id": "e-1",
            "order_index": 0,
            "created_at": "2024-03-01T09:00:00Z",
            "exercise": {
                "id": "e-1",
                "title": "Forehead Smoother",
                "description": "Smooth the forehead with both palms",
                "category": "forehead",
                "duration": "2 min",
                "image_url": "https://cdn.example.com/e-1.jpg",
                "created_at": "2024-02-01T09:00:00Z",
                "updated_at": "2024-02-01T09:00:00Z"
            }
        }))
        .unwrap();

        assert_eq!(row.exercise.unwrap().title, "Forehead Smoother");
    }
}
