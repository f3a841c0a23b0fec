//! Courses, sections and section membership

use http::Method;

use super::{Resource, Stamped, require};
use crate::{
    client::Client,
    error::{Result, ResultExt},
    http::Order,
    types::{
        Course, CourseSection, CourseUpdate, NewCourse, NewSection, SectionExercise,
        SectionExerciseLink, SectionUpdate,
    },
};

const COURSES: &str = "/rest/v1/courses";
const SECTIONS: &str = "/rest/v1/course_sections";
const SECTION_EXERCISES: &str = "/rest/v1/section_exercises";

/// Courses resource.
#[derive(Clone)]
pub struct Courses {
    client: Client,
}

impl Resource for Courses {
    fn client(&self) -> &Client {
        &self.client
    }
}

impl Courses {
    /// Create a new Courses resource.
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// All courses, newest first.
    pub async fn list(&self) -> Result<Vec<Course>> {
        let client = &self.client;
        client
            .retrying(|| async move {
                client
                    .request(Method::GET, COURSES)?
                    .select("*")
                    .order("created_at", Order::Descending)
                    .send()
                    .await?
                    .parse_result()
            })
            .await
            .context("Failed to fetch courses")
    }

    /// Sections of a course in display order.
    pub async fn sections(&self, course_id: &str) -> Result<Vec<CourseSection>> {
        require(course_id, "Course ID is required")?;

        let client = &self.client;
        client
            .retrying(|| async move {
                client
                    .request(Method::GET, SECTIONS)?
                    .select("*")
                    .eq("course_id", course_id)
                    .order("order_index", Order::Ascending)
                    .send()
                    .await?
                    .parse_result()
            })
            .await
            .context("Failed to fetch course sections")
    }

    /// Exercises of a section in display order, each with its exercise row embedded.
    pub async fn section_exercises(&self, section_id: &str) -> Result<Vec<SectionExercise>> {
        require(section_id, "Section ID is required")?;

        let client = &self.client;
        client
            .retrying(|| async move {
                client
                    .request(Method::GET, SECTION_EXERCISES)?
                    .select("*,exercise:exercises(*)")
                    .eq("section_id", section_id)
                    .order("order_index", Order::Ascending)
                    .send()
                    .await?
                    .parse_result()
            })
            .await
            .context("Failed to fetch section exercises")
    }

    /// Create a course and return the stored row.
    pub async fn create(&self, course: &NewCourse) -> Result<Course> {
        require(&course.title, "Course title is required")?;

        async {
            self.client
                .request(Method::POST, COURSES)?
                .returning()
                .single()
                .json(course)?
                .send()
                .await?
                .parse_result()
        }
        .await
        .context("Failed to create course")
    }

    /// Apply `update` to course `id` and return the stored row.
    pub async fn update(&self, id: &str, update: &CourseUpdate) -> Result<Course> {
        require(id, "Course ID is required")?;

        let client = &self.client;
        let body = Stamped::now(update);
        let body = &body;
        client
            .retrying(|| async move {
                client
                    .request(Method::PATCH, COURSES)?
                    .eq("id", id)
                    .returning()
                    .single()
                    .json(body)?
                    .send()
                    .await?
                    .parse_result()
            })
            .await
            .context("Failed to update course")
    }

    /// Delete course `id`.
    pub async fn delete(&self, id: &str) -> Result<()> {
        require(id, "Course ID is required")?;

        let client = &self.client;
        client
            .retrying(|| async move {
                client
                    .request(Method::DELETE, COURSES)?
                    .eq("id", id)
                    .send()
                    .await?
                    .ensure_success()
                    .map(drop)
            })
            .await
            .context("Failed to delete course")
    }

    /// Create a section and return the stored row.
    pub async fn create_section(&self, section: &NewSection) -> Result<CourseSection> {
        require(&section.course_id, "Course ID is required")?;

        async {
            self.client
                .request(Method::POST, SECTIONS)?
                .returning()
                .single()
                .json(section)?
                .send()
                .await?
                .parse_result()
        }
        .await
        .context("Failed to create section")
    }

    /// Apply `update` to section `id` and return the stored row.
    pub async fn update_section(&self, id: &str, update: &SectionUpdate) -> Result<CourseSection> {
        require(id, "Section ID is required")?;

        let client = &self.client;
        let body = Stamped::now(update);
        let body = &body;
        client
            .retrying(|| async move {
                client
                    .request(Method::PATCH, SECTIONS)?
                    .eq("id", id)
                    .returning()
                    .single()
                    .json(body)?
                    .send()
                    .await?
                    .parse_result()
            })
            .await
            .context("Failed to update section")
    }

    /// Delete section `id`.
    pub async fn delete_section(&self, id: &str) -> Result<()> {
        require(id, "Section ID is required")?;

        let client = &self.client;
        client
            .retrying(|| async move {
                client
                    .request(Method::DELETE, SECTIONS)?
                    .eq("id", id)
                    .send()
                    .await?
                    .ensure_success()
                    .map(drop)
            })
            .await
            .context("Failed to delete section")
    }

    /// Link an exercise into a section at `order_index`.
    pub async fn add_exercise_to_section(
        &self,
        section_id: &str,
        exercise_id: &str,
        order_index: i32,
    ) -> Result<()> {
        require(section_id, "Section ID is required")?;
        require(exercise_id, "Exercise ID is required")?;

        let link = SectionExerciseLink {
            section_id,
            exercise_id,
            order_index,
        };

        async {
            self.client
                .request(Method::POST, SECTION_EXERCISES)?
                .json(&link)?
                .send()
                .await?
                .ensure_success()
                .map(drop)
        }
        .await
        .context("Failed to add exercise to section")
    }

    /// Unlink an exercise from a section.
    pub async fn remove_exercise_from_section(
        &self,
        section_id: &str,
        exercise_id: &str,
    ) -> Result<()> {
        require(section_id, "Section ID is required")?;
        require(exercise_id, "Exercise ID is required")?;

        let client = &self.client;
        client
            .retrying(|| async move {
                client
                    .request(Method::DELETE, SECTION_EXERCISES)?
                    .eq("section_id", section_id)
                    .eq("exercise_id", exercise_id)
                    .send()
                    .await?
                    .ensure_success()
                    .map(drop)
            })
            .await
            .context("Failed to remove exercise from section")
    }

    /// Store `exercise_ids` as the section's order: the exercise at position
    /// `i` gets `order_index = i`.
    pub async fn reorder_section_exercises(
        &self,
        section_id: &str,
        exercise_ids: &[String],
    ) -> Result<()> {
        require(section_id, "Section ID is required")?;
        if exercise_ids.is_empty() {
            return Ok(());
        }

        let links: Vec<SectionExerciseLink<'_>> = exercise_ids
            .iter()
            .enumerate()
            .map(|(index, exercise_id)| SectionExerciseLink {
                section_id,
                exercise_id,
                order_index: index as i32,
            })
            .collect();
        let links = &links;

        let client = &self.client;
        client
            .retrying(|| async move {
                client
                    .request(Method::POST, SECTION_EXERCISES)?
                    .upsert(Some("section_id,exercise_id"))
                    .json(links)?
                    .send()
                    .await?
                    .ensure_success()
                    .map(drop)
            })
            .await
            .context("Failed to reorder exercises")
    }
}
