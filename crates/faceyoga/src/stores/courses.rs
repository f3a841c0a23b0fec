use faceyoga_core::cache::{Collection, KeyedCollection};
use faceyoga_core::store::{Snapshot, Store};

use crate::{
    client::Client,
    error::Result,
    types::{
        Course, CourseSection, CourseUpdate, NewCourse, NewSection, SectionExercise, SectionUpdate,
    },
};

/// Cached courses with their sections and section exercises.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseState {
    /// All courses, newest first
    pub courses: Collection<Course>,
    /// Sections keyed by course id
    pub sections: KeyedCollection<String, CourseSection>,
    /// Section exercises keyed by section id
    pub exercises: KeyedCollection<String, SectionExercise>,
}

/// Store for courses and their structure.
#[derive(Debug, Clone)]
pub struct CourseStore {
    client: Client,
    store: Store<CourseState>,
}

impl CourseStore {
    /// Create an empty store backed by `client`.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            store: Store::default(),
        }
    }

    /// The underlying store, for subscriptions and direct reads.
    pub fn store(&self) -> &Store<CourseState> {
        &self.store
    }

    /// Copy of the cached state with the loading and error flags.
    pub fn snapshot(&self) -> Snapshot<CourseState> {
        self.store.snapshot()
    }

    /// Cached courses.
    pub fn courses(&self) -> Vec<Course> {
        self.store.read(|state| state.courses.as_slice().to_vec())
    }

    /// Cached sections of `course_id`.
    pub fn sections(&self, course_id: &str) -> Vec<CourseSection> {
        self.store
            .read(|state| state.sections.items(course_id).to_vec())
    }

    /// Cached exercises of `section_id`.
    pub fn section_exercises(&self, section_id: &str) -> Vec<SectionExercise> {
        self.store
            .read(|state| state.exercises.items(section_id).to_vec())
    }

    /// Replace the cached courses with a fresh read.
    pub async fn fetch_courses(&self) -> bool {
        self.store
            .fetch(self.client.courses().list(), |state, courses| {
                state.courses.replace_all(courses)
            })
            .await
    }

    /// Replace the cached sections of `course_id`. Other courses are untouched.
    pub async fn fetch_course_sections(&self, course_id: &str) -> bool {
        if course_id.is_empty() {
            self.store.fail("Course ID is required");
            return false;
        }

        self.store
            .fetch(self.client.courses().sections(course_id), |state, sections| {
                state.sections.replace(course_id.to_string(), sections)
            })
            .await
    }

    /// Replace the cached exercises of `section_id`. Other sections are untouched.
    pub async fn fetch_section_exercises(&self, section_id: &str) -> bool {
        if section_id.is_empty() {
            self.store.fail("Section ID is required");
            return false;
        }

        self.store
            .fetch(
                self.client.courses().section_exercises(section_id),
                |state, exercises| state.exercises.replace(section_id.to_string(), exercises),
            )
            .await
    }

    /// Create a course and put it first.
    pub async fn create_course(&self, course: &NewCourse) -> Result<Course> {
        self.store
            .mutate(self.client.courses().create(course), |state, created| {
                state.courses.prepend(created.clone());
                created
            })
            .await
    }

    /// Update a course and replace it in place.
    pub async fn update_course(&self, id: &str, update: &CourseUpdate) -> Result<Course> {
        self.store
            .mutate(self.client.courses().update(id, update), |state, updated| {
                state.courses.update_by_id(updated.clone());
                updated
            })
            .await
    }

    /// Delete a course along with its cached sections and their exercises.
    pub async fn delete_course(&self, id: &str) -> Result<()> {
        self.store
            .mutate(self.client.courses().delete(id), |state, ()| {
                state.courses.remove_by_id(&id.to_string());
                for section in state.sections.items(id) {
                    state.exercises.remove_key(&section.id);
                }
                state.sections.clear_key(id.to_string());
            })
            .await
    }

    /// Create a section and put it last among its course's sections.
    pub async fn create_section(&self, section: &NewSection) -> Result<CourseSection> {
        self.store
            .mutate(
                self.client.courses().create_section(section),
                |state, created| {
                    state
                        .sections
                        .append(section.course_id.clone(), created.clone());
                    created
                },
            )
            .await
    }

    /// Update a section wherever it is cached.
    pub async fn update_section(&self, id: &str, update: &SectionUpdate) -> Result<CourseSection> {
        self.store
            .mutate(
                self.client.courses().update_section(id, update),
                |state, updated| {
                    state.sections.update_by_id(updated.clone());
                    updated
                },
            )
            .await
    }

    /// Delete a section wherever it is cached.
    pub async fn delete_section(&self, id: &str) -> Result<()> {
        self.store
            .mutate(self.client.courses().delete_section(id), |state, ()| {
                state.sections.remove_by_id(&id.to_string());
                state.exercises.remove_key(id);
            })
            .await
    }

    /// Link an exercise into a section, then reload that section.
    pub async fn add_exercise_to_section(
        &self,
        section_id: &str,
        exercise_id: &str,
        order_index: i32,
    ) -> Result<()> {
        self.store
            .mutate(
                self.client
                    .courses()
                    .add_exercise_to_section(section_id, exercise_id, order_index),
                |_, ()| (),
            )
            .await?;
        self.fetch_section_exercises(section_id).await;
        Ok(())
    }

    /// Unlink an exercise from a section, then reload that section.
    pub async fn remove_exercise_from_section(
        &self,
        section_id: &str,
        exercise_id: &str,
    ) -> Result<()> {
        self.store
            .mutate(
                self.client
                    .courses()
                    .remove_exercise_from_section(section_id, exercise_id),
                |_, ()| (),
            )
            .await?;
        self.fetch_section_exercises(section_id).await;
        Ok(())
    }

    /// Store a new exercise order for a section, then reload that section.
    pub async fn reorder_section_exercises(
        &self,
        section_id: &str,
        exercise_ids: &[String],
    ) -> Result<()> {
        self.store
            .mutate(
                self.client
                    .courses()
                    .reorder_section_exercises(section_id, exercise_ids),
                |_, ()| (),
            )
            .await?;
        self.fetch_section_exercises(section_id).await;
        Ok(())
    }

    /// Forget everything cached.
    pub fn clear(&self) {
        self.store.reset();
    }
}
