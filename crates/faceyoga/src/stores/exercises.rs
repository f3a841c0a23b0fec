use faceyoga_core::cache::Collection;
use faceyoga_core::store::{Snapshot, Store};

use crate::{
    client::Client,
    error::Result,
    types::{Exercise, ExerciseUpdate, NewExercise},
};

/// Store for the exercise catalogue.
#[derive(Debug, Clone)]
pub struct ExerciseStore {
    client: Client,
    store: Store<Collection<Exercise>>,
}

impl ExerciseStore {
    /// Create an empty store backed by `client`.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            store: Store::default(),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Store<Collection<Exercise>> {
        &self.store
    }

    /// Copy of the cached exercises with the loading and error flags.
    pub fn snapshot(&self) -> Snapshot<Collection<Exercise>> {
        self.store.snapshot()
    }

    /// Cached exercises.
    pub fn exercises(&self) -> Vec<Exercise> {
        self.store.read(|exercises| exercises.as_slice().to_vec())
    }

    /// Number of cached exercises.
    pub fn len(&self) -> usize {
        self.store.read(Collection::len)
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.store.read(Collection::is_empty)
    }

    /// Replace the cache with the full catalogue, or only `category` when given.
    pub async fn fetch(&self, category: Option<&str>) -> bool {
        let exercises = self.client.exercises();
        match category {
            Some(category) => {
                self.store
                    .fetch(exercises.list_by_category(category), Collection::replace_all)
                    .await
            }
            None => {
                self.store
                    .fetch(exercises.list(), Collection::replace_all)
                    .await
            }
        }
    }

    /// Create an exercise and put it first.
    pub async fn create(&self, exercise: &NewExercise) -> Result<Exercise> {
        self.store
            .mutate(self.client.exercises().create(exercise), |cached, created| {
                cached.prepend(created.clone());
                created
            })
            .await
    }

    /// Update an exercise and replace it in place.
    pub async fn update(&self, id: &str, update: &ExerciseUpdate) -> Result<Exercise> {
        self.store
            .mutate(
                self.client.exercises().update(id, update),
                |cached, updated| {
                    cached.update_by_id(updated.clone());
                    updated
                },
            )
            .await
    }

    /// Delete an exercise.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store
            .mutate(self.client.exercises().delete(id), |cached, ()| {
                cached.remove_by_id(&id.to_string());
            })
            .await
    }

    /// Forget everything cached.
    pub fn clear(&self) {
        self.store.reset();
    }
}
