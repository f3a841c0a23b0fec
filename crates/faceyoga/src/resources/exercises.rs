//! The exercise catalogue

use http::Method;

use super::{Resource, Stamped, require};
use crate::{
    client::Client,
    error::{Result, ResultExt},
    http::Order,
    types::{Exercise, ExerciseUpdate, NewExercise},
};

const EXERCISES: &str = "/rest/v1/exercises";

/// Exercises resource.
#[derive(Clone)]
pub struct Exercises {
    client: Client,
}

impl Resource for Exercises {
    fn client(&self) -> &Client {
        &self.client
    }
}

impl Exercises {
    /// Create a new Exercises resource.
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// All exercises, newest first.
    pub async fn list(&self) -> Result<Vec<Exercise>> {
        let client = &self.client;
        client
            .retrying(|| async move {
                client
                    .request(Method::GET, EXERCISES)?
                    .select("*")
                    .order("created_at", Order::Descending)
                    .send()
                    .await?
                    .parse_result()
            })
            .await
            .context("Failed to fetch exercises")
    }

    /// Exercises targeting `category`, newest first.
    pub async fn list_by_category(&self, category: &str) -> Result<Vec<Exercise>> {
        require(category, "Category is required")?;

        let client = &self.client;
        client
            .retrying(|| async move {
                client
                    .request(Method::GET, EXERCISES)?
                    .select("*")
                    .eq("category", category)
                    .order("created_at", Order::Descending)
                    .send()
                    .await?
                    .parse_result()
            })
            .await
            .context("Failed to fetch exercises")
    }

    /// Create an exercise and return the stored row.
    pub async fn create(&self, exercise: &NewExercise) -> Result<Exercise> {
        require(&exercise.title, "Exercise title is required")?;

        async {
            self.client
                .request(Method::POST, EXERCISES)?
                .returning()
                .single()
                .json(exercise)?
                .send()
                .await?
                .parse_result()
        }
        .await
        .context("Failed to create exercise")
    }

    /// Apply `update` to exercise `id` and return the stored row.
    pub async fn update(&self, id: &str, update: &ExerciseUpdate) -> Result<Exercise> {
        require(id, "Exercise ID is required")?;

        let client = &self.client;
        let body = Stamped::now(update);
        let body = &body;
        client
            .retrying(|| async move {
                client
                    .request(Method::PATCH, EXERCISES)?
                    .eq("id", id)
                    .returning()
                    .single()
                    .json(body)?
                    .send()
                    .await?
                    .parse_result()
            })
            .await
            .context("Failed to update exercise")
    }

    /// Delete exercise `id`.
    pub async fn delete(&self, id: &str) -> Result<()> {
        require(id, "Exercise ID is required")?;

        let client = &self.client;
        client
            .retrying(|| async move {
                client
                    .request(Method::DELETE, EXERCISES)?
                    .eq("id", id)
                    .send()
                    .await?
                    .ensure_success()
                    .map(drop)
            })
            .await
            .context("Failed to delete exercise")
    }
}
