//! Common test utilities and helpers

use std::time::Duration;

use faceyoga::{Client, Session, User};
use serde_json::{Value, json};
use wiremock::MockServer;

/// Anon key the mock server expects.
pub const ANON_KEY: &str = "test-anon-key";

/// Access token of the signed-in test user.
#[allow(dead_code)]
pub const USER_TOKEN: &str = "user-access-token";

/// Client pointed at `server` with fast retries.
#[allow(dead_code)]
pub fn client(server: &MockServer) -> Client {
    client_with_retries(server, 3)
}

/// Client pointed at `server` with `max_retries` fast retries.
#[allow(dead_code)]
pub fn client_with_retries(server: &MockServer, max_retries: u32) -> Client {
    Client::builder()
        .url(server.uri())
        .anon_key(ANON_KEY)
        .site_url("https://faceyoga.app")
        .max_retries(max_retries)
        .retry_delay(Duration::from_millis(1))
        .build()
        .expect("Failed to build client")
}

/// The test user.
#[allow(dead_code)]
pub fn user() -> User {
    User {
        id: "u-1".to_string(),
        email: Some("maya@example.com".to_string()),
        created_at: None,
        user_metadata: Value::Null,
    }
}

/// A session for the test user.
#[allow(dead_code)]
pub fn session() -> Session {
    Session {
        access_token: USER_TOKEN.to_string(),
        refresh_token: "refresh-token".to_string(),
        token_type: "bearer".to_string(),
        expires_in: 3600,
        expires_at: None,
        user: user(),
    }
}

/// Session response body as the auth service sends it.
#[allow(dead_code)]
pub fn session_json() -> Value {
    json!({
        "access_token": USER_TOKEN,
        "refresh_token": "refresh-token",
        "token_type": "bearer",
        "expires_in": 3600,
        "expires_at": 1_900_000_000,
        "user": { "id": "u-1", "email": "maya@example.com" }
    })
}

/// A course row.
#[allow(dead_code)]
pub fn course(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": "Daily routine",
        "difficulty": "Beginner",
        "duration": "2 weeks",
        "image_url": null,
        "created_at": "2024-03-01T09:00:00Z",
        "updated_at": "2024-03-01T09:00:00Z"
    })
}

/// A section row.
#[allow(dead_code)]
pub fn section(id: &str, course_id: &str, order_index: i32) -> Value {
    json!({
        "id": id,
        "course_id": course_id,
        "title": format!("Week {}", order_index + 1),
        "description": null,
        "order_index": order_index,
        "created_at": "2024-03-01T09:00:00Z",
        "updated_at": "2024-03-01T09:00:00Z"
    })
}

/// An exercise row.
#[allow(dead_code)]
pub fn exercise(id: &str, category: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Exercise {id}"),
        "description": "Hold for ten seconds",
        "category": category,
        "duration": "2 min",
        "image_url": null,
        "created_at": "2024-03-01T09:00:00Z",
        "updated_at": "2024-03-01T09:00:00Z"
    })
}

/// A section membership row with the exercise embedded.
#[allow(dead_code)]
pub fn section_exercise(section_id: &str, exercise_id: &str, order_index: i32) -> Value {
    json!({
        "id": format!("se-{exercise_id}"),
        "section_id": section_id,
        "exercise_id": exercise_id,
        "order_index": order_index,
        "created_at": "2024-03-01T09:00:00Z",
        "exercise": exercise(exercise_id, "jaw")
    })
}

/// A profile row for the test user.
#[allow(dead_code)]
pub fn profile() -> Value {
    json!({
        "id": "p-1",
        "user_id": "u-1",
        "email": "maya@example.com",
        "username": "maya",
        "full_name": "",
        "role": "user",
        "streak": 4,
        "exercises_done": 12,
        "practice_time": 0.5,
        "created_at": "2024-03-01T09:00:00Z",
        "updated_at": null
    })
}

/// A progress row.
#[allow(dead_code)]
pub fn progress_entry(id: &str, image_url: &str) -> Value {
    json!({
        "id": id,
        "user_id": "u-1",
        "image_url": image_url,
        "notes": "week one",
        "created_at": "2024-03-01T09:00:00Z"
    })
}

/// The body the table API sends when a single-row read matched nothing.
#[allow(dead_code)]
pub fn no_rows() -> Value {
    json!({
        "code": "PGRST116",
        "details": "The result contains 0 rows",
        "hint": null,
        "message": "JSON object requested, multiple (or no) rows returned"
    })
}
