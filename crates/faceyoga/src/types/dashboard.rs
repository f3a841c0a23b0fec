use serde::Serialize;

use super::Profile;

/// Figures shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    /// Consecutive practice days
    pub streak_days: u32,
    /// Exercises completed
    pub exercises_done: u32,
    /// Total practice time, formatted
    pub practice_time: String,
    /// Exercises in the catalogue
    pub available_exercises: usize,
}

impl DashboardStats {
    /// Compute the stats for `profile`.
    pub fn new(profile: &Profile, available_exercises: usize) -> Self {
        Self {
            streak_days: profile.streak,
            exercises_done: profile.exercises_done,
            practice_time: format_practice_time(profile.practice_time),
            available_exercises,
        }
    }
}

/// Format practice time given in hours: minutes below one hour, otherwise
/// hours with one decimal.
pub fn format_practice_time(hours: f64) -> String {
    if hours < 1.0 {
        format!("{} mins", (hours * 60.0).round())
    } else {
        format!("{} hrs", (hours * 10.0).round() / 10.0)
    }
}
