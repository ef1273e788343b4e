//! Typed views of the workout API resources.
//!
//! These only decode *normalized* bodies: every timestamp field is expected
//! to already be an ISO-8601 date (or `null` for an invalid one).

use crate::node::Node;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub max_weight: Option<i64>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSet {
    pub id: Option<i64>,
    pub routine_exercise_id: Option<i64>,
    pub set_type: String,
    pub targeted_weight: i64,
    pub targeted_reps: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineExercise {
    pub id: Option<i64>,
    pub exercise_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub max_weight: Option<i64>,
    pub sets: Option<Vec<ExerciseSet>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    pub id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub user_id: i64,
    pub exercises: Option<Vec<RoutineExercise>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub exercises: Option<Vec<SessionExercise>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionExercise {
    pub id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub sets: Option<Vec<SessionExerciseSet>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionExerciseSet {
    pub id: Option<i64>,
    pub set_type: Option<String>,
    pub weight_lifted: Option<i64>,
    pub reps_completed: Option<i64>,
}

/// Summary card on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardGlance {
    pub total_workouts: i64,
    pub total_volumes: i64,
    pub streaks: i64,
    pub last_workout: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ResourceKind {
    Exercise,
    Routine,
    Session,
    Dashboard,
}

impl ResourceKind {
    /// Checks that a normalized body (a single resource or a list of them)
    /// decodes as this kind. Returns how many resources it held.
    pub fn check(self, body: &Node) -> Result<usize, serde_json::Error> {
        match self {
            ResourceKind::Exercise => decode::<Exercise>(body).map(|v| v.len()),
            ResourceKind::Routine => decode::<Routine>(body).map(|v| v.len()),
            ResourceKind::Session => decode::<Session>(body).map(|v| v.len()),
            ResourceKind::Dashboard => decode::<DashboardGlance>(body).map(|v| v.len()),
        }
    }
}

/// Decodes a normalized body into one or more resources.
pub fn decode<T: DeserializeOwned>(body: &Node) -> Result<Vec<T>, serde_json::Error> {
    match serde_json::to_value(body)? {
        Value::Array(items) => items.into_iter().map(serde_json::from_value).collect(),
        single => Ok(vec![serde_json::from_value(single)?]),
    }
}
