// src/models/survey.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A survey submission recorded for the current learner.
/// The canonical form is whatever the server returns on submit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResponse {
    pub category_id: String,

    /// Ratings in question order.
    pub answers: Vec<i64>,

    pub timestamp: DateTime<Utc>,
}

/// Wire payload for `POST survey-responses`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSurveyRequest {
    pub user_id: String,
    pub category_id: String,
    pub answers: Vec<i64>,
    pub timestamp: DateTime<Utc>,
}

/// Envelope returned by `GET survey-responses/{userId}`.
#[derive(Debug, Deserialize)]
pub struct SurveyListPayload {
    #[serde(default)]
    pub responses: Vec<SurveyResponse>,
}

/// Envelope returned by `POST survey-responses`.
#[derive(Debug, Deserialize)]
pub struct SubmitSurveyPayload {
    pub response: SurveyResponse,
}
