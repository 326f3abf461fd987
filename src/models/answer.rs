// src/models/answer.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

use crate::daily::OPTION_KEYS;

/// Represents the 'answers' table in the database.
/// Append-only: rows are never mutated after creation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AnswerRow {
    pub id: i64,
    pub question_id: i64,
    pub choice: String,
    pub correct: bool,
    pub timestamp: Option<chrono::NaiveDateTime>,
}

/// DTO for submitting an answer to one of today's questions.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    /// Session-local question id (1-based position in today's pool).
    pub question_id: i64,

    /// The selected option key.
    #[validate(custom(function = validate_choice))]
    pub choice: String,
}

/// DTO for the result of an answer submission.
#[derive(Debug, Serialize)]
pub struct AnswerResult {
    pub correct: bool,
    /// The correct option key, echoed back for the summary view.
    pub answer: String,
    pub explanation: String,
}

fn validate_choice(choice: &str) -> Result<(), validator::ValidationError> {
    let key = choice.trim().to_ascii_uppercase();
    if OPTION_KEYS.contains(&key.as_str()) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("choice_must_be_a_to_d"))
    }
}
