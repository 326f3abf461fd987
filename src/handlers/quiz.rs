// src/handlers/quiz.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{
    bank, daily,
    error::AppError,
    generator,
    models::{
        answer::{AnswerResult, SubmitAnswerRequest},
        question::QuestionRecord,
    },
    state::AppState,
    store,
};

/// Widest accepted distance between a requested date and today. Keeps
/// arbitrary ?date= values from growing the cache and the questions
/// table without bound (and, in generator mode, from burning a remote
/// call per novel date).
const MAX_DATE_DRIFT_DAYS: i64 = 366;

/// Optional date override for the daily endpoints. Defaults to the
/// injected clock's "today".
#[derive(Debug, Deserialize)]
pub struct DailyParams {
    pub date: Option<NaiveDate>,
}

fn resolve_date(state: &AppState, requested: Option<NaiveDate>) -> Result<NaiveDate, AppError> {
    let today = state.clock.today();
    let date = requested.unwrap_or(today);
    if (date - today).num_days().abs() > MAX_DATE_DRIFT_DAYS {
        return Err(AppError::BadRequest(format!(
            "Date {} is more than a year from today",
            date
        )));
    }
    Ok(date)
}

/// Query parameters for the explanation endpoint.
#[derive(Debug, Deserialize)]
pub struct ExplanationParams {
    pub question: String,
    pub answer: String,
}

/// Returns the ordered 4-question pool for a date.
///
/// The first request for a date assembles the pool and mirrors it into
/// the database; later requests serve the cached list unchanged.
pub async fn get_daily_questions(
    State(state): State<AppState>,
    Query(params): Query<DailyParams>,
) -> Result<impl IntoResponse, AppError> {
    let date = resolve_date(&state, params.date)?;
    let questions = daily_pool(&state, date, false).await?;
    Ok(Json(questions))
}

/// Drops the cached pool for a date, rebuilds it (a fresh generator draw
/// when no banks are configured), and overwrites the date's mirrored
/// rows. Returns the new pool.
pub async fn regenerate_questions(
    State(state): State<AppState>,
    Query(params): Query<DailyParams>,
) -> Result<impl IntoResponse, AppError> {
    let date = resolve_date(&state, params.date)?;
    let questions = daily_pool(&state, date, true).await?;
    Ok(Json(questions))
}

/// Judges a submitted choice against today's pool and records it.
///
/// The answer row is fire-and-forget: a storage fault is logged, not
/// surfaced, since the judgement itself is already complete.
pub async fn submit_answer(
    State(state): State<AppState>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let date = state.clock.today();
    let questions = daily_pool(&state, date, false).await?;

    let question = questions
        .iter()
        .find(|q| q.id == payload.question_id)
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No question {} in today's pool",
                payload.question_id
            ))
        })?;

    let choice = payload.choice.trim().to_ascii_uppercase();
    let correct = question.answer == choice;

    if let Err(e) = store::save_answer(&state.pool, question.id, &choice, correct).await {
        tracing::error!("Failed to record answer for question {}: {}", question.id, e);
    }

    Ok(Json(AnswerResult {
        correct,
        answer: question.answer.clone(),
        explanation: question.explanation.clone(),
    }))
}

/// Fetches an explanation for an arbitrary question/answer pair.
/// Always answers 200 with some text, if only the placeholder.
pub async fn get_explanation(
    State(state): State<AppState>,
    Query(params): Query<ExplanationParams>,
) -> impl IntoResponse {
    let explanation =
        generator::get_explanation(state.chat.as_ref(), &params.question, &params.answer).await;
    Json(json!({ "explanation": explanation }))
}

/// Returns the pool for a date, via the cache when possible.
///
/// Bank mode (both bank paths configured) rebuilds deterministically from
/// the banks; generator mode first tries the mirrored rows so a process
/// restart does not burn another generation call for the same day, then
/// falls through to a fresh draw. `regenerate` bypasses both the cache
/// and the mirror.
async fn daily_pool(
    state: &AppState,
    date: NaiveDate,
    regenerate: bool,
) -> Result<Vec<QuestionRecord>, AppError> {
    if !regenerate {
        if let Some(cached) = state.pools.lock().unwrap().get(&date) {
            return Ok(cached.clone());
        }
    }

    let bank_paths = state
        .config
        .aptitude_bank
        .as_ref()
        .zip(state.config.technical_bank.as_ref());

    let questions = if let Some((aptitude, technical)) = bank_paths {
        // BankUnavailable is the one failure allowed through to the caller.
        let aptitude_rows = bank::load_bank(aptitude)?;
        let technical_rows = bank::load_bank(technical)?;
        daily::build_daily_pool(date, &aptitude_rows, &technical_rows)
    } else {
        if !regenerate {
            match store::fetch_questions(&state.pool, date).await {
                Ok(rows) if !rows.is_empty() => {
                    let restored: Vec<QuestionRecord> = rows
                        .into_iter()
                        .enumerate()
                        .map(|(idx, row)| row.into_record((idx + 1) as i64))
                        .collect();
                    state.pools.lock().unwrap().insert(date, restored.clone());
                    return Ok(restored);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("Could not read mirrored questions for {}: {}", date, e);
                }
            }
        }
        generator::get_questions(state.chat.as_ref()).await
    };

    if let Err(e) = store::save_questions(&state.pool, date, &questions, true).await {
        tracing::error!("Failed to mirror questions for {}: {}", date, e);
    }

    state.pools.lock().unwrap().insert(date, questions.clone());
    Ok(questions)
}
