// src/store.rs
//
// Persistence layer over SQLite. Each write is an independent single-row
// operation: no transaction spans multiple questions or answers, so a
// partial write on crash leaves only independently-meaningful rows.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::answer::AnswerRow;
use crate::models::question::{QuestionRecord, StoredQuestion};

/// Creates the questions and answers tables if they do not exist.
pub async fn create_schema(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS questions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT,
            question TEXT,
            option_a TEXT,
            option_b TEXT,
            option_c TEXT,
            option_d TEXT,
            answer TEXT,
            explanation TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS answers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            question_id INTEGER,
            choice TEXT,
            correct INTEGER,
            timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY(question_id) REFERENCES questions(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Mirrors a day's pool into the questions table.
/// With `overwrite` set, the date's previous rows are deleted first.
pub async fn save_questions(
    pool: &SqlitePool,
    date: NaiveDate,
    questions: &[QuestionRecord],
    overwrite: bool,
) -> Result<(), AppError> {
    if overwrite {
        sqlx::query("DELETE FROM questions WHERE date = ?1")
            .bind(date.to_string())
            .execute(pool)
            .await?;
    }

    for question in questions {
        let option = |key: &str| {
            question
                .options
                .get(key)
                .map(String::as_str)
                .unwrap_or("")
                .to_string()
        };

        sqlx::query(
            r#"
            INSERT INTO questions
            (date, question, option_a, option_b, option_c, option_d, answer, explanation)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(date.to_string())
        .bind(&question.question)
        .bind(option("A"))
        .bind(option("B"))
        .bind(option("C"))
        .bind(option("D"))
        .bind(&question.answer)
        .bind(&question.explanation)
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Fetches the mirrored questions for a date, in insertion order.
pub async fn fetch_questions(
    pool: &SqlitePool,
    date: NaiveDate,
) -> Result<Vec<StoredQuestion>, AppError> {
    let rows = sqlx::query_as::<_, StoredQuestion>(
        r#"
        SELECT id, date, question, option_a, option_b, option_c, option_d, answer, explanation
        FROM questions
        WHERE date = ?1
        ORDER BY id
        "#,
    )
    .bind(date.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Appends one answer record. The timestamp defaults to CURRENT_TIMESTAMP.
pub async fn save_answer(
    pool: &SqlitePool,
    question_id: i64,
    choice: &str,
    correct: bool,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO answers (question_id, choice, correct)
        VALUES (?1, ?2, ?3)
        "#,
    )
    .bind(question_id)
    .bind(choice)
    .bind(correct)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetches the recorded answers for one question, oldest first.
pub async fn fetch_answers(
    pool: &SqlitePool,
    question_id: i64,
) -> Result<Vec<AnswerRow>, AppError> {
    let rows = sqlx::query_as::<_, AnswerRow>(
        r#"
        SELECT id, question_id, choice, correct, timestamp
        FROM answers
        WHERE question_id = ?1
        ORDER BY id
        "#,
    )
    .bind(question_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
