// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use std::collections::BTreeMap;

/// Canonical question record, post-normalization.
///
/// Invariants upheld by the pipeline in `daily` and `generator`:
/// * `options` has exactly the four keys A, B, C, D.
/// * `answer` is always one of those keys.
///
/// `options` is a BTreeMap so iteration order is the fixed A < B < C < D
/// order the shuffle tie-break and display rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// 1-based position in the assembled daily pool, not a bank row id.
    /// Answer tracking is session-local.
    pub id: i64,

    /// Category label: 'aptitude' or 'technical'.
    /// Mapped from `type` since `type` is a reserved keyword in Rust.
    #[serde(rename = "type")]
    pub question_type: String,

    pub question: String,

    pub options: BTreeMap<String, String>,

    /// The letter key of the correct option.
    pub answer: String,

    /// Explanation for the correct answer. May be empty for bank
    /// questions; the explanation endpoint fills the gap on demand.
    #[serde(default)]
    pub explanation: String,
}

/// Represents the 'questions' table in the database (mirror of a served
/// pool). The category label is not mirrored, only what the schema holds.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoredQuestion {
    pub id: i64,
    pub date: String,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub answer: String,
    pub explanation: String,
}

impl StoredQuestion {
    /// Rebuilds a canonical record from a mirrored row. `id` is the
    /// session position the row is being restored into, since the
    /// autoincrement id in the table is global across dates.
    pub fn into_record(self, id: i64) -> QuestionRecord {
        let options = BTreeMap::from([
            ("A".to_string(), self.option_a),
            ("B".to_string(), self.option_b),
            ("C".to_string(), self.option_c),
            ("D".to_string(), self.option_d),
        ]);
        QuestionRecord {
            id,
            // The schema does not carry the category label.
            question_type: String::new(),
            question: self.question,
            options,
            answer: self.answer,
            explanation: self.explanation,
        }
    }
}
