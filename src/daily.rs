// src/daily.rs
//
// The daily selection pipeline: date-seeded sampling from the question
// banks, normalization into canonical records, and option shuffling.
// Everything here is pure; given the same date and bank contents the
// whole pipeline produces the same pool, which is what makes "today's
// questions" stable across restarts and concurrent sessions.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

use crate::bank::BankRow;
use crate::models::question::QuestionRecord;
use crate::utils::sanitize::sanitize;

/// The fixed option key alphabet, in display order.
pub const OPTION_KEYS: [&str; 4] = ["A", "B", "C", "D"];

/// Questions drawn from each bank per day (2 aptitude + 2 technical).
pub const QUESTIONS_PER_BANK: usize = 2;

/// Seed offset for the technical bank so the two banks' picks are not
/// correlated. Published behavior: changing this changes every future
/// day's selection, so it is frozen.
const TECHNICAL_SEED_OFFSET: u64 = 7;

/// Derives the deterministic seed for a calendar date: the date formatted
/// as an 8-digit number, e.g. 2024-01-15 -> 20240115.
pub fn daily_seed(date: NaiveDate) -> u64 {
    date.format("%Y%m%d").to_string().parse().unwrap_or_default()
}

/// Samples `min(k, rows.len())` rows without replacement using the given
/// seed. Same seed and same rows always yield the same selection in the
/// same order. An empty bank yields an empty selection.
pub fn sample_rows<T: Clone>(rows: &[T], k: usize, seed: u64) -> Vec<T> {
    let take = k.min(rows.len());
    if take == 0 {
        return Vec::new();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    rand::seq::index::sample(&mut rng, rows.len(), take)
        .iter()
        .map(|i| rows[i].clone())
        .collect()
}

/// Trims and upper-cases a raw answer key so bank authors can write "b"
/// or " B " interchangeably. Anything that is not one of A-D after that
/// coerces to "A": malformed rows degrade, they never fail the batch.
pub fn canonical_answer(raw: &str) -> String {
    let key = raw.trim().to_ascii_uppercase();
    if OPTION_KEYS.contains(&key.as_str()) {
        key
    } else {
        OPTION_KEYS[0].to_string()
    }
}

/// Maps a raw bank row into a canonical record. Option columns are taken
/// in fixed A-D order, all free text is sanitized, and the session id is
/// left at 0 for the pool assembly to fill in.
pub fn normalize_row(row: &BankRow) -> QuestionRecord {
    let mut options = BTreeMap::new();
    let columns = [&row.option_a, &row.option_b, &row.option_c, &row.option_d];
    for (key, text) in OPTION_KEYS.iter().zip(columns) {
        options.insert((*key).to_string(), sanitize(text));
    }

    QuestionRecord {
        id: 0,
        question_type: sanitize(&row.question_type),
        question: sanitize(&row.question),
        options,
        answer: canonical_answer(&row.answer),
        explanation: String::new(),
    }
}

/// Randomly permutes a record's options over the letter keys, remapping
/// `answer` so it still names the previously-correct option.
///
/// The correct option is tracked by its index through the permutation,
/// not by comparing option text, so the invariant
/// `new.options[new.answer] == old.options[old.answer]` holds even when
/// several options carry identical text.
pub fn shuffle_options<R: Rng + ?Sized>(record: &QuestionRecord, rng: &mut R) -> QuestionRecord {
    let values: Vec<String> = OPTION_KEYS
        .iter()
        .map(|k| record.options.get(*k).cloned().unwrap_or_default())
        .collect();
    let correct_idx = OPTION_KEYS.iter().position(|k| *k == record.answer);

    let mut order: Vec<usize> = (0..values.len()).collect();
    order.shuffle(rng);

    let mut options = BTreeMap::new();
    let mut answer = record.answer.clone();
    for (slot, &src) in order.iter().enumerate() {
        options.insert(OPTION_KEYS[slot].to_string(), values[src].clone());
        if Some(src) == correct_idx {
            answer = OPTION_KEYS[slot].to_string();
        }
    }

    QuestionRecord {
        options,
        answer,
        ..record.clone()
    }
}

/// Assembles the canonical pool for a date: 2 aptitude + 2 technical rows
/// sampled with the date seed, normalized, pool order and per-question
/// options shuffled with the same seed, session ids assigned 1-based.
pub fn build_daily_pool(
    date: NaiveDate,
    aptitude: &[BankRow],
    technical: &[BankRow],
) -> Vec<QuestionRecord> {
    let seed = daily_seed(date);

    let mut picked = sample_rows(aptitude, QUESTIONS_PER_BANK, seed);
    picked.extend(sample_rows(
        technical,
        QUESTIONS_PER_BANK,
        seed + TECHNICAL_SEED_OFFSET,
    ));

    let mut pool: Vec<QuestionRecord> = picked.iter().map(normalize_row).collect();

    let mut rng = StdRng::seed_from_u64(seed);
    pool.shuffle(&mut rng);
    for (idx, record) in pool.iter_mut().enumerate() {
        *record = shuffle_options(record, &mut rng);
        record.id = (idx + 1) as i64;
    }
    pool
}
