// src/generator.rs
//
// Remote question generation with a guaranteed local fallback. The rest
// of the system only ever sees canonical `QuestionRecord`s: the ad hoc
// extraction of JSON from free-form model output stays inside this
// module.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::time::Duration;
use uuid::Uuid;

use crate::config::Config;
use crate::daily::{self, OPTION_KEYS};
use crate::error::AppError;
use crate::models::question::QuestionRecord;

const SYSTEM_PROMPT: &str = "You are an expert quiz generator. Your response must be a valid \
JSON array, strictly adhering to the user's required structure.";

const PROMPT: &str = r#"
Generate exactly 4 multiple-choice questions for CSE technical interview level:

- 2 aptitude questions: Focused on Quantitative Ability and Logical Reasoning from the following topics: Sequences & Series, Permutations & Combinations, Probability, Geometry, Mensuration, Statistics, Blood Relations, Directions, Clocks & Calendars, Cubes, Coding & Decoding, Cryptarithmetic, and Non Verbal Reasoning.
- 2 technical questions: Focused on Core Computer Science concepts such as Data Structures, Algorithms, Operating Systems, and Database Management Systems.

Requirements:

1. Each question must have exactly 4 options (A, B, C, D).
2. The correct answer must be randomly placed among the options; do not always put it at A.
3. Provide one correct answer only.
4. Provide a concise explanation for why the correct answer is correct, maximum 30 words.
5. Format the output strictly as a JSON list like this:

[
  {
    "type": "aptitude or technical",
    "question": "question text",
    "options": {
      "A": "option text",
      "B": "option text",
      "C": "option text",
      "D": "option text"
    },
    "answer": "A/B/C/D",
    "explanation": "short explanation (MAX 30 WORDS)"
  }
]

Do not include any text outside the JSON. Ensure that the options for each question are shuffled.
"#;

const EXPLANATION_SYSTEM_PROMPT: &str =
    "You are a concise tutor. Reply with a single plain-text explanation of at most 30 words. \
No markdown, no preamble.";

/// Placeholder returned whenever an explanation cannot be fetched.
pub const EXPLANATION_UNAVAILABLE: &str = "Explanation unavailable.";

/// One chat-style completion call against a remote text-generation
/// service. A trait so handlers and tests can run without the network.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, AppError>;
}

/// Production client for an OpenAI-compatible chat/completions endpoint
/// (OpenRouter). One attempt per call, bounded by the request timeout; a
/// failed attempt is never retried here, the caller falls back instead.
pub struct OpenRouterClient {
    http: reqwest::Client,
    api_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenRouterClient {
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            api_url: config.openrouter_api_url.clone(),
            model: config.openrouter_model.clone(),
            api_key: config.openrouter_api_key.clone(),
        }
    }
}

#[async_trait]
impl ChatClient for OpenRouterClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, AppError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AppError::RemoteGenerationFailed("OPENROUTER_API_KEY is not set".to_string())
        })?;

        let payload = json!({
            "model": self.model,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ],
            "temperature": 0.7,
            "max_tokens": 2000
        });

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(api_key.trim())
            // Required by the OpenRouter security check.
            .header("HTTP-Referer", "http://localhost")
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::RemoteGenerationFailed(format!("request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AppError::RemoteGenerationFailed(format!("bad status: {}", e)))?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::RemoteGenerationFailed(format!("invalid body: {}", e)))?;

        body["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::RemoteGenerationFailed("no message content in response".to_string())
            })
    }
}

/// Question object as the remote service returns it. Every field defaults
/// so a partially-shaped object degrades instead of failing the batch.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedQuestion {
    #[serde(default, rename = "type")]
    pub question_type: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub options: BTreeMap<String, String>,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub explanation: String,
}

/// Locates the JSON array inside free-form model output.
///
/// Strips surrounding markdown code fences, then slices from the first
/// `[` to the last `]`, tolerating leading and trailing commentary.
/// Returns `None` when the markers cannot be located: the caller treats
/// the whole response as failed, never partially parsed.
pub fn extract_json_array(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed);

    let start = trimmed.find('[')?;
    let end = trimmed.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&trimmed[start..=end])
}

/// Questions per generated batch: 2 aptitude + 2 technical.
const BATCH_SIZE: usize = 4;

/// Parses a raw response blob into generated questions, or fails the
/// whole call.
pub fn parse_generated(text: &str) -> Result<Vec<GeneratedQuestion>, AppError> {
    let body = extract_json_array(text).ok_or_else(|| {
        AppError::RemoteGenerationFailed("no JSON array markers in model output".to_string())
    })?;
    let batch: Vec<GeneratedQuestion> = serde_json::from_str(body).map_err(|e| {
        AppError::RemoteGenerationFailed(format!("model output is not a question array: {}", e))
    })?;
    validate_batch(&batch)?;
    Ok(batch)
}

/// Rejects a batch that parsed as JSON but is not servable as a quiz:
/// wrong question count, option keys off the A-D alphabet, or an answer
/// that names no option. The whole call is treated as failed so the
/// caller serves the fallback set instead of blank questions.
fn validate_batch(batch: &[GeneratedQuestion]) -> Result<(), AppError> {
    if batch.len() != BATCH_SIZE {
        return Err(AppError::RemoteGenerationFailed(format!(
            "expected {} questions, got {}",
            BATCH_SIZE,
            batch.len()
        )));
    }
    for (idx, question) in batch.iter().enumerate() {
        if let Some(missing) = OPTION_KEYS
            .iter()
            .find(|k| !question.options.contains_key(**k))
        {
            return Err(AppError::RemoteGenerationFailed(format!(
                "question {} is missing option {}",
                idx + 1,
                missing
            )));
        }
        let answer = question.answer.trim().to_ascii_uppercase();
        if !OPTION_KEYS.contains(&answer.as_str()) {
            return Err(AppError::RemoteGenerationFailed(format!(
                "question {} has answer key '{}' outside A-D",
                idx + 1,
                question.answer
            )));
        }
    }
    Ok(())
}

/// Asks the remote service for a fresh batch of 4 questions. Any failure
/// (credential, network, status, shape) surfaces as
/// `RemoteGenerationFailed` for the caller to absorb.
pub async fn generate_questions(
    client: &dyn ChatClient,
) -> Result<Vec<GeneratedQuestion>, AppError> {
    // Nonce keeps repeated prompts from hitting provider-side caches.
    let user_prompt = format!("{}\n\n--- Request Seed: {} ---", PROMPT, Uuid::new_v4());
    let text = client.complete(SYSTEM_PROMPT, &user_prompt).await?;
    parse_generated(&text)
}

/// The fixed fallback set: always available, never fails.
pub fn sample_questions() -> Vec<GeneratedQuestion> {
    let question = |question_type: &str,
                    question: &str,
                    options: [&str; 4],
                    answer: &str,
                    explanation: &str| GeneratedQuestion {
        question_type: question_type.to_string(),
        question: question.to_string(),
        options: OPTION_KEYS
            .iter()
            .zip(options)
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        answer: answer.to_string(),
        explanation: explanation.to_string(),
    };

    vec![
        question(
            "aptitude",
            "What is 2 + 2?",
            ["3", "4", "5", "6"],
            "B",
            "2 + 2 = 4.",
        ),
        question(
            "aptitude",
            "If a train travels 60 km in 1 hour, how far will it travel in 2.5 hours?",
            ["120 km", "150 km", "180 km", "200 km"],
            "B",
            "Distance = Speed x Time. 60 km/h * 2.5 h = 150 km.",
        ),
        question(
            "technical",
            "Which data structure uses LIFO?",
            ["Queue", "Stack", "List", "Tree"],
            "B",
            "Stack uses Last-In, First-Out (LIFO) order: the last element added is the first one removed.",
        ),
        question(
            "technical",
            "What is normalization in a database?",
            [
                "Organizing data to minimize redundancy",
                "Optimizing search speed",
                "Adding indexes to tables",
                "Encrypting data for security",
            ],
            "A",
            "Normalization organizes database columns and tables to reduce data redundancy and improve data integrity.",
        ),
    ]
}

/// Converts a generated question into a canonical record with id 0.
/// Options are forced onto the fixed A-D alphabet and the answer key is
/// trimmed, upper-cased, and coerced into range.
fn canonicalize(raw: GeneratedQuestion) -> QuestionRecord {
    let mut options = BTreeMap::new();
    for key in OPTION_KEYS {
        let text = raw.options.get(key).cloned().unwrap_or_default();
        options.insert(key.to_string(), text);
    }
    QuestionRecord {
        id: 0,
        question_type: raw.question_type,
        question: raw.question,
        options,
        answer: daily::canonical_answer(&raw.answer),
        explanation: raw.explanation,
    }
}

/// Batch of 4 canonical questions: remote when possible, the fallback set
/// otherwise. Every question's options are re-shuffled here since the
/// remote service is only asked, not guaranteed, to randomize answer
/// placement. This never fails.
pub async fn get_questions(client: &dyn ChatClient) -> Vec<QuestionRecord> {
    let raw = match generate_questions(client).await {
        Ok(questions) => questions,
        Err(e) => {
            tracing::warn!("Question generation failed, using fallback set: {}", e);
            sample_questions()
        }
    };

    let mut rng = rand::thread_rng();
    raw.into_iter()
        .enumerate()
        .map(|(idx, q)| {
            let mut record = daily::shuffle_options(&canonicalize(q), &mut rng);
            record.id = (idx + 1) as i64;
            record
        })
        .collect()
}

/// Fetches an explanation for a question/answer pair, degrading to a
/// literal placeholder on any failure. Never errors.
pub async fn get_explanation(client: &dyn ChatClient, question: &str, answer: &str) -> String {
    let user_prompt = format!(
        "Question: {}\nCorrect answer: {}\n\nExplain in at most 30 words why this answer is correct.",
        question, answer
    );

    match client.complete(EXPLANATION_SYSTEM_PROMPT, &user_prompt).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => EXPLANATION_UNAVAILABLE.to_string(),
        Err(e) => {
            tracing::warn!("Explanation fetch failed: {}", e);
            EXPLANATION_UNAVAILABLE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingChat;

    #[async_trait]
    impl ChatClient for FailingChat {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, AppError> {
            Err(AppError::RemoteGenerationFailed("stubbed outage".to_string()))
        }
    }

    struct CannedChat(String);

    #[async_trait]
    impl ChatClient for CannedChat {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, AppError> {
            Ok(self.0.clone())
        }
    }

    fn canned_batch() -> String {
        r#"Sure! Here are your questions:
```json
[
  {"type": "aptitude", "question": "Next in 2, 4, 8?", "options": {"A": "12", "B": "14", "C": "16", "D": "18"}, "answer": "C", "explanation": "Doubling."},
  {"type": "aptitude", "question": "3 * 7?", "options": {"A": "21", "B": "24", "C": "27", "D": "18"}, "answer": "a", "explanation": "Times table."},
  {"type": "technical", "question": "FIFO structure?", "options": {"A": "Stack", "B": "Queue", "C": "Heap", "D": "Trie"}, "answer": "B", "explanation": "Queues are FIFO."},
  {"type": "technical", "question": "ACID's I?", "options": {"A": "Integrity", "B": "Indexing", "C": "Isolation", "D": "Iteration"}, "answer": "C", "explanation": "Isolation."}
]
```
Hope that helps!"#
            .to_string()
    }

    #[test]
    fn extracts_array_from_fenced_commentary() {
        let blob = canned_batch();
        let slice = extract_json_array(&blob).unwrap();
        assert!(slice.starts_with('['));
        assert!(slice.ends_with(']'));

        let parsed = parse_generated(&blob).unwrap();
        assert_eq!(parsed.len(), 4);
        assert_eq!(parsed[0].question, "Next in 2, 4, 8?");
        assert_eq!(parsed[3].answer, "C");
    }

    #[test]
    fn extracts_bare_array() {
        let blob = r#"[{"type": "aptitude"}]"#;
        assert_eq!(extract_json_array(blob), Some(blob));
    }

    #[test]
    fn rejects_blob_without_markers() {
        assert_eq!(extract_json_array("no array here"), None);
        assert_eq!(extract_json_array("] backwards ["), None);
        assert!(matches!(
            parse_generated("total nonsense"),
            Err(AppError::RemoteGenerationFailed(_))
        ));
    }

    #[test]
    fn rejects_unparseable_array() {
        assert!(matches!(
            parse_generated("[ not json ]"),
            Err(AppError::RemoteGenerationFailed(_))
        ));
    }

    // A batch using keys outside the A-D alphabet. Parses as JSON but
    // must be rejected wholesale, never served with blank option slots.
    fn lowercase_key_batch() -> String {
        let object = r#"{"type": "aptitude", "question": "W?", "options": {"a": "w", "b": "x", "c": "y", "d": "z"}, "answer": "a", "explanation": ""}"#;
        format!("[{}, {}, {}, {}]", object, object, object, object)
    }

    #[test]
    fn rejects_misshapen_batches() {
        // Option keys off the alphabet.
        assert!(matches!(
            parse_generated(&lowercase_key_batch()),
            Err(AppError::RemoteGenerationFailed(_))
        ));

        // Wrong question count.
        let short = r#"[
            {"type": "aptitude", "question": "W?", "options": {"A": "w", "B": "x", "C": "y", "D": "z"}, "answer": "A", "explanation": ""}
        ]"#;
        assert!(matches!(
            parse_generated(short),
            Err(AppError::RemoteGenerationFailed(_))
        ));

        // Answer naming no option.
        let bad_answer = canned_batch().replace(r#""answer": "B""#, r#""answer": "E""#);
        assert!(matches!(
            parse_generated(&bad_answer),
            Err(AppError::RemoteGenerationFailed(_))
        ));
    }

    #[tokio::test]
    async fn misshapen_batch_falls_back() {
        let client = CannedChat(lowercase_key_batch());
        let pool = get_questions(&client).await;

        assert_eq!(pool.len(), 4);
        assert!(
            pool.iter().any(|q| q.question == "What is 2 + 2?"),
            "expected the fallback set"
        );
        assert!(
            pool.iter().all(|q| q.options.values().all(|v| !v.is_empty())),
            "blank option text reached the pool"
        );
    }

    #[test]
    fn fallback_set_is_canonical() {
        let records: Vec<QuestionRecord> =
            sample_questions().into_iter().map(canonicalize).collect();
        assert_eq!(records.len(), 4);
        for record in &records {
            let keys: Vec<&str> = record.options.keys().map(String::as_str).collect();
            assert_eq!(keys, OPTION_KEYS);
            assert!(OPTION_KEYS.contains(&record.answer.as_str()));
        }
        assert_eq!(records.iter().filter(|q| q.question_type == "aptitude").count(), 2);
        assert_eq!(records.iter().filter(|q| q.question_type == "technical").count(), 2);
    }

    #[tokio::test]
    async fn failed_generation_falls_back() {
        let pool = get_questions(&FailingChat).await;
        assert_eq!(pool.len(), 4);

        for (idx, record) in pool.iter().enumerate() {
            assert_eq!(record.id, (idx + 1) as i64);
            assert!(OPTION_KEYS.contains(&record.answer.as_str()));
        }

        // The shuffle must keep the answer pointing at the right value.
        let two_plus_two = pool
            .iter()
            .find(|q| q.question == "What is 2 + 2?")
            .expect("fallback question missing");
        assert_eq!(two_plus_two.options[&two_plus_two.answer], "4");
    }

    #[tokio::test]
    async fn generated_batch_is_canonicalized_and_shuffled() {
        let client = CannedChat(canned_batch());
        let pool = get_questions(&client).await;
        assert_eq!(pool.len(), 4);

        let fifo = pool
            .iter()
            .find(|q| q.question == "FIFO structure?")
            .expect("generated question missing");
        assert_eq!(fifo.options[&fifo.answer], "Queue");

        // Lower-cased answer key from the model is normalized.
        let times = pool.iter().find(|q| q.question == "3 * 7?").unwrap();
        assert_eq!(times.options[&times.answer], "21");
    }

    #[tokio::test]
    async fn unparseable_response_falls_back() {
        let client = CannedChat("the model rambled with no JSON at all".to_string());
        let pool = get_questions(&client).await;
        assert_eq!(pool.len(), 4);
        assert!(pool.iter().any(|q| q.question == "What is 2 + 2?"));
    }

    #[tokio::test]
    async fn explanation_degrades_to_placeholder() {
        let text = get_explanation(&FailingChat, "Why?", "B").await;
        assert_eq!(text, EXPLANATION_UNAVAILABLE);

        let client = CannedChat("Because the doubling pattern continues.".to_string());
        let text = get_explanation(&client, "Why?", "B").await;
        assert_eq!(text, "Because the doubling pattern continues.");

        let blank = CannedChat("   ".to_string());
        let text = get_explanation(&blank, "Why?", "B").await;
        assert_eq!(text, EXPLANATION_UNAVAILABLE);
    }
}
