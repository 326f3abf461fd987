// src/bank.rs

use serde::Deserialize;
use std::path::Path;

use crate::error::AppError;

/// Raw row from a CSV question bank, before normalization.
///
/// Every field defaults to an empty string so a sparse or ragged export
/// never fails the whole batch; only a wholesale read failure of the file
/// is a hard error.
#[derive(Debug, Clone, Deserialize)]
pub struct BankRow {
    /// Native sequence number of the row in the bank. Kept for reference;
    /// session ids are assigned positionally, not from this.
    #[serde(default)]
    pub sq: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub option_a: String,
    #[serde(default)]
    pub option_b: String,
    #[serde(default)]
    pub option_c: String,
    #[serde(default)]
    pub option_d: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default, rename = "type")]
    pub question_type: String,
    #[serde(default)]
    pub category: String,
}

/// Reads a whole question bank into row records.
///
/// Rows that fail to deserialize are logged and skipped (best effort);
/// a missing or unreadable file returns `AppError::BankUnavailable`.
pub fn load_bank(path: &Path) -> Result<Vec<BankRow>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| {
            AppError::BankUnavailable(format!(
                "cannot read question bank {}: {}",
                path.display(),
                e
            ))
        })?;

    let mut rows = Vec::new();
    for result in reader.deserialize::<BankRow>() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                tracing::warn!("Skipping malformed row in {}: {}", path.display(), e);
            }
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_temp_bank(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("bank_{}.csv", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_rows_from_csv() {
        let path = write_temp_bank(
            "sq,question,option_a,option_b,option_c,option_d,answer,type,category\n\
             1,What is 2 + 2?,3,4,5,6,b,aptitude,arithmetic\n\
             2,\"Which uses LIFO, strictly?\",Queue,Stack,List,Tree,B,technical,dsa\n",
        );

        let rows = load_bank(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].question, "What is 2 + 2?");
        assert_eq!(rows[0].answer, "b");
        assert_eq!(rows[1].question, "Which uses LIFO, strictly?");
        assert_eq!(rows[1].question_type, "technical");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let path = write_temp_bank(
            "sq,question,option_a,option_b,option_c,option_d,answer,type,category\n\
             1,Lonely question,,,,,,,\n",
        );

        let rows = load_bank(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].option_a, "");
        assert_eq!(rows[0].answer, "");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_file_is_bank_unavailable() {
        let path = PathBuf::from("/definitely/not/here.csv");
        let err = load_bank(&path).unwrap_err();
        assert!(matches!(err, AppError::BankUnavailable(_)));
    }
}
