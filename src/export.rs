//! JSON Exporter Module
//! Serializes a loaded dataset to a pretty-printed JSON file.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::data::dataset::QuizDataset;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize dataset: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write the dataset as indented JSON, creating parent directories as needed.
pub fn write_json(dataset: &QuizDataset, path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| ExportError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
    }

    let json = serde_json::to_string_pretty(dataset)?;
    fs::write(path, json).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    debug!(path = %path.display(), "exported dataset");
    Ok(())
}

/// Read a previously exported dataset back from disk.
pub fn read_json(path: &Path) -> Result<QuizDataset, ExportError> {
    let raw = fs::read_to_string(path).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::{Question, Response, UserRecord};
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn fixture() -> QuizDataset {
        let questions = vec![Question {
            id: "Q1".to_string(),
            text: "First question".to_string(),
            category: "Cat A".to_string(),
            answer: "yes".to_string(),
            worth: 2,
        }];
        let mut record = UserRecord::default();
        record.responses.insert(
            "Q1".to_string(),
            Response {
                timestamp: "2024-03-15 09:15".to_string(),
                answer: "yes".to_string(),
                is_correct: true,
                points_earned: 2,
                worth: 2,
            },
        );
        let mut users = BTreeMap::new();
        users.insert("user1".to_string(), record);
        QuizDataset::from_parts(questions, users)
    }

    #[test]
    fn json_round_trips_to_an_equal_dataset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raw_data.json");
        let dataset = fixture();

        write_json(&dataset, &path).unwrap();
        let reloaded = read_json(&path).unwrap();

        assert_eq!(reloaded, dataset);
        assert_eq!(reloaded.users.len(), dataset.users.len());
        assert_eq!(reloaded.questions.len(), dataset.questions.len());
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("outputs").join("json").join("raw.json");

        write_json(&fixture(), &path).unwrap();
        assert!(path.is_file());
    }
}
