//! Sample Data Generator Module
//! Writes synthetic quiz CSV files matching the default schema.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::Rng;
use thiserror::Error;
use tracing::debug;

use crate::data::dataset::TIMESTAMP_FORMAT;
use crate::data::loader::{QUESTIONS_FILE, RESULTS_FILE, SELF_ASSESSMENT_FILE};

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {file}: {source}")]
    Write {
        file: String,
        #[source]
        source: csv::Error,
    },
}

/// Fixed question pool: (text, category, correct answer, point value).
const QUESTION_POOL: [(&str, &str, &str, u32); 10] = [
    (
        "What is the purpose of list comprehension in Python?",
        "Basic Python",
        "To create lists using compact syntax",
        1,
    ),
    (
        "How do you handle exceptions in Python?",
        "Error Handling",
        "Using try-except blocks",
        1,
    ),
    (
        "What is the difference between a list and tuple?",
        "Data Structures",
        "Lists are mutable while tuples are immutable",
        1,
    ),
    (
        "How do you create a virtual environment in Python?",
        "Development Tools",
        "Using python -m venv command",
        1,
    ),
    (
        "What is the purpose of __init__ method in Python classes?",
        "OOP Concepts",
        "To initialize object attributes",
        2,
    ),
    (
        "How do you import modules in Python?",
        "Basic Python",
        "Using the import statement",
        2,
    ),
    (
        "What is the purpose of decorators in Python?",
        "Advanced Python",
        "To modify function behavior without changing code",
        2,
    ),
    (
        "How do you read files in Python?",
        "File Operations",
        "Using the open() function with appropriate mode",
        2,
    ),
    (
        "What is the difference between append and extend in lists?",
        "Data Structures",
        "Append adds one element while extend adds multiple elements",
        3,
    ),
    (
        "What is the purpose of context managers in Python?",
        "Advanced Python",
        "To ensure proper resource management",
        3,
    ),
];

/// Categories covered by the self-assessment file, in header order.
const ASSESSMENT_CATEGORIES: [&str; 7] = [
    "Basic Python",
    "Error Handling",
    "Data Structures",
    "OOP Concepts",
    "Advanced Python",
    "File Operations",
    "Development Tools",
];

const WRONG_ANSWER: &str = "Wrong Answer";

/// Generate the three sample CSV files for `num_users` users.
///
/// Creates `out_dir` if absent and overwrites existing files. Answers are
/// drawn from a per-user skill level so quiz results and self-assessments
/// correlate; only the schema shape is deterministic.
pub fn generate(num_users: u32, out_dir: &Path) -> Result<(), GeneratorError> {
    fs::create_dir_all(out_dir).map_err(|source| GeneratorError::CreateDir {
        path: out_dir.display().to_string(),
        source,
    })?;

    write_questions(out_dir)?;
    write_results_and_assessments(num_users, out_dir)?;
    Ok(())
}

fn csv_writer(out_dir: &Path, file: &str) -> Result<csv::Writer<fs::File>, GeneratorError> {
    let path = out_dir.join(file);
    debug!(path = %path.display(), "writing sample CSV");
    csv::Writer::from_path(&path).map_err(|source| GeneratorError::Write {
        file: file.to_string(),
        source,
    })
}

fn write_questions(out_dir: &Path) -> Result<(), GeneratorError> {
    let write_err = |source: csv::Error| GeneratorError::Write {
        file: QUESTIONS_FILE.to_string(),
        source,
    };

    let mut writer = csv_writer(out_dir, QUESTIONS_FILE)?;
    writer
        .write_record(["question", "category", "answer", "value"])
        .map_err(write_err)?;
    for (text, category, answer, worth) in QUESTION_POOL {
        let worth = worth.to_string();
        writer
            .write_record([text, category, answer, worth.as_str()])
            .map_err(write_err)?;
    }
    writer.flush().map_err(|e| write_err(e.into()))?;
    Ok(())
}

fn write_results_and_assessments(num_users: u32, out_dir: &Path) -> Result<(), GeneratorError> {
    let results_err = |source: csv::Error| GeneratorError::Write {
        file: RESULTS_FILE.to_string(),
        source,
    };
    let assessment_err = |source: csv::Error| GeneratorError::Write {
        file: SELF_ASSESSMENT_FILE.to_string(),
        source,
    };

    let mut results = csv_writer(out_dir, RESULTS_FILE)?;
    let mut header = vec!["date_time".to_string(), "user_id".to_string()];
    header.extend(QUESTION_POOL.iter().map(|q| q.0.to_string()));
    results.write_record(&header).map_err(results_err)?;

    let mut assessments = csv_writer(out_dir, SELF_ASSESSMENT_FILE)?;
    let mut header = vec!["date_time".to_string(), "user_id".to_string()];
    header.extend(ASSESSMENT_CATEGORIES.iter().map(|c| c.to_string()));
    assessments.write_record(&header).map_err(assessment_err)?;

    let base_time = base_timestamp();
    let mut rng = rand::thread_rng();

    for i in 1..=num_users {
        let user_id = format!("user{i}");
        let timestamp = (base_time + Duration::minutes(15 * i as i64))
            .format(TIMESTAMP_FORMAT)
            .to_string();

        // Skill level drives both correctness odds and self-assessment.
        let skill: i32 = rng.gen_range(1..=10);

        let mut row = vec![timestamp.clone(), user_id.clone()];
        for (_, _, answer, _) in QUESTION_POOL {
            if rng.gen::<f64>() < 0.4 + skill as f64 * 0.06 {
                row.push(answer.to_string());
            } else {
                row.push(WRONG_ANSWER.to_string());
            }
        }
        results.write_record(&row).map_err(results_err)?;

        let base_score = (skill + rng.gen_range(-2..=2)).clamp(1, 10);
        let mut row = vec![timestamp, user_id];
        for _ in ASSESSMENT_CATEGORIES {
            let score = (base_score + rng.gen_range(-1..=1)).clamp(1, 10);
            row.push(score.to_string());
        }
        assessments.write_record(&row).map_err(assessment_err)?;
    }

    results.flush().map_err(|e| results_err(e.into()))?;
    assessments.flush().map_err(|e| assessment_err(e.into()))?;
    Ok(())
}

fn base_timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 15)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::tempdir;

    #[test]
    fn writes_three_files_with_requested_user_count() {
        let dir = tempdir().unwrap();
        generate(5, dir.path()).unwrap();

        for file in [QUESTIONS_FILE, RESULTS_FILE, SELF_ASSESSMENT_FILE] {
            assert!(dir.path().join(file).is_file(), "{file} missing");
        }

        for file in [RESULTS_FILE, SELF_ASSESSMENT_FILE] {
            let mut reader = csv::Reader::from_path(dir.path().join(file)).unwrap();
            let users: HashSet<String> = reader
                .records()
                .map(|record| record.unwrap()[1].to_string())
                .collect();
            assert_eq!(users.len(), 5, "{file} user count");
        }
    }

    #[test]
    fn results_header_covers_every_question() {
        let dir = tempdir().unwrap();
        generate(1, dir.path()).unwrap();

        let mut reader = csv::Reader::from_path(dir.path().join(RESULTS_FILE)).unwrap();
        let header: Vec<String> = reader
            .headers()
            .unwrap()
            .iter()
            .map(|h| h.to_string())
            .collect();
        assert_eq!(header.len(), 2 + QUESTION_POOL.len());
        assert_eq!(header[0], "date_time");
        assert_eq!(header[1], "user_id");
        for (text, _, _, _) in QUESTION_POOL {
            assert!(header.contains(&text.to_string()));
        }
    }

    #[test]
    fn timestamps_advance_fifteen_minutes_per_user() {
        let dir = tempdir().unwrap();
        generate(2, dir.path()).unwrap();

        let mut reader = csv::Reader::from_path(dir.path().join(RESULTS_FILE)).unwrap();
        let timestamps: Vec<String> = reader
            .records()
            .map(|record| record.unwrap()[0].to_string())
            .collect();
        assert_eq!(timestamps, vec!["2024-03-15 09:15", "2024-03-15 09:30"]);
    }

    #[test]
    fn overwrites_existing_files() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(QUESTIONS_FILE), "stale").unwrap();
        generate(1, dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join(QUESTIONS_FILE)).unwrap();
        assert!(content.starts_with("question,category,answer,value"));
    }

    #[test]
    fn self_assessment_scores_stay_in_range() {
        let dir = tempdir().unwrap();
        generate(20, dir.path()).unwrap();

        let mut reader = csv::Reader::from_path(dir.path().join(SELF_ASSESSMENT_FILE)).unwrap();
        for record in reader.records() {
            let record = record.unwrap();
            for score in record.iter().skip(2) {
                let score: i32 = score.parse().unwrap();
                assert!((1..=10).contains(&score), "score {score} out of range");
            }
        }
    }
}
