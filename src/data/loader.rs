//! CSV Data Loader Module
//! Loads the three input CSV files into a [`QuizDataset`] using Polars,
//! resolving columns through the configured [`ColumnMapping`].

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::config::ColumnMapping;
use crate::data::dataset::{Question, QuizDataset, Response, SelfAssessment, UserRecord};

pub const QUESTIONS_FILE: &str = "questions.csv";
pub const RESULTS_FILE: &str = "results.csv";
pub const SELF_ASSESSMENT_FILE: &str = "self_assessment.csv";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("missing input file: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("column '{column}' not found in {file}")]
    MissingColumn { file: String, column: String },
    #[error("failed to read {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: PolarsError,
    },
    #[error("invalid value in {file}, column '{column}', row {row}")]
    InvalidValue {
        file: String,
        column: String,
        row: usize,
    },
}

/// Loads and joins the three quiz CSV files from one data directory.
pub struct DataLoader {
    data_dir: PathBuf,
    mapping: ColumnMapping,
}

impl DataLoader {
    pub fn new(data_dir: impl AsRef<Path>, mapping: ColumnMapping) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            mapping,
        }
    }

    /// Load all three files and combine them into one dataset.
    ///
    /// Fails if any of the expected files is missing or if a mapped column
    /// is absent from a file's header.
    pub fn load(&self) -> Result<QuizDataset, LoaderError> {
        let questions = self.load_questions()?;
        let mut users = self.load_results(&questions)?;
        self.load_self_assessment(&questions, &mut users)?;
        Ok(QuizDataset::from_parts(questions, users))
    }

    fn read_csv(&self, file: &str) -> Result<DataFrame, LoaderError> {
        let path = self.data_dir.join(file);
        if !path.is_file() {
            return Err(LoaderError::MissingFile(path));
        }

        let df = LazyCsvReader::new(&path)
            .with_infer_schema_length(Some(10_000))
            .with_ignore_errors(true)
            .finish()
            .and_then(|lf| lf.collect())
            .map_err(|source| LoaderError::Csv {
                file: file.to_string(),
                source,
            })?;

        debug!(file, rows = df.height(), "loaded CSV");
        Ok(df)
    }

    fn column<'a>(df: &'a DataFrame, file: &str, name: &str) -> Result<&'a Column, LoaderError> {
        df.column(name).map_err(|_| LoaderError::MissingColumn {
            file: file.to_string(),
            column: name.to_string(),
        })
    }

    fn load_questions(&self) -> Result<Vec<Question>, LoaderError> {
        let df = self.read_csv(QUESTIONS_FILE)?;
        let mapping = &self.mapping;

        let text_col = Self::column(&df, QUESTIONS_FILE, &mapping.question)?;
        let category_col = Self::column(&df, QUESTIONS_FILE, &mapping.category)?;
        let answer_col = Self::column(&df, QUESTIONS_FILE, &mapping.answer)?;
        let value_col = Self::column(&df, QUESTIONS_FILE, &mapping.value)?
            .cast(&DataType::Int64)
            .map_err(|source| LoaderError::Csv {
                file: QUESTIONS_FILE.to_string(),
                source,
            })?;
        let values = value_col.i64().map_err(|source| LoaderError::Csv {
            file: QUESTIONS_FILE.to_string(),
            source,
        })?;

        let invalid = |column: &str, row: usize| LoaderError::InvalidValue {
            file: QUESTIONS_FILE.to_string(),
            column: column.to_string(),
            row,
        };

        let mut questions = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let text = cell_string(text_col, i).ok_or_else(|| invalid(&mapping.question, i))?;
            let category =
                cell_string(category_col, i).ok_or_else(|| invalid(&mapping.category, i))?;
            let answer = cell_string(answer_col, i).ok_or_else(|| invalid(&mapping.answer, i))?;
            let worth = values.get(i).ok_or_else(|| invalid(&mapping.value, i))?;

            questions.push(Question {
                id: format!("Q{}", i + 1),
                text,
                category,
                answer,
                worth: worth.max(0) as u32,
            });
        }

        Ok(questions)
    }

    fn load_results(
        &self,
        questions: &[Question],
    ) -> Result<BTreeMap<String, UserRecord>, LoaderError> {
        let df = self.read_csv(RESULTS_FILE)?;
        let mapping = &self.mapping;

        let time_col = Self::column(&df, RESULTS_FILE, &mapping.date_time)?;
        let user_col = Self::column(&df, RESULTS_FILE, &mapping.user_id)?;

        // One answer column per question text; questions absent from the
        // header are simply unanswered.
        let answer_cols: Vec<Option<&Column>> =
            questions.iter().map(|q| df.column(&q.text).ok()).collect();

        let invalid = |column: &str, row: usize| LoaderError::InvalidValue {
            file: RESULTS_FILE.to_string(),
            column: column.to_string(),
            row,
        };

        let mut users: BTreeMap<String, UserRecord> = BTreeMap::new();
        for i in 0..df.height() {
            let user_id = cell_string(user_col, i).ok_or_else(|| invalid(&mapping.user_id, i))?;
            let timestamp =
                cell_string(time_col, i).ok_or_else(|| invalid(&mapping.date_time, i))?;

            let record = users.entry(user_id).or_default();
            for (question, answer_col) in questions.iter().zip(&answer_cols) {
                let Some(answer_col) = answer_col else {
                    continue;
                };
                let Some(answer) = cell_string(answer_col, i) else {
                    continue;
                };

                let is_correct = answer == question.answer;
                let points_earned = if is_correct { question.worth } else { 0 };
                record.responses.insert(
                    question.id.clone(),
                    Response {
                        timestamp: timestamp.clone(),
                        answer,
                        is_correct,
                        points_earned,
                        worth: question.worth,
                    },
                );
            }
        }

        Ok(users)
    }

    fn load_self_assessment(
        &self,
        questions: &[Question],
        users: &mut BTreeMap<String, UserRecord>,
    ) -> Result<(), LoaderError> {
        let df = self.read_csv(SELF_ASSESSMENT_FILE)?;
        let mapping = &self.mapping;

        let time_col = Self::column(&df, SELF_ASSESSMENT_FILE, &mapping.date_time)?;
        let user_col = Self::column(&df, SELF_ASSESSMENT_FILE, &mapping.user_id)?;

        // Score columns are the header columns named after quiz categories.
        let categories: BTreeSet<&str> = questions.iter().map(|q| q.category.as_str()).collect();
        let mut score_cols: Vec<(String, Column)> = Vec::new();
        for name in df.get_column_names() {
            let name = name.to_string();
            if !categories.contains(name.as_str()) {
                continue;
            }
            let col = Self::column(&df, SELF_ASSESSMENT_FILE, &name)?
                .cast(&DataType::Float64)
                .map_err(|source| LoaderError::Csv {
                    file: SELF_ASSESSMENT_FILE.to_string(),
                    source,
                })?;
            score_cols.push((name, col));
        }

        let invalid = |column: &str, row: usize| LoaderError::InvalidValue {
            file: SELF_ASSESSMENT_FILE.to_string(),
            column: column.to_string(),
            row,
        };

        for i in 0..df.height() {
            let user_id = cell_string(user_col, i).ok_or_else(|| invalid(&mapping.user_id, i))?;
            let timestamp =
                cell_string(time_col, i).ok_or_else(|| invalid(&mapping.date_time, i))?;

            // Assessments for users with no quiz results are dropped.
            let Some(record) = users.get_mut(&user_id) else {
                continue;
            };

            let mut scores = BTreeMap::new();
            for (name, col) in &score_cols {
                let ca = col.f64().map_err(|source| LoaderError::Csv {
                    file: SELF_ASSESSMENT_FILE.to_string(),
                    source,
                })?;
                if let Some(score) = ca.get(i) {
                    scores.insert(name.clone(), score);
                }
            }

            record.self_assessment = Some(SelfAssessment { timestamp, scores });
        }

        Ok(())
    }
}

/// Read one cell as a trimmed string, `None` when null.
fn cell_string(col: &Column, idx: usize) -> Option<String> {
    let val = col.get(idx).ok()?;
    if val.is_null() {
        None
    } else {
        Some(val.to_string().trim_matches('"').to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_fixture(dir: &Path) {
        fs::write(
            dir.join(QUESTIONS_FILE),
            "question,category,answer,value\n\
             First question,Cat A,yes,1\n\
             Second question,Cat B,no,2\n",
        )
        .unwrap();
        fs::write(
            dir.join(RESULTS_FILE),
            "date_time,user_id,First question,Second question\n\
             2024-03-15 09:15,user1,yes,no\n\
             2024-03-15 09:30,user2,yes,maybe\n",
        )
        .unwrap();
        fs::write(
            dir.join(SELF_ASSESSMENT_FILE),
            "date_time,user_id,Cat A,Cat B\n\
             2024-03-15 09:15,user1,8,4\n\
             2024-03-15 09:30,user2,2,9\n",
        )
        .unwrap();
    }

    #[test]
    fn loads_and_scores_responses() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path());

        let loader = DataLoader::new(dir.path(), ColumnMapping::default());
        let dataset = loader.load().unwrap();

        assert_eq!(dataset.questions.len(), 2);
        assert_eq!(dataset.questions[0].id, "Q1");
        assert_eq!(dataset.questions[0].worth, 1);
        assert_eq!(dataset.users.len(), 2);

        let user1 = &dataset.users["user1"];
        assert_eq!(user1.total_score.points_earned, 3);
        assert_eq!(user1.total_score.points_possible, 3);
        assert!((user1.total_score.normalized - 1.0).abs() < 1e-9);

        let user2 = &dataset.users["user2"];
        assert_eq!(user2.total_score.points_earned, 1);
        assert!(!user2.responses["Q2"].is_correct);
        assert_eq!(user2.responses["Q2"].answer, "maybe");

        let assessment = user2.self_assessment.as_ref().unwrap();
        assert_eq!(assessment.scores["Cat A"], 2.0);
        assert_eq!(
            user2.by_category["Cat B"].self_assessment_normalized,
            Some(0.9)
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path());
        fs::remove_file(dir.path().join(RESULTS_FILE)).unwrap();

        let loader = DataLoader::new(dir.path(), ColumnMapping::default());
        match loader.load() {
            Err(LoaderError::MissingFile(path)) => {
                assert!(path.ends_with(RESULTS_FILE));
            }
            other => panic!("expected MissingFile, got {other:?}"),
        }
    }

    #[test]
    fn unmapped_column_is_a_schema_error() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path());

        let mapping = ColumnMapping {
            question: "prompt".to_string(),
            ..ColumnMapping::default()
        };
        let loader = DataLoader::new(dir.path(), mapping);
        match loader.load() {
            Err(LoaderError::MissingColumn { file, column }) => {
                assert_eq!(file, QUESTIONS_FILE);
                assert_eq!(column, "prompt");
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn column_overrides_resolve_renamed_headers() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(QUESTIONS_FILE),
            "prompt,topic,solution,points\nFirst question,Cat A,yes,3\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(RESULTS_FILE),
            "taken_at,participant,First question\n2024-03-15 09:15,user1,yes\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(SELF_ASSESSMENT_FILE),
            "taken_at,participant,Cat A\n2024-03-15 09:15,user1,7\n",
        )
        .unwrap();

        let mapping = ColumnMapping {
            question: "prompt".to_string(),
            category: "topic".to_string(),
            answer: "solution".to_string(),
            value: "points".to_string(),
            date_time: "taken_at".to_string(),
            user_id: "participant".to_string(),
        };
        let dataset = DataLoader::new(dir.path(), mapping).load().unwrap();

        let user = &dataset.users["user1"];
        assert_eq!(user.total_score.points_earned, 3);
        assert_eq!(
            user.by_category["Cat A"].self_assessment_normalized,
            Some(0.7)
        );
    }

    #[test]
    fn questions_missing_from_results_header_are_unanswered() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path());
        fs::write(
            dir.path().join(RESULTS_FILE),
            "date_time,user_id,First question\n2024-03-15 09:15,user1,yes\n",
        )
        .unwrap();

        let dataset = DataLoader::new(dir.path(), ColumnMapping::default())
            .load()
            .unwrap();
        let user1 = &dataset.users["user1"];
        assert_eq!(user1.responses.len(), 1);
        assert_eq!(user1.total_score.points_possible, 1);
    }
}
