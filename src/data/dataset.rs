//! Quiz Dataset Model
//! In-memory joined representation of the three input CSV files.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Maximum score on the self-assessment scale.
pub const SELF_ASSESSMENT_MAX: f64 = 10.0;

/// Timestamp format used in the input files.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One quiz question from `questions.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Sequential id (`Q1`, `Q2`, ...) assigned in file order.
    pub id: String,
    pub text: String,
    pub category: String,
    pub answer: String,
    pub worth: u32,
}

/// One user's answer to one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub timestamp: String,
    pub answer: String,
    pub is_correct: bool,
    pub points_earned: u32,
    pub worth: u32,
}

/// One user's self-assessment row: a 1-10 score per category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfAssessment {
    pub timestamp: String,
    pub scores: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub points_earned: u32,
    pub points_possible: u32,
    pub normalized: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub points_earned: u32,
    pub points_possible: u32,
    pub normalized: f64,
    /// Self-assessment score divided by [`SELF_ASSESSMENT_MAX`], when the
    /// user assessed this category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_assessment_normalized: Option<f64>,
}

/// Everything known about one user: responses keyed by question id plus
/// derived scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub responses: BTreeMap<String, Response>,
    pub self_assessment: Option<SelfAssessment>,
    #[serde(default)]
    pub total_score: ScoreSummary,
    #[serde(default)]
    pub by_category: BTreeMap<String, CategoryScore>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryMeta {
    pub question_count: u32,
    pub total_points: u32,
    pub has_self_assessment: bool,
    pub self_assessment_max: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelfAssessmentMeta {
    pub categories: Vec<String>,
    pub max_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub total_questions: usize,
    pub total_users: usize,
    pub total_points_possible: u32,
    pub categories: BTreeMap<String, CategoryMeta>,
    pub self_assessment: SelfAssessmentMeta,
}

/// The joined dataset for one command invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizDataset {
    pub questions: Vec<Question>,
    pub users: BTreeMap<String, UserRecord>,
    pub metadata: Metadata,
}

impl QuizDataset {
    /// Combine parsed questions and user records into a dataset, filling in
    /// per-user totals, per-category scores and metadata.
    pub fn from_parts(questions: Vec<Question>, mut users: BTreeMap<String, UserRecord>) -> Self {
        let by_id: BTreeMap<&str, &Question> =
            questions.iter().map(|q| (q.id.as_str(), q)).collect();

        for record in users.values_mut() {
            let mut total = ScoreSummary::default();
            let mut by_category: BTreeMap<String, CategoryScore> = BTreeMap::new();

            for (q_id, response) in &record.responses {
                let Some(question) = by_id.get(q_id.as_str()) else {
                    continue;
                };
                let entry = by_category.entry(question.category.clone()).or_default();
                entry.points_earned += response.points_earned;
                entry.points_possible += response.worth;
                total.points_earned += response.points_earned;
                total.points_possible += response.worth;
            }

            for (category, score) in by_category.iter_mut() {
                score.normalized = ratio(score.points_earned, score.points_possible);
                if let Some(assessment) = &record.self_assessment {
                    if let Some(&raw) = assessment.scores.get(category) {
                        score.self_assessment_normalized = Some(raw / SELF_ASSESSMENT_MAX);
                    }
                }
            }

            total.normalized = ratio(total.points_earned, total.points_possible);
            record.total_score = total;
            record.by_category = by_category;
        }

        let mut categories: BTreeMap<String, CategoryMeta> = BTreeMap::new();
        for question in &questions {
            let meta = categories.entry(question.category.clone()).or_default();
            meta.question_count += 1;
            meta.total_points += question.worth;
        }

        let mut assessed: BTreeSet<String> = BTreeSet::new();
        for record in users.values() {
            if let Some(assessment) = &record.self_assessment {
                for category in assessment.scores.keys() {
                    assessed.insert(category.clone());
                    if let Some(meta) = categories.get_mut(category) {
                        meta.has_self_assessment = true;
                        meta.self_assessment_max = SELF_ASSESSMENT_MAX;
                    }
                }
            }
        }

        let metadata = Metadata {
            total_questions: questions.len(),
            total_users: users.len(),
            total_points_possible: questions.iter().map(|q| q.worth).sum(),
            categories,
            self_assessment: SelfAssessmentMeta {
                categories: assessed.into_iter().collect(),
                max_score: SELF_ASSESSMENT_MAX,
            },
        };

        Self {
            questions,
            users,
            metadata,
        }
    }

    /// Look up a question by its id.
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

fn ratio(earned: u32, possible: u32) -> f64 {
    if possible > 0 {
        earned as f64 / possible as f64
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, category: &str, worth: u32) -> Question {
        Question {
            id: id.to_string(),
            text: format!("text {id}"),
            category: category.to_string(),
            answer: "right".to_string(),
            worth,
        }
    }

    fn response(correct: bool, worth: u32) -> Response {
        Response {
            timestamp: "2024-03-15 09:15".to_string(),
            answer: if correct { "right" } else { "wrong" }.to_string(),
            is_correct: correct,
            points_earned: if correct { worth } else { 0 },
            worth,
        }
    }

    #[test]
    fn combines_scores_and_metadata() {
        let questions = vec![
            question("Q1", "Cat A", 2),
            question("Q2", "Cat B", 1),
            question("Q3", "Cat B", 1),
        ];
        let mut record = UserRecord::default();
        record.responses.insert("Q1".to_string(), response(true, 2));
        record.responses.insert("Q2".to_string(), response(true, 1));
        record.responses.insert("Q3".to_string(), response(false, 1));
        record.self_assessment = Some(SelfAssessment {
            timestamp: "2024-03-15 09:15".to_string(),
            scores: BTreeMap::from([("Cat A".to_string(), 8.0)]),
        });

        let mut users = BTreeMap::new();
        users.insert("user1".to_string(), record);
        let dataset = QuizDataset::from_parts(questions, users);

        let user = &dataset.users["user1"];
        assert_eq!(user.total_score.points_earned, 3);
        assert_eq!(user.total_score.points_possible, 4);
        assert!((user.total_score.normalized - 0.75).abs() < 1e-9);

        let cat_a = &user.by_category["Cat A"];
        assert!((cat_a.normalized - 1.0).abs() < 1e-9);
        assert_eq!(cat_a.self_assessment_normalized, Some(0.8));
        let cat_b = &user.by_category["Cat B"];
        assert!((cat_b.normalized - 0.5).abs() < 1e-9);
        assert_eq!(cat_b.self_assessment_normalized, None);

        assert_eq!(dataset.metadata.total_questions, 3);
        assert_eq!(dataset.metadata.total_users, 1);
        assert_eq!(dataset.metadata.total_points_possible, 4);
        assert!(dataset.metadata.categories["Cat A"].has_self_assessment);
        assert!(!dataset.metadata.categories["Cat B"].has_self_assessment);
        assert_eq!(
            dataset.metadata.self_assessment.categories,
            vec!["Cat A".to_string()]
        );
    }

    #[test]
    fn empty_responses_score_zero() {
        let questions = vec![question("Q1", "Cat A", 2)];
        let mut users = BTreeMap::new();
        users.insert("user1".to_string(), UserRecord::default());
        let dataset = QuizDataset::from_parts(questions, users);

        let user = &dataset.users["user1"];
        assert_eq!(user.total_score.points_possible, 0);
        assert_eq!(user.total_score.normalized, 0.0);
        assert!(user.by_category.is_empty());
    }
}
