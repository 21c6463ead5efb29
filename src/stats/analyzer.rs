//! Performance Analyzer Module
//! Derives per-user and per-category statistics from a loaded dataset.

use std::collections::BTreeMap;

use statrs::statistics::Statistics;

use crate::data::dataset::QuizDataset;

/// |difference| below which a self-assessment counts as accurate.
pub const ACCURACY_THRESHOLD: f64 = 0.1;

const PERFORMANCE_WEIGHT: f64 = 0.60;
const ACCURACY_WEIGHT: f64 = 0.20;
const CONSISTENCY_WEIGHT: f64 = 0.20;

/// One user's score in one category, as a percentage.
#[derive(Debug, Clone)]
pub struct CategoryScorePercent {
    pub category: String,
    pub percentage: f64,
}

/// Quiz performance vs self-assessment for one category.
#[derive(Debug, Clone)]
pub struct AssessmentComparison {
    pub category: String,
    pub quiz_normalized: f64,
    pub self_normalized: f64,
    /// quiz_normalized - self_normalized; negative means overestimation.
    pub difference: f64,
}

/// Weighted proficiency score (0-100 components).
#[derive(Debug, Clone)]
pub struct Proficiency {
    pub overall: f64,
    pub performance: f64,
    pub accuracy: f64,
    pub consistency: f64,
}

/// How many categories a user assessed accurately, over, and under.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssessmentCounts {
    pub accurate: usize,
    pub overestimated: usize,
    pub underestimated: usize,
}

#[derive(Debug, Clone)]
pub struct UserAnalysis {
    pub user_id: String,
    /// Earliest response timestamp, for the over-time chart.
    pub timestamp: Option<String>,
    pub points: u32,
    pub possible: u32,
    pub total_percentage: f64,
    pub by_category: Vec<CategoryScorePercent>,
    pub comparisons: Vec<AssessmentComparison>,
    /// Present only when the user has self-assessment comparisons.
    pub proficiency: Option<Proficiency>,
}

impl UserAnalysis {
    /// Classify each comparison against [`ACCURACY_THRESHOLD`]. A negative
    /// difference means the self-assessment was higher than the quiz score.
    pub fn assessment_counts(&self) -> AssessmentCounts {
        let mut counts = AssessmentCounts::default();
        for comparison in &self.comparisons {
            if comparison.difference.abs() < ACCURACY_THRESHOLD {
                counts.accurate += 1;
            } else if comparison.difference < 0.0 {
                counts.overestimated += 1;
            } else {
                counts.underestimated += 1;
            }
        }
        counts
    }
}

/// Cross-user aggregate for one category.
#[derive(Debug, Clone)]
pub struct CategoryAggregate {
    pub category: String,
    /// Total answered questions in this category across all users.
    pub response_count: usize,
    /// Mean of user percentages among users who attempted the category.
    pub average_percentage: f64,
}

#[derive(Debug, Clone)]
pub struct OverallStats {
    pub user_count: usize,
    pub mean_percentage: f64,
    pub std_dev: f64,
}

pub struct PerformanceAnalyzer;

impl PerformanceAnalyzer {
    /// Analyze every user in the dataset, ordered by user id.
    pub fn analyze_users(dataset: &QuizDataset) -> Vec<UserAnalysis> {
        dataset
            .users
            .iter()
            .map(|(user_id, record)| {
                let total_percentage = record.total_score.normalized * 100.0;

                let by_category: Vec<CategoryScorePercent> = record
                    .by_category
                    .iter()
                    .filter(|(_, score)| score.points_possible > 0)
                    .map(|(category, score)| CategoryScorePercent {
                        category: category.clone(),
                        percentage: score.normalized * 100.0,
                    })
                    .collect();

                let comparisons: Vec<AssessmentComparison> = record
                    .by_category
                    .iter()
                    .filter(|(_, score)| score.points_possible > 0)
                    .filter_map(|(category, score)| {
                        let self_normalized = score.self_assessment_normalized?;
                        Some(AssessmentComparison {
                            category: category.clone(),
                            quiz_normalized: score.normalized,
                            self_normalized,
                            difference: score.normalized - self_normalized,
                        })
                    })
                    .collect();

                let timestamp = record
                    .responses
                    .values()
                    .map(|r| r.timestamp.clone())
                    .min();

                UserAnalysis {
                    user_id: user_id.clone(),
                    timestamp,
                    points: record.total_score.points_earned,
                    possible: record.total_score.points_possible,
                    total_percentage,
                    proficiency: Self::proficiency(total_percentage, &comparisons),
                    by_category,
                    comparisons,
                }
            })
            .collect()
    }

    /// Proficiency blends raw performance with how well the user judged
    /// their own ability. Requires at least one comparison.
    fn proficiency(
        total_percentage: f64,
        comparisons: &[AssessmentComparison],
    ) -> Option<Proficiency> {
        if comparisons.is_empty() {
            return None;
        }

        let differences: Vec<f64> = comparisons.iter().map(|c| c.difference).collect();
        let avg_abs_diff =
            differences.iter().map(|d| d.abs()).sum::<f64>() / differences.len() as f64;
        let accuracy = (1.0 - avg_abs_diff) * 100.0;

        let std_dev = if differences.len() > 1 {
            differences.iter().population_std_dev()
        } else {
            0.0
        };
        let consistency = (1.0 - std_dev.min(1.0)) * 100.0;

        let overall = PERFORMANCE_WEIGHT * total_percentage
            + ACCURACY_WEIGHT * accuracy
            + CONSISTENCY_WEIGHT * consistency;

        Some(Proficiency {
            overall,
            performance: total_percentage,
            accuracy,
            consistency,
        })
    }

    /// Response counts and average percentages per category across users.
    pub fn category_aggregates(
        dataset: &QuizDataset,
        analyses: &[UserAnalysis],
    ) -> Vec<CategoryAggregate> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for record in dataset.users.values() {
            for q_id in record.responses.keys() {
                if let Some(question) = dataset.question(q_id) {
                    *counts.entry(question.category.clone()).or_default() += 1;
                }
            }
        }

        let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
        for analysis in analyses {
            for score in &analysis.by_category {
                let entry = sums.entry(score.category.clone()).or_default();
                entry.0 += score.percentage;
                entry.1 += 1;
            }
        }

        dataset
            .metadata
            .categories
            .keys()
            .map(|category| {
                let response_count = counts.get(category).copied().unwrap_or(0);
                let average_percentage = sums
                    .get(category)
                    .map(|(sum, n)| sum / *n as f64)
                    .unwrap_or(0.0);
                CategoryAggregate {
                    category: category.clone(),
                    response_count,
                    average_percentage,
                }
            })
            .collect()
    }

    /// Mean and spread of total percentages across all analyzed users.
    pub fn overall_statistics(users: &[UserAnalysis]) -> OverallStats {
        let percentages: Vec<f64> = users.iter().map(|u| u.total_percentage).collect();
        if percentages.is_empty() {
            return OverallStats {
                user_count: 0,
                mean_percentage: 0.0,
                std_dev: 0.0,
            };
        }

        let std_dev = if percentages.len() > 1 {
            percentages.iter().std_dev()
        } else {
            0.0
        };
        OverallStats {
            user_count: users.len(),
            mean_percentage: percentages.iter().mean(),
            std_dev,
        }
    }
}
