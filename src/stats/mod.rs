//! Stats module - performance analysis

mod analyzer;

pub use analyzer::{
    AssessmentComparison, AssessmentCounts, CategoryAggregate, CategoryScorePercent,
    OverallStats, PerformanceAnalyzer, Proficiency, UserAnalysis, ACCURACY_THRESHOLD,
};
