//! Static Chart Renderer
//! Renders the analysis results as PNG files, one image per chart type.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDateTime};
use plotters::prelude::*;
use tracing::debug;

use crate::data::dataset::TIMESTAMP_FORMAT;
use crate::stats::{CategoryAggregate, UserAnalysis, ACCURACY_THRESHOLD};

const CHART_SIZE: (u32, u32) = (1024, 768);
const BUCKET_WIDTH: f64 = 10.0;
const BUCKET_COUNT: usize = 10;

pub const CATEGORY_PERFORMANCE: &str = "category_performance.png";
pub const CATEGORY_RESPONSE_COUNTS: &str = "category_response_counts.png";
pub const OVERALL_SCORE_DISTRIBUTION: &str = "overall_score_distribution.png";
pub const ASSESSMENT_ACCURACY: &str = "assessment_accuracy.png";
pub const ACCURACY_OVER_TIME: &str = "accuracy_over_time.png";
pub const PROFICIENCY_DISTRIBUTION: &str = "proficiency_distribution.png";

/// File name of every chart a successful run produces.
pub const CHART_FILES: [&str; 6] = [
    CATEGORY_PERFORMANCE,
    CATEGORY_RESPONSE_COUNTS,
    OVERALL_SCORE_DISTRIBUTION,
    ASSESSMENT_ACCURACY,
    ACCURACY_OVER_TIME,
    PROFICIENCY_DISTRIBUTION,
];

pub struct ChartRenderer;

impl ChartRenderer {
    /// Render all chart types into `out_dir`, creating it if absent.
    pub fn render_all(
        users: &[UserAnalysis],
        categories: &[CategoryAggregate],
        out_dir: &Path,
    ) -> Result<()> {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("creating output directory {}", out_dir.display()))?;

        Self::render_category_performance(categories, &out_dir.join(CATEGORY_PERFORMANCE))?;
        Self::render_category_response_counts(
            categories,
            &out_dir.join(CATEGORY_RESPONSE_COUNTS),
        )?;
        Self::render_score_distribution(users, &out_dir.join(OVERALL_SCORE_DISTRIBUTION))?;
        Self::render_assessment_accuracy(users, &out_dir.join(ASSESSMENT_ACCURACY))?;
        Self::render_accuracy_over_time(users, &out_dir.join(ACCURACY_OVER_TIME))?;
        Self::render_proficiency_distribution(users, &out_dir.join(PROFICIENCY_DISTRIBUTION))?;
        Ok(())
    }

    fn render_category_performance(
        categories: &[CategoryAggregate],
        path: &Path,
    ) -> Result<()> {
        debug!(path = %path.display(), "rendering category performance");
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let labels: Vec<&str> = categories.iter().map(|c| c.category.as_str()).collect();
        let n = labels.len().max(1);

        let mut chart = ChartBuilder::on(&root)
            .caption("Average Score by Category", ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(120)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..n as f64, 0f64..100f64)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&|x: &f64| {
                labels
                    .get(x.floor() as usize)
                    .map(|l| l.to_string())
                    .unwrap_or_default()
            })
            .y_desc("Score Percentage")
            .draw()?;

        chart.draw_series(categories.iter().enumerate().map(|(i, c)| {
            Rectangle::new(
                [(i as f64 + 0.15, 0.0), (i as f64 + 0.85, c.average_percentage)],
                BLUE.mix(0.6).filled(),
            )
        }))?;

        root.present()?;
        Ok(())
    }

    fn render_category_response_counts(
        categories: &[CategoryAggregate],
        path: &Path,
    ) -> Result<()> {
        debug!(path = %path.display(), "rendering category response counts");
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let labels: Vec<&str> = categories.iter().map(|c| c.category.as_str()).collect();
        let n = labels.len().max(1);
        let max_count = categories
            .iter()
            .map(|c| c.response_count)
            .max()
            .unwrap_or(0)
            .max(1) as f64;

        let mut chart = ChartBuilder::on(&root)
            .caption("Responses by Category", ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(120)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..n as f64, 0f64..max_count * 1.1)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&|x: &f64| {
                labels
                    .get(x.floor() as usize)
                    .map(|l| l.to_string())
                    .unwrap_or_default()
            })
            .y_desc("Response Count")
            .draw()?;

        chart.draw_series(categories.iter().enumerate().map(|(i, c)| {
            Rectangle::new(
                [
                    (i as f64 + 0.15, 0.0),
                    (i as f64 + 0.85, c.response_count as f64),
                ],
                GREEN.mix(0.6).filled(),
            )
        }))?;

        root.present()?;
        Ok(())
    }

    fn render_score_distribution(users: &[UserAnalysis], path: &Path) -> Result<()> {
        debug!(path = %path.display(), "rendering score distribution");
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let percentages: Vec<f64> = users.iter().map(|u| u.total_percentage).collect();
        let buckets = histogram_buckets(&percentages);
        let max_count = buckets.iter().copied().max().unwrap_or(0).max(1) as f64;

        let mut chart = ChartBuilder::on(&root)
            .caption("Distribution of Overall Quiz Scores", ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..100f64, 0f64..max_count * 1.1)?;

        chart
            .configure_mesh()
            .x_desc("Score Percentage")
            .y_desc("Number of Users")
            .draw()?;

        chart.draw_series(buckets.iter().enumerate().map(|(i, &count)| {
            let x0 = i as f64 * BUCKET_WIDTH;
            Rectangle::new(
                [(x0 + 0.5, 0.0), (x0 + BUCKET_WIDTH - 0.5, count as f64)],
                BLUE.mix(0.6).filled(),
            )
        }))?;

        root.present()?;
        Ok(())
    }

    fn render_assessment_accuracy(users: &[UserAnalysis], path: &Path) -> Result<()> {
        debug!(path = %path.display(), "rendering assessment accuracy");
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                "Self-Assessment vs Actual Performance",
                ("sans-serif", 28),
            )
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..1f64, 0f64..1f64)?;

        chart
            .configure_mesh()
            .x_desc("Normalized Quiz Score")
            .y_desc("Normalized Self-Assessment")
            .draw()?;

        // Perfect assessment diagonal plus the accuracy band around it.
        chart
            .draw_series(LineSeries::new([(0.0, 0.0), (1.0, 1.0)], &BLACK))?
            .label("Perfect Assessment")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLACK));
        for offset in [ACCURACY_THRESHOLD, -ACCURACY_THRESHOLD] {
            chart.draw_series(LineSeries::new(
                [(0.0, offset), (1.0, 1.0 + offset)],
                BLACK.mix(0.3),
            ))?;
        }

        let mut categories: Vec<&str> = users
            .iter()
            .flat_map(|u| u.comparisons.iter().map(|c| c.category.as_str()))
            .collect();
        categories.sort_unstable();
        categories.dedup();

        for (idx, category) in categories.iter().enumerate() {
            let color = Palette99::pick(idx).to_rgba();
            let points: Vec<(f64, f64)> = users
                .iter()
                .flat_map(|u| u.comparisons.iter())
                .filter(|c| c.category == *category)
                .map(|c| (c.quiz_normalized, c.self_normalized))
                .collect();

            chart
                .draw_series(
                    points
                        .iter()
                        .map(|&(x, y)| Circle::new((x, y), 5, color.filled())),
                )?
                .label(*category)
                .legend(move |(x, y)| Circle::new((x + 10, y), 5, color.filled()));
        }

        chart
            .configure_series_labels()
            .border_style(&BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()?;

        root.present()?;
        Ok(())
    }

    fn render_accuracy_over_time(users: &[UserAnalysis], path: &Path) -> Result<()> {
        debug!(path = %path.display(), "rendering accuracy over time");
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let mut points: Vec<(NaiveDateTime, f64)> = users
            .iter()
            .filter_map(|u| {
                let raw = u.timestamp.as_deref()?;
                let parsed = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).ok()?;
                Some((parsed, u.total_percentage))
            })
            .collect();
        points.sort_by_key(|(t, _)| *t);

        let (start, end) = match (points.first(), points.last()) {
            (Some(&(start, _)), Some(&(end, _))) if start != end => (start, end),
            (Some(&(start, _)), _) => (start, start + Duration::hours(1)),
            _ => {
                let start = NaiveDateTime::default();
                (start, start + Duration::hours(1))
            }
        };

        let mut chart = ChartBuilder::on(&root)
            .caption("Quiz Scores over Time", ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(60)
            .build_cartesian_2d(RangedDateTime::from(start..end), 0f64..100f64)?;

        chart
            .configure_mesh()
            .x_label_formatter(&|t: &NaiveDateTime| t.format("%m-%d %H:%M").to_string())
            .x_desc("Attempt Time")
            .y_desc("Score Percentage")
            .draw()?;

        chart.draw_series(LineSeries::new(points.iter().copied(), &BLUE))?;
        chart.draw_series(
            points
                .iter()
                .map(|&(t, p)| Circle::new((t, p), 4, BLUE.filled())),
        )?;

        root.present()?;
        Ok(())
    }

    fn render_proficiency_distribution(users: &[UserAnalysis], path: &Path) -> Result<()> {
        debug!(path = %path.display(), "rendering proficiency distribution");
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let scores: Vec<f64> = users
            .iter()
            .filter_map(|u| u.proficiency.as_ref())
            .map(|p| p.overall)
            .collect();
        let buckets = histogram_buckets(&scores);
        let max_count = buckets.iter().copied().max().unwrap_or(0).max(1) as f64;

        let mut chart = ChartBuilder::on(&root)
            .caption("Distribution of Proficiency Scores", ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..100f64, 0f64..max_count * 1.1)?;

        chart
            .configure_mesh()
            .x_desc("Proficiency Score")
            .y_desc("Number of Users")
            .draw()?;

        chart.draw_series(buckets.iter().enumerate().map(|(i, &count)| {
            let x0 = i as f64 * BUCKET_WIDTH;
            Rectangle::new(
                [(x0 + 0.5, 0.0), (x0 + BUCKET_WIDTH - 0.5, count as f64)],
                MAGENTA.mix(0.5).filled(),
            )
        }))?;

        root.present()?;
        Ok(())
    }
}

/// Count percentages into ten-point buckets; 100 lands in the top bucket.
fn histogram_buckets(percentages: &[f64]) -> [usize; BUCKET_COUNT] {
    let mut buckets = [0usize; BUCKET_COUNT];
    for &p in percentages {
        let idx = ((p / BUCKET_WIDTH).floor() as usize).min(BUCKET_COUNT - 1);
        buckets[idx] += 1;
    }
    buckets
}
