//! Quiz Analytics - Quiz Result Analysis Tool
//!
//! Reads quiz-result CSV files, generates sample data, exports normalized
//! JSON and renders performance charts.

mod charts;
mod cli;
mod config;
mod data;
mod export;
mod stats;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

use charts::ChartRenderer;
use cli::{Cli, Command};
use data::{generator, DataLoader};
use stats::PerformanceAnalyzer;

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Generate { users, output } => {
            info!("generating sample data for {} users", users);
            generator::generate(users, &output)?;
            info!("sample data written to {}", output.display());
        }
        Command::Raw { input, output } => {
            info!("exporting raw data from {}", input.data_dir.display());
            let loader = DataLoader::new(&input.data_dir, input.column_mapping());
            let dataset = loader.load()?;
            export::write_json(&dataset, &output)?;
            info!("raw data exported to {}", output.display());
        }
        Command::Visualize { input, output } => {
            info!("generating visualizations from {}", input.data_dir.display());
            let loader = DataLoader::new(&input.data_dir, input.column_mapping());
            let dataset = loader.load()?;

            let users = PerformanceAnalyzer::analyze_users(&dataset);
            for user in &users {
                debug!(
                    "user {}: {}/{} points",
                    user.user_id, user.points, user.possible
                );
            }
            let categories = PerformanceAnalyzer::category_aggregates(&dataset, &users);
            let overall = PerformanceAnalyzer::overall_statistics(&users);
            info!(
                "analyzed {} users, mean score {:.1}% (std dev {:.1})",
                overall.user_count, overall.mean_percentage, overall.std_dev
            );
            let mut counts = stats::AssessmentCounts::default();
            for user in &users {
                let c = user.assessment_counts();
                counts.accurate += c.accurate;
                counts.overestimated += c.overestimated;
                counts.underestimated += c.underestimated;
            }
            info!(
                "self-assessments: {} accurate, {} overestimated, {} underestimated",
                counts.accurate, counts.overestimated, counts.underestimated
            );
            let assessed: Vec<_> = users.iter().filter_map(|u| u.proficiency.as_ref()).collect();
            if !assessed.is_empty() {
                let n = assessed.len() as f64;
                info!(
                    "mean proficiency {:.1} (performance {:.1}, accuracy {:.1}, consistency {:.1})",
                    assessed.iter().map(|p| p.overall).sum::<f64>() / n,
                    assessed.iter().map(|p| p.performance).sum::<f64>() / n,
                    assessed.iter().map(|p| p.accuracy).sum::<f64>() / n,
                    assessed.iter().map(|p| p.consistency).sum::<f64>() / n,
                );
            }

            ChartRenderer::render_all(&users, &categories, &output)?;
            info!("visualizations written to {}", output.display());
        }
        Command::Report { input, output } => {
            info!(
                "report requested for {} into {}",
                input.data_dir.display(),
                output.display()
            );
            bail!("report generation is not implemented yet");
        }
    }

    Ok(())
}
