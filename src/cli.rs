//! Command-Line Interface
//! Subcommand and flag definitions for the quiz analysis tool.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::ColumnMapping;

#[derive(Parser)]
#[command(version, about = "Quiz Analysis Management Tool", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate sample quiz data
    Generate {
        /// Number of users
        #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..))]
        users: u32,
        /// Output directory
        #[arg(long, default_value = "data")]
        output: PathBuf,
    },
    /// Export raw data as JSON
    Raw {
        #[command(flatten)]
        input: InputArgs,
        /// Output JSON file
        #[arg(long, default_value = "raw_data.json")]
        output: PathBuf,
    },
    /// Generate visualization plots
    Visualize {
        #[command(flatten)]
        input: InputArgs,
        /// Output directory
        #[arg(long, default_value = "visualizations")]
        output: PathBuf,
    },
    /// Generate PDF report (reserved, not implemented)
    Report {
        #[command(flatten)]
        input: InputArgs,
        /// Output directory
        #[arg(long, default_value = "report")]
        output: PathBuf,
    },
}

/// Input location and column-name overrides shared by the loading commands.
#[derive(Args)]
pub struct InputArgs {
    /// Data directory
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,
    /// Question column name
    #[arg(long, default_value = "question")]
    pub question_col: String,
    /// Category column name
    #[arg(long, default_value = "category")]
    pub category_col: String,
    /// Answer column name
    #[arg(long, default_value = "answer")]
    pub answer_col: String,
    /// Value/points column name
    #[arg(long, default_value = "value")]
    pub value_col: String,
    /// Datetime column name
    #[arg(long, default_value = "date_time")]
    pub datetime_col: String,
    /// User ID column name
    #[arg(long, default_value = "user_id")]
    pub userid_col: String,
}

impl InputArgs {
    pub fn column_mapping(&self) -> ColumnMapping {
        ColumnMapping {
            question: self.question_col.clone(),
            category: self.category_col.clone(),
            answer: self.answer_col.clone(),
            value: self.value_col.clone(),
            date_time: self.datetime_col.clone(),
            user_id: self.userid_col.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn zero_users_is_rejected() {
        let result = Cli::try_parse_from(["quiz-analytics", "generate", "--users", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn column_flags_build_the_mapping() {
        let cli = Cli::try_parse_from([
            "quiz-analytics",
            "raw",
            "--question-col",
            "prompt",
            "--userid-col",
            "participant",
        ])
        .unwrap();

        let Command::Raw { input, output } = cli.command else {
            panic!("expected raw subcommand");
        };
        let mapping = input.column_mapping();
        assert_eq!(mapping.question, "prompt");
        assert_eq!(mapping.user_id, "participant");
        assert_eq!(mapping.category, "category");
        assert_eq!(output, PathBuf::from("raw_data.json"));
    }
}
