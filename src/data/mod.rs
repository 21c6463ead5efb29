//! Data module - dataset model, CSV loading and sample data generation

pub mod dataset;
pub mod generator;
mod loader;

pub use loader::{DataLoader, LoaderError, QUESTIONS_FILE, RESULTS_FILE, SELF_ASSESSMENT_FILE};
