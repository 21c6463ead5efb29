//! Column Mapping Configuration
//! Maps the six canonical column roles to the names used in the input files.

/// Source column name for each canonical role.
///
/// Defaults are the canonical names themselves; every field can be overridden
/// from the CLI. Whether a mapped name exists in a file header is checked by
/// the loader, not at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub question: String,
    pub category: String,
    pub answer: String,
    pub value: String,
    pub date_time: String,
    pub user_id: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            question: "question".to_string(),
            category: "category".to_string(),
            answer: "answer".to_string(),
            value: "value".to_string(),
            date_time: "date_time".to_string(),
            user_id: "user_id".to_string(),
        }
    }
}
