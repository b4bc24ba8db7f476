use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic classification of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Categorical,
    Date,
    Text,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical => write!(f, "categorical"),
            ColumnKind::Date => write!(f, "date"),
            ColumnKind::Text => write!(f, "text"),
        }
    }
}

/// Descriptive statistics for a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub mean: f64,
    /// Sample standard deviation, absent below two values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub kind: ColumnKind,
    pub non_missing_count: usize,
    pub missing_count: usize,
    pub distinct_count: usize,
    /// Only present for numeric columns with at least one value.
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfiledColumn {
    pub name: String,
    #[serde(flatten)]
    pub profile: ColumnProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedColumn {
    pub name: String,
    pub kind: ColumnKind,
}

/// Threshold used by classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// A text column is categorical when distinct values stay below
    /// `categorical_ratio * row_count` (default: 0.5)
    pub categorical_ratio: f64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            categorical_ratio: 0.5,
        }
    }
}

impl ProfileConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.categorical_ratio) {
            return Err("categorical_ratio must be between 0.0 and 1.0".to_string());
        }
        Ok(())
    }
}
