use serde::{Deserialize, Serialize};
use std::fmt;

/// The five chart templates a query can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Histogram,
    Line,
    Bar,
    Pie,
    Scatter,
}

impl ChartKind {
    /// Column shape the chart needs before it can be drawn.
    pub fn requirement(&self) -> ColumnRequirement {
        match self {
            ChartKind::Histogram => ColumnRequirement::Numeric(1),
            ChartKind::Line | ChartKind::Scatter => ColumnRequirement::Numeric(2),
            ChartKind::Bar => ColumnRequirement::CategoricalAndNumeric,
            ChartKind::Pie => ColumnRequirement::Categorical(1),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Histogram => "histogram",
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::Pie => "pie",
            ChartKind::Scatter => "scatter",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "min", rename_all = "snake_case")]
pub enum ColumnRequirement {
    Numeric(usize),
    Categorical(usize),
    CategoricalAndNumeric,
    /// The columns exist but no row has values in all of them.
    RowsWithValues,
}

impl fmt::Display for ColumnRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRequirement::Numeric(1) => write!(f, "at least 1 numeric column"),
            ColumnRequirement::Numeric(n) => write!(f, "at least {} numeric columns", n),
            ColumnRequirement::Categorical(1) => write!(f, "at least 1 categorical column"),
            ColumnRequirement::Categorical(n) => {
                write!(f, "at least {} categorical columns", n)
            }
            ColumnRequirement::CategoricalAndNumeric => {
                write!(f, "at least 1 categorical and 1 numeric column")
            }
            ColumnRequirement::RowsWithValues => {
                write!(f, "at least 1 row with values in the bound columns")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarGroup {
    pub category: String,
    pub mean: f64,
    /// Rows that contributed to the mean.
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub label: String,
    pub count: usize,
}

/// Kind-specific payload handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ChartData {
    Values { values: Vec<f64> },
    Points { points: Vec<Point> },
    Bars { bars: Vec<BarGroup> },
    Slices { slices: Vec<PieSlice> },
}

/// A chosen chart kind plus everything a renderer needs to draw it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub columns: Vec<String>,
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub data: ChartData,
}

impl ChartSpec {
    pub fn bars(&self) -> &[BarGroup] {
        match &self.data {
            ChartData::Bars { bars } => bars,
            _ => &[],
        }
    }

    pub fn slices(&self) -> &[PieSlice] {
        match &self.data {
            ChartData::Slices { slices } => slices,
            _ => &[],
        }
    }
}
