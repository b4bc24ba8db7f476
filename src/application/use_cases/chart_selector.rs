//! Query-to-chart selection.
//!
//! A query resolves to a chart kind through an ordered list of keyword
//! rules; the first rule with a keyword contained in the lower-cased query
//! wins and scatter is the fallback. The kind then binds to the first
//! suitable columns in table order.

use crate::domain::chart::{
    BarGroup, ChartData, ChartKind, ChartSpec, ColumnRequirement, PieSlice, Point,
};
use crate::domain::error::{AppError, Result};
use crate::domain::locale::{fold_case, Language};
use crate::domain::table::{CellKey, ColumnDtype, Table};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::spreadsheet::numeric_values;
use std::collections::HashMap;
use tracing::debug;

/// Ordered (kind, keywords) pairs. Position in the list is priority.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordRules {
    rules: Vec<(ChartKind, Vec<String>)>,
}

impl KeywordRules {
    pub fn new(rules: Vec<(ChartKind, Vec<String>)>) -> Self {
        let rules = rules
            .into_iter()
            .map(|(kind, keywords)| {
                let keywords = keywords
                    .iter()
                    .map(|k| fold_case(k.trim()))
                    .filter(|k| !k.is_empty())
                    .collect();
                (kind, keywords)
            })
            .collect();
        Self { rules }
    }

    pub fn for_language(language: Language) -> Self {
        Self::new(
            language
                .default_chart_keywords()
                .into_iter()
                .map(|(kind, words)| (kind, words.into_iter().map(String::from).collect()))
                .collect(),
        )
    }

    pub fn rules(&self) -> &[(ChartKind, Vec<String>)] {
        &self.rules
    }

    /// Single pass over the rules; scatter when nothing matches.
    pub fn resolve(&self, query: &str) -> ChartKind {
        let query = fold_case(query);
        self.rules
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| query.contains(k.as_str())))
            .map(|(kind, _)| *kind)
            .unwrap_or(ChartKind::Scatter)
    }
}

pub struct ChartSelector {
    rules: KeywordRules,
    language: Language,
}

impl ChartSelector {
    pub fn new(rules: KeywordRules, language: Language) -> Self {
        Self { rules, language }
    }

    pub fn for_language(language: Language) -> Self {
        Self::new(KeywordRules::for_language(language), language)
    }

    /// Configured keyword sets replace the language defaults when present.
    pub fn from_config(config: &AppConfig) -> Self {
        let rules = if config.charts.keywords.is_empty() {
            KeywordRules::for_language(config.language)
        } else {
            KeywordRules::new(
                config
                    .charts
                    .keywords
                    .iter()
                    .map(|rule| (rule.kind, rule.keywords.clone()))
                    .collect(),
            )
        };
        Self::new(rules, config.language)
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn rules(&self) -> &KeywordRules {
        &self.rules
    }

    pub fn select_chart(&self, table: &Table, query: &str) -> Result<ChartSpec> {
        let kind = self.rules.resolve(query);
        debug!(kind = %kind, "chart kind resolved from query");
        self.build(table, kind)
    }

    /// Binds `kind` to the first suitable columns and computes its data.
    pub fn build(&self, table: &Table, kind: ChartKind) -> Result<ChartSpec> {
        let unsupported = || AppError::UnsupportedVisualization {
            kind,
            requirement: kind.requirement(),
        };

        let no_rows = || AppError::UnsupportedVisualization {
            kind,
            requirement: ColumnRequirement::RowsWithValues,
        };

        let numeric = table.columns_of(ColumnDtype::Numeric);
        // Blank columns infer as text but carry no categories.
        let categorical: Vec<usize> = table
            .columns_of(ColumnDtype::Text)
            .into_iter()
            .filter(|idx| table.column_values(*idx).any(|v| !v.is_missing()))
            .collect();

        let (columns, data) = match kind {
            ChartKind::Histogram => {
                let x = *numeric.first().ok_or_else(unsupported)?;
                (vec![x], ChartData::Values { values: numeric_values(table, x) })
            }
            ChartKind::Line | ChartKind::Scatter => {
                let (x, y) = match numeric.as_slice() {
                    [x, y, ..] => (*x, *y),
                    _ => return Err(unsupported()),
                };
                let points = paired_points(table, x, y);
                if points.is_empty() {
                    return Err(no_rows());
                }
                (vec![x, y], ChartData::Points { points })
            }
            ChartKind::Bar => {
                let (cat, val) = match (categorical.first(), numeric.first()) {
                    (Some(cat), Some(val)) => (*cat, *val),
                    _ => return Err(unsupported()),
                };
                let bars = group_means(table, cat, val);
                if bars.is_empty() {
                    return Err(no_rows());
                }
                (vec![cat, val], ChartData::Bars { bars })
            }
            ChartKind::Pie => {
                let cat = *categorical.first().ok_or_else(unsupported)?;
                let slices = value_counts(table, cat);
                if slices.is_empty() {
                    return Err(no_rows());
                }
                (vec![cat], ChartData::Slices { slices })
            }
        };

        let names: Vec<&str> = columns
            .iter()
            .map(|idx| table.columns()[*idx].name.as_str())
            .collect();
        let labels = self.language.chart_labels(kind, &names);

        debug!(kind = %kind, columns = ?names, "chart built");

        Ok(ChartSpec {
            kind,
            columns: names.into_iter().map(String::from).collect(),
            title: labels.title,
            x_title: labels.x_title,
            y_title: labels.y_title,
            data,
        })
    }
}

/// Selects a chart with the default (Azerbaijani) keyword sets.
pub fn select_chart(table: &Table, query: &str) -> Result<ChartSpec> {
    ChartSelector::for_language(Language::default()).select_chart(table, query)
}

fn paired_points(table: &Table, x: usize, y: usize) -> Vec<Point> {
    table
        .rows()
        .iter()
        .filter_map(|row| {
            let x = row.get(x)?.as_number()?;
            let y = row.get(y)?.as_number()?;
            Some(Point { x, y })
        })
        .collect()
}

/// Arithmetic mean of `val` per distinct `cat`, categories in first-seen order.
/// Rows missing either cell are skipped.
fn group_means(table: &Table, cat: usize, val: usize) -> Vec<BarGroup> {
    let mut positions: HashMap<CellKey<'_>, usize> = HashMap::new();
    let mut groups: Vec<(String, f64, usize)> = Vec::new();

    for row in table.rows() {
        let (Some(category), Some(value)) = (row.get(cat), row.get(val)) else {
            continue;
        };
        let (Some(key), Some(value)) = (category.key(), value.as_number()) else {
            continue;
        };

        let pos = *positions.entry(key).or_insert_with(|| {
            groups.push((category.to_string(), 0.0, 0));
            groups.len() - 1
        });
        groups[pos].1 += value;
        groups[pos].2 += 1;
    }

    groups
        .into_iter()
        .map(|(category, sum, count)| BarGroup {
            category,
            mean: sum / count as f64,
            count,
        })
        .collect()
}

/// Frequency of each distinct non-missing value, most frequent first.
/// Ties keep first-seen order.
fn value_counts(table: &Table, cat: usize) -> Vec<PieSlice> {
    let mut positions: HashMap<CellKey<'_>, usize> = HashMap::new();
    let mut slices: Vec<PieSlice> = Vec::new();

    for value in table.column_values(cat) {
        let Some(key) = value.key() else {
            continue;
        };
        let pos = *positions.entry(key).or_insert_with(|| {
            slices.push(PieSlice {
                label: value.to_string(),
                count: 0,
            });
            slices.len() - 1
        });
        slices[pos].count += 1;
    }

    slices.sort_by(|a, b| b.count.cmp(&a.count));
    slices
}
