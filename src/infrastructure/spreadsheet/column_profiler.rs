// ============================================================
// COLUMN PROFILER
// ============================================================
// Per-column descriptive statistics and type classification

use crate::domain::profile::{
    ClassifiedColumn, ColumnKind, ColumnProfile, NumericSummary, ProfileConfig, ProfiledColumn,
};
use crate::domain::table::{ColumnDtype, Table};
use std::collections::HashSet;

/// Profiles and classifies table columns
pub struct ColumnProfiler {
    config: ProfileConfig,
}

impl ColumnProfiler {
    pub fn new(config: ProfileConfig) -> Self {
        Self { config }
    }

    /// Profile every column, in table order.
    pub fn profile(&self, table: &Table) -> Vec<ProfiledColumn> {
        (0..table.column_count())
            .map(|idx| ProfiledColumn {
                name: table.columns()[idx].name.clone(),
                profile: self.profile_column(table, idx),
            })
            .collect()
    }

    /// Classify every column, in table order.
    pub fn classify(&self, table: &Table) -> Vec<ClassifiedColumn> {
        (0..table.column_count())
            .map(|idx| ClassifiedColumn {
                name: table.columns()[idx].name.clone(),
                kind: self.classify_column(table, idx),
            })
            .collect()
    }

    /// First match wins: numeric dtype, date dtype, then the distinct ratio.
    pub fn classify_column(&self, table: &Table, idx: usize) -> ColumnKind {
        match table.columns()[idx].dtype {
            ColumnDtype::Numeric => ColumnKind::Numeric,
            ColumnDtype::DateTime => ColumnKind::Date,
            ColumnDtype::Text => {
                let threshold = self.config.categorical_ratio * table.row_count() as f64;
                if (distinct_count(table, idx) as f64) < threshold {
                    ColumnKind::Categorical
                } else {
                    ColumnKind::Text
                }
            }
        }
    }

    fn profile_column(&self, table: &Table, idx: usize) -> ColumnProfile {
        let kind = self.classify_column(table, idx);
        let missing_count = table.column_values(idx).filter(|v| v.is_missing()).count();

        let numeric = if kind == ColumnKind::Numeric {
            summarize(&numeric_values(table, idx))
        } else {
            None
        };

        ColumnProfile {
            kind,
            non_missing_count: table.row_count() - missing_count,
            missing_count,
            distinct_count: distinct_count(table, idx),
            numeric,
        }
    }
}

pub(crate) fn distinct_count(table: &Table, idx: usize) -> usize {
    table
        .column_values(idx)
        .filter_map(|v| v.key())
        .collect::<HashSet<_>>()
        .len()
}

pub(crate) fn numeric_values(table: &Table, idx: usize) -> Vec<f64> {
    table
        .column_values(idx)
        .filter_map(|v| v.as_number())
        .collect()
}

fn summarize(values: &[f64]) -> Option<NumericSummary> {
    let mean = mean(values)?;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(NumericSummary {
        mean,
        std: sample_std(values),
        min,
        max,
    })
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1).
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

pub(crate) fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::CellValue;
    use chrono::NaiveDate;

    fn num(n: f64) -> CellValue {
        CellValue::Number(n)
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn sample_table() -> Table {
        let day = |d| {
            CellValue::DateTime(
                NaiveDate::from_ymd_opt(2024, 1, d)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
            )
        };
        Table::new(
            vec!["price".into(), "city".into(), "note".into(), "day".into()],
            vec![
                vec![num(10.0), text("Baku"), text("first"), day(1)],
                vec![num(20.0), text("Baku"), text("second"), day(2)],
                vec![CellValue::Missing, text("Baku"), text("third"), day(3)],
                vec![num(30.0), text("Ganja"), text("fourth"), day(4)],
                vec![CellValue::Missing, text("Baku"), text("fifth"), day(5)],
            ],
        )
    }

    fn profiler() -> ColumnProfiler {
        ColumnProfiler::new(ProfileConfig::default())
    }

    #[test]
    fn classifies_by_dtype_then_distinct_ratio() {
        let kinds: Vec<ColumnKind> = profiler()
            .classify(&sample_table())
            .into_iter()
            .map(|c| c.kind)
            .collect();

        assert_eq!(
            kinds,
            vec![
                ColumnKind::Numeric,
                ColumnKind::Categorical,
                ColumnKind::Text,
                ColumnKind::Date
            ]
        );
    }

    #[test]
    fn classification_is_deterministic() {
        let table = sample_table();
        let profiler = profiler();
        assert_eq!(profiler.classify(&table), profiler.classify(&table));
    }

    #[test]
    fn ratio_boundary_is_exclusive() {
        // 2 distinct values over 4 rows is exactly 50%, so not categorical
        let table = Table::new(
            vec!["c".into()],
            vec![vec![text("a")], vec![text("a")], vec![text("b")], vec![text("b")]],
        );
        assert_eq!(profiler().classify_column(&table, 0), ColumnKind::Text);

        let relaxed = ColumnProfiler::new(ProfileConfig {
            categorical_ratio: 0.75,
        });
        assert_eq!(relaxed.classify_column(&table, 0), ColumnKind::Categorical);
    }

    #[test]
    fn numeric_profile_has_statistics() {
        let profile = profiler().profile(&sample_table());
        let price = &profile[0];

        assert_eq!(price.name, "price");
        assert_eq!(price.profile.non_missing_count, 3);
        assert_eq!(price.profile.missing_count, 2);
        assert_eq!(price.profile.distinct_count, 3);

        let stats = price.profile.numeric.as_ref().unwrap();
        assert_eq!(stats.mean, 20.0);
        assert_eq!(stats.std, Some(10.0));
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 30.0);
    }

    #[test]
    fn non_numeric_profiles_omit_statistics() {
        let profile = profiler().profile(&sample_table());

        for column in &profile[1..] {
            assert!(column.profile.numeric.is_none());
        }
        assert_eq!(profile[1].profile.distinct_count, 2);

        let json = serde_json::to_value(&profile[1]).unwrap();
        assert!(json.get("mean").is_none());
        assert_eq!(json["kind"], "categorical");
    }

    #[test]
    fn single_value_has_no_std() {
        let table = Table::new(vec!["n".into()], vec![vec![num(4.0)]]);
        let stats = profiler().profile(&table)[0].profile.numeric.clone().unwrap();
        assert_eq!(stats.std, None);
        assert_eq!(stats.mean, 4.0);
    }

    #[test]
    fn median_of_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }
}
