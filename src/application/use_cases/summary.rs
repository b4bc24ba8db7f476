use crate::domain::locale::Language;
use crate::domain::table::{CellKey, CellValue, ColumnDtype, Table};
use crate::infrastructure::spreadsheet::{distinct_count, mean, median, numeric_values, sample_std};
use std::collections::HashMap;

/// Shape of the table plus mean, min and max of every numeric column.
pub fn summary(table: &Table, lang: Language) -> String {
    let texts = lang.messages();
    let mut lines = vec![
        format!("{}: {}", texts.total_rows, table.row_count()),
        format!("{}: {}", texts.column_count, table.column_count()),
    ];

    for (idx, column) in table.columns().iter().enumerate() {
        if column.dtype != ColumnDtype::Numeric {
            continue;
        }
        let values = numeric_values(table, idx);
        lines.push(format!(
            "\n{}",
            texts.column_header.replace("{column}", &column.name)
        ));
        lines.push(format!("{}: {}", texts.mean_value, decimal(mean(&values))));
        lines.push(format!(
            "{}: {}",
            texts.minimum,
            decimal(values.iter().copied().reduce(f64::min))
        ));
        lines.push(format!(
            "{}: {}",
            texts.maximum,
            decimal(values.iter().copied().reduce(f64::max))
        ));
    }

    lines.join("\n")
}

/// Mean, standard deviation and median for numeric columns; distinct count and
/// most frequent value for everything else.
pub fn statistics(table: &Table, lang: Language) -> String {
    let texts = lang.messages();
    let mut lines = Vec::new();

    for (idx, column) in table.columns().iter().enumerate() {
        lines.push(format!(
            "\n{}",
            texts.column_statistics_header.replace("{column}", &column.name)
        ));

        if column.dtype == ColumnDtype::Numeric {
            let values = numeric_values(table, idx);
            lines.push(format!("{}: {}", texts.mean, decimal(mean(&values))));
            lines.push(format!("{}: {}", texts.std_dev, decimal(sample_std(&values))));
            lines.push(format!("{}: {}", texts.median, decimal(median(&values))));
        } else {
            lines.push(format!(
                "{}: {}",
                texts.unique_values,
                distinct_count(table, idx)
            ));
            lines.push(format!(
                "{}: {}",
                texts.most_frequent,
                most_frequent(table, idx)
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "-".to_string())
            ));
        }
    }

    lines.join("\n")
}

fn decimal(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "-".to_string())
}

/// Ties go to the value seen first.
fn most_frequent(table: &Table, idx: usize) -> Option<&CellValue> {
    let mut counts: HashMap<CellKey<'_>, (usize, usize)> = HashMap::new();
    let mut values: Vec<&CellValue> = Vec::new();

    for value in table.column_values(idx) {
        let Some(key) = value.key() else {
            continue;
        };
        let entry = counts.entry(key).or_insert_with(|| {
            values.push(value);
            (values.len() - 1, 0)
        });
        entry.1 += 1;
    }

    counts
        .into_values()
        .max_by(|(pos_a, count_a), (pos_b, count_b)| {
            count_a.cmp(count_b).then(pos_b.cmp(pos_a))
        })
        .map(|(pos, _)| values[pos])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::new(
            vec!["city".into(), "sales".into()],
            vec![
                vec![CellValue::Text("Gəncə".into()), CellValue::Number(10.0)],
                vec![CellValue::Text("Bakı".into()), CellValue::Number(20.0)],
                vec![CellValue::Text("Bakı".into()), CellValue::Missing],
                vec![CellValue::Text("Gəncə".into()), CellValue::Number(40.0)],
            ],
        )
    }

    #[test]
    fn summary_lists_shape_and_numeric_columns() {
        let text = summary(&table(), Language::Azerbaijani);
        assert_eq!(
            text,
            "Ümumi sətir sayı: 4\nSütun sayı: 2\n\nsales sütunu üçün:\nOrta qiymət: 23.33\nMinimum: 10.00\nMaksimum: 40.00"
        );
    }

    #[test]
    fn statistics_cover_every_column() {
        let text = statistics(&table(), Language::English);
        assert_eq!(
            text,
            "\nStatistics for column city:\nUnique values: 2\nMost frequent: Gəncə\n\nStatistics for column sales:\nMean: 23.33\nStandard deviation: 15.28\nMedian: 20.00"
        );
    }

    #[test]
    fn single_value_has_no_deviation() {
        let table = Table::new(vec!["n".into()], vec![vec![CellValue::Number(3.0)]]);
        assert!(statistics(&table, Language::English).contains("Standard deviation: -"));
    }

    #[test]
    fn empty_column_has_no_mode() {
        let table = Table::new(
            vec!["n".into(), "t".into()],
            vec![vec![CellValue::Number(1.0), CellValue::Missing]],
        );
        assert!(statistics(&table, Language::English).contains("Most frequent: -"));
    }
}
