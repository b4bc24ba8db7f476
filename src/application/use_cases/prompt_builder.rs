use crate::domain::locale::Language;
use crate::domain::table::Table;
use crate::infrastructure::spreadsheet::ColumnProfiler;

/// Builds the system and user messages sent with every question.
pub struct PromptBuilder<'a> {
    language: Language,
    marker: &'a str,
    sample_rows: usize,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(language: Language, marker: &'a str, sample_rows: usize) -> Self {
        Self {
            language,
            marker,
            sample_rows,
        }
    }

    /// Table shape, per-column kind and distinct count, and answering rules.
    pub fn system_message(&self, table: &Table, profiler: &ColumnProfiler) -> String {
        let texts = self.language.messages();
        let mut out = String::new();

        out.push_str(&format!("{}\n", texts.assistant_intro));
        out.push_str(&format!("{}\n", texts.data_about));
        out.push_str(&format!("- {}: {}\n", texts.total_rows, table.row_count()));
        out.push_str(&format!("- {}: {}\n", texts.column_count, table.column_count()));
        out.push_str(&format!("- {}:\n", texts.columns));

        for column in profiler.profile(table) {
            out.push_str(&format!(
                "{} ({}): {} {}\n",
                column.name,
                self.language.kind_label(column.profile.kind),
                column.profile.distinct_count,
                texts.distinct_values
            ));
        }

        out.push_str(&format!("\n{}\n", texts.tasks_header));
        for (i, task) in texts.tasks.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, task));
        }

        out.push_str(&format!("\n{}\n", texts.formats_header));
        out.push_str(&format!("- {}\n", texts.plain_answer));
        out.push_str(&format!("- {}\n", texts.statistics_answer));
        out.push_str(&format!("- {}\n", self.language.marker_instruction(self.marker)));
        out.push_str(&format!("- {}\n", texts.summary_answer));

        out.push('\n');
        out.push_str(texts.clarify);
        out
    }

    /// The literal query followed by the first rows of the table.
    pub fn user_message(&self, query: &str, table: &Table) -> String {
        let texts = self.language.messages();
        let mut out = String::new();

        out.push_str(&format!("{}: {}\n\n", texts.user_question, query));
        out.push_str(&format!(
            "{}\n",
            texts
                .sample_header
                .replace("{n}", &self.sample_rows.to_string())
        ));
        out.push_str(&render_rows(table, self.sample_rows));
        out.push('\n');
        out.push_str(texts.closing);
        out
    }
}

/// Fixed-width text rendering of the header and the first `n` rows, with a
/// leading row-number column. Missing cells render empty.
pub fn render_rows(table: &Table, n: usize) -> String {
    let rows = table.head(n);
    let index_width = rows.len().saturating_sub(1).to_string().len();

    let mut widths: Vec<usize> = table
        .columns()
        .iter()
        .map(|c| c.name.chars().count())
        .collect();
    let rendered: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.cells().iter().map(|c| c.to_string()).collect())
        .collect();
    for cells in &rendered {
        for (idx, cell) in cells.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    out.push_str(&format!("{:width$}", "", width = index_width));
    for (name, width) in table.column_names().iter().zip(&widths) {
        out.push_str(&format!("  {:>width$}", name, width = *width));
    }
    out.push('\n');

    for (i, cells) in rendered.iter().enumerate() {
        out.push_str(&format!("{:<width$}", i, width = index_width));
        for (cell, width) in cells.iter().zip(&widths) {
            out.push_str(&format!("  {:>width$}", cell, width = *width));
        }
        out.push('\n');
    }
    out
}
