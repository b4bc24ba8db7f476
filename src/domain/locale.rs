// ============================================================
// LOCALE
// ============================================================
// User-visible text for every supported language: keyword sets,
// chart labels, prompt fragments and error messages

use crate::domain::chart::{ChartKind, ColumnRequirement};
use crate::domain::profile::ColumnKind;
use serde::{Deserialize, Serialize};

/// Language used for replies, chart labels and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "az")]
    Azerbaijani,
    #[serde(rename = "en")]
    English,
}

/// Static text table for one language.
#[derive(Debug)]
pub struct LocaleTexts {
    pub marker: &'static str,

    // Errors
    pub invalid_file: &'static str,
    pub only_excel: &'static str,
    pub file_too_large: &'static str,
    pub empty_file: &'static str,
    pub empty_query: &'static str,
    pub query_too_long: &'static str,
    pub no_data: &'static str,
    pub not_found: &'static str,
    pub error_occurred: &'static str,
    pub processing_error: &'static str,
    pub chart_error: &'static str,

    // Column kinds
    pub numeric: &'static str,
    pub categorical: &'static str,
    pub date: &'static str,
    pub text: &'static str,
    pub distinct_values: &'static str,

    // Prompt
    pub assistant_intro: &'static str,
    pub data_about: &'static str,
    pub total_rows: &'static str,
    pub column_count: &'static str,
    pub columns: &'static str,
    pub tasks_header: &'static str,
    pub tasks: [&'static str; 4],
    pub formats_header: &'static str,
    pub plain_answer: &'static str,
    pub statistics_answer: &'static str,
    pub summary_answer: &'static str,
    pub clarify: &'static str,
    pub user_question: &'static str,
    pub sample_header: &'static str,
    pub closing: &'static str,

    // Reports
    pub column_header: &'static str,
    pub column_statistics_header: &'static str,
    pub mean_value: &'static str,
    pub mean: &'static str,
    pub minimum: &'static str,
    pub maximum: &'static str,
    pub std_dev: &'static str,
    pub median: &'static str,
    pub unique_values: &'static str,
    pub most_frequent: &'static str,
    pub count: &'static str,
}

static AZ: LocaleTexts = LocaleTexts {
    marker: "vizualizasiya",
    invalid_file: "Yanlış fayl formatı",
    only_excel: "Zəhmət olmasa yalnız Excel fayllarını (.xlsx və ya .xls) yükləyin.",
    file_too_large: "Fayl həddən artıq böyükdür",
    empty_file: "Məlumatlar boşdur",
    empty_query: "Sual başa düşülmədi",
    query_too_long: "Sual çox uzundur",
    no_data: "Zəhmət olmasa əvvəlcə fayl yükləyin",
    not_found: "Məlumat tapılmadı",
    error_occurred: "Xəta baş verdi",
    processing_error: "Məlumatlar emal edilərkən xəta baş verdi",
    chart_error: "Vizualizasiya yaradılarkən xəta baş verdi",
    numeric: "rəqəmsal",
    categorical: "kateqoriyal",
    date: "tarix",
    text: "mətn",
    distinct_values: "unikal dəyər",
    assistant_intro: "Sən Excel məlumatlarını analiz edən Azərbaycan dilində chatbot-san.",
    data_about: "Məlumatlar haqqında məlumat:",
    total_rows: "Ümumi sətir sayı",
    column_count: "Sütun sayı",
    columns: "Sütunlar",
    tasks_header: "Sənin vəzifən:",
    tasks: [
        "İstifadəçinin sualını başa düşmək",
        "Məlumatları analiz etmək",
        "Azərbaycan dilində cavab vermək",
        "Lazım olduqda vizualizasiya təklif etmək",
    ],
    formats_header: "Cavablarını aşağıdakı formatlarda verə bilərsən:",
    plain_answer: "Sadə mətn cavabı",
    statistics_answer: "Statistik məlumatlar",
    summary_answer: "Xülasə",
    clarify: "Əgər sualı başa düşməsən, istifadəçidən daha aydın soruşmağını xahiş et.",
    user_question: "İstifadəçi sualı",
    sample_header: "Məlumatların nümunəsi (ilk {n} sətir):",
    closing: "Zəhmət olmasa, bu suala Azərbaycan dilində cavab ver və lazım olduqda vizualizasiya təklif et.",
    column_header: "{column} sütunu üçün:",
    column_statistics_header: "{column} sütunu üçün statistika:",
    mean_value: "Orta qiymət",
    mean: "Orta",
    minimum: "Minimum",
    maximum: "Maksimum",
    std_dev: "Standart kənarlaşma",
    median: "Median",
    unique_values: "Unikal dəyərlər",
    most_frequent: "Ən çox təkrarlanan",
    count: "Say",
};

static EN: LocaleTexts = LocaleTexts {
    marker: "visualization",
    invalid_file: "Invalid file format",
    only_excel: "Please upload only Excel files (.xlsx or .xls).",
    file_too_large: "The file is too large",
    empty_file: "The data is empty",
    empty_query: "The question could not be understood",
    query_too_long: "The question is too long",
    no_data: "Please upload a file first",
    not_found: "Not found",
    error_occurred: "An error occurred",
    processing_error: "An error occurred while processing the data",
    chart_error: "Failed to create the visualization",
    numeric: "numeric",
    categorical: "categorical",
    date: "date",
    text: "text",
    distinct_values: "distinct values",
    assistant_intro: "You are a chatbot that analyses Excel data and answers in English.",
    data_about: "About the data:",
    total_rows: "Total rows",
    column_count: "Column count",
    columns: "Columns",
    tasks_header: "Your tasks:",
    tasks: [
        "Understand the user's question",
        "Analyse the data",
        "Answer in English",
        "Suggest a visualization when useful",
    ],
    formats_header: "You may answer in the following formats:",
    plain_answer: "Plain text answer",
    statistics_answer: "Statistical information",
    summary_answer: "Summary",
    clarify: "If you do not understand the question, ask the user to rephrase it more clearly.",
    user_question: "User question",
    sample_header: "Data sample (first {n} rows):",
    closing: "Please answer this question in English and suggest a visualization when useful.",
    column_header: "For column {column}:",
    column_statistics_header: "Statistics for column {column}:",
    mean_value: "Mean",
    mean: "Mean",
    minimum: "Minimum",
    maximum: "Maximum",
    std_dev: "Standard deviation",
    median: "Median",
    unique_values: "Unique values",
    most_frequent: "Most frequent",
    count: "Count",
};

/// Title and axis labels for one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLabels {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Azerbaijani => "az",
            Language::English => "en",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "az" => Some(Language::Azerbaijani),
            "en" => Some(Language::English),
            _ => None,
        }
    }

    pub fn messages(&self) -> &'static LocaleTexts {
        match self {
            Language::Azerbaijani => &AZ,
            Language::English => &EN,
        }
    }

    /// Default marker token the assistant is told to include when a chart would help.
    pub fn marker(&self) -> &'static str {
        self.messages().marker
    }

    /// Reply words that signal a chart would help.
    pub fn default_chart_triggers(&self) -> &'static [&'static str] {
        match self {
            Language::Azerbaijani => &[
                "vizualizasiya",
                "qrafik",
                "diaqram",
                "histoqram",
                "pasta",
                "xətti",
                "sütun",
            ],
            Language::English => &["visualization", "chart", "diagram", "histogram", "plot"],
        }
    }

    pub fn kind_label(&self, kind: ColumnKind) -> &'static str {
        let texts = self.messages();
        match kind {
            ColumnKind::Numeric => texts.numeric,
            ColumnKind::Categorical => texts.categorical,
            ColumnKind::Date => texts.date,
            ColumnKind::Text => texts.text,
        }
    }

    /// Keyword sets in priority order. The first set with a hit decides the chart.
    pub fn default_chart_keywords(&self) -> Vec<(ChartKind, Vec<&'static str>)> {
        match self {
            Language::Azerbaijani => vec![
                (ChartKind::Histogram, vec!["histoqram", "paylanma"]),
                (ChartKind::Line, vec!["xətti", "trend"]),
                (ChartKind::Bar, vec!["sütun", "bar"]),
                (ChartKind::Pie, vec!["pasta", "dairə"]),
            ],
            Language::English => vec![
                (ChartKind::Histogram, vec!["histogram", "distribution"]),
                (ChartKind::Line, vec!["line", "trend"]),
                (ChartKind::Bar, vec!["bar", "column"]),
                (ChartKind::Pie, vec!["pie", "share"]),
            ],
        }
    }

    /// `columns` are the bound columns in binding order.
    pub fn chart_labels(&self, kind: ChartKind, columns: &[&str]) -> ChartLabels {
        let first = columns.first().copied().unwrap_or_default();
        let second = columns.get(1).copied().unwrap_or_default();
        let count = self.messages().count;

        let (title, x_title, y_title) = match (self, kind) {
            (Language::Azerbaijani, ChartKind::Histogram | ChartKind::Pie) => (
                format!("{} sütununun paylanması", first),
                first.to_string(),
                count.to_string(),
            ),
            (Language::English, ChartKind::Histogram) => (
                format!("Distribution of {}", first),
                first.to_string(),
                count.to_string(),
            ),
            (Language::English, ChartKind::Pie) => (
                format!("Share of {}", first),
                first.to_string(),
                count.to_string(),
            ),
            (Language::Azerbaijani, ChartKind::Line) => (
                format!("{} - {} asılılığı", second, first),
                first.to_string(),
                second.to_string(),
            ),
            (Language::English, ChartKind::Line) => (
                format!("{} over {}", second, first),
                first.to_string(),
                second.to_string(),
            ),
            (Language::Azerbaijani, ChartKind::Bar) => (
                format!("{} üzrə {} orta dəyərləri", first, second),
                first.to_string(),
                format!("Orta {}", second),
            ),
            (Language::English, ChartKind::Bar) => (
                format!("Average {} by {}", second, first),
                first.to_string(),
                format!("Average {}", second),
            ),
            (Language::Azerbaijani, ChartKind::Scatter) => (
                format!("{} - {} əlaqəsi", second, first),
                first.to_string(),
                second.to_string(),
            ),
            (Language::English, ChartKind::Scatter) => (
                format!("Relationship between {} and {}", second, first),
                first.to_string(),
                second.to_string(),
            ),
        };

        ChartLabels {
            title,
            x_title,
            y_title,
        }
    }

    pub fn unsupported_chart_message(
        &self,
        kind: ChartKind,
        requirement: ColumnRequirement,
    ) -> String {
        if requirement == ColumnRequirement::RowsWithValues {
            return match self {
                Language::Azerbaijani => format!(
                    "{} qrafiki üçün seçilmiş sütunlarda dəyərləri olan sətir tapılmadı",
                    self.kind_name(kind)
                ),
                Language::English => format!(
                    "No rows have values in the columns chosen for the {} chart",
                    self.kind_name(kind)
                ),
            };
        }

        let base = match (self, kind) {
            (Language::Azerbaijani, ChartKind::Histogram) => {
                "Histoqram üçün rəqəmsal sütunlar tələb olunur"
            }
            (Language::Azerbaijani, ChartKind::Line) => {
                "Xətti qrafik üçün ən azı iki rəqəmsal sütun tələb olunur"
            }
            (Language::Azerbaijani, ChartKind::Bar) => {
                "Sütun qrafiki üçün həm kateqoriyal, həm də rəqəmsal sütunlar tələb olunur"
            }
            (Language::Azerbaijani, ChartKind::Pie) => {
                "Pasta diaqramı üçün kateqoriyal sütunlar tələb olunur"
            }
            (Language::Azerbaijani, ChartKind::Scatter) => {
                "Nöqtəli qrafik üçün ən azı iki rəqəmsal sütun tələb olunur"
            }
            (Language::English, ChartKind::Histogram) => "Histogram requires numeric columns",
            (Language::English, ChartKind::Line) => {
                "Line chart requires at least two numeric columns"
            }
            (Language::English, ChartKind::Bar) => {
                "Bar chart requires both categorical and numeric columns"
            }
            (Language::English, ChartKind::Pie) => "Pie chart requires categorical columns",
            (Language::English, ChartKind::Scatter) => {
                "Scatter plot requires at least two numeric columns"
            }
        };

        if requirement == kind.requirement() {
            base.to_string()
        } else {
            format!("{} ({})", base, requirement)
        }
    }

    pub fn kind_name(&self, kind: ChartKind) -> &'static str {
        match (self, kind) {
            (Language::Azerbaijani, ChartKind::Histogram) => "Histoqram",
            (Language::Azerbaijani, ChartKind::Line) => "Xətti",
            (Language::Azerbaijani, ChartKind::Bar) => "Sütun",
            (Language::Azerbaijani, ChartKind::Pie) => "Pasta",
            (Language::Azerbaijani, ChartKind::Scatter) => "Nöqtəli",
            (Language::English, kind) => kind.as_str(),
        }
    }

    pub fn marker_instruction(&self, marker: &str) -> String {
        match self {
            Language::Azerbaijani => format!("Vizualizasiya təklifi ({} açar sözü ilə)", marker),
            Language::English => format!(
                "Visualization suggestion (include the keyword \"{}\")",
                marker
            ),
        }
    }
}

/// Lower-cases text for keyword matching. Azerbaijani dotted capital I
/// lower-cases to `i` plus a combining dot, which is dropped so that
/// "HİSTOQRAM" still matches "histoqram".
pub fn fold_case(text: &str) -> String {
    text.to_lowercase().replace('\u{307}', "")
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for lang in [Language::Azerbaijani, Language::English] {
            assert_eq!(Language::from_code(lang.code()), Some(lang));
        }
        assert_eq!(Language::from_code(" EN "), Some(Language::English));
        assert_eq!(Language::from_code("fr"), None);
    }

    #[test]
    fn fold_case_handles_dotted_capital_i() {
        assert_eq!(fold_case("HİSTOQRAM"), "histoqram");
        assert_eq!(fold_case("Xətti Trend"), "xətti trend");
    }

    #[test]
    fn default_is_azerbaijani() {
        assert_eq!(Language::default(), Language::Azerbaijani);
        assert_eq!(Language::default().marker(), "vizualizasiya");
    }

    #[test]
    fn keyword_priority_is_histogram_line_bar_pie() {
        for lang in [Language::Azerbaijani, Language::English] {
            let order: Vec<ChartKind> = lang
                .default_chart_keywords()
                .into_iter()
                .map(|(kind, _)| kind)
                .collect();
            assert_eq!(
                order,
                vec![
                    ChartKind::Histogram,
                    ChartKind::Line,
                    ChartKind::Bar,
                    ChartKind::Pie
                ]
            );
        }
    }

    #[test]
    fn bar_labels_follow_category_then_value() {
        let labels = Language::Azerbaijani.chart_labels(ChartKind::Bar, &["Region", "Satış"]);
        assert_eq!(labels.title, "Region üzrə Satış orta dəyərləri");
        assert_eq!(labels.x_title, "Region");
        assert_eq!(labels.y_title, "Orta Satış");
    }

    #[test]
    fn empty_rows_message_names_the_real_condition() {
        let message = Language::English
            .unsupported_chart_message(ChartKind::Line, ColumnRequirement::RowsWithValues);
        assert_eq!(
            message,
            "No rows have values in the columns chosen for the line chart"
        );
        assert!(!message.contains("two numeric"));

        let message = Language::Azerbaijani
            .unsupported_chart_message(ChartKind::Bar, ColumnRequirement::RowsWithValues);
        assert!(message.starts_with("Sütun qrafiki üçün"));
    }

    #[test]
    fn scatter_title_puts_y_first() {
        let labels = Language::Azerbaijani.chart_labels(ChartKind::Scatter, &["x", "y"]);
        assert_eq!(labels.title, "y - x əlaqəsi");
    }
}
