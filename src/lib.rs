mod app;
mod application;
mod domain;
mod infrastructure;
mod interfaces;

pub use app::run;
pub use application::use_cases::chart_selector::select_chart;
pub use application::use_cases::summary::{statistics, summary};
pub use application::{ChartSelector, DataChatUseCase, KeywordRules, SessionStore, UploadUseCase};
pub use domain::chart::{
    BarGroup, ChartData, ChartKind, ChartSpec, ColumnRequirement, PieSlice, Point,
};
pub use domain::chat::{ChatMessage, ChatRole, QueryAnswer};
pub use domain::error::{AppError, Result};
pub use domain::llm_config::{LLMConfig, LLMProvider};
pub use domain::locale::Language;
pub use domain::profile::{
    ClassifiedColumn, ColumnKind, ColumnProfile, NumericSummary, ProfileConfig, ProfiledColumn,
};
pub use domain::table::{CellValue, Column, ColumnDtype, Row, Table, MISSING_PLACEHOLDER};
pub use infrastructure::config::AppConfig;
pub use infrastructure::llm_clients::{LLMClient, RouterClient};
pub use infrastructure::spreadsheet::{classify, load, profile, ColumnProfiler, WorkbookReader};
pub use interfaces::AppState;
