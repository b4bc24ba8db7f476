use crate::domain::chat::ChatMessage;
use crate::domain::profile::ProfiledColumn;
use crate::domain::table::Table;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// One uploaded file with its table and the conversation held about it.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
    pub table: Arc<Table>,
    pub chat_history: Vec<ChatMessage>,
}

impl HistoryEntry {
    pub fn new(file_name: impl Into<String>, table: Arc<Table>) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            uploaded_at: Utc::now(),
            table,
            chat_history: Vec::new(),
        }
    }

    pub fn summary(&self, active: bool) -> HistorySummary {
        HistorySummary {
            id: self.id,
            file_name: self.file_name.clone(),
            uploaded_at: self.uploaded_at,
            row_count: self.table.row_count(),
            column_count: self.table.column_count(),
            message_count: self.chat_history.len(),
            active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub id: Uuid,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
    pub row_count: usize,
    pub column_count: usize,
    pub message_count: usize,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadSummary {
    pub entry_id: Uuid,
    pub file_name: String,
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<String>,
    pub profile: Vec<ProfiledColumn>,
}
