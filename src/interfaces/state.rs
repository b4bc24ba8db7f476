use crate::application::use_cases::chart_selector::ChartSelector;
use crate::application::use_cases::data_chat::DataChatUseCase;
use crate::application::use_cases::session_store::SessionStore;
use crate::application::use_cases::upload::UploadUseCase;
use crate::domain::error::{AppError, Result};
use crate::domain::locale::Language;
use crate::domain::table::Table;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::llm_clients::LLMClient;
use crate::infrastructure::spreadsheet::ColumnProfiler;
use std::sync::Arc;
use uuid::Uuid;

pub struct AppState {
    pub config: AppConfig,
    pub sessions: Arc<SessionStore>,
    pub profiler: Arc<ColumnProfiler>,
    pub upload_use_case: UploadUseCase,
    pub data_chat_use_case: DataChatUseCase,
    pub llm_client: Arc<dyn LLMClient + Send + Sync>,
}

impl AppState {
    pub fn new(config: AppConfig, llm_client: Arc<dyn LLMClient + Send + Sync>) -> Self {
        let sessions = Arc::new(SessionStore::with_limits(
            config.history.max_entries,
            config.history.max_sessions,
            config.history.session_ttl(),
        ));
        let profiler = Arc::new(ColumnProfiler::new(config.profile.clone()));
        let selector = Arc::new(ChartSelector::from_config(&config));

        let upload_use_case = UploadUseCase::new(
            Arc::clone(&sessions),
            Arc::clone(&profiler),
            config.upload.clone(),
            config.language,
        );
        let data_chat_use_case = DataChatUseCase::new(
            Arc::clone(&llm_client),
            Arc::clone(&sessions),
            selector,
            Arc::clone(&profiler),
            config.chat.clone(),
            config.marker(),
            config.chart_triggers(),
        );

        Self {
            config,
            sessions,
            profiler,
            upload_use_case,
            data_chat_use_case,
            llm_client,
        }
    }

    pub fn language(&self) -> Language {
        self.config.language
    }

    /// Table of the session's selected upload.
    pub fn current_table(&self, session_id: Uuid) -> Result<Arc<Table>> {
        self.sessions
            .current_table(session_id)?
            .ok_or_else(|| AppError::NotFound(self.language().messages().no_data.to_string()))
    }
}
