use crate::application::use_cases::chart_selector::ChartSelector;
use crate::application::use_cases::prompt_builder::PromptBuilder;
use crate::application::use_cases::session_store::SessionStore;
use crate::domain::chart::ChartSpec;
use crate::domain::chat::{ChatMessage, QueryAnswer};
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::domain::locale::Language;
use crate::domain::table::Table;
use crate::infrastructure::config::ChatConfig;
use crate::infrastructure::llm_clients::LLMClient;
use crate::infrastructure::response::{clean_llm_response, contains_any_marker};
use crate::infrastructure::spreadsheet::ColumnProfiler;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub struct DataChatUseCase {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    sessions: Arc<SessionStore>,
    selector: Arc<ChartSelector>,
    profiler: Arc<ColumnProfiler>,
    config: ChatConfig,
    marker: String,
    chart_triggers: Vec<String>,
}

impl DataChatUseCase {
    pub fn new(
        llm_client: Arc<dyn LLMClient + Send + Sync>,
        sessions: Arc<SessionStore>,
        selector: Arc<ChartSelector>,
        profiler: Arc<ColumnProfiler>,
        config: ChatConfig,
        marker: String,
        chart_triggers: Vec<String>,
    ) -> Self {
        Self {
            llm_client,
            sessions,
            selector,
            profiler,
            config,
            marker,
            chart_triggers,
        }
    }

    fn language(&self) -> Language {
        self.selector.language()
    }

    /// Trims the query and enforces the length bounds.
    pub fn validate_query<'q>(&self, query: &'q str) -> Result<&'q str> {
        let texts = self.language().messages();
        let query = query.trim();

        if query.is_empty() {
            return Err(AppError::ValidationError(texts.empty_query.to_string()));
        }
        let length = query.chars().count();
        if length > self.config.max_query_length {
            return Err(AppError::ValidationError(format!(
                "{} ({} > {})",
                texts.query_too_long, length, self.config.max_query_length
            )));
        }
        Ok(query)
    }

    fn current_entry(&self, session_id: Uuid) -> Result<(Uuid, Arc<Table>)> {
        self.sessions.current_entry(session_id)?.ok_or_else(|| {
            AppError::NotFound(self.language().messages().no_data.to_string())
        })
    }

    /// Asks the model about the current table. When the reply carries a
    /// chart trigger word the chart selector runs on the original query; a
    /// chart that cannot be built is reported next to the reply. The
    /// exchange is recorded on the entry that was current when asked.
    pub async fn ask(
        &self,
        config: &LLMConfig,
        session_id: Uuid,
        query: &str,
    ) -> Result<QueryAnswer> {
        let query = self.validate_query(query)?;
        let (entry_id, table) = self.current_entry(session_id)?;

        let builder = PromptBuilder::new(self.language(), &self.marker, self.config.sample_rows);
        let system_prompt = builder.system_message(&table, &self.profiler);
        let user_prompt = builder.user_message(query, &table);

        let raw_reply = self
            .llm_client
            .generate(config, &system_prompt, &user_prompt)
            .await
            .map_err(|e| {
                warn!(session = %session_id, error = %e, "language model call failed");
                e
            })?;

        let reply = clean_llm_response(&raw_reply);
        let needs_chart = contains_any_marker(&reply, self.chart_triggers.as_slice());

        let (chart, chart_error) = if needs_chart {
            match self.selector.select_chart(&table, query) {
                Ok(spec) => (Some(spec), None),
                Err(e) => (None, Some(self.chart_error_message(&e))),
            }
        } else {
            (None, None)
        };

        let exchange = vec![ChatMessage::user(query), ChatMessage::assistant(reply.clone())];
        match self.sessions.append_chat(session_id, entry_id, exchange) {
            Err(AppError::NotFound(what)) => {
                warn!(session = %session_id, %what, "history changed during the call, chat not recorded");
            }
            other => other?,
        }

        info!(
            session = %session_id,
            needs_chart,
            chart = chart.as_ref().map(|c| c.kind.as_str()).unwrap_or("none"),
            "question answered"
        );

        Ok(QueryAnswer {
            reply,
            needs_chart,
            chart,
            chart_error,
        })
    }

    /// Runs the selector directly on the current table.
    pub fn chart(&self, session_id: Uuid, query: &str) -> Result<ChartSpec> {
        let query = self.validate_query(query)?;
        let (_, table) = self.current_entry(session_id)?;
        self.selector.select_chart(&table, query)
    }

    fn chart_error_message(&self, err: &AppError) -> String {
        format!(
            "{}: {}",
            self.language().messages().chart_error,
            err.localized(self.language())
        )
    }
}
