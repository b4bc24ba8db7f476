use crate::application::use_cases::session_store::SessionStore;
use crate::domain::error::{AppError, Result};
use crate::domain::locale::Language;
use crate::domain::session::UploadSummary;
use crate::infrastructure::config::UploadConfig;
use crate::infrastructure::spreadsheet::{ColumnProfiler, WorkbookReader};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub struct UploadUseCase {
    sessions: Arc<SessionStore>,
    reader: WorkbookReader,
    profiler: Arc<ColumnProfiler>,
    config: UploadConfig,
    language: Language,
}

impl UploadUseCase {
    pub fn new(
        sessions: Arc<SessionStore>,
        profiler: Arc<ColumnProfiler>,
        config: UploadConfig,
        language: Language,
    ) -> Self {
        Self {
            sessions,
            reader: WorkbookReader::new(),
            profiler,
            config,
            language,
        }
    }

    /// Extension and size checks that run before any parsing.
    pub fn validate(&self, file_name: &str, bytes: &[u8]) -> Result<()> {
        let texts = self.language.messages();

        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_lowercase()))
            .unwrap_or_default();
        let allowed = self
            .config
            .allowed_extensions
            .iter()
            .any(|a| a.eq_ignore_ascii_case(&extension));
        if !allowed {
            return Err(AppError::ValidationError(texts.only_excel.to_string()));
        }

        if bytes.is_empty() {
            return Err(AppError::ValidationError(texts.empty_file.to_string()));
        }
        if bytes.len() > self.config.max_file_size {
            return Err(AppError::ValidationError(format!(
                "{} ({} > {} bytes)",
                texts.file_too_large,
                bytes.len(),
                self.config.max_file_size
            )));
        }
        Ok(())
    }

    pub fn execute(&self, session_id: Uuid, file_name: &str, bytes: &[u8]) -> Result<UploadSummary> {
        if !self.sessions.session_exists(session_id)? {
            return Err(AppError::NotFound(format!("session {}", session_id)));
        }
        self.validate(file_name, bytes)?;

        let table = self.reader.load(bytes).map_err(|e| {
            warn!(session = %session_id, file = file_name, error = %e, "upload rejected");
            e
        })?;
        let table = Arc::new(table);
        let profile = self.profiler.profile(&table);

        let entry_id = self
            .sessions
            .add_upload(session_id, file_name, Arc::clone(&table))?;

        info!(
            session = %session_id,
            file = file_name,
            rows = table.row_count(),
            columns = table.column_count(),
            "file uploaded"
        );

        Ok(UploadSummary {
            entry_id,
            file_name: file_name.to_string(),
            row_count: table.row_count(),
            column_count: table.column_count(),
            columns: table.column_names().into_iter().map(String::from).collect(),
            profile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::{ColumnKind, ProfileConfig};
    use rust_xlsxwriter::Workbook;

    fn use_case(max_file_size: usize) -> (UploadUseCase, Arc<SessionStore>) {
        let sessions = Arc::new(SessionStore::new(10));
        let config = UploadConfig {
            max_file_size,
            ..Default::default()
        };
        let use_case = UploadUseCase::new(
            Arc::clone(&sessions),
            Arc::new(ColumnProfiler::new(ProfileConfig::default())),
            config,
            Language::English,
        );
        (use_case, sessions)
    }

    fn workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "city").unwrap();
        sheet.write_string(0, 1, "sales").unwrap();
        for (i, city) in ["Baku", "Baku", "Baku", "Ganja", "Baku"].iter().enumerate() {
            sheet.write_string(i as u32 + 1, 0, *city).unwrap();
            sheet.write_number(i as u32 + 1, 1, (i * 10) as f64).unwrap();
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn uploads_and_profiles_workbook() {
        let (use_case, sessions) = use_case(1024 * 1024);
        let session = sessions.create_session().unwrap();

        let summary = use_case.execute(session, "Sales.XLSX", &workbook()).unwrap();

        assert_eq!(summary.row_count, 5);
        assert_eq!(summary.columns, vec!["city", "sales"]);
        assert_eq!(summary.profile[0].profile.kind, ColumnKind::Categorical);
        assert_eq!(summary.profile[1].profile.kind, ColumnKind::Numeric);
        assert!(sessions.current_table(session).unwrap().is_some());
        assert_eq!(sessions.history(session).unwrap()[0].id, summary.entry_id);
    }

    #[test]
    fn rejects_wrong_extension() {
        let (use_case, sessions) = use_case(1024);
        let session = sessions.create_session().unwrap();

        let err = use_case.execute(session, "data.csv", b"a,b").unwrap_err();
        assert_eq!(
            err,
            AppError::ValidationError("Please upload only Excel files (.xlsx or .xls).".into())
        );
        assert!(sessions.history(session).unwrap().is_empty());
    }

    #[test]
    fn rejects_oversized_and_empty_files() {
        let (use_case, _) = use_case(4);

        assert!(matches!(
            use_case.validate("a.xls", b"12345"),
            Err(AppError::ValidationError(msg)) if msg.starts_with("The file is too large")
        ));
        assert!(matches!(
            use_case.validate("a.xls", b""),
            Err(AppError::ValidationError(_))
        ));
        assert!(use_case.validate("a.xls", b"1234").is_ok());
    }

    #[test]
    fn corrupt_workbook_is_a_load_error() {
        let (use_case, sessions) = use_case(1024);
        let session = sessions.create_session().unwrap();

        let err = use_case.execute(session, "a.xlsx", b"not a zip").unwrap_err();
        assert!(matches!(err, AppError::LoadError(_)));
        assert!(sessions.current_table(session).unwrap().is_none());
    }

    #[test]
    fn unknown_session_is_not_found() {
        let (use_case, _) = use_case(1024);
        let err = use_case
            .execute(Uuid::new_v4(), "a.xlsx", b"whatever")
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
