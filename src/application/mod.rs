pub mod use_cases;

pub use use_cases::chart_selector::{ChartSelector, KeywordRules};
pub use use_cases::data_chat::DataChatUseCase;
pub use use_cases::session_store::SessionStore;
pub use use_cases::upload::UploadUseCase;
