pub mod chart;
pub mod chat;
pub mod error;
pub mod llm_config;
pub mod locale;
pub mod profile;
pub mod session;
pub mod table;
