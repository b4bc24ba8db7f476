pub mod chart_selector;
pub mod data_chat;
pub mod prompt_builder;
pub mod session_store;
pub mod summary;
pub mod upload;
