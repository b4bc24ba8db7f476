pub mod config;
pub mod llm_clients;
pub mod response;

// Workbook parsing and profiling
pub mod spreadsheet;
