pub mod app;
pub mod config;
pub mod error;
pub mod identifier;
pub mod record;
pub mod report;
pub mod source;
