// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod analytics;
pub mod app_dirs;
pub mod book;
pub mod catalog;
pub mod export;
pub mod import;
pub mod library;
pub mod preferences;
pub mod runtime;
pub mod session;
pub mod storage;
pub mod tracker;
pub mod util;
