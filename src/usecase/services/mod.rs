pub mod analytics_service;
pub mod engine;
pub mod import_service;
pub mod query_service;
