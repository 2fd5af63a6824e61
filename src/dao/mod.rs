/// Database model definitions.
pub mod models;
/// Quiz persistence and retrieval operations.
pub mod quiz_store;
/// Storage abstraction layer for database operations.
pub mod storage;
