//! Database pool and schema

pub mod init;

pub use init::{init_database_pool, init_memory_pool, init_tables};
