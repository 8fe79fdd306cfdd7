//! Database initialization and schema

pub mod init;

pub use init::{init_database, PALETTE_TABLE};
