//! Database module for fmdash
//!
//! This module handles all database operations using SQLx with SQLite.

mod engine;
pub mod tables;

pub use engine::{setup_sqlite, DbEngine};
pub use tables::*;

#[cfg(test)]
pub use engine::setup_sqlite_at;
