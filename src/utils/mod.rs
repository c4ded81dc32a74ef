//! Utility modules for fmdash

pub mod auth;
