//! Core logic for fmdash

pub mod dashboard;
