//! Shared helpers

pub mod file;
pub mod sql;
