//! Tidewatch server: read-only REST API over OBIS marine occurrence data

pub mod api;
mod app;
pub mod core;
pub mod data;
pub mod domain;
pub mod utils;
