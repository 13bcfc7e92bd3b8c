//! API route handlers

pub mod health;
pub mod obis;
pub mod regions;
pub mod root;
pub mod species;
