//! Statement builders, one function per endpoint query
//!
//! Functions here take validated domain values and return a [`Statement`];
//! they never touch the executor.
//!
//! [`Statement`]: crate::data::sql::Statement

pub mod occurrences;
pub mod regions;
pub mod species;

/// Case-insensitive match of the scientific name against a bound pattern
pub(crate) fn name_matches(placeholder: &str) -> String {
    format!("sn.\"scientificName\" ILIKE {} ESCAPE '\\'", placeholder)
}
