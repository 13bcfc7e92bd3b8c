//! Domain logic for marine occurrence queries
//!
//! - `search` - validated search and shift requests
//! - `regions` - static ocean region table and coordinate lookup
//! - `calendar` - day-of-year conversion for the reference year
//! - `geo` - great-circle distance

pub mod calendar;
pub mod error;
pub mod geo;
pub mod regions;
pub mod search;

pub use calendar::{DayWindow, day_of_year};
pub use error::DomainError;
pub use geo::haversine_km;
pub use regions::{OCEAN_REGIONS, OceanRegion, find_region, normalize_longitude};
pub use search::{
    HabitatFlags, Pagination, ShiftComparison, ShiftComparisonInput, SpeciesSearch,
    SpeciesSearchInput, ValueRange,
};
