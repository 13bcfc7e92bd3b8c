//! Typed search requests
//!
//! Raw query parameters are defaulted and checked here; the statement
//! builders in `data::queries` only ever see these validated values.

use crate::core::constants::{
    SEARCH_DEFAULT_DEPTH_MAX, SEARCH_DEFAULT_DEPTH_MIN, SEARCH_DEFAULT_SIGHTINGS_MAX,
    SEARCH_DEFAULT_SIGHTINGS_MIN, SHIFTS_DEFAULT_MIN_COUNT, SHIFTS_DEFAULT_NEW_END,
    SHIFTS_DEFAULT_NEW_START, SHIFTS_DEFAULT_OLD_END, SHIFTS_DEFAULT_OLD_START,
};

use super::calendar::DayWindow;
use super::error::DomainError;

/// Inclusive range bound into a `BETWEEN`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange<T> {
    pub min: T,
    pub max: T,
}

impl<T> ValueRange<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

/// 1-based page plus page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Pagination {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.page_size)
    }
}

/// Habitat checkboxes; an unset flag adds no condition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HabitatFlags {
    pub marine: bool,
    pub brackish: bool,
}

impl HabitatFlags {
    pub fn any(&self) -> bool {
        self.marine || self.brackish
    }
}

/// Validated species search
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesSearch {
    pub name_prefix: String,
    pub depth: ValueRange<f64>,
    pub sightings: ValueRange<i64>,
    pub habitat: HabitatFlags,
    /// Present only when both bounds were supplied
    pub temperature: Option<ValueRange<f64>>,
    pub pagination: Pagination,
}

/// Raw, partially optional search inputs
#[derive(Debug, Clone, Default)]
pub struct SpeciesSearchInput {
    pub scientific_name: Option<String>,
    pub depth_min: Option<f64>,
    pub depth_max: Option<f64>,
    pub sightings_min: Option<i64>,
    pub sightings_max: Option<i64>,
    pub habitat: HabitatFlags,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub page: u32,
    pub page_size: u32,
}

impl SpeciesSearch {
    /// Apply defaults and validate raw inputs
    pub fn from_input(input: SpeciesSearchInput) -> Result<Self, DomainError> {
        let name_prefix = require_name(input.scientific_name)?;

        let depth = ValueRange::new(
            finite("depth_min", input.depth_min.unwrap_or(SEARCH_DEFAULT_DEPTH_MIN))?,
            finite("depth_max", input.depth_max.unwrap_or(SEARCH_DEFAULT_DEPTH_MAX))?,
        );
        let sightings = ValueRange::new(
            input.sightings_min.unwrap_or(SEARCH_DEFAULT_SIGHTINGS_MIN),
            input.sightings_max.unwrap_or(SEARCH_DEFAULT_SIGHTINGS_MAX),
        );
        let temperature = match (input.temp_min, input.temp_max) {
            (Some(min), Some(max)) => Some(ValueRange::new(
                finite("temp_min", min)?,
                finite("temp_max", max)?,
            )),
            _ => None,
        };

        Ok(Self {
            name_prefix,
            depth,
            sightings,
            habitat: input.habitat,
            temperature,
            pagination: Pagination::new(input.page, input.page_size),
        })
    }
}

/// Validated latitudinal shift comparison between two periods
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftComparison {
    pub scientific_name: String,
    pub min_count: i64,
    pub old_period: DayWindow,
    pub new_period: DayWindow,
}

/// Raw shift inputs; dates are `YYYY-MM-DD`
#[derive(Debug, Clone, Default)]
pub struct ShiftComparisonInput {
    pub scientific_name: Option<String>,
    pub min_count: Option<i64>,
    pub old_start_date: Option<String>,
    pub old_end_date: Option<String>,
    pub new_start_date: Option<String>,
    pub new_end_date: Option<String>,
}

impl ShiftComparison {
    pub fn from_input(input: ShiftComparisonInput) -> Result<Self, DomainError> {
        let scientific_name = require_name(input.scientific_name)?;

        let old_period = DayWindow::from_dates(
            input
                .old_start_date
                .as_deref()
                .unwrap_or(SHIFTS_DEFAULT_OLD_START),
            input.old_end_date.as_deref().unwrap_or(SHIFTS_DEFAULT_OLD_END),
        );
        let new_period = DayWindow::from_dates(
            input
                .new_start_date
                .as_deref()
                .unwrap_or(SHIFTS_DEFAULT_NEW_START),
            input.new_end_date.as_deref().unwrap_or(SHIFTS_DEFAULT_NEW_END),
        );

        Ok(Self {
            scientific_name,
            min_count: input.min_count.unwrap_or(SHIFTS_DEFAULT_MIN_COUNT),
            old_period,
            new_period,
        })
    }
}

/// Require a non-blank scientific name
pub fn require_name(name: Option<String>) -> Result<String, DomainError> {
    match name {
        Some(name) if !name.trim().is_empty() => Ok(name),
        _ => Err(DomainError::validation(
            "MISSING_SCIENTIFIC_NAME",
            "Scientific name is required",
        )),
    }
}

fn finite(field: &str, value: f64) -> Result<f64, DomainError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DomainError::validation(
            "INVALID_RANGE",
            format!("{} must be a finite number", field),
        ))
    }
}
