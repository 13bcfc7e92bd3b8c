//! Species API types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::types::{
    default_page, default_page_size, deserialize_flag, deserialize_optional, validate_page,
    validate_page_size,
};
use crate::domain::{HabitatFlags, ShiftComparisonInput, SpeciesSearchInput};

/// Query parameters for species search
#[derive(Debug, Deserialize, Validate)]
pub struct SpeciesSearchQuery {
    /// Scientific name prefix (required)
    #[serde(rename = "scientificName")]
    pub scientific_name: Option<String>,
    #[serde(default = "default_page")]
    #[validate(custom(function = "validate_page"))]
    pub page: u32,
    #[serde(default = "default_page_size")]
    #[validate(custom(function = "validate_page_size"))]
    pub page_size: u32,
    #[serde(default, deserialize_with = "deserialize_optional")]
    pub depth_min: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional")]
    pub depth_max: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional")]
    pub sightings_min: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional")]
    pub sightings_max: Option<i64>,
    /// Only `true` restricts to marine occurrences
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub marine: bool,
    /// Only `true` restricts to brackish occurrences
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub brackish: bool,
    /// Applied only together with `temp_max`
    #[serde(default, deserialize_with = "deserialize_optional")]
    pub temp_min: Option<f64>,
    /// Applied only together with `temp_min`
    #[serde(default, deserialize_with = "deserialize_optional")]
    pub temp_max: Option<f64>,
}

impl From<SpeciesSearchQuery> for SpeciesSearchInput {
    fn from(q: SpeciesSearchQuery) -> Self {
        Self {
            scientific_name: q.scientific_name,
            depth_min: q.depth_min,
            depth_max: q.depth_max,
            sightings_min: q.sightings_min,
            sightings_max: q.sightings_max,
            habitat: HabitatFlags {
                marine: q.marine,
                brackish: q.brackish,
            },
            temp_min: q.temp_min,
            temp_max: q.temp_max,
            page: q.page,
            page_size: q.page_size,
        }
    }
}

/// Query parameters for latitudinal shift comparison
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShiftsQuery {
    /// Scientific name substring (required)
    pub scientific_name: Option<String>,
    /// Minimum occurrences per period (default 10)
    #[serde(default, deserialize_with = "deserialize_optional")]
    pub min_count: Option<i64>,
    /// `YYYY-MM-DD`, default 2015-01-01
    pub old_start_date: Option<String>,
    /// `YYYY-MM-DD`, default 2015-06-30
    pub old_end_date: Option<String>,
    /// `YYYY-MM-DD`, default 2015-07-01
    pub new_start_date: Option<String>,
    /// `YYYY-MM-DD`, default 2015-12-31
    pub new_end_date: Option<String>,
}

impl From<ShiftsQuery> for ShiftComparisonInput {
    fn from(q: ShiftsQuery) -> Self {
        Self {
            scientific_name: q.scientific_name,
            min_count: q.min_count,
            old_start_date: q.old_start_date,
            old_end_date: q.old_end_date,
            new_start_date: q.new_start_date,
            new_end_date: q.new_end_date,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct LookupQuery {
    /// Scientific name substring; omitted matches every species
    #[serde(rename = "scientificName")]
    pub scientific_name: Option<String>,
}

/// One species in a search result page
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SpeciesSearchDto {
    #[serde(rename = "scientificName")]
    pub scientific_name: String,
    pub num_sightings: i64,
}

/// Habitat flags and environmental averages for one species
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesDetailsDto {
    pub marine: Option<bool>,
    pub brackish: Option<bool>,
    pub average_depth: Option<f64>,
    pub average_temperature: Option<f64>,
    pub average_salinity: Option<f64>,
    pub average_phosphate: Option<f64>,
    pub average_nitrate: Option<f64>,
    pub average_chlorophyll: Option<f64>,
    pub average_ph: Option<f64>,
    pub scientific_name: String,
    pub family: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OccurrenceTotalRow {
    pub total_count: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RandomSpeciesDto {
    /// AphiaID
    pub id: i64,
    #[serde(rename = "scientificName")]
    pub scientific_name: String,
    pub observation_count: i64,
    /// Share of all occurrences, in percent
    pub percentage_of_total: f64,
    /// `1 - observation_count / total`
    pub rarity_score: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MostObservedDto {
    #[serde(rename = "scientificName")]
    pub scientific_name: String,
    pub obs_count: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CooccurrenceDto {
    pub species_a: String,
    pub species_b: String,
    /// Number of shared grid cells
    pub times_together: i64,
}

/// Occurrence of a named species inside an ocean region
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NamedOccurrenceDto {
    pub id: serde_json::Value,
    #[serde(rename = "scientificName")]
    pub scientific_name: String,
    #[serde(rename = "eventDate")]
    pub event_date: Option<String>,
    pub longitude: f64,
    pub latitude: f64,
    pub region_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HabitatCountDto {
    pub habitat_type: String,
    pub species_count: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MonthlyTrendDto {
    pub month: i32,
    pub occ_count: i64,
    /// Percent change from the previous month; null for the first month
    pub pct_change: Option<f64>,
    /// Mean climate-grid temperature for the month
    pub avg_wod_temp: Option<f64>,
}

/// Per-period centroids as returned by the database
#[derive(Debug, Deserialize)]
pub(crate) struct ShiftCentroidRow {
    pub id: i64,
    pub first_half_lat: f64,
    pub first_half_lon: f64,
    pub second_half_lat: f64,
    pub second_half_lon: f64,
    pub first_half_count: i64,
    pub second_half_count: i64,
}

/// Centroid shift of one species between two periods
#[derive(Debug, Serialize, ToSchema)]
pub struct SpeciesShiftDto {
    pub id: i64,
    pub first_half_lat: f64,
    pub first_half_lon: f64,
    pub second_half_lat: f64,
    pub second_half_lon: f64,
    pub first_half_count: i64,
    pub second_half_count: i64,
    /// Great-circle distance between centroids in km
    #[serde(rename = "shiftDist")]
    pub shift_dist: f64,
}

impl SpeciesShiftDto {
    pub(crate) fn from_row(row: ShiftCentroidRow, shift_dist: f64) -> Self {
        Self {
            id: row.id,
            first_half_lat: row.first_half_lat,
            first_half_lon: row.first_half_lon,
            second_half_lat: row.second_half_lat,
            second_half_lon: row.second_half_lon,
            first_half_count: row.first_half_count,
            second_half_count: row.second_half_count,
            shift_dist,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SpeciesLookupDto {
    pub id: i64,
    #[serde(rename = "scientificName")]
    pub scientific_name: String,
}
