//! Region API types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::OceanRegion;

#[derive(Debug, Serialize, ToSchema)]
pub struct RegionDto {
    pub id: &'static str,
    pub name: &'static str,
}

impl From<&OceanRegion> for RegionDto {
    fn from(region: &OceanRegion) -> Self {
        Self {
            id: region.id,
            name: region.name,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegionTemperatureDto {
    pub region_id: String,
    pub avg_temperature: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WaterPropertiesDto {
    pub region_id: String,
    pub avg_salinity: Option<f64>,
    pub avg_ph: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegionSpeciesDto {
    pub region_id: String,
    #[serde(rename = "scientificName")]
    pub scientific_name: String,
}
