//! Ocean region API endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use types::{RegionDto, RegionSpeciesDto, RegionTemperatureDto, WaterPropertiesDto};

use crate::api::extractors::RegionPath;
use crate::api::types::ApiError;
use crate::data::QueryExecutor;
use crate::data::queries::regions;
use crate::domain::OceanRegion;
use crate::domain::regions::{distinct_regions, region_by_id};

/// Path value selecting every region
const ALL_REGIONS: &str = "all";

/// Shared state for Region API endpoints
#[derive(Clone)]
pub struct RegionsApiState {
    pub executor: Arc<dyn QueryExecutor>,
}

/// Build Region API routes
pub fn routes(executor: Arc<dyn QueryExecutor>) -> Router<()> {
    let state = RegionsApiState { executor };

    Router::new()
        .route("/regions", get(list_regions))
        .route("/regions/temperature", get(region_temperature))
        .route("/regions/water-properties", get(region_water_properties))
        .route("/regions/species", get(all_region_species))
        .route("/regions/species/{region}", get(region_species))
        .with_state(state)
}

/// List ocean regions, one entry per display name
#[utoipa::path(
    get,
    path = "/regions",
    tag = "regions",
    responses(
        (status = 200, description = "Ocean regions", body = Vec<RegionDto>)
    )
)]
pub async fn list_regions() -> Json<Vec<RegionDto>> {
    Json(distinct_regions().into_iter().map(RegionDto::from).collect())
}

/// Mean climate-grid temperature per region
#[utoipa::path(
    get,
    path = "/regions/temperature",
    tag = "regions",
    responses(
        (status = 200, description = "Average temperature per region id", body = Vec<RegionTemperatureDto>)
    )
)]
pub async fn region_temperature(
    State(state): State<RegionsApiState>,
) -> Result<Json<Vec<RegionTemperatureDto>>, ApiError> {
    let rows = state
        .executor
        .fetch_as::<RegionTemperatureDto>(&regions::temperature())
        .await?;
    Ok(Json(rows))
}

/// Mean salinity and pH per region
#[utoipa::path(
    get,
    path = "/regions/water-properties",
    tag = "regions",
    responses(
        (status = 200, description = "Average salinity and pH per region id", body = Vec<WaterPropertiesDto>)
    )
)]
pub async fn region_water_properties(
    State(state): State<RegionsApiState>,
) -> Result<Json<Vec<WaterPropertiesDto>>, ApiError> {
    let rows = state
        .executor
        .fetch_as::<WaterPropertiesDto>(&regions::water_properties())
        .await?;
    Ok(Json(rows))
}

/// Distinct species observed in every region
#[utoipa::path(
    get,
    path = "/regions/species",
    tag = "regions",
    responses(
        (status = 200, description = "Species per region", body = Vec<RegionSpeciesDto>)
    )
)]
pub async fn all_region_species(
    State(state): State<RegionsApiState>,
) -> Result<Json<Vec<RegionSpeciesDto>>, ApiError> {
    fetch_region_species(&state, None).await
}

/// Distinct species observed in one region, or all with `all`
#[utoipa::path(
    get,
    path = "/regions/species/{region}",
    tag = "regions",
    params(
        ("region" = String, Path, description = "Region id, or `all`")
    ),
    responses(
        (status = 200, description = "Species in the region", body = Vec<RegionSpeciesDto>),
        (status = 404, description = "Unknown region id")
    )
)]
pub async fn region_species(
    State(state): State<RegionsApiState>,
    path: RegionPath,
) -> Result<Json<Vec<RegionSpeciesDto>>, ApiError> {
    if path.region == ALL_REGIONS {
        return fetch_region_species(&state, None).await;
    }

    let region = region_by_id(&path.region).ok_or_else(|| {
        ApiError::not_found(
            "REGION_NOT_FOUND",
            format!("Unknown region '{}'", path.region),
        )
    })?;
    fetch_region_species(&state, Some(region)).await
}

async fn fetch_region_species(
    state: &RegionsApiState,
    region: Option<&OceanRegion>,
) -> Result<Json<Vec<RegionSpeciesDto>>, ApiError> {
    let rows = state
        .executor
        .fetch_as::<RegionSpeciesDto>(&regions::species(region))
        .await?;
    Ok(Json(rows))
}
