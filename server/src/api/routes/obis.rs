//! Coordinate lookup against OBIS occurrences

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::extractors::CoordinatesPath;
use crate::api::types::ApiError;
use crate::data::QueryExecutor;
use crate::data::queries::occurrences;
use crate::domain::find_region;
use crate::domain::regions::{Bounds, OceanRegion};

#[derive(Clone)]
pub struct ObisApiState {
    pub executor: Arc<dyn QueryExecutor>,
}

pub fn routes(executor: Arc<dyn QueryExecutor>) -> Router<()> {
    let state = ObisApiState { executor };

    Router::new()
        .route("/obis/coordinates/{lat}/{lng}", get(obis_by_coordinates))
        .with_state(state)
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoundsDto {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl From<Bounds> for BoundsDto {
    fn from(b: Bounds) -> Self {
        Self {
            min_lat: b.min_lat,
            max_lat: b.max_lat,
            min_lon: b.min_lon,
            max_lon: b.max_lon,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegionDetailDto {
    pub id: &'static str,
    pub name: &'static str,
    pub bounds: BoundsDto,
}

impl From<&OceanRegion> for RegionDetailDto {
    fn from(region: &OceanRegion) -> Self {
        Self {
            id: region.id,
            name: region.name,
            bounds: region.bounds.into(),
        }
    }
}

/// Occurrence inside the matched region box
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ObisEntryDto {
    pub id: serde_json::Value,
    #[serde(rename = "scientificName")]
    pub scientific_name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "dayOfYear")]
    pub day_of_year: Option<i32>,
    pub sst: Option<f64>,
    pub sss: Option<f64>,
    pub depth: Option<f64>,
}

/// Surface climate summary for the region box
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ClimateDto {
    pub avg_sst: Option<f64>,
    pub avg_sss: Option<f64>,
    pub total_observations: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoordinatesResponse {
    pub region: RegionDetailDto,
    pub obis_entries: Vec<ObisEntryDto>,
    pub climate: ClimateDto,
}

/// Region, sample occurrences and climate summary for a point
#[utoipa::path(
    get,
    path = "/obis/coordinates/{lat}/{lng}",
    tag = "obis",
    params(
        ("lat" = f64, Path, description = "Latitude in decimal degrees"),
        ("lng" = f64, Path, description = "Longitude in decimal degrees, wrapped into [-180, 180]")
    ),
    responses(
        (status = 200, description = "Region with occurrences and climate", body = CoordinatesResponse),
        (status = 400, description = "Coordinates are not numbers"),
        (status = 404, description = "Point lies outside every region")
    )
)]
pub async fn obis_by_coordinates(
    State(state): State<ObisApiState>,
    coords: CoordinatesPath,
) -> Result<Json<CoordinatesResponse>, ApiError> {
    let region = find_region(coords.lat, coords.lng)?;
    tracing::debug!(lat = coords.lat, lng = coords.lng, region = region.id, "Coordinate lookup");

    let entries = occurrences::in_bounds(&region.bounds);
    let climate = occurrences::climate_in_bounds(&region.bounds);
    let (obis_entries, climate) = tokio::try_join!(
        state.executor.fetch_as::<ObisEntryDto>(&entries),
        state.executor.fetch_as::<ClimateDto>(&climate),
    )?;

    Ok(Json(CoordinatesResponse {
        region: region.into(),
        obis_entries,
        climate: climate.into_iter().next().unwrap_or_default(),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::test_support::{get, router_with};
    use crate::data::executor::RecordingExecutor;
    use crate::data::sql::SqlValue;

    #[tokio::test]
    async fn test_coordinates_in_north_atlantic() {
        let executor = RecordingExecutor::new()
            .respond(
                "total_observations",
                vec![json!({"avg_sst": 14.5, "avg_sss": 35.2, "total_observations": 812})],
            )
            .respond(
                "o.\"dayOfYear\"",
                vec![json!({
                    "id": "a1b2",
                    "scientificName": "Gadus morhua",
                    "latitude": 45.1,
                    "longitude": -30.2,
                    "dayOfYear": 120,
                    "sst": 13.9,
                    "sss": null,
                    "depth": 20.0
                })],
            );
        let (router, executor) = router_with(executor);

        let (status, body) = get(&router, "/obis/coordinates/45/-30").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["region"]["id"], "northAtlantic");
        assert_eq!(body["region"]["name"], "North Atlantic");
        assert_eq!(
            body["region"]["bounds"],
            json!({"minLat": 0.0, "maxLat": 66.5, "minLon": -70.0, "maxLon": 20.0})
        );
        assert_eq!(body["obisEntries"][0]["scientificName"], "Gadus morhua");
        assert_eq!(body["climate"]["total_observations"], 812);

        let statements = executor.statements();
        assert_eq!(statements.len(), 2);
        for statement in &statements {
            assert_eq!(
                statement.params[..4].to_vec(),
                vec![
                    SqlValue::Float(0.0),
                    SqlValue::Float(66.5),
                    SqlValue::Float(-70.0),
                    SqlValue::Float(20.0),
                ]
            );
        }
    }

    #[tokio::test]
    async fn test_coordinates_wrap_longitude() {
        let (router, _) = router_with(RecordingExecutor::new());
        let (status, body) = get(&router, "/obis/coordinates/10/200").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["region"]["id"], "northPacific_east");
        assert_eq!(body["obisEntries"], json!([]));
        assert_eq!(body["climate"]["total_observations"], 0);
    }

    #[tokio::test]
    async fn test_coordinates_outside_every_region() {
        let (router, executor) = router_with(RecordingExecutor::new());
        let (status, body) = get(&router, "/obis/coordinates/95/0").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "REGION_NOT_FOUND");
        assert!(executor.statements().is_empty());
    }

    #[tokio::test]
    async fn test_coordinates_not_numeric() {
        let (router, executor) = router_with(RecordingExecutor::new());
        let (status, body) = get(&router, "/obis/coordinates/north/0").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_COORDINATES");
        assert!(executor.statements().is_empty());
    }
}
