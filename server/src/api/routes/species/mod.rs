//! Species API endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use types::{
    CooccurrenceDto, HabitatCountDto, LookupQuery, MonthlyTrendDto, MostObservedDto,
    NamedOccurrenceDto, OccurrenceTotalRow, RandomSpeciesDto, ShiftCentroidRow, ShiftsQuery,
    SpeciesDetailsDto, SpeciesLookupDto, SpeciesSearchDto, SpeciesSearchQuery, SpeciesShiftDto,
};

use crate::api::extractors::{NamePath, ValidatedQuery};
use crate::api::types::ApiError;
use crate::core::constants::SHIFTS_MAX_RESULTS;
use crate::data::QueryExecutor;
use crate::data::queries::species;
use crate::domain::{ShiftComparison, SpeciesSearch, haversine_km};

/// Shared state for Species API endpoints
#[derive(Clone)]
pub struct SpeciesApiState {
    pub executor: Arc<dyn QueryExecutor>,
}

/// Build Species API routes
pub fn routes(executor: Arc<dyn QueryExecutor>) -> Router<()> {
    let state = SpeciesApiState { executor };

    Router::new()
        .route("/species/search", get(search_species))
        // Legacy path kept for older clients
        .route("/search_species", get(search_species))
        .route("/species/details/{scientificName}", get(get_species_details))
        .route("/species/random", get(random_species))
        .route("/species/most-observed", get(most_observed_species))
        .route("/species/cooccurrence", get(species_cooccurrence))
        .route("/species/name/{scientificName}", get(species_by_name))
        .route("/species/habitat-counts", get(habitat_counts))
        .route("/species/monthly-trends/{scientificName}", get(monthly_trends))
        .route("/species/shifts", get(species_shifts))
        .route("/species/lookup", get(lookup_species))
        .with_state(state)
}

/// Search species by name prefix with range and habitat filters
#[utoipa::path(
    get,
    path = "/species/search",
    tag = "species",
    params(
        ("scientificName" = String, Query, description = "Scientific name prefix"),
        ("page" = Option<u32>, Query, description = "Page number (default 1)"),
        ("page_size" = Option<u32>, Query, description = "Rows per page (default 10)"),
        ("depth_min" = Option<f64>, Query, description = "Minimum depth in m (default 0)"),
        ("depth_max" = Option<f64>, Query, description = "Maximum depth in m (default 11000)"),
        ("sightings_min" = Option<i64>, Query, description = "Minimum sightings (default 1)"),
        ("sightings_max" = Option<i64>, Query, description = "Maximum sightings (default 200000)"),
        ("marine" = Option<String>, Query, description = "Set to `true` for marine occurrences"),
        ("brackish" = Option<String>, Query, description = "Set to `true` for brackish occurrences"),
        ("temp_min" = Option<f64>, Query, description = "Minimum temperature, needs temp_max"),
        ("temp_max" = Option<f64>, Query, description = "Maximum temperature, needs temp_min")
    ),
    responses(
        (status = 200, description = "Species ordered by sightings", body = Vec<SpeciesSearchDto>),
        (status = 400, description = "Missing scientificName or invalid parameter")
    )
)]
pub async fn search_species(
    State(state): State<SpeciesApiState>,
    ValidatedQuery(query): ValidatedQuery<SpeciesSearchQuery>,
) -> Result<Json<Vec<SpeciesSearchDto>>, ApiError> {
    let search = SpeciesSearch::from_input(query.into())?;
    tracing::debug!(
        name = %search.name_prefix,
        depth_min = search.depth.min,
        depth_max = search.depth.max,
        sightings_min = search.sightings.min,
        sightings_max = search.sightings.max,
        marine = search.habitat.marine,
        brackish = search.habitat.brackish,
        temperature = ?search.temperature,
        page = search.pagination.page,
        page_size = search.pagination.page_size,
        "Species search"
    );

    let rows = state
        .executor
        .fetch_as::<SpeciesSearchDto>(&species::search(&search))
        .await?;
    Ok(Json(rows))
}

/// Habitat flags and environmental averages for a species
#[utoipa::path(
    get,
    path = "/species/details/{scientificName}",
    tag = "species",
    params(
        ("scientificName" = String, Path, description = "Scientific name prefix")
    ),
    responses(
        (status = 200, description = "Species details", body = SpeciesDetailsDto),
        (status = 404, description = "No matching species")
    )
)]
pub async fn get_species_details(
    State(state): State<SpeciesApiState>,
    path: NamePath,
) -> Result<Json<SpeciesDetailsDto>, ApiError> {
    let rows = state
        .executor
        .fetch_as::<SpeciesDetailsDto>(&species::details(&path.scientific_name))
        .await?;

    rows.into_iter().next().map(Json).ok_or_else(|| {
        ApiError::not_found(
            "SPECIES_NOT_FOUND",
            format!("No species found matching '{}'", path.scientific_name),
        )
    })
}

/// Random sample of species with rarity scores
#[utoipa::path(
    get,
    path = "/species/random",
    tag = "species",
    responses(
        (status = 200, description = "Up to 10 random species", body = Vec<RandomSpeciesDto>)
    )
)]
pub async fn random_species(
    State(state): State<SpeciesApiState>,
) -> Result<Json<Vec<RandomSpeciesDto>>, ApiError> {
    let total = state
        .executor
        .fetch_as::<OccurrenceTotalRow>(&species::occurrence_total())
        .await?
        .first()
        .map(|row| row.total_count)
        .unwrap_or(0);

    if total == 0 {
        return Ok(Json(Vec::new()));
    }

    let rows = state
        .executor
        .fetch_as::<RandomSpeciesDto>(&species::random_sample(total))
        .await?;
    Ok(Json(rows))
}

/// Species with the most occurrences
#[utoipa::path(
    get,
    path = "/species/most-observed",
    tag = "species",
    responses(
        (status = 200, description = "Top 10 species by occurrences", body = Vec<MostObservedDto>)
    )
)]
pub async fn most_observed_species(
    State(state): State<SpeciesApiState>,
) -> Result<Json<Vec<MostObservedDto>>, ApiError> {
    let rows = state
        .executor
        .fetch_as::<MostObservedDto>(&species::most_observed())
        .await?;
    Ok(Json(rows))
}

/// Species pairs that share many grid cells
#[utoipa::path(
    get,
    path = "/species/cooccurrence",
    tag = "species",
    responses(
        (status = 200, description = "Top 20 co-occurring pairs", body = Vec<CooccurrenceDto>)
    )
)]
pub async fn species_cooccurrence(
    State(state): State<SpeciesApiState>,
) -> Result<Json<Vec<CooccurrenceDto>>, ApiError> {
    let rows = state
        .executor
        .fetch_as::<CooccurrenceDto>(&species::cooccurrence())
        .await?;
    Ok(Json(rows))
}

/// Latest occurrences of a species inside any ocean region
#[utoipa::path(
    get,
    path = "/species/name/{scientificName}",
    tag = "species",
    params(
        ("scientificName" = String, Path, description = "Scientific name substring")
    ),
    responses(
        (status = 200, description = "Up to 100 occurrences, newest first", body = Vec<NamedOccurrenceDto>)
    )
)]
pub async fn species_by_name(
    State(state): State<SpeciesApiState>,
    path: NamePath,
) -> Result<Json<Vec<NamedOccurrenceDto>>, ApiError> {
    let rows = state
        .executor
        .fetch_as::<NamedOccurrenceDto>(&species::occurrences_by_name(&path.scientific_name))
        .await?;
    Ok(Json(rows))
}

/// Distinct species per habitat combination
#[utoipa::path(
    get,
    path = "/species/habitat-counts",
    tag = "species",
    responses(
        (status = 200, description = "Species counts by habitat", body = Vec<HabitatCountDto>)
    )
)]
pub async fn habitat_counts(
    State(state): State<SpeciesApiState>,
) -> Result<Json<Vec<HabitatCountDto>>, ApiError> {
    let rows = state
        .executor
        .fetch_as::<HabitatCountDto>(&species::habitat_counts())
        .await?;
    Ok(Json(rows))
}

/// Monthly occurrence counts and temperature for a species
#[utoipa::path(
    get,
    path = "/species/monthly-trends/{scientificName}",
    tag = "species",
    params(
        ("scientificName" = String, Path, description = "Scientific name substring")
    ),
    responses(
        (status = 200, description = "One row per month with occurrences", body = Vec<MonthlyTrendDto>)
    )
)]
pub async fn monthly_trends(
    State(state): State<SpeciesApiState>,
    path: NamePath,
) -> Result<Json<Vec<MonthlyTrendDto>>, ApiError> {
    let rows = state
        .executor
        .fetch_as::<MonthlyTrendDto>(&species::monthly_trends(&path.scientific_name))
        .await?;
    Ok(Json(rows))
}

/// Latitudinal centroid shift between two periods of the reference year
#[utoipa::path(
    get,
    path = "/species/shifts",
    tag = "species",
    params(
        ("scientificName" = String, Query, description = "Scientific name substring"),
        ("minCount" = Option<i64>, Query, description = "Minimum occurrences per period (default 10)"),
        ("oldStartDate" = Option<String>, Query, description = "YYYY-MM-DD (default 2015-01-01)"),
        ("oldEndDate" = Option<String>, Query, description = "YYYY-MM-DD (default 2015-06-30)"),
        ("newStartDate" = Option<String>, Query, description = "YYYY-MM-DD (default 2015-07-01)"),
        ("newEndDate" = Option<String>, Query, description = "YYYY-MM-DD (default 2015-12-31)")
    ),
    responses(
        (status = 200, description = "Up to 100 species by shift distance", body = Vec<SpeciesShiftDto>),
        (status = 400, description = "Missing scientificName")
    )
)]
pub async fn species_shifts(
    State(state): State<SpeciesApiState>,
    ValidatedQuery(query): ValidatedQuery<ShiftsQuery>,
) -> Result<Json<Vec<SpeciesShiftDto>>, ApiError> {
    let comparison = ShiftComparison::from_input(query.into())?;
    tracing::debug!(
        name = %comparison.scientific_name,
        min_count = comparison.min_count,
        old_period = ?comparison.old_period,
        new_period = ?comparison.new_period,
        "Species shift comparison"
    );

    let rows = state
        .executor
        .fetch_as::<ShiftCentroidRow>(&species::shift_centroids(&comparison))
        .await?;

    let mut shifts: Vec<SpeciesShiftDto> = rows
        .into_iter()
        .map(|row| {
            let dist = haversine_km(
                row.first_half_lat,
                row.first_half_lon,
                row.second_half_lat,
                row.second_half_lon,
            );
            SpeciesShiftDto::from_row(row, dist)
        })
        .collect();
    shifts.sort_by(|a, b| b.shift_dist.total_cmp(&a.shift_dist));
    shifts.truncate(SHIFTS_MAX_RESULTS);

    Ok(Json(shifts))
}

/// Species with occurrences whose name contains the query
#[utoipa::path(
    get,
    path = "/species/lookup",
    tag = "species",
    params(
        ("scientificName" = Option<String>, Query, description = "Scientific name substring")
    ),
    responses(
        (status = 200, description = "Up to 10 matching species", body = Vec<SpeciesLookupDto>)
    )
)]
pub async fn lookup_species(
    State(state): State<SpeciesApiState>,
    ValidatedQuery(query): ValidatedQuery<LookupQuery>,
) -> Result<Json<Vec<SpeciesLookupDto>>, ApiError> {
    let rows = state
        .executor
        .fetch_as::<SpeciesLookupDto>(&species::lookup(query.scientific_name.as_deref()))
        .await?;
    Ok(Json(rows))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::test_support::{get, router_with};
    use crate::data::executor::RecordingExecutor;
    use crate::data::sql::SqlValue;

    #[tokio::test]
    async fn test_search_delphinus_end_to_end() {
        let executor = RecordingExecutor::new().respond(
            "num_sightings",
            vec![
                json!({"scientificName": "Delphinus delphis", "num_sightings": 1200}),
                json!({"scientificName": "Delphinus capensis", "num_sightings": 35}),
            ],
        );
        let (router, executor) = router_with(executor);

        let (status, body) = get(&router, "/species/search?scientificName=Delphinus").await;

        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["scientificName"], "Delphinus delphis");
        assert_eq!(rows[0]["num_sightings"], 1200);
        assert!(rows[0]["num_sightings"].as_i64() >= rows[1]["num_sightings"].as_i64());

        let statements = executor.statements();
        assert_eq!(statements.len(), 1);
        let params = &statements[0].params;
        assert_eq!(params[0], SqlValue::Text("Delphinus%".to_string()));
        assert_eq!(params[params.len() - 2], SqlValue::Int(10));
        assert_eq!(params[params.len() - 1], SqlValue::Int(0));
    }

    #[tokio::test]
    async fn test_legacy_search_alias() {
        let (router, executor) = router_with(RecordingExecutor::new());
        let (status, body) = get(&router, "/search_species?scientificName=Orcinus&page=2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
        let params = &executor.statements()[0].params;
        assert_eq!(params[params.len() - 1], SqlValue::Int(10));
    }

    #[tokio::test]
    async fn test_search_missing_name_is_bad_request_without_query() {
        let (router, executor) = router_with(RecordingExecutor::new());
        let (status, body) = get(&router, "/species/search?depth_min=10").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
        assert_eq!(body["code"], "MISSING_SCIENTIFIC_NAME");
        assert!(executor.statements().is_empty());
    }

    #[tokio::test]
    async fn test_search_rejects_bad_pagination_and_numbers() {
        let (router, executor) = router_with(RecordingExecutor::new());

        let (status, body) = get(&router, "/species/search?scientificName=A&page=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, body) = get(&router, "/species/search?scientificName=A&page_size=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, body) = get(&router, "/species/search?scientificName=A&depth_min=deep").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "QUERY_PARSE_ERROR");

        assert!(executor.statements().is_empty());
    }

    #[tokio::test]
    async fn test_search_large_page_size_is_bound() {
        let (router, executor) = router_with(RecordingExecutor::new());

        let (status, body) = get(
            &router,
            "/species/search?scientificName=Delphinus&page=3&page_size=1000",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
        let statements = executor.statements();
        let params = &statements[0].params;
        assert!(statements[0].sql.ends_with("LIMIT $6 OFFSET $7"));
        assert_eq!(params[5], SqlValue::Int(1000));
        assert_eq!(params[6], SqlValue::Int(2000));
    }

    #[tokio::test]
    async fn test_search_marine_flag_compiles_habitat_clause() {
        let (router, executor) = router_with(RecordingExecutor::new());
        get(&router, "/species/search?scientificName=Gadus&marine=true&brackish=false").await;
        let sql = &executor.statements()[0].sql;
        assert!(sql.contains("(o.marine = TRUE)"));
        assert!(!sql.contains("o.brackish"));
    }

    #[tokio::test]
    async fn test_details_found_and_not_found() {
        let executor = RecordingExecutor::new().respond(
            "species_data",
            vec![json!({
                "marine": true,
                "brackish": null,
                "averageDepth": 42.5,
                "averageTemperature": 18.25,
                "averageSalinity": 35.1,
                "averagePhosphate": null,
                "averageNitrate": null,
                "averageChlorophyll": null,
                "averagePh": 8.1,
                "scientificName": "Delphinus delphis",
                "family": "Delphinidae"
            })],
        );
        let (router, _) = router_with(executor);

        let (status, body) = get(&router, "/species/details/Delphinus%20delphis").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scientificName"], "Delphinus delphis");
        assert_eq!(body["averageDepth"], 42.5);
        assert_eq!(body["family"], "Delphinidae");
        assert!(body["brackish"].is_null());

        let (router, executor) = router_with(RecordingExecutor::new());
        let (status, body) = get(&router, "/species/details/Nothing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["code"], "SPECIES_NOT_FOUND");
        assert_eq!(
            executor.statements()[0].params,
            vec![SqlValue::Text("Nothing%".to_string())]
        );
    }

    #[tokio::test]
    async fn test_random_skips_sample_when_table_empty() {
        let executor =
            RecordingExecutor::new().respond("total_count", vec![json!({"total_count": 0})]);
        let (router, executor) = router_with(executor);

        let (status, body) = get(&router, "/species/random").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
        assert_eq!(executor.statements().len(), 1);
    }

    #[tokio::test]
    async fn test_random_binds_total() {
        let executor = RecordingExecutor::new()
            .respond("total_count", vec![json!({"total_count": 400})])
            .respond(
                "rarity_score",
                vec![json!({
                    "id": 137094,
                    "scientificName": "Delphinus delphis",
                    "observation_count": 4,
                    "percentage_of_total": 1.0,
                    "rarity_score": 0.99
                })],
            );
        let (router, executor) = router_with(executor);

        let (status, body) = get(&router, "/species/random").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"], 137094);
        assert_eq!(body[0]["rarity_score"], 0.99);
        assert_eq!(executor.statements()[1].params[0], SqlValue::Int(400));
    }

    #[tokio::test]
    async fn test_shifts_sorted_by_distance() {
        let executor = RecordingExecutor::new().respond(
            "first_half",
            vec![
                json!({
                    "id": 1,
                    "first_half_lat": 10.0, "first_half_lon": 0.0,
                    "second_half_lat": 11.0, "second_half_lon": 0.0,
                    "first_half_count": 12, "second_half_count": 15
                }),
                json!({
                    "id": 2,
                    "first_half_lat": 10.0, "first_half_lon": 0.0,
                    "second_half_lat": 20.0, "second_half_lon": 0.0,
                    "first_half_count": 30, "second_half_count": 40
                }),
                json!({
                    "id": 3,
                    "first_half_lat": 5.0, "first_half_lon": 5.0,
                    "second_half_lat": 5.0, "second_half_lon": 5.0,
                    "first_half_count": 10, "second_half_count": 10
                }),
            ],
        );
        let (router, executor) = router_with(executor);

        let (status, body) =
            get(&router, "/species/shifts?scientificName=Thunnus&minCount=10").await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<i64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![2, 1, 3]);

        let dist = body[0]["shiftDist"].as_f64().unwrap();
        assert!((dist - 1111.95).abs() < 1.0);
        assert_eq!(body[2]["shiftDist"], 0.0);

        let params = &executor.statements()[0].params;
        assert_eq!(params[4], SqlValue::Int(10));
        assert_eq!(params[5], SqlValue::Text("%Thunnus%".to_string()));
    }

    #[tokio::test]
    async fn test_shifts_missing_name() {
        let (router, executor) = router_with(RecordingExecutor::new());
        let (status, body) = get(&router, "/species/shifts?minCount=5").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "MISSING_SCIENTIFIC_NAME");
        assert!(executor.statements().is_empty());
    }

    #[tokio::test]
    async fn test_name_routes_use_substring_match() {
        let (router, executor) = router_with(RecordingExecutor::new());

        let (status, _) = get(&router, "/species/name/Orcinus").await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = get(&router, "/species/monthly-trends/Orcinus").await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = get(&router, "/species/lookup?scientificName=Orcinus").await;
        assert_eq!(status, StatusCode::OK);

        for statement in executor.statements() {
            assert_eq!(statement.params[0], SqlValue::Text("%Orcinus%".to_string()));
        }
    }

    #[tokio::test]
    async fn test_static_listings() {
        let executor = RecordingExecutor::new()
            .respond(
                "obs_count",
                vec![json!({"scientificName": "Gadus morhua", "obs_count": 900})],
            )
            .respond(
                "times_together",
                vec![json!({"species_a": "A a", "species_b": "B b", "times_together": 7})],
            )
            .respond(
                "habitat_type",
                vec![json!({"habitat_type": "Marine Only", "species_count": 321})],
            );
        let (router, _) = router_with(executor);

        let (_, body) = get(&router, "/species/most-observed").await;
        assert_eq!(body[0]["obs_count"], 900);
        let (_, body) = get(&router, "/species/cooccurrence").await;
        assert_eq!(body[0]["times_together"], 7);
        let (_, body) = get(&router, "/species/habitat-counts").await;
        assert_eq!(body[0]["habitat_type"], "Marine Only");
    }

    #[tokio::test]
    async fn test_search_data_error_is_internal() {
        let (router, executor) = router_with(RecordingExecutor::failing());
        let (status, body) = get(&router, "/species/search?scientificName=Delphinus").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["code"], "INTERNAL");
        assert!(!body["message"].as_str().unwrap().contains("PoolTimedOut"));
        assert_eq!(executor.statements().len(), 1);
    }

    #[tokio::test]
    async fn test_data_error_is_internal() {
        let (router, _) = router_with(RecordingExecutor::failing());
        let (status, body) = get(&router, "/species/most-observed").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["code"], "INTERNAL");
    }
}
