//! OpenAPI specification and Swagger UI

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{health, obis, regions, root, species};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tidewatch API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Marine species occurrence and ocean climate queries"
    ),
    tags(
        (name = "health", description = "Liveness and connectivity checks"),
        (name = "species", description = "Species search, details and trends"),
        (name = "regions", description = "Ocean region aggregates"),
        (name = "obis", description = "Occurrences by coordinates")
    ),
    paths(
        // Health
        health::health,
        root::hello,
        root::sample_occurrences,
        // Species
        species::search_species,
        species::get_species_details,
        species::random_species,
        species::most_observed_species,
        species::species_cooccurrence,
        species::species_by_name,
        species::habitat_counts,
        species::monthly_trends,
        species::species_shifts,
        species::lookup_species,
        // Regions
        regions::list_regions,
        regions::region_temperature,
        regions::region_water_properties,
        regions::all_region_species,
        regions::region_species,
        // OBIS
        obis::obis_by_coordinates,
    ),
    components(schemas(
        health::HealthResponse,
        root::SampleOccurrenceDto,
        // Species
        species::types::SpeciesSearchDto,
        species::types::SpeciesDetailsDto,
        species::types::RandomSpeciesDto,
        species::types::MostObservedDto,
        species::types::CooccurrenceDto,
        species::types::NamedOccurrenceDto,
        species::types::HabitatCountDto,
        species::types::MonthlyTrendDto,
        species::types::SpeciesShiftDto,
        species::types::SpeciesLookupDto,
        // Regions
        regions::types::RegionDto,
        regions::types::RegionTemperatureDto,
        regions::types::WaterPropertiesDto,
        regions::types::RegionSpeciesDto,
        // OBIS
        obis::CoordinatesResponse,
        obis::RegionDetailDto,
        obis::BoundsDto,
        obis::ObisEntryDto,
        obis::ClimateDto,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

/// Serve Swagger UI from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Tidewatch API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        html { box-sizing: border-box; overflow-y: scroll; }
        *, *:before, *:after { box-sizing: inherit; }
        body { margin: 0; background: #fafafa; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: "/api/openapi.json",
                dom_id: '#swagger-ui',
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout",
                deepLinking: true
            });
        };
    </script>
</body>
</html>"#;
