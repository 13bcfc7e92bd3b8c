//! Region aggregate statements over the `region_boxes` CTE

use crate::data::sql::{SelectBuilder, Statement};
use crate::domain::OceanRegion;
use crate::domain::regions::{REGION_BOXES, region_boxes_values};

/// Climate grid points joined to every region box containing them
fn wod_by_region() -> SelectBuilder {
    SelectBuilder::new("wod w")
        .with_cte(REGION_BOXES, &region_boxes_values())
        .column("rb.region_id")
        .join(
            "JOIN region_boxes rb \
             ON w.latitude BETWEEN rb.min_lat AND rb.max_lat \
             AND w.longitude BETWEEN rb.min_lon AND rb.max_lon",
        )
        .group_by("rb.region_id")
        .order_by("rb.region_id")
}

/// Mean climate-grid temperature per region
pub fn temperature() -> Statement {
    wod_by_region()
        .column("AVG(w.temperature)::float8 AS avg_temperature")
        .build()
}

/// Mean salinity and pH per region
pub fn water_properties() -> Statement {
    wod_by_region()
        .column("AVG(w.salinity)::float8 AS avg_salinity")
        .column("AVG(w.ph)::float8 AS avg_ph")
        .build()
}

/// Distinct species observed in one region, or in every region when `None`
pub fn species(region: Option<&OceanRegion>) -> Statement {
    let mut builder = SelectBuilder::new("obis o")
        .with_cte(REGION_BOXES, &region_boxes_values())
        .column("DISTINCT rb.region_id")
        .column("sn.\"scientificName\"")
        .join("JOIN scientific_names sn ON o.aphiaid = sn.aphiaid")
        .join(
            "JOIN region_boxes rb \
             ON o.\"decimalLatitude\" BETWEEN rb.min_lat AND rb.max_lat \
             AND o.\"decimalLongitude\" BETWEEN rb.min_lon AND rb.max_lon",
        );

    match region {
        Some(region) => {
            let id = builder.bind(region.id);
            builder
                .filter(format!("rb.region_id = {}", id))
                .order_by("sn.\"scientificName\"")
                .build()
        }
        None => builder
            .order_by("rb.region_id")
            .order_by("sn.\"scientificName\"")
            .build(),
    }
}
