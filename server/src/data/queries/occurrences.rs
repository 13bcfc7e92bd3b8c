//! Occurrence listings and per-region aggregates

use crate::core::constants::{OCCURRENCE_LIST_LIMIT, SPECIES_SAMPLE_LIMIT};
use crate::data::sql::{SelectBuilder, Statement};
use crate::domain::regions::Bounds;

/// A handful of raw occurrences, used as a connectivity smoke test
pub fn sample() -> Statement {
    SelectBuilder::new("obis")
        .column("obis.id AS occurrenceid")
        .column("obis.\"eventDate\" AS eventdate")
        .limit(SPECIES_SAMPLE_LIMIT)
        .build()
}

fn within_bounds(builder: SelectBuilder, bounds: &Bounds) -> SelectBuilder {
    builder
        .between("o.\"decimalLatitude\"", bounds.min_lat, bounds.max_lat)
        .between("o.\"decimalLongitude\"", bounds.min_lon, bounds.max_lon)
}

/// Occurrences inside a region box
pub fn in_bounds(bounds: &Bounds) -> Statement {
    let builder = SelectBuilder::new("obis o")
        .column("o.id")
        .column("sn.\"scientificName\"")
        .column("o.\"decimalLatitude\" AS latitude")
        .column("o.\"decimalLongitude\" AS longitude")
        .column("o.\"dayOfYear\"")
        .column("o.sst")
        .column("o.sss")
        .column("o.depth")
        .join("JOIN scientific_names sn ON o.aphiaid = sn.aphiaid");

    within_bounds(builder, bounds)
        .limit(OCCURRENCE_LIST_LIMIT)
        .build()
}

/// Mean surface temperature and salinity inside a region box
pub fn climate_in_bounds(bounds: &Bounds) -> Statement {
    let builder = SelectBuilder::new("obis o")
        .column("AVG(o.sst)::float8 AS avg_sst")
        .column("AVG(o.sss)::float8 AS avg_sss")
        .column("COUNT(*) AS total_observations");

    within_bounds(builder, bounds)
        .filter("(o.sst IS NOT NULL OR o.sss IS NOT NULL)")
        .build()
}
