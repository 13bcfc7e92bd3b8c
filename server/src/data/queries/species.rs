//! Species statements

use crate::core::constants::{
    COOCCURRENCE_GRID_PRECISION, COOCCURRENCE_LIMIT, COOCCURRENCE_MIN_SHARED_CELLS,
    OCCURRENCE_LIST_LIMIT, SPECIES_SAMPLE_LIMIT, SURFACE_DEPTH_ID,
};
use crate::data::sql::{SelectBuilder, SqlParams, Statement};
use crate::domain::regions::{REGION_BOXES, region_boxes_values};
use crate::domain::{ShiftComparison, SpeciesSearch};
use crate::utils::sql::{contains_pattern, prefix_pattern};

use super::name_matches;

/// Occurrence joined to its grid/day climate record
const CLIMATE_JOIN: &str = "LEFT JOIN wod_2015 w ON o.grid_id = w.grid_id \
     AND o.depth_id = w.depth_id \
     AND o.\"dayOfYear\" = w.\"dayOfYear\"";

/// Climate-grid temperature, else sea-surface temperature at the surface bucket
fn effective_temperature() -> String {
    format!(
        "(CASE WHEN w.temperature IS NOT NULL THEN w.temperature \
         WHEN o.depth_id = {} THEN o.sst END)",
        SURFACE_DEPTH_ID
    )
}

/// Filtered, grouped and paginated species search
pub fn search(search: &SpeciesSearch) -> Statement {
    let mut builder = SelectBuilder::new("scientific_names sn")
        .column("sn.\"scientificName\"")
        .column("COUNT(*) AS num_sightings")
        .join("JOIN obis o ON sn.aphiaid = o.aphiaid");

    if search.temperature.is_some() {
        builder = builder.join(CLIMATE_JOIN);
    }

    let name = builder.bind(prefix_pattern(&search.name_prefix));
    builder = builder
        .filter(name_matches(&name))
        .between("o.depth", search.depth.min, search.depth.max);

    if search.habitat.any() {
        let mut habitats = Vec::new();
        if search.habitat.marine {
            habitats.push("o.marine = TRUE");
        }
        if search.habitat.brackish {
            habitats.push("o.brackish = TRUE");
        }
        builder = builder.any_of(&habitats);
    }

    if let Some(range) = search.temperature {
        builder = builder.between(&effective_temperature(), range.min, range.max);
    }

    builder
        .group_by("sn.\"scientificName\"")
        .having_between("COUNT(*)", search.sightings.min, search.sightings.max)
        .order_by("num_sightings DESC")
        .order_by("sn.\"scientificName\" ASC")
        .paginate(search.pagination.limit(), search.pagination.offset())
        .build()
}

/// Habitat flags and climate averages for species matching a name prefix
pub fn details(scientific_name: &str) -> Statement {
    let mut params = SqlParams::new();
    let name = params.push(prefix_pattern(scientific_name));

    let sql = format!(
        r#"WITH species_data AS (
  SELECT o.marine, o.brackish, o.depth,
         w.temperature, w.salinity, w.phosphate, w.nitrate,
         w.chlorophyll, w.ph, sn."scientificName", f.family
  FROM obis o
  {climate_join}
  JOIN scientific_names sn ON o.aphiaid = sn.aphiaid
  JOIN families f ON sn."scientificName" = f."scientificName"
  WHERE {name_match}
)
SELECT
  CASE WHEN bool_or(marine) THEN TRUE
       WHEN bool_and(marine IS FALSE) THEN FALSE END AS marine,
  CASE WHEN bool_or(brackish) THEN TRUE
       WHEN bool_and(brackish IS FALSE) THEN FALSE END AS brackish,
  AVG(depth)::float8 AS "averageDepth",
  AVG(temperature)::float8 AS "averageTemperature",
  AVG(salinity)::float8 AS "averageSalinity",
  AVG(phosphate)::float8 AS "averagePhosphate",
  AVG(nitrate)::float8 AS "averageNitrate",
  AVG(chlorophyll)::float8 AS "averageChlorophyll",
  AVG(ph)::float8 AS "averagePh",
  "scientificName",
  family
FROM species_data
GROUP BY "scientificName", family
ORDER BY "scientificName""#,
        climate_join = CLIMATE_JOIN,
        name_match = name_matches(&name),
    );

    Statement::with_params(sql, params)
}

/// Total number of occurrences, the denominator for rarity
pub fn occurrence_total() -> Statement {
    Statement::new("SELECT COUNT(*) AS total_count FROM obis")
}

/// Random species sample with share of all occurrences and rarity score
pub fn random_sample(total: i64) -> Statement {
    let mut params = SqlParams::new();
    let total = params.push(total);
    let limit = params.push(SPECIES_SAMPLE_LIMIT);

    let sql = format!(
        r#"SELECT
  sn.aphiaid AS id,
  sn."scientificName",
  COUNT(o.id) AS observation_count,
  ROUND(((COUNT(o.id)::float8 / {total}::float8) * 100)::numeric, 6)::float8 AS percentage_of_total,
  (1 - (COUNT(o.id)::float8 / {total}::float8)) AS rarity_score
FROM scientific_names sn
JOIN obis o ON sn.aphiaid = o.aphiaid
GROUP BY sn.aphiaid, sn."scientificName"
ORDER BY RANDOM()
LIMIT {limit}"#
    );

    Statement::with_params(sql, params)
}

pub fn most_observed() -> Statement {
    SelectBuilder::new("obis o")
        .column("sn.\"scientificName\"")
        .column("COUNT(*) AS obs_count")
        .join("JOIN scientific_names sn ON o.aphiaid = sn.aphiaid")
        .group_by("sn.\"scientificName\"")
        .order_by("obs_count DESC")
        .order_by("sn.\"scientificName\" ASC")
        .limit(SPECIES_SAMPLE_LIMIT)
        .build()
}

/// Species pairs sharing many rounded grid cells
pub fn cooccurrence() -> Statement {
    let sql = format!(
        r#"WITH species_locations AS (
  SELECT o.aphiaid, sn."scientificName",
         ROUND(o."decimalLatitude"::numeric, {precision}) AS lat_grid,
         ROUND(o."decimalLongitude"::numeric, {precision}) AS lon_grid
  FROM obis o
  JOIN scientific_names sn ON o.aphiaid = sn.aphiaid
  GROUP BY o.aphiaid, sn."scientificName", lat_grid, lon_grid
),
cooccurrences AS (
  SELECT a."scientificName" AS species_a,
         b."scientificName" AS species_b,
         COUNT(*) AS times_together
  FROM species_locations a
  JOIN species_locations b
    ON a.lat_grid = b.lat_grid
   AND a.lon_grid = b.lon_grid
   AND a.aphiaid < b.aphiaid
  GROUP BY species_a, species_b
  HAVING COUNT(*) > {min_shared}
)
SELECT species_a, species_b, times_together
FROM cooccurrences
ORDER BY times_together DESC, species_a, species_b"#,
        precision = COOCCURRENCE_GRID_PRECISION,
        min_shared = COOCCURRENCE_MIN_SHARED_CELLS,
    );

    let mut params = SqlParams::new();
    let limit = params.push(COOCCURRENCE_LIMIT);
    Statement::with_params(format!("{}\nLIMIT {}", sql, limit), params)
}

/// Latest occurrences of matching species that fall inside a region
pub fn occurrences_by_name(scientific_name: &str) -> Statement {
    let mut params = SqlParams::new();
    let name = params.push(contains_pattern(scientific_name));
    let limit = params.push(OCCURRENCE_LIST_LIMIT);

    let sql = format!(
        r#"WITH {boxes} AS (
{values}
),
observations AS (
  SELECT o.id, sn."scientificName", o."eventDate",
         o."decimalLongitude" AS longitude,
         o."decimalLatitude" AS latitude
  FROM scientific_names sn
  JOIN obis o ON o.aphiaid = sn.aphiaid
  WHERE {name_match}
),
observations_with_region AS (
  SELECT obs.*,
         (SELECT rb.region_id
          FROM region_boxes rb
          WHERE obs.latitude BETWEEN rb.min_lat AND rb.max_lat
            AND obs.longitude BETWEEN rb.min_lon AND rb.max_lon
          LIMIT 1) AS region_id
  FROM observations obs
)
SELECT id, "scientificName", "eventDate", longitude, latitude, region_id
FROM observations_with_region
WHERE region_id IS NOT NULL
ORDER BY "eventDate" DESC
LIMIT {limit}"#,
        boxes = REGION_BOXES,
        values = region_boxes_values(),
        name_match = name_matches(&name),
    );

    Statement::with_params(sql, params)
}

/// Number of distinct species per habitat combination
pub fn habitat_counts() -> Statement {
    Statement::new(
        r#"SELECT
  CASE
    WHEN marine = TRUE AND brackish = TRUE THEN 'Both Marine and Brackish'
    WHEN marine = TRUE THEN 'Marine Only'
    WHEN brackish = TRUE THEN 'Brackish Only'
    ELSE 'Neither'
  END AS habitat_type,
  COUNT(DISTINCT aphiaid) AS species_count
FROM obis
WHERE marine IS NOT NULL OR brackish IS NOT NULL
GROUP BY habitat_type
ORDER BY species_count DESC"#,
    )
}

/// Monthly occurrence counts, month-over-month change and mean grid temperature
pub fn monthly_trends(scientific_name: &str) -> Statement {
    let mut params = SqlParams::new();
    let name = params.push(contains_pattern(scientific_name));

    let sql = format!(
        r#"WITH monthly_counts AS (
  SELECT dl."month", COUNT(*) AS occ_count
  FROM obis o
  JOIN scientific_names sn ON o.aphiaid = sn.aphiaid
  JOIN date_lookup dl ON o."dayOfYear" = dl."dayOfYear"
  WHERE {name_match}
  GROUP BY dl."month"
),
monthly_counts_with_prev AS (
  SELECT mc."month", mc.occ_count,
         LAG(mc.occ_count) OVER (ORDER BY mc."month") AS prev_count
  FROM monthly_counts mc
),
monthly_temp AS (
  SELECT dl."month", AVG(w.temperature)::float8 AS avg_wod_temp
  FROM wod_2015 w
  JOIN date_lookup dl ON w."dayOfYear" = dl."dayOfYear"
  GROUP BY dl."month"
)
SELECT mc."month" AS month,
       mc.occ_count,
       CASE WHEN mc.prev_count IS NULL OR mc.prev_count = 0 THEN NULL
            ELSE ((mc.occ_count - mc.prev_count) * 100.0 / mc.prev_count)::float8
       END AS pct_change,
       mt.avg_wod_temp
FROM monthly_counts_with_prev mc
LEFT JOIN monthly_temp mt ON mc."month" = mt."month"
ORDER BY mc."month""#,
        name_match = name_matches(&name),
    );

    Statement::with_params(sql, params)
}

/// Per-species centroids and counts for both periods of a shift comparison
///
/// Only species with at least `min_count` occurrences in each period are
/// returned; the distance between centroids is computed by the caller.
pub fn shift_centroids(comparison: &ShiftComparison) -> Statement {
    let mut params = SqlParams::new();
    let old_start = params.push(i64::from(comparison.old_period.start));
    let old_end = params.push(i64::from(comparison.old_period.end));
    let new_start = params.push(i64::from(comparison.new_period.start));
    let new_end = params.push(i64::from(comparison.new_period.end));
    let min_count = params.push(comparison.min_count);
    let name = params.push(contains_pattern(&comparison.scientific_name));
    let name_match = name_matches(&name);

    let sql = format!(
        r#"WITH first_half AS (
  SELECT o.aphiaid, COUNT(*) AS count,
         AVG(o."decimalLatitude")::float8 AS avg_lat,
         AVG(o."decimalLongitude")::float8 AS avg_lon
  FROM obis o
  JOIN scientific_names sn ON o.aphiaid = sn.aphiaid
  WHERE o."dayOfYear" BETWEEN {old_start} AND {old_end} AND {name_match}
  GROUP BY o.aphiaid
  HAVING COUNT(*) >= {min_count}
),
second_half AS (
  SELECT o.aphiaid, COUNT(*) AS count,
         AVG(o."decimalLatitude")::float8 AS avg_lat,
         AVG(o."decimalLongitude")::float8 AS avg_lon
  FROM obis o
  JOIN scientific_names sn ON o.aphiaid = sn.aphiaid
  WHERE o."dayOfYear" BETWEEN {new_start} AND {new_end} AND {name_match}
  GROUP BY o.aphiaid
  HAVING COUNT(*) >= {min_count}
)
SELECT fh.aphiaid AS id,
       fh.avg_lat AS first_half_lat, fh.avg_lon AS first_half_lon,
       sh.avg_lat AS second_half_lat, sh.avg_lon AS second_half_lon,
       fh.count AS first_half_count, sh.count AS second_half_count
FROM first_half fh
JOIN second_half sh ON fh.aphiaid = sh.aphiaid"#
    );

    Statement::with_params(sql, params)
}

/// Species with at least one occurrence whose name contains `name`
pub fn lookup(name: Option<&str>) -> Statement {
    let mut builder = SelectBuilder::new("scientific_names sn")
        .column("sn.aphiaid AS id")
        .column("sn.\"scientificName\"")
        .join("JOIN obis o ON sn.aphiaid = o.aphiaid");
    let pattern = builder.bind(contains_pattern(name.unwrap_or_default()));
    builder
        .filter(name_matches(&pattern))
        .group_by("sn.aphiaid")
        .group_by("sn.\"scientificName\"")
        .order_by("sn.\"scientificName\" ASC")
        .limit(SPECIES_SAMPLE_LIMIT)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sql::SqlValue;
    use crate::domain::{
        DayWindow, HabitatFlags, Pagination, ShiftComparison, SpeciesSearch, SpeciesSearchInput,
        ValueRange,
    };

    fn delphinus() -> SpeciesSearch {
        SpeciesSearch::from_input(SpeciesSearchInput {
            scientific_name: Some("Delphinus".to_string()),
            page: 1,
            page_size: 10,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_search_defaults_shape() {
        let stmt = search(&delphinus());

        assert!(stmt.sql.contains("JOIN obis o ON sn.aphiaid = o.aphiaid"));
        assert!(stmt.sql.contains("sn.\"scientificName\" ILIKE $1 ESCAPE '\\'"));
        assert!(stmt.sql.contains("o.depth BETWEEN $2 AND $3"));
        assert!(stmt.sql.contains("HAVING COUNT(*) BETWEEN $4 AND $5"));
        assert!(stmt.sql.contains("ORDER BY num_sightings DESC, sn.\"scientificName\" ASC"));
        assert!(stmt.sql.ends_with("LIMIT $6 OFFSET $7"));
        assert!(!stmt.sql.contains("wod_2015"));
        assert!(!stmt.sql.contains("marine"));
        assert!(!stmt.sql.contains("brackish"));

        assert_eq!(
            stmt.params,
            vec![
                SqlValue::Text("Delphinus%".to_string()),
                SqlValue::Float(0.0),
                SqlValue::Float(11000.0),
                SqlValue::Int(1),
                SqlValue::Int(200_000),
                SqlValue::Int(10),
                SqlValue::Int(0),
            ]
        );
    }

    #[test]
    fn test_search_marine_only_habitat_clause() {
        let mut s = delphinus();
        s.habitat = HabitatFlags {
            marine: true,
            brackish: false,
        };
        let stmt = search(&s);
        assert!(stmt.sql.contains("(o.marine = TRUE)"));
        assert!(!stmt.sql.contains("brackish"));
    }

    #[test]
    fn test_search_both_habitats_or_group() {
        let mut s = delphinus();
        s.habitat = HabitatFlags {
            marine: true,
            brackish: true,
        };
        let stmt = search(&s);
        assert!(stmt.sql.contains("(o.marine = TRUE OR o.brackish = TRUE)"));
    }

    #[test]
    fn test_search_temperature_adds_join_and_filter() {
        let mut s = delphinus();
        s.temperature = Some(ValueRange::new(5.0, 20.0));
        let stmt = search(&s);

        assert!(stmt.sql.contains("LEFT JOIN wod_2015 w ON o.grid_id = w.grid_id"));
        assert!(stmt.sql.contains("AND o.depth_id = w.depth_id"));
        assert!(stmt.sql.contains(
            "(CASE WHEN w.temperature IS NOT NULL THEN w.temperature WHEN o.depth_id = 1 THEN o.sst END) BETWEEN $4 AND $5"
        ));
        // Join precedes WHERE
        let join = stmt.sql.find("LEFT JOIN").unwrap();
        let wh = stmt.sql.find("WHERE").unwrap();
        assert!(join < wh);
        assert_eq!(stmt.params[3], SqlValue::Float(5.0));
        assert_eq!(stmt.params[4], SqlValue::Float(20.0));
        assert_eq!(stmt.params.len(), 9);
    }

    #[test]
    fn test_search_pagination_bound() {
        let mut s = delphinus();
        s.pagination = Pagination::new(3, 25);
        let stmt = search(&s);
        assert_eq!(stmt.params[stmt.params.len() - 2], SqlValue::Int(25));
        assert_eq!(stmt.params[stmt.params.len() - 1], SqlValue::Int(50));
    }

    #[test]
    fn test_search_never_inlines_request_values() {
        let mut s = delphinus();
        s.name_prefix = "x'; DROP TABLE obis; --".to_string();
        s.depth = ValueRange::new(12.5, 99.25);
        let stmt = search(&s);
        assert!(!stmt.sql.contains("DROP TABLE"));
        assert!(!stmt.sql.contains("12.5"));
        assert!(!stmt.sql.contains("99.25"));
    }

    #[test]
    fn test_details_prefix_and_camel_case_columns() {
        let stmt = details("Delphinus delphis");
        assert_eq!(
            stmt.params,
            vec![SqlValue::Text("Delphinus delphis%".to_string())]
        );
        assert!(stmt.sql.contains("JOIN families f"));
        assert!(stmt.sql.contains("AS \"averageDepth\""));
        assert!(stmt.sql.contains("AS \"averagePh\""));
        assert!(stmt.sql.contains("GROUP BY \"scientificName\", family"));
    }

    #[test]
    fn test_random_sample_binds_total() {
        let stmt = random_sample(12_345);
        assert_eq!(
            stmt.params,
            vec![SqlValue::Int(12_345), SqlValue::Int(SPECIES_SAMPLE_LIMIT)]
        );
        assert!(stmt.sql.contains("ORDER BY RANDOM()"));
        assert!(stmt.sql.contains("$1::float8"));
    }

    #[test]
    fn test_cooccurrence_thresholds() {
        let stmt = cooccurrence();
        assert!(stmt.sql.contains("ROUND(o.\"decimalLatitude\"::numeric, 1)"));
        assert!(stmt.sql.contains("HAVING COUNT(*) > 5"));
        assert!(stmt.sql.contains("a.aphiaid < b.aphiaid"));
        assert_eq!(stmt.params, vec![SqlValue::Int(20)]);
    }

    #[test]
    fn test_occurrences_by_name_uses_region_boxes() {
        let stmt = occurrences_by_name("Orcinus");
        assert!(stmt.sql.starts_with(
            "WITH region_boxes(region_id, min_lat, max_lat, min_lon, max_lon) AS (\nVALUES"
        ));
        assert!(stmt.sql.contains("WHERE region_id IS NOT NULL"));
        assert!(stmt.sql.contains("ORDER BY \"eventDate\" DESC"));
        assert_eq!(
            stmt.params,
            vec![SqlValue::Text("%Orcinus%".to_string()), SqlValue::Int(100)]
        );
    }

    #[test]
    fn test_habitat_counts_has_no_params() {
        let stmt = habitat_counts();
        assert!(stmt.params.is_empty());
        assert!(stmt.sql.contains("COUNT(DISTINCT aphiaid) AS species_count"));
    }

    #[test]
    fn test_monthly_trends() {
        let stmt = monthly_trends("Thunnus");
        assert_eq!(stmt.params, vec![SqlValue::Text("%Thunnus%".to_string())]);
        assert!(stmt.sql.contains("LAG(mc.occ_count) OVER (ORDER BY mc.\"month\")"));
        assert!(stmt.sql.contains("LEFT JOIN monthly_temp mt"));
        assert!(stmt.sql.ends_with("ORDER BY mc.\"month\""));
    }

    #[test]
    fn test_shift_centroids_params() {
        let comparison = ShiftComparison {
            scientific_name: "Thunnus".to_string(),
            min_count: 10,
            old_period: DayWindow { start: 1, end: 181 },
            new_period: DayWindow { start: 182, end: 365 },
        };
        let stmt = shift_centroids(&comparison);
        assert_eq!(
            stmt.params,
            vec![
                SqlValue::Int(1),
                SqlValue::Int(181),
                SqlValue::Int(182),
                SqlValue::Int(365),
                SqlValue::Int(10),
                SqlValue::Text("%Thunnus%".to_string()),
            ]
        );
        assert!(stmt.sql.contains("o.\"dayOfYear\" BETWEEN $1 AND $2"));
        assert!(stmt.sql.contains("o.\"dayOfYear\" BETWEEN $3 AND $4"));
        assert_eq!(stmt.sql.matches("HAVING COUNT(*) >= $5").count(), 2);
        assert!(!stmt.sql.contains("ASIN"));
    }

    #[test]
    fn test_lookup_defaults_to_match_all() {
        let stmt = lookup(None);
        assert_eq!(
            stmt.params,
            vec![SqlValue::Text("%%".to_string()), SqlValue::Int(10)]
        );
        let stmt = lookup(Some("Gadus"));
        assert_eq!(stmt.params[0], SqlValue::Text("%Gadus%".to_string()));
        assert!(stmt.sql.contains("GROUP BY sn.aphiaid, sn.\"scientificName\""));
    }
}
