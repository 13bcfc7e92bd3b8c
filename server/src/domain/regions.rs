//! Ocean regions
//!
//! One static table serves both the in-process coordinate lookup and the
//! `region_boxes` CTE embedded in region-aware statements. The Pacific is
//! split into east and west halves because its boxes straddle the
//! antimeridian.

use super::error::DomainError;

/// Inclusive lat/lon bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Bounds {
    const fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Edges are inclusive; NaN never matches
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OceanRegion {
    pub id: &'static str,
    pub name: &'static str,
    pub bounds: Bounds,
}

/// Regions in lookup order; the first containing box wins
pub static OCEAN_REGIONS: [OceanRegion; 9] = [
    OceanRegion {
        id: "northPacific_west",
        name: "North Pacific",
        bounds: Bounds::new(0.0, 66.5, 120.0, 180.0),
    },
    OceanRegion {
        id: "northPacific_east",
        name: "North Pacific",
        bounds: Bounds::new(0.0, 66.5, -180.0, -120.0),
    },
    OceanRegion {
        id: "southPacific_west",
        name: "South Pacific",
        bounds: Bounds::new(-60.0, 0.0, 120.0, 180.0),
    },
    OceanRegion {
        id: "southPacific_east",
        name: "South Pacific",
        bounds: Bounds::new(-60.0, 0.0, -180.0, -70.0),
    },
    OceanRegion {
        id: "northAtlantic",
        name: "North Atlantic",
        bounds: Bounds::new(0.0, 66.5, -70.0, 20.0),
    },
    OceanRegion {
        id: "southAtlantic",
        name: "South Atlantic",
        bounds: Bounds::new(-60.0, 0.0, -70.0, 20.0),
    },
    OceanRegion {
        id: "indianOcean",
        name: "Indian Ocean",
        bounds: Bounds::new(-60.0, 30.0, 20.0, 146.5),
    },
    OceanRegion {
        id: "arcticOcean",
        name: "Arctic Ocean",
        bounds: Bounds::new(66.5, 90.0, -180.0, 180.0),
    },
    OceanRegion {
        id: "southernOcean",
        name: "Southern Ocean",
        bounds: Bounds::new(-90.0, -60.0, -180.0, 180.0),
    },
];

/// CTE name and column list matching [`region_boxes_values`]
pub const REGION_BOXES: &str = "region_boxes(region_id, min_lat, max_lat, min_lon, max_lon)";

/// Wrap a longitude into [-180, 180]
///
/// Values already in range are returned unchanged, so the function is
/// idempotent. Non-finite input passes through and matches no region.
pub fn normalize_longitude(lon: f64) -> f64 {
    if !lon.is_finite() || (-180.0..=180.0).contains(&lon) {
        return lon;
    }
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Find the first region containing the point
pub fn find_region(lat: f64, lon: f64) -> Result<&'static OceanRegion, DomainError> {
    let lon = normalize_longitude(lon);
    OCEAN_REGIONS
        .iter()
        .find(|r| r.bounds.contains(lat, lon))
        .ok_or_else(|| {
            DomainError::not_found(
                "REGION_NOT_FOUND",
                "No ocean region found for these coordinates",
            )
        })
}

pub fn region_by_id(id: &str) -> Option<&'static OceanRegion> {
    OCEAN_REGIONS.iter().find(|r| r.id == id)
}

/// One region per display name, keeping the first id in table order
pub fn distinct_regions() -> Vec<&'static OceanRegion> {
    let mut seen: Vec<&str> = Vec::new();
    OCEAN_REGIONS
        .iter()
        .filter(|r| {
            if seen.contains(&r.name) {
                false
            } else {
                seen.push(r.name);
                true
            }
        })
        .collect()
}

/// Render the region table as a `VALUES` list for the `region_boxes` CTE
pub fn region_boxes_values() -> String {
    let rows: Vec<String> = OCEAN_REGIONS
        .iter()
        .map(|r| {
            format!(
                "  ('{}', {:?}::float8, {:?}::float8, {:?}::float8, {:?}::float8)",
                r.id, r.bounds.min_lat, r.bounds.max_lat, r.bounds.min_lon, r.bounds.max_lon
            )
        })
        .collect();
    format!("VALUES\n{}", rows.join(",\n"))
}
