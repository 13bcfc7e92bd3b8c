// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "Tidewatch";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "tidewatch";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".tidewatch";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "tidewatch.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "TIDEWATCH_CONFIG";

// =============================================================================
// Environment Variables
// =============================================================================

/// Environment variable for debug mode
pub const ENV_DEBUG: &str = "TIDEWATCH_DEBUG";

/// Environment variable for server host
pub const ENV_HOST: &str = "TIDEWATCH_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "TIDEWATCH_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "TIDEWATCH_LOG";

/// Environment variable for the PostgreSQL connection URL
pub const ENV_POSTGRES_URL: &str = "TIDEWATCH_POSTGRES_URL";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 8080;

/// Request body limit (the API is read-only, bodies are ignored)
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024;

/// Seconds to wait for in-flight work during shutdown
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// PostgreSQL Defaults
// =============================================================================

pub const POSTGRES_DEFAULT_PORT: u16 = 5432;

pub const POSTGRES_DEFAULT_MAX_CONNECTIONS: u32 = 10;

pub const POSTGRES_DEFAULT_MIN_CONNECTIONS: u32 = 1;

pub const POSTGRES_DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

pub const POSTGRES_DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;

pub const POSTGRES_DEFAULT_MAX_LIFETIME_SECS: u64 = 1800;

/// Aggregations over the full occurrence table are slow; keep this generous
pub const POSTGRES_DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 120;

// =============================================================================
// Query Defaults
// =============================================================================

/// Search: default depth range in meters
pub const SEARCH_DEFAULT_DEPTH_MIN: f64 = 0.0;
pub const SEARCH_DEFAULT_DEPTH_MAX: f64 = 11000.0;

/// Search: default per-species sightings range
pub const SEARCH_DEFAULT_SIGHTINGS_MIN: i64 = 1;
pub const SEARCH_DEFAULT_SIGHTINGS_MAX: i64 = 200_000;

/// Depth bucket id of the sea surface (sst applies there)
pub const SURFACE_DEPTH_ID: i32 = 1;

/// Reference year of the occurrence and climate data
pub const REFERENCE_YEAR: i32 = 2015;

/// Shifts: defaults for the two compared periods
pub const SHIFTS_DEFAULT_MIN_COUNT: i64 = 10;
pub const SHIFTS_DEFAULT_OLD_START: &str = "2015-01-01";
pub const SHIFTS_DEFAULT_OLD_END: &str = "2015-06-30";
pub const SHIFTS_DEFAULT_NEW_START: &str = "2015-07-01";
pub const SHIFTS_DEFAULT_NEW_END: &str = "2015-12-31";

/// Maximum rows returned by the shifts endpoint
pub const SHIFTS_MAX_RESULTS: usize = 100;

/// Maximum rows for occurrence listings (by name, by coordinates)
pub const OCCURRENCE_LIST_LIMIT: i64 = 100;

/// Rows returned by the random, most-observed and lookup endpoints
pub const SPECIES_SAMPLE_LIMIT: i64 = 10;

/// Co-occurrence: grid rounding (decimal places), minimum shared cells, result size
pub const COOCCURRENCE_GRID_PRECISION: i32 = 1;
pub const COOCCURRENCE_MIN_SHARED_CELLS: i64 = 5;
pub const COOCCURRENCE_LIMIT: i64 = 20;

/// Mean Earth radius used for great-circle distances
pub const EARTH_RADIUS_KM: f64 = 6371.0;
