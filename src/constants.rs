pub const DEFAULT_PVALUE_THRESHOLD: f64 = 0.05;
pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 0.1;
pub const DEFAULT_DRIFT_SHARE: f64 = 0.5;
/// Reference sizes above this switch from hypothesis tests to distances.
pub const LARGE_SAMPLE_LIMIT: usize = 1000;
/// Numerical columns with at most this many unique values are treated as discrete.
pub const NUMERICAL_UNIQUE_LIMIT: usize = 5;
/// Categorical columns with at most this many unique values use the proportion Z-test.
pub const BINARY_UNIQUE_LIMIT: usize = 2;
pub const WASSERSTEIN_MIN_STD: f64 = 0.001;
/// Largest `n1 * n2` for which the KS p-value is computed exactly.
pub const KS_EXACT_MAX_PRODUCT: usize = 10_000;
/// Postgres truncates identifiers longer than this.
pub const MAX_IDENTIFIER_BYTES: usize = 63;
pub const INSERT_BATCH_ROWS: usize = 500;
pub const REFERENCE_TABLE: &str = "reference";
pub const CURRENT_TABLE: &str = "current";
