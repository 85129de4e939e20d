// Modules
pub mod config;
pub mod constants;
pub mod data;
pub mod drift;
pub mod errors;
pub mod jobs;
pub mod mapping;
pub mod outputs;
pub mod store;
pub mod utils;

// Individual classes, and functions
pub use config::{DetectConfig, SetupConfig};
pub use data::Dataset;
pub use drift::{DriftDetector, DriftReport, DriftVerdict, StatTestDetector};
pub use errors::DriftError;
pub use mapping::ColumnMapping;
