//! Jobs
//!
//! The two batch pipelines: drift detection and reference table setup. Each
//! takes its configuration and collaborators explicitly and runs to completion.

pub mod detect;
pub mod setup;


pub use detect::run_detect;
pub use setup::{initialize_tables, run_setup};
