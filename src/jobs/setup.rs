use crate::config::SetupConfig;
use crate::constants::{CURRENT_TABLE, REFERENCE_TABLE};
use crate::data::Dataset;
use crate::errors::DriftError;
use crate::store::TableStore;
use log::info;

/// Write the reference rows and an empty table with the same columns.
pub fn initialize_tables<T: TableStore + ?Sized>(reference: &Dataset, store: &mut T) -> Result<(), DriftError> {
    let current = reference.empty_like();
    store.replace_table(CURRENT_TABLE, &current)?;
    store.replace_table(REFERENCE_TABLE, reference)
}

/// Load the reference file and initialize both tables.
pub fn run_setup<T: TableStore + ?Sized>(config: &SetupConfig, store: &mut T) -> Result<(), DriftError> {
    let reference = Dataset::from_csv(&config.data.reference, &config.columns.date)?;
    info!(
        "Loaded reference data from {} ({} rows, columns: {}).",
        config.data.reference.display(),
        reference.rows(),
        reference.column_names().join(", ")
    );
    initialize_tables(&reference, store)
}
