use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use vitalview_core::extract_dataset;
use vitalview_model::Dataset;
use vitalview_tdms::read_tdms;

/// Read the recording at `path` and extract its dataset.
///
/// Timeline values are read in the local zone of this machine.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let recording =
        read_tdms(path).with_context(|| format!("read recording {}", path.display()))?;
    let dataset = extract_dataset(&recording)
        .with_context(|| format!("extract subjects from {}", path.display()))?;
    info!(subjects = dataset.len(), "extracted dataset");
    Ok(dataset)
}
