//! Loading [`ScenarioParams`] from JSON documents.
//!
//! Missing fields fall back to the classic defaults, so `{}` is the
//! four-machine, one-repairman scenario. Unknown fields are an error.

use std::fs;
use std::path::Path;

use repairman_core::scenario::ScenarioParams;

use crate::error::ExperimentError;

pub fn load_params(path: impl AsRef<Path>) -> Result<ScenarioParams, ExperimentError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ExperimentError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ExperimentError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}
