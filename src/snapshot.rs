use std::fs;

use camino::Utf8Path;
use serde::de::DeserializeOwned;

use crate::config::CountryRegistry;
use crate::domain::Dataset;
use crate::error::PandemiaError;

/// Reads the cached snapshot at `path`.
pub fn read_snapshot(path: &Utf8Path) -> Result<Dataset, PandemiaError> {
    let bytes = fs::read(path.as_std_path()).map_err(|err| PandemiaError::Read {
        path: path.to_string(),
        message: err.to_string(),
    })?;
    decode(&bytes, &format!("JSON file {path}"))
}

/// Writes `dataset` as two-space indented JSON, replacing whatever is at `path`.
pub fn write_snapshot(path: &Utf8Path, dataset: &Dataset) -> Result<(), PandemiaError> {
    let persist_err = |message: String| PandemiaError::Persist {
        path: path.to_string(),
        message,
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) {
        fs::create_dir_all(parent.as_std_path()).map_err(|err| persist_err(err.to_string()))?;
    }
    let content = serde_json::to_vec_pretty(dataset).map_err(|err| persist_err(err.to_string()))?;
    fs::write(path.as_std_path(), content).map_err(|err| persist_err(err.to_string()))
}

/// Keeps only the configured countries and, when `only_last` is positive, the
/// final `only_last` days of each series.
pub fn select_countries(dataset: Dataset, registry: &CountryRegistry, only_last: usize) -> Dataset {
    dataset
        .into_iter()
        .filter(|(code, _)| registry.contains(code))
        .map(|(code, mut country)| {
            if only_last > 0 {
                country.keep_last(only_last);
            }
            (code, country)
        })
        .collect()
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8], source_name: &str) -> Result<T, PandemiaError> {
    serde_json::from_slice(bytes).map_err(|err| PandemiaError::Decode {
        source_name: source_name.to_string(),
        message: err.to_string(),
    })
}
