use std::io;
use std::time::{Duration, SystemTime};

use camino::Utf8Path;
use serde::Serialize;

use crate::config::CountryRegistry;
use crate::domain::CountryCode;
use crate::error::PandemiaError;
use crate::snapshot::read_snapshot;

/// Outcome of inspecting the local snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CacheStatus {
    Missing,
    Stale { age_secs: u64 },
    Incomplete { missing: Vec<CountryCode> },
    Fresh { age_secs: u64 },
}

impl CacheStatus {
    pub fn needs_refresh(&self) -> bool {
        !matches!(self, CacheStatus::Fresh { .. })
    }

    pub fn reason(&self) -> String {
        match self {
            CacheStatus::Missing => "data file does not exist".to_string(),
            CacheStatus::Stale { age_secs } => {
                format!("data file is stale ({}h old)", age_secs / 3600)
            }
            CacheStatus::Incomplete { missing } => {
                let codes = missing.iter().map(CountryCode::as_str).collect::<Vec<_>>();
                format!("data file is missing countries: {}", codes.join(", "))
            }
            CacheStatus::Fresh { .. } => "data file is fresh".to_string(),
        }
    }
}

/// Decides whether the snapshot at `path` can be used for `registry`.
///
/// A stale snapshot is not decoded at all. A fresh one is decoded to check
/// that every configured country is present; decode failures are returned as
/// errors rather than treated as a miss.
pub fn inspect(
    path: &Utf8Path,
    registry: &CountryRegistry,
    max_age: Duration,
    now: SystemTime,
) -> Result<CacheStatus, PandemiaError> {
    let metadata = match path.as_std_path().metadata() {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(CacheStatus::Missing),
        Err(err) => return Err(inspect_error(path, err)),
    };
    let modified = metadata.modified().map_err(|err| inspect_error(path, err))?;
    let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
    if age > max_age {
        return Ok(CacheStatus::Stale {
            age_secs: age.as_secs(),
        });
    }

    let dataset = read_snapshot(path)?;
    let missing = registry.missing(|code| dataset.contains_key(code));
    if !missing.is_empty() {
        return Ok(CacheStatus::Incomplete { missing });
    }

    Ok(CacheStatus::Fresh {
        age_secs: age.as_secs(),
    })
}

fn inspect_error(path: &Utf8Path, err: io::Error) -> PandemiaError {
    PandemiaError::CacheInspect {
        path: path.to_string(),
        message: err.to_string(),
    }
}
