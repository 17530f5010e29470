use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::domain::CountryCode;
use crate::error::PandemiaError;

pub const DEFAULT_DATA_URL: &str = "https://covid.ourworldindata.org/data/owid-covid-data.json";
pub const DEFAULT_CACHE_PATH: &str = "pkg/data/owid-covid-data.json";
pub const DEFAULT_OUTPUT_PATH: &str = "pkg/charts/deaths.html";
pub const DEFAULT_CONFIG_FILE: &str = "pandemia.json";

/// Country code to display name. Built once per run and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryRegistry {
    entries: BTreeMap<CountryCode, String>,
}

impl CountryRegistry {
    pub fn new(entries: BTreeMap<CountryCode, String>) -> Self {
        Self { entries }
    }

    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, PandemiaError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut entries = BTreeMap::new();
        for (code, name) in pairs {
            let parsed = code.parse::<CountryCode>()?;
            if entries.insert(parsed, name.to_string()).is_some() {
                return Err(PandemiaError::DuplicateCountryCode(code.to_string()));
            }
        }
        Ok(Self { entries })
    }

    pub fn contains(&self, code: &CountryCode) -> bool {
        self.entries.contains_key(code)
    }

    pub fn name(&self, code: &CountryCode) -> Option<&str> {
        self.entries.get(code).map(String::as_str)
    }

    pub fn codes(&self) -> impl Iterator<Item = &CountryCode> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured codes that `present` does not report, in code order.
    pub fn missing<F>(&self, present: F) -> Vec<CountryCode>
    where
        F: Fn(&CountryCode) -> bool,
    {
        self.codes().filter(|code| !present(code)).cloned().collect()
    }
}

impl Default for CountryRegistry {
    fn default() -> Self {
        let entries = [
            ("ROU", "România"),
            ("DEU", "Germania"),
            ("ITA", "Italia"),
            ("DNK", "Danemarca"),
        ]
        .into_iter()
        .map(|(code, name)| (CountryCode::from_static(code), name.to_string()))
        .collect();
        Self { entries }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub registry: CountryRegistry,
    pub data_url: String,
    pub cache_path: Utf8PathBuf,
    pub output_path: Utf8PathBuf,
    pub max_age: Duration,
    pub http_timeout: Duration,
    pub only_last: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            registry: CountryRegistry::default(),
            data_url: DEFAULT_DATA_URL.to_string(),
            cache_path: Utf8PathBuf::from(DEFAULT_CACHE_PATH),
            output_path: Utf8PathBuf::from(DEFAULT_OUTPUT_PATH),
            max_age: Duration::from_secs(24 * 60 * 60),
            http_timeout: Duration::from_secs(15),
            only_last: 0,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub countries: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub data_url: Option<String>,
    #[serde(default)]
    pub cache_path: Option<Utf8PathBuf>,
    #[serde(default)]
    pub output_path: Option<Utf8PathBuf>,
    #[serde(default)]
    pub only_last: Option<usize>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads settings from `path`, or from `pandemia.json` when it exists, or the defaults.
    pub fn resolve(path: Option<&str>) -> Result<Settings, PandemiaError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| PandemiaError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| PandemiaError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<Settings, PandemiaError> {
        let defaults = Settings::default();

        let registry = match config.countries {
            Some(countries) => CountryRegistry::from_pairs(
                countries
                    .iter()
                    .map(|(code, name)| (code.as_str(), name.as_str())),
            )?,
            None => defaults.registry,
        };

        Ok(Settings {
            registry,
            data_url: config.data_url.unwrap_or(defaults.data_url),
            cache_path: config.cache_path.unwrap_or(defaults.cache_path),
            output_path: config.output_path.unwrap_or(defaults.output_path),
            max_age: defaults.max_age,
            http_timeout: defaults.http_timeout,
            only_last: config.only_last.unwrap_or(defaults.only_last),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_matches_builtin_table() {
        let registry = CountryRegistry::default();
        let codes = registry.codes().map(|c| c.as_str()).collect::<Vec<_>>();
        assert_eq!(codes, vec!["DEU", "DNK", "ITA", "ROU"]);
        assert_eq!(registry.name(&"ROU".parse().unwrap()), Some("România"));
    }

    #[test]
    fn codes_differing_only_in_case_are_rejected() {
        let err = CountryRegistry::from_pairs([("ROU", "Upper"), ("rou", "Lower")]).unwrap_err();
        assert!(matches!(err, PandemiaError::DuplicateCountryCode(ref code) if code == "rou"));
    }

    #[test]
    fn empty_config_resolves_to_defaults() {
        let settings = ConfigLoader::resolve_config(Config::default()).unwrap();
        assert_eq!(settings.registry, CountryRegistry::default());
        assert_eq!(settings.data_url, DEFAULT_DATA_URL);
        assert_eq!(settings.cache_path.as_str(), DEFAULT_CACHE_PATH);
        assert_eq!(settings.max_age, Duration::from_secs(86_400));
        assert_eq!(settings.http_timeout, Duration::from_secs(15));
        assert_eq!(settings.only_last, 0);
    }
}
