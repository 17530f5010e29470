use std::time::Duration;

use camino::Utf8Path;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::config::CountryRegistry;
use crate::domain::{Dataset, ProviderDataset};
use crate::error::PandemiaError;
use crate::snapshot::{decode, write_snapshot};

/// Source of the full provider document.
pub trait DatasetSource {
    fn fetch_all(&self) -> Result<ProviderDataset, PandemiaError>;

    /// Where the data comes from, for progress messages.
    fn location(&self) -> &str;
}

#[derive(Clone)]
pub struct OwidHttpClient {
    client: Client,
    url: String,
}

impl OwidHttpClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, PandemiaError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("pandemia/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| PandemiaError::Http(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| PandemiaError::Http(err.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Only `200 OK` carries the full document; any other status is an error.
    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, PandemiaError> {
        if response.status() == StatusCode::OK {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "data download failed".to_string());
        Err(PandemiaError::HttpStatus { status, message })
    }
}

impl DatasetSource for OwidHttpClient {
    fn fetch_all(&self) -> Result<ProviderDataset, PandemiaError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .map_err(|err| PandemiaError::Http(format!("{}: {err}", self.url)))?;
        let response = Self::handle_status(response)?;
        let body = response
            .bytes()
            .map_err(|err| PandemiaError::Http(format!("reading response from {}: {err}", self.url)))?;
        decode(&body, &format!("response of {}", self.url))
    }

    fn location(&self) -> &str {
        &self.url
    }
}

/// Picks the configured countries out of the provider document.
///
/// The scan stops as soon as every configured country has been seen. Fails
/// with the sorted list of configured codes the document does not contain.
pub fn filter_countries(
    all: ProviderDataset,
    registry: &CountryRegistry,
) -> Result<Dataset, PandemiaError> {
    let mut filtered = Dataset::new();
    for (code, country) in all {
        if registry.contains(&code) {
            filtered.insert(code, country);
        }
        if filtered.len() == registry.len() {
            break;
        }
    }

    let missing = registry.missing(|code| filtered.contains_key(code));
    if !missing.is_empty() {
        return Err(PandemiaError::MissingCountries(missing));
    }
    Ok(filtered)
}

/// Downloads the provider document and stores the configured countries at `path`.
pub fn refresh<S: DatasetSource + ?Sized>(
    source: &S,
    path: &Utf8Path,
    registry: &CountryRegistry,
) -> Result<Dataset, PandemiaError> {
    let all = source.fetch_all()?;
    tracing::debug!(countries = all.len(), "decoded provider document");
    let filtered = filter_countries(all, registry)?;
    write_snapshot(path, &filtered)?;
    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::domain::{CountryCode, CountryData};

    fn provider(codes: &[&str]) -> ProviderDataset {
        codes
            .iter()
            .map(|code| (code.parse::<CountryCode>().unwrap(), CountryData::default()))
            .collect()
    }

    #[test]
    fn filter_keeps_exactly_configured_countries() {
        let registry = CountryRegistry::from_pairs([("ROU", "România"), ("ITA", "Italia")]).unwrap();
        let filtered = filter_countries(provider(&["ROU", "ITA", "FRA", "ESP"]), &registry).unwrap();
        let codes = filtered.keys().map(|c| c.as_str()).collect::<Vec<_>>();
        assert_eq!(codes, vec!["ITA", "ROU"]);
    }

    #[test]
    fn filter_reports_missing_countries() {
        let registry = CountryRegistry::from_pairs([("ROU", "România"), ("ITA", "Italia")]).unwrap();
        let err = filter_countries(provider(&["ROU", "FRA"]), &registry).unwrap_err();
        assert_matches!(err, PandemiaError::MissingCountries(ref missing) if missing.len() == 1);
        assert!(err.to_string().ends_with("missing: [ITA]"));
    }

    #[test]
    fn filter_with_empty_registry_is_empty() {
        let registry = CountryRegistry::new(Default::default());
        let filtered = filter_countries(provider(&["ROU"]), &registry).unwrap();
        assert!(filtered.is_empty());
    }
}
