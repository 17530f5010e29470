use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::PandemiaError;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn from_static(code: &'static str) -> Self {
        Self(code.to_string())
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CountryCode {
    type Err = PandemiaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern = PATTERN.get_or_init(|| {
            Regex::new(r"^[A-Z0-9_]{2,16}$").expect("country code pattern is valid")
        });
        let normalized = value.trim().to_uppercase();
        if !pattern.is_match(&normalized) {
            return Err(PandemiaError::InvalidCountryCode(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayData {
    pub date: String,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub new_deaths_per_million: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CountryData {
    #[serde(default)]
    pub data: Vec<DayData>,
}

impl CountryData {
    /// Keeps the final `count` observations; a count past the series length keeps everything.
    pub fn keep_last(&mut self, count: usize) {
        let len = self.data.len();
        if count < len {
            self.data.drain(..len - count);
        }
    }
}

/// Filtered per-country data, as stored in the local snapshot.
pub type Dataset = BTreeMap<CountryCode, CountryData>;

/// The complete provider document. Key order carries no meaning.
pub type ProviderDataset = HashMap<CountryCode, CountryData>;

fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_country_code_valid() {
        let code: CountryCode = " rou ".parse().unwrap();
        assert_eq!(code.as_str(), "ROU");

        let aggregate: CountryCode = "OWID_WRL".parse().unwrap();
        assert_eq!(aggregate.as_str(), "OWID_WRL");
    }

    #[test]
    fn parse_country_code_invalid() {
        let err = "R".parse::<CountryCode>().unwrap_err();
        assert_matches!(err, PandemiaError::InvalidCountryCode(_));

        let err = "RO U".parse::<CountryCode>().unwrap_err();
        assert_matches!(err, PandemiaError::InvalidCountryCode(_));
    }

    #[test]
    fn decode_ignores_extra_fields_and_nulls() {
        let raw = r#"{
            "continent": "Europe",
            "data": [
                {"date": "2021-01-01", "total_cases": 12, "new_deaths_per_million": 1.5},
                {"date": "2021-01-02", "new_deaths_per_million": null},
                {"date": "2021-01-03"}
            ]
        }"#;
        let country: CountryData = serde_json::from_str(raw).unwrap();
        assert_eq!(country.data.len(), 3);
        assert_eq!(country.data[0].new_deaths_per_million, 1.5);
        assert_eq!(country.data[1].new_deaths_per_million, 0.0);
        assert_eq!(country.data[2].new_deaths_per_million, 0.0);
    }

    #[test]
    fn keep_last_clamps_to_series_length() {
        let mut country = CountryData {
            data: ["2021-01-01", "2021-01-02", "2021-01-03"]
                .iter()
                .map(|date| DayData {
                    date: date.to_string(),
                    new_deaths_per_million: 1.0,
                })
                .collect(),
        };

        country.keep_last(2);
        let dates = country.data.iter().map(|d| d.date.as_str()).collect::<Vec<_>>();
        assert_eq!(dates, vec!["2021-01-02", "2021-01-03"]);

        country.keep_last(10);
        assert_eq!(country.data.len(), 2);
    }
}
