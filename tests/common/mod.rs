#![allow(dead_code)]

use std::cell::Cell;

use camino::Utf8PathBuf;
use tempfile::TempDir;

use pandemia::config::{CountryRegistry, Settings};
use pandemia::domain::{CountryCode, CountryData, Dataset, DayData, ProviderDataset};
use pandemia::error::PandemiaError;
use pandemia::owid::DatasetSource;

pub struct MockSource {
    pub document: ProviderDataset,
    pub calls: Cell<usize>,
}

impl MockSource {
    pub fn new(document: ProviderDataset) -> Self {
        Self {
            document,
            calls: Cell::new(0),
        }
    }
}

impl DatasetSource for MockSource {
    fn fetch_all(&self) -> Result<ProviderDataset, PandemiaError> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.document.clone())
    }

    fn location(&self) -> &str {
        "mock://owid"
    }
}

pub fn code(value: &str) -> CountryCode {
    value.parse().unwrap()
}

pub fn series(points: &[(&str, f64)]) -> CountryData {
    CountryData {
        data: points
            .iter()
            .map(|(date, value)| DayData {
                date: date.to_string(),
                new_deaths_per_million: *value,
            })
            .collect(),
    }
}

pub fn registry(codes: &[&str]) -> CountryRegistry {
    CountryRegistry::from_pairs(codes.iter().map(|code| (*code, *code))).unwrap()
}

pub fn provider(codes: &[&str]) -> ProviderDataset {
    codes
        .iter()
        .map(|c| {
            (
                code(c),
                series(&[("2021-03-01", 1.0), ("2021-03-02", 2.0), ("2021-03-03", 3.0)]),
            )
        })
        .collect()
}

pub fn dataset(codes: &[&str]) -> Dataset {
    provider(codes).into_iter().collect()
}

pub fn settings_in(dir: &TempDir, registry: CountryRegistry) -> Settings {
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    Settings {
        registry,
        cache_path: root.join("data").join("owid-covid-data.json"),
        output_path: root.join("charts").join("deaths.html"),
        ..Settings::default()
    }
}
