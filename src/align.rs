use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::config::CountryRegistry;
use crate::domain::{CountryCode, Dataset};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedSeries {
    pub code: CountryCode,
    pub name: String,
    pub values: Vec<f64>,
}

/// Shared category axis plus one value per axis point for every country.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AlignedChart {
    pub x_axis: Vec<String>,
    pub series: Vec<AlignedSeries>,
}

impl AlignedChart {
    pub fn first_date(&self) -> Option<&str> {
        self.x_axis.first().map(String::as_str)
    }

    pub fn last_date(&self) -> Option<&str> {
        self.x_axis.last().map(String::as_str)
    }
}

/// Restricts every series to the dates that all series have in common.
///
/// Series come out in country code order. A date repeated inside one series
/// is counted once and its first observation is used.
pub fn align(dataset: &Dataset, registry: &CountryRegistry) -> AlignedChart {
    let by_date = dataset
        .iter()
        .map(|(code, country)| {
            let mut values = BTreeMap::new();
            for day in &country.data {
                values
                    .entry(day.date.as_str())
                    .or_insert(day.new_deaths_per_million);
            }
            (code, values)
        })
        .collect::<Vec<_>>();

    let mut common: Option<BTreeSet<&str>> = None;
    for (_, values) in &by_date {
        let dates = values.keys().copied().collect::<BTreeSet<_>>();
        common = Some(match common {
            Some(acc) => acc.intersection(&dates).copied().collect(),
            None => dates,
        });
    }
    let x_axis = common
        .unwrap_or_default()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();

    let series = by_date
        .iter()
        .map(|(code, values)| AlignedSeries {
            code: (*code).clone(),
            name: registry
                .name(code)
                .map(str::to_string)
                .unwrap_or_else(|| code.to_string()),
            values: x_axis
                .iter()
                .filter_map(|date| values.get(date.as_str()).copied())
                .collect(),
        })
        .collect();

    AlignedChart { x_axis, series }
}
