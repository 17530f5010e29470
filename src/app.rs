use std::time::{Duration, Instant, SystemTime};

use serde::Serialize;

use crate::align::align;
use crate::cache::{self, CacheStatus};
use crate::chart::deaths_per_million_chart;
use crate::config::Settings;
use crate::domain::Dataset;
use crate::error::PandemiaError;
use crate::owid::{self, DatasetSource};
use crate::snapshot::{read_snapshot, select_countries};

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub force_refresh: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub cache_path: String,
    pub action: String,
    pub cache_status: Option<CacheStatus>,
    pub countries: Vec<String>,
    pub days: usize,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
    pub output_path: String,
    pub generated_at: String,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

/// Forwards progress to the tracing subscriber.
pub struct LogSink;

impl ProgressSink for LogSink {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => {
                tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "{}", event.message)
            }
            None => tracing::info!("{}", event.message),
        }
    }
}

pub struct App<S: DatasetSource> {
    settings: Settings,
    source: S,
}

impl<S: DatasetSource> App<S> {
    pub fn new(settings: Settings, source: S) -> Self {
        Self { settings, source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Refreshes the snapshot when needed and returns the configured countries.
    pub fn load_data(
        &self,
        options: &RunOptions,
        sink: &dyn ProgressSink,
    ) -> Result<(Dataset, Option<CacheStatus>), PandemiaError> {
        let settings = &self.settings;
        let cache_path = &settings.cache_path;

        let status = if options.force_refresh {
            sink.event(ProgressEvent {
                message: "phase=Cache; refresh forced".to_string(),
                elapsed: None,
            });
            None
        } else {
            let status = cache::inspect(
                cache_path,
                &settings.registry,
                settings.max_age,
                SystemTime::now(),
            )?;
            sink.event(ProgressEvent {
                message: format!("phase=Cache; {}", status.reason()),
                elapsed: None,
            });
            Some(status)
        };

        if status.as_ref().is_none_or(CacheStatus::needs_refresh) {
            sink.event(ProgressEvent {
                message: format!(
                    "phase=Download; downloading data from URL {} to file {cache_path} ...",
                    self.source.location()
                ),
                elapsed: None,
            });
            let start = Instant::now();
            owid::refresh(&self.source, cache_path, &settings.registry)?;
            sink.event(ProgressEvent {
                message: "phase=Download; snapshot written".to_string(),
                elapsed: Some(start.elapsed()),
            });
        }

        let dataset = read_snapshot(cache_path)?;
        let dataset = select_countries(dataset, &settings.registry, settings.only_last);
        Ok((dataset, status))
    }

    pub fn run(&self, options: RunOptions, sink: &dyn ProgressSink) -> Result<RunResult, PandemiaError> {
        let (dataset, status) = self.load_data(&options, sink)?;
        let action = match &status {
            Some(status) if !status.needs_refresh() => "cache",
            _ => "download",
        };

        sink.event(ProgressEvent {
            message: "phase=Render; rendering daily deaths per million chart ...".to_string(),
            elapsed: None,
        });
        let aligned = align(&dataset, &self.settings.registry);
        let chart = deaths_per_million_chart(&aligned);
        chart.render_to_file(&self.settings.output_path)?;

        Ok(RunResult {
            cache_path: self.settings.cache_path.to_string(),
            action: action.to_string(),
            cache_status: status,
            countries: aligned
                .series
                .iter()
                .map(|series| series.code.to_string())
                .collect(),
            days: aligned.x_axis.len(),
            first_date: aligned.first_date().map(str::to_string),
            last_date: aligned.last_date().map(str::to_string),
            output_path: self.settings.output_path.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        })
    }
}
