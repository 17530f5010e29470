use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use pandemia::app::{App, LogSink, RunOptions};
use pandemia::config::ConfigLoader;
use pandemia::error::PandemiaError;
use pandemia::output::{JsonOutput, OutputMode, print_summary};
use pandemia::owid::OwidHttpClient;

#[derive(Parser)]
#[command(name = "pandemia")]
#[command(about = "Chart daily COVID deaths per million for a set of countries")]
#[command(version, author)]
struct Cli {
    /// JSON config file (defaults to pandemia.json when present)
    #[arg(long)]
    config: Option<String>,

    /// Keep only the last N days of every series
    #[arg(long)]
    last: Option<usize>,

    /// Download the data even when the local snapshot is usable
    #[arg(long)]
    refresh: bool,

    #[arg(long)]
    cache: Option<Utf8PathBuf>,

    #[arg(long)]
    output: Option<Utf8PathBuf>,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<PandemiaError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &PandemiaError) -> u8 {
    match error {
        PandemiaError::InvalidCountryCode(_)
        | PandemiaError::DuplicateCountryCode(_)
        | PandemiaError::ConfigRead(_)
        | PandemiaError::ConfigParse(_) => 2,
        PandemiaError::Http(_)
        | PandemiaError::HttpStatus { .. }
        | PandemiaError::MissingCountries(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    let mut settings = ConfigLoader::resolve(cli.config.as_deref())?;
    if let Some(last) = cli.last {
        settings.only_last = last;
    }
    if let Some(cache) = cli.cache {
        settings.cache_path = cache;
    }
    if let Some(output) = cli.output {
        settings.output_path = output;
    }

    let source = OwidHttpClient::new(settings.data_url.clone(), settings.http_timeout)?;
    let app = App::new(settings, source);
    let options = RunOptions {
        force_refresh: cli.refresh,
    };

    match output_mode {
        OutputMode::Text => {
            let result = app.run(options, &LogSink)?;
            print_summary(&result);
        }
        OutputMode::Json => {
            let result = app.run(options, &JsonOutput)?;
            JsonOutput::print_run(&result).into_diagnostic()?;
        }
    }
    Ok(())
}
