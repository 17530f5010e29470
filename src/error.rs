use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::domain::CountryCode;

#[derive(Debug, Error, Diagnostic)]
pub enum PandemiaError {
    #[error("invalid country code: {0}")]
    InvalidCountryCode(String),

    #[error("country code listed more than once: {0}")]
    DuplicateCountryCode(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("error getting info for data file {path}: {message}")]
    CacheInspect { path: String, message: String },

    #[error("error downloading data: {0}")]
    Http(String),

    #[error("data provider returned status {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("error reading data file {path}: {message}")]
    Read { path: String, message: String },

    #[error("error unmarshaling data from {source_name}: {message}")]
    Decode {
        source_name: String,
        message: String,
    },

    #[error(
        "downloaded data does not contain all the requested countries; missing: {}",
        CodeList(.0)
    )]
    MissingCountries(Vec<CountryCode>),

    #[error("error writing downloaded data to file {path}: {message}")]
    Persist { path: String, message: String },

    #[error("error rendering chart to {path}: {message}")]
    Render { path: String, message: String },
}

struct CodeList<'a>(&'a [CountryCode]);

impl fmt::Display for CodeList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (idx, code) in self.0.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{code}")?;
        }
        write!(f, "]")
    }
}
