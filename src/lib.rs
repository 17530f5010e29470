pub mod align;
pub mod app;
pub mod cache;
pub mod chart;
pub mod config;
pub mod domain;
pub mod error;
pub mod output;
pub mod owid;
pub mod snapshot;
