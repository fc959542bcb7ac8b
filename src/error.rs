use thiserror::Error;

use crate::observation::Metric;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Problem opening or creating the config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Please check your config.toml syntax: {0}")]
    Syntax(#[from] toml::de::Error),

    #[error("Config key `{key}` must be {expected}")]
    WrongType { key: String, expected: &'static str },

    #[error("start_year {start} is after end_year {end}")]
    YearRange { start: i32, end: i32 },
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Couldn't reach the statistics API: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Statistics API answered with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Couldn't parse the API response: {0}")]
    Body(#[from] json::Error),

    #[error("Statistics API rejected the request ({status}): {message}")]
    Rejected { status: String, message: String },

    #[error("Series {0} is missing from the API response")]
    MissingSeries(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] mysql::Error),

    #[error("Invalid database url: {0}")]
    Url(String),

    #[error("Table {0} has not been created yet")]
    MissingTable(&'static str),

    #[error("Stored value in {table}.{column} for {year} is not a decimal: {raw}")]
    Corrupt {
        table: &'static str,
        column: &'static str,
        year: i32,
        raw: String,
    },
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Fetching {metric} failed: {source}")]
    Fetch {
        metric: Metric,
        #[source]
        source: FetchError,
    },

    #[error("Storing {metric} failed: {source}")]
    Store {
        metric: Metric,
        #[source]
        source: StoreError,
    },
}

impl PipelineError {
    pub fn metric(&self) -> Metric {
        match self {
            PipelineError::Fetch { metric, .. } | PipelineError::Store { metric, .. } => *metric,
        }
    }
}

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Couldn't create chart directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Couldn't draw chart: {0}")]
    Draw(String),
}
