use std::{str::FromStr, time::Duration};

use json::JsonValue;
use mysql_common::bigdecimal::BigDecimal;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::FetchError,
    observation::{Metric, Observation, Period, YearRange},
};

const REQUEST_SUCCEEDED: &str = "REQUEST_SUCCEEDED";

/// Observations parsed out of one series, plus how many data points were
/// dropped because they couldn't be turned into an [`Observation`].
#[derive(Debug, Default, PartialEq)]
pub struct FetchedSeries {
    pub observations: Vec<Observation>,
    pub skipped: usize,
}

/// Anything that can hand the pipeline the observations of a series.
pub trait SeriesSource {
    fn fetch(&self, metric: Metric, series_id: &str, years: YearRange) -> Result<FetchedSeries, FetchError>;
}

pub struct BlsClient {
    key: String,
    api_url: String,
    client: reqwest::blocking::Client,
}

impl BlsClient {
    pub fn new(key: &str, api_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        Ok(BlsClient {
            key: String::from(key),
            api_url: String::from(api_url),
            client,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        BlsClient::new(&config.key, &config.api_url, config.timeout)
    }
}

impl SeriesSource for BlsClient {
    fn fetch(&self, metric: Metric, series_id: &str, years: YearRange) -> Result<FetchedSeries, FetchError> {
        info!(%metric, series_id, start = years.start(), end = years.end(), "Requesting series");
        let body = request_body(series_id, years, &self.key);

        let response = self
            .client
            .post(&self.api_url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(FetchError::Status { status: status.as_u16(), body });
        }

        let text = response.text()?;
        let fetched = parse_response(metric, series_id, &text)?;
        info!(
            %metric,
            observations = fetched.observations.len(),
            skipped = fetched.skipped,
            "Parsed series"
        );
        Ok(fetched)
    }
}

/// `{"seriesid": [id], "startyear": "YYYY", "endyear": "YYYY", "registrationkey": key}`
pub fn request_body(series_id: &str, years: YearRange, key: &str) -> String {
    let mut body = JsonValue::new_object();
    body["seriesid"] = JsonValue::from(vec![series_id]);
    body["startyear"] = JsonValue::from(years.start().to_string());
    body["endyear"] = JsonValue::from(years.end().to_string());
    if !key.is_empty() {
        body["registrationkey"] = JsonValue::from(key);
    }
    body.dump()
}

/// Parses the API envelope and keeps the data points of `series_id`.
/// Points that don't carry a usable year, period or value are skipped.
pub fn parse_response(metric: Metric, series_id: &str, text: &str) -> Result<FetchedSeries, FetchError> {
    let parsed = json::parse(text)?;

    let messages: Vec<String> = parsed["message"].members().map(|m| m.to_string()).collect();
    let status = parsed["status"].as_str().unwrap_or_default();
    if status != REQUEST_SUCCEEDED {
        return Err(FetchError::Rejected {
            status: String::from(status),
            message: messages.join("; "),
        });
    }
    for message in &messages {
        warn!(%metric, series_id, "API message: {}", message);
    }

    let series = parsed["Results"]["series"]
        .members()
        .find(|s| s["seriesID"].as_str() == Some(series_id))
        .ok_or_else(|| FetchError::MissingSeries(String::from(series_id)))?;

    let mut fetched = FetchedSeries::default();
    for point in series["data"].members() {
        match parse_point(metric, point) {
            Some(observation) => fetched.observations.push(observation),
            None => {
                fetched.skipped += 1;
                warn!(
                    %metric,
                    year = %point["year"],
                    period = %point["period"],
                    value = %point["value"],
                    "Skipping data point"
                );
            }
        }
    }
    debug!(%metric, points = fetched.observations.len() + fetched.skipped, "Walked data points");
    Ok(fetched)
}

/// Text of a field sent either as a JSON string or a bare number.
fn text_or_number(field: &JsonValue) -> Option<String> {
    field
        .as_str()
        .map(|s| String::from(s.trim()))
        .or_else(|| field.as_number().map(|n| n.to_string()))
}

fn parse_point(metric: Metric, point: &JsonValue) -> Option<Observation> {
    let year = text_or_number(&point["year"])?.parse::<i32>().ok()?;
    let period = point["period"]
        .as_str()
        .and_then(|code| Period::from_label(metric, code))
        .or_else(|| point["periodName"].as_str().and_then(|name| Period::from_label(metric, name)))?;
    let value = BigDecimal::from_str(&text_or_number(&point["value"])?).ok()?;
    Some(Observation::new(year, period, value))
}
