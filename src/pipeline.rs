use tracing::{error, info};

use crate::{
    aggregate::{annual_averages, AnnualAverage},
    bls::SeriesSource,
    change::ChangeSeries,
    config::Config,
    error::{PipelineError, StoreError},
    observation::{Metric, YearRange},
    store::ObservationStore,
};

#[derive(Debug, Clone, PartialEq)]
pub struct MetricReport {
    pub metric: Metric,
    pub ingested: usize,
    pub skipped: usize,
    pub averages: Vec<AnnualAverage>,
    pub changes: ChangeSeries,
}

#[derive(Debug)]
pub struct RunReport {
    pub years: Vec<i32>,
    pub unemployment: Result<MetricReport, PipelineError>,
    pub compensation: Result<MetricReport, PipelineError>,
}

impl RunReport {
    pub fn labels(&self) -> Vec<String> {
        self.years.iter().map(|y| y.to_string()).collect()
    }

    pub fn get(&self, metric: Metric) -> &Result<MetricReport, PipelineError> {
        match metric {
            Metric::Unemployment => &self.unemployment,
            Metric::Compensation => &self.compensation,
        }
    }

    pub fn failures(&self) -> Vec<&PipelineError> {
        Metric::ALL.iter().filter_map(|m| self.get(*m).as_ref().err()).collect()
    }
}

pub struct Pipeline<F, S> {
    pub source: F,
    pub store: S,
    pub years: YearRange,
    pub unemployment_series: String,
    pub compensation_series: String,
}

impl<F: SeriesSource, S: ObservationStore> Pipeline<F, S> {
    pub fn new(source: F, store: S, years: YearRange) -> Self {
        Pipeline {
            source,
            store,
            years,
            unemployment_series: String::from(Metric::Unemployment.default_series()),
            compensation_series: String::from(Metric::Compensation.default_series()),
        }
    }

    pub fn from_config(config: &Config, source: F, store: S) -> Self {
        Pipeline {
            source,
            store,
            years: config.years,
            unemployment_series: String::from(config.series_for(Metric::Unemployment)),
            compensation_series: String::from(config.series_for(Metric::Compensation)),
        }
    }

    fn series_for(&self, metric: Metric) -> &str {
        match metric {
            Metric::Unemployment => &self.unemployment_series,
            Metric::Compensation => &self.compensation_series,
        }
    }

    /// Fetch, store, aggregate and derive changes for one metric.
    pub fn run_metric(&mut self, metric: Metric) -> Result<MetricReport, PipelineError> {
        let store_err = |source: StoreError| PipelineError::Store { metric, source };

        self.store.ensure_table(metric).map_err(store_err)?;

        let fetched = self
            .source
            .fetch(metric, self.series_for(metric), self.years)
            .map_err(|source| PipelineError::Fetch { metric, source })?;

        for observation in &fetched.observations {
            self.store.upsert(observation).map_err(store_err)?;
        }
        info!(%metric, upserted = fetched.observations.len(), "Stored observations");

        let averages = annual_averages(&mut self.store, metric, &self.years.years()).map_err(store_err)?;
        let changes = ChangeSeries::from_averages(&averages);

        Ok(MetricReport {
            metric,
            ingested: fetched.observations.len(),
            skipped: fetched.skipped,
            averages,
            changes,
        })
    }

    /// Runs both metrics one after the other. A failure in one is logged and
    /// doesn't stop the other.
    pub fn run(&mut self) -> RunReport {
        let mut run_logged = |metric: Metric| {
            let result = self.run_metric(metric);
            if let Err(e) = &result {
                error!(%metric, "{}", e);
            }
            result
        };
        let unemployment = run_logged(Metric::Unemployment);
        let compensation = run_logged(Metric::Compensation);

        RunReport {
            years: self.years.years(),
            unemployment,
            compensation,
        }
    }
}
