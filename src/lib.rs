pub mod aggregate;
pub mod bls;
pub mod change;
pub mod chartplotter;
pub mod config;
pub mod error;
pub mod mysql_db;
pub mod observation;
pub mod pipeline;
pub mod store;

pub use aggregate::{annual_averages, mean_of_populated, AnnualAverage};
pub use bls::{BlsClient, FetchedSeries, SeriesSource};
pub use change::{percent_changes, ChangePoint, ChangeSeries};
pub use config::Config;
pub use observation::{Metric, Observation, Period, YearRange};
pub use pipeline::{MetricReport, Pipeline, RunReport};
pub use store::{AnnualRecord, MemoryStore, ObservationStore};
