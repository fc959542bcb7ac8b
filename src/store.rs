use std::collections::{BTreeMap, BTreeSet};

use mysql_common::bigdecimal::BigDecimal;
use tracing::debug;

use crate::{
    error::StoreError,
    observation::{Metric, Observation},
};

/// One persisted row: a year and one nullable value per period column,
/// in the order of [`Metric::columns`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnualRecord {
    pub metric: Metric,
    pub year: i32,
    pub values: Vec<Option<BigDecimal>>,
}

impl AnnualRecord {
    pub fn empty(metric: Metric, year: i32) -> Self {
        AnnualRecord {
            metric,
            year,
            values: vec![None; metric.columns().len()],
        }
    }

    pub fn get(&self, column: &str) -> Option<&BigDecimal> {
        let index = self.metric.columns().iter().position(|c| *c == column)?;
        self.values[index].as_ref()
    }

    pub fn populated(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

/// Per-metric tables keyed by year.
///
/// Every method takes `&mut self`, so a store has a single writer at a time.
pub trait ObservationStore {
    /// Creates the metric's table if it doesn't exist yet. Safe to call every run.
    fn ensure_table(&mut self, metric: Metric) -> Result<(), StoreError>;

    /// Creates the year's row if needed, then overwrites the period's column.
    fn upsert(&mut self, observation: &Observation) -> Result<(), StoreError>;

    fn read_year(&mut self, metric: Metric, year: i32) -> Result<Option<AnnualRecord>, StoreError>;

    /// All years with a row, ascending.
    fn years(&mut self, metric: Metric) -> Result<Vec<i32>, StoreError>;
}

/// Store kept entirely in memory. Refuses writes to a table that
/// [`ObservationStore::ensure_table`] hasn't created, like the database does.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MemoryStore {
    tables: BTreeSet<Metric>,
    rows: BTreeMap<(Metric, i32), AnnualRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn row_count(&self, metric: Metric) -> usize {
        self.rows.keys().filter(|(m, _)| *m == metric).count()
    }

    fn check_table(&self, metric: Metric) -> Result<(), StoreError> {
        if self.tables.contains(&metric) {
            Ok(())
        } else {
            Err(StoreError::MissingTable(metric.table()))
        }
    }
}

impl ObservationStore for MemoryStore {
    fn ensure_table(&mut self, metric: Metric) -> Result<(), StoreError> {
        self.tables.insert(metric);
        Ok(())
    }

    fn upsert(&mut self, observation: &Observation) -> Result<(), StoreError> {
        let metric = observation.metric();
        self.check_table(metric)?;
        let row = self
            .rows
            .entry((metric, observation.year))
            .or_insert_with(|| AnnualRecord::empty(metric, observation.year));
        row.values[observation.period.index()] = Some(observation.value.clone());
        debug!(%metric, year = observation.year, period = %observation.period, "Upserted");
        Ok(())
    }

    fn read_year(&mut self, metric: Metric, year: i32) -> Result<Option<AnnualRecord>, StoreError> {
        self.check_table(metric)?;
        Ok(self.rows.get(&(metric, year)).cloned())
    }

    fn years(&mut self, metric: Metric) -> Result<Vec<i32>, StoreError> {
        self.check_table(metric)?;
        Ok(self.rows.keys().filter(|(m, _)| *m == metric).map(|(_, y)| *y).collect())
    }
}
