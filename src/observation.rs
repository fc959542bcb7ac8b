use std::fmt;

use mysql_common::bigdecimal::BigDecimal;

use crate::error::ConfigError;

/// Column names of the `unemployment` table, in calendar order.
pub const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// Column names of the `compensation` table, in calendar order.
pub const QUARTERS: [&str; 4] = ["Q01", "Q02", "Q03", "Q04"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    Unemployment,
    Compensation,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::Unemployment, Metric::Compensation];

    pub fn table(self) -> &'static str {
        match self {
            Metric::Unemployment => "unemployment",
            Metric::Compensation => "compensation",
        }
    }

    /// The allow-list of period columns for this metric's table.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Metric::Unemployment => &MONTHS,
            Metric::Compensation => &QUARTERS,
        }
    }

    pub fn default_series(self) -> &'static str {
        match self {
            Metric::Unemployment => "LNS14000000",
            Metric::Compensation => "CMU2010000000000D",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Unemployment => "Unemployment",
            Metric::Compensation => "Compensation",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// A sub-year reporting interval, stored as an index into the metric's
/// column allow-list so that an invalid column can't be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    metric: Metric,
    index: usize,
}

impl Period {
    /// Accepts a column name (`January`, `Q03`) or an API period code
    /// (`M01`..`M12` for months). Anything else, including the annual
    /// average code `M13`, is rejected.
    pub fn from_label(metric: Metric, label: &str) -> Option<Self> {
        let label = label.trim();
        let columns = metric.columns();
        if let Some(index) = columns.iter().position(|c| c.eq_ignore_ascii_case(label)) {
            return Some(Period { metric, index });
        }
        if metric == Metric::Unemployment {
            let number = label.strip_prefix('M')?.parse::<usize>().ok()?;
            if (1..=columns.len()).contains(&number) {
                return Some(Period { metric, index: number - 1 });
            }
        }
        None
    }

    pub fn metric(self) -> Metric {
        self.metric
    }

    pub fn index(self) -> usize {
        self.index
    }

    pub fn column(self) -> &'static str {
        self.metric.columns()[self.index]
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub year: i32,
    pub period: Period,
    pub value: BigDecimal,
}

impl Observation {
    pub fn new(year: i32, period: Period, value: BigDecimal) -> Self {
        Observation { year, period, value }
    }

    pub fn metric(&self) -> Metric {
        self.period.metric()
    }
}

/// Inclusive window of years that gets fetched and aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Result<Self, ConfigError> {
        if start > end {
            return Err(ConfigError::YearRange { start, end });
        }
        Ok(YearRange { start, end })
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    pub fn years(&self) -> Vec<i32> {
        (self.start..=self.end).collect()
    }
}

impl Default for YearRange {
    fn default() -> Self {
        YearRange { start: 2015, end: 2021 }
    }
}
