use mysql_common::bigdecimal::{BigDecimal, ToPrimitive};
use tracing::debug;

use crate::{
    error::StoreError,
    observation::Metric,
    store::ObservationStore,
};

#[derive(Debug, Clone, PartialEq)]
pub struct AnnualAverage {
    pub metric: Metric,
    pub year: i32,
    /// `None` when the year has no row or no populated period.
    pub average: Option<f64>,
}

/// Sum of the populated values divided by how many were populated.
pub fn mean_of_populated(values: &[Option<BigDecimal>]) -> Option<BigDecimal> {
    let populated: Vec<&BigDecimal> = values.iter().flatten().collect();
    if populated.is_empty() {
        return None;
    }
    let sum: BigDecimal = populated.iter().fold(BigDecimal::from(0), |acc, v| acc + *v);
    Some(sum / BigDecimal::from(populated.len() as u64))
}

/// One average per entry of `years`, in the same order.
pub fn annual_averages<S: ObservationStore>(
    store: &mut S,
    metric: Metric,
    years: &[i32],
) -> Result<Vec<AnnualAverage>, StoreError> {
    let mut averages = Vec::with_capacity(years.len());
    for &year in years {
        let average = store
            .read_year(metric, year)?
            .and_then(|record| mean_of_populated(&record.values))
            .and_then(|mean| mean.to_f64());
        debug!(%metric, year, ?average, "Annual average");
        averages.push(AnnualAverage { metric, year, average });
    }
    Ok(averages)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::{
        observation::{Observation, Period, MONTHS},
        store::MemoryStore,
    };

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn mean_ignores_missing_periods() {
        let values = vec![Some(dec("3.5")), None, Some(dec("4.5")), None];
        assert_eq!(mean_of_populated(&values), Some(dec("4")));
    }

    #[test]
    fn mean_of_nothing_is_missing() {
        assert_eq!(mean_of_populated(&[None, None, None, None]), None);
        assert_eq!(mean_of_populated(&[]), None);
    }

    #[test]
    fn twelve_months_round_trip() {
        let mut store = MemoryStore::new();
        store.ensure_table(Metric::Unemployment).unwrap();
        let values = [
            "3.5", "3.5", "4.4", "14.8", "13.3", "11.1", "10.2", "8.4", "7.8", "6.9", "6.7", "6.7",
        ];
        for (month, value) in MONTHS.iter().zip(values.iter()) {
            let period = Period::from_label(Metric::Unemployment, month).unwrap();
            store.upsert(&Observation::new(2020, period, dec(value))).unwrap();
        }

        let expected: f64 = values.iter().map(|v| v.parse::<f64>().unwrap()).sum::<f64>() / 12.0;
        let averages = annual_averages(&mut store, Metric::Unemployment, &[2020]).unwrap();
        assert_eq!(averages.len(), 1);
        assert!(close(averages[0].average.unwrap(), expected));
    }

    #[test]
    fn sparse_and_missing_years() {
        let mut store = MemoryStore::new();
        store.ensure_table(Metric::Compensation).unwrap();
        let q1 = Period::from_label(Metric::Compensation, "Q01").unwrap();
        let q3 = Period::from_label(Metric::Compensation, "Q03").unwrap();
        store.upsert(&Observation::new(2018, q1, dec("2.0"))).unwrap();
        store.upsert(&Observation::new(2018, q3, dec("3.0"))).unwrap();
        store.upsert(&Observation::new(2020, q1, dec("5.0"))).unwrap();

        let averages = annual_averages(&mut store, Metric::Compensation, &[2018, 2019, 2020]).unwrap();
        let years: Vec<i32> = averages.iter().map(|a| a.year).collect();
        assert_eq!(years, vec![2018, 2019, 2020]);
        assert!(close(averages[0].average.unwrap(), 2.5));
        assert_eq!(averages[1].average, None);
        assert!(close(averages[2].average.unwrap(), 5.0));
    }

    #[test]
    fn unensured_table_is_an_error() {
        let mut store = MemoryStore::new();
        assert!(annual_averages(&mut store, Metric::Unemployment, &[2020]).is_err());
    }
}
