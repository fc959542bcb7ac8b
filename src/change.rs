use crate::aggregate::AnnualAverage;

/// Year-over-year percent changes, one shorter than `averages`.
///
/// Element `i` is the move from `averages[i]` to `averages[i + 1]`. It is
/// `None` when either side is missing or the earlier value is zero, so the
/// output stays aligned with the year labels.
pub fn percent_changes(averages: &[Option<f64>]) -> Vec<Option<f64>> {
    averages
        .windows(2)
        .map(|pair| match (pair[0], pair[1]) {
            (Some(prev), Some(curr)) if prev != 0.0 => Some((curr - prev) / prev * 100.0),
            _ => None,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangePoint {
    /// The later year of the transition.
    pub year: i32,
    pub percent: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSeries {
    pub points: Vec<ChangePoint>,
}

impl ChangeSeries {
    pub fn from_averages(averages: &[AnnualAverage]) -> Self {
        let values: Vec<Option<f64>> = averages.iter().map(|a| a.average).collect();
        let points = averages
            .iter()
            .skip(1)
            .zip(percent_changes(&values))
            .map(|(a, percent)| ChangePoint { year: a.year, percent })
            .collect();
        ChangeSeries { points }
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.percent).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::Metric;

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("change should be defined");
        assert!((actual - expected).abs() < 1e-9, "{} != {}", actual, expected);
    }

    #[test]
    fn up_then_down() {
        let changes = percent_changes(&[Some(100.0), Some(110.0), Some(99.0)]);
        assert_eq!(changes.len(), 2);
        assert_close(changes[0], 10.0);
        assert_close(changes[1], -10.0);
    }

    #[test]
    fn missing_first_year() {
        let changes = percent_changes(&[None, Some(50.0), Some(60.0)]);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0], None);
        assert_close(changes[1], 20.0);
    }

    #[test]
    fn gap_in_the_middle_keeps_alignment() {
        let changes = percent_changes(&[Some(4.0), None, Some(5.0), Some(6.0)]);
        assert_eq!(changes.len(), 3);
        assert_eq!(changes[0], None);
        assert_eq!(changes[1], None);
        assert_close(changes[2], 20.0);
    }

    #[test]
    fn zero_base_is_undefined() {
        assert_eq!(percent_changes(&[Some(0.0), Some(3.0)]), vec![None]);
    }

    #[test]
    fn short_inputs() {
        assert!(percent_changes(&[]).is_empty());
        assert!(percent_changes(&[Some(1.0)]).is_empty());
    }

    #[test]
    fn series_labels_later_year() {
        let averages: Vec<AnnualAverage> = [(2015, Some(5.3)), (2016, Some(4.9)), (2017, None)]
            .iter()
            .map(|&(year, average)| AnnualAverage { metric: Metric::Unemployment, year, average })
            .collect();
        let series = ChangeSeries::from_averages(&averages);
        let years: Vec<i32> = series.points.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2016, 2017]);
        assert_close(series.points[0].percent, (4.9 - 5.3) / 5.3 * 100.0);
        assert_eq!(series.points[1].percent, None);
    }
}
