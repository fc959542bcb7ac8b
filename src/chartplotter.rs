use std::{fmt::Display, path::Path};

use plotters::{
    prelude::{BitMapBackend, ChartBuilder, IntoDrawingArea, LineSeries, PathElement},
    style::{Color, IntoFont, BLACK, BLUE, RED, WHITE},
};
use tracing::{info, warn};

use crate::{
    change::ChangePoint,
    config::Config,
    error::ChartError,
    observation::Metric,
    pipeline::RunReport,
};

pub struct ChartPlotter {
    img_width: u32,
    img_height: u32,
    /// Most recent points kept per series.
    max_points: usize,
}

fn draw_err<E: Display>(e: E) -> ChartError {
    ChartError::Draw(e.to_string())
}

/// Splits a series into runs of defined values, so an undefined change
/// leaves a gap instead of being drawn as zero.
pub fn segments(points: &[ChangePoint]) -> Vec<Vec<(i32, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for point in points {
        match point.percent {
            Some(percent) if percent.is_finite() => current.push((point.year, percent)),
            _ => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Y range covering every value, padded a little, never empty.
fn value_bounds<'a>(values: impl Iterator<Item = &'a f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    if !min.is_finite() || !max.is_finite() {
        return (-1.0, 1.0);
    }
    let pad = ((max - min) * 0.1).max(1.0);
    (min - pad, max + pad)
}

impl ChartPlotter {
    pub fn new(img_width: u32, img_height: u32, max_points: usize) -> Self {
        ChartPlotter {
            img_width,
            img_height,
            max_points,
        }
    }

    pub fn from_config(config: &Config, max_points: usize) -> Self {
        ChartPlotter::new(config.img_width, config.img_height, max_points)
    }

    fn series(&self, report: &RunReport, metric: Metric) -> Option<Vec<Vec<(i32, f64)>>> {
        match report.get(metric) {
            Ok(metric_report) => {
                let points = &metric_report.changes.points;
                let keep = points.len().min(self.max_points);
                Some(segments(&points[points.len() - keep..]))
            }
            Err(_) => {
                warn!(%metric, "Leaving failed metric out of the chart");
                None
            }
        }
    }

    /// Draws both change series against the year of each transition.
    pub fn plot_changes(&self, report: &RunReport, path: &Path) -> Result<(), ChartError> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }

        let lines: Vec<(Metric, Vec<Vec<(i32, f64)>>)> = Metric::ALL
            .iter()
            .filter_map(|&metric| self.series(report, metric).map(|s| (metric, s)))
            .collect();

        let labels = report.labels();
        let first = labels.get(1).and_then(|l| l.parse::<i32>().ok()).unwrap_or(0);
        let last = labels.last().and_then(|l| l.parse::<i32>().ok()).unwrap_or(first);
        let (y_min, y_max) = value_bounds(lines.iter().flat_map(|(_, runs)| runs.iter().flatten().map(|(_, v)| v)));

        let root = BitMapBackend::new(path, (self.img_width, self.img_height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Compensation vs Unemployment", ("sans-serif", 40).into_font())
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(first..last.max(first + 1), y_min..y_max)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_desc("Year")
            .y_desc("Change from previous year (%)")
            .draw()
            .map_err(draw_err)?;

        for (metric, runs) in &lines {
            let color = match metric {
                Metric::Unemployment => RED,
                Metric::Compensation => BLUE,
            };
            for (i, run) in runs.iter().enumerate() {
                let anno = chart
                    .draw_series(LineSeries::new(run.iter().copied(), &color))
                    .map_err(draw_err)?;
                if i == 0 {
                    anno.label(metric.label())
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
                }
            }
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(draw_err)?;
        root.present().map_err(draw_err)?;

        info!(path = %path.display(), "Chart written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(year: i32, percent: Option<f64>) -> ChangePoint {
        ChangePoint { year, percent }
    }

    #[test]
    fn undefined_changes_split_lines() {
        let points = vec![
            point(2016, Some(1.0)),
            point(2017, Some(2.0)),
            point(2018, None),
            point(2019, Some(-3.0)),
            point(2020, None),
            point(2021, None),
        ];
        assert_eq!(
            segments(&points),
            vec![vec![(2016, 1.0), (2017, 2.0)], vec![(2019, -3.0)]]
        );
    }

    #[test]
    fn all_undefined_has_no_lines() {
        assert!(segments(&[point(2016, None), point(2017, None)]).is_empty());
    }

    #[test]
    fn bounds_pad_and_default() {
        assert_eq!(value_bounds([].iter()), (-1.0, 1.0));
        let (lo, hi) = value_bounds([-10.0, 30.0].iter());
        assert!(lo < -10.0 && hi > 30.0);
    }
}
