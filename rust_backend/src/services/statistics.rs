use polars::prelude::*;
use serde::Serialize;

use crate::error::{PipelineError, PipelineResult};

/// Row labels of the descriptive statistics table, in display order.
pub const STATISTIC_LABELS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// Descriptive statistics of one numeric column.
///
/// Statistics that are undefined for the number of values present are
/// `None`: everything but `count` for an empty column, and `std` for a
/// single value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q25: Option<f64>,
    #[serde(rename = "50%")]
    pub median: Option<f64>,
    #[serde(rename = "75%")]
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnSummary {
    /// Summarize raw values; NaN entries are ignored.
    pub fn from_values(column: impl Into<String>, values: &[f64]) -> Self {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let count = sorted.len();
        let mean = (count > 0).then(|| sorted.iter().sum::<f64>() / count as f64);
        let std = match (count, mean) {
            (n, Some(m)) if n > 1 => {
                let variance = sorted.iter().map(|v| (v - m) * (v - m)).sum::<f64>()
                    / (n - 1) as f64;
                Some(variance.sqrt())
            }
            _ => None,
        };

        Self {
            column: column.into(),
            count,
            mean,
            std,
            min: sorted.first().copied(),
            q25: quantile_linear(&sorted, 0.25),
            median: quantile_linear(&sorted, 0.5),
            q75: quantile_linear(&sorted, 0.75),
            max: sorted.last().copied(),
        }
    }

    fn values(&self) -> [Option<f64>; 8] {
        [
            Some(self.count as f64),
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.median,
            self.q75,
            self.max,
        ]
    }
}

/// Linear-interpolated quantile of an ascending slice.
fn quantile_linear(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Descriptive statistics for every numeric column of a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DescriptiveStatistics {
    pub columns: Vec<ColumnSummary>,
}

impl DescriptiveStatistics {
    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.column == name)
    }

    /// Render as a table: a `statistic` label column followed by one column
    /// per summarized input column.
    pub fn to_frame(&self) -> PipelineResult<DataFrame> {
        let mut columns = Vec::with_capacity(self.columns.len() + 1);
        columns.push(Column::new("statistic".into(), STATISTIC_LABELS));
        for summary in &self.columns {
            let values: Vec<Option<f64>> = summary.values().to_vec();
            columns.push(Column::new(summary.column.as_str().into(), values));
        }
        Ok(DataFrame::new(columns)?)
    }
}

pub fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

fn float_values(df: &DataFrame, name: &str) -> PipelineResult<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| PipelineError::missing_column(name, "report"))?;
    let as_float = column.cast(&DataType::Float64)?;
    Ok(as_float.f64()?.into_iter().flatten().collect())
}

/// Count, mean, std, quartiles, min and max of each numeric column.
pub fn describe(df: &DataFrame) -> PipelineResult<DescriptiveStatistics> {
    let mut columns = Vec::new();
    for column in df.get_columns() {
        if !is_numeric(column.dtype()) {
            continue;
        }
        let name = column.name().as_str();
        columns.push(ColumnSummary::from_values(name, &float_values(df, name)?));
    }
    Ok(DescriptiveStatistics { columns })
}

/// One equal-width histogram bin, `[lower, upper)` except the last bin,
/// which also includes `upper`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram over `[min, max]` of the values.
///
/// A constant input gives a single bin holding every value.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max == min {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: finite.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in &finite {
        let index = (((v - min) / width).floor() as usize).min(bins - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + width * i as f64,
            upper: if i == bins - 1 {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count,
        })
        .collect()
}

/// Histogram of one numeric column of `df`.
pub fn column_histogram(df: &DataFrame, name: &str, bins: usize) -> PipelineResult<Vec<HistogramBin>> {
    Ok(histogram(&float_values(df, name)?, bins))
}
