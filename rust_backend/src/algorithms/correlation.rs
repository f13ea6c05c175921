use polars::prelude::*;

use crate::error::{PipelineError, PipelineResult};

/// Pearson correlation between two numeric columns.
///
/// Rows with a null in either column are skipped. An undefined coefficient
/// (fewer than two rows, or a column with zero variance) is reported as `0.0`.
/// The result is clamped to `[-1, 1]`.
pub fn pearson_correlation(df: &DataFrame, x: &str, y: &str) -> PipelineResult<f64> {
    let xs = numeric_column(df, x)?;
    let ys = numeric_column(df, y)?;

    let pairs: Vec<(f64, f64)> = (&xs)
        .into_iter()
        .zip(&ys)
        .filter_map(|(a, b)| Some((a?, b?)))
        .collect();

    Ok(pearson(&pairs).unwrap_or_else(|| {
        log::warn!(
            "Correlation between {} and {} is undefined over {} rows, reporting 0",
            x,
            y,
            pairs.len()
        );
        0.0
    }))
}

fn numeric_column(df: &DataFrame, name: &str) -> PipelineResult<Float64Chunked> {
    let column = df
        .column(name)
        .map_err(|_| PipelineError::missing_column(name, "correlation"))?;
    let as_float = column.cast(&DataType::Float64)?;
    Ok(as_float.f64()?.clone())
}

fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    let r = cov / (var_x.sqrt() * var_y.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}
