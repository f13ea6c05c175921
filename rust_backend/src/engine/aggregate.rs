use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Aggregate statistic computed for one column of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    Mean,
    /// Sample standard deviation (ddof = 1).
    StdDev,
    Max,
    Min,
    Sum,
}

impl Statistic {
    /// Prefix used in default output column names, `avg(Amount)` style.
    pub fn label(&self) -> &'static str {
        match self {
            Statistic::Mean => "avg",
            Statistic::StdDev => "stddev",
            Statistic::Max => "max",
            Statistic::Min => "min",
            Statistic::Sum => "sum",
        }
    }

    fn apply(&self, input: Expr) -> Expr {
        match self {
            Statistic::Mean => input.mean(),
            Statistic::StdDev => input.std(1),
            Statistic::Max => input.max(),
            Statistic::Min => input.min(),
            Statistic::Sum => input.sum(),
        }
    }
}

/// One named aggregate request.
///
/// Requests are kept in a list, so several statistics over the same column
/// can coexist in one grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggRequest {
    pub column: String,
    pub statistic: Statistic,
    #[serde(default)]
    pub alias: Option<String>,
}

impl AggRequest {
    pub fn new(column: impl Into<String>, statistic: Statistic) -> Self {
        Self {
            column: column.into(),
            statistic,
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn output_name(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => format!("{}({})", self.statistic.label(), self.column),
        }
    }

    pub fn to_expr(&self) -> Expr {
        self.statistic
            .apply(col(self.column.as_str()))
            .alias(self.output_name())
    }
}

/// How a list of requests is turned into output columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// Every request produces a column.
    #[default]
    AllRequests,
    /// Requests behave like a column-to-statistic map: a later request on
    /// the same column replaces the earlier one, in the earlier one's slot.
    LastPerColumn,
}

impl AggregationMode {
    pub fn resolve(&self, requests: &[AggRequest]) -> Vec<AggRequest> {
        match self {
            AggregationMode::AllRequests => requests.to_vec(),
            AggregationMode::LastPerColumn => {
                let mut resolved: Vec<AggRequest> = Vec::with_capacity(requests.len());
                for request in requests {
                    match resolved.iter_mut().find(|r| r.column == request.column) {
                        Some(slot) => *slot = request.clone(),
                        None => resolved.push(request.clone()),
                    }
                }
                resolved
            }
        }
    }
}
