use polars::prelude::*;

use super::aggregate::{AggRequest, AggregationMode};
use crate::core::domain::COL_COUNT;
use crate::error::{PipelineError, PipelineResult};

/// Immutable logical table.
///
/// Transformations return a new `Table` and leave the receiver untouched;
/// nothing executes until an action (`count`, `collect`, `schema`) is called.
#[derive(Clone)]
pub struct Table {
    plan: LazyFrame,
}

impl Table {
    pub fn from_frame(df: DataFrame) -> Self {
        Self { plan: df.lazy() }
    }

    pub fn from_plan(plan: LazyFrame) -> Self {
        Self { plan }
    }

    pub fn filter(&self, predicate: Expr) -> Self {
        Self::from_plan(self.plan.clone().filter(predicate))
    }

    pub fn with_column(&self, expr: Expr) -> Self {
        Self::from_plan(self.plan.clone().with_column(expr))
    }

    pub fn with_columns(&self, exprs: Vec<Expr>) -> Self {
        Self::from_plan(self.plan.clone().with_columns(exprs))
    }

    /// Rename one column, keeping column order.
    pub fn rename(&self, from: &str, to: &str) -> PipelineResult<Self> {
        self.require_column(from, "rename")?;
        let schema = self.schema()?;
        let exprs: Vec<Expr> = schema
            .iter_names()
            .map(|name| {
                if name.as_str() == from {
                    col(from).alias(to)
                } else {
                    col(name.as_str())
                }
            })
            .collect();
        Ok(Self::from_plan(self.plan.clone().select(exprs)))
    }

    /// Remove rows equal to an earlier row in every column.
    pub fn drop_duplicates(&self) -> Self {
        Self::from_plan(
            self.plan
                .clone()
                .unique_stable(None, UniqueKeepStrategy::First),
        )
    }

    /// Remove rows with a null in any column.
    pub fn drop_nulls(&self) -> Self {
        Self::from_plan(self.plan.clone().drop_nulls(None))
    }

    /// Group by `keys` and compute the requests resolved under `mode`.
    ///
    /// Output rows are sorted by the keys.
    pub fn group_by_agg(
        &self,
        keys: &[&str],
        requests: &[AggRequest],
        mode: AggregationMode,
    ) -> Self {
        let exprs: Vec<Expr> = mode.resolve(requests).iter().map(AggRequest::to_expr).collect();
        self.grouped(keys, exprs)
    }

    /// Group by `keys` and count rows into a `count` column.
    pub fn group_by_count(&self, keys: &[&str]) -> Self {
        self.grouped(keys, vec![len().alias(COL_COUNT)])
    }

    fn grouped(&self, keys: &[&str], aggs: Vec<Expr>) -> Self {
        let key_exprs: Vec<Expr> = keys.iter().map(|k| col(*k)).collect();
        Self::from_plan(
            self.plan
                .clone()
                .group_by(key_exprs.clone())
                .agg(aggs)
                .sort_by_exprs(key_exprs, SortMultipleOptions::default()),
        )
    }

    /// Materialize the table with rows grouped contiguously by `key`.
    ///
    /// Row order within a key is preserved. Later plans start from the
    /// materialized frame instead of re-running the upstream plan.
    pub fn repartition_by(&self, key: &str) -> PipelineResult<Self> {
        self.require_column(key, "repartition")?;
        let df = self
            .plan
            .clone()
            .sort(
                [key],
                SortMultipleOptions::default().with_maintain_order(true),
            )
            .collect()
            .map_err(|e| PipelineError::in_stage(e, "repartition"))?;
        log::debug!("Repartitioned {} rows by {}", df.height(), key);
        Ok(Self::from_frame(df))
    }

    pub fn schema(&self) -> PipelineResult<SchemaRef> {
        let mut plan = self.plan.clone();
        plan.collect_schema()
            .map_err(|e| PipelineError::in_stage(e, "schema"))
    }

    /// Fail with `MissingColumn` unless `column` is in the schema.
    pub fn require_column(&self, column: &str, stage: &str) -> PipelineResult<()> {
        if self.schema()?.contains(column) {
            Ok(())
        } else {
            Err(PipelineError::missing_column(column, stage))
        }
    }

    pub fn count(&self) -> PipelineResult<usize> {
        let df = self
            .plan
            .clone()
            .select([len().alias(COL_COUNT)])
            .collect()
            .map_err(|e| PipelineError::in_stage(e, "count"))?;
        let counted = df.column(COL_COUNT)?.cast(&DataType::UInt64)?;
        Ok(counted.u64()?.get(0).unwrap_or(0) as usize)
    }

    pub fn collect(&self) -> PipelineResult<DataFrame> {
        self.plan
            .clone()
            .collect()
            .map_err(|e| PipelineError::in_stage(e, "collect"))
    }
}
