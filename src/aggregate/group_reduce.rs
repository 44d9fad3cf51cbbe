//! Group-and-reduce over observation frames.
//!
//! Every aggregation in the crate is a grouping key plus a list of column
//! reductions, run as one `group_by().agg()` on a Polars `LazyFrame`.

use crate::error::ClimatologyError;
use crate::types::keys::{CalendarMonth, DayKey, MonthKey};
use polars::prelude::{col, DataType, Expr, LazyFrame};
use std::collections::{BTreeMap, HashMap};

/// How a column collapses within a group. Nulls are skipped by every reducer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Reducer {
    Mean,
    /// Sample standard deviation (ddof = 1).
    Std,
    Min,
    Max,
    Sum,
    /// Number of non-null values.
    Count,
}

impl Reducer {
    fn apply(self, expr: Expr) -> Expr {
        match self {
            Reducer::Mean => expr.mean(),
            Reducer::Std => expr.std(1),
            Reducer::Min => expr.min(),
            Reducer::Max => expr.max(),
            Reducer::Sum => expr.sum(),
            Reducer::Count => expr.count(),
        }
    }
}

/// One output column: `reducer` applied to `column`, named `alias`.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Reduction {
    pub column: &'static str,
    pub reducer: Reducer,
    pub alias: &'static str,
}

impl Reduction {
    pub const fn new(column: &'static str, reducer: Reducer, alias: &'static str) -> Self {
        Self {
            column,
            reducer,
            alias,
        }
    }

    fn expr(&self) -> Expr {
        self.reducer
            .apply(col(self.column))
            .cast(DataType::Float64)
            .alias(self.alias)
    }
}

/// A key that rows can be grouped by, read back from integer key columns.
pub(crate) trait GroupKey: Ord + Copy {
    const COLUMNS: &'static [&'static str];

    fn from_parts(parts: &[i64]) -> Option<Self>;
}

impl GroupKey for DayKey {
    const COLUMNS: &'static [&'static str] = &["month", "day"];

    fn from_parts(parts: &[i64]) -> Option<Self> {
        match parts {
            [month, day] => DayKey::new(u32::try_from(*month).ok()?, u32::try_from(*day).ok()?),
            _ => None,
        }
    }
}

impl GroupKey for MonthKey {
    const COLUMNS: &'static [&'static str] = &["year", "month"];

    fn from_parts(parts: &[i64]) -> Option<Self> {
        match parts {
            [year, month] => {
                let month = CalendarMonth::new(u32::try_from(*month).ok()?)?;
                Some(MonthKey::new(month.get(), i32::try_from(*year).ok()?))
            }
            _ => None,
        }
    }
}

impl GroupKey for CalendarMonth {
    const COLUMNS: &'static [&'static str] = &["month"];

    fn from_parts(parts: &[i64]) -> Option<Self> {
        match parts {
            [month] => CalendarMonth::new(u32::try_from(*month).ok()?),
            _ => None,
        }
    }
}

/// Reduced values of one group, by alias.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct ReducedRow {
    values: HashMap<&'static str, Option<f64>>,
}

impl ReducedRow {
    /// `None` for missing or NaN results and for aliases that were not reduced.
    pub fn get(&self, alias: &str) -> Option<f64> {
        self.values.get(alias).copied().flatten()
    }
}

pub(crate) fn group_and_reduce<K: GroupKey>(
    frame: LazyFrame,
    reductions: &[Reduction],
) -> Result<BTreeMap<K, ReducedRow>, ClimatologyError> {
    let keys: Vec<Expr> = K::COLUMNS.iter().map(|name| col(*name)).collect();
    let aggs: Vec<Expr> = reductions.iter().map(Reduction::expr).collect();

    let grouped = frame.group_by(keys).agg(aggs).collect()?;

    let key_columns = K::COLUMNS
        .iter()
        .map(|name| grouped.column(name)?.i64())
        .collect::<Result<Vec<_>, _>>()?;
    let value_columns = reductions
        .iter()
        .map(|r| Ok((r.alias, grouped.column(r.alias)?.f64()?)))
        .collect::<Result<Vec<_>, ClimatologyError>>()?;

    let mut rows = BTreeMap::new();
    for idx in 0..grouped.height() {
        let parts: Option<Vec<i64>> = key_columns.iter().map(|ca| ca.get(idx)).collect();
        let Some(key) = parts.as_deref().and_then(K::from_parts) else {
            log::warn!("Skipping group with unusable key at row {idx}");
            continue;
        };
        let values = value_columns
            .iter()
            .map(|(alias, ca)| (*alias, ca.get(idx).filter(|v| !v.is_nan())))
            .collect();
        rows.insert(key, ReducedRow { values });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{df, IntoLazy};

    #[test]
    fn test_reducers_skip_nulls() -> Result<(), Box<dyn std::error::Error>> {
        let frame = df!(
            "month" => [1i64, 1, 1, 2],
            "value" => [Some(1.0), None, Some(3.0), None],
        )?
        .lazy();
        let rows = group_and_reduce::<CalendarMonth>(
            frame,
            &[
                Reduction::new("value", Reducer::Mean, "mean"),
                Reduction::new("value", Reducer::Sum, "sum"),
                Reduction::new("value", Reducer::Count, "count"),
                Reduction::new("value", Reducer::Max, "max"),
                Reduction::new("value", Reducer::Std, "std"),
            ],
        )?;

        let january = &rows[&CalendarMonth::new(1).unwrap()];
        assert_eq!(january.get("mean"), Some(2.0));
        assert_eq!(january.get("sum"), Some(4.0));
        assert_eq!(january.get("count"), Some(2.0));
        assert_eq!(january.get("max"), Some(3.0));
        assert!((january.get("std").unwrap() - 2f64.sqrt()).abs() < 1e-12);

        let february = &rows[&CalendarMonth::new(2).unwrap()];
        assert_eq!(february.get("mean"), None);
        assert_eq!(february.get("count"), Some(0.0));
        assert_eq!(february.get("unknown"), None);
        Ok(())
    }

    #[test]
    fn test_composite_keys_are_ordered() -> Result<(), Box<dyn std::error::Error>> {
        let frame = df!(
            "year" => [2001i64, 2000, 2000],
            "month" => [1i64, 12, 1],
            "value" => [1.0, 2.0, 3.0],
        )?
        .lazy();
        let rows = group_and_reduce::<MonthKey>(
            frame,
            &[Reduction::new("value", Reducer::Sum, "sum")],
        )?;
        let keys: Vec<MonthKey> = rows.keys().copied().collect();
        assert_eq!(
            keys,
            vec![
                MonthKey::new(1, 2000),
                MonthKey::new(12, 2000),
                MonthKey::new(1, 2001)
            ]
        );
        Ok(())
    }
}
