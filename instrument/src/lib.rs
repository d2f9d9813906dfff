//! Instrumentation for collecting simulation events into per-target tables.
//!
//! Uses the `tracing` crate with a subscriber that turns each INFO event into
//! one row of loosely typed fields. Tables are keyed by the event's target and
//! their schema emerges from whatever fields the events carry. Tables convert
//! to polars DataFrames for querying.
//!
//! # Usage
//!
//! ```ignore
//! // In simulation code:
//! tracing::info!(target: "trade", ship = name, resource = "food", tons, price);
//!
//! // In a test:
//! let ((), recorder) = instrument::record(|| sim.run(50).unwrap());
//! let sold = recorder
//!     .frame("trade")?
//!     .lazy()
//!     .filter(col("side").eq(lit("sell")))
//!     .select([col("tons").sum()])
//!     .collect()?;
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use polars::prelude::*;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Record};
use tracing::{Event, Id, Metadata, Subscriber};

/// One recorded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    U64(u64),
    I64(i64),
    F64(f64),
    Bool(bool),
    Str(String),
}

impl FieldValue {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::U64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::U64(v) => i64::try_from(*v).ok(),
            FieldValue::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view; integers widen, everything else is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::U64(v) => Some(*v as f64),
            FieldValue::I64(v) => Some(*v as f64),
            FieldValue::F64(v) => Some(*v),
            FieldValue::Bool(_) | FieldValue::Str(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::U64(v) => write!(f, "{v}"),
            FieldValue::I64(v) => write!(f, "{v}"),
            FieldValue::F64(v) => write!(f, "{v}"),
            FieldValue::Bool(v) => write!(f, "{v}"),
            FieldValue::Str(v) => f.write_str(v),
        }
    }
}

/// Column dtype, widened until every value of the field fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    U64,
    I64,
    F64,
    Bool,
    Str,
}

impl ColumnKind {
    fn of(value: &FieldValue) -> Self {
        match value {
            FieldValue::U64(_) => ColumnKind::U64,
            FieldValue::I64(_) => ColumnKind::I64,
            FieldValue::F64(_) => ColumnKind::F64,
            FieldValue::Bool(_) => ColumnKind::Bool,
            FieldValue::Str(_) => ColumnKind::Str,
        }
    }

    fn widen(self, other: Self) -> Self {
        use ColumnKind::*;
        match (self, other) {
            (a, b) if a == b => a,
            (U64, I64) | (I64, U64) => I64,
            (U64 | I64 | F64, U64 | I64 | F64) => F64,
            _ => Str,
        }
    }
}

pub type Row = BTreeMap<String, FieldValue>;

/// Rows recorded under one target, in emission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventTable {
    pub rows: Vec<Row>,
}

impl EventTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// One column per field name seen in any row. A row without the field
    /// holds a null there. Mixed integer and float fields become `f64`, and
    /// any other mix falls back to strings.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let names: BTreeSet<&str> = self
            .rows
            .iter()
            .flat_map(|row| row.keys().map(String::as_str))
            .collect();

        let mut columns: Vec<Column> = Vec::with_capacity(names.len());
        for name in names {
            let cells: Vec<Option<&FieldValue>> = self.rows.iter().map(|row| row.get(name)).collect();
            let kind = cells
                .iter()
                .flatten()
                .map(|v| ColumnKind::of(v))
                .reduce(ColumnKind::widen)
                .unwrap_or(ColumnKind::Str);

            let column = match kind {
                ColumnKind::U64 => Column::new(name.into(), collect_cells(&cells, FieldValue::as_u64)),
                ColumnKind::I64 => Column::new(name.into(), collect_cells(&cells, FieldValue::as_i64)),
                ColumnKind::F64 => Column::new(name.into(), collect_cells(&cells, FieldValue::as_f64)),
                ColumnKind::Bool => Column::new(name.into(), collect_cells(&cells, FieldValue::as_bool)),
                ColumnKind::Str => {
                    Column::new(name.into(), collect_cells(&cells, |v| Some(v.to_string())))
                }
            };
            columns.push(column);
        }

        DataFrame::new(columns)
    }
}

fn collect_cells<T>(cells: &[Option<&FieldValue>], get: impl Fn(&FieldValue) -> Option<T>) -> Vec<Option<T>> {
    cells.iter().map(|cell| cell.and_then(&get)).collect()
}

/// Collection of tables, keyed by tracing target.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    pub tables: HashMap<String, EventTable>,
}

impl Recorder {
    /// The table for `target`; empty if nothing was recorded there.
    pub fn table(&self, target: &str) -> EventTable {
        self.tables.get(target).cloned().unwrap_or_default()
    }

    pub fn total_rows(&self) -> usize {
        self.tables.values().map(EventTable::len).sum()
    }

    /// The DataFrame for `target`; an empty frame if nothing was recorded there.
    pub fn frame(&self, target: &str) -> PolarsResult<DataFrame> {
        self.tables
            .get(target)
            .map_or_else(|| Ok(DataFrame::empty()), EventTable::to_dataframe)
    }

    /// Convert all tables to polars DataFrames.
    pub fn to_dataframes(&self) -> HashMap<String, DataFrame> {
        self.tables
            .iter()
            .filter_map(|(name, table)| table.to_dataframe().ok().map(|df| (name.clone(), df)))
            .collect()
    }
}

thread_local! {
    static RECORDER: RefCell<Recorder> = RefCell::default();
}

/// Visitor that copies event fields into a row.
struct RowVisitor<'a> {
    row: &'a mut Row,
}

impl RowVisitor<'_> {
    fn put(&mut self, field: &Field, value: FieldValue) {
        self.row.insert(field.name().to_string(), value);
    }
}

impl Visit for RowVisitor<'_> {
    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, FieldValue::U64(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, FieldValue::I64(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.put(field, FieldValue::F64(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, FieldValue::Bool(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, FieldValue::Str(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        // `message` and any `?value` fields land here
        self.put(field, FieldValue::Str(format!("{value:?}")));
    }
}

/// Tracing subscriber that appends INFO-and-above events to the thread-local recorder.
pub struct TableSubscriber;

impl Subscriber for TableSubscriber {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.is_event() && *metadata.level() <= tracing::Level::INFO
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        // Spans are not tracked
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let mut row = Row::new();
        event.record(&mut RowVisitor { row: &mut row });

        let target = event.metadata().target().to_string();
        RECORDER.with(|r| {
            r.borrow_mut()
                .tables
                .entry(target)
                .or_default()
                .rows
                .push(row);
        });
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

/// Install the TableSubscriber as the global default.
/// Later calls are ignored.
pub fn install_subscriber() {
    let _ = tracing::subscriber::set_global_default(TableSubscriber);
}

/// Take everything recorded on this thread so far.
pub fn drain() -> Recorder {
    RECORDER.with(|r| std::mem::take(&mut *r.borrow_mut()))
}

/// Drain all recorded data and convert to polars DataFrames.
pub fn drain_to_dataframes() -> HashMap<String, DataFrame> {
    drain().to_dataframes()
}

/// Clear all recorded data without returning it.
pub fn clear() {
    RECORDER.with(|r| *r.borrow_mut() = Recorder::default());
}

/// Run `f` under a scoped [`TableSubscriber`] and return its result together
/// with exactly the events it emitted.
pub fn record<T>(f: impl FnOnce() -> T) -> (T, Recorder) {
    let earlier = drain();
    let out = tracing::subscriber::with_default(TableSubscriber, f);
    let recorded = drain();
    RECORDER.with(|r| *r.borrow_mut() = earlier);
    (out, recorded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum_where(df: &DataFrame, predicate: Expr, field: &str) -> f64 {
        let out = df
            .clone()
            .lazy()
            .filter(predicate)
            .select([col(field).cast(DataType::Float64).sum()])
            .collect()
            .unwrap();
        out.column(field).unwrap().f64().unwrap().get(0).unwrap_or(0.0)
    }

    #[test]
    fn test_rows_keep_emission_order_per_target() {
        let ((), recorder) = record(|| {
            tracing::info!(target: "trade", tons = 3u64, price = 1.5f64, side = "sell");
            tracing::info!(target: "arrival", ship = "The Swift");
            tracing::info!(target: "trade", tons = 4u64, price = 2.0f64, side = "buy");
        });

        assert_eq!(recorder.total_rows(), 3);
        let trades = recorder.frame("trade").unwrap();
        assert_eq!(trades.height(), 2);
        let tons: Vec<u64> = trades.column("tons").unwrap().u64().unwrap().into_no_null_iter().collect();
        assert_eq!(tons, vec![3, 4]);
        let sides: Vec<&str> = trades.column("side").unwrap().str().unwrap().into_no_null_iter().collect();
        assert_eq!(sides, vec!["sell", "buy"]);

        let arrivals = recorder.frame("arrival").unwrap();
        assert_eq!(arrivals.column("ship").unwrap().str().unwrap().get(0), Some("The Swift"));
    }

    #[test]
    fn test_missing_fields_become_nulls() {
        let ((), recorder) = record(|| {
            tracing::info!(target: "t", value = 10.5f64, label = "first");
            tracing::info!(target: "t", value = 20.5f64);
            tracing::info!(target: "t", label = "third");
        });

        let df = recorder.frame("t").unwrap();
        assert_eq!(df.height(), 3);
        let values: Vec<Option<f64>> = df.column("value").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(10.5), Some(20.5), None]);
        let labels: Vec<Option<&str>> = df.column("label").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(labels, vec![Some("first"), None, Some("third")]);
    }

    #[test]
    fn test_mixed_fields_widen() {
        let ((), recorder) = record(|| {
            tracing::info!(target: "t", n = 1u64, x = 2u64, flag = true);
            tracing::info!(target: "t", n = -4i64, x = 0.5f64, flag = "maybe");
        });

        let df = recorder.frame("t").unwrap();
        assert_eq!(df.column("n").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("x").unwrap().dtype(), &DataType::Float64);
        let flags: Vec<&str> = df.column("flag").unwrap().str().unwrap().into_no_null_iter().collect();
        assert_eq!(flags, vec!["true", "maybe"]);
    }

    #[test]
    fn test_filters_and_sums() {
        let ((), recorder) = record(|| {
            for (side, tons) in [("sell", 5u64), ("buy", 2), ("sell", 7)] {
                tracing::info!(target: "trade", side, tons, gold = -1i64);
            }
        });

        let trades = recorder.frame("trade").unwrap();
        assert_eq!(sum_where(&trades, col("side").eq(lit("sell")), "tons"), 12.0);
        assert_eq!(sum_where(&trades, col("side").eq(lit("buy")), "tons"), 2.0);
        assert_eq!(sum_where(&trades, col("side").eq(lit("steal")), "tons"), 0.0);
        assert_eq!(sum_where(&trades, lit(true), "gold"), -3.0);
    }

    #[test]
    fn test_unrecorded_target_is_an_empty_frame() {
        let ((), recorder) = record(|| tracing::info!(target: "seen", n = 1u64));
        assert_eq!(recorder.frame("unseen").unwrap().height(), 0);
        assert_eq!(recorder.to_dataframes().len(), 1);
    }

    #[test]
    fn test_debug_level_is_ignored() {
        let ((), recorder) = record(|| {
            tracing::debug!(target: "noise", x = 1u64);
            tracing::warn!(target: "loud", x = 2u64);
        });
        assert!(recorder.table("noise").is_empty());
        assert_eq!(recorder.table("loud").len(), 1);
    }

    #[test]
    fn test_record_leaves_outer_recording_untouched() {
        clear();
        tracing::subscriber::with_default(TableSubscriber, || {
            tracing::info!(target: "outer", n = 1u64);
        });

        let (answer, inner) = record(|| {
            tracing::info!(target: "inner", n = 2u64);
            42
        });
        assert_eq!(answer, 42);
        assert!(inner.table("outer").is_empty());
        assert_eq!(inner.table("inner").len(), 1);

        let outer = drain_to_dataframes();
        assert_eq!(outer["outer"].height(), 1);
        assert!(!outer.contains_key("inner"));
    }

    #[test]
    fn test_global_subscriber_records_on_other_threads() {
        install_subscriber();
        let recorded = std::thread::spawn(|| {
            tracing::info!(target: "global", n = 7u64);
            drain()
        })
        .join()
        .unwrap();

        assert_eq!(recorded.table("global").len(), 1);
        assert_eq!(recorded.table("global").rows[0]["n"], FieldValue::U64(7));
    }
}
