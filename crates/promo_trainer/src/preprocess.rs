//! Feature engineering for promotion records
//!
//! Turns a [`RecordTable`] into a column-oriented [`ProcessedFrame`]:
//! date parts, numeric coercion, label-encoded categoricals, and zero-filled
//! missing feature values. Encoder fitting is governed by [`EncodingMode`].

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use promo_core::{CategoryEncoders, CoreError};
use tracing::info;

use crate::dataset::RecordTable;
use crate::errors::{Result, TrainerError};

pub const DATE_COLUMN: &str = "Tanggal";
pub const TARGET_COLUMN: &str = "Jumlah_Terjual";
pub const MONTH_COLUMN: &str = "Month";
pub const DAY_OF_WEEK_COLUMN: &str = "DayOfWeek";

pub const NUMERIC_COLUMNS: [&str; 4] = ["Harga_Jual", "Diskon", "Stok_Harian", "Stok_Aging"];

pub const CATEGORICAL_COLUMNS: [&str; 7] = [
    "Produk",
    "Kategori",
    "Brand",
    "Jenis_Promo",
    "Musim",
    "Cuaca",
    "Event_Lokal",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Whether preprocessing may fit encoders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingMode {
    /// Fit every encoder that is still unfitted, reuse fitted ones as-is
    FitIfUnfitted,
    /// Never fit; unfitted encoders are an error
    TransformOnly,
}

/// Name of the encoded feature derived from a categorical column
pub fn encoded_column(column: &str) -> String {
    format!("{column}_encoded")
}

/// Ordered model feature list: numeric, date parts, encoded categoricals
pub fn feature_columns() -> Vec<String> {
    NUMERIC_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain([MONTH_COLUMN.to_string(), DAY_OF_WEEK_COLUMN.to_string()])
        .chain(CATEGORICAL_COLUMNS.iter().map(|c| encoded_column(c)))
        .collect()
}

/// Lenient numeric coercion.
///
/// Empty cells, NA tokens (`NA`, `N/A`, `null`, `None`, ...) and anything
/// else that does not parse become missing, as do `NaN` and infinities.
pub fn coerce_numeric(value: Option<&str>) -> Option<f64> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn numeric_column(values: impl Iterator<Item = Option<String>>) -> Vec<Option<f64>> {
    values.map(|v| coerce_numeric(v.as_deref())).collect()
}

/// Parse a non-empty date cell with the accepted formats
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Named column of optional values
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Column-oriented numeric table produced by preprocessing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedFrame {
    columns: Vec<Column>,
    rows: usize,
}

impl ProcessedFrame {
    pub fn new(rows: usize) -> Self {
        Self {
            columns: Vec::new(),
            rows,
        }
    }

    /// Add or replace a column; its length must match the frame
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Result<()> {
        if values.len() != self.rows {
            return Err(CoreError::LengthMismatch {
                expected: self.rows,
                got: values.len(),
            }
            .into());
        }
        let name = name.into();
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(column) => column.values = values,
            None => self.columns.push(Column { name, values }),
        }
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Replace missing values in `columns` with `value`
    pub fn fill_missing(&mut self, columns: &[String], value: f64) {
        for column in self.columns.iter_mut().filter(|c| columns.contains(&c.name)) {
            column.values.iter_mut().for_each(|v| {
                v.get_or_insert(value);
            });
        }
    }

    /// Dense values of one column; any missing value is an error
    pub fn dense_column(&self, name: &str) -> Result<Vec<f64>> {
        let values = self
            .column(name)
            .ok_or_else(|| TrainerError::UnknownColumn(name.to_string()))?;

        values
            .iter()
            .enumerate()
            .map(|(row, v)| {
                v.ok_or_else(|| TrainerError::MissingValue {
                    column: name.to_string(),
                    row,
                })
            })
            .collect()
    }

    /// Row-major matrix of the given columns
    pub fn matrix(&self, columns: &[String]) -> Result<Vec<Vec<f64>>> {
        let dense = columns
            .iter()
            .map(|name| self.dense_column(name))
            .collect::<Result<Vec<_>>>()?;

        Ok((0..self.rows)
            .map(|row| dense.iter().map(|col| col[row]).collect())
            .collect())
    }
}

/// Fit the encoders that are still unfitted on `table`
pub fn fit_unfitted_encoders(encoders: &mut CategoryEncoders, table: &RecordTable) -> Result<()> {
    for column in CATEGORICAL_COLUMNS {
        let encoder = encoders.entry(column);
        if encoder.is_fitted() {
            continue;
        }
        encoder.fit(
            table
                .records
                .iter()
                .map(|r| r.categorical(column).unwrap_or_default()),
        )?;
        info!(
            "Fitted encoder for {} ({} classes)",
            column,
            encoder.classes().map(<[String]>::len).unwrap_or(0)
        );
    }
    Ok(())
}

/// Transform `table` with already fitted encoders
pub fn transform(
    encoders: &CategoryEncoders,
    table: &RecordTable,
) -> Result<(ProcessedFrame, Vec<String>)> {
    let records = &table.records;
    let mut frame = ProcessedFrame::new(records.len());

    let mut months = Vec::with_capacity(records.len());
    let mut weekdays = Vec::with_capacity(records.len());
    for (row, record) in records.iter().enumerate() {
        // An empty date is missing, anything else must parse
        let date = if record.date.trim().is_empty() {
            None
        } else {
            let parsed = parse_date(&record.date).ok_or_else(|| TrainerError::InvalidDate {
                row,
                value: record.date.clone(),
            })?;
            Some(parsed)
        };
        months.push(date.map(|d| d.month() as f64));
        weekdays.push(date.map(|d| d.weekday().num_days_from_monday() as f64));
    }

    frame.insert("Harga_Jual", numeric_column(records.iter().map(|r| r.price.clone())))?;
    frame.insert("Diskon", numeric_column(records.iter().map(|r| r.discount.clone())))?;
    frame.insert(
        "Stok_Harian",
        numeric_column(records.iter().map(|r| r.daily_stock.clone())),
    )?;
    frame.insert(
        "Stok_Aging",
        numeric_column(records.iter().map(|r| r.stock_aging.clone())),
    )?;
    frame.insert(
        TARGET_COLUMN,
        numeric_column(records.iter().map(|r| r.units_sold.clone())),
    )?;
    frame.insert(MONTH_COLUMN, months)?;
    frame.insert(DAY_OF_WEEK_COLUMN, weekdays)?;

    for column in CATEGORICAL_COLUMNS {
        let encoded = records
            .iter()
            .map(|r| {
                encoders
                    .encode(column, r.categorical(column).unwrap_or_default())
                    .map(|id| Some(id as f64))
            })
            .collect::<promo_core::Result<Vec<_>>>()?;
        frame.insert(encoded_column(column), encoded)?;
    }

    let features = feature_columns();
    frame.fill_missing(&features, 0.0);

    Ok((frame, features))
}

/// Preprocess `table`, fitting encoders first when `mode` allows it.
///
/// Newly fitted encoders are committed to `encoders` only when the whole
/// table transforms; on error `encoders` is left untouched.
pub fn preprocess(
    encoders: &mut CategoryEncoders,
    table: &RecordTable,
    mode: EncodingMode,
) -> Result<(ProcessedFrame, Vec<String>)> {
    match mode {
        EncodingMode::TransformOnly => transform(encoders, table),
        EncodingMode::FitIfUnfitted => {
            let mut staged = encoders.clone();
            fit_unfitted_encoders(&mut staged, table)?;
            let processed = transform(&staged, table)?;
            *encoders = staged;
            Ok(processed)
        }
    }
}
