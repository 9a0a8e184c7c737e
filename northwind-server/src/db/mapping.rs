//! Mapping rows (or column ranges of rows) into records.
//!
//! A joined row such as `products LEFT JOIN order_details` carries both
//! tables' columns side by side, with some names repeated (`product_id`,
//! `unit_price`). [`split_on`] cuts the row at a split column so each record
//! decodes from its own [`RowSlice`] by name.

use std::ops::Range;

use sqlx::postgres::{PgRow, Postgres};
use sqlx::{Column, Decode, Row, Type, TypeInfo, ValueRef};

use northwind_core::{OrderDetail, Product};

use super::error::DbError;

/// A contiguous range of a row's columns
#[derive(Debug, Clone, Copy)]
pub struct RowSlice<'r> {
    row: &'r PgRow,
    start: usize,
    end: usize,
}

impl<'r> RowSlice<'r> {
    /// All columns of `row`
    pub fn whole(row: &'r PgRow) -> Self {
        Self::new(row, 0..row.len())
    }

    pub fn new(row: &'r PgRow, range: Range<usize>) -> Self {
        let end = range.end.min(row.len());
        Self {
            row,
            start: range.start.min(end),
            end,
        }
    }

    /// Number of columns in the slice
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Index in the full row of the first column named `name` (ASCII
    /// case-insensitive) inside the slice.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.row.columns()[self.start..self.end]
            .iter()
            .position(|c| c.name().eq_ignore_ascii_case(name))
            .map(|i| self.start + i)
    }

    fn require(&self, name: &str) -> Result<usize, sqlx::Error> {
        self.index_of(name)
            .ok_or_else(|| sqlx::Error::ColumnNotFound(name.to_owned()))
    }

    /// Decode the column named `name`
    pub fn try_get<T>(&self, name: &str) -> Result<T, sqlx::Error>
    where
        T: Decode<'r, Postgres> + Type<Postgres>,
    {
        let index = self.require(name)?;
        self.row.try_get(index)
    }

    /// Whether the column named `name` holds SQL NULL
    pub fn is_null(&self, name: &str) -> Result<bool, sqlx::Error> {
        let index = self.require(name)?;
        Ok(self.row.try_get_raw(index)?.is_null())
    }

    /// Decode an integer column of any width (`INT2`, `INT4`, `INT8`) into
    /// `T`, failing if the stored value does not fit.
    pub fn try_get_int<T>(&self, name: &str) -> Result<Option<T>, sqlx::Error>
    where
        T: TryFrom<i64>,
    {
        let index = self.require(name)?;
        let value: i64 = match self.column_type(index)?.as_deref() {
            None => return Ok(None),
            Some("INT2") => self.row.try_get::<i16, _>(index)?.into(),
            Some("INT4") => self.row.try_get::<i32, _>(index)?.into(),
            // Anything else goes through sqlx's own type check
            _ => self.row.try_get::<i64, _>(index)?,
        };
        T::try_from(value)
            .map(Some)
            .map_err(|_| decode_error(name, format!("{} is out of range", value)))
    }

    /// Decode a floating point column (`FLOAT4` or `FLOAT8`) as `f64`
    pub fn try_get_float(&self, name: &str) -> Result<Option<f64>, sqlx::Error> {
        let index = self.require(name)?;
        match self.column_type(index)?.as_deref() {
            None => Ok(None),
            Some("FLOAT4") => Ok(Some(self.row.try_get::<f32, _>(index)?.into())),
            _ => Ok(Some(self.row.try_get::<f64, _>(index)?)),
        }
    }

    /// Decode a flag stored as `BOOL` or as an integer (non-zero is true)
    pub fn try_get_flag(&self, name: &str) -> Result<Option<bool>, sqlx::Error> {
        let index = self.require(name)?;
        match self.column_type(index)?.as_deref() {
            None => Ok(None),
            Some("BOOL") => Ok(Some(self.row.try_get::<bool, _>(index)?)),
            _ => Ok(self.try_get_int::<i64>(name)?.map(|v| v != 0)),
        }
    }

    /// Like `try_get_int`, rejecting NULL
    pub fn required_int<T>(&self, name: &str) -> Result<T, sqlx::Error>
    where
        T: TryFrom<i64>,
    {
        self.try_get_int(name)?
            .ok_or_else(|| decode_error(name, "unexpected NULL"))
    }

    /// Like `try_get_float`, rejecting NULL
    pub fn required_float(&self, name: &str) -> Result<f64, sqlx::Error> {
        self.try_get_float(name)?
            .ok_or_else(|| decode_error(name, "unexpected NULL"))
    }

    /// SQL type name of a column, or `None` when the value is NULL
    fn column_type(&self, index: usize) -> Result<Option<String>, sqlx::Error> {
        let raw = self.row.try_get_raw(index)?;
        if raw.is_null() {
            return Ok(None);
        }
        let name = raw.type_info().name().to_owned();
        Ok(Some(name))
    }
}

fn decode_error(column: &str, message: impl Into<String>) -> sqlx::Error {
    let message: String = message.into();
    sqlx::Error::ColumnDecode {
        index: format!("{:?}", column),
        source: message.into(),
    }
}

/// Split a joined row into (parent, child) at `column`.
///
/// The split column is searched from the right, so a name shared by both
/// sides still splits at the child's copy. The child slice starts at the
/// split column.
pub fn split_on<'r>(
    row: &'r PgRow,
    column: &'static str,
) -> Result<(RowSlice<'r>, RowSlice<'r>), DbError> {
    let at = row
        .columns()
        .iter()
        .rposition(|c| c.name().eq_ignore_ascii_case(column))
        .ok_or(DbError::SplitColumn { column })?;

    Ok((RowSlice::new(row, 0..at), RowSlice::new(row, at..row.len())))
}

/// Build a record from a slice of a row
pub trait FromRowSlice: Sized {
    fn from_row_slice(row: &RowSlice<'_>) -> Result<Self, sqlx::Error>;
}

impl FromRowSlice for Product {
    fn from_row_slice(row: &RowSlice<'_>) -> Result<Self, sqlx::Error> {
        Ok(Self {
            product_id: row.required_int("product_id")?,
            product_name: row.try_get("product_name")?,
            supplier_id: row.try_get_int("supplier_id")?,
            category_id: row.try_get_int("category_id")?,
            quantity_per_unit: row.try_get("quantity_per_unit")?,
            unit_price: row.try_get_float("unit_price")?,
            units_in_stock: row.try_get_int("units_in_stock")?,
            units_on_order: row.try_get_int("units_on_order")?,
            reorder_level: row.try_get_int("reorder_level")?,
            discontinued: row.try_get_flag("discontinued")?.unwrap_or(false),
            order_details: None,
        })
    }
}

impl FromRowSlice for OrderDetail {
    fn from_row_slice(row: &RowSlice<'_>) -> Result<Self, sqlx::Error> {
        Ok(Self {
            order_id: row.required_int("order_id")?,
            product_id: row.required_int("product_id")?,
            unit_price: row.required_float("unit_price")?,
            quantity: row.required_int("quantity")?,
            discount: row.required_float("discount")? as f32,
        })
    }
}
