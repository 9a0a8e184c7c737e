//! Multi-statement batches and their result sets.
//!
//! A [`SqlBatch`] is a fixed SQL text holding several statements with
//! positional `$n` placeholders. The whole batch goes to the server in one
//! request over one connection, and the reply is split into one result set
//! per statement, in order, inside a [`GridReader`].
//!
//! Postgres does not accept bind parameters for multi-statement requests, so
//! parameters are rendered into the text as literals: integers as decimals,
//! text as escape-string literals (`E'...'`) with quotes and backslashes
//! escaped. This holds regardless of `standard_conforming_strings`.

use std::collections::VecDeque;
use std::iter::Peekable;
use std::str::CharIndices;

use futures::TryStreamExt;
use sqlx::postgres::{PgConnection, PgRow};
use sqlx::Either;

use super::error::DbError;
use super::mapping::{FromRowSlice, RowSlice};

/// A value bound to a batch placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i32),
    Text(String),
}

impl From<i32> for SqlParam {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl SqlParam {
    /// Append this value to `out` as a SQL literal.
    fn render_into(&self, out: &mut String) -> Result<(), DbError> {
        match self {
            // Parenthesized so `x-$1` can never turn into a `--` comment
            Self::Int(v) if *v < 0 => out.push_str(&format!("({})", v)),
            Self::Int(v) => out.push_str(&v.to_string()),
            Self::Text(s) => {
                if s.contains('\0') {
                    return Err(DbError::bind("text parameter contains a NUL byte"));
                }
                out.push_str("E'");
                for ch in s.chars() {
                    match ch {
                        '\'' => out.push_str("''"),
                        '\\' => out.push_str("\\\\"),
                        c => out.push(c),
                    }
                }
                out.push('\'');
            }
        }
        Ok(())
    }
}

/// A fixed multi-statement SQL text plus its positional parameters
#[derive(Debug, Clone)]
pub struct SqlBatch {
    sql: &'static str,
    params: Vec<SqlParam>,
}

impl SqlBatch {
    pub fn new(sql: &'static str) -> Self {
        Self {
            sql,
            params: Vec::new(),
        }
    }

    /// Bind the next positional parameter (`$1`, `$2`, ...)
    pub fn bind(mut self, value: impl Into<SqlParam>) -> Self {
        self.params.push(value.into());
        self
    }

    /// Produce the text sent to the server, with placeholders substituted.
    ///
    /// `$n` inside string literals, quoted identifiers and comments is left
    /// alone. A placeholder with no bound parameter is an error.
    pub fn render(&self) -> Result<String, DbError> {
        let mut out = String::with_capacity(self.sql.len() + 32);
        let mut chars = self.sql.char_indices().peekable();

        while let Some((_, ch)) = chars.next() {
            match ch {
                '\'' | '"' => {
                    out.push(ch);
                    copy_quoted(&mut chars, &mut out, ch);
                }
                '-' if next_is(&mut chars, '-') => {
                    push_opener(&mut chars, &mut out, ch);
                    copy_until(&mut chars, &mut out, |c, _| c == '\n');
                }
                '/' if next_is(&mut chars, '*') => {
                    push_opener(&mut chars, &mut out, ch);
                    copy_until(&mut chars, &mut out, |c, prev| prev == Some('*') && c == '/');
                }
                '$' if chars.peek().is_some_and(|(_, c)| c.is_ascii_digit()) => {
                    let index = take_number(&mut chars);
                    self.param(index)?.render_into(&mut out)?;
                }
                c => out.push(c),
            }
        }

        Ok(out)
    }

    fn param(&self, index: usize) -> Result<&SqlParam, DbError> {
        index
            .checked_sub(1)
            .and_then(|i| self.params.get(i))
            .ok_or_else(|| DbError::bind(format!("no parameter bound for ${}", index)))
    }

    /// Send the batch in one request and collect every result set.
    pub async fn query_multiple(&self, conn: &mut PgConnection) -> Result<GridReader, DbError> {
        let sql = self.render()?;
        let mut sets = Vec::new();
        let mut current = Vec::new();

        let mut stream = sqlx::raw_sql(&sql).fetch_many(&mut *conn);
        while let Some(step) = stream.try_next().await? {
            match step {
                // CommandComplete closes the current statement's result set
                Either::Left(_) => sets.push(std::mem::take(&mut current)),
                Either::Right(row) => current.push(row),
            }
        }

        tracing::debug!(sets = sets.len(), "batch completed");
        Ok(GridReader::new(sets))
    }
}

fn next_is(chars: &mut Peekable<CharIndices<'_>>, expected: char) -> bool {
    chars.peek().is_some_and(|(_, c)| *c == expected)
}

// Two-character comment opener: `--` or `/*`
fn push_opener(chars: &mut Peekable<CharIndices<'_>>, out: &mut String, first: char) {
    out.push(first);
    if let Some((_, second)) = chars.next() {
        out.push(second);
    }
}

// Copy a quoted region; a doubled quote is an escaped quote, not the end.
fn copy_quoted(chars: &mut Peekable<CharIndices<'_>>, out: &mut String, quote: char) {
    while let Some((_, c)) = chars.next() {
        out.push(c);
        if c == quote {
            if next_is(chars, quote) {
                if let Some((_, escaped)) = chars.next() {
                    out.push(escaped);
                }
            } else {
                return;
            }
        }
    }
}

fn copy_until(
    chars: &mut Peekable<CharIndices<'_>>,
    out: &mut String,
    end: impl Fn(char, Option<char>) -> bool,
) {
    let mut prev = None;
    for (_, c) in chars.by_ref() {
        out.push(c);
        if end(c, prev) {
            return;
        }
        prev = Some(c);
    }
}

fn take_number(chars: &mut Peekable<CharIndices<'_>>) -> usize {
    let mut n = 0usize;
    while let Some((_, c)) = chars.peek() {
        match c.to_digit(10) {
            Some(d) => {
                n = n.saturating_mul(10).saturating_add(d as usize);
                chars.next();
            }
            None => break,
        }
    }
    n
}

/// Ordered result sets of one batch, consumed front to back.
#[derive(Debug)]
pub struct GridReader {
    sets: VecDeque<Vec<PgRow>>,
    total: usize,
}

impl GridReader {
    pub fn new(sets: Vec<Vec<PgRow>>) -> Self {
        let total = sets.len();
        Self {
            sets: sets.into(),
            total,
        }
    }

    /// Result sets not yet read
    pub fn remaining(&self) -> usize {
        self.sets.len()
    }

    fn next_set(&mut self) -> Result<Vec<PgRow>, DbError> {
        self.sets
            .pop_front()
            .ok_or(DbError::Consumed { sets: self.total })
    }

    /// Map the next result set into records
    pub fn read<T: FromRowSlice>(&mut self) -> Result<Vec<T>, DbError> {
        self.next_set()?
            .iter()
            .map(|row| T::from_row_slice(&RowSlice::whole(row)).map_err(DbError::from))
            .collect()
    }

    /// Map the next result set, which must hold exactly one row
    pub fn read_single<T: FromRowSlice>(&mut self) -> Result<T, DbError> {
        let rows = self.next_set()?;
        match rows.as_slice() {
            [] => Err(DbError::NoRows),
            [row] => Ok(T::from_row_slice(&RowSlice::whole(row))?),
            _ => Err(DbError::Ambiguous { rows: rows.len() }),
        }
    }
}
