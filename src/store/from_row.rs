//! Row mapping helpers for the license-code store.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::LicenseCode;

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub const LICENSE_CODE_COLS: &str = "id, code, created_at, expiry_date, expiry_days, assigned_at, assigned_to, is_hours_mode, expiry_value, is_used, used_at, used_by";

impl FromRow for LicenseCode {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(LicenseCode {
            id: row.get(0)?,
            code: row.get(1)?,
            created_at: row.get(2)?,
            expiry_date: row.get(3)?,
            expiry_days: row.get(4)?,
            assigned_at: row.get(5)?,
            assigned_to: row.get(6)?,
            is_hours_mode: row.get::<_, i32>(7)? != 0,
            expiry_value: row.get(8)?,
            is_used: row.get::<_, i32>(9)? != 0,
            used_at: row.get(10)?,
            used_by: row.get(11)?,
        })
    }
}
