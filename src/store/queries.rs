//! Store operations for license-code records.
//!
//! The store is a keyed table: records are appended under an opaque UUID
//! key and read back by key, by unique code, or by assignee. Mutations that
//! decide races (first claim, consumption) are conditional UPDATEs whose
//! WHERE clauses re-check the precondition; the affected-row count decides
//! the winner, so no cross-call lock is ever held.

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::LicenseCode;

use super::from_row::{query_all, query_one, LICENSE_CODE_COLS};

fn gen_id() -> String {
    Uuid::new_v4().to_string()
}

/// Append a new record. Returns the stored record with its key set.
pub fn append_code(conn: &Connection, record: &LicenseCode) -> Result<LicenseCode> {
    let id = gen_id();

    let affected = conn.execute(
        "INSERT INTO license_codes (id, code, created_at, expiry_date, expiry_days, assigned_at, assigned_to, is_hours_mode, expiry_value, is_used, used_at, used_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            &id,
            &record.code,
            &record.created_at,
            &record.expiry_date,
            record.expiry_days,
            &record.assigned_at,
            &record.assigned_to,
            record.is_hours_mode as i32,
            record.expiry_value,
            record.is_used as i32,
            &record.used_at,
            &record.used_by,
        ],
    )?;

    if affected != 1 {
        return Err(AppError::Persistence(format!(
            "insert of code {} affected {} rows",
            record.code, affected
        )));
    }

    Ok(LicenseCode {
        id,
        ..record.clone()
    })
}

pub fn get_code_by_id(conn: &Connection, id: &str) -> Result<Option<LicenseCode>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM license_codes WHERE id = ?1",
            LICENSE_CODE_COLS
        ),
        &[&id],
    )
}

pub fn get_code(conn: &Connection, code: &str) -> Result<Option<LicenseCode>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM license_codes WHERE code = ?1",
            LICENSE_CODE_COLS
        ),
        &[&code],
    )
}

/// Look up the record bound to an identity, if any. An empty identity
/// matches nothing: unassigned records are open, not owned by "".
pub fn get_code_by_assignee(conn: &Connection, identity: &str) -> Result<Option<LicenseCode>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM license_codes WHERE assigned_to = ?1 AND assigned_to != '' ORDER BY created_at DESC LIMIT 1",
            LICENSE_CODE_COLS
        ),
        &[&identity],
    )
}

pub fn code_exists(conn: &Connection, code: &str) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM license_codes WHERE code = ?1)",
        params![code],
        |row| row.get(0),
    )?;
    Ok(exists)
}

pub fn scan_codes(conn: &Connection) -> Result<Vec<LicenseCode>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM license_codes ORDER BY created_at DESC",
            LICENSE_CODE_COLS
        ),
        &[],
    )
}

/// Full-record replace by key.
pub fn put_code(conn: &Connection, record: &LicenseCode) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE license_codes SET code = ?2, created_at = ?3, expiry_date = ?4, expiry_days = ?5, assigned_at = ?6, assigned_to = ?7, is_hours_mode = ?8, expiry_value = ?9, is_used = ?10, used_at = ?11, used_by = ?12
         WHERE id = ?1",
        params![
            &record.id,
            &record.code,
            &record.created_at,
            &record.expiry_date,
            record.expiry_days,
            &record.assigned_at,
            &record.assigned_to,
            record.is_hours_mode as i32,
            record.expiry_value,
            record.is_used as i32,
            &record.used_at,
            &record.used_by,
        ],
    )?;
    Ok(affected > 0)
}

/// Atomically claim an unassigned code for an identity.
///
/// The UPDATE only succeeds if the code exists, is unused, and is still
/// unassigned, so two racing first claims cannot both win. The new
/// `expiry_date` is persisted alongside `assigned_at` for legacy readers.
///
/// Returns true if this call performed the claim.
pub fn try_assign_code(
    conn: &Connection,
    code: &str,
    identity: &str,
    assigned_at: &str,
    expiry_date: &str,
) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE license_codes SET assigned_to = ?2, assigned_at = ?3, expiry_date = ?4
         WHERE code = ?1 AND is_used = 0 AND assigned_to = ''",
        params![code, identity, assigned_at, expiry_date],
    )?;
    Ok(affected > 0)
}

/// Atomically consume an unused code.
///
/// Only the usage fields are touched; assignment data survives consumption.
/// Returns true if this call performed the consumption.
pub fn try_consume_code(
    conn: &Connection,
    code: &str,
    used_by: &str,
    used_at: &str,
) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE license_codes SET is_used = 1, used_at = ?2, used_by = ?3
         WHERE code = ?1 AND is_used = 0",
        params![code, used_at, used_by],
    )?;
    Ok(affected > 0)
}

pub fn delete_code(conn: &Connection, code: &str) -> Result<bool> {
    let affected = conn.execute("DELETE FROM license_codes WHERE code = ?1", params![code])?;
    Ok(affected > 0)
}

/// Administratively flip a code's usage flag.
///
/// Runs as a read-modify-write inside an IMMEDIATE transaction so two
/// concurrent toggles serialize instead of double-applying. Marking a code
/// used records the actor and instant; clearing re-opens it.
pub fn toggle_code_usage(
    conn: &mut Connection,
    code: &str,
    toggled_by: &str,
    toggled_at: &str,
) -> Result<Option<LicenseCode>> {
    let tx = conn.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

    let Some(mut record) = query_one::<LicenseCode>(
        &tx,
        &format!(
            "SELECT {} FROM license_codes WHERE code = ?1",
            LICENSE_CODE_COLS
        ),
        &[&code],
    )?
    else {
        return Ok(None);
    };

    record.is_used = !record.is_used;
    if record.is_used {
        record.used_at = Some(toggled_at.to_string());
        record.used_by = Some(toggled_by.to_string());
    } else {
        record.used_at = None;
        record.used_by = None;
    }

    put_code(&tx, &record)?;
    tx.commit()?;

    Ok(Some(record))
}
