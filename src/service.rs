//! The license service: every operation callers may perform on access codes.
//!
//! The service owns nothing but an injected store pool; each operation
//! fetches a pooled connection, works against the store, and returns. The
//! only blocking boundaries are the store calls themselves.

use chrono::{NaiveDateTime, Timelike, Utc};

use crate::code;
use crate::error::{AppError, Result};
use crate::expiry::{self, ExpiryWindow};
use crate::models::{LicenseCode, TemporalState};
use crate::store::{queries, DbPool};

/// Actor recorded when a code is re-marked used through the admin toggle.
const TOGGLE_ACTOR: &str = "admin";

const MAX_GENERATION_ATTEMPTS: u32 = 8;

/// Outcome of validating a code. Rejections are ordinary outcomes, not
/// errors; store failures surface separately as `AppError`.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Valid,
    NotFound,
    AlreadyUsed,
    Expired { expired_on: NaiveDateTime },
    OwnedByAnother,
}

impl Verdict {
    pub fn accepted(&self) -> bool {
        matches!(self, Verdict::Valid)
    }

    /// User-facing reason string for this verdict.
    pub fn message(&self) -> String {
        match self {
            Verdict::Valid => "Valid access code.".to_string(),
            Verdict::NotFound => "Invalid access code.".to_string(),
            Verdict::AlreadyUsed => "This access code has already been used.".to_string(),
            Verdict::Expired { expired_on } => format!(
                "This access code expired on {}.",
                expired_on.format("%Y-%m-%d %H:%M")
            ),
            Verdict::OwnedByAnother => {
                "This access code is not assigned to your account.".to_string()
            }
        }
    }
}

#[derive(Clone)]
pub struct LicenseService {
    db: DbPool,
}

impl LicenseService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    fn now() -> NaiveDateTime {
        // Truncate to seconds so the stored string round-trips exactly
        Utc::now()
            .naive_utc()
            .with_nanosecond(0)
            .expect("zero nanoseconds is always valid")
    }

    /// Generate, persist, and return a new access code.
    ///
    /// The code is only considered issued once the store write has been
    /// confirmed; a write failure propagates and nothing is returned.
    pub fn generate_code(&self, window: ExpiryWindow) -> Result<String> {
        let conn = self.db.get()?;

        for _ in 0..MAX_GENERATION_ATTEMPTS {
            let code = code::generate_code();
            if queries::code_exists(&conn, &code)? {
                tracing::warn!("generated code collided with an existing record, retrying");
                continue;
            }

            let record = LicenseCode::new(code.clone(), window, Self::now());
            queries::append_code(&conn, &record)?;
            tracing::info!(code = %code, "issued new access code");
            return Ok(code);
        }

        Err(AppError::Persistence(
            "could not allocate a unique code".to_string(),
        ))
    }

    /// Validate a code for a requester. Pure read, no mutation.
    pub fn validate_code(&self, input_code: &str, requester: &str) -> Result<Verdict> {
        if !code::is_valid_code_format(input_code) {
            return Ok(Verdict::NotFound);
        }

        let conn = self.db.get()?;
        let Some(record) = queries::get_code(&conn, input_code)? else {
            return Ok(Verdict::NotFound);
        };

        if record.is_used {
            return Ok(Verdict::AlreadyUsed);
        }

        // A code whose clock has not started cannot be expired. Records with
        // unparseable expiry data are treated the same way rather than
        // rejected; remaining-time queries report them as unreadable.
        let effective_expiry = match record.effective_expiry() {
            Ok(expiry) => expiry,
            Err(AppError::NoExpiryData) => {
                tracing::warn!(code = %input_code, "record has unparseable expiry data");
                None
            }
            Err(e) => return Err(e),
        };

        if let Some(expiry) = effective_expiry {
            if Self::now() > expiry {
                return Ok(Verdict::Expired { expired_on: expiry });
            }
        }

        if record.is_assigned() && !requester.is_empty() && record.assigned_to != requester {
            return Ok(Verdict::OwnedByAnother);
        }

        Ok(Verdict::Valid)
    }

    /// Claim a code for an identity, starting its validity clock.
    ///
    /// Idempotent: re-registering the owning identity succeeds without
    /// touching the stored assignment instant. A code owned by a different
    /// identity is never reassigned.
    pub fn register_code(&self, input_code: &str, identity: &str) -> Result<bool> {
        if identity.trim().is_empty() {
            return Err(AppError::BadRequest("identity must not be empty".to_string()));
        }
        if !code::is_valid_code_format(input_code) {
            return Ok(false);
        }

        let conn = self.db.get()?;
        let Some(record) = queries::get_code(&conn, input_code)? else {
            return Ok(false);
        };

        if record.is_used {
            return Ok(false);
        }
        if record.assigned_to == identity {
            return Ok(true);
        }
        if record.is_assigned() {
            tracing::debug!(code = %input_code, "code already assigned to another identity");
            return Ok(false);
        }

        let assigned_at = Self::now();
        let expiry = expiry::compute_expiry(assigned_at, record.expiry_window());

        let claimed = queries::try_assign_code(
            &conn,
            input_code,
            identity,
            &expiry::format_timestamp(assigned_at),
            &expiry::format_timestamp(expiry),
        )?;

        if claimed {
            tracing::info!(code = %input_code, identity = %identity, "code assigned");
            return Ok(true);
        }

        // Lost the race. If the winner was this same identity the claim
        // still holds; anyone else keeps the code.
        let current = queries::get_code(&conn, input_code)?;
        Ok(current.is_some_and(|r| r.assigned_to == identity))
    }

    /// Consume a code, the terminal single-use transition.
    pub fn consume_code(&self, input_code: &str, used_by: &str) -> Result<bool> {
        if !code::is_valid_code_format(input_code) {
            return Ok(false);
        }

        let conn = self.db.get()?;
        let consumed = queries::try_consume_code(
            &conn,
            input_code,
            used_by,
            &expiry::format_timestamp(Self::now()),
        )?;

        if consumed {
            tracing::info!(code = %input_code, used_by = %used_by, "code consumed");
        }
        Ok(consumed)
    }

    /// Human-readable remaining-time report for the code bound to an
    /// identity.
    pub fn remaining_time(&self, identity: &str) -> Result<String> {
        let conn = self.db.get()?;

        let Some(record) = queries::get_code_by_assignee(&conn, identity)? else {
            return Ok("No access code found".to_string());
        };

        let now = Self::now();
        match record.temporal_state() {
            Ok(TemporalState::AssignedAt(assigned_at)) => Ok(expiry::report_from_assignment(
                now,
                assigned_at,
                record.expiry_window(),
            )),
            Ok(TemporalState::LegacyExpiryOnly(expiry_date)) => {
                Ok(expiry::report_legacy(now, expiry_date))
            }
            Ok(TemporalState::NeverAssigned) | Err(AppError::NoExpiryData) => {
                tracing::warn!(identity = %identity, "assigned record has no readable expiry data");
                Ok("Error retrieving code information".to_string())
            }
            Err(e) => Err(e),
        }
    }

    /// Whether any code is bound to this identity.
    pub fn has_registered_code(&self, identity: &str) -> Result<bool> {
        let conn = self.db.get()?;
        Ok(queries::get_code_by_assignee(&conn, identity)?.is_some())
    }

    /// All records, newest first.
    pub fn list_codes(&self) -> Result<Vec<LicenseCode>> {
        let conn = self.db.get()?;
        queries::scan_codes(&conn)
    }

    /// Physically delete a code. Administrative.
    pub fn delete_code(&self, input_code: &str) -> Result<bool> {
        let conn = self.db.get()?;
        let deleted = queries::delete_code(&conn, input_code)?;
        if deleted {
            tracing::info!(code = %input_code, "code deleted");
        }
        Ok(deleted)
    }

    /// Flip a code's usage flag. Administrative; re-opening a consumed code
    /// clears its usage bookkeeping.
    pub fn toggle_usage(&self, input_code: &str) -> Result<bool> {
        let mut conn = self.db.get()?;
        let toggled = queries::toggle_code_usage(
            &mut conn,
            input_code,
            TOGGLE_ACTOR,
            &expiry::format_timestamp(Self::now()),
        )?;

        match toggled {
            Some(record) => {
                tracing::info!(code = %input_code, is_used = record.is_used, "code usage toggled");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
