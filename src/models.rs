use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::expiry::{self, ExpiryWindow};

/// One issued access code, in the shape it is persisted and exported.
///
/// Field names follow the pre-existing data (camelCase, string timestamps)
/// so records can be imported unchanged. The opaque store key is not part
/// of the wire shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseCode {
    #[serde(skip, default)]
    pub id: String,
    pub code: String,
    #[serde(default)]
    pub created_at: String,
    /// Absolute expiry. Recomputed at assignment time for current records;
    /// on legacy records it is the only temporal data available.
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default = "default_expiry_days")]
    pub expiry_days: i64,
    /// Assignment instant; absent on legacy records and unassigned codes.
    #[serde(default)]
    pub assigned_at: Option<String>,
    /// Identity the code is bound to; empty means open for first claim.
    #[serde(default)]
    pub assigned_to: String,
    #[serde(default)]
    pub is_hours_mode: bool,
    #[serde(default)]
    pub expiry_value: f64,
    #[serde(default)]
    pub is_used: bool,
    #[serde(default)]
    pub used_at: Option<String>,
    #[serde(default)]
    pub used_by: Option<String>,
}

fn default_expiry_days() -> i64 {
    expiry::DEFAULT_EXPIRY_DAYS
}

/// Temporal state of a record, derived from its nullable timestamp fields.
///
/// Business logic goes through this variant instead of inspecting the
/// fields directly, so "which field wins" is decided in exactly one place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TemporalState {
    /// Never assigned: the validity clock has not started.
    NeverAssigned,
    /// Assigned at the given instant; expiry is computed from it.
    AssignedAt(chrono::NaiveDateTime),
    /// Legacy record carrying only a precomputed absolute expiry.
    LegacyExpiryOnly(chrono::NaiveDateTime),
}

impl LicenseCode {
    /// Build a fresh, unassigned, unused record for a newly generated code.
    pub fn new(code: String, window: ExpiryWindow, created_at: chrono::NaiveDateTime) -> Self {
        let (expiry_days, is_hours_mode, expiry_value) = match window {
            ExpiryWindow::Days(days) => {
                let days = if days <= 0 {
                    expiry::DEFAULT_EXPIRY_DAYS
                } else {
                    days
                };
                (days, false, 0.0)
            }
            ExpiryWindow::Hours(hours) => (expiry::DEFAULT_EXPIRY_DAYS, true, hours),
        };

        LicenseCode {
            id: String::new(),
            code,
            created_at: expiry::format_timestamp(created_at),
            expiry_date: None,
            expiry_days,
            assigned_at: None,
            assigned_to: String::new(),
            is_hours_mode,
            expiry_value,
            is_used: false,
            used_at: None,
            used_by: None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        !self.assigned_to.is_empty()
    }

    /// The validity window this record was issued with.
    pub fn expiry_window(&self) -> ExpiryWindow {
        ExpiryWindow::from_fields(self.is_hours_mode, self.expiry_value, self.expiry_days)
    }

    /// Derive the temporal state. A parseable `assignedAt` wins; otherwise a
    /// parseable legacy `expiryDate`; otherwise the record either was never
    /// assigned (both fields empty) or carries unparseable data.
    pub fn temporal_state(&self) -> Result<TemporalState> {
        let assigned_at = self.assigned_at.as_deref().unwrap_or("").trim();
        let expiry_date = self.expiry_date.as_deref().unwrap_or("").trim();

        if let Some(ts) = expiry::parse_timestamp(assigned_at) {
            return Ok(TemporalState::AssignedAt(ts));
        }
        if let Some(ts) = expiry::parse_timestamp(expiry_date) {
            return Ok(TemporalState::LegacyExpiryOnly(ts));
        }
        if assigned_at.is_empty() && expiry_date.is_empty() {
            return Ok(TemporalState::NeverAssigned);
        }

        Err(AppError::NoExpiryData)
    }

    /// Effective expiry instant, or None when the clock has not started.
    pub fn effective_expiry(&self) -> Result<Option<chrono::NaiveDateTime>> {
        Ok(match self.temporal_state()? {
            TemporalState::NeverAssigned => None,
            TemporalState::AssignedAt(assigned_at) => {
                Some(expiry::compute_expiry(assigned_at, self.expiry_window()))
            }
            TemporalState::LegacyExpiryOnly(expiry) => Some(expiry),
        })
    }
}
