//! Booking types for the shared reservation calendar.
//!
//! A `Booking` reserves the property for an inclusive range of calendar
//! dates. Bookings are never mutated in place: they are created, removed,
//! or replaced wholesale when another context rewrites the collection.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FieldIssue, ValidationError};

/// Presentation color used when the creating session has no profile color.
pub const DEFAULT_OWNER_COLOR: &str = "#2563eb";

fn default_owner_color() -> String {
    DEFAULT_OWNER_COLOR.to_string()
}

/// A reservation of the shared property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Creation-ordered identifier: epoch milliseconds at creation,
    /// bumped past any existing id assigned in the same millisecond.
    pub id: i64,
    /// Display label, non-empty.
    pub name: String,
    pub start_date: NaiveDate,
    /// Last reserved day, inclusive. Never precedes `start_date`.
    pub end_date: NaiveDate,
    pub guests: u32,
    /// Identity of the creating session's user, if one was supplied.
    pub owner_id: Option<String>,
    /// Presentation tag bound at creation time, never recomputed.
    #[serde(default = "default_owner_color")]
    pub owner_color: String,
    /// Audit/display only; ordering always uses `start_date`.
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Whether `date` falls within the booking's inclusive date range.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// User-submitted input for a new booking.
///
/// Validated by [`BookingStore::create`](crate::store::BookingStore::create)
/// before anything is assigned or persisted.
#[derive(Debug, Clone, Default)]
pub struct BookingDraft {
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Defaults to 1 when absent.
    pub guests: Option<u32>,
}

/// A draft that passed validation.
#[derive(Debug, Clone)]
pub(crate) struct ValidatedDraft {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guests: u32,
}

impl BookingDraft {
    /// Check the draft, collecting every failing field.
    pub(crate) fn validate(&self) -> Result<ValidatedDraft, ValidationError> {
        let mut issues = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            issues.push(FieldIssue {
                field: "name",
                reason: "must not be empty".to_string(),
            });
        }

        if self.start_date.is_none() {
            issues.push(FieldIssue {
                field: "startDate",
                reason: "is required".to_string(),
            });
        }
        if self.end_date.is_none() {
            issues.push(FieldIssue {
                field: "endDate",
                reason: "is required".to_string(),
            });
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                issues.push(FieldIssue {
                    field: "endDate",
                    reason: "must not precede startDate".to_string(),
                });
            }
        }

        let guests = self.guests.unwrap_or(1);
        if guests < 1 {
            issues.push(FieldIssue {
                field: "guests",
                reason: "must be at least 1".to_string(),
            });
        }

        match (self.start_date, self.end_date) {
            (Some(start_date), Some(end_date)) if issues.is_empty() => Ok(ValidatedDraft {
                name: name.to_string(),
                start_date,
                end_date,
                guests,
            }),
            _ => Err(ValidationError { issues }),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
