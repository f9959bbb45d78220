//! Renter ledger: one renter's billing state and the rent accrued against it.
//!
//! Rent accrues linearly. A renter paying `W` per week owes `W / 604800` for
//! every second elapsed since `last_paid_timestamp`.

use chrono::DateTime;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::AccrualError;

pub const SECONDS_IN_WEEK: i64 = 7 * 24 * 60 * 60;

/// Durable billing state for a single renter.
///
/// Fields are declared in JSON key order so serialized records come out with
/// sorted keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenterRecord {
    /// Identifies the record and receives the notice.
    pub email: String,
    /// Unix seconds (UTC) of the last notice that was confirmed sent.
    #[serde(rename = "unix_time_last_paid")]
    pub last_paid_timestamp: i64,
    /// Rent per 7-day period. Finite and non-negative once deserialized.
    #[serde(
        rename = "weekly_rent_amt",
        serialize_with = "serialize_rent",
        deserialize_with = "deserialize_rent"
    )]
    pub weekly_rent_amount: f64,
}

impl RenterRecord {
    pub fn new(
        email: impl Into<String>,
        weekly_rent_amount: f64,
        last_paid_timestamp: i64,
    ) -> Self {
        Self {
            email: email.into(),
            last_paid_timestamp,
            weekly_rent_amount,
        }
    }

    /// Rent owed per second.
    pub fn accrual_rate(&self) -> f64 {
        self.weekly_rent_amount / SECONDS_IN_WEEK as f64
    }

    /// Rent accrued between the last payment and `now`.
    ///
    /// Rejects `now < last_paid_timestamp` rather than producing a negative
    /// amount.
    pub fn amount_owed(&self, now: i64) -> Result<f64, AccrualError> {
        if now < self.last_paid_timestamp {
            return Err(AccrualError::ClockSkew {
                last_paid: self.last_paid_timestamp,
                now,
            });
        }
        let elapsed = now.abs_diff(self.last_paid_timestamp);
        Ok(self.accrual_rate() * elapsed as f64)
    }

    /// Copy of this record with the last payment moved to `now`.
    pub fn mark_paid(&self, now: i64) -> Self {
        Self {
            last_paid_timestamp: now,
            ..self.clone()
        }
    }
}

impl std::fmt::Display for RenterRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "renter(email={}, amt={})", self.email, self.weekly_rent_amount)
    }
}

/// Largest magnitude below which every integral `f64` is exact as an integer.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Whole amounts are written as JSON integers (`260`, not `260.0`).
fn serialize_rent<S: Serializer>(amount: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if amount.fract() == 0.0 && (0.0..EXACT_INTEGER_LIMIT).contains(amount) {
        serializer.serialize_u64(*amount as u64)
    } else {
        serializer.serialize_f64(*amount)
    }
}

fn deserialize_rent<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let amount = f64::deserialize(deserializer)?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(D::Error::custom(format!(
            "weekly rent must be a finite non-negative number, got {amount}"
        )));
    }
    Ok(amount)
}

/// Render Unix seconds as `YYYY-MM-DD HH:MM:SS` (UTC) for log output.
///
/// Timestamps outside chrono's range fall back to the raw number.
pub fn format_unix(secs: i64) -> String {
    match DateTime::from_timestamp(secs, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => secs.to_string(),
    }
}
