//! Transaction domain entity.
//! Framework-agnostic representation of a scored ledger entry.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Scores at or above this value are flagged for review.
pub const FLAG_THRESHOLD: f64 = 0.7;

/// Stored transaction as read back from the ledger.
///
/// `created_at` is kept in its persisted ISO-8601 form so that rows written
/// by other tools remain readable even when the timestamp does not parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: String,
    pub amount: f64,
    pub country: String,
    pub created_at: String,
    pub fraud_score: f64,
    pub flagged: bool,
}

impl Transaction {
    /// Parsed creation instant, or `None` for a malformed timestamp.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Validated, normalized request data. Produced only by the validator.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionCandidate {
    pub user_id: String,
    pub amount: f64,
    /// Uppercased country code.
    pub country: String,
}

/// Bounded fraud score together with its flag decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskScore {
    pub score: f64,
    pub flagged: bool,
}

impl RiskScore {
    /// Clamps `raw` into `[0.0, 1.0]` and derives the flag from the result.
    pub fn from_raw(raw: f64) -> Self {
        let score = raw.clamp(0.0, 1.0);
        Self {
            score,
            flagged: score >= FLAG_THRESHOLD,
        }
    }
}

/// A candidate plus the system-assigned fields, ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub user_id: String,
    pub amount: f64,
    pub country: String,
    pub created_at: DateTime<Utc>,
    pub risk: RiskScore,
}

impl NewTransaction {
    pub fn new(candidate: TransactionCandidate, risk: RiskScore, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id: candidate.user_id,
            amount: candidate.amount,
            country: candidate.country,
            created_at,
            risk,
        }
    }

    /// Storage form of `created_at`: RFC 3339, microsecond precision, `+00:00` offset.
    pub fn created_at_string(&self) -> String {
        format_timestamp(self.created_at)
    }
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, false)
}
