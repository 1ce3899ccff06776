//! Heuristic fraud scoring.
//!
//! Each signal adds a fixed weight independently; the sum is capped at 1.0
//! and flagged at [`FLAG_THRESHOLD`](crate::domain::transaction::FLAG_THRESHOLD).

use tracing::debug;

use crate::domain::RiskScore;
use crate::ports::RepositoryResult;
use crate::services::velocity::VelocityTracker;

pub const HIGH_AMOUNT_THRESHOLD: f64 = 1000.0;
pub const HIGH_AMOUNT_WEIGHT: f64 = 0.5;

pub const HOME_COUNTRY: &str = "SG";
pub const FOREIGN_COUNTRY_WEIGHT: f64 = 0.3;

pub const VELOCITY_WINDOW_SECS: i64 = 60;
pub const VELOCITY_COUNT_THRESHOLD: usize = 3;
pub const VELOCITY_WEIGHT: f64 = 0.4;

/// Pure score composition over already-gathered signals.
pub fn compose_score(amount: f64, country: &str, recent_count: usize) -> RiskScore {
    let mut score = 0.0;

    if amount > HIGH_AMOUNT_THRESHOLD {
        score += HIGH_AMOUNT_WEIGHT;
    }

    if !country.trim().eq_ignore_ascii_case(HOME_COUNTRY) {
        score += FOREIGN_COUNTRY_WEIGHT;
    }

    if recent_count >= VELOCITY_COUNT_THRESHOLD {
        score += VELOCITY_WEIGHT;
    }

    RiskScore::from_raw(score)
}

#[derive(Clone)]
pub struct RiskScorer {
    velocity: VelocityTracker,
}

impl RiskScorer {
    pub fn new(velocity: VelocityTracker) -> Self {
        Self { velocity }
    }

    pub async fn score(&self, user_id: &str, amount: f64, country: &str) -> RepositoryResult<RiskScore> {
        let recent_count = self
            .velocity
            .count_recent(user_id, VELOCITY_WINDOW_SECS)
            .await?;
        let risk = compose_score(amount, country, recent_count);

        debug!(
            user_id,
            amount,
            country,
            recent_count,
            fraud_score = risk.score,
            flagged = risk.flagged,
            "transaction scored"
        );

        Ok(risk)
    }
}
