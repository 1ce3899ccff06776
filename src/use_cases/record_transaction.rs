//! Record transaction use case.
//! Validates a request, scores it against the ledger and persists the result.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::NewTransaction;
use crate::ports::{RepositoryError, TransactionRepository};
use crate::services::{RiskScorer, VelocityTracker};
use crate::validation::{validate_transaction, ValidationError};

#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Output of the RecordTransaction use case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedTransaction {
    pub id: i64,
    pub fraud_score: f64,
    pub flagged: bool,
}

/// Use case for ingesting a transaction.
#[derive(Clone)]
pub struct RecordTransaction {
    transaction_repository: Arc<dyn TransactionRepository>,
    scorer: RiskScorer,
}

impl RecordTransaction {
    pub fn new(transaction_repository: Arc<dyn TransactionRepository>) -> Self {
        let scorer = RiskScorer::new(VelocityTracker::new(transaction_repository.clone()));
        Self {
            transaction_repository,
            scorer,
        }
    }

    /// Runs validate → score → persist. Nothing is written on a validation
    /// or scoring failure, and a failed insert never yields an id.
    pub async fn execute(&self, input: &Value) -> Result<RecordedTransaction, RecordError> {
        let candidate = validate_transaction(input)?;

        let risk = self
            .scorer
            .score(&candidate.user_id, candidate.amount, &candidate.country)
            .await?;

        let new_tx = NewTransaction::new(candidate, risk, Utc::now());
        let id = self.transaction_repository.insert(&new_tx).await?;

        if risk.flagged {
            warn!(
                transaction_id = id,
                user_id = %new_tx.user_id,
                fraud_score = risk.score,
                "transaction flagged"
            );
        } else {
            info!(transaction_id = id, fraud_score = risk.score, "transaction recorded");
        }

        Ok(RecordedTransaction {
            id,
            fraud_score: risk.score,
            flagged: risk.flagged,
        })
    }
}
