//! SQLite implementation of TransactionRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::{NewTransaction, Transaction};
use crate::ports::{RepositoryError, RepositoryResult, TransactionRepository};

/// SQLite-backed transaction ledger.
#[derive(Clone)]
pub struct SqliteTransactionRepository {
    pool: SqlitePool,
}

impl SqliteTransactionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRepository for SqliteTransactionRepository {
    async fn insert(&self, tx: &NewTransaction) -> RepositoryResult<i64> {
        // Dropping `db_tx` without commit rolls the insert back.
        let mut db_tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let id = sqlx::query(
            r#"
            INSERT INTO transactions (
                user_id, amount, country, created_at, fraud_score, flagged
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&tx.user_id)
        .bind(tx.amount)
        .bind(&tx.country)
        .bind(tx.created_at_string())
        .bind(tx.risk.score)
        .bind(i64::from(tx.risk.flagged))
        .execute(&mut *db_tx)
        .await
        .map_err(RepositoryError::from)?
        .last_insert_rowid();

        db_tx.commit().await.map_err(RepositoryError::from)?;
        Ok(id)
    }

    async fn get_by_id(&self, id: i64) -> RepositoryResult<Option<Transaction>> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, user_id, amount, country, created_at, fraud_score, flagged
            FROM transactions
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(row.map(TransactionRow::into_domain))
    }

    async fn list_recent(&self, limit: i64) -> RepositoryResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, user_id, amount, country, created_at, fraud_score, flagged
            FROM transactions
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(rows.into_iter().map(TransactionRow::into_domain).collect())
    }
}

/// Internal row type for SQLx. Not exposed outside the adapter.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: i64,
    user_id: String,
    amount: f64,
    country: String,
    created_at: String,
    fraud_score: f64,
    flagged: i64,
}

impl TransactionRow {
    fn into_domain(self) -> Transaction {
        Transaction {
            id: self.id,
            user_id: self.user_id,
            amount: self.amount,
            country: self.country,
            created_at: self.created_at,
            fraud_score: self.fraud_score,
            flagged: self.flagged != 0,
        }
    }
}
