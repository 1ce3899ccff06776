//! Domain layer. Framework-agnostic entities shared by the scorer, the
//! store port and the HTTP adapter.

pub mod transaction;

pub use transaction::{NewTransaction, RiskScore, Transaction, TransactionCandidate};
