pub mod sqlite_transaction_repository;

pub use sqlite_transaction_repository::SqliteTransactionRepository;
