use serde_json::Value;
use thiserror::Error;

use crate::domain::TransactionCandidate;

pub const REQUIRED_FIELDS: [&str; 3] = ["user_id", "amount", "country"];
pub const COUNTRY_MIN_LEN: usize = 2;

/// First offending field of a transaction request. The messages are
/// returned to API callers as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("user_id must be a non-empty string")]
    InvalidUserId,

    #[error("amount must be a number")]
    AmountNotNumeric,

    #[error("amount must be >= 0")]
    NegativeAmount,

    #[error("country must be a valid string (e.g., 'SG')")]
    InvalidCountry,
}

impl ValidationError {
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::NotAnObject => None,
            ValidationError::MissingField(field) => Some(*field),
            ValidationError::InvalidUserId => Some("user_id"),
            ValidationError::AmountNotNumeric | ValidationError::NegativeAmount => Some("amount"),
            ValidationError::InvalidCountry => Some("country"),
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Checks an untyped request body and normalizes it into a candidate.
///
/// Presence of every required field is checked before any type or range
/// check, so a body missing `country` reports that even when `amount` is
/// also malformed.
pub fn validate_transaction(input: &Value) -> ValidationResult<TransactionCandidate> {
    let fields = input.as_object().ok_or(ValidationError::NotAnObject)?;

    if let Some(missing) = REQUIRED_FIELDS.iter().find(|k| !fields.contains_key(**k)) {
        return Err(ValidationError::MissingField(*missing));
    }

    let user_id = validate_user_id(&fields["user_id"])?;
    let amount = validate_amount(&fields["amount"])?;
    let country = validate_country(&fields["country"])?;

    Ok(TransactionCandidate {
        user_id,
        amount,
        country,
    })
}

fn validate_user_id(value: &Value) -> ValidationResult<String> {
    match value.as_str().map(str::trim) {
        Some(user_id) if !user_id.is_empty() => Ok(user_id.to_string()),
        _ => Err(ValidationError::InvalidUserId),
    }
}

fn validate_amount(value: &Value) -> ValidationResult<f64> {
    let amount = value.as_f64().ok_or(ValidationError::AmountNotNumeric)?;
    if amount < 0.0 {
        return Err(ValidationError::NegativeAmount);
    }
    Ok(amount)
}

fn validate_country(value: &Value) -> ValidationResult<String> {
    match value.as_str().map(str::trim) {
        Some(country) if country.chars().count() >= COUNTRY_MIN_LEN => Ok(country.to_uppercase()),
        _ => Err(ValidationError::InvalidCountry),
    }
}
