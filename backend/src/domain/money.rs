//! Price value object.
//!
//! Amounts are stored as `f64` because the backing `products.price` column is
//! a numeric that arrives as a JSON number. Construction validates the range
//! once so downstream code can rely on a finite, non-negative amount.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest accepted listing price.
pub const MAX_AMOUNT: f64 = 999_999.99;
/// Currency applied when a caller does not specify one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Validation errors raised by [`Money::new`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MoneyValidationError {
    #[error("Amount must be a valid number")]
    NotFinite,
    #[error("Amount cannot be negative")]
    Negative,
    #[error("Amount exceeds maximum allowed value")]
    TooLarge,
    #[error("Currency must be a non-empty string")]
    EmptyCurrency,
    #[error("Currency must be a valid 3-letter ISO 4217 code")]
    InvalidCurrency,
}

/// Immutable price with an ISO 4217 currency code.
///
/// ## Invariants
/// - `amount` is finite and within `0.0..=MAX_AMOUNT`.
/// - `currency` is exactly three upper-case ASCII letters.
///
/// # Examples
/// ```
/// use marketplace::domain::Money;
///
/// let price = Money::new(12.5, "eur").expect("valid price");
/// assert_eq!(price.to_string(), "EUR 12.50");
/// assert_eq!(price, Money::new(12.5, "EUR").expect("valid price"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MoneyDto", into = "MoneyDto")]
pub struct Money {
    amount: f64,
    currency: String,
}

impl Money {
    /// Validate and build a price.
    pub fn new(amount: f64, currency: &str) -> Result<Self, MoneyValidationError> {
        validate_amount(amount)?;
        let currency = normalise_currency(currency)?;
        Ok(Self { amount, currency })
    }

    /// Build a price in [`DEFAULT_CURRENCY`].
    pub fn usd(amount: f64) -> Result<Self, MoneyValidationError> {
        Self::new(amount, DEFAULT_CURRENCY)
    }

    /// Numeric amount.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Upper-case ISO 4217 code.
    pub fn currency(&self) -> &str {
        self.currency.as_str()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2}", self.currency, self.amount)
    }
}

fn validate_amount(amount: f64) -> Result<(), MoneyValidationError> {
    if !amount.is_finite() {
        return Err(MoneyValidationError::NotFinite);
    }
    if amount < 0.0 {
        return Err(MoneyValidationError::Negative);
    }
    if amount > MAX_AMOUNT {
        return Err(MoneyValidationError::TooLarge);
    }
    Ok(())
}

fn normalise_currency(currency: &str) -> Result<String, MoneyValidationError> {
    if currency.trim().is_empty() {
        return Err(MoneyValidationError::EmptyCurrency);
    }
    let upper = currency.to_ascii_uppercase();
    if upper.len() != 3 || !upper.chars().all(|ch| ch.is_ascii_uppercase()) {
        return Err(MoneyValidationError::InvalidCurrency);
    }
    Ok(upper)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MoneyDto {
    amount: f64,
    currency: String,
}

impl From<Money> for MoneyDto {
    fn from(value: Money) -> Self {
        Self {
            amount: value.amount,
            currency: value.currency,
        }
    }
}

impl TryFrom<MoneyDto> for Money {
    type Error = MoneyValidationError;

    fn try_from(value: MoneyDto) -> Result<Self, Self::Error> {
        Self::new(value.amount, &value.currency)
    }
}
