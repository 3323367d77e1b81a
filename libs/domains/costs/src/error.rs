use thiserror::Error;

use crate::models::Currency;

/// Result type for cost model operations
pub type CostResult<T> = Result<T, CostError>;

/// Errors that can occur in the canonical cost model
#[derive(Debug, Error)]
pub enum CostError {
    /// Arithmetic attempted across two different currencies
    #[error("Currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch { expected: Currency, actual: Currency },

    /// Currency code outside the supported ISO set
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// No exchange rate configured for a conversion pair
    #[error("No exchange rate available for {from} -> {to}")]
    RateUnavailable { from: Currency, to: Currency },

    /// Tier list does not cover [0, inf) contiguously
    #[error("Invalid pricing tiers: {0}")]
    InvalidPricingTiers(String),

    /// Quantity passed to a pricing calculation is negative
    #[error("Negative quantity not allowed: {0}")]
    NegativeQuantity(rust_decimal::Decimal),
}
