//! Canonical cost model shared by every engine in the platform.
//!
//! Providers, canonical resource types, exact-decimal money, currency
//! conversion, and quantity-proportional (tiered) pricing live here so the
//! normalization, comparison, and selection crates all agree on one
//! vocabulary.

pub mod currency;
pub mod error;
pub mod models;
pub mod pricing;

pub use currency::{CurrencyService, ExchangeRate, ExchangeRateProvider, FixedRateProvider};
pub use error::{CostError, CostResult};
pub use models::{
    BillingType, CloudProvider, CostComponent, Currency, Money, ResourceType, HOURS_PER_MONTH,
    SECONDS_PER_MONTH,
};
pub use pricing::{monthly_from_hourly, monthly_request_cost, tiered_cost, PricingTier};
