//! Office commission and provider surcharge.
//!
//! The office charges a tiered percentage of the principal on top of a flat
//! 1% provider fee. Tier boundaries are inclusive of the lower tier, so an
//! amount of exactly 100 MRU is charged 10% and exactly 1000 MRU is charged
//! 4%.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{LOW_TIER_MAX_MRU, MID_TIER_MAX_MRU};
use crate::error::ValidationError;

/// Derived money fields of a remittance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeBreakdown {
    /// 1% surcharge attributed to the transfer network.
    pub provider_fee: Decimal,
    /// Office commission plus the provider fee.
    pub fee: Decimal,
    /// Principal plus `fee`.
    pub total: Decimal,
}

fn provider_rate() -> Decimal {
    Decimal::new(1, 2)
}

/// Commission rate for the tier `amount` falls into.
pub fn commission_rate(amount: Decimal) -> Decimal {
    if amount <= Decimal::from(LOW_TIER_MAX_MRU) {
        Decimal::new(10, 2)
    } else if amount <= Decimal::from(MID_TIER_MAX_MRU) {
        Decimal::new(4, 2)
    } else {
        Decimal::new(3, 2)
    }
}

/// Compute the fee breakdown for a principal.
///
/// Zero and negative amounts are computed arithmetically; callers gate
/// input with [`validate_amount`]. Fails only when a field would overflow
/// the decimal range.
pub fn compute_fee(amount: Decimal) -> Result<FeeBreakdown, ValidationError> {
    let provider_fee = amount
        .checked_mul(provider_rate())
        .ok_or(ValidationError::AmountTooLarge)?;
    let fee = amount
        .checked_mul(commission_rate(amount))
        .and_then(|commission| commission.checked_add(provider_fee))
        .ok_or(ValidationError::AmountTooLarge)?;
    let total = amount
        .checked_add(fee)
        .ok_or(ValidationError::AmountTooLarge)?;

    Ok(FeeBreakdown {
        provider_fee: provider_fee.normalize(),
        fee: fee.normalize(),
        total: total.normalize(),
    })
}

/// Reject principals that are not strictly positive.
pub fn validate_amount(amount: Decimal) -> Result<Decimal, ValidationError> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount);
    }
    Ok(amount)
}
