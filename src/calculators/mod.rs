//! Financial calculators: compound interest, projections, emergency fund
//! and installment plans.
//!
//! All arithmetic is done in `Decimal`; rates are given in percent.

pub mod compound_interest;
pub mod emergency;
pub mod installments;
pub mod projections;

use anyhow::Result;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::invalid;

pub use compound_interest::{
    calculate_compound_interest, required_monthly_contribution, CompoundInterestResult,
    MonthEvolution,
};

/// Longest horizon any simulation accepts (100 years)
pub const MAX_HORIZON_MONTHS: u32 = 1200;

pub(crate) fn too_large() -> anyhow::Error {
    invalid("valor grande demais para simular")
}

pub(crate) fn check_horizon(months: u32) -> Result<()> {
    if months > MAX_HORIZON_MONTHS {
        return Err(invalid(format!(
            "prazo de {} meses acima do limite de {} meses",
            months, MAX_HORIZON_MONTHS
        )));
    }
    Ok(())
}

pub(crate) fn mul(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_mul(b).ok_or_else(too_large)
}

pub(crate) fn add(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_add(b).ok_or_else(too_large)
}

pub(crate) fn sub(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_sub(b).ok_or_else(too_large)
}

/// `base^exp` by repeated squaring; errors instead of overflowing
pub fn pow_decimal(base: Decimal, exp: u32) -> Result<Decimal> {
    let mut result = Decimal::ONE;
    let mut factor = base;
    let mut n = exp;
    while n > 0 {
        if n & 1 == 1 {
            result = mul(result, factor)?;
        }
        n >>= 1;
        if n > 0 {
            factor = mul(factor, factor)?;
        }
    }
    Ok(result)
}

/// Round to cents, half away from zero
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a percentage (1 = 1%) into a fraction (0.01)
pub fn pct(rate: Decimal) -> Decimal {
    rate / Decimal::ONE_HUNDRED
}
