//! Compound interest with monthly contributions
//!
//! Each month the balance earns `rate%` and then receives the contribution:
//!
//! ```text
//! interest = balance * rate / 100
//! balance  = balance + interest + contribution
//! ```

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{add, check_horizon, mul, pct, pow_decimal, round_cents, sub};

/// One row of the month-by-month evolution table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthEvolution {
    pub month: u32,
    pub opening: Decimal,
    pub contribution: Decimal,
    pub interest: Decimal,
    pub closing: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompoundInterestResult {
    pub final_amount: Decimal,
    pub total_invested: Decimal,
    pub total_interest: Decimal,
    pub evolution: Vec<MonthEvolution>,
}

/// Simulate `months` months of growth.
///
/// `monthly_rate_pct` is a percentage: `1` means 1% per month.
/// Zero months returns the initial amount with an empty evolution.
/// Horizons past [`super::MAX_HORIZON_MONTHS`] or balances beyond what
/// `Decimal` holds are validation errors.
pub fn calculate_compound_interest(
    initial: Decimal,
    monthly_contribution: Decimal,
    monthly_rate_pct: Decimal,
    months: u32,
) -> Result<CompoundInterestResult> {
    check_horizon(months)?;
    let rate = pct(monthly_rate_pct);
    let mut balance = initial;
    let mut evolution = Vec::with_capacity(months as usize);

    for month in 1..=months {
        let opening = balance;
        let interest = mul(balance, rate)?;
        balance = add(add(balance, interest)?, monthly_contribution)?;
        evolution.push(MonthEvolution {
            month,
            opening,
            contribution: monthly_contribution,
            interest,
            closing: balance,
        });
    }

    let total_invested = add(initial, mul(monthly_contribution, Decimal::from(months))?)?;
    Ok(CompoundInterestResult {
        final_amount: balance,
        total_invested,
        total_interest: sub(balance, total_invested)?,
        evolution,
    })
}

/// Monthly contribution needed to grow `current` into `target` in `months`.
///
/// The current amount keeps earning interest, so only the gap left after
/// its future value has to be covered by the annuity. Result is in cents and
/// never negative; 0 when there is nothing left to save or no time to save it.
pub fn required_monthly_contribution(
    target: Decimal,
    current: Decimal,
    monthly_rate_pct: Decimal,
    months: u32,
) -> Result<Decimal> {
    check_horizon(months)?;
    if months == 0 || target <= current {
        return Ok(Decimal::ZERO);
    }

    let rate = pct(monthly_rate_pct);
    if rate.is_zero() {
        return Ok(round_cents(sub(target, current)? / Decimal::from(months)).max(Decimal::ZERO));
    }

    let growth = pow_decimal(add(Decimal::ONE, rate)?, months)?;
    let future_current = mul(current, growth)?;
    let gap = sub(target, future_current)?;
    if gap <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }

    let annuity_factor = (growth - Decimal::ONE) / rate;
    if annuity_factor <= Decimal::ZERO {
        // Rates at or below -100% make the annuity meaningless
        return Ok(Decimal::ZERO);
    }
    Ok(round_cents(gap / annuity_factor).max(Decimal::ZERO))
}
