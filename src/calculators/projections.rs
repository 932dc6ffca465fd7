//! Budget and life-event projections: trips, housing, a business, education,
//! property financing and retirement.

use anyhow::Result;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{add, check_horizon, mul, pct, pow_decimal, round_cents, sub};
use crate::utils::percent_of;

/// Spend share of income above which the budget is flagged
pub const SPEND_ALERT_PCT: Decimal = Decimal::from_parts(80, 0, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HousingFrequency {
    Monthly,
    Annual,
}

/// Extra spending to simulate on top of the current month
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BudgetScenario {
    pub trip_days: u32,
    pub trip_daily_spend: Decimal,
    pub housing_amount: Decimal,
    pub housing_frequency: Option<HousingFrequency>,
    pub custom_amount: Decimal,
}

impl BudgetScenario {
    /// Monthly cost of everything simulated
    pub fn simulated_spend(&self) -> Decimal {
        let trip = Decimal::from(self.trip_days) * self.trip_daily_spend;
        let housing = match self.housing_frequency {
            Some(HousingFrequency::Monthly) => self.housing_amount,
            Some(HousingFrequency::Annual) => self.housing_amount / Decimal::from(12),
            None => Decimal::ZERO,
        };
        trip + housing + self.custom_amount
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetProjection {
    pub current_spend: Decimal,
    pub simulated_spend: Decimal,
    pub new_total_spend: Decimal,
    pub projected_balance: Decimal,
    /// `None` when there is no income to compare against
    pub spend_pct: Option<Decimal>,
    pub impact_pct: Option<Decimal>,
    pub alert: bool,
}

pub fn project_budget(
    monthly_income: Decimal,
    current_spend: Decimal,
    scenario: &BudgetScenario,
) -> BudgetProjection {
    let simulated_spend = scenario.simulated_spend();
    let new_total_spend = current_spend + simulated_spend;
    let projected_balance = monthly_income - new_total_spend;

    let spend_pct = percent_of(new_total_spend, monthly_income).map(|p| p.round_dp(1));
    let impact_pct = percent_of(projected_balance, monthly_income).map(|p| p.round_dp(1));
    // No income at all with any spending is always alarming
    let alert = match spend_pct {
        Some(p) => p > SPEND_ALERT_PCT,
        None => new_total_spend > Decimal::ZERO,
    };

    BudgetProjection {
        current_spend,
        simulated_spend,
        new_total_spend,
        projected_balance,
        spend_pct,
        impact_pct,
        alert,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BusinessProjection {
    pub first_year_cost: Decimal,
    pub first_year_revenue: Decimal,
    pub first_year_result: Decimal,
    /// Months of profit needed to pay back the initial investment
    pub break_even_months: Option<u32>,
}

pub fn project_business(
    initial_investment: Decimal,
    monthly_cost: Decimal,
    monthly_revenue: Decimal,
) -> BusinessProjection {
    let first_year_cost = initial_investment + monthly_cost * Decimal::from(12);
    let first_year_revenue = monthly_revenue * Decimal::from(12);
    let monthly_profit = monthly_revenue - monthly_cost;

    let break_even_months = if monthly_profit > Decimal::ZERO {
        (initial_investment / monthly_profit).ceil().to_u32()
    } else {
        None
    };

    BusinessProjection {
        first_year_cost,
        first_year_revenue,
        first_year_result: first_year_revenue - first_year_cost,
        break_even_months,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EducationProjection {
    pub total_cost: Decimal,
    pub inflation_adjusted_cost: Decimal,
    pub monthly_average: Decimal,
}

/// Total cost of a course. The inflation-adjusted figure raises the monthly
/// fee (and materials) by `annual_inflation_pct` at the start of each new year.
pub fn project_education(
    monthly_fee: Decimal,
    duration_months: u32,
    yearly_materials: Decimal,
    annual_inflation_pct: Decimal,
) -> Result<EducationProjection> {
    check_horizon(duration_months)?;
    let months = Decimal::from(duration_months);
    let monthly_materials = yearly_materials / Decimal::from(12);
    let total_cost = round_cents(add(
        mul(monthly_fee, months)?,
        mul(yearly_materials, months)? / Decimal::from(12),
    )?);

    let inflation = add(Decimal::ONE, pct(annual_inflation_pct))?;
    let monthly_cost = add(monthly_fee, monthly_materials)?;
    let mut adjusted = Decimal::ZERO;
    for month in 0..duration_months {
        let factor = pow_decimal(inflation, month / 12)?;
        adjusted = add(adjusted, mul(monthly_cost, factor)?)?;
    }

    let monthly_average = if duration_months > 0 {
        round_cents(total_cost / months)
    } else {
        Decimal::ZERO
    };

    Ok(EducationProjection {
        total_cost,
        inflation_adjusted_cost: round_cents(adjusted),
        monthly_average,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyProjection {
    pub financed: Decimal,
    pub months: u32,
    pub monthly_payment: Decimal,
    pub total_paid: Decimal,
    pub total_interest: Decimal,
    /// Yearly rent as a percentage of the property value
    pub rent_yield_pct: Option<Decimal>,
}

/// Price-table (fixed payment) financing
pub fn project_property(
    value: Decimal,
    down_payment: Decimal,
    annual_rate_pct: Decimal,
    years: u32,
    expected_rent: Option<Decimal>,
) -> Result<PropertyProjection> {
    let months = years.checked_mul(12).ok_or_else(super::too_large)?;
    check_horizon(months)?;
    let financed = sub(value, down_payment)?.max(Decimal::ZERO);
    let rate = pct(annual_rate_pct) / Decimal::from(12);

    let monthly_payment = if financed.is_zero() || months == 0 {
        Decimal::ZERO
    } else if rate.is_zero() {
        financed / Decimal::from(months)
    } else {
        let growth = pow_decimal(add(Decimal::ONE, rate)?, months)?;
        let denominator = growth - Decimal::ONE;
        if denominator.is_zero() {
            return Err(crate::error::invalid("taxa de juros inválida para financiamento"));
        }
        mul(financed, mul(rate, growth)?)? / denominator
    };
    let monthly_payment = round_cents(monthly_payment);
    let total_paid = mul(monthly_payment, Decimal::from(months))?;

    let rent_yield_pct = match expected_rent {
        Some(rent) => percent_of(mul(rent, Decimal::from(12))?, value).map(|p| p.round_dp(2)),
        None => None,
    };

    Ok(PropertyProjection {
        financed,
        months,
        monthly_payment,
        total_paid,
        total_interest: sub(total_paid, financed)?.max(Decimal::ZERO),
        rent_yield_pct,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetirementInput {
    pub current_age: u32,
    pub retirement_age: u32,
    pub life_expectancy: u32,
    pub current_wealth: Decimal,
    pub monthly_contribution: Decimal,
    pub annual_return_pct: Decimal,
    pub desired_monthly_spend: Decimal,
}

impl Default for RetirementInput {
    fn default() -> Self {
        Self {
            current_age: 30,
            retirement_age: 65,
            life_expectancy: 90,
            current_wealth: Decimal::ZERO,
            monthly_contribution: Decimal::ZERO,
            annual_return_pct: Decimal::from(6),
            desired_monthly_spend: Decimal::from(5000),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RetirementProjection {
    pub months_to_retirement: u32,
    pub projected_wealth: Decimal,
    pub required_wealth: Decimal,
    pub gap: Decimal,
    pub on_track: bool,
}

/// Accumulate wealth monthly until retirement and compare it with the
/// desired spending over the retirement horizon.
pub fn project_retirement(input: &RetirementInput) -> Result<RetirementProjection> {
    let months_between = |from: u32, to: u32| to.saturating_sub(from).checked_mul(12).ok_or_else(super::too_large);
    let months_to_retirement = months_between(input.current_age, input.retirement_age)?;
    let retirement_months = months_between(input.retirement_age, input.life_expectancy)?;
    check_horizon(months_to_retirement)?;
    check_horizon(retirement_months)?;
    let rate = pct(input.annual_return_pct) / Decimal::from(12);

    let mut wealth = input.current_wealth;
    for _ in 0..months_to_retirement {
        wealth = add(add(wealth, mul(wealth, rate)?)?, input.monthly_contribution)?;
    }
    let projected_wealth = round_cents(wealth);
    let required_wealth = mul(input.desired_monthly_spend, Decimal::from(retirement_months))?;
    let gap = sub(required_wealth, projected_wealth)?.max(Decimal::ZERO);

    Ok(RetirementProjection {
        months_to_retirement,
        projected_wealth,
        required_wealth,
        gap,
        on_track: gap.is_zero(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_budget_scenario_combines_trip_housing_custom() {
        let scenario = BudgetScenario {
            trip_days: 5,
            trip_daily_spend: dec!(200),
            housing_amount: dec!(12000),
            housing_frequency: Some(HousingFrequency::Annual),
            custom_amount: dec!(150),
        };
        assert_eq!(scenario.simulated_spend(), dec!(2150));

        let result = project_budget(dec!(5000), dec!(2000), &scenario);
        assert_eq!(result.new_total_spend, dec!(4150));
        assert_eq!(result.projected_balance, dec!(850));
        assert_eq!(result.spend_pct, Some(dec!(83.0)));
        assert_eq!(result.impact_pct, Some(dec!(17.0)));
        assert!(result.alert);
    }

    #[test]
    fn test_budget_without_income() {
        let result = project_budget(dec!(0), dec!(100), &BudgetScenario::default());
        assert_eq!(result.spend_pct, None);
        assert!(result.alert);
        let nothing = project_budget(dec!(0), dec!(0), &BudgetScenario::default());
        assert!(!nothing.alert);
    }

    #[test]
    fn test_business_first_year_and_break_even() {
        let result = project_business(dec!(10000), dec!(2000), dec!(4500));
        assert_eq!(result.first_year_result, dec!(20000));
        assert_eq!(result.break_even_months, Some(4));

        let losing = project_business(dec!(10000), dec!(3000), dec!(2000));
        assert_eq!(losing.break_even_months, None);
        assert_eq!(losing.first_year_result, dec!(-22000));
    }

    #[test]
    fn test_education_totals() {
        let result = project_education(dec!(1000), 24, dec!(600), dec!(10)).unwrap();
        assert_eq!(result.total_cost, dec!(25200));
        // year 1: 12 * 1050; year 2: 12 * 1155
        assert_eq!(result.inflation_adjusted_cost, dec!(26460));
        assert_eq!(result.monthly_average, dec!(1050));
    }

    #[test]
    fn test_property_price_table() {
        let result = project_property(dec!(300000), dec!(60000), dec!(12), 1, Some(dec!(1500))).unwrap();
        assert_eq!(result.financed, dec!(240000));
        assert_eq!(result.months, 12);
        // PMT for 240k over 12 months at 1%/month
        assert_eq!(result.monthly_payment, dec!(21323.71));
        assert_eq!(result.total_paid, dec!(255884.52));
        assert_eq!(result.total_interest, dec!(15884.52));
        assert_eq!(result.rent_yield_pct, Some(dec!(6)));
    }

    #[test]
    fn test_property_zero_rate_and_full_down_payment() {
        let result = project_property(dec!(120000), dec!(0), dec!(0), 10, None).unwrap();
        assert_eq!(result.monthly_payment, dec!(1000));
        assert_eq!(result.total_interest, dec!(0));

        let paid_cash = project_property(dec!(100000), dec!(150000), dec!(9), 30, None).unwrap();
        assert_eq!(paid_cash.financed, dec!(0));
        assert_eq!(paid_cash.monthly_payment, dec!(0));
    }

    #[test]
    fn test_retirement_accumulation() {
        let input = RetirementInput {
            current_age: 64,
            retirement_age: 65,
            life_expectancy: 66,
            current_wealth: dec!(0),
            monthly_contribution: dec!(1000),
            annual_return_pct: dec!(0),
            desired_monthly_spend: dec!(1000),
        };
        let result = project_retirement(&input).unwrap();
        assert_eq!(result.months_to_retirement, 12);
        assert_eq!(result.projected_wealth, dec!(12000));
        assert_eq!(result.required_wealth, dec!(12000));
        assert!(result.on_track);

        let late = project_retirement(&RetirementInput {
            current_age: 70,
            ..input
        })
        .unwrap();
        assert_eq!(late.months_to_retirement, 0);
        assert_eq!(late.gap, dec!(12000));
        assert!(!late.on_track);
    }

    #[test]
    fn test_long_financing_and_horizons_are_rejected() {
        let err = project_property(dec!(500000), dec!(0), dec!(1200), 100, None).unwrap_err();
        assert!(err.to_string().contains("grande demais"));
        assert!(project_property(dec!(500000), dec!(0), dec!(10), u32::MAX, None).is_err());

        assert!(project_education(dec!(1000), 1200, dec!(0), dec!(1000)).is_err());

        let result = project_retirement(&RetirementInput {
            current_age: 0,
            retirement_age: 100,
            monthly_contribution: dec!(1000000),
            annual_return_pct: dec!(120),
            ..RetirementInput::default()
        });
        assert!(result.is_err());

        let ages = project_retirement(&RetirementInput {
            retirement_age: u32::MAX,
            ..RetirementInput::default()
        });
        assert!(ages.is_err());
    }
}
