//! Emergency fund planning: runway to a goal and the safety thermometer

use anyhow::Result;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunwayPlan {
    pub goal: Decimal,
    pub remaining: Decimal,
    /// `None` when there is a gap but no monthly contribution to close it
    pub months_to_goal: Option<u32>,
}

/// Plan how long it takes to reach the emergency goal.
///
/// The goal is `manual_goal` when given, otherwise `monthly_cost * target_months`.
pub fn runway_plan(
    balance: Decimal,
    monthly_cost: Decimal,
    target_months: u32,
    manual_goal: Option<Decimal>,
    monthly_contribution: Decimal,
) -> Result<RunwayPlan> {
    let goal = match manual_goal {
        Some(goal) => goal,
        None => super::mul(monthly_cost, Decimal::from(target_months))?,
    };
    let remaining = super::sub(goal, balance)?.max(Decimal::ZERO);

    let months_to_goal = if remaining.is_zero() {
        Some(0)
    } else if monthly_contribution > Decimal::ZERO {
        (remaining / monthly_contribution).ceil().to_u32()
    } else {
        None
    };

    Ok(RunwayPlan {
        goal,
        remaining,
        months_to_goal,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SafetyLevel {
    Critical,
    Attention,
    Building,
    Safe,
}

impl SafetyLevel {
    pub fn from_months_covered(months: Decimal) -> Self {
        if months >= Decimal::from(6) {
            SafetyLevel::Safe
        } else if months >= Decimal::from(3) {
            SafetyLevel::Building
        } else if months >= Decimal::ONE {
            SafetyLevel::Attention
        } else {
            SafetyLevel::Critical
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SafetyLevel::Critical => "Nível Crítico",
            SafetyLevel::Attention => "Atenção",
            SafetyLevel::Building => "Em Construção",
            SafetyLevel::Safe => "Segurança Total",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SafetyLevel::Critical => "Menos de 1 mês de segurança.",
            SafetyLevel::Attention => {
                "O básico está coberto, mas um imprevisto maior ainda é arriscado."
            }
            SafetyLevel::Building => "No caminho certo. Continue aportando!",
            SafetyLevel::Safe => "Patamar ideal de segurança atingido.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SafetyThermometer {
    pub percent: u32,
    pub months_covered: Decimal,
    pub level: SafetyLevel,
}

/// Percent of the goal reached (rounded, capped at 100) and months of fixed
/// cost the balance covers. A zero goal is treated as 1 to avoid dividing by zero.
pub fn safety_thermometer(
    balance: Decimal,
    goal: Decimal,
    monthly_fixed_cost: Decimal,
) -> SafetyThermometer {
    let divisor = if goal.is_zero() { Decimal::ONE } else { goal };
    // Ratios too large for Decimal saturate
    let raw = balance
        .checked_div(divisor)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::MAX)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let percent = raw
        .min(Decimal::ONE_HUNDRED)
        .max(Decimal::ZERO)
        .to_u32()
        .unwrap_or(0);

    let months_covered = if monthly_fixed_cost > Decimal::ZERO {
        balance.checked_div(monthly_fixed_cost).unwrap_or(Decimal::MAX).round_dp(2)
    } else {
        Decimal::ZERO
    };

    SafetyThermometer {
        percent,
        months_covered,
        level: SafetyLevel::from_months_covered(months_covered),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_runway_uses_cost_times_months_by_default() {
        let plan = runway_plan(dec!(3000), dec!(2000), 6, None, dec!(1000)).unwrap();
        assert_eq!(plan.goal, dec!(12000));
        assert_eq!(plan.remaining, dec!(9000));
        assert_eq!(plan.months_to_goal, Some(9));
    }

    #[test]
    fn test_runway_rounds_months_up() {
        let plan = runway_plan(dec!(0), dec!(0), 0, Some(dec!(1000)), dec!(300)).unwrap();
        assert_eq!(plan.months_to_goal, Some(4));
    }

    #[test]
    fn test_runway_goal_already_met() {
        let plan = runway_plan(dec!(20000), dec!(2000), 6, None, dec!(0)).unwrap();
        assert_eq!(plan.remaining, dec!(0));
        assert_eq!(plan.months_to_goal, Some(0));
    }

    #[test]
    fn test_runway_without_contribution_has_no_eta() {
        let plan = runway_plan(dec!(100), dec!(1000), 3, None, dec!(0)).unwrap();
        assert_eq!(plan.months_to_goal, None);
    }

    #[test]
    fn test_thermometer_levels() {
        let t = safety_thermometer(dec!(500), dec!(12000), dec!(2000));
        assert_eq!(t.level, SafetyLevel::Critical);
        assert_eq!(t.percent, 4);

        assert_eq!(safety_thermometer(dec!(2000), dec!(12000), dec!(2000)).level, SafetyLevel::Attention);
        assert_eq!(safety_thermometer(dec!(6000), dec!(12000), dec!(2000)).level, SafetyLevel::Building);

        let full = safety_thermometer(dec!(15000), dec!(12000), dec!(2000));
        assert_eq!(full.level, SafetyLevel::Safe);
        assert_eq!(full.percent, 100);
        assert_eq!(full.months_covered, dec!(7.5));
    }

    #[test]
    fn test_thermometer_zero_goal_and_cost() {
        let t = safety_thermometer(dec!(0.5), dec!(0), dec!(0));
        assert_eq!(t.percent, 50);
        assert_eq!(t.months_covered, dec!(0));
        assert_eq!(t.level, SafetyLevel::Critical);
    }

    #[test]
    fn test_huge_values_do_not_overflow() {
        assert!(runway_plan(dec!(0), Decimal::MAX, 6, None, dec!(0)).is_err());

        let t = safety_thermometer(Decimal::MAX, dec!(0.01), dec!(0.0001));
        assert_eq!(t.percent, 100);
        assert_eq!(t.level, SafetyLevel::Safe);
    }
}
