use anyhow::Result;
use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use super::round_cents;
use crate::error::invalid;

pub const MAX_INSTALLMENTS: u32 = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallmentPlanItem {
    pub number: u32,
    pub amount: Decimal,
    pub due_date: NaiveDate,
}

/// Split `total` into `count` monthly installments starting at `first_due`.
///
/// Every installment is `total / count` rounded to cents except the last,
/// which absorbs the rounding remainder. Due dates keep the day of month,
/// clamped to the end of shorter months.
pub fn split_purchase(
    total: Decimal,
    count: u32,
    first_due: NaiveDate,
) -> Result<Vec<InstallmentPlanItem>> {
    if !(1..=MAX_INSTALLMENTS).contains(&count) {
        return Err(invalid(format!(
            "installments must be between 1 and {}, got {}",
            MAX_INSTALLMENTS, count
        )));
    }
    if total <= Decimal::ZERO {
        return Err(invalid("purchase amount must be positive"));
    }

    let base = round_cents(total / Decimal::from(count));
    let mut items = Vec::with_capacity(count as usize);
    let mut allocated = Decimal::ZERO;

    for number in 1..=count {
        let due_date = first_due
            .checked_add_months(Months::new(number - 1))
            .ok_or_else(|| invalid("installment due date out of range"))?;
        let amount = if number == count {
            total - allocated
        } else {
            base
        };
        allocated += amount;
        items.push(InstallmentPlanItem {
            number,
            amount,
            due_date,
        });
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_remainder_goes_to_last_installment() {
        let plan = split_purchase(dec!(100), 3, d(2025, 1, 10)).unwrap();
        let amounts: Vec<_> = plan.iter().map(|i| i.amount).collect();
        assert_eq!(amounts, vec![dec!(33.33), dec!(33.33), dec!(33.34)]);
        assert_eq!(plan[2].due_date, d(2025, 3, 10));
    }

    #[test]
    fn test_due_dates_clamp_to_month_end() {
        let plan = split_purchase(dec!(120), 4, d(2025, 1, 31)).unwrap();
        let dates: Vec<_> = plan.iter().map(|i| i.due_date).collect();
        assert_eq!(
            dates,
            vec![d(2025, 1, 31), d(2025, 2, 28), d(2025, 3, 31), d(2025, 4, 30)]
        );
    }

    #[test]
    fn test_single_installment_is_whole_amount() {
        let plan = split_purchase(dec!(59.90), 1, d(2025, 5, 5)).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].amount, dec!(59.90));
    }

    #[test]
    fn test_count_bounds() {
        assert!(split_purchase(dec!(100), 0, d(2025, 1, 1)).is_err());
        assert!(split_purchase(dec!(100), 13, d(2025, 1, 1)).is_err());
        assert!(split_purchase(dec!(0), 2, d(2025, 1, 1)).is_err());
        assert_eq!(split_purchase(dec!(100), 12, d(2025, 1, 1)).unwrap().len(), 12);
    }
}
