//! Period navigation helpers (month / week / day) with pt-BR labels

use anyhow::Result;
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::invalid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodType {
    Month,
    Week,
    Day,
}

impl PeriodType {
    pub fn label(&self) -> &'static str {
        match self {
            PeriodType::Month => "Mês",
            PeriodType::Week => "Semana",
            PeriodType::Day => "Dia",
        }
    }
}

impl FromStr for PeriodType {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "month" | "mes" | "mês" => Ok(PeriodType::Month),
            "week" | "semana" => Ok(PeriodType::Week),
            "day" | "dia" => Ok(PeriodType::Day),
            _ => Err(()),
        }
    }
}

const MONTH_NAMES: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// Portuguese month name for 1..=12
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("?")
}

/// Monday..Sunday week containing `date`
pub fn week_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = date.weekday().num_days_from_monday() as u64;
    let start = date - Days::new(offset);
    (start, start + Days::new(6))
}

/// First and last day of a month
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let first = month_to_date(year, month)?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| invalid(format!("month out of range: {}-{}", year, month)))?;
    Ok((first, last))
}

/// Step one period back. Month steps clamp to the last day of shorter months
/// (31/03 -> 28/02).
pub fn previous_period(date: NaiveDate, period: PeriodType) -> NaiveDate {
    let stepped = match period {
        PeriodType::Month => date.checked_sub_months(Months::new(1)),
        PeriodType::Week => date.checked_sub_days(Days::new(7)),
        PeriodType::Day => date.pred_opt(),
    };
    stepped.unwrap_or(date)
}

pub fn next_period(date: NaiveDate, period: PeriodType) -> NaiveDate {
    let stepped = match period {
        PeriodType::Month => date.checked_add_months(Months::new(1)),
        PeriodType::Week => date.checked_add_days(Days::new(7)),
        PeriodType::Day => date.succ_opt(),
    };
    stepped.unwrap_or(date)
}

/// Step `offset` periods from `date`, backwards when negative
pub fn shift_period(date: NaiveDate, period: PeriodType, offset: i32) -> NaiveDate {
    let step = if offset < 0 { previous_period } else { next_period };
    (0..offset.unsigned_abs()).fold(date, |current, _| step(current, period))
}

/// First and last day of the period containing `date`
pub fn period_bounds(date: NaiveDate, period: PeriodType) -> Result<(NaiveDate, NaiveDate)> {
    match period {
        PeriodType::Month => month_bounds(date.year(), date.month()),
        PeriodType::Week => Ok(week_range(date)),
        PeriodType::Day => Ok((date, date)),
    }
}

/// Human label: "janeiro de 2025", "06/01 - 12/01", "15 de janeiro de 2025"
pub fn format_period(date: NaiveDate, period: PeriodType) -> String {
    match period {
        PeriodType::Month => format!("{} de {}", month_name(date.month()), date.year()),
        PeriodType::Week => {
            let (start, end) = week_range(date);
            format!("{} - {}", start.format("%d/%m"), end.format("%d/%m"))
        }
        PeriodType::Day => format!(
            "{:02} de {} de {}",
            date.day(),
            month_name(date.month()),
            date.year()
        ),
    }
}

/// Whether `date` falls in the same period as `today`
pub fn is_current_period(date: NaiveDate, period: PeriodType, today: NaiveDate) -> bool {
    match period {
        PeriodType::Month => date.year() == today.year() && date.month() == today.month(),
        PeriodType::Week => week_range(date).0 == week_range(today).0,
        PeriodType::Day => date == today,
    }
}

/// First day of the given month
pub fn month_to_date(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| invalid(format!("invalid month {}-{}", year, month)))
}

pub fn date_to_month(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// `YYYY-MM` reference used by invoices and monthly goals
pub fn month_ref(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

/// Parse a strict `YYYY-MM` reference
pub fn parse_month_ref(value: &str) -> Result<(i32, u32)> {
    let bad = || invalid(format!("expected YYYY-MM, got '{}'", value));
    let (year, month) = value.trim().split_once('-').ok_or_else(bad)?;
    if year.len() != 4 || month.len() != 2 {
        return Err(bad());
    }
    let year: i32 = year.parse().map_err(|_| bad())?;
    let month: u32 = month.parse().map_err(|_| bad())?;
    if !(1..=12).contains(&month) {
        return Err(bad());
    }
    Ok((year, month))
}

/// Months left until `deadline`: ceil(days / 30), at least 1
pub fn months_until(today: NaiveDate, deadline: NaiveDate) -> u32 {
    let days = (deadline - today).num_days();
    if days <= 0 {
        return 1;
    }
    let months = (days + 29) / 30;
    months.max(1) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_week_starts_on_monday() {
        // 2025-01-08 is a Wednesday
        assert_eq!(week_range(d(2025, 1, 8)), (d(2025, 1, 6), d(2025, 1, 12)));
        // Sunday belongs to the week that started the previous Monday
        assert_eq!(week_range(d(2025, 1, 12)).0, d(2025, 1, 6));
        assert_eq!(week_range(d(2025, 1, 6)).0, d(2025, 1, 6));
    }

    #[test]
    fn test_month_navigation_clamps_to_month_end() {
        assert_eq!(previous_period(d(2025, 3, 31), PeriodType::Month), d(2025, 2, 28));
        assert_eq!(next_period(d(2024, 1, 31), PeriodType::Month), d(2024, 2, 29));
        assert_eq!(next_period(d(2025, 12, 15), PeriodType::Month), d(2026, 1, 15));
        assert_eq!(previous_period(d(2025, 1, 3), PeriodType::Week), d(2024, 12, 27));
        assert_eq!(next_period(d(2025, 2, 28), PeriodType::Day), d(2025, 3, 1));
    }

    #[test]
    fn test_shift_and_bounds() {
        let date = d(2025, 3, 31);
        assert_eq!(shift_period(date, PeriodType::Month, 0), date);
        assert_eq!(shift_period(date, PeriodType::Month, -1), d(2025, 2, 28));
        assert_eq!(shift_period(d(2025, 3, 15), PeriodType::Month, 13), d(2026, 4, 15));
        assert_eq!(shift_period(date, PeriodType::Week, -2), d(2025, 3, 17));
        assert_eq!(shift_period(date, PeriodType::Day, 1), d(2025, 4, 1));

        assert_eq!(period_bounds(d(2025, 1, 8), PeriodType::Week).unwrap(), (d(2025, 1, 6), d(2025, 1, 12)));
        assert_eq!(period_bounds(d(2024, 2, 10), PeriodType::Month).unwrap(), (d(2024, 2, 1), d(2024, 2, 29)));
        assert_eq!(period_bounds(date, PeriodType::Day).unwrap(), (date, date));
    }

    #[test]
    fn test_labels_in_portuguese() {
        assert_eq!(format_period(d(2025, 1, 15), PeriodType::Month), "janeiro de 2025");
        assert_eq!(format_period(d(2025, 1, 8), PeriodType::Week), "06/01 - 12/01");
        assert_eq!(format_period(d(2025, 1, 5), PeriodType::Day), "05 de janeiro de 2025");
        assert_eq!(month_name(3), "março");
    }

    #[test]
    fn test_current_period_uses_given_today() {
        let today = d(2025, 6, 18);
        assert!(is_current_period(d(2025, 6, 1), PeriodType::Month, today));
        assert!(!is_current_period(d(2024, 6, 18), PeriodType::Month, today));
        assert!(is_current_period(d(2025, 6, 16), PeriodType::Week, today));
        assert!(!is_current_period(d(2025, 6, 15), PeriodType::Week, today));
        assert!(is_current_period(today, PeriodType::Day, today));
    }

    #[test]
    fn test_month_refs() {
        assert_eq!(month_ref(2025, 3), "2025-03");
        assert_eq!(parse_month_ref("2025-03").unwrap(), (2025, 3));
        assert!(parse_month_ref("2025-3").is_err());
        assert!(parse_month_ref("2025-13").is_err());
        assert_eq!(previous_month(2025, 1), (2024, 12));
        assert_eq!(next_month(2025, 12), (2026, 1));
        assert_eq!(month_bounds(2024, 2).unwrap(), (d(2024, 2, 1), d(2024, 2, 29)));
    }

    #[test]
    fn test_months_until_rounds_up_with_floor_of_one() {
        let today = d(2025, 1, 1);
        assert_eq!(months_until(today, d(2025, 1, 31)), 1);
        assert_eq!(months_until(today, d(2025, 2, 1)), 2);
        assert_eq!(months_until(today, d(2024, 12, 1)), 1);
        assert_eq!(months_until(today, d(2026, 1, 1)), 13);
    }
}
