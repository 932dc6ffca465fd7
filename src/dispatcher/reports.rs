use anyhow::Result;
use chrono::Datelike;

use super::{open_store, parse_choice, parse_day, parse_month_arg, print_json, today};
use crate::cli::formatters::{format_annual_summary, format_monthly_summary, format_period_summary};
use crate::cli::SummaryCommands;
use financetrack::periods::{date_to_month, month_to_date, shift_period, PeriodType};
use financetrack::reports::{annual_summary, monthly_summary, period_summary};

pub fn dispatch_summary(action: SummaryCommands, json_output: bool) -> Result<()> {
    let (_, conn) = open_store()?;
    match action {
        SummaryCommands::Month { month, offset } => {
            let (year, m) = parse_month_arg(month.as_deref())?;
            let (year, m) = date_to_month(shift_period(month_to_date(year, m)?, PeriodType::Month, offset));
            let summary = monthly_summary(&conn, year, m)?;
            if json_output {
                return print_json(&summary);
            }
            print!("{}", format_monthly_summary(&summary));
            Ok(())
        }
        SummaryCommands::Period { period, date, offset } => {
            let period = parse_choice::<PeriodType>(&period, "period", "mes, semana or dia")?;
            let anchor = shift_period(parse_day(date.as_deref())?, period, offset);
            let summary = period_summary(&conn, anchor, period, today())?;
            if json_output {
                return print_json(&summary);
            }
            print!("{}", format_period_summary(&summary));
            Ok(())
        }
        SummaryCommands::Year { year, top } => {
            let year = year.unwrap_or_else(|| today().year());
            let summary = annual_summary(&conn, year, top)?;
            if json_output {
                return print_json(&summary);
            }
            print!("{}", format_annual_summary(&summary));
            Ok(())
        }
    }
}
