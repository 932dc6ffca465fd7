use anyhow::Result;
use colored::Colorize;

use super::{open_store, parse_choice, parse_day, parse_money, parse_month_arg, print_json, resolve_category, today};
use crate::cli::formatters::{format_empty, format_financial_goals, format_monthly_goals};
use crate::cli::{FinancialGoalCommands, GoalCommands, MonthlyGoalCommands};
use financetrack::db::{self, FinancialGoal, FinancialGoalType, MonthlyGoal, MonthlyGoalType};
use financetrack::error::FinanceError;
use financetrack::periods::month_ref;
use financetrack::reports::{all_financial_goal_progress, financial_goal_progress, monthly_goal_progress};
use financetrack::utils::{format_currency, format_percent};

pub fn dispatch_goals(action: GoalCommands, json_output: bool) -> Result<()> {
    match action {
        GoalCommands::Monthly { action } => dispatch_monthly(action, json_output),
        GoalCommands::Financial { action } => dispatch_financial(action, json_output),
    }
}

fn dispatch_monthly(action: MonthlyGoalCommands, json_output: bool) -> Result<()> {
    let (_, conn) = open_store()?;
    match action {
        MonthlyGoalCommands::Add {
            goal_type,
            target,
            month,
            category,
        } => {
            let (year, m) = parse_month_arg(month.as_deref())?;
            let goal = MonthlyGoal {
                id: None,
                month_ref: month_ref(year, m),
                goal_type: parse_choice::<MonthlyGoalType>(&goal_type, "goal type", "gasto_maximo or economia_minima")?,
                target: parse_money(&target, "target")?,
                category_id: category
                    .map(|c| resolve_category(&conn, &c))
                    .transpose()?
                    .and_then(|c| c.id),
            };
            let id = db::insert_monthly_goal(&conn, &goal)?;
            if json_output {
                return print_json(&MonthlyGoal { id: Some(id), ..goal });
            }
            println!(
                "{} Meta de {} de {} criada para {}",
                "✓".green().bold(),
                goal.goal_type.label().to_lowercase(),
                format_currency(goal.target),
                goal.month_ref
            );
            Ok(())
        }
        MonthlyGoalCommands::List { month } => {
            let (year, m) = parse_month_arg(month.as_deref())?;
            let reference = month_ref(year, m);
            let progress = monthly_goal_progress(&conn, &reference)?;
            if json_output {
                return print_json(&progress);
            }
            if progress.is_empty() {
                print!("{}", format_empty(&format!("Nenhuma meta para {}", reference)));
                return Ok(());
            }
            println!("\n{} Metas de {}\n", "🎯".cyan().bold(), reference);
            println!("{}", format_monthly_goals(&progress));
            Ok(())
        }
        MonthlyGoalCommands::Delete { id } => {
            if !db::delete_monthly_goal(&conn, id)? {
                return Err(FinanceError::NotFound(format!("monthly goal {}", id)).into());
            }
            if json_output {
                return print_json(&serde_json::json!({ "deleted": id }));
            }
            println!("{} Meta #{} removida", "✓".green().bold(), id);
            Ok(())
        }
    }
}

fn dispatch_financial(action: FinancialGoalCommands, json_output: bool) -> Result<()> {
    let (_, conn) = open_store()?;
    match action {
        FinancialGoalCommands::Add {
            name,
            target,
            goal_type,
            current,
            deadline,
        } => {
            let mut goal = FinancialGoal {
                id: None,
                name,
                goal_type: parse_choice::<FinancialGoalType>(
                    &goal_type,
                    "goal type",
                    "reserva_emergencia, viagem, compra, investimento or outro",
                )?,
                target: parse_money(&target, "target")?,
                current: parse_money(&current, "current amount")?,
                deadline: deadline.map(|d| parse_day(Some(&d))).transpose()?,
            };
            goal.id = Some(db::insert_financial_goal(&conn, &goal)?);
            let progress = financial_goal_progress(goal, today());
            if json_output {
                return print_json(&progress);
            }
            println!("{} Meta {} criada", "✓".green().bold(), progress.goal.name.bold());
            if let Some(monthly) = progress.suggested_monthly {
                println!("  Aporte sugerido: {}/mês", format_currency(monthly));
            }
            Ok(())
        }
        FinancialGoalCommands::List => {
            let progress = all_financial_goal_progress(&conn, today())?;
            if json_output {
                return print_json(&progress);
            }
            if progress.is_empty() {
                print!("{}", format_empty("Nenhuma meta financeira cadastrada"));
                return Ok(());
            }
            println!("{}", format_financial_goals(&progress));
            Ok(())
        }
        FinancialGoalCommands::Contribute { id, amount, date, note } => {
            let amount = parse_money(&amount, "amount")?;
            let goal = db::add_goal_contribution(&conn, id, amount, parse_day(date.as_deref())?, note.as_deref())?;
            let progress = financial_goal_progress(goal, today());
            if json_output {
                return print_json(&progress);
            }
            println!(
                "{} Aporte de {} em {} ({})",
                "✓".green().bold(),
                format_currency(amount),
                progress.goal.name.bold(),
                format_percent(progress.percent)
            );
            if progress.completed {
                println!("  {} Meta atingida!", "🎉".green());
            }
            Ok(())
        }
        FinancialGoalCommands::Delete { id } => {
            if !db::delete_financial_goal(&conn, id)? {
                return Err(FinanceError::NotFound(format!("financial goal {}", id)).into());
            }
            if json_output {
                return print_json(&serde_json::json!({ "deleted": id }));
            }
            println!("{} Meta #{} removida", "✓".green().bold(), id);
            Ok(())
        }
    }
}
