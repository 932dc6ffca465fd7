use anyhow::Result;
use chrono::Datelike;
use colored::Colorize;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::settings::{object::Columns, Alignment, Style};
use tabled::{Table, Tabled};

use super::{open_store, parse_money, parse_optional_money, print_json, today};
use crate::cli::formatters::{format_compound_interest, format_empty};
use crate::cli::{CalcCommands, ProjectCommands};
use financetrack::calculators::emergency::{runway_plan, safety_thermometer, SafetyLevel};
use financetrack::calculators::projections::{
    project_budget, project_business, project_education, project_property, project_retirement, BudgetScenario,
    HousingFrequency, RetirementInput,
};
use financetrack::calculators::{calculate_compound_interest, required_monthly_contribution, round_cents};
use financetrack::db::{self, Simulation};
use financetrack::error::{invalid, FinanceError};
use financetrack::periods::month_bounds;
use financetrack::utils::{format_currency, format_percent};

pub fn dispatch_calc(action: CalcCommands, json_output: bool) -> Result<()> {
    match action {
        CalcCommands::Interest {
            initial,
            contribution,
            rate,
            months,
            save,
            table,
        } => {
            let initial = parse_money(&initial, "initial amount")?;
            let contribution = parse_money(&contribution, "contribution")?;
            let rate = parse_money(&rate, "rate")?;
            let result = calculate_compound_interest(initial, contribution, rate, months)?;

            let saved = match save {
                Some(name) => {
                    let (_, conn) = open_store()?;
                    let sim = Simulation {
                        id: None,
                        name,
                        initial_amount: initial,
                        monthly_contribution: contribution,
                        monthly_rate: rate,
                        months,
                        final_amount: round_cents(result.final_amount),
                        created_at: None,
                    };
                    Some(db::insert_simulation(&conn, &sim)?)
                }
                None => None,
            };

            if json_output {
                return print_json(&serde_json::json!({ "result": result, "saved_id": saved }));
            }
            print!("{}", format_compound_interest(&result, table));
            if let Some(id) = saved {
                println!("{} Simulação salva (#{})", "✓".green().bold(), id);
            }
            Ok(())
        }
        CalcCommands::Needed {
            target,
            current,
            rate,
            months,
        } => {
            let target = parse_money(&target, "target")?;
            let current = parse_money(&current, "current amount")?;
            let rate = parse_money(&rate, "rate")?;
            let monthly = required_monthly_contribution(target, current, rate, months)?;
            if json_output {
                return print_json(&serde_json::json!({ "monthly_contribution": monthly }));
            }
            println!(
                "Para chegar a {} em {} meses: aporte de {}/mês",
                format_currency(target).bold(),
                months,
                format_currency(monthly).green().bold()
            );
            Ok(())
        }
        CalcCommands::Simulations => {
            let (_, conn) = open_store()?;
            let sims = db::list_simulations(&conn)?;
            if json_output {
                return print_json(&sims);
            }
            if sims.is_empty() {
                print!("{}", format_empty("Nenhuma simulação salva"));
                return Ok(());
            }
            println!("{}", format_simulations(&sims));
            Ok(())
        }
        CalcCommands::DeleteSimulation { id } => {
            let (_, conn) = open_store()?;
            if !db::delete_simulation(&conn, id)? {
                return Err(FinanceError::NotFound(format!("simulation {}", id)).into());
            }
            if json_output {
                return print_json(&serde_json::json!({ "deleted": id }));
            }
            println!("{} Simulação #{} removida", "✓".green().bold(), id);
            Ok(())
        }
    }
}

#[derive(Tabled)]
struct SimulationRow {
    #[tabled(rename = "#")]
    id: i64,
    #[tabled(rename = "Nome")]
    name: String,
    #[tabled(rename = "Inicial")]
    initial: String,
    #[tabled(rename = "Aporte")]
    contribution: String,
    #[tabled(rename = "Taxa")]
    rate: String,
    #[tabled(rename = "Meses")]
    months: u32,
    #[tabled(rename = "Final")]
    final_amount: String,
}

fn format_simulations(sims: &[Simulation]) -> String {
    let rows: Vec<SimulationRow> = sims
        .iter()
        .map(|s| SimulationRow {
            id: s.id.unwrap_or_default(),
            name: s.name.clone(),
            initial: format_currency(s.initial_amount),
            contribution: format_currency(s.monthly_contribution),
            rate: format!("{}% a.m.", s.monthly_rate),
            months: s.months,
            final_amount: format_currency(s.final_amount),
        })
        .collect();
    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .modify(Columns::new(2..=4), Alignment::right())
        .modify(Columns::new(6..=6), Alignment::right());
    table.to_string()
}

/// Save a projection when `--save` was given, returning its id
fn save_projection<P: Serialize, R: Serialize>(
    conn: &Connection,
    name: Option<String>,
    kind: &str,
    params: &P,
    result: &R,
) -> Result<Option<i64>> {
    match name {
        Some(name) => {
            let id = db::insert_projection(
                conn,
                &name,
                kind,
                &serde_json::to_value(params)?,
                &serde_json::to_value(result)?,
            )?;
            Ok(Some(id))
        }
        None => Ok(None),
    }
}

fn print_saved(saved: Option<i64>) {
    if let Some(id) = saved {
        println!("{} Projeção salva (#{})", "✓".green().bold(), id);
    }
}

fn optional_months(months: Option<u32>) -> String {
    match months {
        Some(m) => format!("{} meses", m),
        None => "não se paga".to_string(),
    }
}

pub fn dispatch_project(action: ProjectCommands, json_output: bool) -> Result<()> {
    let (_, conn) = open_store()?;
    match action {
        ProjectCommands::Budget {
            income,
            spend,
            trip_days,
            trip_daily,
            housing,
            housing_frequency,
            custom,
            save,
        } => {
            let now = today();
            let (from, to) = month_bounds(now.year(), now.month())?;
            let totals = db::totals_between(&conn, from, to)?;
            let income = parse_optional_money(income.as_deref(), "income")?.unwrap_or(totals.income);
            let spend = parse_optional_money(spend.as_deref(), "spend")?.unwrap_or_else(|| totals.expenses());

            let housing_frequency = match housing_frequency.as_deref() {
                None => None,
                Some("mensal") => Some(HousingFrequency::Monthly),
                Some("anual") => Some(HousingFrequency::Annual),
                Some(other) => {
                    return Err(invalid(format!(
                        "Invalid housing frequency {:?}. Expected mensal or anual",
                        other
                    )))
                }
            };
            let scenario = BudgetScenario {
                trip_days,
                trip_daily_spend: parse_money(&trip_daily, "trip daily spend")?,
                housing_amount: parse_money(&housing, "housing")?,
                housing_frequency,
                custom_amount: parse_money(&custom, "custom amount")?,
            };
            let projection = project_budget(income, spend, &scenario);
            let params = serde_json::json!({ "income": income, "spend": spend, "scenario": scenario });
            let saved = save_projection(&conn, save, "budget", &params, &projection)?;

            if json_output {
                return print_json(&projection);
            }
            println!("\n{} Projeção de orçamento\n", "📊".cyan().bold());
            println!("  Renda:            {}", format_currency(income));
            println!("  Gasto atual:      {}", format_currency(projection.current_spend));
            println!("  Gasto simulado:   {}", format_currency(projection.simulated_spend));
            println!("  Novo total:       {}", format_currency(projection.new_total_spend));
            let balance = format_currency(projection.projected_balance);
            if projection.projected_balance < Decimal::ZERO {
                println!("  Saldo projetado:  {}", balance.red().bold());
            } else {
                println!("  Saldo projetado:  {}", balance.green().bold());
            }
            if let Some(p) = projection.spend_pct {
                println!("  Comprometimento:  {}", format_percent(p));
            }
            if projection.alert {
                println!("\n  {} Gastos acima de 80% da renda", "⚠".yellow().bold());
            }
            print_saved(saved);
            Ok(())
        }
        ProjectCommands::Business {
            initial,
            monthly_cost,
            monthly_revenue,
            save,
        } => {
            let initial = parse_money(&initial, "initial investment")?;
            let cost = parse_money(&monthly_cost, "monthly cost")?;
            let revenue = parse_money(&monthly_revenue, "monthly revenue")?;
            let projection = project_business(initial, cost, revenue);
            let params = serde_json::json!({ "initial": initial, "monthly_cost": cost, "monthly_revenue": revenue });
            let saved = save_projection(&conn, save, "business", &params, &projection)?;

            if json_output {
                return print_json(&projection);
            }
            println!("\n{} Projeção de negócio (1º ano)\n", "🏪".cyan().bold());
            println!("  Custo:      {}", format_currency(projection.first_year_cost));
            println!("  Receita:    {}", format_currency(projection.first_year_revenue));
            println!("  Resultado:  {}", format_currency(projection.first_year_result).bold());
            println!("  Payback:    {}", optional_months(projection.break_even_months));
            print_saved(saved);
            Ok(())
        }
        ProjectCommands::Education {
            monthly_fee,
            months,
            materials,
            inflation,
            save,
        } => {
            let fee = parse_money(&monthly_fee, "monthly fee")?;
            let materials = parse_money(&materials, "materials")?;
            let inflation = parse_money(&inflation, "inflation")?;
            let projection = project_education(fee, months, materials, inflation)?;
            let params = serde_json::json!({
                "monthly_fee": fee, "months": months, "materials": materials, "inflation": inflation
            });
            let saved = save_projection(&conn, save, "education", &params, &projection)?;

            if json_output {
                return print_json(&projection);
            }
            println!("\n{} Projeção de educação\n", "🎓".cyan().bold());
            println!("  Custo total:          {}", format_currency(projection.total_cost));
            println!("  Corrigido p/ inflação: {}", format_currency(projection.inflation_adjusted_cost).bold());
            println!("  Média mensal:         {}", format_currency(projection.monthly_average));
            print_saved(saved);
            Ok(())
        }
        ProjectCommands::Property {
            value,
            down_payment,
            rate,
            years,
            rent,
            save,
        } => {
            let value = parse_money(&value, "property value")?;
            let down = parse_money(&down_payment, "down payment")?;
            let rate = parse_money(&rate, "rate")?;
            let rent = parse_optional_money(rent.as_deref(), "rent")?;
            let projection = project_property(value, down, rate, years, rent)?;
            let params = serde_json::json!({
                "value": value, "down_payment": down, "rate": rate, "years": years, "rent": rent
            });
            let saved = save_projection(&conn, save, "property", &params, &projection)?;

            if json_output {
                return print_json(&projection);
            }
            println!("\n{} Financiamento imobiliário\n", "🏠".cyan().bold());
            println!("  Financiado:  {}", format_currency(projection.financed));
            println!(
                "  Parcela:     {} x {}",
                projection.months,
                format_currency(projection.monthly_payment).bold()
            );
            println!("  Total pago:  {}", format_currency(projection.total_paid));
            println!("  Juros:       {}", format_currency(projection.total_interest).red());
            if let Some(y) = projection.rent_yield_pct {
                println!("  Rentab. aluguel: {} a.a.", format_percent(y));
            }
            print_saved(saved);
            Ok(())
        }
        ProjectCommands::Retirement {
            age,
            retire_at,
            life_expectancy,
            wealth,
            contribution,
            return_pct,
            spend,
            save,
        } => {
            if retire_at <= age || life_expectancy <= retire_at {
                return Err(invalid("Expected age < retirement age < life expectancy"));
            }
            let input = RetirementInput {
                current_age: age,
                retirement_age: retire_at,
                life_expectancy,
                current_wealth: parse_money(&wealth, "wealth")?,
                monthly_contribution: parse_money(&contribution, "contribution")?,
                annual_return_pct: parse_money(&return_pct, "return")?,
                desired_monthly_spend: parse_money(&spend, "desired spend")?,
            };
            let projection = project_retirement(&input)?;
            let saved = save_projection(&conn, save, "retirement", &input, &projection)?;

            if json_output {
                return print_json(&projection);
            }
            println!("\n{} Aposentadoria\n", "🏖".cyan().bold());
            println!("  Meses até aposentar:  {}", projection.months_to_retirement);
            println!("  Patrimônio projetado: {}", format_currency(projection.projected_wealth).bold());
            println!("  Patrimônio necessário: {}", format_currency(projection.required_wealth));
            if projection.on_track {
                println!("  {} No caminho certo", "✓".green().bold());
            } else {
                println!("  {} Faltam {}", "⚠".yellow().bold(), format_currency(projection.gap).red());
            }
            print_saved(saved);
            Ok(())
        }
        ProjectCommands::List => {
            let projections = db::list_projections(&conn)?;
            if json_output {
                return print_json(&projections);
            }
            if projections.is_empty() {
                print!("{}", format_empty("Nenhuma projeção salva"));
                return Ok(());
            }
            for p in &projections {
                println!(
                    "  #{:<4} {:<12} {}  {}",
                    p.id,
                    p.projection_type,
                    p.name.bold(),
                    p.created_at.as_deref().unwrap_or("").bright_black()
                );
            }
            Ok(())
        }
        ProjectCommands::Delete { id } => {
            if !db::delete_projection(&conn, id)? {
                return Err(FinanceError::NotFound(format!("projection {}", id)).into());
            }
            if json_output {
                return print_json(&serde_json::json!({ "deleted": id }));
            }
            println!("{} Projeção #{} removida", "✓".green().bold(), id);
            Ok(())
        }
    }
}

pub fn dispatch_emergency(
    balance: Option<&str>,
    monthly_cost: Option<&str>,
    months: u32,
    goal: Option<&str>,
    contribution: &str,
    json_output: bool,
) -> Result<()> {
    let (_, conn) = open_store()?;
    let balance = match parse_optional_money(balance, "balance")? {
        Some(b) => b,
        None => db::total_active_balance(&conn)?,
    };
    let monthly_cost = match parse_optional_money(monthly_cost, "monthly cost")? {
        Some(c) => c,
        None => {
            let now = today();
            let (from, to) = month_bounds(now.year(), now.month())?;
            db::totals_between(&conn, from, to)?.fixed
        }
    };
    let manual_goal = parse_optional_money(goal, "goal")?;
    let contribution = parse_money(contribution, "contribution")?;

    let plan = runway_plan(balance, monthly_cost, months, manual_goal, contribution)?;
    let thermometer = safety_thermometer(balance, plan.goal, monthly_cost);

    if json_output {
        return print_json(&serde_json::json!({
            "balance": balance,
            "monthly_cost": monthly_cost,
            "plan": plan,
            "thermometer": thermometer,
        }));
    }

    println!("\n{} Reserva de emergência\n", "🛟".cyan().bold());
    println!("  Saldo:          {}", format_currency(balance));
    println!("  Custo fixo/mês: {}", format_currency(monthly_cost));
    println!("  Meta:           {}", format_currency(plan.goal).bold());
    println!("  Falta:          {}", format_currency(plan.remaining));
    match plan.months_to_goal {
        Some(0) => println!("  {} Meta atingida", "✓".green().bold()),
        Some(m) => println!("  Com aporte de {}: {} meses", format_currency(contribution), m),
        None => println!("  Informe --contribution para estimar o prazo"),
    }

    let bar_width = 20usize;
    let filled = (thermometer.percent as usize * bar_width / 100).min(bar_width);
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(bar_width - filled));
    let bar = match thermometer.level {
        SafetyLevel::Critical => bar.red(),
        SafetyLevel::Safe => bar.green(),
        _ => bar.yellow(),
    };
    println!(
        "\n  {} {}%  {} ({} meses cobertos)",
        bar,
        thermometer.percent,
        thermometer.level.label().bold(),
        thermometer.months_covered
    );
    println!("  {}", thermometer.level.description().bright_black());
    Ok(())
}
