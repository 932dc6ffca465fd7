//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of data calculation from presentation.

use colored::Colorize;
use rust_decimal::Decimal;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use financetrack::analysis::{ClassifiedEntry, StatementAnalysis};
use financetrack::calculators::CompoundInterestResult;
use financetrack::db::{Account, Asset, Card, Category, FinancingStatus, InstallmentPurchase, Transaction, TransactionKind};
use financetrack::reports::{
    AnnualSummary, AssetSummary, CardStatement, FinancialGoalProgress, GoalStatus, MonthlyGoalProgress, MonthlySummary,
    PeriodSummary,
};
use financetrack::utils::{format_currency, format_percent, truncate_chars};

/// Money colored by sign: green when positive, red when negative
pub fn signed_money(value: Decimal) -> String {
    let text = format_currency(value);
    if value > Decimal::ZERO {
        text.green().to_string()
    } else if value < Decimal::ZERO {
        text.red().to_string()
    } else {
        text
    }
}

fn kind_amount(kind: TransactionKind, amount: Decimal) -> String {
    let text = format_currency(amount);
    if kind.is_expense() {
        text.red().to_string()
    } else {
        text.green().to_string()
    }
}

fn optional_percent(value: Option<Decimal>) -> String {
    value.map(format_percent).unwrap_or_else(|| "-".to_string())
}

fn section(title: &str) -> String {
    format!("\n{} {}\n", "▸".cyan().bold(), title.bold())
}

pub fn format_empty(message: &str) -> String {
    format!("{} {}\n", "ℹ".blue().bold(), message)
}

pub fn format_transactions_table(transactions: &[Transaction]) -> String {
    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Data")]
        date: String,
        #[tabled(rename = "Tipo")]
        kind: String,
        #[tabled(rename = "Descrição")]
        description: String,
        #[tabled(rename = "Categoria")]
        category: String,
        #[tabled(rename = "Valor")]
        amount: String,
    }

    let rows: Vec<Row> = transactions
        .iter()
        .map(|t| Row {
            id: t.id.map(|id| id.to_string()).unwrap_or_default(),
            date: t.date.format("%d/%m/%Y").to_string(),
            kind: t.kind.label().to_string(),
            description: truncate_chars(&t.description, 40),
            category: t.category_name.clone().unwrap_or_else(|| "-".to_string()),
            amount: kind_amount(t.kind, t.amount),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(5..), Alignment::right());
    table.to_string()
}

pub fn format_transaction_detail(tx: &Transaction) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n{} Transação #{}\n\n", "🧾".cyan(), tx.id.unwrap_or_default()));
    out.push_str(&format!("  {:<12} {}\n", "Data:".bold(), tx.date.format("%d/%m/%Y")));
    out.push_str(&format!("  {:<12} {}\n", "Tipo:".bold(), tx.kind.label()));
    out.push_str(&format!("  {:<12} {}\n", "Descrição:".bold(), tx.description));
    out.push_str(&format!("  {:<12} {}\n", "Valor:".bold(), kind_amount(tx.kind, tx.amount)));
    out.push_str(&format!(
        "  {:<12} {}\n",
        "Categoria:".bold(),
        tx.category_name.as_deref().unwrap_or("-")
    ));
    out.push_str(&format!("  {:<12} {}\n", "Origem:".bold(), tx.source));
    out
}

pub fn format_accounts_table(accounts: &[Account]) -> String {
    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Conta")]
        name: String,
        #[tabled(rename = "Banco")]
        bank: String,
        #[tabled(rename = "Ativa")]
        active: String,
        #[tabled(rename = "Saldo")]
        balance: String,
    }

    let rows: Vec<Row> = accounts
        .iter()
        .map(|a| Row {
            id: a.id.map(|id| id.to_string()).unwrap_or_default(),
            name: a.name.clone(),
            bank: a.bank.clone().unwrap_or_else(|| "-".to_string()),
            active: if a.active { "sim" } else { "não" }.to_string(),
            balance: signed_money(a.balance),
        })
        .collect();

    let total: Decimal = accounts.iter().filter(|a| a.active).map(|a| a.balance).sum();
    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(4..), Alignment::right());
    format!("{}\n{:<20} {}\n", table, "Patrimônio total:".bold(), signed_money(total))
}

pub fn format_categories_table(categories: &[Category]) -> String {
    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "")]
        icon: String,
        #[tabled(rename = "Categoria")]
        name: String,
        #[tabled(rename = "Tipo")]
        kind: String,
        #[tabled(rename = "Cor")]
        color: String,
    }

    let rows: Vec<Row> = categories
        .iter()
        .map(|c| Row {
            icon: c.icon.clone(),
            name: if c.is_default { c.name.clone() } else { format!("{} *", c.name) },
            kind: c.kind.as_str().to_string(),
            color: c.color.clone(),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.to_string()
}

pub fn format_cards_table(cards: &[Card]) -> String {
    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Cartão")]
        name: String,
        #[tabled(rename = "Tipo")]
        card_type: String,
        #[tabled(rename = "Limite")]
        limit: String,
        #[tabled(rename = "Fecha")]
        closing: String,
        #[tabled(rename = "Vence")]
        due: String,
    }

    let day = |d: Option<u32>| d.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string());
    let rows: Vec<Row> = cards
        .iter()
        .map(|c| Row {
            id: c.id.map(|id| id.to_string()).unwrap_or_default(),
            name: c.name.clone(),
            card_type: c.card_type.as_str().to_string(),
            limit: c.credit_limit.map(format_currency).unwrap_or_else(|| "-".to_string()),
            closing: day(c.closing_day),
            due: day(c.due_day),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(3..), Alignment::right());
    table.to_string()
}

pub fn format_card_statement(statement: &CardStatement) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "\n{} Fatura {} - {}\n",
        "💳".cyan().bold(),
        statement.card.name.bold(),
        statement.reference_month
    ));
    out.push_str(&format!(
        "  Período: {} a {}\n",
        statement.period_start.format("%d/%m/%Y"),
        statement.period_end.format("%d/%m/%Y")
    ));

    if !statement.transactions.is_empty() {
        out.push_str(&section("Compras"));
        out.push_str(&format_transactions_table(&statement.transactions));
        out.push('\n');
    }
    if !statement.installments.is_empty() {
        out.push_str(&section("Parcelas"));
        for due in &statement.installments {
            out.push_str(&format!(
                "  {} ({}/{})  {}\n",
                due.description,
                due.installment.number,
                due.installment_count,
                format_currency(due.installment.amount)
            ));
        }
    }

    out.push_str(&format!("\n  {:<18} {}\n", "Compras:".bold(), format_currency(statement.transactions_total)));
    out.push_str(&format!("  {:<18} {}\n", "Parcelas:".bold(), format_currency(statement.installments_total)));
    out.push_str(&format!("  {:<18} {}\n", "Total:".bold(), format_currency(statement.total).yellow().bold()));
    if let Some(available) = statement.available_limit {
        out.push_str(&format!(
            "  {:<18} {} ({} usado)\n",
            "Limite disponível:".bold(),
            signed_money(available),
            optional_percent(statement.limit_usage_pct)
        ));
    }
    if let Some(due) = statement.due_date {
        out.push_str(&format!("  {:<18} {}\n", "Vencimento:".bold(), due.format("%d/%m/%Y")));
    }

    let status = if statement.paid {
        "Paga".green().bold()
    } else if statement.overdue {
        "Vencida".red().bold()
    } else {
        "Em aberto".yellow()
    };
    out.push_str(&format!("  {:<18} {}\n", "Situação:".bold(), status));
    out
}

pub fn format_installment_purchases(purchases: &[InstallmentPurchase]) -> String {
    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Descrição")]
        description: String,
        #[tabled(rename = "Parcelas")]
        count: u32,
        #[tabled(rename = "1º vencimento")]
        first_due: String,
        #[tabled(rename = "Total")]
        total: String,
    }

    let rows: Vec<Row> = purchases
        .iter()
        .map(|p| Row {
            id: p.id.map(|id| id.to_string()).unwrap_or_default(),
            description: truncate_chars(&p.description, 40),
            count: p.installment_count,
            first_due: p.first_due_date.format("%d/%m/%Y").to_string(),
            total: format_currency(p.total_amount),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(4..), Alignment::right());
    table.to_string()
}

pub fn format_monthly_summary(summary: &MonthlySummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n{} Resumo de {}\n\n", "📊".cyan().bold(), summary.label));

    out.push_str(&format!("  {:<16} {}\n", "Entradas:".bold(), format_currency(summary.totals.income).green()));
    out.push_str(&format!("  {:<16} {}\n", "Saídas fixas:".bold(), format_currency(summary.totals.fixed).red()));
    out.push_str(&format!("  {:<16} {}\n", "Gastos diários:".bold(), format_currency(summary.totals.daily).red()));
    out.push_str(&format!("  {:<16} {}\n", "Saldo:".bold(), signed_money(summary.balance)));
    if let Some(opening) = summary.opening_balance {
        out.push_str(&format!("  {:<16} {}\n", "Saldo inicial:".bold(), format_currency(opening)));
    }

    if let Some(comparison) = &summary.comparison {
        out.push_str(&format!(
            "  {:<16} entradas {} / gastos {}\n",
            "vs mês anterior:".bold(),
            optional_percent(comparison.income_change_pct),
            optional_percent(comparison.expense_change_pct)
        ));
    }

    if !summary.categories.is_empty() {
        #[derive(Tabled)]
        struct Row {
            #[tabled(rename = "Categoria")]
            name: String,
            #[tabled(rename = "Valor")]
            value: String,
            #[tabled(rename = "%")]
            share: String,
        }
        let rows: Vec<Row> = summary
            .categories
            .iter()
            .map(|c| Row {
                name: c.name.clone(),
                value: format_currency(c.value),
                share: optional_percent(c.share_pct),
            })
            .collect();
        let mut table = Table::new(&rows);
        table.with(Style::rounded());
        table.modify(Columns::new(1..), Alignment::right());
        out.push_str(&section("Gastos por categoria"));
        out.push_str(&table.to_string());
        out.push('\n');
    }

    if !summary.insights.is_empty() {
        out.push_str(&section("Insights"));
        for insight in &summary.insights {
            out.push_str(&format!("  {}\n", insight));
        }
    }
    out
}

pub fn format_period_summary(summary: &PeriodSummary) -> String {
    let current = if summary.is_current { " (atual)".dimmed().to_string() } else { String::new() };
    let mut out = format!(
        "\n{} {}: {}{}\n\n",
        "📆".cyan().bold(),
        summary.period.label(),
        summary.label,
        current
    );
    out.push_str(&format!("  {:<16} {}\n", "Entradas:".bold(), format_currency(summary.totals.income).green()));
    out.push_str(&format!("  {:<16} {}\n", "Gastos:".bold(), format_currency(summary.expenses).red()));
    out.push_str(&format!("  {:<16} {}\n", "Saldo:".bold(), signed_money(summary.balance)));
    out.push_str(&format!(
        "  {:<16} {} ({})\n",
        "Período anterior:".bold(),
        format_currency(summary.previous.expenses()),
        optional_percent(summary.expense_change_pct)
    ));

    if !summary.categories.is_empty() {
        out.push_str(&section("Gastos por categoria"));
        for category in &summary.categories {
            out.push_str(&format!(
                "  {:<20} {:>14} {:>8}\n",
                category.name,
                format_currency(category.value),
                optional_percent(category.share_pct)
            ));
        }
    }
    out
}

pub fn format_annual_summary(summary: &AnnualSummary) -> String {
    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "Mês")]
        month: String,
        #[tabled(rename = "Entradas")]
        income: String,
        #[tabled(rename = "Saídas")]
        expenses: String,
        #[tabled(rename = "Saldo")]
        balance: String,
    }

    let mut out = format!("\n{} Resumo de {}\n\n", "📅".cyan().bold(), summary.year);
    if summary.months.is_empty() {
        out.push_str(&format_empty("Nenhuma transação registrada neste ano"));
        return out;
    }

    let rows: Vec<Row> = summary
        .months
        .iter()
        .map(|m| Row {
            month: financetrack::periods::month_name(m.month).to_string(),
            income: format_currency(m.income),
            expenses: format_currency(m.expenses),
            balance: signed_money(m.balance),
        })
        .collect();
    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(1..), Alignment::right());
    out.push_str(&table.to_string());

    out.push_str(&format!("\n\n  {:<14} {}\n", "Entradas:".bold(), format_currency(summary.income).green()));
    out.push_str(&format!("  {:<14} {}\n", "Saídas:".bold(), format_currency(summary.expenses).red()));
    out.push_str(&format!("  {:<14} {}\n", "Saldo:".bold(), signed_money(summary.balance)));
    if summary.income_change_pct.is_some() || summary.expense_change_pct.is_some() {
        out.push_str(&format!(
            "  {:<14} entradas {} / gastos {}\n",
            "vs ano anterior:".bold(),
            optional_percent(summary.income_change_pct),
            optional_percent(summary.expense_change_pct)
        ));
    }

    if !summary.top_categories.is_empty() {
        out.push_str(&section("Maiores categorias"));
        for (name, value) in &summary.top_categories {
            out.push_str(&format!("  {:<22} {}\n", name, format_currency(*value)));
        }
    }
    out
}

fn status_cell(status: GoalStatus) -> String {
    match status {
        GoalStatus::OnTrack | GoalStatus::Achieved => status.label().green().to_string(),
        GoalStatus::Warning | GoalStatus::Behind => status.label().yellow().to_string(),
        GoalStatus::Exceeded => status.label().red().bold().to_string(),
    }
}

pub fn format_monthly_goals(progress: &[MonthlyGoalProgress]) -> String {
    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Meta")]
        goal: String,
        #[tabled(rename = "Alvo")]
        target: String,
        #[tabled(rename = "Atual")]
        current: String,
        #[tabled(rename = "%")]
        percent: String,
        #[tabled(rename = "Situação")]
        status: String,
    }

    let rows: Vec<Row> = progress
        .iter()
        .map(|p| {
            let scope = p.category_name.as_deref().unwrap_or("geral");
            Row {
                id: p.goal.id.map(|id| id.to_string()).unwrap_or_default(),
                goal: format!("{} ({})", p.goal.goal_type.label(), scope),
                target: format_currency(p.goal.target),
                current: format_currency(p.current),
                percent: format_percent(p.percent),
                status: status_cell(p.status),
            }
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(2..5), Alignment::right());
    table.to_string()
}

pub fn format_financial_goals(progress: &[FinancialGoalProgress]) -> String {
    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Meta")]
        name: String,
        #[tabled(rename = "Progresso")]
        progress: String,
        #[tabled(rename = "Falta")]
        remaining: String,
        #[tabled(rename = "Prazo")]
        deadline: String,
        #[tabled(rename = "Aporte sugerido")]
        suggested: String,
    }

    let rows: Vec<Row> = progress
        .iter()
        .map(|p| Row {
            id: p.goal.id.map(|id| id.to_string()).unwrap_or_default(),
            name: p.goal.name.clone(),
            progress: format!(
                "{} de {} ({})",
                format_currency(p.goal.current),
                format_currency(p.goal.target),
                format_percent(p.percent)
            ),
            remaining: if p.completed {
                "concluída".green().to_string()
            } else {
                format_currency(p.remaining)
            },
            deadline: match (p.goal.deadline, p.months_left) {
                (Some(date), Some(months)) => format!("{} ({} meses)", date.format("%d/%m/%Y"), months),
                _ => "-".to_string(),
            },
            suggested: p
                .suggested_monthly
                .map(|v| format!("{}/mês", format_currency(v)))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.to_string()
}

pub fn format_assets_table(assets: &[Asset]) -> String {
    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Ativo")]
        name: String,
        #[tabled(rename = "Tipo")]
        asset_type: String,
        #[tabled(rename = "Investido")]
        initial: String,
        #[tabled(rename = "Atual")]
        current: String,
        #[tabled(rename = "Resultado")]
        profit: String,
        #[tabled(rename = "Situação")]
        status: String,
    }

    let rows: Vec<Row> = assets
        .iter()
        .map(|a| Row {
            id: a.id.map(|id| id.to_string()).unwrap_or_default(),
            name: a.name.clone(),
            asset_type: a.asset_type.label().to_string(),
            initial: format_currency(a.initial_value),
            current: format_currency(a.current_value),
            profit: signed_money(a.profit()),
            status: match a.financing_status {
                FinancingStatus::PaidOff => "quitado".to_string(),
                FinancingStatus::Financing => format!("financiando ({} pago)", format_percent(a.paid_pct)),
            },
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(3..6), Alignment::right());
    table.to_string()
}

pub fn format_asset_summary(summary: &AssetSummary) -> String {
    let mut out = section("Patrimônio");
    out.push_str(&format!("  {:<18} {}\n", "Total investido:", format_currency(summary.total_invested)));
    out.push_str(&format!("  {:<18} {}\n", "Valor atual:", format_currency(summary.current_total).bold()));
    out.push_str(&format!("  {:<18} {}\n", "Resultado:", signed_money(summary.profit)));
    out.push_str(&format!("  {:<18} {}\n", "Rentabilidade:", optional_percent(summary.return_pct)));
    if summary.financing_count > 0 {
        out.push_str(&format!(
            "  {:<18} {} ({} em financiamento)\n",
            "Valor quitado:",
            format_currency(summary.owned_value),
            summary.financing_count
        ));
    }

    if !summary.by_type.is_empty() {
        out.push_str(&section("Por tipo"));
        for total in &summary.by_type {
            out.push_str(&format!(
                "  {:<14} {:>3}  {}\n",
                total.asset_type.label(),
                total.count,
                format_currency(total.current_value)
            ));
        }
    }
    out
}

pub fn format_compound_interest(result: &CompoundInterestResult, with_table: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n{} Juros compostos\n\n", "📈".cyan().bold()));
    out.push_str(&format!("  {:<16} {}\n", "Valor final:".bold(), format_currency(result.final_amount).green().bold()));
    out.push_str(&format!("  {:<16} {}\n", "Total investido:".bold(), format_currency(result.total_invested)));
    out.push_str(&format!("  {:<16} {}\n", "Total em juros:".bold(), signed_money(result.total_interest)));

    if with_table && !result.evolution.is_empty() {
        #[derive(Tabled)]
        struct Row {
            #[tabled(rename = "Mês")]
            month: u32,
            #[tabled(rename = "Aporte")]
            contribution: String,
            #[tabled(rename = "Juros")]
            interest: String,
            #[tabled(rename = "Saldo")]
            closing: String,
        }
        let rows: Vec<Row> = result
            .evolution
            .iter()
            .map(|m| Row {
                month: m.month,
                contribution: format_currency(m.contribution),
                interest: format_currency(m.interest),
                closing: format_currency(m.closing),
            })
            .collect();
        let mut table = Table::new(&rows);
        table.with(Style::rounded());
        table.modify(Columns::new(1..), Alignment::right());
        out.push('\n');
        out.push_str(&table.to_string());
        out.push('\n');
    }
    out
}

/// First `limit` parsed statement lines
pub fn format_statement_preview(entries: &[ClassifiedEntry], limit: usize) -> String {
    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "Data")]
        date: String,
        #[tabled(rename = "Descrição")]
        description: String,
        #[tabled(rename = "Tipo")]
        kind: String,
        #[tabled(rename = "Categoria")]
        category: String,
        #[tabled(rename = "Valor")]
        amount: String,
    }

    let rows: Vec<Row> = entries
        .iter()
        .take(limit)
        .map(|item| Row {
            date: item
                .entry
                .date
                .map(|d| d.format("%d/%m/%Y").to_string())
                .unwrap_or_else(|| "?".to_string()),
            description: truncate_chars(&item.entry.description, 40),
            kind: item.entry.kind.label().to_string(),
            category: format!("{} ({}%)", item.category, item.confidence),
            amount: kind_amount(item.entry.kind, item.entry.amount),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(4..), Alignment::right());
    let mut out = table.to_string();
    if entries.len() > limit {
        out.push_str(&format!("\n... e mais {} lançamentos", entries.len() - limit));
    }
    out
}

pub fn format_statement_analysis(analysis: &StatementAnalysis) -> String {
    let mut out = String::new();
    out.push_str(&section("Análise do extrato"));
    out.push_str(&format!("  {:<18} {}\n", "Lançamentos:".bold(), analysis.total_transactions));
    out.push_str(&format!("  {:<18} {}\n", "Entradas:".bold(), format_currency(analysis.total_income).green()));
    out.push_str(&format!("  {:<18} {}\n", "Saídas:".bold(), format_currency(analysis.total_expenses).red()));
    out.push_str(&format!(
        "  {:<18} {}\n",
        "Média diária:".bold(),
        format_currency(analysis.behavior.daily_average)
    ));
    if analysis.risk_alert {
        out.push_str(&format!("  {}\n", "⚠️  Gastos acima de 1,5x as entradas".red().bold()));
    }

    if !analysis.top_categories.is_empty() {
        out.push_str(&section("Por categoria"));
        for (name, value) in analysis.top_categories.iter().take(5) {
            out.push_str(&format!("  {:<22} {}\n", name, format_currency(*value)));
        }
    }
    if !analysis.behavior.largest_expenses.is_empty() {
        out.push_str(&section("Maiores gastos"));
        for expense in &analysis.behavior.largest_expenses {
            out.push_str(&format!(
                "  {:<12} {} [{}]\n",
                format_currency(expense.amount),
                expense.description,
                expense.category
            ));
        }
    }
    if !analysis.insights.is_empty() {
        out.push_str(&section("Insights"));
        for insight in &analysis.insights {
            out.push_str(&format!("  {}\n", insight));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_message() {
        colored::control::set_override(false);
        let msg = format_empty("Nenhuma transação encontrada");
        assert!(msg.contains("Nenhuma transação encontrada"));
    }

    #[test]
    fn test_transactions_table_uses_brazilian_formats() {
        colored::control::set_override(false);
        let mut tx = Transaction::new(
            TransactionKind::DailyExpense,
            dec!(1234.5),
            "Supermercado",
            NaiveDate::from_ymd_opt(2025, 3, 7).unwrap(),
        );
        tx.id = Some(7);
        let table = format_transactions_table(&[tx]);
        assert!(table.contains("07/03/2025"));
        assert!(table.contains("R$ 1.234,50"));
        assert!(table.contains("Supermercado"));
    }

    #[test]
    fn test_asset_summary_shows_return_and_financing() {
        colored::control::set_override(false);
        let mut car = Asset::new("Carro", financetrack::db::AssetType::Vehicle, dec!(50000), dec!(45000));
        car.financing_status = FinancingStatus::Financing;
        car.paid_pct = dec!(50);
        let summary = financetrack::reports::summarize_assets(vec![
            Asset::new("CDB", financetrack::db::AssetType::Investment, dec!(10000), dec!(12000)),
            car,
        ]);

        let text = format_asset_summary(&summary);
        assert!(text.contains("R$ 57.000,00"));
        assert!(text.contains("R$ -3.000,00"));
        assert!(text.contains("1 em financiamento"));
        assert!(text.contains("Veículo"));

        let table = format_assets_table(&summary.assets);
        assert!(table.contains("financiando (50,0% pago)"));
    }

    #[test]
    fn test_period_summary_marks_current_period() {
        colored::control::set_override(false);
        let day = chrono::NaiveDate::from_ymd_opt(2025, 1, 8).unwrap();
        let summary = PeriodSummary {
            period: financetrack::periods::PeriodType::Week,
            start: day,
            end: day,
            label: "06/01 - 12/01".to_string(),
            is_current: true,
            totals: Default::default(),
            expenses: dec!(60),
            balance: dec!(-60),
            categories: Vec::new(),
            previous: Default::default(),
            expense_change_pct: None,
        };

        let text = format_period_summary(&summary);
        assert!(text.contains("Semana: 06/01 - 12/01 (atual)"));
        assert!(text.contains("R$ 60,00"));
        assert!(text.contains("Período anterior:"));
    }
}
