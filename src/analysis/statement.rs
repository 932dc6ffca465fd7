//! Statement analysis: totals, spending profile, risk alert and insights

use itertools::Itertools;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use super::classifier::{Classification, KeywordClassifier, UNCLASSIFIED_CATEGORY};
use crate::db::TransactionKind;
use crate::importers::StatementEntry;
use crate::utils::{fold_text, format_currency, format_percent, percent_of, truncate_chars};

/// Expenses above this multiple of income raise the risk alert
const RISK_MULTIPLIER: Decimal = Decimal::from_parts(15, 0, 0, false, 1);
/// Entries below this amount count as "small" spending
const SMALL_EXPENSE: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Statement entry with its category guess
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedEntry {
    #[serde(flatten)]
    pub entry: StatementEntry,
    pub category: String,
    pub confidence: u8,
}

impl ClassifiedEntry {
    pub fn new(entry: StatementEntry, classification: Classification) -> Self {
        Self {
            entry,
            category: classification.category,
            confidence: classification.confidence,
        }
    }

    /// Entry whose classification failed
    pub fn unclassified(entry: StatementEntry) -> Self {
        Self::new(entry, Classification::new(UNCLASSIFIED_CATEGORY, 0))
    }

    /// Keep a classification result, or fall back to "Não classificado"
    pub fn from_result<E>(entry: StatementEntry, result: Result<Classification, E>) -> Self {
        match result {
            Ok(classification) => Self::new(entry, classification),
            Err(_) => Self::unclassified(entry),
        }
    }
}

/// Classify every entry with the keyword rules
pub fn classify_entries(entries: Vec<StatementEntry>, classifier: &KeywordClassifier) -> Vec<ClassifiedEntry> {
    entries
        .into_iter()
        .map(|entry| {
            let classification = classifier.classify(&entry.description);
            ClassifiedEntry::new(entry, classification)
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct LargeExpense {
    pub amount: Decimal,
    pub description: String,
    pub category: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BehaviorProfile {
    pub expense_count: usize,
    /// Total spent divided by the number of distinct dated days
    pub daily_average: Decimal,
    pub largest_expenses: Vec<LargeExpense>,
    /// Expense count per category, most frequent first
    pub category_frequency: Vec<(String, usize)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatementAnalysis {
    pub total_transactions: usize,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    /// Expense value per category, largest first
    pub top_categories: Vec<(String, Decimal)>,
    pub behavior: BehaviorProfile,
    pub risk_alert: bool,
    pub insights: Vec<String>,
}

pub fn analyze_statement(entries: &[ClassifiedEntry]) -> StatementAnalysis {
    let mut total_income = Decimal::ZERO;
    let mut total_expenses = Decimal::ZERO;
    let mut by_category: HashMap<&str, Decimal> = HashMap::new();

    for item in entries {
        if item.entry.kind == TransactionKind::Income {
            total_income += item.entry.amount;
        } else {
            total_expenses += item.entry.amount;
            *by_category.entry(item.category.as_str()).or_default() += item.entry.amount;
        }
    }

    let mut top_categories: Vec<(String, Decimal)> = by_category
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();
    top_categories.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let behavior = behavior_profile(entries);
    let risk_alert = total_expenses > total_income * RISK_MULTIPLIER;

    let mut analysis = StatementAnalysis {
        total_transactions: entries.len(),
        total_income,
        total_expenses,
        top_categories,
        behavior,
        risk_alert,
        insights: Vec::new(),
    };
    analysis.insights = generate_insights(&analysis, entries);
    analysis
}

fn behavior_profile(entries: &[ClassifiedEntry]) -> BehaviorProfile {
    let expenses: Vec<&ClassifiedEntry> = entries
        .iter()
        .filter(|e| e.entry.kind.is_expense())
        .collect();

    let mut sorted = expenses.clone();
    sorted.sort_by(|a, b| b.entry.amount.cmp(&a.entry.amount));
    let largest_expenses = sorted
        .iter()
        .take(5)
        .map(|e| LargeExpense {
            amount: e.entry.amount,
            description: truncate_chars(&e.entry.description, 50),
            category: e.category.clone(),
        })
        .collect();

    let days: BTreeSet<_> = entries.iter().filter_map(|e| e.entry.date).collect();
    let spent: Decimal = expenses.iter().map(|e| e.entry.amount).sum();
    let daily_average = if days.is_empty() {
        Decimal::ZERO
    } else {
        (spent / Decimal::from(days.len())).round_dp(2)
    };

    let category_frequency: Vec<(String, usize)> = expenses
        .iter()
        .map(|e| e.category.as_str())
        .counts()
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .collect();

    BehaviorProfile {
        expense_count: expenses.len(),
        daily_average,
        largest_expenses,
        category_frequency,
    }
}

fn generate_insights(analysis: &StatementAnalysis, entries: &[ClassifiedEntry]) -> Vec<String> {
    let mut insights = Vec::new();
    let income = analysis.total_income;
    let expenses = analysis.total_expenses;

    if analysis.risk_alert {
        insights.push("⚠️ Gastos muito acima da renda: risco de endividamento".to_string());
    }

    match percent_of(expenses, income) {
        Some(ratio) if ratio > Decimal::from(80) => insights.push(format!(
            "⚠️ Os gastos consomem {} da renda. Hora de apertar o cinto!",
            format_percent(ratio)
        )),
        Some(ratio) if ratio > Decimal::from(60) => insights.push(format!(
            "✓ Gastos sob controle: {} da renda",
            format_percent(ratio)
        )),
        Some(ratio) => insights.push(format!(
            "✅ Excelente: só {} da renda foi gasto",
            format_percent(ratio)
        )),
        None if expenses > Decimal::ZERO => {
            insights.push("⚠️ Nenhuma entrada no período para cobrir os gastos".to_string())
        }
        None => {}
    }

    if let Some((top, value)) = analysis.top_categories.first() {
        if let Some(share) = percent_of(*value, expenses) {
            insights.push(format!(
                "📊 Maior gasto em {}: {} do total",
                top,
                format_percent(share)
            ));
        }
    }

    let pix_count = entries
        .iter()
        .filter(|e| fold_text(&e.entry.description).contains("pix"))
        .count();
    if pix_count > 0 {
        insights.push(format!("📱 {} transações via PIX", pix_count));
    }

    let small = entries
        .iter()
        .filter(|e| e.entry.kind.is_expense() && e.entry.amount < SMALL_EXPENSE)
        .count();
    // strictly more than 30% of all entries
    if small * 10 > entries.len() * 3 {
        insights.push("💡 Muitos gastos pequenos: vale a pena concentrar as compras".to_string());
    }

    if expenses > income {
        insights.push("💰 Sugestão: buscar renda extra ou cortar despesas".to_string());
    } else {
        insights.push(format!(
            "💵 Você guardou {} neste período!",
            format_currency(income - expenses)
        ));
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn item(day: u32, desc: &str, kind: TransactionKind, amount: Decimal, category: &str) -> ClassifiedEntry {
        ClassifiedEntry::new(
            StatementEntry {
                date: NaiveDate::from_ymd_opt(2025, 1, day),
                description: desc.to_string(),
                kind,
                amount,
                balance: None,
                external_id: None,
            },
            Classification::new(category, 70),
        )
    }

    fn sample() -> Vec<ClassifiedEntry> {
        vec![
            item(1, "Salário", TransactionKind::Income, dec!(5000), "Outro"),
            item(2, "Aluguel", TransactionKind::FixedExpense, dec!(2000), "Moradia"),
            item(2, "Mercado", TransactionKind::DailyExpense, dec!(600), "Alimentação"),
            item(3, "PIX padaria", TransactionKind::DailyExpense, dec!(20), "Alimentação"),
            item(4, "Uber", TransactionKind::DailyExpense, dec!(30), "Transporte"),
        ]
    }

    #[test]
    fn test_totals_and_categories() {
        let analysis = analyze_statement(&sample());
        assert_eq!(analysis.total_transactions, 5);
        assert_eq!(analysis.total_income, dec!(5000));
        assert_eq!(analysis.total_expenses, dec!(2650));
        assert_eq!(analysis.top_categories[0], ("Moradia".to_string(), dec!(2000)));
        assert_eq!(analysis.top_categories[1], ("Alimentação".to_string(), dec!(620)));
        assert!(!analysis.risk_alert);
    }

    #[test]
    fn test_behavior_profile() {
        let profile = analyze_statement(&sample()).behavior;
        assert_eq!(profile.expense_count, 4);
        // 2650 over 4 distinct days
        assert_eq!(profile.daily_average, dec!(662.50));
        assert_eq!(profile.largest_expenses.len(), 4);
        assert_eq!(profile.largest_expenses[0].description, "Aluguel");
        assert_eq!(profile.category_frequency[0], ("Alimentação".to_string(), 2));
    }

    #[test]
    fn test_insights_content() {
        let analysis = analyze_statement(&sample());
        let text = analysis.insights.join("\n");
        // 53% of income
        assert!(text.contains("Excelente"), "{}", text);
        assert!(text.contains("Maior gasto em Moradia: 75,5%"), "{}", text);
        assert!(text.contains("1 transações via PIX"), "{}", text);
        // 2 small out of 5 entries = 40%
        assert!(text.contains("gastos pequenos"), "{}", text);
        assert!(text.contains("R$ 2.350,00"), "{}", text);
    }

    #[test]
    fn test_risk_alert_when_expenses_exceed_150_percent() {
        let entries = vec![
            item(1, "Salário", TransactionKind::Income, dec!(1000), "Outro"),
            item(2, "Viagem", TransactionKind::FixedExpense, dec!(1600), "Viagens"),
        ];
        let analysis = analyze_statement(&entries);
        assert!(analysis.risk_alert);
        assert!(analysis.insights[0].contains("endividamento"));
        assert!(analysis.insights.iter().any(|i| i.contains("renda extra")));
    }

    #[test]
    fn test_empty_statement() {
        let analysis = analyze_statement(&[]);
        assert_eq!(analysis.total_transactions, 0);
        assert_eq!(analysis.behavior.daily_average, dec!(0));
        assert!(!analysis.risk_alert);
    }

    #[test]
    fn test_unclassified_fallback() {
        let base = sample().remove(1).entry;
        let failed: Result<Classification, &str> = Err("timeout");
        let entry = ClassifiedEntry::from_result(base, failed);
        assert_eq!(entry.category, "Não classificado");
        assert_eq!(entry.confidence, 0);
    }

    #[test]
    fn test_classify_entries_uses_keywords() {
        let entries = sample().into_iter().map(|c| c.entry).collect();
        let classified = classify_entries(entries, &KeywordClassifier::new());
        assert_eq!(classified[1].category, "Moradia");
        assert_eq!(classified[4].category, "Transporte");
    }
}
