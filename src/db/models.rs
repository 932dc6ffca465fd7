use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Transaction kinds tracked per financial month
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Income,       // entrada
    FixedExpense, // saida_fixa
    DailyExpense, // diario
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "entrada",
            TransactionKind::FixedExpense => "saida_fixa",
            TransactionKind::DailyExpense => "diario",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Income => "Entrada",
            TransactionKind::FixedExpense => "Saída fixa",
            TransactionKind::DailyExpense => "Diário",
        }
    }

    pub fn is_expense(&self) -> bool {
        !matches!(self, TransactionKind::Income)
    }

    /// Signed effect on an account balance
    pub fn signed(&self, amount: Decimal) -> Decimal {
        if self.is_expense() {
            -amount
        } else {
            amount
        }
    }
}

impl FromStr for TransactionKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "entrada" | "income" | "in" => Ok(TransactionKind::Income),
            "saida_fixa" | "fixed" | "fixa" => Ok(TransactionKind::FixedExpense),
            "diario" | "daily" => Ok(TransactionKind::DailyExpense),
            _ => Err(()),
        }
    }
}

/// Category kinds (fixed or variable spending)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CategoryKind {
    Fixed,
    Variable,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Fixed => "fixa",
            CategoryKind::Variable => "variavel",
        }
    }
}

impl FromStr for CategoryKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixa" | "fixed" => Ok(CategoryKind::Fixed),
            "variavel" | "variable" => Ok(CategoryKind::Variable),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CardType {
    Credit,
    Debit,
    Both,
}

impl CardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Credit => "credito",
            CardType::Debit => "debito",
            CardType::Both => "ambos",
        }
    }

    pub fn has_credit(&self) -> bool {
        !matches!(self, CardType::Debit)
    }
}

impl FromStr for CardType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "credito" | "credit" => Ok(CardType::Credit),
            "debito" | "debit" => Ok(CardType::Debit),
            "ambos" | "both" => Ok(CardType::Both),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MonthStatus {
    Open,
    Closed,
}

impl MonthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonthStatus::Open => "aberto",
            MonthStatus::Closed => "fechado",
        }
    }
}

impl FromStr for MonthStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "aberto" => Ok(MonthStatus::Open),
            "fechado" => Ok(MonthStatus::Closed),
            _ => Err(()),
        }
    }
}

/// Monthly goal types: a spending cap or a savings floor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MonthlyGoalType {
    MaxSpending,
    MinSavings,
}

impl MonthlyGoalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonthlyGoalType::MaxSpending => "gasto_maximo",
            MonthlyGoalType::MinSavings => "economia_minima",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MonthlyGoalType::MaxSpending => "Gasto máximo",
            MonthlyGoalType::MinSavings => "Economia mínima",
        }
    }
}

impl FromStr for MonthlyGoalType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gasto_maximo" | "max-spending" | "gasto" => Ok(MonthlyGoalType::MaxSpending),
            "economia_minima" | "min-savings" | "economia" => Ok(MonthlyGoalType::MinSavings),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FinancialGoalType {
    EmergencyFund,
    Travel,
    Purchase,
    Investment,
    Other,
}

impl FinancialGoalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinancialGoalType::EmergencyFund => "reserva_emergencia",
            FinancialGoalType::Travel => "viagem",
            FinancialGoalType::Purchase => "compra",
            FinancialGoalType::Investment => "investimento",
            FinancialGoalType::Other => "outro",
        }
    }
}

impl FromStr for FinancialGoalType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reserva_emergencia" | "emergency" | "reserva" => Ok(FinancialGoalType::EmergencyFund),
            "viagem" | "travel" => Ok(FinancialGoalType::Travel),
            "compra" | "purchase" => Ok(FinancialGoalType::Purchase),
            "investimento" | "investment" => Ok(FinancialGoalType::Investment),
            "outro" | "other" => Ok(FinancialGoalType::Other),
            _ => Err(()),
        }
    }
}

/// Kinds of assets tracked as net worth
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AssetType {
    Investment,
    RealEstate,
    Vehicle,
    Other,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Investment => "investimento",
            AssetType::RealEstate => "imovel",
            AssetType::Vehicle => "veiculo",
            AssetType::Other => "outro",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AssetType::Investment => "Investimento",
            AssetType::RealEstate => "Imóvel",
            AssetType::Vehicle => "Veículo",
            AssetType::Other => "Outro",
        }
    }
}

impl FromStr for AssetType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match crate::utils::fold_text(s.trim()).as_str() {
            "investimento" | "investment" => Ok(AssetType::Investment),
            "imovel" | "real-estate" | "property" => Ok(AssetType::RealEstate),
            "veiculo" | "vehicle" | "carro" => Ok(AssetType::Vehicle),
            "outro" | "other" => Ok(AssetType::Other),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FinancingStatus {
    PaidOff,
    Financing,
}

impl FinancingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinancingStatus::PaidOff => "quitado",
            FinancingStatus::Financing => "financiando",
        }
    }
}

impl FromStr for FinancingStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quitado" | "paid" => Ok(FinancingStatus::PaidOff),
            "financiando" | "financing" => Ok(FinancingStatus::Financing),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

impl FromStr for ChatRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(ChatRole::User),
            "assistant" => Ok(ChatRole::Assistant),
            _ => Err(()),
        }
    }
}

/// Bank account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Option<i64>,
    pub name: String,
    pub bank: Option<String>,
    pub balance: Decimal,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Option<i64>,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub kind: CategoryKind,
    pub is_default: bool,
}

/// A financial month (one per calendar month)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialMonth {
    pub id: i64,
    pub year: i32,
    pub month: u32,
    pub status: MonthStatus,
    pub opening_balance: Decimal,
    pub closing_balance: Option<Decimal>,
    pub total_income: Option<Decimal>,
    pub total_fixed: Option<Decimal>,
    pub total_daily: Option<Decimal>,
}

/// Ledger transaction. `amount` is always positive; `kind` gives the direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Option<i64>,
    pub month_id: Option<i64>,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub description: String,
    pub date: NaiveDate,
    pub category_id: Option<i64>,
    pub account_id: Option<i64>,
    pub card_id: Option<i64>,
    pub source: String,
    pub fingerprint: Option<String>,
    /// Filled by listing queries, never written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
}

impl Transaction {
    pub fn new(kind: TransactionKind, amount: Decimal, description: &str, date: NaiveDate) -> Self {
        Self {
            id: None,
            month_id: None,
            kind,
            amount,
            description: description.to_string(),
            date,
            category_id: None,
            account_id: None,
            card_id: None,
            source: "manual".to_string(),
            fingerprint: None,
            category_name: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: Option<i64>,
    pub name: String,
    pub card_type: CardType,
    pub credit_limit: Option<Decimal>,
    pub closing_day: Option<u32>,
    pub due_day: Option<u32>,
    pub account_id: Option<i64>,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub card_id: i64,
    pub reference_month: String,
    pub paid: bool,
    pub paid_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallmentPurchase {
    pub id: Option<i64>,
    pub description: String,
    pub total_amount: Decimal,
    pub installment_count: u32,
    pub first_due_date: NaiveDate,
    pub card_id: Option<i64>,
    pub category_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Installment {
    pub id: Option<i64>,
    pub purchase_id: i64,
    pub number: u32,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub paid: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyGoal {
    pub id: Option<i64>,
    pub month_ref: String,
    pub goal_type: MonthlyGoalType,
    pub target: Decimal,
    pub category_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialGoal {
    pub id: Option<i64>,
    pub name: String,
    pub goal_type: FinancialGoalType,
    pub target: Decimal,
    pub current: Decimal,
    pub deadline: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalContribution {
    pub id: i64,
    pub goal_id: i64,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub note: Option<String>,
}

/// Saved compound-interest simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    pub id: Option<i64>,
    pub name: String,
    pub initial_amount: Decimal,
    pub monthly_contribution: Decimal,
    pub monthly_rate: Decimal,
    pub months: u32,
    pub final_amount: Decimal,
    pub created_at: Option<String>,
}

/// Saved projection; parameters and result are kept as JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedProjection {
    pub id: i64,
    pub name: String,
    pub projection_type: String,
    pub parameters: serde_json::Value,
    pub result: serde_json::Value,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub role: ChatRole,
    pub content: String,
    pub created_at: Option<String>,
}


/// Something owned: an investment, property or vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: Option<i64>,
    pub name: String,
    pub asset_type: AssetType,
    pub initial_value: Decimal,
    pub current_value: Decimal,
    /// Yearly yield in percent, investments only
    pub yield_rate: Decimal,
    pub description: Option<String>,
    pub financing_status: FinancingStatus,
    /// Share already paid, 0..=100; always 100 when paid off
    pub paid_pct: Decimal,
}

impl Asset {
    pub fn new(name: &str, asset_type: AssetType, initial_value: Decimal, current_value: Decimal) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            asset_type,
            initial_value,
            current_value,
            yield_rate: Decimal::ZERO,
            description: None,
            financing_status: FinancingStatus::PaidOff,
            paid_pct: Decimal::ONE_HUNDRED,
        }
    }

    pub fn profit(&self) -> Decimal {
        self.current_value - self.initial_value
    }
}
