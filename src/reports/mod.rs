// Reports module - monthly/annual/period summaries, card statements, goal progress and net worth

pub mod annual;
pub mod assets;
pub mod cards;
pub mod goals;
pub mod monthly;
pub mod period;

pub use annual::{annual_summary, AnnualSummary, MonthRow};
pub use assets::{asset_summary, summarize_assets, AssetSummary, AssetTypeTotal};
pub use cards::{card_statement, invoice_due_date, invoice_period, invoice_reference, CardStatement};
pub use goals::{
    all_financial_goal_progress, financial_goal_progress, monthly_goal_progress, FinancialGoalProgress,
    GoalStatus, MonthlyGoalProgress,
};
pub use monthly::{change_pct, monthly_summary, CategoryShare, MonthComparison, MonthlySummary};
pub use period::{period_summary, PeriodSummary};
