// Statement analysis - category classification and spending insights

pub mod classifier;
pub mod statement;

pub use classifier::{Classification, KeywordClassifier, FALLBACK_CATEGORY, UNCLASSIFIED_CATEGORY};
pub use statement::{
    analyze_statement, classify_entries, BehaviorProfile, ClassifiedEntry, LargeExpense,
    StatementAnalysis,
};
