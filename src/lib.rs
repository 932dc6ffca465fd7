//! FinanceTrack - personal finance tracker for Brazilian users
//!
//! This library provides the ledger (accounts, transactions, cards, goals),
//! bank statement import (CSV, OFX, PDF), financial calculators, monthly and
//! annual reports, and the pieces behind the interactive surface: command
//! palette, deep links, clipboard payment code detection and the AI assistant.

pub mod analysis;
pub mod assistant;
pub mod calculators;
pub mod config;
pub mod contextual;
pub mod db;
pub mod deep_links;
pub mod error;
pub mod importers;
pub mod palette;
pub mod periods;
pub mod reports;
pub mod utils;
