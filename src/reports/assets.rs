use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::{self, Asset, AssetType, FinancingStatus};
use crate::utils::percent_of;

#[derive(Debug, Clone, Serialize)]
pub struct AssetTypeTotal {
    pub asset_type: AssetType,
    pub count: usize,
    pub current_value: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetSummary {
    pub assets: Vec<Asset>,
    pub total_invested: Decimal,
    pub current_total: Decimal,
    pub profit: Decimal,
    /// `None` when nothing was invested
    pub return_pct: Option<Decimal>,
    /// Current value weighted by the share already paid
    pub owned_value: Decimal,
    pub financing_count: usize,
    pub by_type: Vec<AssetTypeTotal>,
}

/// Totals over a set of assets. Types appear in first-seen order.
pub fn summarize_assets(assets: Vec<Asset>) -> AssetSummary {
    let total_invested: Decimal = assets.iter().map(|a| a.initial_value).sum();
    let current_total: Decimal = assets.iter().map(|a| a.current_value).sum();
    let profit = current_total - total_invested;
    let owned_value = assets
        .iter()
        .map(|a| (a.current_value * a.paid_pct / Decimal::ONE_HUNDRED).round_dp(2))
        .sum();

    let mut by_type: Vec<AssetTypeTotal> = Vec::new();
    for asset in &assets {
        match by_type.iter_mut().find(|t| t.asset_type == asset.asset_type) {
            Some(total) => {
                total.count += 1;
                total.current_value += asset.current_value;
            }
            None => by_type.push(AssetTypeTotal {
                asset_type: asset.asset_type,
                count: 1,
                current_value: asset.current_value,
            }),
        }
    }

    AssetSummary {
        financing_count: assets
            .iter()
            .filter(|a| a.financing_status == FinancingStatus::Financing)
            .count(),
        return_pct: percent_of(profit, total_invested).map(|p| p.round_dp(2)),
        total_invested,
        current_total,
        profit,
        owned_value,
        by_type,
        assets,
    }
}

pub fn asset_summary(conn: &Connection) -> Result<AssetSummary> {
    Ok(summarize_assets(db::list_assets(conn)?))
}
