//! Assets (net worth): investments, property and vehicles.
//! Removing an asset only deactivates it.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use tracing::info;

use super::models::{Asset, FinancingStatus};
use super::{get_decimal_value, parse_enum};
use crate::error::{invalid, FinanceError};

const ASSET_COLUMNS: &str = "id, name, asset_type, initial_value, current_value, yield_rate,
     description, financing_status, paid_pct";

fn validate(asset: &Asset) -> Result<()> {
    if asset.name.trim().is_empty() {
        return Err(invalid("asset name cannot be empty"));
    }
    if asset.initial_value < Decimal::ZERO || asset.current_value < Decimal::ZERO {
        return Err(invalid("asset values cannot be negative"));
    }
    if asset.paid_pct < Decimal::ZERO || asset.paid_pct > Decimal::ONE_HUNDRED {
        return Err(invalid(format!("paid share must be between 0 and 100, got {}", asset.paid_pct)));
    }
    Ok(())
}

pub fn insert_asset(conn: &Connection, asset: &Asset) -> Result<i64> {
    validate(asset)?;
    let paid_pct = match asset.financing_status {
        FinancingStatus::PaidOff => Decimal::ONE_HUNDRED,
        FinancingStatus::Financing => asset.paid_pct,
    };
    conn.execute(
        "INSERT INTO assets (name, asset_type, initial_value, current_value, yield_rate,
                             description, financing_status, paid_pct)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            asset.name.trim(),
            asset.asset_type.as_str(),
            asset.initial_value.to_string(),
            asset.current_value.to_string(),
            asset.yield_rate.to_string(),
            asset.description,
            asset.financing_status.as_str(),
            paid_pct.to_string(),
        ],
    )
    .with_context(|| format!("Failed to create asset '{}'", asset.name))?;
    info!("Added asset '{}' ({})", asset.name, asset.asset_type.as_str());
    Ok(conn.last_insert_rowid())
}

fn asset_from_row(row: &Row) -> Result<Asset, rusqlite::Error> {
    let asset_type: String = row.get(2)?;
    let status: String = row.get(7)?;
    Ok(Asset {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        asset_type: parse_enum(&asset_type, 2)?,
        initial_value: get_decimal_value(row, 3)?,
        current_value: get_decimal_value(row, 4)?,
        yield_rate: get_decimal_value(row, 5)?,
        description: row.get(6)?,
        financing_status: parse_enum(&status, 7)?,
        paid_pct: get_decimal_value(row, 8)?,
    })
}

/// Active assets, newest first
pub fn list_assets(conn: &Connection) -> Result<Vec<Asset>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM assets WHERE active = 1 ORDER BY id DESC",
        ASSET_COLUMNS
    ))?;
    let assets = stmt
        .query_map([], asset_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(assets)
}

pub fn get_asset(conn: &Connection, id: i64) -> Result<Option<Asset>> {
    Ok(conn
        .query_row(
            &format!("SELECT {} FROM assets WHERE id = ?1 AND active = 1", ASSET_COLUMNS),
            params![id],
            asset_from_row,
        )
        .optional()?)
}

/// Revalue an asset and, optionally, record how much of it is paid
pub fn update_asset_value(
    conn: &Connection,
    id: i64,
    current_value: Decimal,
    paid_pct: Option<Decimal>,
) -> Result<Asset> {
    let mut asset = get_asset(conn, id)?.ok_or_else(|| FinanceError::NotFound(format!("asset {}", id)))?;
    asset.current_value = current_value;
    if let Some(pct) = paid_pct {
        asset.paid_pct = pct;
        asset.financing_status = if pct >= Decimal::ONE_HUNDRED {
            FinancingStatus::PaidOff
        } else {
            FinancingStatus::Financing
        };
    }
    validate(&asset)?;

    conn.execute(
        "UPDATE assets SET current_value = ?1, paid_pct = ?2, financing_status = ?3 WHERE id = ?4",
        params![
            asset.current_value.to_string(),
            asset.paid_pct.to_string(),
            asset.financing_status.as_str(),
            id
        ],
    )?;
    Ok(asset)
}

pub fn soft_delete_asset(conn: &Connection, id: i64) -> Result<bool> {
    Ok(conn.execute("UPDATE assets SET active = 0 WHERE id = ?1 AND active = 1", params![id])? > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{apply_schema, AssetType};
    use rust_decimal_macros::dec;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("PRAGMA foreign_keys = ON", []).unwrap();
        apply_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_paid_off_assets_store_full_share() {
        let conn = memory_db();
        let mut car = Asset::new("Carro", AssetType::Vehicle, dec!(60000), dec!(52000));
        car.paid_pct = dec!(40);
        let id = insert_asset(&conn, &car).unwrap();

        let stored = get_asset(&conn, id).unwrap().unwrap();
        assert_eq!(stored.financing_status, FinancingStatus::PaidOff);
        assert_eq!(stored.paid_pct, dec!(100));
        assert_eq!(stored.profit(), dec!(-8000));
    }

    #[test]
    fn test_validation() {
        let conn = memory_db();
        assert!(insert_asset(&conn, &Asset::new("  ", AssetType::Other, dec!(1), dec!(1))).is_err());
        assert!(insert_asset(&conn, &Asset::new("X", AssetType::Other, dec!(-1), dec!(1))).is_err());

        let mut house = Asset::new("Apartamento", AssetType::RealEstate, dec!(400000), dec!(450000));
        house.financing_status = FinancingStatus::Financing;
        house.paid_pct = dec!(130);
        assert!(insert_asset(&conn, &house).is_err());
    }

    #[test]
    fn test_soft_delete_hides_asset() {
        let conn = memory_db();
        let id = insert_asset(&conn, &Asset::new("CDB", AssetType::Investment, dec!(1000), dec!(1100))).unwrap();
        insert_asset(&conn, &Asset::new("Tesouro", AssetType::Investment, dec!(500), dec!(520))).unwrap();

        assert!(soft_delete_asset(&conn, id).unwrap());
        assert!(!soft_delete_asset(&conn, id).unwrap());
        let names: Vec<_> = list_assets(&conn).unwrap().into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["Tesouro"]);
        assert!(get_asset(&conn, id).unwrap().is_none());
    }

    #[test]
    fn test_update_value_and_financing() {
        let conn = memory_db();
        let mut house = Asset::new("Apartamento", AssetType::RealEstate, dec!(400000), dec!(400000));
        house.financing_status = FinancingStatus::Financing;
        house.paid_pct = dec!(30);
        let id = insert_asset(&conn, &house).unwrap();

        let updated = update_asset_value(&conn, id, dec!(420000), Some(dec!(35))).unwrap();
        assert_eq!(updated.current_value, dec!(420000));
        assert_eq!(updated.financing_status, FinancingStatus::Financing);

        let paid = update_asset_value(&conn, id, dec!(420000), Some(dec!(100))).unwrap();
        assert_eq!(paid.financing_status, FinancingStatus::PaidOff);

        assert!(update_asset_value(&conn, 999, dec!(1), None).is_err());
    }
}
