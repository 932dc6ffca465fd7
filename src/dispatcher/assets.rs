use anyhow::Result;
use colored::Colorize;
use tracing::info;

use super::{open_store, parse_choice, parse_money, parse_optional_money, print_json};
use crate::cli::formatters::{format_asset_summary, format_assets_table, format_empty};
use crate::cli::AssetCommands;
use financetrack::db::{self, Asset, AssetType, FinancingStatus};
use financetrack::error::FinanceError;
use financetrack::reports::asset_summary;
use financetrack::utils::format_currency;

const ASSET_TYPES: &str = "investimento, imovel, veiculo or outro";

pub fn dispatch_assets(action: AssetCommands, json_output: bool) -> Result<()> {
    let (_, conn) = open_store()?;
    match action {
        AssetCommands::Add {
            name,
            initial,
            current,
            asset_type,
            rate,
            financing,
            description,
        } => {
            let initial = parse_money(&initial, "amount invested")?;
            let current = parse_optional_money(current.as_deref(), "current value")?.unwrap_or(initial);
            let mut asset = Asset::new(
                &name,
                parse_choice::<AssetType>(&asset_type, "asset type", ASSET_TYPES)?,
                initial,
                current,
            );
            asset.yield_rate = parse_money(&rate, "yield rate")?;
            asset.description = description;
            if let Some(paid) = parse_optional_money(financing.as_deref(), "paid share")? {
                asset.financing_status = FinancingStatus::Financing;
                asset.paid_pct = paid;
            }

            info!("Adding asset {}", asset.name);
            let id = db::insert_asset(&conn, &asset)?;
            asset.id = Some(id);
            if json_output {
                return print_json(&asset);
            }
            println!(
                "{} Ativo #{} adicionado: {} ({}, {})",
                "✓".green().bold(),
                id,
                asset.name,
                asset.asset_type.label(),
                format_currency(asset.current_value)
            );
            Ok(())
        }
        AssetCommands::List => {
            let assets = db::list_assets(&conn)?;
            if json_output {
                return print_json(&assets);
            }
            if assets.is_empty() {
                print!("{}", format_empty("Nenhum ativo cadastrado"));
                return Ok(());
            }
            println!("{}", format_assets_table(&assets));
            Ok(())
        }
        AssetCommands::Update { id, current, paid } => {
            let current = parse_money(&current, "current value")?;
            let paid = parse_optional_money(paid.as_deref(), "paid share")?;
            let asset = db::update_asset_value(&conn, id, current, paid)?;
            if json_output {
                return print_json(&asset);
            }
            println!(
                "{} {} agora vale {}",
                "✓".green().bold(),
                asset.name,
                format_currency(asset.current_value).bold()
            );
            Ok(())
        }
        AssetCommands::Delete { id } => {
            if !db::soft_delete_asset(&conn, id)? {
                return Err(FinanceError::NotFound(format!("asset {}", id)).into());
            }
            if json_output {
                return print_json(&serde_json::json!({ "deleted": id }));
            }
            println!("{} Ativo #{} removido", "✓".green().bold(), id);
            Ok(())
        }
        AssetCommands::Summary => {
            let summary = asset_summary(&conn)?;
            if json_output {
                return print_json(&summary);
            }
            if summary.assets.is_empty() {
                print!("{}", format_empty("Nenhum ativo cadastrado"));
                return Ok(());
            }
            print!("{}", format_asset_summary(&summary));
            Ok(())
        }
    }
}
