use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{self, Read};

use super::print_json;
use crate::cli::ConfigCommands;
use financetrack::config::{config_path, AppConfig};
use financetrack::contextual::{ContextualAction, ContextualDetector};
use financetrack::deep_links::resolve_deep_link;

pub fn dispatch_clip(text: Option<String>, json_output: bool) -> Result<()> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("Failed to read stdin")?;
            buf
        }
    };

    let mut detector = ContextualDetector::new();
    let action = detector.observe_clipboard(&text);

    if json_output {
        let link = action.as_ref().map(ContextualAction::deep_link);
        return print_json(&serde_json::json!({ "action": action, "deep_link": link }));
    }

    match action {
        Some(action) => {
            if let ContextualAction::Barcode(code) = &action {
                println!("{} {} detectado", "✓".green().bold(), code.kind.label().bold());
                println!("  {}", code.code.bright_black());
            }
            println!("\n{} {}", "💡".yellow(), action.title());
            let link = action.deep_link();
            println!("   {}", link.cyan());
            if let Ok(target) = resolve_deep_link(&link) {
                println!("   financetrack {}", target.cli_hint());
            }
        }
        None => println!("{} Nenhum boleto ou código PIX encontrado", "ℹ".blue().bold()),
    }
    Ok(())
}

pub fn dispatch_link(url: &str, json_output: bool) -> Result<()> {
    let target = resolve_deep_link(url)?;
    if json_output {
        return print_json(&serde_json::json!({ "target": target, "command": target.cli_hint() }));
    }
    println!("financetrack {}", target.cli_hint());
    Ok(())
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

pub fn dispatch_config(action: ConfigCommands, json_output: bool) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let mut config = AppConfig::load()?;
            config.assistant.api_key = config.api_key().map(|k| mask_key(&k));
            if json_output {
                return print_json(&config);
            }
            print!("{}", toml::to_string_pretty(&config).context("Failed to serialize config")?);
            Ok(())
        }
        ConfigCommands::Path => {
            let path = config_path()?;
            if json_output {
                return print_json(&serde_json::json!({ "path": path }));
            }
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommands::SetKey { key } => {
            let mut config = AppConfig::load()?;
            config.assistant.api_key = Some(key.trim().to_string());
            let path = config.save()?;
            if json_output {
                return print_json(&serde_json::json!({ "saved": path }));
            }
            println!("{} Chave salva em {}", "✓".green().bold(), path.display());
            Ok(())
        }
    }
}
