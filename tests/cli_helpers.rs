#![allow(dead_code)]

use anyhow::{bail, Result};
use assert_cmd::cargo;
use rust_decimal::Decimal;
use serde_json::Value;
use std::process::{Command, Output};
use std::str::FromStr;
use tempfile::TempDir;

/// Command with HOME and the config file isolated inside `home`
pub fn base_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("financetrack"));
    cmd.env("HOME", home.path());
    cmd.env("FINANCETRACK_CONFIG", home.path().join("config.toml"));
    cmd.env_remove("OPENAI_API_KEY");
    cmd.env_remove("RUST_LOG");
    cmd.arg("--no-color");
    cmd
}

pub fn run_cmd(home: &TempDir, args: &[&str]) -> Result<Output> {
    let mut cmd = base_cmd(home);
    cmd.args(args);
    let output = cmd.output()?;
    if !output.status.success() {
        bail!(
            "command failed: {:?}\nstdout: {}\nstderr: {}",
            args,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output)
}

pub fn run_cmd_json(home: &TempDir, args: &[&str]) -> Result<Value> {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    let output = run_cmd(home, &full)?;
    let stdout = String::from_utf8(output.stdout)?;
    Ok(serde_json::from_str(&stdout)?)
}

/// Decimal field of a JSON object, serialized as a string
pub fn decimal_at(value: &Value, pointer: &str) -> Decimal {
    let raw = value
        .pointer(pointer)
        .unwrap_or_else(|| panic!("missing {} in {}", pointer, value));
    let text = match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    Decimal::from_str(&text).unwrap_or_else(|_| panic!("not a decimal at {}: {}", pointer, raw))
}

pub fn add_transaction(
    home: &TempDir,
    kind: &str,
    amount: &str,
    description: &str,
    date: &str,
    category: Option<&str>,
) -> Result<Value> {
    let mut args = vec!["transactions", "add", kind, amount, description, "--date", date];
    if let Some(category) = category {
        args.extend_from_slice(&["--category", category]);
    }
    run_cmd_json(home, &args)
}
