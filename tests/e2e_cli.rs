mod cli_helpers;

use assert_cmd::prelude::*;
use cli_helpers::{add_transaction, base_cmd, decimal_at, run_cmd_json};
use predicates::prelude::*;
use rust_decimal_macros::dec;
use tempfile::TempDir;

fn setup_temp_home() -> TempDir {
    TempDir::new().expect("failed to create temp home")
}

#[test]
fn init_creates_database_in_home() {
    let home = setup_temp_home();
    let db_path = home.path().join(".financetrack").join("data.db");
    assert!(!db_path.exists(), "db should start absent");

    base_cmd(&home)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Database ready"))
        .stdout(predicate::str::contains("\u{001b}[").not());

    assert!(db_path.exists());
}

#[test]
fn categories_are_seeded() {
    let home = setup_temp_home();
    let categories = run_cmd_json(&home, &["categories", "list"]).unwrap();
    let names: Vec<&str> = categories
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert!(names.contains(&"Alimentação"));
    assert!(names.contains(&"Moradia"));
}

#[test]
fn transactions_add_list_and_summary() {
    let home = setup_temp_home();
    add_transaction(&home, "entrada", "4.500,00", "Salário", "01/03/2025", None).unwrap();
    add_transaction(&home, "saida_fixa", "1500", "Aluguel", "2025-03-05", Some("Moradia")).unwrap();
    let added = add_transaction(&home, "diario", "42,90", "Padaria", "2025-03-07", Some("Alimentação")).unwrap();
    assert_eq!(decimal_at(&added, "/amount"), dec!(42.90));

    let listed = run_cmd_json(&home, &["transactions", "list", "--month", "2025-03"]).unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 3);

    let summary = run_cmd_json(&home, &["summary", "month", "2025-03"]).unwrap();
    assert_eq!(decimal_at(&summary, "/totals/income"), dec!(4500));
    assert_eq!(decimal_at(&summary, "/expenses"), dec!(1542.90));
    assert_eq!(decimal_at(&summary, "/balance"), dec!(2957.10));
}

#[test]
fn invalid_kind_is_rejected() {
    let home = setup_temp_home();
    base_cmd(&home)
        .args(["transactions", "add", "gasto", "10", "Teste"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid transaction kind"));
}

#[test]
fn missing_transaction_is_not_found() {
    let home = setup_temp_home();
    base_cmd(&home)
        .args(["transactions", "show", "999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn import_dry_run_does_not_save() {
    let home = setup_temp_home();
    let result = run_cmd_json(&home, &["import", "tests/data/extrato_marco.csv", "--dry-run"]).unwrap();
    assert_eq!(result["summary"]["inserted"], 4);

    let listed = run_cmd_json(&home, &["transactions", "list"]).unwrap();
    assert!(listed.as_array().unwrap().is_empty());
}

#[test]
fn import_twice_counts_duplicates() {
    let home = setup_temp_home();
    let first = run_cmd_json(&home, &["import", "tests/data/extrato_nubank.ofx"]).unwrap();
    assert_eq!(first["summary"]["inserted"], 3);

    let second = run_cmd_json(&home, &["import", "tests/data/extrato_nubank.ofx"]).unwrap();
    assert_eq!(second["summary"]["inserted"], 0);
    assert_eq!(second["summary"]["duplicates"], 3);
}

#[test]
fn analyze_prints_insights() {
    let home = setup_temp_home();
    base_cmd(&home)
        .args(["analyze", "tests/data/extrato_marco.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Moradia"));
}

#[test]
fn calc_interest_json() {
    let home = setup_temp_home();
    let result = run_cmd_json(&home, &["calc", "interest", "1000", "0", "1", "12"]).unwrap();
    let final_amount = decimal_at(&result, "/result/final_amount");
    assert!(final_amount > dec!(1126.82) && final_amount < dec!(1126.83));
    assert!(result["saved_id"].is_null());
}

#[test]
fn emergency_plan_with_explicit_values() {
    let home = setup_temp_home();
    let result = run_cmd_json(
        &home,
        &["emergency", "--balance", "6000", "--monthly-cost", "3000", "--contribution", "1000"],
    )
    .unwrap();
    assert_eq!(decimal_at(&result, "/plan/goal"), dec!(18000));
    assert_eq!(result["plan"]["months_to_goal"], 12);
    assert_eq!(result["thermometer"]["percent"], 33);
}

#[test]
fn clip_detects_boleto() {
    let home = setup_temp_home();
    base_cmd(&home)
        .args(["clip", "23793381286000000000300000000400184340000012345"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deseja pagar o boleto copiado?"))
        .stdout(predicate::str::contains("transactions add saida_fixa"));
}

#[test]
fn clip_reads_stdin() {
    let home = setup_temp_home();
    let mut cmd = assert_cmd::Command::from_std(base_cmd(&home));
    cmd.arg("clip")
        .write_stdin("só um texto qualquer")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nenhum boleto"));
}

#[test]
fn link_resolves_to_command() {
    let home = setup_temp_home();
    base_cmd(&home)
        .args(["link", "/cards/3/faturas/2025-03/pagar"])
        .assert()
        .success()
        .stdout(predicate::str::contains("financetrack invoices pay 3 2025-03"));
}

#[test]
fn chat_without_key_explains_manual_mode() {
    let home = setup_temp_home();
    base_cmd(&home)
        .args(["chat", "gastei", "50", "no", "mercado"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config set-key"));
}

#[test]
fn config_set_key_is_masked_on_show() {
    let home = setup_temp_home();
    base_cmd(&home)
        .args(["config", "set-key", "sk-test-1234567890"])
        .assert()
        .success();
    assert!(home.path().join("config.toml").exists());

    base_cmd(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sk-t…7890"))
        .stdout(predicate::str::contains("1234567890").not());
}

#[test]
fn assets_add_summary_and_delete() {
    let home = setup_temp_home();
    let added = run_cmd_json(&home, &["assets", "add", "Tesouro Selic", "10000", "10800", "--rate", "10,5"]).unwrap();
    let id = added["id"].as_i64().unwrap();
    run_cmd_json(&home, &["assets", "add", "Carro", "60000", "48000", "--type", "veiculo", "--financing", "50"]).unwrap();

    let summary = run_cmd_json(&home, &["assets", "summary"]).unwrap();
    assert_eq!(decimal_at(&summary, "/current_total"), dec!(58800));
    assert_eq!(decimal_at(&summary, "/profit"), dec!(-11200));
    assert_eq!(summary["financing_count"], 1);

    run_cmd_json(&home, &["assets", "delete", &id.to_string()]).unwrap();
    let listed = run_cmd_json(&home, &["assets", "list"]).unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    base_cmd(&home)
        .args(["assets", "add", "Barco", "1000", "--type", "navio"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid asset type"));
}

#[test]
fn calc_interest_rejects_values_too_large() {
    let home = setup_temp_home();
    base_cmd(&home)
        .args(["calc", "interest", "1000000", "1000", "10", "600"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("grande demais"));

    base_cmd(&home)
        .args(["project", "property", "500000", "0", "1200", "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("grande demais"));

    base_cmd(&home)
        .args(["calc", "needed", "1000000", "0", "10", "5000"])
        .assert()
        .failure();
}

#[test]
fn summary_navigates_weeks_and_months() {
    let home = setup_temp_home();
    add_transaction(&home, "diario", "30", "Feira", "2025-01-06", None).unwrap();
    add_transaction(&home, "diario", "45", "Mercado", "2025-01-14", None).unwrap();
    add_transaction(&home, "diario", "80", "Farmácia", "2024-12-20", None).unwrap();

    let week = run_cmd_json(&home, &["summary", "period", "--period", "semana", "--date", "2025-01-15", "--offset", "-1"])
        .unwrap();
    assert_eq!(week["label"], "06/01 - 12/01");
    assert_eq!(week["is_current"], false);
    assert_eq!(decimal_at(&week, "/expenses"), dec!(30));

    let december = run_cmd_json(&home, &["summary", "month", "2025-01", "--offset", "-1"]).unwrap();
    assert_eq!(december["month"], 12);
    assert_eq!(decimal_at(&december, "/expenses"), dec!(80));

    base_cmd(&home)
        .args(["summary", "period", "--period", "quinzena"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid period"));
}
