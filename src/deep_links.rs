//! Deep links: app-relative URLs that point straight at one action
//! (pay an invoice, add a transaction with pre-filled fields, ...).

use anyhow::{anyhow, Result};
use reqwest::Url;
use serde::Serialize;
use std::collections::BTreeMap;

const BASE: &str = "app://financetrack/";

/// Path plus form-encoded query built from the pairs that are set
fn with_query(path: &str, pairs: &[(&str, Option<String>)]) -> String {
    let mut url = match Url::parse(BASE).and_then(|base| base.join(path.trim_start_matches('/'))) {
        Ok(url) => url,
        Err(_) => return path.to_string(),
    };
    {
        let mut query = url.query_pairs_mut();
        for (key, value) in pairs {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                query.append_pair(key, value);
            }
        }
    }
    match url.query() {
        Some(q) if !q.is_empty() => format!("{}?{}", path, q),
        _ => path.to_string(),
    }
}

pub fn pay_invoice_link(card_id: i64, invoice: &str) -> String {
    format!("/cards/{}/faturas/{}/pagar", card_id, invoice)
}

pub fn install_invoice_link(card_id: i64, invoice: &str) -> String {
    format!("/cards/{}/faturas/{}/parcelar", card_id, invoice)
}

pub fn invoice_details_link(card_id: i64, invoice: &str) -> String {
    format!("/cards/{}/faturas/{}", card_id, invoice)
}

pub fn installment_details_link(purchase_id: i64) -> String {
    format!("/installments/{}", purchase_id)
}

pub fn edit_transaction_link(transaction_id: i64) -> String {
    format!("/transactions/{}/edit", transaction_id)
}

pub fn card_details_link(card_id: i64) -> String {
    format!("/cards/{}", card_id)
}

/// Invoice-closed notifications lead to the payment screen
pub fn invoice_closed_link(card_id: i64, invoice: &str) -> String {
    pay_invoice_link(card_id, invoice)
}

/// Pre-filled fields for a new transaction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewTransactionParams {
    /// `entrada`, `saida_fixa`, `diario` or `barcode`
    pub kind: Option<String>,
    pub card_id: Option<i64>,
    pub category_id: Option<i64>,
    pub account_id: Option<i64>,
    /// Copied boleto/PIX code
    pub code: Option<String>,
}

pub fn new_transaction_link(params: &NewTransactionParams) -> String {
    with_query(
        "/transactions/new",
        &[
            ("type", params.kind.clone()),
            ("cardId", params.card_id.map(|v| v.to_string())),
            ("categoryId", params.category_id.map(|v| v.to_string())),
            ("accountId", params.account_id.map(|v| v.to_string())),
            ("code", params.code.clone()),
        ],
    )
}

pub fn new_monthly_goal_link(category_id: Option<i64>, goal_type: Option<&str>) -> String {
    with_query(
        "/monthly-goals/new",
        &[
            ("categoryId", category_id.map(|v| v.to_string())),
            ("tipo", goal_type.map(str::to_string)),
        ],
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedDeepLink {
    pub path: String,
    pub params: BTreeMap<String, String>,
}

/// Split a link into path and decoded query parameters. Relative links are
/// resolved against the app base; unparseable input comes back as the path.
pub fn parse_deep_link(link: &str) -> ParsedDeepLink {
    let parsed = Url::parse(BASE).and_then(|base| base.join(link.trim()));
    match parsed {
        Ok(url) => ParsedDeepLink {
            path: url.path().to_string(),
            params: url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect(),
        },
        Err(_) => ParsedDeepLink {
            path: link.to_string(),
            params: BTreeMap::new(),
        },
    }
}

pub fn is_valid_deep_link(link: &str) -> bool {
    ["/cards/", "/transactions/", "/installments/", "/monthly-goals/"]
        .iter()
        .any(|prefix| link.contains(prefix))
}

/// What a deep link points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum DeepLinkTarget {
    PayInvoice { card_id: i64, invoice: String },
    InstallInvoice { card_id: i64, invoice: String },
    InvoiceDetails { card_id: i64, invoice: String },
    CardDetails { card_id: i64 },
    NewTransaction(NewTransactionParams),
    EditTransaction { transaction_id: i64 },
    InstallmentDetails { purchase_id: i64 },
    NewMonthlyGoal { category_id: Option<i64>, goal_type: Option<String> },
}

impl DeepLinkTarget {
    /// CLI command that performs the same action
    pub fn cli_hint(&self) -> String {
        match self {
            DeepLinkTarget::PayInvoice { card_id, invoice } => {
                format!("invoices pay {} {}", card_id, invoice)
            }
            DeepLinkTarget::InstallInvoice { card_id, .. } => {
                format!("installments add --card {} <descrição> <valor> <parcelas>", card_id)
            }
            DeepLinkTarget::InvoiceDetails { card_id, invoice } => {
                format!("cards invoice {} --month {}", card_id, invoice)
            }
            DeepLinkTarget::CardDetails { card_id } => format!("cards invoice {}", card_id),
            DeepLinkTarget::NewTransaction(params) => {
                let kind = match params.kind.as_deref() {
                    Some("entrada") => "entrada",
                    Some("saida_fixa") | Some("barcode") => "saida_fixa",
                    _ => "diario",
                };
                format!("transactions add {} <valor> <descrição>", kind)
            }
            DeepLinkTarget::EditTransaction { transaction_id } => {
                format!("transactions show {}", transaction_id)
            }
            DeepLinkTarget::InstallmentDetails { purchase_id } => {
                format!("installments show {}", purchase_id)
            }
            DeepLinkTarget::NewMonthlyGoal { .. } => "goals monthly add".to_string(),
        }
    }
}

fn id_segment(segment: &str) -> Result<i64> {
    segment
        .parse()
        .map_err(|_| anyhow!("invalid id {:?} in deep link", segment))
}

fn param_id(params: &BTreeMap<String, String>, key: &str) -> Result<Option<i64>> {
    params.get(key).map(|v| id_segment(v)).transpose()
}

pub fn resolve_deep_link(link: &str) -> Result<DeepLinkTarget> {
    let parsed = parse_deep_link(link);
    let segments: Vec<&str> = parsed.path.split('/').filter(|s| !s.is_empty()).collect();

    let target = match segments.as_slice() {
        ["cards", card, "faturas", invoice, "pagar"] => DeepLinkTarget::PayInvoice {
            card_id: id_segment(card)?,
            invoice: invoice.to_string(),
        },
        ["cards", card, "faturas", invoice, "parcelar"] => DeepLinkTarget::InstallInvoice {
            card_id: id_segment(card)?,
            invoice: invoice.to_string(),
        },
        ["cards", card, "faturas", invoice] => DeepLinkTarget::InvoiceDetails {
            card_id: id_segment(card)?,
            invoice: invoice.to_string(),
        },
        ["cards", card] => DeepLinkTarget::CardDetails {
            card_id: id_segment(card)?,
        },
        ["transactions", "new"] => DeepLinkTarget::NewTransaction(NewTransactionParams {
            kind: parsed.params.get("type").cloned(),
            card_id: param_id(&parsed.params, "cardId")?,
            category_id: param_id(&parsed.params, "categoryId")?,
            account_id: param_id(&parsed.params, "accountId")?,
            code: parsed.params.get("code").cloned(),
        }),
        ["transactions", id, "edit"] => DeepLinkTarget::EditTransaction {
            transaction_id: id_segment(id)?,
        },
        ["installments", id] => DeepLinkTarget::InstallmentDetails {
            purchase_id: id_segment(id)?,
        },
        ["monthly-goals", "new"] => DeepLinkTarget::NewMonthlyGoal {
            category_id: param_id(&parsed.params, "categoryId")?,
            goal_type: parsed.params.get("tipo").cloned(),
        },
        _ => return Err(anyhow!("unknown deep link: {}", link)),
    };
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_generators() {
        assert_eq!(pay_invoice_link(3, "2025-03"), "/cards/3/faturas/2025-03/pagar");
        assert_eq!(install_invoice_link(3, "7"), "/cards/3/faturas/7/parcelar");
        assert_eq!(invoice_details_link(3, "7"), "/cards/3/faturas/7");
        assert_eq!(installment_details_link(9), "/installments/9");
        assert_eq!(edit_transaction_link(12), "/transactions/12/edit");
        assert_eq!(card_details_link(4), "/cards/4");
        assert_eq!(invoice_closed_link(1, "2"), pay_invoice_link(1, "2"));
    }

    #[test]
    fn test_new_transaction_query() {
        assert_eq!(new_transaction_link(&NewTransactionParams::default()), "/transactions/new");

        let link = new_transaction_link(&NewTransactionParams {
            kind: Some("barcode".to_string()),
            card_id: Some(2),
            code: Some("0001 2".to_string()),
            ..Default::default()
        });
        assert_eq!(link, "/transactions/new?type=barcode&cardId=2&code=0001+2");
    }

    #[test]
    fn test_monthly_goal_link() {
        assert_eq!(new_monthly_goal_link(None, None), "/monthly-goals/new");
        assert_eq!(
            new_monthly_goal_link(Some(5), Some("gasto_maximo")),
            "/monthly-goals/new?categoryId=5&tipo=gasto_maximo"
        );
    }

    #[test]
    fn test_parse_decodes_params() {
        let parsed = parse_deep_link("/transactions/new?type=barcode&code=0001+2");
        assert_eq!(parsed.path, "/transactions/new");
        assert_eq!(parsed.params.get("code").map(String::as_str), Some("0001 2"));

        let absolute = parse_deep_link("https://example.com/cards/1?x=%C3%A9");
        assert_eq!(absolute.path, "/cards/1");
        assert_eq!(absolute.params["x"], "é");
    }

    #[test]
    fn test_validity() {
        assert!(is_valid_deep_link("/cards/1"));
        assert!(is_valid_deep_link("/monthly-goals/new"));
        assert!(!is_valid_deep_link("/dashboard"));
    }

    #[test]
    fn test_resolve_round_trip() {
        let link = new_transaction_link(&NewTransactionParams {
            kind: Some("diario".to_string()),
            category_id: Some(8),
            ..Default::default()
        });
        match resolve_deep_link(&link).unwrap() {
            DeepLinkTarget::NewTransaction(params) => {
                assert_eq!(params.kind.as_deref(), Some("diario"));
                assert_eq!(params.category_id, Some(8));
                assert_eq!(params.card_id, None);
            }
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(
            resolve_deep_link("/cards/3/faturas/2025-03/pagar").unwrap(),
            DeepLinkTarget::PayInvoice {
                card_id: 3,
                invoice: "2025-03".to_string()
            }
        );
        assert_eq!(
            resolve_deep_link("/cards/3/faturas/2025-03/pagar").unwrap().cli_hint(),
            "invoices pay 3 2025-03"
        );
    }

    #[test]
    fn test_resolve_rejects_unknown_and_bad_ids() {
        assert!(resolve_deep_link("/dashboard").is_err());
        assert!(resolve_deep_link("/cards/abc").is_err());
        assert!(resolve_deep_link("/transactions/new?cardId=x").is_err());
    }
}
