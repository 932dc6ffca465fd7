// Assistant reply parsing
//
// The model is asked for JSON in one of two shapes: a transaction suggestion
// (tipo/categoria/valor/descricao/confianca/confirmacao) or a plain message
// ({"type": "message", "message": "..."}). Anything else is shown as text.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::db::TransactionKind;
use crate::importers::parse_amount;
use crate::utils::format_currency;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionSuggestion {
    pub kind: TransactionKind,
    pub category: String,
    pub amount: Decimal,
    pub description: String,
    pub confidence: u8,
    /// Question to show before saving ("Você quer registrar ...?")
    pub confirmation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum AssistantReply {
    Transaction(TransactionSuggestion),
    Message(String),
}

pub fn parse_reply(content: &str) -> AssistantReply {
    let trimmed = content.trim();
    let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(strip_code_fence(trimmed)) else {
        return AssistantReply::Message(trimmed.to_string());
    };

    if let Some(suggestion) = suggestion_from(&obj) {
        return AssistantReply::Transaction(suggestion);
    }

    let message = text_field(&obj, &["message", "mensagem", "resposta"])
        .unwrap_or_else(|| trimmed.to_string());
    AssistantReply::Message(message)
}

/// Models sometimes wrap JSON in ```json fences despite JSON mode
fn strip_code_fence(text: &str) -> &str {
    text.strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .and_then(|t| t.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(text)
}

fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn amount_field(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        Value::String(s) => parse_amount(s),
        _ => None,
    }
}

fn suggestion_from(obj: &Map<String, Value>) -> Option<TransactionSuggestion> {
    let kind = text_field(obj, &["tipo", "kind"])?.parse::<TransactionKind>().ok()?;
    let amount = obj.get("valor").or_else(|| obj.get("amount")).and_then(amount_field)?.abs();
    if amount.is_zero() {
        return None;
    }

    let category = text_field(obj, &["categoria", "category"]).unwrap_or_else(|| "Outro".to_string());
    let description = text_field(obj, &["descricao", "descrição", "description"])
        .unwrap_or_else(|| category.clone());
    let confidence = obj
        .get("confianca")
        .or_else(|| obj.get("confidence"))
        .and_then(Value::as_f64)
        .map(|c| c.round().clamp(0.0, 100.0) as u8)
        .unwrap_or(0);
    let confirmation = text_field(obj, &["confirmacao", "confirmação", "confirmation"])
        .unwrap_or_else(|| {
            format!("Você quer registrar {} em {}?", format_currency(amount), category)
        });

    Some(TransactionSuggestion {
        kind,
        category,
        amount,
        description,
        confidence,
        confirmation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_transaction_reply() {
        let content = r#"{"tipo":"diario","categoria":"Alimentação","valor":45.9,
            "descricao":"almoço","confianca":92,"confirmacao":"Você quer registrar R$ 45,90 em Alimentação?"}"#;
        let AssistantReply::Transaction(s) = parse_reply(content) else {
            panic!("expected a transaction");
        };
        assert_eq!(s.kind, TransactionKind::DailyExpense);
        assert_eq!(s.category, "Alimentação");
        assert_eq!(s.amount, dec!(45.9));
        assert_eq!(s.description, "almoço");
        assert_eq!(s.confidence, 92);
    }

    #[test]
    fn test_amount_as_brazilian_string_and_default_confirmation() {
        let content = r#"{"tipo":"entrada","categoria":"Outro","valor":"1.500,00"}"#;
        let AssistantReply::Transaction(s) = parse_reply(content) else {
            panic!("expected a transaction");
        };
        assert_eq!(s.kind, TransactionKind::Income);
        assert_eq!(s.amount, dec!(1500.00));
        assert_eq!(s.confirmation, "Você quer registrar R$ 1.500,00 em Outro?");
    }

    #[test]
    fn test_message_reply() {
        let reply = parse_reply(r#"{"type":"message","message":"Olá! Como posso ajudar?"}"#);
        assert_eq!(reply, AssistantReply::Message("Olá! Como posso ajudar?".to_string()));
    }

    #[test]
    fn test_plain_text_and_fenced_json() {
        assert_eq!(
            parse_reply("Não entendi"),
            AssistantReply::Message("Não entendi".to_string())
        );
        let fenced = "```json\n{\"type\":\"message\",\"message\":\"oi\"}\n```";
        assert_eq!(parse_reply(fenced), AssistantReply::Message("oi".to_string()));
    }

    #[test]
    fn test_unknown_kind_is_not_a_transaction() {
        let reply = parse_reply(r#"{"tipo":"transferencia","valor":10}"#);
        assert!(matches!(reply, AssistantReply::Message(_)));
    }
}
