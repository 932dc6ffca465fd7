//! Contextual actions: spot payment codes (boleto, PIX) in copied text and
//! closed-invoice events, and offer the matching shortcut.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::deep_links::{invoice_closed_link, new_transaction_link, NewTransactionParams};

static LINHA_DIGITAVEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{5}\.\d{5}\s\d{5}\.\d{6}\s\d{5}\.\d{6}\s\d\s\d{14}$").expect("valid regex")
});
static PIX_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^[a-z0-9]{25,35}$").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentCodeKind {
    /// 44-digit bar code
    Boleto,
    /// Typed form of the bar code, with dots and spaces
    LinhaDigitavel,
    /// EMV "copia e cola" payload
    PixCopyPaste,
    PixKey,
    NumericCode,
}

impl PaymentCodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentCodeKind::Boleto => "Boleto (código de barras)",
            PaymentCodeKind::LinhaDigitavel => "Boleto (linha digitável)",
            PaymentCodeKind::PixCopyPaste => "PIX copia e cola",
            PaymentCodeKind::PixKey => "Chave PIX",
            PaymentCodeKind::NumericCode => "Código numérico",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentCode {
    pub kind: PaymentCodeKind,
    /// Code with whitespace removed
    pub code: String,
}

/// Recognize a payment code in copied text.
///
/// Whitespace is removed before matching, except for the formatted linha
/// digitável which is matched on the trimmed text as typed.
pub fn detect_payment_code(text: &str) -> Option<PaymentCode> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let clean: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    let all_digits = clean.chars().all(|c| c.is_ascii_digit());

    let kind = if all_digits && clean.len() == 44 {
        PaymentCodeKind::Boleto
    } else if LINHA_DIGITAVEL.is_match(trimmed) {
        PaymentCodeKind::LinhaDigitavel
    } else if clean.starts_with("000201") && clean.to_ascii_uppercase().contains("BR.GOV.BCB.PIX") {
        PaymentCodeKind::PixCopyPaste
    } else if all_digits && (20..=50).contains(&clean.len()) {
        PaymentCodeKind::NumericCode
    } else if PIX_KEY.is_match(&clean) {
        PaymentCodeKind::PixKey
    } else {
        return None;
    };

    Some(PaymentCode { kind, code: clean })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContextualAction {
    Barcode(PaymentCode),
    InvoiceClosed { card_id: i64, invoice: String },
}

impl ContextualAction {
    pub fn title(&self) -> &'static str {
        match self {
            ContextualAction::Barcode(_) => "Deseja pagar o boleto copiado?",
            ContextualAction::InvoiceClosed { .. } => "Sua fatura foi fechada. Deseja pagar agora?",
        }
    }

    pub fn deep_link(&self) -> String {
        match self {
            ContextualAction::Barcode(code) => new_transaction_link(&NewTransactionParams {
                kind: Some("barcode".to_string()),
                code: Some(code.code.clone()),
                ..Default::default()
            }),
            ContextualAction::InvoiceClosed { card_id, invoice } => invoice_closed_link(*card_id, invoice),
        }
    }
}

/// Tracks clipboard contents and the currently offered action
#[derive(Debug, Default)]
pub struct ContextualDetector {
    last_content: Option<String>,
    current: Option<ContextualAction>,
}

impl ContextualDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current clipboard text. Returns a new action only the first
    /// time a given content is seen; re-reading the same text is a no-op,
    /// so a dismissed action does not come back until the clipboard changes.
    pub fn observe_clipboard(&mut self, text: &str) -> Option<ContextualAction> {
        let trimmed = text.trim();
        if trimmed.is_empty() || self.last_content.as_deref() == Some(trimmed) {
            return None;
        }
        self.last_content = Some(trimmed.to_string());

        let code = detect_payment_code(trimmed)?;
        debug!("Clipboard holds a payment code ({:?})", code.kind);
        let action = ContextualAction::Barcode(code);
        self.current = Some(action.clone());
        Some(action)
    }

    pub fn invoice_closed(&mut self, card_id: i64, invoice: &str) -> ContextualAction {
        let action = ContextualAction::InvoiceClosed {
            card_id,
            invoice: invoice.to_string(),
        };
        self.current = Some(action.clone());
        action
    }

    pub fn current(&self) -> Option<&ContextualAction> {
        self.current.as_ref()
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOLETO: &str = "23793381286000000000300000000400184340000012345";
    const LINHA: &str = "23790.12345 60000.123456 78901.234567 8 12340000012345";

    #[test]
    fn test_boleto_barcode() {
        let digits = "1".repeat(44);
        let code = detect_payment_code(&format!("  {}\n", digits)).unwrap();
        assert_eq!(code.kind, PaymentCodeKind::Boleto);
        assert_eq!(code.code, digits);
        // 47 digits is not a bar code but still a numeric code
        assert_eq!(detect_payment_code(BOLETO).unwrap().kind, PaymentCodeKind::NumericCode);
    }

    #[test]
    fn test_linha_digitavel() {
        let code = detect_payment_code(LINHA).unwrap();
        assert_eq!(code.kind, PaymentCodeKind::LinhaDigitavel);
        assert_eq!(code.code, "23790.1234560000.12345678901.234567812340000012345");
    }

    #[test]
    fn test_pix_payloads() {
        let emv = "00020126580014BR.GOV.BCB.PIX0136123e4567-e12b-12d1-a456-4266554400005204000053039865802BR5913Fulano de Tal6008BRASILIA62070503***63041D3D";
        assert_eq!(detect_payment_code(emv).unwrap().kind, PaymentCodeKind::PixCopyPaste);

        let key = "a1b2c3d4e5f6g7h8i9j0k1l2m3";
        assert_eq!(detect_payment_code(key).unwrap().kind, PaymentCodeKind::PixKey);
    }

    #[test]
    fn test_plain_text_is_not_a_code() {
        assert_eq!(detect_payment_code("almoço com a equipe"), None);
        assert_eq!(detect_payment_code(""), None);
        assert_eq!(detect_payment_code("12345"), None);
        assert_eq!(detect_payment_code(&"9".repeat(51)), None);
    }

    #[test]
    fn test_detector_dedupes_and_dismisses() {
        let mut detector = ContextualDetector::new();
        let digits = "1".repeat(44);

        assert!(detector.observe_clipboard(&digits).is_some());
        assert!(detector.current().is_some());
        assert!(detector.observe_clipboard(&digits).is_none());

        detector.dismiss();
        assert!(detector.current().is_none());
        assert!(detector.observe_clipboard(&digits).is_none());

        assert!(detector.observe_clipboard("texto qualquer").is_none());
        assert!(detector.observe_clipboard(&digits).is_some());
    }

    #[test]
    fn test_action_deep_links() {
        let digits = "1".repeat(44);
        let action = ContextualAction::Barcode(detect_payment_code(&digits).unwrap());
        assert_eq!(action.deep_link(), format!("/transactions/new?type=barcode&code={}", digits));

        let mut detector = ContextualDetector::new();
        let closed = detector.invoice_closed(2, "2025-04");
        assert_eq!(closed.deep_link(), "/cards/2/faturas/2025-04/pagar");
        assert_eq!(detector.current(), Some(&closed));
    }
}
