// AI assistant - OpenAI-compatible chat completions client

mod reply;

pub use reply::{parse_reply, AssistantReply, TransactionSuggestion};

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::analysis::Classification;
use crate::config::AppConfig;
use crate::db::{ChatMessage, ChatRole};
use crate::error::FinanceError;

const SYSTEM_PROMPT: &str = "Você é o assistente do FinanceTrack, um app de finanças pessoais \
usado no Brasil. Ajude a registrar gastos e receitas descritos em linguagem natural, \
responda dúvidas financeiras com simpatia e sugira melhorias com cuidado.

Quando o usuário descrever uma transação, responda apenas com este JSON:
{\"tipo\": \"entrada|saida_fixa|diario\", \"categoria\": \"<uma das categorias>\", \
\"valor\": <número>, \"descricao\": \"<descrição curta>\", \"confianca\": <0 a 100>, \
\"confirmacao\": \"Você quer registrar R$ X em <categoria>?\"}

Categorias: Alimentação, Transporte, Moradia, Diversão, Saúde/Beleza, Roupas/Acessórios, \
Educação, Setup/Equipamentos, Assinaturas, Investimentos, Seguros, Viagens, Pets, \
Restaurante, Academia/Esportes, Outro.

Para qualquer outra mensagem, responda com:
{\"type\": \"message\", \"message\": \"<sua resposta>\"}

Responda sempre em português do Brasil.";

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Chat client bound to one endpoint, model and key
#[derive(Debug, Clone)]
pub struct AssistantClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl AssistantClient {
    /// Build a client from the loaded configuration.
    /// Fails when no API key is configured (config file or `OPENAI_API_KEY`).
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            FinanceError::AssistantError(
                "Nenhuma chave de API configurada. Use `financetrack config set-key <chave>` \
                 ou defina OPENAI_API_KEY. Transações manuais continuam disponíveis."
                    .to_string(),
            )
        })?;

        let client = Client::builder()
            .user_agent(concat!("financetrack/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.assistant.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: config.assistant.base_url.trim_end_matches('/').to_string(),
            model: config.assistant.model.clone(),
            temperature: config.assistant.temperature,
            max_tokens: config.assistant.max_tokens,
        })
    }

    /// Send one user message with earlier turns as context
    pub async fn chat(&self, history: &[ChatMessage], input: &str) -> Result<AssistantReply> {
        let mut messages = vec![WireMessage {
            role: "system",
            content: SYSTEM_PROMPT,
        }];
        messages.extend(history.iter().map(|m| WireMessage {
            role: match m.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "assistant",
            },
            content: &m.content,
        }));
        messages.push(WireMessage {
            role: "user",
            content: input,
        });

        let content = self.complete(messages).await?;
        Ok(parse_reply(&content))
    }

    /// Category guess for a statement line
    pub async fn classify_description(&self, description: &str) -> Result<Classification> {
        let prompt = format!("Classifique esta transação do extrato: {}", description);
        let messages = vec![
            WireMessage {
                role: "system",
                content: SYSTEM_PROMPT,
            },
            WireMessage {
                role: "user",
                content: &prompt,
            },
        ];

        match parse_reply(&self.complete(messages).await?) {
            AssistantReply::Transaction(s) => Ok(Classification::new(s.category, s.confidence)),
            AssistantReply::Message(m) => Err(FinanceError::AssistantError(format!(
                "no classification for {:?}: {}",
                description, m
            ))
            .into()),
        }
    }

    async fn complete(&self, messages: Vec<WireMessage<'_>>) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!("POST {} ({} messages)", url, messages.len());

        let body = CompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: ResponseFormat { kind: "json_object" },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to reach the assistant API")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(FinanceError::AssistantError(format!(
                "API returned {}: {}",
                status,
                detail.chars().take(200).collect::<String>()
            ))
            .into());
        }

        let data: CompletionResponse = response
            .json()
            .await
            .context("Failed to parse assistant response")?;
        let content = data
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("Assistant returned an empty response"))?;

        info!("Assistant replied with {} chars", content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_an_assistant_error() {
        let mut config = AppConfig::default();
        config.assistant.api_key = Some("  ".to_string());
        // Only meaningful when the environment does not provide a key
        if std::env::var(crate::config::API_KEY_ENV).is_ok() {
            return;
        }
        let err = AssistantClient::from_config(&config).unwrap_err();
        let finance = err.downcast_ref::<FinanceError>().unwrap();
        assert!(matches!(finance, FinanceError::AssistantError(_)));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_client_trims_base_url() {
        let mut config = AppConfig::default();
        config.assistant.api_key = Some("sk-test".to_string());
        config.assistant.base_url = "http://localhost:8080/v1/".to_string();
        let client = AssistantClient::from_config(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:8080/v1");
        assert_eq!(client.model, "gpt-4o-mini");
    }

    #[test]
    fn test_request_body_shape() {
        let body = CompletionRequest {
            model: "m",
            messages: vec![WireMessage {
                role: "user",
                content: "oi",
            }],
            temperature: 0.5,
            max_tokens: 10,
            response_format: ResponseFormat { kind: "json_object" },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
