use crate::llm::gateway::{
    ChatCompletionRequest, ChatMessage, ChatRole, GatewayClient, GatewayConfig, LlmClient,
};

pub mod keywords;

/// Input is truncated to keep prompts bounded; agendas routinely run to
/// hundreds of pages of boilerplate.
const MAX_INPUT_CHARS: usize = 12_000;
const SUMMARY_MAX_TOKENS: u32 = 256;
const TAGS_MAX_TOKENS: u32 = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub text: String,
    pub total_tokens: u32,
}

/// AI summarizer/classifier. Disabled unless CIVIC_AI=1 and an API key is
/// configured; every failure degrades silently to the empty result, which
/// downstream code treats as "no AI summary available".
pub struct Summarizer {
    client: Option<Box<dyn LlmClient>>,
}

impl Summarizer {
    pub fn from_env() -> Self {
        let enabled = matches!(std::env::var("CIVIC_AI").as_deref(), Ok("1") | Ok("true"));
        if !enabled {
            return Self::disabled();
        }
        let cfg = GatewayConfig::from_env();
        if cfg.api_key.is_none() {
            tracing::warn!("CIVIC_AI=1 but CIVIC_LLM_API_KEY is not set; summaries disabled");
            return Self::disabled();
        }
        match GatewayClient::new(cfg) {
            Ok(client) => Self { client: Some(Box::new(client)) },
            Err(e) => {
                tracing::warn!(error = %e, "llm gateway unavailable; summaries disabled");
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub fn with_client(client: Box<dyn LlmClient>) -> Self {
        Self { client: Some(client) }
    }

    pub fn enabled(&self) -> bool {
        self.client.is_some()
    }

    pub async fn summarize(&self, text: &str) -> Option<Summary> {
        let client = self.client.as_ref()?;
        let text = truncate(text, MAX_INPUT_CHARS);
        if text.trim().is_empty() {
            return None;
        }

        let request = ChatCompletionRequest {
            model: None,
            messages: vec![
                ChatMessage::new(
                    ChatRole::System,
                    "You summarize municipal legislation and meeting documents for \
                     residents. Reply with a plain 2-3 sentence summary, no preamble.",
                ),
                ChatMessage::new(ChatRole::User, text),
            ],
            max_tokens: Some(SUMMARY_MAX_TOKENS),
            temperature: None,
        };

        match client.chat_completion(request).await {
            Ok(resp) if !resp.content.trim().is_empty() => Some(Summary {
                text: resp.content.trim().to_string(),
                total_tokens: resp.usage.and_then(|u| u.total_tokens).unwrap_or(0),
            }),
            Ok(_) => None,
            Err(e) => {
                // No retry: a failed call reads as "no summary" downstream.
                tracing::warn!(error = %e, "summary call failed");
                None
            }
        }
    }

    /// Topic tags: comma-separated from the LLM when available, keyword
    /// fallback otherwise.
    pub async fn tag(&self, text: &str) -> Vec<String> {
        if let Some(client) = self.client.as_ref() {
            let request = ChatCompletionRequest {
                model: None,
                messages: vec![
                    ChatMessage::new(
                        ChatRole::System,
                        "Label the civic document with up to five short topic tags. \
                         Reply with the tags only, comma-separated, lowercase.",
                    ),
                    ChatMessage::new(ChatRole::User, truncate(text, MAX_INPUT_CHARS)),
                ],
                max_tokens: Some(TAGS_MAX_TOKENS),
                temperature: None,
            };

            match client.chat_completion(request).await {
                Ok(resp) => {
                    let tags = parse_tags(&resp.content);
                    if !tags.is_empty() {
                        return tags;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "tag call failed; falling back to keywords");
                }
            }
        }
        keywords::extract_tags(text)
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    s.chars().take(max_chars).collect()
}

fn parse_tags(content: &str) -> Vec<String> {
    content
        .split(',')
        .map(|t| t.trim().trim_matches('.').to_lowercase())
        .filter(|t| !t.is_empty() && t.len() <= 40)
        .take(5)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::gateway::{ChatCompletionResponse, GatewayError, MockClient};
    use serde_json::Value;

    fn response(content: &str, total_tokens: Option<u32>) -> ChatCompletionResponse {
        ChatCompletionResponse {
            content: content.to_string(),
            raw: Value::Null,
            usage: total_tokens.map(|t| crate::llm::gateway::UsageMetrics {
                prompt_tokens: None,
                completion_tokens: None,
                total_tokens: Some(t),
            }),
        }
    }

    #[tokio::test]
    async fn disabled_summarizer_returns_none() {
        let s = Summarizer::disabled();
        assert!(!s.enabled());
        assert!(s.summarize("An ordinance about zoning.").await.is_none());
    }

    #[tokio::test]
    async fn summarize_reports_token_usage() {
        let mock = MockClient::new();
        mock.push_response(Ok(response("Short summary.", Some(120))));
        let s = Summarizer::with_client(Box::new(mock));

        let out = s.summarize("Agenda text.").await.unwrap();
        assert_eq!(out.text, "Short summary.");
        assert_eq!(out.total_tokens, 120);
    }

    #[tokio::test]
    async fn gateway_error_degrades_to_none() {
        let mock = MockClient::new();
        mock.push_response(Err(GatewayError::Timeout));
        let s = Summarizer::with_client(Box::new(mock));

        assert!(s.summarize("Agenda text.").await.is_none());
    }

    #[tokio::test]
    async fn tag_parses_comma_list() {
        let mock = MockClient::new();
        mock.push_response(Ok(response("Zoning, housing, land-use", None)));
        let s = Summarizer::with_client(Box::new(mock));

        assert_eq!(s.tag("whatever").await, vec!["zoning", "housing", "land-use"]);
    }

    #[tokio::test]
    async fn tag_falls_back_to_keywords_on_error() {
        let mock = MockClient::new();
        mock.push_response(Err(GatewayError::Timeout));
        let s = Summarizer::with_client(Box::new(mock));

        let tags = s.tag("An ordinance amending the zoning map.").await;
        assert_eq!(tags, vec!["zoning"]);
    }

    #[tokio::test]
    async fn disabled_tagger_uses_keywords() {
        let s = Summarizer::disabled();
        let tags = s.tag("Budget amendment for park maintenance.").await;
        assert_eq!(tags, vec!["budget", "parks"]);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "é".repeat(10);
        assert_eq!(truncate(&s, 4).chars().count(), 4);
    }
}
