//! Listing generation: requests one completion per variant, sequentially.
//!
//! A failed call stops the loop; variants already produced are kept and the
//! failure is reported alongside them.

use tracing::{info, warn};

use crate::llm_client::prompts::LISTING_SYSTEM;
use crate::llm_client::{ChatRequest, LlmClient};

#[derive(Debug, Clone, PartialEq)]
pub struct VariantsOutcome {
    pub variants: Vec<String>,
    /// Set when a call failed before all variants were produced.
    pub error: Option<String>,
}

pub async fn generate_variants(
    llm: &LlmClient,
    prompt: &str,
    model: &str,
    temperature: f32,
    count: u8,
) -> VariantsOutcome {
    let request = ChatRequest {
        model,
        system: LISTING_SYSTEM,
        prompt,
        temperature,
    };

    let mut variants = Vec::with_capacity(count as usize);
    let mut error = None;

    for i in 1..=count {
        match llm.complete(&request).await {
            Ok(text) if text.is_empty() => {
                warn!(variant = i, "LLM returned empty text, skipping variant");
            }
            Ok(text) => variants.push(text),
            Err(e) => {
                warn!(variant = i, "LLM call failed: {e}");
                error = Some(format!("OpenAI error (variant {i}): {e}"));
                break;
            }
        }
    }

    info!(
        requested = count,
        produced = variants.len(),
        model,
        "Listing generation finished"
    );

    VariantsOutcome { variants, error }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> LlmClient {
        LlmClient::new("sk-test".to_string(), &server.base_url())
            .unwrap()
            .with_max_retries(1)
    }

    #[tokio::test]
    async fn test_requests_one_call_per_variant() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .body_contains("You write excellent property listings.");
                then.status(200)
                    .json_body(json!({"choices": [{"message": {"content": "Charming cottage."}}]}));
            })
            .await;

        let outcome = generate_variants(&client(&server), "prompt", "gpt-4o-mini", 0.7, 3).await;

        mock.assert_hits_async(3).await;
        assert_eq!(outcome.variants.len(), 3);
        assert_eq!(outcome.error, None);
    }

    #[tokio::test]
    async fn test_empty_texts_are_dropped() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200)
                    .json_body(json!({"choices": [{"message": {"content": "   "}}]}));
            })
            .await;

        let outcome = generate_variants(&client(&server), "prompt", "gpt-4o-mini", 0.7, 2).await;
        assert!(outcome.variants.is_empty());
        assert_eq!(outcome.error, None);
    }

    #[tokio::test]
    async fn test_error_stops_loop_and_is_labelled() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(400)
                    .json_body(json!({"error": {"message": "context length exceeded"}}));
            })
            .await;

        let outcome = generate_variants(&client(&server), "prompt", "gpt-4o-mini", 0.7, 3).await;

        mock.assert_hits_async(1).await;
        assert!(outcome.variants.is_empty());
        let error = outcome.error.unwrap();
        assert!(error.starts_with("OpenAI error (variant 1):"));
        assert!(error.contains("context length exceeded"));
    }
}
