use std::future::Future;

use serde::{Deserialize, Serialize};
use util::error::{XWordError, XWordResult};

use crate::{
  config::{ModelConfig, RelayConfig},
  http,
};

const SYSTEM_PROMPT: &str = "You are a helpful assistant that writes crossword puzzle content. \
                             Always answer with valid JSON when asked for JSON.";

/// Anything that can turn a prompt into one completion.
pub trait CompletionSource {
  fn complete(&self, prompt: &str) -> impl Future<Output = XWordResult<String>> + Send;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
  role: &'a str,
  content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
  model: &'a str,
  messages: [ChatMessage<'a>; 2],
  temperature: f64,
  max_tokens: u32,
}

#[derive(Deserialize)]
struct ReplyMessage {
  content: String,
}

#[derive(Deserialize)]
struct ReplyChoice {
  message: ReplyMessage,
}

#[derive(Deserialize)]
struct ChatReply {
  #[serde(default)]
  choices: Vec<ReplyChoice>,
}

#[derive(Deserialize)]
struct ErrorDetail {
  message: String,
}

#[derive(Deserialize)]
struct ErrorReply {
  error: ErrorDetail,
}

/// Client of the local chat relay, which forwards requests to the model
/// provider with credentials attached.
#[derive(Clone, Debug)]
pub struct RelayClient {
  relay: RelayConfig,
  model: ModelConfig,
}

impl RelayClient {
  pub fn new(relay: RelayConfig, model: ModelConfig) -> Self {
    Self { relay, model }
  }

  async fn request(&self, prompt: &str, model: &str) -> XWordResult<String> {
    let body = serde_json::to_string(&ChatRequest {
      model,
      messages: [
        ChatMessage { role: "system", content: SYSTEM_PROMPT },
        ChatMessage { role: "user", content: prompt },
      ],
      temperature: self.model.temperature,
      max_tokens: self.model.max_tokens,
    })?;

    log::debug!("Requesting completion from {model}");
    let response =
      http::post_json(&self.relay.host, self.relay.port, &self.relay.path, &body).await?;
    if !response.is_success() {
      let detail = serde_json::from_str::<ErrorReply>(&response.body)
        .map(|reply| reply.error.message)
        .unwrap_or_else(|_| format!("HTTP {}", response.status));
      return Err(XWordError::Clue(format!("Relay error: {detail}")).into());
    }

    let reply: ChatReply = serde_json::from_str(&response.body)
      .map_err(|err| XWordError::Clue(format!("Invalid relay reply: {err}")))?;
    reply
      .choices
      .into_iter()
      .next()
      .map(|choice| choice.message.content)
      .ok_or_else(|| XWordError::Clue("Relay reply has no choices".to_owned()).into())
  }
}

impl CompletionSource for RelayClient {
  async fn complete(&self, prompt: &str) -> XWordResult<String> {
    match self.request(prompt, &self.model.model).await {
      Ok(content) => Ok(content),
      Err(err) if self.model.fallback_model != self.model.model => {
        log::warn!(
          "Model {} failed ({err}), retrying with {}",
          self.model.model,
          self.model.fallback_model
        );
        self.request(prompt, &self.model.fallback_model).await
      }
      Err(err) => Err(err),
    }
  }
}
