//! Language-model opponent backed by the Gemini `generateContent` API.

use super::{MoveProvider, MoveRequest, MoveResponse, ProviderError};
use strictly_grid::Difficulty;
use tracing::{debug, error, info, instrument};

/// Default Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Configuration for the LLM opponent.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    api_key: String,
    model: String,
    base_url: String,
}

impl LlmConfig {
    /// Creates a new LLM configuration.
    #[instrument(skip(api_key), fields(model = %model))]
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        debug!("Creating LLM config");
        Self {
            api_key,
            model,
            base_url,
        }
    }

    /// Reads the API key from the named environment variable.
    #[instrument(skip(model, base_url))]
    pub fn from_env(
        api_key_env: &str,
        model: String,
        base_url: String,
    ) -> Result<Self, ProviderError> {
        let api_key = std::env::var(api_key_env)
            .map_err(|_| ProviderError::MissingApiKey(api_key_env.to_string()))?;
        Ok(Self::new(api_key, model, base_url))
    }

    /// Gets the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Gets the endpoint base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Opponent that asks a language model for its move.
#[derive(Debug, Clone)]
pub struct LlmProvider {
    config: LlmConfig,
    client: reqwest::Client,
    name: String,
}

impl LlmProvider {
    /// Creates a new LLM provider.
    #[instrument(skip(config), fields(model = %config.model))]
    pub fn new(config: LlmConfig) -> Self {
        info!("Creating LLM provider");
        let name = format!("Gemini ({})", config.model);
        Self {
            config,
            client: reqwest::Client::new(),
            name,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

/// Playing style the model is asked to adopt.
fn persona(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => {
            "You are a distracted novice. Do not try to win and do not block. \
             Pick almost any open square. Your reasoning is silly and based on vibes."
        }
        Difficulty::Medium => {
            "You are a casual player. Take a winning move if you have one and block \
             an immediate threat if you see it; otherwise play a simple move without \
             planning traps. Your reasoning is friendly."
        }
        Difficulty::Hard => {
            "You are an expert strategist. Win immediately if you can. If the opponent \
             is about to win, you must block. Otherwise play to set up a win or force \
             a draw. Your reasoning is tactical and a little smug."
        }
    }
}

/// Sampling temperature per difficulty.
pub fn temperature(difficulty: Difficulty) -> f32 {
    match difficulty {
        Difficulty::Easy => 1.0,
        Difficulty::Medium => 0.6,
        Difficulty::Hard => 0.1,
    }
}

/// Builds the user prompt for one move.
pub fn build_prompt(request: &MoveRequest) -> String {
    let side = request.board_size().side();
    let last = request.board_size().cells() - 1;
    let cells = serde_json::to_string(&request.cells()).unwrap_or_else(|_| "[]".to_string());

    format!(
        "You are playing Tic-Tac-Toe on a {side}x{side} grid. Connect {side} in a row to win.\n\
         Squares are indexed 0 to {last}, left to right, top to bottom.\n\
         You are '{mark}'. The opponent is '{opponent}'.\n\
         Current board (null means empty): {cells}\n\n\
         {persona}\n\n\
         Answer with the index (0-{last}) of your move and a very short sentence \
         (at most 10 words) explaining it.",
        mark = request.mark(),
        opponent = request.mark().opponent(),
        persona = persona(*request.difficulty()),
    )
}

/// Full `generateContent` request body with a JSON response schema.
pub fn build_body(request: &MoveRequest) -> serde_json::Value {
    let last = request.board_size().cells() - 1;
    serde_json::json!({
        "contents": [
            {
                "role": "user",
                "parts": [{ "text": build_prompt(request) }]
            }
        ],
        "generationConfig": {
            "temperature": temperature(*request.difficulty()),
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "move": {
                        "type": "INTEGER",
                        "description": format!("The board index (0-{last}) for your mark.")
                    },
                    "reasoning": {
                        "type": "STRING",
                        "description": "A short explanation for the move."
                    }
                },
                "required": ["move", "reasoning"]
            }
        }
    })
}

/// Extracts the move from a `generateContent` response body.
pub fn parse_response(body: &serde_json::Value) -> Result<MoveResponse, ProviderError> {
    let text = body["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .ok_or_else(|| ProviderError::Malformed("No text content in response".to_string()))?;

    serde_json::from_str(text).map_err(|e| ProviderError::Malformed(format!("{}: {}", e, text)))
}

#[async_trait::async_trait]
impl MoveProvider for LlmProvider {
    #[instrument(skip(self, request), fields(model = %self.config.model, difficulty = %request.difficulty()))]
    async fn request_move(&self, request: &MoveRequest) -> Result<MoveResponse, ProviderError> {
        debug!("Sending request to Gemini");
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.config.api_key.clone())
            .header("content-type", "application/json")
            .json(&build_body(request))
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Gemini API request failed");
                ProviderError::Transport(e.to_string())
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read Gemini response");
            ProviderError::Transport(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            error!(status = %status, response = %response_text, "Gemini API error");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: response_text,
            });
        }

        debug!(response_length = response_text.len(), "Parsing Gemini response");
        let body: serde_json::Value = serde_json::from_str(&response_text).map_err(|e| {
            error!(error = ?e, response = %response_text, "Failed to parse Gemini response");
            ProviderError::Malformed(e.to_string())
        })?;

        let parsed = parse_response(&body)?;
        info!(cell = parsed.cell, "Gemini chose a move");
        Ok(parsed)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
