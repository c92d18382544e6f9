use serde::{Deserialize, Serialize};

// OpenAI chat completions request format
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

// OpenAI chat completions response format (only the fields we read)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

// Error body returned by the API on non-2xx responses
#[derive(Deserialize, Debug)]
pub struct ErrorBody {
    pub error: Option<ErrorDetail>,
}

#[derive(Deserialize, Debug)]
pub struct ErrorDetail {
    pub message: Option<String>,
}

// Gateway request format
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct GenerateRequest {
    #[serde(default)]
    pub system: Option<String>,
    pub prompt: String,
}

// Gateway response format
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct GenerateResponse {
    pub response: String,
    pub cached: bool,
}
