use super::{LanguageModel, ModelError, ModelReply};
use crate::config::ModelSettings;
use crate::conversation::{Message, ToolCall};
use crate::tools::ToolSpec;
use serde_json::{json, Map, Value};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct GeminiConfig {
    pub api_base: String,
    pub model: String,
    pub api_key: String,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn from_settings(settings: &ModelSettings, api_key: String) -> Self {
        Self {
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key,
            temperature: settings.temperature,
            top_p: settings.top_p,
            top_k: settings.top_k,
            max_output_tokens: settings.max_output_tokens,
            timeout: Duration::from_secs(settings.request_timeout_seconds),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

/// Google Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct GeminiModel {
    config: GeminiConfig,
}

impl GeminiModel {
    pub fn new(config: GeminiConfig) -> Result<Self, ModelError> {
        if config.api_key.trim().is_empty() {
            return Err(ModelError::MissingApiKey {
                env_var: "GEMINI_API_KEY".to_string(),
            });
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

fn tool_result_payload(content: &str, is_error: bool) -> Value {
    if is_error {
        json!({ "error": content })
    } else {
        json!({ "result": content })
    }
}

/// Splits history into the `system_instruction` and the `contents` turns.
pub fn convert_history(history: &[Message]) -> (Option<Value>, Vec<Value>) {
    let mut system_parts = Vec::new();
    let mut contents = Vec::new();

    for message in history {
        match message {
            Message::System { content } => system_parts.push(json!({ "text": content })),
            Message::User { content } => {
                contents.push(json!({ "role": "user", "parts": [{ "text": content }] }));
            }
            Message::Assistant { content, tool_call } => {
                let mut parts = Vec::new();
                if !content.trim().is_empty() {
                    parts.push(json!({ "text": content }));
                }
                if let Some(call) = tool_call {
                    parts.push(json!({
                        "functionCall": { "name": call.name, "args": call.args }
                    }));
                }
                if !parts.is_empty() {
                    contents.push(json!({ "role": "model", "parts": parts }));
                }
            }
            Message::ToolResult {
                tool,
                content,
                is_error,
                ..
            } => {
                contents.push(json!({
                    "role": "user",
                    "parts": [{
                        "functionResponse": {
                            "name": tool,
                            "response": tool_result_payload(content, *is_error),
                        }
                    }]
                }));
            }
        }
    }

    let system_instruction =
        (!system_parts.is_empty()).then(|| json!({ "parts": system_parts }));
    (system_instruction, contents)
}

pub fn build_request_body(config: &GeminiConfig, history: &[Message], tools: &[ToolSpec]) -> Value {
    let (system_instruction, contents) = convert_history(history);
    let mut body = json!({
        "contents": contents,
        "generationConfig": {
            "temperature": config.temperature,
            "topP": config.top_p,
            "topK": config.top_k,
            "maxOutputTokens": config.max_output_tokens,
        },
    });
    if let Some(system_instruction) = system_instruction {
        body["system_instruction"] = system_instruction;
    }
    if !tools.is_empty() {
        let declarations: Vec<Value> = tools
            .iter()
            .map(|spec| {
                json!({
                    "name": spec.name,
                    "description": spec.description,
                    "parameters": spec.parameters_schema(),
                })
            })
            .collect();
        body["tools"] = json!([{ "function_declarations": declarations }]);
    }
    body
}

/// Reads the first candidate: text parts are concatenated and the first
/// `functionCall` becomes the tool call. Further calls are counted as dropped.
pub fn parse_response(body: &Value) -> Result<ModelReply, ModelError> {
    let Some(candidate) = body
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
    else {
        let reason = body
            .pointer("/promptFeedback/blockReason")
            .and_then(Value::as_str)
            .unwrap_or("empty response")
            .to_string();
        return Err(ModelError::NoCandidates { reason });
    };

    let parts = match candidate.pointer("/content/parts") {
        None | Some(Value::Null) => &[][..],
        Some(Value::Array(parts)) => parts.as_slice(),
        Some(_) => {
            return Err(ModelError::Malformed(
                "candidate content parts must be an array".to_string(),
            ))
        }
    };

    let mut text = String::new();
    let mut tool_call = None;
    let mut dropped_tool_calls = 0;
    for part in parts {
        if let Some(chunk) = part.get("text").and_then(Value::as_str) {
            text.push_str(chunk);
        }
        if let Some(call) = part.get("functionCall") {
            if tool_call.is_some() {
                dropped_tool_calls += 1;
                continue;
            }
            let name = call
                .get("name")
                .and_then(Value::as_str)
                .filter(|name| !name.is_empty())
                .ok_or_else(|| ModelError::Malformed("functionCall without name".to_string()))?;
            let args = match call.get("args") {
                None | Some(Value::Null) => Map::new(),
                Some(Value::Object(args)) => args.clone(),
                Some(_) => {
                    return Err(ModelError::Malformed(format!(
                        "functionCall `{name}` args must be an object"
                    )))
                }
            };
            tool_call = Some(ToolCall::new(name, args));
        }
    }

    let message = match tool_call {
        Some(call) => Message::assistant_with_call(text, call),
        None => Message::assistant(text),
    };
    Ok(ModelReply {
        message,
        dropped_tool_calls,
    })
}

impl LanguageModel for GeminiModel {
    fn complete(&self, history: &[Message], tools: &[ToolSpec]) -> Result<ModelReply, ModelError> {
        let url = self.config.endpoint();
        let body = build_request_body(&self.config, history, tools);

        let response = match ureq::post(&url)
            .timeout(self.config.timeout)
            .set("x-goog-api-key", &self.config.api_key)
            .send_json(body)
        {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                return Err(ModelError::Status {
                    code,
                    body: response.into_string().unwrap_or_default(),
                })
            }
            Err(err) => {
                return Err(ModelError::Transport {
                    url,
                    reason: err.to_string(),
                })
            }
        };

        let payload: Value = response
            .into_json()
            .map_err(|err| ModelError::Malformed(err.to_string()))?;
        parse_response(&payload)
    }
}
