use super::process::ProcessError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgType {
    String,
    Boolean,
    Integer,
    Number,
    Object,
}

impl ArgType {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Boolean => value.is_boolean(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Object => value.is_object(),
        }
    }
}

impl std::fmt::Display for ArgType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Boolean => write!(f, "boolean"),
            Self::Integer => write!(f, "integer"),
            Self::Number => write!(f, "number"),
            Self::Object => write!(f, "object"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgSpec {
    #[serde(rename = "type")]
    pub arg_type: ArgType,
    pub required: bool,
    pub description: String,
}

impl ArgSpec {
    pub fn required(arg_type: ArgType, description: &str) -> Self {
        Self {
            arg_type,
            required: true,
            description: description.to_string(),
        }
    }

    pub fn optional(arg_type: ArgType, description: &str) -> Self {
        Self {
            arg_type,
            required: false,
            description: description.to_string(),
        }
    }
}

/// Static descriptor of a tool. `description` is the contract the model reads
/// to decide when to call it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub args: BTreeMap<String, ArgSpec>,
}

impl ToolSpec {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            args: BTreeMap::new(),
        }
    }

    pub fn arg(mut self, name: &str, spec: ArgSpec) -> Self {
        self.args.insert(name.to_string(), spec);
        self
    }

    /// JSON-schema object describing the arguments, as function-calling
    /// model APIs expect it.
    pub fn parameters_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for (name, spec) in &self.args {
            properties.insert(
                name.clone(),
                json!({
                    "type": spec.arg_type.to_string(),
                    "description": spec.description,
                }),
            );
            if spec.required {
                required.push(Value::String(name.clone()));
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    pub fn check_args(&self, args: &Map<String, Value>) -> Result<(), ToolError> {
        for key in args.keys() {
            if !self.args.contains_key(key) {
                return Err(ToolError::UnknownArgument { arg: key.clone() });
            }
        }
        for (arg, spec) in &self.args {
            match args.get(arg) {
                Some(Value::Null) | None if spec.required => {
                    return Err(ToolError::MissingArgument { arg: arg.clone() })
                }
                Some(Value::Null) | None => {}
                Some(value) if spec.arg_type.matches(value) => {}
                Some(_) => {
                    return Err(ToolError::InvalidArgumentType {
                        arg: arg.clone(),
                        expected: spec.arg_type,
                    })
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub content: String,
    pub featured: bool,
}

impl ToolOutput {
    /// Structured result the user asked for (a listing, an analysis, a
    /// generation confirmation).
    pub fn payload(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            featured: true,
        }
    }

    /// Guidance or an empty result; ranks with ordinary model commentary.
    pub fn notice(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            featured: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("missing required argument `{arg}`")]
    MissingArgument { arg: String },
    #[error("argument `{arg}` must be {expected}")]
    InvalidArgumentType { arg: String, expected: ArgType },
    #[error("unknown argument `{arg}`")]
    UnknownArgument { arg: String },
    #[error("http request to {url} failed: {reason}")]
    Http { url: String, reason: String },
    #[error("malformed {what}: {reason}")]
    Parse { what: String, reason: String },
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    Failed(String),
}

pub(crate) fn io_error(path: &std::path::Path, source: std::io::Error) -> ToolError {
    ToolError::Io {
        path: path.display().to_string(),
        source,
    }
}

pub fn required_str<'a>(args: &'a Map<String, Value>, arg: &str) -> Result<&'a str, ToolError> {
    match args.get(arg) {
        Some(Value::String(value)) => Ok(value.as_str()),
        Some(Value::Null) | None => Err(ToolError::MissingArgument {
            arg: arg.to_string(),
        }),
        Some(_) => Err(ToolError::InvalidArgumentType {
            arg: arg.to_string(),
            expected: ArgType::String,
        }),
    }
}

pub fn optional_str<'a>(
    args: &'a Map<String, Value>,
    arg: &str,
) -> Result<Option<&'a str>, ToolError> {
    match args.get(arg) {
        Some(Value::String(value)) => Ok(Some(value.as_str())),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(ToolError::InvalidArgumentType {
            arg: arg.to_string(),
            expected: ArgType::String,
        }),
    }
}
