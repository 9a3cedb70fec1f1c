/// Tool registry
/// The server exposes exactly one tool: create_zkvm_proof

use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::{json, Value};

pub const CREATE_ZKVM_PROOF: &str = "create_zkvm_proof";

/// Shown to the calling agent; none of these rules are enforced here
const CREATE_ZKVM_PROOF_DESCRIPTION: &str = r#"Create a Nexus zkVM proof from Rust code to verify correct execution.

The Nexus zkVM (Zero-Knowledge Virtual Machine) provides cryptographic proofs that
a given Rust code snippet executes correctly, without revealing the execution details.

Requirements:
- Code must be no_std Rust compatible
- Do not use any imports
- The snippet will be placed inside a main function, so write code accordingly
- Use an assert statement to verify the result of the code
- Do NOT use any file system operations, networking, environment variables or any other operations that are part of the standard library. We are in a no_std environment.
- Do NOT pass in a function, just the snippet of code that should be inserted into a main function.
- Do NOT use any print statements, we are in a no_std environment.

```rust
let x:u128 = 1322;
let result:u128 = x * x * x * x;
assert_eq!(result, 3054399363856);
```

Returns the response from the zkVM server, including proof details or error messages."#;

static CREATE_ZKVM_PROOF_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "code": {
                "type": "string",
                "description": "Valid no_std Rust code to be processed by the zkVM"
            }
        },
        "required": ["code"]
    })
});

/// Tool Definition
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Every tool this server registers with the host
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![ToolDefinition {
        name: CREATE_ZKVM_PROOF.to_string(),
        description: CREATE_ZKVM_PROOF_DESCRIPTION.to_string(),
        input_schema: CREATE_ZKVM_PROOF_SCHEMA.clone(),
    }]
}

/// Why a tool call could not be dispatched (distinct from a tool's own failure text)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCallError {
    UnknownTool(String),
    InvalidArguments(String),
}

impl std::fmt::Display for ToolCallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolCallError::UnknownTool(name) => write!(f, "Tool '{}' not found", name),
            ToolCallError::InvalidArguments(reason) => write!(f, "Invalid arguments: {}", reason),
        }
    }
}

impl std::error::Error for ToolCallError {}

/// Pull the required `code` string out of a tool-call argument object
pub fn code_argument(arguments: Option<&Value>) -> Result<&str, ToolCallError> {
    let arguments = arguments
        .and_then(|a| a.as_object())
        .ok_or_else(|| ToolCallError::InvalidArguments("tool arguments required".to_string()))?;

    match arguments.get("code") {
        Some(Value::String(code)) => Ok(code.as_str()),
        Some(_) => Err(ToolCallError::InvalidArguments(
            "'code' must be a string".to_string(),
        )),
        None => Err(ToolCallError::InvalidArguments(
            "missing required field 'code'".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_tool_registered() {
        let tools = tool_definitions();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "create_zkvm_proof");
        assert!(tools[0].description.contains("no_std"));
        assert_eq!(tools[0].input_schema["required"], json!(["code"]));
    }

    #[test]
    fn test_definition_serializes_input_schema_camel_case() {
        let value = serde_json::to_value(&tool_definitions()[0]).unwrap();
        assert!(value.get("inputSchema").is_some());
        assert!(value.get("input_schema").is_none());
    }

    #[test]
    fn test_code_argument() {
        let args = json!({"code": "let x = 1;"});
        assert_eq!(code_argument(Some(&args)), Ok("let x = 1;"));

        let empty = json!({"code": ""});
        assert_eq!(code_argument(Some(&empty)), Ok(""));

        assert!(matches!(
            code_argument(Some(&json!({"code": 42}))),
            Err(ToolCallError::InvalidArguments(_))
        ));
        assert!(matches!(
            code_argument(Some(&json!({}))),
            Err(ToolCallError::InvalidArguments(_))
        ));
        assert!(matches!(code_argument(None), Err(ToolCallError::InvalidArguments(_))));
    }
}
