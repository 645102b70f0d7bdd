//! Function-defined input records
//!
//! A function declares its inputs as a type deriving `Deserialize` and
//! `JsonSchema` with camelCase field names. The platform renders the schema as
//! a form, so the schema generated here is what users fill in.

use crate::error::{AutomateError, AutomateResult};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inputs of an automate function
pub trait FunctionInputs: DeserializeOwned + JsonSchema + Send + 'static {
    /// Semantic checks that the schema alone cannot express
    fn validate(&self) -> AutomateResult<()> {
        Ok(())
    }
}

/// Inputs of a function that takes no parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NoInputs {}

impl FunctionInputs for NoInputs {}

/// Parse and validate a function input document.
///
/// Empty input (or whitespace) is treated as `{}`.
pub fn parse_inputs<T: FunctionInputs>(json: &str) -> AutomateResult<T> {
    let json = if json.trim().is_empty() { "{}" } else { json };
    let value: Value = serde_json::from_str(json)
        .map_err(|e| AutomateError::json_with_context(e.to_string(), "parsing function inputs"))?;

    if !value.is_object() {
        return Err(AutomateError::invalid_input(
            "function inputs must be a JSON object",
        ));
    }

    let inputs: T = serde_json::from_value(value)
        .map_err(|e| AutomateError::invalid_input(format!("invalid function inputs: {}", e)))?;
    inputs.validate()?;
    Ok(inputs)
}

/// JSON schema of a function's inputs
pub fn input_schema<T: FunctionInputs>() -> Value {
    serde_json::to_value(schemars::schema_for!(T)).unwrap_or(Value::Null)
}
