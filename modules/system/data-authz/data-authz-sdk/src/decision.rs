//! Decision interpreter.
//!
//! Maps the engine's response body onto the host's permission vocabulary,
//! restricted to the permissions applicable to the checked resource.
//!
//! ## Decision Matrix
//!
//! | payload                                  | result                     |
//! |------------------------------------------|----------------------------|
//! | `{"result": true}`                       | all applicable permissions |
//! | `{"result": false}`                      | `NONE`                     |
//! | `{}` or `{"result": null}`               | `NONE` (rule undefined)    |
//! | `{"result": ["SELECT", ...]}`            | listed ∩ applicable        |
//! | `{"result": {"permissions": [...]}}`     | listed ∩ applicable        |
//! | `{"result": {"allow": bool}}`            | as boolean                 |
//! | anything else                            | `Malformed`                |
//!
//! Unknown and inapplicable tokens are dropped, never widened.

use serde_json::Value;

use crate::error::DecisionError;
use crate::models::{Permission, PermissionSet};

/// Raw response body returned by the engine, unparsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionPayload(Vec<u8>);

impl DecisionPayload {
    #[must_use]
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self(body.into())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// Interpret a decision payload.
///
/// The returned set is always a subset of `applicable`.
///
/// # Errors
///
/// `DecisionError::Malformed` if the payload is not JSON or matches none of
/// the recognised shapes.
pub fn interpret_decision(
    payload: &DecisionPayload,
    applicable: &PermissionSet,
) -> Result<PermissionSet, DecisionError> {
    let root: Value = serde_json::from_slice(payload.as_bytes())
        .map_err(|e| DecisionError::Malformed(format!("response is not valid JSON: {e}")))?;

    let Value::Object(root) = root else {
        return Err(DecisionError::Malformed(format!(
            "response root is {}, expected an object",
            kind(&root)
        )));
    };

    match root.get("result") {
        None | Some(Value::Null) => Ok(PermissionSet::none()),
        Some(result) => interpret_result(result, applicable),
    }
}

fn interpret_result(
    result: &Value,
    applicable: &PermissionSet,
) -> Result<PermissionSet, DecisionError> {
    match result {
        Value::Bool(allow) => Ok(from_flag(*allow, applicable)),
        Value::Array(tokens) => select(tokens, applicable),
        Value::Object(fields) => match (fields.get("permissions"), fields.get("allow")) {
            (Some(Value::Array(tokens)), _) => select(tokens, applicable),
            (None, Some(Value::Bool(allow))) => Ok(from_flag(*allow, applicable)),
            _ => Err(DecisionError::Malformed(
                "result object needs a 'permissions' array or an 'allow' flag".to_owned(),
            )),
        },
        other => Err(DecisionError::Malformed(format!(
            "result is {}, expected a boolean, array or object",
            kind(other)
        ))),
    }
}

fn from_flag(allow: bool, applicable: &PermissionSet) -> PermissionSet {
    if allow {
        applicable.clone()
    } else {
        PermissionSet::none()
    }
}

fn select(tokens: &[Value], applicable: &PermissionSet) -> Result<PermissionSet, DecisionError> {
    let mut granted = PermissionSet::none();

    for token in tokens {
        let Value::String(token) = token else {
            return Err(DecisionError::Malformed(format!(
                "permission token is {}, expected a string",
                kind(token)
            )));
        };

        match token.parse::<Permission>() {
            Ok(permission) if applicable.contains(permission) => {
                granted.insert(permission);
            }
            Ok(permission) => {
                tracing::debug!(%permission, "dropping permission not applicable to resource");
            }
            Err(e) => {
                tracing::debug!(error = %e, "dropping unknown permission token");
            }
        }
    }

    Ok(granted)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
