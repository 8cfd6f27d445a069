use serde::{Deserialize, Serialize};
use std::fmt;

/// A lexer or parser failure, located by source line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct SyntaxError {
    pub line: u32,
    pub message: String,
}

impl SyntaxError {
    pub fn new(line: u32, message: impl Into<String>) -> Self {
        SyntaxError {
            line,
            message: message.into(),
        }
    }

    pub fn lex(line: u32, message: impl Into<String>) -> Self {
        SyntaxError::new(line, format!("lex error: {}", message.into()))
    }

    pub fn parse(line: u32, message: impl Into<String>) -> Self {
        SyntaxError::new(line, format!("parse error: {}", message.into()))
    }
}

/// Contract violations raised while building or rewriting the action tree.
///
/// These are not validation findings: they abort the computation that hit
/// them and are folded into an `E_SYNTAX` report by `compile`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionError {
    /// A hold statement listed another hold among its children.
    #[error("recursive holding syntax is not allowed")]
    RecursiveHold,

    /// A hold was asked to split itself into hold-start/hold-end.
    #[error("duplicate hold is not allowed")]
    DuplicateHold,

    /// The action has no press/release split.
    #[error("{action} is not a holdable action")]
    NotHoldable { action: String },

    /// Or-distribution was requested on something that is not an Or group.
    #[error("{action} is not an or group")]
    NotAnOr { action: String },
}

/// Anything that can stop `parse` or a rewrite pipeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Action(#[from] ActionError),
}

/// Stable error codes reported to callers of `compile`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "E_SYNTAX")]
    Syntax,
    #[serde(rename = "E_ACTION_SET")]
    ActionSet,
    /// Reserved.
    #[serde(rename = "E_STICK")]
    Stick,
    #[serde(rename = "E_PUSH")]
    Push,
    #[serde(rename = "E_PUSH_UP")]
    PushUp,
    #[serde(rename = "E_ROTATE")]
    Rotate,
    #[serde(rename = "E_MOVE")]
    Move,
    /// Reserved.
    #[serde(rename = "E_SET_ROTATE")]
    SetRotate,
    /// Reserved.
    #[serde(rename = "E_TEXT")]
    Text,
    /// Branch enumeration hit the configured limit; validation is partial.
    #[serde(rename = "E_BRANCH_LIMIT")]
    BranchLimit,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Syntax => "E_SYNTAX",
            ErrorCode::ActionSet => "E_ACTION_SET",
            ErrorCode::Stick => "E_STICK",
            ErrorCode::Push => "E_PUSH",
            ErrorCode::PushUp => "E_PUSH_UP",
            ErrorCode::Rotate => "E_ROTATE",
            ErrorCode::Move => "E_MOVE",
            ErrorCode::SetRotate => "E_SET_ROTATE",
            ErrorCode::Text => "E_TEXT",
            ErrorCode::BranchLimit => "E_BRANCH_LIMIT",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A finding reported by `compile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Index of the validation branch the error was found in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<usize>,
    pub code: ErrorCode,
    pub message: String,
}

impl ValidationError {
    pub fn new(branch: Option<usize>, code: ErrorCode, message: impl Into<String>) -> Self {
        ValidationError {
            branch,
            code,
            message: message.into(),
        }
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        ValidationError::new(None, ErrorCode::Syntax, message)
    }

    /// Serialize to JSON with every field present (null for a missing branch).
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "branch":  self.branch,
            "code":    self.code,
            "message": self.message,
        })
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.branch {
            Some(branch) => write!(f, "[{}] branch {}: {}", self.code, branch, self.message),
            None => write!(f, "[{}] {}", self.code, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_serializes_as_literal_code() {
        let json = serde_json::to_value(ErrorCode::PushUp).unwrap();
        assert_eq!(json, serde_json::json!("E_PUSH_UP"));
        let back: ErrorCode = serde_json::from_value(serde_json::json!("E_ACTION_SET")).unwrap();
        assert_eq!(back, ErrorCode::ActionSet);
    }

    #[test]
    fn json_value_always_has_branch_field() {
        let err = ValidationError::syntax("bad input");
        let json = err.to_json_value();
        assert!(json.get("branch").unwrap().is_null());
        assert_eq!(json["code"], "E_SYNTAX");
        assert_eq!(json["message"], "bad input");
    }

    #[test]
    fn syntax_error_display_includes_line() {
        let err = SyntaxError::parse(3, "expected ')'");
        assert_eq!(err.to_string(), "line 3: parse error: expected ')'");
    }
}
